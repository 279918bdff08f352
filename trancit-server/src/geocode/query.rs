//! Query text derivation for the resolution fallback chain.

/// Suffix appended to every geocoder query to keep results local.
pub const CITY_SUFFIX: &str = ", Cebu City, Philippines";

/// Normalize query text for use as a cache key.
///
/// Trims, lowercases, and collapses runs of whitespace.
pub fn normalize(query: &str) -> String {
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Append the city suffix.
pub fn with_city(text: &str) -> String {
    format!("{}{}", text.trim(), CITY_SUFFIX)
}

/// Whether a token is a house/lot number, zip code, or similar.
fn is_numeric_token(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit()) && !token.chars().any(char::is_alphabetic)
}

/// Remove tokens that contain digits but no letters.
///
/// A comma attached to a removed token moves onto the previous kept token
/// so segment boundaries survive.
pub fn strip_numeric_tokens(text: &str) -> String {
    let mut kept: Vec<String> = Vec::new();

    for token in text.split_whitespace() {
        if is_numeric_token(token) {
            if token.ends_with(',')
                && let Some(prev) = kept.last_mut()
                && !prev.ends_with(',')
            {
                prev.push(',');
            }
            continue;
        }
        kept.push(token.to_string());
    }

    kept.join(" ")
        .trim_matches(|c: char| c == ',' || c.is_whitespace())
        .to_string()
}

/// The first `n` non-empty comma-separated segments, rejoined.
pub fn leading_segments(text: &str, n: usize) -> Option<String> {
    let segments: Vec<&str> = text
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(n)
        .collect();

    if segments.is_empty() {
        None
    } else {
        Some(segments.join(", "))
    }
}

/// A city or municipality with a fixed fallback position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Locality {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub lat: f64,
    pub lon: f64,
}

/// Localities checked in order; more specific names come before "cebu",
/// which also appears inside most full addresses.
pub const LOCALITIES: &[Locality] = &[
    Locality {
        name: "Mandaue City",
        keywords: &["mandaue"],
        lat: 10.3236,
        lon: 123.9223,
    },
    Locality {
        name: "Lapu-Lapu City",
        keywords: &["lapu-lapu", "lapulapu", "lapu lapu", "mactan"],
        lat: 10.3103,
        lon: 123.9494,
    },
    Locality {
        name: "Talisay City",
        keywords: &["talisay"],
        lat: 10.2447,
        lon: 123.8494,
    },
    Locality {
        name: "Consolacion",
        keywords: &["consolacion"],
        lat: 10.3766,
        lon: 123.9573,
    },
    Locality {
        name: "Minglanilla",
        keywords: &["minglanilla"],
        lat: 10.2450,
        lon: 123.7964,
    },
    Locality {
        name: "Cebu City",
        keywords: &["cebu"],
        lat: 10.3157,
        lon: 123.8854,
    },
];

/// Find the first locality whose keyword appears in the text.
pub fn detect_locality(text: &str) -> Option<&'static Locality> {
    let normalized = normalize(text);
    LOCALITIES
        .iter()
        .find(|l| l.keywords.iter().any(|k| normalized.contains(k)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_and_lowercases() {
        assert_eq!(normalize("  SM   City\tCebu "), "sm city cebu");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn with_city_appends_suffix() {
        assert_eq!(
            with_city(" Ayala Center "),
            "Ayala Center, Cebu City, Philippines"
        );
    }

    #[test]
    fn strip_removes_house_numbers_and_zip_codes() {
        assert_eq!(
            strip_numeric_tokens("123 Osmeña Blvd, Cebu"),
            "Osmeña Blvd, Cebu"
        );
        assert_eq!(strip_numeric_tokens("Brgy. Lahug 6000"), "Brgy. Lahug");
    }

    #[test]
    fn strip_keeps_alphanumeric_tokens() {
        assert_eq!(strip_numeric_tokens("Unit 5B Gorordo Ave"), "Unit 5B Gorordo Ave");
        assert_eq!(strip_numeric_tokens("#45-B Gorordo"), "#45-B Gorordo");
    }

    #[test]
    fn strip_preserves_segment_commas() {
        assert_eq!(strip_numeric_tokens("Lot 5, Banilad"), "Lot, Banilad");
        assert_eq!(strip_numeric_tokens("12, Mango Ave"), "Mango Ave");
    }

    #[test]
    fn strip_of_only_numbers_is_empty() {
        assert_eq!(strip_numeric_tokens("123 456"), "");
    }

    #[test]
    fn leading_segments_takes_first_two() {
        assert_eq!(
            leading_segments("Colon St, Parian, Cebu City, Cebu", 2).as_deref(),
            Some("Colon St, Parian")
        );
        assert_eq!(
            leading_segments("Colon St", 2).as_deref(),
            Some("Colon St")
        );
        assert_eq!(
            leading_segments(" , Parian, ", 2).as_deref(),
            Some("Parian")
        );
        assert_eq!(leading_segments(" , ", 2), None);
    }

    #[test]
    fn detect_specific_locality_before_cebu() {
        let found = detect_locality("Parkmall, Mandaue, Cebu").unwrap();
        assert_eq!(found.name, "Mandaue City");

        let found = detect_locality("Mactan airport").unwrap();
        assert_eq!(found.name, "Lapu-Lapu City");

        let found = detect_locality("Some street in CEBU").unwrap();
        assert_eq!(found.name, "Cebu City");
    }

    #[test]
    fn detect_nothing() {
        assert!(detect_locality("Manila").is_none());
    }

    #[test]
    fn locality_positions_are_valid() {
        for l in LOCALITIES {
            assert!(crate::domain::Coordinates::new(l.lat, l.lon).is_ok(), "{}", l.name);
        }
    }
}
