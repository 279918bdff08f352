//! Cebu jeepney route codes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::DomainError;

/// Every route code currently run in Metro Cebu, in canonical order.
const CODES: &[&str] = &[
    "01A", "01B", "01C", "01K", //
    "02A", "02B", //
    "03A", "03B", "03G", "03L", "03Q", //
    "04B", "04C", "04D", "04H", "04I", "04L", "04M", //
    "06A", "06B", "06C", "06F", "06G", "06H", //
    "07B", "07D", //
    "08F", "08G", //
    "09C", "09F", "09G", //
    "10C", "10E", "10F", "10G", "10H", "10K", "10M", //
    "11A", "11D", //
    "12A", "12B", "12C", "12D", "12F", "12G", "12I", "12J", "12L", //
    "13B", "13C", "13H", //
    "14D", //
    "15", //
    "17B", "17C", "17D", //
    "20A", "20B", //
    "21A", "21D", //
    "22A", "22I", //
    "23D", //
    "24A", "24F", "24I", //
    "26", "27", //
    "41B", "41D", //
    "42B", "42C", "42D", //
    "62B",
];

/// A known jeepney route code such as `01A` or `15`.
///
/// # Examples
///
/// ```
/// use trancit_server::domain::JeepneyCode;
///
/// let code = JeepneyCode::parse("01a").unwrap();
/// assert_eq!(code.as_str(), "01A");
///
/// assert!(JeepneyCode::parse("99Z").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JeepneyCode(u8);

impl JeepneyCode {
    /// Parse a code, ignoring surrounding whitespace and letter case.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let normalized = s.trim().to_ascii_uppercase();
        CODES
            .iter()
            .position(|c| *c == normalized)
            .map(|i| JeepneyCode(i as u8))
            .ok_or(DomainError::UnknownJeepneyCode(normalized))
    }

    /// The code as printed on the vehicle.
    pub fn as_str(&self) -> &'static str {
        CODES[self.0 as usize]
    }

    /// All known codes in canonical order.
    pub fn all() -> impl Iterator<Item = JeepneyCode> {
        (0..CODES.len()).map(|i| JeepneyCode(i as u8))
    }
}

impl fmt::Debug for JeepneyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JeepneyCode({})", self.as_str())
    }
}

impl fmt::Display for JeepneyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JeepneyCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for JeepneyCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JeepneyCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Every listed code parses back to itself
        #[test]
        fn listed_codes_roundtrip(i in 0..CODES.len()) {
            let code = JeepneyCode::parse(CODES[i]).unwrap();
            prop_assert_eq!(code.as_str(), CODES[i]);
        }

        /// Arbitrary strings either parse to a listed code or fail
        #[test]
        fn parse_only_yields_listed(s in "[0-9A-Za-z ]{0,5}") {
            if let Ok(code) = JeepneyCode::parse(&s) {
                prop_assert!(CODES.contains(&code.as_str()));
            }
        }
    }
}
