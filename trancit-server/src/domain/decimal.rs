//! Fixed-point decimal quantities with two decimal places.
//!
//! Money, distance, and duration are all stored as integer hundredths so
//! that fare arithmetic is exact. Values built from `f64` are rounded half
//! away from zero to two places; negative and non-finite inputs are
//! rejected, so every value here is non-negative by construction.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::DomainError;

/// Convert a float into hundredths, rounding half away from zero.
fn hundredths_from_f64(value: f64) -> Result<u64, DomainError> {
    if !value.is_finite() {
        return Err(DomainError::InvalidDecimal("must be a finite number"));
    }
    if value < 0.0 {
        return Err(DomainError::InvalidDecimal("must not be negative"));
    }

    // Nudge past representation error so 2.675 rounds like the decimal 2.675.
    let scaled = (value * 100.0 + 1e-7).round();
    if scaled > u64::MAX as f64 {
        return Err(DomainError::InvalidDecimal("too large"));
    }
    Ok(scaled as u64)
}

/// Parse a decimal string such as `"13"`, `"13.5"` or `"13.505"`.
///
/// Extra fraction digits beyond the second round half-up.
fn hundredths_from_str(s: &str) -> Result<u64, DomainError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(DomainError::InvalidDecimal("empty"));
    }
    if s.starts_with('-') {
        return Err(DomainError::InvalidDecimal("must not be negative"));
    }

    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(DomainError::InvalidDecimal("no digits"));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DomainError::InvalidDecimal("expected digits"));
    }

    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole
            .parse()
            .map_err(|_| DomainError::InvalidDecimal("too large"))?
    };

    let frac_bytes = frac.as_bytes();
    let digit = |i: usize| frac_bytes.get(i).map_or(0, |b| u64::from(b - b'0'));
    let mut cents = digit(0) * 10 + digit(1);
    if digit(2) >= 5 {
        cents += 1;
    }

    whole
        .checked_mul(100)
        .and_then(|w| w.checked_add(cents))
        .ok_or(DomainError::InvalidDecimal("too large"))
}

fn fmt_hundredths(value: u64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}.{:02}", value / 100, value % 100)
}

/// Accepts either `"12.34"` or `12.34` in JSON.
#[derive(Deserialize)]
#[serde(untagged)]
enum DecimalRepr {
    Text(String),
    Number(f64),
}

impl DecimalRepr {
    fn into_hundredths(self) -> Result<u64, DomainError> {
        match self {
            DecimalRepr::Text(s) => hundredths_from_str(&s),
            DecimalRepr::Number(n) => hundredths_from_f64(n),
        }
    }
}

macro_rules! fixed_point {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u64);

        impl $name {
            /// The zero value.
            pub const ZERO: Self = Self(0);

            /// Build from a count of hundredths.
            pub const fn from_hundredths(hundredths: u64) -> Self {
                Self(hundredths)
            }

            /// The value in hundredths.
            pub const fn hundredths(self) -> u64 {
                self.0
            }

            /// Round a float to two places.
            pub fn from_f64(value: f64) -> Result<Self, DomainError> {
                hundredths_from_f64(value).map(Self)
            }

            /// The value as a float, for display or geometry only.
            pub fn as_f64(self) -> f64 {
                self.0 as f64 / 100.0
            }

            /// Subtract, clamping at zero.
            pub fn saturating_sub(self, other: Self) -> Self {
                Self(self.0.saturating_sub(other.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}(", stringify!($name))?;
                fmt_hundredths(self.0, f)?;
                f.write_str(")")
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt_hundredths(self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                hundredths_from_str(s).map(Self)
            }
        }

        impl Add for $name {
            type Output = Self;

            fn add(self, rhs: Self) -> Self {
                Self(self.0.saturating_add(rhs.0))
            }
        }

        impl Sum for $name {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                iter.fold(Self::ZERO, Add::add)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                DecimalRepr::deserialize(deserializer)?
                    .into_hundredths()
                    .map(Self)
                    .map_err(serde::de::Error::custom)
            }
        }
    };
}

fixed_point! {
    /// An amount of Philippine pesos, held as centavos.
    Money
}

fixed_point! {
    /// A non-negative road distance in kilometers.
    Kilometers
}

fixed_point! {
    /// A non-negative travel time in minutes.
    Minutes
}

impl Money {
    /// Build from whole centavos.
    pub const fn from_centavos(centavos: u64) -> Self {
        Self(centavos)
    }

    /// The amount in centavos.
    pub const fn centavos(self) -> u64 {
        self.0
    }
}

impl Kilometers {
    /// Convert a distance in meters, as reported by routing services.
    pub fn from_meters(meters: f64) -> Result<Self, DomainError> {
        Self::from_f64(meters / 1000.0)
    }
}

impl Minutes {
    /// Convert a duration in seconds, as reported by routing services.
    pub fn from_seconds(seconds: f64) -> Result<Self, DomainError> {
        Self::from_f64(seconds / 60.0)
    }
}
