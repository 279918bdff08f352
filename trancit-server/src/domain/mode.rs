//! Vehicle types a trip can be priced for.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use super::DomainError;

/// A mode of transport.
///
/// Serialized as its canonical name; deserialized case-insensitively.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum TransportMode {
    #[default]
    Jeepney,
    Bus,
    Taxi,
    Motorcycle,
}

impl TransportMode {
    /// All modes, in display order.
    pub const ALL: [TransportMode; 4] = [
        TransportMode::Jeepney,
        TransportMode::Bus,
        TransportMode::Taxi,
        TransportMode::Motorcycle,
    ];

    /// The canonical name, e.g. `"Jeepney"`.
    pub fn as_str(self) -> &'static str {
        match self {
            TransportMode::Jeepney => "Jeepney",
            TransportMode::Bus => "Bus",
            TransportMode::Taxi => "Taxi",
            TransportMode::Motorcycle => "Motorcycle",
        }
    }

    /// Whether fares for this mode depend on travel time as well as distance.
    pub fn is_time_metered(self) -> bool {
        matches!(self, TransportMode::Taxi)
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TransportMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl FromStr for TransportMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        TransportMode::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| DomainError::UnknownTransportMode(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("jeepney".parse(), Ok(TransportMode::Jeepney));
        assert_eq!("BUS".parse(), Ok(TransportMode::Bus));
        assert_eq!(" Taxi ".parse(), Ok(TransportMode::Taxi));
        assert_eq!("motorcycle".parse(), Ok(TransportMode::Motorcycle));
    }

    #[test]
    fn parse_rejects_unknown() {
        assert_eq!(
            "ferry".parse::<TransportMode>(),
            Err(DomainError::UnknownTransportMode("ferry".into()))
        );
    }

    #[test]
    fn default_is_jeepney() {
        assert_eq!(TransportMode::default(), TransportMode::Jeepney);
    }

    #[test]
    fn serde_uses_canonical_names() {
        assert_eq!(
            serde_json::to_string(&TransportMode::Motorcycle).unwrap(),
            "\"Motorcycle\""
        );
        let mode: TransportMode = serde_json::from_str("\"Taxi\"").unwrap();
        assert_eq!(mode, TransportMode::Taxi);
    }

    #[test]
    fn deserialize_ignores_case() {
        let mode: TransportMode = serde_json::from_str("\"taxi\"").unwrap();
        assert_eq!(mode, TransportMode::Taxi);
        let mode: TransportMode = serde_json::from_str("\"BUS\"").unwrap();
        assert_eq!(mode, TransportMode::Bus);

        let err = serde_json::from_str::<TransportMode>("\"ferry\"").unwrap_err();
        assert!(err.to_string().contains("ferry"), "{err}");
        assert!(serde_json::from_str::<TransportMode>("3").is_err());
    }

    #[test]
    fn only_taxi_is_time_metered() {
        let metered: Vec<_> = TransportMode::ALL
            .into_iter()
            .filter(|m| m.is_time_metered())
            .collect();
        assert_eq!(metered, vec![TransportMode::Taxi]);
    }
}
