//! Domain error types.
//!
//! These errors represent validation failures when constructing domain
//! values from untrusted input. They are distinct from API/IO errors.

/// Domain-level errors for value validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Decimal value could not be parsed or is out of range
    #[error("invalid decimal: {0}")]
    InvalidDecimal(&'static str),

    /// Latitude or longitude out of range
    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(&'static str),

    /// Jeepney route code not in the known list
    #[error("unknown jeepney code: {0}")]
    UnknownJeepneyCode(String),

    /// Transport mode name not recognised
    #[error("unknown transport mode: {0}")]
    UnknownTransportMode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DomainError::InvalidDecimal("must not be negative");
        assert_eq!(err.to_string(), "invalid decimal: must not be negative");

        let err = DomainError::InvalidCoordinates("latitude out of range");
        assert_eq!(
            err.to_string(),
            "invalid coordinates: latitude out of range"
        );

        let err = DomainError::UnknownJeepneyCode("99Z".into());
        assert_eq!(err.to_string(), "unknown jeepney code: 99Z");

        let err = DomainError::UnknownTransportMode("boat".into());
        assert_eq!(err.to_string(), "unknown transport mode: boat");
    }
}
