//! Per-mode fare table.

use crate::domain::{Kilometers, Minutes, Money, TransportMode};

use super::rules::{FareBreakdown, FareRule};

/// Fare rules for every transport mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FareTable {
    pub jeepney: FareRule,
    pub bus: FareRule,
    pub taxi: FareRule,
    pub motorcycle: FareRule,
}

impl FareTable {
    /// The rule used for a mode.
    pub fn rule(&self, mode: TransportMode) -> &FareRule {
        match mode {
            TransportMode::Jeepney => &self.jeepney,
            TransportMode::Bus => &self.bus,
            TransportMode::Taxi => &self.taxi,
            TransportMode::Motorcycle => &self.motorcycle,
        }
    }

    /// Estimated fare, or `None` if distance (or time, for taxis) is unknown.
    pub fn fare(
        &self,
        mode: TransportMode,
        distance: Option<Kilometers>,
        time: Option<Minutes>,
    ) -> Option<Money> {
        self.rule(mode).fare(distance, time)
    }

    /// Estimated fare with its components.
    pub fn breakdown(
        &self,
        mode: TransportMode,
        distance: Option<Kilometers>,
        time: Option<Minutes>,
    ) -> Option<FareBreakdown> {
        self.rule(mode).breakdown(distance, time)
    }
}

impl Default for FareTable {
    /// Metro Cebu rates.
    fn default() -> Self {
        Self {
            jeepney: FareRule::Minimum {
                base: Money::from_centavos(13_00),
                included: Kilometers::from_hundredths(4_00),
                per_km: Money::from_centavos(1_80),
            },
            bus: FareRule::Minimum {
                base: Money::from_centavos(15_00),
                included: Kilometers::from_hundredths(4_00),
                per_km: Money::from_centavos(2_65),
            },
            taxi: FareRule::Metered {
                base: Money::from_centavos(40_00),
                per_km: Money::from_centavos(13_50),
                per_minute: Money::from_centavos(2_00),
            },
            motorcycle: FareRule::Tiered {
                flat: Money::from_centavos(20_00),
                flat_limit: Kilometers::from_hundredths(1_00),
                mid_rate: Money::from_centavos(12_00),
                mid_limit: Kilometers::from_hundredths(8_00),
                long_rate: Money::from_centavos(10_00),
            },
        }
    }
}
