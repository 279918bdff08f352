//! Piecewise-linear fare rules.
//!
//! Charges are accumulated exactly in hundredths of a centavo (rate in
//! centavos times quantity in hundredths) and rounded half-up to whole
//! centavos only when a `Money` value is produced.

use serde::Serialize;

use crate::domain::{Kilometers, Minutes, Money};

/// A fare formula for one mode of transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FareRule {
    /// Flat fare for the first `included` distance, then `per_km` beyond.
    Minimum {
        base: Money,
        included: Kilometers,
        per_km: Money,
    },

    /// Flag-down fare plus distance and waiting/travel time.
    Metered {
        base: Money,
        per_km: Money,
        per_minute: Money,
    },

    /// Flat fare up to `flat_limit`, `mid_rate` per km up to `mid_limit`,
    /// then `long_rate` per km for everything beyond.
    Tiered {
        flat: Money,
        flat_limit: Kilometers,
        mid_rate: Money,
        mid_limit: Kilometers,
        long_rate: Money,
    },
}

/// The components of a computed fare.
///
/// Components are rounded individually; `total` is the exact sum rounded
/// once, so it can differ from the component sum by a centavo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FareBreakdown {
    pub base: Money,
    pub distance_charge: Money,
    pub time_charge: Money,
    pub total: Money,
}

/// An exact amount in hundredths of a centavo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Exact(u128);

impl Exact {
    fn flat(amount: Money) -> Self {
        Exact(u128::from(amount.centavos()) * 100)
    }

    fn rate(rate: Money, quantity_hundredths: u64) -> Self {
        Exact(u128::from(rate.centavos()) * u128::from(quantity_hundredths))
    }

    fn plus(self, other: Exact) -> Self {
        Exact(self.0 + other.0)
    }

    /// `None` when the rounded amount does not fit in a `Money`.
    fn round(self) -> Option<Money> {
        let centavos = (self.0 + 50) / 100;
        u64::try_from(centavos).ok().map(Money::from_centavos)
    }
}

impl FareRule {
    /// Compute the fare breakdown.
    ///
    /// Returns `None` when an input the rule needs is absent (distance for
    /// every rule, travel time for metered rules) or when the amount is too
    /// large to represent.
    pub fn breakdown(
        &self,
        distance: Option<Kilometers>,
        time: Option<Minutes>,
    ) -> Option<FareBreakdown> {
        let distance = distance?;

        let (base, by_distance, by_time) = match *self {
            FareRule::Minimum {
                base,
                included,
                per_km,
            } => {
                let extra = distance.saturating_sub(included);
                (
                    Exact::flat(base),
                    Exact::rate(per_km, extra.hundredths()),
                    Exact::default(),
                )
            }
            FareRule::Metered {
                base,
                per_km,
                per_minute,
            } => {
                let time = time?;
                (
                    Exact::flat(base),
                    Exact::rate(per_km, distance.hundredths()),
                    Exact::rate(per_minute, time.hundredths()),
                )
            }
            FareRule::Tiered {
                flat,
                flat_limit,
                mid_rate,
                mid_limit,
                long_rate,
            } => {
                let mid_span = mid_limit.saturating_sub(flat_limit);
                let past_flat = distance.saturating_sub(flat_limit);
                let in_mid = past_flat.min(mid_span);
                let past_mid = distance.saturating_sub(mid_limit.max(flat_limit));
                (
                    Exact::flat(flat),
                    Exact::rate(mid_rate, in_mid.hundredths())
                        .plus(Exact::rate(long_rate, past_mid.hundredths())),
                    Exact::default(),
                )
            }
        };

        Some(FareBreakdown {
            base: base.round()?,
            distance_charge: by_distance.round()?,
            time_charge: by_time.round()?,
            total: base.plus(by_distance).plus(by_time).round()?,
        })
    }

    /// Compute just the total fare.
    pub fn fare(&self, distance: Option<Kilometers>, time: Option<Minutes>) -> Option<Money> {
        self.breakdown(distance, time).map(|b| b.total)
    }
}
