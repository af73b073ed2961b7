//! Tariff engine - pure fare computation

use crate::value_objects::{RideExtras, TariffConfig, TariffTier, round2};

fn cents_to_euros(cents: u32) -> f64 {
    f64::from(cents) / 100.0
}

/// Price of a ride in euros, rounded to cents and never negative
///
/// ```text
/// base + distance * perKm(tier) + wait/60 * waitPerHour
///      + baggage * baggageFee + (fifthPassenger ? fifthPassengerFee : 0)
/// ```
///
/// Negative or non-finite distances are priced as zero kilometers.
#[must_use]
pub fn price(distance_km: f64, tier: TariffTier, extras: &RideExtras, config: &TariffConfig) -> f64 {
    let distance_km = if distance_km.is_finite() && distance_km > 0.0 {
        distance_km
    } else {
        0.0
    };

    let per_km = cents_to_euros(config.km_cents.for_tier(tier));
    let wait_hours = f64::from(extras.wait_minutes) / 60.0;
    let fifth_passenger = if extras.fifth_passenger {
        cents_to_euros(config.fifth_passenger_cents)
    } else {
        0.0
    };

    let total = cents_to_euros(config.base_charge_cents)
        + distance_km * per_km
        + wait_hours * cents_to_euros(config.wait_per_hour_cents)
        + f64::from(extras.baggage_count) * cents_to_euros(config.baggage_fee_cents)
        + fifth_passenger;

    round2(total).max(0.0)
}
