//! Conversion of billing amounts into monthly equivalents.

use crate::core::subscription::BillingFrequency;

const WEEKS_PER_YEAR: f64 = 52.0;
const MONTHS_PER_YEAR: f64 = 12.0;

/// Converts an amount billed at `frequency` into its monthly equivalent.
///
/// Weekly amounts use the average 52/12 weeks per month. One-time purchases
/// and unrecognized frequencies contribute nothing to recurring spend.
pub fn normalize_to_monthly(amount: f64, frequency: BillingFrequency) -> f64 {
    match frequency {
        BillingFrequency::Monthly => amount,
        BillingFrequency::Annual => amount / MONTHS_PER_YEAR,
        BillingFrequency::Quarterly => amount / 3.0,
        BillingFrequency::Weekly => amount * WEEKS_PER_YEAR / MONTHS_PER_YEAR,
        BillingFrequency::OneTime | BillingFrequency::Unknown => 0.0,
    }
}
