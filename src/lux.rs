//! Raw sensor scale to illuminance conversion
//!
//! Gateway light sensors report brightness on a logarithmic scale where a
//! step of 10000 corresponds to one order of magnitude of illuminance.

/// Convert a raw logarithmic light level to lux.
///
/// A raw level of 1 maps to 1 lux; the result is always positive and
/// strictly increasing in the raw level.
pub fn raw_to_lux(raw_level: f64) -> f64 {
    10f64.powf((raw_level - 1.0) / 10000.0)
}
