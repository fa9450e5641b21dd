//! Beta-model (simplified Steinhart-Hart) linearization of an NTC thermistor.
//!
//! `1/T = 1/T0 + ln(R/R0) / B` with temperatures in kelvin. The whole chain is
//! evaluated in `f64`, `f32` only has about 3e-5 K of resolution around room
//! temperature, which is more than the nominal point can tolerate.

use libm::log;

use super::DomainError;

pub const ZERO_CELSIUS_IN_KELVIN: f64 = 273.15;

/// Temperature in degrees Celsius of a thermistor with resistance `resistance`.
pub fn beta_temperature(
    resistance: f32,
    nominal_resistance: f32,
    nominal_temperature: f32,
    beta: f32,
) -> Result<f32, DomainError> {
    if !(resistance > 0.) || !resistance.is_finite() {
        return Err(DomainError::NonPositiveResistance);
    }

    let x = log(resistance as f64 / nominal_resistance as f64);
    let inv_t = x / beta as f64 + 1. / (nominal_temperature as f64 + ZERO_CELSIUS_IN_KELVIN);
    if !(inv_t > 0.) {
        return Err(DomainError::BelowAbsoluteZero);
    }

    Ok((1. / inv_t - ZERO_CELSIUS_IN_KELVIN) as f32)
}

pub fn celsius_to_fahrenheit(celsius: f32) -> f32 {
    celsius * 1.8 + 32.
}

#[cfg(test)]
pub mod tests {
    use micromath::F32Ext;

    use super::{beta_temperature, celsius_to_fahrenheit};
    use crate::logic::DomainError;

    pub fn nominal_point_is_identity() {
        let t = beta_temperature(100_000., 100_000., 25., 3950.).unwrap();
        assert!((t - 25.).abs() < 1e-6);

        let t = beta_temperature(10_000., 10_000., 0., 3435.).unwrap();
        assert!(t.abs() < 1e-6);
    }

    pub fn known_point() {
        // 100k/3950 NTC at half its nominal resistance sits near 41.46 °C
        let t = beta_temperature(50_000., 100_000., 25., 3950.).unwrap();
        assert!((t - 41.46).abs() < 0.01);
    }

    pub fn strictly_decreasing_in_resistance() {
        let mut resistance: f32 = 500.;
        let mut previous = beta_temperature(resistance, 100_000., 25., 3950.).unwrap();
        while resistance < 5_000_000. {
            resistance *= 1.1;
            let t = beta_temperature(resistance, 100_000., 25., 3950.).unwrap();
            assert!(t < previous);
            previous = t;
        }
    }

    pub fn non_positive_resistance_is_rejected() {
        assert_eq!(
            beta_temperature(0., 100_000., 25., 3950.),
            Err(DomainError::NonPositiveResistance)
        );
        assert_eq!(
            beta_temperature(-5., 100_000., 25., 3950.),
            Err(DomainError::NonPositiveResistance)
        );
        assert_eq!(
            beta_temperature(f32::NAN, 100_000., 25., 3950.),
            Err(DomainError::NonPositiveResistance)
        );
    }

    pub fn absurdly_low_resistance_is_rejected() {
        // ln(1e-30 / 1e5) / 3950 outweighs 1 / 298.15
        assert_eq!(
            beta_temperature(1e-30, 100_000., 25., 3950.),
            Err(DomainError::BelowAbsoluteZero)
        );
    }

    pub fn fahrenheit_fixed_points() {
        assert_eq!(celsius_to_fahrenheit(0.), 32.);
        assert_eq!(celsius_to_fahrenheit(100.), 212.);
        assert_eq!(celsius_to_fahrenheit(-40.), -40.);
    }
}
