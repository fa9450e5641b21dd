//! Board and thermistor parameters. Edit and rebuild to change them.

use crate::logic::colormap::TemperatureRange;
use crate::peripherals::thermistor::ThermistorConfig;

/// Fixed resistor between the 3.3 V rail and the ADC input, in ohms
pub const SERIAL_RESISTANCE: f32 = 100_000.;
/// Resistance of the thermistor at `NOMINAL_TEMPERATURE`, in ohms
pub const NOMINAL_RESISTANCE: f32 = 100_000.;
/// Degrees Celsius
pub const NOMINAL_TEMPERATURE: f32 = 25.;
pub const BETA_VALUE: f32 = 3950.;
/// Divider supply, in millivolts
pub const VOLTAGE_SOURCE: f32 = 3300.;

/// Nominal SAADC internal reference. Used when the board has no better
/// calibration data.
pub const DEFAULT_VREF_MV: u32 = 600;

pub const POLL_INTERVAL_MS: u32 = 200;

/// Temperatures shown from blue to red on the RGB LED
pub const INDICATOR_RANGE: TemperatureRange = TemperatureRange { min: 0., max: 45. };

pub const THERMISTOR_CONFIG: ThermistorConfig = ThermistorConfig {
    serial_resistance: SERIAL_RESISTANCE,
    nominal_resistance: NOMINAL_RESISTANCE,
    nominal_temperature: NOMINAL_TEMPERATURE,
    beta_val: BETA_VALUE,
    vsource: VOLTAGE_SOURCE,
};
