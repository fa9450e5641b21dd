pub mod calibration;
pub mod led;
pub mod thermistor;

pub use calibration::{
    AdcProfile, Calibration, CalibrationProvider, ConfigureAdc, FactoryCalibration,
};
pub use led::{PwmLEDControl, TemperatureIndicator, ToggleLED};
pub use thermistor::{Reading, Thermistor, ThermistorConfig, Vout};
