//! NTC thermistor in the lower leg of a resistive divider, read through a
//! single-ended ADC channel.
//!
//! ```text
//!  vsource ── R serial ──┬── ADC channel
//!                        │
//!                    thermistor
//!                        │
//!                       GND
//! ```

use core::marker::PhantomData;

use embedded_hal::adc::{Channel, OneShot};

use super::calibration::{
    AdcProfile, Calibration, CalibrationProvider, CalibrationSource, ConfigureAdc,
};
use crate::logic::{
    averaging::CompensatedSum,
    divider::thermistor_resistance,
    steinhart::{beta_temperature, celsius_to_fahrenheit},
    DomainError,
};

/// Raw samples averaged into one reading
pub const SAMPLE_COUNT: usize = 64;

const _: () = assert!(SAMPLE_COUNT > 0);

#[derive(Clone, Copy, Debug, PartialEq, defmt::Format)]
pub struct ThermistorConfig {
    /// Fixed resistor between the source and the measuring point, in ohms
    pub serial_resistance: f32,
    /// Thermistor resistance at `nominal_temperature`, in ohms
    pub nominal_resistance: f32,
    /// Usually 25 °C
    pub nominal_temperature: f32,
    pub beta_val: f32,
    /// Divider supply in millivolts, usually 3300
    pub vsource: f32,
}

impl ThermistorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.serial_resistance > 0. && self.serial_resistance.is_finite()) {
            return Err(ConfigError::InvalidSerialResistance);
        }
        if !(self.nominal_resistance > 0. && self.nominal_resistance.is_finite()) {
            return Err(ConfigError::InvalidNominalResistance);
        }
        if !(self.nominal_temperature > -273.15 && self.nominal_temperature.is_finite()) {
            return Err(ConfigError::InvalidNominalTemperature);
        }
        if self.beta_val == 0. || !self.beta_val.is_finite() {
            return Err(ConfigError::InvalidBeta);
        }
        if !(self.vsource > 0. && self.vsource.is_finite()) {
            return Err(ConfigError::InvalidSource);
        }
        Ok(())
    }
}

/// Divider output of one sample window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum Vout {
    Calibrated(u32),
    /// No calibration, only the averaged code is known
    Uncalibrated { raw: u16 },
}

impl Vout {
    pub fn millivolts(&self) -> Option<u32> {
        match self {
            Vout::Calibrated(mv) => Some(*mv),
            Vout::Uncalibrated { .. } => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum ConfigError {
    InvalidSerialResistance,
    InvalidNominalResistance,
    InvalidNominalTemperature,
    InvalidBeta,
    InvalidSource,
    /// The channel did not deliver a single sample
    ChannelUnavailable,
}

#[derive(Clone, Copy, Debug, PartialEq, defmt::Format)]
pub enum Error<E> {
    Configuration(ConfigError),
    /// Not a single sample could be read
    Sampling(E),
    /// The ADC was never characterized, there are no millivolts to convert
    Uncalibrated,
    Domain(DomainError),
}

impl<E> From<DomainError> for Error<E> {
    fn from(err: DomainError) -> Self {
        Error::Domain(err)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, defmt::Format)]
pub struct Reading {
    pub vout_mv: u32,
    pub resistance: f32,
    pub celsius: f32,
}

impl Reading {
    pub fn fahrenheit(&self) -> f32 {
        celsius_to_fahrenheit(self.celsius)
    }
}

pub struct Thermistor<ADC, Word, PIN, CAL> {
    adc: ADC,
    pin: PIN,
    config: ThermistorConfig,
    profile: AdcProfile,
    calibration: Option<CAL>,
    t_resistance: Option<f32>,
    vout: Option<Vout>,
    _word: PhantomData<Word>,
}

impl<ADC, Word, PIN, CAL> Thermistor<ADC, Word, PIN, CAL>
where
    ADC: OneShot<ADC, Word, PIN>,
    PIN: Channel<ADC>,
    Word: Into<i32>,
    CAL: Calibration,
{
    /// Brings the ADC up with `profile` and characterizes it for the same
    /// profile. [`AdcProfile::DIVIDER`] suits a divider fed from 3.3 V.
    ///
    /// Only fails if the parameters are unusable or the channel can't be read
    /// at all. A provider that can't characterize the ADC leaves the
    /// thermistor uncalibrated, see [`Thermistor::is_calibrated`].
    pub fn new<P>(
        peripheral: ADC::Peripheral,
        mut pin: PIN,
        config: ThermistorConfig,
        profile: AdcProfile,
        provider: &mut P,
    ) -> Result<Self, Error<ADC::Error>>
    where
        ADC: ConfigureAdc,
        P: CalibrationProvider<Handle = CAL>,
    {
        config.validate().map_err(Error::Configuration)?;

        let mut adc = ADC::configure(peripheral, &profile);

        if nb::block!(adc.read(&mut pin)).is_err() {
            defmt::error!("ADC channel does not respond");
            return Err(Error::Configuration(ConfigError::ChannelUnavailable));
        }

        let calibration = match provider.characterize(&profile) {
            Ok(calibration) => {
                match calibration.source() {
                    CalibrationSource::TwoPoint => {
                        defmt::info!("Characterized using Two Point values")
                    }
                    CalibrationSource::ReferenceTrim => {
                        defmt::info!("Characterized using trimmed reference")
                    }
                    CalibrationSource::DefaultReference => {
                        defmt::info!("Characterized using default reference")
                    }
                }
                defmt::info!("Vref: {=u32} mV", calibration.reference_mv());
                Some(calibration)
            }
            Err(err) => {
                defmt::warn!(
                    "ADC characterization failed ({}), readings will be uncalibrated",
                    err
                );
                None
            }
        };

        Ok(Thermistor {
            adc,
            pin,
            config,
            profile,
            calibration,
            t_resistance: None,
            vout: None,
            _word: PhantomData,
        })
    }

    pub fn channel(&self) -> PIN::ID {
        PIN::channel()
    }

    pub fn config(&self) -> &ThermistorConfig {
        &self.config
    }

    /// Profile the ADC runs with and was characterized for
    pub fn profile(&self) -> &AdcProfile {
        &self.profile
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibration.is_some()
    }

    pub fn calibration_source(&self) -> Option<CalibrationSource> {
        self.calibration.as_ref().map(|calibration| calibration.source())
    }

    /// Output voltage of the last sample window
    pub fn vout(&self) -> Option<Vout> {
        self.vout
    }

    /// Thermistor resistance from the last conversion, in ohms
    pub fn t_resistance(&self) -> Option<f32> {
        self.t_resistance
    }

    /// Averages [`SAMPLE_COUNT`] raw codes.
    ///
    /// A failing read ends the window early and the codes read so far are
    /// averaged. Only a window without a single code is an error.
    pub fn read_raw_average(&mut self) -> Result<u16, Error<ADC::Error>> {
        let mut acc = CompensatedSum::new();
        let mut failure = None;
        for _ in 0..SAMPLE_COUNT {
            match nb::block!(self.adc.read(&mut self.pin)) {
                Ok(word) => {
                    let code: i32 = word.into();
                    // Single-ended conversions can dip slightly below zero
                    acc.add(code.max(0) as f32);
                }
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        match failure {
            Some(err) if acc.count() == 0 => return Err(Error::Sampling(err)),
            Some(_) => defmt::warn!(
                "ADC read failed, averaging {=u32} of {=usize} samples",
                acc.count(),
                SAMPLE_COUNT
            ),
            None => {}
        }

        let raw = acc.mean_code().unwrap_or_default();
        defmt::debug!("raw average: {=u16}", raw);
        Ok(raw)
    }

    /// Samples the divider output and converts it to millivolts.
    pub fn read_vout(&mut self) -> Result<Vout, Error<ADC::Error>> {
        let raw = self.read_raw_average()?;
        let vout = match &self.calibration {
            Some(calibration) => Vout::Calibrated(calibration.raw_to_millivolts(raw)),
            None => Vout::Uncalibrated { raw },
        };
        self.vout = Some(vout);
        Ok(vout)
    }

    /// Resistance and temperature for a divider output of `vout` millivolts.
    pub fn vout_to_celsius(&mut self, vout: u32) -> Result<f32, DomainError> {
        self.convert(vout).map(|(_, celsius)| celsius)
    }

    /// Resistance in ohms and temperature in °C, keeps the resistance.
    fn convert(&mut self, vout: u32) -> Result<(f32, f32), DomainError> {
        let config = self.config;
        self.t_resistance = None;
        let resistance = thermistor_resistance(config.serial_resistance, config.vsource, vout as f32)?;
        self.t_resistance = Some(resistance);
        let celsius = beta_temperature(
            resistance,
            config.nominal_resistance,
            config.nominal_temperature,
            config.beta_val,
        )?;
        Ok((resistance, celsius))
    }

    /// One polling cycle: sample, convert and keep `vout` and `t_resistance`.
    pub fn get_reading(&mut self) -> Result<Reading, Error<ADC::Error>> {
        let vout_mv = match self.read_vout()? {
            Vout::Calibrated(mv) => mv,
            Vout::Uncalibrated { .. } => return Err(Error::Uncalibrated),
        };
        let (resistance, celsius) = self.convert(vout_mv)?;
        Ok(Reading {
            vout_mv,
            resistance,
            celsius,
        })
    }

    pub fn get_celsius(&mut self) -> Result<f32, Error<ADC::Error>> {
        self.get_reading().map(|reading| reading.celsius)
    }

    /// Tears the driver down, the calibration handle goes with it.
    pub fn release(self) -> (ADC, PIN) {
        (self.adc, self.pin)
    }
}
