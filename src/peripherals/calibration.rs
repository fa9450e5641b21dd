//! Mapping of raw SAADC codes to millivolts.
//!
//! The driver only sees [`CalibrationProvider`] and [`Calibration`], so a
//! board picks its scheme by picking a provider. [`FactoryCalibration`]
//! covers what nRF52 boards usually have at hand: a two-point measurement
//! taken during production, a measured reference voltage, or just the
//! nominal 0.6 V internal reference from the datasheet.

use nrf52840_hal::{
    pac::SAADC,
    saadc::{Gain, Oversample, Reference, Resistor, Resolution, Saadc, SaadcConfig, Time},
};

/// Gain stage in front of the SAADC. The input range is the reference
/// divided by the gain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum Attenuation {
    Gain1_6,
    Gain1_4,
    Gain1_2,
    Gain1,
}

impl Attenuation {
    fn divisor(self) -> u32 {
        match self {
            Attenuation::Gain1_6 => 6,
            Attenuation::Gain1_4 => 4,
            Attenuation::Gain1_2 => 2,
            Attenuation::Gain1 => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum BitWidth {
    Bits8,
    Bits10,
    Bits12,
    Bits14,
}

impl BitWidth {
    pub fn bits(self) -> u32 {
        match self {
            BitWidth::Bits8 => 8,
            BitWidth::Bits10 => 10,
            BitWidth::Bits12 => 12,
            BitWidth::Bits14 => 14,
        }
    }
}

/// How the ADC is set up for a measurement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub struct AdcProfile {
    pub attenuation: Attenuation,
    pub width: BitWidth,
    /// Nominal reference voltage
    pub reference_mv: u32,
}

impl AdcProfile {
    /// 0.6 V internal reference at gain 1/6 gives a 3.6 V input range, enough
    /// for a divider fed from 3.3 V.
    pub const DIVIDER: AdcProfile = AdcProfile {
        attenuation: Attenuation::Gain1_6,
        width: BitWidth::Bits12,
        reference_mv: 600,
    };

    pub fn full_scale_mv(&self) -> u32 {
        self.reference_mv * self.attenuation.divisor()
    }

    pub fn saadc_config(&self) -> SaadcConfig {
        let gain = match self.attenuation {
            Attenuation::Gain1_6 => Gain::GAIN1_6,
            Attenuation::Gain1_4 => Gain::GAIN1_4,
            Attenuation::Gain1_2 => Gain::GAIN1_2,
            Attenuation::Gain1 => Gain::GAIN1,
        };
        let resolution = match self.width {
            BitWidth::Bits8 => Resolution::_8BIT,
            BitWidth::Bits10 => Resolution::_10BIT,
            BitWidth::Bits12 => Resolution::_12BIT,
            BitWidth::Bits14 => Resolution::_14BIT,
        };
        SaadcConfig {
            resolution,
            // Averaging is done in software over the whole sample window
            oversample: Oversample::BYPASS,
            reference: Reference::INTERNAL,
            gain,
            resistor: Resistor::BYPASS,
            // The divider has a high source impedance
            time: Time::_40US,
        }
    }
}

/// An ADC that can be brought up for a given [`AdcProfile`].
pub trait ConfigureAdc: Sized {
    /// What the ADC is built from, usually the PAC peripheral
    type Peripheral;

    fn configure(peripheral: Self::Peripheral, profile: &AdcProfile) -> Self;
}

impl ConfigureAdc for Saadc {
    type Peripheral = SAADC;

    fn configure(saadc: SAADC, profile: &AdcProfile) -> Self {
        Saadc::new(saadc, profile.saadc_config())
    }
}

/// Where the characterization of a [`Calibration`] came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum CalibrationSource {
    TwoPoint,
    ReferenceTrim,
    DefaultReference,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum CalibrationError {
    /// No calibration scheme is available on this board
    NotSupported,
    /// The only available data was measured with a different profile
    ProfileMismatch,
}

pub trait Calibration {
    fn source(&self) -> CalibrationSource;

    /// Effective reference voltage the characterization is based on.
    fn reference_mv(&self) -> u32;

    fn raw_to_millivolts(&self, raw: u16) -> u32;
}

pub trait CalibrationProvider {
    type Handle: Calibration;

    fn characterize(&mut self, profile: &AdcProfile) -> Result<Self::Handle, CalibrationError>;
}

/// `mv = raw * coeff_a / 2^16 + coeff_b`
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub struct LinearCalibration {
    source: CalibrationSource,
    reference_mv: u32,
    coeff_a: u32,
    coeff_b: i32,
}

impl LinearCalibration {
    fn from_reference(source: CalibrationSource, reference_mv: u32, profile: &AdcProfile) -> Self {
        let full_scale_mv = AdcProfile {
            reference_mv,
            ..*profile
        }
        .full_scale_mv();
        // RESULT = V * GAIN / REFERENCE * 2^RESOLUTION
        let coeff_a = full_scale_mv << (16 - profile.width.bits());
        LinearCalibration {
            source,
            reference_mv,
            coeff_a,
            coeff_b: 0,
        }
    }

    fn from_two_point(trim: &TwoPointTrim) -> Option<Self> {
        let (low_raw, low_mv) = trim.low;
        let (high_raw, high_mv) = trim.high;
        if high_raw <= low_raw || high_mv <= low_mv {
            return None;
        }
        let coeff_a = ((high_mv - low_mv) << 16) / (high_raw - low_raw) as u32;
        let coeff_b = low_mv as i32 - scale(low_raw, coeff_a) as i32;
        Some(LinearCalibration {
            source: CalibrationSource::TwoPoint,
            reference_mv: trim.profile.reference_mv,
            coeff_a,
            coeff_b,
        })
    }
}

fn scale(raw: u16, coeff_a: u32) -> u32 {
    ((raw as u64 * coeff_a as u64 + (1 << 15)) >> 16) as u32
}

impl Calibration for LinearCalibration {
    fn source(&self) -> CalibrationSource {
        self.source
    }

    fn reference_mv(&self) -> u32 {
        self.reference_mv
    }

    fn raw_to_millivolts(&self, raw: u16) -> u32 {
        let mv = scale(raw, self.coeff_a) as i64 + self.coeff_b as i64;
        mv.max(0) as u32
    }
}

/// Two codes read back with known voltages on the input, measured with `profile`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub struct TwoPointTrim {
    pub profile: AdcProfile,
    pub low: (u16, u32),
    pub high: (u16, u32),
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FactoryCalibration {
    two_point: Option<TwoPointTrim>,
    reference_trim_mv: Option<u32>,
    default_reference_mv: Option<u32>,
}

impl FactoryCalibration {
    /// Falls back to `default_reference_mv` when nothing better is known.
    pub const fn new(default_reference_mv: u32) -> Self {
        FactoryCalibration {
            two_point: None,
            reference_trim_mv: None,
            default_reference_mv: Some(default_reference_mv),
        }
    }

    /// A provider that cannot characterize anything.
    pub const fn unsupported() -> Self {
        FactoryCalibration {
            two_point: None,
            reference_trim_mv: None,
            default_reference_mv: None,
        }
    }

    pub const fn with_reference_trim(mut self, reference_mv: u32) -> Self {
        self.reference_trim_mv = Some(reference_mv);
        self
    }

    pub const fn with_two_point(mut self, trim: TwoPointTrim) -> Self {
        self.two_point = Some(trim);
        self
    }

    fn log_support(&self) {
        if self.two_point.is_some() {
            defmt::info!("Two Point calibration: supported");
        } else {
            defmt::info!("Two Point calibration: NOT supported");
        }
        if self.reference_trim_mv.is_some() {
            defmt::info!("Reference trim: supported");
        } else {
            defmt::info!("Reference trim: NOT supported");
        }
    }
}

impl CalibrationProvider for FactoryCalibration {
    type Handle = LinearCalibration;

    fn characterize(&mut self, profile: &AdcProfile) -> Result<LinearCalibration, CalibrationError> {
        self.log_support();

        let mut mismatched = false;
        if let Some(trim) = &self.two_point {
            if trim.profile == *profile {
                match LinearCalibration::from_two_point(trim) {
                    Some(calibration) => return Ok(calibration),
                    None => defmt::warn!("Two Point calibration data is inconsistent, ignoring it"),
                }
            } else {
                mismatched = true;
                defmt::warn!(
                    "Two Point calibration was taken with {}, not {}",
                    trim.profile,
                    profile
                );
            }
        }

        if let Some(reference_mv) = self.reference_trim_mv {
            return Ok(LinearCalibration::from_reference(
                CalibrationSource::ReferenceTrim,
                reference_mv,
                profile,
            ));
        }

        if let Some(reference_mv) = self.default_reference_mv {
            return Ok(LinearCalibration::from_reference(
                CalibrationSource::DefaultReference,
                reference_mv,
                profile,
            ));
        }

        if mismatched {
            Err(CalibrationError::ProfileMismatch)
        } else {
            Err(CalibrationError::NotSupported)
        }
    }
}
