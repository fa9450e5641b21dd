#![no_std]
#![no_main]

use thermistor as _; // memory layout + panic handler

use embedded_hal::adc::{Channel, OneShot};
use thermistor::peripherals::calibration::{
    AdcProfile, BitWidth, CalibrationSource, ConfigureAdc, FactoryCalibration,
    LinearCalibration, TwoPointTrim,
};
use thermistor::peripherals::thermistor::{Error, Thermistor, ThermistorConfig, Vout};

/// A 100k/3950 NTC against 100k from 3.3 V, seen by an ADC with a 3.6 V
/// input range and the resolution it was configured with.
pub struct DividerAdc {
    celsius: f64,
    bits: u32,
}

impl DividerAdc {
    fn at(celsius: f64) -> Self {
        DividerAdc { celsius, bits: 0 }
    }
}

impl ConfigureAdc for DividerAdc {
    type Peripheral = DividerAdc;

    fn configure(adc: DividerAdc, profile: &AdcProfile) -> Self {
        DividerAdc {
            bits: profile.width.bits(),
            ..adc
        }
    }
}

pub struct Ain5;

impl Channel<DividerAdc> for Ain5 {
    type ID = u8;

    fn channel() -> u8 {
        5
    }
}

impl OneShot<DividerAdc, u16, Ain5> for DividerAdc {
    type Error = ();

    fn read(&mut self, _pin: &mut Ain5) -> nb::Result<u16, ()> {
        let kelvin = self.celsius + 273.15;
        let resistance = 100_000. * libm::exp(3950. * (1. / kelvin - 1. / 298.15));
        let vout = 3300. * resistance / (resistance + 100_000.);
        let full_scale = (1_u32 << self.bits) as f64;
        Ok(libm::round(vout * full_scale / 3600.) as u16)
    }
}

const CONFIG: ThermistorConfig = ThermistorConfig {
    serial_resistance: 100_000.,
    nominal_resistance: 100_000.,
    nominal_temperature: 25.,
    beta_val: 3950.,
    vsource: 3300.,
};

type DividerThermistor = Thermistor<DividerAdc, u16, Ain5, LinearCalibration>;

fn thermistor_at(celsius: f64) -> DividerThermistor {
    DividerThermistor::new(
        DividerAdc::at(celsius),
        Ain5,
        CONFIG,
        AdcProfile::DIVIDER,
        &mut FactoryCalibration::new(600),
    )
    .unwrap()
}

#[defmt_test::tests]
mod tests {
    use defmt::assert;
    use micromath::F32Ext;

    use super::*;

    #[test]
    fn recovers_divider_temperature() {
        for celsius in [-10., 0., 25., 30., 60., 85.] {
            let mut thermistor = thermistor_at(celsius);
            let measured = thermistor.get_celsius().unwrap();
            assert!(libm::fabs(measured as f64 - celsius) < 0.1);
        }
    }

    #[test]
    fn keeps_last_vout_and_resistance() {
        let mut thermistor = thermistor_at(25.);
        assert!(thermistor.vout().is_none());
        assert!(thermistor.t_resistance().is_none());

        let reading = thermistor.get_reading().unwrap();
        assert!(thermistor.vout() == Some(Vout::Calibrated(1650)));
        assert!(reading.vout_mv == 1650);
        assert!(thermistor.t_resistance() == Some(reading.resistance));
        assert!((reading.resistance - 100_000.).abs() < 1.);
        assert!((reading.fahrenheit() - 77.).abs() < 0.01);
    }

    #[test]
    fn ten_bit_profile_reads_in_ten_bits() {
        let profile = AdcProfile {
            width: BitWidth::Bits10,
            ..AdcProfile::DIVIDER
        };
        for celsius in [-10., 0., 25., 30., 60., 85.] {
            let mut thermistor = DividerThermistor::new(
                DividerAdc::at(celsius),
                Ain5,
                CONFIG,
                profile,
                &mut FactoryCalibration::new(600),
            )
            .unwrap();
            let measured = thermistor.get_celsius().unwrap();
            assert!(libm::fabs(measured as f64 - celsius) < 0.1);
        }

        let mut thermistor = DividerThermistor::new(
            DividerAdc::at(25.),
            Ain5,
            CONFIG,
            profile,
            &mut FactoryCalibration::unsupported(),
        )
        .unwrap();
        // 1650 mV of 3600 mV in 10 bits
        assert!(thermistor.read_vout() == Ok(Vout::Uncalibrated { raw: 469 }));
    }

    #[test]
    fn warmer_reads_warmer() {
        let cold = thermistor_at(10.).get_celsius().unwrap();
        let warm = thermistor_at(40.).get_celsius().unwrap();
        assert!(cold < warm);
    }

    #[test]
    fn independent_instances() {
        let mut cold = thermistor_at(5.);
        let mut hot = thermistor_at(70.);
        let hot_reading = hot.get_reading().unwrap();
        let cold_reading = cold.get_reading().unwrap();
        assert!(cold_reading.resistance > hot_reading.resistance);
        assert!(cold.vout() != hot.vout());
    }

    #[test]
    fn two_point_calibration_is_used() {
        let mut provider = FactoryCalibration::unsupported().with_two_point(TwoPointTrim {
            profile: AdcProfile::DIVIDER,
            low: (0, 0),
            high: (4096, 3600),
        });
        let mut thermistor = DividerThermistor::new(
            DividerAdc::at(25.),
            Ain5,
            CONFIG,
            AdcProfile::DIVIDER,
            &mut provider,
        )
        .unwrap();
        assert!(thermistor.calibration_source() == Some(CalibrationSource::TwoPoint));
        assert!((thermistor.get_celsius().unwrap() - 25.).abs() < 0.1);
    }

    #[test]
    fn degraded_calibration_keeps_reading() {
        let mut thermistor = DividerThermistor::new(
            DividerAdc::at(25.),
            Ain5,
            CONFIG,
            AdcProfile::DIVIDER,
            &mut FactoryCalibration::unsupported(),
        )
        .unwrap();
        assert!(!thermistor.is_calibrated());
        assert!(thermistor.read_vout() == Ok(Vout::Uncalibrated { raw: 1877 }));
        assert!(thermistor.get_celsius() == Err(Error::Uncalibrated));
        // The reading itself still went through
        assert!(thermistor.vout() == Some(Vout::Uncalibrated { raw: 1877 }));
    }

    #[test]
    fn source_below_divider_output_is_a_domain_error() {
        let config = ThermistorConfig {
            vsource: 1000.,
            ..CONFIG
        };
        let mut thermistor = DividerThermistor::new(
            DividerAdc::at(25.),
            Ain5,
            config,
            AdcProfile::DIVIDER,
            &mut FactoryCalibration::new(600),
        )
        .unwrap();
        assert!(matches!(thermistor.get_celsius(), Err(Error::Domain(_))));
    }

    #[test]
    fn release_hands_back_the_adc() {
        let thermistor = thermistor_at(25.);
        assert!(thermistor.channel() == 5);
        let (adc, _pin) = thermistor.release();
        assert!(adc.celsius == 25.);
    }
}
