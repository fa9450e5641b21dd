#![no_main]
#![no_std]

use embedded_hal::blocking::delay::DelayMs;
use nrf52840_hal::{
    self as hal,
    gpio::{p0::Parts as P0Parts, Level},
    pwm::{self, Pwm},
    saadc::Saadc,
    Timer,
};

use thermistor::{
    self as _, // global logger + panicking-behavior + memory layout
    config,
    peripherals::{
        calibration::{AdcProfile, FactoryCalibration},
        led::{PwmLEDControl, TemperatureIndicator, ToggleLED},
        thermistor::{Error, Thermistor, Vout},
    },
};

#[cortex_m_rt::entry]
fn main() -> ! {
    defmt::println!("Thermistor indicator");

    let board = hal::pac::Peripherals::take().unwrap();
    let pins = P0Parts::new(board.P0);
    let mut timer = Timer::new(board.TIMER0);

    defmt::info!("Setting up thermistor on AIN5");
    let ain = pins.p0_29.into_floating_input();
    let mut calibration = FactoryCalibration::new(config::DEFAULT_VREF_MV);
    let mut thermistor: Thermistor<Saadc, i16, _, _> = defmt::unwrap!(Thermistor::new(
        board.SAADC,
        ain,
        config::THERMISTOR_CONFIG,
        AdcProfile::DIVIDER,
        &mut calibration
    ));
    defmt::info!("Thermistor: {}", thermistor.config());

    // We're using a common anode RGB LED, so it's active low
    let pwm = Pwm::new(board.PWM0);
    pwm.set_output_pin(pwm::Channel::C0, pins.p0_03.into_push_pull_output(Level::High).degrade())
        .set_output_pin(pwm::Channel::C1, pins.p0_04.into_push_pull_output(Level::High).degrade())
        .set_output_pin(pwm::Channel::C2, pins.p0_28.into_push_pull_output(Level::High).degrade());
    let mut rgb_led = PwmLEDControl::new(pwm, config::INDICATOR_RANGE);
    let mut heartbeat = ToggleLED::new(pins.p0_13.degrade());
    let mut indicators: [&mut dyn TemperatureIndicator; 2] = [&mut rgb_led, &mut heartbeat];

    defmt::info!("Entering loop");
    loop {
        match thermistor.get_reading() {
            Ok(reading) => {
                defmt::info!(
                    "Voltage: {=u32} mV\tTemperature: {=f32} C / {=f32} F\tResistance: {=f32} ohm",
                    reading.vout_mv,
                    reading.celsius,
                    reading.fahrenheit(),
                    reading.resistance
                );
                for indicator in indicators.iter_mut() {
                    indicator.indicate(reading.celsius);
                }
            }
            Err(Error::Uncalibrated) => {
                if let Some(Vout::Uncalibrated { raw }) = thermistor.vout() {
                    defmt::warn!("Uncalibrated ADC, raw average {=u16}", raw);
                }
            }
            Err(err) => defmt::warn!("Reading failed: {}", err),
        }

        timer.delay_ms(config::POLL_INTERVAL_MS);
    }
}
