use hal::{
    gpio::{Level, Output, Pin, PushPull},
    prelude::OutputPin,
    pwm::{Channel, Instance, Pwm},
};
use nrf52840_hal as hal;
use smart_leds::RGB8;

use crate::logic::colormap::{temperature_rgb, TemperatureRange};

/// Anything that can show a temperature to a human looking at the board.
pub trait TemperatureIndicator {
    fn indicate(&mut self, celsius: f32);
}

/// RGB LED on three PWM channels, colored through the temperature colormap.
pub struct PwmLEDControl<T: Instance> {
    pwm: Pwm<T>,
    range: TemperatureRange,
}

impl<T> PwmLEDControl<T>
where
    T: Instance,
{
    /// `pwm` must have the red, green and blue pins on channels 0, 1 and 2.
    pub fn new(pwm: Pwm<T>, range: TemperatureRange) -> Self {
        pwm.set_max_duty(255);
        PwmLEDControl { pwm, range }
    }

    pub fn set_color(&mut self, color: RGB8) {
        self.pwm.set_duty_on(Channel::C0, color.r as u16);
        self.pwm.set_duty_on(Channel::C1, color.g as u16);
        self.pwm.set_duty_on(Channel::C2, color.b as u16);
    }

    pub fn free(self) -> Pwm<T> {
        self.pwm
    }
}

impl<T> TemperatureIndicator for PwmLEDControl<T>
where
    T: Instance,
{
    fn indicate(&mut self, celsius: f32) {
        self.set_color(temperature_rgb(celsius, &self.range));
    }
}

/// Plain LED that changes state on every reading, a heartbeat for boards
/// without an RGB LED.
pub struct ToggleLED {
    pin: Pin<Output<PushPull>>,
    lit: bool,
}

impl ToggleLED {
    /// The LED is expected to be active low
    pub fn new<Mode>(pin: Pin<Mode>) -> Self {
        ToggleLED {
            pin: pin.into_push_pull_output(Level::High),
            lit: false,
        }
    }

    pub fn toggle(&mut self) {
        self.lit = !self.lit;
        if self.lit {
            self.pin.set_low().unwrap();
        } else {
            self.pin.set_high().unwrap();
        }
    }
}

impl TemperatureIndicator for ToggleLED {
    fn indicate(&mut self, _celsius: f32) {
        self.toggle();
    }
}
