use smart_leds::RGB8;

/// (red, green, blue, position) with every component in [0; 1]
type ColorSegment = (f32, f32, f32, f32);

#[rustfmt::skip]
const TEMP_COLORS: [ColorSegment; 4] = [
    // Cold is blue, comfortable is green, warm is yellow and the top of the
    // configured range is red. Positions are fractions of that range.
    (0., 0., 1., 0.),
    (0., 1., 0., (15. / 45.)),
    (1., 1., 0., (25. / 45.)),
    (1., 0., 0., 1.),
];

/// Span of temperatures, in degrees Celsius, that the colormap is stretched over.
#[derive(Clone, Copy, Debug, PartialEq, defmt::Format)]
pub struct TemperatureRange {
    pub min: f32,
    pub max: f32,
}

impl TemperatureRange {
    /// Where `celsius` falls inside the range, clamped to [0; 1].
    pub fn fraction(&self, celsius: f32) -> f32 {
        let span = self.max - self.min;
        if !(span > 0.) {
            return 0.;
        }
        ((celsius - self.min) / span).min(1.).max(0.)
    }
}

pub fn linear_position_interpolating_map(
    colors: &[ColorSegment],
    fraction: f32,
) -> (f32, f32, f32) {
    let mut below: Option<ColorSegment> = None;
    let mut above: Option<ColorSegment> = None;
    // Find the first position (4th component) that's greater than the fraction
    for color in colors {
        if fraction <= color.3 {
            above = Some(*color);
            break;
        }
        below = Some(*color);
    }
    let (below, above) = match (below, above) {
        // Inputs were faulty, come up with something generic
        (None, None) => ((0., 0., 0., 0.), (1., 1., 1., 1.)),
        (None, Some(x)) => (x, x),
        (Some(x), None) => (x, x),
        (Some(x), Some(y)) => (x, y),
    };

    let (r_below, g_below, b_below, loc_below) = below;
    let (r_above, g_above, b_above, loc_above) = above;

    let interpolation = if loc_above > loc_below {
        (fraction - loc_below) / (loc_above - loc_below)
    } else {
        0.
    };
    let interpolation = interpolation.min(1.).max(0.);

    let r_adjust = (r_above - r_below) * interpolation;
    let g_adjust = (g_above - g_below) * interpolation;
    let b_adjust = (b_above - b_below) * interpolation;

    (r_below + r_adjust, g_below + g_adjust, b_below + b_adjust)
}

fn fractions_to_rgb(colors: (f32, f32, f32)) -> RGB8 {
    let (r, g, b) = colors;
    RGB8::new((255. * r) as u8, (255. * g) as u8, (255. * b) as u8)
}

pub fn temp_map(fraction: f32) -> (f32, f32, f32) {
    linear_position_interpolating_map(&TEMP_COLORS, fraction)
}

pub fn temperature_rgb(celsius: f32, range: &TemperatureRange) -> RGB8 {
    fractions_to_rgb(temp_map(range.fraction(celsius)))
}
