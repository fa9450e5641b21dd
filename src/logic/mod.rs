pub mod averaging;
pub mod colormap;
pub mod divider;
pub mod steinhart;

/// Inputs for which the divider or the Beta equation has no physical answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum DomainError {
    /// The divider output is at or above its source voltage, the thermistor
    /// would have to be infinite or negative.
    VoutAtOrAboveSource,
    NegativeVoltage,
    /// `ln(R)` is undefined for `R <= 0`.
    NonPositiveResistance,
    /// The resistance is so low that `1/T` comes out non-positive.
    BelowAbsoluteZero,
}
