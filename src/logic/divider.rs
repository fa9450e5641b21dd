use super::DomainError;

/// Resistance of the lower divider leg, in ohms.
///
/// The serial resistor sits between `vsource` and the measuring point, the
/// thermistor between the measuring point and ground:
/// `Rt = R1 * Vout / (Vs - Vout)`.
pub fn thermistor_resistance(
    serial_resistance: f32,
    vsource: f32,
    vout: f32,
) -> Result<f32, DomainError> {
    if vout < 0. {
        return Err(DomainError::NegativeVoltage);
    }
    // Also rejects NaN
    if !(vout < vsource) {
        return Err(DomainError::VoutAtOrAboveSource);
    }
    Ok(serial_resistance * vout / (vsource - vout))
}
