use micromath::F32Ext;

/// Running sum with Kahan error feedback.
///
/// Each addition computes the low-order bits that did not make it into the
/// running total and feeds them back into the next addition. With 12-bit
/// codes and 64 samples an `f32` would stay exact anyway, but the window is
/// not bounded by the type.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompensatedSum {
    sum: f32,
    compensation: f32,
    count: u32,
}

impl CompensatedSum {
    pub const fn new() -> Self {
        CompensatedSum {
            sum: 0.,
            compensation: 0.,
            count: 0,
        }
    }

    pub fn add(&mut self, value: f32) {
        let corrected = value - self.compensation;
        let total = self.sum + corrected;
        // (total - sum) is what actually got added, the difference to
        // `corrected` is what was rounded away
        self.compensation = (total - self.sum) - corrected;
        self.sum = total;
        self.count += 1;
    }

    pub fn sum(&self) -> f32 {
        self.sum
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Mean of everything added so far, `None` for an empty window.
    pub fn mean(&self) -> Option<f32> {
        if self.count == 0 {
            return None;
        }
        Some(self.sum / self.count as f32)
    }

    /// Mean rounded to the nearest raw ADC code.
    pub fn mean_code(&self) -> Option<u16> {
        self.mean()
            .map(|mean| mean.round().max(0.).min(u16::MAX as f32) as u16)
    }
}

impl Extend<f32> for CompensatedSum {
    fn extend<I: IntoIterator<Item = f32>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}
