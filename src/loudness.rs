//! Aggregates the per-band ratios of one frame into a single loudness sample.
//!
//! Band ratios alone are noisy from frame to frame. The logistic compression
//! pushes clearly quiet and clearly loud frames towards 0 and 1 and leaves a
//! narrow, sensitive transition in between. The edge detection of the
//! [`BeatGate`] relies on exactly that.
//!
//! [`BeatGate`]: crate::BeatGate

use crate::band_history::BandNormalizer;
use crate::config::Sigmoid;

impl Sigmoid {
    /// Applies the compression. The result is in `(0, 1)` and monotonic in
    /// `x`.
    #[inline]
    #[must_use]
    pub fn compress(&self, x: f32) -> f32 {
        1.0 / (1.0 + libm::expf(-self.steepness * x + self.offset))
    }
}

/// Averages the ratios of all analyzed bands of the latest ingested frame
/// and compresses the average.
#[inline]
#[must_use]
pub fn biased_average_loudness(normalizer: &BandNormalizer, sigmoid: &Sigmoid) -> f32 {
    sigmoid.compress(normalizer.average_ratio())
}
