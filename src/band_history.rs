/*
MIT License

Copyright (c) 2024 Philipp Schuster

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! Helpers for per-band history bookkeeping.
//!
//! Absolute energy thresholds do not generalize across songs or genres. We
//! therefore keep a short history of recent energies per band and rate each
//! new value relative to the min/max range found in that history.
//!
//! See [`BandNormalizer`].

use crate::config::InputScale;
use alloc::vec::Vec;
use core::ops::Range;
use ringbuffer::{AllocRingBuffer, RingBuffer};

/// Rolling per-band normalizer.
///
/// Keeps a bounded FIFO history of the last `W` energies of every analyzed
/// band. Users are supposed to call [`Self::ingest`] exactly once per frame
/// before asking for [`Self::ratio`]s of that frame.
#[derive(Debug)]
pub struct BandNormalizer {
    // read-only properties
    bands: Range<usize>,
    input_scale: InputScale,

    // mutable properties
    /// One history per band in `bands`, i.e., `histories[0]` belongs to band
    /// `bands.start`.
    histories: Vec<AllocRingBuffer<f32>>,
    total_consumed_frames: usize,
}

impl BandNormalizer {
    /// Creates a new normalizer for the given bands with a history of
    /// `history_len` frames per band.
    #[must_use]
    pub fn new(bands: Range<usize>, history_len: usize, input_scale: InputScale) -> Self {
        assert!(!bands.is_empty(), "must analyze at least one band");
        assert!(history_len > 0, "history must not be empty");
        let histories = bands
            .clone()
            .map(|_| AllocRingBuffer::new(history_len))
            .collect::<Vec<_>>();
        Self {
            bands,
            input_scale,
            histories,
            total_consumed_frames: 0,
        }
    }

    /// Appends the analyzed bands of a new frame to their histories. Once a
    /// history is full, the oldest value is evicted.
    ///
    /// # Panics
    /// If the frame doesn't cover all analyzed bands. This is a caller
    /// contract violation. In debug builds, also if an analyzed energy is
    /// NaN or infinite. Release builds accept such a value; the affected band
    /// then reports a NaN ratio for that frame, which counts as neither quiet
    /// nor loud.
    pub fn ingest(&mut self, frame: &[f32]) {
        assert!(
            frame.len() >= self.bands.end,
            "frame has {} bands but bands up to {} are analyzed",
            frame.len(),
            self.bands.end
        );

        frame[self.bands.clone()]
            .iter()
            .zip(self.histories.iter_mut())
            .for_each(|(&energy, history)| {
                let energy = self.input_scale.normalize(energy);
                debug_assert!(energy.is_finite(), "band energy {energy} is not finite");
                history.push(energy);
            });

        self.total_consumed_frames += 1;
    }

    /// Returns the latest energy of the band rescaled to `[0, 1]` against the
    /// min/max range of the band's recent history.
    ///
    /// A history with zero spread, i.e., a flat signal, yields exactly `0`.
    /// This reports "no change" instead of dividing by zero.
    ///
    /// # Panics
    /// If `band` is not analyzed or no frame has been ingested yet.
    #[must_use]
    pub fn ratio(&self, band: usize) -> f32 {
        let history = self.history(band);
        assert!(!history.is_empty(), "ratio of band {band} requested before first frame");

        let latest = history.back().copied().unwrap_or_default();
        let (min, max) = history
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), &value| {
                (min.min(value), max.max(value))
            });

        let spread = max - min;
        if spread == 0.0 {
            return 0.0;
        }

        let ratio = (latest - min) / spread;
        debug_assert!((0.0..=1.0).contains(&ratio));
        ratio
    }

    /// Returns the mean of [`Self::ratio`] over all analyzed bands.
    #[must_use]
    pub fn average_ratio(&self) -> f32 {
        let sum = self.bands.clone().map(|band| self.ratio(band)).sum::<f32>();
        sum / self.bands.len() as f32
    }

    /// Returns the history of the given band, oldest value first.
    ///
    /// # Panics
    /// If `band` is not analyzed.
    #[must_use]
    pub fn history(&self, band: usize) -> &AllocRingBuffer<f32> {
        assert!(
            self.bands.contains(&band),
            "band {band} is not in the analyzed range {:?}",
            self.bands
        );
        &self.histories[band - self.bands.start]
    }

    /// The analyzed bands.
    #[must_use]
    pub fn bands(&self) -> Range<usize> {
        self.bands.clone()
    }

    /// Number of frames consumed since creation or the last reset.
    #[must_use]
    pub const fn total_consumed_frames(&self) -> usize {
        self.total_consumed_frames
    }

    /// Forgets all history.
    pub fn reset(&mut self) {
        self.histories.iter_mut().for_each(|history| history.clear());
        self.total_consumed_frames = 0;
    }
}
