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
//! Module for [`BeatDetector`].

use crate::band_history::BandNormalizer;
use crate::beat_gate::BeatGate;
use crate::clock::Clock;
use crate::config::{DetectorConfig, InvalidConfigError, Sigmoid};
use crate::loudness::biased_average_loudness;
use crate::tempo::{poll_tempo, TempoSource};
use core::time::Duration;
use thiserror::Error;

/// Errors of [`BeatDetector::try_ingest_and_detect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DetectError {
    #[error("frame has {len} bands but at least {required} are required")]
    FrameTooShort { len: usize, required: usize },
}

/// Beat detector following the properties described in the
/// [module description].
///
/// One instance belongs to exactly one audio stream. It owns all history and
/// gate state, so independent instances never influence each other.
///
/// ## Example
/// ```rust
/// use band_beat_detector::{BeatDetector, DetectorConfig, FrameClock, NoTempo};
/// use core::time::Duration;
///
/// let mut detector = BeatDetector::new(
///     DetectorConfig::default(),
///     FrameClock::new(Duration::from_millis(33)),
///     NoTempo,
/// )
/// .unwrap();
///
/// // Regularly call this from the audio callback with the latest frame.
/// let frame = [0.2_f32; 128];
/// let is_beat = detector.ingest_and_detect(&frame);
/// assert!(!is_beat);
/// ```
///
/// [module description]: crate
#[derive(Debug)]
pub struct BeatDetector<C, T> {
    // read-only fields
    sigmoid: Sigmoid,
    clock: C,
    tempo: T,
    // mutable fields
    normalizer: BandNormalizer,
    gate: BeatGate,
}

impl<C: Clock, T: TempoSource> BeatDetector<C, T> {
    /// Creates a new beat detector.
    ///
    /// # Arguments
    /// - `config`: Bands, thresholds, and timing. Validated once here.
    /// - `clock`: Time source for the cooldown, polled once per frame.
    /// - `tempo`: Optional tempo hint, polled once per frame.
    pub fn new(config: DetectorConfig, clock: C, tempo: T) -> Result<Self, InvalidConfigError> {
        let config = config.validate()?;
        log::debug!("Creating beat detector: {config:?}");
        Ok(Self {
            sigmoid: config.sigmoid(),
            clock,
            tempo,
            normalizer: BandNormalizer::new(
                config.bands(),
                config.history_len(),
                config.input_scale(),
            ),
            gate: BeatGate::new(&config),
        })
    }

    /// Consumes the latest frame of band energies and returns whether it is a
    /// beat. This function is supposed to be called exactly once per frame,
    /// in arrival order, e.g., from the audio callback of the host.
    ///
    /// # Panics
    /// If the frame doesn't cover all analyzed bands. See
    /// [`Self::try_ingest_and_detect`] for a checked version. Debug builds
    /// also panic on a non-finite energy in an analyzed band, see
    /// [`BandNormalizer::ingest`].
    pub fn ingest_and_detect(&mut self, frame: &[f32]) -> bool {
        let now = self.clock.now();
        self.ingest_and_detect_at(frame, now)
    }

    /// Like [`Self::ingest_and_detect`] but returns an error for frames that
    /// are too short instead of panicking. The frame is not consumed then.
    pub fn try_ingest_and_detect(&mut self, frame: &[f32]) -> Result<bool, DetectError> {
        let required = self.normalizer.bands().end;
        if frame.len() < required {
            return Err(DetectError::FrameTooShort {
                len: frame.len(),
                required,
            });
        }
        Ok(self.ingest_and_detect(frame))
    }

    /// Like [`Self::ingest_and_detect`] but with an explicit timestamp
    /// instead of the clock, e.g., for offline analysis. Timestamps must be
    /// monotonic.
    pub fn ingest_and_detect_at(&mut self, frame: &[f32], now: Duration) -> bool {
        self.normalizer.ingest(frame);
        let loudness = biased_average_loudness(&self.normalizer, &self.sigmoid);
        let tempo = poll_tempo(&self.tempo);
        self.gate.update(loudness, now, tempo)
    }

    /// Loudness sample of the most recent frame in `[0, 1]`. Useful for
    /// loudness meters.
    #[must_use]
    pub const fn loudness(&self) -> f32 {
        self.gate.last_loudness()
    }

    /// Access to the rolling per-band histories.
    #[must_use]
    pub const fn normalizer(&self) -> &BandNormalizer {
        &self.normalizer
    }

    /// Access to the gate state.
    #[must_use]
    pub const fn gate(&self) -> &BeatGate {
        &self.gate
    }

    /// Access to the tempo source.
    #[must_use]
    pub const fn tempo_source(&self) -> &T {
        &self.tempo
    }

    /// Forgets all history and gate state, e.g., when the song changes.
    pub fn reset(&mut self) {
        log::debug!("Resetting beat detector");
        self.normalizer.reset();
        self.gate.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FrameClock;
    use crate::config::{Cooldown, InputScale, DEFAULT_COOLDOWN_FRAMES};
    use crate::tempo::{NoTempo, SharedTempo};
    use crate::test_utils::frames;
    use alloc::sync::Arc;
    use std::vec::Vec;

    /// 100 frames per second make the math in the tests easy.
    const FRAME_PERIOD: Duration = Duration::from_millis(10);
    const W: usize = 30;

    fn detector<T: TempoSource>(config: DetectorConfig, tempo: T) -> BeatDetector<FrameClock, T> {
        BeatDetector::new(config, FrameClock::new(FRAME_PERIOD), tempo).unwrap()
    }

    fn default_detector() -> BeatDetector<FrameClock, NoTempo> {
        detector(DetectorConfig::default(), NoTempo)
    }

    /// Feeds all frames and returns the indices of the frames that were
    /// detected as beats.
    fn simulate<C: Clock, T: TempoSource>(
        detector: &mut BeatDetector<C, T>,
        frames: &[Vec<f32>],
    ) -> Vec<usize> {
        frames
            .iter()
            .enumerate()
            .filter(|(_, frame)| detector.ingest_and_detect(frame))
            .map(|(index, _)| index)
            .collect()
    }

    #[test]
    fn is_send_and_sync() {
        fn accept<I: Send + Sync>() {}

        accept::<BeatDetector<FrameClock, NoTempo>>();
        accept::<BeatDetector<FrameClock, Arc<SharedTempo>>>();
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = DetectorConfig {
            bands: 2..1,
            ..Default::default()
        };
        check!(BeatDetector::new(config, FrameClock::new(FRAME_PERIOD), NoTempo).is_err());
    }

    #[test]
    fn flat_signal_never_fires() {
        for level in [0.0, 0.3, 1.0] {
            let mut detector = default_detector();
            let stream = (0..500).map(|_| frames::flat(128, level)).collect::<Vec<_>>();
            check!(simulate(&mut detector, &stream).is_empty());
        }
    }

    #[test]
    fn first_loud_frame_does_not_fire() {
        let mut detector = default_detector();
        check!(!detector.ingest_and_detect(&frames::flat(128, 1.0)));
        check!(detector.loudness() < 0.001);
    }

    #[test]
    fn single_clean_pulse_fires_exactly_once() {
        let mut detector = default_detector();
        let stream = frames::pulse_train(3, 0.1, 0.9, W + 10, &[W]);
        check!(simulate(&mut detector, &stream) == [W]);
    }

    #[test]
    fn pulses_within_cooldown_are_suppressed() {
        let mut detector = default_detector();
        // 10 ms per frame, 300 ms cooldown
        let first = W;
        let pulses = [first, first + 10, first + 28, first + 30, first + 45];
        let stream = frames::pulse_train(3, 0.1, 0.9, first + 100, &pulses);
        check!(simulate(&mut detector, &stream) == [first, first + 30]);
    }

    #[test]
    fn mid_level_chatter_never_fires() {
        // Two bands in antiphase: the average ratio stays at 0.5, which is
        // neither quiet nor loud.
        let config = DetectorConfig {
            bands: 0..2,
            ..Default::default()
        };
        let mut detector = detector(config, NoTempo);
        let stream = (0..500)
            .map(|i| {
                if i % 2 == 0 {
                    std::vec![0.0, 1.0]
                } else {
                    std::vec![1.0, 0.0]
                }
            })
            .collect::<Vec<_>>();
        check!(simulate(&mut detector, &stream).is_empty());
        check!(detector.loudness() == 0.5);
    }

    #[test]
    fn frame_count_cooldown() {
        let config = DetectorConfig {
            cooldown: Cooldown::Frames(DEFAULT_COOLDOWN_FRAMES),
            ..Default::default()
        };
        let mut detector = detector(config, NoTempo);
        let first = W;
        // 7 quiet frames must lie in between two beats
        let pulses = [first, first + 6, first + 8, first + 12];
        let stream = frames::pulse_train(3, 0.1, 0.9, first + 40, &pulses);
        check!(simulate(&mut detector, &stream) == [first, first + 8]);
    }

    /// Pulses every 240 ms. A matching tempo hint lets all of them through,
    /// the fixed cooldown of 300 ms drops every second one.
    #[test]
    fn matching_tempo_is_more_permissive_than_cooldown() {
        let first = W;
        let pulses = (0..5).map(|i| first + i * 24).collect::<Vec<_>>();
        let stream = frames::pulse_train(3, 0.1, 0.9, first + 130, &pulses);

        let mut without_tempo = default_detector();
        check!(simulate(&mut without_tempo, &stream) == [pulses[0], pulses[2], pulses[4]]);

        let mut with_tempo = detector(DetectorConfig::default(), Some(240.0_f32));
        check!(simulate(&mut with_tempo, &stream) == pulses);
    }

    /// Pulses exactly on the 240 BPM grid (every 250 ms) or slightly behind
    /// it (every 260 ms) arrive when the confidence has just wrapped to zero.
    /// Only the first pulse fires, while the fixed cooldown lets every second
    /// pulse through.
    #[test]
    fn pulses_on_or_behind_tempo_grid_are_suppressed() {
        let first = W;
        for spacing in [25, 26] {
            let pulses = (0..5).map(|i| first + i * spacing).collect::<Vec<_>>();
            let stream = frames::pulse_train(3, 0.1, 0.9, first + 140, &pulses);

            let mut with_tempo = detector(DetectorConfig::default(), Some(240.0_f32));
            check!(simulate(&mut with_tempo, &stream) == [first]);
        }

        let pulses = (0..5).map(|i| first + i * 25).collect::<Vec<_>>();
        let stream = frames::pulse_train(3, 0.1, 0.9, first + 140, &pulses);
        let mut without_tempo = default_detector();
        check!(simulate(&mut without_tempo, &stream) == [pulses[0], pulses[2], pulses[4]]);
    }

    /// Pulses 500 ms apart. At 60 BPM, the confidence after 500 ms is only
    /// 0.25, so the second pulse is suppressed.
    #[test]
    fn slow_tempo_suppresses_early_pulse() {
        let first = W;
        let pulses = [first, first + 50, first + 90];
        let stream = frames::pulse_train(3, 0.1, 0.9, first + 100, &pulses);

        let mut without_tempo = default_detector();
        check!(simulate(&mut without_tempo, &stream) == [first, first + 50, first + 90]);

        let mut with_tempo = detector(DetectorConfig::default(), Some(60.0_f32));
        // 900 ms after the first beat: confidence 0.81
        check!(simulate(&mut with_tempo, &stream) == [first, first + 90]);
    }

    #[test]
    fn tempo_updates_between_frames_are_honored() {
        let tempo = Arc::new(SharedTempo::new());
        let mut detector = detector(DetectorConfig::default(), tempo.clone());
        let first = W;
        let pulses = [first, first + 24, first + 48];
        let stream = frames::pulse_train(3, 0.1, 0.9, first + 60, &pulses);

        let mut beats = Vec::new();
        for (index, frame) in stream.iter().enumerate() {
            if index == first + 30 {
                tempo.set(Some(240.0));
            }
            if detector.ingest_and_detect(frame) {
                beats.push(index);
            }
        }
        // The second pulse is still gated by the fixed cooldown.
        check!(beats == [first, first + 48]);
    }

    #[test]
    fn byte_scaled_input() {
        let config = DetectorConfig {
            input_scale: InputScale::Byte,
            ..Default::default()
        };
        let mut detector = detector(config, NoTempo);
        let stream = frames::pulse_train(3, 25.0, 230.0, W + 10, &[W]);
        check!(simulate(&mut detector, &stream) == [W]);
    }

    #[test]
    fn try_ingest_rejects_short_frames() {
        let mut detector = default_detector();
        check!(
            detector.try_ingest_and_detect(&[0.0, 0.0])
                == Err(DetectError::FrameTooShort {
                    len: 2,
                    required: 3
                })
        );
        check!(detector.normalizer().total_consumed_frames() == 0);
        check!(detector.try_ingest_and_detect(&[0.0; 3]) == Ok(false));
    }

    #[test]
    fn explicit_timestamps() {
        let mut detector = default_detector();
        for i in 0..W as u64 {
            check!(!detector.ingest_and_detect_at(&frames::flat(3, 0.1), Duration::from_secs(i)));
        }
        check!(detector.ingest_and_detect_at(&frames::flat(3, 0.9), Duration::from_secs(100)));
        check!(detector.gate().last_beat_at() == Some(Duration::from_secs(100)));
    }

    #[test]
    fn reset_starts_over() {
        let mut detector = default_detector();
        let stream = frames::pulse_train(3, 0.1, 0.9, W + 1, &[W]);
        check!(simulate(&mut detector, &stream) == [W]);

        detector.reset();
        check!(detector.normalizer().total_consumed_frames() == 0);
        check!(detector.gate().last_beat_at() == None);
        // The clock keeps running, so no cooldown applies to the new song.
        check!(simulate(&mut detector, &stream) == [W]);
    }
}
