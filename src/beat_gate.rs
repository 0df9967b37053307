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

//! Module for [`BeatGate`], the edge-triggered and rate-limited decision
//! whether a frame is a beat.
//!
//! A frame is a beat if all of the following hold:
//! 1. "It was quiet before...": the previous loudness was below the low
//!    threshold.
//! 2. "...and now it's loud.": the current loudness reaches the high
//!    threshold. The gap between both thresholds is a hysteresis, so a
//!    sustained mid-level signal can't chatter into repeated beats.
//! 3. The [`TimingGate`] is open.

use crate::config::{Cooldown, ValidConfig};
use crate::f32::{Bpm, UnitF32};
use core::time::Duration;

/// Time and frames since the last beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinceLastBeat {
    pub time: Duration,
    /// Frames processed between the last beat and the current frame.
    pub frames: u32,
}

/// Timing policy of the [`BeatGate`], selected per frame by whether a tempo
/// hint is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingGate {
    /// No tempo known: a hard minimum interval between two beats.
    Fixed(Cooldown),
    /// Tempo known: a confidence that ramps up parabolically from 0 right
    /// after a beat to 1 when the next beat is due. The effective cooldown
    /// thus scales with the tempo of the song.
    TempoAware {
        bpm: Bpm,
        confidence_threshold: UnitF32,
    },
}

impl TimingGate {
    /// Selects the policy for the current frame.
    #[must_use]
    pub const fn select(
        cooldown: Cooldown,
        confidence_threshold: UnitF32,
        tempo: Option<Bpm>,
    ) -> Self {
        match tempo {
            Some(bpm) => Self::TempoAware {
                bpm,
                confidence_threshold,
            },
            None => Self::Fixed(cooldown),
        }
    }

    /// Returns whether a beat may fire. Before the very first beat, the gate
    /// is always open.
    #[must_use]
    pub fn is_open(&self, since_last_beat: Option<SinceLastBeat>) -> bool {
        let Some(since) = since_last_beat else {
            return true;
        };
        match *self {
            Self::Fixed(Cooldown::Duration(cooldown)) => since.time >= cooldown,
            Self::Fixed(Cooldown::Frames(frames)) => since.frames > frames,
            Self::TempoAware {
                bpm,
                confidence_threshold,
            } => tempo_confidence(bpm, since.time) >= confidence_threshold.raw(),
        }
    }

    const fn is_tempo_aware(&self) -> bool {
        matches!(self, Self::TempoAware { .. })
    }
}

/// Confidence in `[0, 1)` that it is time for the next beat of a song with
/// the given tempo, `elapsed` after the last detected beat.
///
/// With `t = elapsed mod (60 / bpm)` this is `(bpm * t / 60)^2`: strict right
/// after a beat, increasingly permissive towards the next expected beat.
///
/// The confidence wraps to `0` exactly when the next beat is due. A pulse
/// that lands exactly on the tempo grid, or slightly after it, is therefore
/// rejected. Only pulses that arrive somewhat early, i.e., in the last part
/// of the beat period, pass the gate.
#[must_use]
pub fn tempo_confidence(bpm: Bpm, elapsed: Duration) -> f32 {
    let t = elapsed.as_secs_f32() % bpm.period_secs();
    let x = bpm.raw() * t / 60.0;
    x * x
}

/// Stateful beat decision. See module description.
#[derive(Debug, Clone)]
pub struct BeatGate {
    // read-only properties
    threshold_low: UnitF32,
    threshold_high: UnitF32,
    cooldown: Cooldown,
    confidence_threshold: UnitF32,

    // mutable properties
    /// Loudness of the previous frame. Initially `0`, i.e., "was quiet".
    last_loudness: f32,
    last_beat_at: Option<Duration>,
    frames_since_last_beat: Option<u32>,
    /// Whether the previous frame used the tempo-aware policy.
    was_tempo_aware: bool,
}

impl BeatGate {
    #[must_use]
    pub fn new(config: &ValidConfig) -> Self {
        Self {
            threshold_low: config.threshold_low(),
            threshold_high: config.threshold_high(),
            cooldown: config.cooldown(),
            confidence_threshold: config.confidence_threshold(),
            last_loudness: 0.0,
            last_beat_at: None,
            frames_since_last_beat: None,
            was_tempo_aware: false,
        }
    }

    /// Consumes the loudness of the current frame and returns whether it is a
    /// beat. Must be called exactly once per frame.
    ///
    /// `now` is the monotonic time of the frame and `tempo` the tempo hint
    /// snapshot for this frame.
    pub fn update(&mut self, loudness: f32, now: Duration, tempo: Option<Bpm>) -> bool {
        let gate = TimingGate::select(self.cooldown, self.confidence_threshold, tempo);
        if gate.is_tempo_aware() != self.was_tempo_aware {
            log::debug!("Switching timing gate to {gate:?}");
            self.was_tempo_aware = gate.is_tempo_aware();
        }

        let was_quiet_before = self.last_loudness < self.threshold_low.raw();
        let is_loud_now = loudness >= self.threshold_high.raw();
        let is_beat =
            was_quiet_before && is_loud_now && gate.is_open(self.since_last_beat(now));

        log::trace!(
            "loudness={loudness:.3} (previous={:.3}), beat={is_beat}",
            self.last_loudness
        );

        if is_beat {
            log::debug!("Beat at {now:?} (loudness={loudness:.3})");
            self.last_beat_at = Some(now);
            self.frames_since_last_beat = Some(0);
        } else {
            self.frames_since_last_beat = self.frames_since_last_beat.map(|n| n.saturating_add(1));
        }

        self.last_loudness = loudness;
        is_beat
    }

    /// Time and frames since the last beat, or `None` if there was no beat
    /// yet.
    #[must_use]
    pub fn since_last_beat(&self, now: Duration) -> Option<SinceLastBeat> {
        let last_beat_at = self.last_beat_at?;
        Some(SinceLastBeat {
            // saturating: a clock going backwards counts as "just now"
            time: now.saturating_sub(last_beat_at),
            frames: self.frames_since_last_beat.unwrap_or_default(),
        })
    }

    /// Loudness of the most recent frame.
    #[must_use]
    pub const fn last_loudness(&self) -> f32 {
        self.last_loudness
    }

    #[must_use]
    pub const fn last_beat_at(&self) -> Option<Duration> {
        self.last_beat_at
    }

    #[must_use]
    pub const fn frames_since_last_beat(&self) -> Option<u32> {
        self.frames_since_last_beat
    }

    /// Goes back to the initial state. The configuration is kept.
    pub fn reset(&mut self) {
        self.last_loudness = 0.0;
        self.last_beat_at = None;
        self.frames_since_last_beat = None;
        self.was_tempo_aware = false;
    }
}
