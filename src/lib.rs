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

//! band-beat-detector detects beats in a stream of per-frame frequency-band
//! energies, as delivered by audio visualizer hosts (typically 64 bands per
//! channel, 30 or more frames per second). It does no frequency analysis
//! itself. It is a library written in Rust that is `no_std`-compatible but
//! needs `alloc`.
//!
//! The result of each frame is a simple "beat or not", good enough to drive
//! discrete visual reactions such as a sprite flip.
//!
//! # How it works
//!
//! Per frame:
//! 1. [`BandNormalizer`]: every analyzed band is rated relative to the
//!    min/max range of its recent history. This makes detection independent
//!    of the overall loudness of the song.
//! 2. [`biased_average_loudness`]: the ratios are averaged and compressed by
//!    a [`Sigmoid`] towards "clearly quiet" and "clearly loud".
//! 3. [`BeatGate`]: a beat is a rising edge from quiet to loud, but only if
//!    the [`TimingGate`] is open. Without a tempo hint, this is a fixed
//!    cooldown. With a tempo hint from a [`TempoSource`], the effective
//!    cooldown follows the tempo of the song.
//!
//! # Example
//! ```rust
//! use band_beat_detector::{BeatDetector, DetectorConfig, FrameClock, SharedTempo};
//! use std::sync::Arc;
//!
//! let tempo = Arc::new(SharedTempo::new());
//! let mut detector = BeatDetector::new(
//!     DetectorConfig::default(),
//!     FrameClock::from_frame_rate(30.0),
//!     tempo.clone(),
//! )
//! .unwrap();
//!
//! // Some other part of the application may know the tempo.
//! tempo.set(Some(128.0));
//!
//! let frames = [[0.1_f32; 64], [0.1; 64], [0.9; 64]];
//! let beats = frames
//!     .iter()
//!     .map(|frame| detector.ingest_and_detect(frame))
//!     .collect::<Vec<_>>();
//! assert_eq!(beats, [false, false, true]);
//! ```
//!
//! # Features
//! - `std` (default): [`StdClock`], a monotonic wall clock.
//! - `serde`: (de)serialization of [`DetectorConfig`].

#![no_std]
#![deny(
    clippy::all,
    clippy::cargo,
    clippy::nursery,
    clippy::must_use_candidate,
)]
// now allow a few rules which are denied by the above statement
// --> they are ridiculous and not necessary
#![allow(
    clippy::suboptimal_flops,
    clippy::redundant_pub_crate,
    clippy::multiple_crate_versions
)]
#![deny(missing_debug_implementations)]

extern crate alloc;
#[cfg(any(test, feature = "std"))]
extern crate std;

#[cfg(test)]
#[macro_use(check)]
extern crate assert2;
#[cfg(test)]
#[macro_use]
extern crate float_cmp;

mod band_history;
mod beat_detector;
mod beat_gate;
mod clock;
mod config;
mod loudness;
mod tempo;

pub mod f32;

pub use band_history::BandNormalizer;
pub use beat_detector::{BeatDetector, DetectError};
pub use beat_gate::{tempo_confidence, BeatGate, SinceLastBeat, TimingGate};
#[cfg(feature = "std")]
pub use clock::StdClock;
pub use clock::{Clock, FrameClock};
pub use config::{
    Cooldown, DetectorConfig, InputScale, InvalidConfigError, Sigmoid, ValidConfig,
    DEFAULT_BANDS, DEFAULT_COOLDOWN, DEFAULT_COOLDOWN_FRAMES, DEFAULT_HISTORY_LEN,
};
pub use loudness::biased_average_loudness;
pub use tempo::{NoTempo, SharedTempo, TempoSource};

#[cfg(test)]
mod test_utils;
