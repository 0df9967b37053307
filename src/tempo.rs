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

//! External tempo hints.
//!
//! The tempo of the current song is usually known by some other part of the
//! application, e.g., a client of a music streaming service. The detector
//! only needs a narrow view of it: "what is the current tempo, if known".

use crate::f32::Bpm;
use alloc::sync::Arc;
use core::sync::atomic::{AtomicU32, Ordering};

/// Source of the current tempo in beats per minute.
///
/// Polled exactly once per frame. Implementations must be cheap and must not
/// block, as this runs on the audio-processing path.
pub trait TempoSource {
    /// Returns the current tempo, if known.
    fn current_tempo(&self) -> Option<f32>;
}

/// Never knows the tempo. The detector always uses the fixed cooldown.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NoTempo;

impl TempoSource for NoTempo {
    fn current_tempo(&self) -> Option<f32> {
        None
    }
}

/// A static tempo hint.
impl TempoSource for Option<f32> {
    fn current_tempo(&self) -> Option<f32> {
        *self
    }
}

impl<T: TempoSource + ?Sized> TempoSource for &T {
    fn current_tempo(&self) -> Option<f32> {
        (**self).current_tempo()
    }
}

impl<T: TempoSource + ?Sized> TempoSource for Arc<T> {
    fn current_tempo(&self) -> Option<f32> {
        (**self).current_tempo()
    }
}

/// Tempo cell that can be updated from another thread while the detector
/// reads it on the audio path.
///
/// Internally, this is a single atomic holding the bits of the `f32`. Each
/// read is a snapshot; no further synchronization is needed. An unknown
/// tempo is stored as `0.0`.
#[derive(Debug, Default)]
pub struct SharedTempo(AtomicU32);

impl SharedTempo {
    const UNKNOWN: u32 = 0; // bits of 0.0_f32

    /// Creates a new cell with an unknown tempo.
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicU32::new(Self::UNKNOWN))
    }

    /// Publishes a new tempo. `None` marks the tempo as unknown.
    pub fn set(&self, bpm: Option<f32>) {
        let bits = bpm.map_or(Self::UNKNOWN, f32::to_bits);
        self.0.store(bits, Ordering::Relaxed);
    }

    /// Marks the tempo as unknown.
    pub fn clear(&self) {
        self.set(None)
    }

    /// Returns the latest published tempo, if any.
    #[must_use]
    pub fn get(&self) -> Option<f32> {
        match self.0.load(Ordering::Relaxed) {
            Self::UNKNOWN => None,
            bits => Some(f32::from_bits(bits)),
        }
    }
}

impl TempoSource for SharedTempo {
    fn current_tempo(&self) -> Option<f32> {
        self.get()
    }
}

/// Reads a tempo hint and validates it.
///
/// Hosts report an unknown tempo in various ways: absent, as `0`, or, if
/// something went wrong, as garbage. Everything that is not a positive,
/// finite number is treated as unknown.
#[must_use]
pub(crate) fn poll_tempo(source: &impl TempoSource) -> Option<Bpm> {
    let raw = source.current_tempo()?;
    match Bpm::try_from(raw) {
        Ok(bpm) => Some(bpm),
        Err(e) => {
            if raw != 0.0 {
                log::warn!("Ignoring invalid tempo hint {raw}: {e}");
            }
            None
        }
    }
}
