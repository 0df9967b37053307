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

//! Time sources for the timing gate.
//!
//! Hosts don't guarantee a constant frame rate, so the cooldown is measured
//! in wall-clock time. For offline analysis and tests, [`FrameClock`]
//! derives the time from the frame number instead.

use core::time::Duration;

/// Monotonic time source. Polled exactly once per frame.
pub trait Clock {
    /// Returns the time passed since some fixed origin.
    fn now(&mut self) -> Duration;
}

/// Deterministic clock that advances by a fixed frame period on every poll.
/// The first poll returns zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameClock {
    frame_period: Duration,
    elapsed: Duration,
}

impl FrameClock {
    #[must_use]
    pub const fn new(frame_period: Duration) -> Self {
        Self {
            frame_period,
            elapsed: Duration::ZERO,
        }
    }

    /// Creates a clock for a constant frame rate, such as the 30 audio
    /// frames per second typical for wallpaper hosts.
    #[must_use]
    pub fn from_frame_rate(frames_per_second: f32) -> Self {
        assert!(frames_per_second.is_normal() && frames_per_second.is_sign_positive());
        Self::new(Duration::from_secs_f32(1.0 / frames_per_second))
    }

    #[must_use]
    pub const fn frame_period(&self) -> Duration {
        self.frame_period
    }
}

impl Clock for FrameClock {
    fn now(&mut self) -> Duration {
        let now = self.elapsed;
        self.elapsed += self.frame_period;
        now
    }
}

/// Wall clock backed by [`std::time::Instant`].
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now(&mut self) -> Duration {
        self.origin.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_clock_advances_per_poll() {
        let mut clock = FrameClock::new(Duration::from_millis(10));
        check!(clock.now() == Duration::ZERO);
        check!(clock.now() == Duration::from_millis(10));
        check!(clock.now() == Duration::from_millis(20));
    }

    #[test]
    fn frame_clock_from_frame_rate() {
        let clock = FrameClock::from_frame_rate(50.0);
        let drift = clock.frame_period().abs_diff(Duration::from_millis(20));
        check!(drift < Duration::from_micros(1));
    }

    #[cfg(feature = "std")]
    #[test]
    fn std_clock_is_monotonic() {
        let mut clock = StdClock::new();
        let a = clock.now();
        let b = clock.now();
        check!(b >= a);
    }
}
