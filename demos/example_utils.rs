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
//! Helpers shared by the demos: logging setup and a synthetic band-energy
//! source that stands in for a visualizer host.

#![allow(dead_code)]

use std::f32::consts::PI;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Bands per frame as delivered by the host: 64 per channel.
pub const BANDS: usize = 128;

/// Frame rate of the simulated host.
pub const FRAMES_PER_SECOND: f32 = 30.0;

pub fn init_logger() {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Debug)
        .init()
        .unwrap();
}

/// Returns a flag that is set once the user pressed Ctrl+C.
pub fn stop_on_ctrlc() -> Arc<AtomicBool> {
    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || {
            stop.store(true, Ordering::SeqCst);
        })
        .unwrap();
    }
    stop
}

pub fn frame_period() -> Duration {
    Duration::from_secs_f32(1.0 / FRAMES_PER_SECOND)
}

/// Produces frames of a song with a kick drum at a fixed tempo. The kick
/// decays quickly and mostly lives in the lowest bands. All other bands
/// carry noise and a slow swell, so that the overall loudness wanders.
#[derive(Debug)]
pub struct SyntheticSong {
    bpm: f32,
    elapsed: Duration,
}

impl SyntheticSong {
    pub const fn new(bpm: f32) -> Self {
        Self {
            bpm,
            elapsed: Duration::ZERO,
        }
    }

    pub const fn bpm(&self) -> f32 {
        self.bpm
    }

    /// Changes the tempo, as if the next song started.
    pub fn change_song(&mut self, bpm: f32) {
        self.bpm = bpm;
        self.elapsed = Duration::ZERO;
    }

    /// Advances the song by one frame period and returns the band energies.
    pub fn next_frame(&mut self) -> Vec<f32> {
        let t = self.elapsed.as_secs_f32();
        self.elapsed += frame_period();

        let beat_period = 60.0 / self.bpm;
        let since_kick = t % beat_period;
        let kick = (-since_kick * 25.0).exp();
        let swell = 0.25 + 0.15 * (2.0 * PI * t / 8.0).sin();

        (0..BANDS)
            .map(|band| {
                // Both channels carry the kick in their lowest bands.
                let band_in_channel = band % (BANDS / 2);
                let kick_weight = if band_in_channel < 4 { 1.0 } else { 0.1 };
                let noise = rand::random::<f32>() * 0.1;
                (swell + kick_weight * kick * 0.6 + noise).clamp(0.0, 1.0)
            })
            .collect()
    }
}
