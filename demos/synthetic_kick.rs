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
//! Feeds a synthetic kick-drum song through the detector in real time and
//! prints every detected beat. Stop it with Ctrl+C.

use band_beat_detector::{BeatDetector, DetectorConfig, NoTempo, StdClock};
use example_utils::{SyntheticSong, BANDS};
use std::sync::atomic::Ordering;
use std::time::Instant;

mod example_utils;

fn main() {
    example_utils::init_logger();
    let stop = example_utils::stop_on_ctrlc();

    let mut song = SyntheticSong::new(120.0);
    let mut detector =
        BeatDetector::new(DetectorConfig::default(), StdClock::new(), NoTempo).unwrap();

    log::info!(
        "Playing a synthetic song at {} BPM ({BANDS} bands per frame)",
        song.bpm()
    );
    let start = Instant::now();
    let mut beats = 0_u64;
    while !stop.load(Ordering::SeqCst) {
        let frame = song.next_frame();
        if detector.ingest_and_detect(&frame) {
            beats += 1;
            println!(
                "beat #{beats:>4} at {:>8.3}s (loudness {:.2})",
                start.elapsed().as_secs_f32(),
                detector.loudness()
            );
        }
        std::thread::sleep(example_utils::frame_period());
    }

    let minutes = start.elapsed().as_secs_f32() / 60.0;
    log::info!(
        "Detected {beats} beats in {:.1}s, {:.1} per minute",
        minutes * 60.0,
        beats as f32 / minutes
    );
}
