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
//! Shows how a tempo hint from another part of an application, such as a
//! media player that knows the track, steers the detector. A second thread
//! publishes the tempo of the current song into a shared slot while the main
//! thread detects beats. Every few seconds the song changes. Stop it with
//! Ctrl+C.

use band_beat_detector::{BeatDetector, DetectorConfig, SharedTempo, StdClock};
use example_utils::SyntheticSong;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

mod example_utils;

/// Tempo of each song in the playlist. `None` means that the player does not
/// know the tempo of the song.
const PLAYLIST: [Option<f32>; 4] = [Some(128.0), None, Some(174.0), Some(90.0)];

const SONG_LENGTH: Duration = Duration::from_secs(8);

fn main() {
    example_utils::init_logger();
    let stop = example_utils::stop_on_ctrlc();

    let tempo = Arc::new(SharedTempo::new());
    let mut detector =
        BeatDetector::new(DetectorConfig::default(), StdClock::new(), tempo.clone()).unwrap();

    let mut song_index = 0;
    let mut song = SyntheticSong::new(song_bpm(song_index));
    let mut song_started = Instant::now();
    spawn_player_thread(tempo.clone(), song_index);

    while !stop.load(Ordering::SeqCst) {
        if song_started.elapsed() >= SONG_LENGTH {
            song_index = (song_index + 1) % PLAYLIST.len();
            song.change_song(song_bpm(song_index));
            song_started = Instant::now();
            // Metadata usually arrives a bit after the audio changed.
            spawn_player_thread(tempo.clone(), song_index);
        }

        let frame = song.next_frame();
        if detector.ingest_and_detect(&frame) {
            println!(
                "beat at {:>6.3}s into song #{song_index} (hint: {:?})",
                song_started.elapsed().as_secs_f32(),
                tempo.get()
            );
        }
        std::thread::sleep(example_utils::frame_period());
    }
}

/// Audible tempo of a song. Songs without a known tempo still have one.
fn song_bpm(index: usize) -> f32 {
    PLAYLIST[index].unwrap_or(105.0)
}

fn spawn_player_thread(tempo: Arc<SharedTempo>, index: usize) {
    std::thread::spawn(move || {
        tempo.clear();
        std::thread::sleep(Duration::from_millis(500));
        log::info!("Now playing song #{index} with tempo {:?}", PLAYLIST[index]);
        tempo.set(PLAYLIST[index]);
    });
}
