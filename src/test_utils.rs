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

/// Generators for synthetic band-energy streams. One frame is a vector of
/// band energies, as a host would deliver it per audio callback.
pub mod frames {
    use std::vec;
    use std::vec::Vec;

    /// A frame where every band has the same energy.
    pub fn flat(bands: usize, level: f32) -> Vec<f32> {
        vec![level; bands]
    }

    /// A stream of `len` frames at energy `low`, except for the frames at
    /// `pulses`, which are at energy `high`.
    pub fn pulse_train(
        bands: usize,
        low: f32,
        high: f32,
        len: usize,
        pulses: &[usize],
    ) -> Vec<Vec<f32>> {
        assert!(pulses.iter().all(|&index| index < len));
        (0..len)
            .map(|index| {
                let level = if pulses.contains(&index) { high } else { low };
                flat(bands, level)
            })
            .collect()
    }

    #[test]
    fn pulse_train_is_as_expected() {
        let stream = pulse_train(2, 0.1, 0.9, 4, &[1, 3]);
        assert_eq!(
            stream,
            [
                vec![0.1, 0.1],
                vec![0.9, 0.9],
                vec![0.1, 0.1],
                vec![0.9, 0.9]
            ]
        );
    }
}
