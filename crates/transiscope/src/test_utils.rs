//! Shared synthetic fixtures for unit tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::roi::{Roi, RoiId, Vertex};
use crate::stack::ImageStack;
use crate::trace::Trace;

/// Axis-aligned square with top-left corner `origin` (row, col), clockwise.
pub(crate) fn square_vertices(origin: [f64; 2], side: f64) -> Vec<Vertex> {
    let [r, c] = origin;
    vec![[r, c], [r, c + side], [r + side, c + side], [r + side, c]]
}

pub(crate) fn square_roi(id: RoiId, origin: [f64; 2], side: f64, shape: [usize; 2]) -> Roi {
    Roi::new(id, square_vertices(origin, side), shape)
}

/// Stack where pixel `(f, r, c)` holds `f * 100 + r * width + c`.
pub(crate) fn ramp_stack(n_frames: usize, height: usize, width: usize) -> ImageStack {
    let mut data = Vec::with_capacity(n_frames * height * width);
    for f in 0..n_frames {
        for r in 0..height {
            for c in 0..width {
                data.push((f * 100 + r * width + c) as f32);
            }
        }
    }
    ImageStack::new(n_frames, height, width, data).unwrap()
}

/// Stack at `background` everywhere, except the square `[row, col, side]`
/// which is `bright` for `blink_len` frames starting at each of `onsets`.
pub(crate) fn blinking_stack(
    n_frames: usize,
    shape: [usize; 2],
    square: [usize; 3],
    onsets: &[usize],
    blink_len: usize,
    background: f32,
    bright: f32,
) -> ImageStack {
    let [h, w] = shape;
    let [r0, c0, side] = square;
    let mut data = vec![background; n_frames * h * w];
    for &onset in onsets {
        for f in onset..(onset + blink_len).min(n_frames) {
            for r in r0..(r0 + side).min(h) {
                for c in c0..(c0 + side).min(w) {
                    data[(f * h + r) * w + c] = bright;
                }
            }
        }
    }
    ImageStack::new(n_frames, h, w, data).unwrap()
}

/// `baseline` everywhere plus one-sample spikes of `amplitude` at `at`.
pub(crate) fn spike_trace(len: usize, at: &[usize], amplitude: f64, baseline: f64) -> Trace {
    let mut samples = vec![baseline; len];
    for &k in at {
        samples[k] += amplitude;
    }
    Trace::new(samples)
}

/// Piecewise-constant trace from `(level, length)` pieces.
pub(crate) fn step_trace(pieces: &[(f64, usize)]) -> Trace {
    let samples = pieces
        .iter()
        .flat_map(|&(level, len)| std::iter::repeat(level).take(len))
        .collect();
    Trace::new(samples)
}

/// Uniform noise around `mean` with standard deviation `std`, seeded.
pub(crate) fn noisy_trace(len: usize, mean: f64, std: f64, seed: u64) -> Trace {
    let mut rng = StdRng::seed_from_u64(seed);
    let half_width = std * 3f64.sqrt();
    let samples = (0..len)
        .map(|_| mean + rng.gen_range(-half_width..half_width))
        .collect();
    Trace::new(samples)
}
