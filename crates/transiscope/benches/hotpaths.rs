use std::f64::consts::PI;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use transiscope::{
    detect_change_points, detect_dog, ChangePointParams, DogParams, Roi, Trace, Vertex,
};

fn make_star_polygon(
    n_points: usize,
    center: [f64; 2],
    r_outer: f64,
    r_inner: f64,
) -> Vec<Vertex> {
    (0..2 * n_points)
        .map(|i| {
            let theta = PI * i as f64 / n_points as f64;
            let r = if i % 2 == 0 { r_outer } else { r_inner };
            [center[0] + r * theta.sin(), center[1] + r * theta.cos()]
        })
        .collect()
}

fn make_noisy_trace(len: usize, seed: u64) -> Trace {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut samples: Vec<f64> = (0..len).map(|_| 100.0 + rng.gen_range(-2.0..2.0)).collect();
    for k in (50..len).step_by(200) {
        samples[k] += 40.0;
    }
    for s in samples.iter_mut().skip(len / 3).take(len / 3) {
        *s += 15.0;
    }
    Trace::new(samples)
}

fn bench_rasterize(c: &mut Criterion) {
    let star = make_star_polygon(12, [256.0, 256.0], 200.0, 90.0);
    c.bench_function("rasterize_star_24v_512x512", |b| {
        b.iter(|| {
            let roi = Roi::new(1, black_box(star.clone()), [512, 512]);
            black_box(roi.area_pixels())
        })
    });
}

fn bench_dog(c: &mut Criterion) {
    let trace = make_noisy_trace(10_000, 7);
    let params = DogParams::default();
    c.bench_function("dog_detect_10k", |b| {
        b.iter(|| {
            let events = detect_dog(black_box(&trace), 50.0, 1, &params)
                .expect("fixture parameters are valid");
            black_box(events.len())
        })
    });
}

fn bench_pelt(c: &mut Criterion) {
    let trace = make_noisy_trace(5_000, 11);
    let params = ChangePointParams {
        enable: true,
        penalty: 50.0,
        ..ChangePointParams::default()
    };
    c.bench_function("pelt_detect_5k", |b| {
        b.iter(|| {
            let events = detect_change_points(black_box(&trace), 50.0, 1, &params)
                .expect("fixture parameters are valid");
            black_box(events.len())
        })
    });
}

criterion_group!(hotpaths, bench_rasterize, bench_dog, bench_pelt);
criterion_main!(hotpaths);
