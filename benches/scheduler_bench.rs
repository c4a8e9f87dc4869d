//! Scheduler throughput across worker counts and DAG shapes, mirroring the
//! teacher codebase's own per-hot-path bench.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use songrender::devices::demo_device_factory;
use songrender::Renderer;

fn chain_blob(num_tracks: usize) -> Vec<u8> {
    let mut blob = Vec::new();
    blob.extend_from_slice(&120i32.to_ne_bytes());
    blob.extend_from_slice(&44100i32.to_ne_bytes());
    blob.extend_from_slice(&1.0f64.to_ne_bytes());

    blob.extend_from_slice(&(num_tracks as i32).to_ne_bytes());
    for _ in 0..num_tracks {
        blob.push(1u8);
        blob.extend_from_slice(&8i32.to_ne_bytes());
        blob.extend_from_slice(&0.1f32.to_ne_bytes());
        blob.extend_from_slice(&0.1f32.to_ne_bytes());
    }

    blob.extend_from_slice(&0i32.to_ne_bytes()); // num_midi_lanes

    blob.extend_from_slice(&(num_tracks as i32).to_ne_bytes());
    for i in 0..num_tracks {
        if i == 0 {
            blob.extend_from_slice(&0i32.to_ne_bytes()); // num_receives
        } else {
            blob.extend_from_slice(&1i32.to_ne_bytes());
            blob.extend_from_slice(&((i - 1) as i32).to_ne_bytes());
            blob.extend_from_slice(&1.0f32.to_ne_bytes());
        }
        blob.extend_from_slice(&1i32.to_ne_bytes()); // num_device_refs
        blob.extend_from_slice(&(i as i32).to_ne_bytes());
        blob.extend_from_slice(&0i32.to_ne_bytes()); // num_midi_refs
    }

    blob
}

fn bench_scheduler(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_block");
    let blob = chain_blob(32);

    for &workers in &[1usize, 2, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, &workers| {
            let renderer = Renderer::new(&blob, workers, demo_device_factory);
            let mut out = vec![0i16; 2048];
            b.iter(|| renderer.render_samples(&mut out));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_scheduler);
criterion_main!(benches);
