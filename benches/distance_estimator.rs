use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::DVec3;
use mandelbulb_flight::camera::{Camera, MovementState};
use mandelbulb_flight::fractal::Mandelbulb;

fn bench_distance(c: &mut Criterion) {
    let mut group = c.benchmark_group("mandelbulb_distance");

    for iterations in [8u32, 20, 64] {
        let bulb = Mandelbulb {
            max_iterations: iterations,
            ..Default::default()
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(iterations),
            &bulb,
            |b, bulb| b.iter(|| bulb.distance(black_box(DVec3::new(0.3, -0.7, 0.9)))),
        );
    }

    group.finish();
}

fn bench_camera_step(c: &mut Criterion) {
    let movement = MovementState {
        forward: true,
        right: true,
        up: true,
        ..Default::default()
    };

    c.bench_function("camera_step", |b| {
        let mut camera = Camera::default();
        b.iter(|| {
            let speed = camera.effective_speed(black_box(Some(0.5)));
            camera.step(black_box(movement), 1.0 / 60.0, speed);
        })
    });
}

criterion_group!(benches, bench_distance, bench_camera_step);
criterion_main!(benches);
