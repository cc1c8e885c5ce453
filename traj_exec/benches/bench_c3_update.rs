//! # C3 Update Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nalgebra::{Vector3, Vector6};

use traj_lib::c3::{C3Trajectory, Limits, Point, Waypoint};

fn c3_update_benchmark(c: &mut Criterion) {
    let limits = Limits::new(
        Vector6::new(-0.5, -0.5, -0.5, -1.0, -1.0, -1.0),
        Vector6::new(1.0, 0.5, 0.5, 1.0, 1.0, 1.0),
        Vector6::new(-0.5, -0.5, -0.5, -1.0, -1.0, -1.0),
        Vector6::new(0.5, 0.5, 0.5, 1.0, 1.0, 1.0),
        Vector3::new(0.2, 0.0, 0.0),
        Vector6::repeat(5.0),
    )
    .unwrap();

    let start = Point::at_rest(Vector6::zeros());
    let coordinated = Waypoint {
        r: Point::at_rest(Vector6::new(5.0, -2.0, 0.5, 0.0, 0.0, 2.0)),
        speed: 0.8,
        coordinated: true,
    };
    let uncoordinated = Waypoint {
        coordinated: false,
        ..coordinated
    };

    let mut group = c.benchmark_group("c3_update");

    group.bench_function("coordinated_1000_steps", |b| {
        b.iter(|| {
            let mut traj = C3Trajectory::new(start, limits);
            for i in 0..1000 {
                traj.update(0.01, black_box(&coordinated), i as f64 * 0.01);
            }
            traj.current()
        })
    });

    group.bench_function("uncoordinated_1000_steps", |b| {
        b.iter(|| {
            let mut traj = C3Trajectory::new(start, limits);
            for i in 0..1000 {
                traj.update(0.01, black_box(&uncoordinated), i as f64 * 0.01);
            }
            traj.current()
        })
    });

    group.finish();
}

criterion_group!(benches, c3_update_benchmark);
criterion_main!(benches);
