// benches/bench_traffic_light_controller.rs
use criterion::{
    black_box, criterion_group, criterion_main, AxisScale, Criterion, PlotConfiguration,
};
use signal_control::control_system::routes::{Route, RouteRegistry};
use signal_control::simulation_engine::telemetry::RandomTelemetry;
use signal_control::{Intersection, IntersectionId, LightState, Telemetry, TrafficLightController};
use std::time::Duration;

// Builds a network of `size` intersections with one route covering every other intersection.
fn create_controller(size: u8) -> TrafficLightController {
    let intersections: Vec<Intersection> = (0..size)
        .map(|i| {
            let phase = match i % 3 {
                0 => LightState::Green,
                1 => LightState::Yellow,
                _ => LightState::Red,
            };
            Intersection::new(
                IntersectionId(i),
                &format!("Junction {}", i),
                phase,
                u32::from(i % 7) + 1,
                Telemetry {
                    vehicles: u32::from(i % 50),
                    avg_speed: 30.0,
                },
            )
        })
        .collect();
    let route: Vec<IntersectionId> = (0..size).step_by(2).map(IntersectionId).collect();
    let routes = RouteRegistry::new(vec![Route::new("bench", route)]).expect("valid route");
    TrafficLightController::new(intersections, routes, Box::new(RandomTelemetry::seeded(1)))
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    group.sample_size(100);
    group.measurement_time(Duration::from_secs(5));
    group.warm_up_time(Duration::from_secs(2));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Linear));

    for &size in [6u8, 50, 200].iter() {
        group.bench_function(format!("normal_size_{}", size), |b| {
            let mut controller = create_controller(size);
            b.iter(|| {
                controller.tick();
                black_box(&controller);
            });
        });
        group.bench_function(format!("emergency_size_{}", size), |b| {
            let mut controller = create_controller(size);
            controller
                .set_emergency(true, Some("bench"))
                .expect("known route");
            b.iter(|| {
                controller.tick();
                black_box(&controller);
            });
        });
    }
    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let controller = create_controller(200);
    c.bench_function("snapshot_200", |b| {
        b.iter(|| black_box(controller.snapshot()));
    });
}

criterion_group!(benches, bench_tick, bench_snapshot);
criterion_main!(benches);
