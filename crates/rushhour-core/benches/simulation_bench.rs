use cobble::{Rect, TileClass, TileClassTable, TileMap};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use glam::IVec2;
use rushhour_core::config::SimConfig;
use rushhour_core::heading::Heading;
use rushhour_core::simulation::Simulation;

const TILE: i32 = 16;

fn city_map(size: i32) -> TileMap {
    let classes = TileClassTable::new(TileClass::Passable).with(1, TileClass::Obstacle);
    let mut map = TileMap::new(size, size, TILE, classes).unwrap();
    for by in 0..size / 4 {
        for bx in 0..size / 4 {
            map.fill(1, Rect::new(bx * 4 + 1, by * 4 + 1, 2, 2));
        }
    }
    map
}

fn tile_center(x: i32, y: i32) -> IVec2 {
    IVec2::new(x * TILE + TILE / 2, y * TILE + TILE / 2)
}

/// Two cars per block plus a player in the top-left corner.
fn populated_city(size: i32) -> Simulation {
    let config = SimConfig {
        seed: 12345,
        ..SimConfig::default()
    };
    let mut sim = Simulation::new(city_map(size), config).unwrap();
    sim.spawn_player(tile_center(0, 0));
    for by in 0..size / 4 {
        for bx in 0..size / 4 {
            sim.spawn_traffic(tile_center(bx * 4, by * 4 + 2), Heading::Up);
            sim.spawn_traffic(tile_center(bx * 4 + 3, by * 4 + 1), Heading::Down);
        }
    }
    sim
}

fn bench_step_small_city(c: &mut Criterion) {
    let mut sim = populated_city(16);

    c.bench_function("step_32_cars", |b| {
        b.iter(|| {
            sim.step();
            sim.drain_events();
        })
    });
}

fn bench_step_large_city(c: &mut Criterion) {
    let mut sim = populated_city(64);

    c.bench_function("step_512_cars", |b| {
        b.iter(|| {
            sim.step();
            sim.drain_events();
        })
    });
}

fn bench_run_100_ticks(c: &mut Criterion) {
    c.bench_function("run_100_ticks_32_cars", |b| {
        b.iter_batched(
            || populated_city(16),
            |mut sim| {
                sim.run(100);
                black_box(sim.tick())
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_step_small_city,
    bench_step_large_city,
    bench_run_100_ticks
);
criterion_main!(benches);
