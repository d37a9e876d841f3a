//! Headless demo: a player car loops through a city full of traffic.
//!
//! Usage: `rushhour [CONFIG.json] [TICKS]`
//!
//! Logging is controlled through `RUST_LOG`, e.g. `RUST_LOG=rushhour_core=debug`.

use std::cell::Cell;
use std::env;
use std::rc::Rc;

use anyhow::{Context, Result};
use cobble::{Rect, TileClass, TileClassTable, TileMap};
use glam::IVec2;
use rushhour_core::agent::{Agent, AgentKind, AgentSpec};
use rushhour_core::config::SimConfig;
use rushhour_core::contact::{AgentSnapshot, ContactContext};
use rushhour_core::event::SimEvent;
use rushhour_core::hash::hash_simulation;
use rushhour_core::heading::Heading;
use rushhour_core::player::PlayerInput;
use rushhour_core::simulation::Simulation;
use tracing::{info, warn};

const TILE: i32 = 16;
const BLOCK: i32 = 4;
const CITY_BLOCKS: i32 = 8;
const BUILDING: i32 = 1;
const DEFAULT_TICKS: u64 = 600;

fn main() -> Result<()> {
    init_tracing();

    let mut args = env::args().skip(1);
    let config = match args.next() {
        Some(path) => SimConfig::from_path(&path)
            .with_context(|| format!("failed to load config from {path}"))?,
        None => SimConfig::default(),
    };
    let ticks = match args.next() {
        Some(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("invalid tick count {raw:?}"))?,
        None => DEFAULT_TICKS,
    };

    let crashes = Rc::new(Cell::new(0u32));
    let mut sim = bootstrap(config, Rc::clone(&crashes))?;
    info!(
        seed = sim.seed(),
        agents = sim.agent_count(),
        ticks,
        "Starting Rush Hour demo"
    );

    let mut turns = 0usize;
    let mut braking = 0usize;
    let mut recoveries = 0usize;
    for _ in 0..ticks {
        sim.set_player_input(player_route(sim.tick()));
        sim.step();
        for event in sim.drain_events() {
            match event {
                SimEvent::TurnCommitted { .. } => turns += 1,
                SimEvent::TrafficBraking { .. } => braking += 1,
                SimEvent::Recovered { .. } => recoveries += 1,
                _ => {}
            }
        }
        if sim.player_id().is_none() {
            warn!(tick = sim.tick(), "player vanished, ending run");
            break;
        }
    }

    let stopped = sim.agents().filter(|a| a.is_stopped()).count();
    info!(
        tick = sim.tick(),
        agents = sim.agent_count(),
        stopped,
        crashes = crashes.get(),
        turns,
        braking,
        recoveries,
        state_hash = format_args!("{:016x}", hash_simulation(&sim)),
        "Run complete"
    );

    if let Some(player) = sim.player_id().and_then(|id| sim.agent(id)) {
        println!("{}", serde_json::to_string_pretty(player)?);
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// A square city of blocks, each a 2x2 building ringed by road.
fn city_map() -> Result<TileMap> {
    let size = CITY_BLOCKS * BLOCK;
    let classes = TileClassTable::new(TileClass::Passable).with(BUILDING, TileClass::Obstacle);
    let mut map = TileMap::new(size, size, TILE, classes)?;
    for by in 0..CITY_BLOCKS {
        for bx in 0..CITY_BLOCKS {
            map.fill(BUILDING, Rect::new(bx * BLOCK + 1, by * BLOCK + 1, 2, 2));
        }
    }
    Ok(map)
}

fn tile_center(x: i32, y: i32) -> IVec2 {
    IVec2::new(x * TILE + TILE / 2, y * TILE + TILE / 2)
}

fn bootstrap(config: SimConfig, crashes: Rc<Cell<u32>>) -> Result<Simulation> {
    let mut sim = Simulation::new(city_map()?, config).context("invalid configuration")?;
    let marker_ttl = sim.config().marker_ttl;

    sim.register_contact_hook(
        AgentKind::Traffic,
        move |car: &mut Agent, other: &AgentSnapshot, ctx: &mut ContactContext<'_>| {
            if other.kind != AgentKind::Player || car.is_stopped() {
                return;
            }
            car.mark_stopped();
            crashes.set(crashes.get() + 1);
            info!(tick = ctx.tick(), car = %car.id(), "player rammed traffic");
            ctx.spawn(AgentSpec::marker(car.position(), Some(marker_ttl)));
        },
    );

    sim.spawn_player(tile_center(0, 0));
    for by in 0..CITY_BLOCKS {
        for bx in 0..CITY_BLOCKS {
            sim.spawn_traffic(tile_center(bx * BLOCK, by * BLOCK + 2), Heading::Up);
            sim.spawn_traffic(
                tile_center(bx * BLOCK + BLOCK - 1, by * BLOCK + 1),
                Heading::Down,
            );
        }
    }
    Ok(sim)
}

/// Drive a lap around the outer ring, braking briefly at each corner.
fn player_route(tick: u64) -> PlayerInput {
    let leg = 270;
    let phase = tick % (leg * 4);
    if phase % leg >= leg - 10 {
        return PlayerInput::Brake;
    }
    match phase / leg {
        0 => PlayerInput::Steer(Heading::Right),
        1 => PlayerInput::Steer(Heading::Down),
        2 => PlayerInput::Steer(Heading::Left),
        _ => PlayerInput::Steer(Heading::Up),
    }
}
