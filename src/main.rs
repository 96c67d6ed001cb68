//! Asteroid Maze map preview
//!
//! Generates consecutive levels headlessly and prints each map as ASCII.
//!
//! Usage:
//!   asteroid-maze --seed 42 --levels 5
//!   RUST_LOG=debug asteroid-maze --height 12 --width 10 --half-height 6

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use glam::Vec2;

use asteroid_maze::map::LevelType;
use asteroid_maze::{Grid, LevelManager, Settings, Viewport};

#[derive(Parser)]
#[command(name = "asteroid-maze")]
#[command(about = "Generate Asteroid Maze levels and print them as ASCII maps")]
struct Args {
    /// RNG seed (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of levels to generate
    #[arg(long, default_value_t = 3)]
    levels: u32,

    /// Force every map to this height instead of the level progression
    #[arg(long)]
    height: Option<i32>,

    /// Viewport width in world units
    #[arg(long, requires = "half_height")]
    width: Option<f32>,

    /// Viewport half height in world units
    #[arg(long)]
    half_height: Option<f32>,

    /// JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print each level as JSON instead of ASCII
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    let mut settings = args.config.as_ref().map(Settings::load).unwrap_or_default();
    if args.seed.is_some() {
        settings.seed = args.seed;
    }
    if let Some(half_height) = args.half_height {
        let half_width = args
            .width
            .map_or(settings.viewport.half_width, |width| width * 0.5);
        settings.viewport = Viewport::new(Vec2::ZERO, half_width, half_height);
    }

    let mut manager = LevelManager::new(settings);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "seed {}", manager.seed())?;

    for _ in 0..args.levels {
        let grid = match args.height {
            Some(height) => {
                let level_type = manager.next_level_type();
                manager.advance_level_with(level_type, height)
            }
            None => manager.advance_level(),
        };

        if args.json {
            let json = serde_json::to_string(grid).context("serializing level")?;
            writeln!(out, "{json}")?;
        } else {
            print_level(&mut out, grid)?;
        }
    }

    out.flush().context("writing output")?;
    Ok(())
}

fn print_level(out: &mut impl Write, grid: &Grid) -> anyhow::Result<()> {
    let report = grid.report();
    let kind = match grid.level_type() {
        LevelType::Normal => "normal",
        LevelType::Night => "night",
        LevelType::Tutorial => "tutorial",
    };

    writeln!(out)?;
    writeln!(
        out,
        "=== Level {} ({}, {}x{}, {:.3} units/tile) ===",
        grid.level(),
        kind,
        grid.width(),
        grid.height(),
        grid.units_per_tile()
    )?;
    write!(out, "{grid}")?;
    writeln!(
        out,
        "walls: {} of {} segments, {} tiles{}",
        report.placed,
        report.requested,
        grid.wall_count(),
        if report.exhausted { " (placement budget exhausted)" } else { "" }
    )?;
    writeln!(out, "door: {:?}", grid.door_cell())?;
    Ok(())
}
