#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Marble Maze without a window.

mod animation;
mod config;
mod physics;
mod score;
mod simulation;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use marble_maze_core::Position;
use marble_maze_level::{load_layout, LevelDirectory};
use marble_maze_system_tilt::TiltInput;
use marble_maze_world::query;

use crate::{config::Settings, simulation::Simulation};

/// Command-line arguments for the headless runner.
#[derive(Debug, Parser)]
#[command(name = "marble-maze", about = "Roll a marble through tile mazes")]
struct CliArgs {
    /// Directory holding `level<N>.txt` files.
    #[arg(long, value_name = "DIR", default_value = "levels")]
    levels: PathBuf,
    /// Optional TOML file with physics and input tuning.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Number of fixed simulation steps to run.
    #[arg(long, default_value_t = 3600)]
    ticks: u32,
    /// Constant accelerometer reading applied every tick.
    #[arg(
        long,
        value_name = "X,Y",
        value_parser = parse_pair,
        allow_hyphen_values = true,
        conflicts_with = "drag"
    )]
    tilt: Option<(f32, f32)>,
    /// Pointer held at a world position instead of an accelerometer.
    #[arg(long, value_name = "X,Y", value_parser = parse_pair, allow_hyphen_values = true)]
    drag: Option<(f32, f32)>,
    /// Prints the parsed level as JSON and exits.
    #[arg(long, value_name = "LEVEL")]
    describe: Option<u32>,
}

impl CliArgs {
    fn input(&self) -> TiltInput {
        match (self.tilt, self.drag) {
            (Some((x, y)), _) => TiltInput::Accelerometer { x, y },
            (None, Some((x, y))) => TiltInput::PointerDrag {
                pointer: Position::new(x, y),
            },
            (None, None) => TiltInput::Idle,
        }
    }
}

fn parse_pair(value: &str) -> Result<(f32, f32), String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but found `{value}`"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<f32>()
            .map_err(|error| format!("invalid number `{part}`: {error}"))
    };
    Ok((parse(x)?, parse(y)?))
}

/// Entry point for the Marble Maze command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = CliArgs::parse();
    let source = LevelDirectory::new(&args.levels);

    if let Some(level) = args.describe {
        let layout = load_layout(&source, level)
            .with_context(|| format!("failed to load level {level} for description"))?;
        let json = serde_json::to_string_pretty(&layout).context("failed to encode level")?;
        println!("{json}");
        return Ok(());
    }

    let settings = Settings::load(args.config.as_deref())?;
    let input = args.input();
    let mut simulation = Simulation::new(source, &settings);
    simulation
        .start()
        .with_context(|| format!("failed to start from {}", args.levels.display()))?;
    info!("Welcome to Marble Maze. Rolling for {} ticks.", args.ticks);

    for tick in 0..args.ticks {
        simulation
            .step(input)
            .with_context(|| format!("simulation failed on tick {tick}"))?;
    }

    let world = simulation.world();
    info!(
        "stopped on level {} after {:.2}s",
        query::level(world),
        query::elapsed(world).as_secs_f32()
    );
    println!("{}", simulation.score_text());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_parse_with_optional_spaces() {
        assert_eq!(parse_pair("0.2, -0.1"), Ok((0.2, -0.1)));
        assert!(parse_pair("0.2").is_err());
        assert!(parse_pair("a,1").is_err());
    }

    #[test]
    fn tilt_takes_precedence_over_idle() {
        let args = CliArgs::parse_from(["marble-maze", "--tilt", "-0.5,0"]);
        assert_eq!(args.input(), TiltInput::Accelerometer { x: -0.5, y: 0.0 });
        assert_eq!(args.levels, PathBuf::from("levels"));
        assert_eq!(args.ticks, 3600);

        let idle = CliArgs::parse_from(["marble-maze"]);
        assert_eq!(idle.input(), TiltInput::Idle);
    }

    #[test]
    fn drag_becomes_pointer_input() {
        let args = CliArgs::parse_from(["marble-maze", "--drag", "300,400"]);
        assert_eq!(
            args.input(),
            TiltInput::PointerDrag {
                pointer: Position::new(300.0, 400.0),
            }
        );
    }

    #[test]
    fn tilt_and_drag_conflict() {
        assert!(CliArgs::try_parse_from(["marble-maze", "--tilt", "1,1", "--drag", "1,1"]).is_err());
    }
}
