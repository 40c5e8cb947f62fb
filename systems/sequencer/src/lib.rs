#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level sequencing system that drives the load, play, advance and reset cycle.
//!
//! The sequencer owns the [`LevelSource`] and is the only system that emits
//! [`Command::LoadLevel`]. It starts the first level, follows the world's
//! transition events to track the current [`Phase`], and loads the next level
//! whenever the world reports [`Event::LevelCompleted`]. Failing to obtain or
//! parse a level is fatal and surfaces as [`SequencerError`].

use log::{debug, info};
use marble_maze_core::{Command, Event, TransitionKind, FIRST_LEVEL, START_POSITION};
use marble_maze_level::{load_layout, LevelError, LevelSource};
use thiserror::Error;

/// Phases the game cycles through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// A level is being fetched and parsed.
    Loading,
    /// The marble responds to gravity and contacts are resolved.
    Playing,
    /// The finish was reached and the next level is about to load.
    Advancing,
    /// The marble fell into a vortex and awaits its respawn.
    Dying,
    /// The marble entered a teleport pad and awaits its arrival.
    Teleporting,
}

/// Fatal failures that stop level progression.
#[derive(Debug, Error)]
pub enum SequencerError {
    /// The level text could not be obtained or parsed.
    #[error(transparent)]
    Level(#[from] LevelError),
}

/// Level sequencer backed by the provided level source.
#[derive(Debug)]
pub struct Sequencer<S> {
    source: S,
    phase: Phase,
    level: u32,
}

impl<S> Sequencer<S>
where
    S: LevelSource,
{
    /// Creates a sequencer that has not loaded any level yet.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            phase: Phase::Loading,
            level: 0,
        }
    }

    /// Phase the game is currently in.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Index of the most recently loaded level, or zero before the first load.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Loads the first level and places the marble at the start position.
    pub fn start(&mut self, out: &mut Vec<Command>) -> Result<(), SequencerError> {
        self.load(FIRST_LEVEL, out)?;
        out.push(Command::SpawnPlayer {
            position: START_POSITION,
        });
        Ok(())
    }

    /// Consumes world events, emitting level loads when a level completes.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) -> Result<(), SequencerError> {
        for event in events {
            match event {
                Event::LevelCompleted { level } => {
                    info!("level {level} completed");
                    self.phase = Phase::Advancing;
                    self.load(level.saturating_add(1), out)?;
                }
                Event::TransitionRequested { kind, .. } => {
                    self.phase = match kind {
                        TransitionKind::Dying => Phase::Dying,
                        TransitionKind::Teleporting => Phase::Teleporting,
                    };
                    debug!("entered {:?} phase", self.phase);
                }
                Event::TransitionCompleted { .. } => {
                    if matches!(self.phase, Phase::Dying | Phase::Teleporting) {
                        self.phase = Phase::Playing;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn load(&mut self, level: u32, out: &mut Vec<Command>) -> Result<(), SequencerError> {
        self.phase = Phase::Loading;
        let layout = load_layout(&self.source, level)?;
        info!(
            "loaded level {level} with {} entities",
            layout.descriptors().len()
        );
        self.level = level;
        out.push(Command::LoadLevel { layout });
        self.phase = Phase::Playing;
        Ok(())
    }
}
