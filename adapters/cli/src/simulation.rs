//! Fixed-timestep driver wiring the world, the systems and the adapters.

use std::time::Duration;

use anyhow::Result;
use log::trace;
use marble_maze_core::Command;
use marble_maze_level::LevelSource;
use marble_maze_system_collision::Collision;
use marble_maze_system_sequencer::Sequencer;
use marble_maze_system_tilt::{Tilt, TiltInput};
use marble_maze_world::{self as world, query, World};

use crate::{animation::Animator, config::Settings, physics::Physics, score::ScoreLabel};

/// Headless game session.
#[derive(Debug)]
pub(crate) struct Simulation<S> {
    world: World,
    collision: Collision,
    sequencer: Sequencer<S>,
    tilt: Tilt,
    physics: Physics,
    animator: Animator,
    score: ScoreLabel,
    tick: Duration,
}

impl<S: LevelSource> Simulation<S> {
    pub(crate) fn new(source: S, settings: &Settings) -> Self {
        Self {
            world: World::new(),
            collision: Collision::new(),
            sequencer: Sequencer::new(source),
            tilt: Tilt::new(settings.tilt()),
            physics: Physics::new(settings),
            animator: Animator::new(),
            score: ScoreLabel::new(),
            tick: settings.tick(),
        }
    }

    /// Loads the first level and spawns the marble.
    pub(crate) fn start(&mut self) -> Result<()> {
        let mut commands = Vec::new();
        self.sequencer.start(&mut commands)?;
        self.pump(commands)
    }

    /// Runs one fixed step with the input sampled for it.
    pub(crate) fn step(&mut self, input: TiltInput) -> Result<()> {
        self.pump(vec![Command::Tick { dt: self.tick }])?;

        let mut commands = Vec::new();
        let player = query::player(&self.world);
        self.tilt.handle(
            input,
            player.as_ref(),
            query::is_game_over(&self.world),
            &mut commands,
        );
        self.pump(commands)?;

        let gravity = query::gravity(&self.world);
        if let Some((player, position)) = self.physics.step(self.tick.as_secs_f32(), gravity) {
            self.pump(vec![Command::SyncPlayerPosition { player, position }])?;
        }

        let frame = self.animator.advance(self.tick);
        for pose in &frame.poses {
            trace!(
                "animating player {} at ({:.1}, {:.1}) scale {:.4}",
                pose.player.get(),
                pose.position.x(),
                pose.position.y(),
                pose.scale
            );
            self.physics.place(pose.player, pose.position);
            self.pump(vec![Command::SyncPlayerPosition {
                player: pose.player,
                position: pose.position,
            }])?;
        }

        // One contact at a time so each sees the state left by the previous.
        for (player, entity) in self.physics.begin_contacts() {
            self.pump(vec![Command::ReportContact { player, entity }])?;
        }

        for transition in frame.completed {
            self.pump(vec![Command::CompleteTransition { transition }])?;
        }
        Ok(())
    }

    fn pump(&mut self, mut pending: Vec<Command>) -> Result<()> {
        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }

            self.physics.observe(&events);
            self.animator.observe(&events, &self.physics);
            self.score.observe(&events);

            let latch = query::teleporting_enabled(&self.world);
            self.collision.handle(&events, latch, &mut pending);
            self.sequencer.handle(&events, &mut pending)?;
        }
        Ok(())
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    pub(crate) fn score_text(&self) -> &str {
        self.score.text()
    }
}
