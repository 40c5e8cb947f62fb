#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Marble Maze.
//!
//! The world owns the live entities, the single player, the score and the
//! per-level flags. It never fails: commands that do not apply to the current
//! state (a contact from a replaced player, a completion for an unknown
//! transition, gravity while the game is over) are dropped without emitting
//! events.

mod entities;
mod transitions;

use std::time::Duration;

use log::{debug, trace};
use marble_maze_core::{
    Command, Event, Gravity, LevelLayout, PlayerId, Position, TransitionKind, START_POSITION,
};

use self::{entities::EntityRegistry, transitions::TransitionLedger};

#[derive(Clone, Copy, Debug)]
struct Player {
    id: PlayerId,
    position: Position,
    frozen: bool,
}

/// Represents the authoritative Marble Maze world state.
#[derive(Debug)]
pub struct World {
    level: u32,
    entities: EntityRegistry,
    teleport_destinations: Vec<Position>,
    player: Option<Player>,
    next_player_id: PlayerId,
    score: i64,
    game_over: bool,
    teleporting_enabled: bool,
    gravity: Gravity,
    transitions: TransitionLedger,
    elapsed: Duration,
}

impl World {
    /// Creates an empty world with no level loaded and no player.
    #[must_use]
    pub fn new() -> Self {
        Self {
            level: 0,
            entities: EntityRegistry::new(),
            teleport_destinations: Vec::new(),
            player: None,
            next_player_id: PlayerId::new(0),
            score: 0,
            game_over: false,
            teleporting_enabled: true,
            gravity: Gravity::ZERO,
            transitions: TransitionLedger::new(),
            elapsed: Duration::ZERO,
        }
    }

    fn load_level(&mut self, layout: LevelLayout, out_events: &mut Vec<Event>) {
        self.level = layout.level();
        self.teleport_destinations = layout.teleport_destinations().to_vec();
        for descriptor in layout.descriptors() {
            let entity = self.entities.spawn(*descriptor);
            out_events.push(Event::EntitySpawned {
                entity: entity.id,
                kind: entity.kind,
                position: entity.position,
            });
        }
        out_events.push(Event::LevelLoaded {
            level: self.level,
            entities: layout.descriptors().len(),
        });
    }

    fn spawn_player(&mut self, position: Position, out_events: &mut Vec<Event>) {
        if let Some(previous) = self.player.take() {
            if let Some(orphaned) = self.transitions.discard_player(previous.id) {
                debug!(
                    "dropping {:?} transition {} of replaced player {}",
                    orphaned.kind,
                    orphaned.id.get(),
                    previous.id.get()
                );
            }
            out_events.push(Event::PlayerRemoved {
                player: previous.id,
            });
        }

        let id = self.next_player_id;
        self.next_player_id = PlayerId::new(id.get().saturating_add(1));
        self.player = Some(Player {
            id,
            position,
            frozen: false,
        });
        out_events.push(Event::PlayerSpawned {
            player: id,
            position,
        });
    }

    fn begin_transition(
        &mut self,
        kind: TransitionKind,
        anchor: Position,
        out_events: &mut Vec<Event>,
    ) {
        let Some(player) = self.player else {
            debug!("ignoring {kind:?} transition without a live player");
            return;
        };

        let respawn = match kind {
            TransitionKind::Dying => START_POSITION,
            TransitionKind::Teleporting => match self.teleport_destinations.first() {
                Some(destination) => *destination,
                None => {
                    debug!("ignoring teleport transition in a level without teleports");
                    return;
                }
            },
        };

        let (transition, superseded) = self.transitions.begin(player.id, kind, respawn);
        if let Some(superseded) = superseded {
            debug!(
                "{:?} transition {} superseded by {:?} transition {}",
                superseded.kind,
                superseded.id.get(),
                kind,
                transition.id.get()
            );
        }
        out_events.push(Event::TransitionRequested {
            transition: transition.id,
            player: player.id,
            kind,
            steps: kind.steps(anchor),
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadLevel { layout } => world.load_level(layout, out_events),
        Command::ClearEntities => {
            let count = world.entities.clear();
            world.teleport_destinations.clear();
            out_events.push(Event::EntitiesCleared { count });
        }
        Command::SpawnPlayer { position } => world.spawn_player(position, out_events),
        Command::ReportContact { player, entity } => {
            let Some(current) = world.player.filter(|current| current.id == player) else {
                trace!("ignoring contact from stale player {}", player.get());
                return;
            };
            if current.frozen {
                trace!("ignoring contact from frozen player {}", player.get());
                return;
            }
            let Some(state) = world.entities.get(entity) else {
                trace!("ignoring contact with removed entity {}", entity.get());
                return;
            };
            out_events.push(Event::ContactBegan {
                player,
                entity,
                kind: state.kind,
                position: state.position,
            });
        }
        Command::SyncPlayerPosition { player, position } => {
            if let Some(current) = world.player.as_mut().filter(|current| current.id == player) {
                current.position = position;
            }
        }
        Command::RemoveEntity { entity } => {
            if let Some(removed) = world.entities.remove(entity) {
                out_events.push(Event::EntityRemoved {
                    entity: removed.id,
                    kind: removed.kind,
                });
            }
        }
        Command::AdjustScore { delta } => {
            world.score = world.score.saturating_add(delta);
            out_events.push(Event::ScoreChanged { score: world.score });
        }
        Command::SetGameOver { game_over } => {
            if world.game_over != game_over {
                world.game_over = game_over;
                out_events.push(Event::GameOverChanged { game_over });
            }
        }
        Command::SetTeleportingEnabled { enabled } => {
            if world.teleporting_enabled != enabled {
                world.teleporting_enabled = enabled;
                out_events.push(Event::TeleportingChanged { enabled });
            }
        }
        Command::FreezePlayer => {
            if let Some(player) = world.player.as_mut().filter(|player| !player.frozen) {
                player.frozen = true;
                out_events.push(Event::PlayerFrozen { player: player.id });
            }
        }
        Command::BeginTransition { kind, anchor } => {
            world.begin_transition(kind, anchor, out_events);
        }
        Command::CompleteTransition { transition } => {
            let Some(pending) = world.transitions.take(transition) else {
                trace!("ignoring completion of unknown transition {}", transition.get());
                return;
            };
            if world.player.map(|player| player.id) != Some(pending.player) {
                debug!(
                    "ignoring completion of transition {} for departed player {}",
                    transition.get(),
                    pending.player.get()
                );
                return;
            }
            world.player = None;
            out_events.push(Event::PlayerRemoved {
                player: pending.player,
            });
            out_events.push(Event::TransitionCompleted {
                transition: pending.id,
                kind: pending.kind,
                player: pending.player,
                respawn: pending.respawn,
            });
        }
        Command::CompleteLevel => {
            out_events.push(Event::LevelCompleted { level: world.level });
        }
        Command::SetGravity { gravity } => {
            if world.game_over {
                trace!("ignoring gravity input while the game is over");
                return;
            }
            if world.gravity != gravity {
                world.gravity = gravity;
                out_events.push(Event::GravityChanged { gravity });
            }
        }
        Command::Tick { dt } => {
            world.elapsed = world.elapsed.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use marble_maze_core::{
        EntityId, EntitySnapshot, EntityView, Gravity, PlayerSnapshot, Position, TransitionKind,
    };

    /// Index of the loaded level, or zero before the first load.
    #[must_use]
    pub fn level(world: &World) -> u32 {
        world.level
    }

    /// Current score; may be negative.
    #[must_use]
    pub fn score(world: &World) -> i64 {
        world.score
    }

    /// Reports whether gravity input is currently blocked.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.game_over
    }

    /// Reports whether touching a teleport pad starts a teleport.
    #[must_use]
    pub fn teleporting_enabled(world: &World) -> bool {
        world.teleporting_enabled
    }

    /// Teleport positions of the loaded level; the first is the canonical exit.
    #[must_use]
    pub fn teleport_destinations(world: &World) -> &[Position] {
        &world.teleport_destinations
    }

    /// Snapshot of the live player, if one exists.
    #[must_use]
    pub fn player(world: &World) -> Option<PlayerSnapshot> {
        world.player.map(|player| PlayerSnapshot {
            id: player.id,
            position: player.position,
            frozen: player.frozen,
        })
    }

    /// Captures a read-only view of the live non-player entities.
    #[must_use]
    pub fn entity_view(world: &World) -> EntityView {
        EntityView::from_snapshots(world.entities.iter().map(|entity| entity.snapshot()).collect())
    }

    /// Snapshot of a single live entity.
    #[must_use]
    pub fn entity(world: &World, entity: EntityId) -> Option<EntitySnapshot> {
        world.entities.get(entity).map(|state| state.snapshot())
    }

    /// Gravity currently applied to the player.
    #[must_use]
    pub fn gravity(world: &World) -> Gravity {
        world.gravity
    }

    /// Kind of the transition the live player is committed to, if any.
    #[must_use]
    pub fn pending_transition(world: &World) -> Option<TransitionKind> {
        let player = world.player?;
        world
            .transitions
            .pending_for(player.id)
            .map(|pending| pending.kind)
    }

    /// Total simulated time accumulated through ticks.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marble_maze_core::{EntityDescriptor, EntityKind};

    fn world_with_player() -> (World, PlayerId) {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnPlayer {
                position: START_POSITION,
            },
            &mut events,
        );
        let player = query::player(&world).expect("player spawned").id;
        (world, player)
    }

    #[test]
    fn new_world_starts_idle() {
        let world = World::new();
        assert_eq!(query::level(&world), 0);
        assert_eq!(query::score(&world), 0);
        assert!(query::teleporting_enabled(&world));
        assert!(!query::is_game_over(&world));
        assert!(query::player(&world).is_none());
        assert!(query::entity_view(&world).is_empty());
    }

    #[test]
    fn spawning_replaces_the_player_instance() {
        let (mut world, first) = world_with_player();
        let mut events = Vec::new();
        let position = Position::new(10.0, 10.0);

        apply(&mut world, Command::SpawnPlayer { position }, &mut events);

        let second = query::player(&world).expect("player respawned");
        assert_ne!(second.id, first);
        assert_eq!(second.position, position);
        assert_eq!(
            events,
            vec![
                Event::PlayerRemoved { player: first },
                Event::PlayerSpawned {
                    player: second.id,
                    position,
                },
            ]
        );
    }

    #[test]
    fn frozen_player_reports_no_contacts() {
        let (mut world, player) = world_with_player();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::LoadLevel {
                layout: LevelLayout::new(
                    1,
                    vec![EntityDescriptor::new(
                        EntityKind::Star,
                        Position::tile_center(1, 1),
                    )],
                ),
            },
            &mut events,
        );
        let star = query::entity_view(&world).into_vec()[0].id;

        apply(&mut world, Command::FreezePlayer, &mut events);
        events.clear();
        apply(
            &mut world,
            Command::ReportContact {
                player,
                entity: star,
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert!(query::player(&world).expect("player live").frozen);
    }

    #[test]
    fn gravity_is_blocked_while_game_over() {
        let (mut world, _) = world_with_player();
        let mut events = Vec::new();

        apply(&mut world, Command::SetGameOver { game_over: true }, &mut events);
        apply(
            &mut world,
            Command::SetGravity {
                gravity: Gravity::new(3.0, -1.0),
            },
            &mut events,
        );

        assert_eq!(query::gravity(&world), Gravity::ZERO);
        assert_eq!(events, vec![Event::GameOverChanged { game_over: true }]);
    }

    #[test]
    fn score_changes_are_reported_immediately() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(&mut world, Command::AdjustScore { delta: -1 }, &mut events);
        apply(&mut world, Command::AdjustScore { delta: 2 }, &mut events);

        assert_eq!(
            events,
            vec![
                Event::ScoreChanged { score: -1 },
                Event::ScoreChanged { score: 1 },
            ]
        );
    }

    #[test]
    fn ticks_accumulate_elapsed_time() {
        let mut world = World::new();
        let mut events = Vec::new();
        let dt = Duration::from_millis(16);

        apply(&mut world, Command::Tick { dt }, &mut events);
        apply(&mut world, Command::Tick { dt }, &mut events);

        assert_eq!(query::elapsed(&world), Duration::from_millis(32));
        assert_eq!(events.len(), 2);
    }
}
