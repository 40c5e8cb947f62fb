#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure collision-response system that resolves player contacts into world commands.
//!
//! The system reacts to two events. [`Event::ContactBegan`] is mapped through
//! the contact table below, and [`Event::TransitionCompleted`] runs the
//! continuation of a vortex or teleport transition once its animation has
//! finished.
//!
//! | kind     | commands                                                              |
//! |----------|-----------------------------------------------------------------------|
//! | Wall     | none, walls block the marble physically                               |
//! | Star     | remove the star, score +1                                             |
//! | Vortex   | freeze, game over, score -1, re-enable teleports, dying transition    |
//! | Teleport | when enabled: disable teleports, teleport transition                  |
//! | Finish   | clear entities, respawn at start, clear game over, complete the level |

use marble_maze_core::{
    Command, EntityId, EntityKind, Event, PlayerId, Position, TransitionKind, START_POSITION,
};

/// Collision resolver that translates contacts and transition completions into commands.
#[derive(Clone, Copy, Debug, Default)]
pub struct Collision;

impl Collision {
    /// Creates a new collision system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Consumes world events and emits the commands that resolve them.
    ///
    /// `teleporting_enabled` must mirror the world's teleport latch as queried
    /// after `events` were produced. The latch and player retirement are
    /// tracked across the batch so that several contacts reported in one tick
    /// resolve as if they had been applied one at a time.
    pub fn handle(&self, events: &[Event], teleporting_enabled: bool, out: &mut Vec<Command>) {
        let mut batch = Batch {
            teleporting_enabled,
            retired: None,
        };

        for event in events {
            match event {
                Event::ContactBegan {
                    player,
                    entity,
                    kind,
                    position,
                } => {
                    if batch.retired == Some(*player) {
                        continue;
                    }
                    batch.resolve_contact(*player, *entity, *kind, *position, out);
                }
                Event::TransitionCompleted { kind, respawn, .. } => {
                    continue_transition(*kind, *respawn, out);
                }
                _ => {}
            }
        }
    }
}

#[derive(Debug)]
struct Batch {
    teleporting_enabled: bool,
    retired: Option<PlayerId>,
}

impl Batch {
    fn resolve_contact(
        &mut self,
        player: PlayerId,
        entity: EntityId,
        kind: EntityKind,
        position: Position,
        out: &mut Vec<Command>,
    ) {
        match kind {
            EntityKind::Wall | EntityKind::Player => {}
            EntityKind::Star => {
                out.push(Command::RemoveEntity { entity });
                out.push(Command::AdjustScore { delta: 1 });
            }
            EntityKind::Vortex => {
                self.retired = Some(player);
                self.teleporting_enabled = true;
                out.push(Command::FreezePlayer);
                out.push(Command::SetGameOver { game_over: true });
                out.push(Command::AdjustScore { delta: -1 });
                out.push(Command::SetTeleportingEnabled { enabled: true });
                out.push(Command::BeginTransition {
                    kind: TransitionKind::Dying,
                    anchor: position,
                });
            }
            EntityKind::Teleport => {
                if !self.teleporting_enabled {
                    return;
                }
                self.teleporting_enabled = false;
                out.push(Command::SetTeleportingEnabled { enabled: false });
                out.push(Command::BeginTransition {
                    kind: TransitionKind::Teleporting,
                    anchor: position,
                });
            }
            EntityKind::Finish => {
                self.retired = Some(player);
                out.push(Command::ClearEntities);
                out.push(Command::SpawnPlayer {
                    position: START_POSITION,
                });
                out.push(Command::SetGameOver { game_over: false });
                out.push(Command::CompleteLevel);
            }
        }
    }
}

// Teleport arrival leaves the latch closed; only a vortex reopens it.
fn continue_transition(kind: TransitionKind, respawn: Position, out: &mut Vec<Command>) {
    out.push(Command::SpawnPlayer { position: respawn });
    if kind == TransitionKind::Dying {
        out.push(Command::SetGameOver { game_over: false });
    }
}
