//! Drives transition animations and reports each completion once.

use std::{collections::VecDeque, time::Duration};

use marble_maze_core::{AnimationStep, Event, PlayerId, Position, TransitionId};

use crate::physics::Physics;

/// Animated placement of a marble on the current tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Pose {
    pub(crate) player: PlayerId,
    pub(crate) position: Position,
    pub(crate) scale: f32,
}

/// Output of one animation tick.
#[derive(Debug, Default)]
pub(crate) struct Frame {
    pub(crate) poses: Vec<Pose>,
    pub(crate) completed: Vec<TransitionId>,
}

#[derive(Debug)]
struct Track {
    transition: TransitionId,
    player: PlayerId,
    steps: VecDeque<AnimationStep>,
    elapsed: Duration,
    origin: Position,
    origin_scale: f32,
    position: Position,
    scale: f32,
}

impl Track {
    fn new(transition: TransitionId, player: PlayerId, steps: &[AnimationStep], at: Position) -> Self {
        Self {
            transition,
            player,
            steps: steps.iter().copied().collect(),
            elapsed: Duration::ZERO,
            origin: at,
            origin_scale: 1.0,
            position: at,
            scale: 1.0,
        }
    }

    /// Runs the track for `budget`, returning true once its `Remove` step ran.
    fn advance(&mut self, mut budget: Duration) -> bool {
        while let Some(step) = self.steps.front().copied() {
            let duration = step.duration();
            let remaining = duration.saturating_sub(self.elapsed);
            let finished = budget >= remaining;
            self.elapsed = if finished {
                duration
            } else {
                self.elapsed + budget
            };
            let progress = if duration.is_zero() {
                1.0
            } else {
                self.elapsed.as_secs_f32() / duration.as_secs_f32()
            };

            match step {
                AnimationStep::MoveTo { target, .. } => {
                    self.position = lerp_position(self.origin, target, progress);
                }
                AnimationStep::ScaleTo { scale, .. } => {
                    self.scale = self.origin_scale + (scale - self.origin_scale) * progress;
                }
                AnimationStep::Remove => return true,
            }

            if !finished {
                return false;
            }
            budget -= remaining;
            let _ = self.steps.pop_front();
            self.elapsed = Duration::ZERO;
            self.origin = self.position;
            self.origin_scale = self.scale;
        }
        // A sequence without `Remove` never completes.
        false
    }
}

fn lerp_position(from: Position, to: Position, progress: f32) -> Position {
    Position::new(
        from.x() + (to.x() - from.x()) * progress,
        from.y() + (to.y() - from.y()) * progress,
    )
}

/// Runs the animation steps of every requested transition.
#[derive(Debug, Default)]
pub(crate) struct Animator {
    tracks: Vec<Track>,
}

impl Animator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Starts tracks for new transitions and drops tracks of departed players.
    pub(crate) fn observe(&mut self, events: &[Event], physics: &Physics) {
        for event in events {
            match event {
                Event::TransitionRequested {
                    transition,
                    player,
                    steps,
                    ..
                } => {
                    let at = physics
                        .position_of(*player)
                        .or_else(|| first_target(steps))
                        .unwrap_or_default();
                    self.tracks.retain(|track| track.player != *player);
                    self.tracks.push(Track::new(*transition, *player, steps, at));
                }
                Event::PlayerRemoved { player } => {
                    self.tracks.retain(|track| track.player != *player);
                }
                _ => {}
            }
        }
    }

    /// Advances every track by `dt`.
    ///
    /// A transition appears in [`Frame::completed`] on exactly one tick, after
    /// which its track is discarded.
    pub(crate) fn advance(&mut self, dt: Duration) -> Frame {
        let mut frame = Frame::default();
        self.tracks.retain_mut(|track| {
            let done = track.advance(dt);
            if done {
                frame.completed.push(track.transition);
            } else {
                frame.poses.push(Pose {
                    player: track.player,
                    position: track.position,
                    scale: track.scale,
                });
            }
            !done
        });
        frame
    }
}

fn first_target(steps: &[AnimationStep]) -> Option<Position> {
    steps.iter().find_map(|step| match step {
        AnimationStep::MoveTo { target, .. } => Some(*target),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use marble_maze_core::{TransitionKind, SHRUNK_SCALE};

    const TICK: Duration = Duration::from_millis(50);

    fn request(animator: &mut Animator, transition: u32, player: u32, kind: TransitionKind) {
        let mut physics = Physics::new(&Settings::default());
        physics.observe(&[Event::PlayerSpawned {
            player: PlayerId::new(player),
            position: Position::new(0.0, 0.0),
        }]);
        animator.observe(
            &[Event::TransitionRequested {
                transition: TransitionId::new(transition),
                player: PlayerId::new(player),
                kind,
                steps: kind.steps(Position::new(100.0, 0.0)),
            }],
            &physics,
        );
    }

    #[test]
    fn dying_completes_once_after_half_a_second() {
        let mut animator = Animator::new();
        request(&mut animator, 4, 0, TransitionKind::Dying);

        let mut completions = Vec::new();
        let mut ticks = 0;
        for _ in 0..40 {
            let frame = animator.advance(TICK);
            if frame.completed.is_empty() {
                ticks += 1;
            }
            completions.extend(frame.completed);
        }

        assert_eq!(completions, vec![TransitionId::new(4)]);
        assert_eq!(ticks, 39);
        assert!(animator.tracks.is_empty());
    }

    #[test]
    fn marble_moves_then_shrinks() {
        let mut animator = Animator::new();
        request(&mut animator, 0, 0, TransitionKind::Teleporting);

        let halfway = animator.advance(Duration::from_millis(250));
        assert_eq!(halfway.poses[0].position, Position::new(50.0, 0.0));
        assert_eq!(halfway.poses[0].scale, 1.0);

        let arrived = animator.advance(Duration::from_millis(250));
        assert_eq!(arrived.poses[0].position, Position::new(100.0, 0.0));

        let shrunk = animator.advance(Duration::from_millis(249));
        assert!(shrunk.poses[0].scale < 0.01);
        assert!(shrunk.poses[0].scale > SHRUNK_SCALE);

        let removed = animator.advance(Duration::from_millis(1));
        assert_eq!(removed.completed, vec![TransitionId::new(0)]);
        assert!(removed.poses.is_empty());
    }

    #[test]
    fn oversized_tick_runs_every_step() {
        let mut animator = Animator::new();
        request(&mut animator, 9, 0, TransitionKind::Teleporting);
        let frame = animator.advance(Duration::from_secs(2));
        assert_eq!(frame.completed, vec![TransitionId::new(9)]);
    }

    #[test]
    fn newer_transition_replaces_the_track() {
        let mut animator = Animator::new();
        request(&mut animator, 1, 0, TransitionKind::Teleporting);
        request(&mut animator, 2, 0, TransitionKind::Dying);

        let frame = animator.advance(Duration::from_secs(1));
        assert_eq!(frame.completed, vec![TransitionId::new(2)]);
    }

    #[test]
    fn removed_player_drops_its_track() {
        let mut animator = Animator::new();
        request(&mut animator, 1, 3, TransitionKind::Teleporting);
        animator.observe(
            &[Event::PlayerRemoved {
                player: PlayerId::new(3),
            }],
            &Physics::new(&Settings::default()),
        );
        assert!(animator.tracks.is_empty());
        assert!(animator.advance(Duration::from_secs(1)).completed.is_empty());
    }
}
