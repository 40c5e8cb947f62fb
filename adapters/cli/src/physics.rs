//! Minimal rigid-body stand-in for the marble.
//!
//! The marble is a damped circle pushed by gravity and blocked by
//! axis-aligned wall tiles. Sensors are circles that report a contact on the
//! tick the marble starts overlapping them. Contacts are produced in sensor
//! spawn order so that multi-contact ticks resolve deterministically.

use std::collections::BTreeSet;

use glam::Vec2;
use marble_maze_core::{
    CollisionCategory, EntityId, EntityKind, Event, Gravity, PlayerId, Position, TILE_LENGTH,
};

use crate::config::Settings;

#[derive(Clone, Copy, Debug)]
struct Marble {
    player: PlayerId,
    position: Vec2,
    velocity: Vec2,
    frozen: bool,
}

#[derive(Clone, Copy, Debug)]
struct Sensor {
    entity: EntityId,
    category: CollisionCategory,
    center: Vec2,
    radius: f32,
}

/// Physics bodies mirrored from world events.
#[derive(Debug)]
pub(crate) struct Physics {
    player_radius: f32,
    sensor_radius: f32,
    linear_damping: f32,
    points_per_unit: f32,
    walls: Vec<(EntityId, Vec2)>,
    sensors: Vec<Sensor>,
    marble: Option<Marble>,
    touching: BTreeSet<EntityId>,
}

impl Physics {
    pub(crate) fn new(settings: &Settings) -> Self {
        Self {
            player_radius: settings.player_radius,
            sensor_radius: settings.sensor_radius,
            linear_damping: settings.linear_damping,
            points_per_unit: settings.points_per_unit,
            walls: Vec::new(),
            sensors: Vec::new(),
            marble: None,
            touching: BTreeSet::new(),
        }
    }

    /// Creates and destroys bodies so they match the world.
    pub(crate) fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::EntitySpawned {
                    entity,
                    kind,
                    position,
                } => self.spawn(*entity, *kind, *position),
                Event::EntityRemoved { entity, .. } => {
                    self.walls.retain(|(id, _)| id != entity);
                    self.sensors.retain(|sensor| sensor.entity != *entity);
                    let _ = self.touching.remove(entity);
                }
                Event::EntitiesCleared { .. } => {
                    self.walls.clear();
                    self.sensors.clear();
                    self.touching.clear();
                }
                Event::PlayerSpawned { player, position } => {
                    self.marble = Some(Marble {
                        player: *player,
                        position: to_vec(*position),
                        velocity: Vec2::ZERO,
                        frozen: false,
                    });
                    self.touching.clear();
                }
                Event::PlayerRemoved { player } => {
                    if self.marble.map(|marble| marble.player) == Some(*player) {
                        self.marble = None;
                    }
                }
                Event::PlayerFrozen { player } => {
                    if let Some(marble) = self.marble.as_mut().filter(|m| m.player == *player) {
                        marble.frozen = true;
                        marble.velocity = Vec2::ZERO;
                    }
                }
                _ => {}
            }
        }
    }

    fn spawn(&mut self, entity: EntityId, kind: EntityKind, position: Position) {
        let center = to_vec(position);
        if kind.category().intersects(EntityKind::Player.collision_mask()) {
            self.walls.push((entity, center));
        } else if kind.is_sensor() {
            self.sensors.push(Sensor {
                entity,
                category: kind.category(),
                center,
                radius: self.sensor_radius * kind.sprite_scale(),
            });
        }
    }

    /// Advances the marble by `dt` seconds and reports its new position.
    ///
    /// Frozen marbles are driven by animation instead and are not integrated.
    pub(crate) fn step(&mut self, dt: f32, gravity: Gravity) -> Option<(PlayerId, Position)> {
        let radius = self.player_radius;
        let marble = self.marble.as_mut().filter(|marble| !marble.frozen)?;

        let acceleration = Vec2::new(gravity.dx(), gravity.dy()) * self.points_per_unit;
        marble.velocity += acceleration * dt;
        marble.velocity *= 1.0 / (1.0 + dt * self.linear_damping);
        marble.position += marble.velocity * dt;

        for (_, wall) in &self.walls {
            push_out_of_tile(marble, *wall, radius);
        }

        Some((marble.player, to_position(marble.position)))
    }

    /// Sensor contacts that began since the previous call, in spawn order.
    pub(crate) fn begin_contacts(&mut self) -> Vec<(PlayerId, EntityId)> {
        let Some(marble) = self.marble.filter(|marble| !marble.frozen) else {
            return Vec::new();
        };
        let mask = EntityKind::Player.contact_test_mask();

        let mut began = Vec::new();
        let mut overlapping = BTreeSet::new();
        for sensor in &self.sensors {
            if !mask.intersects(sensor.category) {
                continue;
            }
            if marble.position.distance(sensor.center) >= self.player_radius + sensor.radius {
                continue;
            }
            let _ = overlapping.insert(sensor.entity);
            if !self.touching.contains(&sensor.entity) {
                began.push((marble.player, sensor.entity));
            }
        }
        self.touching = overlapping;
        began
    }

    /// Current location of the marble belonging to `player`.
    pub(crate) fn position_of(&self, player: PlayerId) -> Option<Position> {
        self.marble
            .filter(|marble| marble.player == player)
            .map(|marble| to_position(marble.position))
    }

    /// Moves a marble under animation control.
    pub(crate) fn place(&mut self, player: PlayerId, position: Position) {
        if let Some(marble) = self.marble.as_mut().filter(|m| m.player == player) {
            marble.position = to_vec(position);
        }
    }
}

fn push_out_of_tile(marble: &mut Marble, center: Vec2, radius: f32) {
    let half = Vec2::splat(TILE_LENGTH / 2.0);
    let offset = marble.position - center;
    let closest = offset.clamp(-half, half);
    let separation = offset - closest;
    let distance = separation.length();

    let normal = if distance > f32::EPSILON {
        if distance >= radius {
            return;
        }
        marble.position += separation / distance * (radius - distance);
        separation / distance
    } else {
        // Centre inside the tile: leave along the shallowest axis.
        let depth = half - offset.abs();
        let (normal, penetration) = if depth.x < depth.y {
            (Vec2::new(offset.x.signum(), 0.0), depth.x)
        } else {
            (Vec2::new(0.0, offset.y.signum()), depth.y)
        };
        marble.position += normal * (penetration + radius);
        normal
    };

    let into_wall = marble.velocity.dot(normal);
    if into_wall < 0.0 {
        marble.velocity -= normal * into_wall;
    }
}

fn to_vec(position: Position) -> Vec2 {
    Vec2::new(position.x(), position.y())
}

fn to_position(vec: Vec2) -> Position {
    Position::new(vec.x, vec.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn physics() -> Physics {
        Physics::new(&Settings::default())
    }

    fn spawn(physics: &mut Physics, entity: u32, kind: EntityKind, position: Position) {
        physics.observe(&[Event::EntitySpawned {
            entity: EntityId::new(entity),
            kind,
            position,
        }]);
    }

    fn spawn_player(physics: &mut Physics, position: Position) -> PlayerId {
        let player = PlayerId::new(0);
        physics.observe(&[Event::PlayerSpawned { player, position }]);
        player
    }

    #[test]
    fn gravity_accelerates_the_marble() {
        let mut physics = physics();
        let player = spawn_player(&mut physics, Position::new(500.0, 500.0));

        let (reported, position) = physics
            .step(1.0 / 60.0, Gravity::new(1.0, 0.0))
            .expect("live marble moves");

        assert_eq!(reported, player);
        assert!(position.x() > 500.0);
        assert_eq!(position.y(), 500.0);
    }

    #[test]
    fn damping_slows_a_coasting_marble() {
        let mut physics = physics();
        let _ = spawn_player(&mut physics, Position::new(500.0, 500.0));
        for _ in 0..30 {
            let _ = physics.step(1.0 / 60.0, Gravity::new(2.0, 0.0));
        }
        let before = physics.marble.expect("marble").velocity.x;
        let _ = physics.step(1.0 / 60.0, Gravity::ZERO);
        let after = physics.marble.expect("marble").velocity.x;
        assert!(after < before);
        assert!(after > 0.0);
    }

    #[test]
    fn walls_stop_the_marble() {
        let mut physics = physics();
        let wall = Position::tile_center(2, 1);
        spawn(&mut physics, 1, EntityKind::Wall, wall);
        let _ = spawn_player(&mut physics, Position::tile_center(1, 1));

        let mut last = None;
        for _ in 0..240 {
            last = physics.step(1.0 / 60.0, Gravity::new(5.0, 0.0));
        }

        let (_, position) = last.expect("marble moved");
        let limit = wall.x() - TILE_LENGTH / 2.0 - Settings::default().player_radius;
        assert!(position.x() <= limit + 0.01, "{} beyond {limit}", position.x());
    }

    #[test]
    fn contacts_begin_once_per_overlap_in_spawn_order() {
        let mut physics = physics();
        let spot = Position::new(300.0, 300.0);
        spawn(&mut physics, 7, EntityKind::Finish, spot);
        spawn(&mut physics, 3, EntityKind::Star, spot);
        let player = spawn_player(&mut physics, spot);

        assert_eq!(
            physics.begin_contacts(),
            vec![
                (player, EntityId::new(7)),
                (player, EntityId::new(3)),
            ]
        );
        assert!(physics.begin_contacts().is_empty(), "overlap already began");
    }

    #[test]
    fn walls_never_report_contacts() {
        let mut physics = physics();
        let spot = Position::new(300.0, 300.0);
        spawn(&mut physics, 1, EntityKind::Wall, spot);
        let _ = spawn_player(&mut physics, Position::new(300.0, 340.0));
        assert!(physics.begin_contacts().is_empty());
    }

    #[test]
    fn teleport_sensor_is_half_size() {
        let mut physics = physics();
        spawn(&mut physics, 1, EntityKind::Teleport, Position::new(0.0, 0.0));
        let _ = spawn_player(&mut physics, Position::new(45.0, 0.0));
        assert!(physics.begin_contacts().is_empty());

        physics.place(PlayerId::new(0), Position::new(35.0, 0.0));
        assert_eq!(physics.begin_contacts().len(), 1);
    }

    #[test]
    fn frozen_marble_neither_moves_nor_touches() {
        let mut physics = physics();
        let spot = Position::new(300.0, 300.0);
        spawn(&mut physics, 1, EntityKind::Star, spot);
        let player = spawn_player(&mut physics, Position::new(500.0, 500.0));
        physics.observe(&[Event::PlayerFrozen { player }]);
        physics.place(player, spot);

        assert!(physics.step(1.0 / 60.0, Gravity::new(1.0, 1.0)).is_none());
        assert!(physics.begin_contacts().is_empty());
        assert_eq!(physics.position_of(player), Some(spot));
    }
}
