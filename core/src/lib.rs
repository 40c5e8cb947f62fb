#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Marble Maze engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::{ops::BitOr, time::Duration};

use serde::{Deserialize, Serialize};

/// Side length of a single square level tile expressed in world units.
pub const TILE_LENGTH: f32 = 64.0;

/// Fixed location where the marble appears after loading, dying, or finishing.
pub const START_POSITION: Position = Position::new(96.0, 672.0);

/// Index of the first level loaded when the experience boots.
pub const FIRST_LEVEL: u32 = 1;

/// Scale the marble shrinks to before being removed during a transition.
pub const SHRUNK_SCALE: f32 = 0.0001;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Materializes every descriptor of a parsed level into live entities.
    LoadLevel {
        /// Parsed layout describing the level to instantiate.
        layout: LevelLayout,
    },
    /// Destroys every non-player entity.
    ClearEntities,
    /// Destroys the current player, if any, and creates a new one.
    SpawnPlayer {
        /// Location where the new player appears.
        position: Position,
    },
    /// Reports that the physics collaborator detected the player overlapping an entity.
    ReportContact {
        /// Player instance involved in the contact.
        player: PlayerId,
        /// Entity the player touched.
        entity: EntityId,
    },
    /// Mirrors the physics-owned player position into the world.
    SyncPlayerPosition {
        /// Player instance whose position is being reported.
        player: PlayerId,
        /// Current position of the player body.
        position: Position,
    },
    /// Destroys a single non-player entity.
    RemoveEntity {
        /// Identifier of the entity to destroy.
        entity: EntityId,
    },
    /// Adds the provided delta to the score.
    AdjustScore {
        /// Signed amount added to the score.
        delta: i64,
    },
    /// Updates the game-over flag that blocks gravity input.
    SetGameOver {
        /// Desired state of the flag.
        game_over: bool,
    },
    /// Updates the teleport latch.
    SetTeleportingEnabled {
        /// Desired state of the latch.
        enabled: bool,
    },
    /// Removes the current player from the physics simulation.
    FreezePlayer,
    /// Starts an animated transition on the current player.
    BeginTransition {
        /// Purpose of the transition, which selects steps and respawn target.
        kind: TransitionKind,
        /// Position the player moves to before shrinking.
        anchor: Position,
    },
    /// Reports that the rendering collaborator finished a transition.
    CompleteTransition {
        /// Identifier handed out when the transition was requested.
        transition: TransitionId,
    },
    /// Marks the active level as completed.
    CompleteLevel,
    /// Updates the gravity vector applied to the player.
    SetGravity {
        /// Gravity derived from the current input.
        gravity: Gravity,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a level was materialized.
    LevelLoaded {
        /// Index of the level that became active.
        level: u32,
        /// Number of non-player entities created for the level.
        entities: usize,
    },
    /// Confirms that a non-player entity was created.
    EntitySpawned {
        /// Identifier assigned to the entity.
        entity: EntityId,
        /// Kind of the entity.
        kind: EntityKind,
        /// Location of the entity.
        position: Position,
    },
    /// Confirms that a single non-player entity was destroyed.
    EntityRemoved {
        /// Identifier of the destroyed entity.
        entity: EntityId,
        /// Kind of the destroyed entity.
        kind: EntityKind,
    },
    /// Confirms that every non-player entity was destroyed.
    EntitiesCleared {
        /// Number of entities destroyed.
        count: usize,
    },
    /// Confirms that a new player instance was created.
    PlayerSpawned {
        /// Identifier of the new player.
        player: PlayerId,
        /// Location of the new player.
        position: Position,
    },
    /// Confirms that a player instance was destroyed.
    PlayerRemoved {
        /// Identifier of the destroyed player.
        player: PlayerId,
    },
    /// Confirms that the player stopped taking part in physics.
    PlayerFrozen {
        /// Identifier of the frozen player.
        player: PlayerId,
    },
    /// Announces a validated contact between the live player and a live entity.
    ContactBegan {
        /// Player involved in the contact.
        player: PlayerId,
        /// Entity the player touched.
        entity: EntityId,
        /// Kind of the touched entity.
        kind: EntityKind,
        /// Location of the touched entity.
        position: Position,
    },
    /// Reports the score after every mutation.
    ScoreChanged {
        /// Score after the mutation.
        score: i64,
    },
    /// Reports a change of the game-over flag.
    GameOverChanged {
        /// New state of the flag.
        game_over: bool,
    },
    /// Reports a change of the teleport latch.
    TeleportingChanged {
        /// New state of the latch.
        enabled: bool,
    },
    /// Requests that the rendering collaborator animate the player.
    ///
    /// The collaborator must answer with exactly one
    /// [`Command::CompleteTransition`] once the final `Remove` step finishes.
    TransitionRequested {
        /// Identifier the completion must quote.
        transition: TransitionId,
        /// Player instance being animated.
        player: PlayerId,
        /// Purpose of the transition.
        kind: TransitionKind,
        /// Ordered animation steps to run.
        steps: Vec<AnimationStep>,
    },
    /// Confirms that a transition finished and its player was destroyed.
    TransitionCompleted {
        /// Identifier of the finished transition.
        transition: TransitionId,
        /// Purpose of the transition.
        kind: TransitionKind,
        /// Player instance that was animated and destroyed.
        player: PlayerId,
        /// Location where the continuation should respawn the player.
        respawn: Position,
    },
    /// Announces that the active level was completed.
    LevelCompleted {
        /// Index of the completed level.
        level: u32,
    },
    /// Reports a change of the gravity vector.
    GravityChanged {
        /// Gravity now applied to the player.
        gravity: Gravity,
    },
}

/// Location expressed in world units with the origin at the bottom-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    x: f32,
    y: f32,
}

impl Position {
    /// Creates a new position from world-unit coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Centre of the tile at the provided grid column and row.
    ///
    /// Row zero is the bottom row of the maze.
    #[must_use]
    pub fn tile_center(column: u32, row: u32) -> Self {
        let half = TILE_LENGTH / 2.0;
        Self {
            x: TILE_LENGTH * column as f32 + half,
            y: TILE_LENGTH * row as f32 + half,
        }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Euclidean distance between two positions.
    #[must_use]
    pub fn distance_to(self, other: Position) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Physics category bits used for contact-test and collision masks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollisionCategory(u32);

impl CollisionCategory {
    /// Empty mask.
    pub const NONE: Self = Self(0);
    /// Category of the marble.
    pub const PLAYER: Self = Self(1);
    /// Category of wall tiles.
    pub const WALL: Self = Self(2);
    /// Category of collectible stars.
    pub const STAR: Self = Self(4);
    /// Category of vortex hazards.
    pub const VORTEX: Self = Self(8);
    /// Category of teleport pads.
    pub const TELEPORT: Self = Self(16);
    /// Category of finish tiles.
    pub const FINISH: Self = Self(32);

    /// Raw bit representation.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Combines two masks.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Reports whether every bit of `other` is present in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Reports whether the masks share at least one bit.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for CollisionCategory {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

/// Closed set of entity types that populate a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Static block that physically stops the marble.
    Wall,
    /// Collectible worth one point.
    Star,
    /// Hazard that kills the marble.
    Vortex,
    /// Pad that sends the marble to the canonical teleport exit.
    Teleport,
    /// Tile that completes the level.
    Finish,
    /// The marble itself.
    Player,
}

impl EntityKind {
    /// Every kind that can appear in a level file.
    pub const PLACEABLE: [EntityKind; 5] = [
        Self::Wall,
        Self::Star,
        Self::Vortex,
        Self::Teleport,
        Self::Finish,
    ];

    /// Resolves a level-file symbol into the kind it places.
    ///
    /// Returns `None` for the empty-space symbol and for unknown symbols; the
    /// parser distinguishes the two.
    #[must_use]
    pub const fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'x' => Some(Self::Wall),
            's' => Some(Self::Star),
            'v' => Some(Self::Vortex),
            't' => Some(Self::Teleport),
            'f' => Some(Self::Finish),
            _ => None,
        }
    }

    /// Symbol used for the kind in level files, if it can be placed.
    #[must_use]
    pub const fn symbol(self) -> Option<char> {
        match self {
            Self::Wall => Some('x'),
            Self::Star => Some('s'),
            Self::Vortex => Some('v'),
            Self::Teleport => Some('t'),
            Self::Finish => Some('f'),
            Self::Player => None,
        }
    }

    /// Single collision category bit owned by the kind.
    #[must_use]
    pub const fn category(self) -> CollisionCategory {
        match self {
            Self::Player => CollisionCategory::PLAYER,
            Self::Wall => CollisionCategory::WALL,
            Self::Star => CollisionCategory::STAR,
            Self::Vortex => CollisionCategory::VORTEX,
            Self::Teleport => CollisionCategory::TELEPORT,
            Self::Finish => CollisionCategory::FINISH,
        }
    }

    /// Categories whose overlap with this kind produces contact events.
    #[must_use]
    pub const fn contact_test_mask(self) -> CollisionCategory {
        match self {
            Self::Player => CollisionCategory::STAR
                .union(CollisionCategory::VORTEX)
                .union(CollisionCategory::TELEPORT)
                .union(CollisionCategory::FINISH),
            Self::Wall => CollisionCategory::NONE,
            Self::Star | Self::Vortex | Self::Teleport | Self::Finish => CollisionCategory::PLAYER,
        }
    }

    /// Categories this kind physically collides with.
    #[must_use]
    pub const fn collision_mask(self) -> CollisionCategory {
        match self {
            Self::Player => CollisionCategory::WALL,
            Self::Wall => CollisionCategory::PLAYER,
            Self::Star | Self::Vortex | Self::Teleport | Self::Finish => CollisionCategory::NONE,
        }
    }

    /// Reports whether the marble passes through the kind, detecting overlap only.
    #[must_use]
    pub const fn is_sensor(self) -> bool {
        matches!(
            self,
            Self::Star | Self::Vortex | Self::Teleport | Self::Finish
        )
    }

    /// Uniform scale applied to the kind's sprite.
    #[must_use]
    pub const fn sprite_scale(self) -> f32 {
        match self {
            Self::Teleport => 0.5,
            _ => 1.0,
        }
    }
}

/// Immutable parsed representation of one level entity before instantiation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    kind: EntityKind,
    position: Position,
}

impl EntityDescriptor {
    /// Creates a descriptor for an entity of the provided kind.
    #[must_use]
    pub const fn new(kind: EntityKind, position: Position) -> Self {
        Self { kind, position }
    }

    /// Kind of entity described.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Location of the entity.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }
}

/// Parsed level ready to be materialized by the world.
///
/// Teleport destinations are derived from the teleport descriptors in parse
/// order, so a level containing a teleport always has at least one exit.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LevelLayout {
    level: u32,
    descriptors: Vec<EntityDescriptor>,
    teleport_destinations: Vec<Position>,
}

impl LevelLayout {
    /// Builds a layout from descriptors listed in parse order.
    #[must_use]
    pub fn new(level: u32, descriptors: Vec<EntityDescriptor>) -> Self {
        let teleport_destinations = descriptors
            .iter()
            .filter(|descriptor| descriptor.kind() == EntityKind::Teleport)
            .map(EntityDescriptor::position)
            .collect();
        Self {
            level,
            descriptors,
            teleport_destinations,
        }
    }

    /// Index of the level the layout was parsed for.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Descriptors in parse order.
    #[must_use]
    pub fn descriptors(&self) -> &[EntityDescriptor] {
        &self.descriptors
    }

    /// Teleport positions in parse order; the first entry is the canonical exit.
    #[must_use]
    pub fn teleport_destinations(&self) -> &[Position] {
        &self.teleport_destinations
    }

    /// Number of descriptors of the provided kind.
    #[must_use]
    pub fn count_of(&self, kind: EntityKind) -> usize {
        self.descriptors
            .iter()
            .filter(|descriptor| descriptor.kind() == kind)
            .count()
    }
}

/// Unique identifier assigned to a non-player entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to each player instance.
///
/// Respawning creates a new instance with a fresh identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(u32);

impl PlayerId {
    /// Creates a new player identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier handed to the rendering collaborator for each transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionId(u32);

impl TransitionId {
    /// Creates a new transition identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Gravity vector applied to the marble.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Gravity {
    dx: f32,
    dy: f32,
}

impl Gravity {
    /// Gravity that leaves the marble at rest.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Creates a new gravity vector.
    #[must_use]
    pub const fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn dx(&self) -> f32 {
        self.dx
    }

    /// Vertical component.
    #[must_use]
    pub const fn dy(&self) -> f32 {
        self.dy
    }
}

/// Single step of a transition animation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnimationStep {
    /// Moves the animated node to the target.
    MoveTo {
        /// Destination of the move.
        target: Position,
        /// Time the move takes.
        duration: Duration,
    },
    /// Scales the animated node uniformly.
    ScaleTo {
        /// Final uniform scale.
        scale: f32,
        /// Time the scale takes.
        duration: Duration,
    },
    /// Removes the animated node; completes instantly.
    Remove,
}

impl AnimationStep {
    /// Time the step takes to run.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        match self {
            Self::MoveTo { duration, .. } | Self::ScaleTo { duration, .. } => *duration,
            Self::Remove => Duration::ZERO,
        }
    }
}

/// Purpose of an animated player transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    /// The marble fell into a vortex.
    Dying,
    /// The marble entered a teleport pad.
    Teleporting,
}

impl TransitionKind {
    /// Time spent moving the marble onto the touched entity.
    #[must_use]
    pub const fn approach_duration(self) -> Duration {
        match self {
            Self::Dying => Duration::from_millis(250),
            Self::Teleporting => Duration::from_millis(500),
        }
    }

    /// Time spent shrinking the marble before removal.
    #[must_use]
    pub const fn shrink_duration(self) -> Duration {
        Duration::from_millis(250)
    }

    /// Ordered move, scale and remove steps anchored on the touched entity.
    #[must_use]
    pub fn steps(self, anchor: Position) -> Vec<AnimationStep> {
        vec![
            AnimationStep::MoveTo {
                target: anchor,
                duration: self.approach_duration(),
            },
            AnimationStep::ScaleTo {
                scale: SHRUNK_SCALE,
                duration: self.shrink_duration(),
            },
            AnimationStep::Remove,
        ]
    }
}

/// Immutable representation of a single entity used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntitySnapshot {
    /// Identifier assigned to the entity.
    pub id: EntityId,
    /// Kind of the entity.
    pub kind: EntityKind,
    /// Location of the entity.
    pub position: Position,
}

/// Read-only snapshot describing all live non-player entities.
#[derive(Clone, Debug, Default)]
pub struct EntityView {
    snapshots: Vec<EntitySnapshot>,
}

impl EntityView {
    /// Creates a new entity view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EntitySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &EntitySnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no entity was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Number of captured entities of the provided kind.
    #[must_use]
    pub fn count_of(&self, kind: EntityKind) -> usize {
        self.snapshots
            .iter()
            .filter(|snapshot| snapshot.kind == kind)
            .count()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EntitySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of the live player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Identifier of the player instance.
    pub id: PlayerId,
    /// Last position reported for the player.
    pub position: Position,
    /// Indicates whether the player was removed from physics.
    pub frozen: bool,
}
