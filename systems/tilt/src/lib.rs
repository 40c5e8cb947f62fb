#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure input system that turns device tilt into gravity commands.

use marble_maze_core::{Command, Gravity, PlayerSnapshot, Position};

const DEFAULT_ACCELEROMETER_SCALE: f32 = 50.0;
const DEFAULT_DRAG_DIVISOR: f32 = 100.0;

/// Raw control input sampled by the adapter on a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum TiltInput {
    /// Accelerometer reading of a device held in landscape orientation.
    Accelerometer {
        /// Acceleration along the device's x axis.
        x: f32,
        /// Acceleration along the device's y axis.
        y: f32,
    },
    /// Pointer held down at a world position, used where no accelerometer exists.
    PointerDrag {
        /// Pointer location in world units.
        pointer: Position,
    },
    /// No input is active.
    #[default]
    Idle,
}

/// Configuration parameters required to construct the tilt system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    accelerometer_scale: f32,
    drag_divisor: f32,
}

impl Config {
    /// Creates a configuration with explicit accelerometer scale and drag divisor.
    #[must_use]
    pub const fn new(accelerometer_scale: f32, drag_divisor: f32) -> Self {
        Self {
            accelerometer_scale,
            drag_divisor,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_ACCELEROMETER_SCALE, DEFAULT_DRAG_DIVISOR)
    }
}

/// Input system that emits the gravity applied to the marble each tick.
#[derive(Debug, Default)]
pub struct Tilt {
    config: Config,
}

impl Tilt {
    /// Creates a new tilt system using the supplied configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Converts the tick's input into a gravity command.
    ///
    /// Nothing is emitted while the game is over, so the marble keeps the
    /// gravity it had when the vortex claimed it.
    pub fn handle(
        &self,
        input: TiltInput,
        player: Option<&PlayerSnapshot>,
        game_over: bool,
        out: &mut Vec<Command>,
    ) {
        if game_over {
            return;
        }

        if let Some(gravity) = self.gravity_for(input, player) {
            out.push(Command::SetGravity { gravity });
        }
    }

    fn gravity_for(&self, input: TiltInput, player: Option<&PlayerSnapshot>) -> Option<Gravity> {
        match input {
            TiltInput::Accelerometer { x, y } => Some(Gravity::new(
                y * -self.config.accelerometer_scale,
                x * self.config.accelerometer_scale,
            )),
            TiltInput::PointerDrag { pointer } => {
                let player = player?;
                if self.config.drag_divisor == 0.0 {
                    return Some(Gravity::ZERO);
                }
                Some(Gravity::new(
                    (pointer.x() - player.position.x()) / self.config.drag_divisor,
                    (pointer.y() - player.position.y()) / self.config.drag_divisor,
                ))
            }
            TiltInput::Idle => Some(Gravity::ZERO),
        }
    }
}
