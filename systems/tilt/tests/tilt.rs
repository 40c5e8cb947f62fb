use marble_maze_core::{Command, Gravity, Position, START_POSITION};
use marble_maze_system_tilt::{Config, Tilt, TiltInput};
use marble_maze_world::{self as world, query, World};

fn world_with_player() -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnPlayer {
            position: START_POSITION,
        },
        &mut events,
    );
    world
}

fn gravity_after(world: &mut World, tilt: &Tilt, input: TiltInput) -> Gravity {
    let player = query::player(world);
    let mut commands = Vec::new();
    tilt.handle(
        input,
        player.as_ref(),
        query::is_game_over(world),
        &mut commands,
    );
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    query::gravity(world)
}

#[test]
fn accelerometer_maps_landscape_axes() {
    let mut world = world_with_player();
    let tilt = Tilt::default();

    let gravity = gravity_after(&mut world, &tilt, TiltInput::Accelerometer { x: 0.2, y: -0.1 });

    assert!((gravity.dx() - 5.0).abs() < 1e-4);
    assert!((gravity.dy() - 10.0).abs() < 1e-4);
}

#[test]
fn pointer_drag_pulls_toward_pointer() {
    let mut world = world_with_player();
    let tilt = Tilt::new(Config::new(50.0, 100.0));
    let pointer = Position::new(START_POSITION.x() + 200.0, START_POSITION.y() - 50.0);

    let gravity = gravity_after(&mut world, &tilt, TiltInput::PointerDrag { pointer });

    assert_eq!(gravity, Gravity::new(2.0, -0.5));
}

#[test]
fn idle_input_releases_gravity() {
    let mut world = world_with_player();
    let tilt = Tilt::default();
    let _ = gravity_after(&mut world, &tilt, TiltInput::Accelerometer { x: 1.0, y: 1.0 });

    let gravity = gravity_after(&mut world, &tilt, TiltInput::Idle);

    assert_eq!(gravity, Gravity::ZERO);
}

#[test]
fn game_over_blocks_new_input() {
    let mut world = world_with_player();
    let tilt = Tilt::default();
    let before = gravity_after(&mut world, &tilt, TiltInput::Accelerometer { x: 0.5, y: 0.0 });
    let mut events = Vec::new();
    world::apply(&mut world, Command::SetGameOver { game_over: true }, &mut events);

    let mut commands = Vec::new();
    tilt.handle(
        TiltInput::Accelerometer { x: -1.0, y: 1.0 },
        query::player(&world).as_ref(),
        query::is_game_over(&world),
        &mut commands,
    );

    assert!(commands.is_empty());
    assert_eq!(query::gravity(&world), before);
}

#[test]
fn pointer_drag_without_player_emits_nothing() {
    let tilt = Tilt::default();
    let mut commands = Vec::new();

    tilt.handle(
        TiltInput::PointerDrag {
            pointer: Position::new(1.0, 1.0),
        },
        None,
        false,
        &mut commands,
    );

    assert!(commands.is_empty());
}
