use art_gallery_core::{
    Command, Event, GamePhase, GenerationTuning, GuardId, PlacementError, Point, Polygon, Settings,
};
use art_gallery_geometry as geometry;
use art_gallery_world::{apply, query, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    apply(world, command, &mut events).expect("command succeeds");
    events
}

fn new_game(settings: Settings, seed: u64) -> World {
    let mut world = World::new();
    let events = run(&mut world, Command::NewGame { settings, seed });
    assert!(matches!(events.as_slice(), [Event::GameStarted { .. }]));
    world
}

fn single_room(max_guards: u32, blind: bool) -> Settings {
    Settings::new(1, max_guards, 0.25, blind).expect("valid settings")
}

#[test]
fn filling_every_slot_finishes_the_game() {
    let mut world = new_game(single_room(2, false), 5);
    assert_eq!(query::remaining_guards(&world), 2);

    let first = run(
        &mut world,
        Command::AddGuard {
            position: Point::new(-0.5, 0.0),
        },
    );
    assert_eq!(first.len(), 1);
    assert_eq!(query::phase(&world), GamePhase::InProgress);

    let second = run(
        &mut world,
        Command::AddGuard {
            position: Point::new(0.5, 0.0),
        },
    );
    assert_eq!(
        second,
        vec![
            Event::GuardPlaced {
                guard: GuardId::new(2),
                position: Point::new(0.5, 0.0),
            },
            Event::GameFinished,
        ]
    );
    assert!(query::is_finished(&world));
    assert_eq!(query::remaining_guards(&world), 0);

    let rejected = run(
        &mut world,
        Command::AddGuard {
            position: Point::new(0.0, 0.0),
        },
    );
    assert_eq!(
        rejected,
        vec![Event::GuardPlacementRejected {
            position: Point::new(0.0, 0.0),
            reason: PlacementError::CapacityReached,
        }]
    );
    assert_eq!(query::guard_count(&world), 2);
    assert_eq!(query::next_guard_id(&world), GuardId::new(3));
    let positions: Vec<Point> = query::guard_view(&world)
        .iter()
        .map(|guard| guard.position)
        .collect();
    assert_eq!(positions, vec![Point::new(-0.5, 0.0), Point::new(0.5, 0.0)]);

    let _ = run(&mut world, Command::RemoveLastGuard);
    assert_eq!(query::phase(&world), GamePhase::InProgress);
}

#[test]
fn out_of_bounds_is_checked_before_capacity() {
    let mut world = new_game(single_room(1, false), 5);
    let _ = run(
        &mut world,
        Command::AddGuard {
            position: Point::new(0.0, 0.0),
        },
    );

    for position in [Point::new(5.0, 5.0), Point::new(1.0, 0.0)] {
        let events = run(&mut world, Command::AddGuard { position });
        assert_eq!(
            events,
            vec![Event::GuardPlacementRejected {
                position,
                reason: PlacementError::OutOfBounds,
            }]
        );
    }
    assert_eq!(query::guard_count(&world), 1);
}

#[test]
fn clearing_guards_resets_identifiers() {
    let mut world = new_game(single_room(3, false), 8);
    for x in [-0.5, 0.0, 0.5] {
        let _ = run(
            &mut world,
            Command::AddGuard {
                position: Point::new(x, 0.0),
            },
        );
    }

    let events = run(&mut world, Command::RemoveAllGuards);
    assert_eq!(events, vec![Event::GuardsCleared { removed: 3 }]);
    assert_eq!(query::next_guard_id(&world), GuardId::FIRST);
    assert!(query::guard_view(&world).is_empty());
    assert!(query::metrics_inputs(&world).is_none());

    let position = Point::new(0.25, 0.25);
    let events = run(&mut world, Command::AddGuard { position });
    assert_eq!(
        events,
        vec![Event::GuardPlaced {
            guard: GuardId::new(1),
            position,
        }]
    );
}

#[test]
fn blind_games_hide_results_until_finished() {
    let mut world = new_game(single_room(2, true), 2);
    let _ = run(
        &mut world,
        Command::AddGuard {
            position: Point::new(0.0, 0.0),
        },
    );

    assert!(!query::show_results(&world));
    assert!(query::metrics_inputs(&world).is_none());
    let view = query::guard_view(&world);
    assert_eq!(view.len(), 1);
    assert!(view.iter().all(|guard| guard.visibility.is_none()));

    let _ = run(
        &mut world,
        Command::AddGuard {
            position: Point::new(0.5, 0.5),
        },
    );
    assert!(query::show_results(&world));
    assert_eq!(
        query::metrics_inputs(&world)
            .expect("results shown")
            .visibilities()
            .len(),
        2
    );
    assert!(query::guard_view(&world)
        .iter()
        .all(|guard| guard.visibility.is_some()));
}

#[test]
fn guard_in_square_room_sees_whole_floor() {
    let tuning = GenerationTuning {
        boundary_samples: 360,
        ..GenerationTuning::default()
    };
    let mut world = World::with_tuning(tuning);
    let _ = run(
        &mut world,
        Command::NewGame {
            settings: single_room(1, false),
            seed: 0,
        },
    );
    let _ = run(
        &mut world,
        Command::AddGuard {
            position: Point::new(0.0, 0.0),
        },
    );

    let floor_plan = query::floor_plan(&world).expect("game started");
    assert!((floor_plan.area() - 4.0).abs() < 1e-9);
    assert_eq!(query::boundary_samples(&world).len(), 360);

    let view = query::guard_view(&world).into_vec();
    let visibility: &Polygon = view[0].visibility.as_ref().expect("results shown");
    assert!((geometry::area(visibility) - 4.0).abs() < 1e-2);
}

#[test]
fn visibility_never_exceeds_floor_plan() {
    let settings = Settings::new(8, 10, 0.2, false).expect("valid settings");
    let mut world = new_game(settings, 77);
    let floor_area = query::floor_plan(&world).expect("game started").area();

    let _ = run(
        &mut world,
        Command::AddGuard {
            position: Point::new(0.0, 0.0),
        },
    );
    for snapshot in query::guard_view(&world).iter() {
        let visibility = snapshot.visibility.as_ref().expect("results shown");
        assert!(geometry::area(visibility) <= floor_area + 1e-6);
    }
}

#[test]
fn visibility_stays_inside_many_generated_plans() {
    let layouts = [(12, 0.45), (20, 0.9), (20, 0.0)];
    for (num_rooms, min_overlap) in layouts {
        let settings = Settings::new(num_rooms, 10, min_overlap, false).expect("valid settings");
        for seed in 45..60 {
            let mut world = new_game(settings, seed);
            let floor_plan = query::floor_plan(&world).expect("game started").clone();
            let bounds = floor_plan.bounds();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);

            while !query::is_finished(&world) {
                let position = Point::new(
                    rng.gen_range(bounds.min_x()..bounds.max_x()),
                    rng.gen_range(bounds.min_y()..bounds.max_y()),
                );
                if floor_plan.contains(position) {
                    let _ = run(&mut world, Command::AddGuard { position });
                }
            }

            for guard in query::guard_view(&world).iter() {
                let visibility = guard.visibility.as_ref().expect("results shown");
                let visible = geometry::area(visibility);
                assert!(
                    visible <= floor_plan.area() + 1e-6,
                    "seed {seed} rooms {num_rooms} guard {:?} sees {visible} of {}",
                    guard.position,
                    floor_plan.area()
                );
            }
        }
    }
}

#[test]
fn same_seed_replays_identically() {
    let settings = Settings::new(6, 3, 0.3, false).expect("valid settings");
    let script = |world: &mut World| {
        let mut events = Vec::new();
        for command in [
            Command::NewGame { settings, seed: 2024 },
            Command::AddGuard {
                position: Point::new(0.0, 0.0),
            },
            Command::AddGuard {
                position: Point::new(0.3, -0.4),
            },
            Command::RemoveLastGuard,
            Command::AddGuard {
                position: Point::new(-0.6, 0.2),
            },
        ] {
            apply(world, command, &mut events).expect("command succeeds");
        }
        events
    };

    let mut first = World::new();
    let mut second = World::new();
    assert_eq!(script(&mut first), script(&mut second));
    assert_eq!(query::floor_plan(&first), query::floor_plan(&second));
    assert_eq!(
        query::guard_view(&first).into_vec(),
        query::guard_view(&second).into_vec()
    );
}

#[test]
fn new_game_discards_previous_guards() {
    let mut world = new_game(single_room(3, false), 1);
    let _ = run(
        &mut world,
        Command::AddGuard {
            position: Point::new(0.0, 0.0),
        },
    );

    let events = run(
        &mut world,
        Command::NewGame {
            settings: Settings::default(),
            seed: 99,
        },
    );
    assert!(matches!(events.as_slice(), [Event::GameStarted { .. }]));
    assert_eq!(query::guard_count(&world), 0);
    assert_eq!(query::next_guard_id(&world), GuardId::FIRST);
    assert_eq!(*query::settings(&world), Settings::default());
}
