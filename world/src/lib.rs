#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative game state for the art gallery.
//!
//! The world owns the floor plan, the cached ray targets, and the stationed
//! guards. Adapters mutate it exclusively through [`apply`] and read it
//! through the [`query`] module.

use art_gallery_core::{
    BoundarySamples, Command, Event, FloorPlan, GenerationTuning, GuardId, PlacementError, Point,
    Polygon, Settings, WELCOME_BANNER,
};
use art_gallery_system_floor_plan::{FloorPlanError, FloorPlanGenerator};
use art_gallery_system_sampling::{BoundarySampler, SamplingError};
use art_gallery_system_visibility::VisibilityEngine;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::info;

/// Internal failures that abort a command without touching the world.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum WorldError {
    /// Floor-plan generation failed.
    #[error("floor plan generation failed: {0}")]
    FloorPlan(#[from] FloorPlanError),
    /// Ray target sampling failed.
    #[error("boundary sampling failed: {0}")]
    Sampling(#[from] SamplingError),
}

#[derive(Clone, Debug)]
struct Guard {
    id: GuardId,
    position: Point,
    visibility: Polygon,
}

/// Represents the authoritative art gallery state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    tuning: GenerationTuning,
    settings: Settings,
    floor_plan: Option<FloorPlan>,
    samples: BoundarySamples,
    guards: Vec<Guard>,
    next_guard_id: GuardId,
    visibility: VisibilityEngine,
}

impl World {
    /// Creates an idle world using the default generation constants.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tuning(GenerationTuning::default())
    }

    /// Creates an idle world that generates floor plans with `tuning`.
    ///
    /// The tuning is validated lazily when the first game starts.
    #[must_use]
    pub fn with_tuning(tuning: GenerationTuning) -> Self {
        Self {
            banner: WELCOME_BANNER,
            tuning,
            settings: Settings::default(),
            floor_plan: None,
            samples: BoundarySamples::default(),
            guards: Vec::new(),
            next_guard_id: GuardId::FIRST,
            visibility: VisibilityEngine::new(),
        }
    }

    fn is_full(&self) -> bool {
        self.guards.len() >= self.settings.max_guards() as usize
    }

    fn start_game(
        &mut self,
        settings: Settings,
        seed: u64,
        out_events: &mut Vec<Event>,
    ) -> Result<(), WorldError> {
        if let Err(reason) = settings.validate() {
            info!(%reason, "new game rejected");
            out_events.push(Event::NewGameRejected { reason });
            return Ok(());
        }

        let generator = FloorPlanGenerator::from_tuning(&self.tuning)?;
        let sampler = BoundarySampler::from_tuning(&self.tuning)?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let floor_plan =
            generator.generate(settings.num_rooms(), settings.min_overlap(), &mut rng)?;
        let samples = sampler.sample(&floor_plan)?;

        let floor_area = floor_plan.area();
        let sample_count = samples.len();
        info!(
            seed,
            rooms = settings.num_rooms(),
            max_guards = settings.max_guards(),
            blind = settings.blind(),
            floor_area,
            "started new game"
        );

        self.settings = settings;
        self.floor_plan = Some(floor_plan);
        self.samples = samples;
        self.guards.clear();
        self.next_guard_id = GuardId::FIRST;

        out_events.push(Event::GameStarted {
            settings,
            floor_area,
            sample_count,
        });
        Ok(())
    }

    fn place_guard(&mut self, position: Point, out_events: &mut Vec<Event>) {
        let full = self.is_full();
        let floor_plan = match check_placement(self.floor_plan.as_ref(), full, position) {
            Ok(floor_plan) => floor_plan,
            Err(reason) => {
                info!(x = position.x(), y = position.y(), %reason, "guard placement rejected");
                out_events.push(Event::GuardPlacementRejected { position, reason });
                return;
            }
        };

        let visibility = self.visibility.compute(position, floor_plan, &self.samples);
        let id = self.next_guard_id;
        self.guards.push(Guard {
            id,
            position,
            visibility,
        });
        self.next_guard_id = id.next();
        info!(guard = %id, x = position.x(), y = position.y(), "guard placed");
        out_events.push(Event::GuardPlaced { guard: id, position });

        if self.is_full() {
            info!("every guard slot is filled");
            out_events.push(Event::GameFinished);
        }
    }
}

/// Rejections are reported in order: no floor plan, out of bounds, capacity.
fn check_placement(
    floor_plan: Option<&FloorPlan>,
    full: bool,
    position: Point,
) -> Result<&FloorPlan, PlacementError> {
    let floor_plan = floor_plan.ok_or(PlacementError::NoFloorPlan)?;
    if !floor_plan.contains(position) {
        return Err(PlacementError::OutOfBounds);
    }
    if full {
        return Err(PlacementError::CapacityReached);
    }
    Ok(floor_plan)
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Invalid player requests are reported as rejection events and leave the
/// world untouched. An `Err` signals an internal failure; the world is also
/// left untouched in that case.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), WorldError> {
    match command {
        Command::NewGame { settings, seed } => world.start_game(settings, seed, out_events)?,
        Command::AddGuard { position } => world.place_guard(position, out_events),
        Command::RemoveLastGuard => {
            if let Some(guard) = world.guards.pop() {
                world.next_guard_id = world.next_guard_id.previous();
                info!(guard = %guard.id, "guard removed");
                out_events.push(Event::GuardRemoved { guard: guard.id });
            }
        }
        Command::RemoveAllGuards => {
            let removed = world.guards.len();
            world.guards.clear();
            world.next_guard_id = GuardId::FIRST;
            info!(removed, "guards cleared");
            out_events.push(Event::GuardsCleared { removed });
        }
    }
    Ok(())
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use art_gallery_core::{
        BoundarySamples, FloorPlan, GamePhase, GenerationTuning, GuardId, GuardSnapshot,
        GuardView, MetricsInputs, Settings,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Lifecycle phase the game is in.
    #[must_use]
    pub fn phase(world: &World) -> GamePhase {
        if world.floor_plan.is_none() {
            GamePhase::Idle
        } else if world.is_full() {
            GamePhase::Finished
        } else {
            GamePhase::InProgress
        }
    }

    /// Settings of the current game, or the defaults while idle.
    #[must_use]
    pub fn settings(world: &World) -> &Settings {
        &world.settings
    }

    /// Generation constants the world was created with.
    #[must_use]
    pub fn tuning(world: &World) -> &GenerationTuning {
        &world.tuning
    }

    /// Floor plan of the current game, if one has started.
    #[must_use]
    pub fn floor_plan(world: &World) -> Option<&FloorPlan> {
        world.floor_plan.as_ref()
    }

    /// Ray targets cached for the current floor plan.
    #[must_use]
    pub fn boundary_samples(world: &World) -> &BoundarySamples {
        &world.samples
    }

    /// Number of stationed guards.
    #[must_use]
    pub fn guard_count(world: &World) -> usize {
        world.guards.len()
    }

    /// Guard slots still open in the current game.
    #[must_use]
    pub fn remaining_guards(world: &World) -> u32 {
        let placed = u32::try_from(world.guards.len()).unwrap_or(u32::MAX);
        world.settings.max_guards().saturating_sub(placed)
    }

    /// Identifier the next placed guard will receive.
    #[must_use]
    pub fn next_guard_id(world: &World) -> GuardId {
        world.next_guard_id
    }

    /// Reports whether every guard slot is filled.
    #[must_use]
    pub fn is_finished(world: &World) -> bool {
        phase(world) == GamePhase::Finished
    }

    /// Reports whether visibility and metrics may be revealed.
    ///
    /// Blind games keep results hidden until the last guard is placed.
    #[must_use]
    pub fn show_results(world: &World) -> bool {
        !world.guards.is_empty() && (is_finished(world) || !world.settings.blind())
    }

    /// Captures the stationed guards; visibility is attached only when results are shown.
    #[must_use]
    pub fn guard_view(world: &World) -> GuardView {
        let reveal = show_results(world);
        GuardView::from_snapshots(
            world
                .guards
                .iter()
                .map(|guard| GuardSnapshot {
                    id: guard.id,
                    position: guard.position,
                    visibility: reveal.then(|| guard.visibility.clone()),
                })
                .collect(),
        )
    }

    /// Inputs for the metrics system, or `None` while results are hidden.
    #[must_use]
    pub fn metrics_inputs(world: &World) -> Option<MetricsInputs<'_>> {
        if !show_results(world) {
            return None;
        }
        let floor_plan = world.floor_plan.as_ref()?;
        Some(MetricsInputs::new(
            floor_plan.area(),
            world.guards.iter().map(|guard| &guard.visibility).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use art_gallery_core::{GamePhase, SettingsError};

    fn started(settings: Settings) -> World {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::NewGame { settings, seed: 11 }, &mut events)
            .expect("generation succeeds");
        world
    }

    #[test]
    fn new_world_is_idle() {
        let world = World::new();
        assert_eq!(query::phase(&world), GamePhase::Idle);
        assert!(query::floor_plan(&world).is_none());
        assert!(query::boundary_samples(&world).is_empty());
        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
        assert!(!query::show_results(&world));
    }

    #[test]
    fn placing_before_new_game_is_rejected() {
        let mut world = World::new();
        let mut events = Vec::new();
        let position = Point::new(0.0, 0.0);
        apply(&mut world, Command::AddGuard { position }, &mut events).expect("no failure");
        assert_eq!(
            events,
            vec![Event::GuardPlacementRejected {
                position,
                reason: PlacementError::NoFloorPlan,
            }]
        );
    }

    #[test]
    fn invalid_settings_leave_world_unchanged() {
        let mut world = World::new();
        let mut events = Vec::new();
        let settings = Settings::default().with_num_rooms(0);
        apply(&mut world, Command::NewGame { settings, seed: 3 }, &mut events)
            .expect("no failure");
        assert_eq!(
            events,
            vec![Event::NewGameRejected {
                reason: SettingsError::RoomsOutOfRange { value: 0 },
            }]
        );
        assert_eq!(query::phase(&world), GamePhase::Idle);
    }

    #[test]
    fn first_room_covers_origin() {
        let world = started(Settings::default());
        assert!(query::floor_plan(&world)
            .expect("game started")
            .contains(Point::new(0.0, 0.0)));
        assert_eq!(query::phase(&world), GamePhase::InProgress);
    }

    #[test]
    fn remove_last_reuses_identifier() {
        let mut world = started(Settings::default());
        let mut events = Vec::new();
        let position = Point::new(0.1, 0.1);

        apply(&mut world, Command::AddGuard { position }, &mut events).expect("no failure");
        apply(&mut world, Command::AddGuard { position }, &mut events).expect("no failure");
        assert_eq!(query::next_guard_id(&world), GuardId::new(3));

        apply(&mut world, Command::RemoveLastGuard, &mut events).expect("no failure");
        assert_eq!(query::next_guard_id(&world), GuardId::new(2));

        events.clear();
        apply(&mut world, Command::AddGuard { position }, &mut events).expect("no failure");
        assert_eq!(
            events,
            vec![Event::GuardPlaced {
                guard: GuardId::new(2),
                position,
            }]
        );
    }

    #[test]
    fn remove_last_on_empty_world_emits_nothing() {
        let mut world = started(Settings::default());
        let mut events = Vec::new();
        apply(&mut world, Command::RemoveLastGuard, &mut events).expect("no failure");
        assert!(events.is_empty());
        assert_eq!(query::next_guard_id(&world), GuardId::FIRST);
    }

    #[test]
    fn invalid_tuning_surfaces_as_error() {
        let tuning = GenerationTuning {
            boundary_samples: 0,
            ..GenerationTuning::default()
        };
        let mut world = World::with_tuning(tuning);
        let mut events = Vec::new();
        let result = apply(
            &mut world,
            Command::NewGame {
                settings: Settings::default(),
                seed: 1,
            },
            &mut events,
        );
        assert_eq!(result, Err(WorldError::Sampling(SamplingError::NoTargets)));
        assert!(events.is_empty());
        assert_eq!(query::phase(&world), GamePhase::Idle);
    }
}
