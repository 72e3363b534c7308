#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the art gallery engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and never mutate the world directly.

use std::{fmt, ops::RangeInclusive};

use art_gallery_geometry as geometry;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use art_gallery_geometry::{Bounds, Point, Polygon, Ring};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome! Position a limited number of guards so they see as \
much of the gallery as possible. Guards look around all 360 degrees, but they can't see through \
walls.";

/// Permitted number of rooms in a generated floor plan.
pub const NUM_ROOMS_RANGE: RangeInclusive<u32> = 1..=20;
/// Permitted guard capacity for a single game.
pub const MAX_GUARDS_RANGE: RangeInclusive<u32> = 1..=10;
/// Permitted fraction of overlap between consecutive rooms.
pub const MIN_OVERLAP_RANGE: RangeInclusive<f64> = 0.0..=0.9;

/// Room count used when no configuration is supplied.
pub const BASELINE_NUM_ROOMS: u32 = 5;
/// Guard capacity used when no configuration is supplied.
pub const BASELINE_MAX_GUARDS: u32 = 3;
/// Room overlap used when no configuration is supplied.
pub const BASELINE_MIN_OVERLAP: f64 = 0.25;

/// Number of ray targets placed around the floor plan.
pub const BOUNDARY_SAMPLE_COUNT: usize = 720;
/// Fraction of the floor plan's extent added around it before sampling targets.
pub const FLOOR_PLAN_PADDING: f64 = 0.1;
/// Half of a room's width in floor-plan units.
pub const ROOM_HALF_WIDTH: f64 = 1.0;
/// Half of a room's height in floor-plan units.
pub const ROOM_HALF_HEIGHT: f64 = 1.0;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Discards the current game and generates a fresh floor plan.
    NewGame {
        /// Settings that govern the new game.
        settings: Settings,
        /// Seed for the floor-plan generator.
        seed: u64,
    },
    /// Requests that a guard be stationed at the provided position.
    AddGuard {
        /// Location of the guard in floor-plan coordinates.
        position: Point,
    },
    /// Removes the most recently placed guard, if any.
    RemoveLastGuard,
    /// Removes every guard from the floor plan.
    RemoveAllGuards,
}

/// Events broadcast by the world and systems after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a new floor plan was generated and the guards were reset.
    GameStarted {
        /// Settings that govern the game.
        settings: Settings,
        /// Area of the generated floor plan.
        floor_area: f64,
        /// Number of ray targets cached for the floor plan.
        sample_count: usize,
    },
    /// Reports that a new game request carried invalid settings.
    NewGameRejected {
        /// Specific setting that failed validation.
        reason: SettingsError,
    },
    /// Confirms that a guard was stationed inside the floor plan.
    GuardPlaced {
        /// Identifier assigned to the guard.
        guard: GuardId,
        /// Location of the guard.
        position: Point,
    },
    /// Reports that a guard placement request was rejected.
    GuardPlacementRejected {
        /// Location provided in the placement request.
        position: Point,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that the most recent guard was removed.
    GuardRemoved {
        /// Identifier of the removed guard.
        guard: GuardId,
    },
    /// Confirms that every guard was removed.
    GuardsCleared {
        /// Number of guards that were removed.
        removed: usize,
    },
    /// Announces that every guard slot is now filled.
    GameFinished,
    /// Publishes freshly computed coverage metrics.
    MetricsUpdated {
        /// Metrics computed from the visible guards.
        report: MetricsReport,
    },
}

/// Lifecycle phase of the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GamePhase {
    /// No floor plan has been generated yet.
    Idle,
    /// A floor plan exists and guard slots remain open.
    InProgress,
    /// Every guard slot is filled.
    Finished,
}

/// Unique identifier assigned to a guard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GuardId(u32);

impl GuardId {
    /// Identifier handed to the first guard of a game.
    pub const FIRST: Self = Self(1);

    /// Creates a new guard identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Identifier that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Identifier that precedes this one, never dropping below [`GuardId::FIRST`].
    #[must_use]
    pub fn previous(self) -> Self {
        Self(self.0.saturating_sub(1).max(Self::FIRST.0))
    }
}

impl fmt::Display for GuardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Player-chosen configuration for a single game.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    num_rooms: u32,
    max_guards: u32,
    min_overlap: f64,
    blind: bool,
}

impl Settings {
    /// Creates validated settings.
    pub fn new(
        num_rooms: u32,
        max_guards: u32,
        min_overlap: f64,
        blind: bool,
    ) -> Result<Self, SettingsError> {
        let settings = Self {
            num_rooms,
            max_guards,
            min_overlap,
            blind,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Checks every field against its permitted range.
    ///
    /// Deserialised settings bypass [`Settings::new`], so consumers validate
    /// before generating a floor plan from them.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !NUM_ROOMS_RANGE.contains(&self.num_rooms) {
            return Err(SettingsError::RoomsOutOfRange {
                value: self.num_rooms,
            });
        }
        if !MAX_GUARDS_RANGE.contains(&self.max_guards) {
            return Err(SettingsError::GuardsOutOfRange {
                value: self.max_guards,
            });
        }
        if !MIN_OVERLAP_RANGE.contains(&self.min_overlap) {
            return Err(SettingsError::OverlapOutOfRange {
                value: self.min_overlap,
            });
        }
        Ok(())
    }

    /// Number of rooms merged into the floor plan.
    #[must_use]
    pub const fn num_rooms(&self) -> u32 {
        self.num_rooms
    }

    /// Maximum number of guards the player may station.
    #[must_use]
    pub const fn max_guards(&self) -> u32 {
        self.max_guards
    }

    /// Minimum overlap fraction between consecutive rooms.
    #[must_use]
    pub const fn min_overlap(&self) -> f64 {
        self.min_overlap
    }

    /// Whether results stay hidden until every guard is placed.
    #[must_use]
    pub const fn blind(&self) -> bool {
        self.blind
    }

    /// Returns a copy with the room count replaced. The result is not validated.
    #[must_use]
    pub fn with_num_rooms(mut self, num_rooms: u32) -> Self {
        self.num_rooms = num_rooms;
        self
    }

    /// Returns a copy with the guard capacity replaced. The result is not validated.
    #[must_use]
    pub fn with_max_guards(mut self, max_guards: u32) -> Self {
        self.max_guards = max_guards;
        self
    }

    /// Returns a copy with the room overlap replaced. The result is not validated.
    #[must_use]
    pub fn with_min_overlap(mut self, min_overlap: f64) -> Self {
        self.min_overlap = min_overlap;
        self
    }

    /// Returns a copy with blind mode toggled.
    #[must_use]
    pub fn with_blind(mut self, blind: bool) -> Self {
        self.blind = blind;
        self
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            num_rooms: BASELINE_NUM_ROOMS,
            max_guards: BASELINE_MAX_GUARDS,
            min_overlap: BASELINE_MIN_OVERLAP,
            blind: false,
        }
    }
}

/// Reasons a set of [`Settings`] may be rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq, Serialize, Deserialize)]
pub enum SettingsError {
    /// The room count falls outside [`NUM_ROOMS_RANGE`].
    #[error("number of rooms must be between 1 and 20, got {value}")]
    RoomsOutOfRange {
        /// Rejected room count.
        value: u32,
    },
    /// The guard capacity falls outside [`MAX_GUARDS_RANGE`].
    #[error("maximum number of guards must be between 1 and 10, got {value}")]
    GuardsOutOfRange {
        /// Rejected guard capacity.
        value: u32,
    },
    /// The overlap fraction falls outside [`MIN_OVERLAP_RANGE`].
    #[error("minimum room overlap must be between 0 and 0.9, got {value}")]
    OverlapOutOfRange {
        /// Rejected overlap fraction.
        value: f64,
    },
}

/// Fixed generation constants, grouped so adapters can override them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationTuning {
    /// Half of a room's width; every room shares the same footprint.
    pub room_half_width: f64,
    /// Half of a room's height.
    pub room_half_height: f64,
    /// Fraction of the floor plan's width and height added on each side of the
    /// sampling rectangle. Must be strictly positive so every target lies outside.
    pub padding_fraction: f64,
    /// Number of ray targets per floor plan. Higher values trace walls more
    /// faithfully at a linear cost per guard.
    pub boundary_samples: usize,
}

impl Default for GenerationTuning {
    fn default() -> Self {
        Self {
            room_half_width: ROOM_HALF_WIDTH,
            room_half_height: ROOM_HALF_HEIGHT,
            padding_fraction: FLOOR_PLAN_PADDING,
            boundary_samples: BOUNDARY_SAMPLE_COUNT,
        }
    }
}

/// Reasons a guard placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// No floor plan has been generated yet.
    #[error("Start a new game before placing guards.")]
    NoFloorPlan,
    /// The requested position is not strictly inside the floor plan.
    #[error("The guard must be inside the art gallery. Try again with new coordinates.")]
    OutOfBounds,
    /// Every guard slot is already filled.
    #[error("Maximum number of guards reached")]
    CapacityReached,
}

/// Polygon describing the gallery's walkable interior.
#[derive(Clone, Debug, PartialEq)]
pub struct FloorPlan {
    polygon: Polygon,
    area: f64,
    bounds: Bounds,
}

impl FloorPlan {
    /// Wraps a polygon, keeping only its exterior ring.
    ///
    /// Returns `None` when the polygon has no vertices.
    #[must_use]
    pub fn from_polygon(polygon: Polygon) -> Option<Self> {
        let polygon = Polygon::new(polygon.exterior().clone(), Vec::new());
        let bounds = geometry::bounds(&polygon)?;
        let area = geometry::area(&polygon);
        Some(Self {
            polygon,
            area,
            bounds,
        })
    }

    /// Underlying hole-free polygon.
    #[must_use]
    pub const fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    /// Closed ring tracing the gallery walls.
    #[must_use]
    pub fn boundary(&self) -> &Ring {
        geometry::boundary_ring(&self.polygon)
    }

    /// Area enclosed by the walls.
    #[must_use]
    pub const fn area(&self) -> f64 {
        self.area
    }

    /// Axis-aligned bounds of the walls.
    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Reports whether the point lies strictly inside the walls.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        geometry::contains(&self.polygon, point)
    }
}

/// Ray targets arranged around a floor plan, ordered by arc length.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoundarySamples {
    points: Vec<Point>,
}

impl BoundarySamples {
    /// Creates a sample set from points already in traversal order.
    #[must_use]
    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Iterator over the targets in traversal order.
    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }

    /// Targets as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Point] {
        &self.points
    }

    /// Number of targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Reports whether no targets were generated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Immutable representation of a single guard used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct GuardSnapshot {
    /// Identifier assigned to the guard.
    pub id: GuardId,
    /// Location of the guard.
    pub position: Point,
    /// Region the guard sees; `None` while results are hidden.
    pub visibility: Option<Polygon>,
}

/// Read-only snapshot describing all stationed guards.
#[derive(Clone, Debug, Default)]
pub struct GuardView {
    snapshots: Vec<GuardSnapshot>,
}

impl GuardView {
    /// Creates a new guard view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<GuardSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured guard snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &GuardSnapshot> {
        self.snapshots.iter()
    }

    /// Number of guards captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no guards are stationed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<GuardSnapshot> {
        self.snapshots
    }
}

/// Fraction of the floor plan, or undefined when the floor plan has no area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Ratio {
    /// Area divided by the floor plan's area.
    Defined(f64),
    /// The floor plan's area is zero.
    Undefined,
}

impl Ratio {
    /// Divides `area` by `floor_area`, yielding [`Ratio::Undefined`] for a
    /// non-positive floor area.
    #[must_use]
    pub fn of_floor(area: f64, floor_area: f64) -> Self {
        if floor_area > 0.0 {
            Self::Defined(area / floor_area)
        } else {
            Self::Undefined
        }
    }

    /// Numeric value, if defined.
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Defined(value) => Some(*value),
            Self::Undefined => None,
        }
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Defined(value) => write!(f, "{:.0}%", value * 100.0),
            Self::Undefined => f.write_str("-"),
        }
    }
}

/// Coverage metrics for the current guard configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MetricsReport {
    /// Share of the floor seen by at least one guard.
    pub coverage: Ratio,
    /// Share of the floor seen by at least two guards.
    pub overlap: Ratio,
    /// Share of the floor seen by the guard who sees the most.
    pub best_guard: Ratio,
    /// Share of the floor seen by the guard who sees the least.
    pub worst_guard: Ratio,
}

/// Floor area and visibility polygons required to compute metrics.
#[derive(Clone, Debug)]
pub struct MetricsInputs<'a> {
    floor_area: f64,
    visibilities: Vec<&'a Polygon>,
}

impl<'a> MetricsInputs<'a> {
    /// Bundles the floor area with one visibility polygon per guard.
    #[must_use]
    pub fn new(floor_area: f64, visibilities: Vec<&'a Polygon>) -> Self {
        Self {
            floor_area,
            visibilities,
        }
    }

    /// Area of the floor plan all ratios are relative to.
    #[must_use]
    pub const fn floor_area(&self) -> f64 {
        self.floor_area
    }

    /// Visibility polygons in guard order.
    #[must_use]
    pub fn visibilities(&self) -> &[&'a Polygon] {
        &self.visibilities
    }
}

/// Precondition failures raised by metric computation.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum MetricsError {
    /// The metric needs at least one visibility polygon.
    #[error("metric requires at least one guard")]
    NoGuards,
}
