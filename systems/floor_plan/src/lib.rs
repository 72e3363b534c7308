#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that grows an orthogonal floor plan from overlapping rooms.
//!
//! Rooms share one footprint. The first sits on the origin; every later room
//! steps away from its predecessor along a randomly chosen axis by
//! `(2 - min_overlap)` half extents, with a uniform sideways jitter of up to the
//! same amount on the other axis. The rooms are unioned and only the exterior
//! ring of the result is kept.

use art_gallery_core::{FloorPlan, GenerationTuning, Point};
use art_gallery_geometry::{self as geometry, GeometryError, Region};
use rand::Rng;
use thiserror::Error;
use tracing::{debug, warn};

/// Failures raised while generating a floor plan.
///
/// None of these are caused by player input once settings have been
/// validated; they indicate a bug or a malformed tuning value.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FloorPlanError {
    /// Zero rooms were requested.
    #[error("a floor plan needs at least one room")]
    NoRooms,
    /// The overlap fraction is outside `[0, 1)`.
    #[error("room overlap must lie in [0, 1), got {0}")]
    InvalidOverlap(f64),
    /// The room footprint is empty or not finite.
    #[error("room half extents must be positive and finite, got {half_width} x {half_height}")]
    InvalidRoomSize {
        /// Rejected half width.
        half_width: f64,
        /// Rejected half height.
        half_height: f64,
    },
    /// The union of the rooms produced nothing.
    #[error("room union produced no polygon")]
    EmptyUnion,
    /// The geometry kernel rejected a room.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Floor-plan generator parameterised by the shared room footprint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloorPlanGenerator {
    half_width: f64,
    half_height: f64,
}

impl FloorPlanGenerator {
    /// Creates a generator whose rooms measure `2 * half_width` by `2 * half_height`.
    pub fn new(half_width: f64, half_height: f64) -> Result<Self, FloorPlanError> {
        let valid = |extent: f64| extent.is_finite() && extent > 0.0;
        if !valid(half_width) || !valid(half_height) {
            return Err(FloorPlanError::InvalidRoomSize {
                half_width,
                half_height,
            });
        }
        Ok(Self {
            half_width,
            half_height,
        })
    }

    /// Creates a generator using the room footprint from `tuning`.
    pub fn from_tuning(tuning: &GenerationTuning) -> Result<Self, FloorPlanError> {
        Self::new(tuning.room_half_width, tuning.room_half_height)
    }

    /// Half of each room's width.
    #[must_use]
    pub const fn half_width(&self) -> f64 {
        self.half_width
    }

    /// Half of each room's height.
    #[must_use]
    pub const fn half_height(&self) -> f64 {
        self.half_height
    }

    /// Draws the centre of every room, starting with the origin.
    ///
    /// Consumes exactly two random draws per room after the first, so the
    /// same seeded generator always yields the same chain.
    pub fn room_centers<R>(
        &self,
        num_rooms: u32,
        min_overlap: f64,
        rng: &mut R,
    ) -> Result<Vec<Point>, FloorPlanError>
    where
        R: Rng + ?Sized,
    {
        if num_rooms == 0 {
            return Err(FloorPlanError::NoRooms);
        }
        if !(0.0..1.0).contains(&min_overlap) {
            return Err(FloorPlanError::InvalidOverlap(min_overlap));
        }

        let stride = 2.0 - min_overlap;
        let step_x = stride * self.half_width;
        let step_y = stride * self.half_height;

        let mut center = Point::new(0.0, 0.0);
        let mut centers = Vec::with_capacity(num_rooms as usize);
        centers.push(center);

        for _ in 1..num_rooms {
            let (dx, dy) = match Axis::choose(rng) {
                Axis::Horizontal => (signed(rng, step_x), rng.gen_range(-step_y..step_y)),
                Axis::Vertical => (rng.gen_range(-step_x..step_x), signed(rng, step_y)),
            };
            center = Point::new(center.x() + dx, center.y() + dy);
            centers.push(center);
        }

        Ok(centers)
    }

    /// Generates a floor plan from `num_rooms` rooms.
    ///
    /// Holes enclosed by the rooms and components disconnected from the
    /// largest one are dropped rather than rejected.
    pub fn generate<R>(
        &self,
        num_rooms: u32,
        min_overlap: f64,
        rng: &mut R,
    ) -> Result<FloorPlan, FloorPlanError>
    where
        R: Rng + ?Sized,
    {
        let centers = self.room_centers(num_rooms, min_overlap, rng)?;

        let mut rooms = Region::new(Vec::new());
        for center in &centers {
            let room = geometry::rectangle(*center, self.half_width, self.half_height);
            rooms = geometry::union(&rooms, &room)?;
        }

        let extraction = geometry::largest_exterior(&rooms).ok_or(FloorPlanError::EmptyUnion)?;
        if extraction.discarded_holes > 0 || extraction.discarded_components > 0 {
            warn!(
                holes = extraction.discarded_holes,
                components = extraction.discarded_components,
                "room union was not a single hole-free polygon; keeping the largest exterior"
            );
        }

        let floor_plan =
            FloorPlan::from_polygon(extraction.polygon).ok_or(FloorPlanError::EmptyUnion)?;
        debug!(
            num_rooms,
            min_overlap,
            area = floor_plan.area(),
            vertices = floor_plan.boundary().0.len(),
            "generated floor plan"
        );
        Ok(floor_plan)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    fn choose<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        if rng.gen_bool(0.5) {
            Self::Horizontal
        } else {
            Self::Vertical
        }
    }
}

fn signed<R>(rng: &mut R, magnitude: f64) -> f64
where
    R: Rng + ?Sized,
{
    if rng.gen_bool(0.5) {
        magnitude
    } else {
        -magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn single_room_is_centred_rectangle() {
        let generator = FloorPlanGenerator::new(1.0, 1.0).expect("valid footprint");
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let floor_plan = generator.generate(1, 0.3, &mut rng).expect("generation succeeds");

        assert!((floor_plan.area() - 4.0).abs() < 1e-9);
        let bounds = floor_plan.bounds();
        assert!((bounds.min_x() + 1.0).abs() < 1e-9);
        assert!((bounds.max_y() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn consecutive_rooms_step_by_stride_on_one_axis() {
        let generator = FloorPlanGenerator::new(2.0, 1.0).expect("valid footprint");
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let overlap = 0.4;
        let centers = generator
            .room_centers(12, overlap, &mut rng)
            .expect("valid request");

        assert_eq!(centers.len(), 12);
        assert_eq!(centers[0], Point::new(0.0, 0.0));

        let step_x = (2.0 - overlap) * 2.0;
        let step_y = (2.0 - overlap) * 1.0;
        for pair in centers.windows(2) {
            let dx = (pair[1].x() - pair[0].x()).abs();
            let dy = (pair[1].y() - pair[0].y()).abs();
            let horizontal = (dx - step_x).abs() < 1e-9 && dy <= step_y;
            let vertical = (dy - step_y).abs() < 1e-9 && dx <= step_x;
            assert!(horizontal || vertical, "unexpected step ({dx}, {dy})");
        }
    }

    #[test]
    fn rejects_invalid_requests() {
        let generator = FloorPlanGenerator::new(1.0, 1.0).expect("valid footprint");
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(
            generator.generate(0, 0.2, &mut rng),
            Err(FloorPlanError::NoRooms)
        );
        assert_eq!(
            generator.generate(3, 1.0, &mut rng),
            Err(FloorPlanError::InvalidOverlap(1.0))
        );
        assert!(matches!(
            FloorPlanGenerator::new(0.0, 1.0),
            Err(FloorPlanError::InvalidRoomSize { .. })
        ));
        assert!(matches!(
            FloorPlanGenerator::new(1.0, f64::INFINITY),
            Err(FloorPlanError::InvalidRoomSize { .. })
        ));
    }

    #[test]
    fn tuning_footprint_is_used() {
        let tuning = GenerationTuning {
            room_half_width: 3.0,
            room_half_height: 0.5,
            ..GenerationTuning::default()
        };
        let generator = FloorPlanGenerator::from_tuning(&tuning).expect("valid footprint");
        assert!((generator.half_width() - 3.0).abs() < f64::EPSILON);
        assert!((generator.half_height() - 0.5).abs() < f64::EPSILON);
    }
}
