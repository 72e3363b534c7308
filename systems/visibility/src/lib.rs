#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that approximates a guard's visibility polygon by ray casting.
//!
//! A sightline is cast from the guard towards every boundary sample. The first
//! wall each sightline meets becomes a vertex, and the vertices are joined in
//! sample order. The result converges on the exact visibility polygon as the
//! number of samples grows. Where two neighbouring sightlines straddle a wall
//! corner pointing into the room, the edge joining their hits crosses the
//! wall, so the joined polygon is clipped back to the floor plan.

use art_gallery_core::{BoundarySamples, FloorPlan, Point, Polygon, Ring};
use art_gallery_geometry as geometry;
use tracing::debug;

/// Visibility engine that reuses its hit buffer between guards.
#[derive(Debug, Default)]
pub struct VisibilityEngine {
    hits: Vec<Point>,
}

impl VisibilityEngine {
    /// Creates a new engine with an empty hit buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the visibility polygon of a guard standing at `guard`.
    ///
    /// Samples whose sightline never meets a wall contribute no vertex. This
    /// cannot happen for a guard strictly inside the floor plan with samples
    /// outside its bounds, so skipped sightlines are only logged. Fewer than
    /// three hits yield a degenerate polygon with zero area.
    ///
    /// The returned polygon never reaches outside the floor plan. When
    /// clipping splits it, the largest piece is kept.
    pub fn compute(
        &mut self,
        guard: Point,
        floor_plan: &FloorPlan,
        samples: &BoundarySamples,
    ) -> Polygon {
        self.hits.clear();
        self.hits.reserve(samples.len());

        let walls = floor_plan.boundary();
        let mut skipped = 0_usize;
        for target in samples.iter() {
            match nearest_wall_hit(guard, walls, *target) {
                Some(hit) => self.hits.push(hit),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            debug!(
                skipped,
                x = guard.x(),
                y = guard.y(),
                "sightlines without a wall hit were skipped"
            );
        }

        let joined = geometry::polygon_from_points(&self.hits);
        if self.hits.len() < 3 {
            return joined;
        }

        let clipped = geometry::intersection(&joined, floor_plan.polygon());
        if clipped.0.len() > 1 {
            debug!(
                pieces = clipped.0.len(),
                x = guard.x(),
                y = guard.y(),
                "clipped visibility split; keeping the largest piece"
            );
        }
        geometry::largest_component(&clipped)
            .cloned()
            .unwrap_or_else(|| geometry::polygon_from_points(&[]))
    }
}

/// Builds a visibility polygon with a throwaway engine.
#[must_use]
pub fn compute_visibility(
    guard: Point,
    floor_plan: &FloorPlan,
    samples: &BoundarySamples,
) -> Polygon {
    VisibilityEngine::new().compute(guard, floor_plan, samples)
}

/// First point on `walls` met by the sightline from `guard` towards `target`.
#[must_use]
pub fn nearest_wall_hit(guard: Point, walls: &Ring, target: Point) -> Option<Point> {
    geometry::intersect_segment_with_ring(guard, target, walls)
        .into_iter()
        .map(|hit| (geometry::distance(guard, hit), hit))
        .min_by(|(first, _), (second, _)| first.total_cmp(second))
        .map(|(_, hit)| hit)
}
