#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that spreads ray targets around a floor plan.

use art_gallery_core::{BoundarySamples, FloorPlan, GenerationTuning};
use art_gallery_geometry as geometry;
use thiserror::Error;
use tracing::debug;

/// Failures raised while sampling ray targets.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SamplingError {
    /// Zero targets were requested.
    #[error("at least one boundary sample is required")]
    NoTargets,
    /// The padding would not move the targets outside the floor plan.
    #[error("padding fraction must be positive and finite, got {0}")]
    InvalidPadding(f64),
    /// The padded rectangle has no length to walk along.
    #[error("sampling rectangle is degenerate")]
    DegenerateRing,
}

/// Places evenly spaced targets on a rectangle padded around the floor plan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundarySampler {
    padding_fraction: f64,
    target_count: usize,
}

impl BoundarySampler {
    /// Creates a sampler that pads the floor plan's bounds by `padding_fraction`
    /// of their extent on every side and places `target_count` targets.
    pub fn new(padding_fraction: f64, target_count: usize) -> Result<Self, SamplingError> {
        if !padding_fraction.is_finite() || padding_fraction <= 0.0 {
            return Err(SamplingError::InvalidPadding(padding_fraction));
        }
        if target_count == 0 {
            return Err(SamplingError::NoTargets);
        }
        Ok(Self {
            padding_fraction,
            target_count,
        })
    }

    /// Creates a sampler from the padding and sample count in `tuning`.
    pub fn from_tuning(tuning: &GenerationTuning) -> Result<Self, SamplingError> {
        Self::new(tuning.padding_fraction, tuning.boundary_samples)
    }

    /// Number of targets produced per floor plan.
    #[must_use]
    pub const fn target_count(&self) -> usize {
        self.target_count
    }

    /// Samples targets at equal arc-length intervals around the padded bounds.
    ///
    /// Exactly `target_count` targets are returned, ordered by their position
    /// along the rectangle. That order becomes the vertex order of every
    /// visibility polygon built from them.
    pub fn sample(&self, floor_plan: &FloorPlan) -> Result<BoundarySamples, SamplingError> {
        let padded = floor_plan.bounds().padded(self.padding_fraction);
        let rectangle = geometry::bounds_rectangle(padded);
        let ring = geometry::boundary_ring(&rectangle);

        let length = geometry::ring_length(ring);
        if !length.is_finite() || length <= 0.0 {
            return Err(SamplingError::DegenerateRing);
        }

        let interval = length / self.target_count as f64;
        let points = (0..self.target_count)
            .map(|index| geometry::interpolate_along_ring(ring, index as f64 * interval))
            .collect::<Option<Vec<_>>>()
            .ok_or(SamplingError::DegenerateRing)?;

        debug!(count = points.len(), interval, "sampled boundary targets");
        Ok(BoundarySamples::from_points(points))
    }
}
