#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Coverage metrics derived from guard visibility polygons.
//!
//! Every ratio is relative to the floor plan's area. The free functions
//! compute a single metric; the [`Metrics`] system watches world events and
//! republishes the full report whenever the guard configuration changes.

use art_gallery_core::{Event, MetricsError, MetricsInputs, MetricsReport, Polygon, Ratio};
use art_gallery_geometry::{self as geometry, Region};
use tracing::debug;

/// Share of the floor seen by at least one guard.
pub fn coverage(inputs: &MetricsInputs<'_>) -> Result<Ratio, MetricsError> {
    let visibilities = non_empty(inputs)?;
    let seen = geometry::union_all(visibilities.iter().copied());
    Ok(Ratio::of_floor(geometry::area(&seen), inputs.floor_area()))
}

/// Share of the floor seen by at least two guards.
///
/// Fewer than two guards cannot overlap, so the ratio is zero.
#[must_use]
pub fn overlap(inputs: &MetricsInputs<'_>) -> Ratio {
    let visibilities = inputs.visibilities();
    if visibilities.len() < 2 {
        return Ratio::of_floor(0.0, inputs.floor_area());
    }

    let pairwise = visibilities.iter().enumerate().flat_map(|(index, first)| {
        visibilities[index + 1..]
            .iter()
            .map(move |second| geometry::intersection(first, second))
    });
    let shared: Region = geometry::union_regions(pairwise);
    Ratio::of_floor(geometry::area(&shared), inputs.floor_area())
}

/// Share of the floor seen by the guard who sees the most.
pub fn best_guard(inputs: &MetricsInputs<'_>) -> Result<Ratio, MetricsError> {
    extreme_area(inputs, f64::max)
}

/// Share of the floor seen by the guard who sees the least.
pub fn worst_guard(inputs: &MetricsInputs<'_>) -> Result<Ratio, MetricsError> {
    extreme_area(inputs, f64::min)
}

/// Computes all four metrics at once.
pub fn report(inputs: &MetricsInputs<'_>) -> Result<MetricsReport, MetricsError> {
    Ok(MetricsReport {
        coverage: coverage(inputs)?,
        overlap: overlap(inputs),
        best_guard: best_guard(inputs)?,
        worst_guard: worst_guard(inputs)?,
    })
}

fn non_empty<'i, 'a>(
    inputs: &'i MetricsInputs<'a>,
) -> Result<&'i [&'a Polygon], MetricsError> {
    let visibilities = inputs.visibilities();
    if visibilities.is_empty() {
        return Err(MetricsError::NoGuards);
    }
    Ok(visibilities)
}

fn extreme_area(
    inputs: &MetricsInputs<'_>,
    pick: fn(f64, f64) -> f64,
) -> Result<Ratio, MetricsError> {
    let area = non_empty(inputs)?
        .iter()
        .map(|polygon| geometry::area(*polygon))
        .reduce(pick)
        .ok_or(MetricsError::NoGuards)?;
    Ok(Ratio::of_floor(area, inputs.floor_area()))
}

/// Pure system that keeps the published metrics in step with the guards.
#[derive(Debug, Default)]
pub struct Metrics {
    last_report: Option<MetricsReport>,
}

impl Metrics {
    /// Creates a metrics system with nothing published.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report most recently published, if results are currently visible.
    #[must_use]
    pub fn last_report(&self) -> Option<&MetricsReport> {
        self.last_report.as_ref()
    }

    /// Consumes world events and republishes metrics when guards changed.
    ///
    /// `inputs` is whatever the world exposes after those events; `None`
    /// means results are hidden, which withdraws any cached report.
    pub fn handle(
        &mut self,
        events: &[Event],
        inputs: Option<MetricsInputs<'_>>,
        out: &mut Vec<Event>,
    ) {
        let changed = events.iter().any(|event| {
            matches!(
                event,
                Event::GameStarted { .. }
                    | Event::GuardPlaced { .. }
                    | Event::GuardRemoved { .. }
                    | Event::GuardsCleared { .. }
            )
        });
        if !changed {
            return;
        }

        let Some(inputs) = inputs else {
            self.last_report = None;
            return;
        };

        match report(&inputs) {
            Ok(report) => {
                debug!(
                    coverage = %report.coverage,
                    overlap = %report.overlap,
                    guards = inputs.visibilities().len(),
                    "recomputed metrics"
                );
                self.last_report = Some(report);
                out.push(Event::MetricsUpdated { report });
            }
            Err(MetricsError::NoGuards) => self.last_report = None,
        }
    }
}
