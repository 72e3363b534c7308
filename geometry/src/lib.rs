#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Narrow two-dimensional geometry kernel consumed by the gallery engine.
//!
//! The engine never calls `geo` algorithms directly. Everything it needs from
//! a geometry library is funnelled through the handful of free functions in
//! this crate: boolean union and intersection, strict containment, area,
//! bounds, and walking a closed ring by arc length. Boolean operations are
//! delegated to `geo`; the arc-length helpers are small enough to live here.

use std::cmp::Ordering;

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{coord, Area, BooleanOps, BoundingRect, Contains, Line, Rect};
use thiserror::Error;

/// Real-valued coordinate in floor-plan space.
pub type Point = geo::Point<f64>;

/// Closed sequence of points describing a polygon boundary.
pub type Ring = geo::LineString<f64>;

/// Simple polygon described by an exterior ring and optional holes.
pub type Polygon = geo::Polygon<f64>;

/// Possibly disconnected area produced by boolean operations.
pub type Region = geo::MultiPolygon<f64>;

/// Failures raised by the kernel when handed malformed input.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GeometryError {
    /// A coordinate was NaN or infinite.
    #[error("coordinate ({x}, {y}) is not finite")]
    NonFiniteCoordinate {
        /// Horizontal component of the offending coordinate.
        x: f64,
        /// Vertical component of the offending coordinate.
        y: f64,
    },
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Bounds {
    /// Creates bounds from explicit extremes.
    #[must_use]
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Smallest horizontal coordinate.
    #[must_use]
    pub const fn min_x(&self) -> f64 {
        self.min_x
    }

    /// Smallest vertical coordinate.
    #[must_use]
    pub const fn min_y(&self) -> f64 {
        self.min_y
    }

    /// Largest horizontal coordinate.
    #[must_use]
    pub const fn max_x(&self) -> f64 {
        self.max_x
    }

    /// Largest vertical coordinate.
    #[must_use]
    pub const fn max_y(&self) -> f64 {
        self.max_y
    }

    /// Horizontal extent of the box.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Vertical extent of the box.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Grows the box on every side by `fraction` of its own width and height.
    #[must_use]
    pub fn padded(&self, fraction: f64) -> Self {
        let dx = fraction * self.width();
        let dy = fraction * self.height();
        Self::new(
            self.min_x - dx,
            self.min_y - dy,
            self.max_x + dx,
            self.max_y + dy,
        )
    }

    /// Reports whether the point lies inside or on the edge of the box.
    #[must_use]
    pub fn encloses(&self, point: Point) -> bool {
        (self.min_x..=self.max_x).contains(&point.x())
            && (self.min_y..=self.max_y).contains(&point.y())
    }
}

/// Outcome of reducing a region to a single hole-free polygon.
#[derive(Clone, Debug, PartialEq)]
pub struct ExteriorExtraction {
    /// Exterior ring of the largest component, without holes.
    pub polygon: Polygon,
    /// Number of interior rings dropped from the kept component.
    pub discarded_holes: usize,
    /// Number of other disjoint components dropped entirely.
    pub discarded_components: usize,
}

/// Builds an axis-aligned rectangle centred on `center`.
#[must_use]
pub fn rectangle(center: Point, half_width: f64, half_height: f64) -> Polygon {
    Rect::new(
        coord! { x: center.x() - half_width, y: center.y() - half_height },
        coord! { x: center.x() + half_width, y: center.y() + half_height },
    )
    .to_polygon()
}

/// Builds the rectangle spanned by `bounds`.
#[must_use]
pub fn bounds_rectangle(bounds: Bounds) -> Polygon {
    Rect::new(
        coord! { x: bounds.min_x(), y: bounds.min_y() },
        coord! { x: bounds.max_x(), y: bounds.max_y() },
    )
    .to_polygon()
}

/// Builds a closed polygon whose exterior visits `points` in order.
///
/// Fewer than three points produce a degenerate polygon with zero area.
#[must_use]
pub fn polygon_from_points(points: &[Point]) -> Polygon {
    let ring: Ring = points.iter().map(|point| point.0).collect();
    Polygon::new(ring, Vec::new())
}

/// Unions `polygon` into the accumulated region.
pub fn union(accumulated: &Region, polygon: &Polygon) -> Result<Region, GeometryError> {
    ensure_finite(polygon)?;
    if accumulated.0.is_empty() {
        return Ok(Region::new(vec![polygon.clone()]));
    }
    Ok(accumulated.union(&Region::new(vec![polygon.clone()])))
}

/// Unions every polygon with positive area. Degenerate inputs are skipped.
#[must_use]
pub fn union_all<'a, I>(polygons: I) -> Region
where
    I: IntoIterator<Item = &'a Polygon>,
{
    union_regions(
        polygons
            .into_iter()
            .filter(|polygon| polygon.unsigned_area() > 0.0)
            .map(|polygon| Region::new(vec![polygon.clone()])),
    )
}

/// Unions a sequence of regions into one.
#[must_use]
pub fn union_regions<I>(regions: I) -> Region
where
    I: IntoIterator<Item = Region>,
{
    regions
        .into_iter()
        .filter(|region| region.unsigned_area() > 0.0)
        .reduce(|accumulated, region| accumulated.union(&region))
        .unwrap_or_else(|| Region::new(Vec::new()))
}

/// Intersects two polygons. Degenerate inputs yield an empty region.
#[must_use]
pub fn intersection(first: &Polygon, second: &Polygon) -> Region {
    if first.unsigned_area() <= 0.0 || second.unsigned_area() <= 0.0 {
        return Region::new(Vec::new());
    }
    first.intersection(second)
}

/// Unsigned area of any areal geometry.
#[must_use]
pub fn area<G>(geometry: &G) -> f64
where
    G: Area<f64>,
{
    geometry.unsigned_area()
}

/// Reports whether `point` lies strictly inside `polygon`. Boundary points are outside.
#[must_use]
pub fn contains(polygon: &Polygon, point: Point) -> bool {
    polygon.contains(&point)
}

/// Exterior boundary ring of the polygon.
#[must_use]
pub fn boundary_ring(polygon: &Polygon) -> &Ring {
    polygon.exterior()
}

/// Axis-aligned bounds of the polygon, or `None` when it has no vertices.
#[must_use]
pub fn bounds(polygon: &Polygon) -> Option<Bounds> {
    polygon.bounding_rect().map(|rect| {
        Bounds::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    })
}

/// Euclidean distance between two points.
#[must_use]
pub fn distance(from: Point, to: Point) -> f64 {
    (to.x() - from.x()).hypot(to.y() - from.y())
}

/// Total arc length of the ring.
#[must_use]
pub fn ring_length(ring: &Ring) -> f64 {
    ring.lines().map(segment_length).sum()
}

/// Point found by walking `distance` along the ring from its first vertex.
///
/// The distance is clamped to `[0, ring_length]`. Returns `None` for an empty ring.
#[must_use]
pub fn interpolate_along_ring(ring: &Ring, distance: f64) -> Option<Point> {
    let first = *ring.0.first()?;
    let total = ring_length(ring);
    if total <= 0.0 {
        return Some(Point::from(first));
    }

    let mut remaining = distance.clamp(0.0, total);
    for line in ring.lines() {
        let length = segment_length(line);
        if length > 0.0 && remaining <= length {
            let t = remaining / length;
            return Some(Point::new(
                line.start.x + t * line.dx(),
                line.start.y + t * line.dy(),
            ));
        }
        remaining -= length;
    }

    ring.0.last().copied().map(Point::from)
}

/// Every point where the segment `from -> to` meets the ring.
///
/// A segment running along an edge contributes both ends of the shared
/// stretch. A segment passing through a vertex reports that vertex once per
/// incident edge.
#[must_use]
pub fn intersect_segment_with_ring(from: Point, to: Point, ring: &Ring) -> Vec<Point> {
    let segment = Line::new(from.0, to.0);
    let mut hits = Vec::new();
    for edge in ring.lines() {
        match line_intersection(segment, edge) {
            Some(LineIntersection::SinglePoint { intersection, .. }) => {
                hits.push(Point::from(intersection));
            }
            Some(LineIntersection::Collinear { intersection }) => {
                hits.push(Point::from(intersection.start));
                hits.push(Point::from(intersection.end));
            }
            None => {}
        }
    }
    hits
}

/// Component of `region` with the greatest area, holes included.
#[must_use]
pub fn largest_component(region: &Region) -> Option<&Polygon> {
    region.0.iter().max_by(|first, second| {
        first
            .unsigned_area()
            .partial_cmp(&second.unsigned_area())
            .unwrap_or(Ordering::Equal)
    })
}

/// Keeps the exterior ring of the largest component of `region`.
///
/// Returns `None` when the region is empty.
#[must_use]
pub fn largest_exterior(region: &Region) -> Option<ExteriorExtraction> {
    let largest = largest_component(region)?;

    Some(ExteriorExtraction {
        polygon: Polygon::new(largest.exterior().clone(), Vec::new()),
        discarded_holes: largest.interiors().len(),
        discarded_components: region.0.len() - 1,
    })
}

fn segment_length(line: Line<f64>) -> f64 {
    line.dx().hypot(line.dy())
}

fn ensure_finite(polygon: &Polygon) -> Result<(), GeometryError> {
    match polygon
        .exterior()
        .coords()
        .find(|coord| !coord.x.is_finite() || !coord.y.is_finite())
    {
        Some(coord) => Err(GeometryError::NonFiniteCoordinate {
            x: coord.x,
            y: coord.y,
        }),
        None => Ok(()),
    }
}
