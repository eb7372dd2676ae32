#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geometry primitives for region composition analysis.
//!
//! Wraps the `geo` boolean operations and geodesic measurements behind a
//! small contract: intersections that only touch along a boundary count as
//! "no intersection", and degenerate input measures as zero area instead of
//! failing. All coordinates are longitude/latitude degrees (WGS84).

use geo::orient::{Direction, Orient};
use geo::{
    BooleanOps, BoundingRect, Coord, Destination, Geodesic, GeodesicArea, Geometry, Intersects,
    LineString, MultiLineString, MultiPolygon, Point, Polygon, Validation,
};
use thiserror::Error;

/// Intersections smaller than this (in square meters) are treated as a
/// boundary touch rather than an overlap.
pub const MIN_OVERLAP_AREA_SQM: f64 = 1e-3;

/// Lower bound on the number of vertices used to approximate a circle.
pub const MIN_CIRCLE_STEPS: usize = 8;

/// Reasons a polygonal geometry is rejected before clipping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// The geometry contains no polygons.
    #[error("geometry is empty")]
    Empty,

    /// A ring has fewer than three distinct vertices.
    #[error("ring has {count} distinct vertices, need at least 3")]
    TooFewVertices {
        /// Number of distinct vertices found.
        count: usize,
    },

    /// A coordinate is NaN or infinite.
    #[error("geometry contains a non-finite coordinate")]
    NonFinite,

    /// The geometry is self-intersecting or otherwise malformed.
    #[error("geometry is not a valid polygon")]
    Invalid,
}

/// Converts a geometry into a [`MultiPolygon`].
///
/// Polygons, multi-polygons, rectangles and triangles are accepted, as are
/// geometry collections containing them. Returns `None` for anything
/// without an area (points, lines) or when no polygon remains.
#[must_use]
pub fn polygonal(geometry: &Geometry<f64>) -> Option<MultiPolygon<f64>> {
    let mut polygons = Vec::new();
    collect_polygons(geometry, &mut polygons);

    if polygons.is_empty() {
        None
    } else {
        Some(MultiPolygon(polygons))
    }
}

fn collect_polygons(geometry: &Geometry<f64>, out: &mut Vec<Polygon<f64>>) {
    match geometry {
        Geometry::Polygon(p) => out.push(p.clone()),
        Geometry::MultiPolygon(mp) => out.extend(mp.0.iter().cloned()),
        Geometry::Rect(r) => out.push(r.to_polygon()),
        Geometry::Triangle(t) => out.push(t.to_polygon()),
        Geometry::GeometryCollection(gc) => {
            for child in gc {
                collect_polygons(child, out);
            }
        }
        Geometry::Point(_)
        | Geometry::Line(_)
        | Geometry::LineString(_)
        | Geometry::MultiPoint(_)
        | Geometry::MultiLineString(_) => {}
    }
}

/// Checks that every ring has at least three distinct, finite vertices and
/// that the geometry is valid (no self-intersections, holes inside shells).
///
/// # Errors
///
/// Returns the first [`GeometryError`] found.
pub fn validate(geometry: &MultiPolygon<f64>) -> Result<(), GeometryError> {
    if geometry.0.is_empty() {
        return Err(GeometryError::Empty);
    }

    for polygon in geometry {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            if ring.coords().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
                return Err(GeometryError::NonFinite);
            }
            let count = distinct_vertices(ring);
            if count < 3 {
                return Err(GeometryError::TooFewVertices { count });
            }
        }
    }

    if geometry.is_valid() {
        Ok(())
    } else {
        Err(GeometryError::Invalid)
    }
}

/// Counts ring vertices, ignoring the closing point and consecutive repeats.
fn distinct_vertices(ring: &LineString<f64>) -> usize {
    let mut coords: Vec<Coord<f64>> = ring.coords().copied().collect();
    coords.dedup();
    if coords.len() > 1 && coords.first() == coords.last() {
        coords.pop();
    }
    coords.len()
}

/// Geodesic area of a polygonal geometry in square meters.
///
/// Polygons whose exterior ring is degenerate (fewer than three distinct
/// vertices, non-finite coordinates) contribute zero.
#[must_use]
pub fn area(geometry: &MultiPolygon<f64>) -> f64 {
    geometry
        .iter()
        .filter(|polygon| is_measurable(polygon))
        .map(|polygon| {
            // Geodesic area expects counter-clockwise shells.
            polygon
                .orient(Direction::Default)
                .geodesic_area_unsigned()
        })
        .sum()
}

fn is_measurable(polygon: &Polygon<f64>) -> bool {
    let exterior = polygon.exterior();
    exterior
        .coords()
        .all(|c| c.x.is_finite() && c.y.is_finite())
        && distinct_vertices(exterior) >= 3
}

/// Intersects two polygonal geometries.
///
/// Returns `None` when the geometries are disjoint or only share a
/// boundary: an intersection measuring less than [`MIN_OVERLAP_AREA_SQM`]
/// does not count as an overlap.
#[must_use]
pub fn intersect(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> Option<MultiPolygon<f64>> {
    if !bounds_overlap(a, b) {
        return None;
    }

    let clipped = a.intersection(b);
    if clipped.0.is_empty() || area(&clipped) < MIN_OVERLAP_AREA_SQM {
        return None;
    }

    Some(clipped)
}

/// Whether the bounding boxes of two geometries intersect. Empty
/// geometries have no bounding box and never overlap.
#[must_use]
pub fn bounds_overlap(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> bool {
    match (a.bounding_rect(), b.bounding_rect()) {
        (Some(bounds_a), Some(bounds_b)) => bounds_a.intersects(&bounds_b),
        _ => false,
    }
}

/// Builds a regular polygon approximating a circle of `radius_m` meters.
///
/// Vertices are placed at geodesic distance `radius_m` from `center` with
/// evenly spaced bearings and wound counter-clockwise. The vertex count is
/// `steps`, raised to [`MIN_CIRCLE_STEPS`] if smaller.
#[must_use]
pub fn geodesic_circle(center: Point<f64>, radius_m: f64, steps: usize) -> Polygon<f64> {
    let steps = steps.max(MIN_CIRCLE_STEPS);

    #[allow(clippy::cast_precision_loss)]
    let ring: Vec<Coord<f64>> = (0..steps)
        .rev()
        .map(|i| {
            let bearing = 360.0 * i as f64 / steps as f64;
            Geodesic.destination(center, bearing, radius_m).into()
        })
        .collect();

    Polygon::new(LineString::new(ring), vec![])
}

/// Builds an axis-aligned longitude/latitude box centered on `center`,
/// `width_m` meters wide and `height_m` meters tall.
#[must_use]
pub fn geodesic_rect(center: Point<f64>, width_m: f64, height_m: f64) -> Polygon<f64> {
    let north = Geodesic.destination(center, 0.0, height_m / 2.0).y();
    let south = Geodesic.destination(center, 180.0, height_m / 2.0).y();
    let east = Geodesic.destination(center, 90.0, width_m / 2.0).x();
    let west = Geodesic.destination(center, 270.0, width_m / 2.0).x();

    Polygon::new(
        LineString::from(vec![
            (west, south),
            (east, south),
            (east, north),
            (west, north),
            (west, south),
        ]),
        vec![],
    )
}

/// Returns the boundary lines of a geometry.
///
/// Polygonal geometries yield all of their rings; linear geometries yield
/// themselves. Points have no boundary and yield nothing.
#[must_use]
pub fn boundary(geometry: &Geometry<f64>) -> MultiLineString<f64> {
    let mut lines = Vec::new();
    collect_lines(geometry, &mut lines);
    MultiLineString(lines)
}

/// Returns every ring (shells and holes) of a polygonal geometry.
#[must_use]
pub fn rings(geometry: &MultiPolygon<f64>) -> MultiLineString<f64> {
    let mut lines = Vec::new();
    for polygon in geometry {
        push_rings(polygon, &mut lines);
    }
    MultiLineString(lines)
}

fn collect_lines(geometry: &Geometry<f64>, out: &mut Vec<LineString<f64>>) {
    match geometry {
        Geometry::Polygon(p) => push_rings(p, out),
        Geometry::MultiPolygon(mp) => out.extend(rings(mp).0),
        Geometry::Rect(r) => push_rings(&r.to_polygon(), out),
        Geometry::Triangle(t) => push_rings(&t.to_polygon(), out),
        Geometry::Line(l) => out.push(LineString::from(vec![l.start, l.end])),
        Geometry::LineString(ls) => out.push(ls.clone()),
        Geometry::MultiLineString(mls) => out.extend(mls.0.iter().cloned()),
        Geometry::GeometryCollection(gc) => {
            for child in gc {
                collect_lines(child, out);
            }
        }
        Geometry::Point(_) | Geometry::MultiPoint(_) => {}
    }
}

fn push_rings(polygon: &Polygon<f64>, out: &mut Vec<LineString<f64>>) {
    out.push(polygon.exterior().clone());
    out.extend(polygon.interiors().iter().cloned());
}
