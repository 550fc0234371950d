// Copyright 2025 the Placemark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry engine adapter over [`geo`].
//!
//! The rest of the crate only touches native geometry through this module:
//! construction from markup coordinates, envelopes, combining parts, and
//! prepared intersection tests. Geometries are planar in (longitude, latitude);
//! altitude is dropped at construction.

use std::borrow::Cow;

use geo::{
    BoundingRect, Coord, Geometry, GeometryCollection, Intersects, LineString, MultiLineString,
    MultiPoint, MultiPolygon, Point, Polygon, Rect,
};
use placemark_tree::Coordinate;

/// Axis-aligned bounding box in (longitude, latitude).
///
/// An envelope with `max < min` on either axis is empty; [`Envelope::EMPTY`] is the
/// identity for [`union`](Self::union). Degenerate envelopes (zero width or height,
/// for example the extent of a single point) are not empty.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Envelope {
    /// Minimum x (west)
    pub min_x: f64,
    /// Minimum y (south)
    pub min_y: f64,
    /// Maximum x (east)
    pub max_x: f64,
    /// Maximum y (north)
    pub max_y: f64,
}

impl Default for Envelope {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Envelope {
    /// The empty envelope.
    pub const EMPTY: Self = Self {
        min_x: f64::INFINITY,
        min_y: f64::INFINITY,
        max_x: f64::NEG_INFINITY,
        max_y: f64::NEG_INFINITY,
    };

    /// Create an envelope from min/max corners.
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// The bounding box of a geometry; empty for geometries without positions.
    pub fn of(geometry: &Geometry<f64>) -> Self {
        geometry
            .bounding_rect()
            .map_or(Self::EMPTY, Self::from)
    }

    /// Return true if the envelope is empty or inverted. Assumes no NaN.
    pub fn is_empty(&self) -> bool {
        self.max_x < self.min_x || self.max_y < self.min_y
    }

    /// Whether this envelope contains the point.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.min_x <= x && self.min_y <= y && x <= self.max_x && y <= self.max_y
    }

    /// Whether `other` lies entirely inside this envelope. Empty envelopes are never contained.
    pub fn contains(&self, other: &Self) -> bool {
        !other.is_empty()
            && self.min_x <= other.min_x
            && self.min_y <= other.min_y
            && other.max_x <= self.max_x
            && other.max_y <= self.max_y
    }

    /// Whether the two envelopes share at least one point.
    pub fn intersects(&self, other: &Self) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    /// The smallest envelope containing both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Grow this envelope to include the bounding box of `geometry`.
    pub fn expand_to_include(&mut self, geometry: &Geometry<f64>) {
        *self = self.union(&Self::of(geometry));
    }

    /// Width in degrees of longitude, `0.0` when empty.
    pub fn width(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max_x - self.min_x
        }
    }

    /// Height in degrees of latitude, `0.0` when empty.
    pub fn height(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max_y - self.min_y
        }
    }

    /// The envelope as a [`Rect`], or `None` when empty.
    pub fn to_rect(&self) -> Option<Rect<f64>> {
        (!self.is_empty()).then(|| {
            Rect::new(
                Coord {
                    x: self.min_x,
                    y: self.min_y,
                },
                Coord {
                    x: self.max_x,
                    y: self.max_y,
                },
            )
        })
    }
}

impl From<Rect<f64>> for Envelope {
    fn from(rect: Rect<f64>) -> Self {
        let (min, max) = (rect.min(), rect.max());
        Self::new(min.x, min.y, max.x, max.y)
    }
}

fn coord(c: &Coordinate) -> Coord<f64> {
    Coord {
        x: c.longitude,
        y: c.latitude,
    }
}

/// A native point.
pub fn make_point(c: &Coordinate) -> Point<f64> {
    Point::from(coord(c))
}

/// An open native line with positions in source order.
pub fn make_line(coords: &[Coordinate]) -> LineString<f64> {
    coords.iter().map(coord).collect()
}

/// A closed native ring: the first position is repeated at the end when needed.
pub fn make_ring(coords: &[Coordinate]) -> LineString<f64> {
    let mut ring = make_line(coords);
    ring.close();
    ring
}

/// A native polygon from an outer ring and holes.
pub fn make_polygon(outer: &[Coordinate], holes: &[Vec<Coordinate>]) -> Polygon<f64> {
    Polygon::new(
        make_ring(outer),
        holes.iter().map(|h| make_ring(h)).collect(),
    )
}

/// The envelope as a geometry: a rectangle, or an empty collection for an empty envelope.
pub fn envelope_to_geometry(envelope: &Envelope) -> Geometry<f64> {
    match envelope.to_rect() {
        Some(rect) => Geometry::Rect(rect),
        None => Geometry::GeometryCollection(GeometryCollection(Vec::new())),
    }
}

/// Combine parts into one geometry without copying a lone part.
pub fn combine(parts: &[Geometry<f64>]) -> Cow<'_, Geometry<f64>> {
    match parts {
        [one] => Cow::Borrowed(one),
        _ => Cow::Owned(collect_parts(parts)),
    }
}

/// Combine parts into one geometry.
///
/// One part is returned as-is. Homogeneous parts become the matching multi
/// geometry (points, lines, or polygons); anything else, including no parts,
/// becomes a geometry collection.
pub fn build_from_parts(parts: &[Geometry<f64>]) -> Geometry<f64> {
    combine(parts).into_owned()
}

fn collect_parts(parts: &[Geometry<f64>]) -> Geometry<f64> {
    if parts.is_empty() {
        return Geometry::GeometryCollection(GeometryCollection(Vec::new()));
    }
    let points: Option<Vec<_>> = parts
        .iter()
        .map(|g| match g {
            Geometry::Point(p) => Some(*p),
            _ => None,
        })
        .collect();
    if let Some(points) = points {
        return Geometry::MultiPoint(MultiPoint(points));
    }
    let lines: Option<Vec<_>> = parts
        .iter()
        .map(|g| match g {
            Geometry::LineString(l) => Some(l.clone()),
            _ => None,
        })
        .collect();
    if let Some(lines) = lines {
        return Geometry::MultiLineString(MultiLineString(lines));
    }
    let polygons: Option<Vec<_>> = parts
        .iter()
        .map(|g| match g {
            Geometry::Polygon(p) => Some(p.clone()),
            _ => None,
        })
        .collect();
    if let Some(polygons) = polygons {
        return Geometry::MultiPolygon(MultiPolygon(polygons));
    }
    Geometry::GeometryCollection(GeometryCollection(parts.to_vec()))
}

/// A geometry prepared for repeated intersection tests.
///
/// The bounding box is computed once; candidates whose box misses it are rejected
/// without touching the exact predicate. Rectangles additionally accept any
/// candidate whose box they contain, which keeps degenerate (zero-area) query
/// boxes exact.
#[derive(Clone, Debug)]
pub struct Prepared<'a> {
    geometry: &'a Geometry<f64>,
    envelope: Envelope,
}

/// Prepare `geometry` for repeated [`intersects`](Prepared::intersects) tests.
pub fn prepare(geometry: &Geometry<f64>) -> Prepared<'_> {
    Prepared {
        geometry,
        envelope: Envelope::of(geometry),
    }
}

impl Prepared<'_> {
    /// The prepared geometry's bounding box.
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Whether the prepared geometry and `other` share at least one point.
    pub fn intersects(&self, other: &Geometry<f64>) -> bool {
        let bounds = Envelope::of(other);
        if !self.envelope.intersects(&bounds) {
            return false;
        }
        if matches!(self.geometry, Geometry::Rect(_)) && self.envelope.contains(&bounds) {
            return true;
        }
        self.geometry.intersects(other)
    }
}
