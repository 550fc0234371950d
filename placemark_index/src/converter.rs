// Copyright 2025 the Placemark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversion of markup geometry nodes into native geometries.

use geo::{Geometry, Polygon};
use placemark_tree::{Coordinate, Document, MarkupGeometry, NodeId};

use crate::engine::{make_line, make_point, make_polygon, make_ring};
use crate::error::ConvertError;

/// Native geometries produced from one markup node, plus the parts that failed.
#[derive(Clone, Debug, Default)]
pub struct Converted {
    /// Successfully converted geometries in source order.
    pub geometries: Vec<Geometry<f64>>,
    /// Nodes that could not be converted.
    pub errors: Vec<ConvertError>,
}

/// Converts markup geometry nodes into native geometries.
///
/// The converter never looks at features or styles. A `MultiGeometry` expands into
/// the converted forms of its geometry children at any depth, flattened; a child
/// that fails to convert is reported without discarding its siblings.
#[derive(Copy, Clone, Debug, Default)]
pub struct GeometryConverter {
    rings_are_polygons: bool,
}

impl GeometryConverter {
    /// Create a converter.
    ///
    /// With `rings_are_polygons`, standalone rings become polygons with that ring as
    /// their only boundary; otherwise they stay closed lines.
    pub const fn new(rings_are_polygons: bool) -> Self {
        Self { rings_are_polygons }
    }

    /// Convert the geometry node `node` and, for a multi-geometry, its descendants.
    ///
    /// Non-geometry nodes convert to nothing. Nested multi-geometries are expanded
    /// with an explicit stack, so nesting depth is limited only by memory.
    pub fn convert(&self, doc: &Document, node: NodeId) -> Converted {
        let mut out = Converted::default();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let Some(geometry) = doc.node(id).as_geometry() else {
                continue;
            };
            let converted = match geometry {
                MarkupGeometry::MultiGeometry => {
                    // Reversed so parts pop in source order.
                    stack.extend(doc.children(id).iter().rev().copied());
                    continue;
                }
                MarkupGeometry::Point { coord } => coord
                    .as_ref()
                    .map(|c| make_point(c).into())
                    .ok_or(ConvertError::EmptyCoordinates {
                        node: id,
                        kind: "Point",
                    }),
                MarkupGeometry::LineString { coords } => match coords.as_slice() {
                    [] => Err(ConvertError::EmptyCoordinates {
                        node: id,
                        kind: "LineString",
                    }),
                    [single] => Ok(make_point(single).into()),
                    _ => Ok(make_line(coords).into()),
                },
                MarkupGeometry::LinearRing { coords } => self.convert_ring(id, coords),
                MarkupGeometry::Polygon { outer, inner } => {
                    convert_polygon(id, outer.as_deref(), inner)
                }
            };
            match converted {
                Ok(geometry) => out.geometries.push(geometry),
                Err(error) => out.errors.push(error),
            }
        }
        out
    }

    fn convert_ring(
        &self,
        node: NodeId,
        coords: &[Coordinate],
    ) -> Result<Geometry<f64>, ConvertError> {
        check_ring(node, coords, "LinearRing")?;
        let ring = make_ring(coords);
        Ok(if self.rings_are_polygons {
            Polygon::new(ring, Vec::new()).into()
        } else {
            ring.into()
        })
    }
}

fn convert_polygon(
    node: NodeId,
    outer: Option<&[Coordinate]>,
    inner: &[Vec<Coordinate>],
) -> Result<Geometry<f64>, ConvertError> {
    let outer = outer.ok_or(ConvertError::MissingOuterRing { node })?;
    check_ring(node, outer, "Polygon")?;
    for hole in inner {
        check_ring(node, hole, "Polygon")?;
    }
    Ok(make_polygon(outer, inner).into())
}

fn check_ring(
    node: NodeId,
    coords: &[Coordinate],
    kind: &'static str,
) -> Result<(), ConvertError> {
    let Some((first, last)) = coords.first().zip(coords.last()) else {
        return Err(ConvertError::EmptyCoordinates { node, kind });
    };
    let len = coords.len() + usize::from(first != last);
    if len < 4 {
        return Err(ConvertError::ShortRing { node, len });
    }
    Ok(())
}
