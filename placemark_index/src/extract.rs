// Copyright 2025 the Placemark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry extraction: the two-pass walk that groups native geometries by feature.

use std::collections::HashMap;

use geo::Geometry;
use placemark_tree::{Document, NodeId, NodeKinds};

use crate::converter::GeometryConverter;
use crate::error::ConvertError;
use crate::ids::IdTable;
use crate::visit::VisitTracker;

/// The geometries owned by one feature.
#[derive(Clone, Debug)]
pub struct FeatureGeometries {
    /// The feature node.
    pub feature: NodeId,
    /// Native geometries in document order of their source nodes.
    pub geometries: Vec<Geometry<f64>>,
}

/// Result of [`GeometryExtractor::run`].
#[derive(Clone, Debug, Default)]
pub struct Extraction {
    /// Features that own at least one geometry, in document order.
    pub features: Vec<FeatureGeometries>,
    /// Geometry nodes that failed to convert and were skipped.
    pub skipped: Vec<ConvertError>,
}

impl Extraction {
    /// Total number of native geometries across all features.
    pub fn geometry_count(&self) -> usize {
        self.features.iter().map(|f| f.geometries.len()).sum()
    }
}

#[derive(Debug)]
struct Group {
    feature: NodeId,
    parts: Vec<(usize, Geometry<f64>)>,
}

/// Walks a document and assigns every converted geometry to its enclosing feature.
///
/// Pass one selects every `MultiGeometry` in document order and converts the ones not
/// already covered by an enclosing multi-geometry. Pass two selects every concrete
/// geometry (`Point`, `LineString`, `LinearRing`, `Polygon`) and converts the ones no
/// earlier conversion covered. A [`VisitTracker`] guarantees each node converts
/// exactly once.
///
/// Geometries without an enclosing feature are skipped. Features that end up with no
/// geometry are not part of the result.
#[derive(Debug)]
pub struct GeometryExtractor<'a> {
    doc: &'a Document,
    converter: GeometryConverter,
    tracker: VisitTracker,
    positions: HashMap<NodeId, usize>,
    groups: Vec<Group>,
    group_of: HashMap<NodeId, usize>,
    skipped: Vec<ConvertError>,
}

impl<'a> GeometryExtractor<'a> {
    /// Create an extractor over `doc`.
    pub fn new(doc: &'a Document, converter: GeometryConverter) -> Self {
        let positions = doc
            .flatten(NodeKinds::all())
            .enumerate()
            .map(|(position, node)| (node, position))
            .collect();
        Self {
            doc,
            converter,
            tracker: VisitTracker::new(),
            positions,
            groups: Vec::new(),
            group_of: HashMap::new(),
            skipped: Vec::new(),
        }
    }

    /// Run both passes, giving every geometry node an id in `ids` as it is first seen.
    pub fn run(mut self, ids: &mut IdTable) -> Extraction {
        let doc = self.doc;

        let mut multis = 0_usize;
        for node in doc.flatten(NodeKinds::MULTI_GEOMETRY) {
            ids.ensure_geometry(node);
            if !self.tracker.is_covered(doc, node) {
                self.visit(node);
                multis += 1;
            }
        }
        tracing::debug!(multis, "converted multi-geometries");

        let mut concrete = 0_usize;
        for node in doc.flatten(NodeKinds::CONCRETE_GEOMETRY) {
            ids.ensure_geometry(node);
            if !self.tracker.is_covered(doc, node) {
                self.visit(node);
                concrete += 1;
            }
        }
        tracing::debug!(concrete, "converted standalone geometries");

        self.finish()
    }

    fn position(&self, node: NodeId) -> usize {
        self.positions.get(&node).copied().unwrap_or(usize::MAX)
    }

    fn visit(&mut self, node: NodeId) {
        let doc = self.doc;
        self.tracker.mark_subtree(doc, node);
        let Some(feature) = doc.nearest_ancestor(node, NodeKinds::FEATURE) else {
            tracing::debug!(?node, "skipping geometry outside any feature");
            return;
        };

        let converted = self.converter.convert(doc, node);
        for error in converted.errors {
            tracing::warn!(node = ?error.node(), %error, "skipping geometry");
            self.skipped.push(error);
        }
        if converted.geometries.is_empty() {
            return;
        }

        let position = self.position(node);
        let slot = *self.group_of.entry(feature).or_insert_with(|| {
            self.groups.push(Group {
                feature,
                parts: Vec::new(),
            });
            self.groups.len() - 1
        });
        self.groups[slot]
            .parts
            .extend(converted.geometries.into_iter().map(|g| (position, g)));
    }

    fn finish(self) -> Extraction {
        let Self {
            positions,
            mut groups,
            skipped,
            ..
        } = self;
        let position = |node: &NodeId| positions.get(node).copied().unwrap_or(usize::MAX);

        // Stable sorts keep the converter's order among parts of one source node.
        groups.sort_by_key(|g| position(&g.feature));
        let features = groups
            .into_iter()
            .map(|mut group| {
                group.parts.sort_by_key(|(p, _)| *p);
                FeatureGeometries {
                    feature: group.feature,
                    geometries: group.parts.into_iter().map(|(_, g)| g).collect(),
                }
            })
            .collect();
        Extraction { features, skipped }
    }
}
