// Copyright 2025 the Placemark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Identifier assignment and geometry-kind classification.
//!
//! Generated identifiers live in an [`IdTable`] keyed by [`NodeId`]; the document
//! itself is never modified.

use std::collections::{HashMap, HashSet};

use geo::Geometry;
use placemark_tree::{Document, NodeId, NodeKinds};

use crate::extract::FeatureGeometries;
use crate::options::IdPolicy;

/// Side table of generated identifiers.
#[derive(Clone, Debug, Default)]
pub struct IdTable {
    ids: HashMap<NodeId, String>,
    geometries: usize,
}

impl IdTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The identifier assigned to `node`.
    pub fn get(&self, node: NodeId) -> Option<&str> {
        self.ids.get(&node).map(String::as_str)
    }

    /// Whether `node` has an identifier.
    pub fn contains(&self, node: NodeId) -> bool {
        self.ids.contains_key(&node)
    }

    /// Number of identified nodes.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no node has an identifier.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub(crate) fn set(&mut self, node: NodeId, id: String) {
        self.ids.insert(node, id);
    }

    /// Give a geometry node an identifier the first time it is seen.
    ///
    /// Returns `true` if the node was new.
    pub(crate) fn ensure_geometry(&mut self, node: NodeId) -> bool {
        if self.ids.contains_key(&node) {
            return false;
        }
        self.geometries += 1;
        self.ids.insert(node, format!("geometry-{}", self.geometries));
        true
    }
}

/// Coarse classification of a feature by its first geometry.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    /// Points.
    Point,
    /// Lines and multi-lines.
    Polyline,
    /// Polygons, multi-polygons, and mixed collections.
    Polygon,
    /// Anything else, and features without geometry.
    #[default]
    Unknown,
}

impl GeometryKind {
    /// Classify one native geometry.
    pub fn of(geometry: &Geometry<f64>) -> Self {
        match geometry {
            Geometry::Point(_) => Self::Point,
            Geometry::LineString(_) | Geometry::MultiLineString(_) => Self::Polyline,
            Geometry::Polygon(_)
            | Geometry::MultiPolygon(_)
            | Geometry::GeometryCollection(_) => Self::Polygon,
            Geometry::Line(_)
            | Geometry::MultiPoint(_)
            | Geometry::Rect(_)
            | Geometry::Triangle(_) => Self::Unknown,
        }
    }
}

/// Identifiers and classifications produced by [`IdAssigner::assign`].
#[derive(Clone, Debug, Default)]
pub struct Assignment {
    /// The root container, when one was found above the first feature.
    pub root: Option<NodeId>,
    /// Owning folders in first-seen feature order, each listed once.
    pub folders: Vec<NodeId>,
    /// Kind of each feature with at least one geometry, keyed by feature id.
    pub kinds: HashMap<String, GeometryKind>,
}

/// Assigns identifiers to the root container, folders, and features.
///
/// Ids are sequential integers in index order starting at `1`, so they depend on
/// traversal order and are not stable across edits of the document.
#[derive(Copy, Clone, Debug, Default)]
pub struct IdAssigner {
    policy: IdPolicy,
    next: u32,
}

impl IdAssigner {
    /// Create an assigner using `policy`.
    pub const fn new(policy: IdPolicy) -> Self {
        Self { policy, next: 0 }
    }

    /// Assign ids for the extracted `features` into `ids`.
    pub fn assign(
        mut self,
        doc: &Document,
        features: &[FeatureGeometries],
        ids: &mut IdTable,
    ) -> Assignment {
        let mut out = Assignment::default();
        let keep_source = self.policy == IdPolicy::KeepSource;

        out.root = features.first().and_then(|f| find_root(doc, f.feature));
        if let Some(root) = out.root {
            self.stamp(doc, root, keep_source, ids);
        }

        let mut seen = HashSet::new();
        for entry in features {
            let folder = doc
                .parent(entry.feature)
                .filter(|p| doc.kind(*p) == NodeKinds::FOLDER);
            if let Some(folder) = folder {
                if seen.insert(folder) {
                    out.folders.push(folder);
                    self.stamp(doc, folder, true, ids);
                }
            }
            self.stamp(doc, entry.feature, keep_source, ids);
        }

        for entry in features {
            let (Some(first), Some(id)) = (entry.geometries.first(), ids.get(entry.feature))
            else {
                continue;
            };
            out.kinds
                .entry(id.to_owned())
                .or_insert_with(|| GeometryKind::of(first));
        }

        tracing::debug!(
            features = features.len(),
            folders = out.folders.len(),
            root = ?out.root,
            "assigned ids"
        );
        out
    }

    fn stamp(&mut self, doc: &Document, node: NodeId, keep_source: bool, ids: &mut IdTable) {
        let id = match doc.node(node).id().filter(|_| keep_source) {
            Some(source) => source.to_owned(),
            None => {
                self.next += 1;
                self.next.to_string()
            }
        };
        ids.set(node, id);
    }
}

/// The `Document` reached from `feature` by climbing through folders only.
fn find_root(doc: &Document, feature: NodeId) -> Option<NodeId> {
    doc.ancestors(feature)
        .find(|a| doc.kind(*a) != NodeKinds::FOLDER)
        .filter(|a| doc.kind(*a) == NodeKinds::DOCUMENT)
}
