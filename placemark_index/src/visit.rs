// Copyright 2025 the Placemark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visit-once bookkeeping for geometry conversion.

use std::collections::HashSet;

use placemark_tree::{Document, NodeId, NodeKinds};

/// Records which geometry nodes have been converted.
///
/// Extraction selects multi-geometries first and concrete geometries second, so a
/// concrete node can be reached after its enclosing multi-geometry already produced
/// it. Marking a converted node marks its whole geometry subtree, and
/// [`is_covered`](Self::is_covered) also checks the geometry ancestors, so every node
/// converts exactly once.
#[derive(Clone, Debug, Default)]
pub struct VisitTracker {
    converted: HashSet<NodeId>,
}

impl VisitTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `node` itself has been marked.
    pub fn is_converted(&self, node: NodeId) -> bool {
        self.converted.contains(&node)
    }

    /// Whether `node` or any enclosing geometry node has been marked.
    ///
    /// The walk stops at the first non-geometry ancestor, so it is bounded by the
    /// nesting depth of the geometry.
    pub fn is_covered(&self, doc: &Document, node: NodeId) -> bool {
        self.is_converted(node)
            || doc
                .ancestors(node)
                .take_while(|a| NodeKinds::GEOMETRY.contains(doc.kind(*a)))
                .any(|a| self.is_converted(a))
    }

    /// Mark `node` and every geometry node below it.
    pub fn mark_subtree(&mut self, doc: &Document, node: NodeId) {
        self.converted.extend(
            doc.descendants(node)
                .filter(|d| NodeKinds::GEOMETRY.contains(doc.kind(*d))),
        );
        self.converted.insert(node);
    }

    /// Number of marked nodes.
    pub fn len(&self) -> usize {
        self.converted.len()
    }

    /// Whether nothing has been marked.
    pub fn is_empty(&self) -> bool {
        self.converted.is_empty()
    }
}
