// Copyright 2025 the Placemark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core document implementation: arena storage, parent links, and traversal.

use crate::types::{Container, MarkupNode, NodeId, NodeKind, NodeKinds};

/// Arena-backed markup document.
///
/// Nodes live in a vector and refer to their parent by [`NodeId`], so the tree's
/// ownership stays acyclic: the document owns every node, and parent links are
/// plain lookups. Nodes are only ever appended, which guarantees that a node's
/// parent exists before the node itself.
#[derive(Clone, Default)]
pub struct Document {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl core::fmt::Debug for Document {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let features = self
            .nodes
            .iter()
            .filter(|n| n.markup.flag() == NodeKinds::FEATURE)
            .count();
        f.debug_struct("Document")
            .field("nodes_total", &self.nodes.len())
            .field("features", &features)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    markup: MarkupNode,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
        }
    }

    /// Insert a new node as the last child of `parent`.
    ///
    /// The first node inserted without a parent becomes the [root](Self::root).
    /// Later parentless nodes are detached: they are stored but not reachable from
    /// the root.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this document.
    pub fn insert(&mut self, parent: Option<NodeId>, markup: MarkupNode) -> NodeId {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "NodeId uses 32-bit indices by design."
        )]
        let id = NodeId::new(self.nodes.len() as u32);
        if let Some(p) = parent {
            self.nodes
                .get_mut(p.idx())
                .expect("dangling parent NodeId")
                .children
                .push(id);
        } else if self.root.is_none() {
            self.root = Some(id);
        }
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            markup,
        });
        id
    }

    /// The root node, if any node has been inserted.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Total number of nodes, including detached ones.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the document has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Access a node, or `None` for a handle from another document.
    pub fn get(&self, id: NodeId) -> Option<&MarkupNode> {
        self.nodes.get(id.idx()).map(|n| &n.markup)
    }

    /// Access a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this document.
    pub fn node(&self, id: NodeId) -> &MarkupNode {
        &self.slot(id).markup
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut MarkupNode {
        &mut self
            .nodes
            .get_mut(id.idx())
            .expect("dangling NodeId")
            .markup
    }

    fn slot(&self, id: NodeId) -> &Node {
        self.nodes.get(id.idx()).expect("dangling NodeId")
    }

    /// The kind flag of a node.
    pub fn kind(&self, id: NodeId) -> NodeKinds {
        self.node(id).flag()
    }

    /// Parent of `id`, or `None` for the root and detached nodes.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).parent
    }

    /// Children of `id` in source order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.slot(id).children
    }

    /// Iterate `id` and all of its descendants in depth-first pre-order.
    ///
    /// The iterator is lazy and borrows the document; call again to restart.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: vec![id],
        }
    }

    /// Iterate every node reachable from the root whose kind is in `kinds`, in document order.
    pub fn flatten(&self, kinds: NodeKinds) -> impl Iterator<Item = NodeId> + '_ {
        self.root
            .into_iter()
            .flat_map(move |root| self.descendants(root))
            .filter(move |id| kinds.contains(self.kind(*id)))
    }

    /// Iterate the ancestors of `id`, nearest first (excluding `id` itself).
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.parent(id),
        }
    }

    /// The nearest ancestor of `id` whose kind is in `kinds`.
    pub fn nearest_ancestor(&self, id: NodeId, kinds: NodeKinds) -> Option<NodeId> {
        self.ancestors(id).find(|a| kinds.contains(self.kind(*a)))
    }

    /// Path from the root (or detached top-level node) to `id`, inclusive.
    pub fn path_to_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut out: Vec<NodeId> = core::iter::once(id).chain(self.ancestors(id)).collect();
        out.reverse();
        out
    }

    /// The document container: the root itself if it is a `Document`, otherwise the
    /// root's first `Document` child.
    pub fn container(&self) -> Option<NodeId> {
        let root = self.root?;
        if self.kind(root) == NodeKinds::DOCUMENT {
            return Some(root);
        }
        self.children(root)
            .iter()
            .copied()
            .find(|c| self.kind(*c) == NodeKinds::DOCUMENT)
    }

    /// Name and description of the [document container](Self::container).
    pub fn container_info(&self) -> Option<&Container> {
        match &self.node(self.container()?).kind {
            NodeKind::Document(c) => Some(c),
            _ => None,
        }
    }
}

/// Depth-first pre-order iterator returned by [`Document::descendants`].
#[derive(Debug)]
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}

/// Parent-chain iterator returned by [`Document::ancestors`].
#[derive(Debug)]
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.doc.parent(id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coordinate;

    fn sample() -> (Document, [NodeId; 6]) {
        let mut doc = Document::new();
        let kml = doc.insert(None, MarkupNode::other("kml"));
        let document = doc.insert(Some(kml), MarkupNode::document());
        let folder = doc.insert(Some(document), MarkupNode::folder());
        let pm = doc.insert(Some(folder), MarkupNode::placemark(Some("#s")));
        let multi = doc.insert(Some(pm), MarkupNode::multi_geometry());
        let pt = doc.insert(Some(multi), MarkupNode::point(1.0, 2.0));
        (doc, [kml, document, folder, pm, multi, pt])
    }

    #[test]
    fn first_parentless_insert_is_root() {
        let (mut doc, [kml, ..]) = sample();
        assert_eq!(doc.root(), Some(kml));
        let detached = doc.insert(None, MarkupNode::folder());
        assert_eq!(doc.root(), Some(kml), "later parentless nodes stay detached");
        assert!(!doc.descendants(kml).any(|n| n == detached));
    }

    #[test]
    fn descendants_are_preorder() {
        let mut doc = Document::new();
        let root = doc.insert(None, MarkupNode::document());
        let a = doc.insert(Some(root), MarkupNode::folder());
        let b = doc.insert(Some(root), MarkupNode::folder());
        let a1 = doc.insert(Some(a), MarkupNode::placemark(None));
        let b1 = doc.insert(Some(b), MarkupNode::placemark(None));
        let a2 = doc.insert(Some(a), MarkupNode::placemark(None));

        let order: Vec<_> = doc.descendants(root).collect();
        assert_eq!(order, vec![root, a, a1, a2, b, b1]);

        // Restartable: a second walk yields the same sequence.
        assert_eq!(doc.descendants(root).collect::<Vec<_>>(), order);
    }

    #[test]
    fn flatten_filters_by_kind() {
        let (doc, [_, _, _, pm, multi, pt]) = sample();
        let geoms: Vec<_> = doc.flatten(NodeKinds::GEOMETRY).collect();
        assert_eq!(geoms, vec![multi, pt]);
        let features: Vec<_> = doc.flatten(NodeKinds::FEATURE).collect();
        assert_eq!(features, vec![pm]);
    }

    #[test]
    fn ancestor_queries_walk_parent_links() {
        let (doc, [kml, document, folder, pm, multi, pt]) = sample();
        assert_eq!(doc.nearest_ancestor(pt, NodeKinds::FEATURE), Some(pm));
        assert_eq!(doc.nearest_ancestor(pt, NodeKinds::CONTAINER), Some(folder));
        assert_eq!(doc.nearest_ancestor(kml, NodeKinds::FEATURE), None);
        assert_eq!(
            doc.path_to_root(pt),
            vec![kml, document, folder, pm, multi, pt]
        );
    }

    #[test]
    fn container_is_found_under_kml_root() {
        let (doc, [_, document, ..]) = sample();
        assert_eq!(doc.container(), Some(document));

        let mut bare = Document::new();
        let d = bare.insert(None, MarkupNode::document());
        assert_eq!(bare.container(), Some(d));

        let mut none = Document::new();
        let _ = none.insert(None, MarkupNode::other("kml"));
        assert_eq!(none.container(), None);
        assert_eq!(Document::new().container(), None);
    }

    #[test]
    fn get_rejects_foreign_handles() {
        let (doc, _) = sample();
        let mut other = Document::new();
        let mut last = other.insert(None, MarkupNode::document());
        for _ in 0..10 {
            last = other.insert(
                Some(last),
                MarkupNode::line_string(vec![Coordinate::new(0.0, 0.0)]),
            );
        }
        assert!(doc.get(last).is_none());
    }
}
