// Copyright 2025 the Placemark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=placemark_tree --heading-base-level=0

//! Placemark Tree: an arena-backed KML document model.
//!
//! This crate owns the markup side of the Placemark workspace:
//!
//! - [`Document`]: nodes in an append-only arena with parent links, depth-first
//!   traversal, kind-filtered flattening, and nearest-ancestor queries.
//! - [`kml`]: a namespace-tolerant reader that builds a [`Document`] from KML text.
//! - [`KmzArchive`]: opens a zipped KMZ, finds its document entry, and serves the
//!   remaining entries as assets.
//! - [`AssetResolver`]: the seam through which icon references become bytes.
//!
//! Geometry conversion, style resolution, and feature queries live in
//! `placemark_index`, which consumes the [`Document`] built here.
//!
//! # Example
//!
//! ```rust
//! use placemark_tree::{Document, MarkupNode, NodeKinds};
//!
//! let mut doc = Document::new();
//! let root = doc.insert(None, MarkupNode::document());
//! let folder = doc.insert(Some(root), MarkupNode::folder());
//! let pm = doc.insert(Some(folder), MarkupNode::placemark(Some("#pin")));
//! let pt = doc.insert(Some(pm), MarkupNode::point(13.4, 52.5));
//!
//! assert_eq!(doc.nearest_ancestor(pt, NodeKinds::FEATURE), Some(pm));
//! assert_eq!(doc.flatten(NodeKinds::CONTAINER).collect::<Vec<_>>(), vec![root, folder]);
//! ```
//!
//! Node handles are plain indices. Documents never remove nodes, so handles stay
//! valid for the life of the document that produced them.

pub mod assets;
pub mod error;
pub mod kml;
pub mod kmz;
pub mod tree;
pub mod types;

pub use assets::{AssetError, AssetResolver, DirectoryAssets, MemoryAssets};
pub use error::{Error, Result};
pub use kmz::KmzArchive;
pub use tree::{Ancestors, Descendants, Document};
pub use types::{
    Color, Container, Coordinate, IconStyleDef, LineStyleDef, MarkupGeometry, MarkupNode,
    NodeId, NodeKind, NodeKinds, Placemark, PolyStyleDef, StyleDef, StyleMapDef, StylePair,
    StyleState,
};
