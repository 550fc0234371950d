// Copyright 2025 the Placemark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised while building a feature index or converting geometry.

use placemark_tree::NodeId;
use thiserror::Error;

/// Errors that abort building a [`FeatureIndex`](crate::FeatureIndex).
#[derive(Debug, Error)]
pub enum Error {
    /// The document has no root, or no `Document` container under it.
    #[error("malformed document: {0}")]
    MalformedDocument(&'static str),

    /// Loading the document failed.
    #[error(transparent)]
    Load(#[from] placemark_tree::Error),
}

/// Result type for index construction.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// A geometry node that could not be converted.
///
/// Conversion errors are isolated per node: the extractor skips the node, logs it,
/// and keeps the error on the index (see [`FeatureIndex::skipped`](crate::FeatureIndex::skipped)).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// The node has no positions at all.
    #[error("{kind} {node:?} has no coordinates")]
    EmptyCoordinates {
        /// The offending node.
        node: NodeId,
        /// Markup element name of the node.
        kind: &'static str,
    },

    /// A ring has too few positions to enclose an area.
    #[error("ring in {node:?} has {len} positions after closing, at least 4 are required")]
    ShortRing {
        /// The offending node.
        node: NodeId,
        /// Positions after closing the ring.
        len: usize,
    },

    /// A polygon without an outer boundary.
    #[error("polygon {node:?} has no outer boundary")]
    MissingOuterRing {
        /// The offending node.
        node: NodeId,
    },
}

impl ConvertError {
    /// The node that failed to convert.
    pub fn node(&self) -> NodeId {
        match self {
            Self::EmptyCoordinates { node, .. }
            | Self::ShortRing { node, .. }
            | Self::MissingOuterRing { node } => *node,
        }
    }
}
