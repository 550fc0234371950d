// Copyright 2025 the Placemark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Build options.

use crate::style::StyleConfig;

/// How identifiers are chosen for the root container, folders, and features.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum IdPolicy {
    /// Sequential integer ids starting at `1`, in index order.
    ///
    /// The root container and every feature always receive a generated id. Folders
    /// keep a source `id` attribute when present and are numbered otherwise.
    #[default]
    Sequential,
    /// Keep every source `id` attribute; only nodes without one are numbered.
    ///
    /// Source ids are not checked for uniqueness. [`by_id`](crate::FeatureIndex::by_id)
    /// returns the first feature carrying a duplicated id.
    KeepSource,
}

/// Options for [`FeatureIndex::build`](crate::FeatureIndex::build).
#[derive(Clone, Debug, Default)]
pub struct ExtractOptions {
    /// Convert standalone `LinearRing` geometries to polygons instead of closed lines.
    pub rings_are_polygons: bool,
    /// Identifier policy.
    pub id_policy: IdPolicy,
    /// Default styles seeded into the style table.
    pub styles: StyleConfig,
}
