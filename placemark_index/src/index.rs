// Copyright 2025 the Placemark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The feature index and its query surface.

use std::borrow::Cow;
use std::collections::HashMap;

use geo::Geometry;
use placemark_tree::{AssetError, AssetResolver, Document, KmzArchive, NodeId, NodeKinds, kml};

use crate::converter::GeometryConverter;
use crate::engine::{Envelope, combine, envelope_to_geometry, prepare};
use crate::error::{ConvertError, Error, Result};
use crate::extract::GeometryExtractor;
use crate::ids::{GeometryKind, IdAssigner, IdTable};
use crate::options::ExtractOptions;
use crate::style::{IconCache, Style, StyleResolver, StyleSource, strip_ref};

/// One placemark and the native geometries it owns.
#[derive(Clone, Debug)]
pub struct Feature {
    node: NodeId,
    id: String,
    style_ref: Option<String>,
    owner_folder: Option<NodeId>,
    geometries: Vec<Geometry<f64>>,
}

impl Feature {
    /// The placemark node in the index's document.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Assigned identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Style reference with the `#` prefix removed.
    pub fn style_ref(&self) -> Option<&str> {
        self.style_ref.as_deref()
    }

    /// The folder directly containing the placemark.
    pub fn owner_folder(&self) -> Option<NodeId> {
        self.owner_folder
    }

    /// Owned geometries in document order.
    pub fn geometries(&self) -> &[Geometry<f64>] {
        &self.geometries
    }

    /// All owned geometries combined into one.
    pub fn combined(&self) -> Cow<'_, Geometry<f64>> {
        combine(&self.geometries)
    }

    fn row<'a>(&'a self, geometry: Cow<'a, Geometry<f64>>) -> FeatureRow<'a> {
        FeatureRow {
            id: &self.id,
            style_ref: self.style_ref.as_deref().unwrap_or(""),
            feature: self.node,
            geometry,
        }
    }
}

/// A query result: one feature paired with one geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureRow<'a> {
    /// Feature id.
    pub id: &'a str,
    /// Style reference without `#`; empty when the feature has none.
    pub style_ref: &'a str,
    /// The placemark node.
    pub feature: NodeId,
    /// The matching geometry.
    pub geometry: Cow<'a, Geometry<f64>>,
}

/// A read-only, queryable view of a KML document's features.
///
/// Built once with [`FeatureIndex::build`]; there is no update path. All queries are
/// linear scans over the features in document order.
pub struct FeatureIndex {
    doc: Document,
    features: Vec<Feature>,
    ids: IdTable,
    kinds: HashMap<String, GeometryKind>,
    styles: StyleResolver,
    root: Option<NodeId>,
    folders: Vec<NodeId>,
    skipped: Vec<ConvertError>,
}

impl core::fmt::Debug for FeatureIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FeatureIndex")
            .field("features", &self.features.len())
            .field("geometries", &self.geometry_count())
            .field("styles", &self.styles.style_count())
            .field("root", &self.root)
            .field("skipped", &self.skipped.len())
            .finish_non_exhaustive()
    }
}

impl FeatureIndex {
    /// Extract features, assign ids, and resolve styles for `doc`.
    ///
    /// Fails with [`Error::MalformedDocument`] before any extraction when the document
    /// has no root or no `Document` container.
    pub fn build(doc: Document, options: &ExtractOptions) -> Result<Self> {
        if doc.root().is_none() {
            return Err(Error::MalformedDocument("document has no root node"));
        }
        if doc.container().is_none() {
            return Err(Error::MalformedDocument(
                "root is neither a Document nor has a Document child",
            ));
        }

        let mut ids = IdTable::new();
        let converter = GeometryConverter::new(options.rings_are_polygons);
        let extraction = GeometryExtractor::new(&doc, converter).run(&mut ids);
        let assignment =
            IdAssigner::new(options.id_policy).assign(&doc, &extraction.features, &mut ids);
        let styles = StyleResolver::build(&doc, &options.styles);

        let features: Vec<Feature> = extraction
            .features
            .into_iter()
            .map(|entry| {
                let markup = doc.node(entry.feature);
                Feature {
                    node: entry.feature,
                    id: ids.get(entry.feature).unwrap_or_default().to_owned(),
                    style_ref: markup
                        .as_feature()
                        .and_then(|p| p.style_url.as_deref())
                        .map(|s| strip_ref(s).to_owned()),
                    owner_folder: doc
                        .parent(entry.feature)
                        .filter(|p| doc.kind(*p) == NodeKinds::FOLDER),
                    geometries: entry.geometries,
                }
            })
            .collect();

        let index = Self {
            features,
            ids,
            kinds: assignment.kinds,
            styles,
            root: assignment.root,
            folders: assignment.folders,
            skipped: extraction.skipped,
            doc,
        };
        tracing::info!(
            features = index.features.len(),
            geometries = index.geometry_count(),
            skipped = index.skipped.len(),
            "built feature index"
        );
        Ok(index)
    }

    /// Read KML text and build an index from it.
    pub fn from_kml_str(xml: &str, options: &ExtractOptions) -> Result<Self> {
        Self::build(kml::read_str(xml)?, options)
    }

    /// Build an index from the document entry of a KMZ archive.
    pub fn from_kmz(archive: &KmzArchive, options: &ExtractOptions) -> Result<Self> {
        Self::build(archive.document()?, options)
    }

    /// The source document.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Generated identifiers for the root, folders, features, and geometry nodes.
    pub fn ids(&self) -> &IdTable {
        &self.ids
    }

    /// The style tables.
    pub fn styles(&self) -> &StyleResolver {
        &self.styles
    }

    /// Number of features with at least one geometry.
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Total number of native geometries.
    pub fn geometry_count(&self) -> usize {
        self.features.iter().map(|f| f.geometries.len()).sum()
    }

    /// Features in document order.
    pub fn features(&self) -> impl Iterator<Item = &Feature> + '_ {
        self.features.iter()
    }

    /// A feature by id.
    pub fn feature(&self, id: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.id == id)
    }

    /// The geometries owned by a feature.
    pub fn geometries_of(&self, id: &str) -> Option<&[Geometry<f64>]> {
        self.feature(id).map(Feature::geometries)
    }

    /// The kind of a feature, [`GeometryKind::Unknown`] for unknown ids.
    pub fn geometry_kind(&self, id: &str) -> GeometryKind {
        self.kinds.get(id).copied().unwrap_or_default()
    }

    /// The root container, when one was found.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Distinct folders owning features, in feature order.
    pub fn folders(&self) -> &[NodeId] {
        &self.folders
    }

    /// Geometry nodes skipped because they failed to convert.
    pub fn skipped(&self) -> &[ConvertError] {
        &self.skipped
    }

    /// A display label: the document name, with its description in parentheses when
    /// it has one.
    pub fn name(&self) -> Option<String> {
        let info = self.doc.container_info()?;
        let name = info.name.as_deref()?;
        Some(match info.description.as_deref().map(str::trim) {
            Some(description) if !description.is_empty() => format!("{name} ({description})"),
            _ => name.to_owned(),
        })
    }

    /// Bounding box of every geometry; empty for an empty index.
    pub fn extent(&self) -> Envelope {
        let mut extent = Envelope::EMPTY;
        for geometry in self.features.iter().flat_map(|f| &f.geometries) {
            extent.expand_to_include(geometry);
        }
        extent
    }

    /// Ids of features whose combined geometry intersects `view`.
    pub fn ids_in_view(&self, view: &Envelope) -> Vec<&str> {
        let view = envelope_to_geometry(view);
        let view = prepare(&view);
        self.features
            .iter()
            .filter(|f| view.intersects(&f.combined()))
            .map(Feature::id)
            .collect()
    }

    /// Every geometry that intersects `view`, flattened across features.
    pub fn geometries_in_view(&self, view: &Envelope) -> Vec<&Geometry<f64>> {
        let view = envelope_to_geometry(view);
        let view = prepare(&view);
        self.features
            .iter()
            .flat_map(|f| &f.geometries)
            .filter(|g| view.intersects(g))
            .collect()
    }

    /// One row per owned geometry that intersects `geometry`.
    ///
    /// A feature contributes a row for each matching part, carrying that part rather
    /// than its combined geometry. Style resolution plays no part in matching.
    pub fn intersect(&self, geometry: &Geometry<f64>) -> Vec<FeatureRow<'_>> {
        let prepared = prepare(geometry);
        let prepared = &prepared;
        self.features
            .iter()
            .flat_map(move |f| {
                f.geometries
                    .iter()
                    .filter(move |g| prepared.intersects(g))
                    .map(move |g| f.row(Cow::Borrowed(g)))
            })
            .collect()
    }

    /// [`intersect`](Self::intersect) with an envelope.
    pub fn intersect_envelope(&self, view: &Envelope) -> Vec<FeatureRow<'_>> {
        self.intersect(&envelope_to_geometry(view))
    }

    /// The feature with `id`, carrying its combined geometry.
    pub fn by_id(&self, id: &str) -> Option<FeatureRow<'_>> {
        self.feature(id).map(|f| f.row(f.combined()))
    }

    /// The combined geometry of a feature.
    pub fn geometry_by_id(&self, id: &str) -> Option<Cow<'_, Geometry<f64>>> {
        self.feature(id).map(Feature::combined)
    }

    /// The style of a query row.
    pub fn style_for(&self, row: &FeatureRow<'_>) -> Option<&Style> {
        self.styles.resolve(row.style_ref)
    }

    /// Load every referenced icon through `resolver`, skipping failures.
    pub fn load_icons(&self, resolver: &dyn AssetResolver) -> IconCache {
        self.styles.load_icons(resolver)
    }

    /// The icon bytes of a style id.
    ///
    /// `Ok(None)` when the style has no icon; resolver failures are returned as-is.
    pub fn icon(
        &self,
        style_id: &str,
        resolver: &dyn AssetResolver,
    ) -> core::result::Result<Option<Vec<u8>>, AssetError> {
        self.styles
            .icon_ref(style_id)
            .map(|href| resolver.resolve(href))
            .transpose()
    }
}

impl StyleSource for FeatureIndex {
    fn resolve_style(&self, style_ref: &str) -> Option<&Style> {
        self.styles.resolve(style_ref)
    }

    fn resolve_icon(&self, style_id: &str) -> Option<&str> {
        self.styles.icon_ref(style_id)
    }
}
