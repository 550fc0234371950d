// Copyright 2025 the Placemark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=placemark_index --heading-base-level=0

//! Placemark Index: a flat, queryable view of a KML document.
//!
//! A KML document nests placemarks in folders, geometry in multi-geometries, and
//! styles behind style maps. This crate flattens it once into a [`FeatureIndex`]:
//!
//! - [`GeometryExtractor`] converts every geometry node exactly once, even though
//!   multi-geometries and concrete geometries are selected by separate passes, and
//!   groups the results by enclosing placemark.
//! - [`IdAssigner`] gives the root container, folders, and features sequential ids
//!   and classifies each feature by its first geometry.
//! - [`StyleResolver`] builds the style and style-map tables and resolves a style
//!   reference through at most one style map.
//! - [`FeatureIndex`] answers extent, view, intersection, and by-id queries.
//!
//! Geometry is handled through [`geo`] behind the [`engine`] module.
//!
//! # Example
//!
//! ```rust
//! use placemark_index::{ExtractOptions, FeatureIndex, GeometryKind, StyleSource};
//!
//! let xml = r##"<kml><Document>
//!     <Style id="redStyle"><PolyStyle><color>ff0000ff</color></PolyStyle></Style>
//!     <Placemark><styleUrl>#redStyle</styleUrl>
//!       <Point><coordinates>10.0,20.0</coordinates></Point>
//!     </Placemark>
//!   </Document></kml>"##;
//!
//! let index = FeatureIndex::from_kml_str(xml, &ExtractOptions::default()).unwrap();
//! let ids = index.ids_in_view(&index.extent());
//! assert_eq!(ids.len(), 1);
//! assert_eq!(index.geometry_kind(ids[0]), GeometryKind::Point);
//!
//! let hit = geo::Geometry::Point(geo::Point::new(10.0, 20.0));
//! let rows = index.intersect(&hit);
//! assert_eq!(rows[0].style_ref, "redStyle");
//! assert!(index.resolve_style(rows[0].style_ref).is_some());
//! ```
//!
//! ## Limitations
//!
//! Placemarks without any convertible geometry are not indexed: they get no id and
//! never appear in query results. Ids are sequential in document order and change
//! when the document is reordered.

pub mod converter;
pub mod engine;
pub mod error;
pub mod extract;
pub mod ids;
pub mod index;
pub mod options;
pub mod style;
pub mod visit;

pub use converter::{Converted, GeometryConverter};
pub use engine::{Envelope, Prepared};
pub use error::{ConvertError, Error, Result};
pub use extract::{Extraction, FeatureGeometries, GeometryExtractor};
pub use ids::{Assignment, GeometryKind, IdAssigner, IdTable};
pub use index::{Feature, FeatureIndex, FeatureRow};
pub use options::{ExtractOptions, IdPolicy};
pub use style::{
    IconCache, Pen, Style, StyleAlias, StyleConfig, StyleResolver, StyleSource,
};
