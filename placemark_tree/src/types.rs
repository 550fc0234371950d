// Copyright 2025 the Placemark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the document tree: node identifiers, kind flags, and node payloads.

/// Identifier for a node in a [`Document`](crate::Document).
///
/// This is a small, copyable handle into the document's node arena.
/// Documents never remove nodes, so a `NodeId` stays valid for the lifetime of the
/// document that produced it. Using a `NodeId` with a different document is a logic
/// error; lookups through [`Document::get`](crate::Document::get) return `None` for
/// out-of-range handles.
///
/// Handles are ordered by insertion. For documents produced by the
/// [KML reader](crate::kml) insertion order equals document order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32) -> Self {
        Self(idx)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Position of this node in the arena.
    pub const fn index(self) -> usize {
        self.idx()
    }
}

bitflags::bitflags! {
    /// Kind tags for document nodes, used to select nodes during traversal.
    ///
    /// Every node has exactly one bit set; the composite constants exist for
    /// filtering with [`Document::flatten`](crate::Document::flatten).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeKinds: u16 {
        /// Top-level `Document` container.
        const DOCUMENT       = 0b0000_0000_0001;
        /// `Folder` container.
        const FOLDER         = 0b0000_0000_0010;
        /// `Placemark` feature.
        const FEATURE        = 0b0000_0000_0100;
        /// `Point` geometry.
        const POINT          = 0b0000_0000_1000;
        /// `LineString` geometry.
        const LINE_STRING    = 0b0000_0001_0000;
        /// Standalone `LinearRing` geometry.
        const LINEAR_RING    = 0b0000_0010_0000;
        /// `Polygon` geometry.
        const POLYGON        = 0b0000_0100_0000;
        /// `MultiGeometry` container geometry.
        const MULTI_GEOMETRY = 0b0000_1000_0000;
        /// Shared `Style` definition.
        const STYLE          = 0b0001_0000_0000;
        /// `StyleMap` definition.
        const STYLE_MAP      = 0b0010_0000_0000;
        /// Anything else (for example the `kml` root element).
        const OTHER          = 0b0100_0000_0000;

        /// Geometries that convert to a single native geometry.
        const CONCRETE_GEOMETRY = Self::POINT.bits()
            | Self::LINE_STRING.bits()
            | Self::LINEAR_RING.bits()
            | Self::POLYGON.bits();
        /// Every geometry variant.
        const GEOMETRY = Self::CONCRETE_GEOMETRY.bits() | Self::MULTI_GEOMETRY.bits();
        /// Nodes that group features.
        const CONTAINER = Self::DOCUMENT.bits() | Self::FOLDER.bits();
    }
}

/// A geographic position as written in KML: longitude first.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Coordinate {
    /// Longitude in degrees.
    pub longitude: f64,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Optional altitude in meters.
    pub altitude: Option<f64>,
}

impl Coordinate {
    /// Create a coordinate without altitude.
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
            altitude: None,
        }
    }

    /// Create a coordinate with an altitude.
    pub const fn with_altitude(longitude: f64, latitude: f64, altitude: f64) -> Self {
        Self {
            longitude,
            latitude,
            altitude: Some(altitude),
        }
    }
}

/// An RGBA color.
///
/// KML writes colors as `aabbggrr` hex; see [`Color::from_kml_hex`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel; `255` is opaque.
    pub a: u8,
}

impl Color {
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    /// Opaque white, the KML default for unspecified colors.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque dark gray (`#A9A9A9`).
    pub const DARK_GRAY: Self = Self::rgb(169, 169, 169);
    /// Opaque light gray (`#D3D3D3`).
    pub const LIGHT_GRAY: Self = Self::rgb(211, 211, 211);

    /// Create an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color with an explicit alpha channel.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a KML color string.
    ///
    /// Accepts `aabbggrr` (8 hex digits) and the alpha-less `bbggrr` (6 hex digits,
    /// treated as opaque). A leading `#` is ignored. Returns `None` for anything else.
    pub fn from_kml_hex(text: &str) -> Option<Self> {
        let hex = text.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            8 => Some(Self::rgba(byte(6)?, byte(4)?, byte(2)?, byte(0)?)),
            6 => Some(Self::rgb(byte(4)?, byte(2)?, byte(0)?)),
            _ => None,
        }
    }

    /// Pack as `0xAARRGGBB`.
    pub const fn to_argb(self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }
}

/// Payload shared by `Document` and `Folder` nodes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Container {
    /// Display name.
    pub name: Option<String>,
    /// Free-form description (may contain HTML).
    pub description: Option<String>,
}

/// Payload of a `Placemark` node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Placemark {
    /// Display name.
    pub name: Option<String>,
    /// Free-form description (may contain HTML).
    pub description: Option<String>,
    /// Raw style reference, usually `#styleId`.
    pub style_url: Option<String>,
}

/// A geometry element as it appears in the markup.
///
/// `MultiGeometry` carries no data of its own: its parts are child nodes.
/// Polygon boundary rings are stored inline, so they never appear as standalone nodes.
#[derive(Clone, Debug, PartialEq)]
pub enum MarkupGeometry {
    /// A single position.
    Point {
        /// The position, if the markup provided one.
        coord: Option<Coordinate>,
    },
    /// An open path.
    LineString {
        /// Positions in source order.
        coords: Vec<Coordinate>,
    },
    /// A closed path that is not part of a polygon boundary.
    LinearRing {
        /// Positions in source order.
        coords: Vec<Coordinate>,
    },
    /// A polygon with an outer boundary and optional holes.
    Polygon {
        /// Outer boundary ring, if the markup provided one.
        outer: Option<Vec<Coordinate>>,
        /// Inner boundary rings (holes).
        inner: Vec<Vec<Coordinate>>,
    },
    /// A collection whose parts are the node's geometry children.
    MultiGeometry,
}

impl MarkupGeometry {
    /// The kind flag for this variant.
    pub const fn kind(&self) -> NodeKinds {
        match self {
            Self::Point { .. } => NodeKinds::POINT,
            Self::LineString { .. } => NodeKinds::LINE_STRING,
            Self::LinearRing { .. } => NodeKinds::LINEAR_RING,
            Self::Polygon { .. } => NodeKinds::POLYGON,
            Self::MultiGeometry => NodeKinds::MULTI_GEOMETRY,
        }
    }
}

/// `PolyStyle` sub-element of a style.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolyStyleDef {
    /// Fill color.
    pub color: Option<Color>,
    /// Explicit fill flag.
    pub fill: Option<bool>,
    /// Explicit outline flag.
    pub outline: Option<bool>,
}

/// `LineStyle` sub-element of a style.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LineStyleDef {
    /// Line color.
    pub color: Option<Color>,
    /// Line width in pixels.
    pub width: Option<f64>,
}

/// `IconStyle` sub-element of a style.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IconStyleDef {
    /// Icon scale factor.
    pub scale: Option<f64>,
    /// Icon reference (`Icon/href`): a URL or an archive-relative path.
    pub href: Option<String>,
}

/// Payload of a `Style` node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleDef {
    /// Polygon styling.
    pub poly: Option<PolyStyleDef>,
    /// Line styling.
    pub line: Option<LineStyleDef>,
    /// Icon styling.
    pub icon: Option<IconStyleDef>,
}

/// Rendering state keyed by a style-map pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StyleState {
    /// Default appearance.
    Normal,
    /// Appearance while highlighted.
    Highlight,
}

impl StyleState {
    /// Parse the text of a `key` element.
    pub fn from_key(text: &str) -> Option<Self> {
        match text.trim() {
            "normal" => Some(Self::Normal),
            "highlight" => Some(Self::Highlight),
            _ => None,
        }
    }
}

/// One `Pair` of a style map.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StylePair {
    /// Rendering state this pair applies to.
    pub key: Option<StyleState>,
    /// Raw target reference, usually `#styleId`.
    pub style_url: Option<String>,
}

/// Payload of a `StyleMap` node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleMapDef {
    /// Pairs in source order.
    pub pairs: Vec<StylePair>,
}

/// What a node is, together with its kind-specific payload.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// Top-level document container.
    Document(Container),
    /// Folder container.
    Folder(Container),
    /// A placemark.
    Feature(Placemark),
    /// A geometry element.
    Geometry(MarkupGeometry),
    /// A shared style.
    Style(StyleDef),
    /// A style map.
    StyleMap(StyleMapDef),
    /// Any other element, identified by its local name.
    Other(String),
}

impl NodeKind {
    /// The single kind flag of this node.
    pub const fn flag(&self) -> NodeKinds {
        match self {
            Self::Document(_) => NodeKinds::DOCUMENT,
            Self::Folder(_) => NodeKinds::FOLDER,
            Self::Feature(_) => NodeKinds::FEATURE,
            Self::Geometry(g) => g.kind(),
            Self::Style(_) => NodeKinds::STYLE,
            Self::StyleMap(_) => NodeKinds::STYLE_MAP,
            Self::Other(_) => NodeKinds::OTHER,
        }
    }
}

/// A node of the markup document: an optional source identifier and its kind.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkupNode {
    /// Identifier from the source (`id` attribute).
    pub id: Option<String>,
    /// Kind and payload.
    pub kind: NodeKind,
}

impl MarkupNode {
    /// Create a node without an identifier.
    pub const fn new(kind: NodeKind) -> Self {
        Self { id: None, kind }
    }

    /// Set the source identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// An empty `Document` container.
    pub fn document() -> Self {
        Self::new(NodeKind::Document(Container::default()))
    }

    /// An empty `Folder` container.
    pub fn folder() -> Self {
        Self::new(NodeKind::Folder(Container::default()))
    }

    /// A placemark with an optional raw style reference.
    pub fn placemark(style_url: Option<&str>) -> Self {
        Self::new(NodeKind::Feature(Placemark {
            style_url: style_url.map(str::to_owned),
            ..Placemark::default()
        }))
    }

    /// A point geometry.
    pub fn point(longitude: f64, latitude: f64) -> Self {
        Self::geometry(MarkupGeometry::Point {
            coord: Some(Coordinate::new(longitude, latitude)),
        })
    }

    /// A line string geometry.
    pub fn line_string(coords: Vec<Coordinate>) -> Self {
        Self::geometry(MarkupGeometry::LineString { coords })
    }

    /// A standalone linear ring geometry.
    pub fn linear_ring(coords: Vec<Coordinate>) -> Self {
        Self::geometry(MarkupGeometry::LinearRing { coords })
    }

    /// A polygon geometry.
    pub fn polygon(outer: Vec<Coordinate>, inner: Vec<Vec<Coordinate>>) -> Self {
        Self::geometry(MarkupGeometry::Polygon {
            outer: Some(outer),
            inner,
        })
    }

    /// A multi-geometry; insert its parts as children.
    pub fn multi_geometry() -> Self {
        Self::geometry(MarkupGeometry::MultiGeometry)
    }

    /// Any geometry variant.
    pub const fn geometry(geometry: MarkupGeometry) -> Self {
        Self::new(NodeKind::Geometry(geometry))
    }

    /// A shared style.
    pub const fn style(def: StyleDef) -> Self {
        Self::new(NodeKind::Style(def))
    }

    /// A style map.
    pub const fn style_map(def: StyleMapDef) -> Self {
        Self::new(NodeKind::StyleMap(def))
    }

    /// Any other element.
    pub fn other(name: impl Into<String>) -> Self {
        Self::new(NodeKind::Other(name.into()))
    }

    /// The source identifier, if present and non-empty.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// The single kind flag of this node.
    pub const fn flag(&self) -> NodeKinds {
        self.kind.flag()
    }

    /// The placemark payload, if this node is a feature.
    pub fn as_feature(&self) -> Option<&Placemark> {
        match &self.kind {
            NodeKind::Feature(p) => Some(p),
            _ => None,
        }
    }

    /// The container payload, if this node is a document or folder.
    pub fn as_container(&self) -> Option<&Container> {
        match &self.kind {
            NodeKind::Document(c) | NodeKind::Folder(c) => Some(c),
            _ => None,
        }
    }

    /// The geometry payload, if this node is a geometry.
    pub fn as_geometry(&self) -> Option<&MarkupGeometry> {
        match &self.kind {
            NodeKind::Geometry(g) => Some(g),
            _ => None,
        }
    }

    /// The style payload, if this node is a style.
    pub fn as_style(&self) -> Option<&StyleDef> {
        match &self.kind {
            NodeKind::Style(s) => Some(s),
            _ => None,
        }
    }

    /// The style-map payload, if this node is a style map.
    pub fn as_style_map(&self) -> Option<&StyleMapDef> {
        match &self.kind {
            NodeKind::StyleMap(m) => Some(m),
            _ => None,
        }
    }
}
