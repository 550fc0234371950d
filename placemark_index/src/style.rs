// Copyright 2025 the Placemark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style resolution: style tables, style-map aliases, and icon references.
//!
//! Style references resolve through at most one level of indirection:
//!
//! 1. strip a leading `#`;
//! 2. look the id up among the style definitions;
//! 3. otherwise look it up among the style maps and resolve that map's `Normal`
//!    target directly.
//!
//! A style map whose target is another style map resolves to nothing.

use std::collections::HashMap;

use placemark_tree::{AssetResolver, Color, Document, NodeKinds, StyleDef, StyleState};

/// Well-known id of the default area style.
pub const DEFAULT_AREA_STYLE_ID: &str = "{6787C5B3-6482-4B96-9C2D-2C6236D2AC50}";
/// Well-known id of the default point style.
pub const DEFAULT_POINT_STYLE_ID: &str = "{E2892545-7CF4-48A1-B8F0-5A0BF06EF0E1}";
/// Icon of the default point style.
pub const DEFAULT_POINT_ICON: &str =
    "http://www.google.com/intl/en_us/mapfiles/ms/icons/red-pushpin.png";

/// A stroke: color and width in pixels.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pen {
    /// Stroke color.
    pub color: Color,
    /// Stroke width.
    pub width: f64,
}

/// A resolved rendering style.
#[derive(Clone, Debug, PartialEq)]
pub struct Style {
    /// Style id.
    pub id: String,
    /// Area fill.
    pub fill: Option<Color>,
    /// Point marker color.
    pub point_color: Option<Color>,
    /// Area outline.
    pub outline: Option<Pen>,
    /// Line stroke.
    pub line: Option<Pen>,
    /// Whether area outlines are drawn.
    pub enable_outline: bool,
    /// Point marker size.
    pub point_size: Option<f64>,
    /// Icon reference, resolved through an [`AssetResolver`].
    pub icon_ref: Option<String>,
    /// Icon scale factor.
    pub symbol_scale: Option<f64>,
    /// Whether the style is in use.
    pub enabled: bool,
}

impl Style {
    /// An enabled style with nothing set.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fill: None,
            point_color: None,
            outline: None,
            line: None,
            enable_outline: false,
            point_size: None,
            icon_ref: None,
            symbol_scale: None,
            enabled: true,
        }
    }

    /// Derive a style from a markup definition.
    ///
    /// - An explicit fill flag wins over the color: `fill=0` is transparent,
    ///   `fill=1` uses the color or white.
    /// - The fill color doubles as the point color.
    /// - Any poly style enables area outlines; its `outline` flag is not consulted.
    /// - Line and outline pens exist only when the line has a width; the color
    ///   defaults to black.
    pub fn from_def(id: impl Into<String>, def: &StyleDef) -> Self {
        let mut style = Self::new(id);
        if let Some(poly) = &def.poly {
            let fill = match poly.fill {
                Some(false) => Some(Color::TRANSPARENT),
                Some(true) => Some(poly.color.unwrap_or(Color::WHITE)),
                None => poly.color,
            };
            style.fill = fill;
            style.point_color = fill;
            style.enable_outline = true;
        }
        if let Some(line) = &def.line {
            if let Some(width) = line.width {
                let pen = Pen {
                    color: line.color.unwrap_or(Color::BLACK),
                    width,
                };
                style.outline = Some(pen);
                style.line = Some(pen);
            }
        }
        if let Some(icon) = &def.icon {
            style.icon_ref = icon.href.clone();
            style.symbol_scale = icon.scale;
        }
        style
    }
}

/// A style map: one id standing in for a normal and a highlight style.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyleAlias {
    /// Style map id.
    pub id: String,
    /// Target style id for the normal state.
    pub normal: Option<String>,
    /// Target style id for the highlighted state.
    pub highlight: Option<String>,
}

/// Default styles seeded into every style table.
///
/// Defaults are only returned for lookups that name their ids; a reference to a
/// missing style never falls back to them.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleConfig {
    /// Id of the default area style.
    pub area_style_id: String,
    /// Id of the default point style.
    pub point_style_id: String,
    /// The default area style.
    pub area_style: Style,
    /// The default point style.
    pub point_style: Style,
}

impl Default for StyleConfig {
    fn default() -> Self {
        let gray = Pen {
            color: Color::DARK_GRAY,
            width: 2.0,
        };
        let area_style = Style {
            fill: Some(Color::LIGHT_GRAY),
            outline: Some(gray),
            line: Some(gray),
            enable_outline: true,
            ..Style::new(DEFAULT_AREA_STYLE_ID)
        };
        let point_style = Style {
            point_color: Some(Color::DARK_GRAY),
            point_size: Some(2.0),
            icon_ref: Some(DEFAULT_POINT_ICON.to_owned()),
            symbol_scale: Some(1.0),
            ..Style::new(DEFAULT_POINT_STYLE_ID)
        };
        Self {
            area_style_id: DEFAULT_AREA_STYLE_ID.to_owned(),
            point_style_id: DEFAULT_POINT_STYLE_ID.to_owned(),
            area_style,
            point_style,
        }
    }
}

/// Theming lookups by style reference and style id.
pub trait StyleSource {
    /// The style a feature's raw style reference resolves to.
    fn resolve_style(&self, style_ref: &str) -> Option<&Style>;

    /// The icon reference recorded for a style id.
    fn resolve_icon(&self, style_id: &str) -> Option<&str>;
}

/// Strip the `#` prefix of a local style reference.
pub fn strip_ref(style_ref: &str) -> &str {
    let style_ref = style_ref.trim();
    style_ref.strip_prefix('#').unwrap_or(style_ref)
}

/// Build the style table: the configured defaults, then every style definition
/// with a non-empty id. The first definition of an id wins.
pub fn build_style_table(doc: &Document, config: &StyleConfig) -> HashMap<String, Style> {
    let mut styles = HashMap::new();
    for (id, style) in [
        (&config.area_style_id, &config.area_style),
        (&config.point_style_id, &config.point_style),
    ] {
        styles.entry(id.clone()).or_insert_with(|| Style {
            id: id.clone(),
            ..style.clone()
        });
    }
    for node in doc.flatten(NodeKinds::STYLE) {
        let markup = doc.node(node);
        let (Some(id), Some(def)) = (markup.id(), markup.as_style()) else {
            continue;
        };
        if styles.contains_key(id) {
            tracing::debug!(id, "ignoring duplicate style id");
            continue;
        }
        styles.insert(id.to_owned(), Style::from_def(id, def));
    }
    styles
}

/// Build the icon table: the first icon href recorded for each style id.
///
/// Every style definition contributes, including duplicates the style table
/// ignores, so a later duplicate can supply an icon the first definition lacks.
/// The configured default style ids are left out.
pub fn build_icon_table(doc: &Document, config: &StyleConfig) -> HashMap<String, String> {
    let mut icons = HashMap::new();
    for node in doc.flatten(NodeKinds::STYLE) {
        let markup = doc.node(node);
        let (Some(id), Some(def)) = (markup.id(), markup.as_style()) else {
            continue;
        };
        if id == config.area_style_id || id == config.point_style_id {
            continue;
        }
        let Some(href) = def.icon.as_ref().and_then(|i| i.href.as_deref()) else {
            continue;
        };
        icons.entry(id.to_owned()).or_insert_with(|| href.to_owned());
    }
    icons
}

/// Build the alias table from every style map with a non-empty id.
///
/// Pairs fold in source order, so a later pair for the same state replaces an
/// earlier one. The first map with a given id wins.
pub fn build_alias_table(doc: &Document) -> HashMap<String, StyleAlias> {
    let mut aliases = HashMap::new();
    for node in doc.flatten(NodeKinds::STYLE_MAP) {
        let markup = doc.node(node);
        let (Some(id), Some(map)) = (markup.id(), markup.as_style_map()) else {
            continue;
        };
        if aliases.contains_key(id) {
            continue;
        }
        let mut alias = StyleAlias {
            id: id.to_owned(),
            ..StyleAlias::default()
        };
        for pair in &map.pairs {
            let target = pair.style_url.as_deref().map(|u| strip_ref(u).to_owned());
            match pair.key {
                Some(StyleState::Normal) => alias.normal = target,
                Some(StyleState::Highlight) => alias.highlight = target,
                None => {}
            }
        }
        aliases.insert(id.to_owned(), alias);
    }
    aliases
}

/// Icon bytes loaded through an [`AssetResolver`], keyed by icon reference.
#[derive(Clone, Debug, Default)]
pub struct IconCache {
    by_ref: HashMap<String, Vec<u8>>,
}

impl IconCache {
    /// Bytes loaded for an icon reference.
    pub fn get(&self, icon_ref: &str) -> Option<&[u8]> {
        self.by_ref.get(icon_ref).map(Vec::as_slice)
    }

    /// Number of loaded icons.
    pub fn len(&self) -> usize {
        self.by_ref.len()
    }

    /// Whether no icon loaded.
    pub fn is_empty(&self) -> bool {
        self.by_ref.is_empty()
    }
}

/// Resolved styles, aliases, and icon references for one document.
#[derive(Clone, Debug)]
pub struct StyleResolver {
    styles: HashMap<String, Style>,
    aliases: HashMap<String, StyleAlias>,
    icons: HashMap<String, String>,
    area_style_id: String,
    point_style_id: String,
}

impl StyleResolver {
    /// Build the style and alias tables for `doc`.
    pub fn build(doc: &Document, config: &StyleConfig) -> Self {
        let styles = build_style_table(doc, config);
        let aliases = build_alias_table(doc);
        let icons = build_icon_table(doc, config);
        tracing::debug!(
            styles = styles.len(),
            aliases = aliases.len(),
            "built style tables"
        );
        Self {
            styles,
            aliases,
            icons,
            area_style_id: config.area_style_id.clone(),
            point_style_id: config.point_style_id.clone(),
        }
    }

    /// Resolve a raw style reference, following at most one alias.
    pub fn resolve(&self, style_ref: &str) -> Option<&Style> {
        let id = strip_ref(style_ref);
        if let Some(style) = self.styles.get(id) {
            return Some(style);
        }
        let target = self.aliases.get(id)?.normal.as_deref()?;
        self.styles.get(target)
    }

    /// Resolve the highlight variant of a reference: the alias' highlight target,
    /// or the direct style when the reference is not an alias.
    pub fn resolve_highlight(&self, style_ref: &str) -> Option<&Style> {
        let id = strip_ref(style_ref);
        if let Some(style) = self.styles.get(id) {
            return Some(style);
        }
        let target = self.aliases.get(id)?.highlight.as_deref()?;
        self.styles.get(target)
    }

    /// The icon reference of a style id, or of an alias' normal target.
    pub fn icon_ref(&self, style_id: &str) -> Option<&str> {
        let id = strip_ref(style_id);
        if let Some(href) = self.icons.get(id) {
            return Some(href);
        }
        let target = self.aliases.get(id)?.normal.as_deref()?;
        self.icons.get(target).map(String::as_str)
    }

    /// A style by exact id, without alias lookup.
    pub fn style(&self, id: &str) -> Option<&Style> {
        self.styles.get(id)
    }

    /// A style map by id.
    pub fn alias(&self, id: &str) -> Option<&StyleAlias> {
        self.aliases.get(id)
    }

    /// The configured default area style.
    pub fn default_area_style(&self) -> Option<&Style> {
        self.styles.get(&self.area_style_id)
    }

    /// The configured default point style.
    pub fn default_point_style(&self) -> Option<&Style> {
        self.styles.get(&self.point_style_id)
    }

    /// Number of styles, defaults included.
    pub fn style_count(&self) -> usize {
        self.styles.len()
    }

    /// Number of style maps.
    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    /// Load every distinct icon reference once through `resolver`.
    ///
    /// A reference that fails to resolve is logged and left out, so one bad icon
    /// never prevents the others from loading.
    pub fn load_icons(&self, resolver: &dyn AssetResolver) -> IconCache {
        let mut cache = IconCache::default();
        for (style_id, href) in &self.icons {
            if cache.by_ref.contains_key(href) {
                continue;
            }
            match resolver.resolve(href) {
                Ok(bytes) => {
                    cache.by_ref.insert(href.clone(), bytes);
                }
                Err(error) => {
                    tracing::warn!(style = %style_id, %href, %error, "icon failed to load");
                }
            }
        }
        cache
    }
}

impl StyleSource for StyleResolver {
    fn resolve_style(&self, style_ref: &str) -> Option<&Style> {
        self.resolve(style_ref)
    }

    fn resolve_icon(&self, style_id: &str) -> Option<&str> {
        self.icon_ref(style_id)
    }
}

#[cfg(test)]
mod tests {
    use placemark_tree::{
        IconStyleDef, LineStyleDef, MarkupNode, MemoryAssets, PolyStyleDef, StyleMapDef,
        StylePair,
    };

    use super::*;

    fn poly(color: Option<Color>, fill: Option<bool>) -> StyleDef {
        StyleDef {
            poly: Some(PolyStyleDef {
                color,
                fill,
                outline: None,
            }),
            ..StyleDef::default()
        }
    }

    fn icon(href: &str) -> StyleDef {
        StyleDef {
            icon: Some(IconStyleDef {
                scale: Some(1.5),
                href: Some(href.to_owned()),
            }),
            ..StyleDef::default()
        }
    }

    fn pair(key: StyleState, url: &str) -> StylePair {
        StylePair {
            key: Some(key),
            style_url: Some(url.to_owned()),
        }
    }

    fn doc_with(styles: Vec<(&str, StyleDef)>, maps: Vec<(&str, Vec<StylePair>)>) -> Document {
        let mut doc = Document::new();
        let root = doc.insert(None, MarkupNode::document());
        for (id, def) in styles {
            let _ = doc.insert(Some(root), MarkupNode::style(def).with_id(id));
        }
        for (id, pairs) in maps {
            let _ = doc.insert(
                Some(root),
                MarkupNode::style_map(StyleMapDef { pairs }).with_id(id),
            );
        }
        doc
    }

    #[test]
    fn fill_flag_wins_over_color() {
        let red = Color::rgb(255, 0, 0);
        assert_eq!(
            Style::from_def("s", &poly(Some(red), Some(false))).fill,
            Some(Color::TRANSPARENT)
        );
        assert_eq!(Style::from_def("s", &poly(Some(red), Some(true))).fill, Some(red));
        assert_eq!(Style::from_def("s", &poly(None, Some(true))).fill, Some(Color::WHITE));
        assert_eq!(Style::from_def("s", &poly(Some(red), None)).fill, Some(red));
        assert_eq!(Style::from_def("s", &poly(None, None)).fill, None);

        let style = Style::from_def("s", &poly(Some(red), None));
        assert_eq!(style.point_color, Some(red));
        assert!(style.enable_outline);
    }

    #[test]
    fn any_poly_style_enables_outlines() {
        let hollow = StyleDef {
            poly: Some(PolyStyleDef {
                outline: Some(false),
                ..PolyStyleDef::default()
            }),
            ..StyleDef::default()
        };
        assert!(Style::from_def("s", &hollow).enable_outline);
        assert!(!Style::from_def("s", &StyleDef::default()).enable_outline);
    }

    #[test]
    fn line_pen_needs_a_width() {
        let with_width = StyleDef {
            line: Some(LineStyleDef {
                color: None,
                width: Some(3.0),
            }),
            ..StyleDef::default()
        };
        let style = Style::from_def("s", &with_width);
        let pen = Pen {
            color: Color::BLACK,
            width: 3.0,
        };
        assert_eq!(style.line, Some(pen));
        assert_eq!(style.outline, Some(pen));

        let without_width = StyleDef {
            line: Some(LineStyleDef {
                color: Some(Color::WHITE),
                width: None,
            }),
            ..StyleDef::default()
        };
        assert_eq!(Style::from_def("s", &without_width).line, None);
    }

    #[test]
    fn defaults_are_seeded_and_first_definition_wins() {
        let red = Color::rgb(255, 0, 0);
        let blue = Color::rgb(0, 0, 255);
        let doc = doc_with(
            vec![("s", poly(Some(red), None)), ("s", poly(Some(blue), None))],
            vec![],
        );
        let styles = StyleResolver::build(&doc, &StyleConfig::default());
        assert_eq!(styles.style_count(), 3);
        assert_eq!(styles.resolve("#s").unwrap().fill, Some(red));

        let area = styles.default_area_style().unwrap();
        assert_eq!(area.fill, Some(Color::LIGHT_GRAY));
        assert!(area.enable_outline);
        let point = styles.resolve(DEFAULT_POINT_STYLE_ID).unwrap();
        assert_eq!(point.icon_ref.as_deref(), Some(DEFAULT_POINT_ICON));
        assert_eq!(point.point_size, Some(2.0));
    }

    #[test]
    fn missing_references_never_fall_back_to_defaults() {
        let styles = StyleResolver::build(&doc_with(vec![], vec![]), &StyleConfig::default());
        assert!(styles.resolve("#missing").is_none());
    }

    #[test]
    fn alias_resolves_one_level() {
        let doc = doc_with(
            vec![("normal", poly(Some(Color::BLACK), None)), ("hot", poly(None, Some(true)))],
            vec![
                (
                    "map",
                    vec![pair(StyleState::Normal, "#normal"), pair(StyleState::Highlight, "#hot")],
                ),
                ("chained", vec![pair(StyleState::Normal, "#map")]),
            ],
        );
        let styles = StyleResolver::build(&doc, &StyleConfig::default());
        assert_eq!(styles.resolve("#map"), styles.resolve("normal"));
        assert!(styles.resolve("#map").is_some());
        assert_eq!(styles.resolve_highlight("map").unwrap().id, "hot");
        assert!(styles.resolve("chained").is_none(), "aliases never chain");

        let alias = styles.alias("map").unwrap();
        assert_eq!(alias.normal.as_deref(), Some("normal"));
        assert_eq!(alias.highlight.as_deref(), Some("hot"));
    }

    #[test]
    fn direct_ids_shadow_aliases() {
        let doc = doc_with(
            vec![("same", poly(Some(Color::WHITE), None)), ("other", poly(None, None))],
            vec![("same", vec![pair(StyleState::Normal, "#other")])],
        );
        let styles = StyleResolver::build(&doc, &StyleConfig::default());
        assert_eq!(styles.resolve("same").unwrap().id, "same");
    }

    #[test]
    fn icons_resolve_directly_and_through_aliases() {
        let doc = doc_with(
            vec![("pin", icon("files/pin.png"))],
            vec![("pinMap", vec![pair(StyleState::Normal, "#pin")])],
        );
        let styles = StyleResolver::build(&doc, &StyleConfig::default());
        assert_eq!(styles.icon_ref("pin"), Some("files/pin.png"));
        assert_eq!(styles.resolve_icon("#pinMap"), Some("files/pin.png"));
        assert_eq!(styles.icon_ref(DEFAULT_POINT_STYLE_ID), None);
        assert_eq!(styles.resolve("pin").unwrap().symbol_scale, Some(1.5));
    }

    #[test]
    fn duplicate_style_can_supply_the_icon() {
        let doc = doc_with(
            vec![
                ("pin", poly(Some(Color::BLACK), None)),
                ("pin", icon("files/late.png")),
                ("pin", icon("files/later.png")),
            ],
            vec![],
        );
        let styles = StyleResolver::build(&doc, &StyleConfig::default());
        assert_eq!(styles.icon_ref("pin"), Some("files/late.png"));
        assert_eq!(
            styles.resolve("pin").unwrap().fill,
            Some(Color::BLACK),
            "the first definition still owns the style"
        );
    }

    #[test]
    fn icon_failures_are_isolated() {
        let doc = doc_with(
            vec![
                ("a", icon("files/a.png")),
                ("a2", icon("files/a.png")),
                ("b", icon("files/missing.png")),
            ],
            vec![],
        );
        let styles = StyleResolver::build(&doc, &StyleConfig::default());
        let mut assets = MemoryAssets::new();
        assets.insert("files/a.png", b"a".to_vec());
        let cache = styles.load_icons(&assets);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("files/a.png"), Some(&b"a"[..]));
        assert!(cache.get("files/missing.png").is_none());
    }

    #[test]
    fn custom_defaults_coexist() {
        let config = StyleConfig {
            area_style_id: "area".to_owned(),
            ..StyleConfig::default()
        };
        let styles = StyleResolver::build(&doc_with(vec![], vec![]), &config);
        assert_eq!(styles.resolve("area").unwrap().id, "area");
        assert!(styles.resolve(DEFAULT_AREA_STYLE_ID).is_none());
    }
}
