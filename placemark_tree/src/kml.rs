// Copyright 2025 the Placemark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Namespace-tolerant KML reader.
//!
//! Elements are matched by local name, so documents using a prefixed or legacy
//! namespace (`kml:Placemark`, the 2.1 namespace, or none at all) load the same way.
//! Only the elements the feature model needs become nodes; everything else is skipped
//! without error.
//!
//! Nodes are appended in document order, so [`NodeId`] order equals document order
//! for documents produced here.
//!
//! ```
//! use placemark_tree::{kml, NodeKinds};
//!
//! let doc = kml::read_str(r##"
//!     <kml xmlns="http://www.opengis.net/kml/2.2">
//!       <Document>
//!         <Placemark id="pm"><styleUrl>#red</styleUrl>
//!           <Point><coordinates>10,20</coordinates></Point>
//!         </Placemark>
//!       </Document>
//!     </kml>"##).unwrap();
//!
//! let pm = doc.flatten(NodeKinds::FEATURE).next().unwrap();
//! assert_eq!(doc.node(pm).id(), Some("pm"));
//! assert_eq!(doc.flatten(NodeKinds::POINT).count(), 1);
//! ```

use std::io::BufRead;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};
use crate::tree::Document;
use crate::types::{
    Color, Container, Coordinate, IconStyleDef, LineStyleDef, MarkupGeometry, MarkupNode,
    NodeId, NodeKind, Placemark, PolyStyleDef, StyleDef, StyleMapDef, StylePair, StyleState,
};

/// Read a KML document from a string.
pub fn read_str(xml: &str) -> Result<Document> {
    read(xml.as_bytes())
}

/// Read a KML document from a buffered source.
pub fn read<R: BufRead>(source: R) -> Result<Document> {
    let mut reader = Reader::from_reader(source);
    let mut buf = Vec::new();
    let mut builder = Builder::default();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => builder.start(&e)?,
            Event::Empty(e) => {
                builder.start(&e)?;
                builder.end();
            }
            Event::End(_) => builder.end(),
            Event::Text(t) => match t.unescape() {
                Ok(text) => builder.text.push_str(&text),
                // Unknown entities (common in HTML descriptions) are kept verbatim.
                Err(_) => builder.text.push_str(&String::from_utf8_lossy(&t)),
            },
            Event::CData(c) => builder.text.push_str(&String::from_utf8_lossy(&c)),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    let doc = builder.doc;
    tracing::debug!(nodes = doc.len(), "read KML document");
    Ok(doc)
}

/// Parse the text of a `coordinates` element: whitespace-separated `lon,lat[,alt]` tuples.
pub fn parse_coordinates(text: &str) -> Result<Vec<Coordinate>> {
    text.split_whitespace().map(parse_tuple).collect()
}

fn parse_tuple(tuple: &str) -> Result<Coordinate> {
    let invalid = || Error::Coordinates(tuple.to_owned());
    let mut parts = tuple
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::parse::<f64>);
    let longitude = parts.next().and_then(|p| p.ok()).ok_or_else(invalid)?;
    let latitude = parts.next().and_then(|p| p.ok()).ok_or_else(invalid)?;
    let altitude = match parts.next() {
        Some(Ok(alt)) => Some(alt),
        Some(Err(_)) => return Err(invalid()),
        None => None,
    };
    Ok(Coordinate {
        longitude,
        latitude,
        altitude,
    })
}

fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_owned())
}

#[derive(Debug)]
struct Frame {
    name: String,
    node: Option<NodeId>,
}

#[derive(Copy, Clone, Debug)]
enum StylePart {
    Poly,
    Line,
    Icon,
}

#[derive(Debug, Default)]
struct Builder {
    doc: Document,
    frames: Vec<Frame>,
    text: String,
}

impl Builder {
    /// Frame `n` levels above the innermost open element (`0` is the innermost).
    fn frame(&self, n: usize) -> Option<&Frame> {
        let i = self.frames.len().checked_sub(n + 1)?;
        self.frames.get(i)
    }

    fn name_at(&self, n: usize) -> Option<&str> {
        self.frame(n).map(|f| f.name.as_str())
    }

    fn node_at(&self, n: usize) -> Option<NodeId> {
        self.frame(n).and_then(|f| f.node)
    }

    /// Nearest open element that produced a node.
    fn owner(&self) -> Option<NodeId> {
        self.frames.iter().rev().find_map(|f| f.node)
    }

    fn in_boundary(&self) -> bool {
        matches!(self.name_at(0), Some("outerBoundaryIs" | "innerBoundaryIs"))
    }

    fn start(&mut self, e: &BytesStart<'_>) -> Result<()> {
        self.text.clear();
        let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
        let geometry = |g| Some(NodeKind::Geometry(g));
        let kind = match name.as_str() {
            "kml" if self.doc.is_empty() => Some(NodeKind::Other(name.clone())),
            "Document" => Some(NodeKind::Document(Container::default())),
            "Folder" => Some(NodeKind::Folder(Container::default())),
            "Placemark" => Some(NodeKind::Feature(Placemark::default())),
            "Point" => geometry(MarkupGeometry::Point { coord: None }),
            "LineString" => geometry(MarkupGeometry::LineString { coords: Vec::new() }),
            "LinearRing" if !self.in_boundary() => {
                geometry(MarkupGeometry::LinearRing { coords: Vec::new() })
            }
            "Polygon" => geometry(MarkupGeometry::Polygon {
                outer: None,
                inner: Vec::new(),
            }),
            "MultiGeometry" => geometry(MarkupGeometry::MultiGeometry),
            "Style" => Some(NodeKind::Style(StyleDef::default())),
            "StyleMap" => Some(NodeKind::StyleMap(StyleMapDef::default())),
            _ => None,
        };
        let node = match kind {
            Some(kind) => {
                let id = match e.try_get_attribute("id")? {
                    Some(attr) => Some(attr.unescape_value()?.into_owned()),
                    None => None,
                };
                Some(self.doc.insert(self.owner(), MarkupNode { id, kind }))
            }
            None => {
                self.open_part(&name);
                None
            }
        };
        self.frames.push(Frame { name, node });
        Ok(())
    }

    /// Create the sub-records that later leaf elements fill in.
    fn open_part(&mut self, name: &str) {
        let Some(parent) = self.node_at(0) else {
            return;
        };
        match (name, &mut self.doc.node_mut(parent).kind) {
            ("Pair", NodeKind::StyleMap(map)) => map.pairs.push(StylePair::default()),
            ("PolyStyle", NodeKind::Style(style)) => {
                style.poly.get_or_insert_with(PolyStyleDef::default);
            }
            ("LineStyle", NodeKind::Style(style)) => {
                style.line.get_or_insert_with(LineStyleDef::default);
            }
            ("IconStyle", NodeKind::Style(style)) => {
                style.icon.get_or_insert_with(IconStyleDef::default);
            }
            _ => {}
        }
    }

    fn end(&mut self) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        let text = core::mem::take(&mut self.text);
        if frame.node.is_none() {
            self.close_leaf(&frame.name, text.trim());
        }
    }

    fn close_leaf(&mut self, name: &str, text: &str) {
        match name {
            "name" | "description" => self.close_feature_field(name, text),
            "styleUrl" | "key" if self.name_at(0) == Some("Pair") => {
                self.close_pair_field(name, text);
            }
            "styleUrl" => self.close_feature_field(name, text),
            "coordinates" => self.close_coordinates(text),
            "color" | "fill" | "outline" | "width" | "scale" => {
                self.close_style_field(name, text);
            }
            "href" => self.close_href(text),
            _ => {}
        }
    }

    fn close_feature_field(&mut self, name: &str, text: &str) {
        let Some(parent) = self.node_at(0) else {
            return;
        };
        let value = non_empty(text);
        match (name, &mut self.doc.node_mut(parent).kind) {
            ("name", NodeKind::Document(c) | NodeKind::Folder(c)) => c.name = value,
            ("description", NodeKind::Document(c) | NodeKind::Folder(c)) => {
                c.description = value;
            }
            ("name", NodeKind::Feature(p)) => p.name = value,
            ("description", NodeKind::Feature(p)) => p.description = value,
            ("styleUrl", NodeKind::Feature(p)) => p.style_url = value,
            _ => {}
        }
    }

    fn close_pair_field(&mut self, name: &str, text: &str) {
        let Some(map) = self.node_at(1) else {
            return;
        };
        let NodeKind::StyleMap(map) = &mut self.doc.node_mut(map).kind else {
            return;
        };
        let Some(pair) = map.pairs.last_mut() else {
            return;
        };
        match name {
            "key" => pair.key = StyleState::from_key(text),
            _ => pair.style_url = non_empty(text),
        }
    }

    /// A malformed tuple leaves the whole geometry without coordinates.
    fn close_coordinates(&mut self, text: &str) {
        let points = parse_coordinates(text).unwrap_or_else(|err| {
            tracing::warn!(%err, element = ?self.name_at(0), "dropping malformed coordinates");
            Vec::new()
        });
        if let Some(id) = self.node_at(0) {
            if let NodeKind::Geometry(geometry) = &mut self.doc.node_mut(id).kind {
                match geometry {
                    MarkupGeometry::Point { coord } => *coord = points.first().copied(),
                    MarkupGeometry::LineString { coords }
                    | MarkupGeometry::LinearRing { coords } => *coords = points,
                    MarkupGeometry::Polygon { .. } | MarkupGeometry::MultiGeometry => {}
                }
            }
            return;
        }
        // Boundary rings: Polygon > outerBoundaryIs|innerBoundaryIs > LinearRing > coordinates.
        if self.name_at(0) != Some("LinearRing") {
            return;
        }
        let is_outer = match self.name_at(1) {
            Some("outerBoundaryIs") => true,
            Some("innerBoundaryIs") => false,
            _ => return,
        };
        let Some(polygon) = self.node_at(2) else {
            return;
        };
        if let NodeKind::Geometry(MarkupGeometry::Polygon { outer, inner }) =
            &mut self.doc.node_mut(polygon).kind
        {
            if is_outer {
                *outer = Some(points);
            } else {
                inner.push(points);
            }
        }
    }

    fn close_style_field(&mut self, name: &str, text: &str) {
        let part = match self.name_at(0) {
            Some("PolyStyle") => StylePart::Poly,
            Some("LineStyle") => StylePart::Line,
            Some("IconStyle") => StylePart::Icon,
            _ => return,
        };
        let Some(style) = self.node_at(1) else {
            return;
        };
        let NodeKind::Style(style) = &mut self.doc.node_mut(style).kind else {
            return;
        };
        match (part, name) {
            (StylePart::Poly, _) => {
                let Some(poly) = style.poly.as_mut() else {
                    return;
                };
                match name {
                    "color" => poly.color = Color::from_kml_hex(text),
                    "fill" => poly.fill = parse_bool(text),
                    "outline" => poly.outline = parse_bool(text),
                    _ => {}
                }
            }
            (StylePart::Line, "color") => {
                if let Some(line) = style.line.as_mut() {
                    line.color = Color::from_kml_hex(text);
                }
            }
            (StylePart::Line, "width") => {
                if let Some(line) = style.line.as_mut() {
                    line.width = text.parse().ok();
                }
            }
            (StylePart::Icon, "scale") => {
                if let Some(icon) = style.icon.as_mut() {
                    icon.scale = text.parse().ok();
                }
            }
            _ => {}
        }
    }

    fn close_href(&mut self, text: &str) {
        if self.name_at(0) != Some("Icon") || self.name_at(1) != Some("IconStyle") {
            return;
        }
        let Some(style) = self.node_at(2) else {
            return;
        };
        if let NodeKind::Style(StyleDef {
            icon: Some(icon), ..
        }) = &mut self.doc.node_mut(style).kind
        {
            icon.href = non_empty(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeKinds;

    const SAMPLE: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document id="doc">
    <name>Trails</name>
    <description><![CDATA[Weekend <b>hikes</b>]]></description>
    <Style id="poly">
      <LineStyle><color>ff0000ff</color><width>3</width></LineStyle>
      <PolyStyle><color>7f00ff00</color><fill>0</fill></PolyStyle>
    </Style>
    <Style id="pin">
      <IconStyle><scale>1.1</scale><Icon><href>files/pin.png</href></Icon></IconStyle>
    </Style>
    <StyleMap id="pinMap">
      <Pair><key>normal</key><styleUrl>#pin</styleUrl></Pair>
      <Pair><key>highlight</key><styleUrl>#poly</styleUrl></Pair>
    </StyleMap>
    <Folder id="f1">
      <name>Lakes</name>
      <Placemark id="lake">
        <name>Lake</name>
        <styleUrl>#poly</styleUrl>
        <Polygon>
          <outerBoundaryIs><LinearRing>
            <coordinates>0,0,0 4,0,0 4,4,0 0,4,0 0,0,0</coordinates>
          </LinearRing></outerBoundaryIs>
          <innerBoundaryIs><LinearRing>
            <coordinates>1,1 2,1 2,2 1,1</coordinates>
          </LinearRing></innerBoundaryIs>
        </Polygon>
      </Placemark>
    </Folder>
    <Placemark>
      <styleUrl>#pinMap</styleUrl>
      <MultiGeometry>
        <Point><coordinates>10,20</coordinates></Point>
        <LineString><coordinates>0,0 1,1</coordinates></LineString>
      </MultiGeometry>
    </Placemark>
  </Document>
</kml>"##;

    #[test]
    fn reads_structure_in_document_order() {
        let doc = read_str(SAMPLE).unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.node(root).kind, NodeKind::Other("kml".into()));

        let document = doc.container().unwrap();
        let info = doc.container_info().unwrap();
        assert_eq!(info.name.as_deref(), Some("Trails"));
        assert_eq!(info.description.as_deref(), Some("Weekend <b>hikes</b>"));
        assert_eq!(doc.node(document).id(), Some("doc"));

        let features: Vec<_> = doc.flatten(NodeKinds::FEATURE).collect();
        assert_eq!(features.len(), 2);
        assert!(features[0] < features[1], "ids follow document order");
        let lake = doc.node(features[0]).as_feature().unwrap();
        assert_eq!(lake.name.as_deref(), Some("Lake"));
        assert_eq!(lake.style_url.as_deref(), Some("#poly"));
        let folder = doc.parent(features[0]).unwrap();
        assert_eq!(doc.kind(folder), NodeKinds::FOLDER);
    }

    #[test]
    fn polygon_rings_are_inline() {
        let doc = read_str(SAMPLE).unwrap();
        assert_eq!(doc.flatten(NodeKinds::LINEAR_RING).count(), 0);
        let polygon = doc.flatten(NodeKinds::POLYGON).next().unwrap();
        let Some(MarkupGeometry::Polygon { outer, inner }) = doc.node(polygon).as_geometry()
        else {
            panic!("expected a polygon");
        };
        let outer = outer.as_ref().unwrap();
        assert_eq!(outer.len(), 5);
        assert_eq!(outer[1], Coordinate::with_altitude(4.0, 0.0, 0.0));
        assert_eq!(inner.len(), 1);
        assert_eq!(inner[0][0], Coordinate::new(1.0, 1.0));
    }

    #[test]
    fn multi_geometry_parts_are_children() {
        let doc = read_str(SAMPLE).unwrap();
        let multi = doc.flatten(NodeKinds::MULTI_GEOMETRY).next().unwrap();
        let kinds: Vec<_> = doc.children(multi).iter().map(|c| doc.kind(*c)).collect();
        assert_eq!(kinds, vec![NodeKinds::POINT, NodeKinds::LINE_STRING]);
        let point = doc.children(multi)[0];
        assert_eq!(
            doc.node(point).as_geometry(),
            Some(&MarkupGeometry::Point {
                coord: Some(Coordinate::new(10.0, 20.0))
            })
        );
    }

    #[test]
    fn styles_and_style_maps() {
        let doc = read_str(SAMPLE).unwrap();
        let styles: Vec<_> = doc.flatten(NodeKinds::STYLE).collect();
        let poly = doc.node(styles[0]).as_style().unwrap();
        let line = poly.line.as_ref().unwrap();
        assert_eq!(line.color, Some(Color::rgb(255, 0, 0)));
        assert_eq!(line.width, Some(3.0));
        let fill = poly.poly.as_ref().unwrap();
        assert_eq!(fill.fill, Some(false));
        assert_eq!(fill.color, Some(Color::rgba(0, 255, 0, 0x7f)));

        let pin = doc.node(styles[1]).as_style().unwrap();
        let icon = pin.icon.as_ref().unwrap();
        assert_eq!(icon.href.as_deref(), Some("files/pin.png"));
        assert_eq!(icon.scale, Some(1.1));

        let map_id = doc.flatten(NodeKinds::STYLE_MAP).next().unwrap();
        let map = doc.node(map_id).as_style_map().unwrap();
        assert_eq!(map.pairs.len(), 2);
        assert_eq!(map.pairs[0].key, Some(StyleState::Normal));
        assert_eq!(map.pairs[0].style_url.as_deref(), Some("#pin"));
        assert_eq!(map.pairs[1].key, Some(StyleState::Highlight));
    }

    #[test]
    fn namespace_prefixes_are_ignored() {
        let xml = r#"<kml:kml xmlns:kml="http://earth.google.com/kml/2.1">
            <kml:Document><kml:Placemark><kml:Point>
              <kml:coordinates>1,2</kml:coordinates>
            </kml:Point></kml:Placemark></kml:Document></kml:kml>"#;
        let doc = read_str(xml).unwrap();
        assert_eq!(doc.flatten(NodeKinds::POINT).count(), 1);
        assert!(doc.container().is_some());
    }

    #[test]
    fn unknown_elements_are_skipped() {
        let xml = r#"<kml><Document>
            <ExtendedData><Data name="x"><value>1</value></Data></ExtendedData>
            <Placemark><name>p</name><TimeStamp><when>2020</when></TimeStamp>
              <Point><coordinates>1,2</coordinates></Point></Placemark>
            </Document></kml>"#;
        let doc = read_str(xml).unwrap();
        assert_eq!(doc.len(), 4, "kml, Document, Placemark, Point");
    }

    #[test]
    fn bad_coordinates_are_dropped_per_geometry() {
        let xml = "<kml><Document>\
            <Placemark><Point><coordinates>1;2</coordinates></Point></Placemark>\
            <Placemark><LineString><coordinates>0,0 abc,2</coordinates></LineString></Placemark>\
            <Placemark><Point><coordinates>3,4</coordinates></Point></Placemark>\
            </Document></kml>";
        let doc = read_str(xml).unwrap();
        let geometries: Vec<_> = doc
            .flatten(NodeKinds::GEOMETRY)
            .map(|g| doc.node(g).as_geometry().cloned())
            .collect();
        assert_eq!(
            geometries,
            vec![
                Some(MarkupGeometry::Point { coord: None }),
                Some(MarkupGeometry::LineString { coords: Vec::new() }),
                Some(MarkupGeometry::Point {
                    coord: Some(Coordinate::new(3.0, 4.0))
                }),
            ],
            "only the malformed geometries lose their coordinates"
        );

        assert!(matches!(parse_coordinates("1;2"), Err(Error::Coordinates(_))));
        assert!(parse_coordinates("").unwrap().is_empty());
        assert_eq!(
            parse_coordinates(" 1,2,3\n 4,5 ").unwrap(),
            vec![Coordinate::with_altitude(1.0, 2.0, 3.0), Coordinate::new(4.0, 5.0)]
        );
    }

    #[test]
    fn mismatched_tags_are_errors() {
        assert!(matches!(
            read_str("<kml><Document></Folder></kml>"),
            Err(Error::Xml(_))
        ));
    }
}
