// Copyright 2025 the Placemark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Index basics.
//!
//! Parse a small KML document, list its features, and run view and shape queries.
//!
//! Run:
//! - `cargo run -p placemark_demos --example index_basics`

use geo::{Geometry, LineString, Polygon};
use placemark_index::{Envelope, ExtractOptions, FeatureIndex};
use tracing_subscriber::EnvFilter;

const KML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <name>Harbour</name>
    <description>survey 2024</description>
    <Folder id="piers">
      <Placemark>
        <name>North pier</name>
        <LineString><coordinates>0,0 0,4</coordinates></LineString>
      </Placemark>
      <Placemark>
        <name>Crane</name>
        <Point><coordinates>1,1</coordinates></Point>
      </Placemark>
    </Folder>
    <Placemark>
      <name>Basin</name>
      <MultiGeometry>
        <Polygon>
          <outerBoundaryIs><LinearRing>
            <coordinates>2,0 6,0 6,4 2,4 2,0</coordinates>
          </LinearRing></outerBoundaryIs>
        </Polygon>
        <Point><coordinates>4,2</coordinates></Point>
      </MultiGeometry>
    </Placemark>
  </Document>
</kml>"#;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let index = match FeatureIndex::from_kml_str(KML, &ExtractOptions::default()) {
        Ok(index) => index,
        Err(err) => {
            tracing::error!(%err, "failed to index document");
            return;
        }
    };

    println!("Document: {:?}", index.name());
    println!(
        "{} features, {} geometries, extent {:?}",
        index.feature_count(),
        index.geometry_count(),
        index.extent()
    );
    for feature in index.features() {
        println!(
            "  id={} kind={:?} parts={}",
            feature.id(),
            index.geometry_kind(feature.id()),
            feature.geometries().len()
        );
    }

    // Everything west of x=1.5.
    let view = Envelope::new(-1.0, -1.0, 1.5, 5.0);
    println!("In view {:?}: {:?}", view, index.ids_in_view(&view));

    // A triangle touching the basin and the pier, but not the crane.
    let probe: Geometry<f64> = Polygon::new(
        LineString::from(vec![(-1.0, 3.0), (3.0, 3.0), (3.0, 5.0), (-1.0, 3.0)]),
        vec![],
    )
    .into();
    for row in index.intersect(&probe) {
        println!("  hit id={} geometry={:?}", row.id, row.geometry);
    }
}
