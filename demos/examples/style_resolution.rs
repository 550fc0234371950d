// Copyright 2025 the Placemark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style resolution.
//!
//! Resolve direct style references, style maps, and the default styles.
//!
//! Run:
//! - `cargo run -p placemark_demos --example style_resolution`

use placemark_index::{ExtractOptions, FeatureIndex, StyleSource};
use tracing_subscriber::EnvFilter;

const KML: &str = r##"<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <Style id="water">
      <PolyStyle><color>7fff0000</color><outline>0</outline></PolyStyle>
    </Style>
    <Style id="water-hot">
      <PolyStyle><color>ffff0000</color></PolyStyle>
      <LineStyle><color>ff00ffff</color><width>3</width></LineStyle>
    </Style>
    <StyleMap id="water-map">
      <Pair><key>normal</key><styleUrl>#water</styleUrl></Pair>
      <Pair><key>highlight</key><styleUrl>#water-hot</styleUrl></Pair>
    </StyleMap>
    <Placemark>
      <styleUrl>#water-map</styleUrl>
      <Polygon><outerBoundaryIs><LinearRing>
        <coordinates>0,0 1,0 1,1 0,0</coordinates>
      </LinearRing></outerBoundaryIs></Polygon>
    </Placemark>
    <Placemark>
      <styleUrl>#missing</styleUrl>
      <Point><coordinates>3,3</coordinates></Point>
    </Placemark>
  </Document>
</kml>"##;

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

    for feature in index.features() {
        let Some(row) = index.by_id(feature.id()) else {
            continue;
        };
        match index.style_for(&row) {
            Some(style) => println!(
                "feature {} -> style {} fill={:?} outline={}",
                row.id, style.id, style.fill, style.enable_outline
            ),
            None => println!("feature {} -> no style for {:?}", row.id, row.style_ref),
        }
    }

    let styles = index.styles();
    if let Some(hot) = styles.resolve_highlight("#water-map") {
        println!("highlight: {} line={:?}", hot.id, hot.line);
    }
    if let Some(area) = styles.default_area_style() {
        println!("default area style: {} fill={:?}", area.id, area.fill);
    }
    if let Some(point) = styles.default_point_style() {
        println!("default point icon: {:?}", point.icon_ref);
    }
    println!(
        "{} styles, {} aliases; resolve_style(\"water\") = {:?}",
        styles.style_count(),
        styles.alias_count(),
        index.resolve_style("water").map(|s| &s.id)
    );
}
