// Copyright 2025 the Placemark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! KMZ icons.
//!
//! Pack a document and an icon into an in-memory KMZ, index it, and load icons
//! through the archive.
//!
//! Run:
//! - `cargo run -p placemark_demos --example kmz_icons`

use std::io::{Cursor, Write};

use placemark_index::{ExtractOptions, FeatureIndex};
use placemark_tree::KmzArchive;
use tracing_subscriber::EnvFilter;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const KML: &str = r##"<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <Style id="flag">
      <IconStyle><scale>1.5</scale><Icon><href>files/flag.png</href></Icon></IconStyle>
    </Style>
    <Style id="broken">
      <IconStyle><Icon><href>files/missing.png</href></Icon></IconStyle>
    </Style>
    <Placemark>
      <styleUrl>#flag</styleUrl>
      <Point><coordinates>10,50</coordinates></Point>
    </Placemark>
  </Document>
</kml>"##;

fn pack() -> zip::result::ZipResult<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    writer.start_file("doc.kml", options)?;
    writer.write_all(KML.as_bytes())?;
    writer.start_file("files/flag.png", options)?;
    writer.write_all(b"\x89PNG fake")?;
    Ok(writer.finish()?.into_inner())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let bytes = match pack() {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!(%err, "failed to build archive");
            return;
        }
    };
    let archive = match KmzArchive::from_bytes(&bytes) {
        Ok(archive) => archive,
        Err(err) => {
            tracing::error!(%err, "failed to open archive");
            return;
        }
    };
    println!("entries: {:?}", archive.names().collect::<Vec<_>>());

    let index = match FeatureIndex::from_kmz(&archive, &ExtractOptions::default()) {
        Ok(index) => index,
        Err(err) => {
            tracing::error!(%err, "failed to index archive");
            return;
        }
    };

    let icons = index.load_icons(&archive);
    println!("loaded {} icon(s)", icons.len());
    if let Some(png) = icons.get("files/flag.png") {
        println!("files/flag.png: {} bytes", png.len());
    }
    for style_id in ["flag", "broken", "nope"] {
        match index.icon(style_id, &archive) {
            Ok(Some(bytes)) => println!("{style_id}: {} bytes", bytes.len()),
            Ok(None) => println!("{style_id}: no icon"),
            Err(err) => println!("{style_id}: {err}"),
        }
    }
}
