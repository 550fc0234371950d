// Copyright 2025 the Placemark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! KMZ archives: a zip container holding a KML document and its assets.

use std::io::{Cursor, Read, Seek};

use crate::assets::{AssetError, AssetResolver};
use crate::error::{Error, Result};
use crate::kml;
use crate::tree::Document;

/// An in-memory KMZ archive.
///
/// All entries are decompressed on open, so later lookups never touch the source.
/// The archive doubles as an [`AssetResolver`] for icon references relative to the
/// archive root.
#[derive(Clone, Default)]
pub struct KmzArchive {
    entries: Vec<(String, Vec<u8>)>,
}

impl core::fmt::Debug for KmzArchive {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KmzArchive")
            .field("entries", &self.entries.len())
            .field("kml", &self.default_kml_name())
            .finish_non_exhaustive()
    }
}

impl KmzArchive {
    /// Read every file entry from a zip source.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut zip = zip::ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(zip.len());
        for i in 0..zip.len() {
            let mut file = zip.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)?;
            entries.push((file.name().to_owned(), bytes));
        }
        tracing::debug!(entries = entries.len(), "opened KMZ archive");
        Ok(Self { entries })
    }

    /// Read an archive held in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Entry names in archive order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// The document entry: the first entry with a `.kml` extension.
    pub fn default_kml_name(&self) -> Option<&str> {
        self.names()
            .find(|name| name.to_ascii_lowercase().ends_with(".kml"))
    }

    /// Raw bytes of a named entry.
    pub fn read_file(&self, name: &str) -> Option<&[u8]> {
        let name = normalize(name);
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, bytes)| bytes.as_slice())
    }

    /// Parse the [default document entry](Self::default_kml_name).
    pub fn document(&self) -> Result<Document> {
        let name = self.default_kml_name().ok_or(Error::NoKml)?;
        self.document_for(name)
    }

    /// Parse a specific entry as KML.
    pub fn document_for(&self, name: &str) -> Result<Document> {
        let bytes = self
            .read_file(name)
            .ok_or_else(|| Error::MissingEntry(name.to_owned()))?;
        kml::read(bytes)
    }
}

fn normalize(reference: &str) -> &str {
    let reference = reference.strip_prefix("./").unwrap_or(reference);
    reference.trim_start_matches('/')
}

impl AssetResolver for KmzArchive {
    fn resolve(&self, reference: &str) -> Result<Vec<u8>, AssetError> {
        self.read_file(reference)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| AssetError::NotFound(reference.to_owned()))
    }
}
