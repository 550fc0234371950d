// Copyright 2025 the Placemark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised while reading documents and archives.

use quick_xml::events::attributes::AttrError;
use thiserror::Error;

/// Errors that can occur while loading a KML document or KMZ archive.
#[derive(Debug, Error)]
pub enum Error {
    /// The XML itself is malformed.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// An element carries a malformed attribute.
    #[error("invalid attribute: {0}")]
    Attr(#[from] AttrError),

    /// A `coordinates` element contains a tuple that is not `lon,lat[,alt]`.
    #[error("invalid coordinate tuple `{0}`")]
    Coordinates(String),

    /// The archive container is unreadable.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Reading from the underlying source failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The archive has no entry with a `.kml` extension.
    #[error("archive contains no .kml entry")]
    NoKml,

    /// A named archive entry does not exist.
    #[error("archive entry `{0}` not found")]
    MissingEntry(String),
}

/// Result type for document loading.
pub type Result<T, E = Error> = core::result::Result<T, E>;
