// Copyright 2025 the Placemark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Asset resolution: turning icon references into raw bytes.
//!
//! Consumers never interpret the bytes; decoding images is left to the renderer.

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Errors returned by an [`AssetResolver`].
#[derive(Debug, Error)]
pub enum AssetError {
    /// No asset exists under the reference.
    #[error("asset not found: {0}")]
    NotFound(String),

    /// The asset exists but could not be read.
    #[error("failed to read asset `{reference}`: {source}")]
    Read {
        /// The reference that was being resolved.
        reference: String,
        /// The underlying failure.
        #[source]
        source: std::io::Error,
    },
}

/// Resolve a string reference (an icon `href`) into raw bytes.
///
/// Implemented by [`KmzArchive`](crate::KmzArchive) for archive-relative paths, by
/// [`DirectoryAssets`] for documents loaded from disk, and by [`MemoryAssets`] for
/// embedding and tests.
pub trait AssetResolver {
    /// Returns the bytes stored under `reference`.
    fn resolve(&self, reference: &str) -> Result<Vec<u8>, AssetError>;
}

impl<R: AssetResolver + ?Sized> AssetResolver for &R {
    fn resolve(&self, reference: &str) -> Result<Vec<u8>, AssetError> {
        (**self).resolve(reference)
    }
}

/// An in-memory asset table.
#[derive(Clone, Debug, Default)]
pub struct MemoryAssets {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryAssets {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `bytes` under `reference`, replacing any previous entry.
    pub fn insert(&mut self, reference: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.entries.insert(reference.into(), bytes.into());
    }

    /// Number of stored assets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AssetResolver for MemoryAssets {
    fn resolve(&self, reference: &str) -> Result<Vec<u8>, AssetError> {
        self.entries
            .get(reference)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(reference.to_owned()))
    }
}

/// Assets stored next to a KML file, resolved relative to its directory.
///
/// References that are absolute, carry a URL scheme, or climb out of the root with
/// `..` are reported as not found.
#[derive(Clone, Debug)]
pub struct DirectoryAssets {
    root: PathBuf,
}

impl DirectoryAssets {
    /// Resolve references under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory references are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, reference: &str) -> Option<PathBuf> {
        if reference.contains("://") {
            return None;
        }
        let relative = Path::new(reference);
        let mut path = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        Some(path)
    }
}

impl AssetResolver for DirectoryAssets {
    fn resolve(&self, reference: &str) -> Result<Vec<u8>, AssetError> {
        let not_found = || AssetError::NotFound(reference.to_owned());
        let path = self.path_of(reference).ok_or_else(not_found)?;
        std::fs::read(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => not_found(),
            _ => AssetError::Read {
                reference: reference.to_owned(),
                source,
            },
        })
    }
}
