// This file is part of the product DocRack.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Stable document identity. Assigned once from the catalog counter and never
/// reused, so it is safe to embed in stored filenames.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct DocumentId(pub u64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Separator between the id prefix and the original basename in stored
/// filenames. The basename itself may contain `~`; recovery always splits on
/// the first occurrence.
pub const ID_SEPARATOR: char = '~';

#[derive(Debug, PartialEq, Eq)]
pub enum FilenameError {
    Empty,
    DotSegment,
}

impl fmt::Display for FilenameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilenameError::Empty => write!(f, "filename must not be empty"),
            FilenameError::DotSegment => write!(f, "filename must not be '.' or '..'"),
        }
    }
}

impl std::error::Error for FilenameError {}

/// Where a document's file lives relative to the documents root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLocation {
    pub folder: String,
    pub filename: String,
}

pub fn parse_document_id(raw: &str) -> Result<DocumentId, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("document id must not be empty".to_string());
    }
    if !trimmed.chars().all(|ch| ch.is_ascii_digit()) {
        return Err("document id must be decimal digits".to_string());
    }
    let value = trimmed
        .parse::<u64>()
        .map_err(|_| "document id out of range".to_string())?;
    Ok(DocumentId(value))
}

/// Reduce an uploaded filename to a safe basename: path components from
/// either separator convention are dropped, control characters are removed,
/// surrounding whitespace is trimmed.
pub fn sanitize_basename(raw: &str) -> Result<String, FilenameError> {
    let last = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let cleaned: String = last.chars().filter(|ch| !ch.is_control()).collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        return Err(FilenameError::Empty);
    }
    if trimmed == "." || trimmed == ".." {
        return Err(FilenameError::DotSegment);
    }
    Ok(trimmed.to_string())
}

/// 256 buckets keyed by the low byte of the id. Deterministic, so replace
/// operations always land in the folder the first store chose. Changing this
/// scheme invalidates every stored path.
pub fn storage_folder(id: DocumentId) -> String {
    format!("{:02x}", (id.0 & 0xff) as u8)
}

pub fn stored_filename(id: DocumentId, basename: &str) -> String {
    format!("{}{}{}", id, ID_SEPARATOR, basename)
}

/// Allocate the storage location for a document and a raw upload filename.
/// Pure and idempotent: identical inputs always produce identical locations.
pub fn allocate(id: DocumentId, raw_filename: &str) -> Result<StorageLocation, FilenameError> {
    let basename = sanitize_basename(raw_filename)?;
    Ok(StorageLocation {
        folder: storage_folder(id),
        filename: stored_filename(id, &basename),
    })
}

pub fn document_path(documents_root: &Path, folder: &str, filename: &str) -> PathBuf {
    documents_root.join(folder).join(filename)
}

/// Recover the original basename from a stored filename by stripping the id
/// prefix. Filenames that carry no separator are returned unchanged.
pub fn original_basename(stored: &str) -> &str {
    match stored.split_once(ID_SEPARATOR) {
        Some((_, rest)) => rest,
        None => stored,
    }
}

/// Create the bucket folder if it does not exist yet. Safe to call from
/// concurrent stores targeting the same bucket.
pub fn ensure_folder(documents_root: &Path, folder: &str) -> std::io::Result<PathBuf> {
    let dir = documents_root.join(folder);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}
