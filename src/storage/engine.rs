// This file is part of the product DocRack.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::layout::{
    allocate, document_path, sanitize_basename, storage_folder, DocumentId, FilenameError,
};
use crate::catalog::{CatalogError, CatalogService, DocumentRecord};
use crate::util::is_temp_upload_name;
use log::{debug, warn};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum StorageError {
    /// Store was attempted for a document record that does not exist yet.
    PreconditionFailed(String),
    InvalidFilename(FilenameError),
    Io(String),
    Catalog(CatalogError),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::PreconditionFailed(message) => write!(f, "{}", message),
            StorageError::InvalidFilename(err) => write!(f, "Invalid filename: {}", err),
            StorageError::Io(message) => write!(f, "Storage I/O error: {}", message),
            StorageError::Catalog(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<FilenameError> for StorageError {
    fn from(err: FilenameError) -> Self {
        StorageError::InvalidFilename(err)
    }
}

impl From<CatalogError> for StorageError {
    fn from(err: CatalogError) -> Self {
        StorageError::Catalog(err)
    }
}

/// Orchestrates file placement and removal so the documents tree and the
/// catalog never disagree about where a document's bytes live.
#[derive(Clone)]
pub struct StorageEngine {
    documents_root: PathBuf,
    catalog: CatalogService,
}

impl StorageEngine {
    pub fn new(documents_root: PathBuf, catalog: CatalogService) -> Self {
        StorageEngine {
            documents_root,
            catalog,
        }
    }

    pub fn documents_root(&self) -> &Path {
        &self.documents_root
    }

    /// Copy `source` into the document's bucket and record the placement.
    /// The record must already exist so the id prefix is final. Storing over
    /// an existing file with the same basename overwrites it in place; a new
    /// basename lands beside the old file, which then shows up in the audit
    /// report until an operator reconciles it.
    pub async fn store(
        &self,
        id: DocumentId,
        source: &Path,
        raw_filename: &str,
    ) -> Result<DocumentRecord, StorageError> {
        if self.catalog.get_document(id)?.is_none() {
            return Err(StorageError::PreconditionFailed(format!(
                "Document {} must exist before a file can be stored for it",
                id
            )));
        }

        let basename = sanitize_basename(raw_filename)?;
        let location = allocate(id, &basename)?;

        let folder_dir = self.documents_root.join(&location.folder);
        tokio::fs::create_dir_all(&folder_dir).await.map_err(|err| {
            StorageError::Io(format!(
                "Could not create storage folder '{}': {}",
                folder_dir.display(),
                err
            ))
        })?;

        let destination = folder_dir.join(&location.filename);
        let bytes = tokio::fs::copy(source, &destination).await.map_err(|err| {
            StorageError::Io(format!(
                "Could not copy '{}' to '{}': {}",
                source.display(),
                destination.display(),
                err
            ))
        })?;
        debug!(
            "Stored {} byte(s) for document {} at '{}'",
            bytes,
            id,
            destination.display()
        );

        let record = self
            .catalog
            .record_file_stored(id, location.folder, location.filename, basename)
            .await?;
        Ok(record)
    }

    /// Swap a document's bytes while keeping its identity and metadata.
    /// Same code path as `store`; the separate name states the caller's
    /// intent.
    pub async fn replace(
        &self,
        id: DocumentId,
        source: &Path,
        raw_filename: &str,
    ) -> Result<DocumentRecord, StorageError> {
        self.store(id, source, raw_filename).await
    }

    /// Absolute path of the document's stored file, or None when no file has
    /// been stored yet.
    pub fn full_path(&self, record: &DocumentRecord) -> Option<PathBuf> {
        if !record.has_file() {
            return None;
        }
        Some(document_path(
            &self.documents_root,
            &record.folder,
            &record.filename,
        ))
    }

    /// Delete a document: tag associations first, then page links, then the
    /// stored file, then the record.
    pub async fn delete(&self, id: DocumentId) -> Result<(), StorageError> {
        let record = self
            .catalog
            .get_document(id)?
            .ok_or(CatalogError::DocumentNotFound(id))?;
        let file_path = self.full_path(&record);
        self.catalog.delete_document(id, file_path).await?;
        Ok(())
    }

    /// Compare the documents tree against the catalog. Reports files no
    /// record points at and records whose file is gone. Store's
    /// copy-then-record ordering and basename-changing replaces both produce
    /// orphans legitimately; this is the reconciliation tool for them.
    pub fn audit(&self) -> Result<AuditReport, StorageError> {
        let documents = self.catalog.list_documents()?;

        let mut expected: HashSet<PathBuf> = HashSet::new();
        let mut missing_files = Vec::new();
        for record in &documents {
            let Some(path) = self.full_path(record) else {
                continue;
            };
            if !path.is_file() {
                missing_files.push(MissingFile {
                    document_id: record.id,
                    path: relative_display(&self.documents_root, &path),
                });
            }
            expected.insert(path);
        }

        let mut orphaned_files = Vec::new();
        let mut stack = vec![self.documents_root.clone()];
        while let Some(dir) = stack.pop() {
            let entries = match std::fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(err) => {
                    return Err(StorageError::Io(format!(
                        "Could not scan '{}': {}",
                        dir.display(),
                        err
                    )));
                }
            };
            for entry in entries {
                let entry = entry.map_err(|err| {
                    StorageError::Io(format!("Could not scan '{}': {}", dir.display(), err))
                })?;
                let path = entry.path();
                let name = entry.file_name();
                let name_str = name.to_string_lossy();

                if name_str.starts_with('.') || is_temp_upload_name(name_str.as_ref()) {
                    continue;
                }

                let file_type = entry.file_type().map_err(|err| {
                    StorageError::Io(format!("Could not scan '{}': {}", path.display(), err))
                })?;
                if file_type.is_dir() {
                    stack.push(path);
                    continue;
                }
                if !file_type.is_file() {
                    continue;
                }

                if !expected.contains(&path) {
                    warn_if_misplaced(&self.documents_root, &path, &name_str);
                    orphaned_files.push(relative_display(&self.documents_root, &path));
                }
            }
        }

        orphaned_files.sort();
        missing_files.sort_by(|a, b| a.document_id.cmp(&b.document_id));
        Ok(AuditReport {
            orphaned_files,
            missing_files,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct AuditReport {
    pub orphaned_files: Vec<String>,
    pub missing_files: Vec<MissingFile>,
}

#[derive(Debug, Serialize)]
pub struct MissingFile {
    pub document_id: DocumentId,
    pub path: String,
}

fn relative_display(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

fn warn_if_misplaced(root: &Path, path: &Path, name: &str) {
    if let Some((id_part, _)) = name.split_once(super::layout::ID_SEPARATOR)
        && let Ok(id) = id_part.parse::<u64>()
        && let Some(parent) = path.parent()
        && let Ok(bucket) = parent.strip_prefix(root)
    {
        let expected = storage_folder(DocumentId(id));
        if bucket.to_string_lossy() != expected {
            warn!(
                "File '{}' carries id {} but sits outside bucket '{}'",
                path.display(),
                id,
                expected
            );
        }
    }
}
