// This file is part of the product DocRack.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::storage::layout::{self, DocumentId};

/// One managed document. `filename` and `folder` stay empty until the first
/// file store; once set, a file must exist at the derived path and the two
/// are only ever deleted together with the record.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocumentRecord {
    pub id: DocumentId,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub folder: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_changed: Option<DateTime<Utc>>,
}

impl DocumentRecord {
    pub fn has_file(&self) -> bool {
        !self.filename.is_empty() && !self.folder.is_empty()
    }

    /// The uploaded filename without the id prefix.
    pub fn original_basename(&self) -> &str {
        layout::original_basename(&self.filename)
    }
}

/// A category/value pair. Rows are shared: every document tagged with the
/// same multi-value pair references one row, and association edges carry the
/// reference count.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TagRow {
    pub category: String,
    pub value: String,
    pub multi_value: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TagLink {
    pub document_id: DocumentId,
    pub tag_row_id: u64,
}

/// Visibility rule of a registered page, evaluated against the requester's
/// declared roles.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "rule", rename_all = "lowercase")]
pub enum VisibilityRule {
    Public,
    Restricted { roles: Vec<String> },
    Deny,
}

impl Default for VisibilityRule {
    fn default() -> Self {
        VisibilityRule::Public
    }
}

/// DocRack's projection of an externally owned content page: identity,
/// optional display title, and the rule its visibility predicate evaluates.
/// Page bodies never enter the catalog.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PageRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub visibility: VisibilityRule,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct PageLink {
    pub document_id: DocumentId,
    pub page_id: String,
}

fn default_next_id() -> u64 {
    1
}

/// The whole persisted catalog. One YAML document holds records, shared tag
/// rows, the edges that reference-count them, pages, and links, so the
/// counts can never drift from the edges they count across a crash.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogData {
    /// Monotonic. Ids of deleted documents are never handed out again.
    #[serde(default = "default_next_id")]
    pub next_document_id: u64,
    #[serde(default = "default_next_id")]
    pub next_tag_row_id: u64,
    #[serde(default)]
    pub documents: BTreeMap<DocumentId, DocumentRecord>,
    #[serde(default)]
    pub tag_rows: BTreeMap<u64, TagRow>,
    #[serde(default)]
    pub tag_links: Vec<TagLink>,
    #[serde(default)]
    pub pages: BTreeMap<String, PageRecord>,
    #[serde(default)]
    pub page_links: Vec<PageLink>,
}

impl Default for CatalogData {
    fn default() -> Self {
        Self {
            next_document_id: default_next_id(),
            next_tag_row_id: default_next_id(),
            documents: BTreeMap::new(),
            tag_rows: BTreeMap::new(),
            tag_links: Vec::new(),
            pages: BTreeMap::new(),
            page_links: Vec::new(),
        }
    }
}

impl CatalogData {
    pub fn document(&self, id: DocumentId) -> Option<&DocumentRecord> {
        self.documents.get(&id)
    }
}

#[derive(Debug, Clone)]
pub enum CatalogError {
    DocumentNotFound(DocumentId),
    PageNotFound(String),
    InvalidInput(String),
    StoreError(String),
    FileError(String),
    Internal(String),
    ServiceUnavailable,
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::DocumentNotFound(id) => write!(f, "Document not found: {}", id),
            CatalogError::PageNotFound(page_id) => write!(f, "Page not found: {}", page_id),
            CatalogError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CatalogError::StoreError(msg) => write!(f, "Catalog store error: {}", msg),
            CatalogError::FileError(msg) => write!(f, "File error: {}", msg),
            CatalogError::Internal(msg) => write!(f, "Internal catalog error: {}", msg),
            CatalogError::ServiceUnavailable => write!(f, "Catalog service is not running"),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<crate::util::yaml_store::YamlStoreError> for CatalogError {
    fn from(err: crate::util::yaml_store::YamlStoreError) -> Self {
        CatalogError::StoreError(err.to_string())
    }
}

// Mutation commands for the background writer task.
#[derive(Debug)]
pub enum CatalogMutation {
    CreateDocument {
        title: String,
        description: String,
    },
    UpdateDocumentMeta {
        id: DocumentId,
        title: Option<String>,
        description: Option<String>,
    },
    /// Bookkeeping half of a file store: the bytes are already in place when
    /// this runs. Sets filename/folder/last_changed and defaults an empty
    /// title to the uploaded basename.
    RecordFileStored {
        id: DocumentId,
        folder: String,
        filename: String,
        basename: String,
    },
    /// Full delete cascade: tag edges (garbage-collecting orphaned rows),
    /// page links, the backing file at `file_path`, then the record.
    DeleteDocument {
        id: DocumentId,
        file_path: Option<PathBuf>,
    },
    AddTag {
        id: DocumentId,
        category: String,
        value: String,
        multi_value: bool,
    },
    RemoveTag {
        id: DocumentId,
        category: String,
        value: Option<String>,
    },
    RemoveAllTags {
        id: DocumentId,
    },
    UpsertPage {
        page_id: String,
        title: Option<String>,
        visibility: VisibilityRule,
    },
    DeletePage {
        page_id: String,
    },
    LinkPages {
        id: DocumentId,
        pages: Vec<String>,
    },
    UnlinkPage {
        id: DocumentId,
        page_id: String,
    },
}

#[derive(Debug)]
pub enum CatalogMutationResult {
    DocumentCreated(DocumentRecord),
    DocumentUpdated(DocumentRecord),
    DocumentDeleted,
    TagAdded,
    TagsRemoved(usize),
    PageSaved,
    PageDeleted,
    PagesLinked(usize),
    PageUnlinked,
}
