// This file is part of the product DocRack.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::store::CatalogStore;
use super::types::{
    CatalogData, CatalogError, CatalogMutation, CatalogMutationResult, DocumentRecord, PageRecord,
    TagRow, VisibilityRule,
};
use super::{pages, tags};
use crate::storage::layout::DocumentId;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tokio::sync::{mpsc, oneshot};

// Type aliases for the mutation channel plumbing
type MutationRequest = (
    CatalogMutation,
    oneshot::Sender<Result<CatalogMutationResult, CatalogError>>,
);
type MutationSender = mpsc::UnboundedSender<MutationRequest>;
type MutationReceiver = mpsc::UnboundedReceiver<MutationRequest>;

/// The one shared owner of the catalog. Reads go straight to the in-memory
/// copy; every mutation travels through a single writer task, so a lookup
/// and the edit it decides on (dedupe checks, reference counts, the
/// single-value overwrite) can never interleave with another mutation.
#[derive(Clone)]
pub struct CatalogService {
    catalog_data: Arc<RwLock<CatalogData>>,
    mutation_sender: MutationSender,
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    /// Load the catalog from the store and start the background writer task.
    pub fn new(store: Arc<dyn CatalogStore>) -> Result<Self, CatalogError> {
        let data = store.load()?;
        let catalog_data = Arc::new(RwLock::new(data));

        let (mutation_sender, mut mutation_receiver): (MutationSender, MutationReceiver) =
            mpsc::unbounded_channel();

        let catalog_clone = catalog_data.clone();
        let store_clone = store.clone();

        tokio::spawn(async move {
            while let Some((mutation, response_sender)) = mutation_receiver.recv().await {
                let result = Self::handle_mutation(mutation, &catalog_clone, &store_clone);
                let _ = response_sender.send(result);
            }
        });

        Ok(CatalogService {
            catalog_data,
            mutation_sender,
            store,
        })
    }

    fn reload_catalog_from_store(
        catalog_data: &Arc<RwLock<CatalogData>>,
        store: &Arc<dyn CatalogStore>,
    ) -> Result<(), CatalogError> {
        let data = store.load()?;
        match catalog_data.write() {
            Ok(mut guard) => {
                *guard = data;
                catalog_data.clear_poison();
                Ok(())
            }
            Err(poisoned) => {
                log::error!("🚨 CRITICAL: Catalog lock poisoned during reload; recovering");
                let mut guard = poisoned.into_inner();
                *guard = data;
                catalog_data.clear_poison();
                Ok(())
            }
        }
    }

    fn with_catalog_read<T>(
        &self,
        f: impl FnOnce(&CatalogData) -> Result<T, CatalogError>,
    ) -> Result<T, CatalogError> {
        match self.catalog_data.read() {
            Ok(guard) => f(&guard),
            Err(_) => {
                log::error!("🚨 CRITICAL: Catalog lock poisoned on read; reloading from disk");
                Self::reload_catalog_from_store(&self.catalog_data, &self.store)?;
                let guard = self.catalog_data.read().map_err(|_| {
                    CatalogError::Internal("Catalog lock poisoned after recovery attempt".to_string())
                })?;
                f(&guard)
            }
        }
    }

    fn with_catalog_write<T>(
        catalog_data: &Arc<RwLock<CatalogData>>,
        store: &Arc<dyn CatalogStore>,
        f: impl FnOnce(&mut CatalogData) -> Result<T, CatalogError>,
    ) -> Result<T, CatalogError> {
        let mut guard = match catalog_data.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::error!("🚨 CRITICAL: Catalog lock poisoned on write; reloading from disk");
                let mut guard = poisoned.into_inner();
                let data = store.load()?;
                *guard = data;
                catalog_data.clear_poison();
                guard
            }
        };

        f(&mut guard)
    }

    /// Apply one mutation: clone the catalog, edit the clone, persist it,
    /// then swap it in. A failed save leaves the in-memory catalog exactly
    /// as it was.
    fn handle_mutation(
        mutation: CatalogMutation,
        catalog_data: &Arc<RwLock<CatalogData>>,
        store: &Arc<dyn CatalogStore>,
    ) -> Result<CatalogMutationResult, CatalogError> {
        match mutation {
            CatalogMutation::CreateDocument { title, description } => {
                Self::with_catalog_write(catalog_data, store, |data| {
                    let mut updated = data.clone();
                    let id = DocumentId(updated.next_document_id);
                    updated.next_document_id += 1;
                    let record = DocumentRecord {
                        id,
                        filename: String::new(),
                        folder: String::new(),
                        title,
                        description,
                        last_changed: None,
                    };
                    updated.documents.insert(id, record.clone());

                    store.save(&updated)?;
                    *data = updated;
                    Ok(CatalogMutationResult::DocumentCreated(record))
                })
            }
            CatalogMutation::UpdateDocumentMeta {
                id,
                title,
                description,
            } => Self::with_catalog_write(catalog_data, store, |data| {
                let mut updated = data.clone();
                let record = updated
                    .documents
                    .get_mut(&id)
                    .ok_or(CatalogError::DocumentNotFound(id))?;
                if let Some(title) = title {
                    record.title = title;
                }
                if let Some(description) = description {
                    record.description = description;
                }
                let record = record.clone();

                store.save(&updated)?;
                *data = updated;
                Ok(CatalogMutationResult::DocumentUpdated(record))
            }),
            CatalogMutation::RecordFileStored {
                id,
                folder,
                filename,
                basename,
            } => Self::with_catalog_write(catalog_data, store, |data| {
                let mut updated = data.clone();
                let record = updated
                    .documents
                    .get_mut(&id)
                    .ok_or(CatalogError::DocumentNotFound(id))?;
                record.folder = folder;
                record.filename = filename;
                record.last_changed = Some(Utc::now());
                if record.title.is_empty() {
                    record.title = basename;
                }
                let record = record.clone();

                store.save(&updated)?;
                *data = updated;
                Ok(CatalogMutationResult::DocumentUpdated(record))
            }),
            CatalogMutation::DeleteDocument { id, file_path } => {
                Self::with_catalog_write(catalog_data, store, |data| {
                    if !data.documents.contains_key(&id) {
                        return Err(CatalogError::DocumentNotFound(id));
                    }
                    let mut updated = data.clone();

                    // Cascade order: tag edges, page links, file, record.
                    let removed_tags = tags::remove_all_tags(&mut updated, id);
                    let removed_links = pages::unlink_all(&mut updated, id);
                    log::debug!(
                        "Deleting document {}: detached {} tag(s), {} page link(s)",
                        id,
                        removed_tags,
                        removed_links
                    );

                    if let Some(path) = file_path {
                        match std::fs::remove_file(&path) {
                            Ok(()) => {}
                            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                                log::warn!(
                                    "Document {} file already missing at '{}'; continuing delete",
                                    id,
                                    path.display()
                                );
                            }
                            Err(err) => {
                                // Keep the completed metadata cleanup and leave
                                // the record in place for a retry.
                                store.save(&updated)?;
                                *data = updated;
                                return Err(CatalogError::FileError(format!(
                                    "Failed to remove document file '{}': {}",
                                    path.display(),
                                    err
                                )));
                            }
                        }
                    }

                    updated.documents.remove(&id);
                    store.save(&updated)?;
                    *data = updated;
                    Ok(CatalogMutationResult::DocumentDeleted)
                })
            }
            CatalogMutation::AddTag {
                id,
                category,
                value,
                multi_value,
            } => Self::with_catalog_write(catalog_data, store, |data| {
                if !data.documents.contains_key(&id) {
                    return Err(CatalogError::DocumentNotFound(id));
                }
                let mut updated = data.clone();
                tags::add_tag(&mut updated, id, &category, &value, multi_value);

                store.save(&updated)?;
                *data = updated;
                Ok(CatalogMutationResult::TagAdded)
            }),
            CatalogMutation::RemoveTag {
                id,
                category,
                value,
            } => Self::with_catalog_write(catalog_data, store, |data| {
                if !data.documents.contains_key(&id) {
                    return Err(CatalogError::DocumentNotFound(id));
                }
                let mut updated = data.clone();
                let removed = tags::remove_tag(&mut updated, id, &category, value.as_deref());
                if removed > 0 {
                    store.save(&updated)?;
                    *data = updated;
                }
                Ok(CatalogMutationResult::TagsRemoved(removed))
            }),
            CatalogMutation::RemoveAllTags { id } => {
                Self::with_catalog_write(catalog_data, store, |data| {
                    if !data.documents.contains_key(&id) {
                        return Err(CatalogError::DocumentNotFound(id));
                    }
                    let mut updated = data.clone();
                    let removed = tags::remove_all_tags(&mut updated, id);
                    if removed > 0 {
                        store.save(&updated)?;
                        *data = updated;
                    }
                    Ok(CatalogMutationResult::TagsRemoved(removed))
                })
            }
            CatalogMutation::UpsertPage {
                page_id,
                title,
                visibility,
            } => Self::with_catalog_write(catalog_data, store, |data| {
                let trimmed = page_id.trim();
                if trimmed.is_empty() {
                    return Err(CatalogError::InvalidInput(
                        "Page id must not be empty".to_string(),
                    ));
                }
                let mut updated = data.clone();
                pages::upsert_page(&mut updated, trimmed, title, visibility);

                store.save(&updated)?;
                *data = updated;
                Ok(CatalogMutationResult::PageSaved)
            }),
            CatalogMutation::DeletePage { page_id } => {
                Self::with_catalog_write(catalog_data, store, |data| {
                    let mut updated = data.clone();
                    if !pages::delete_page(&mut updated, &page_id) {
                        return Err(CatalogError::PageNotFound(page_id));
                    }

                    store.save(&updated)?;
                    *data = updated;
                    Ok(CatalogMutationResult::PageDeleted)
                })
            }
            CatalogMutation::LinkPages { id, pages: wanted } => {
                Self::with_catalog_write(catalog_data, store, |data| {
                    if !data.documents.contains_key(&id) {
                        return Err(CatalogError::DocumentNotFound(id));
                    }
                    let mut updated = data.clone();
                    let added = pages::link_pages(&mut updated, id, &wanted)?;
                    if added > 0 {
                        store.save(&updated)?;
                        *data = updated;
                    }
                    Ok(CatalogMutationResult::PagesLinked(added))
                })
            }
            CatalogMutation::UnlinkPage { id, page_id } => {
                Self::with_catalog_write(catalog_data, store, |data| {
                    if !data.documents.contains_key(&id) {
                        return Err(CatalogError::DocumentNotFound(id));
                    }
                    let mut updated = data.clone();
                    let removed = pages::unlink_page(&mut updated, id, &page_id);
                    if removed {
                        store.save(&updated)?;
                        *data = updated;
                    }
                    Ok(CatalogMutationResult::PageUnlinked)
                })
            }
        }
    }

    async fn submit(&self, mutation: CatalogMutation) -> Result<CatalogMutationResult, CatalogError> {
        let (response_sender, response_receiver) = oneshot::channel();
        self.mutation_sender
            .send((mutation, response_sender))
            .map_err(|_| CatalogError::ServiceUnavailable)?;
        response_receiver
            .await
            .map_err(|_| CatalogError::ServiceUnavailable)?
    }

    // ---- mutations ----

    pub async fn create_document(
        &self,
        title: String,
        description: String,
    ) -> Result<DocumentRecord, CatalogError> {
        match self
            .submit(CatalogMutation::CreateDocument { title, description })
            .await?
        {
            CatalogMutationResult::DocumentCreated(record) => Ok(record),
            _ => Err(CatalogError::Internal("Unexpected mutation result".to_string())),
        }
    }

    pub async fn update_document_meta(
        &self,
        id: DocumentId,
        title: Option<String>,
        description: Option<String>,
    ) -> Result<DocumentRecord, CatalogError> {
        match self
            .submit(CatalogMutation::UpdateDocumentMeta {
                id,
                title,
                description,
            })
            .await?
        {
            CatalogMutationResult::DocumentUpdated(record) => Ok(record),
            _ => Err(CatalogError::Internal("Unexpected mutation result".to_string())),
        }
    }

    pub async fn record_file_stored(
        &self,
        id: DocumentId,
        folder: String,
        filename: String,
        basename: String,
    ) -> Result<DocumentRecord, CatalogError> {
        match self
            .submit(CatalogMutation::RecordFileStored {
                id,
                folder,
                filename,
                basename,
            })
            .await?
        {
            CatalogMutationResult::DocumentUpdated(record) => Ok(record),
            _ => Err(CatalogError::Internal("Unexpected mutation result".to_string())),
        }
    }

    pub async fn delete_document(
        &self,
        id: DocumentId,
        file_path: Option<PathBuf>,
    ) -> Result<(), CatalogError> {
        match self
            .submit(CatalogMutation::DeleteDocument { id, file_path })
            .await?
        {
            CatalogMutationResult::DocumentDeleted => Ok(()),
            _ => Err(CatalogError::Internal("Unexpected mutation result".to_string())),
        }
    }

    pub async fn add_tag(
        &self,
        id: DocumentId,
        category: String,
        value: String,
        multi_value: bool,
    ) -> Result<(), CatalogError> {
        match self
            .submit(CatalogMutation::AddTag {
                id,
                category,
                value,
                multi_value,
            })
            .await?
        {
            CatalogMutationResult::TagAdded => Ok(()),
            _ => Err(CatalogError::Internal("Unexpected mutation result".to_string())),
        }
    }

    pub async fn remove_tag(
        &self,
        id: DocumentId,
        category: String,
        value: Option<String>,
    ) -> Result<usize, CatalogError> {
        match self
            .submit(CatalogMutation::RemoveTag {
                id,
                category,
                value,
            })
            .await?
        {
            CatalogMutationResult::TagsRemoved(removed) => Ok(removed),
            _ => Err(CatalogError::Internal("Unexpected mutation result".to_string())),
        }
    }

    pub async fn remove_all_tags(&self, id: DocumentId) -> Result<usize, CatalogError> {
        match self.submit(CatalogMutation::RemoveAllTags { id }).await? {
            CatalogMutationResult::TagsRemoved(removed) => Ok(removed),
            _ => Err(CatalogError::Internal("Unexpected mutation result".to_string())),
        }
    }

    pub async fn upsert_page(
        &self,
        page_id: String,
        title: Option<String>,
        visibility: VisibilityRule,
    ) -> Result<(), CatalogError> {
        match self
            .submit(CatalogMutation::UpsertPage {
                page_id,
                title,
                visibility,
            })
            .await?
        {
            CatalogMutationResult::PageSaved => Ok(()),
            _ => Err(CatalogError::Internal("Unexpected mutation result".to_string())),
        }
    }

    pub async fn delete_page(&self, page_id: String) -> Result<(), CatalogError> {
        match self.submit(CatalogMutation::DeletePage { page_id }).await? {
            CatalogMutationResult::PageDeleted => Ok(()),
            _ => Err(CatalogError::Internal("Unexpected mutation result".to_string())),
        }
    }

    pub async fn link_pages(
        &self,
        id: DocumentId,
        pages: Vec<String>,
    ) -> Result<usize, CatalogError> {
        match self.submit(CatalogMutation::LinkPages { id, pages }).await? {
            CatalogMutationResult::PagesLinked(added) => Ok(added),
            _ => Err(CatalogError::Internal("Unexpected mutation result".to_string())),
        }
    }

    pub async fn unlink_page(&self, id: DocumentId, page_id: String) -> Result<(), CatalogError> {
        match self.submit(CatalogMutation::UnlinkPage { id, page_id }).await? {
            CatalogMutationResult::PageUnlinked => Ok(()),
            _ => Err(CatalogError::Internal("Unexpected mutation result".to_string())),
        }
    }

    // ---- reads ----

    pub fn get_document(&self, id: DocumentId) -> Result<Option<DocumentRecord>, CatalogError> {
        self.with_catalog_read(|data| Ok(data.document(id).cloned()))
    }

    pub fn list_documents(&self) -> Result<Vec<DocumentRecord>, CatalogError> {
        self.with_catalog_read(|data| Ok(data.documents.values().cloned().collect()))
    }

    pub fn list_values(
        &self,
        id: DocumentId,
        category: &str,
        value: Option<&str>,
    ) -> Result<Option<Vec<String>>, CatalogError> {
        self.with_catalog_read(|data| Ok(tags::list_values(data, id, category, value)))
    }

    pub fn tags_for_document(&self, id: DocumentId) -> Result<Vec<(u64, TagRow)>, CatalogError> {
        self.with_catalog_read(|data| Ok(tags::tags_for_document(data, id)))
    }

    pub fn pages_for_document(&self, id: DocumentId) -> Result<Vec<String>, CatalogError> {
        self.with_catalog_read(|data| Ok(pages::pages_for_document(data, id)))
    }

    /// The linked pages of a document together with their visibility rules,
    /// for the download authorization check.
    pub fn linked_page_records(
        &self,
        id: DocumentId,
    ) -> Result<Vec<(String, PageRecord)>, CatalogError> {
        self.with_catalog_read(|data| {
            Ok(pages::pages_for_document(data, id)
                .into_iter()
                .filter_map(|page_id| {
                    data.pages
                        .get(&page_id)
                        .map(|record| (page_id, record.clone()))
                })
                .collect())
        })
    }

    pub fn get_page(&self, page_id: &str) -> Result<Option<PageRecord>, CatalogError> {
        self.with_catalog_read(|data| Ok(data.pages.get(page_id).cloned()))
    }

    pub fn list_pages(&self) -> Result<Vec<(String, PageRecord)>, CatalogError> {
        self.with_catalog_read(|data| {
            Ok(data
                .pages
                .iter()
                .map(|(page_id, record)| (page_id.clone(), record.clone()))
                .collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::store::MemoryCatalogStore;
    use crate::util::test_fixtures::TestFixtureRoot;

    struct FailingCatalogStore;

    impl CatalogStore for FailingCatalogStore {
        fn load(&self) -> Result<CatalogData, CatalogError> {
            Ok(CatalogData::default())
        }

        fn save(&self, _data: &CatalogData) -> Result<(), CatalogError> {
            Err(CatalogError::StoreError(
                "Simulated catalog save failure".to_string(),
            ))
        }
    }

    fn memory_service() -> CatalogService {
        CatalogService::new(Arc::new(MemoryCatalogStore::new(CatalogData::default())))
            .expect("service")
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let service = memory_service();
        let first = service
            .create_document("First".to_string(), String::new())
            .await
            .expect("create");
        let second = service
            .create_document("Second".to_string(), String::new())
            .await
            .expect("create");
        assert_eq!(first.id, DocumentId(1));
        assert_eq!(second.id, DocumentId(2));
        assert!(first.filename.is_empty());
        assert!(first.last_changed.is_none());
    }

    #[tokio::test]
    async fn deleted_ids_are_never_reused() {
        let service = memory_service();
        let first = service
            .create_document(String::new(), String::new())
            .await
            .expect("create");
        service
            .delete_document(first.id, None)
            .await
            .expect("delete");
        let second = service
            .create_document(String::new(), String::new())
            .await
            .expect("create");
        assert_eq!(second.id, DocumentId(2));
    }

    #[tokio::test]
    async fn create_does_not_mutate_in_memory_on_save_error() {
        let service = CatalogService::new(Arc::new(FailingCatalogStore)).expect("service");
        let result = service
            .create_document("Doomed".to_string(), String::new())
            .await;
        assert!(result.is_err());
        assert!(service.list_documents().expect("list").is_empty());
    }

    #[tokio::test]
    async fn record_file_stored_defaults_empty_title_only() {
        let service = memory_service();
        let record = service
            .create_document(String::new(), String::new())
            .await
            .expect("create");

        let stored = service
            .record_file_stored(
                record.id,
                "01".to_string(),
                "1~report.pdf".to_string(),
                "report.pdf".to_string(),
            )
            .await
            .expect("store");
        assert_eq!(stored.title, "report.pdf");
        assert!(stored.last_changed.is_some());

        // A later store must not clobber an explicit title.
        service
            .update_document_meta(record.id, Some("Quarterly report".to_string()), None)
            .await
            .expect("meta");
        let replaced = service
            .record_file_stored(
                record.id,
                "01".to_string(),
                "1~report-v2.pdf".to_string(),
                "report-v2.pdf".to_string(),
            )
            .await
            .expect("replace");
        assert_eq!(replaced.title, "Quarterly report");
        assert_eq!(replaced.original_basename(), "report-v2.pdf");
    }

    #[tokio::test]
    async fn metadata_update_leaves_last_changed_alone() {
        let service = memory_service();
        let record = service
            .create_document(String::new(), String::new())
            .await
            .expect("create");
        let stored = service
            .record_file_stored(
                record.id,
                "01".to_string(),
                "1~a.pdf".to_string(),
                "a.pdf".to_string(),
            )
            .await
            .expect("store");

        let updated = service
            .update_document_meta(record.id, Some("New title".to_string()), Some("desc".to_string()))
            .await
            .expect("meta");
        assert_eq!(updated.last_changed, stored.last_changed);
        assert_eq!(updated.title, "New title");
        assert_eq!(updated.description, "desc");
    }

    #[tokio::test]
    async fn delete_cascade_clears_tags_links_file_and_record() {
        let fixture = TestFixtureRoot::new_unique("service-delete");
        let service = memory_service();

        let record = service
            .create_document(String::new(), String::new())
            .await
            .expect("create");
        service
            .upsert_page("intro".to_string(), None, VisibilityRule::Public)
            .await
            .expect("page");
        service
            .link_pages(record.id, vec!["intro".to_string()])
            .await
            .expect("link");
        service
            .add_tag(record.id, "dept".to_string(), "finance".to_string(), true)
            .await
            .expect("tag");

        let file_path = fixture.path().join("1~doomed.pdf");
        std::fs::write(&file_path, b"bytes").expect("write file");

        service
            .delete_document(record.id, Some(file_path.clone()))
            .await
            .expect("delete");

        assert!(!file_path.exists());
        assert!(service.get_document(record.id).expect("get").is_none());
        assert!(service.tags_for_document(record.id).expect("tags").is_empty());
        assert!(service.pages_for_document(record.id).expect("pages").is_empty());
        // The page directory entry itself survives; only the link goes.
        assert!(service.get_page("intro").expect("page").is_some());
    }

    #[tokio::test]
    async fn delete_tolerates_an_already_missing_file() {
        let fixture = TestFixtureRoot::new_unique("service-delete-missing");
        let service = memory_service();
        let record = service
            .create_document(String::new(), String::new())
            .await
            .expect("create");

        let never_written = fixture.path().join("1~ghost.pdf");
        service
            .delete_document(record.id, Some(never_written))
            .await
            .expect("delete");
        assert!(service.get_document(record.id).expect("get").is_none());
    }

    #[tokio::test]
    async fn delete_keeps_record_but_persists_cleanup_on_file_error() {
        let fixture = TestFixtureRoot::new_unique("service-delete-hard");
        let service = memory_service();
        let record = service
            .create_document(String::new(), String::new())
            .await
            .expect("create");
        service
            .add_tag(record.id, "dept".to_string(), "finance".to_string(), true)
            .await
            .expect("tag");

        // remove_file on a directory fails with something other than NotFound.
        let dir_path = fixture.path().join("blocker");
        std::fs::create_dir(&dir_path).expect("create dir");

        let result = service.delete_document(record.id, Some(dir_path)).await;
        assert!(matches!(result, Err(CatalogError::FileError(_))));

        // Metadata cleanup is committed; the record itself stays for a retry.
        assert!(service.get_document(record.id).expect("get").is_some());
        assert!(service.tags_for_document(record.id).expect("tags").is_empty());
    }

    #[tokio::test]
    async fn linking_requires_registered_pages() {
        let service = memory_service();
        let record = service
            .create_document(String::new(), String::new())
            .await
            .expect("create");
        let result = service
            .link_pages(record.id, vec!["ghost".to_string()])
            .await;
        assert!(matches!(result, Err(CatalogError::PageNotFound(_))));
    }

    #[tokio::test]
    async fn page_delete_severs_links_but_not_documents() {
        let service = memory_service();
        let record = service
            .create_document(String::new(), String::new())
            .await
            .expect("create");
        service
            .upsert_page("intro".to_string(), None, VisibilityRule::Public)
            .await
            .expect("page");
        service
            .link_pages(record.id, vec!["intro".to_string()])
            .await
            .expect("link");

        service.delete_page("intro".to_string()).await.expect("delete page");
        assert!(service.pages_for_document(record.id).expect("pages").is_empty());
        assert!(service.get_document(record.id).expect("get").is_some());

        let again = service.delete_page("intro".to_string()).await;
        assert!(matches!(again, Err(CatalogError::PageNotFound(_))));
    }

    #[tokio::test]
    async fn upsert_page_rejects_blank_ids() {
        let service = memory_service();
        let result = service
            .upsert_page("   ".to_string(), None, VisibilityRule::Public)
            .await;
        assert!(matches!(result, Err(CatalogError::InvalidInput(_))));
    }
}
