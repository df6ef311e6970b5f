// This file is part of the product DocRack.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::types::{CatalogData, CatalogError};
use crate::util::yaml_store::{read_yaml_file, write_yaml_file};
use std::path::PathBuf;

#[cfg(test)]
use std::sync::{Arc, RwLock};

pub trait CatalogStore: Send + Sync {
    fn load(&self) -> Result<CatalogData, CatalogError>;
    fn save(&self, data: &CatalogData) -> Result<(), CatalogError>;
}

pub struct FileCatalogStore {
    catalog_file: PathBuf,
}

impl FileCatalogStore {
    pub fn new(catalog_file: PathBuf) -> Result<Self, CatalogError> {
        if catalog_file.as_os_str().is_empty() {
            return Err(CatalogError::StoreError(
                "Catalog file path is empty".to_string(),
            ));
        }
        Ok(Self { catalog_file })
    }
}

impl CatalogStore for FileCatalogStore {
    fn load(&self) -> Result<CatalogData, CatalogError> {
        let mut data: CatalogData =
            read_yaml_file(&self.catalog_file, "catalog")?.unwrap_or_default();

        // A hand-edited or truncated counter must never cause id reuse.
        // Heal it from the highest key present and persist the repair.
        let mut healed = false;
        if let Some(max_id) = data.documents.keys().map(|id| id.0).max()
            && data.next_document_id <= max_id
        {
            log::warn!(
                "catalog.yaml next_document_id {} is not past highest document id {}; repairing",
                data.next_document_id,
                max_id
            );
            data.next_document_id = max_id + 1;
            healed = true;
        }
        if let Some(max_row) = data.tag_rows.keys().copied().max()
            && data.next_tag_row_id <= max_row
        {
            log::warn!(
                "catalog.yaml next_tag_row_id {} is not past highest tag row id {}; repairing",
                data.next_tag_row_id,
                max_row
            );
            data.next_tag_row_id = max_row + 1;
            healed = true;
        }
        if healed {
            self.save(&data)?;
        }

        Ok(data)
    }

    fn save(&self, data: &CatalogData) -> Result<(), CatalogError> {
        write_yaml_file(&self.catalog_file, "catalog", data)?;
        Ok(())
    }
}

#[cfg(test)]
pub struct MemoryCatalogStore {
    data: Arc<RwLock<CatalogData>>,
}

#[cfg(test)]
impl MemoryCatalogStore {
    pub fn new(initial: CatalogData) -> Self {
        Self {
            data: Arc::new(RwLock::new(initial)),
        }
    }
}

#[cfg(test)]
impl CatalogStore for MemoryCatalogStore {
    fn load(&self) -> Result<CatalogData, CatalogError> {
        match self.data.read() {
            Ok(guard) => Ok(guard.clone()),
            Err(poisoned) => {
                log::error!("MemoryCatalogStore lock poisoned on read; recovering");
                Ok(poisoned.into_inner().clone())
            }
        }
    }

    fn save(&self, data: &CatalogData) -> Result<(), CatalogError> {
        match self.data.write() {
            Ok(mut guard) => {
                *guard = data.clone();
                Ok(())
            }
            Err(poisoned) => {
                log::error!("MemoryCatalogStore lock poisoned on write; recovering");
                let mut guard = poisoned.into_inner();
                *guard = data.clone();
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::DocumentRecord;
    use crate::storage::layout::DocumentId;
    use crate::util::test_fixtures::TestFixtureRoot;

    fn store_in(fixture: &TestFixtureRoot) -> FileCatalogStore {
        FileCatalogStore::new(fixture.path().join("catalog.yaml")).expect("store")
    }

    #[test]
    fn missing_file_loads_as_empty_catalog() {
        let fixture = TestFixtureRoot::new_unique("catalog-store-empty");
        let data = store_in(&fixture).load().expect("load");
        assert_eq!(data.next_document_id, 1);
        assert_eq!(data.next_tag_row_id, 1);
        assert!(data.documents.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let fixture = TestFixtureRoot::new_unique("catalog-store-roundtrip");
        let store = store_in(&fixture);

        let mut data = CatalogData::default();
        data.next_document_id = 3;
        data.documents.insert(
            DocumentId(2),
            DocumentRecord {
                id: DocumentId(2),
                filename: "2~report.pdf".to_string(),
                folder: "02".to_string(),
                title: "report.pdf".to_string(),
                description: String::new(),
                last_changed: None,
            },
        );
        store.save(&data).expect("save");

        let loaded = store.load().expect("load");
        assert_eq!(loaded.next_document_id, 3);
        let record = loaded.document(DocumentId(2)).expect("record");
        assert_eq!(record.filename, "2~report.pdf");
        assert_eq!(record.folder, "02");
    }

    #[test]
    fn load_repairs_stale_id_counters() {
        let fixture = TestFixtureRoot::new_unique("catalog-store-heal");
        let store = store_in(&fixture);

        let mut data = CatalogData::default();
        data.documents.insert(
            DocumentId(5),
            DocumentRecord {
                id: DocumentId(5),
                filename: String::new(),
                folder: String::new(),
                title: "untitled".to_string(),
                description: String::new(),
                last_changed: None,
            },
        );
        // Deliberately stale counter, as a hand-edited file might have.
        data.next_document_id = 1;
        store.save(&data).expect("save");

        let loaded = store.load().expect("load");
        assert_eq!(loaded.next_document_id, 6);

        // The repair is persisted, not just in memory.
        let reloaded = store.load().expect("reload");
        assert_eq!(reloaded.next_document_id, 6);
    }

    #[cfg(unix)]
    #[test]
    fn save_does_not_modify_existing_file_on_dir_permission_error() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().expect("tempdir");
        let catalog_path = temp.path().join("catalog.yaml");
        std::fs::write(&catalog_path, "next_document_id: 7\n").expect("write catalog");

        let store = FileCatalogStore::new(catalog_path.clone()).expect("store");

        let dir = temp.path();
        let original_permissions = std::fs::metadata(dir)
            .expect("metadata")
            .permissions()
            .mode();
        let read_only = std::fs::Permissions::from_mode(original_permissions & 0o555);
        std::fs::set_permissions(dir, read_only).expect("set read-only");

        let result = store.save(&CatalogData::default());
        assert!(result.is_err());

        let content = std::fs::read_to_string(&catalog_path).expect("read catalog");
        assert_eq!(content, "next_document_id: 7\n");

        let restore = std::fs::Permissions::from_mode(original_permissions);
        std::fs::set_permissions(dir, restore).expect("restore permissions");
    }
}
