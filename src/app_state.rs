// This file is part of the product DocRack.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::sync::Arc;

use crate::catalog::CatalogService;
use crate::runtime_paths::RuntimePaths;
use crate::serve::{PageVisibility, RoleVisibility};
use crate::storage::StorageEngine;

pub struct AppState {
    pub runtime_paths: RuntimePaths,
    pub catalog: CatalogService,
    pub engine: StorageEngine,
    pub visibility: Arc<dyn PageVisibility>,
}

impl AppState {
    pub fn new(runtime_paths: RuntimePaths, catalog: CatalogService) -> Self {
        let engine = StorageEngine::new(runtime_paths.documents_dir.clone(), catalog.clone());
        Self {
            runtime_paths,
            catalog,
            engine,
            visibility: Arc::new(RoleVisibility),
        }
    }
}
