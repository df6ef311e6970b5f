// This file is part of the product DocRack.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![allow(dead_code)]

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use docrack::api;
use docrack::app_state::AppState;
use docrack::catalog::{CatalogService, FileCatalogStore, VisibilityRule};
use docrack::config::ValidatedConfig;
use docrack::runtime_paths::RuntimePaths;
use docrack::serve;
use docrack::storage::DocumentId;
use docrack::util::test_config::TEST_ADMIN_TOKEN;
use docrack::util::test_fixtures::TestFixtureRoot;
use std::fs;
use std::sync::Arc;

pub use docrack::api::API_TOKEN_HEADER;
pub use docrack::util::test_config::TestConfigBuilder;

/// Real file-backed components over a disposable runtime root, the same wiring
/// the server does at startup minus the listener.
pub struct TestHarness {
    pub fixture: TestFixtureRoot,
    pub config: Arc<ValidatedConfig>,
    pub runtime_paths: RuntimePaths,
    pub app_state: Arc<AppState>,
}

#[derive(Clone)]
pub struct AppBundle {
    pub config: Arc<ValidatedConfig>,
    pub app_state: Arc<AppState>,
}

impl TestHarness {
    pub async fn new() -> Self {
        Self::with_config(TestConfigBuilder::new().build()).await
    }

    pub async fn with_config(config: ValidatedConfig) -> Self {
        let fixture = TestFixtureRoot::new_unique("it-harness");
        let runtime_paths = fixture.runtime_paths();

        let store =
            FileCatalogStore::new(runtime_paths.catalog_file.clone()).expect("catalog store");
        let catalog = CatalogService::new(Arc::new(store)).expect("catalog service");
        let app_state = Arc::new(AppState::new(runtime_paths.clone(), catalog));

        Self {
            fixture,
            config: Arc::new(config),
            runtime_paths,
            app_state,
        }
    }

    pub fn app_bundle(&self) -> AppBundle {
        AppBundle {
            config: self.config.clone(),
            app_state: self.app_state.clone(),
        }
    }

    /// Create a document record and store `content` as its file.
    pub async fn seed_document(&self, title: &str, basename: &str, content: &[u8]) -> DocumentId {
        let record = self
            .app_state
            .catalog
            .create_document(title.to_string(), String::new())
            .await
            .expect("create document");
        let source = self.write_source_file(basename, content);
        self.app_state
            .engine
            .store(record.id, &source, basename)
            .await
            .expect("store file");
        fs::remove_file(&source).expect("remove source file");
        record.id
    }

    /// Register a page and link the document to it.
    pub async fn link_to_page(&self, id: DocumentId, page_id: &str, visibility: VisibilityRule) {
        self.app_state
            .catalog
            .upsert_page(page_id.to_string(), None, visibility)
            .await
            .expect("upsert page");
        self.app_state
            .catalog
            .link_pages(id, vec![page_id.to_string()])
            .await
            .expect("link page");
    }

    fn write_source_file(&self, basename: &str, content: &[u8]) -> std::path::PathBuf {
        let source = self.fixture.path().join(format!("seed-{}", basename));
        fs::write(&source, content).expect("write source file");
        source
    }
}

pub fn build_test_app(
    bundle: AppBundle,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let config_for_app = bundle.config.clone();
    let config_for_api = bundle.config.clone();

    App::new()
        .app_data(web::Data::from(config_for_app))
        .app_data(web::Data::from(bundle.app_state))
        .configure(move |cfg| api::configure(cfg, &config_for_api))
        .configure(serve::configure)
}

/// Attach the admin API token the test config carries.
pub fn with_api_token(req: actix_web::test::TestRequest) -> actix_web::test::TestRequest {
    req.insert_header((API_TOKEN_HEADER, TEST_ADMIN_TOKEN))
}
