// This file is part of the product DocRack.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::runtime_paths::RuntimePaths;

/// Disposable directory under `target/test-fixtures`. Removed again when the
/// value is dropped, so parallel tests never trip over each other as long as
/// they use `new_unique`.
#[derive(Debug)]
pub struct TestFixtureRoot {
    path: PathBuf,
}

impl TestFixtureRoot {
    pub fn new_fixed(name: &str) -> Self {
        let root = fixtures_root().join(name);
        if root.exists() {
            fs::remove_dir_all(&root).expect("remove stale fixture root");
        }
        fs::create_dir_all(&root).expect("create fixture root");
        Self { path: root }
    }

    pub fn new_unique(prefix: &str) -> Self {
        Self::new_fixed(&format!("{}-{}", prefix, Uuid::new_v4()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn documents_dir(&self) -> PathBuf {
        self.path.join("documents")
    }

    pub fn state_dir(&self) -> PathBuf {
        self.path.join("state")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.path.join("logs")
    }

    pub fn init_runtime_layout(&self) {
        fs::create_dir_all(self.documents_dir()).expect("create documents dir");
        fs::create_dir_all(self.state_dir()).expect("create state dir");
        fs::create_dir_all(self.logs_dir()).expect("create logs dir");
    }

    pub fn runtime_paths(&self) -> RuntimePaths {
        self.init_runtime_layout();
        let root = self.path.canonicalize().expect("canonicalize fixture root");
        let documents_dir = self
            .documents_dir()
            .canonicalize()
            .expect("canonicalize documents dir");
        let state_dir = self
            .state_dir()
            .canonicalize()
            .expect("canonicalize state dir");
        let logs_dir = self.logs_dir().canonicalize().expect("canonicalize logs dir");

        RuntimePaths {
            config_file: root.join("config.yaml"),
            catalog_file: state_dir.join("catalog.yaml"),
            root,
            documents_dir,
            state_dir,
            logs_dir,
        }
    }
}

impl Drop for TestFixtureRoot {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("target")
        .join("test-fixtures")
}
