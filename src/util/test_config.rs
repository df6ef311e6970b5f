// This file is part of the product DocRack.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![allow(dead_code)]

use crate::config::{
    AdminApiConfig, AppConfig, DownloadConfig, LoggingConfig, LoggingRotationConfig, ServerConfig,
    UnlinkedDocumentsPolicy, UploadConfig, ValidatedConfig,
};

pub const TEST_ADMIN_TOKEN: &str = "test-admin-token-0123456789";

#[derive(Debug, Clone)]
pub struct TestConfigBuilder {
    config: ValidatedConfig,
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ValidatedConfig {
                server: ServerConfig {
                    host: "127.0.0.1".to_string(),
                    port: 7180,
                    workers: 1,
                },
                app: AppConfig {
                    name: "Test DocRack".to_string(),
                    description: "Test Description".to_string(),
                },
                logging: LoggingConfig {
                    level: "info".to_string(),
                    rotation: LoggingRotationConfig::default(),
                },
                download: DownloadConfig {
                    unlinked_documents: UnlinkedDocumentsPolicy::Allow,
                    mask_forbidden: true,
                    use_file_tool: false,
                    roles_header: "x-docrack-roles".to_string(),
                },
                upload: UploadConfig {
                    max_file_size_mb: 100,
                },
                admin_api: AdminApiConfig {
                    enabled: true,
                    token: TEST_ADMIN_TOKEN.to_string(),
                },
            },
        }
    }

    pub fn with_unlinked_documents(mut self, policy: UnlinkedDocumentsPolicy) -> Self {
        self.config.download.unlinked_documents = policy;
        self
    }

    pub fn with_mask_forbidden(mut self, mask_forbidden: bool) -> Self {
        self.config.download.mask_forbidden = mask_forbidden;
        self
    }

    pub fn with_roles_header(mut self, header: &str) -> Self {
        self.config.download.roles_header = header.to_ascii_lowercase();
        self
    }

    pub fn with_admin_api_enabled(mut self, enabled: bool) -> Self {
        self.config.admin_api.enabled = enabled;
        self
    }

    pub fn with_max_file_size_mb(mut self, max_file_size_mb: u64) -> Self {
        self.config.upload.max_file_size_mb = max_file_size_mb;
        self
    }

    pub fn build(self) -> ValidatedConfig {
        self.config
    }
}

pub fn test_config() -> ValidatedConfig {
    TestConfigBuilder::new().build()
}
