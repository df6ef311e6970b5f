// This file is part of the product DocRack.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug)]
pub enum ConfigError {
    LoadError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::LoadError(msg) => write!(f, "Configuration load error: {}", msg),
            ConfigError::ValidationError(msg) => {
                write!(f, "Configuration validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

pub const VALID_LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: default_workers(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    7180
}

fn default_workers() -> usize {
    4
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_app_description")]
    pub description: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            description: default_app_description(),
        }
    }
}

fn default_app_name() -> String {
    "DocRack".to_string()
}

fn default_app_description() -> String {
    "Document storage and delivery".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingRotationConfig {
    #[serde(default = "default_log_rotation_max_size_mb")]
    pub max_size_mb: u64,
    #[serde(default = "default_log_rotation_max_files")]
    pub max_files: u32,
}

impl Default for LoggingRotationConfig {
    fn default() -> Self {
        Self {
            max_size_mb: default_log_rotation_max_size_mb(),
            max_files: default_log_rotation_max_files(),
        }
    }
}

fn default_log_rotation_max_size_mb() -> u64 {
    16
}

fn default_log_rotation_max_files() -> u32 {
    5
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub rotation: LoggingRotationConfig,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            rotation: LoggingRotationConfig::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// What to do with a document that has no page association at all.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UnlinkedDocumentsPolicy {
    Allow,
    Deny,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DownloadConfig {
    #[serde(default = "default_unlinked_documents")]
    pub unlinked_documents: UnlinkedDocumentsPolicy,
    /// Denied downloads answer with the same 404 a missing document gets,
    /// so probing cannot distinguish "exists but restricted" from "absent".
    #[serde(default = "default_mask_forbidden")]
    pub mask_forbidden: bool,
    #[serde(default = "default_use_file_tool")]
    pub use_file_tool: bool,
    #[serde(default = "default_roles_header")]
    pub roles_header: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            unlinked_documents: default_unlinked_documents(),
            mask_forbidden: default_mask_forbidden(),
            use_file_tool: default_use_file_tool(),
            roles_header: default_roles_header(),
        }
    }
}

fn default_unlinked_documents() -> UnlinkedDocumentsPolicy {
    UnlinkedDocumentsPolicy::Allow
}

fn default_mask_forbidden() -> bool {
    true
}

fn default_use_file_tool() -> bool {
    false
}

fn default_roles_header() -> String {
    "x-docrack-roles".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UploadConfig {
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: default_max_file_size_mb(),
        }
    }
}

fn default_max_file_size_mb() -> u64 {
    512
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AdminApiConfig {
    #[serde(default = "default_admin_api_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub token: String,
}

impl Default for AdminApiConfig {
    fn default() -> Self {
        Self {
            enabled: default_admin_api_enabled(),
            token: String::new(),
        }
    }
}

fn default_admin_api_enabled() -> bool {
    true
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub admin_api: AdminApiConfig,
}

#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub server: ServerConfig,
    pub app: AppConfig,
    pub logging: LoggingConfig,
    pub download: DownloadConfig,
    pub upload: UploadConfig,
    pub admin_api: AdminApiConfig,
}

impl Config {
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let config_path = root.join("config.yaml");
        let config_content = fs::read_to_string(&config_path).map_err(|e| {
            ConfigError::LoadError(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        let raw_config: serde_yaml::Value = serde_yaml::from_str(&config_content).map_err(|e| {
            ConfigError::LoadError(format!(
                "Failed to parse config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        if let serde_yaml::Value::Mapping(mapping) = &raw_config {
            let tls_key = serde_yaml::Value::String("tls".to_string());
            if mapping.contains_key(&tls_key) {
                return Err(ConfigError::LoadError(
                    "Unsupported config section 'tls'; run DocRack behind a TLS-terminating proxy"
                        .to_string(),
                ));
            }
        }
        let config: Config = serde_yaml::from_value(raw_config).map_err(|e| {
            ConfigError::LoadError(format!(
                "Failed to parse config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        Ok(config)
    }

    /// Loads and validates configuration at startup. If validation fails, the application should not start.
    pub fn load_and_validate(root: &Path) -> Result<ValidatedConfig, ConfigError> {
        let mut config = Self::load(root)?;

        Self::validate_server(&config.server)?;
        Self::validate_logging(&config.logging)?;
        Self::validate_upload(&config.upload)?;
        Self::validate_admin_api(&config.admin_api)?;
        config.download.roles_header = Self::validate_roles_header(&config.download.roles_header)?;

        Ok(ValidatedConfig {
            server: config.server,
            app: config.app,
            logging: config.logging,
            download: config.download,
            upload: config.upload,
            admin_api: config.admin_api,
        })
    }

    fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
        if server.host.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "server.host cannot be empty".to_string(),
            ));
        }
        if server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be greater than 0".to_string(),
            ));
        }
        if !(1..=512).contains(&server.workers) {
            return Err(ConfigError::ValidationError(format!(
                "server.workers must be between 1 and 512, got: {}",
                server.workers
            )));
        }
        Ok(())
    }

    fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&logging.level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of {}, got: '{}'",
                VALID_LOG_LEVELS.join(", "),
                logging.level
            )));
        }

        let max_size_mb = logging.rotation.max_size_mb;
        if !(1..=1024).contains(&max_size_mb) {
            return Err(ConfigError::ValidationError(format!(
                "Logging rotation max_size_mb must be between 1 and 1024, got: {}",
                max_size_mb
            )));
        }

        let max_files = logging.rotation.max_files;
        if !(1..=100).contains(&max_files) {
            return Err(ConfigError::ValidationError(format!(
                "Logging rotation max_files must be between 1 and 100, got: {}",
                max_files
            )));
        }

        Ok(())
    }

    fn validate_upload(upload: &UploadConfig) -> Result<(), ConfigError> {
        if !(1..=10240).contains(&upload.max_file_size_mb) {
            return Err(ConfigError::ValidationError(format!(
                "upload.max_file_size_mb must be between 1 and 10240, got: {}",
                upload.max_file_size_mb
            )));
        }
        Ok(())
    }

    fn validate_admin_api(admin_api: &AdminApiConfig) -> Result<(), ConfigError> {
        if admin_api.enabled && admin_api.token.trim().len() < 16 {
            return Err(ConfigError::ValidationError(
                "admin_api.token must be at least 16 characters while admin_api.enabled is true"
                    .to_string(),
            ));
        }
        Ok(())
    }

    fn validate_roles_header(raw: &str) -> Result<String, ConfigError> {
        let header = raw.trim().to_ascii_lowercase();
        if header.is_empty() {
            return Err(ConfigError::ValidationError(
                "download.roles_header cannot be empty".to_string(),
            ));
        }
        if !header
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
        {
            return Err(ConfigError::ValidationError(format!(
                "download.roles_header must be a plain header name, got: '{}'",
                raw
            )));
        }
        Ok(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_fixtures::TestFixtureRoot;

    fn write_config(fixture: &TestFixtureRoot, content: &str) {
        fs::write(fixture.path().join("config.yaml"), content).unwrap();
    }

    #[test]
    fn empty_mapping_deserializes_to_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 7180);
        assert_eq!(config.server.workers, 4);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.rotation.max_size_mb, 16);
        assert_eq!(config.logging.rotation.max_files, 5);
        assert_eq!(
            config.download.unlinked_documents,
            UnlinkedDocumentsPolicy::Allow
        );
        assert!(config.download.mask_forbidden);
        assert!(!config.download.use_file_tool);
        assert_eq!(config.download.roles_header, "x-docrack-roles");
        assert_eq!(config.upload.max_file_size_mb, 512);
        assert!(config.admin_api.enabled);
        assert!(config.admin_api.token.is_empty());
    }

    #[test]
    fn validate_server_rejects_bad_values() {
        let mut server = ServerConfig::default();
        server.host = "  ".to_string();
        assert!(Config::validate_server(&server).is_err());

        let mut server = ServerConfig::default();
        server.port = 0;
        assert!(Config::validate_server(&server).is_err());

        let mut server = ServerConfig::default();
        server.workers = 0;
        assert!(Config::validate_server(&server).is_err());

        let mut server = ServerConfig::default();
        server.workers = 513;
        assert!(Config::validate_server(&server).is_err());
    }

    #[test]
    fn validate_logging_rejects_unknown_level() {
        let mut logging = LoggingConfig::default();
        logging.level = "verbose".to_string();
        assert!(Config::validate_logging(&logging).is_err());
    }

    #[test]
    fn validate_logging_rejects_rotation_out_of_range() {
        let mut logging = LoggingConfig::default();
        logging.rotation.max_size_mb = 0;
        assert!(Config::validate_logging(&logging).is_err());

        let mut logging = LoggingConfig::default();
        logging.rotation.max_files = 101;
        assert!(Config::validate_logging(&logging).is_err());
    }

    #[test]
    fn validate_upload_rejects_zero_limit() {
        let upload = UploadConfig {
            max_file_size_mb: 0,
        };
        assert!(Config::validate_upload(&upload).is_err());
    }

    #[test]
    fn validate_admin_api_requires_token_only_when_enabled() {
        let enabled_short = AdminApiConfig {
            enabled: true,
            token: "short".to_string(),
        };
        assert!(Config::validate_admin_api(&enabled_short).is_err());

        let disabled_short = AdminApiConfig {
            enabled: false,
            token: String::new(),
        };
        assert!(Config::validate_admin_api(&disabled_short).is_ok());

        let enabled_long = AdminApiConfig {
            enabled: true,
            token: "0123456789abcdef0123".to_string(),
        };
        assert!(Config::validate_admin_api(&enabled_long).is_ok());
    }

    #[test]
    fn validate_roles_header_normalizes_case() {
        let header = Config::validate_roles_header(" X-DocRack-Roles ").unwrap();
        assert_eq!(header, "x-docrack-roles");
        assert!(Config::validate_roles_header("").is_err());
        assert!(Config::validate_roles_header("bad header").is_err());
    }

    #[test]
    fn load_rejects_tls_section() {
        let fixture = TestFixtureRoot::new_unique("config-tls");
        write_config(&fixture, "tls:\n  mode: self-signed\n");
        let err = Config::load(fixture.path()).expect_err("tls section should be rejected");
        assert!(err.to_string().contains("tls"));
    }

    #[test]
    fn load_and_validate_accepts_generated_style_config() {
        let fixture = TestFixtureRoot::new_unique("config-valid");
        write_config(
            &fixture,
            "server:\n  host: \"127.0.0.1\"\n  port: 7180\n  workers: 2\n\
             logging:\n  level: \"debug\"\n\
             download:\n  unlinked_documents: deny\n  roles_header: \"X-Proxy-Roles\"\n\
             admin_api:\n  enabled: true\n  token: \"0123456789abcdef0123\"\n",
        );
        let validated = Config::load_and_validate(fixture.path()).unwrap();
        assert_eq!(validated.server.workers, 2);
        assert_eq!(validated.logging.level, "debug");
        assert_eq!(
            validated.download.unlinked_documents,
            UnlinkedDocumentsPolicy::Deny
        );
        assert_eq!(validated.download.roles_header, "x-proxy-roles");
        assert!(validated.admin_api.enabled);
    }
}
