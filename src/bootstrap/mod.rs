// This file is part of the product DocRack.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::{Config, ConfigError, ValidatedConfig};
use crate::runtime_paths::RuntimePaths;
use std::error::Error;
use std::fmt;
use std::path::Path;

pub mod config;
pub mod paths;
pub mod root_guard;

#[derive(Debug)]
pub struct BootstrapResult {
    pub validated_config: ValidatedConfig,
    pub runtime_paths: RuntimePaths,
    pub created_config: bool,
}

#[derive(Debug)]
pub enum BootstrapError {
    Config(ConfigError),
    Io(std::io::Error),
}

impl fmt::Display for BootstrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootstrapError::Config(err) => write!(f, "{}", err),
            BootstrapError::Io(err) => write!(f, "Bootstrap I/O error: {}", err),
        }
    }
}

impl Error for BootstrapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BootstrapError::Config(err) => Some(err),
            BootstrapError::Io(err) => Some(err),
        }
    }
}

impl From<ConfigError> for BootstrapError {
    fn from(err: ConfigError) -> Self {
        BootstrapError::Config(err)
    }
}

impl From<std::io::Error> for BootstrapError {
    fn from(err: std::io::Error) -> Self {
        BootstrapError::Io(err)
    }
}

pub fn bootstrap_runtime(root: &Path) -> Result<BootstrapResult, BootstrapError> {
    let root_path = root_guard::ensure_root_is_clean(root)?;

    let created_config = config::ensure_config(&root_path)?;

    let validated_config = Config::load_and_validate(&root_path).map_err(BootstrapError::Config)?;

    let runtime_paths = paths::ensure_paths(&root_path)?;

    Ok(BootstrapResult {
        validated_config,
        runtime_paths,
        created_config,
    })
}

pub(crate) fn log_action(message: impl AsRef<str>) {
    eprintln!("[bootstrap] {}", message.as_ref());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_fixtures::TestFixtureRoot;
    use std::fs;

    #[test]
    fn bootstrap_creates_defaults_when_missing() {
        let fixture = TestFixtureRoot::new_unique("bootstrap-default");
        let result = bootstrap_runtime(fixture.path()).expect("bootstrap should succeed");

        assert!(result.created_config);
        assert_eq!(result.validated_config.server.port, 7180);
        assert_eq!(result.validated_config.app.name, "DocRack");
        assert!(result.validated_config.admin_api.enabled);
        assert!(!result.validated_config.admin_api.token.is_empty());

        assert!(fixture.path().join("config.yaml").is_file());
        assert!(fixture.path().join("documents").is_dir());
        assert!(fixture.path().join("state").is_dir());
        assert!(fixture.path().join("logs").is_dir());
    }

    #[test]
    fn bootstrap_is_idempotent() {
        let fixture = TestFixtureRoot::new_unique("bootstrap-idempotent");
        let first = bootstrap_runtime(fixture.path()).expect("bootstrap should succeed");
        assert!(first.created_config);

        let config_path = fixture.path().join("config.yaml");
        let config_before = fs::read_to_string(&config_path).unwrap();

        let second = bootstrap_runtime(fixture.path()).expect("bootstrap should succeed");
        assert!(!second.created_config);
        assert_eq!(config_before, fs::read_to_string(&config_path).unwrap());
    }

    #[test]
    fn bootstrap_generates_distinct_tokens() {
        let first_root = TestFixtureRoot::new_unique("bootstrap-token-a");
        let second_root = TestFixtureRoot::new_unique("bootstrap-token-b");
        let first = bootstrap_runtime(first_root.path()).expect("bootstrap should succeed");
        let second = bootstrap_runtime(second_root.path()).expect("bootstrap should succeed");
        assert_ne!(
            first.validated_config.admin_api.token,
            second.validated_config.admin_api.token
        );
    }

    #[test]
    fn bootstrap_rejects_unexpected_root_entries() {
        let fixture = TestFixtureRoot::new_unique("bootstrap-unexpected");
        fs::write(fixture.path().join("notes.txt"), "do not use").unwrap();

        let error = bootstrap_runtime(fixture.path()).expect_err("bootstrap should fail");
        let message = error.to_string();
        assert!(message.contains("unexpected entries"));
        assert!(message.contains("notes.txt"));
    }

    #[test]
    fn bootstrap_accepts_prior_runtime_residue() {
        let fixture = TestFixtureRoot::new_unique("bootstrap-residue");
        fs::create_dir_all(fixture.path().join("logs")).unwrap();
        fs::write(fixture.path().join("docrack.pid"), "1234\n").unwrap();

        bootstrap_runtime(fixture.path()).expect("bootstrap should succeed");
    }
}
