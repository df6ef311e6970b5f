// This file is part of the product DocRack.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::{BootstrapError, log_action};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use openssl::rand::rand_bytes;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

const DEFAULT_PORT: u16 = 7180;
const DEFAULT_WORKERS: u16 = 4;
const ADMIN_TOKEN_BYTES: usize = 32;

pub fn ensure_config(root: &Path) -> Result<bool, BootstrapError> {
    let config_path = root.join("config.yaml");

    if config_path.exists() {
        return Ok(false);
    }

    let admin_token = generate_admin_token()?;
    let contents = default_config_yaml(&admin_token);

    // create_new so two racing first starts cannot both claim authorship.
    let mut file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&config_path)
    {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(err) => return Err(BootstrapError::Io(err)),
    };

    file.write_all(contents.as_bytes())?;
    file.sync_all()?;

    log_action(format!(
        "created config.yaml with a fresh admin API token (listening on 127.0.0.1:{})",
        DEFAULT_PORT
    ));

    Ok(true)
}

fn generate_admin_token() -> Result<String, BootstrapError> {
    let mut bytes = [0u8; ADMIN_TOKEN_BYTES];
    rand_bytes(&mut bytes).map_err(|err| {
        BootstrapError::Io(io::Error::other(format!(
            "Failed to generate admin API token: {}",
            err
        )))
    })?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

fn default_config_yaml(admin_token: &str) -> String {
    format!(
        "server:\n  host: \"127.0.0.1\"\n  port: {port}\n  workers: {workers}\n\napp:\n  name: \"DocRack\"\n  description: \"Self-hosted document storage and page-gated delivery\"\n\nlogging:\n  level: \"info\"\n  rotation:\n    max_size_mb: 16\n    max_files: 5\n\ndownload:\n  unlinked_documents: \"allow\"\n  mask_forbidden: true\n  use_file_tool: false\n  roles_header: \"x-docrack-roles\"\n\nupload:\n  max_file_size_mb: 512\n\nadmin_api:\n  enabled: true\n  token: \"{admin_token}\"\n",
        port = DEFAULT_PORT,
        workers = DEFAULT_WORKERS,
        admin_token = admin_token,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_parses_and_carries_the_token() {
        let yaml = default_config_yaml("token-under-test");
        let config: crate::config::Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.server.port, 7180);
        assert_eq!(config.admin_api.token, "token-under-test");
        assert!(config.admin_api.enabled);
    }

    #[test]
    fn generated_tokens_are_url_safe() {
        let token = generate_admin_token().unwrap();
        assert!(!token.is_empty());
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }
}
