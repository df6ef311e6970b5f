// This file is part of the product DocRack.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::{BootstrapError, log_action};
use crate::runtime_paths::RuntimePaths;
use std::fs;
use std::io;
use std::path::Path;

pub fn ensure_paths(root: &Path) -> Result<RuntimePaths, BootstrapError> {
    ensure_dir(&root.join("documents"))?;
    ensure_dir(&root.join("state"))?;
    ensure_dir(&root.join("logs"))?;

    RuntimePaths::from_root(root).map_err(BootstrapError::Config)
}

fn ensure_dir(path: &Path) -> Result<(), BootstrapError> {
    if path.exists() {
        if !path.is_dir() {
            return Err(BootstrapError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Path is not a directory: {}", path.display()),
            )));
        }
        return Ok(());
    }

    fs::create_dir_all(path)?;
    log_action(format!("created directory {}", path.display()));
    Ok(())
}
