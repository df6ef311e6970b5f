// This file is part of the product DocRack.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const TEMP_NAME_ATTEMPTS: u32 = 100;

#[derive(Debug)]
pub struct YamlStoreError {
    message: String,
}

impl YamlStoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for YamlStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for YamlStoreError {}

/// Load a YAML file into `T`. A missing or blank file is `None`, not an
/// error, so first runs and wiped state behave the same.
pub fn read_yaml_file<T: DeserializeOwned>(
    target: &Path,
    label: &str,
) -> Result<Option<T>, YamlStoreError> {
    if !target.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(target)
        .map_err(|err| YamlStoreError::new(format!("Could not read {} file: {}", label, err)))?;
    if raw.trim().is_empty() {
        return Ok(None);
    }
    let decoded = serde_yaml::from_str(&raw)
        .map_err(|err| YamlStoreError::new(format!("Could not parse {} file: {}", label, err)))?;
    Ok(Some(decoded))
}

/// Replace `target` atomically: serialize, write a uniquely named temp
/// sibling, fsync, rename over the target. Readers never observe a partial
/// file; a crash leaves at worst a stray temp file.
pub fn write_yaml_file<T: Serialize>(
    target: &Path,
    label: &str,
    value: &T,
) -> Result<(), YamlStoreError> {
    let serialized = serde_yaml::to_string(value)
        .map_err(|err| YamlStoreError::new(format!("Could not serialize {}: {}", label, err)))?;
    let parent = target
        .parent()
        .ok_or_else(|| YamlStoreError::new(format!("{} path has no parent directory", label)))?;
    let target_name = target
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| YamlStoreError::new(format!("{} path has no usable file name", label)))?;

    let (mut temp_file, temp_path) = open_unique_temp(parent, target_name, label)?;

    // Keep the permissions of an already-existing target across the rename.
    #[cfg(unix)]
    if let Ok(metadata) = fs::metadata(target)
        && let Err(err) = fs::set_permissions(&temp_path, metadata.permissions())
    {
        let _ = fs::remove_file(&temp_path);
        return Err(YamlStoreError::new(format!(
            "Could not carry {} file permissions to temp file: {}",
            label, err
        )));
    }

    if let Err(err) = temp_file.write_all(serialized.as_bytes()) {
        let _ = fs::remove_file(&temp_path);
        return Err(YamlStoreError::new(format!(
            "Could not write {} temp file: {}",
            label, err
        )));
    }
    if let Err(err) = temp_file.sync_all() {
        let _ = fs::remove_file(&temp_path);
        return Err(YamlStoreError::new(format!(
            "Could not sync {} temp file: {}",
            label, err
        )));
    }
    if let Err(err) = fs::rename(&temp_path, target) {
        let _ = fs::remove_file(&temp_path);
        return Err(YamlStoreError::new(format!(
            "Could not move {} temp file into place: {}",
            label, err
        )));
    }

    // Rename durability needs the directory entry flushed too.
    #[cfg(unix)]
    if let Err(err) = fs::File::open(parent).and_then(|dir| dir.sync_all()) {
        log::warn!("Directory sync after writing {} file failed: {}", label, err);
    }

    Ok(())
}

fn open_unique_temp(
    parent: &Path,
    target_name: &str,
    label: &str,
) -> Result<(fs::File, PathBuf), YamlStoreError> {
    for attempt in 0..TEMP_NAME_ATTEMPTS {
        let temp_path = parent.join(format!(
            ".{}.tmp.{}.{}",
            target_name,
            std::process::id(),
            attempt
        ));
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
        {
            Ok(file) => return Ok((file, temp_path)),
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(err) => {
                return Err(YamlStoreError::new(format!(
                    "Could not create {} temp file: {}",
                    label, err
                )));
            }
        }
    }
    Err(YamlStoreError::new(format!(
        "Could not find a free {} temp file name",
        label
    )))
}
