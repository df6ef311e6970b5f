// This file is part of the product DocRack.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

pub const DEFAULT_LOG_FILE_NAME: &str = "docrack.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRunMode {
    Foreground,
    Daemon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRotationSettings {
    pub max_size_mb: u64,
    pub max_files: u32,
}

impl LogRotationSettings {
    pub fn max_size_bytes(self) -> u64 {
        self.max_size_mb.saturating_mul(1024 * 1024)
    }
}

/// Size-rotating log file writer. Rotated files carry numeric suffixes,
/// `docrack.log.1` being the newest. Settings are fixed at startup; a
/// shrunken `max_files` from a previous run is pruned during construction.
#[derive(Clone)]
pub struct RotatingLogWriter {
    inner: Arc<Mutex<RotatingLogWriterInner>>,
}

struct RotatingLogWriterInner {
    log_dir: PathBuf,
    base_name: String,
    max_bytes: u64,
    max_files: u32,
    file: fs::File,
    size: u64,
}

impl RotatingLogWriter {
    pub fn new(
        log_dir: PathBuf,
        base_name: impl Into<String>,
        settings: LogRotationSettings,
    ) -> io::Result<Self> {
        let created = !log_dir.exists();
        fs::create_dir_all(&log_dir)?;
        if created {
            ensure_log_dir_permissions(&log_dir)?;
        }
        let base_name = base_name.into();
        let max_files = settings.max_files.max(1);
        prune_rotated_logs(&log_dir, &base_name, max_files)?;
        let (file, size) = open_log_file(&log_dir, &base_name)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(RotatingLogWriterInner {
                log_dir,
                base_name,
                max_bytes: settings.max_size_bytes(),
                max_files,
                file,
                size,
            })),
        })
    }
}

impl Write for RotatingLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.file.flush()
    }
}

impl RotatingLogWriterInner {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.rotate_if_needed(buf.len() as u64)?;
        self.file.write_all(buf)?;
        self.size = self.size.saturating_add(buf.len() as u64);
        Ok(buf.len())
    }

    fn rotate_if_needed(&mut self, incoming: u64) -> io::Result<()> {
        if self.max_bytes == 0 {
            return Ok(());
        }
        if self.size > 0 && self.size.saturating_add(incoming) > self.max_bytes {
            self.rotate()?;
        }
        Ok(())
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        if self.max_files <= 1 {
            let _ = remove_if_exists(&self.log_dir.join(&self.base_name));
            let (file, size) = open_log_file(&self.log_dir, &self.base_name)?;
            self.file = file;
            self.size = size;
            return Ok(());
        }

        let oldest = self.rotated_path(self.max_files);
        let _ = remove_if_exists(&oldest);

        for index in (1..self.max_files).rev() {
            let from = self.rotated_path(index);
            let to = self.rotated_path(index + 1);
            if from.exists() {
                let _ = fs::rename(from, to);
            }
        }

        let base_path = self.log_dir.join(&self.base_name);
        if base_path.exists() {
            let _ = fs::rename(base_path, self.rotated_path(1));
        }

        let (file, size) = open_log_file(&self.log_dir, &self.base_name)?;
        self.file = file;
        self.size = size;
        Ok(())
    }

    fn rotated_path(&self, index: u32) -> PathBuf {
        self.log_dir.join(format!("{}.{}", self.base_name, index))
    }
}

fn prune_rotated_logs(log_dir: &Path, base_name: &str, max_files: u32) -> io::Result<()> {
    if !log_dir.exists() {
        return Ok(());
    }
    for entry in fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = match path.file_name().and_then(|value| value.to_str()) {
            Some(name) => name,
            None => continue,
        };
        if let Some(index) = rotated_index(name, base_name)
            && index >= max_files
        {
            let _ = fs::remove_file(path);
        }
    }
    Ok(())
}

fn open_log_file(log_dir: &Path, base_name: &str) -> io::Result<(fs::File, u64)> {
    let path = log_dir.join(base_name);
    let file = fs::OpenOptions::new().create(true).append(true).open(path)?;
    let size = file.metadata().map(|meta| meta.len()).unwrap_or(0);
    Ok((file, size))
}

fn rotated_index(name: &str, base_name: &str) -> Option<u32> {
    let suffix = name.strip_prefix(base_name)?;
    let suffix = suffix.strip_prefix('.')?;
    if suffix.is_empty() || !suffix.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    suffix.parse::<u32>().ok()
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

fn ensure_log_dir_permissions(path: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        fs::set_permissions(path, fs::Permissions::from_mode(0o750))?;
    }

    #[cfg(not(unix))]
    {
        let _ = path;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_fixtures::TestFixtureRoot;

    fn write_bytes(writer: &mut RotatingLogWriter, total: usize) {
        let chunk = vec![b'a'; 64 * 1024];
        let mut remaining = total;
        while remaining > 0 {
            let to_write = remaining.min(chunk.len());
            writer.write_all(&chunk[..to_write]).unwrap();
            remaining -= to_write;
        }
        writer.flush().unwrap();
    }

    #[test]
    fn rotates_once_past_the_size_limit() {
        let fixture = TestFixtureRoot::new_unique("log-rotate");
        let log_dir = fixture.path().join("logs");
        let settings = LogRotationSettings {
            max_size_mb: 1,
            max_files: 2,
        };
        let mut writer = RotatingLogWriter::new(log_dir.clone(), DEFAULT_LOG_FILE_NAME, settings)
            .expect("writer");

        write_bytes(&mut writer, 512 * 1024);
        write_bytes(&mut writer, 700 * 1024);

        assert!(log_dir.join(DEFAULT_LOG_FILE_NAME).exists());
        assert!(
            log_dir
                .join(format!("{}.1", DEFAULT_LOG_FILE_NAME))
                .exists()
        );
        assert!(
            !log_dir
                .join(format!("{}.2", DEFAULT_LOG_FILE_NAME))
                .exists()
        );
    }

    #[test]
    fn startup_prunes_indices_beyond_max_files() {
        let fixture = TestFixtureRoot::new_unique("log-prune");
        let log_dir = fixture.path().join("logs");
        fs::create_dir_all(&log_dir).unwrap();
        for index in 1..=4 {
            fs::write(
                log_dir.join(format!("{}.{}", DEFAULT_LOG_FILE_NAME, index)),
                "old",
            )
            .unwrap();
        }

        let _writer = RotatingLogWriter::new(
            log_dir.clone(),
            DEFAULT_LOG_FILE_NAME,
            LogRotationSettings {
                max_size_mb: 1,
                max_files: 2,
            },
        )
        .expect("writer");

        assert!(
            log_dir
                .join(format!("{}.1", DEFAULT_LOG_FILE_NAME))
                .exists()
        );
        assert!(
            !log_dir
                .join(format!("{}.2", DEFAULT_LOG_FILE_NAME))
                .exists()
        );
        assert!(
            !log_dir
                .join(format!("{}.3", DEFAULT_LOG_FILE_NAME))
                .exists()
        );
    }
}
