// This file is part of the product DocRack.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::fs;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const PID_FILE_NAME: &str = "docrack.pid";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PidFileStatus {
    Missing,
    Stale { pid: Option<u32> },
    Running { pid: u32 },
}

/// Removes the pid file when the owning process winds down.
#[derive(Debug)]
pub struct PidFileGuard {
    path: PathBuf,
}

impl Drop for PidFileGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

pub fn pid_file_path(runtime_root: &Path) -> PathBuf {
    runtime_root.join(PID_FILE_NAME)
}

pub fn check_pid_file(path: &Path) -> io::Result<PidFileStatus> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Ok(PidFileStatus::Missing);
        }
        Err(err) => return Err(err),
    };

    let parsed_pid = contents.trim().parse::<u32>().ok().filter(|pid| *pid > 0);
    let pid = match parsed_pid {
        Some(pid) => pid,
        None => return Ok(PidFileStatus::Stale { pid: None }),
    };

    if is_pid_running(pid)? {
        Ok(PidFileStatus::Running { pid })
    } else {
        Ok(PidFileStatus::Stale { pid: Some(pid) })
    }
}

pub fn cleanup_stale_pid_file(path: &Path) -> io::Result<PidFileStatus> {
    let status = check_pid_file(path)?;
    if matches!(status, PidFileStatus::Stale { .. })
        && let Err(err) = fs::remove_file(path)
        && err.kind() != io::ErrorKind::NotFound
    {
        return Err(err);
    }
    Ok(status)
}

/// Claim the pid file. An existing file belonging to a live process is an
/// error; a stale one is removed and the claim retried once.
pub fn create_pid_file(path: &Path) -> io::Result<PidFileGuard> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let contents = format!("{}\n", std::process::id());

    for _ in 0..2 {
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
        {
            Ok(mut file) => {
                file.write_all(contents.as_bytes())?;
                return Ok(PidFileGuard {
                    path: path.to_path_buf(),
                });
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => match check_pid_file(path)? {
                PidFileStatus::Running { pid } => {
                    return Err(io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!("pid file already exists for running process {}", pid),
                    ));
                }
                PidFileStatus::Stale { .. } => {
                    if let Err(err) = fs::remove_file(path)
                        && err.kind() != io::ErrorKind::NotFound
                    {
                        return Err(err);
                    }
                }
                PidFileStatus::Missing => {}
            },
            Err(err) => return Err(err),
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        "pid file already exists",
    ))
}

// kill(pid, 0) probes for existence without signaling. EPERM means the
// process exists but belongs to someone else.
#[cfg(unix)]
fn is_pid_running(pid: u32) -> io::Result<bool> {
    let result = unsafe { libc::kill(pid as libc::pid_t, 0) };
    if result == 0 {
        return Ok(true);
    }

    let err = io::Error::last_os_error();
    match err.raw_os_error() {
        Some(libc::ESRCH) => Ok(false),
        Some(libc::EPERM) => Ok(true),
        _ => Err(err),
    }
}

#[cfg(not(unix))]
fn is_pid_running(_pid: u32) -> io::Result<bool> {
    Ok(false)
}
