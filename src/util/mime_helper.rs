// This file is part of the product DocRack.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use log::debug;
use std::path::Path;
use std::process::Command;
use std::sync::OnceLock;

/// How many leading bytes of a file the content sniff wants to see.
pub const SNIFF_BUFFER_SIZE: usize = 8192;

/// Detect a MIME type for a stored file. Priority order: content sniffing
/// over the leading bytes, the host's `file` tool when enabled and present,
/// extension mapping, octet-stream.
pub fn detect_mime_type(file_path: &Path, file_content: &[u8], use_file_tool: bool) -> String {
    if let Some(mime_type) = infer::get(file_content) {
        return mime_type.mime_type().to_string();
    }

    if use_file_tool
        && file_tool_available()
        && let Some(mime_type) = run_file_tool(file_path)
    {
        return mime_type;
    }

    let mime_guess = mime_guess::from_path(file_path);
    if let Some(mime_type) = mime_guess.first() {
        return mime_type.to_string();
    }

    "application/octet-stream".to_string()
}

/// HTML responses are rendered inline; everything else gets an attachment
/// disposition.
pub fn is_html_mime(mime_type: &str) -> bool {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or(mime_type)
        .trim()
        .to_ascii_lowercase();
    essence == "text/html" || essence == "application/xhtml+xml"
}

/// One-time probe for a usable `file` binary on the PATH.
fn file_tool_available() -> bool {
    static AVAILABLE: OnceLock<bool> = OnceLock::new();
    *AVAILABLE.get_or_init(|| {
        let available = Command::new("file")
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false);
        if !available {
            debug!("External 'file' tool not found; skipping that detection rung");
        }
        available
    })
}

fn run_file_tool(file_path: &Path) -> Option<String> {
    let output = Command::new("file")
        .arg("--brief")
        .arg("--mime-type")
        .arg(file_path)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let mime = String::from_utf8_lossy(&output.stdout).trim().to_string();
    // "inode/x-empty" and friends are not useful to clients.
    if mime.contains('/') && !mime.starts_with("inode/") {
        Some(mime)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn sniffs_pdf_magic_bytes() {
        let mime = detect_mime_type(&PathBuf::from("mislabeled.txt"), b"%PDF-1.4 rest", false);
        assert_eq!(mime, "application/pdf");
    }

    #[test]
    fn falls_back_to_extension_for_unsniffable_content() {
        let mime = detect_mime_type(&PathBuf::from("page.html"), b"plain words", false);
        assert_eq!(mime, "text/html");
    }

    #[test]
    fn defaults_to_octet_stream() {
        let mime = detect_mime_type(&PathBuf::from("mystery.zzz"), b"plain words", false);
        assert_eq!(mime, "application/octet-stream");
    }

    #[test]
    fn html_detection_ignores_parameters_and_case() {
        assert!(is_html_mime("text/html"));
        assert!(is_html_mime("Text/HTML; charset=utf-8"));
        assert!(is_html_mime("application/xhtml+xml"));
        assert!(!is_html_mime("application/pdf"));
        assert!(!is_html_mime("text/plain"));
    }
}
