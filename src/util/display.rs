// This file is part of the product DocRack.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

/// Human-facing file type label for a filename extension, for admin
/// listings. Unknown extensions are echoed back unchanged. Serving uses the
/// MIME detection chain instead; this table is display only.
pub fn file_type_label(extension: &str) -> String {
    let ext = extension.trim_start_matches('.').to_ascii_lowercase();
    let label = match ext.as_str() {
        "gif" => "GIF image - good for diagrams",
        "jpg" | "jpeg" => "JPEG image - good for photos",
        "png" => "PNG image - good general-purpose format",
        "ico" => "Icon image",
        "tiff" => "Tagged image format",
        "doc" => "Word document",
        "xls" => "Excel spreadsheet",
        "zip" => "ZIP compressed file",
        "gz" => "GZIP compressed file",
        "dmg" => "Apple disk image",
        "pdf" => "Adobe Acrobat PDF file",
        "mp3" => "MP3 audio file",
        "wav" => "WAV audio file",
        "avi" => "AVI video file",
        "mpg" | "mpeg" => "MPEG video file",
        "js" => "Javascript file",
        "css" => "CSS file",
        "html" | "htm" => "HTML file",
        _ => return ext,
    };
    label.to_string()
}

pub fn extension_of(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext,
        _ => "",
    }
}

pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let value = bytes as f64;
    if value >= GB {
        format!("{:.2} GB", value / GB)
    } else if value >= MB {
        format!("{:.2} MB", value / MB)
    } else if value >= KB {
        format!("{:.2} KB", value / KB)
    } else if bytes == 1 {
        "1 byte".to_string()
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions_get_labels() {
        assert_eq!(file_type_label("pdf"), "Adobe Acrobat PDF file");
        assert_eq!(file_type_label("JPG"), "JPEG image - good for photos");
        assert_eq!(file_type_label("htm"), "HTML file");
    }

    #[test]
    fn unknown_extensions_echo_back() {
        assert_eq!(file_type_label("xyz"), "xyz");
        assert_eq!(file_type_label(".XYZ"), "xyz");
    }

    #[test]
    fn extension_of_handles_dotfiles_and_plain_names() {
        assert_eq!(extension_of("report.pdf"), "pdf");
        assert_eq!(extension_of("archive.tar.gz"), "gz");
        assert_eq!(extension_of("README"), "");
        assert_eq!(extension_of(".hidden"), "");
    }

    #[test]
    fn sizes_scale_through_units() {
        assert_eq!(format_size(0), "0 bytes");
        assert_eq!(format_size(1), "1 byte");
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.00 GB");
    }
}
