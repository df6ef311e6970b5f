// This file is part of the product DocRack.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![allow(unused_imports)]
pub mod daemon;
pub mod display;
pub mod log_rotation;
pub mod mime_helper;
pub mod pid_file;
pub mod test_config;
pub mod test_fixtures;
pub mod upload_temp;
pub mod yaml_store;

// Re-export commonly used items for convenience
pub use daemon::daemonize_or_warn;
pub use display::{extension_of, file_type_label, format_size};
pub use mime_helper::{detect_mime_type, is_html_mime};
pub use test_config::{TestConfigBuilder, test_config};
pub use upload_temp::{
    TEMP_UPLOAD_PREFIX, TEMP_UPLOAD_SUFFIXES, is_temp_upload_name, temp_upload_path,
};
pub use yaml_store::{YamlStoreError, read_yaml_file, write_yaml_file};
