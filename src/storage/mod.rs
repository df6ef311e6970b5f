// This file is part of the product DocRack.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

pub mod engine;
pub mod layout;

pub use engine::{AuditReport, MissingFile, StorageEngine, StorageError};
pub use layout::{DocumentId, FilenameError, StorageLocation};
