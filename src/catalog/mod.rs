// This file is part of the product DocRack.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

pub(crate) mod pages;
mod service;
mod store;
pub(crate) mod tags;
pub(crate) mod types;

pub use service::CatalogService;
pub use store::{CatalogStore, FileCatalogStore};
#[cfg(test)]
pub use store::MemoryCatalogStore;
pub use types::{
    CatalogData, CatalogError, DocumentRecord, PageRecord, TagRow, VisibilityRule,
};
