// This file is part of the product DocRack.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Page directory and the document/page link table. Like the tag functions,
//! everything here runs inside the catalog writer task.

use crate::catalog::types::{CatalogData, CatalogError, PageLink, PageRecord, VisibilityRule};
use crate::storage::layout::DocumentId;

/// Register a page or replace its title and visibility rule.
pub fn upsert_page(
    data: &mut CatalogData,
    page_id: &str,
    title: Option<String>,
    visibility: VisibilityRule,
) {
    data.pages
        .insert(page_id.to_string(), PageRecord { title, visibility });
}

/// Remove a page from the directory and sever every link pointing at it, so
/// no document is left referencing a page without a visibility rule.
pub fn delete_page(data: &mut CatalogData, page_id: &str) -> bool {
    let existed = data.pages.remove(page_id).is_some();
    if existed {
        data.page_links.retain(|link| link.page_id != page_id);
    }
    existed
}

/// Link a document to every page in `pages`. All pages must already be
/// registered; an unknown page fails the whole call before any edge is
/// written. Existing links are kept as they are, so the call is idempotent.
pub fn link_pages(
    data: &mut CatalogData,
    id: DocumentId,
    pages: &[String],
) -> Result<usize, CatalogError> {
    for page_id in pages {
        if !data.pages.contains_key(page_id) {
            return Err(CatalogError::PageNotFound(page_id.clone()));
        }
    }

    let mut added = 0;
    for page_id in pages {
        let already = data
            .page_links
            .iter()
            .any(|link| link.document_id == id && link.page_id == *page_id);
        if !already {
            data.page_links.push(PageLink {
                document_id: id,
                page_id: page_id.clone(),
            });
            added += 1;
        }
    }
    Ok(added)
}

/// Drop one link. Absent links are a no-op.
pub fn unlink_page(data: &mut CatalogData, id: DocumentId, page_id: &str) -> bool {
    let before = data.page_links.len();
    data.page_links
        .retain(|link| !(link.document_id == id && link.page_id == page_id));
    data.page_links.len() < before
}

/// Drop every link of a document. Used by the delete cascade.
pub fn unlink_all(data: &mut CatalogData, id: DocumentId) -> usize {
    let before = data.page_links.len();
    data.page_links.retain(|link| link.document_id != id);
    before - data.page_links.len()
}

/// Page ids a document is linked to, in link order.
pub fn pages_for_document(data: &CatalogData, id: DocumentId) -> Vec<String> {
    data.page_links
        .iter()
        .filter(|link| link.document_id == id)
        .map(|link| link.page_id.clone())
        .collect()
}
