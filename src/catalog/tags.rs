// This file is part of the product DocRack.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Tag table mutations. All functions work on a borrowed [`CatalogData`] and
//! are called from the catalog writer task only, so a lookup and the edit it
//! decides on are never interleaved with another mutation.

use crate::catalog::types::{CatalogData, TagLink, TagRow};
use crate::storage::layout::DocumentId;

/// Attach a tag to a document.
///
/// Multi-value mode dedupes globally: if any document already carries the
/// identical category/value pair, this document joins the existing row.
/// Single-value mode is scoped to the document: the oldest row of the same
/// category (any mode) is overwritten in place, which also changes it for
/// every other document sharing that row.
pub fn add_tag(
    data: &mut CatalogData,
    id: DocumentId,
    category: &str,
    value: &str,
    multi_value: bool,
) {
    if multi_value {
        let existing = data
            .tag_rows
            .iter()
            .find(|(_, row)| row.multi_value && row.category == category && row.value == value)
            .map(|(row_id, _)| *row_id);
        match existing {
            Some(row_id) => attach(data, id, row_id),
            None => {
                let row_id = insert_row(data, category, value, true);
                attach(data, id, row_id);
            }
        }
        return;
    }

    let owned = oldest_row_for_category(data, id, category);
    match owned {
        Some(row_id) => {
            if let Some(row) = data.tag_rows.get_mut(&row_id) {
                row.value = value.to_string();
                row.multi_value = false;
            }
        }
        None => {
            let row_id = insert_row(data, category, value, false);
            attach(data, id, row_id);
        }
    }
}

/// Values of the document's tags matching `category` (and `value` when
/// given), in the order the tags were attached. `None` means nothing
/// matched; callers distinguish that from a present-but-empty result.
pub fn list_values(
    data: &CatalogData,
    id: DocumentId,
    category: &str,
    value: Option<&str>,
) -> Option<Vec<String>> {
    let values: Vec<String> = data
        .tag_links
        .iter()
        .filter(|link| link.document_id == id)
        .filter_map(|link| data.tag_rows.get(&link.tag_row_id))
        .filter(|row| row.category == category)
        .filter(|row| value.is_none_or(|wanted| row.value == wanted))
        .map(|row| row.value.clone())
        .collect();
    if values.is_empty() { None } else { Some(values) }
}

/// All tags attached to a document, with their row ids, in attach order.
pub fn tags_for_document(data: &CatalogData, id: DocumentId) -> Vec<(u64, TagRow)> {
    data.tag_links
        .iter()
        .filter(|link| link.document_id == id)
        .filter_map(|link| {
            data.tag_rows
                .get(&link.tag_row_id)
                .map(|row| (link.tag_row_id, row.clone()))
        })
        .collect()
}

/// Detach every matching tag from the document and garbage-collect rows that
/// end up with no remaining references. Returns the number of detached
/// edges; zero matches is a no-op, not an error.
pub fn remove_tag(
    data: &mut CatalogData,
    id: DocumentId,
    category: &str,
    value: Option<&str>,
) -> usize {
    let doomed: Vec<u64> = data
        .tag_links
        .iter()
        .filter(|link| link.document_id == id)
        .filter_map(|link| data.tag_rows.get(&link.tag_row_id).map(|row| (link, row)))
        .filter(|(_, row)| row.category == category)
        .filter(|(_, row)| value.is_none_or(|wanted| row.value == wanted))
        .map(|(link, _)| link.tag_row_id)
        .collect();

    detach_and_collect(data, id, &doomed)
}

/// Detach every tag of the document, collecting orphans. Used by the delete
/// cascade and by the explicit clear operation.
pub fn remove_all_tags(data: &mut CatalogData, id: DocumentId) -> usize {
    let doomed: Vec<u64> = data
        .tag_links
        .iter()
        .filter(|link| link.document_id == id)
        .map(|link| link.tag_row_id)
        .collect();

    detach_and_collect(data, id, &doomed)
}

fn detach_and_collect(data: &mut CatalogData, id: DocumentId, row_ids: &[u64]) -> usize {
    if row_ids.is_empty() {
        return 0;
    }
    let before = data.tag_links.len();
    data.tag_links
        .retain(|link| !(link.document_id == id && row_ids.contains(&link.tag_row_id)));
    let removed = before - data.tag_links.len();

    // A row with zero remaining references is garbage and goes immediately.
    for row_id in row_ids {
        let still_referenced = data.tag_links.iter().any(|link| link.tag_row_id == *row_id);
        if !still_referenced {
            data.tag_rows.remove(row_id);
        }
    }

    removed
}

fn insert_row(data: &mut CatalogData, category: &str, value: &str, multi_value: bool) -> u64 {
    let row_id = data.next_tag_row_id;
    data.next_tag_row_id += 1;
    data.tag_rows.insert(
        row_id,
        TagRow {
            category: category.to_string(),
            value: value.to_string(),
            multi_value,
        },
    );
    row_id
}

fn attach(data: &mut CatalogData, id: DocumentId, row_id: u64) {
    let already = data
        .tag_links
        .iter()
        .any(|link| link.document_id == id && link.tag_row_id == row_id);
    if !already {
        data.tag_links.push(TagLink {
            document_id: id,
            tag_row_id: row_id,
        });
    }
}

fn oldest_row_for_category(data: &CatalogData, id: DocumentId, category: &str) -> Option<u64> {
    data.tag_links
        .iter()
        .filter(|link| link.document_id == id)
        .filter(|link| {
            data.tag_rows
                .get(&link.tag_row_id)
                .is_some_and(|row| row.category == category)
        })
        .map(|link| link.tag_row_id)
        .min()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC_A: DocumentId = DocumentId(1);
    const DOC_B: DocumentId = DocumentId(2);

    #[test]
    fn repeated_multi_value_add_is_idempotent() {
        let mut data = CatalogData::default();
        add_tag(&mut data, DOC_A, "fruit", "banana", true);
        add_tag(&mut data, DOC_A, "fruit", "banana", true);
        assert_eq!(data.tag_rows.len(), 1);
        assert_eq!(data.tag_links.len(), 1);
    }

    #[test]
    fn multi_value_add_shares_rows_across_documents() {
        let mut data = CatalogData::default();
        add_tag(&mut data, DOC_A, "fruit", "banana", true);
        add_tag(&mut data, DOC_B, "fruit", "banana", true);
        assert_eq!(data.tag_rows.len(), 1);
        assert_eq!(data.tag_links.len(), 2);
    }

    #[test]
    fn multi_value_allows_several_values_per_category() {
        let mut data = CatalogData::default();
        add_tag(&mut data, DOC_A, "fruit", "banana", true);
        add_tag(&mut data, DOC_A, "fruit", "apple", true);
        assert_eq!(
            list_values(&data, DOC_A, "fruit", None),
            Some(vec!["banana".to_string(), "apple".to_string()])
        );
    }

    #[test]
    fn single_value_add_overwrites_in_place() {
        let mut data = CatalogData::default();
        add_tag(&mut data, DOC_A, "color", "red", false);
        add_tag(&mut data, DOC_A, "color", "blue", false);
        assert_eq!(data.tag_rows.len(), 1);
        assert_eq!(data.tag_links.len(), 1);
        let row = data.tag_rows.values().next().unwrap();
        assert_eq!(row.value, "blue");
        assert!(!row.multi_value);
    }

    #[test]
    fn single_value_overwrite_reaches_documents_sharing_the_row() {
        let mut data = CatalogData::default();
        add_tag(&mut data, DOC_A, "color", "red", true);
        add_tag(&mut data, DOC_B, "color", "red", true);
        assert_eq!(data.tag_rows.len(), 1);

        add_tag(&mut data, DOC_B, "color", "blue", false);
        assert_eq!(
            list_values(&data, DOC_A, "color", None),
            Some(vec!["blue".to_string()])
        );
    }

    #[test]
    fn single_value_lookup_is_scoped_to_the_document() {
        let mut data = CatalogData::default();
        add_tag(&mut data, DOC_A, "color", "red", false);
        add_tag(&mut data, DOC_B, "color", "green", false);
        assert_eq!(data.tag_rows.len(), 2);
        assert_eq!(
            list_values(&data, DOC_A, "color", None),
            Some(vec!["red".to_string()])
        );
    }

    #[test]
    fn single_value_overwrite_picks_the_oldest_matching_row() {
        let mut data = CatalogData::default();
        add_tag(&mut data, DOC_A, "color", "red", true);
        add_tag(&mut data, DOC_A, "color", "green", true);
        add_tag(&mut data, DOC_A, "color", "blue", false);
        assert_eq!(
            list_values(&data, DOC_A, "color", None),
            Some(vec!["blue".to_string(), "green".to_string()])
        );
        let oldest = data.tag_rows.values().next().unwrap();
        assert_eq!(oldest.value, "blue");
        assert!(!oldest.multi_value);
    }

    #[test]
    fn list_values_is_absent_before_any_tagging() {
        let data = CatalogData::default();
        assert_eq!(list_values(&data, DOC_A, "dept", None), None);
    }

    #[test]
    fn list_values_filters_by_value_when_given() {
        let mut data = CatalogData::default();
        add_tag(&mut data, DOC_A, "fruit", "banana", true);
        add_tag(&mut data, DOC_A, "fruit", "apple", true);
        assert_eq!(
            list_values(&data, DOC_A, "fruit", Some("apple")),
            Some(vec!["apple".to_string()])
        );
        assert_eq!(list_values(&data, DOC_A, "fruit", Some("cherry")), None);
    }

    #[test]
    fn remove_tag_garbage_collects_orphaned_rows() {
        let mut data = CatalogData::default();
        add_tag(&mut data, DOC_A, "fruit", "banana", true);
        let removed = remove_tag(&mut data, DOC_A, "fruit", Some("banana"));
        assert_eq!(removed, 1);
        assert!(data.tag_rows.is_empty());
        assert!(data.tag_links.is_empty());
    }

    #[test]
    fn remove_tag_keeps_rows_still_referenced_elsewhere() {
        let mut data = CatalogData::default();
        add_tag(&mut data, DOC_A, "fruit", "banana", true);
        add_tag(&mut data, DOC_B, "fruit", "banana", true);

        let removed = remove_tag(&mut data, DOC_A, "fruit", None);
        assert_eq!(removed, 1);
        assert_eq!(data.tag_rows.len(), 1);

        let removed = remove_tag(&mut data, DOC_B, "fruit", None);
        assert_eq!(removed, 1);
        assert!(data.tag_rows.is_empty());
    }

    #[test]
    fn remove_tag_with_unknown_value_is_a_noop() {
        let mut data = CatalogData::default();
        add_tag(&mut data, DOC_A, "fruit", "banana", true);
        let removed = remove_tag(&mut data, DOC_A, "fruit", Some("cherry"));
        assert_eq!(removed, 0);
        assert_eq!(data.tag_rows.len(), 1);
        assert_eq!(data.tag_links.len(), 1);
    }

    #[test]
    fn remove_all_tags_clears_the_document_only() {
        let mut data = CatalogData::default();
        add_tag(&mut data, DOC_A, "fruit", "banana", true);
        add_tag(&mut data, DOC_A, "dept", "finance", true);
        add_tag(&mut data, DOC_B, "fruit", "banana", true);

        let removed = remove_all_tags(&mut data, DOC_A);
        assert_eq!(removed, 2);
        assert_eq!(list_values(&data, DOC_A, "fruit", None), None);
        assert_eq!(list_values(&data, DOC_A, "dept", None), None);
        // The shared banana row survives through the other document.
        assert_eq!(data.tag_rows.len(), 1);
        assert_eq!(
            list_values(&data, DOC_B, "fruit", None),
            Some(vec!["banana".to_string()])
        );
    }

    #[test]
    fn tags_for_document_reports_rows_in_attach_order() {
        let mut data = CatalogData::default();
        add_tag(&mut data, DOC_A, "fruit", "banana", true);
        add_tag(&mut data, DOC_A, "dept", "finance", false);
        let tags = tags_for_document(&data, DOC_A);
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].1.category, "fruit");
        assert_eq!(tags[1].1.category, "dept");
        assert!(!tags[1].1.multi_value);
    }
}
