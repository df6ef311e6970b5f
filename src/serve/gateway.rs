// This file is part of the product DocRack.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::access::RequestContext;
use crate::app_state::AppState;
use crate::catalog::DocumentRecord;
use crate::config::{UnlinkedDocumentsPolicy, ValidatedConfig};
use crate::storage::layout::parse_document_id;
use crate::util::mime_helper::{SNIFF_BUFFER_SIZE, detect_mime_type, is_html_mime};
use actix_web::{HttpRequest, HttpResponse, body::SizedStream, web};
use log::{debug, warn};
use std::io::SeekFrom;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

const CACHE_CONTROL_NO_STORE: &str = "private, no-cache, no-store, must-revalidate";

/// Denied and missing documents answer with the same bytes by default, so a
/// response never reveals whether an id exists.
const MASKED_NOT_FOUND_BODY: &str = "This document does not exist.";

/// `GET /d/{id}`: resolve the document, check the page-visibility predicate,
/// stream the file.
pub async fn download_document(
    req: HttpRequest,
    path: web::Path<String>,
    config: web::Data<ValidatedConfig>,
    app_state: web::Data<AppState>,
) -> HttpResponse {
    // Resolve
    let id = match parse_document_id(&path) {
        Ok(id) => id,
        Err(reason) => {
            debug!("Download rejected, bad id '{}': {}", path, reason);
            return not_found_response();
        }
    };
    let record = match app_state.catalog.get_document(id) {
        Ok(Some(record)) => record,
        Ok(None) => {
            debug!("Download rejected, no document {}", id);
            return not_found_response();
        }
        Err(err) => {
            warn!("Catalog read failed during download of {}: {}", id, err);
            return HttpResponse::InternalServerError().finish();
        }
    };

    // Authorize: one viewable linked page is enough. A document linked to
    // no page at all falls back to the configured policy.
    let context = RequestContext::from_request(&req, &config.download.roles_header);
    let linked_pages = match app_state.catalog.linked_page_records(id) {
        Ok(pages) => pages,
        Err(err) => {
            warn!("Catalog read failed during download of {}: {}", id, err);
            return HttpResponse::InternalServerError().finish();
        }
    };
    let viewable = if linked_pages.is_empty() {
        config.download.unlinked_documents == UnlinkedDocumentsPolicy::Allow
    } else {
        linked_pages
            .iter()
            .any(|(_, page)| app_state.visibility.can_view(page, &context))
    };
    if !viewable {
        debug!(
            "Download of document {} denied for roles {:?} ({} linked page(s))",
            id,
            context.roles,
            linked_pages.len()
        );
        if config.download.mask_forbidden {
            return not_found_response();
        }
        return HttpResponse::Forbidden()
            .content_type("text/plain; charset=utf-8")
            .body("Access to this document is denied.");
    }

    // Stream
    let Some(full_path) = app_state.engine.full_path(&record) else {
        debug!("Download of document {} rejected, no stored file", id);
        return not_found_response();
    };
    let mut file = match File::open(&full_path).await {
        Ok(file) => file,
        Err(err) => {
            warn!(
                "Document {} record points at '{}' but the file cannot be opened: {}",
                id,
                full_path.display(),
                err
            );
            return not_found_response();
        }
    };
    let file_size = match file.metadata().await {
        Ok(metadata) => metadata.len(),
        Err(err) => {
            warn!("Could not stat '{}': {}", full_path.display(), err);
            return not_found_response();
        }
    };

    let mut sniff = vec![0u8; SNIFF_BUFFER_SIZE.min(file_size as usize)];
    if !sniff.is_empty() {
        if let Err(err) = file.read_exact(&mut sniff).await {
            warn!("Could not read '{}': {}", full_path.display(), err);
            return HttpResponse::InternalServerError().finish();
        }
        if let Err(err) = file.seek(SeekFrom::Start(0)).await {
            warn!("Could not rewind '{}': {}", full_path.display(), err);
            return HttpResponse::InternalServerError().finish();
        }
    }
    let mime_type = detect_mime_type(&full_path, &sniff, config.download.use_file_tool);

    let stream = ReaderStream::new(file);
    let body = SizedStream::new(file_size, stream);

    let mut response = HttpResponse::Ok();
    response
        .content_type(mime_type.as_str())
        .insert_header(("Content-Length", file_size.to_string()))
        .insert_header(("Cache-Control", CACHE_CONTROL_NO_STORE))
        .insert_header(("Pragma", "no-cache"))
        .insert_header(("Expires", "0"));
    if !is_html_mime(&mime_type) {
        response.insert_header((
            "Content-Disposition",
            attachment_disposition(&record),
        ));
    }
    response.body(body)
}

fn not_found_response() -> HttpResponse {
    HttpResponse::NotFound()
        .content_type("text/plain; charset=utf-8")
        .body(MASKED_NOT_FOUND_BODY)
}

/// Attachment header carrying the original basename, id prefix stripped.
fn attachment_disposition(record: &DocumentRecord) -> String {
    let basename = record.original_basename();
    let escaped: String = basename
        .chars()
        .flat_map(|ch| match ch {
            '"' | '\\' => vec!['\\', ch],
            _ => vec![ch],
        })
        .collect();
    format!("attachment; filename=\"{}\"", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::layout::DocumentId;

    fn record_with_filename(filename: &str) -> DocumentRecord {
        DocumentRecord {
            id: DocumentId(7),
            filename: filename.to_string(),
            folder: "07".to_string(),
            title: String::new(),
            description: String::new(),
            last_changed: None,
        }
    }

    #[test]
    fn disposition_strips_the_id_prefix() {
        let record = record_with_filename("7~report.pdf");
        assert_eq!(
            attachment_disposition(&record),
            "attachment; filename=\"report.pdf\""
        );
    }

    #[test]
    fn disposition_escapes_quotes() {
        let record = record_with_filename("7~\"quoted\".pdf");
        assert_eq!(
            attachment_disposition(&record),
            "attachment; filename=\"\\\"quoted\\\".pdf\""
        );
    }

    #[test]
    fn disposition_keeps_later_separators() {
        let record = record_with_filename("7~v1~final.pdf");
        assert_eq!(
            attachment_disposition(&record),
            "attachment; filename=\"v1~final.pdf\""
        );
    }
}
