// This file is part of the product DocRack.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::{HttpResponse, web};
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use tokio::io::AsyncWriteExt;

use crate::app_state::AppState;
use crate::config::ValidatedConfig;
use crate::util::temp_upload_path;

use super::{catalog_error_response, parse_id_segment, storage_error_response};

#[derive(Deserialize)]
pub struct UploadQuery {
    pub filename: String,
}

/// Receive raw file bytes, spool them next to the documents tree, then hand
/// the spool file to the storage engine. The spool file carries a temp name
/// the audit scan ignores, so a crash mid-upload never looks like an orphaned
/// document.
pub async fn upload_file(
    path: web::Path<String>,
    query: web::Query<UploadQuery>,
    mut payload: web::Payload,
    config: web::Data<ValidatedConfig>,
    app_state: web::Data<AppState>,
) -> HttpResponse {
    let id = match parse_id_segment(&path) {
        Ok(id) => id,
        Err(response) => return response,
    };

    // Reject before accepting the body when no record exists to attach to.
    match app_state.catalog.get_document(id) {
        Ok(Some(_)) => {}
        Ok(None) => {
            return HttpResponse::PreconditionFailed().json(json!({
                "error": format!("Document {} must exist before a file can be stored for it", id)
            }));
        }
        Err(err) => return catalog_error_response(&err),
    }

    let max_bytes = config.upload.max_file_size_mb * 1024 * 1024;
    let spool_path = temp_upload_path(app_state.engine.documents_root());

    let mut spool_file = match tokio::fs::File::create(&spool_path).await {
        Ok(file) => file,
        Err(err) => {
            log::error!(
                "Could not create spool file '{}': {}",
                spool_path.display(),
                err
            );
            return HttpResponse::InternalServerError()
                .json(json!({ "error": "Could not open upload spool file" }));
        }
    };

    let mut written: u64 = 0;
    while let Some(chunk) = payload.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(err) => {
                log::warn!("Upload for document {} aborted: {}", id, err);
                remove_spool(&spool_path).await;
                return HttpResponse::BadRequest()
                    .json(json!({ "error": format!("Upload failed: {}", err) }));
            }
        };
        written += chunk.len() as u64;
        if written > max_bytes {
            log::warn!(
                "Upload for document {} exceeds {} MB limit, rejecting",
                id,
                config.upload.max_file_size_mb
            );
            remove_spool(&spool_path).await;
            return HttpResponse::PayloadTooLarge().json(json!({
                "error": format!(
                    "File exceeds the maximum upload size of {} MB",
                    config.upload.max_file_size_mb
                )
            }));
        }
        if let Err(err) = spool_file.write_all(&chunk).await {
            log::error!(
                "Could not write spool file '{}': {}",
                spool_path.display(),
                err
            );
            remove_spool(&spool_path).await;
            return HttpResponse::InternalServerError()
                .json(json!({ "error": "Could not write upload spool file" }));
        }
    }

    if let Err(err) = spool_file.flush().await {
        log::error!(
            "Could not flush spool file '{}': {}",
            spool_path.display(),
            err
        );
        remove_spool(&spool_path).await;
        return HttpResponse::InternalServerError()
            .json(json!({ "error": "Could not write upload spool file" }));
    }
    drop(spool_file);

    let result = app_state
        .engine
        .store(id, &spool_path, &query.filename)
        .await;
    remove_spool(&spool_path).await;

    match result {
        Ok(record) => {
            log::info!(
                "Stored {} byte(s) as '{}' for document {}",
                written,
                record.original_basename(),
                id
            );
            HttpResponse::Ok().json(json!({
                "id": record.id,
                "basename": record.original_basename(),
                "bytes": written,
                "last_changed": record.last_changed,
            }))
        }
        Err(err) => storage_error_response(&err),
    }
}

async fn remove_spool(spool_path: &Path) {
    if let Err(err) = tokio::fs::remove_file(spool_path).await
        && err.kind() != std::io::ErrorKind::NotFound
    {
        log::warn!(
            "Could not remove spool file '{}': {}",
            spool_path.display(),
            err
        );
    }
}
