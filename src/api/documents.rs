// This file is part of the product DocRack.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::app_state::AppState;
use crate::catalog::DocumentRecord;
use crate::storage::{DocumentId, StorageEngine};
use crate::util::{extension_of, file_type_label, format_size};

use super::{catalog_error_response, parse_id_segment, storage_error_response};

#[derive(Deserialize)]
pub struct CreateDocumentRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateDocumentRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Serialize)]
struct DocumentSummary {
    id: DocumentId,
    title: String,
    basename: Option<String>,
    size: Option<String>,
    file_type: Option<String>,
    last_changed: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct TagEntry {
    category: String,
    value: String,
    multi_value: bool,
}

#[derive(Serialize)]
struct DocumentDetail {
    #[serde(flatten)]
    summary: DocumentSummary,
    description: String,
    tags: Vec<TagEntry>,
    pages: Vec<String>,
}

async fn summarize(engine: &StorageEngine, record: &DocumentRecord) -> DocumentSummary {
    let mut basename = None;
    let mut size = None;
    let mut file_type = None;
    if record.has_file() {
        let name = record.original_basename().to_string();
        file_type = Some(file_type_label(extension_of(&name)));
        basename = Some(name);
        if let Some(path) = engine.full_path(record)
            && let Ok(meta) = tokio::fs::metadata(&path).await
        {
            size = Some(format_size(meta.len()));
        }
    }
    DocumentSummary {
        id: record.id,
        title: record.title.clone(),
        basename,
        size,
        file_type,
        last_changed: record.last_changed,
    }
}

pub async fn create_document(
    app_state: web::Data<AppState>,
    body: web::Json<CreateDocumentRequest>,
) -> HttpResponse {
    let request = body.into_inner();
    let title = request.title.unwrap_or_default();
    let description = request.description.unwrap_or_default();
    match app_state.catalog.create_document(title, description).await {
        Ok(record) => {
            log::info!("Created document record {}", record.id);
            let summary = summarize(&app_state.engine, &record).await;
            HttpResponse::Created().json(summary)
        }
        Err(err) => catalog_error_response(&err),
    }
}

pub async fn list_documents(app_state: web::Data<AppState>) -> HttpResponse {
    let records = match app_state.catalog.list_documents() {
        Ok(records) => records,
        Err(err) => return catalog_error_response(&err),
    };
    let mut documents = Vec::with_capacity(records.len());
    for record in &records {
        documents.push(summarize(&app_state.engine, record).await);
    }
    HttpResponse::Ok().json(json!({ "documents": documents }))
}

pub async fn get_document(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> HttpResponse {
    let id = match parse_id_segment(&path) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let record = match app_state.catalog.get_document(id) {
        Ok(Some(record)) => record,
        Ok(None) => {
            return HttpResponse::NotFound()
                .json(json!({ "error": format!("Document not found: {}", id) }));
        }
        Err(err) => return catalog_error_response(&err),
    };

    let tags = match app_state.catalog.tags_for_document(id) {
        Ok(tags) => tags,
        Err(err) => return catalog_error_response(&err),
    };
    let pages = match app_state.catalog.pages_for_document(id) {
        Ok(pages) => pages,
        Err(err) => return catalog_error_response(&err),
    };

    let detail = DocumentDetail {
        summary: summarize(&app_state.engine, &record).await,
        description: record.description.clone(),
        tags: tags
            .into_iter()
            .map(|(_, row)| TagEntry {
                category: row.category,
                value: row.value,
                multi_value: row.multi_value,
            })
            .collect(),
        pages,
    };
    HttpResponse::Ok().json(detail)
}

pub async fn update_document(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
    body: web::Json<UpdateDocumentRequest>,
) -> HttpResponse {
    let id = match parse_id_segment(&path) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let request = body.into_inner();
    match app_state
        .catalog
        .update_document_meta(id, request.title, request.description)
        .await
    {
        Ok(record) => {
            let summary = summarize(&app_state.engine, &record).await;
            HttpResponse::Ok().json(summary)
        }
        Err(err) => catalog_error_response(&err),
    }
}

pub async fn delete_document(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> HttpResponse {
    let id = match parse_id_segment(&path) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match app_state.engine.delete(id).await {
        Ok(()) => {
            log::info!("Deleted document {}", id);
            HttpResponse::NoContent().finish()
        }
        Err(err) => storage_error_response(&err),
    }
}
