// This file is part of the product DocRack.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;

use crate::app_state::AppState;
use crate::catalog::VisibilityRule;

use super::{catalog_error_response, parse_id_segment};

#[derive(Deserialize)]
pub struct UpsertPageRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub visibility: VisibilityRule,
}

#[derive(Deserialize)]
pub struct LinkPagesRequest {
    pub pages: Vec<String>,
}

pub async fn upsert_page(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
    body: web::Json<UpsertPageRequest>,
) -> HttpResponse {
    let page_id = path.into_inner();
    let request = body.into_inner();
    match app_state
        .catalog
        .upsert_page(page_id, request.title, request.visibility)
        .await
    {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => catalog_error_response(&err),
    }
}

pub async fn list_pages(app_state: web::Data<AppState>) -> HttpResponse {
    match app_state.catalog.list_pages() {
        Ok(pages) => {
            let entries: Vec<_> = pages
                .into_iter()
                .map(|(page_id, record)| {
                    json!({
                        "id": page_id,
                        "title": record.title,
                        "visibility": record.visibility,
                    })
                })
                .collect();
            HttpResponse::Ok().json(json!({ "pages": entries }))
        }
        Err(err) => catalog_error_response(&err),
    }
}

/// Deleting a page severs every document link pointing at it; the documents
/// themselves are untouched.
pub async fn delete_page(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> HttpResponse {
    let page_id = path.into_inner();
    match app_state.catalog.delete_page(page_id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => catalog_error_response(&err),
    }
}

pub async fn link_pages(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
    body: web::Json<LinkPagesRequest>,
) -> HttpResponse {
    let id = match parse_id_segment(&path) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match app_state.catalog.link_pages(id, body.into_inner().pages).await {
        Ok(linked) => HttpResponse::Ok().json(json!({ "linked": linked })),
        Err(err) => catalog_error_response(&err),
    }
}

pub async fn linked_pages(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> HttpResponse {
    let id = match parse_id_segment(&path) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match app_state.catalog.pages_for_document(id) {
        Ok(pages) => HttpResponse::Ok().json(json!({ "pages": pages })),
        Err(err) => catalog_error_response(&err),
    }
}

pub async fn unlink_page(
    path: web::Path<(String, String)>,
    app_state: web::Data<AppState>,
) -> HttpResponse {
    let (raw_id, page_id) = path.into_inner();
    let id = match parse_id_segment(&raw_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match app_state.catalog.unlink_page(id, page_id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => catalog_error_response(&err),
    }
}
