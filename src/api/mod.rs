// This file is part of the product DocRack.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::sync::Arc;

use actix_web::{HttpResponse, web};
use serde_json::json;

use crate::catalog::CatalogError;
use crate::config::ValidatedConfig;
use crate::storage::StorageError;

mod audit;
mod documents;
mod guard;
mod ingest;
mod pages;
mod tags;

pub use guard::API_TOKEN_HEADER;

pub fn configure(cfg: &mut web::ServiceConfig, config: &Arc<ValidatedConfig>) {
    cfg.service(
        web::scope("/api")
            .wrap(guard::RequireApiToken::new(config.clone()))
            .route("/documents", web::post().to(documents::create_document))
            .route("/documents", web::get().to(documents::list_documents))
            .route("/documents/{id}", web::get().to(documents::get_document))
            .route("/documents/{id}", web::patch().to(documents::update_document))
            .route(
                "/documents/{id}",
                web::delete().to(documents::delete_document),
            )
            .route("/documents/{id}/file", web::post().to(ingest::upload_file))
            .route("/documents/{id}/tags", web::post().to(tags::add_tag))
            .route("/documents/{id}/tags", web::get().to(tags::get_tags))
            .route("/documents/{id}/tags", web::delete().to(tags::remove_tags))
            .route("/documents/{id}/pages", web::post().to(pages::link_pages))
            .route("/documents/{id}/pages", web::get().to(pages::linked_pages))
            .route(
                "/documents/{id}/pages/{page}",
                web::delete().to(pages::unlink_page),
            )
            .route("/pages", web::get().to(pages::list_pages))
            .route("/pages/{page}", web::put().to(pages::upsert_page))
            .route("/pages/{page}", web::delete().to(pages::delete_page))
            .route("/audit", web::get().to(audit::run_audit)),
    );
}

/// Map a catalog failure onto the JSON error shape the API speaks.
pub(crate) fn catalog_error_response(err: &CatalogError) -> HttpResponse {
    let body = json!({ "error": err.to_string() });
    match err {
        CatalogError::DocumentNotFound(_) | CatalogError::PageNotFound(_) => {
            HttpResponse::NotFound().json(body)
        }
        CatalogError::InvalidInput(_) => HttpResponse::BadRequest().json(body),
        CatalogError::ServiceUnavailable => HttpResponse::ServiceUnavailable().json(body),
        CatalogError::StoreError(_) | CatalogError::FileError(_) | CatalogError::Internal(_) => {
            HttpResponse::InternalServerError().json(body)
        }
    }
}

pub(crate) fn storage_error_response(err: &StorageError) -> HttpResponse {
    let body = json!({ "error": err.to_string() });
    match err {
        StorageError::PreconditionFailed(_) => HttpResponse::PreconditionFailed().json(body),
        StorageError::InvalidFilename(_) => HttpResponse::BadRequest().json(body),
        StorageError::Io(_) => HttpResponse::InternalServerError().json(body),
        StorageError::Catalog(catalog_err) => catalog_error_response(catalog_err),
    }
}

/// Parse the `{id}` path segment, rejecting anything that is not a bare
/// decimal document id.
pub(crate) fn parse_id_segment(raw: &str) -> Result<crate::storage::DocumentId, HttpResponse> {
    crate::storage::layout::parse_document_id(raw)
        .map_err(|err| HttpResponse::BadRequest().json(json!({ "error": err })))
}
