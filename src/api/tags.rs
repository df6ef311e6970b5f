// This file is part of the product DocRack.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;

use crate::app_state::AppState;

use super::{catalog_error_response, parse_id_segment};

fn default_multi_value() -> bool {
    true
}

#[derive(Deserialize)]
pub struct AddTagRequest {
    pub category: String,
    pub value: String,
    #[serde(default = "default_multi_value")]
    pub multi_value: bool,
}

#[derive(Deserialize)]
pub struct TagFilterQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

pub async fn add_tag(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
    body: web::Json<AddTagRequest>,
) -> HttpResponse {
    let id = match parse_id_segment(&path) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let request = body.into_inner();
    match app_state
        .catalog
        .add_tag(id, request.category, request.value, request.multi_value)
        .await
    {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => catalog_error_response(&err),
    }
}

/// Without a `category` filter this lists every tag on the document. With one
/// it answers the narrower value lookup, where "no match" is `null` rather
/// than an empty list so callers can tell a missing category from a category
/// that happens to have no values.
pub async fn get_tags(
    path: web::Path<String>,
    query: web::Query<TagFilterQuery>,
    app_state: web::Data<AppState>,
) -> HttpResponse {
    let id = match parse_id_segment(&path) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let filter = query.into_inner();

    if let Some(category) = filter.category.as_deref() {
        return match app_state.catalog.list_values(id, category, filter.value.as_deref()) {
            Ok(values) => HttpResponse::Ok().json(json!({ "values": values })),
            Err(err) => catalog_error_response(&err),
        };
    }

    if filter.value.is_some() {
        return HttpResponse::BadRequest()
            .json(json!({ "error": "Filtering by value requires a category" }));
    }

    match app_state.catalog.tags_for_document(id) {
        Ok(tags) => {
            let entries: Vec<_> = tags
                .into_iter()
                .map(|(_, row)| {
                    json!({
                        "category": row.category,
                        "value": row.value,
                        "multi_value": row.multi_value,
                    })
                })
                .collect();
            HttpResponse::Ok().json(json!({ "tags": entries }))
        }
        Err(err) => catalog_error_response(&err),
    }
}

pub async fn remove_tags(
    path: web::Path<String>,
    query: web::Query<TagFilterQuery>,
    app_state: web::Data<AppState>,
) -> HttpResponse {
    let id = match parse_id_segment(&path) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let filter = query.into_inner();
    let Some(category) = filter.category else {
        return HttpResponse::BadRequest()
            .json(json!({ "error": "Query parameter 'category' is required" }));
    };

    match app_state.catalog.remove_tag(id, category, filter.value).await {
        Ok(removed) => HttpResponse::Ok().json(json!({ "removed": removed })),
        Err(err) => catalog_error_response(&err),
    }
}
