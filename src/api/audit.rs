// This file is part of the product DocRack.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::{HttpResponse, web};

use crate::app_state::AppState;

use super::storage_error_response;

/// Walk the documents tree and report both directions of drift: files no
/// record points at, and records whose file is gone. The walk is synchronous
/// filesystem work, so it runs on the blocking pool.
pub async fn run_audit(app_state: web::Data<AppState>) -> HttpResponse {
    let engine = app_state.engine.clone();
    let report = tokio::task::spawn_blocking(move || engine.audit()).await;
    match report {
        Ok(Ok(report)) => HttpResponse::Ok().json(report),
        Ok(Err(err)) => storage_error_response(&err),
        Err(err) => {
            log::error!("Audit task failed to run: {}", err);
            HttpResponse::InternalServerError().finish()
        }
    }
}
