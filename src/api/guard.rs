// This file is part of the product DocRack.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::ValidatedConfig;
use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use serde_json::json;
use std::future::{Ready, ready};
use std::sync::Arc;

pub const API_TOKEN_HEADER: &str = "x-docrack-token";

/// Middleware that requires a valid `x-docrack-token` header on every request
/// in the scope. When the admin API is disabled the whole scope answers 404,
/// indistinguishable from routes that were never registered.
pub struct RequireApiToken {
    config: Arc<ValidatedConfig>,
}

impl RequireApiToken {
    pub fn new(config: Arc<ValidatedConfig>) -> Self {
        Self { config }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireApiToken
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireApiTokenService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireApiTokenService {
            service,
            config: self.config.clone(),
        }))
    }
}

pub struct RequireApiTokenService<S> {
    service: S,
    config: Arc<ValidatedConfig>,
}

impl<S, B> Service<ServiceRequest> for RequireApiTokenService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if !self.config.admin_api.enabled {
            let (req, _) = req.into_parts();
            let response = HttpResponse::NotFound().finish().map_into_right_body();
            return Box::pin(async move { Ok(ServiceResponse::new(req, response)) });
        }

        let provided = req
            .headers()
            .get(API_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok());

        if !token_matches(provided, &self.config.admin_api.token) {
            log::warn!(
                "Rejected API request to {} with {} token",
                req.path(),
                if provided.is_some() {
                    "an invalid"
                } else {
                    "a missing"
                }
            );
            let (req, _) = req.into_parts();
            let response = HttpResponse::Unauthorized()
                .json(json!({ "error": "Invalid or missing API token" }))
                .map_into_right_body();
            return Box::pin(async move { Ok(ServiceResponse::new(req, response)) });
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}

/// Constant-time token comparison. `memcmp::eq` panics on unequal lengths, so
/// length is checked first; the length itself is not a secret.
fn token_matches(provided: Option<&str>, expected: &str) -> bool {
    let Some(provided) = provided else {
        return false;
    };
    if expected.is_empty() || provided.len() != expected.len() {
        return false;
    }
    openssl::memcmp::eq(provided.as_bytes(), expected.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_exact_token() {
        assert!(token_matches(Some("secret-token"), "secret-token"));
    }

    #[test]
    fn rejects_wrong_and_missing_tokens() {
        assert!(!token_matches(Some("secret-tokeX"), "secret-token"));
        assert!(!token_matches(Some("short"), "secret-token"));
        assert!(!token_matches(None, "secret-token"));
    }

    #[test]
    fn rejects_everything_when_no_token_configured() {
        assert!(!token_matches(Some(""), ""));
        assert!(!token_matches(None, ""));
    }
}
