// This file is part of the product DocRack.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::catalog::{PageRecord, VisibilityRule};
use actix_web::HttpRequest;

/// What we know about the requester: the roles declared by the fronting
/// proxy. DocRack does not authenticate anyone itself; it trusts the
/// configured header and nothing else from the request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub roles: Vec<String>,
}

impl RequestContext {
    pub fn from_request(req: &HttpRequest, roles_header: &str) -> Self {
        let roles = req
            .headers()
            .get(roles_header)
            .and_then(|value| value.to_str().ok())
            .map(parse_roles)
            .unwrap_or_default();
        RequestContext { roles }
    }

    pub fn anonymous() -> Self {
        RequestContext::default()
    }

    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|role| role == "admin")
    }
}

fn parse_roles(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .map(str::to_string)
        .collect()
}

/// Per-page access predicate. The gateway only consumes the boolean, so a
/// deployment can swap the evaluation without touching the streaming path.
pub trait PageVisibility: Send + Sync {
    fn can_view(&self, page: &PageRecord, context: &RequestContext) -> bool;
}

/// Evaluates the page's stored visibility rule against the declared roles.
pub struct RoleVisibility;

impl PageVisibility for RoleVisibility {
    fn can_view(&self, page: &PageRecord, context: &RequestContext) -> bool {
        match &page.visibility {
            VisibilityRule::Public => true,
            VisibilityRule::Deny => false,
            VisibilityRule::Restricted { roles: required } => {
                if context.is_admin() {
                    return true;
                }
                context
                    .roles
                    .iter()
                    .any(|role| required.iter().any(|wanted| wanted == role))
            }
        }
    }
}
