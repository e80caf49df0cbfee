use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::user::Role;
use crate::state::AppState;

/// The caller as asserted by their token. Re-derived on every request;
/// authorization decisions are never cached across requests.
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub id: Uuid,
    pub role: Role,
}

/// Actions gated by role. Ownership is checked separately against the
/// resource's owning field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateOrder,
    DecideOrder,
    CancelOrder,
    AdvanceOrder,
    SetPaymentStatus,
    ManageCatalog,
}

impl Action {
    fn required_role(self) -> Role {
        match self {
            Action::CreateOrder | Action::DecideOrder | Action::CancelOrder => Role::Customer,
            Action::AdvanceOrder | Action::SetPaymentStatus | Action::ManageCatalog => {
                Role::ShopOwner
            }
        }
    }
}

/// Role check. Admin passes every gate.
pub fn authorize(identity: &Identity, action: Action) -> Result<(), AppError> {
    if identity.role == Role::Admin || identity.role == action.required_role() {
        return Ok(());
    }

    Err(AppError::Forbidden("insufficient role".to_string()))
}

/// Ownership check. A mismatch reports the resource as absent rather than
/// forbidden so callers cannot probe for records they do not own. Applied
/// uniformly to every owner-scoped endpoint.
pub fn ensure_owner(identity: &Identity, owner_id: Uuid, resource: &str) -> Result<(), AppError> {
    if identity.role == Role::Admin || identity.id == owner_id {
        return Ok(());
    }

    Err(AppError::NotFound(format!("{resource} not found")))
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .or_else(|| cookie_token(parts))
            .ok_or_else(|| AppError::Unauthenticated("missing token".to_string()))?;

        state.tokens.verify(&token)
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let header = parts.headers.get("authorization")?.to_str().ok()?;
    header
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}

fn cookie_token(parts: &Parts) -> Option<String> {
    let header = parts.headers.get("cookie")?.to_str().ok()?;
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        // Some clients wrap cookie values in double quotes.
        (name == "token").then(|| value.trim_matches('"').to_string())
    })
}
