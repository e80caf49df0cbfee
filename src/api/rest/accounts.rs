use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::auth::guard::Identity;
use crate::auth::password::{hash_password, verify_password};
use crate::error::AppError;
use crate::models::user::{Role, User, UserProfile};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/profile", get(get_profile).put(update_profile))
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
    pub name: String,
    pub shop_name: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub shop_name: Option<String>,
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation("a valid email is required".to_string()));
    }

    if payload.password.len() < 8 {
        return Err(AppError::Validation(
            "password must be at least 8 characters".to_string(),
        ));
    }

    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }

    // Roles are fixed at registration and admin is never self-assigned.
    if payload.role == Role::Admin {
        return Err(AppError::Validation("invalid role".to_string()));
    }

    if payload.role == Role::ShopOwner
        && payload
            .shop_name
            .as_deref()
            .is_none_or(|name| name.trim().is_empty())
    {
        return Err(AppError::Validation(
            "shop_name is required for shop owners".to_string(),
        ));
    }

    let (password_digest, password_salt) = hash_password(&payload.password);
    let user = User {
        id: Uuid::new_v4(),
        role: payload.role,
        email: email.clone(),
        password_digest,
        password_salt,
        name: payload.name.trim().to_string(),
        shop_name: payload.shop_name.map(|name| name.trim().to_string()),
        created_at: Utc::now(),
    };

    // The email index entry is the uniqueness gate.
    match state.emails.entry(email) {
        Entry::Occupied(_) => {
            return Err(AppError::Validation("user already exists".to_string()));
        }
        Entry::Vacant(vacant) => {
            vacant.insert(user.id);
        }
    }

    info!(user_id = %user.id, role = ?user.role, "user registered");
    state.users.insert(user.id, user);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "registered successfully" })),
    ))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let email = payload.email.trim().to_lowercase();

    // One shared message for unknown email and wrong password.
    let denied = || AppError::Unauthenticated("invalid credentials".to_string());

    let user_id = *state.emails.get(&email).ok_or_else(denied)?;
    let user = state.users.get(&user_id).ok_or_else(denied)?;

    if !verify_password(&payload.password, &user.password_salt, &user.password_digest) {
        return Err(denied());
    }

    let token = state.tokens.issue(user.id, user.role)?;

    Ok(Json(LoginResponse {
        token,
        user: user.profile(),
    }))
}

async fn get_profile(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<Json<UserProfile>, AppError> {
    let user = state
        .users
        .get(&identity.id)
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

    Ok(Json(user.profile()))
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let mut user = state
        .users
        .get_mut(&identity.id)
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

    if let Some(name) = payload.name {
        if name.trim().is_empty() {
            return Err(AppError::Validation("name cannot be empty".to_string()));
        }
        user.name = name.trim().to_string();
    }

    if let Some(shop_name) = payload.shop_name {
        user.shop_name = Some(shop_name.trim().to_string());
    }

    Ok(Json(user.profile()))
}
