use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::guard::{authorize, Action, Identity};
use crate::error::AppError;
use crate::lifecycle::manager;
use crate::lifecycle::manager::{HistoryFilter, ItemSelection};
use crate::models::order::{Order, OrderStatus, PaymentStatus};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order).get(list_orders))
        .route("/orders/history", get(order_history))
        .route("/orders/:id", get(get_order).delete(cancel_order))
        .route("/orders/:id/status", put(update_status))
        .route("/orders/:id/approve", put(approve_order))
        .route("/orders/:id/payment", put(update_payment_status))
}

/// Order creation body. Clients pick products and quantities; names,
/// prices, and the total come from the catalog. Any client-sent total
/// is ignored.
#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub shop_owner_id: Uuid,
    pub items: Vec<ItemSelection>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[derive(Deserialize)]
pub struct ApproveRequest {
    pub approve: bool,
}

#[derive(Deserialize)]
pub struct UpdatePaymentRequest {
    pub payment_status: PaymentStatus,
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    authorize(&identity, Action::CreateOrder)?;

    let order = manager::create_order(&state, &identity, payload.shop_owner_id, &payload.items)?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Json<Vec<Order>> {
    Json(manager::list_orders(&state, &identity))
}

async fn order_history(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Query(filter): Query<HistoryFilter>,
) -> Json<Vec<Order>> {
    Json(manager::order_history(&state, &identity, &filter))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(manager::get_order(&state, &identity, id)?))
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, AppError> {
    authorize(&identity, Action::AdvanceOrder)?;

    let order = manager::advance_status(&state, &identity, id, payload.status)?;
    Ok(Json(order))
}

async fn approve_order(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApproveRequest>,
) -> Result<Json<Order>, AppError> {
    authorize(&identity, Action::DecideOrder)?;

    let order = manager::decide_order(&state, &identity, id, payload.approve)?;
    Ok(Json(order))
}

async fn cancel_order(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    authorize(&identity, Action::CancelOrder)?;

    manager::cancel_order(&state, &identity, id)?;
    Ok(Json(json!({ "message": "order cancelled" })))
}

async fn update_payment_status(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePaymentRequest>,
) -> Result<Json<Order>, AppError> {
    authorize(&identity, Action::SetPaymentStatus)?;

    let order = manager::set_payment_status(&state, &identity, id, payload.payment_status)?;
    Ok(Json(order))
}
