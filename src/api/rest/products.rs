use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::Json;
use axum::Router;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::guard::{authorize, ensure_owner, Action, Identity};
use crate::error::AppError;
use crate::models::product::Product;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/:id", put(update_product).delete(delete_product))
}

#[derive(Deserialize)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub shop_owner: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub category: Option<String>,
    pub price: f64,
    pub stock: u32,
}

#[derive(Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<u32>,
}

/// Catalog browsing is public.
async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ProductFilter>,
) -> Json<Vec<Product>> {
    let products = state
        .products
        .iter()
        .filter(|entry| {
            let product = entry.value();
            filter
                .category
                .as_deref()
                .is_none_or(|category| product.category.as_deref() == Some(category))
                && filter
                    .shop_owner
                    .is_none_or(|owner| product.shop_owner_id == owner)
        })
        .map(|entry| entry.value().clone())
        .collect();

    Json(products)
}

async fn create_product(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Json(payload): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    authorize(&identity, Action::ManageCatalog)?;

    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }

    if !payload.price.is_finite() || payload.price < 0.0 {
        return Err(AppError::Validation(
            "price must be a non-negative number".to_string(),
        ));
    }

    let product = Product {
        id: Uuid::new_v4(),
        shop_owner_id: identity.id,
        name: payload.name.trim().to_string(),
        category: payload.category,
        price: payload.price,
        stock: payload.stock,
        created_at: Utc::now(),
    };

    state.products.insert(product.id, product.clone());
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<Product>, AppError> {
    authorize(&identity, Action::ManageCatalog)?;

    let mut product = state
        .products
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound("product not found".to_string()))?;

    ensure_owner(&identity, product.shop_owner_id, "product")?;

    if let Some(name) = payload.name {
        if name.trim().is_empty() {
            return Err(AppError::Validation("name cannot be empty".to_string()));
        }
        product.name = name.trim().to_string();
    }

    if let Some(price) = payload.price {
        if !price.is_finite() || price < 0.0 {
            return Err(AppError::Validation(
                "price must be a non-negative number".to_string(),
            ));
        }
        product.price = price;
    }

    if let Some(category) = payload.category {
        product.category = Some(category);
    }

    if let Some(stock) = payload.stock {
        product.stock = stock;
    }

    Ok(Json(product.clone()))
}

async fn delete_product(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    authorize(&identity, Action::ManageCatalog)?;

    match state.products.entry(id) {
        Entry::Vacant(_) => Err(AppError::NotFound("product not found".to_string())),
        Entry::Occupied(entry) => {
            ensure_owner(&identity, entry.get().shop_owner_id, "product")?;
            entry.remove();
            Ok(Json(json!({ "message": "product deleted" })))
        }
    }
}
