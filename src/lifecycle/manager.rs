//! Order lifecycle operations.
//!
//! Every mutation here runs after the caller's role has been checked by the
//! guard; ownership is re-checked against the record under its map entry
//! guard, so lookup + owner check + write happen as one step. Item names
//! and prices always come from the catalog and totals are recomputed from
//! the item list, never trusted from the client.

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::guard::{ensure_owner, Identity};
use crate::error::AppError;
use crate::events::{OrderEvent, OrderEventKind};
use crate::lifecycle::transitions;
use crate::models::order::{Order, OrderItem, OrderStatus, PaymentStatus};
use crate::models::user::Role;
use crate::state::AppState;

/// A client's reference to a catalog item. Quantity is the only value the
/// client controls; everything else is resolved server-side.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemSelection {
    pub product_id: Uuid,
    pub quantity: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryFilter {
    pub status: Option<OrderStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

pub fn create_order(
    state: &AppState,
    identity: &Identity,
    shop_owner_id: Uuid,
    selections: &[ItemSelection],
) -> Result<Order, AppError> {
    if selections.is_empty() {
        return Err(AppError::Validation(
            "order must contain at least one item".to_string(),
        ));
    }

    let mut items = Vec::with_capacity(selections.len());
    for selection in selections {
        if selection.quantity == 0 {
            return Err(AppError::Validation(
                "item quantity must be greater than zero".to_string(),
            ));
        }

        let product = state
            .products
            .get(&selection.product_id)
            .ok_or_else(|| {
                AppError::Validation(format!("product {} not available", selection.product_id))
            })?;

        if product.shop_owner_id != shop_owner_id {
            return Err(AppError::Validation(format!(
                "product {} not available from this shop",
                selection.product_id
            )));
        }

        // Availability check only; stock is not reserved, so concurrent
        // orders for the same product can still oversell.
        if product.stock < selection.quantity {
            return Err(AppError::Validation(format!(
                "insufficient stock for {}",
                product.name
            )));
        }

        items.push(OrderItem {
            product_id: product.id,
            name: product.name.clone(),
            quantity: selection.quantity,
            unit_price: product.price,
        });
    }

    let now = Utc::now();
    let order = Order {
        id: Uuid::new_v4(),
        customer_id: identity.id,
        shop_owner_id,
        total: Order::compute_total(&items),
        items,
        status: OrderStatus::Pending,
        payment_status: PaymentStatus::Pending,
        created_at: now,
        updated_at: now,
    };

    state.orders.insert(order.id, order.clone());
    state.metrics.orders_created_total.inc();

    state.emit(OrderEvent::new(
        order.shop_owner_id,
        order.id,
        OrderEventKind::Created,
        format!("new order with {} item(s)", order.items.len()),
    ));

    info!(order_id = %order.id, customer_id = %order.customer_id, total = order.total, "order created");
    Ok(order)
}

pub fn get_order(state: &AppState, identity: &Identity, id: Uuid) -> Result<Order, AppError> {
    let order = state
        .orders
        .get(&id)
        .ok_or_else(|| AppError::NotFound("order not found".to_string()))?;

    let is_party = identity.id == order.customer_id || identity.id == order.shop_owner_id;
    if !is_party && identity.role != Role::Admin {
        return Err(AppError::NotFound("order not found".to_string()));
    }

    Ok(order.clone())
}

pub fn list_orders(state: &AppState, identity: &Identity) -> Vec<Order> {
    collect_orders(state, identity, &HistoryFilter::default())
}

pub fn order_history(state: &AppState, identity: &Identity, filter: &HistoryFilter) -> Vec<Order> {
    collect_orders(state, identity, filter)
}

fn collect_orders(state: &AppState, identity: &Identity, filter: &HistoryFilter) -> Vec<Order> {
    let mut orders: Vec<Order> = state
        .orders
        .iter()
        .filter(|entry| {
            let order = entry.value();
            let in_scope = match identity.role {
                Role::Customer => order.customer_id == identity.id,
                Role::ShopOwner => order.shop_owner_id == identity.id,
                Role::Admin => true,
            };

            in_scope
                && filter.status.is_none_or(|status| order.status == status)
                && filter.from.is_none_or(|from| order.created_at >= from)
                && filter.to.is_none_or(|to| order.created_at <= to)
        })
        .map(|entry| entry.value().clone())
        .collect();

    orders.sort_by_key(|order| order.created_at);
    orders
}

pub fn decide_order(
    state: &AppState,
    identity: &Identity,
    id: Uuid,
    approve: bool,
) -> Result<Order, AppError> {
    let updated = {
        let mut order = state
            .orders
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("order not found".to_string()))?;

        ensure_owner(identity, order.customer_id, "order")?;

        if !transitions::customer_may_decide(order.status) {
            return Err(AppError::InvalidTransition(
                "order can no longer be approved or rejected".to_string(),
            ));
        }

        order.status = if approve {
            OrderStatus::Approved
        } else {
            OrderStatus::Rejected
        };
        order.updated_at = Utc::now();
        order.clone()
    };

    record_transition(state, &updated);
    state.emit(OrderEvent::new(
        updated.shop_owner_id,
        updated.id,
        OrderEventKind::Decided,
        format!("order {:?}", updated.status).to_lowercase(),
    ));

    Ok(updated)
}

pub fn advance_status(
    state: &AppState,
    identity: &Identity,
    id: Uuid,
    status: OrderStatus,
) -> Result<Order, AppError> {
    let updated = {
        let mut order = state
            .orders
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("order not found".to_string()))?;

        ensure_owner(identity, order.shop_owner_id, "order")?;

        if !transitions::shop_owner_may_edit(order.status) {
            return Err(AppError::InvalidTransition(
                "order can no longer be edited".to_string(),
            ));
        }

        order.status = status;
        order.updated_at = Utc::now();
        order.clone()
    };

    record_transition(state, &updated);
    state.emit(OrderEvent::new(
        updated.customer_id,
        updated.id,
        OrderEventKind::StatusChanged,
        format!("order status changed to {:?}", updated.status).to_lowercase(),
    ));

    info!(order_id = %updated.id, status = ?updated.status, "order status updated");
    Ok(updated)
}

/// Cancellation removes the order outright; a cancelled order is no longer
/// visible to either party.
pub fn cancel_order(state: &AppState, identity: &Identity, id: Uuid) -> Result<(), AppError> {
    let removed = match state.orders.entry(id) {
        Entry::Vacant(_) => return Err(AppError::NotFound("order not found".to_string())),
        Entry::Occupied(entry) => {
            ensure_owner(identity, entry.get().customer_id, "order")?;

            if !transitions::cancellable(entry.get().status) {
                return Err(AppError::InvalidTransition(
                    "cannot cancel packed or completed orders".to_string(),
                ));
            }

            entry.remove()
        }
    };

    state
        .metrics
        .order_transitions_total
        .with_label_values(&["cancelled"])
        .inc();

    state.emit(OrderEvent::new(
        removed.shop_owner_id,
        removed.id,
        OrderEventKind::Cancelled,
        "order cancelled by customer".to_string(),
    ));

    info!(order_id = %removed.id, "order cancelled");
    Ok(())
}

pub fn set_payment_status(
    state: &AppState,
    identity: &Identity,
    id: Uuid,
    payment_status: PaymentStatus,
) -> Result<Order, AppError> {
    let updated = {
        let mut order = state
            .orders
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("order not found".to_string()))?;

        ensure_owner(identity, order.shop_owner_id, "order")?;

        order.payment_status = payment_status;
        order.updated_at = Utc::now();
        order.clone()
    };

    state.emit(OrderEvent::new(
        updated.customer_id,
        updated.id,
        OrderEventKind::PaymentChanged,
        format!("payment status changed to {:?}", updated.payment_status).to_lowercase(),
    ));

    Ok(updated)
}

fn record_transition(state: &AppState, order: &Order) {
    let label = match order.status {
        OrderStatus::Pending => "pending",
        OrderStatus::Approved => "approved",
        OrderStatus::Packed => "packed",
        OrderStatus::Completed => "completed",
        OrderStatus::Rejected => "rejected",
        OrderStatus::Cancelled => "cancelled",
    };

    state
        .metrics
        .order_transitions_total
        .with_label_values(&[label])
        .inc();
}
