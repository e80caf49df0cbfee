use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderEventKind {
    Created,
    Decided,
    StatusChanged,
    PaymentChanged,
    Cancelled,
}

/// Notification sent to the counter-party of a lifecycle transition.
/// Delivery is best-effort over the broadcast channel; a lost event never
/// rolls back the transition that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEvent {
    pub recipient_id: Uuid,
    pub order_id: Uuid,
    pub kind: OrderEventKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl OrderEvent {
    pub fn new(recipient_id: Uuid, order_id: Uuid, kind: OrderEventKind, message: String) -> Self {
        Self {
            recipient_id,
            order_id,
            kind,
            message,
            created_at: Utc::now(),
        }
    }
}
