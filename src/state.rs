use dashmap::DashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::auth::token::TokenSigner;
use crate::events::OrderEvent;
use crate::models::order::Order;
use crate::models::product::Product;
use crate::models::user::User;
use crate::observability::metrics::Metrics;

pub struct AppState {
    pub users: DashMap<Uuid, User>,
    pub emails: DashMap<String, Uuid>,
    pub products: DashMap<Uuid, Product>,
    pub orders: DashMap<Uuid, Order>,
    pub tokens: TokenSigner,
    pub order_events_tx: broadcast::Sender<OrderEvent>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(tokens: TokenSigner, event_buffer_size: usize) -> Self {
        let (order_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        Self {
            users: DashMap::new(),
            emails: DashMap::new(),
            products: DashMap::new(),
            orders: DashMap::new(),
            tokens,
            order_events_tx,
            metrics: Metrics::new(),
        }
    }

    /// Best-effort notification emit; no subscriber is not an error.
    pub fn emit(&self, event: OrderEvent) {
        self.metrics.order_events_total.inc();
        let _ = self.order_events_tx.send(event);
    }
}
