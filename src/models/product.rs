use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub shop_owner_id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub price: f64,
    pub stock: u32,
    pub created_at: DateTime<Utc>,
}
