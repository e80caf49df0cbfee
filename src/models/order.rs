use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One closed status vocabulary: a linear happy path plus two off-ramps
/// reachable only before packing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Approved,
    Packed,
    Completed,
    Rejected,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Completed | OrderStatus::Rejected | OrderStatus::Cancelled
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Disputed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub shop_owner_id: Uuid,
    pub items: Vec<OrderItem>,
    pub total: f64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Totals are always derived from the item list, never taken from a client.
    pub fn compute_total(items: &[OrderItem]) -> f64 {
        items
            .iter()
            .map(|item| f64::from(item.quantity) * item.unit_price)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{Order, OrderItem, OrderStatus};

    fn item(quantity: u32, unit_price: f64) -> OrderItem {
        OrderItem {
            product_id: Uuid::new_v4(),
            name: "test-item".to_string(),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn total_is_sum_of_quantity_times_price() {
        let items = vec![item(2, 10.0), item(1, 5.5)];
        let total = Order::compute_total(&items);
        assert!((total - 25.5).abs() < 1e-9);
    }

    #[test]
    fn total_of_no_items_is_zero() {
        assert_eq!(Order::compute_total(&[]), 0.0);
    }

    #[test]
    fn terminal_states() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Rejected.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Approved.is_terminal());
        assert!(!OrderStatus::Packed.is_terminal());
    }
}
