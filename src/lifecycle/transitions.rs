//! Legal-transition predicates for the order status machine.
//!
//! The happy path is `pending -> approved -> packed -> completed`;
//! `rejected` and `cancelled` are terminal off-ramps reachable only
//! before packing.

use crate::models::order::OrderStatus;

/// Customers accept or reject an order only while it is still early in
/// the lifecycle.
pub fn customer_may_decide(status: OrderStatus) -> bool {
    matches!(status, OrderStatus::Pending | OrderStatus::Approved)
}

/// Shop owners may move an order to any status until it reaches a
/// terminal state. No stricter monotonic ordering is enforced.
pub fn shop_owner_may_edit(status: OrderStatus) -> bool {
    !status.is_terminal()
}

/// Cancellation is a customer off-ramp, closed once the order is packed.
pub fn cancellable(status: OrderStatus) -> bool {
    !matches!(status, OrderStatus::Packed | OrderStatus::Completed)
}
