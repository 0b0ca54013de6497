//! Order models: persisted orders and their line items.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use canteen_core::{GatewayOrderId, ItemId, OrderId, OrderStatus, UserId};

/// A persisted order, created exactly once when a payment is captured.
///
/// Mutated only by staff status transitions after creation; never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub gateway_order_id: GatewayOrderId,
    pub user_id: UserId,
    pub user_email: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderLine>,
}

impl Order {
    /// Order total computed from the line-item price snapshots.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(OrderLine::line_total).sum()
    }
}

/// One line of an order. Immutable after creation; `price` is the snapshot
/// taken at purchase time, not a live reference to the catalog price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub item_id: ItemId,
    /// Current catalog name, if the item still exists.
    pub name: Option<String>,
    /// Current catalog image, if the item still exists.
    pub image_url: Option<String>,
    pub qty: u32,
    pub price: Decimal,
}

impl OrderLine {
    /// Line total: snapshot price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.qty)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_order_total_sums_line_snapshots() {
        let order = Order {
            id: OrderId::new(Uuid::from_u128(1)),
            gateway_order_id: GatewayOrderId::new("order_abc"),
            user_id: UserId::new("sub-1"),
            user_email: "student@campus.test".to_string(),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            items: vec![
                OrderLine {
                    item_id: ItemId::new(1),
                    name: Some("Item A".to_string()),
                    image_url: None,
                    qty: 2,
                    price: Decimal::from(100),
                },
                OrderLine {
                    item_id: ItemId::new(2),
                    name: None, // item since deleted from the catalog
                    image_url: None,
                    qty: 1,
                    price: Decimal::from(50),
                },
            ],
        };

        assert_eq!(order.total(), Decimal::from(250));
    }
}
