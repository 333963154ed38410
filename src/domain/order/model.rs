use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::OrderError;

// ============================================================================
// Order Model - Lines, Status Machine, Derived Total
// ============================================================================

/// One product/quantity/price entry within an order. The price is a
/// snapshot taken when the line was added, never a live reference to the
/// catalog price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub quantity: u32,
    pub price_at_purchase: Decimal,
}

impl OrderLine {
    pub fn subtotal(&self) -> Decimal {
        self.price_at_purchase * Decimal::from(self.quantity)
    }
}

/// Canonical order lifecycle. The source material carried two divergent
/// enums; this crate keeps the three-state machine:
///
/// ```text
///   [pending] --paid--> [paid] --cancelled--> [cancelled]
///       \______________cancelled_____________/^
/// ```
///
/// `Cancelled` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Cancelled,
}

impl OrderStatus {
    /// Item mutation is only allowed while pending.
    pub fn is_mutable(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Legal transitions: pending -> paid, pending -> cancelled,
    /// paid -> cancelled (admin override). Everything else is rejected,
    /// including cancelled -> cancelled, so stock is never double-restored.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Paid)
                | (Self::Pending, Self::Cancelled)
                | (Self::Paid, Self::Cancelled)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub owner_user_id: Uuid,

    /// Denormalized from the owner at creation, used by country reports.
    pub country: String,

    pub status: OrderStatus,
    pub items: Vec<OrderLine>,

    /// Derived value: always Σ(line.quantity × line.price_at_purchase)
    /// over the current items. Recomputed with every item mutation.
    pub total: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Build a new pending order from already-validated lines.
    pub fn new(owner_user_id: Uuid, country: impl Into<String>, items: Vec<OrderLine>) -> Self {
        let now = Utc::now();
        let mut order = Self {
            id: Uuid::new_v4(),
            owner_user_id,
            country: country.into(),
            status: OrderStatus::Pending,
            items,
            total: Decimal::ZERO,
            created_at: now,
            updated_at: now,
            cancelled_at: None,
        };
        order.recompute_total();
        order
    }

    /// Recompute the derived total from current lines. Callers mutate
    /// `items` and invoke this in the same transaction.
    pub fn recompute_total(&mut self) {
        self.total = self.items.iter().map(OrderLine::subtotal).sum();
        self.updated_at = Utc::now();
    }

    /// Append a line. Stock has already been validated and decremented by
    /// the enclosing transaction.
    pub fn push_line(&mut self, line: OrderLine) -> Result<(), OrderError> {
        if !self.status.is_mutable() {
            return Err(OrderError::OrderNotMutable(self.status));
        }
        self.items.push(line);
        self.recompute_total();
        Ok(())
    }

    /// Remove every line for the given product (whole-product removal, not
    /// partial quantity). Removal does not restore stock; only full order
    /// cancellation does.
    pub fn remove_product_lines(&mut self, product_id: Uuid) -> Result<u32, OrderError> {
        if !self.status.is_mutable() {
            return Err(OrderError::OrderNotMutable(self.status));
        }

        let before = self.items.len();
        let removed_units: u32 = self
            .items
            .iter()
            .filter(|l| l.product_id == product_id)
            .map(|l| l.quantity)
            .sum();
        self.items.retain(|l| l.product_id != product_id);

        if self.items.len() == before {
            return Err(OrderError::LineNotFound {
                order_id: self.id,
                product_id,
            });
        }

        self.recompute_total();
        Ok(removed_units)
    }

    /// Move to a new status, enforcing the lifecycle machine. The caller
    /// owns the stock restoration that accompanies a move to `Cancelled`.
    pub fn transition_to(&mut self, target: OrderStatus) -> Result<(), OrderError> {
        if !self.status.can_transition_to(target) {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        self.updated_at = Utc::now();
        if target == OrderStatus::Cancelled {
            self.cancelled_at = Some(self.updated_at);
        }
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(qty: u32, price: Decimal) -> OrderLine {
        OrderLine {
            product_id: Uuid::new_v4(),
            quantity: qty,
            price_at_purchase: price,
        }
    }

    #[test]
    fn test_total_derived_from_lines() {
        let order = Order::new(
            Uuid::new_v4(),
            "France",
            vec![line(3, dec!(10.00)), line(1, dec!(20.00))],
        );
        assert_eq!(order.total, dec!(50.00));
    }

    #[test]
    fn test_push_line_recomputes_total() {
        let mut order = Order::new(Uuid::new_v4(), "UK", vec![line(2, dec!(10.00))]);
        order.push_line(line(1, dec!(5.50))).unwrap();
        assert_eq!(order.total, dec!(25.50));
    }

    #[test]
    fn test_remove_product_lines_recomputes_total() {
        let keep = line(2, dec!(10.00));
        let drop = line(1, dec!(20.00));
        let removed_id = drop.product_id;
        let mut order = Order::new(Uuid::new_v4(), "UK", vec![keep, drop]);
        assert_eq!(order.total, dec!(40.00));

        let removed_units = order.remove_product_lines(removed_id).unwrap();
        assert_eq!(removed_units, 1);
        assert_eq!(order.total, dec!(20.00));
        assert_eq!(order.items.len(), 1);
    }

    #[test]
    fn test_remove_unknown_product_fails() {
        let mut order = Order::new(Uuid::new_v4(), "UK", vec![line(2, dec!(10.00))]);
        let err = order.remove_product_lines(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, OrderError::LineNotFound { .. }));
    }

    #[test]
    fn test_removes_all_lines_for_product() {
        let product_id = Uuid::new_v4();
        let mut order = Order::new(
            Uuid::new_v4(),
            "UK",
            vec![
                OrderLine {
                    product_id,
                    quantity: 2,
                    price_at_purchase: dec!(10.00),
                },
                line(1, dec!(7.00)),
                OrderLine {
                    product_id,
                    quantity: 3,
                    price_at_purchase: dec!(10.00),
                },
            ],
        );

        let removed_units = order.remove_product_lines(product_id).unwrap();
        assert_eq!(removed_units, 5);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.total, dec!(7.00));
    }

    #[test]
    fn test_legal_transitions() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Paid));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Paid.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_cancelled_is_terminal() {
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Paid));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_no_backwards_transition() {
        assert!(!OrderStatus::Paid.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn test_mutation_rejected_after_cancel() {
        let mut order = Order::new(Uuid::new_v4(), "UK", vec![line(1, dec!(10.00))]);
        order.transition_to(OrderStatus::Cancelled).unwrap();

        let err = order.push_line(line(1, dec!(1.00))).unwrap_err();
        assert!(matches!(
            err,
            OrderError::OrderNotMutable(OrderStatus::Cancelled)
        ));
    }

    #[test]
    fn test_transition_stamps_cancelled_at() {
        let mut order = Order::new(Uuid::new_v4(), "UK", vec![line(1, dec!(10.00))]);
        assert!(order.cancelled_at.is_none());
        order.transition_to(OrderStatus::Cancelled).unwrap();
        assert!(order.cancelled_at.is_some());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&OrderStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
        let status: OrderStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(status, OrderStatus::Cancelled);
    }
}
