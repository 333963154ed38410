use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::domain::account::{AccountError, User};
use crate::domain::catalog::{CatalogError, Product};
use crate::domain::order::{Order, OrderEventRecord, OrderStatus};

// ============================================================================
// MemoryStore - Catalog, Accounts, Orders, Audit Log
// ============================================================================

/// Failure modes of the atomic stock adjustment.
#[derive(Debug, thiserror::Error)]
pub enum StockError {
    #[error("Product not found: {0}")]
    NotFound(Uuid),

    #[error("Insufficient stock: requested {requested}, available {available}")]
    Insufficient { requested: u32, available: u32 },
}

/// Filter applied by the admin order listing.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub owner_user_id: Option<Uuid>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
}

impl OrderFilter {
    fn matches(&self, order: &Order) -> bool {
        if let Some(status) = self.status {
            if order.status != status {
                return false;
            }
        }
        if let Some(owner) = self.owner_user_id {
            if order.owner_user_id != owner {
                return false;
            }
        }
        if let Some(after) = self.created_after {
            if order.created_at < after {
                return false;
            }
        }
        if let Some(before) = self.created_before {
            if order.created_at > before {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct StoreInner {
    products: HashMap<Uuid, Product>,
    product_codes: HashMap<String, Uuid>,
    users: HashMap<Uuid, User>,
    user_emails: HashMap<String, Uuid>,
    orders: HashMap<Uuid, Order>,
    order_events: Vec<OrderEventRecord>,
}

impl StoreInner {
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    pub fn order_events(&self) -> &[OrderEventRecord] {
        &self.order_events
    }
}

/// Mutable view handed to a transaction closure. All mutations land on a
/// working copy; the store swaps it in only if the closure returns `Ok`.
pub struct Txn<'a> {
    inner: &'a mut StoreInner,
}

impl Txn<'_> {
    // --- catalog -----------------------------------------------------------

    pub fn product(&self, id: Uuid) -> Option<&Product> {
        self.inner.products.get(&id)
    }

    pub fn insert_product(&mut self, product: Product) -> Result<(), CatalogError> {
        if self.inner.product_codes.contains_key(&product.code) {
            return Err(CatalogError::DuplicateCode(product.code));
        }
        self.inner.product_codes.insert(product.code.clone(), product.id);
        self.inner.products.insert(product.id, product);
        Ok(())
    }

    pub fn update_product(&mut self, product: Product) -> Result<(), CatalogError> {
        if !self.inner.products.contains_key(&product.id) {
            return Err(CatalogError::ProductNotFound(product.id));
        }
        self.inner.products.insert(product.id, product);
        Ok(())
    }

    pub fn remove_product(&mut self, id: Uuid) -> Option<Product> {
        let product = self.inner.products.remove(&id)?;
        self.inner.product_codes.remove(&product.code);
        Some(product)
    }

    /// Atomic stock adjustment. Positive delta restores units, negative
    /// delta reserves them; reservation fails rather than underflow.
    pub fn adjust_stock(&mut self, id: Uuid, delta: i64) -> Result<u32, StockError> {
        let product = self
            .inner
            .products
            .get_mut(&id)
            .ok_or(StockError::NotFound(id))?;

        let new_stock = if delta < 0 {
            let requested = delta.unsigned_abs() as u32;
            u32::checked_sub(product.stock, requested).ok_or(StockError::Insufficient {
                requested,
                available: product.stock,
            })?
        } else {
            product.stock.saturating_add(delta as u32)
        };

        product.stock = new_stock;
        product.updated_at = Utc::now();
        Ok(new_stock)
    }

    // --- accounts ----------------------------------------------------------

    pub fn user(&self, id: Uuid) -> Option<&User> {
        self.inner.users.get(&id)
    }

    pub fn insert_user(&mut self, user: User) -> Result<(), AccountError> {
        if self.inner.user_emails.contains_key(&user.email) {
            return Err(AccountError::DuplicateEmail(user.email));
        }
        self.inner.user_emails.insert(user.email.clone(), user.id);
        self.inner.users.insert(user.id, user);
        Ok(())
    }

    // --- orders ------------------------------------------------------------

    pub fn order(&self, id: Uuid) -> Option<&Order> {
        self.inner.orders.get(&id)
    }

    pub fn order_mut(&mut self, id: Uuid) -> Option<&mut Order> {
        self.inner.orders.get_mut(&id)
    }

    pub fn insert_order(&mut self, order: Order) {
        self.inner.orders.insert(order.id, order);
    }

    pub fn remove_order(&mut self, id: Uuid) -> Option<Order> {
        self.inner.orders.remove(&id)
    }

    // --- audit -------------------------------------------------------------

    pub fn record_event(&mut self, record: OrderEventRecord) {
        self.inner.order_events.push(record);
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<StoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a write transaction. The closure mutates a working copy of the
    /// store; on `Ok` the copy replaces the live state, on `Err` it is
    /// dropped and no write becomes visible.
    pub fn transaction<T, E>(&self, f: impl FnOnce(&mut Txn<'_>) -> Result<T, E>) -> Result<T, E> {
        let mut guard = self.inner.write();
        let mut working = guard.clone();
        let result = f(&mut Txn { inner: &mut working });
        if result.is_ok() {
            *guard = working;
        }
        result
    }

    /// Run a read-only projection over a consistent snapshot.
    pub fn read<T>(&self, f: impl FnOnce(&StoreInner) -> T) -> T {
        f(&self.inner.read())
    }

    // --- typed read helpers ------------------------------------------------

    pub fn find_product(&self, id: Uuid) -> Option<Product> {
        self.read(|inner| inner.products.get(&id).cloned())
    }

    pub fn find_product_by_code(&self, code: &str) -> Option<Product> {
        self.read(|inner| {
            let id = inner.product_codes.get(code)?;
            inner.products.get(id).cloned()
        })
    }

    pub fn find_user(&self, id: Uuid) -> Option<User> {
        self.read(|inner| inner.users.get(&id).cloned())
    }

    pub fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.read(|inner| {
            let id = inner.user_emails.get(email)?;
            inner.users.get(id).cloned()
        })
    }

    pub fn find_order(&self, id: Uuid) -> Option<Order> {
        self.read(|inner| inner.orders.get(&id).cloned())
    }

    /// Products sorted by code, for stable listings.
    pub fn list_products(&self) -> Vec<Product> {
        self.read(|inner| {
            let mut products: Vec<_> = inner.products.values().cloned().collect();
            products.sort_by(|a, b| a.code.cmp(&b.code));
            products
        })
    }

    /// Users sorted by email.
    pub fn list_users(&self) -> Vec<User> {
        self.read(|inner| {
            let mut users: Vec<_> = inner.users.values().cloned().collect();
            users.sort_by(|a, b| a.email.cmp(&b.email));
            users
        })
    }

    /// Orders matching the filter, newest first.
    pub fn list_orders(&self, filter: &OrderFilter) -> Vec<Order> {
        self.read(|inner| {
            let mut orders: Vec<_> = inner
                .orders
                .values()
                .filter(|o| filter.matches(o))
                .cloned()
                .collect();
            orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            orders
        })
    }

    pub fn order_events_for(&self, order_id: Uuid) -> Vec<OrderEventRecord> {
        self.read(|inner| {
            inner
                .order_events
                .iter()
                .filter(|r| r.order_id == order_id)
                .cloned()
                .collect()
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::Role;
    use rust_decimal_macros::dec;

    fn product(code: &str, stock: u32) -> Product {
        Product::new(code, format!("product {code}"), dec!(10.00), stock).unwrap()
    }

    #[test]
    fn test_failed_transaction_leaves_no_writes() {
        let store = MemoryStore::new();
        let p = product("X1", 5);
        let id = p.id;
        store
            .transaction(|txn| txn.insert_product(p))
            .unwrap();

        let result: Result<(), StockError> = store.transaction(|txn| {
            txn.adjust_stock(id, -2)?;
            // Second adjustment fails; the first must not stick.
            txn.adjust_stock(id, -10)?;
            Ok(())
        });

        assert!(matches!(result, Err(StockError::Insufficient { .. })));
        assert_eq!(store.find_product(id).unwrap().stock, 5);
    }

    #[test]
    fn test_adjust_stock_never_underflows() {
        let store = MemoryStore::new();
        let p = product("X1", 3);
        let id = p.id;
        store.transaction(|txn| txn.insert_product(p)).unwrap();

        let err = store
            .transaction(|txn| txn.adjust_stock(id, -4))
            .unwrap_err();
        assert!(matches!(
            err,
            StockError::Insufficient {
                requested: 4,
                available: 3
            }
        ));

        store.transaction::<_, StockError>(|txn| txn.adjust_stock(id, -3)).unwrap();
        assert_eq!(store.find_product(id).unwrap().stock, 0);
    }

    #[test]
    fn test_duplicate_product_code_rejected() {
        let store = MemoryStore::new();
        store
            .transaction(|txn| txn.insert_product(product("X1", 1)))
            .unwrap();
        let err = store
            .transaction(|txn| txn.insert_product(product("X1", 9)))
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateCode(_)));
    }

    #[test]
    fn test_remove_product_frees_code() {
        let store = MemoryStore::new();
        let p = product("X1", 1);
        let id = p.id;
        store.transaction(|txn| txn.insert_product(p)).unwrap();
        store
            .transaction::<_, CatalogError>(|txn| {
                txn.remove_product(id);
                Ok(())
            })
            .unwrap();

        assert!(store.find_product_by_code("X1").is_none());
        store
            .transaction(|txn| txn.insert_product(product("X1", 2)))
            .unwrap();
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        let user = User::new("a@example.com", "h", Role::User, "UK").unwrap();
        store.transaction(|txn| txn.insert_user(user)).unwrap();

        let dup = User::new("a@example.com", "h2", Role::User, "UK").unwrap();
        let err = store.transaction(|txn| txn.insert_user(dup)).unwrap_err();
        assert!(matches!(err, AccountError::DuplicateEmail(_)));
    }

    #[test]
    fn test_order_filter_by_status_and_owner() {
        use crate::domain::order::{Order, OrderLine};

        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let line = OrderLine {
            product_id: Uuid::new_v4(),
            quantity: 1,
            price_at_purchase: dec!(5.00),
        };

        let mut paid = Order::new(owner, "UK", vec![line.clone()]);
        paid.transition_to(OrderStatus::Paid).unwrap();
        let pending = Order::new(Uuid::new_v4(), "UK", vec![line]);

        store
            .transaction::<_, StockError>(|txn| {
                txn.insert_order(paid.clone());
                txn.insert_order(pending.clone());
                Ok(())
            })
            .unwrap();

        let filter = OrderFilter {
            status: Some(OrderStatus::Paid),
            ..Default::default()
        };
        let listed = store.list_orders(&filter);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, paid.id);

        let filter = OrderFilter {
            owner_user_id: Some(owner),
            ..Default::default()
        };
        assert_eq!(store.list_orders(&filter).len(), 1);
    }
}
