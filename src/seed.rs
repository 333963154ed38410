use anyhow::Context;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::account::{Role, User};
use crate::domain::catalog::Product;
use crate::domain::order::OrderStatus;
use crate::engine::{LineRequest, OrderEngine};

// ============================================================================
// Demo Seeding
// ============================================================================
//
// Opt-in startup loader: a small retail catalog, an admin and a couple of
// shoppers, and a handful of orders. Orders are driven through the engine
// rather than inserted directly, so seeded data satisfies the same
// invariants as live traffic (derived totals, consistent stock).
//
// ============================================================================

#[derive(Debug)]
pub struct DemoSummary {
    pub admin_user_id: Uuid,
    pub products: usize,
    pub users: usize,
    pub orders: usize,
}

const DEMO_CATALOG: &[(&str, &str, &str, u32)] = &[
    ("85123A", "WHITE HANGING HEART T-LIGHT HOLDER", "2.55", 120),
    ("85099B", "JUMBO BAG RED RETROSPOT", "1.95", 200),
    ("22423", "REGENCY CAKESTAND 3 TIER", "12.75", 40),
    ("47566", "PARTY BUNTING", "4.95", 80),
    ("84879", "ASSORTED COLOUR BIRD ORNAMENT", "1.69", 150),
];

pub fn load_demo_data(engine: &OrderEngine) -> anyhow::Result<DemoSummary> {
    let store = engine.store();

    // Users
    let admin = User::new("admin@example.com", "seeded_no_password", Role::Admin, "UK")
        .context("demo admin")?;
    let alice = User::new("alice@example.com", "seeded_no_password", Role::User, "France")
        .context("demo user")?;
    let bob = User::new("bob@example.com", "seeded_no_password", Role::User, "Germany")
        .context("demo user")?;
    let admin_id = admin.id;
    let alice_id = alice.id;
    let bob_id = bob.id;

    for user in [admin, alice, bob] {
        store
            .transaction(|txn| txn.insert_user(user.clone()))
            .context("seeding user")?;
    }

    // Catalog
    let mut product_ids = Vec::new();
    for &(code, name, price, stock) in DEMO_CATALOG {
        let price: Decimal = price.parse().context("demo price")?;
        let product = Product::new(code, name, price, stock).context("demo product")?;
        product_ids.push(product.id);
        store
            .transaction(|txn| txn.insert_product(product.clone()))
            .context("seeding product")?;
    }

    // Orders, through the engine so stock and totals stay consistent.
    let line = |i: usize, quantity: i64| LineRequest {
        product_id: product_ids[i],
        quantity,
    };

    let paid = engine.create_order(alice_id, &[line(0, 6), line(2, 1)])?;
    engine.update_status(paid.id, OrderStatus::Paid)?;

    let _pending = engine.create_order(bob_id, &[line(1, 10)])?;

    let cancelled = engine.create_order(bob_id, &[line(3, 2), line(4, 12)])?;
    engine.update_status(cancelled.id, OrderStatus::Cancelled)?;

    Ok(DemoSummary {
        admin_user_id: admin_id,
        products: product_ids.len(),
        users: 3,
        orders: 3,
    })
}

// ============================================================================
// Unit Tests
// ============================================================================
