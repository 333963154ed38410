use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::order::{Order, OrderStatus};
use crate::store::{MemoryStore, StoreInner};

// ============================================================================
// Reporting Engine - Read-Only Aggregations
// ============================================================================
//
// Stateless projections over orders, products, and users. Each report is a
// named pipeline of explicit stages (match -> group -> sort -> project) so
// the shape of the aggregation stays auditable. Nothing here mutates the
// store it reads.
//
// ============================================================================

pub const TOP_PRODUCTS_DEFAULT_LIMIT: usize = 10;
pub const TOP_PRODUCTS_MAX_LIMIT: usize = 50;
pub const COUNTRY_DEFAULT_LIMIT: usize = 20;
pub const COUNTRY_MAX_LIMIT: usize = 100;

/// Trailing window used by the inventory turnover report.
const TURNOVER_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Serialize)]
pub struct TopProductRow {
    pub product_id: Uuid,
    /// None when the product was deleted after the sales happened.
    pub code: Option<String>,
    pub name: Option<String>,
    pub revenue: Decimal,
    pub units: u64,
    pub orders: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CountryRevenueRow {
    pub country: String,
    pub revenue: Decimal,
    pub orders: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthRevenueRow {
    pub month: u32,
    pub revenue: Decimal,
    pub orders: u64,
}

/// Customer tier by cumulative paid spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentTier {
    Vip,
    Loyal,
    Standard,
    Occasional,
}

impl SegmentTier {
    fn from_spend(spend: Decimal) -> Self {
        if spend >= Decimal::from(5000) {
            Self::Vip
        } else if spend >= Decimal::from(1000) {
            Self::Loyal
        } else if spend >= Decimal::from(100) {
            Self::Standard
        } else {
            Self::Occasional
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerSegmentRow {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub country: Option<String>,
    pub total_spend: Decimal,
    pub orders: u64,
    pub tier: SegmentTier,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryTurnoverRow {
    pub product_id: Uuid,
    pub code: String,
    pub name: String,
    pub units_sold_30d: u64,
    pub stock: u32,
    /// Share of the trailing window's available units that sold:
    /// units_sold / (units_sold + current stock), in [0, 1].
    pub sold_through: f64,
}

pub struct ReportingEngine {
    store: Arc<MemoryStore>,
}

impl ReportingEngine {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// Top-N products by revenue within paid orders.
    pub fn top_products(&self, limit: Option<usize>) -> Vec<TopProductRow> {
        let limit = clamp_limit(limit, TOP_PRODUCTS_DEFAULT_LIMIT, TOP_PRODUCTS_MAX_LIMIT);

        self.store.read(|inner| {
            // match: paid orders only; unwind + group: per-product revenue,
            // units, distinct order count.
            struct Group {
                revenue: Decimal,
                units: u64,
                orders: HashSet<Uuid>,
            }
            let mut groups: HashMap<Uuid, Group> = HashMap::new();
            for order in paid_orders(inner) {
                for line in &order.items {
                    let group = groups.entry(line.product_id).or_insert_with(|| Group {
                        revenue: Decimal::ZERO,
                        units: 0,
                        orders: HashSet::new(),
                    });
                    group.revenue += line.subtotal();
                    group.units += u64::from(line.quantity);
                    group.orders.insert(order.id);
                }
            }

            // sort + limit
            let mut ranked: Vec<_> = groups.into_iter().collect();
            ranked.sort_by(|a, b| b.1.revenue.cmp(&a.1.revenue));
            ranked.truncate(limit);

            // project: join product code/name, tolerating deleted products.
            ranked
                .into_iter()
                .map(|(product_id, group)| {
                    let product = inner.products().find(|p| p.id == product_id);
                    TopProductRow {
                        product_id,
                        code: product.map(|p| p.code.clone()),
                        name: product.map(|p| p.name.clone()),
                        revenue: group.revenue,
                        units: group.units,
                        orders: group.orders.len() as u64,
                    }
                })
                .collect()
        })
    }

    /// Revenue grouped by order country, highest first.
    pub fn revenue_by_country(&self, limit: Option<usize>) -> Vec<CountryRevenueRow> {
        let limit = clamp_limit(limit, COUNTRY_DEFAULT_LIMIT, COUNTRY_MAX_LIMIT);

        self.store.read(|inner| {
            let mut groups: HashMap<String, (Decimal, u64)> = HashMap::new();
            for order in paid_orders(inner) {
                let entry = groups
                    .entry(order.country.clone())
                    .or_insert((Decimal::ZERO, 0));
                entry.0 += order.total;
                entry.1 += 1;
            }

            let mut ranked: Vec<_> = groups
                .into_iter()
                .map(|(country, (revenue, orders))| CountryRevenueRow {
                    country,
                    revenue,
                    orders,
                })
                .collect();
            ranked.sort_by(|a, b| b.revenue.cmp(&a.revenue));
            ranked.truncate(limit);
            ranked
        })
    }

    /// Revenue per calendar month of the given year, paid orders only.
    /// Months without sales are omitted.
    pub fn revenue_by_month(&self, year: i32) -> Vec<MonthRevenueRow> {
        self.store.read(|inner| {
            let mut groups: HashMap<u32, (Decimal, u64)> = HashMap::new();
            for order in paid_orders(inner) {
                if order.created_at.year() != year {
                    continue;
                }
                let entry = groups
                    .entry(order.created_at.month())
                    .or_insert((Decimal::ZERO, 0));
                entry.0 += order.total;
                entry.1 += 1;
            }

            let mut rows: Vec<_> = groups
                .into_iter()
                .map(|(month, (revenue, orders))| MonthRevenueRow {
                    month,
                    revenue,
                    orders,
                })
                .collect();
            rows.sort_by_key(|r| r.month);
            rows
        })
    }

    /// Customers bucketed by cumulative paid spend, biggest spenders first.
    pub fn customer_segments(&self) -> Vec<CustomerSegmentRow> {
        self.store.read(|inner| {
            let mut groups: HashMap<Uuid, (Decimal, u64)> = HashMap::new();
            for order in paid_orders(inner) {
                let entry = groups
                    .entry(order.owner_user_id)
                    .or_insert((Decimal::ZERO, 0));
                entry.0 += order.total;
                entry.1 += 1;
            }

            let mut rows: Vec<_> = groups
                .into_iter()
                .map(|(user_id, (total_spend, orders))| {
                    let user = inner.users().find(|u| u.id == user_id);
                    CustomerSegmentRow {
                        user_id,
                        email: user.map(|u| u.email.clone()),
                        country: user.map(|u| u.country.clone()),
                        total_spend,
                        orders,
                        tier: SegmentTier::from_spend(total_spend),
                    }
                })
                .collect();
            rows.sort_by(|a, b| b.total_spend.cmp(&a.total_spend));
            rows
        })
    }

    /// Per-product sales over the trailing 30 days against current stock.
    /// Every catalog product gets a row; products sold out of the window
    /// report zero units.
    pub fn inventory_turnover(&self, now: DateTime<Utc>) -> Vec<InventoryTurnoverRow> {
        let window_start = now - Duration::days(TURNOVER_WINDOW_DAYS);

        self.store.read(|inner| {
            let mut sold: HashMap<Uuid, u64> = HashMap::new();
            for order in paid_orders(inner) {
                if order.created_at < window_start || order.created_at > now {
                    continue;
                }
                for line in &order.items {
                    *sold.entry(line.product_id).or_insert(0) += u64::from(line.quantity);
                }
            }

            let mut rows: Vec<_> = inner
                .products()
                .map(|product| {
                    let units = sold.get(&product.id).copied().unwrap_or(0);
                    let pool = units + u64::from(product.stock);
                    let sold_through = if pool == 0 {
                        0.0
                    } else {
                        units as f64 / pool as f64
                    };
                    InventoryTurnoverRow {
                        product_id: product.id,
                        code: product.code.clone(),
                        name: product.name.clone(),
                        units_sold_30d: units,
                        stock: product.stock,
                        sold_through,
                    }
                })
                .collect();
            rows.sort_by(|a, b| b.units_sold_30d.cmp(&a.units_sold_30d));
            rows
        })
    }
}

fn paid_orders(inner: &StoreInner) -> impl Iterator<Item = &Order> {
    inner.orders().filter(|o| o.status == OrderStatus::Paid)
}

fn clamp_limit(limit: Option<usize>, default: usize, max: usize) -> usize {
    limit.unwrap_or(default).clamp(1, max)
}

// ============================================================================
// Unit Tests
// ============================================================================
