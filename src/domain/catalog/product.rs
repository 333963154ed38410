use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::CatalogError;

// ============================================================================
// Product - Catalog Model
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,

    /// Unique stock code, e.g. "X1" or "85123A"
    pub code: String,
    pub name: String,
    pub unit_price: Decimal,

    /// Count of sellable units currently available. Unsigned by
    /// construction, so stock can never go negative.
    pub stock: u32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Validate fields and build a new catalog entry.
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        unit_price: Decimal,
        stock: u32,
    ) -> Result<Self, CatalogError> {
        let code = code.into();
        let name = name.into();

        if code.trim().is_empty() {
            return Err(CatalogError::EmptyCode);
        }
        if name.trim().is_empty() {
            return Err(CatalogError::EmptyName);
        }
        if unit_price.is_sign_negative() {
            return Err(CatalogError::NegativePrice);
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            code,
            name,
            unit_price,
            stock,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a catalog administration update (name/price/stock level).
    /// Stock movements driven by orders go through the store transaction
    /// instead, so they stay atomic with the order write.
    pub fn apply_update(
        &mut self,
        name: Option<String>,
        unit_price: Option<Decimal>,
        stock: Option<u32>,
    ) -> Result<(), CatalogError> {
        if let Some(name) = name {
            if name.trim().is_empty() {
                return Err(CatalogError::EmptyName);
            }
            self.name = name;
        }
        if let Some(price) = unit_price {
            if price.is_sign_negative() {
                return Err(CatalogError::NegativePrice);
            }
            self.unit_price = price;
        }
        if let Some(stock) = stock {
            self.stock = stock;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
