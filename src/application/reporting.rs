use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Cents, ExitTotal, Product, Quantity, StockStatus};

/// Full stock listing with valuation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockReport {
    pub generated_at: DateTime<Utc>,
    pub lines: Vec<StockLine>,
    pub total_value: Cents,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockLine {
    pub sku: String,
    pub name: String,
    pub category: String,
    pub current_stock: Quantity,
    pub min_stock: Quantity,
    pub price_cents: Cents,
    pub value: Cents,
    /// Net change recorded in the movement log for this SKU
    pub net_movement: Quantity,
    pub status: StockStatus,
}

/// Products at or below their minimum stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAlertsReport {
    pub generated_at: DateTime<Utc>,
    pub products: Vec<StockAlert>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAlert {
    pub sku: String,
    pub name: String,
    pub current_stock: Quantity,
    pub min_stock: Quantity,
    /// Units needed to get back to the minimum
    pub shortfall: Quantity,
}

impl From<&Product> for StockAlert {
    fn from(product: &Product) -> Self {
        Self {
            sku: product.sku.clone(),
            name: product.name.clone(),
            current_stock: product.current_stock,
            min_stock: product.min_stock,
            shortfall: product
                .min_stock
                .saturating_sub(product.current_stock)
                .max(0),
        }
    }
}

/// Best sellers: products ranked by units exited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopExitsReport {
    pub from_date: DateTime<Utc>,
    pub to_date: DateTime<Utc>,
    pub products: Vec<ExitTotal>,
}

/// Headline numbers for the dashboard cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySummary {
    pub product_count: usize,
    pub inventory_value: Cents,
    pub low_stock_count: usize,
    pub movement_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProductDraft;

    fn pipe(stock: &str, min: &str) -> Product {
        ProductDraft::new("FER-003", "Tubo PVC 2\"", "Gasfiteria")
            .with_stock(stock)
            .with_min_stock(min)
            .with_price("12.00")
            .into_product(3)
    }

    #[test]
    fn test_shortfall() {
        assert_eq!(StockAlert::from(&pipe("80", "100")).shortfall, 20);
        assert_eq!(StockAlert::from(&pipe("100", "100")).shortfall, 0);
        assert_eq!(StockAlert::from(&pipe("-50", "20")).shortfall, 70);
    }

    #[test]
    fn test_shortfall_saturates_on_deep_backorder() {
        let min = i64::MAX.to_string();
        let stock = (i64::MIN + 1).to_string();
        assert_eq!(StockAlert::from(&pipe(&stock, &min)).shortfall, i64::MAX);
    }
}
