use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Cents, Movement, Product, Quantity};

/// Post a movement against a product. The movement's quantity is already
/// signed, so posting is a plain addition with no floor.
///
/// Returns the new stock, or `None` if it would not fit in a `Quantity`.
/// The product is left untouched in that case.
#[must_use]
pub fn apply_movement(product: &mut Product, movement: &Movement) -> Option<Quantity> {
    let stock = product.current_stock.checked_add(movement.quantity)?;
    product.current_stock = stock;
    Some(stock)
}

/// Net stock change per SKU recorded in the log.
pub fn net_movement_by_sku(movements: &[Movement]) -> HashMap<String, Quantity> {
    let mut totals: HashMap<String, Quantity> = HashMap::new();

    for movement in movements {
        let total = totals.entry(movement.product_sku.clone()).or_insert(0);
        *total = total.saturating_add(movement.quantity);
    }

    totals
}

/// Units that left the store for one product within a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitTotal {
    pub sku: String,
    pub name: String,
    pub units: Quantity,
    pub count: i64,
}

/// Rank products by units exited (`Salida`) in `[from, to]`, highest first.
/// Ties are ordered by SKU. The name shown is the most recent snapshot.
pub fn rank_exits(
    movements: &[Movement],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Vec<ExitTotal> {
    let mut by_sku: HashMap<&str, ExitTotal> = HashMap::new();

    for movement in movements
        .iter()
        .filter(|m| m.is_exit() && m.timestamp >= from && m.timestamp <= to)
    {
        let total = by_sku
            .entry(movement.product_sku.as_str())
            .or_insert_with(|| ExitTotal {
                sku: movement.product_sku.clone(),
                name: movement.product_name.clone(),
                units: 0,
                count: 0,
            });
        total.units = total.units.saturating_add(movement.quantity.saturating_abs());
        total.count += 1;
        total.name = movement.product_name.clone();
    }

    let mut ranked: Vec<ExitTotal> = by_sku.into_values().collect();
    ranked.sort_by(|a, b| b.units.cmp(&a.units).then_with(|| a.sku.cmp(&b.sku)));
    ranked
}

/// Total value of the stock on hand, saturating at the `Cents` bounds.
pub fn inventory_value(products: &[Product]) -> Cents {
    products
        .iter()
        .map(Product::stock_value)
        .fold(0, Cents::saturating_add)
}

/// Products at or below their minimum stock, in catalog order.
pub fn low_stock_products(products: &[Product]) -> Vec<Product> {
    products.iter().filter(|p| p.is_low_stock()).cloned().collect()
}
