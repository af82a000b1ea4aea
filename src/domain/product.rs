use serde::{Deserialize, Serialize};

use super::{Cents, coerce_price};

pub type ProductId = i64;

/// Stock quantities are whole units and may be negative.
pub type Quantity = i64;

/// Derived stock status shown next to every product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StockStatus {
    #[serde(rename = "En Stock")]
    EnStock,
    #[serde(rename = "Bajo Stock")]
    BajoStock,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::EnStock => "En Stock",
            StockStatus::BajoStock => "Bajo Stock",
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Assigned by the catalog, never changes afterwards
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    pub category: String,
    pub current_stock: Quantity,
    /// Reorder threshold; at or below it the product is low on stock
    pub min_stock: Quantity,
    pub price_cents: Cents,
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.min_stock
    }

    pub fn status(&self) -> StockStatus {
        if self.is_low_stock() {
            StockStatus::BajoStock
        } else {
            StockStatus::EnStock
        }
    }

    /// Value of the units on hand. Negative stock yields a negative value.
    pub fn stock_value(&self) -> Cents {
        self.current_stock.saturating_mul(self.price_cents)
    }

    /// Merge a patch onto this product. The id is never touched.
    pub fn apply_patch(&mut self, patch: ProductPatch) {
        if let Some(sku) = patch.sku {
            self.sku = sku;
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(current_stock) = patch.current_stock {
            self.current_stock = current_stock;
        }
        if let Some(min_stock) = patch.min_stock {
            self.min_stock = min_stock;
        }
        if let Some(price_cents) = patch.price_cents {
            self.price_cents = price_cents;
        }
    }
}

/// Raw input for a new product, as typed into a form or a command line.
/// Numeric fields are text and get coerced when the product is created.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductDraft {
    pub sku: String,
    pub name: String,
    pub category: String,
    pub current_stock: String,
    pub min_stock: String,
    pub price: String,
}

impl ProductDraft {
    pub fn new(
        sku: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            sku: sku.into(),
            name: name.into(),
            category: category.into(),
            ..Default::default()
        }
    }

    pub fn with_stock(mut self, current_stock: impl Into<String>) -> Self {
        self.current_stock = current_stock.into();
        self
    }

    pub fn with_min_stock(mut self, min_stock: impl Into<String>) -> Self {
        self.min_stock = min_stock.into();
        self
    }

    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = price.into();
        self
    }

    /// Names of the required text fields that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.sku.trim().is_empty() {
            missing.push("sku");
        }
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.category.trim().is_empty() {
            missing.push("category");
        }
        missing
    }

    /// Build the product with the given id, coercing numeric text.
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            current_stock: coerce_quantity(&self.current_stock),
            min_stock: coerce_quantity(&self.min_stock),
            price_cents: coerce_price(&self.price),
            sku: self.sku.trim().to_string(),
            name: self.name.trim().to_string(),
            category: self.category.trim().to_string(),
        }
    }
}

/// Partial update for a product. There is no id field: an `id` key in
/// serialized input is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductPatch {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub current_stock: Option<Quantity>,
    pub min_stock: Option<Quantity>,
    pub price_cents: Option<Cents>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        *self == ProductPatch::default()
    }

    /// Trim the text fields the same way a draft is trimmed on creation.
    pub fn trimmed(self) -> Self {
        let trim = |value: Option<String>| value.map(|v| v.trim().to_string());
        Self {
            sku: trim(self.sku),
            name: trim(self.name),
            category: trim(self.category),
            ..self
        }
    }
}

/// Coerce quantity text to whole units. Decimal text is truncated toward
/// zero; anything unparsable counts as zero.
pub fn coerce_quantity(input: &str) -> Quantity {
    let input = input.trim();
    if let Ok(units) = input.parse::<i64>() {
        return units;
    }
    match input.parse::<f64>() {
        Ok(value) if value.is_finite() => value.trunc() as Quantity,
        _ => 0,
    }
}
