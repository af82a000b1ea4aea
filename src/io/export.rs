use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::LedgerService;
use crate::domain::{Movement, Product, format_cents};

/// Whole-database snapshot: the catalog and the log, as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub products: Vec<Product>,
    pub movements: Vec<Movement>,
}

/// Exporter for writing inventory data out
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export the product catalog to CSV
    pub async fn export_products_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let products = self.service.list_products().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "sku",
            "name",
            "category",
            "current_stock",
            "min_stock",
            "price",
            "status",
        ])?;

        for product in &products {
            csv_writer.write_record([
                product.id.to_string(),
                product.sku.clone(),
                product.name.clone(),
                product.category.clone(),
                product.current_stock.to_string(),
                product.min_stock.to_string(),
                format_cents(product.price_cents),
                product.status().to_string(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(products.len())
    }

    /// Export the movement log to CSV, oldest first
    pub async fn export_movements_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let movements = self.service.list_movements().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "timestamp",
            "sku",
            "product",
            "type",
            "quantity",
            "user",
            "reference",
        ])?;

        for movement in &movements {
            csv_writer.write_record([
                movement.id.to_string(),
                movement.timestamp.to_rfc3339(),
                movement.product_sku.clone(),
                movement.product_name.clone(),
                movement.movement_type.to_string(),
                movement.quantity.to_string(),
                movement.user.clone(),
                movement.reference.clone(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(movements.len())
    }

    /// Export everything as a JSON snapshot
    pub async fn export_full_json<W: Write>(&self, mut writer: W) -> Result<InventorySnapshot> {
        let snapshot = InventorySnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            products: self.service.list_products().await?,
            movements: self.service.list_movements().await?,
        };

        serde_json::to_writer_pretty(&mut writer, &snapshot)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        Ok(snapshot)
    }
}
