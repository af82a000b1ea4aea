// Each test binary uses a different subset of these helpers
#![allow(dead_code)]

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use stockroom::application::{LedgerService, RegisterMovement, StockPolicy};
use stockroom::domain::{MovementType, Product, ProductDraft};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Same as `test_service`, with a specific stock policy
pub async fn test_service_with_policy(policy: StockPolicy) -> Result<(LedgerService, TempDir)> {
    let (service, temp_dir) = test_service().await?;
    Ok((service.with_policy(policy), temp_dir))
}

/// Helper to parse a date string into DateTime<Utc>
pub fn parse_date(date_str: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}

/// Test fixture: the hardware store catalog
pub struct StandardCatalog;

impl StandardCatalog {
    /// Create FER-001..FER-005
    pub async fn create(service: &LedgerService) -> Result<Vec<Product>> {
        let drafts = [
            ("FER-001", "Martillo de Acero", "Herramientas", "150", "50", "25.90"),
            ("FER-002", "Destornillador Phillips", "Herramientas", "200", "30", "8.50"),
            ("FER-003", "Tubo PVC 2\"", "Gasfiteria", "80", "100", "12.00"),
            ("FER-004", "Cemento Portland", "Construccion", "500", "100", "28.00"),
            ("FER-005", "Pintura Latex Blanca", "Pinturas", "40", "20", "45.00"),
        ];

        let mut products = Vec::new();
        for (sku, name, category, stock, min, price) in drafts {
            let draft = ProductDraft::new(sku, name, category)
                .with_stock(stock)
                .with_min_stock(min)
                .with_price(price);
            products.push(service.add_product(draft).await?);
        }
        Ok(products)
    }

    /// Register a movement with a fixed reference
    pub async fn post(
        service: &LedgerService,
        sku: &str,
        movement_type: MovementType,
        quantity: i64,
        date: DateTime<Utc>,
    ) -> Result<()> {
        let request = RegisterMovement::new(sku, movement_type, quantity, "Guia de prueba")
            .with_timestamp(date);
        service.register_movement(request).await?;
        Ok(())
    }
}
