mod common;

use anyhow::Result;
use common::{StandardCatalog, parse_date, test_service};
use stockroom::application::RegisterMovement;
use stockroom::domain::MovementType;
use stockroom::io::{Exporter, ImportOptions, Importer, InventorySnapshot};

#[tokio::test]
async fn test_export_products_csv() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardCatalog::create(&service).await?;

    let mut buffer = Vec::new();
    let count = Exporter::new(&service)
        .export_products_csv(&mut buffer)
        .await?;

    assert_eq!(count, 5);
    let csv = String::from_utf8(buffer)?;
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("id,sku,name,category,current_stock,min_stock,price,status")
    );
    assert_eq!(
        lines.next(),
        Some("1,FER-001,Martillo de Acero,Herramientas,150,50,25.90,En Stock")
    );

    Ok(())
}

#[tokio::test]
async fn test_export_movements_csv() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardCatalog::create(&service).await?;
    StandardCatalog::post(&service, "FER-002", MovementType::Salida, 4, parse_date("2024-04-02")).await?;

    let mut buffer = Vec::new();
    let count = Exporter::new(&service)
        .export_movements_csv(&mut buffer)
        .await?;

    assert_eq!(count, 1);
    let csv = String::from_utf8(buffer)?;
    assert!(csv.contains(
        "1,2024-04-02T00:00:00+00:00,FER-002,Destornillador Phillips,Salida,-4,Admin,Guia de prueba"
    ));

    Ok(())
}

#[tokio::test]
async fn test_snapshot_roundtrip_into_fresh_database() -> Result<()> {
    let (source, _source_temp) = test_service().await?;
    StandardCatalog::create(&source).await?;
    StandardCatalog::post(&source, "FER-001", MovementType::Salida, 30, parse_date("2024-04-02")).await?;
    StandardCatalog::post(&source, "FER-004", MovementType::Entrada, 100, parse_date("2024-04-03")).await?;

    let mut buffer = Vec::new();
    let snapshot = Exporter::new(&source).export_full_json(&mut buffer).await?;
    assert_eq!(snapshot.products.len(), 5);
    assert_eq!(snapshot.movements.len(), 2);

    let (target, _target_temp) = test_service().await?;
    let result = Importer::new(&target)
        .import_full_json(buffer.as_slice(), ImportOptions::default())
        .await?;

    assert_eq!(result.imported, 7);
    assert!(result.errors.is_empty());
    assert_eq!(target.list_products().await?, source.list_products().await?);
    assert_eq!(target.list_movements().await?, source.list_movements().await?);

    // Stock was restored as exported, not posted twice
    assert_eq!(target.get_product(1).await?.current_stock, 120);

    // New movements continue after the imported ids
    let next = target
        .register_movement(RegisterMovement::new("FER-001", MovementType::Entrada, 1, "Factura"))
        .await?;
    assert_eq!(next.movement.id, 3);

    Ok(())
}

#[tokio::test]
async fn test_import_duplicates_and_dry_run() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardCatalog::create(&service).await?;

    let mut buffer = Vec::new();
    Exporter::new(&service).export_full_json(&mut buffer).await?;

    let reported = Importer::new(&service)
        .import_full_json(buffer.as_slice(), ImportOptions::default())
        .await?;
    assert_eq!(reported.imported, 0);
    assert_eq!(reported.errors.len(), 5);

    let skipped = Importer::new(&service)
        .import_full_json(
            buffer.as_slice(),
            ImportOptions {
                skip_duplicates: true,
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(skipped.skipped, 5);
    assert!(skipped.errors.is_empty());

    let (empty, _empty_temp) = test_service().await?;
    let preview = Importer::new(&empty)
        .import_full_json(
            buffer.as_slice(),
            ImportOptions {
                dry_run: true,
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(preview.imported, 5);
    assert!(empty.list_products().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_import_reports_invalid_records() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let json = r#"{
        "version": "0.1.0",
        "exported_at": "2024-04-01T00:00:00Z",
        "products": [
            {"id": 1, "sku": "FER-001", "name": "Martillo", "category": "Herramientas",
             "current_stock": 10, "min_stock": 2, "price_cents": 2590},
            {"id": 2, "sku": "", "name": "Sin codigo", "category": "Varios",
             "current_stock": 1, "min_stock": 0, "price_cents": 100}
        ],
        "movements": [
            {"id": 1717000000000, "timestamp": "2024-04-01T09:30:00Z", "product_sku": "FER-001",
             "product_name": "Martillo", "movement_type": "Entrada", "quantity": 10,
             "user": "Admin", "reference": "Saldo inicial"},
            {"id": 1717000000001, "timestamp": "2024-04-01T09:31:00Z", "product_sku": "FER-001",
             "product_name": "Martillo", "movement_type": "Salida", "quantity": -1,
             "user": "Admin", "reference": ""}
        ]
    }"#;

    let snapshot: InventorySnapshot = serde_json::from_str(json)?;
    assert_eq!(snapshot.products.len(), 2);

    let result = Importer::new(&service)
        .import_full_json(json.as_bytes(), ImportOptions::default())
        .await?;

    assert_eq!(result.imported, 2);
    assert_eq!(result.errors.len(), 2);
    assert_eq!(result.errors[0].record, "product 2");
    assert_eq!(result.errors[1].record, "movement 1717000000001");

    Ok(())
}

#[tokio::test]
async fn test_unknown_movement_type_in_snapshot_is_rejected() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let json = r#"{
        "version": "0.1.0",
        "exported_at": "2024-04-01T00:00:00Z",
        "products": [],
        "movements": [
            {"id": 1, "timestamp": "2024-04-01T09:30:00Z", "product_sku": "FER-001",
             "product_name": "Martillo", "movement_type": "Traslado", "quantity": 10,
             "user": "Admin", "reference": "x"}
        ]
    }"#;

    let result = Importer::new(&service)
        .import_full_json(json.as_bytes(), ImportOptions::default())
        .await;

    assert!(result.is_err());
    assert!(service.list_movements().await?.is_empty());
    Ok(())
}
