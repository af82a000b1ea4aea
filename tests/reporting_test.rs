mod common;

use anyhow::Result;
use common::{StandardCatalog, parse_date, test_service};
use stockroom::domain::{MovementType, StockStatus};

#[tokio::test]
async fn test_stock_report_values_and_status() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardCatalog::create(&service).await?;
    StandardCatalog::post(&service, "FER-001", MovementType::Salida, 20, parse_date("2024-04-02")).await?;
    StandardCatalog::post(&service, "FER-001", MovementType::Entrada, 5, parse_date("2024-04-03")).await?;

    let report = service.stock_report().await?;

    assert_eq!(report.lines.len(), 5);

    let hammer = &report.lines[0];
    assert_eq!(hammer.sku, "FER-001");
    assert_eq!(hammer.current_stock, 135);
    assert_eq!(hammer.value, 135 * 2590);
    assert_eq!(hammer.net_movement, -15);
    assert_eq!(hammer.status, StockStatus::EnStock);

    let pipe = &report.lines[2];
    assert_eq!(pipe.sku, "FER-003");
    assert_eq!(pipe.status, StockStatus::BajoStock);
    assert_eq!(pipe.net_movement, 0);

    let expected_total: i64 = 135 * 2590 + 200 * 850 + 80 * 1200 + 500 * 2800 + 40 * 4500;
    assert_eq!(report.total_value, expected_total);

    Ok(())
}

#[tokio::test]
async fn test_stock_alerts() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardCatalog::create(&service).await?;

    // FER-005 drops to its minimum exactly
    StandardCatalog::post(&service, "FER-005", MovementType::Salida, 20, parse_date("2024-04-02")).await?;

    let report = service.stock_alerts().await?;
    let skus: Vec<&str> = report.products.iter().map(|a| a.sku.as_str()).collect();

    assert_eq!(skus, vec!["FER-003", "FER-005"]);
    assert_eq!(report.products[0].shortfall, 20);
    assert_eq!(report.products[1].shortfall, 0);

    Ok(())
}

#[tokio::test]
async fn test_top_exits_in_period() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardCatalog::create(&service).await?;

    StandardCatalog::post(&service, "FER-004", MovementType::Salida, 40, parse_date("2024-04-01")).await?;
    StandardCatalog::post(&service, "FER-002", MovementType::Salida, 12, parse_date("2024-04-05")).await?;
    StandardCatalog::post(&service, "FER-004", MovementType::Salida, 35, parse_date("2024-04-20")).await?;
    StandardCatalog::post(&service, "FER-001", MovementType::Salida, 3, parse_date("2024-04-21")).await?;
    StandardCatalog::post(&service, "FER-002", MovementType::Entrada, 300, parse_date("2024-04-22")).await?;
    StandardCatalog::post(&service, "FER-005", MovementType::Salida, 30, parse_date("2024-05-02")).await?;

    let report = service
        .top_exits(parse_date("2024-04-01"), parse_date("2024-04-30"), Some(2))
        .await?;

    assert_eq!(report.products.len(), 2);
    assert_eq!(report.products[0].sku, "FER-004");
    assert_eq!(report.products[0].units, 75);
    assert_eq!(report.products[0].count, 2);
    assert_eq!(report.products[1].sku, "FER-002");
    assert_eq!(report.products[1].units, 12);

    let all = service
        .top_exits(parse_date("2024-01-01"), parse_date("2024-12-31"), None)
        .await?;
    assert_eq!(all.products.len(), 4);

    Ok(())
}

#[tokio::test]
async fn test_inventory_summary() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let empty = service.inventory_summary().await?;
    assert_eq!(empty.product_count, 0);
    assert_eq!(empty.inventory_value, 0);

    StandardCatalog::create(&service).await?;
    StandardCatalog::post(&service, "FER-001", MovementType::Salida, 200, parse_date("2024-04-02")).await?;

    let summary = service.inventory_summary().await?;
    assert_eq!(summary.product_count, 5);
    assert_eq!(summary.low_stock_count, 2);
    assert_eq!(summary.movement_count, 1);
    assert_eq!(
        summary.inventory_value,
        -50 * 2590 + 200 * 850 + 80 * 1200 + 500 * 2800 + 40 * 4500
    );

    Ok(())
}
