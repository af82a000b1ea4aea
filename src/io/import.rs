use anyhow::Result;
use std::io::Read;
use tracing::info;

use crate::application::{AppError, LedgerService};
use crate::io::export::InventorySnapshot;

/// Result of an import operation
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<ImportError>,
}

/// Error for a single record that could not be imported
#[derive(Debug, Clone)]
pub struct ImportError {
    /// e.g. "product 3" or "movement 1700000000000"
    pub record: String,
    pub error: String,
}

/// Options for import operations
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub dry_run: bool,
    pub skip_duplicates: bool,
}

/// Importer for loading a snapshot back into the inventory
pub struct Importer<'a> {
    service: &'a LedgerService,
}

impl<'a> Importer<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Import a full JSON snapshot. Records keep their ids; products keep
    /// their stock as exported, so movements are restored without being
    /// posted again.
    pub async fn import_full_json<R: Read>(
        &self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let snapshot: InventorySnapshot = serde_json::from_reader(reader)?;
        let mut result = ImportResult::default();

        for product in &snapshot.products {
            let record = format!("product {}", product.id);

            if let Some(error) = validate_product_fields(
                &product.sku,
                &product.name,
                &product.category,
                product.price_cents,
            ) {
                result.errors.push(ImportError { record, error });
                continue;
            }

            let exists = self.service.get_product(product.id).await;
            match exists {
                Ok(_) => {
                    record_duplicate(&mut result, record, &options);
                    continue;
                }
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e.into()),
            }

            if options.dry_run {
                result.imported += 1;
                continue;
            }

            match self.service.restore_product(product).await {
                Ok(()) => result.imported += 1,
                Err(AppError::Storage(e)) => return Err(e),
                Err(e) => result.errors.push(ImportError {
                    record,
                    error: e.to_string(),
                }),
            }
        }

        for movement in &snapshot.movements {
            let record = format!("movement {}", movement.id);

            if movement.reference.trim().is_empty() {
                result.errors.push(ImportError {
                    record,
                    error: "reference is required".to_string(),
                });
                continue;
            }

            match self.service.get_movement(movement.id).await {
                Ok(_) => {
                    record_duplicate(&mut result, record, &options);
                    continue;
                }
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e.into()),
            }

            if options.dry_run {
                result.imported += 1;
                continue;
            }

            match self.service.restore_movement(movement).await {
                Ok(()) => result.imported += 1,
                Err(AppError::Storage(e)) => return Err(e),
                Err(e) => result.errors.push(ImportError {
                    record,
                    error: e.to_string(),
                }),
            }
        }

        info!(
            imported = result.imported,
            skipped = result.skipped,
            errors = result.errors.len(),
            dry_run = options.dry_run,
            "snapshot import finished"
        );

        Ok(result)
    }
}

fn record_duplicate(result: &mut ImportResult, record: String, options: &ImportOptions) {
    if options.skip_duplicates {
        result.skipped += 1;
    } else {
        result.errors.push(ImportError {
            record,
            error: "id already exists".to_string(),
        });
    }
}

fn validate_product_fields(sku: &str, name: &str, category: &str, price_cents: i64) -> Option<String> {
    let missing: Vec<&str> = [("sku", sku), ("name", name), ("category", category)]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

    if !missing.is_empty() {
        return Some(format!("required fields are empty: {}", missing.join(", ")));
    }
    if price_cents < 0 {
        return Some("price must not be negative".to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_fields() {
        assert_eq!(validate_product_fields("FER-001", "Martillo", "Herramientas", 100), None);
        assert_eq!(
            validate_product_fields("", "Martillo", " ", 100),
            Some("required fields are empty: sku, category".to_string())
        );
        assert!(validate_product_fields("A", "B", "C", -1).is_some());
    }

    #[test]
    fn test_duplicates_are_skipped_or_reported() {
        let mut result = ImportResult::default();
        record_duplicate(&mut result, "product 1".into(), &ImportOptions::default());
        assert_eq!(result.errors.len(), 1);

        let skip = ImportOptions {
            skip_duplicates: true,
            ..Default::default()
        };
        record_duplicate(&mut result, "product 2".into(), &skip);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.errors.len(), 1);
    }
}
