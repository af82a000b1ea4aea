use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::domain::{
    DEFAULT_USER, Movement, MovementId, MovementPatch, MovementType, Product, ProductDraft,
    ProductId, ProductPatch, Quantity, apply_movement, inventory_value, low_stock_products,
    net_movement_by_sku, rank_exits,
};
use crate::storage::Repository;

use super::{
    AppError, InventorySummary, StockAlert, StockAlertsReport, StockLine, StockPolicy,
    StockReport, TopExitsReport,
};

/// Application service providing every inventory operation.
/// This is the primary interface for any client (CLI, import, reports).
pub struct LedgerService {
    repo: Repository,
    policy: StockPolicy,
}

/// A movement as submitted by a caller, before it is posted.
#[derive(Debug, Clone)]
pub struct RegisterMovement {
    pub product_sku: String,
    pub movement_type: MovementType,
    /// Units as entered, never negative; the type decides the sign
    pub quantity: Quantity,
    pub reference: String,
    pub user: Option<String>,
    /// Defaults to now
    pub timestamp: Option<DateTime<Utc>>,
}

impl RegisterMovement {
    pub fn new(
        product_sku: impl Into<String>,
        movement_type: MovementType,
        quantity: Quantity,
        reference: impl Into<String>,
    ) -> Self {
        Self {
            product_sku: product_sku.into(),
            movement_type,
            quantity,
            reference: reference.into(),
            user: None,
            timestamp: None,
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Result of posting a movement: both sides of the ledger after the write.
#[derive(Debug, Clone)]
pub struct MovementResult {
    pub product: Product,
    pub movement: Movement,
}

/// Filter for querying the movement log
#[derive(Debug, Clone, Default)]
pub struct MovementFilter {
    pub movement_type: Option<MovementType>,
    pub sku: Option<String>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
    pub newest_first: bool,
}

/// Parse a movement type typed by a user.
pub fn parse_movement_type(input: &str) -> Result<MovementType, AppError> {
    MovementType::from_str(input).ok_or_else(|| AppError::InvalidMovementType(input.to_string()))
}

impl LedgerService {
    /// Create a new service with the given repository and the default policy.
    pub fn new(repo: Repository) -> Self {
        Self {
            repo,
            policy: StockPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: StockPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> StockPolicy {
        self.policy
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    // ========================
    // Product operations
    // ========================

    /// List all products in catalog order.
    pub async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        let products = self.repo.list_products().await?;
        debug!(count = products.len(), "listed products");
        Ok(products)
    }

    /// Get a product by id.
    pub async fn get_product(&self, id: ProductId) -> Result<Product, AppError> {
        self.repo
            .get_product(id)
            .await?
            .ok_or_else(|| AppError::ProductNotFound(id.to_string()))
    }

    /// First product carrying the SKU, if any.
    pub async fn find_product_by_sku(&self, sku: &str) -> Result<Option<Product>, AppError> {
        Ok(self.repo.find_product_by_sku(sku).await?)
    }

    /// Like `find_product_by_sku`, but a missing SKU is an error.
    pub async fn get_product_by_sku(&self, sku: &str) -> Result<Product, AppError> {
        self.find_product_by_sku(sku)
            .await?
            .ok_or_else(|| AppError::ProductNotFound(sku.to_string()))
    }

    /// Add a product to the catalog.
    pub async fn add_product(&self, draft: ProductDraft) -> Result<Product, AppError> {
        let missing = draft.missing_fields();
        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "required fields are empty: {}",
                missing.join(", ")
            )));
        }

        let sku = draft.sku.trim().to_string();
        if self.policy.unique_sku && self.repo.sku_in_use(&sku, None).await? {
            warn!(%sku, "rejected duplicate SKU");
            return Err(AppError::DuplicateSku(sku));
        }

        let preview = draft.clone().into_product(0);
        if preview.price_cents < 0 {
            return Err(AppError::Validation("price must not be negative".into()));
        }

        let product = self.repo.create_product(draft).await?;
        info!(id = product.id, sku = %product.sku, "product added");
        Ok(product)
    }

    /// Merge a patch onto a product. The id never changes.
    pub async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, AppError> {
        let patch = patch.trimmed();
        for (field, value) in [
            ("sku", &patch.sku),
            ("name", &patch.name),
            ("category", &patch.category),
        ] {
            if value.as_deref().is_some_and(str::is_empty) {
                return Err(AppError::Validation(format!("{} must not be empty", field)));
            }
        }
        if patch.price_cents.is_some_and(|p| p < 0) {
            return Err(AppError::Validation("price must not be negative".into()));
        }

        let mut product = self.get_product(id).await?;

        if let Some(sku) = patch.sku.as_deref() {
            if self.policy.unique_sku && self.repo.sku_in_use(sku, Some(id)).await? {
                warn!(%sku, id, "rejected duplicate SKU");
                return Err(AppError::DuplicateSku(sku.to_string()));
            }
        }

        product.apply_patch(patch);

        if !self.repo.update_product(&product).await? {
            return Err(AppError::ProductNotFound(id.to_string()));
        }

        info!(id, sku = %product.sku, "product updated");
        Ok(product)
    }

    /// Remove a product permanently. Its movements stay in the log.
    pub async fn delete_product(&self, id: ProductId) -> Result<Product, AppError> {
        let product = self.get_product(id).await?;
        if !self.repo.delete_product(id).await? {
            return Err(AppError::ProductNotFound(id.to_string()));
        }
        info!(id, sku = %product.sku, "product deleted");
        Ok(product)
    }

    /// Insert a product keeping its id. Used when restoring a snapshot.
    pub async fn restore_product(&self, product: &Product) -> Result<(), AppError> {
        if self.repo.get_product(product.id).await?.is_some() {
            return Err(AppError::Validation(format!(
                "product id {} already exists",
                product.id
            )));
        }
        self.repo.save_product(product).await?;
        Ok(())
    }

    // ========================
    // Movement operations
    // ========================

    /// Post a stock movement: append it to the log and apply it to the
    /// product's stock as one unit.
    pub async fn register_movement(
        &self,
        request: RegisterMovement,
    ) -> Result<MovementResult, AppError> {
        let sku = request.product_sku.trim();
        if sku.is_empty() {
            return Err(AppError::Validation("product SKU is required".into()));
        }
        if request.quantity < 0 {
            return Err(AppError::Validation(format!(
                "quantity must not be negative (got {})",
                request.quantity
            )));
        }
        let reference = request.reference.trim();
        if reference.is_empty() {
            return Err(AppError::Validation("reference is required".into()));
        }

        let product = self.get_product_by_sku(sku).await?;

        let user = request
            .user
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_USER);

        let mut movement = Movement::new(
            product.sku.clone(),
            product.name.clone(),
            request.movement_type,
            request.quantity,
            request.timestamp.unwrap_or_else(Utc::now),
        )
        .with_reference(reference)
        .with_user(user);

        let mut projected = product.clone();
        let Some(stock_after) = apply_movement(&mut projected, &movement) else {
            warn!(
                sku = %product.sku,
                stock = product.current_stock,
                quantity = movement.quantity,
                "rejected movement overflowing stock"
            );
            return Err(AppError::Validation(format!(
                "quantity {} would take the stock of {} out of range",
                request.quantity, product.sku
            )));
        };
        if !self.policy.allow_negative_stock && stock_after < 0 {
            warn!(
                sku = %product.sku,
                available = product.current_stock,
                requested = request.quantity,
                "rejected movement below zero stock"
            );
            return Err(AppError::InsufficientStock {
                sku: product.sku,
                available: product.current_stock,
                requested: request.quantity,
            });
        }

        let product = self.repo.record_movement(&mut movement, product.id).await?;

        info!(
            id = movement.id,
            sku = %movement.product_sku,
            kind = %movement.movement_type,
            quantity = movement.quantity,
            stock = product.current_stock,
            "movement registered"
        );

        Ok(MovementResult { product, movement })
    }

    /// List the whole log, oldest first.
    pub async fn list_movements(&self) -> Result<Vec<Movement>, AppError> {
        let movements = self.repo.list_movements().await?;
        debug!(count = movements.len(), "listed movements");
        Ok(movements)
    }

    /// List movements matching a filter.
    pub async fn list_movements_filtered(
        &self,
        filter: MovementFilter,
    ) -> Result<Vec<Movement>, AppError> {
        Ok(self
            .repo
            .list_movements_filtered(
                filter.movement_type,
                filter.sku.as_deref(),
                filter.from_date,
                filter.to_date,
                filter.limit,
                filter.newest_first,
            )
            .await?)
    }

    /// Get a movement by id.
    pub async fn get_movement(&self, id: MovementId) -> Result<Movement, AppError> {
        self.repo
            .get_movement(id)
            .await?
            .ok_or(AppError::MovementNotFound(id))
    }

    /// Edit the descriptive fields of a movement.
    pub async fn update_movement(
        &self,
        id: MovementId,
        patch: MovementPatch,
    ) -> Result<Movement, AppError> {
        if patch.reference.as_deref().is_some_and(|r| r.trim().is_empty()) {
            return Err(AppError::Validation("reference must not be empty".into()));
        }

        let mut movement = self.get_movement(id).await?;
        movement.apply_patch(patch);

        if !self.repo.update_movement(&movement).await? {
            return Err(AppError::MovementNotFound(id));
        }

        info!(id, "movement updated");
        Ok(movement)
    }

    /// Remove a movement from the log. Product stock is left as it is.
    pub async fn delete_movement(&self, id: MovementId) -> Result<Movement, AppError> {
        let movement = self.get_movement(id).await?;
        if !self.repo.delete_movement(id).await? {
            return Err(AppError::MovementNotFound(id));
        }
        info!(id, sku = %movement.product_sku, "movement deleted");
        Ok(movement)
    }

    /// Insert a movement keeping its id, without touching stock.
    /// Used when restoring a snapshot whose products already hold the result.
    pub async fn restore_movement(&self, movement: &Movement) -> Result<(), AppError> {
        if self.repo.get_movement(movement.id).await?.is_some() {
            return Err(AppError::Validation(format!(
                "movement id {} already exists",
                movement.id
            )));
        }
        self.repo.save_movement(movement).await?;
        Ok(())
    }

    // ========================
    // Reports
    // ========================

    /// Every product with its valuation and status.
    pub async fn stock_report(&self) -> Result<StockReport, AppError> {
        let products = self.repo.list_products().await?;
        let movements = self.repo.list_movements().await?;
        let net = net_movement_by_sku(&movements);

        let lines = products
            .iter()
            .map(|p| StockLine {
                sku: p.sku.clone(),
                name: p.name.clone(),
                category: p.category.clone(),
                current_stock: p.current_stock,
                min_stock: p.min_stock,
                price_cents: p.price_cents,
                value: p.stock_value(),
                net_movement: net.get(&p.sku).copied().unwrap_or(0),
                status: p.status(),
            })
            .collect();

        Ok(StockReport {
            generated_at: Utc::now(),
            lines,
            total_value: inventory_value(&products),
        })
    }

    /// Products at or below their minimum stock.
    pub async fn stock_alerts(&self) -> Result<StockAlertsReport, AppError> {
        let products = self.repo.list_products().await?;
        Ok(StockAlertsReport {
            generated_at: Utc::now(),
            products: low_stock_products(&products)
                .iter()
                .map(StockAlert::from)
                .collect(),
        })
    }

    /// Products ranked by units exited within a period.
    pub async fn top_exits(
        &self,
        from_date: DateTime<Utc>,
        to_date: DateTime<Utc>,
        limit: Option<usize>,
    ) -> Result<TopExitsReport, AppError> {
        let movements = self
            .repo
            .list_movements_filtered(
                Some(MovementType::Salida),
                None,
                Some(from_date),
                Some(to_date),
                None,
                false,
            )
            .await?;

        let mut products = rank_exits(&movements, from_date, to_date);
        if let Some(limit) = limit {
            products.truncate(limit);
        }

        Ok(TopExitsReport {
            from_date,
            to_date,
            products,
        })
    }

    /// Headline numbers for the dashboard.
    pub async fn inventory_summary(&self) -> Result<InventorySummary, AppError> {
        let products = self.repo.list_products().await?;
        let movements = self.repo.list_movements().await?;

        Ok(InventorySummary {
            product_count: products.len(),
            inventory_value: inventory_value(&products),
            low_stock_count: products.iter().filter(|p| p.is_low_stock()).count(),
            movement_count: movements.len(),
        })
    }
}
