use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use crate::domain::{
    Movement, MovementId, MovementType, Product, ProductDraft, ProductId,
};

use super::MIGRATION_001_INITIAL;

const PRODUCT_COLUMNS: &str =
    "id, sku, name, category, current_stock, min_stock, price_cents";

const MOVEMENT_COLUMNS: &str =
    "id, timestamp, product_sku, product_name, movement_type, quantity, user, reference";

/// Repository for persisting and querying products and movements.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations. Safe to run more than once.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Product operations
    // ========================

    /// Insert a product built from a draft, assigning `max(id) + 1`.
    pub async fn create_product(&self, draft: ProductDraft) -> Result<Product> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let next_id: ProductId = sqlx::query("SELECT COALESCE(MAX(id), 0) + 1 AS next_id FROM products")
            .fetch_one(&mut *tx)
            .await
            .context("Failed to compute next product id")?
            .get("next_id");

        let product = draft.into_product(next_id);
        Self::insert_product(&mut tx, &product).await?;

        tx.commit().await.context("Failed to commit new product")?;
        Ok(product)
    }

    /// Save a product that already carries its id (used by snapshot import).
    pub async fn save_product(&self, product: &Product) -> Result<()> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;
        Self::insert_product(&mut tx, product).await?;
        tx.commit().await.context("Failed to commit product")?;
        Ok(())
    }

    async fn insert_product(tx: &mut Transaction<'_, Sqlite>, product: &Product) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, sku, name, category, current_stock, min_stock, price_cents)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.current_stock)
        .bind(product.min_stock)
        .bind(product.price_cents)
        .execute(&mut **tx)
        .await
        .context("Failed to save product")?;
        Ok(())
    }

    /// Get a product by ID.
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM products WHERE id = ?",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch product")?;

        row.as_ref().map(Self::row_to_product).transpose()
    }

    /// Get the first product (lowest id) carrying the given SKU.
    pub async fn find_product_by_sku(&self, sku: &str) -> Result<Option<Product>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM products WHERE sku = ? ORDER BY id LIMIT 1",
            PRODUCT_COLUMNS
        ))
        .bind(sku)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch product by SKU")?;

        row.as_ref().map(Self::row_to_product).transpose()
    }

    /// Whether a product other than `except` uses this SKU.
    pub async fn sku_in_use(&self, sku: &str, except: Option<ProductId>) -> Result<bool> {
        let count: i64 = sqlx::query(
            "SELECT COUNT(*) AS count FROM products WHERE sku = ? AND id != COALESCE(?, -1)",
        )
        .bind(sku)
        .bind(except)
        .fetch_one(&self.pool)
        .await
        .context("Failed to check SKU usage")?
        .get("count");

        Ok(count > 0)
    }

    /// List all products in storage order.
    pub async fn list_products(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM products ORDER BY id",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list products")?;

        rows.iter().map(Self::row_to_product).collect()
    }

    /// Overwrite every field of a stored product. Returns false if no row matched.
    pub async fn update_product(&self, product: &Product) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET sku = ?, name = ?, category = ?, current_stock = ?, min_stock = ?, price_cents = ?
            WHERE id = ?
            "#,
        )
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.current_stock)
        .bind(product.min_stock)
        .bind(product.price_cents)
        .bind(product.id)
        .execute(&self.pool)
        .await
        .context("Failed to update product")?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a product. Returns false if no row matched.
    pub async fn delete_product(&self, id: ProductId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete product")?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_product(row: &sqlx::sqlite::SqliteRow) -> Result<Product> {
        Ok(Product {
            id: row.try_get("id").context("Invalid product id")?,
            sku: row.try_get("sku").context("Invalid product sku")?,
            name: row.try_get("name").context("Invalid product name")?,
            category: row.try_get("category").context("Invalid product category")?,
            current_stock: row.try_get("current_stock").context("Invalid current_stock")?,
            min_stock: row.try_get("min_stock").context("Invalid min_stock")?,
            price_cents: row.try_get("price_cents").context("Invalid price_cents")?,
        })
    }

    // ========================
    // Movement operations
    // ========================

    /// Post a movement: allocate its id, append it to the log and add its
    /// signed quantity to the product's stock, all in one transaction.
    /// Returns the product as stored after the update.
    pub async fn record_movement(
        &self,
        movement: &mut Movement,
        product_id: ProductId,
    ) -> Result<Product> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        movement.id = Self::next_movement_id(&mut tx).await?;
        Self::insert_movement(&mut tx, movement).await?;

        let row = sqlx::query(&format!(
            "UPDATE products SET current_stock = current_stock + ? WHERE id = ? RETURNING {}",
            PRODUCT_COLUMNS
        ))
        .bind(movement.quantity)
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to update product stock")?;

        // Dropping the transaction without commit rolls back the insert
        let product = match row {
            Some(row) => Self::row_to_product(&row)?,
            None => anyhow::bail!("Product {} vanished while posting movement", product_id),
        };

        tx.commit().await.context("Failed to commit movement")?;
        Ok(product)
    }

    /// Save a movement that already carries its id (used by snapshot import).
    /// The id counter is moved past it so later movements stay unique.
    pub async fn save_movement(&self, movement: &Movement) -> Result<()> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        Self::insert_movement(&mut tx, movement).await?;
        sqlx::query(
            "UPDATE sequence_counter SET value = MAX(value, ?) WHERE name = 'movement_id'",
        )
        .bind(movement.id)
        .execute(&mut *tx)
        .await
        .context("Failed to advance movement id counter")?;

        tx.commit().await.context("Failed to commit movement")?;
        Ok(())
    }

    /// Get the next movement id and increment the counter.
    async fn next_movement_id(tx: &mut Transaction<'_, Sqlite>) -> Result<MovementId> {
        let row = sqlx::query(
            r#"
            UPDATE sequence_counter
            SET value = value + 1
            WHERE name = 'movement_id'
            RETURNING value
            "#,
        )
        .fetch_one(&mut **tx)
        .await
        .context("Failed to get next movement id")?;

        Ok(row.get("value"))
    }

    async fn insert_movement(tx: &mut Transaction<'_, Sqlite>, movement: &Movement) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO movements (id, timestamp, product_sku, product_name, movement_type, quantity, user, reference)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(movement.id)
        .bind(movement.timestamp.to_rfc3339())
        .bind(&movement.product_sku)
        .bind(&movement.product_name)
        .bind(movement.movement_type.as_str())
        .bind(movement.quantity)
        .bind(&movement.user)
        .bind(&movement.reference)
        .execute(&mut **tx)
        .await
        .context("Failed to save movement")?;
        Ok(())
    }

    /// Get a movement by ID.
    pub async fn get_movement(&self, id: MovementId) -> Result<Option<Movement>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM movements WHERE id = ?",
            MOVEMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch movement")?;

        row.as_ref().map(Self::row_to_movement).transpose()
    }

    /// List all movements, oldest first.
    pub async fn list_movements(&self) -> Result<Vec<Movement>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM movements ORDER BY id",
            MOVEMENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list movements")?;

        rows.iter().map(Self::row_to_movement).collect()
    }

    /// List movements with optional filters.
    pub async fn list_movements_filtered(
        &self,
        movement_type: Option<MovementType>,
        sku: Option<&str>,
        from_date: Option<DateTime<Utc>>,
        to_date: Option<DateTime<Utc>>,
        limit: Option<usize>,
        newest_first: bool,
    ) -> Result<Vec<Movement>> {
        let mut query = format!("SELECT {} FROM movements WHERE 1=1", MOVEMENT_COLUMNS);

        let from_date_str = from_date.map(|dt| dt.to_rfc3339());
        let to_date_str = to_date.map(|dt| dt.to_rfc3339());

        if movement_type.is_some() {
            query.push_str(" AND movement_type = ?");
        }
        if sku.is_some() {
            query.push_str(" AND product_sku = ?");
        }
        if from_date.is_some() {
            query.push_str(" AND timestamp >= ?");
        }
        if to_date.is_some() {
            query.push_str(" AND timestamp <= ?");
        }

        query.push_str(if newest_first {
            " ORDER BY id DESC"
        } else {
            " ORDER BY id"
        });

        if let Some(lim) = limit {
            query.push_str(&format!(" LIMIT {}", lim));
        }

        let mut sql_query = sqlx::query(&query);

        if let Some(mt) = movement_type {
            sql_query = sql_query.bind(mt.as_str());
        }
        if let Some(sku) = sku {
            sql_query = sql_query.bind(sku);
        }
        if let Some(ref fd_str) = from_date_str {
            sql_query = sql_query.bind(fd_str);
        }
        if let Some(ref td_str) = to_date_str {
            sql_query = sql_query.bind(td_str);
        }

        let rows = sql_query
            .fetch_all(&self.pool)
            .await
            .context("Failed to list filtered movements")?;

        rows.iter().map(Self::row_to_movement).collect()
    }

    /// Overwrite the editable fields of a movement. Returns false if no row matched.
    pub async fn update_movement(&self, movement: &Movement) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE movements SET timestamp = ?, user = ?, reference = ? WHERE id = ?",
        )
        .bind(movement.timestamp.to_rfc3339())
        .bind(&movement.user)
        .bind(&movement.reference)
        .bind(movement.id)
        .execute(&self.pool)
        .await
        .context("Failed to update movement")?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a movement. Stock is not touched. Returns false if no row matched.
    pub async fn delete_movement(&self, id: MovementId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM movements WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete movement")?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_movement(row: &sqlx::sqlite::SqliteRow) -> Result<Movement> {
        let timestamp_str: String = row.try_get("timestamp")?;
        let movement_type_str: String = row.try_get("movement_type")?;

        Ok(Movement {
            id: row.try_get("id").context("Invalid movement id")?,
            timestamp: DateTime::parse_from_rfc3339(&timestamp_str)
                .context("Invalid movement timestamp")?
                .with_timezone(&Utc),
            product_sku: row.try_get("product_sku")?,
            product_name: row.try_get("product_name")?,
            movement_type: MovementType::from_str(&movement_type_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid movement type: {}", movement_type_str))?,
            quantity: row.try_get("quantity")?,
            user: row.try_get("user")?,
            reference: row.try_get("reference")?,
        })
    }
}
