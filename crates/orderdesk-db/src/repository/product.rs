//! # Product Repository
//!
//! Database operations for the product catalogue.
//!
//! ## Stock Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Who Writes stock_quantity?                           │
//! │                                                                         │
//! │  ProductRepository::insert   ── initial stock only                     │
//! │  ProductRepository::update   ── name, description, price, category,    │
//! │                                 image; NEVER stock                     │
//! │  consistency::inventory      ── every later stock change, inside the   │
//! │                                 transaction of the line item write     │
//! │                                 or a restock                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Changing the price never re-prices existing line items: each item keeps
//! the snapshot taken when it was created.

use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use orderdesk_core::validation::{
    validate_optional, validate_price_cents, validate_required, validate_stock_quantity,
    MAX_CATEGORY_LEN, MAX_IMAGE_URL_LEN, MAX_NAME_LEN,
};
use orderdesk_core::{Entity, NewProduct, Product, ProductUpdate};

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let product = repo.insert(&new_product).await?;
/// let fetched = repo.get_by_id(product.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists all products ordered by id.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id, name, description, price_cents, stock_quantity,
                category, image_url, version, created_at
            FROM products
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        fetch(&self.pool, id).await
    }

    /// Checks whether a product exists.
    pub async fn exists(&self, id: i64) -> DbResult<bool> {
        let found: i64 =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE id = ?1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(found != 0)
    }

    /// Inserts a new product with its opening stock.
    pub async fn insert(&self, product: &NewProduct) -> DbResult<Product> {
        validate_catalogue_fields(
            &product.name,
            product.price_cents,
            &product.category,
            product.image_url.as_deref(),
        )?;
        validate_stock_quantity(product.stock_quantity)?;

        debug!(name = %product.name, "Inserting product");

        let created = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                name, description, price_cents, stock_quantity,
                category, image_url, version, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)
            RETURNING
                id, name, description, price_cents, stock_quantity,
                category, image_url, version, created_at
            "#,
        )
        .bind(product.name.trim())
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.stock_quantity)
        .bind(product.category.trim())
        .bind(&product.image_url)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        info!(
            product_id = created.id,
            stock = created.stock_quantity,
            "Product created"
        );
        Ok(created)
    }

    /// Updates catalogue fields. Stock is left untouched.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Updated product
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, id: i64, update: &ProductUpdate) -> DbResult<Product> {
        validate_catalogue_fields(
            &update.name,
            update.price_cents,
            &update.category,
            update.image_url.as_deref(),
        )?;

        debug!(product_id = id, "Updating product");

        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                name = ?2,
                description = ?3,
                price_cents = ?4,
                category = ?5,
                image_url = ?6,
                version = version + 1
            WHERE id = ?1
            RETURNING
                id, name, description, price_cents, stock_quantity,
                category, image_url, version, created_at
            "#,
        )
        .bind(id)
        .bind(update.name.trim())
        .bind(&update.description)
        .bind(update.price_cents)
        .bind(update.category.trim())
        .bind(&update.image_url)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found(Entity::Product, id))
    }
}

fn validate_catalogue_fields(
    name: &str,
    price_cents: i64,
    category: &str,
    image_url: Option<&str>,
) -> DbResult<()> {
    validate_required("name", name, MAX_NAME_LEN)?;
    validate_price_cents(price_cents)?;
    validate_required("category", category, MAX_CATEGORY_LEN)?;
    validate_optional("image_url", image_url, MAX_IMAGE_URL_LEN)?;
    Ok(())
}

// =============================================================================
// Executor-level Operations
// =============================================================================

pub(crate) async fn fetch<'e, E>(executor: E, id: i64) -> DbResult<Option<Product>>
where
    E: SqliteExecutor<'e>,
{
    let product = sqlx::query_as::<_, Product>(
        r#"
        SELECT
            id, name, description, price_cents, stock_quantity,
            category, image_url, version, created_at
        FROM products
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(product)
}

/// Number of line items referencing the product.
pub(crate) async fn count_order_items<'e, E>(executor: E, product_id: i64) -> DbResult<i64>
where
    E: SqliteExecutor<'e>,
{
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items WHERE product_id = ?1")
        .bind(product_id)
        .fetch_one(executor)
        .await?;

    Ok(count)
}

/// Deletes the product row. Returns the number of rows removed.
pub(crate) async fn delete<'e, E>(executor: E, id: i64) -> DbResult<u64>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM products WHERE id = ?1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

// =============================================================================
// Unit Tests
// =============================================================================
