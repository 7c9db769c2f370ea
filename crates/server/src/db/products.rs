//! Product repository.

use sqlx::PgPool;
use sqlx::types::Json;
use tracing::{debug, instrument};

use seedmart_core::ProductId;

use super::RepositoryError;
use crate::models::{Product, ProductInput};

/// Column list for inserts, in bind order.
const INSERT_COLUMNS: &str = "crop_name, variety_name, category, description, germination_pct, \
     purity_pct, lot_number, batch_id, manufacturing_date, expiry_date, date_of_testing, \
     yield_per_acre, suitable_season, suitable_regions, hsn_code, gst_rate, moq, \
     stock_quantity, tier_pricing, is_featured, is_active";

/// Filters for the public product listing.
#[derive(Debug, Default, Clone)]
pub struct ProductFilter<'f> {
    /// Exact category.
    pub category: Option<&'f str>,
    /// Case-insensitive substring of the crop name.
    pub search: Option<&'f str>,
}

/// Repository for catalogue products.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

/// Bind every `ProductInput` field in `INSERT_COLUMNS` order.
macro_rules! bind_product {
    ($query:expr, $input:expr) => {
        $query
            .bind(&$input.crop_name)
            .bind(&$input.variety_name)
            .bind(&$input.category)
            .bind(&$input.description)
            .bind($input.germination_pct)
            .bind($input.purity_pct)
            .bind(&$input.lot_number)
            .bind(&$input.batch_id)
            .bind(&$input.manufacturing_date)
            .bind(&$input.expiry_date)
            .bind(&$input.date_of_testing)
            .bind(&$input.yield_per_acre)
            .bind(&$input.suitable_season)
            .bind(&$input.suitable_regions)
            .bind(&$input.hsn_code)
            .bind($input.gst_rate)
            .bind($input.moq)
            .bind($input.stock_quantity)
            .bind(Json(&$input.tier_pricing))
            .bind($input.is_featured)
            .bind($input.is_active)
    };
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Active products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(
        &self,
        filter: &ProductFilter<'_>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT * FROM seedmart.products
            WHERE is_active
              AND ($1::text IS NULL OR category = $1)
              AND ($2::text IS NULL OR POSITION(LOWER($2) IN LOWER(crop_name)) > 0)
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(filter.category)
        .bind(filter.search)
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    /// Get a product by ID, active or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(r"SELECT * FROM seedmart.products WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(product)
    }

    /// Active products among `ids`, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let raw: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
        let products = sqlx::query_as::<_, Product>(
            r"SELECT * FROM seedmart.products WHERE id = ANY($1) AND is_active",
        )
        .bind(raw)
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    /// Insert a validated product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the lot number is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, input), fields(lot = %input.lot_number))]
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let sql = format!(
            "INSERT INTO seedmart.products ({INSERT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
                     $17, $18, $19, $20, $21) \
             RETURNING *"
        );
        let product = bind_product!(sqlx::query_as::<_, Product>(&sql), input)
            .fetch_one(self.pool)
            .await
            .map_err(|e| RepositoryError::conflict_on_unique(e, "lot number"))?;

        debug!(product_id = %product.id, "Created product");
        Ok(product)
    }

    /// Insert a product, or overwrite the one with the same lot number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_by_lot(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let sql = format!(
            "INSERT INTO seedmart.products ({INSERT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
                     $17, $18, $19, $20, $21) \
             ON CONFLICT (lot_number) DO UPDATE SET \
                crop_name = EXCLUDED.crop_name, variety_name = EXCLUDED.variety_name, \
                category = EXCLUDED.category, description = EXCLUDED.description, \
                germination_pct = EXCLUDED.germination_pct, purity_pct = EXCLUDED.purity_pct, \
                batch_id = EXCLUDED.batch_id, manufacturing_date = EXCLUDED.manufacturing_date, \
                expiry_date = EXCLUDED.expiry_date, date_of_testing = EXCLUDED.date_of_testing, \
                yield_per_acre = EXCLUDED.yield_per_acre, \
                suitable_season = EXCLUDED.suitable_season, \
                suitable_regions = EXCLUDED.suitable_regions, hsn_code = EXCLUDED.hsn_code, \
                gst_rate = EXCLUDED.gst_rate, moq = EXCLUDED.moq, \
                stock_quantity = EXCLUDED.stock_quantity, tier_pricing = EXCLUDED.tier_pricing, \
                is_featured = EXCLUDED.is_featured, is_active = EXCLUDED.is_active, \
                updated_at = NOW() \
             RETURNING *"
        );
        let product = bind_product!(sqlx::query_as::<_, Product>(&sql), input)
            .fetch_one(self.pool)
            .await?;
        Ok(product)
    }

    /// Replace every editable field of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Conflict` if the new lot number is taken.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let product = bind_product!(
            sqlx::query_as::<_, Product>(
                r"
                UPDATE seedmart.products SET
                    crop_name = $1, variety_name = $2, category = $3, description = $4,
                    germination_pct = $5, purity_pct = $6, lot_number = $7, batch_id = $8,
                    manufacturing_date = $9, expiry_date = $10, date_of_testing = $11,
                    yield_per_acre = $12, suitable_season = $13, suitable_regions = $14,
                    hsn_code = $15, gst_rate = $16, moq = $17, stock_quantity = $18,
                    tier_pricing = $19, is_featured = $20, is_active = $21,
                    updated_at = NOW()
                WHERE id = $22
                RETURNING *
                ",
            ),
            input
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::conflict_on_unique(e, "lot number"))?
        .ok_or(RepositoryError::NotFound)?;

        debug!("Updated product");
        Ok(product)
    }

    /// Soft delete: hide the product from the catalogue.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn deactivate(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"UPDATE seedmart.products SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
