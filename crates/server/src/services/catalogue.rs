//! Cached view of the active catalogue for the advisor endpoints.
//!
//! Caches the active product list using `moka` (60-second TTL). Product
//! writes invalidate it.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::{debug, instrument};

use crate::db::products::ProductFilter;
use crate::db::{ProductRepository, RepositoryError};
use crate::models::Product;

const ACTIVE_KEY: &str = "active";

/// Shared cache of active products.
#[derive(Clone)]
pub struct CatalogueCache {
    cache: Cache<&'static str, Arc<Vec<Product>>>,
}

impl Default for CatalogueCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}

impl CatalogueCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1).time_to_live(ttl).build();
        Self { cache }
    }

    /// Active products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the catalogue has to be loaded
    /// and the query fails.
    #[instrument(skip_all)]
    pub async fn active_products(
        &self,
        pool: &PgPool,
    ) -> Result<Arc<Vec<Product>>, RepositoryError> {
        if let Some(products) = self.cache.get(ACTIVE_KEY).await {
            debug!("Cache hit for active catalogue");
            return Ok(products);
        }

        let products = Arc::new(
            ProductRepository::new(pool)
                .list_active(&ProductFilter::default())
                .await?,
        );
        self.cache.insert(ACTIVE_KEY, Arc::clone(&products)).await;
        debug!(count = products.len(), "Loaded active catalogue");
        Ok(products)
    }

    /// Drop the cached catalogue after a product write.
    pub async fn invalidate(&self) {
        self.cache.invalidate(ACTIVE_KEY).await;
    }
}
