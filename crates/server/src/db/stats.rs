//! Dashboard aggregates for admins.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use super::RepositoryError;

/// Products below this stock count are flagged.
pub const LOW_STOCK_THRESHOLD: i32 = 100;

/// Order count and value for one buyer state.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StateSales {
    pub buyer_state: String,
    pub order_count: i64,
    pub grand_total: Decimal,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DashboardStats {
    /// Grand totals of every order past `pending`.
    pub total_revenue: Decimal,
    pub total_orders: i64,
    pub pending_orders: i64,
    pub pending_kyc: i64,
    /// Active products.
    pub total_products: i64,
    pub low_stock_products: i64,
    #[sqlx(skip)]
    pub orders_by_state: Vec<StateSales>,
}

/// Compute the dashboard numbers.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if either query fails.
pub async fn dashboard(pool: &PgPool) -> Result<DashboardStats, RepositoryError> {
    let mut stats = sqlx::query_as::<_, DashboardStats>(
        r"
        SELECT
            (SELECT COALESCE(SUM(grand_total), 0) FROM seedmart.orders
              WHERE status <> 'pending') AS total_revenue,
            (SELECT COUNT(*) FROM seedmart.orders) AS total_orders,
            (SELECT COUNT(*) FROM seedmart.orders WHERE status = 'pending') AS pending_orders,
            (SELECT COUNT(*) FROM seedmart.users
              WHERE role = 'buyer' AND kyc_status = 'pending') AS pending_kyc,
            (SELECT COUNT(*) FROM seedmart.products WHERE is_active) AS total_products,
            (SELECT COUNT(*) FROM seedmart.products
              WHERE is_active AND stock_quantity < $1) AS low_stock_products
        ",
    )
    .bind(LOW_STOCK_THRESHOLD)
    .fetch_one(pool)
    .await?;

    stats.orders_by_state = sqlx::query_as::<_, StateSales>(
        r"
        SELECT buyer_state,
               COUNT(*) AS order_count,
               COALESCE(SUM(grand_total), 0) AS grand_total
        FROM seedmart.orders
        GROUP BY buyer_state
        ORDER BY order_count DESC, buyer_state
        LIMIT 10
        ",
    )
    .fetch_all(pool)
    .await?;

    Ok(stats)
}
