//! Global settings storage.
//!
//! A single-row table holding the store-wide "receive orders" flag. The flag
//! gates checkout (a precondition, checked before any gateway call) and, when
//! turned off, every catalog item is marked unavailable in the same
//! transaction so the menu flips to "Paused" atomically.

use sqlx::PgPool;

use super::RepositoryError;

/// Whether the canteen is currently accepting online orders.
///
/// A missing settings row means ordering is open.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn receive_orders(pool: &PgPool) -> Result<bool, RepositoryError> {
    let row: Option<(bool,)> = sqlx::query_as("SELECT receive_orders FROM settings LIMIT 1")
        .fetch_optional(pool)
        .await?;

    Ok(row.is_none_or(|(flag,)| flag))
}

/// Set the store-wide "receive orders" flag.
///
/// Turning the flag **off** also marks every catalog item unavailable, in the
/// same transaction. Turning it back on does not resurrect per-item
/// availability; staff re-enable items individually.
///
/// Returns the number of items paused (zero when enabling).
///
/// # Errors
///
/// Returns an error if any statement fails; the transaction rolls back.
pub async fn set_receive_orders(pool: &PgPool, accepting: bool) -> Result<u64, RepositoryError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r"
        INSERT INTO settings (id, receive_orders)
        VALUES (TRUE, $1)
        ON CONFLICT (id) DO UPDATE SET receive_orders = $1, updated_at = NOW()
        ",
    )
    .bind(accepting)
    .execute(&mut *tx)
    .await?;

    let paused = if accepting {
        0
    } else {
        sqlx::query("UPDATE food_items SET is_available = FALSE")
            .execute(&mut *tx)
            .await?
            .rows_affected()
    };

    tx.commit().await?;
    Ok(paused)
}
