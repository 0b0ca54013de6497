//! Catalog repository: categories and food items.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use canteen_core::{CategoryId, ItemId};

use super::RepositoryError;
use crate::models::{Category, FoodItem, NewCategory, NewFoodItem};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i32,
    name: String,
    image_url: Option<String>,
    display_order: i32,
    is_available: bool,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            name: row.name,
            image_url: row.image_url,
            display_order: row.display_order,
            is_available: row.is_available,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct FoodItemRow {
    id: i32,
    category_id: Option<i32>,
    name: String,
    description: Option<String>,
    price: Decimal,
    image_url: Option<String>,
    is_available: bool,
    created_at: DateTime<Utc>,
}

impl From<FoodItemRow> for FoodItem {
    fn from(row: FoodItemRow) -> Self {
        Self {
            id: ItemId::new(row.id),
            category_id: row.category_id.map(CategoryId::new),
            name: row.name,
            description: row.description,
            price: row.price,
            image_url: row.image_url,
            is_available: row.is_available,
            created_at: row.created_at,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for catalog database operations.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List available categories in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT id, name, image_url, display_order, is_available
            FROM categories
            WHERE is_available
            ORDER BY display_order ASC, name ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// List all categories, including unavailable ones (admin view).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT id, name, image_url, display_order, is_available
            FROM categories
            ORDER BY display_order ASC, name ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_category(
        &self,
        category: &NewCategory,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            INSERT INTO categories (name, image_url, display_order, is_available)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, image_url, display_order, is_available
            ",
        )
        .bind(&category.name)
        .bind(&category.image_url)
        .bind(category.display_order)
        .bind(category.is_available)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Replace a category's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no category has this id.
    pub async fn update_category(
        &self,
        id: CategoryId,
        category: &NewCategory,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            UPDATE categories
            SET name = $2, image_url = $3, display_order = $4, is_available = $5
            WHERE id = $1
            RETURNING id, name, image_url, display_order, is_available
            ",
        )
        .bind(id.as_i32())
        .bind(&category.name)
        .bind(&category.image_url)
        .bind(category.display_order)
        .bind(category.is_available)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete a category. Items keep their rows; their `category_id` is nulled
    /// by the FK's `ON DELETE SET NULL`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no category has this id.
    pub async fn delete_category(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// List food items, optionally filtered by category and/or a search term
    /// matched against name and description, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_items(
        &self,
        category: Option<CategoryId>,
        search: Option<&str>,
    ) -> Result<Vec<FoodItem>, RepositoryError> {
        let pattern = search
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(|q| format!("%{q}%"));

        let rows = sqlx::query_as::<_, FoodItemRow>(
            r"
            SELECT id, category_id, name, description, price, image_url,
                   is_available, created_at
            FROM food_items
            WHERE ($1::int IS NULL OR category_id = $1)
              AND ($2::text IS NULL OR name ILIKE $2 OR description ILIKE $2)
            ORDER BY name ASC
            ",
        )
        .bind(category.map(|c| c.as_i32()))
        .bind(pattern)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Fetch a single item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no item has this id.
    pub async fn get_item(&self, id: ItemId) -> Result<FoodItem, RepositoryError> {
        let row = sqlx::query_as::<_, FoodItemRow>(
            r"
            SELECT id, category_id, name, description, price, image_url,
                   is_available, created_at
            FROM food_items
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Create a food item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_item(&self, item: &NewFoodItem) -> Result<FoodItem, RepositoryError> {
        let row = sqlx::query_as::<_, FoodItemRow>(
            r"
            INSERT INTO food_items (category_id, name, description, price, image_url, is_available)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, category_id, name, description, price, image_url,
                      is_available, created_at
            ",
        )
        .bind(item.category_id.map(|c| c.as_i32()))
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price)
        .bind(&item.image_url)
        .bind(item.is_available)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Replace a food item's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no item has this id.
    pub async fn update_item(
        &self,
        id: ItemId,
        item: &NewFoodItem,
    ) -> Result<FoodItem, RepositoryError> {
        let row = sqlx::query_as::<_, FoodItemRow>(
            r"
            UPDATE food_items
            SET category_id = $2, name = $3, description = $4, price = $5,
                image_url = $6, is_available = $7
            WHERE id = $1
            RETURNING id, category_id, name, description, price, image_url,
                      is_available, created_at
            ",
        )
        .bind(id.as_i32())
        .bind(item.category_id.map(|c| c.as_i32()))
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price)
        .bind(&item.image_url)
        .bind(item.is_available)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete a food item. Order lines referencing it keep their snapshots.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no item has this id.
    pub async fn delete_item(&self, id: ItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM food_items WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Mark every catalog item unavailable. Used when ordering is paused
    /// store-wide. Returns the number of items touched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn mark_all_unavailable(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("UPDATE food_items SET is_available = FALSE")
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
