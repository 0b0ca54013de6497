//! Menu route handlers.
//!
//! The menu is read-heavy and changes rarely, so catalog queries go through
//! a TTL'd snapshot cache (see [`crate::state::CATALOG_REFRESH`]). The
//! store-wide "receive orders" flag is read fresh on every request so a
//! pause shows up immediately as "Paused" labels.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use canteen_core::{Availability, CategoryId, ItemId};

use crate::db::{CatalogRepository, settings};
use crate::error::{AppError, Result};
use crate::models::{Category, FoodItem};
use crate::state::{AppState, CatalogSnapshot};

/// One menu item as clients see it.
#[derive(Debug, Clone, Serialize)]
pub struct MenuItemView {
    pub id: ItemId,
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub availability: Availability,
}

impl MenuItemView {
    fn from_item(item: &FoodItem, accepting_orders: bool) -> Self {
        Self {
            id: item.id,
            category_id: item.category_id,
            name: item.name.clone(),
            description: item.description.clone(),
            price: item.price,
            image_url: item.image_url.clone(),
            availability: item.availability(accepting_orders),
        }
    }
}

/// The full menu response.
#[derive(Debug, Serialize)]
pub struct MenuResponse {
    pub accepting_orders: bool,
    pub categories: Vec<Category>,
    pub items: Vec<MenuItemView>,
}

/// Query parameters for item search.
#[derive(Debug, Deserialize)]
pub struct ItemsQuery {
    pub category: Option<CategoryId>,
    pub q: Option<String>,
}

/// Load the catalog snapshot through the cache.
async fn catalog_snapshot(state: &AppState) -> Result<Arc<CatalogSnapshot>> {
    let pool = state.pool().clone();
    state
        .catalog_cache()
        .try_get_with((), async move {
            let repo = CatalogRepository::new(&pool);
            let categories = repo.list_categories().await?;
            let items = repo.list_items(None, None).await?;
            Ok::<_, crate::db::RepositoryError>(Arc::new(CatalogSnapshot { categories, items }))
        })
        .await
        .map_err(|e| AppError::Internal(format!("catalog load failed: {e}")))
}

/// GET /menu - categories and items with availability labels.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Result<Json<MenuResponse>> {
    let accepting_orders = settings::receive_orders(state.pool()).await?;
    let snapshot = catalog_snapshot(&state).await?;

    let items = snapshot
        .items
        .iter()
        .map(|item| MenuItemView::from_item(item, accepting_orders))
        .collect();

    Ok(Json(MenuResponse {
        accepting_orders,
        categories: snapshot.categories.clone(),
        items,
    }))
}

/// GET /menu/items - item search, uncached so results track the database.
#[instrument(skip(state))]
pub async fn items(
    State(state): State<AppState>,
    Query(query): Query<ItemsQuery>,
) -> Result<Json<Vec<MenuItemView>>> {
    let accepting_orders = settings::receive_orders(state.pool()).await?;
    let repo = CatalogRepository::new(state.pool());
    let items = repo
        .list_items(query.category, query.q.as_deref())
        .await?;

    Ok(Json(
        items
            .iter()
            .map(|item| MenuItemView::from_item(item, accepting_orders))
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn item(available: bool) -> FoodItem {
        FoodItem {
            id: ItemId::new(1),
            category_id: None,
            name: "Masala Dosa".to_string(),
            description: Some("Crispy, with chutney".to_string()),
            price: Decimal::from(60),
            image_url: None,
            is_available: available,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_menu_item_view_labels() {
        let view = MenuItemView::from_item(&item(true), true);
        assert_eq!(view.availability, Availability::Available);

        let out = MenuItemView::from_item(&item(false), true);
        assert_eq!(out.availability, Availability::Out);

        // Paused store-wide: every item reads "Paused", not "Out"
        let paused = MenuItemView::from_item(&item(true), false);
        assert_eq!(paused.availability, Availability::Paused);
    }
}
