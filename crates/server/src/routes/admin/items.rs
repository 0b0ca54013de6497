//! Admin catalog management: items and categories.
//!
//! Mutations invalidate the menu's catalog snapshot so changes are visible
//! on the next menu read instead of waiting out the cache TTL.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use tracing::instrument;

use canteen_core::{CategoryId, ItemId};

use crate::db::CatalogRepository;
use crate::error::Result;
use crate::middleware::RequireStaff;
use crate::models::{Category, FoodItem, NewCategory, NewFoodItem};
use crate::state::AppState;

/// The full catalog, including unavailable items and categories.
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub categories: Vec<Category>,
    pub items: Vec<FoodItem>,
}

/// GET /admin/items - the whole catalog for the management table.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
) -> Result<Json<CatalogResponse>> {
    let repo = CatalogRepository::new(state.pool());
    let categories = repo.list_all_categories().await?;
    let items = repo.list_items(None, None).await?;

    Ok(Json(CatalogResponse { categories, items }))
}

/// POST /admin/items - create an item.
#[instrument(skip(state, item))]
pub async fn create(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Json(item): Json<NewFoodItem>,
) -> Result<(StatusCode, Json<FoodItem>)> {
    let repo = CatalogRepository::new(state.pool());
    let created = repo.create_item(&item).await?;
    state.invalidate_catalog().await;

    tracing::info!(item = %created.id, name = %created.name, "item created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /admin/items/{id} - replace an item's fields.
#[instrument(skip(state, item))]
pub async fn update(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Path(id): Path<ItemId>,
    Json(item): Json<NewFoodItem>,
) -> Result<Json<FoodItem>> {
    let repo = CatalogRepository::new(state.pool());
    let updated = repo.update_item(id, &item).await?;
    state.invalidate_catalog().await;

    Ok(Json(updated))
}

/// DELETE /admin/items/{id} - delete an item.
///
/// Past order lines keep their price snapshots; only the catalog row goes.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Path(id): Path<ItemId>,
) -> Result<StatusCode> {
    let repo = CatalogRepository::new(state.pool());
    repo.delete_item(id).await?;
    state.invalidate_catalog().await;

    tracing::info!(item = %id, "item deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /admin/categories - create a category.
#[instrument(skip(state, category))]
pub async fn create_category(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Json(category): Json<NewCategory>,
) -> Result<(StatusCode, Json<Category>)> {
    let repo = CatalogRepository::new(state.pool());
    let created = repo.create_category(&category).await?;
    state.invalidate_catalog().await;

    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /admin/categories/{id} - replace a category's fields.
#[instrument(skip(state, category))]
pub async fn update_category(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Path(id): Path<CategoryId>,
    Json(category): Json<NewCategory>,
) -> Result<Json<Category>> {
    let repo = CatalogRepository::new(state.pool());
    let updated = repo.update_category(id, &category).await?;
    state.invalidate_catalog().await;

    Ok(Json(updated))
}

/// DELETE /admin/categories/{id} - delete a category (items keep their rows).
#[instrument(skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode> {
    let repo = CatalogRepository::new(state.pool());
    repo.delete_category(id).await?;
    state.invalidate_catalog().await;

    Ok(StatusCode::NO_CONTENT)
}
