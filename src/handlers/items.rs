use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::shared::{fetch_item, fetch_wishlist, require_edit, validate_target_url, INVALID_URL};
use crate::{
    auth::SessionKey,
    error::{validation_error, AppError, AppResult},
    models::{Item, UpdateItemDto},
    ogp::extract_metadata,
    state::AppState,
};

// ============================================================================
// Input validation
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct CreateItemRequest {
    #[validate(length(min = 1, max = 2048, message = "URL must be 1–2048 characters"))]
    pub url: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateItemRequest {
    /// Used when the id is not part of the path.
    pub id: Option<Uuid>,
    #[validate(url(message = "Invalid URL was provided."))]
    pub url: Option<String>,
    #[validate(length(max = 200, message = "Item name must be at most 200 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /item — list every item.
pub async fn list_items(State(state): State<AppState>) -> AppResult<Json<Vec<Item>>> {
    let items = state.items.list().await?;
    Ok(Json(items))
}

/// GET /item/:id
pub async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<Item>> {
    let item = fetch_item(&state, item_id).await?;
    Ok(Json(item))
}

/// POST /item/:id — add an item to wishlist `:id` from a page URL.
///
/// The item's name, description and image come from the page's Open Graph
/// tags. Pages without them still produce an item; pages that cannot be
/// fetched are rejected as an invalid URL.
pub async fn create_item(
    State(state): State<AppState>,
    key: SessionKey,
    Path(wishlist_id): Path<Uuid>,
    Json(req): Json<CreateItemRequest>,
) -> AppResult<(StatusCode, Json<Item>)> {
    req.validate().map_err(validation_error)?;

    let wishlist = fetch_wishlist(&state, wishlist_id).await?;
    require_edit(&state, &wishlist, &key).await?;
    validate_target_url(&req.url, state.allow_private_hosts).await?;

    let metadata = extract_metadata(&state.fetcher, &req.url)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, url = %req.url, "Failed to extract item metadata");
            AppError::Validation(INVALID_URL.into())
        })?;

    let item = Item {
        id: Uuid::new_v4(),
        wishlist_id,
        url: metadata.url,
        name: metadata.title,
        description: metadata.description,
        image: metadata.image,
        created_at: Utc::now(),
    };
    let item = state.items.insert(item).await?;

    info!(item_id = %item.id, wishlist_id = %wishlist_id, "Item created");
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /item/:id — update an item's fields.
pub async fn update_item(
    State(state): State<AppState>,
    key: SessionKey,
    Path(item_id): Path<Uuid>,
    Json(req): Json<UpdateItemRequest>,
) -> AppResult<Json<Item>> {
    apply_update(&state, &key, item_id, req).await
}

/// PUT /item — update the item named by the body's `id`.
pub async fn update_item_from_body(
    State(state): State<AppState>,
    key: SessionKey,
    Json(req): Json<UpdateItemRequest>,
) -> AppResult<Json<Item>> {
    let item_id = req
        .id
        .ok_or_else(|| AppError::Validation("An item id is required".into()))?;
    apply_update(&state, &key, item_id, req).await
}

async fn apply_update(
    state: &AppState,
    key: &SessionKey,
    item_id: Uuid,
    req: UpdateItemRequest,
) -> AppResult<Json<Item>> {
    req.validate().map_err(validation_error)?;

    let mut item = fetch_item(state, item_id).await?;
    let wishlist = fetch_wishlist(state, item.wishlist_id).await?;
    require_edit(state, &wishlist, key).await?;

    item.apply(UpdateItemDto {
        url: req.url,
        name: req.name,
        description: req.description,
        image: req.image,
    });

    let updated = state
        .items
        .update(item_id, item)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".into()))?;

    Ok(Json(updated))
}
