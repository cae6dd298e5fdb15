use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::shared::{access_of, fetch_wishlist, require_edit};
use crate::{
    auth::{generate_password, hash_password, verify_password, SessionKey},
    error::{validation_error, AppError, AppResult},
    models::{
        Item, Permission, PermissionedWishlistDto, UnlockedWishlistDto, Wishlist, WishlistDto,
    },
    state::AppState,
};

// ============================================================================
// Input validation
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct CreateWishlistRequest {
    #[validate(length(min = 1, max = 100, message = "Wishlist name must be 1–100 characters"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateWishlistRequest {
    pub id: Option<Uuid>,
    #[validate(length(min = 1, max = 100, message = "Wishlist name must be 1–100 characters"))]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct PermissionResponse {
    pub permission: Permission,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /wishlist — create a wishlist owned by the caller.
///
/// The response carries the plain password exactly once; only its hash is
/// stored.
pub async fn create_wishlist(
    State(state): State<AppState>,
    key: SessionKey,
    Json(req): Json<CreateWishlistRequest>,
) -> AppResult<(StatusCode, Json<UnlockedWishlistDto>)> {
    req.validate().map_err(validation_error)?;

    let password = generate_password();
    let wishlist = Wishlist {
        id: Uuid::new_v4(),
        name: req.name.trim().to_string(),
        password_hash: hash_password(&password)?,
        ownership: key.as_str().to_string(),
        created_at: Utc::now(),
    };
    let wishlist = state.wishlists.insert(wishlist).await?;

    info!(wishlist_id = %wishlist.id, "Wishlist created");

    Ok((
        StatusCode::CREATED,
        Json(UnlockedWishlistDto {
            id: wishlist.id,
            name: wishlist.name,
            password,
            ownership: wishlist.ownership,
            created_at: wishlist.created_at,
        }),
    ))
}

/// GET /wishlist — every wishlist the caller owns or has registered for.
///
/// Owned wishlists are always reported as `EDIT`.
pub async fn list_accessible_wishlists(
    State(state): State<AppState>,
    key: SessionKey,
) -> AppResult<Json<Vec<PermissionedWishlistDto>>> {
    let owned = state.wishlists.owned_by(key.as_str()).await?;
    let saved = state.wishlists.saved_by(key.as_str()).await?;

    let mut accessible: Vec<PermissionedWishlistDto> = saved
        .into_iter()
        .filter(|(wishlist, _)| !owned.iter().any(|o| o.id == wishlist.id))
        .map(|(wishlist, permission)| PermissionedWishlistDto {
            wishlist: wishlist.into(),
            permission,
        })
        .collect();

    accessible.extend(owned.into_iter().map(|wishlist| PermissionedWishlistDto {
        wishlist: wishlist.into(),
        permission: Permission::Edit,
    }));

    Ok(Json(accessible))
}

/// GET /wishlist/:id
pub async fn get_wishlist(
    State(state): State<AppState>,
    Path(wishlist_id): Path<Uuid>,
) -> AppResult<Json<WishlistDto>> {
    let wishlist = fetch_wishlist(&state, wishlist_id).await?;
    Ok(Json(wishlist.into()))
}

/// GET /wishlist/:id/items
pub async fn get_wishlist_items(
    State(state): State<AppState>,
    Path(wishlist_id): Path<Uuid>,
) -> AppResult<Json<Vec<Item>>> {
    fetch_wishlist(&state, wishlist_id).await?;
    let items = state.wishlists.items(wishlist_id).await?;
    Ok(Json(items))
}

/// PUT /wishlist/:id — rename a wishlist.
pub async fn update_wishlist(
    State(state): State<AppState>,
    key: SessionKey,
    Path(wishlist_id): Path<Uuid>,
    Json(req): Json<UpdateWishlistRequest>,
) -> AppResult<Json<WishlistDto>> {
    rename(&state, &key, wishlist_id, req).await
}

/// PUT /wishlist — rename the wishlist named by the body's `id`.
pub async fn update_wishlist_from_body(
    State(state): State<AppState>,
    key: SessionKey,
    Json(req): Json<UpdateWishlistRequest>,
) -> AppResult<Json<WishlistDto>> {
    let wishlist_id = req
        .id
        .ok_or_else(|| AppError::Validation("A wishlist id is required".into()))?;
    rename(&state, &key, wishlist_id, req).await
}

async fn rename(
    state: &AppState,
    key: &SessionKey,
    wishlist_id: Uuid,
    req: UpdateWishlistRequest,
) -> AppResult<Json<WishlistDto>> {
    req.validate().map_err(validation_error)?;

    let mut wishlist = fetch_wishlist(state, wishlist_id).await?;
    require_edit(state, &wishlist, key).await?;
    wishlist.name = req.name.trim().to_string();

    let updated = state
        .wishlists
        .update(wishlist_id, wishlist)
        .await?
        .ok_or_else(|| AppError::NotFound("Wishlist not found".into()))?;

    Ok(Json(updated.into()))
}

/// POST /wishlist/:id/permission — register the caller as a viewer.
pub async fn register_permission(
    State(state): State<AppState>,
    key: SessionKey,
    Path(wishlist_id): Path<Uuid>,
) -> AppResult<Json<PermissionResponse>> {
    register(&state, &key, wishlist_id, None).await
}

/// POST /wishlist/:id/permission/:password — register the caller as an editor.
pub async fn register_permission_with_password(
    State(state): State<AppState>,
    key: SessionKey,
    Path((wishlist_id, password)): Path<(Uuid, String)>,
) -> AppResult<Json<PermissionResponse>> {
    register(&state, &key, wishlist_id, Some(password)).await
}

/// A correct password grants `EDIT`; no password grants `VIEW`.
/// Registration never lowers a permission already held.
async fn register(
    state: &AppState,
    key: &SessionKey,
    wishlist_id: Uuid,
    password: Option<String>,
) -> AppResult<Json<PermissionResponse>> {
    let wishlist = fetch_wishlist(state, wishlist_id).await?;

    let requested = match password {
        Some(password) => {
            if !verify_password(&password, &wishlist.password_hash)? {
                return Err(AppError::Forbidden("Incorrect wishlist password".into()));
            }
            Permission::Edit
        }
        None => Permission::View,
    };

    if let Some(held) = access_of(state, &wishlist, key).await? {
        if held >= requested {
            return Ok(Json(PermissionResponse { permission: held }));
        }
    }

    state
        .wishlists
        .grant(wishlist_id, key.as_str(), requested)
        .await?;

    // A concurrent registration may have granted more than was requested.
    let permission = state
        .wishlists
        .permission(wishlist_id, key.as_str())
        .await?
        .unwrap_or(requested);

    info!(wishlist_id = %wishlist_id, permission = ?permission, "Permission registered");
    Ok(Json(PermissionResponse { permission }))
}
