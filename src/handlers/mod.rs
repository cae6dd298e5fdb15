pub mod items;
pub mod link_preview;
pub mod shared;
pub mod wishlists;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let store_ok = match state.wishlists.health().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = ?e, "Health check: store unavailable");
            false
        }
    };

    let http_status = if store_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        http_status,
        Json(json!({
            "status": if store_ok { "ok" } else { "degraded" },
            "service": "wishlist-server",
            "version": env!("CARGO_PKG_VERSION"),
            "database": if store_ok { "ok" } else { "unavailable" },
        })),
    )
}

/// Every API route. Layers and `/metrics` are added by the binary.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/link-preview", get(link_preview::get_link_preview))
        // Wishlist routes
        .route(
            "/wishlist",
            post(wishlists::create_wishlist)
                .get(wishlists::list_accessible_wishlists)
                .put(wishlists::update_wishlist_from_body),
        )
        .route(
            "/wishlist/:id",
            get(wishlists::get_wishlist).put(wishlists::update_wishlist),
        )
        .route("/wishlist/:id/items", get(wishlists::get_wishlist_items))
        .route(
            "/wishlist/:id/permission",
            post(wishlists::register_permission),
        )
        .route(
            "/wishlist/:id/permission/:password",
            post(wishlists::register_permission_with_password),
        )
        // Item routes
        .route(
            "/item",
            get(items::list_items).put(items::update_item_from_body),
        )
        .route(
            "/item/:id",
            get(items::get_item)
                .post(items::create_item)
                .put(items::update_item),
        )
}
