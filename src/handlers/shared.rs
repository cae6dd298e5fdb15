use std::net::IpAddr;

use url::Url;
use uuid::Uuid;

use crate::{
    auth::SessionKey,
    error::{AppError, AppResult},
    models::{Item, Permission, Wishlist},
    state::AppState,
};

pub const INVALID_URL: &str = "Invalid URL was provided.";

/// Fetch a wishlist row, returning 404 if it does not exist.
pub async fn fetch_wishlist(state: &AppState, wishlist_id: Uuid) -> AppResult<Wishlist> {
    state
        .wishlists
        .get(wishlist_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Wishlist not found".into()))
}

/// Fetch an item row, returning 404 if it does not exist.
pub async fn fetch_item(state: &AppState, item_id: Uuid) -> AppResult<Item> {
    state
        .items
        .get(item_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".into()))
}

/// Permission `key` holds on `wishlist`. Owners always hold `Edit`.
pub async fn access_of(
    state: &AppState,
    wishlist: &Wishlist,
    key: &SessionKey,
) -> AppResult<Option<Permission>> {
    if wishlist.ownership == key.as_str() {
        return Ok(Some(Permission::Edit));
    }
    state.wishlists.permission(wishlist.id, key.as_str()).await
}

pub async fn require_edit(state: &AppState, wishlist: &Wishlist, key: &SessionKey) -> AppResult<()> {
    match access_of(state, wishlist, key).await? {
        Some(Permission::Edit) => Ok(()),
        _ => Err(AppError::Forbidden(
            "You don't have permission to edit this wishlist".into(),
        )),
    }
}

/// Returns `true` if `ip` is a private, loopback, link-local or unspecified address.
pub fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let o = v4.octets();
            matches!(
                o,
                [127, ..]
                    | [10, ..]
                    | [169, 254, ..]
                    | [192, 168, ..]
                    | [0, ..]
                    | [255, 255, 255, 255]
            ) || (o[0] == 172 && (16..=31).contains(&o[1]))
        }
        IpAddr::V6(v6) => {
            if let Some(v4) = v6.to_ipv4_mapped() {
                return is_private_ip(IpAddr::V4(v4));
            }
            v6.is_loopback()
                || v6.is_unspecified()
                || (v6.segments()[0] & 0xfe00 == 0xfc00)
                || (v6.segments()[0] & 0xffc0 == 0xfe80)
        }
    }
}

/// Check that `raw` is an http(s) URL the server may fetch.
///
/// Unless `allow_private` is set, every address the host resolves to must be
/// public.
pub async fn validate_target_url(raw: &str, allow_private: bool) -> AppResult<Url> {
    let parsed = Url::parse(raw.trim()).map_err(|_| AppError::Validation(INVALID_URL.into()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        _ => {
            return Err(AppError::Validation(
                "Only http/https URLs are supported".into(),
            ))
        }
    }

    let host = parsed
        .host_str()
        .ok_or_else(|| AppError::Validation("URL has no host".into()))?
        .to_string();

    if allow_private {
        return Ok(parsed);
    }

    let port = parsed.port_or_known_default().unwrap_or(80);
    let addrs = tokio::net::lookup_host((host.trim_start_matches('[').trim_end_matches(']'), port))
        .await
        .map_err(|_| AppError::Validation("Could not resolve URL host".into()))?;

    for addr in addrs {
        if is_private_ip(addr.ip()) {
            return Err(AppError::Validation(
                "URL resolves to a private or reserved address".into(),
            ));
        }
    }

    Ok(parsed)
}
