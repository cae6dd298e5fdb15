use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use super::shared::{validate_target_url, INVALID_URL};
use crate::error::{AppError, AppResult};
use crate::ogp::{extract_metadata, Metadata};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LinkPreviewQuery {
    pub url: String,
}

/// GET /link-preview?url=<encoded-url>
///
/// Returns the metadata an item created from this URL would receive.
/// Rejects private/loopback hosts unless the server allows them.
pub async fn get_link_preview(
    State(state): State<AppState>,
    Query(params): Query<LinkPreviewQuery>,
) -> AppResult<Json<Metadata>> {
    validate_target_url(&params.url, state.allow_private_hosts).await?;

    let metadata = extract_metadata(&state.fetcher, &params.url)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, url = %params.url, "Failed to extract link preview");
            AppError::Validation(INVALID_URL.into())
        })?;

    Ok(Json(metadata))
}
