//! Open Graph metadata extraction for item URLs.
//!
//! A page is fetched with the shared bot client, its `<head>` meta tags are
//! bound onto a [`Metadata`] record, and when no image was declared the best
//! favicon is used instead.

pub mod binder;
pub mod favicon;
pub mod walker;

use reqwest::Method;
use scraper::Html;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fetch::{FetchClient, FetchError};
use binder::{bind_element_attributes, bind_ogp_pair, AttributeTarget, OgpPair};
use favicon::select_favicon;
use walker::{find_all, find_head};

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("fetch failed: {0}")]
    FetchFailed(#[from] FetchError),

    #[error("could not parse document: {0}")]
    ParseFailed(String),

    #[error("could not bind attributes: {0}")]
    BindingFailed(String),

    #[error("page has no favicon")]
    FaviconNotFound,
}

/// Open Graph data of a page. Every field except `url` may be empty.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub url: String,
    #[serde(rename = "imageUrl")]
    pub image: String,
    pub title: String,
    pub description: String,
}

impl AttributeTarget for Metadata {
    // `url` is not bindable; `og:url` must not replace the requested URL.
    fn field_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "image" => Some(&mut self.image),
            "title" => Some(&mut self.title),
            "description" => Some(&mut self.description),
            _ => None,
        }
    }
}

/// Fetch `url` and extract its metadata.
///
/// Fetch, parse and binding failures are returned; a page without any image
/// or favicon is not an error and yields an empty `image`.
pub async fn extract_metadata(client: &FetchClient, url: &str) -> Result<Metadata, ExtractError> {
    let response = client.fetch(Method::GET, url, "").await?;
    if !response.status().is_success() {
        tracing::debug!(status = %response.status(), url, "Extracting metadata from non-success response");
    }

    let document = response.html().await.map_err(|e| match e {
        FetchError::Body(e) => ExtractError::ParseFailed(e.to_string()),
        other => ExtractError::FetchFailed(other),
    })?;

    extract_from_document(&document, url)
}

/// Extract metadata from an already parsed document.
pub fn extract_from_document(document: &Html, url: &str) -> Result<Metadata, ExtractError> {
    let head = find_head(document.tree.root());
    let mut metadata = Metadata {
        url: url.to_string(),
        ..Default::default()
    };

    for meta in find_all(head, "meta") {
        let mut pair = OgpPair::default();
        bind_element_attributes(meta, &mut pair)?;
        bind_ogp_pair(&pair, &mut metadata)?;
    }

    if metadata.image.is_empty() {
        match select_favicon(head) {
            Ok(href) => metadata.image = href,
            Err(ExtractError::FaviconNotFound) => {
                tracing::debug!(url, "No image or favicon found");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(metadata)
}
