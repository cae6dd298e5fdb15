use std::cmp::Ordering;

use ego_tree::NodeRef;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Node;

use super::binder::{bind_element_attributes, AttributeTarget};
use super::walker::find_all;
use super::ExtractError;

const ICON_RELATIONS: &[&str] = &[
    "icon",
    "apple-touch-icon",
    "apple-touch-icon-precomposed",
    "mask-icon",
];

static SIZE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)[xX]\d+$").expect("size token regex is valid"));

/// The attributes of one `<link>` element that matter for favicon ranking.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FaviconCandidate {
    pub rel: String,
    pub kind: String,
    pub sizes: String,
    pub href: String,
}

impl AttributeTarget for FaviconCandidate {
    fn field_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "rel" => Some(&mut self.rel),
            "type" => Some(&mut self.kind),
            "sizes" => Some(&mut self.sizes),
            "href" => Some(&mut self.href),
            _ => None,
        }
    }
}

impl FaviconCandidate {
    fn is_icon(&self) -> bool {
        if !self.kind.is_empty() && !self.kind.contains("png") {
            return false;
        }
        ICON_RELATIONS.iter().any(|relation| self.rel.contains(relation))
    }

    /// 0 for mask icons, 1 for apple icons, 2 for everything else.
    fn tier(&self) -> u8 {
        let rel = self.rel.to_ascii_lowercase();
        if rel.split_ascii_whitespace().any(|token| token == "mask-icon") {
            0
        } else if rel.contains("apple") {
            1
        } else {
            2
        }
    }

    /// Largest declared width; `None` when no `sizes` token parses.
    fn max_width(&self) -> Option<u32> {
        self.sizes
            .split_ascii_whitespace()
            .filter_map(|token| SIZE_TOKEN.captures(token))
            .filter_map(|caps| caps[1].parse::<u32>().ok())
            .max()
    }

    /// Best candidate sorts first.
    fn rank(&self, other: &Self) -> Ordering {
        self.tier()
            .cmp(&other.tier())
            .then_with(|| other.max_width().cmp(&self.max_width()))
    }
}

/// Pick the best favicon declared under `head`.
///
/// Mask icons beat apple touch icons, which beat plain icons. Within a tier
/// the largest declared width wins, and a declared size beats none. Icons
/// with a non-PNG `type` are skipped.
pub fn select_favicon(head: Option<NodeRef<'_, Node>>) -> Result<String, ExtractError> {
    let mut candidates = Vec::new();
    for link in find_all(head, "link") {
        let mut candidate = FaviconCandidate::default();
        bind_element_attributes(link, &mut candidate)?;
        if candidate.is_icon() {
            candidates.push(candidate);
        }
    }

    // Stable sort: equally ranked icons keep document order.
    candidates.sort_by(FaviconCandidate::rank);

    candidates
        .into_iter()
        .next()
        .map(|best| best.href)
        .ok_or(ExtractError::FaviconNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ogp::walker::find_head;
    use scraper::Html;

    fn select(head_html: &str) -> Result<String, ExtractError> {
        let doc = Html::parse_document(&format!("<html><head>{head_html}</head></html>"));
        select_favicon(find_head(doc.tree.root()))
    }

    fn candidate(rel: &str, sizes: &str) -> FaviconCandidate {
        FaviconCandidate {
            rel: rel.into(),
            sizes: sizes.into(),
            ..Default::default()
        }
    }

    #[test]
    fn mask_icon_beats_sized_icon() {
        let href = select(
            r#"<link rel="icon" sizes="16x16" href="/16.png">
               <link rel="mask-icon" sizes="" href="/mask.png">"#,
        )
        .unwrap();
        assert_eq!(href, "/mask.png");
    }

    #[test]
    fn apple_icon_beats_plain_icon_regardless_of_size() {
        let href = select(
            r#"<link rel="icon" sizes="512x512" href="/big.png">
               <link rel="apple-touch-icon" href="/apple.png">"#,
        )
        .unwrap();
        assert_eq!(href, "/apple.png");
    }

    #[test]
    fn larger_width_wins_within_tier() {
        let href = select(
            r#"<link rel="icon" sizes="16x16" href="/16.png">
               <link rel="icon" sizes="32x32" href="/32.png">"#,
        )
        .unwrap();
        assert_eq!(href, "/32.png");
    }

    #[test]
    fn uses_each_candidates_own_sizes() {
        // Comparing the first candidate's sizes against themselves would tie
        // and leave document order in place, returning /16.png.
        let href = select(
            r#"<link rel="icon" sizes="16x16" href="/16.png">
               <link rel="icon" sizes="16x16 192x192" href="/192.png">"#,
        )
        .unwrap();
        assert_eq!(href, "/192.png");
    }

    #[test]
    fn declared_size_beats_missing_size() {
        let href = select(
            r#"<link rel="icon" href="/unknown.png">
               <link rel="icon" sizes="any" href="/any.png">
               <link rel="icon" sizes="8x8" href="/8.png">"#,
        )
        .unwrap();
        assert_eq!(href, "/8.png");
    }

    #[test]
    fn excludes_non_png_types() {
        let href = select(
            r#"<link rel="mask-icon" type="image/svg+xml" href="/mask.svg">
               <link rel="icon" href="/plain.ico">"#,
        )
        .unwrap();
        assert_eq!(href, "/plain.ico");
    }

    #[test]
    fn keeps_png_typed_candidates() {
        let href = select(r#"<link rel="icon" type="image/png" href="/p.png">"#).unwrap();
        assert_eq!(href, "/p.png");
    }

    #[test]
    fn shortcut_icon_counts_as_icon() {
        let href = select(r#"<link rel="shortcut icon" href="/favicon.ico">"#).unwrap();
        assert_eq!(href, "/favicon.ico");
    }

    #[test]
    fn non_icon_links_are_ignored() {
        let err = select(
            r#"<link rel="stylesheet" href="/site.css">
               <link rel="canonical" href="https://example.com/">"#,
        )
        .unwrap_err();
        assert!(matches!(err, ExtractError::FaviconNotFound));
    }

    #[test]
    fn missing_head_has_no_favicon() {
        assert!(matches!(
            select_favicon(None),
            Err(ExtractError::FaviconNotFound)
        ));
    }

    #[test]
    fn equal_rank_keeps_document_order() {
        let href = select(
            r#"<link rel="icon" sizes="32x32" href="/first.png">
               <link rel="icon" sizes="32x32" href="/second.png">"#,
        )
        .unwrap();
        assert_eq!(href, "/first.png");
    }

    #[test]
    fn tier_is_case_insensitive() {
        assert_eq!(candidate("Mask-Icon", "").tier(), 0);
        assert_eq!(candidate("APPLE-touch-icon", "").tier(), 1);
        assert_eq!(candidate("icon", "").tier(), 2);
    }

    #[test]
    fn max_width_reads_width_of_each_token() {
        assert_eq!(candidate("icon", "16x16 48x32 32X32").max_width(), Some(48));
        assert_eq!(candidate("icon", "any").max_width(), None);
        assert_eq!(candidate("icon", "").max_width(), None);
        assert_eq!(candidate("icon", "wide x16").max_width(), None);
    }
}
