//! Copies HTML attributes onto typed records by field name.
//!
//! Each record lists its bindable fields in [`AttributeTarget::field_mut`].
//! Keys are matched case-insensitively; unknown keys are ignored and
//! unmatched fields keep their defaults.

use ego_tree::NodeRef;
use scraper::Node;

use super::ExtractError;

pub trait AttributeTarget {
    /// Field bound to `key`, which is already lowercased.
    fn field_mut(&mut self, key: &str) -> Option<&mut String>;
}

/// The `property`/`content` pair of one `<meta>` element.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OgpPair {
    pub property: String,
    pub content: String,
}

impl AttributeTarget for OgpPair {
    fn field_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "property" => Some(&mut self.property),
            "content" => Some(&mut self.content),
            _ => None,
        }
    }
}

fn assign(target: &mut impl AttributeTarget, key: &str, value: &str) {
    if let Some(field) = target.field_mut(&key.to_ascii_lowercase()) {
        *field = value.to_string();
    }
}

/// Bind every attribute of an element node onto `target`.
pub fn bind_element_attributes(
    node: NodeRef<'_, Node>,
    target: &mut impl AttributeTarget,
) -> Result<(), ExtractError> {
    let element = node
        .value()
        .as_element()
        .ok_or_else(|| ExtractError::BindingFailed("node is not an element".into()))?;

    for (key, value) in element.attrs() {
        assign(target, key, value);
    }
    Ok(())
}

/// Bind an Open Graph pair onto `target`, keyed by its property with any
/// leading `og:` removed.
pub fn bind_ogp_pair(pair: &OgpPair, target: &mut impl AttributeTarget) -> Result<(), ExtractError> {
    let property = pair.property.trim().to_ascii_lowercase();
    let key = property.strip_prefix("og:").unwrap_or(&property);
    assign(target, key, &pair.content);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ogp::walker::{find_all, find_head};
    use scraper::Html;

    #[derive(Default)]
    struct Link {
        rel: String,
        href: String,
    }

    impl AttributeTarget for Link {
        fn field_mut(&mut self, key: &str) -> Option<&mut String> {
            match key {
                "rel" => Some(&mut self.rel),
                "href" => Some(&mut self.href),
                _ => None,
            }
        }
    }

    #[test]
    fn binds_matching_attributes_and_ignores_others() {
        let doc = Html::parse_document(
            r#"<head><link REL="icon" href="/a.png" data-extra="1"></head>"#,
        );
        let links = find_all(find_head(doc.tree.root()), "link");
        let mut link = Link::default();
        bind_element_attributes(links[0], &mut link).unwrap();

        assert_eq!(link.rel, "icon");
        assert_eq!(link.href, "/a.png");
    }

    #[test]
    fn unmatched_fields_keep_defaults() {
        let doc = Html::parse_document(r#"<head><link rel="icon"></head>"#);
        let links = find_all(find_head(doc.tree.root()), "link");
        let mut link = Link::default();
        bind_element_attributes(links[0], &mut link).unwrap();

        assert_eq!(link.href, "");
    }

    #[test]
    fn rejects_non_element_nodes() {
        let doc = Html::parse_document("<head><title>x</title></head>");
        let err = bind_element_attributes(doc.tree.root(), &mut OgpPair::default()).unwrap_err();
        assert!(matches!(err, ExtractError::BindingFailed(_)));
    }

    #[test]
    fn strips_og_prefix_and_ignores_case() {
        let mut link = Link::default();
        let pair = OgpPair {
            property: "og:HREF".into(),
            content: "/x".into(),
        };
        bind_ogp_pair(&pair, &mut link).unwrap();
        assert_eq!(link.href, "/x");

        let pair = OgpPair {
            property: "Rel".into(),
            content: "icon".into(),
        };
        bind_ogp_pair(&pair, &mut link).unwrap();
        assert_eq!(link.rel, "icon");

        let pair = OgpPair {
            property: "OG:Rel".into(),
            content: "mask-icon".into(),
        };
        bind_ogp_pair(&pair, &mut link).unwrap();
        assert_eq!(link.rel, "mask-icon");
    }

    #[test]
    fn only_leading_og_prefix_is_stripped() {
        let mut link = Link::default();
        let pair = OgpPair {
            property: "x:og:href".into(),
            content: "/x".into(),
        };
        bind_ogp_pair(&pair, &mut link).unwrap();
        assert_eq!(link.href, "");
    }
}
