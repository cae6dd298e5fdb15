use ego_tree::NodeRef;
use scraper::Node;

fn is_element_named(node: &NodeRef<'_, Node>, tag: &str) -> bool {
    matches!(node.value(), Node::Element(element) if element.name() == tag)
}

/// First `<head>` element in document order, if any.
pub fn find_head(root: NodeRef<'_, Node>) -> Option<NodeRef<'_, Node>> {
    root.descendants().find(|node| is_element_named(node, "head"))
}

/// Every element named `tag` in the subtree of `root` (root included), in
/// document order. A missing root yields nothing.
pub fn find_all<'a>(root: Option<NodeRef<'a, Node>>, tag: &str) -> Vec<NodeRef<'a, Node>> {
    root.map(|root| {
        root.descendants()
            .filter(|node| is_element_named(node, tag))
            .collect()
    })
    .unwrap_or_default()
}
