//! Output document types.
//!
//! These serialize to the JSON shape the catalog API accepts:
//! `{"name": ..., "contents": {"items": [...]}}`.

use serde::{Deserialize, Serialize};

use crate::items::CatalogItem;

/// Name and variable name of the synthetic node placed under every
/// top-level configuration node.
pub const WRAPPER_NAME: &str = "All Product Family";

/// Resource type of the synthetic wrapper node.
pub const WRAPPER_RESOURCE_TYPE: &str = "all_product_family";

/// A complete migration package document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    pub contents: Contents,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contents {
    pub items: Vec<Item>,
}

/// A top-level entry of `contents.items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Item {
    /// Top-level node of a configuration tree.
    Node(Node),
    /// Flat item (Commerce, Util Library, ...).
    Catalog(CatalogItem),
}

/// A path segment rendered as a configuration node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub name: String,
    pub variable_name: String,
    pub resource_type: String,
    pub granular: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Child>,
}

/// A child of a configuration node: a nested node or an attached leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Child {
    Node(Node),
    Leaf(Leaf),
}

/// A terminal child item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaf {
    pub name: String,
    pub variable_name: String,
    pub resource_type: String,
}

impl Node {
    /// The fixed "All Product Family" node wrapping `children`.
    pub fn wrapper(children: Vec<Child>) -> Self {
        Self {
            name: WRAPPER_NAME.to_string(),
            variable_name: WRAPPER_NAME.to_string(),
            resource_type: WRAPPER_RESOURCE_TYPE.to_string(),
            granular: true,
            children,
        }
    }

    /// Nested child nodes, skipping leaves.
    pub fn child_nodes(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter_map(|c| match c {
            Child::Node(n) => Some(n),
            Child::Leaf(_) => None,
        })
    }

    /// Leaves attached directly to this node.
    pub fn leaves(&self) -> impl Iterator<Item = &Leaf> {
        self.children.iter().filter_map(|c| match c {
            Child::Leaf(l) => Some(l),
            Child::Node(_) => None,
        })
    }

    /// Find a direct child node by variable name.
    pub fn child(&self, variable_name: &str) -> Option<&Node> {
        self.child_nodes().find(|n| n.variable_name == variable_name)
    }
}

impl Document {
    pub fn new(name: impl Into<String>, items: Vec<Item>) -> Self {
        Self {
            name: name.into(),
            contents: Contents { items },
        }
    }

    /// Top-level configuration nodes, skipping flat items.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.contents.items.iter().filter_map(|i| match i {
            Item::Node(n) => Some(n),
            Item::Catalog(_) => None,
        })
    }

    /// Flat catalog items, skipping configuration nodes.
    pub fn catalog_items(&self) -> impl Iterator<Item = &CatalogItem> {
        self.contents.items.iter().filter_map(|i| match i {
            Item::Catalog(c) => Some(c),
            Item::Node(_) => None,
        })
    }

    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leaf(v: &str, t: &str) -> Leaf {
        Leaf {
            name: v.to_string(),
            variable_name: v.to_string(),
            resource_type: t.to_string(),
        }
    }

    #[test]
    fn test_node_without_children_omits_key() {
        let node = Node {
            name: "Fam".to_string(),
            variable_name: "fam".to_string(),
            resource_type: "product_family".to_string(),
            granular: true,
            children: vec![],
        };
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "Fam",
                "variableName": "fam",
                "resourceType": "product_family",
                "granular": true
            })
        );
    }

    #[test]
    fn test_wrapper_shape() {
        let wrapper = Node::wrapper(vec![Child::Leaf(leaf("x", "t"))]);
        let value = serde_json::to_value(&wrapper).unwrap();
        assert_eq!(value["name"], "All Product Family");
        assert_eq!(value["variableName"], "All Product Family");
        assert_eq!(value["resourceType"], "all_product_family");
        assert_eq!(value["granular"], true);
        assert_eq!(value["children"][0]["variableName"], "x");
    }

    #[test]
    fn test_field_order_is_stable() {
        let doc = Document::new(
            "Pkg",
            vec![Item::Node(Node::wrapper(vec![Child::Leaf(leaf("x", "t"))]))],
        );
        let text = doc.to_json(false).unwrap();
        assert!(text.starts_with(r#"{"name":"Pkg","contents":{"items":[{"name":"All Product Family","variableName""#));
    }

    #[test]
    fn test_children_deserialize_into_nodes_and_leaves() {
        let node: Node = serde_json::from_value(json!({
            "name": "A",
            "variableName": "a",
            "resourceType": "product_family",
            "granular": false,
            "children": [
                {"name": "B", "variableName": "b", "resourceType": "model", "granular": true},
                {"name": "x", "variableName": "x", "resourceType": "t"}
            ]
        }))
        .unwrap();
        assert_eq!(node.child_nodes().count(), 1);
        assert_eq!(node.leaves().collect::<Vec<_>>(), vec![&leaf("x", "t")]);
        assert!(node.child("b").is_some());
    }
}
