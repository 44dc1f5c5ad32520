//! Edge anchoring for dependencies on groups.
//!
//! Graphviz cannot attach an edge to a cluster. An edge whose endpoint is a
//! group is drawn to a concrete leaf inside it instead, with `ltail`/`lhead`
//! telling the layout engine to clip the arrow at the cluster border. The
//! leaf chosen is always reached by following the first child repeatedly.

use crate::forest::{Forest, NodeId};

/// Where an edge endpoint is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    /// Leaf the edge actually attaches to
    pub leaf: NodeId,
    /// The group the edge should appear to enter or leave, if any
    pub cluster: Option<NodeId>,
}

impl Anchor {
    /// Whether the endpoint was redirected away from a group
    pub fn is_redirected(&self) -> bool {
        self.cluster.is_some()
    }
}

/// Follow the first-child chain from `node` down to a leaf.
///
/// A leaf is its own representative.
pub fn first_leaf(forest: &Forest, node: NodeId) -> NodeId {
    let mut current = node;
    while let Some(&first_child) = forest.node(current).children.first() {
        current = first_child;
    }
    current
}

/// Anchor for an edge endpoint at `node`
pub fn resolve_anchor(forest: &Forest, node: NodeId) -> Anchor {
    let leaf = first_leaf(forest, node);
    Anchor {
        leaf,
        cluster: (leaf != node).then_some(node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Directory, SourceItem};
    use crate::forest::MissingDependencyPolicy;

    fn forest(shape: &[(&str, Option<&str>)]) -> Forest {
        let items: Vec<SourceItem> = shape
            .iter()
            .map(|(id, parent)| {
                let mut item = SourceItem::new(*id, "");
                item.parent = parent.map(str::to_string);
                item
            })
            .collect();
        Forest::build(&items, &Directory::new(), None, MissingDependencyPolicy::Reject).unwrap()
    }

    #[test]
    fn test_leaf_anchors_to_itself() {
        let forest = forest(&[("A", None), ("B", Some("A"))]);
        let b = forest.find("B").unwrap();

        let anchor = resolve_anchor(&forest, b);
        assert_eq!(anchor, Anchor { leaf: b, cluster: None });
        assert!(!anchor.is_redirected());
    }

    #[test]
    fn test_group_anchors_to_first_child_chain() {
        // A { B { D, E }, C }
        let forest = forest(&[
            ("A", None),
            ("B", Some("A")),
            ("C", Some("A")),
            ("D", Some("B")),
            ("E", Some("B")),
        ]);
        let a = forest.find("A").unwrap();
        let b = forest.find("B").unwrap();
        let d = forest.find("D").unwrap();

        assert_eq!(first_leaf(&forest, a), d);
        assert_eq!(
            resolve_anchor(&forest, a),
            Anchor {
                leaf: d,
                cluster: Some(a)
            }
        );
        assert_eq!(
            resolve_anchor(&forest, b),
            Anchor {
                leaf: d,
                cluster: Some(b)
            }
        );
    }

    #[test]
    fn test_first_child_follows_input_order() {
        let forest = forest(&[("G", None), ("Z", Some("G")), ("A", Some("G"))]);
        let g = forest.find("G").unwrap();
        assert_eq!(forest.node(first_leaf(&forest, g)).external_id, "Z");
    }

    #[test]
    fn test_anchor_is_always_a_leaf() {
        let forest = forest(&[
            ("A", None),
            ("B", Some("A")),
            ("C", Some("B")),
            ("D", Some("C")),
            ("E", None),
        ]);
        for node in 0..forest.len() {
            let anchor = resolve_anchor(&forest, node);
            assert!(!forest.node(anchor.leaf).is_group());
            assert_eq!(anchor.is_redirected(), forest.node(node).is_group());
        }
    }
}
