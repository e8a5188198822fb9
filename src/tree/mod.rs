pub mod aggregate;

use compact_str::CompactString;

pub use self::aggregate::{aggregate, aggregate_by_names};

/// A node in the weighted group hierarchy.
///
/// `path` holds the key values from the root down to this node (empty for the
/// root). A parent's `weight` is the sum of its children's weights.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupNode {
    pub path: Vec<CompactString>,
    pub weight: f64,
    pub children: Vec<GroupNode>,
}

impl GroupNode {
    /// Leaf with its own weight. Negative or non-finite weights become zero.
    pub fn leaf(path: Vec<CompactString>, weight: f64) -> Self {
        let weight = if weight.is_finite() && weight > 0.0 {
            weight
        } else {
            0.0
        };
        Self {
            path,
            weight,
            children: Vec::new(),
        }
    }

    /// Internal node whose weight is the sum of `children`.
    pub fn branch(path: Vec<CompactString>, children: Vec<GroupNode>) -> Self {
        let weight = children.iter().map(|c| c.weight).sum();
        Self {
            path,
            weight,
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Last path segment (None for the root).
    pub fn key(&self) -> Option<&str> {
        self.path.last().map(|s| s.as_str())
    }

    /// Number of levels below the root this node sits at.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn child(&self, key: &str) -> Option<&GroupNode> {
        self.children.iter().find(|c| c.key() == Some(key))
    }

    /// Iterate the subtree in pre-order (this node first).
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }

    pub fn leaves(&self) -> impl Iterator<Item = &GroupNode> {
        self.iter().filter(|n| n.is_leaf())
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves().count()
    }

    /// Longest path length in the subtree.
    pub fn height(&self) -> usize {
        self.iter().map(|n| n.depth()).max().unwrap_or(0) - self.depth()
    }
}

/// Pre-order iterator over a [`GroupNode`] subtree.
pub struct Iter<'a> {
    stack: Vec<&'a GroupNode>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a GroupNode;

    fn next(&mut self) -> Option<&'a GroupNode> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
