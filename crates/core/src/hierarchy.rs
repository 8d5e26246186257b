use std::cmp::Ordering;
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::model::{HierarchyNode, Node, NodeId, Rect};

/// Flattened, summed and sorted copy of an input document.
#[derive(Debug, Clone)]
pub struct Hierarchy {
    pub root: NodeId,
    pub nodes: Vec<Node>,
}

impl Hierarchy {
    pub fn from_data(data: &HierarchyNode) -> Result<Self> {
        let mut nodes: Vec<Node> = Vec::with_capacity(128);
        push_node(data, None, 0, &mut nodes);

        // Pre-order push means every child index is larger than its parent's,
        // so a reverse sweep sees children first.
        for idx in (0..nodes.len()).rev() {
            if nodes[idx].children.is_empty() {
                let node = &nodes[idx];
                if !(node.value.is_finite() && node.value > 0.0) {
                    return Err(Error::InvalidValue {
                        key: node.key.clone(),
                    });
                }
                continue;
            }
            let (value, height) = nodes[idx].children.iter().fold((0.0, 0), |(v, h), c| {
                let child = &nodes[c.0];
                (v + child.value, h.max(child.height + 1))
            });
            let node = &mut nodes[idx];
            node.value = value;
            node.height = height;
        }

        let mut hierarchy = Self {
            root: NodeId(0),
            nodes,
        };
        hierarchy.sort_children();
        Ok(hierarchy)
    }

    // Taller subtrees first, then larger values. `sort_by` is stable, so full
    // ties keep document order.
    fn sort_children(&mut self) {
        for idx in 0..self.nodes.len() {
            let mut children = std::mem::take(&mut self.nodes[idx].children);
            children.sort_by(|a, b| {
                let (a, b) = (&self.nodes[a.0], &self.nodes[b.0]);
                b.height
                    .cmp(&a.height)
                    .then_with(|| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal))
            });
            self.nodes[idx].children = children;
        }
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn root(&self) -> &Node {
        self.get(self.root)
    }

    /// Pre-order walk following the sorted child order.
    pub fn each_before(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.get(id).children.iter().rev().copied());
        }
        order
    }

    pub fn leaves(&self) -> Vec<NodeId> {
        self.each_before()
            .into_iter()
            .filter(|id| self.get(*id).is_leaf())
            .collect()
    }

    /// Distinct leaf categories, in the order they are first met by `leaves()`.
    pub fn categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.leaves()
            .into_iter()
            .map(|id| self.get(id).category.clone().unwrap_or_default())
            .filter(|c| seen.insert(c.clone()))
            .collect()
    }
}

fn push_node(data: &HierarchyNode, parent: Option<NodeId>, depth: usize, nodes: &mut Vec<Node>) {
    let id = NodeId(nodes.len());
    let key = match parent {
        Some(pid) => format!("{}.{}", nodes[pid.0].key, data.name),
        None => data.name.clone(),
    };
    nodes.push(Node {
        id,
        parent,
        key,
        name: data.name.clone(),
        category: data.category.clone(),
        value: if data.is_leaf() {
            data.value.unwrap_or(0.0)
        } else {
            0.0
        },
        depth,
        height: 0,
        children: Vec::with_capacity(data.children.len()),
        rect: Rect::default(),
    });
    if let Some(pid) = parent {
        nodes[pid.0].children.push(id);
    }
    for child in &data.children {
        push_node(child, Some(id), depth + 1, nodes);
    }
}
