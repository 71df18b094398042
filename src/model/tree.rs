//! Arena holding the produced forest.

use std::collections::HashMap;

use super::keys::child_key;
use super::node::{Node, NodeId, NodeKind};

/// List a node is appended to: the forest roots or some node's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Root,
    Node(NodeId),
}

/// The forest of typed nodes produced by a parse.
///
/// Nodes are stored in one arena and addressed by [`NodeId`]; every live node
/// is also reachable by its key through [`NodeTree::get`].
#[derive(Debug, Clone, Default)]
pub struct NodeTree {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    keys: HashMap<String, NodeId>,
    internal_links: Vec<NodeId>,
}

impl NodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Top-level nodes in document order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    /// Look up a node by key.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.id_of(key).and_then(|id| self.node(id))
    }

    pub fn id_of(&self, key: &str) -> Option<NodeId> {
        self.keys.get(key).copied()
    }

    /// Children of a node; empty for leaves and unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |n| n.children.as_slice())
    }

    /// The list behind a target.
    pub fn list(&self, target: Target) -> &[NodeId] {
        match target {
            Target::Root => &self.roots,
            Target::Node(id) => self.children(id),
        }
    }

    /// Last node of a target list.
    pub fn last(&self, target: Target) -> Option<NodeId> {
        self.list(target).last().copied()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Every `InternalLink` node, in emission order.
    pub fn internal_links(&self) -> &[NodeId] {
        &self.internal_links
    }

    /// Append a node to `target`, keyed by its position in that list.
    pub(crate) fn append(&mut self, target: Target, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let is_internal_link = matches!(kind, NodeKind::InternalLink(_));

        let node = match target {
            Target::Root => Node::new(child_key("", self.roots.len()), None, kind),
            Target::Node(parent) => {
                let (parent_key, index) = self
                    .node(parent)
                    .map(|p| (p.key.clone(), p.children.len()))
                    .unwrap_or_default();
                let key = child_key(&parent_key, index);
                Node::new(key, Some((parent, parent_key.as_str())), kind)
            }
        };

        self.keys.insert(node.key.clone(), id);
        self.nodes.push(node);
        match target {
            Target::Root => self.roots.push(id),
            Target::Node(parent) => {
                if let Some(p) = self.node_mut(parent) {
                    p.children.push(id);
                }
            }
        }
        if is_internal_link {
            self.internal_links.push(id);
        }
        id
    }

    /// Remove the last node of `target`.
    ///
    /// Only childless nodes are pruned; the slot stays allocated but is no
    /// longer reachable from the forest or by key.
    pub(crate) fn pop_last(&mut self, target: Target) -> Option<Node> {
        let id = self.last(target)?;
        if !self.children(id).is_empty() {
            return None;
        }
        match target {
            Target::Root => {
                self.roots.pop();
            }
            Target::Node(parent) => {
                if let Some(p) = self.node_mut(parent) {
                    p.children.pop();
                }
            }
        }
        self.internal_links.retain(|&link| link != id);
        let node = self.node(id)?.clone();
        self.keys.remove(&node.key);
        Some(node)
    }

    /// Walk every live node depth-first, in document order.
    pub fn iter_dfs(&self) -> DfsIter<'_> {
        DfsIter {
            tree: self,
            stack: self.roots.iter().rev().copied().collect(),
        }
    }

    /// Walk a subtree depth-first, starting with `id` itself.
    pub fn descendants(&self, id: NodeId) -> DfsIter<'_> {
        DfsIter {
            tree: self,
            stack: vec![id],
        }
    }
}

/// Depth-first iterator over node ids.
pub struct DfsIter<'a> {
    tree: &'a NodeTree,
    stack: Vec<NodeId>,
}

impl Iterator for DfsIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(current).iter().rev().copied());
        Some(current)
    }
}

#[cfg(feature = "serde")]
mod ser {
    use serde::{Serialize, Serializer};

    use super::{NodeId, NodeKind, NodeTree};

    /// A node with its subtree inlined.
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Nested<'a> {
        key: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        parent_key: Option<&'a str>,
        #[serde(skip_serializing_if = "is_false")]
        is_linked_to: bool,
        #[serde(skip_serializing_if = "is_false")]
        is_first_child_in_list_item: bool,
        is_within_text_container: bool,
        #[serde(flatten)]
        kind: &'a NodeKind,
        #[serde(skip_serializing_if = "Forest::is_empty")]
        children: Forest<'a>,
    }

    fn is_false(value: &bool) -> bool {
        !*value
    }

    struct Forest<'a> {
        tree: &'a NodeTree,
        ids: &'a [NodeId],
    }

    impl Forest<'_> {
        fn is_empty(&self) -> bool {
            self.ids.is_empty()
        }
    }

    impl Serialize for Forest<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_seq(self.ids.iter().filter_map(|&id| {
                let node = self.tree.node(id)?;
                Some(Nested {
                    key: &node.key,
                    parent_key: node.parent_key.as_deref(),
                    is_linked_to: node.is_linked_to,
                    is_first_child_in_list_item: node.is_first_child_in_list_item,
                    is_within_text_container: node.is_within_text_container,
                    kind: &node.kind,
                    children: Forest {
                        tree: self.tree,
                        ids: &node.children,
                    },
                })
            }))
        }
    }

    impl Serialize for NodeTree {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            Forest {
                tree: self,
                ids: self.roots(),
            }
            .serialize(serializer)
        }
    }
}
