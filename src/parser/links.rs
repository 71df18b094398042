//! Resolution of same-document anchors once the forest is complete.

use tracing::{debug, trace};

use crate::model::{DomIdMap, NodeId, NodeKind, NodeTree};

/// Resolve every internal link in `tree`; returns how many found a target.
///
/// A target inside a text container is promoted to the nearest ancestor that
/// is not, so scrolling lands on a block boundary. Unresolved links lose the
/// link formatting on their text.
pub fn resolve_internal_links(tree: &mut NodeTree, dom_ids: &DomIdMap) -> usize {
    let links = tree.internal_links().to_vec();
    let mut resolved = 0;

    for link in links {
        let Some(dom_id) = tree
            .node(link)
            .and_then(|n| n.as_internal_link())
            .map(|l| l.dom_id.clone())
        else {
            continue;
        };

        match dom_ids.key(&dom_id).and_then(|key| tree.id_of(key)) {
            Some(target) => {
                let target = block_ancestor(tree, target);
                let Some(target_node) = tree.node_mut(target) else {
                    continue;
                };
                target_node.is_linked_to = true;
                let target_key = target_node.key.clone();
                trace!(%dom_id, %target_key, "resolved internal link");

                if let Some(NodeKind::InternalLink(data)) = tree.node_mut(link).map(|n| &mut n.kind) {
                    data.target_key = target_key;
                    data.has_resolved_target = true;
                }
                resolved += 1;
            }
            None => {
                debug!(%dom_id, "internal link target not found");
                clear_link_formatting(tree, link);
            }
        }
    }
    resolved
}

/// Walk up while the node sits inside a text container.
fn block_ancestor(tree: &NodeTree, mut id: NodeId) -> NodeId {
    while let Some(node) = tree.node(id) {
        match node.parent {
            Some(parent) if node.is_within_text_container => id = parent,
            _ => break,
        }
    }
    id
}

/// Clear `is_within_link` on text below `link`, leaving nested links alone.
fn clear_link_formatting(tree: &mut NodeTree, link: NodeId) {
    let mut stack: Vec<NodeId> = tree.children(link).to_vec();
    while let Some(id) = stack.pop() {
        let Some(node) = tree.node_mut(id) else {
            continue;
        };
        match &mut node.kind {
            NodeKind::Text(text) => text.is_within_link = false,
            NodeKind::Link(_) | NodeKind::InternalLink(_) => {}
            _ => stack.extend(node.children.iter().copied()),
        }
    }
}
