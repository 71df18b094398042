//! Serialize DOM subtrees back to markup with html5ever's serializer.

use std::io;

use html5ever::serialize::{Serialize, SerializeOpts, Serializer, TraversalScope, serialize};

use super::arena::{Dom, DomNodeData, DomNodeId};

/// A subtree of the DOM that html5ever can serialize.
pub struct SerializableNode<'a> {
    dom: &'a Dom,
    id: DomNodeId,
}

impl<'a> SerializableNode<'a> {
    pub fn new(dom: &'a Dom, id: DomNodeId) -> Self {
        Self { dom, id }
    }

    fn write_node<S: Serializer>(&self, serializer: &mut S, id: DomNodeId) -> io::Result<()> {
        let Some(node) = self.dom.get(id) else {
            return Ok(());
        };
        match &node.data {
            DomNodeData::Element { name, attrs, .. } => {
                serializer.start_elem(
                    name.clone(),
                    attrs.iter().map(|a| (&a.name, a.value.as_str())),
                )?;
                self.write_children(serializer, id)?;
                serializer.end_elem(name.clone())
            }
            DomNodeData::Text(text) => serializer.write_text(text),
            DomNodeData::Comment(text) => serializer.write_comment(text),
            DomNodeData::Doctype { name } => serializer.write_doctype(name),
            DomNodeData::Document => self.write_children(serializer, id),
        }
    }

    fn write_children<S: Serializer>(&self, serializer: &mut S, id: DomNodeId) -> io::Result<()> {
        for child in self.dom.children(id) {
            self.write_node(serializer, child)?;
        }
        Ok(())
    }
}

impl Serialize for SerializableNode<'_> {
    fn serialize<S: Serializer>(
        &self,
        serializer: &mut S,
        traversal_scope: TraversalScope,
    ) -> io::Result<()> {
        match traversal_scope {
            TraversalScope::IncludeNode => self.write_node(serializer, self.id),
            TraversalScope::ChildrenOnly(_) => self.write_children(serializer, self.id),
        }
    }
}

fn to_string(dom: &Dom, id: DomNodeId, traversal_scope: TraversalScope) -> String {
    let mut buf = Vec::new();
    let opts = SerializeOpts {
        traversal_scope,
        ..Default::default()
    };
    if serialize(&mut buf, &SerializableNode::new(dom, id), opts).is_err() {
        return String::new();
    }
    String::from_utf8(buf).unwrap_or_default()
}

/// Markup of the node including its own tags.
pub fn outer_html(dom: &Dom, id: DomNodeId) -> String {
    to_string(dom, id, TraversalScope::IncludeNode)
}

/// Markup of the node's children only.
pub fn inner_html(dom: &Dom, id: DomNodeId) -> String {
    to_string(dom, id, TraversalScope::ChildrenOnly(None))
}
