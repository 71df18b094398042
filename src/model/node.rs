//! Output node types.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Index of a node within a [`NodeTree`](super::NodeTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct NodeId(pub u32);

/// A node in the output forest.
///
/// Structural fields (`key`, parent and children links) are shared by every
/// variant; the variant payload lives in [`NodeKind`].
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Position-derived key, unique within the forest.
    pub key: String,
    /// Key of the node whose children list holds this node.
    pub parent_key: Option<String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Some internal link resolved to this node.
    pub is_linked_to: bool,
    /// First node placed in a list item.
    pub is_first_child_in_list_item: bool,
    /// Emitted into a text container (directly or inside a link within one).
    pub is_within_text_container: bool,
    pub kind: NodeKind,
}

impl Node {
    pub(crate) fn new(key: String, parent: Option<(NodeId, &str)>, kind: NodeKind) -> Self {
        Self {
            key,
            parent_key: parent.map(|(_, key)| key.to_string()),
            parent: parent.map(|(id, _)| id),
            children: Vec::new(),
            is_linked_to: false,
            is_first_child_in_list_item: false,
            is_within_text_container: false,
            kind,
        }
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match &self.kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextNode> {
        match &mut self.kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_internal_link(&self) -> Option<&InternalLinkNode> {
        match &self.kind {
            NodeKind::InternalLink(link) => Some(link),
            _ => None,
        }
    }
}

/// Variant payload of a [`Node`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(tag = "type"))]
pub enum NodeKind {
    Text(TextNode),
    TextContainer(TextContainerNode),
    Image(MediaNode),
    #[cfg_attr(feature = "serde", serde(rename = "IFrame"))]
    IFrame(MediaNode),
    List(ListNode),
    ListItem,
    Link(LinkNode),
    InternalLink(InternalLinkNode),
    Table(TableNode),
    Custom(CustomNode),
}

impl NodeKind {
    /// Whether walking an element that produced this node descends into the
    /// node's own children list.
    pub fn has_child_slot(&self) -> bool {
        matches!(
            self,
            Self::TextContainer(_)
                | Self::List(_)
                | Self::ListItem
                | Self::Link(_)
                | Self::InternalLink(_)
                | Self::Custom(_)
        )
    }

    pub fn is_link(&self) -> bool {
        matches!(self, Self::Link(_) | Self::InternalLink(_))
    }

    /// Short name used in logs.
    pub fn name(&self) -> &str {
        match self {
            Self::Text(_) => "Text",
            Self::TextContainer(_) => "TextContainer",
            Self::Image(_) => "Image",
            Self::IFrame(_) => "IFrame",
            Self::List(_) => "List",
            Self::ListItem => "ListItem",
            Self::Link(_) => "Link",
            Self::InternalLink(_) => "InternalLink",
            Self::Table(_) => "Table",
            Self::Custom(custom) => &custom.name,
        }
    }
}

/// Run of normalized text with its inherited formatting.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TextNode {
    pub content: String,
    /// Header level 1-6 when inside `h1`..`h6`.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub header: Option<u8>,
    pub is_bold: bool,
    pub is_italic: bool,
    pub is_underlined: bool,
    pub has_strikethrough: bool,
    pub is_within_link: bool,
    pub is_within_list: bool,
    /// No inline decoration applies.
    pub can_be_text_container_base: bool,
    pub is_after_header: bool,
}

impl TextNode {
    /// Text carrying the given cascade's formatting.
    pub fn new(content: impl Into<String>, cascade: &Cascade) -> Self {
        Self {
            content: content.into(),
            header: cascade.header,
            is_bold: cascade.bold,
            is_italic: cascade.italic,
            is_underlined: cascade.underline,
            has_strikethrough: cascade.strikethrough,
            is_within_link: cascade.within_link,
            is_within_list: cascade.within_list,
            can_be_text_container_base: !cascade.is_decorated(),
            is_after_header: false,
        }
    }

    /// Exact equality of every formatting flag.
    pub fn same_formatting(&self, cascade: &Cascade) -> bool {
        self.header == cascade.header
            && self.is_bold == cascade.bold
            && self.is_italic == cascade.italic
            && self.is_underlined == cascade.underline
            && self.has_strikethrough == cascade.strikethrough
            && self.is_within_link == cascade.within_link
            && self.is_within_list == cascade.within_list
    }

    pub fn is_header(&self) -> bool {
        self.header.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TextContainerNode {
    pub is_after_header: bool,
}

/// Payload shared by `Image` and `IFrame`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MediaNode {
    pub source: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub width: Option<f32>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub height: Option<f32>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ListNode {
    pub is_ordered: bool,
    /// `ol@start`
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub start: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct LinkNode {
    pub source: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub title: Option<String>,
}

/// Same-document anchor, resolved after the walk.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct InternalLinkNode {
    /// Fragment without the leading `#`, percent-decoded.
    pub dom_id: String,
    /// Key of the resolved target, empty while unresolved.
    pub target_key: String,
    pub has_resolved_target: bool,
}

impl InternalLinkNode {
    pub fn new(dom_id: impl Into<String>) -> Self {
        Self {
            dom_id: dom_id.into(),
            ..Default::default()
        }
    }
}

/// Table kept as serialized markup.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TableNode {
    pub source: String,
}

/// Node produced by a user extension.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CustomNode {
    pub name: String,
    pub data: BTreeMap<String, String>,
}

impl CustomNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: BTreeMap::new(),
        }
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

/// Formatting inherited from ancestors during the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cascade {
    pub header: Option<u8>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub within_link: bool,
    pub within_list: bool,
}

impl Cascade {
    /// Any inline decoration. Header level is not a decoration.
    pub fn is_decorated(&self) -> bool {
        self.bold || self.italic || self.underline || self.strikethrough
    }
}
