//! Output data model: typed nodes in a keyed arena.
//!
//! A parse produces a [`NodeTree`], a forest of [`Node`]s. Each node carries a
//! key derived from its position (`"2_0_1"` is the second child of the first
//! child of the third root) and a [`NodeKind`] payload.
//!
//! ```
//! use html2nodes::{parse_html, NodeKind, ParseOptions};
//!
//! let tree = parse_html("<p>Hello</p>", &ParseOptions::default()).unwrap();
//! let root = tree.node(tree.roots()[0]).unwrap();
//! assert_eq!(root.key, "0");
//! assert!(matches!(&root.kind, NodeKind::Text(t) if t.content == "Hello"));
//! ```

mod keys;
mod node;
mod tree;

pub use keys::{DomIdMap, PendingIds, child_key};
pub use node::{
    Cascade, CustomNode, InternalLinkNode, LinkNode, ListNode, MediaNode, Node, NodeId, NodeKind,
    TableNode, TextContainerNode, TextNode,
};
pub use tree::{DfsIter, NodeTree, Target};
