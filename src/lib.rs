//! # html2nodes
//!
//! Convert HTML documents into a normalized forest of typed render nodes.
//!
//! ## Features
//!
//! - Browser-grade tokenizing via html5ever, including recovery from malformed markup
//! - Whitespace collapsing that follows inline formatting contexts
//! - Inline runs grouped into text containers, one per rendered paragraph
//! - Stable positional keys (`"2_0_1"`) and resolved same-document anchors
//! - Pluggable per-tag handlers and a custom parser hook
//!
//! ## Quick Start
//!
//! ```
//! use html2nodes::{parse_html, NodeKind, ParseOptions};
//!
//! let html = r##"<h1 id="top">Title</h1><p>Some <b>bold</b> text. <a href="#top">Up</a></p>"##;
//! let tree = parse_html(html, &ParseOptions::default()).unwrap();
//!
//! assert_eq!(tree.roots().len(), 2);
//! assert!(matches!(&tree.get("1").unwrap().kind, NodeKind::TextContainer(_)));
//! assert!(tree.get("0").unwrap().is_linked_to);
//! ```
//!
//! ## Extending
//!
//! A [`CustomParser`] sees every element before the built-in handlers and may
//! emit its own node or drop the subtree:
//!
//! ```
//! use html2nodes::{parse_html, CustomContext, CustomNode, CustomParse, NodeKind, ParseOptions};
//!
//! fn notes(ctx: &CustomContext<'_>) -> Option<CustomParse> {
//!     ctx.has_class_name("note")
//!         .then(|| CustomParse::node(NodeKind::Custom(CustomNode::new("Note"))))
//! }
//!
//! let options = ParseOptions::new().with_custom_parser(notes);
//! let tree = parse_html(r#"<div class="note"><p>Careful</p></div>"#, &options).unwrap();
//! assert!(matches!(&tree.get("0").unwrap().kind, NodeKind::Custom(c) if c.name == "Note"));
//! assert_eq!(tree.get("0_0").unwrap().as_text().unwrap().content, "Careful");
//! ```

pub mod dom;
mod error;
pub mod model;
pub mod parser;
pub(crate) mod util;

pub use error::{Error, Result};
pub use model::{
    Cascade, CustomNode, InternalLinkNode, LinkNode, ListNode, MediaNode, Node, NodeId, NodeKind,
    NodeTree, TableNode, TextContainerNode, TextNode,
};
pub use parser::{
    CustomContext, CustomParse, CustomParser, HandlerContext, HandlerRegistry, ParseOptions,
    Resolution, TagHandler, parse_dom, parse_html, parse_html_bytes,
};
