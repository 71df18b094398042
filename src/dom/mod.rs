//! DOM construction through html5ever.
//!
//! The tokenizer and tree builder are external; this module adapts their
//! output into an arena the engine can walk cheaply.

mod arena;
mod element_ref;
mod serialize;
mod tree_sink;

pub use arena::{Attribute, Children, Dom, DomNode, DomNodeData, DomNodeId};
pub use element_ref::{ElementRef, HtmlSelectors, Selector};
pub use serialize::{SerializableNode, inner_html, outer_html};
pub use tree_sink::DomSink;

use html5ever::driver::ParseOpts;
use html5ever::parse_document as html5ever_parse;
use html5ever::tendril::TendrilSink;

/// Parse a full HTML document.
///
/// Returns the DOM together with every parse error the tree builder reported.
/// Parsing itself never fails; errors are informational unless the caller
/// decides otherwise.
pub fn parse_document(html: &str) -> (Dom, Vec<String>) {
    html5ever_parse(DomSink::new(), ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes())
        .into_parts()
}
