//! HTML to node-tree transformation.
//!
//! The entry points tokenize a document with html5ever, pick the subtree to
//! convert and hand it to the walker. Once the forest is complete, internal
//! links are resolved against the DOM ids seen along the way.

mod block;
mod container;
mod custom;
mod handlers;
mod links;
mod options;
mod tags;
mod text;
mod walker;

pub use block::{AnonymousBlock, Block, Sibling, Transition, classify, next_meaningful};
pub use container::{is_blank, is_groupable, should_close, should_open};
pub use custom::{CustomContext, CustomParse, CustomParser};
pub use handlers::{
    HandlerContext, HandlerRegistry, IFrameHandler, ImageHandler, LineBreakHandler, LinkHandler,
    ListHandler, ListItemHandler, Resolution, TableHandler, TagHandler, parse_dimension,
};
pub use links::resolve_internal_links;
pub use options::{DEFAULT_EXCLUDED_TAGS, ParseOptions};
pub use tags::{header_level, is_block_tag, is_inline_tag, is_text_container_path};
pub use text::{TextContext, collapse_whitespace, normalize};

use tracing::debug;

use crate::dom::{self, Dom, DomNodeId, ElementRef, Selector};
use crate::error::{Error, Result};
use crate::model::NodeTree;
use crate::util;

use walker::Walker;

/// Parse an HTML string into a node tree.
///
/// With [`ParseOptions::strict`] set, any tokenizer error aborts the parse
/// with [`Error::Markup`]. Otherwise malformed markup is recovered the way a
/// browser would.
pub fn parse_html(html: &str, options: &ParseOptions) -> Result<NodeTree> {
    let (dom, errors) = dom::parse_document(html);
    if !errors.is_empty() {
        if options.strict {
            return Err(Error::Markup(errors.join("; ")));
        }
        debug!(count = errors.len(), "recovered from parse errors");
    }
    parse_dom(&dom, options)
}

/// Parse raw bytes, detecting the encoding from a BOM or `<meta charset>`.
pub fn parse_html_bytes(bytes: &[u8], options: &ParseOptions) -> Result<NodeTree> {
    let html = util::decode_text(bytes, util::sniff_meta_charset(bytes));
    parse_html(&html, options)
}

/// Convert an already-built DOM.
pub fn parse_dom(dom: &Dom, options: &ParseOptions) -> Result<NodeTree> {
    let body = dom.find_by_tag("body").unwrap_or(dom.document());
    let top_level: Vec<DomNodeId> = dom.children(body).collect();

    let start = match &options.selector {
        Some(source) => {
            let selector = Selector::parse(source)?;
            match select_first(dom, &top_level, &selector) {
                Some(found) => vec![found],
                None => {
                    debug!(selector = selector.as_str(), "selector matched nothing");
                    return Ok(NodeTree::new());
                }
            }
        }
        None => top_level,
    };

    let (mut tree, dom_ids) = Walker::new(dom, options).run(&start);
    let resolved = resolve_internal_links(&mut tree, &dom_ids);
    debug!(
        nodes = tree.len(),
        internal_links = tree.internal_links().len(),
        resolved,
        "parsed document"
    );
    Ok(tree)
}

/// First element in document order, among `roots` and their descendants,
/// matching `selector`.
fn select_first(dom: &Dom, roots: &[DomNodeId], selector: &Selector) -> Option<DomNodeId> {
    let mut stack: Vec<DomNodeId> = roots.iter().rev().copied().collect();
    while let Some(id) = stack.pop() {
        let Some(element) = ElementRef::new(dom, id) else {
            continue;
        };
        if selector.matches(&element) {
            return Some(id);
        }
        let children: Vec<DomNodeId> = dom.children(id).collect();
        stack.extend(children.into_iter().rev());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeKind;

    #[test]
    fn test_select_first_document_order() {
        let (dom, _) = dom::parse_document(
            r#"<div><section><p class="x">a</p></section></div><p class="x">b</p>"#,
        );
        let body = dom.find_by_tag("body").unwrap();
        let roots: Vec<_> = dom.children(body).collect();
        let selector = Selector::parse(".x").unwrap();
        let found = select_first(&dom, &roots, &selector).unwrap();
        assert_eq!(ElementRef::new(&dom, found).unwrap().text(), "a");
    }

    #[test]
    fn test_selector_limits_scope() {
        let options = ParseOptions::new().with_selector("#main");
        let tree = parse_html(
            r#"<p>skip</p><div id="main"><p>keep</p></div>"#,
            &options,
        )
        .unwrap();
        assert_eq!(tree.len(), 1);
        assert!(matches!(&tree.get("0").unwrap().kind, NodeKind::Text(t) if t.content == "keep"));
    }

    #[test]
    fn test_invalid_selector() {
        let options = ParseOptions::new().with_selector("p[");
        let err = parse_html("<p>x</p>", &options).unwrap_err();
        assert!(matches!(err, Error::InvalidSelector { .. }));
    }

    #[test]
    fn test_bytes_with_meta_charset() {
        let mut bytes = b"<meta charset=\"windows-1252\"><p>caf".to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(b"</p>");
        let tree = parse_html_bytes(&bytes, &ParseOptions::default()).unwrap();
        assert!(matches!(&tree.get("0").unwrap().kind, NodeKind::Text(t) if t.content == "café"));
    }
}
