//! Per-tag resolvers that turn elements into nodes.

use std::fmt;
use std::sync::Arc;

use percent_encoding::percent_decode_str;
use url::Url;

use crate::dom::ElementRef;
use crate::model::{
    Cascade, InternalLinkNode, LinkNode, ListNode, MediaNode, Node, NodeKind, TableNode, TextNode,
};

/// What a handler makes of an element.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Emit a new node.
    Node(NodeKind),
    /// Extend the previous sibling `Text` instead of emitting anything.
    AppendToPreviousText(String),
}

/// Read-only state a handler may consult.
#[derive(Debug, Clone, Copy)]
pub struct HandlerContext<'a> {
    pub cascade: &'a Cascade,
    /// Previous node in the current group, if any.
    pub previous_sibling: Option<&'a Node>,
    pub base_url: Option<&'a Url>,
}

impl HandlerContext<'_> {
    /// Resolve a `src`/`href` value against the base URL when one is set.
    pub fn resolve_url(&self, value: &str) -> String {
        match self.base_url {
            Some(base) => base
                .join(value)
                .map(String::from)
                .unwrap_or_else(|_| value.to_string()),
            None => value.to_string(),
        }
    }

    fn previous_is_text(&self) -> bool {
        self.previous_sibling
            .is_some_and(|node| matches!(node.kind, NodeKind::Text(_)))
    }
}

/// Resolver for one tag name.
pub trait TagHandler: Send + Sync {
    /// Whether the element's children are walked after resolving it.
    fn can_parse_children(&self) -> bool {
        true
    }

    /// Produce a node, or `None` to let the element pass through.
    fn resolve(&self, element: ElementRef<'_>, ctx: &HandlerContext<'_>) -> Option<Resolution>;
}

impl<F> TagHandler for F
where
    F: Fn(ElementRef<'_>, &HandlerContext<'_>) -> Option<Resolution> + Send + Sync,
{
    fn resolve(&self, element: ElementRef<'_>, ctx: &HandlerContext<'_>) -> Option<Resolution> {
        self(element, ctx)
    }
}

/// `<a>`: internal link for `#fragment`, external link otherwise.
pub struct LinkHandler;

impl TagHandler for LinkHandler {
    fn resolve(&self, element: ElementRef<'_>, ctx: &HandlerContext<'_>) -> Option<Resolution> {
        let href = element.attr("href")?;
        let kind = match href.strip_prefix('#') {
            Some(fragment) => {
                let dom_id = percent_decode_str(fragment).decode_utf8_lossy();
                NodeKind::InternalLink(InternalLinkNode::new(dom_id))
            }
            None => NodeKind::Link(LinkNode {
                source: ctx.resolve_url(href),
                title: element.attr("title").map(str::to_string),
            }),
        };
        Some(Resolution::Node(kind))
    }
}

/// Parse a pixel dimension such as `120`, `120.5` or `120px`.
pub fn parse_dimension(value: &str) -> Option<f32> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value).trim_end();
    number
        .parse::<f32>()
        .ok()
        .filter(|n| n.is_finite() && *n >= 0.0)
}

fn dimension(element: &ElementRef<'_>, name: &str) -> Option<f32> {
    element
        .attr(name)
        .and_then(parse_dimension)
        .or_else(|| element.attr(&format!("data-{name}")).and_then(parse_dimension))
}

fn media(element: &ElementRef<'_>, ctx: &HandlerContext<'_>) -> Option<MediaNode> {
    let src = element.attr("src")?.trim();
    if src.is_empty() {
        return None;
    }
    Some(MediaNode {
        source: ctx.resolve_url(src),
        width: dimension(element, "width"),
        height: dimension(element, "height"),
        alt: element.attr("alt").map(str::to_string),
    })
}

pub struct ImageHandler;

impl TagHandler for ImageHandler {
    fn can_parse_children(&self) -> bool {
        false
    }

    fn resolve(&self, element: ElementRef<'_>, ctx: &HandlerContext<'_>) -> Option<Resolution> {
        media(&element, ctx).map(|m| Resolution::Node(NodeKind::Image(m)))
    }
}

pub struct IFrameHandler;

impl TagHandler for IFrameHandler {
    fn can_parse_children(&self) -> bool {
        false
    }

    fn resolve(&self, element: ElementRef<'_>, ctx: &HandlerContext<'_>) -> Option<Resolution> {
        media(&element, ctx).map(|m| Resolution::Node(NodeKind::IFrame(m)))
    }
}

/// `<ol>` and `<ul>`.
pub struct ListHandler;

impl TagHandler for ListHandler {
    fn resolve(&self, element: ElementRef<'_>, _ctx: &HandlerContext<'_>) -> Option<Resolution> {
        let is_ordered = element.name() == "ol";
        let start = if is_ordered {
            element.attr("start").and_then(|s| s.trim().parse().ok())
        } else {
            None
        };
        Some(Resolution::Node(NodeKind::List(ListNode { is_ordered, start })))
    }
}

pub struct ListItemHandler;

impl TagHandler for ListItemHandler {
    fn resolve(&self, _element: ElementRef<'_>, _ctx: &HandlerContext<'_>) -> Option<Resolution> {
        Some(Resolution::Node(NodeKind::ListItem))
    }
}

/// `<br>`: a newline joined onto the preceding text when there is one.
pub struct LineBreakHandler;

impl TagHandler for LineBreakHandler {
    fn can_parse_children(&self) -> bool {
        false
    }

    fn resolve(&self, _element: ElementRef<'_>, ctx: &HandlerContext<'_>) -> Option<Resolution> {
        if ctx.previous_is_text() {
            Some(Resolution::AppendToPreviousText("\n".to_string()))
        } else {
            Some(Resolution::Node(NodeKind::Text(TextNode::new("\n", ctx.cascade))))
        }
    }
}

/// `<table>`: kept whole as markup.
pub struct TableHandler;

impl TagHandler for TableHandler {
    fn can_parse_children(&self) -> bool {
        false
    }

    fn resolve(&self, element: ElementRef<'_>, _ctx: &HandlerContext<'_>) -> Option<Resolution> {
        let source = element.outer_html().trim().to_string();
        Some(Resolution::Node(NodeKind::Table(TableNode { source })))
    }
}

/// Ordered tag-name to handler table; the first entry for a tag wins.
#[derive(Clone)]
pub struct HandlerRegistry {
    entries: Vec<(String, Arc<dyn TagHandler>)>,
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl HandlerRegistry {
    /// A registry with no handlers at all.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Handlers for `a`, `img`, `iframe`, `ol`, `ul`, `li`, `br` and `table`.
    pub fn with_builtins() -> Self {
        fn entry(tag: &str, handler: Arc<dyn TagHandler>) -> (String, Arc<dyn TagHandler>) {
            (tag.to_string(), handler)
        }

        let list: Arc<dyn TagHandler> = Arc::new(ListHandler);
        Self {
            entries: vec![
                entry("a", Arc::new(LinkHandler)),
                entry("img", Arc::new(ImageHandler)),
                entry("iframe", Arc::new(IFrameHandler)),
                entry("ol", Arc::clone(&list)),
                entry("ul", list),
                entry("li", Arc::new(ListItemHandler)),
                entry("br", Arc::new(LineBreakHandler)),
                entry("table", Arc::new(TableHandler)),
            ],
        }
    }

    /// Register a handler ahead of every existing one for the same tag.
    pub fn register(&mut self, tag: impl Into<String>, handler: Arc<dyn TagHandler>) {
        self.entries.insert(0, (tag.into().to_ascii_lowercase(), handler));
    }

    pub fn lookup(&self, tag: &str) -> Option<&dyn TagHandler> {
        self.entries
            .iter()
            .find(|(name, _)| name == tag)
            .map(|(_, handler)| handler.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(name, _)| name))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Dom, parse_document};

    fn resolve(html: &str, tag: &str, base: Option<&Url>) -> Option<Resolution> {
        let (dom, _) = parse_document(html);
        resolve_in(&dom, tag, base, None)
    }

    fn resolve_in(
        dom: &Dom,
        tag: &str,
        base: Option<&Url>,
        previous: Option<&Node>,
    ) -> Option<Resolution> {
        let element = ElementRef::new(dom, dom.find_by_tag(tag)?)?;
        let cascade = Cascade::default();
        let ctx = HandlerContext {
            cascade: &cascade,
            previous_sibling: previous,
            base_url: base,
        };
        HandlerRegistry::with_builtins()
            .lookup(tag)?
            .resolve(element, &ctx)
    }

    #[test]
    fn test_link_kinds() {
        let r = resolve(r##"<a href="#caf%C3%A9">x</a>"##, "a", None);
        assert_eq!(
            r,
            Some(Resolution::Node(NodeKind::InternalLink(InternalLinkNode::new("café"))))
        );

        let r = resolve(r#"<a href="/docs?a=1&amp;b=2" title="Docs">x</a>"#, "a", None);
        assert_eq!(
            r,
            Some(Resolution::Node(NodeKind::Link(LinkNode {
                source: "/docs?a=1&b=2".to_string(),
                title: Some("Docs".to_string()),
            })))
        );

        assert_eq!(resolve("<a name=\"top\">x</a>", "a", None), None);
    }

    #[test]
    fn test_link_base_url() {
        let base = Url::parse("https://example.com/blog/post.html").unwrap();
        let r = resolve(r#"<a href="../about">x</a>"#, "a", Some(&base));
        assert!(matches!(
            r,
            Some(Resolution::Node(NodeKind::Link(LinkNode { ref source, .. })))
                if source == "https://example.com/about"
        ));
    }

    #[test]
    fn test_image_dimensions() {
        let r = resolve(
            r#"<img src="a.png" width="120px" data-height="40" alt="A">"#,
            "img",
            None,
        );
        assert_eq!(
            r,
            Some(Resolution::Node(NodeKind::Image(MediaNode {
                source: "a.png".to_string(),
                width: Some(120.0),
                height: Some(40.0),
                alt: Some("A".to_string()),
            })))
        );

        let r = resolve(r#"<img src="a.png" width="wide">"#, "img", None);
        assert!(matches!(
            r,
            Some(Resolution::Node(NodeKind::Image(MediaNode { width: None, height: None, .. })))
        ));

        assert_eq!(resolve("<img alt=\"no source\">", "img", None), None);
    }

    #[test]
    fn test_iframe() {
        let r = resolve(r#"<iframe src="https://v.example/1" height="315"></iframe>"#, "iframe", None);
        assert!(matches!(
            r,
            Some(Resolution::Node(NodeKind::IFrame(MediaNode { height: Some(h), .. }))) if h == 315.0
        ));
    }

    #[test]
    fn test_lists() {
        let r = resolve(r#"<ol start="3"><li>x</li></ol>"#, "ol", None);
        assert_eq!(
            r,
            Some(Resolution::Node(NodeKind::List(ListNode {
                is_ordered: true,
                start: Some(3),
            })))
        );
        let r = resolve("<ul><li>x</li></ul>", "li", None);
        assert_eq!(r, Some(Resolution::Node(NodeKind::ListItem)));
    }

    #[test]
    fn test_line_break() {
        let (dom, _) = parse_document("a<br>b");
        let r = resolve_in(&dom, "br", None, None);
        assert!(matches!(r, Some(Resolution::Node(NodeKind::Text(ref t))) if t.content == "\n"));

        let previous = Node::new(
            "0".to_string(),
            None,
            NodeKind::Text(TextNode::new("a", &Cascade::default())),
        );
        let r = resolve_in(&dom, "br", None, Some(&previous));
        assert_eq!(r, Some(Resolution::AppendToPreviousText("\n".to_string())));
    }

    #[test]
    fn test_table_source() {
        let r = resolve(
            "<table>\n  <tbody><tr><td>1</td></tr></tbody>\n</table>",
            "table",
            None,
        );
        assert_eq!(
            r,
            Some(Resolution::Node(NodeKind::Table(TableNode {
                source: "<table>\n  <tbody><tr><td>1</td></tr></tbody>\n</table>".to_string(),
            })))
        );
    }

    struct Suppress;

    impl TagHandler for Suppress {
        fn resolve(&self, _: ElementRef<'_>, _: &HandlerContext<'_>) -> Option<Resolution> {
            None
        }
    }

    #[test]
    fn test_override_wins() {
        let mut registry = HandlerRegistry::with_builtins();
        registry.register("IMG", Arc::new(Suppress));
        let (dom, _) = parse_document(r#"<img src="a.png">"#);
        let element = ElementRef::new(&dom, dom.find_by_tag("img").unwrap()).unwrap();
        let cascade = Cascade::default();
        let ctx = HandlerContext {
            cascade: &cascade,
            previous_sibling: None,
            base_url: None,
        };
        assert_eq!(registry.lookup("img").unwrap().resolve(element, &ctx), None);
        assert!(registry.lookup("img").unwrap().can_parse_children());
    }

    #[test]
    fn test_parse_dimension() {
        assert_eq!(parse_dimension(" 64 "), Some(64.0));
        assert_eq!(parse_dimension("12.5px"), Some(12.5));
        assert_eq!(parse_dimension("50%"), None);
        assert_eq!(parse_dimension("-3"), None);
        assert_eq!(parse_dimension(""), None);
    }
}
