//! Configuration surface: custom parsers, handler overrides, exclusions,
//! selectors, strict mode and base URLs.

use html2nodes::dom::ElementRef;
use html2nodes::{
    CustomContext, CustomNode, CustomParse, CustomParser, Error, HandlerContext, NodeKind,
    ParseOptions, Resolution, TagHandler, TextNode, parse_html,
};

struct Magic;

impl CustomParser for Magic {
    fn parse(&self, ctx: &CustomContext<'_>) -> Option<CustomParse> {
        ctx.has_class_name("magic").then(|| {
            CustomParse::node(NodeKind::Custom(CustomNode::new("Magic"))).with_children(false)
        })
    }
}

#[test]
fn test_custom_node_suppresses_descendants() {
    let options = ParseOptions::new().with_custom_parser(Magic);
    let tree = parse_html(
        r#"<p>before</p><div class="magic"><p>hidden</p><img src="x.png"></div><p>after</p>"#,
        &options,
    )
    .unwrap();

    assert_eq!(tree.len(), 3);
    let magic = tree.get("1").unwrap();
    assert!(matches!(&magic.kind, NodeKind::Custom(c) if c.name == "Magic"));
    assert!(magic.children.is_empty());
    assert_eq!(tree.get("2").unwrap().as_text().unwrap().content, "after");
}

struct Swallow;

impl CustomParser for Swallow {
    fn parse(&self, ctx: &CustomContext<'_>) -> Option<CustomParse> {
        (ctx.path == "aside").then(CustomParse::swallow)
    }
}

#[test]
fn test_custom_swallow() {
    let options = ParseOptions::new().with_custom_parser(Swallow);
    let tree = parse_html("<aside><p>ad</p></aside><p>content</p>", &options).unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.get("0").unwrap().as_text().unwrap().content, "content");
}

struct Quote;

impl CustomParser for Quote {
    fn parse(&self, ctx: &CustomContext<'_>) -> Option<CustomParse> {
        if ctx.path != "blockquote" {
            return None;
        }
        let cite = ctx.element.attr("cite").unwrap_or_default();
        Some(CustomParse::node(NodeKind::Custom(
            CustomNode::new("Quote").with_data("cite", cite),
        )))
    }
}

#[test]
fn test_custom_node_with_children() {
    let options = ParseOptions::new().with_custom_parser(Quote);
    let tree = parse_html(
        r#"<blockquote cite="https://example.com"><p>Said <em>this</em></p></blockquote>"#,
        &options,
    )
    .unwrap();

    let quote = tree.get("0").unwrap();
    assert!(matches!(
        &quote.kind,
        NodeKind::Custom(c) if c.data.get("cite").map(String::as_str) == Some("https://example.com")
    ));
    assert!(matches!(tree.get("0_0").unwrap().kind, NodeKind::TextContainer(_)));
    assert_eq!(tree.get("0_0_1").unwrap().as_text().unwrap().content, "this");
}

struct KeyPrefix;

impl CustomParser for KeyPrefix {
    fn parse(&self, ctx: &CustomContext<'_>) -> Option<CustomParse> {
        if ctx.path != "mark" {
            return None;
        }
        let node = CustomNode::new("Mark").with_data("prefix", ctx.key_prefix);
        Some(CustomParse::node(NodeKind::Custom(node)))
    }
}

#[test]
fn test_custom_context_key_prefix() {
    let options = ParseOptions::new().with_custom_parser(KeyPrefix);
    let tree = parse_html("<ul><li>a <mark>b</mark></li></ul>", &options).unwrap();
    let mark = tree
        .iter_dfs()
        .filter_map(|id| tree.node(id))
        .find(|n| n.kind.name() == "Mark")
        .unwrap();
    assert_eq!(mark.key, "0_0_0_1");
    assert!(matches!(&mark.kind, NodeKind::Custom(c) if c.data["prefix"] == "0_0_0"));
}

struct Highlight;

impl CustomParser for Highlight {
    fn parse(&self, ctx: &CustomContext<'_>) -> Option<CustomParse> {
        (ctx.path == "mark").then(|| CustomParse::node(NodeKind::Custom(CustomNode::new("Mark"))))
    }
}

#[test]
fn test_inline_custom_node_inside_text_container() {
    let options = ParseOptions::new().with_custom_parser(Highlight);
    let tree = parse_html(
        r##"<p>a <mark>b <i id="t">c</i></mark> d</p><a href="#t">go</a>"##,
        &options,
    )
    .unwrap();

    let container = tree.get("0").unwrap();
    assert!(matches!(container.kind, NodeKind::TextContainer(_)));
    assert_eq!(container.children.len(), 3);

    let mark = tree.get("0_1").unwrap();
    assert_eq!(mark.kind.name(), "Mark");
    assert!(mark.is_within_text_container);
    for &child in &mark.children {
        let child = tree.node(child).unwrap();
        assert!(child.as_text().is_some(), "unexpected {}", child.kind.name());
        assert!(child.is_within_text_container);
    }
    assert_eq!(tree.get("0_1_0").unwrap().as_text().unwrap().content, "b ");
    assert_eq!(tree.get("0_1_1").unwrap().as_text().unwrap().content, "c");
    assert_eq!(tree.get("0_2").unwrap().as_text().unwrap().content, " d");

    let link = tree.get("1").unwrap().as_internal_link().unwrap();
    assert_eq!(link.target_key, "0");
    assert!(container.is_linked_to);
}

struct Shout;

impl TagHandler for Shout {
    fn can_parse_children(&self) -> bool {
        false
    }

    fn resolve(&self, element: ElementRef<'_>, ctx: &HandlerContext<'_>) -> Option<Resolution> {
        let text = element.text().to_uppercase();
        Some(Resolution::Node(NodeKind::Text(TextNode::new(text, ctx.cascade))))
    }
}

#[test]
fn test_handler_override() {
    let options = ParseOptions::new().with_handler("code", Shout);
    let tree = parse_html("<p><b><code>ls -la</code></b></p>", &options).unwrap();
    assert_eq!(tree.len(), 1);
    let text = tree.get("0").unwrap().as_text().unwrap();
    assert_eq!(text.content, "LS -LA");
    assert!(text.is_bold);
}

struct NoImages;

impl TagHandler for NoImages {
    fn resolve(&self, _element: ElementRef<'_>, _ctx: &HandlerContext<'_>) -> Option<Resolution> {
        None
    }
}

#[test]
fn test_handler_override_replaces_builtin() {
    let options = ParseOptions::new().with_handler("img", NoImages);
    let tree = parse_html(r#"<p><img src="a.png"></p>"#, &options).unwrap();
    assert!(tree.is_empty());
}

fn magic_button(ctx: &CustomContext<'_>) -> Option<CustomParse> {
    ctx.has_class_name("magic")
        .then(|| CustomParse::node(NodeKind::Custom(CustomNode::new("Button"))))
}

#[test]
fn test_custom_parser_runs_before_handlers() {
    let options = ParseOptions::new().with_custom_parser(magic_button);
    let tree = parse_html(r#"<a class="magic" href="/go">Go</a>"#, &options).unwrap();
    assert!(matches!(&tree.get("0").unwrap().kind, NodeKind::Custom(c) if c.name == "Button"));
    assert_eq!(tree.get("0_0").unwrap().as_text().unwrap().content, "Go");
    assert!(!tree.get("0_0").unwrap().as_text().unwrap().is_within_link);
}

#[test]
fn test_excluded_tags() {
    let html = "<nav><p>menu</p></nav><p>body</p>";
    let tree = parse_html(html, &ParseOptions::new().with_excluded_tag("nav")).unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.get("0").unwrap().as_text().unwrap().content, "body");

    let tree = parse_html(
        "<p>y</p><script>x</script>",
        &ParseOptions::new().with_excluded_tags(Vec::<String>::new()),
    )
    .unwrap();
    assert_eq!(tree.len(), 2);
}

#[test]
fn test_selector_first_match_only() {
    let options = ParseOptions::new().with_selector(".article");
    let tree = parse_html(
        r#"<header><p>site</p></header>
           <main><div class="article"><p>one</p></div></main>
           <div class="article"><p>two</p></div>"#,
        &options,
    )
    .unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.get("0").unwrap().as_text().unwrap().content, "one");
}

#[test]
fn test_selector_without_match() {
    let options = ParseOptions::new().with_selector(".missing");
    let tree = parse_html("<p>text</p>", &options).unwrap();
    assert!(tree.is_empty());
}

#[test]
fn test_selector_compound() {
    let options = ParseOptions::new().with_selector("section > p.lead");
    let tree = parse_html(
        r#"<p class="lead">no</p><section><p>x</p><p class="lead">yes</p></section>"#,
        &options,
    )
    .unwrap();
    assert_eq!(tree.get("0").unwrap().as_text().unwrap().content, "yes");
}

#[test]
fn test_strict_mode() {
    let options = ParseOptions::new().with_strict(true);
    let err = parse_html("<!DOCTYPE html><p>a</b>", &options).unwrap_err();
    assert!(matches!(err, Error::Markup(_)));

    let tree = parse_html(
        "<!DOCTYPE html><html><head><title>t</title></head><body><p>fine</p></body></html>",
        &options,
    )
    .unwrap();
    assert_eq!(tree.len(), 1);

    assert!(parse_html("<!DOCTYPE html><p>a</b>", &ParseOptions::default()).is_ok());
}

#[test]
fn test_base_url() {
    let options = ParseOptions::new()
        .with_base_url("https://example.com/docs/page.html")
        .unwrap();
    let tree = parse_html(
        r##"<p><a href="other.html">o</a> <img src="/img/a.png"> <a href="#local">l</a></p>"##,
        &options,
    )
    .unwrap();

    let sources: Vec<String> = tree
        .iter_dfs()
        .filter_map(|id| match &tree.node(id)?.kind {
            NodeKind::Link(link) => Some(link.source.clone()),
            NodeKind::Image(image) => Some(image.source.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        sources,
        vec![
            "https://example.com/docs/other.html",
            "https://example.com/img/a.png",
        ]
    );
}
