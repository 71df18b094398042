//! Tag classification tables.

/// Path name given to text nodes.
pub const TEXT_PATH: &str = "text";

/// Whether a tag establishes its own block formatting context.
pub fn is_block_tag(tag: &str, image_as_block: bool) -> bool {
    match tag {
        "address" | "article" | "aside" | "blockquote" | "body" | "details" | "dialog"
        | "div" | "dl" | "dd" | "dt" | "fieldset" | "figcaption" | "figure" | "footer"
        | "form" | "header" | "hgroup" | "hr" | "html" | "main" | "nav" | "p" | "pre"
        | "section" | "summary" | "legend" | "menu" => true,

        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => true,

        "ol" | "ul" | "li" => true,

        "table" | "caption" | "colgroup" | "col" | "thead" | "tbody" | "tfoot" | "tr" | "td"
        | "th" => true,

        "iframe" | "video" | "audio" | "canvas" | "embed" | "object" | "picture" | "svg"
        | "math" => true,

        "img" => image_as_block,

        _ => false,
    }
}

/// Everything that is not block-level flows inline, unknown tags included.
pub fn is_inline_tag(tag: &str, image_as_block: bool) -> bool {
    !is_block_tag(tag, image_as_block)
}

pub fn is_bold_tag(tag: &str) -> bool {
    matches!(tag, "b" | "strong")
}

pub fn is_italic_tag(tag: &str) -> bool {
    matches!(tag, "i" | "em" | "cite" | "var" | "dfn")
}

pub fn is_underline_tag(tag: &str) -> bool {
    matches!(tag, "u" | "ins")
}

pub fn is_strikethrough_tag(tag: &str) -> bool {
    matches!(tag, "s" | "strike" | "del")
}

pub fn is_list_tag(tag: &str) -> bool {
    matches!(tag, "ol" | "ul")
}

/// `h1`..`h6` to 1..6.
pub fn header_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// Whether a path may be grouped into a text container: text or an inline tag.
pub fn is_text_container_path(path: &str, image_as_block: bool) -> bool {
    path == TEXT_PATH || is_inline_tag(path, image_as_block)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_toggle() {
        assert!(is_inline_tag("img", false));
        assert!(is_block_tag("img", true));
        assert!(is_text_container_path("img", false));
        assert!(!is_text_container_path("img", true));
    }

    #[test]
    fn test_unknown_tags_are_inline() {
        assert!(is_inline_tag("my-widget", false));
        assert!(is_inline_tag("span", false));
        assert!(is_text_container_path("text", true));
        assert!(!is_text_container_path("div", false));
    }

    #[test]
    fn test_formatting_sets() {
        assert!(is_bold_tag("strong"));
        assert!(is_italic_tag("em"));
        assert!(is_underline_tag("ins"));
        assert!(is_strikethrough_tag("del"));
        assert!(is_list_tag("ol"));
        assert!(!is_list_tag("li"));
    }

    #[test]
    fn test_header_level() {
        assert_eq!(header_level("h1"), Some(1));
        assert_eq!(header_level("h6"), Some(6));
        assert_eq!(header_level("h7"), None);
        assert_eq!(header_level("header"), None);
    }
}
