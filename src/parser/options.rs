//! Parse configuration.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use url::Url;

use super::custom::CustomParser;
use super::handlers::{HandlerRegistry, TagHandler};
use crate::error::Result;

/// Tags skipped together with their whole subtree unless configured otherwise.
pub const DEFAULT_EXCLUDED_TAGS: &[&str] = &[
    "head", "title", "meta", "link", "base", "script", "noscript", "style", "template", "input",
    "textarea", "select", "option", "optgroup", "button", "datalist",
];

/// Options for [`parse_html`](super::parse_html) and friends.
///
/// ```
/// use html2nodes::ParseOptions;
///
/// let options = ParseOptions::new()
///     .with_selector(".article")
///     .with_image_as_block(true)
///     .with_excluded_tag("aside");
/// assert!(options.is_excluded("aside"));
/// assert!(options.is_excluded("script"));
/// ```
#[derive(Clone)]
pub struct ParseOptions {
    /// Elements dropped with their subtree.
    pub excluded_tags: HashSet<String>,
    /// Hook consulted before tag handlers.
    pub custom_parser: Option<Arc<dyn CustomParser>>,
    pub handlers: HandlerRegistry,
    /// Restrict parsing to the first element matching this CSS selector.
    pub selector: Option<String>,
    /// Treat `img` as block-level instead of inline.
    pub image_as_block: bool,
    /// Base for resolving relative `href`/`src` values.
    pub base_url: Option<Url>,
    /// Fail on any tokenizer parse error.
    pub strict: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            excluded_tags: DEFAULT_EXCLUDED_TAGS.iter().map(|t| t.to_string()).collect(),
            custom_parser: None,
            handlers: HandlerRegistry::with_builtins(),
            selector: None,
            image_as_block: false,
            base_url: None,
            strict: false,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the excluded tag set.
    pub fn with_excluded_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_tags = tags
            .into_iter()
            .map(|t| t.into().to_ascii_lowercase())
            .collect();
        self
    }

    /// Add one tag to the excluded set.
    pub fn with_excluded_tag(mut self, tag: impl Into<String>) -> Self {
        self.excluded_tags.insert(tag.into().to_ascii_lowercase());
        self
    }

    pub fn with_custom_parser(mut self, parser: impl CustomParser + 'static) -> Self {
        self.custom_parser = Some(Arc::new(parser));
        self
    }

    /// Register a handler that takes precedence over the built-in one for `tag`.
    pub fn with_handler(mut self, tag: impl Into<String>, handler: impl TagHandler + 'static) -> Self {
        self.handlers.register(tag, Arc::new(handler));
        self
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    pub fn with_image_as_block(mut self, image_as_block: bool) -> Self {
        self.image_as_block = image_as_block;
        self
    }

    /// Set the base URL; fails if `base` is not an absolute URL.
    pub fn with_base_url(mut self, base: &str) -> Result<Self> {
        self.base_url = Some(Url::parse(base)?);
        Ok(self)
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_excluded(&self, tag: &str) -> bool {
        self.excluded_tags.contains(tag)
    }
}

impl fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut excluded: Vec<_> = self.excluded_tags.iter().collect();
        excluded.sort();
        f.debug_struct("ParseOptions")
            .field("excluded_tags", &excluded)
            .field("custom_parser", &self.custom_parser.is_some())
            .field("handlers", &self.handlers)
            .field("selector", &self.selector)
            .field("image_as_block", &self.image_as_block)
            .field("base_url", &self.base_url.as_ref().map(Url::as_str))
            .field("strict", &self.strict)
            .finish()
    }
}
