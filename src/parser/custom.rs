//! User hook consulted before the built-in tag handlers.

use crate::dom::ElementRef;
use crate::model::{Cascade, NodeKind, PendingIds};

/// Result of a custom parser match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomParse {
    /// Node to emit instead of whatever the tag handlers would produce.
    pub node: Option<NodeKind>,
    /// Force (`Some(true)`) or suppress (`Some(false)`) descent into children.
    pub continue_parsing_children: Option<bool>,
}

impl CustomParse {
    /// Emit `kind`, descending into children as usual.
    pub fn node(kind: NodeKind) -> Self {
        Self {
            node: Some(kind),
            continue_parsing_children: None,
        }
    }

    /// Drop the element and its whole subtree.
    pub fn swallow() -> Self {
        Self {
            node: None,
            continue_parsing_children: Some(false),
        }
    }

    pub fn with_children(mut self, parse_children: bool) -> Self {
        self.continue_parsing_children = Some(parse_children);
        self
    }
}

/// What a custom parser gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct CustomContext<'a> {
    pub element: ElementRef<'a>,
    /// Tag name of the element.
    pub path: &'a str,
    pub cascade: &'a Cascade,
    /// DOM ids waiting for the next emitted node.
    pub pending_ids: &'a PendingIds,
    /// Key prefix of the list the next node lands in.
    pub key_prefix: &'a str,
}

impl CustomContext<'_> {
    pub fn has_class_name(&self, name: &str) -> bool {
        self.element.has_class(name)
    }
}

/// Hook run on every element before tag handlers.
pub trait CustomParser: Send + Sync {
    /// `None` leaves the element to the built-in handlers.
    fn parse(&self, ctx: &CustomContext<'_>) -> Option<CustomParse>;
}

impl<F> CustomParser for F
where
    F: Fn(&CustomContext<'_>) -> Option<CustomParse> + Send + Sync,
{
    fn parse(&self, ctx: &CustomContext<'_>) -> Option<CustomParse> {
        self(ctx)
    }
}
