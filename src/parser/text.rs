//! Whitespace normalization for text nodes.
//!
//! Runs of HTML whitespace collapse to one space; what happens at the edges
//! depends on the formatting context the text sits in.

/// Space, tab, LF, FF and CR. Non-breaking space is content.
pub fn is_html_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\u{000C}' | '\r')
}

/// True for text made only of HTML whitespace, including the empty string.
pub fn is_whitespace_only(text: &str) -> bool {
    text.chars().all(is_html_whitespace)
}

/// Collapse every run of HTML whitespace into a single space.
pub fn collapse_whitespace(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_run = false;
    for c in raw.chars() {
        if is_html_whitespace(c) {
            if !in_run {
                out.push(' ');
                in_run = true;
            }
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

/// Where a text node sits when it is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextContext {
    /// Alone in a block formatting context.
    Defined,
    /// Part of an inline run.
    Anonymous {
        /// Nothing has been emitted in this run yet.
        first_in_block: bool,
        /// The previous inline emission ended in whitespace.
        after_space: bool,
    },
}

/// Normalize a raw text payload; `None` means it contributes nothing.
pub fn normalize(raw: &str, context: TextContext) -> Option<String> {
    let collapsed = collapse_whitespace(raw);
    match context {
        TextContext::Defined => {
            let trimmed = collapsed.trim_matches(' ');
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        TextContext::Anonymous {
            first_in_block,
            after_space,
        } => {
            let text = if first_in_block || after_space {
                collapsed.strip_prefix(' ').unwrap_or(&collapsed)
            } else {
                &collapsed
            };
            (!text.is_empty()).then(|| text.to_string())
        }
    }
}

/// Whether emitted text leaves the run ending in whitespace.
pub fn ends_with_break(text: &str) -> bool {
    text.ends_with([' ', '\n'])
}
