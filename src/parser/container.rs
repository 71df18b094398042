//! Text-container grouping predicates.
//!
//! A text container wraps a run of inline siblings so they render as one
//! paragraph. These checks only look at sibling shapes; the walker owns the
//! container node itself.

use super::block::Sibling;
use super::tags::is_text_container_path;

/// Whether a sibling may live inside a text container.
pub fn is_groupable(sibling: &Sibling<'_>, image_as_block: bool) -> bool {
    is_text_container_path(sibling.path(), image_as_block)
}

/// Whether `siblings[index]` starts a new text container.
///
/// The sibling must be groupable and carry content (non-whitespace text or a
/// tag), and a later sibling must be groupable too. Whitespace-only text and
/// the first `<br>` are skipped while looking for that partner.
pub fn should_open(siblings: &[Sibling<'_>], index: usize, image_as_block: bool) -> bool {
    let Some(sibling) = siblings.get(index) else {
        return false;
    };
    if !is_groupable(sibling, image_as_block) || sibling.is_whitespace_text() {
        return false;
    }

    let mut skipped_break = false;
    for next in &siblings[index + 1..] {
        if next.is_whitespace_text() {
            continue;
        }
        if !skipped_break && *next == Sibling::Tag("br") {
            skipped_break = true;
            continue;
        }
        return is_groupable(next, image_as_block);
    }
    false
}

/// Whether an open container ends after `siblings[index]`.
pub fn should_close(siblings: &[Sibling<'_>], index: usize, image_as_block: bool) -> bool {
    siblings
        .get(index + 1)
        .is_none_or(|next| !is_groupable(next, image_as_block))
}

/// Whether a trailing container child can be stripped at close-out.
pub fn is_blank(content: &str) -> bool {
    content.chars().all(|c| c == ' ')
}
