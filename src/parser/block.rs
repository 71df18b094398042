//! Formatting-context classification over a run of siblings.

use crate::model::{NodeId, Target};

use super::tags::{TEXT_PATH, is_block_tag, is_inline_tag};
use super::text::is_whitespace_only;

/// One walkable sibling: a text payload or a tag name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sibling<'a> {
    Text(&'a str),
    Tag(&'a str),
}

impl<'a> Sibling<'a> {
    /// Tag name, or `"text"` for text nodes.
    pub fn path(&self) -> &'a str {
        match self {
            Self::Text(_) => TEXT_PATH,
            Self::Tag(name) => name,
        }
    }

    pub fn is_whitespace_text(&self) -> bool {
        matches!(self, Self::Text(t) if is_whitespace_only(t))
    }

    pub fn is_text_or_inline(&self, image_as_block: bool) -> bool {
        match self {
            Self::Text(_) => true,
            Self::Tag(name) => is_inline_tag(name, image_as_block),
        }
    }
}

/// First sibling after `index` that is not whitespace-only text.
pub fn next_meaningful<'a>(siblings: &[Sibling<'a>], index: usize) -> Option<Sibling<'a>> {
    siblings
        .iter()
        .skip(index + 1)
        .find(|s| !s.is_whitespace_text())
        .copied()
}

/// Inline run in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnonymousBlock {
    /// Something has been emitted in this run.
    pub has_text: bool,
    /// The last inline emission ended in whitespace.
    pub ends_with_space: bool,
    /// Text most recently emitted in this run and the list holding it.
    pub last_text: Option<(Target, NodeId)>,
}

/// Formatting context of the current flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Block {
    #[default]
    None,
    Anonymous(AnonymousBlock),
    Defined,
}

impl Block {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous(_))
    }

    pub fn anonymous_mut(&mut self) -> Option<&mut AnonymousBlock> {
        match self {
            Self::Anonymous(block) => Some(block),
            _ => None,
        }
    }
}

/// What the next sibling does to the formatting context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Stay in the open anonymous block.
    Continue,
    /// Close whatever is open and start a new anonymous block.
    OpenAnonymous,
    /// Close whatever is open; this sibling is a block of its own.
    Defined,
}

/// Classify `siblings[index]` given the currently open block.
pub fn classify(current: &Block, siblings: &[Sibling<'_>], index: usize, image_as_block: bool) -> Transition {
    let Some(sibling) = siblings.get(index) else {
        return Transition::Defined;
    };
    let in_anonymous = current.is_anonymous();
    let next_is_inline = || {
        next_meaningful(siblings, index).is_some_and(|next| next.is_text_or_inline(image_as_block))
    };

    match sibling {
        Sibling::Text(_) if sibling.is_whitespace_text() => {
            match next_meaningful(siblings, index) {
                // Trailing whitespace inside an inline element belongs to the
                // run the element is part of.
                None if in_anonymous => Transition::Continue,
                Some(next) if next.is_text_or_inline(image_as_block) => {
                    if in_anonymous {
                        Transition::Continue
                    } else {
                        Transition::OpenAnonymous
                    }
                }
                _ => Transition::Defined,
            }
        }
        Sibling::Text(_) if in_anonymous => Transition::Continue,
        Sibling::Tag(name) if is_block_tag(name, image_as_block) => Transition::Defined,
        Sibling::Tag(_) if in_anonymous => Transition::Continue,
        _ if next_is_inline() => Transition::OpenAnonymous,
        _ => Transition::Defined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use Sibling::{Tag, Text};

    fn anonymous() -> Block {
        Block::Anonymous(AnonymousBlock::default())
    }

    #[test]
    fn test_inline_run_opens_anonymous() {
        let sibs = [Text("abc"), Tag("img"), Text("abc")];
        assert_eq!(classify(&Block::None, &sibs, 0, false), Transition::OpenAnonymous);
        assert_eq!(classify(&anonymous(), &sibs, 1, false), Transition::Continue);
        assert_eq!(classify(&anonymous(), &sibs, 2, false), Transition::Continue);
    }

    #[test]
    fn test_block_image_splits_run() {
        let sibs = [Text("abc"), Tag("img"), Text("abc")];
        assert_eq!(classify(&Block::None, &sibs, 0, true), Transition::Defined);
        assert_eq!(classify(&Block::Defined, &sibs, 1, true), Transition::Defined);
        assert_eq!(classify(&Block::Defined, &sibs, 2, true), Transition::Defined);
    }

    #[test]
    fn test_lone_inline_is_defined() {
        let sibs = [Tag("b")];
        assert_eq!(classify(&Block::None, &sibs, 0, false), Transition::Defined);
    }

    #[test]
    fn test_whitespace_looks_past_itself() {
        let sibs = [Tag("span"), Text(" \n "), Tag("span")];
        assert_eq!(classify(&Block::None, &sibs, 0, false), Transition::OpenAnonymous);
        assert_eq!(classify(&anonymous(), &sibs, 1, false), Transition::Continue);

        let sibs = [Tag("span"), Text("  "), Tag("div")];
        assert_eq!(classify(&anonymous(), &sibs, 1, false), Transition::Defined);
        assert_eq!(classify(&Block::None, &sibs, 0, false), Transition::Defined);
    }

    #[test]
    fn test_trailing_whitespace_stays_in_run() {
        let sibs = [Text("x"), Text(" ")];
        assert_eq!(classify(&anonymous(), &sibs, 1, false), Transition::Continue);
        assert_eq!(classify(&Block::Defined, &sibs, 1, false), Transition::Defined);
    }

    #[test]
    fn test_block_tag_closes_anonymous() {
        let sibs = [Text("a"), Tag("p")];
        assert_eq!(classify(&anonymous(), &sibs, 1, false), Transition::Defined);
    }

    #[test]
    fn test_next_meaningful() {
        let sibs = [Tag("a"), Text(" "), Text("\t"), Tag("b")];
        assert_eq!(next_meaningful(&sibs, 0), Some(Tag("b")));
        assert_eq!(next_meaningful(&sibs, 3), None);
    }
}
