//! Read-only element view over [`Dom`] with CSS selector support.
//!
//! [`ElementRef`] is what tag handlers and custom parsers receive. It also
//! implements `selectors::Element`, so a [`Selector`] can be matched against it.

use std::fmt;

use cssparser::{CowRcStr, ParseError, SourceLocation};
use html5ever::{LocalName, Namespace};
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::context::{MatchingContext, SelectorCaches};
use selectors::matching::{
    ElementSelectorFlags, MatchingForInvalidation, MatchingMode, NeedsSelectorFlags,
};
use selectors::parser::{ParseRelative, SelectorList, SelectorParseErrorKind};
use selectors::{OpaqueElement, SelectorImpl};

use super::arena::{Dom, DomNodeData, DomNodeId};
use crate::error::{Error, Result};

/// Selector implementation for matching against the arena DOM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlSelectors;

/// Identifier / attribute value string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct IdentStr(pub String);

impl precomputed_hash::PrecomputedHash for IdentStr {
    fn precomputed_hash(&self) -> u32 {
        // FNV-1a
        self.0.bytes().fold(0x811c_9dc5_u32, |h, b| {
            (h ^ u32::from(b)).wrapping_mul(0x0100_0193)
        })
    }
}

impl AsRef<str> for IdentStr {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'a> From<&'a str> for IdentStr {
    fn from(s: &'a str) -> Self {
        Self(s.to_owned())
    }
}

impl cssparser::ToCss for IdentStr {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        cssparser::serialize_identifier(&self.0, dest)
    }
}

/// Local name wrapper implementing `ToCss`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CssLocalName(pub LocalName);

impl precomputed_hash::PrecomputedHash for CssLocalName {
    fn precomputed_hash(&self) -> u32 {
        self.0.precomputed_hash()
    }
}

impl<'a> From<&'a str> for CssLocalName {
    fn from(s: &'a str) -> Self {
        Self(LocalName::from(s))
    }
}

impl cssparser::ToCss for CssLocalName {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(&self.0)
    }
}

/// Namespace wrapper implementing `ToCss`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CssNamespace(pub Namespace);

impl precomputed_hash::PrecomputedHash for CssNamespace {
    fn precomputed_hash(&self) -> u32 {
        self.0.precomputed_hash()
    }
}

impl<'a> From<&'a str> for CssNamespace {
    fn from(s: &'a str) -> Self {
        Self(Namespace::from(s))
    }
}

impl cssparser::ToCss for CssNamespace {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(&self.0)
    }
}

/// No pseudo-elements are supported.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PseudoElement {}

impl cssparser::ToCss for PseudoElement {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

impl selectors::parser::PseudoElement for PseudoElement {
    type Impl = HtmlSelectors;

    fn accepts_state_pseudo_classes(&self) -> bool {
        match *self {}
    }

    fn valid_after_slotted(&self) -> bool {
        match *self {}
    }
}

/// Pseudo-classes meaningful in a static document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PseudoClass {
    /// `:link` / `:any-link`
    AnyLink,
}

impl selectors::parser::NonTSPseudoClass for PseudoClass {
    type Impl = HtmlSelectors;

    fn is_active_or_hover(&self) -> bool {
        false
    }

    fn is_user_action_state(&self) -> bool {
        false
    }
}

impl cssparser::ToCss for PseudoClass {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        match self {
            Self::AnyLink => dest.write_str(":any-link"),
        }
    }
}

impl SelectorImpl for HtmlSelectors {
    type ExtraMatchingData<'a> = ();
    type AttrValue = IdentStr;
    type Identifier = IdentStr;
    type LocalName = CssLocalName;
    type NamespaceUrl = CssNamespace;
    type NamespacePrefix = IdentStr;
    type BorrowedLocalName = CssLocalName;
    type BorrowedNamespaceUrl = CssNamespace;
    type NonTSPseudoClass = PseudoClass;
    type PseudoElement = PseudoElement;
}

impl<'i> selectors::parser::Parser<'i> for HtmlSelectors {
    type Impl = HtmlSelectors;
    type Error = SelectorParseErrorKind<'i>;

    fn parse_non_ts_pseudo_class(
        &self,
        location: SourceLocation,
        name: CowRcStr<'i>,
    ) -> std::result::Result<PseudoClass, ParseError<'i, Self::Error>> {
        if name.eq_ignore_ascii_case("link") || name.eq_ignore_ascii_case("any-link") {
            Ok(PseudoClass::AnyLink)
        } else {
            Err(location.new_custom_error(
                SelectorParseErrorKind::UnsupportedPseudoClassOrElement(name),
            ))
        }
    }
}

/// A parsed CSS selector list.
#[derive(Clone)]
pub struct Selector {
    source: String,
    list: SelectorList<HtmlSelectors>,
}

impl Selector {
    /// Parse a selector list such as `.article` or `main > section, #content`.
    pub fn parse(source: &str) -> Result<Self> {
        let mut input = cssparser::ParserInput::new(source);
        let mut parser = cssparser::Parser::new(&mut input);
        let list = SelectorList::parse(&HtmlSelectors, &mut parser, ParseRelative::No).map_err(
            |err| Error::InvalidSelector {
                selector: source.to_string(),
                reason: format!("{:?}", err.kind),
            },
        )?;
        Ok(Self {
            source: source.to_string(),
            list,
        })
    }

    /// The selector text as given.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Check whether any selector in the list matches the element.
    pub fn matches(&self, element: &ElementRef<'_>) -> bool {
        let mut caches = SelectorCaches::default();
        let mut context = MatchingContext::new(
            MatchingMode::Normal,
            None,
            &mut caches,
            selectors::context::QuirksMode::NoQuirks,
            NeedsSelectorFlags::No,
            MatchingForInvalidation::No,
        );
        self.list.slice().iter().any(|selector| {
            selectors::matching::matches_selector(selector, 0, None, element, &mut context)
        })
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Selector").field(&self.source).finish()
    }
}

/// Reference to an element in the [`Dom`].
#[derive(Clone, Copy)]
pub struct ElementRef<'a> {
    dom: &'a Dom,
    id: DomNodeId,
}

impl<'a> ElementRef<'a> {
    /// Wrap a node; returns `None` unless it is an element.
    pub fn new(dom: &'a Dom, id: DomNodeId) -> Option<Self> {
        dom.is_element(id).then_some(Self { dom, id })
    }

    pub fn id(&self) -> DomNodeId {
        self.id
    }

    pub fn dom(&self) -> &'a Dom {
        self.dom
    }

    /// Lowercase tag name.
    pub fn name(&self) -> &'a str {
        self.dom.element_name(self.id).map_or("", |n| n.as_ref())
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.dom.get_attr(self.id, name)
    }

    /// Value of the `id` attribute.
    pub fn dom_id(&self) -> Option<&'a str> {
        self.dom.element_id(self.id)
    }

    pub fn classes(&self) -> &'a [String] {
        self.dom.element_classes(self.id)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().iter().any(|c| c == class)
    }

    /// Parent element, if the parent is an element.
    pub fn parent(&self) -> Option<ElementRef<'a>> {
        let parent = self.dom.get(self.id)?.parent?;
        Self::new(self.dom, parent)
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text(&self) -> String {
        let mut out = String::new();
        let mut stack: Vec<DomNodeId> = self.dom.children(self.id).collect();
        stack.reverse();
        while let Some(id) = stack.pop() {
            if let Some(text) = self.dom.text_content(id) {
                out.push_str(text);
            } else if self.dom.is_element(id) {
                let mut children: Vec<_> = self.dom.children(id).collect();
                children.reverse();
                stack.extend(children);
            }
        }
        out
    }

    /// Serialized markup of this element and its subtree.
    pub fn outer_html(&self) -> String {
        super::serialize::outer_html(self.dom, self.id)
    }

    fn sibling_element(&self, forward: bool) -> Option<Self> {
        let step = |id: DomNodeId| {
            let node = self.dom.get(id)?;
            if forward {
                node.next_sibling
            } else {
                node.prev_sibling
            }
        };
        let mut current = step(self.id);
        while let Some(id) = current {
            if let Some(elem) = Self::new(self.dom, id) {
                return Some(elem);
            }
            current = step(id);
        }
        None
    }

    fn is_anchor_with_href(&self) -> bool {
        matches!(self.name(), "a" | "area") && self.attr("href").is_some()
    }
}

impl fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRef")
            .field("id", &self.id)
            .field("name", &self.name())
            .finish()
    }
}

impl selectors::Element for ElementRef<'_> {
    type Impl = HtmlSelectors;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self)
    }

    fn parent_element(&self) -> Option<Self> {
        self.parent()
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.sibling_element(false)
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.sibling_element(true)
    }

    fn first_element_child(&self) -> Option<Self> {
        self.dom
            .children(self.id)
            .find_map(|child| Self::new(self.dom, child))
    }

    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, name: &CssLocalName) -> bool {
        self.dom
            .element_name(self.id)
            .is_some_and(|n| *n == name.0)
    }

    fn has_namespace(&self, ns: &CssNamespace) -> bool {
        self.dom
            .element_namespace(self.id)
            .is_some_and(|n| *n == ns.0)
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.dom.element_name(self.id) == other.dom.element_name(other.id)
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&CssNamespace>,
        local_name: &CssLocalName,
        operation: &AttrSelectorOperation<&IdentStr>,
    ) -> bool {
        self.dom.attrs(self.id).iter().any(|attr| {
            let ns_match = match ns {
                NamespaceConstraint::Any => true,
                NamespaceConstraint::Specific(ns) => attr.name.ns == ns.0,
            };
            ns_match && attr.name.local == local_name.0 && operation.eval_str(&attr.value)
        })
    }

    fn match_non_ts_pseudo_class(
        &self,
        pc: &PseudoClass,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        match pc {
            PseudoClass::AnyLink => self.is_anchor_with_href(),
        }
    }

    fn match_pseudo_element(
        &self,
        pe: &PseudoElement,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        match *pe {}
    }

    fn is_link(&self) -> bool {
        self.is_anchor_with_href()
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &IdentStr, case_sensitivity: CaseSensitivity) -> bool {
        self.dom_id()
            .is_some_and(|own| case_sensitivity.eq(own.as_bytes(), id.0.as_bytes()))
    }

    fn has_class(&self, name: &IdentStr, case_sensitivity: CaseSensitivity) -> bool {
        self.classes()
            .iter()
            .any(|c| case_sensitivity.eq(c.as_bytes(), name.0.as_bytes()))
    }

    fn imported_part(&self, _name: &IdentStr) -> Option<IdentStr> {
        None
    }

    fn is_part(&self, _name: &IdentStr) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        self.dom.children(self.id).all(|child| {
            match self.dom.get(child).map(|n| &n.data) {
                Some(DomNodeData::Element { .. }) => false,
                Some(DomNodeData::Text(t)) => t.is_empty(),
                _ => true,
            }
        })
    }

    fn is_root(&self) -> bool {
        self.dom
            .get(self.id)
            .and_then(|n| n.parent)
            .and_then(|p| self.dom.get(p))
            .is_some_and(|p| matches!(p.data, DomNodeData::Document))
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn add_element_unique_hashes(&self, _filter: &mut selectors::bloom::BloomFilter) -> bool {
        false
    }

    fn has_custom_state(&self, _name: &IdentStr) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_dom(html: &str) -> Dom {
        crate::dom::parse_document(html).0
    }

    fn first<'a>(dom: &'a Dom, tag: &str) -> ElementRef<'a> {
        ElementRef::new(dom, dom.find_by_tag(tag).unwrap()).unwrap()
    }

    #[test]
    fn test_accessors() {
        let dom = parse_dom(r#"<p id="lead" class="intro big" data-x="1">Hi <b>there</b></p>"#);
        let p = first(&dom, "p");

        assert_eq!(p.name(), "p");
        assert_eq!(p.dom_id(), Some("lead"));
        assert!(p.has_class("big"));
        assert!(!p.has_class("intro big"));
        assert_eq!(p.attr("data-x"), Some("1"));
        assert_eq!(p.text(), "Hi there");
        assert_eq!(p.parent().map(|e| e.name()), Some("body"));
    }

    #[test]
    fn test_text_node_is_not_element() {
        let dom = parse_dom("<p>Hi</p>");
        let p = dom.find_by_tag("p").unwrap();
        let text = dom.children(p).next().unwrap();
        assert!(ElementRef::new(&dom, text).is_none());
    }

    #[test]
    fn test_class_and_id_selectors() {
        let dom = parse_dom(r#"<div id="main" class="article wide"><p>x</p></div>"#);
        let div = first(&dom, "div");

        assert!(Selector::parse(".article").unwrap().matches(&div));
        assert!(Selector::parse("div#main.wide").unwrap().matches(&div));
        assert!(!Selector::parse(".missing").unwrap().matches(&div));
    }

    #[test]
    fn test_combinators_and_lists() {
        let dom = parse_dom("<section><div><p>x</p></div></section>");
        let p = first(&dom, "p");

        assert!(Selector::parse("section p").unwrap().matches(&p));
        assert!(Selector::parse("div > p").unwrap().matches(&p));
        assert!(!Selector::parse("section > p").unwrap().matches(&p));
        assert!(Selector::parse("h1, div > p").unwrap().matches(&p));
    }

    #[test]
    fn test_attribute_and_link_selectors() {
        let dom = parse_dom(r##"<a href="#x" rel="next">go</a>"##);
        let a = first(&dom, "a");

        assert!(Selector::parse("a[rel=next]").unwrap().matches(&a));
        assert!(Selector::parse("a[href^='#']").unwrap().matches(&a));
        assert!(Selector::parse(":any-link").unwrap().matches(&a));
    }

    #[test]
    fn test_invalid_selector() {
        let err = Selector::parse("div >").unwrap_err();
        assert!(matches!(err, Error::InvalidSelector { ref selector, .. } if selector == "div >"));
        assert!(Selector::parse(":hover").is_err());
    }
}
