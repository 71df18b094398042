//! Recursive walk from DOM siblings to output nodes.
//!
//! Every run of siblings is walked inside a [`Flow`]: the list nodes land in,
//! the text container open in it, and the formatting context of the run.
//! Flows are created per element kind:
//!
//! - block tag without a node: fresh flow on the same list
//! - inline tag without a node: the parent flow, unable to end its container
//! - link, or custom node inside a text container: nested flow in the node's
//!   children sharing the parent's block state
//! - list, list item, other custom node: fresh flow in the node's children

use std::mem;

use tracing::{debug, trace};

use crate::dom::{Dom, DomNodeData, DomNodeId, ElementRef};
use crate::model::{
    Cascade, DomIdMap, Node, NodeId, NodeKind, NodeTree, PendingIds, Target, TextContainerNode,
    TextNode,
};

use super::block::{self, AnonymousBlock, Block, Sibling, Transition};
use super::container;
use super::custom::CustomContext;
use super::handlers::{HandlerContext, Resolution};
use super::options::ParseOptions;
use super::tags::{
    header_level, is_block_tag, is_bold_tag, is_italic_tag, is_list_tag, is_strikethrough_tag,
    is_underline_tag,
};
use super::text::{TextContext, ends_with_break, normalize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Accepts {
    Any,
    ListItems,
}

/// Scoped state for one run of siblings.
#[derive(Debug)]
struct Flow {
    target: Target,
    /// Length of `target` when the flow started.
    base_len: usize,
    container: Option<NodeId>,
    can_open_container: bool,
    can_end_container: bool,
    /// Everything emitted here sits inside an outer text container.
    in_container: bool,
    /// Container close-out may run the anonymous block post-process.
    owns_block: bool,
    accepts: Accepts,
    block: Block,
}

impl Flow {
    fn fresh(target: Target, base_len: usize, in_container: bool, accepts: Accepts) -> Self {
        Self {
            target,
            base_len,
            container: None,
            can_open_container: !in_container && accepts == Accepts::Any,
            can_end_container: true,
            in_container,
            owns_block: true,
            accepts,
            block: Block::None,
        }
    }

    /// List the next node lands in.
    fn group_target(&self) -> Target {
        self.container.map_or(self.target, Target::Node)
    }

    fn emits_into_container(&self) -> bool {
        self.container.is_some() || self.in_container
    }
}

/// What an element resolved to before it is placed.
enum Outcome {
    Nothing,
    Swallowed,
    Resolved(Resolution),
}

pub(crate) struct Walker<'a> {
    dom: &'a Dom,
    options: &'a ParseOptions,
    tree: NodeTree,
    dom_ids: DomIdMap,
    pending: PendingIds,
}

impl<'a> Walker<'a> {
    pub(crate) fn new(dom: &'a Dom, options: &'a ParseOptions) -> Self {
        Self {
            dom,
            options,
            tree: NodeTree::new(),
            dom_ids: DomIdMap::new(),
            pending: PendingIds::default(),
        }
    }

    /// Walk `start` as the top-level sibling run.
    pub(crate) fn run(mut self, start: &[DomNodeId]) -> (NodeTree, DomIdMap) {
        let mut flow = Flow::fresh(Target::Root, 0, false, Accepts::Any);
        self.walk_siblings(start, &mut flow, &Cascade::default());
        self.finish_flow(&mut flow);
        if !self.pending.is_empty() {
            trace!(count = self.pending.len(), "dom ids without a following node");
        }
        (self.tree, self.dom_ids)
    }

    fn sibling(&self, id: DomNodeId) -> Option<Sibling<'a>> {
        let dom = self.dom;
        match &dom.get(id)?.data {
            DomNodeData::Text(text) => Some(Sibling::Text(text)),
            DomNodeData::Element { name, .. } => {
                let tag: &'a str = name.local.as_ref();
                if self.options.is_excluded(tag) {
                    trace!(tag, "skipping excluded subtree");
                    None
                } else {
                    Some(Sibling::Tag(tag))
                }
            }
            _ => None,
        }
    }

    fn walk_siblings(&mut self, ids: &[DomNodeId], flow: &mut Flow, cascade: &Cascade) {
        let items: Vec<(DomNodeId, Sibling<'a>)> = ids
            .iter()
            .filter_map(|&id| self.sibling(id).map(|s| (id, s)))
            .collect();
        let siblings: Vec<Sibling<'a>> = items.iter().map(|(_, s)| *s).collect();

        for (index, &(id, _)) in items.iter().enumerate() {
            self.walk_node(id, &siblings, index, flow, cascade);
        }
    }

    fn walk_node(
        &mut self,
        id: DomNodeId,
        siblings: &[Sibling<'a>],
        index: usize,
        flow: &mut Flow,
        cascade: &Cascade,
    ) {
        let dom = self.dom;
        let image_as_block = self.options.image_as_block;
        let sibling = siblings[index];
        let element = ElementRef::new(dom, id);

        if let Some(dom_id) = element.and_then(|e| e.dom_id()) {
            self.pending.push(dom_id);
        }

        match block::classify(&flow.block, siblings, index, image_as_block) {
            Transition::Continue => {}
            Transition::OpenAnonymous => {
                self.leave_block(flow);
                flow.block = Block::Anonymous(AnonymousBlock::default());
            }
            Transition::Defined => {
                self.leave_block(flow);
                flow.block = Block::Defined;
            }
        }

        if flow.container.is_some() && !container::is_groupable(&sibling, image_as_block) {
            self.close_container(flow);
        }
        if flow.container.is_none()
            && flow.can_open_container
            && container::should_open(siblings, index, image_as_block)
        {
            self.open_container(flow);
        }

        let (Sibling::Tag(tag), Some(element)) = (sibling, element) else {
            if let Sibling::Text(raw) = sibling {
                self.place_text(raw, flow, cascade);
            }
            self.close_if_run_ends(siblings, index, flow);
            return;
        };

        let (outcome, descend) = self.resolve_element(element, flow, cascade);
        let produced = match outcome {
            Outcome::Resolved(Resolution::Node(kind)) => self.emit(flow, kind),
            Outcome::Resolved(Resolution::AppendToPreviousText(extra)) => {
                self.append_to_previous_text(flow, &extra, cascade);
                None
            }
            Outcome::Nothing | Outcome::Swallowed => None,
        };

        if descend {
            let children: Vec<DomNodeId> = dom.children(id).collect();
            self.descend(tag, produced, &children, flow, cascade);
        }

        self.close_if_run_ends(siblings, index, flow);
    }

    /// Custom parser first, then the tag handler registry.
    fn resolve_element(
        &self,
        element: ElementRef<'a>,
        flow: &Flow,
        cascade: &Cascade,
    ) -> (Outcome, bool) {
        let tag = element.name();
        let mut descend_override = None;

        if let Some(parser) = &self.options.custom_parser {
            let key_prefix = match flow.group_target() {
                Target::Root => "",
                Target::Node(id) => self.tree.node(id).map_or("", |n| n.key.as_str()),
            };
            let ctx = CustomContext {
                element,
                path: tag,
                cascade,
                pending_ids: &self.pending,
                key_prefix,
            };
            if let Some(custom) = parser.parse(&ctx) {
                let descend = custom.continue_parsing_children;
                match (custom.node, descend) {
                    (Some(kind), _) => {
                        return (
                            Outcome::Resolved(Resolution::Node(kind)),
                            descend.unwrap_or(true),
                        );
                    }
                    (None, Some(false)) => {
                        trace!(tag, "custom parser swallowed element");
                        return (Outcome::Swallowed, false);
                    }
                    (None, _) => descend_override = descend,
                }
            }
        }

        let Some(handler) = self.options.handlers.lookup(tag) else {
            return (Outcome::Nothing, descend_override.unwrap_or(true));
        };
        let previous_sibling = self
            .previous_sibling(flow)
            .and_then(|id| self.tree.node(id));
        let ctx = HandlerContext {
            cascade,
            previous_sibling,
            base_url: self.options.base_url.as_ref(),
        };
        let outcome = match handler.resolve(element, &ctx) {
            Some(resolution) => Outcome::Resolved(resolution),
            None => Outcome::Nothing,
        };
        (
            outcome,
            descend_override.unwrap_or_else(|| handler.can_parse_children()),
        )
    }

    fn descend(
        &mut self,
        tag: &str,
        produced: Option<NodeId>,
        children: &[DomNodeId],
        flow: &mut Flow,
        cascade: &Cascade,
    ) {
        let slot = produced
            .and_then(|id| self.tree.node(id).map(|n| (id, &n.kind)))
            .filter(|(_, kind)| kind.has_child_slot())
            .map(|(id, kind)| (id, kind.is_link(), matches!(kind, NodeKind::List(_))));
        let is_link = slot.is_some_and(|(_, is_link, _)| is_link);
        let child_cascade = enter(cascade, tag, is_link);

        match slot {
            Some((node, true, _)) => {
                let in_container = flow.emits_into_container();
                self.walk_nested(node, in_container, children, flow, &child_cascade);
            }
            Some((node, false, false)) if flow.emits_into_container() => {
                self.walk_nested(node, true, children, flow, &child_cascade);
            }
            Some((node, false, is_list)) => {
                let accepts = if is_list {
                    Accepts::ListItems
                } else {
                    Accepts::Any
                };
                let mut inner = Flow::fresh(Target::Node(node), 0, false, accepts);
                self.walk_siblings(children, &mut inner, &child_cascade);
                self.finish_flow(&mut inner);
            }
            None if is_block_tag(tag, self.options.image_as_block) => {
                let base_len = self.tree.list(flow.target).len();
                let mut inner = Flow::fresh(flow.target, base_len, flow.in_container, flow.accepts);
                self.walk_siblings(children, &mut inner, &child_cascade);
                self.finish_flow(&mut inner);
            }
            None => {
                let can_end = mem::replace(&mut flow.can_end_container, false);
                self.walk_siblings(children, flow, &child_cascade);
                flow.can_end_container = can_end;
            }
        }
    }

    /// Walk the children of an inline node in a flow that shares the
    /// parent's block state, so spacing and merging continue across it.
    fn walk_nested(
        &mut self,
        node: NodeId,
        in_container: bool,
        children: &[DomNodeId],
        flow: &mut Flow,
        cascade: &Cascade,
    ) {
        let mut nested = Flow {
            target: Target::Node(node),
            base_len: 0,
            container: None,
            can_open_container: !in_container,
            can_end_container: true,
            in_container,
            owns_block: false,
            accepts: Accepts::Any,
            block: mem::take(&mut flow.block),
        };
        self.walk_siblings(children, &mut nested, cascade);
        self.close_container(&mut nested);
        flow.block = nested.block;
    }

    fn close_if_run_ends(&mut self, siblings: &[Sibling<'_>], index: usize, flow: &mut Flow) {
        if flow.container.is_some()
            && flow.can_end_container
            && container::should_close(siblings, index, self.options.image_as_block)
        {
            self.close_container(flow);
        }
    }

    /// Normalize a text payload, then merge it or emit it.
    fn place_text(&mut self, raw: &str, flow: &mut Flow, cascade: &Cascade) {
        let context = match &flow.block {
            Block::Anonymous(b) => TextContext::Anonymous {
                first_in_block: !b.has_text,
                after_space: b.ends_with_space,
            },
            _ => TextContext::Defined,
        };
        let Some(content) = normalize(raw, context) else {
            return;
        };

        if let Some(previous) = self.mergeable_text(flow, cascade) {
            self.extend_text(flow, previous, &content);
            return;
        }
        self.emit(flow, NodeKind::Text(TextNode::new(content, cascade)));
    }

    /// The text last emitted by the open anonymous block, if it is still the
    /// previous sibling and carries exactly this formatting.
    fn mergeable_text(&self, flow: &Flow, cascade: &Cascade) -> Option<NodeId> {
        let Block::Anonymous(block) = &flow.block else {
            return None;
        };
        let (_, last_text) = block.last_text?;
        let previous = self.previous_sibling(flow)?;
        let same = previous == last_text
            && self
                .tree
                .node(previous)
                .and_then(Node::as_text)
                .is_some_and(|t| t.same_formatting(cascade));
        same.then_some(previous)
    }

    fn append_to_previous_text(&mut self, flow: &mut Flow, extra: &str, cascade: &Cascade) {
        let previous = self
            .previous_sibling(flow)
            .filter(|&id| self.tree.node(id).and_then(Node::as_text).is_some());
        match previous {
            Some(previous) => self.extend_text(flow, previous, extra),
            None => {
                self.emit(flow, NodeKind::Text(TextNode::new(extra, cascade)));
            }
        }
    }

    fn extend_text(&mut self, flow: &mut Flow, id: NodeId, extra: &str) {
        let Some(node) = self.tree.node_mut(id) else {
            return;
        };
        let key = node.key.clone();
        let Some(text) = node.as_text_mut() else {
            return;
        };
        text.content.push_str(extra);
        let ends_with_space = ends_with_break(&text.content);

        self.pending.flush_into(&mut self.dom_ids, &key);
        if let Some(block) = flow.block.anonymous_mut() {
            block.has_text = true;
            if block.last_text.is_some_and(|(_, last)| last == id) {
                block.ends_with_space = ends_with_space;
            }
        }
    }

    /// Previous node in the current group.
    fn previous_sibling(&self, flow: &Flow) -> Option<NodeId> {
        match flow.container {
            Some(container) => self.tree.last(Target::Node(container)),
            None => {
                let list = self.tree.list(flow.target);
                if list.len() > flow.base_len {
                    list.last().copied()
                } else {
                    None
                }
            }
        }
    }

    /// Append a node to the current group and register it.
    fn emit(&mut self, flow: &mut Flow, kind: NodeKind) -> Option<NodeId> {
        if flow.accepts == Accepts::ListItems && !matches!(kind, NodeKind::ListItem) {
            debug!(kind = kind.name(), "dropping node placed directly in a list");
            return None;
        }

        let target = flow.group_target();
        let after_header = self
            .tree
            .last(target)
            .and_then(|id| self.tree.node(id))
            .and_then(Node::as_text)
            .is_some_and(TextNode::is_header);
        let first_in_list_item = match target {
            Target::Node(parent) => self
                .tree
                .node(parent)
                .is_some_and(|p| matches!(p.kind, NodeKind::ListItem) && p.children.is_empty()),
            Target::Root => false,
        };

        let mut kind = kind;
        match &mut kind {
            NodeKind::Text(text) if !text.is_header() => text.is_after_header = after_header,
            NodeKind::TextContainer(c) => c.is_after_header = after_header,
            _ => {}
        }
        let is_container = matches!(kind, NodeKind::TextContainer(_));
        let is_link = kind.is_link();
        let text_end = match &kind {
            NodeKind::Text(text) => Some(ends_with_break(&text.content)),
            _ => None,
        };

        let id = self.tree.append(target, kind);
        let node = self.tree.node_mut(id)?;
        node.is_within_text_container = flow.emits_into_container();
        node.is_first_child_in_list_item = first_in_list_item;
        let key = node.key.clone();
        self.pending.flush_into(&mut self.dom_ids, &key);

        if !is_container && let Some(block) = flow.block.anonymous_mut() {
            block.has_text = true;
            match text_end {
                Some(ends_with_space) => {
                    block.ends_with_space = ends_with_space;
                    block.last_text = Some((target, id));
                }
                None if !is_link => block.ends_with_space = false,
                None => {}
            }
        }
        Some(id)
    }

    fn open_container(&mut self, flow: &mut Flow) {
        let kind = NodeKind::TextContainer(TextContainerNode::default());
        if let Some(id) = self.emit(flow, kind) {
            flow.container = Some(id);
        }
    }

    /// Close the open text container: anonymous post-process, trailing blank
    /// text, then the container itself if nothing is left in it.
    fn close_container(&mut self, flow: &mut Flow) {
        let Some(container) = flow.container.take() else {
            return;
        };
        if flow.owns_block {
            self.leave_block(flow);
        }

        let inner = Target::Node(container);
        while let Some(last) = self.tree.last(inner) {
            let blank = self
                .tree
                .node(last)
                .and_then(Node::as_text)
                .is_some_and(|t| container::is_blank(&t.content));
            if !blank {
                break;
            }
            self.prune_last(inner);
        }

        if self.tree.children(container).is_empty()
            && self.tree.last(flow.target) == Some(container)
        {
            trace!("pruning empty text container");
            self.prune_last(flow.target);
        }
    }

    /// End the current block, post-processing it when it was anonymous.
    fn leave_block(&mut self, flow: &mut Flow) {
        if let Block::Anonymous(block) = mem::take(&mut flow.block) {
            self.trim_anonymous(block);
        }
    }

    /// Trim one trailing space from the run's last text while it is still the
    /// last node of its list; drop it when nothing remains.
    fn trim_anonymous(&mut self, block: AnonymousBlock) {
        let Some((target, id)) = block.last_text else {
            return;
        };
        if self.tree.last(target) != Some(id) {
            return;
        }
        let Some(text) = self.tree.node_mut(id).and_then(Node::as_text_mut) else {
            return;
        };
        if text.content.ends_with(' ') {
            text.content.pop();
        }
        if text.content.is_empty() {
            self.prune_last(target);
        }
    }

    /// Remove the last node of `target`; DOM ids that pointed at it wait for
    /// the next node instead.
    fn prune_last(&mut self, target: Target) {
        if let Some(node) = self.tree.pop_last(target) {
            let ids = self.dom_ids.take_key(&node.key);
            if !ids.is_empty() {
                self.pending.requeue(ids);
            }
        }
    }

    fn finish_flow(&mut self, flow: &mut Flow) {
        self.close_container(flow);
        if flow.owns_block {
            self.leave_block(flow);
        }
    }
}

/// Cascade for the children of `tag`.
fn enter(cascade: &Cascade, tag: &str, is_link: bool) -> Cascade {
    Cascade {
        header: header_level(tag).or(cascade.header),
        bold: cascade.bold || is_bold_tag(tag),
        italic: cascade.italic || is_italic_tag(tag),
        underline: cascade.underline || is_underline_tag(tag),
        strikethrough: cascade.strikethrough || is_strikethrough_tag(tag),
        within_link: cascade.within_link || is_link,
        within_list: cascade.within_list || is_list_tag(tag),
    }
}
