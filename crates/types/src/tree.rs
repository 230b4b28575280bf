//! Arena-backed navigation tree.
//!
//! The tree mirrors the sidebar markup: an ordered list of list items, where a
//! chapter with children is a `ChapterItem` followed by a sibling `SectionBody`
//! item that holds the nested list. Nodes keep a non-owning parent index so
//! upward walks never need live-tree inspection.
//!
//! The shape is fixed by [`NavTree::materialize`]. Afterwards only the
//! presentational state (expanded items, the active link and rewritten link
//! targets) can change.

use serde::Serialize;

use crate::outline::{FoldConfig, Outline, OutlineEntry};

/// Index of a node inside a [`NavTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

/// The two list flavors of the markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// The top-level list.
    Chapter,
    /// A nested list inside a section body.
    Section,
}

/// Classification of a list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemClass {
    /// A collapsible chapter row holding a link or a draft label.
    ChapterItem,
    /// A wrapper item holding the nested list of the preceding chapter.
    SectionBody,
    /// A non-clickable part heading.
    PartTitle,
    /// A visual spacer.
    Spacer,
}

/// A navigable entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkNode {
    /// Target as written in the outline.
    pub original_href: String,
    /// Current target; equals `original_href` until the path rewriter runs.
    pub href: String,
    /// Section number shown before the label.
    pub number: Option<String>,
    /// Display label.
    pub label: String,
    active: bool,
}

impl LinkNode {
    /// Whether this link carries the active marker.
    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// Payload of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    List(ListKind),
    Item { class: ItemClass, expanded: bool },
    Link(LinkNode),
    /// Plain text: draft chapters and part titles.
    Label { number: Option<String>, label: String },
    /// Toggle affordance flipping its containing item.
    Toggle,
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// One rendered row of the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row {
    /// The list item displayed on this row.
    pub item: NodeId,
    /// Nesting depth, `0` for top-level rows.
    pub depth: u32,
}

/// Navigation tree with parent back-references.
#[derive(Debug, Clone)]
pub struct NavTree {
    nodes: Vec<Node>,
}

impl NavTree {
    /// Builds the tree for `outline`, applying the initial fold state.
    pub fn materialize(outline: &Outline, fold: &FoldConfig) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        let root = tree.push(None, NodeKind::List(ListKind::Chapter));
        tree.append_entries(root, &outline.entries, 1, fold);
        tree
    }

    fn push(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            kind,
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    fn append_entries(&mut self, list: NodeId, entries: &[OutlineEntry], level: u32, fold: &FoldConfig) {
        for entry in entries {
            match entry {
                OutlineEntry::Chapter {
                    number,
                    label,
                    href,
                    children,
                } => {
                    let item = self.push(
                        Some(list),
                        NodeKind::Item {
                            class: ItemClass::ChapterItem,
                            expanded: fold.starts_expanded(level),
                        },
                    );
                    let content = match href {
                        Some(href) => NodeKind::Link(LinkNode {
                            original_href: href.clone(),
                            href: href.clone(),
                            number: number.clone(),
                            label: label.clone(),
                            active: false,
                        }),
                        None => NodeKind::Label {
                            number: number.clone(),
                            label: label.clone(),
                        },
                    };
                    self.push(Some(item), content);
                    if children.is_empty() {
                        continue;
                    }
                    if fold.enable {
                        self.push(Some(item), NodeKind::Toggle);
                    }
                    let body = self.push(
                        Some(list),
                        NodeKind::Item {
                            class: ItemClass::SectionBody,
                            expanded: false,
                        },
                    );
                    let nested = self.push(Some(body), NodeKind::List(ListKind::Section));
                    self.append_entries(nested, children, level + 1, fold);
                }
                OutlineEntry::PartTitle { label } => {
                    let item = self.push(
                        Some(list),
                        NodeKind::Item {
                            class: ItemClass::PartTitle,
                            expanded: false,
                        },
                    );
                    self.push(
                        Some(item),
                        NodeKind::Label {
                            number: None,
                            label: label.clone(),
                        },
                    );
                }
                OutlineEntry::Separator => {
                    self.push(
                        Some(list),
                        NodeKind::Item {
                            class: ItemClass::Spacer,
                            expanded: false,
                        },
                    );
                }
            }
        }
    }

    /// The top-level list.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.0).map(|node| &node.kind)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id.0).map(|node| node.children.as_slice()).unwrap_or(&[])
    }

    /// The sibling immediately before `id` inside the same parent.
    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let position = siblings.iter().position(|sibling| *sibling == id)?;
        position.checked_sub(1).map(|previous| siblings[previous])
    }

    /// The class of a list item, or `None` when `id` is not an item.
    pub fn item_class(&self, id: NodeId) -> Option<ItemClass> {
        match self.kind(id)? {
            NodeKind::Item { class, .. } => Some(*class),
            _ => None,
        }
    }

    pub fn is_chapter_item(&self, id: NodeId) -> bool {
        self.item_class(id) == Some(ItemClass::ChapterItem)
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        matches!(self.kind(id), Some(NodeKind::Item { expanded: true, .. }))
    }

    /// Sets the expanded flag of an item. Returns `false` when `id` is not an item.
    pub fn set_expanded(&mut self, id: NodeId, value: bool) -> bool {
        match self.nodes.get_mut(id.0).map(|node| &mut node.kind) {
            Some(NodeKind::Item { expanded, .. }) => {
                *expanded = value;
                true
            }
            _ => false,
        }
    }

    /// Flips the expanded flag of an item and returns the new value.
    pub fn toggle_expanded(&mut self, id: NodeId) -> Option<bool> {
        match self.nodes.get_mut(id.0).map(|node| &mut node.kind) {
            Some(NodeKind::Item { expanded, .. }) => {
                *expanded = !*expanded;
                Some(*expanded)
            }
            _ => None,
        }
    }

    /// All items currently expanded, in document order.
    pub fn expanded_items(&self) -> Vec<NodeId> {
        self.preorder().filter(|id| self.is_expanded(*id)).collect()
    }

    pub fn link(&self, id: NodeId) -> Option<&LinkNode> {
        match self.kind(id)? {
            NodeKind::Link(link) => Some(link),
            _ => None,
        }
    }

    /// Replaces the current target of a link.
    pub fn set_href(&mut self, id: NodeId, href: String) {
        if let Some(NodeKind::Link(link)) = self.nodes.get_mut(id.0).map(|node| &mut node.kind) {
            link.href = href;
        }
    }

    /// Marks `id` active, clearing any previous marker so at most one link is active.
    pub fn mark_active(&mut self, id: NodeId) -> bool {
        if self.link(id).is_none() {
            return false;
        }
        self.clear_active();
        if let NodeKind::Link(link) = &mut self.nodes[id.0].kind {
            link.active = true;
        }
        true
    }

    pub fn clear_active(&mut self) {
        for node in &mut self.nodes {
            if let NodeKind::Link(link) = &mut node.kind {
                link.active = false;
            }
        }
    }

    pub fn active_link(&self) -> Option<NodeId> {
        self.links().into_iter().find(|id| self.link(*id).is_some_and(LinkNode::is_active))
    }

    /// Links in document order. Toggles and draft labels are not links.
    pub fn links(&self) -> Vec<NodeId> {
        self.preorder().filter(|id| self.link(*id).is_some()).collect()
    }

    /// Toggle affordances in document order.
    pub fn toggles(&self) -> Vec<NodeId> {
        self.preorder().filter(|id| matches!(self.kind(*id), Some(NodeKind::Toggle))).collect()
    }

    /// First link whose outline target equals `href`.
    pub fn find_link(&self, href: &str) -> Option<NodeId> {
        self.links()
            .into_iter()
            .find(|id| self.link(*id).is_some_and(|link| link.original_href == href))
    }

    /// The link or label displayed by an item, if any.
    pub fn item_content(&self, item: NodeId) -> Option<NodeId> {
        self.children(item)
            .iter()
            .copied()
            .find(|child| matches!(self.kind(*child), Some(NodeKind::Link(_) | NodeKind::Label { .. })))
    }

    /// The toggle inside an item, if any.
    pub fn item_toggle(&self, item: NodeId) -> Option<NodeId> {
        self.children(item)
            .iter()
            .copied()
            .find(|child| matches!(self.kind(*child), Some(NodeKind::Toggle)))
    }

    /// Display label of an item or of the link/label node itself.
    pub fn label(&self, id: NodeId) -> Option<&str> {
        let target = if self.item_class(id).is_some() { self.item_content(id)? } else { id };
        match self.kind(target)? {
            NodeKind::Link(link) => Some(&link.label),
            NodeKind::Label { label, .. } => Some(label),
            _ => None,
        }
    }

    /// Number prefix of an item or of the link/label node itself.
    pub fn number(&self, id: NodeId) -> Option<&str> {
        let target = if self.item_class(id).is_some() { self.item_content(id)? } else { id };
        match self.kind(target)? {
            NodeKind::Link(link) => link.number.as_deref(),
            NodeKind::Label { number, .. } => number.as_deref(),
            _ => None,
        }
    }

    /// Rows that are displayed given the current expanded flags.
    ///
    /// A section body is hidden when its preceding sibling item exists and is
    /// not expanded; everything nested inside a hidden body is hidden too.
    pub fn visible_rows(&self) -> Vec<Row> {
        let mut rows = Vec::new();
        self.collect_rows(self.root(), 0, &mut rows);
        rows
    }

    fn collect_rows(&self, list: NodeId, depth: u32, rows: &mut Vec<Row>) {
        for item in self.children(list).iter().copied() {
            match self.item_class(item) {
                Some(ItemClass::SectionBody) => {
                    let hidden = self.previous_sibling(item).is_some_and(|previous| !self.is_expanded(previous));
                    if hidden {
                        continue;
                    }
                    for nested in self.children(item).iter().copied() {
                        if matches!(self.kind(nested), Some(NodeKind::List(_))) {
                            self.collect_rows(nested, depth + 1, rows);
                        }
                    }
                }
                Some(_) => rows.push(Row { item, depth }),
                None => {}
            }
        }
    }

    /// Nesting depth of `id`: the number of section lists above it.
    ///
    /// Top-level items and their content are at depth `0`; this matches
    /// [`Row::depth`] for every visible row.
    pub fn depth(&self, id: NodeId) -> u32 {
        let sections = self
            .ancestors(id)
            .filter(|ancestor| matches!(self.kind(*ancestor), Some(NodeKind::List(ListKind::Section))))
            .count();
        u32::try_from(sections).unwrap_or(u32::MAX)
    }

    /// Nodes in document (pre-)order.
    pub fn preorder(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = if self.nodes.is_empty() { Vec::new() } else { vec![self.root()] };
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(self.children(next).iter().rev().copied());
            Some(next)
        })
    }

    /// Chain of ancestors starting with the parent of `id` and ending at the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }
}
