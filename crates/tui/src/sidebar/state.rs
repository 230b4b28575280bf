use serde::Serialize;
use sidenav_types::{NavTree, NodeId, NodeKind, Row};

use super::active_path::ResolvedLinks;
use crate::scroll_metrics::ScrollMetrics;

/// How the scroll offset was chosen during the last page load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollSource {
    /// Nothing to restore and no active entry to center.
    #[default]
    None,
    /// Restored from the offset saved by the previous page.
    Restored,
    /// Centered on the active entry.
    Centered,
}

/// Page-load state of a connected sidebar.
#[derive(Debug, Clone)]
pub struct SidebarState {
    pub(crate) tree: NavTree,
    pub(crate) resolved: ResolvedLinks,
    pub(crate) metrics: ScrollMetrics,
    pub(crate) row_height: u32,
    pub(crate) focused_row: Option<usize>,
    pub(crate) scroll_source: ScrollSource,
}

impl SidebarState {
    pub(crate) fn new(tree: NavTree, resolved: ResolvedLinks, viewport_height: u32, row_height: u32) -> Self {
        let mut state = Self {
            tree,
            resolved,
            metrics: ScrollMetrics::new(viewport_height, 0),
            row_height: row_height.max(1),
            focused_row: None,
            scroll_source: ScrollSource::None,
        };
        state.refresh_content_height();
        state
    }

    pub fn tree(&self) -> &NavTree {
        &self.tree
    }

    pub fn metrics(&self) -> &ScrollMetrics {
        &self.metrics
    }

    pub fn scroll_source(&self) -> ScrollSource {
        self.scroll_source
    }

    pub fn focused_row(&self) -> Option<usize> {
        self.focused_row
    }

    /// Resolved absolute URL of a link.
    pub fn resolved_url(&self, link: NodeId) -> Option<&url::Url> {
        self.resolved.get(&link)
    }

    pub fn rows(&self) -> Vec<Row> {
        self.tree.visible_rows()
    }

    /// Recomputes the content height after the set of visible rows changed.
    pub(crate) fn refresh_content_height(&mut self) {
        let rows = u32::try_from(self.rows().len()).unwrap_or(u32::MAX);
        self.metrics.update_content_height(rows.saturating_mul(self.row_height));
    }

    pub(crate) fn row_top(&self, row: usize) -> u32 {
        u32::try_from(row).unwrap_or(u32::MAX).saturating_mul(self.row_height)
    }

    /// Row index of the item that displays `node` (an item, link or label).
    pub fn row_of(&self, node: NodeId) -> Option<usize> {
        let item = if self.tree.item_class(node).is_some() { node } else { self.tree.parent(node)? };
        self.rows().iter().position(|row| row.item == item)
    }

    /// Scrolls the active entry into the vertical center of the viewport.
    pub(crate) fn center_on_active(&mut self) -> bool {
        let Some(row) = self.tree.active_link().and_then(|link| self.row_of(link)) else {
            return false;
        };
        let top = self.row_top(row);
        self.metrics.center_on(top, self.row_height);
        true
    }

    /// Flips the item containing `toggle`. Returns the new expanded flag.
    pub(crate) fn toggle_section(&mut self, toggle: NodeId) -> Option<bool> {
        if !matches!(self.tree.kind(toggle), Some(NodeKind::Toggle)) {
            return None;
        }
        let item = self.tree.parent(toggle)?;
        let expanded = self.tree.toggle_expanded(item)?;
        self.refresh_content_height();
        if let Some(focused) = self.focused_row {
            let last = self.rows().len().saturating_sub(1);
            self.focused_row = Some(focused.min(last));
        }
        Some(expanded)
    }

    /// Moves keyboard focus and keeps the focused row inside the viewport.
    pub(crate) fn focus_row(&mut self, row: usize) {
        let count = self.rows().len();
        if count == 0 {
            self.focused_row = None;
            return;
        }
        let row = row.min(count - 1);
        self.focused_row = Some(row);
        let top = self.row_top(row);
        self.metrics.ensure_visible(top, self.row_height);
    }

    /// Serializable summary of the current presentation state.
    pub fn snapshot(&self) -> SidebarSnapshot {
        let active = self.tree.active_link().and_then(|id| {
            let link = self.tree.link(id)?;
            Some(ActiveEntry {
                label: link.label.clone(),
                href: link.href.clone(),
                url: self.resolved.get(&id).map(ToString::to_string),
            })
        });
        let expanded = self
            .tree
            .expanded_items()
            .into_iter()
            .filter(|id| self.tree.is_chapter_item(*id))
            .filter_map(|id| self.tree.label(id).map(str::to_string))
            .collect();
        SidebarSnapshot {
            active,
            expanded,
            scroll_top: self.metrics.offset(),
            scroll_source: self.scroll_source,
        }
    }
}

/// The active entry as reported in a [`SidebarSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveEntry {
    pub label: String,
    /// Target after root-prefix rewriting.
    pub href: String,
    /// Fully resolved URL.
    pub url: Option<String>,
}

/// Presentation state after a page load, suitable for printing as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidebarSnapshot {
    pub active: Option<ActiveEntry>,
    /// Labels of expanded chapter items in document order.
    pub expanded: Vec<String>,
    pub scroll_top: u32,
    pub scroll_source: ScrollSource,
}
