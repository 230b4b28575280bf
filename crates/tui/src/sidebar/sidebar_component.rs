use std::sync::Arc;

use anyhow::Result;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::widgets::{Block, Borders, Paragraph};
use sidenav_types::{NavTree, NodeId, Outline};
use sidenav_util::SessionStore;
use tracing::debug;

use super::active_path::{expand_ancestors, resolve_active, rewrite_links};
use super::config::SidebarConfig;
use super::scroll_persistence::{save_offset, take_offset};
use super::state::{ScrollSource, SidebarSnapshot, SidebarState};
use super::view::row_lines;
use crate::component::{Component, Effect, SidebarEvent};

/// The table-of-contents sidebar.
///
/// Holds nothing but its injected inputs until [`Component::connected`] runs;
/// that hook performs the whole page-load pass:
///
/// 1. materialize the outline into a [`NavTree`],
/// 2. rewrite link targets with the page's root prefix,
/// 3. mark the link for the current page active,
/// 4. expand the sections above it,
/// 5. restore the scroll offset left by the previous page, or center the active entry.
///
/// Afterwards link activations save the scroll offset for the next page and
/// toggle activations flip their section.
pub struct SidebarScrollbox {
    config: SidebarConfig,
    outline: Outline,
    store: Arc<dyn SessionStore>,
    state: Option<SidebarState>,
}

impl SidebarScrollbox {
    pub fn new(config: SidebarConfig, outline: Outline, store: Arc<dyn SessionStore>) -> Self {
        Self {
            config,
            outline,
            store,
            state: None,
        }
    }

    pub fn config(&self) -> &SidebarConfig {
        &self.config
    }

    /// Page-load state; `None` until connected.
    pub fn state(&self) -> Option<&SidebarState> {
        self.state.as_ref()
    }

    pub fn snapshot(&self) -> Option<SidebarSnapshot> {
        self.state.as_ref().map(SidebarState::snapshot)
    }

    fn activate(&mut self, node: NodeId) -> Vec<Effect> {
        let Some(state) = self.state.as_mut() else {
            return Vec::new();
        };
        if state.tree.link(node).is_some() {
            // Only a click that leads somewhere hands the offset to the next page.
            let Some(target) = state.resolved_url(node).cloned() else {
                debug!("sidebar link has no resolvable target");
                return Vec::new();
            };
            save_offset(self.store.as_ref(), state.metrics.offset());
            return vec![Effect::Navigate(target)];
        }
        // Toggles flip their own section and never navigate.
        if let Some(expanded) = state.toggle_section(node) {
            debug!(expanded, "toggled sidebar section");
        }
        Vec::new()
    }
}

impl Component for SidebarScrollbox {
    fn connected(&mut self) -> Result<()> {
        let SidebarConfig {
            location,
            path_to_root,
            viewport_height,
            row_height,
            fold,
        } = &self.config;

        let mut tree = NavTree::materialize(&self.outline, fold);
        debug!(nodes = tree.len(), "materialized sidebar outline");

        let resolved = rewrite_links(&mut tree, path_to_root, location);
        let active = resolve_active(&mut tree, &resolved, location, path_to_root);
        if let Some(active) = active {
            let expanded = expand_ancestors(&mut tree, active);
            debug!(sections = expanded.len(), "expanded sections above the active entry");
        }

        let mut state = SidebarState::new(tree, resolved, *viewport_height, *row_height);
        match take_offset(self.store.as_ref()) {
            Some(offset) => {
                state.metrics.set_offset(offset);
                state.scroll_source = ScrollSource::Restored;
                debug!(offset, applied = state.metrics.offset(), "restored sidebar scroll offset");
            }
            None => {
                if state.center_on_active() {
                    state.scroll_source = ScrollSource::Centered;
                    debug!(offset = state.metrics.offset(), "centered sidebar on the active entry");
                }
            }
        }
        self.state = Some(state);
        Ok(())
    }

    fn handle_event(&mut self, event: SidebarEvent) -> Vec<Effect> {
        match event {
            SidebarEvent::Activate(node) => self.activate(node),
            SidebarEvent::ScrollBy(delta) => {
                if let Some(state) = self.state.as_mut() {
                    state.metrics.scroll_by(delta);
                }
                Vec::new()
            }
            SidebarEvent::FocusRow(row) => {
                if let Some(state) = self.state.as_mut() {
                    state.focus_row(row);
                }
                Vec::new()
            }
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default().title(" Contents ").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(state) = self.state.as_mut() else {
            return;
        };
        let row_height = state.row_height;
        state
            .metrics
            .update_viewport_height(u32::from(inner.height).saturating_mul(row_height));
        let first_row = u16::try_from(state.metrics.offset() / row_height).unwrap_or(u16::MAX);

        let paragraph = Paragraph::new(row_lines(state, inner.width)).scroll((first_row, 0));
        frame.render_widget(paragraph, inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use sidenav_types::OutlineEntry;
    use sidenav_util::{MemorySessionStore, SCROLL_KEY};
    use url::Url;

    fn sidebar(path: &str) -> SidebarScrollbox {
        let outline = Outline {
            entries: vec![
                OutlineEntry::page("1", "Intro", "intro.html"),
                OutlineEntry::page("2", "Usage", "usage.html"),
            ],
        };
        let location = Url::parse("https://docs.example.com/").unwrap().join(path).unwrap();
        let config = SidebarConfig::new(location, "").with_row_height(1).with_viewport_height(3);
        SidebarScrollbox::new(config, outline, Arc::new(MemorySessionStore::new()))
    }

    #[test]
    fn events_before_connect_are_ignored() {
        let mut sidebar = sidebar("usage.html");
        assert!(sidebar.state().is_none());
        assert!(sidebar.handle_event(SidebarEvent::ScrollBy(5)).is_empty());
        assert!(sidebar.handle_event(SidebarEvent::FocusRow(1)).is_empty());
    }

    #[test]
    fn renders_rows_inside_a_bordered_block() {
        let mut sidebar = sidebar("usage.html");
        sidebar.connected().unwrap();

        let mut terminal = Terminal::new(TestBackend::new(20, 4)).unwrap();
        terminal.draw(|frame| sidebar.render(frame, frame.area())).unwrap();

        let buffer = terminal.backend().buffer();
        let line = |y: u16| (0..20u16).map(|x| buffer[(x, y)].symbol()).collect::<String>();
        assert!(line(1).contains("  1. Intro"));
        assert!(line(2).contains("> 2. Usage"));
        assert_eq!(sidebar.state().unwrap().metrics().viewport_height(), 2);
    }

    #[test]
    fn unresolvable_link_neither_navigates_nor_saves() {
        let outline = Outline {
            entries: vec![
                OutlineEntry::page("1", "Intro", "intro.html"),
                OutlineEntry::page("2", "Broken", "http://[::1"),
            ],
        };
        let store = Arc::new(MemorySessionStore::new());
        let location = Url::parse("https://docs.example.com/intro.html").unwrap();
        let mut sidebar = SidebarScrollbox::new(SidebarConfig::new(location, ""), outline, store.clone());
        sidebar.connected().unwrap();

        let broken = sidebar.state().unwrap().tree().find_link("http://[::1").unwrap();
        assert!(sidebar.state().unwrap().resolved_url(broken).is_none());
        assert!(sidebar.handle_event(SidebarEvent::Activate(broken)).is_empty());
        assert_eq!(store.get(SCROLL_KEY).unwrap(), None);

        let intro = sidebar.state().unwrap().tree().find_link("intro.html").unwrap();
        assert_eq!(sidebar.handle_event(SidebarEvent::Activate(intro)).len(), 1);
        assert_eq!(store.get(SCROLL_KEY).unwrap().as_deref(), Some("0"));
    }
}
