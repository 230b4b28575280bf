//! Component abstraction for the sidebar.
//!
//! A component owns its local state, is initialized once through the
//! `connected` lifecycle hook, reacts to events by mutating that state and
//! reporting [`Effect`]s, and renders itself into a provided `Rect`.

use anyhow::Result;
use ratatui::Frame;
use ratatui::layout::Rect;
use sidenav_types::NodeId;
use url::Url;

/// Input delivered to a component after it is connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarEvent {
    /// The user activated (clicked) a node: a link, a toggle, or anything else.
    Activate(NodeId),
    /// The user scrolled the viewport by the given number of pixels.
    ScrollBy(i64),
    /// Keyboard focus moved to the given visible row.
    FocusRow(usize),
}

/// Side effects a component asks its host to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Navigate the page to the given URL.
    Navigate(Url),
}

/// A UI component with a single lifecycle hook.
pub trait Component {
    /// Runs once when the component is attached to the page.
    ///
    /// Everything the component needs (configuration, storage) is injected at
    /// construction, so this hook does all of its work synchronously.
    fn connected(&mut self) -> Result<()> {
        Ok(())
    }

    /// Handles an event and returns the effects the host should perform.
    ///
    /// Handlers never block; failures are logged and swallowed so that the
    /// host's own reaction (navigation, for instance) is never delayed.
    fn handle_event(&mut self, _event: SidebarEvent) -> Vec<Effect> {
        Vec::new()
    }

    /// Draws the component into `area`.
    fn render(&mut self, frame: &mut Frame, area: Rect);
}
