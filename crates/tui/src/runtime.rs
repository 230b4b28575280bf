//! Interactive terminal runtime.
//!
//! Simulates a reader moving through a statically generated book: the sidebar
//! is drawn on the left, and every navigation builds a fresh
//! [`SidebarScrollbox`] for the target page, exactly as a browser would on a
//! new page load. The session store outlives those loads, so the scroll
//! hand-off between pages behaves as it does in a browser tab.
//!
//! Keys: `↑/↓` (or `k/j`) move the cursor, `Enter` activates, `Space`
//! toggles a section, `PgUp/PgDn` scroll, `b` goes back without a sidebar
//! click, `q`/`Esc` quit.

use std::io::Stdout;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::prelude::CrosstermBackend;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use sidenav_types::{FoldConfig, Outline};
use sidenav_util::{SessionStore, path_to_root};
use tracing::info;
use url::Url;

use crate::component::{Component, Effect, SidebarEvent};
use crate::sidebar::{ScrollSource, SidebarConfig, SidebarScrollbox};

const SIDEBAR_WIDTH: u16 = 42;
const WHEEL_ROWS: i64 = 3;

/// Inputs for an interactive session.
#[derive(Debug, Clone)]
pub struct BrowseOptions {
    /// Page opened first.
    pub location: Url,
    /// Directory URL of the book; used to derive each page's root prefix.
    pub site_root: Url,
    pub outline: Outline,
    pub fold: FoldConfig,
}

enum Flow {
    Continue,
    Exit,
}

struct BrowserSession {
    options: BrowseOptions,
    store: Arc<dyn SessionStore>,
    location: Url,
    sidebar: SidebarScrollbox,
    history: Vec<Url>,
    sidebar_inner: Rect,
}

impl BrowserSession {
    fn open(options: BrowseOptions, store: Arc<dyn SessionStore>, viewport_rows: u16) -> Result<Self> {
        let location = options.location.clone();
        let sidebar = Self::page_load(&options, &store, &location, viewport_rows)?;
        Ok(Self {
            options,
            store,
            location,
            sidebar,
            history: Vec::new(),
            sidebar_inner: Rect::default(),
        })
    }

    fn page_load(
        options: &BrowseOptions,
        store: &Arc<dyn SessionStore>,
        location: &Url,
        viewport_rows: u16,
    ) -> Result<SidebarScrollbox> {
        let prefix = path_to_root(&options.site_root, location);
        let config = SidebarConfig::new(location.clone(), prefix)
            .with_row_height(1)
            .with_viewport_height(u32::from(viewport_rows))
            .with_fold(options.fold);
        let mut sidebar = SidebarScrollbox::new(config, options.outline.clone(), Arc::clone(store));
        sidebar.connected().context("failed to attach sidebar")?;
        focus_initial_row(&mut sidebar);
        info!(page = %location, "loaded page");
        Ok(sidebar)
    }

    fn navigate(&mut self, target: Url, record_history: bool) -> Result<()> {
        let viewport_rows = self.sidebar_inner.height;
        let sidebar = Self::page_load(&self.options, &self.store, &target, viewport_rows)?;
        if record_history {
            self.history.push(std::mem::replace(&mut self.location, target));
        } else {
            self.location = target;
        }
        self.sidebar = sidebar;
        Ok(())
    }

    fn apply(&mut self, effects: Vec<Effect>) -> Result<()> {
        for effect in effects {
            match effect {
                Effect::Navigate(target) => self.navigate(target, true)?,
            }
        }
        Ok(())
    }

    fn focused_row(&self) -> usize {
        self.sidebar.state().and_then(|state| state.focused_row()).unwrap_or(0)
    }

    /// Activates the content of a row: a link navigates, a draft does nothing.
    fn activate_row(&mut self, row: usize) -> Result<()> {
        let Some(content) = self.row_node(row, false) else {
            return Ok(());
        };
        let effects = self.sidebar.handle_event(SidebarEvent::Activate(content));
        self.apply(effects)
    }

    fn toggle_row(&mut self, row: usize) {
        if let Some(toggle) = self.row_node(row, true) {
            self.sidebar.handle_event(SidebarEvent::Activate(toggle));
        }
    }

    fn row_node(&self, row: usize, toggle: bool) -> Option<sidenav_types::NodeId> {
        let state = self.sidebar.state()?;
        let item = state.rows().get(row)?.item;
        if toggle { state.tree().item_toggle(item) } else { state.tree().item_content(item) }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<Flow> {
        if key.kind != KeyEventKind::Press {
            return Ok(Flow::Continue);
        }
        let row = self.focused_row();
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(Flow::Exit),
            KeyCode::Char('q') | KeyCode::Esc => return Ok(Flow::Exit),
            KeyCode::Down | KeyCode::Char('j') => {
                self.sidebar.handle_event(SidebarEvent::FocusRow(row + 1));
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.sidebar.handle_event(SidebarEvent::FocusRow(row.saturating_sub(1)));
            }
            KeyCode::Home => {
                self.sidebar.handle_event(SidebarEvent::FocusRow(0));
            }
            KeyCode::End => {
                self.sidebar.handle_event(SidebarEvent::FocusRow(usize::MAX));
            }
            KeyCode::PageDown => {
                self.sidebar.handle_event(SidebarEvent::ScrollBy(i64::from(self.sidebar_inner.height)));
            }
            KeyCode::PageUp => {
                self.sidebar.handle_event(SidebarEvent::ScrollBy(-i64::from(self.sidebar_inner.height)));
            }
            KeyCode::Enter => self.activate_row(row)?,
            KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right => self.toggle_row(row),
            KeyCode::Char('b') | KeyCode::Backspace => {
                if let Some(previous) = self.history.pop() {
                    self.navigate(previous, false)?;
                }
            }
            _ => {}
        }
        Ok(Flow::Continue)
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Result<()> {
        match mouse.kind {
            MouseEventKind::ScrollDown => {
                self.sidebar.handle_event(SidebarEvent::ScrollBy(WHEEL_ROWS));
            }
            MouseEventKind::ScrollUp => {
                self.sidebar.handle_event(SidebarEvent::ScrollBy(-WHEEL_ROWS));
            }
            MouseEventKind::Down(MouseButton::Left) => {
                let inner = self.sidebar_inner;
                let inside = mouse.column >= inner.x
                    && mouse.column < inner.x + inner.width
                    && mouse.row >= inner.y
                    && mouse.row < inner.y + inner.height;
                if !inside {
                    return Ok(());
                }
                let offset = self.sidebar.state().map(|state| state.metrics().offset()).unwrap_or(0);
                let row = offset as usize + usize::from(mouse.row - inner.y);
                self.sidebar.handle_event(SidebarEvent::FocusRow(row));
                self.activate_row(row)?;
            }
            _ => {}
        }
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        let [sidebar_area, page_area] =
            Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)]).areas(frame.area());
        self.sidebar_inner = Block::default().borders(Borders::ALL).inner(sidebar_area);
        self.sidebar.render(frame, sidebar_area);

        let mut lines = vec![
            Line::from(format!("Page: {}", self.location)),
            Line::from(format!("Path to root: {:?}", self.sidebar.config().path_to_root.as_str())),
        ];
        if let Some(state) = self.sidebar.state() {
            let scroll = match state.scroll_source() {
                ScrollSource::Restored => "restored from the previous page",
                ScrollSource::Centered => "centered on the active entry",
                ScrollSource::None => "top",
            };
            lines.push(Line::from(format!("Sidebar scroll: {} ({scroll})", state.metrics().offset())));
            let active = state.snapshot().active.map(|active| active.label).unwrap_or_else(|| "none".into());
            lines.push(Line::from(format!("Active entry: {active}")));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(
            "↑/↓ move  Enter open  Space toggle  PgUp/PgDn scroll  b back  q quit",
        ));
        let page = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().title(" Page ").borders(Borders::ALL));
        frame.render_widget(page, page_area);
    }
}

/// Focuses the active row when it is on screen, otherwise the first visible row.
fn focus_initial_row(sidebar: &mut SidebarScrollbox) {
    let Some(state) = sidebar.state() else {
        return;
    };
    let metrics = state.metrics();
    let first_visible = metrics.offset() as usize;
    let last_visible = first_visible + (metrics.viewport_height() as usize).saturating_sub(1);
    let row = state
        .tree()
        .active_link()
        .and_then(|link| state.row_of(link))
        .filter(|row| (first_visible..=last_visible).contains(row))
        .unwrap_or(first_visible);
    sidebar.handle_event(SidebarEvent::FocusRow(row));
}

/// Put the terminal into raw mode and enter the alternate screen.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal settings and leave the alternate screen.
fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Runs the interactive browser until the user quits.
pub fn run(options: BrowseOptions, store: Arc<dyn SessionStore>) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, options, store);
    cleanup_terminal(&mut terminal)?;
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    options: BrowseOptions,
    store: Arc<dyn SessionStore>,
) -> Result<()> {
    // Borders take two rows.
    let viewport_rows = terminal.size()?.height.saturating_sub(2);
    let mut session = BrowserSession::open(options, store, viewport_rows)?;
    loop {
        terminal.draw(|frame| session.render(frame))?;
        let flow = match event::read()? {
            Event::Key(key) => session.handle_key(key)?,
            Event::Mouse(mouse) => {
                session.handle_mouse(mouse)?;
                Flow::Continue
            }
            _ => Flow::Continue,
        };
        if let Flow::Exit = flow {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use sidenav_util::{MemorySessionStore, SCROLL_KEY};

    const BOOK: &str = "https://docs.example.com/book/";
    const VIEWPORT_ROWS: u16 = 10;

    fn page(path: &str) -> Url {
        Url::parse(BOOK).unwrap().join(path).unwrap()
    }

    fn open(path: &str, store: &Arc<MemorySessionStore>) -> BrowserSession {
        let options = BrowseOptions {
            location: page(path),
            site_root: page(""),
            outline: Outline::embedded().unwrap(),
            fold: FoldConfig::default(),
        };
        let store: Arc<dyn SessionStore> = store.clone();
        let mut session = BrowserSession::open(options, store, VIEWPORT_ROWS).unwrap();
        // Two border rows around the sidebar viewport.
        let mut terminal = Terminal::new(TestBackend::new(80, VIEWPORT_ROWS + 2)).unwrap();
        terminal.draw(|frame| session.render(frame)).unwrap();
        session
    }

    fn press(session: &mut BrowserSession, code: KeyCode) {
        session.handle_key(KeyEvent::new(code, KeyModifiers::NONE)).unwrap();
    }

    fn offset(session: &BrowserSession) -> u32 {
        session.sidebar.state().unwrap().metrics().offset()
    }

    fn scroll_source(session: &BrowserSession) -> ScrollSource {
        session.sidebar.state().unwrap().scroll_source()
    }

    fn row_target(session: &BrowserSession, row: usize) -> Url {
        let state = session.sidebar.state().unwrap();
        let link = state.tree().item_content(state.rows()[row].item).unwrap();
        state.resolved_url(link).unwrap().clone()
    }

    #[test]
    fn navigation_recomputes_the_root_prefix() {
        let store = Arc::new(MemorySessionStore::new());
        let mut session = open("introduction.html", &store);
        assert_eq!(session.sidebar.config().path_to_root.as_str(), "");

        session.navigate(page("guide/nested.html"), true).unwrap();
        assert_eq!(session.sidebar.config().path_to_root.as_str(), "../");
        assert_eq!(session.location, page("guide/nested.html"));
        assert_eq!(session.history, [page("introduction.html")]);
        assert_eq!(session.sidebar.config().viewport_height, u32::from(VIEWPORT_ROWS));
    }

    #[test]
    fn enter_hands_the_offset_to_the_next_page() {
        let store = Arc::new(MemorySessionStore::new());
        let mut session = open("configuration.html", &store);
        assert_eq!(scroll_source(&session), ScrollSource::Centered);
        let before = offset(&session);
        let active_row = session.focused_row();

        press(&mut session, KeyCode::Down);
        assert_eq!(session.focused_row(), active_row + 1);
        let target = row_target(&session, active_row + 1);

        press(&mut session, KeyCode::Enter);
        assert_eq!(session.location, target);
        assert_eq!(session.history, [page("configuration.html")]);
        assert_eq!(scroll_source(&session), ScrollSource::Restored);
        assert_eq!(offset(&session), before);
        assert_eq!(store.get(SCROLL_KEY).unwrap(), None);
    }

    #[test]
    fn going_back_does_not_save_an_offset() {
        let store = Arc::new(MemorySessionStore::new());
        let mut session = open("configuration.html", &store);
        let centered = offset(&session);
        press(&mut session, KeyCode::Down);
        press(&mut session, KeyCode::Enter);

        press(&mut session, KeyCode::Char('b'));
        assert_eq!(session.location, page("configuration.html"));
        assert!(session.history.is_empty());
        assert_eq!(scroll_source(&session), ScrollSource::Centered);
        assert_eq!(offset(&session), centered);
        assert_eq!(store.get(SCROLL_KEY).unwrap(), None);

        // Nothing left to go back to.
        press(&mut session, KeyCode::Backspace);
        assert_eq!(session.location, page("configuration.html"));
    }

    #[test]
    fn mouse_click_maps_terminal_row_through_the_scroll_offset() {
        let store = Arc::new(MemorySessionStore::new());
        let mut session = open("configuration.html", &store);
        let inner = session.sidebar_inner;
        assert_eq!(inner.height, VIEWPORT_ROWS);
        let scrolled = offset(&session);
        assert!(scrolled > 0);

        let click = |column: u16, row: u16| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        };

        // Outside the sidebar viewport: nothing happens.
        session.handle_mouse(click(inner.x + inner.width + 5, inner.y + 2)).unwrap();
        assert_eq!(session.location, page("configuration.html"));

        let target = row_target(&session, scrolled as usize + 2);
        session.handle_mouse(click(inner.x + 1, inner.y + 2)).unwrap();
        assert_eq!(session.location, target);
        assert_eq!(scroll_source(&session), ScrollSource::Restored);
        assert_eq!(offset(&session), scrolled);
    }
}
