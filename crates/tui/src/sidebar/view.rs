//! Turns sidebar rows into styled ratatui lines.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use sidenav_types::{ItemClass, NavTree, NodeKind, Row};
use unicode_width::UnicodeWidthStr;

use super::state::SidebarState;

const ACTIVE_GUTTER: &str = "> ";
const PLAIN_GUTTER: &str = "  ";
const INDENT: &str = "  ";

/// Builds one line per visible row, truncated to `width` columns.
pub fn row_lines(state: &SidebarState, width: u16) -> Vec<Line<'static>> {
    state
        .rows()
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let focused = state.focused_row() == Some(index);
            row_line(state.tree(), row, focused, usize::from(width))
        })
        .collect()
}

/// Plain text rendering of all visible rows, for non-interactive output.
pub fn plain_lines(state: &SidebarState) -> Vec<String> {
    row_lines(state, u16::MAX)
        .into_iter()
        .map(|line| line.spans.iter().map(|span| span.content.as_ref()).collect::<String>().trim_end().to_string())
        .collect()
}

fn row_line(tree: &NavTree, row: &Row, focused: bool, width: usize) -> Line<'static> {
    let item = row.item;
    let indent = INDENT.repeat(row.depth as usize);
    let content = tree.item_content(item);
    let active = content.and_then(|id| tree.link(id)).is_some_and(|link| link.is_active());

    let mut spans = vec![Span::raw(if active { ACTIVE_GUTTER } else { PLAIN_GUTTER }), Span::raw(indent)];
    let marker = match tree.item_toggle(item) {
        Some(_) if tree.is_expanded(item) => "▾ ",
        Some(_) => "▸ ",
        None => "",
    };
    spans.push(Span::styled(marker, Style::default().fg(Color::DarkGray)));

    let (text, style) = match tree.item_class(item) {
        Some(ItemClass::Spacer) => ("─".repeat(8), Style::default().fg(Color::DarkGray)),
        Some(ItemClass::PartTitle) => (
            tree.label(item).unwrap_or_default().to_string(),
            Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        ),
        _ => {
            let number = tree.number(item).map(|number| format!("{number}. ")).unwrap_or_default();
            let label = tree.label(item).unwrap_or_default();
            let style = match content.and_then(|id| tree.kind(id)) {
                Some(NodeKind::Label { .. }) => Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                _ if active => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                _ => Style::default(),
            };
            (format!("{number}{label}"), style)
        }
    };
    let used: usize = spans.iter().map(|span| span.content.width()).sum();
    spans.push(Span::styled(truncate(&text, width.saturating_sub(used)), style));

    let line = Line::from(spans);
    if focused {
        line.style(Style::default().add_modifier(Modifier::REVERSED))
    } else {
        line
    }
}

fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let ch_width = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + ch_width + 1 > max_width {
            break;
        }
        out.push(ch);
        used += ch_width;
    }
    if max_width > 0 {
        out.push('…');
    }
    out
}
