//! HTML rendering of a [`NavTree`].
//!
//! Produces the same nested `<ol>`/`<li>` structure a static site embeds in its
//! sidebar, with the presentational state reflected as classes.

use std::fmt::Write;

use crate::tree::{ItemClass, ListKind, NavTree, NodeId, NodeKind};

impl NavTree {
    /// Renders the tree, including current `expanded` and `active` classes.
    pub fn render_html(&self) -> String {
        let mut out = String::new();
        self.write_node(self.root(), &mut out);
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let Some(kind) = self.kind(id) else {
            return;
        };
        match kind {
            NodeKind::List(list) => {
                let class = match list {
                    ListKind::Chapter => "chapter",
                    ListKind::Section => "section",
                };
                let _ = write!(out, r#"<ol class="{class}">"#);
                self.write_children(id, out);
                out.push_str("</ol>");
            }
            NodeKind::Item { class, expanded } => {
                let mut classes = match class {
                    ItemClass::ChapterItem => "chapter-item ".to_string(),
                    ItemClass::PartTitle => "part-title ".to_string(),
                    ItemClass::Spacer => "spacer ".to_string(),
                    ItemClass::SectionBody => String::new(),
                };
                if *expanded {
                    classes.push_str("expanded ");
                }
                if classes.is_empty() {
                    out.push_str("<li>");
                } else {
                    let _ = write!(out, r#"<li class="{classes}">"#);
                }
                self.write_children(id, out);
                out.push_str("</li>");
            }
            NodeKind::Link(link) => {
                let active = if link.is_active() { r#" class="active""# } else { "" };
                let _ = write!(out, r#"<a href="{}"{active}>"#, escape(&link.href));
                write_number(link.number.as_deref(), out);
                out.push_str(&escape(&link.label));
                out.push_str("</a>");
            }
            NodeKind::Label { number, label } => {
                if self.parent(id).and_then(|parent| self.item_class(parent)) == Some(ItemClass::PartTitle) {
                    out.push_str(&escape(label));
                } else {
                    out.push_str("<div>");
                    write_number(number.as_deref(), out);
                    out.push_str(&escape(label));
                    out.push_str("</div>");
                }
            }
            NodeKind::Toggle => out.push_str(r#"<a class="toggle"><div>❱</div></a>"#),
        }
    }

    fn write_children(&self, id: NodeId, out: &mut String) {
        for child in self.children(id) {
            self.write_node(*child, out);
        }
    }
}

fn write_number(number: Option<&str>, out: &mut String) {
    if let Some(number) = number {
        let _ = write!(out, r#"<strong aria-hidden="true">{}.</strong> "#, escape(number));
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use crate::outline::{FoldConfig, Outline, OutlineEntry};
    use crate::tree::NavTree;

    #[test]
    fn renders_sections_after_their_chapter() {
        let outline = Outline {
            entries: vec![OutlineEntry::section(
                "1",
                "Guide",
                "guide.html",
                vec![OutlineEntry::page("1.1", "A & B", "a.html")],
            )],
        };
        let mut tree = NavTree::materialize(&outline, &FoldConfig::default());
        let a = tree.find_link("a.html").unwrap();
        tree.mark_active(a);

        let html = tree.render_html();
        assert_eq!(
            html,
            concat!(
                r#"<ol class="chapter">"#,
                r#"<li class="chapter-item expanded "><a href="guide.html"><strong aria-hidden="true">1.</strong> Guide</a></li>"#,
                r#"<li><ol class="section">"#,
                r#"<li class="chapter-item expanded "><a href="a.html" class="active"><strong aria-hidden="true">1.1.</strong> A &amp; B</a></li>"#,
                r#"</ol></li></ol>"#,
            )
        );
    }

    #[test]
    fn folded_chapters_render_toggles() {
        let outline = Outline {
            entries: vec![OutlineEntry::section(
                "1",
                "Guide",
                "guide.html",
                vec![OutlineEntry::page("1.1", "Child", "child.html")],
            )],
        };
        let tree = NavTree::materialize(&outline, &FoldConfig::folded(0));
        let html = tree.render_html();
        assert!(html.contains(r#"<li class="chapter-item "><a href="guide.html">"#));
        assert!(html.contains(r#"<a class="toggle"><div>❱</div></a>"#));
    }
}
