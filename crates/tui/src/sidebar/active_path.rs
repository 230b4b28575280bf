//! Link rewriting, active-link resolution and ancestor expansion.
//!
//! These run in this order on every page load: links must be rewritten and
//! resolved before they can be compared with the current page, and expansion
//! starts from whatever link resolution marked active.

use std::collections::BTreeMap;

use sidenav_types::{ItemClass, NavTree, NodeId};
use sidenav_util::{PathPrefix, current_page, resolve};
use tracing::debug;
use url::Url;

/// Absolute URL of each link after rewriting, keyed by link node.
pub type ResolvedLinks = BTreeMap<NodeId, Url>;

/// Prepends `prefix` to every same-site relative link and resolves all links against `location`.
pub fn rewrite_links(tree: &mut NavTree, prefix: &PathPrefix, location: &Url) -> ResolvedLinks {
    let mut resolved = ResolvedLinks::new();
    for id in tree.links() {
        let Some(link) = tree.link(id) else {
            continue;
        };
        let href = prefix.rewrite(&link.original_href);
        if let Some(url) = resolve(location, &href) {
            resolved.insert(id, url);
        }
        tree.set_href(id, href);
    }
    resolved
}

/// Marks the link for the current page active and returns it.
///
/// The first link, in document order, whose resolved URL equals the
/// normalized current page wins. On a root-level page whose URL is the index
/// document, the very first link is treated as the index alias. When the
/// winning link sits directly in a chapter item, that item is expanded too.
pub fn resolve_active(
    tree: &mut NavTree,
    resolved: &ResolvedLinks,
    location: &Url,
    prefix: &PathPrefix,
) -> Option<NodeId> {
    let page = current_page(location);
    let on_root_index = prefix.is_empty() && page.path().ends_with("/index.html");

    let active = tree
        .links()
        .into_iter()
        .enumerate()
        .find(|(position, id)| resolved.get(id) == Some(&page) || (*position == 0 && on_root_index))
        .map(|(_, id)| id);

    let Some(active) = active else {
        tree.clear_active();
        debug!(page = %page, "no sidebar entry matches the current page");
        return None;
    };

    tree.mark_active(active);
    if let Some(item) = tree.parent(active)
        && tree.is_chapter_item(item)
    {
        tree.set_expanded(item, true);
    }
    debug!(page = %page, label = tree.label(active).unwrap_or_default(), "resolved active sidebar entry");
    Some(active)
}

/// Expands every section on the containment path of `link`.
///
/// Walking up from the link, each section body met on the way has its
/// preceding chapter item expanded. Sections off the path are left alone.
/// Returns the expanded chapter items, innermost first.
pub fn expand_ancestors(tree: &mut NavTree, link: NodeId) -> Vec<NodeId> {
    let mut expanded = Vec::new();
    let path: Vec<NodeId> = tree.ancestors(link).collect();
    for node in path {
        if tree.item_class(node) != Some(ItemClass::SectionBody) {
            continue;
        }
        if let Some(previous) = tree.previous_sibling(node)
            && tree.is_chapter_item(previous)
        {
            tree.set_expanded(previous, true);
            expanded.push(previous);
        }
    }
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidenav_types::{FoldConfig, Outline, OutlineEntry};

    fn nested_outline() -> Outline {
        Outline {
            entries: vec![
                OutlineEntry::page("1", "Introduction", "introduction.html"),
                OutlineEntry::section(
                    "2",
                    "Reference",
                    "reference/index.html",
                    vec![OutlineEntry::section(
                        "2.1",
                        "Commands",
                        "reference/commands.html",
                        vec![OutlineEntry::page("2.1.1", "Upgrade", "reference/commands/upgrade.html")],
                    )],
                ),
                OutlineEntry::section(
                    "3",
                    "Appendix",
                    "appendix.html",
                    vec![OutlineEntry::page("3.1", "Glossary", "glossary.html")],
                ),
                OutlineEntry::page("4", "External", "https://example.com/"),
                OutlineEntry::page("5", "Anchor", "#top"),
            ],
        }
    }

    fn url(value: &str) -> Url {
        Url::parse(value).unwrap()
    }

    #[test]
    fn rewriting_skips_external_and_anchor_links() {
        let mut tree = NavTree::materialize(&nested_outline(), &FoldConfig::default());
        let location = url("https://docs.example.com/reference/commands.html");
        let resolved = rewrite_links(&mut tree, &PathPrefix::from("../"), &location);

        let href = |target: &str| tree.link(tree.find_link(target).unwrap()).unwrap().href.clone();
        assert_eq!(href("introduction.html"), "../introduction.html");
        assert_eq!(href("https://example.com/"), "https://example.com/");
        assert_eq!(href("#top"), "#top");
        assert_eq!(
            resolved[&tree.find_link("#top").unwrap()].as_str(),
            "https://docs.example.com/reference/commands.html#top"
        );
    }

    #[test]
    fn deep_match_expands_every_ancestor_section() {
        let mut tree = NavTree::materialize(&nested_outline(), &FoldConfig::folded(0));
        let location = url("https://docs.example.com/reference/commands/upgrade.html?tab=2");
        let prefix = PathPrefix::from("../../");
        let resolved = rewrite_links(&mut tree, &prefix, &location);

        let active = resolve_active(&mut tree, &resolved, &location, &prefix).unwrap();
        assert_eq!(tree.label(active), Some("Upgrade"));

        let expanded = expand_ancestors(&mut tree, active);
        let labels: Vec<_> = expanded.iter().filter_map(|id| tree.label(*id)).collect();
        assert_eq!(labels, ["Commands", "Reference"]);

        let appendix = tree.parent(tree.find_link("appendix.html").unwrap()).unwrap();
        assert!(!tree.is_expanded(appendix));
    }

    #[test]
    fn expansion_is_idempotent() {
        let mut tree = NavTree::materialize(&nested_outline(), &FoldConfig::folded(0));
        let upgrade = tree.find_link("reference/commands/upgrade.html").unwrap();
        expand_ancestors(&mut tree, upgrade);
        let once = tree.expanded_items();
        expand_ancestors(&mut tree, upgrade);
        assert_eq!(tree.expanded_items(), once);
    }

    #[test]
    fn first_link_aliases_the_root_index() {
        let mut tree = NavTree::materialize(&nested_outline(), &FoldConfig::default());
        let location = url("https://docs.example.com/");
        let prefix = PathPrefix::default();
        let resolved = rewrite_links(&mut tree, &prefix, &location);

        let active = resolve_active(&mut tree, &resolved, &location, &prefix).unwrap();
        assert_eq!(tree.label(active), Some("Introduction"));
    }

    #[test]
    fn index_alias_requires_an_empty_prefix() {
        let mut tree = NavTree::materialize(&nested_outline(), &FoldConfig::default());
        let location = url("https://docs.example.com/guide/");
        let prefix = PathPrefix::from("../");
        let resolved = rewrite_links(&mut tree, &prefix, &location);

        assert_eq!(resolve_active(&mut tree, &resolved, &location, &prefix), None);
        assert_eq!(tree.active_link(), None);
    }

    #[test]
    fn directory_url_matches_its_index_document_link() {
        let mut tree = NavTree::materialize(&nested_outline(), &FoldConfig::default());
        let location = url("https://docs.example.com/reference/");
        let prefix = PathPrefix::from("../");
        let resolved = rewrite_links(&mut tree, &prefix, &location);

        let active = resolve_active(&mut tree, &resolved, &location, &prefix).unwrap();
        assert_eq!(tree.label(active), Some("Reference"));
    }
}
