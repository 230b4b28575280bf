//! Link rewriting and page URL normalization.
//!
//! Outline targets are written relative to the site root. Every page carries a
//! root-relative prefix (`""`, `"../"`, `"../../"`, ...) that turns those
//! targets into paths that resolve from the page's own directory.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Default document served for a directory URL.
pub const INDEX_DOCUMENT: &str = "index.html";

static EXTERNAL_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:[a-z+]+:)?//").expect("valid external URL pattern"));

/// Returns whether `href` is a same-site relative target that needs the root prefix.
///
/// Empty targets, in-page anchors (`#...`) and URLs with a scheme or a
/// protocol-relative `//` are passed through untouched.
pub fn is_rewritable(href: &str) -> bool {
    !href.is_empty() && !href.starts_with('#') && !EXTERNAL_URL.is_match(href)
}

/// Root-relative prefix of the current page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PathPrefix(String);

impl PathPrefix {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self(prefix.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` for pages that live at the site root.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Prepends the prefix to same-site relative targets.
    pub fn rewrite(&self, href: &str) -> String {
        if is_rewritable(href) {
            format!("{}{}", self.0, href)
        } else {
            href.to_string()
        }
    }
}

impl From<&str> for PathPrefix {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Normalizes the browser location into the URL links are compared against.
///
/// Query and fragment are dropped. A directory URL is aliased to its index
/// document, so `/guide/` and `/guide/index.html` compare equal.
pub fn current_page(location: &Url) -> Url {
    let mut page = location.clone();
    page.set_query(None);
    page.set_fragment(None);
    if page.path().ends_with('/') {
        let path = format!("{}{}", page.path(), INDEX_DOCUMENT);
        page.set_path(&path);
    }
    page
}

/// Resolves a (possibly rewritten) link target against the page location.
pub fn resolve(location: &Url, href: &str) -> Option<Url> {
    location.join(href).ok()
}

/// Computes the prefix for `page` relative to `site_root`.
///
/// `site_root` names a directory; a missing trailing slash is implied, so
/// `https://host/book` and `https://host/book/` give the same prefixes. One
/// `../` is emitted per directory level between the two. Pages outside the
/// site root, or on another origin, get an empty prefix.
pub fn path_to_root(site_root: &Url, page: &Url) -> PathPrefix {
    if site_root.origin() != page.origin() {
        return PathPrefix::default();
    }
    let root_dir = directory_path(site_root.path());
    let Some(relative) = page.path().strip_prefix(root_dir.as_str()) else {
        return PathPrefix::default();
    };
    let depth = relative.matches('/').count();
    PathPrefix::new("../".repeat(depth))
}

fn directory_path(path: &str) -> String {
    if path.ends_with('/') { path.to_string() } else { format!("{path}/") }
}
