use sidenav_types::FoldConfig;
use sidenav_util::PathPrefix;
use url::Url;

/// Default viewport height in pixels.
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 480;

/// Default height of one sidebar row in pixels.
pub const DEFAULT_ROW_HEIGHT: u32 = 24;

/// Per-page configuration injected into the sidebar at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarConfig {
    /// Browser location of the current page, query and fragment included.
    pub location: Url,
    /// Root-relative prefix of the current page.
    pub path_to_root: PathPrefix,
    /// Height of the sidebar viewport.
    pub viewport_height: u32,
    /// Height of a single row.
    pub row_height: u32,
    /// Initial fold state of the outline.
    pub fold: FoldConfig,
}

impl SidebarConfig {
    pub fn new(location: Url, path_to_root: impl Into<PathPrefix>) -> Self {
        Self {
            location,
            path_to_root: path_to_root.into(),
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            row_height: DEFAULT_ROW_HEIGHT,
            fold: FoldConfig::default(),
        }
    }

    pub fn with_viewport_height(mut self, viewport_height: u32) -> Self {
        self.viewport_height = viewport_height;
        self
    }

    /// Row heights below one pixel are raised to one.
    pub fn with_row_height(mut self, row_height: u32) -> Self {
        self.row_height = row_height.max(1);
        self
    }

    pub fn with_fold(mut self, fold: FoldConfig) -> Self {
        self.fold = fold;
        self
    }
}
