//! Collapsible table-of-contents sidebar.
//!
//! [`SidebarScrollbox`] is the component; the submodules hold the individual
//! page-load steps so they can be exercised on their own.

pub mod active_path;
mod config;
pub mod scroll_persistence;
mod sidebar_component;
mod state;
mod view;

pub use config::{DEFAULT_ROW_HEIGHT, DEFAULT_VIEWPORT_HEIGHT, SidebarConfig};
pub use sidebar_component::SidebarScrollbox;
pub use state::{ActiveEntry, ScrollSource, SidebarSnapshot, SidebarState};
pub use view::{plain_lines, row_lines};
