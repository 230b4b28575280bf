//! # Sidenav sidebar
//!
//! A collapsible table-of-contents sidebar for statically generated books.
//! Given a fixed outline and the current page URL, the sidebar computes its
//! presentation state on every page load: which entry is active, which
//! sections are expanded so the active entry is visible, and where the
//! viewport is scrolled.
//!
//! ## Architecture
//!
//! - [`component`]: the `Component` trait, its events and effects.
//! - [`sidebar`]: the `SidebarScrollbox` component and its page-load steps.
//! - [`scroll_metrics`]: viewport bookkeeping shared by restore and centering.
//! - [`runtime`]: an interactive terminal host that replays page loads.

pub mod component;
pub mod runtime;
pub mod scroll_metrics;
pub mod sidebar;

pub use component::{Component, Effect, SidebarEvent};
pub use runtime::{BrowseOptions, run};
pub use scroll_metrics::ScrollMetrics;
pub use sidebar::{SidebarConfig, SidebarScrollbox, SidebarSnapshot};
