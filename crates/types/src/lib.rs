//! Shared definitions for the sidenav sidebar: the injected navigation
//! outline, the materialized tree the sidebar operates on, and its HTML form.

mod markup;
pub mod outline;
pub mod tree;

pub use outline::{FoldConfig, Outline, OutlineEntry, OutlineError};
pub use tree::{ItemClass, LinkNode, ListKind, NavTree, NodeId, NodeKind, Row};
