//! Helpers shared by the sidenav component and CLI: link rewriting and page
//! URL normalization, session-scoped storage, and path expansion.

pub mod link_resolution;
mod path_processing;
pub mod session_store;

pub use link_resolution::{INDEX_DOCUMENT, PathPrefix, current_page, is_rewritable, path_to_root, resolve};
pub use path_processing::expand_tilde;
pub use session_store::{
    JsonSessionStore, MemorySessionStore, SCROLL_KEY, SESSION_PATH_ENV, SessionStore, SessionStoreError,
    default_session_path,
};
