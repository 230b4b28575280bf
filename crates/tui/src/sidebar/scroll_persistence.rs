//! Hand-off of the sidebar scroll offset between page loads.
//!
//! A click on a sidebar link writes the offset; the next load reads it and
//! deletes it right away, whether or not it could be used. Storage failures
//! only cost the restore, so they are logged and otherwise ignored. A value
//! that cannot be deleted is never used.

use sidenav_util::{SCROLL_KEY, SessionStore};
use tracing::{debug, warn};

/// Records the offset for the next page load.
pub fn save_offset(store: &dyn SessionStore, offset: u32) {
    match store.set(SCROLL_KEY, &offset.to_string()) {
        Ok(()) => debug!(offset, "saved sidebar scroll offset"),
        Err(error) => warn!(error = %error, "failed to save sidebar scroll offset"),
    }
}

/// Consumes the offset left by the previous page, if any.
///
/// The key is deleted on every call so that a later load (back/forward,
/// a typed URL) never reuses a stale value. When the delete fails the value
/// is reported as absent, since it would otherwise be restored again on
/// every load.
pub fn take_offset(store: &dyn SessionStore) -> Option<u32> {
    let stored = match store.get(SCROLL_KEY) {
        Ok(stored) => stored,
        Err(error) => {
            warn!(error = %error, "failed to read sidebar scroll offset");
            None
        }
    };
    if let Err(error) = store.remove(SCROLL_KEY) {
        warn!(error = %error, "failed to clear sidebar scroll offset; not restoring it");
        return None;
    }

    let raw = stored?;
    match raw.trim().parse::<u32>() {
        Ok(offset) => Some(offset),
        Err(error) => {
            warn!(value = %raw, error = %error, "ignoring unparsable sidebar scroll offset");
            None
        }
    }
}
