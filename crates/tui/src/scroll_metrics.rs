//! Vertical scroll bookkeeping for the sidebar viewport.
//!
//! Offsets and heights are integer pixels. The terminal runtime uses a row
//! height of one, which makes a pixel equal to a terminal row.

/// Shared metrics for vertical scrolling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollMetrics {
    offset: u32,
    content_height: u32,
    viewport_height: u32,
}

impl ScrollMetrics {
    pub fn new(viewport_height: u32, content_height: u32) -> Self {
        Self {
            offset: 0,
            content_height,
            viewport_height,
        }
    }

    /// Returns current vertical scroll offset.
    pub const fn offset(&self) -> u32 {
        self.offset
    }

    pub const fn content_height(&self) -> u32 {
        self.content_height
    }

    pub const fn viewport_height(&self) -> u32 {
        self.viewport_height
    }

    /// Returns the maximum valid scroll offset.
    pub fn max_offset(&self) -> u32 {
        self.content_height.saturating_sub(self.viewport_height)
    }

    /// Returns whether content exceeds the current viewport.
    pub fn is_scrollable(&self) -> bool {
        self.content_height > self.viewport_height && self.viewport_height > 0
    }

    /// Updates viewport height and clamps current offset.
    pub fn update_viewport_height(&mut self, viewport_height: u32) {
        self.viewport_height = viewport_height;
        self.clamp_offset();
    }

    /// Updates content height and clamps current offset.
    pub fn update_content_height(&mut self, content_height: u32) {
        self.content_height = content_height;
        self.clamp_offset();
    }

    /// Assigns the offset the way a browser assigns `scrollTop`: out-of-range values are clamped.
    pub fn set_offset(&mut self, offset: u32) {
        self.offset = offset;
        self.clamp_offset();
    }

    /// Scrolls by a relative amount (`+` down, `-` up).
    pub fn scroll_by(&mut self, delta: i64) {
        if delta == 0 || !self.is_scrollable() {
            return;
        }
        let next = (i64::from(self.offset) + delta).clamp(0, i64::from(self.max_offset()));
        self.offset = next as u32;
    }

    /// Places the span `[top, top + height)` in the vertical center of the viewport.
    pub fn center_on(&mut self, top: u32, height: u32) {
        let middle = i64::from(top) + i64::from(height) / 2;
        let target = middle - i64::from(self.viewport_height) / 2;
        self.offset = target.clamp(0, i64::from(self.max_offset())) as u32;
    }

    /// Scrolls the least amount needed for `[top, top + height)` to be fully visible.
    pub fn ensure_visible(&mut self, top: u32, height: u32) {
        let bottom = top.saturating_add(height);
        if top < self.offset {
            self.set_offset(top);
        } else if bottom > self.offset + self.viewport_height {
            self.set_offset(bottom.saturating_sub(self.viewport_height));
        }
    }

    fn clamp_offset(&mut self) {
        self.offset = self.offset.min(self.max_offset());
    }
}

#[cfg(test)]
mod tests {
    use super::ScrollMetrics;

    #[test]
    fn offsets_clamp_to_bounds() {
        let mut metrics = ScrollMetrics::new(100, 400);
        metrics.set_offset(1_000);
        assert_eq!(metrics.offset(), 300);

        metrics.scroll_by(-50);
        assert_eq!(metrics.offset(), 250);

        metrics.scroll_by(-1_000);
        assert_eq!(metrics.offset(), 0);
    }

    #[test]
    fn centering_places_span_mid_viewport() {
        let mut metrics = ScrollMetrics::new(100, 1_000);
        metrics.center_on(500, 20);
        assert_eq!(metrics.offset(), 460);

        metrics.center_on(10, 20);
        assert_eq!(metrics.offset(), 0);

        metrics.center_on(990, 10);
        assert_eq!(metrics.offset(), 900);
    }

    #[test]
    fn short_content_never_scrolls() {
        let mut metrics = ScrollMetrics::new(100, 60);
        metrics.set_offset(40);
        assert_eq!(metrics.offset(), 0);
        metrics.scroll_by(10);
        assert_eq!(metrics.offset(), 0);
    }

    #[test]
    fn ensure_visible_scrolls_minimally() {
        let mut metrics = ScrollMetrics::new(10, 100);
        metrics.ensure_visible(15, 1);
        assert_eq!(metrics.offset(), 6);
        metrics.ensure_visible(8, 1);
        assert_eq!(metrics.offset(), 6);
        metrics.ensure_visible(2, 1);
        assert_eq!(metrics.offset(), 2);
    }
}
