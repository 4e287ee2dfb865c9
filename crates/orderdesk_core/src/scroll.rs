/// Scroll geometry reported by the view, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollMetrics {
    pub scroll_top: u32,
    pub viewport_height: u32,
    pub content_height: u32,
}

impl ScrollMetrics {
    /// True when the bottom of the viewport is within `threshold` of the end of the content.
    pub fn is_near_end(&self, threshold: u32) -> bool {
        let bottom = self.scroll_top.saturating_add(self.viewport_height);
        bottom.saturating_add(threshold) >= self.content_height
    }
}
