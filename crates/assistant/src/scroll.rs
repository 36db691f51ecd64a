/// Distance from the true bottom that still counts as "at the bottom".
pub const AT_BOTTOM_TOLERANCE: f32 = 50.0;

/// Viewport geometry reported with a user scroll.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub scroll_height: f32,
    pub scroll_top: f32,
    pub client_height: f32,
}

impl ScrollMetrics {
    pub fn new(scroll_height: f32, scroll_top: f32, client_height: f32) -> Self {
        Self {
            scroll_height,
            scroll_top,
            client_height,
        }
    }

    pub fn is_at_bottom(&self) -> bool {
        self.scroll_height - self.scroll_top - self.client_height < AT_BOTTOM_TOLERANCE
    }
}

/// Decides when new content should pull the viewport to the bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollCoordinator {
    follow_bottom: bool,
    show_jump_control: bool,
    pending_scroll_to_bottom: bool,
}

impl ScrollCoordinator {
    pub fn new() -> Self {
        Self {
            follow_bottom: true,
            show_jump_control: false,
            pending_scroll_to_bottom: false,
        }
    }

    pub fn is_following_bottom(&self) -> bool {
        self.follow_bottom
    }

    pub fn shows_jump_control(&self) -> bool {
        self.show_jump_control
    }

    pub fn has_pending_scroll(&self) -> bool {
        self.pending_scroll_to_bottom
    }

    /// User-originated scroll.
    pub fn update_follow_state(&mut self, metrics: ScrollMetrics) {
        let at_bottom = metrics.is_at_bottom();
        self.follow_bottom = at_bottom;
        self.show_jump_control = !at_bottom;
    }

    /// A user message was appended; the sender always sees it.
    pub fn request_scroll_to_bottom(&mut self) {
        self.follow_bottom = true;
        self.show_jump_control = false;
        self.pending_scroll_to_bottom = true;
    }

    /// The trailing reply changed. Only scrolls while following.
    pub fn request_scroll_to_bottom_if_following(&mut self) {
        if self.follow_bottom {
            self.pending_scroll_to_bottom = true;
        } else {
            self.show_jump_control = true;
        }
    }

    /// Conversation switch: a thread always opens at its bottom.
    pub fn reset(&mut self) {
        self.follow_bottom = true;
        self.show_jump_control = false;
        self.pending_scroll_to_bottom = true;
    }

    /// The jump control was used.
    pub fn jump_to_bottom(&mut self) {
        self.request_scroll_to_bottom();
    }

    /// Consumes a pending scroll request; returns whether the view should move to the bottom.
    pub fn apply_pending_scroll(&mut self) -> bool {
        std::mem::take(&mut self.pending_scroll_to_bottom)
    }
}

impl Default for ScrollCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scrolled_away() -> ScrollMetrics {
        ScrollMetrics::new(2_000.0, 400.0, 600.0)
    }

    #[test]
    fn bottom_tolerance_is_fifty_pixels() {
        assert!(ScrollMetrics::new(1_000.0, 351.0, 600.0).is_at_bottom());
        assert!(!ScrollMetrics::new(1_000.0, 350.0, 600.0).is_at_bottom());
        assert!(ScrollMetrics::new(300.0, 0.0, 600.0).is_at_bottom());
    }

    #[test]
    fn reply_updates_do_not_scroll_after_user_scrolls_away() {
        let mut scroll = ScrollCoordinator::new();
        scroll.update_follow_state(scrolled_away());

        scroll.request_scroll_to_bottom_if_following();

        assert!(!scroll.apply_pending_scroll());
        assert!(!scroll.is_following_bottom());
        assert!(scroll.shows_jump_control());
    }

    #[test]
    fn user_message_always_forces_scroll() {
        let mut scroll = ScrollCoordinator::new();
        scroll.update_follow_state(scrolled_away());

        scroll.request_scroll_to_bottom();

        assert!(scroll.is_following_bottom());
        assert!(!scroll.shows_jump_control());
        assert!(scroll.apply_pending_scroll());
        assert!(!scroll.apply_pending_scroll());
    }

    #[test]
    fn reply_updates_scroll_while_following() {
        let mut scroll = ScrollCoordinator::new();
        scroll.update_follow_state(ScrollMetrics::new(2_000.0, 1_390.0, 600.0));

        scroll.request_scroll_to_bottom_if_following();

        assert!(scroll.apply_pending_scroll());
        assert!(!scroll.shows_jump_control());
    }

    #[test]
    fn switching_conversations_resumes_following() {
        let mut scroll = ScrollCoordinator::new();
        scroll.update_follow_state(scrolled_away());

        scroll.reset();

        assert!(scroll.is_following_bottom());
        assert!(!scroll.shows_jump_control());
        assert!(scroll.has_pending_scroll());
    }

    #[test]
    fn returning_to_bottom_hides_jump_control() {
        let mut scroll = ScrollCoordinator::new();
        scroll.update_follow_state(scrolled_away());
        scroll.update_follow_state(ScrollMetrics::new(2_000.0, 1_400.0, 600.0));

        assert!(scroll.is_following_bottom());
        assert!(!scroll.shows_jump_control());
    }
}
