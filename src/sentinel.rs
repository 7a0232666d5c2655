//! Scroll sentinel - edge-triggered infinite-scroll detector. The view
//! layer reports visibility of whichever element is the current target
//! (the last rendered post); the sentinel asks the feed for the next page
//! exactly once per not-visible -> visible transition.

use crate::feed::FeedController;
use crate::sections;

#[derive(Debug, Default)]
pub struct ScrollSentinel {
    /// Identity of the element currently under observation; targets change
    /// across re-renders as the last rendered post changes.
    target: Option<u64>,
    intersecting: bool,
}

impl ScrollSentinel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe a new target, disconnecting the previous one. Edge state
    /// resets so the new target can fire on its first appearance.
    pub fn observe(&mut self, target: u64) {
        self.target = Some(target);
        self.intersecting = false;
    }

    /// Stop observing entirely (e.g. the active view has no pagination).
    pub fn disconnect(&mut self) {
        self.target = None;
        self.intersecting = false;
    }

    pub fn is_observing(&self) -> bool {
        self.target.is_some()
    }

    /// Report a visibility change for `target`. Returns true when a
    /// next-page request was issued. Reports for stale targets are ignored,
    /// as are repeat reports while the target stays visible, and anything
    /// that arrives while the feed is loading or exhausted.
    pub async fn on_visibility(
        &mut self,
        target: u64,
        visible: bool,
        feed: &FeedController,
    ) -> bool {
        if self.target != Some(target) {
            return false;
        }

        let rising_edge = visible && !self.intersecting;
        self.intersecting = visible;
        if !rising_edge {
            return false;
        }
        if feed.is_loading() || !feed.has_more() || !sections::is_section(&feed.section()) {
            return false;
        }

        feed.request_next_page().await;
        true
    }
}
