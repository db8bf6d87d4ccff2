//! Scroll cursor: which window of the store is visible.
//!
//! The offset counts lines up from the bottom (0 = newest line visible). All
//! methods take the current line count explicitly so the cursor never has to
//! lock the store itself.

use std::ops::Range;

/// Scroll offset and auto-follow flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollState {
    /// Lines scrolled up from the bottom; always `<= count`
    pub offset: usize,
    /// Track the newest line as lines are appended
    pub auto_follow: bool,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            offset: 0,
            auto_follow: true,
        }
    }
}

/// Viewport position over a line store.
#[derive(Debug, Clone, Default)]
pub struct ScrollCursor {
    state: ScrollState,
}

impl ScrollCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ScrollState {
        self.state
    }

    pub fn offset(&self) -> usize {
        self.state.offset
    }

    pub fn auto_follow(&self) -> bool {
        self.state.auto_follow
    }

    /// Lines to draw for a viewport of `height` rows, as `start..end`
    pub fn visible_range(&self, count: usize, height: usize) -> Range<usize> {
        let offset = self.state.offset.min(count);
        let start = if offset == 0 {
            count.saturating_sub(height)
        } else {
            count.saturating_sub(offset).saturating_sub(height)
        };
        let end = count.min(start.saturating_add(height));
        start..end
    }

    /// Scroll by `delta` lines; positive moves toward older lines
    pub fn scroll_by(&mut self, delta: i64, count: usize) {
        let max = i64::try_from(count).unwrap_or(i64::MAX);
        let current = i64::try_from(self.state.offset).unwrap_or(i64::MAX);
        let target = current.saturating_add(delta).clamp(0, max);
        // target is within 0..=count, so it fits in usize
        self.state.offset = target as usize;
        self.state.auto_follow = self.state.offset == 0;
    }

    pub fn scroll_to_top(&mut self, count: usize) {
        self.state.offset = count;
        self.state.auto_follow = false;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.state.offset = 0;
        self.state.auto_follow = true;
    }

    /// Enable or disable auto-follow; enabling also jumps to the bottom
    pub fn set_auto_follow(&mut self, enabled: bool) {
        self.state.auto_follow = enabled;
        if enabled {
            self.state.offset = 0;
        }
    }

    /// Index of the line at the viewport's bottom edge
    pub fn current_position(&self, count: usize) -> usize {
        count.saturating_sub(self.state.offset)
    }

    /// Bring `line` to the bottom edge of the viewport and stop following
    pub fn jump_to_line(&mut self, line: usize, count: usize) {
        self.state.offset = count.saturating_sub(line.saturating_add(1));
        self.state.auto_follow = false;
    }

    /// Account for `appended` new lines so a scrolled-up viewport stays on the same content
    pub fn follow_appends(&mut self, appended: usize, count: usize) {
        if self.state.auto_follow {
            self.state.offset = 0;
        } else {
            self.state.offset = self.state.offset.saturating_add(appended);
        }
        self.clamp(count);
    }

    /// Re-establish `offset <= count` after the store shrank
    pub fn clamp(&mut self, count: usize) {
        self.state.offset = self.state.offset.min(count);
    }
}
