//! Status bar text shown beneath the scrollback view

use std::fmt;

/// Left/right status text plus a scroll indicator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBar {
    left: String,
    right: String,
    scroll: String,
    message: Option<String>,
    visible: bool,
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }
}

impl StatusBar {
    /// Status bar showing `name` on the left and `v{version}` on the right
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            left: name.to_string(),
            right: format!("v{}", version),
            scroll: String::new(),
            message: None,
            visible: true,
        }
    }

    pub fn left(&self) -> &str {
        &self.left
    }

    pub fn right(&self) -> &str {
        &self.right
    }

    /// `[SCROLL: -N]` while scrolled up, empty at the bottom
    pub fn scroll_indicator(&self) -> &str {
        &self.scroll
    }

    /// Replace either side; `None` leaves that side unchanged
    pub fn set(&mut self, left: Option<&str>, right: Option<&str>) {
        if let Some(left) = left {
            self.left = left.to_string();
        }
        if let Some(right) = right {
            self.right = right.to_string();
        }
    }

    /// Replace the left text, e.g. `set_left_formatted(format_args!("{} lines", n))`
    pub fn set_left_formatted(&mut self, args: fmt::Arguments<'_>) {
        self.left = args.to_string();
    }

    pub fn set_right_formatted(&mut self, args: fmt::Arguments<'_>) {
        self.right = args.to_string();
    }

    /// Set a temporary message
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub(crate) fn set_scroll_offset(&mut self, offset: usize) {
        self.scroll = if offset == 0 {
            String::new()
        } else {
            format!("[SCROLL: -{}]", offset)
        };
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Render one row of `width` columns, right text flush right
    ///
    /// Returns an empty string while hidden. Left-side segments are joined
    /// with `separator`; the row is truncated if it does not fit.
    pub fn format_line(&self, width: usize, separator: &str) -> String {
        if !self.visible {
            return String::new();
        }

        let mut left = self.left.clone();
        for segment in [Some(self.scroll.as_str()), self.message.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
        {
            left.push_str(separator);
            left.push_str(segment);
        }

        let used = left.chars().count() + self.right.chars().count();
        let mut line = left;
        if used < width {
            line.extend(std::iter::repeat(' ').take(width - used));
        } else {
            line.push(' ');
        }
        line.push_str(&self.right);
        line.chars().take(width).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status() {
        let status = StatusBar::new("termscroll", "1.2.3");
        assert_eq!(status.left(), "termscroll");
        assert_eq!(status.right(), "v1.2.3");
        assert_eq!(status.scroll_indicator(), "");
        assert!(status.is_visible());
    }

    #[test]
    fn test_set_keeps_unspecified_side() {
        let mut status = StatusBar::new("app", "0.1.0");
        status.set(Some("ready"), None);
        assert_eq!(status.left(), "ready");
        assert_eq!(status.right(), "v0.1.0");

        status.set(None, Some("12:00"));
        assert_eq!(status.left(), "ready");
        assert_eq!(status.right(), "12:00");
    }

    #[test]
    fn test_formatted_setters() {
        let mut status = StatusBar::default();
        status.set_left_formatted(format_args!("{} lines", 42));
        status.set_right_formatted(format_args!("{}/{}", 3, 7));
        assert_eq!(status.left(), "42 lines");
        assert_eq!(status.right(), "3/7");
    }

    #[test]
    fn test_scroll_indicator() {
        let mut status = StatusBar::default();
        status.set_scroll_offset(5);
        assert_eq!(status.scroll_indicator(), "[SCROLL: -5]");
        status.set_scroll_offset(0);
        assert_eq!(status.scroll_indicator(), "");
    }

    #[test]
    fn test_format_line() {
        let mut status = StatusBar::new("app", "1.0");
        assert_eq!(status.format_line(12, " | "), "app     v1.0");

        status.set_scroll_offset(2);
        status.set_message("3 matches");
        assert_eq!(
            status.format_line(40, " | "),
            "app | [SCROLL: -2] | 3 matches      v1.0"
        );
        assert_eq!(status.format_line(8, " | ").chars().count(), 8);

        status.set_visible(false);
        assert_eq!(status.format_line(40, " | "), "");
    }
}
