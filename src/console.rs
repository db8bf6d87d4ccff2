//! Interactive facade over the scrollback store.
//!
//! A [`Console`] owns the single-threaded view state (scroll cursor, search
//! results, status bar, theme) and shares its [`LineStore`] with any number
//! of producer threads through [`Console::store`]. Because producers append
//! behind the console's back, every view operation first reconciles the
//! cursor with the store's [`Epoch`].

use crate::buffer::{Epoch, Line, LineContext, LineMeta, LineStore};
use crate::config::Config;
use crate::error::Result;
use crate::export::{ExportFormat, Exporter};
use crate::scroll::ScrollCursor;
use crate::search::{Match, SearchEngine, SearchOptions};
use crate::status::StatusBar;
use crate::theme::Theme;
use std::fmt;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

/// Cursor plus the last store epoch it was reconciled against
#[derive(Debug, Default)]
struct View {
    cursor: ScrollCursor,
    seen: Epoch,
}

impl View {
    fn reconcile(&mut self, epoch: Epoch, count: usize) {
        if epoch.cleared != self.seen.cleared {
            self.cursor.scroll_to_bottom();
        } else {
            let appended = epoch.appended.saturating_sub(self.seen.appended);
            if appended > 0 {
                self.cursor
                    .follow_appends(usize::try_from(appended).unwrap_or(usize::MAX), count);
            }
        }
        self.cursor.clamp(count);
        self.seen = epoch;
    }
}

/// Scrollback console: store, scroll, search, export and status in one place
#[derive(Debug)]
pub struct Console {
    store: Arc<LineStore>,
    view: View,
    search: SearchEngine,
    exporter: Exporter,
    status: StatusBar,
}

impl Console {
    /// Build a console from a validated configuration
    ///
    /// # Errors
    /// * `Config` if the configuration does not validate
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let theme = Theme::from_name(&config.theme)?;
        let store = Arc::new(LineStore::new(config.max_lines)?);

        let mut status = StatusBar::default();
        status.set_visible(config.status_bar);

        log::debug!(
            "console created: {} lines, theme {}",
            config.max_lines,
            theme.name()
        );
        Ok(Self {
            store,
            view: View::default(),
            search: SearchEngine::new(),
            exporter: Exporter::new(config.export_config(), theme),
            status,
        })
    }

    /// Shared handle for producer threads
    pub fn store(&self) -> Arc<LineStore> {
        Arc::clone(&self.store)
    }

    /// Append a Normal line
    pub fn write(&self, text: &str) -> Result<usize> {
        self.store.append(text, None)
    }

    pub fn write_meta(&self, text: &str, meta: LineMeta) -> Result<usize> {
        self.store.append(text, Some(meta))
    }

    /// Append a formatted line, e.g. `write_formatted(LineContext::Info, format_args!("{} ready", n))`
    pub fn write_formatted(&self, context: LineContext, args: fmt::Arguments<'_>) -> Result<usize> {
        self.store
            .append(&args.to_string(), Some(LineMeta::new(context)))
    }

    pub fn clear(&mut self) {
        self.store.clear();
        self.search.clear();
        self.status.clear_message();
        self.sync();
    }

    pub fn line_count(&self) -> usize {
        self.store.count()
    }

    pub fn line(&self, index: usize) -> Option<Line> {
        self.store.get(index)
    }

    pub fn line_meta(&self, index: usize) -> Option<LineMeta> {
        self.store.get_meta(index)
    }

    /// Catch the cursor up with appends and clears from other threads
    ///
    /// # Returns
    /// * The current line count
    pub fn sync(&mut self) -> usize {
        let (epoch, count) = self
            .store
            .scan(|snap| (snap.epoch(), snap.len()))
            .unwrap_or_else(|_| (self.store.epoch(), 0));
        self.apply(epoch, count);
        count
    }

    fn apply(&mut self, epoch: Epoch, count: usize) {
        self.view.reconcile(epoch, count);
        self.status.set_scroll_offset(self.view.cursor.offset());
    }

    /// Lines to draw in a viewport of `height` rows
    pub fn visible_range(&mut self, height: usize) -> Range<usize> {
        let count = self.sync();
        self.view.cursor.visible_range(count, height)
    }

    /// Clone the lines of the current viewport in one consistent read
    pub fn visible_lines(&mut self, height: usize) -> Result<Vec<Line>> {
        let view = &mut self.view;
        let (lines, epoch, count) = self.store.scan(|snap| {
            view.reconcile(snap.epoch(), snap.len());
            let range = view.cursor.visible_range(snap.len(), height);
            let lines: Vec<Line> = snap.range(range).cloned().collect();
            (lines, snap.epoch(), snap.len())
        })?;
        self.apply(epoch, count);
        Ok(lines)
    }

    /// Scroll by `delta` lines; positive moves toward older lines
    pub fn scroll_by(&mut self, delta: i64) {
        let count = self.sync();
        self.view.cursor.scroll_by(delta, count);
        self.status.set_scroll_offset(self.view.cursor.offset());
    }

    pub fn scroll_to_top(&mut self) {
        let count = self.sync();
        self.view.cursor.scroll_to_top(count);
        self.status.set_scroll_offset(self.view.cursor.offset());
    }

    pub fn scroll_to_bottom(&mut self) {
        self.sync();
        self.view.cursor.scroll_to_bottom();
        self.status.set_scroll_offset(0);
    }

    pub fn set_auto_follow(&mut self, enabled: bool) {
        self.sync();
        self.view.cursor.set_auto_follow(enabled);
        self.status.set_scroll_offset(self.view.cursor.offset());
    }

    pub fn scroll_offset(&self) -> usize {
        self.view.cursor.offset()
    }

    pub fn auto_follow(&self) -> bool {
        self.view.cursor.auto_follow()
    }

    /// Index of the line at the viewport's bottom edge
    pub fn current_position(&mut self) -> usize {
        let count = self.sync();
        self.view.cursor.current_position(count)
    }

    /// Search for `pattern`, reporting the hit count in the status bar
    ///
    /// A failed search leaves no results and shows "0 matches".
    pub fn search(&mut self, pattern: &str, use_regex: bool) -> Result<usize> {
        let options = SearchOptions {
            regex_mode: use_regex,
            ..Default::default()
        };
        self.search_with(pattern, &options)
    }

    pub fn search_with(&mut self, pattern: &str, options: &SearchOptions) -> Result<usize> {
        self.sync();
        match self.search.search_with(&self.store, pattern, options) {
            Ok(results) => {
                let found = results.len();
                self.status.set_message(format!("{} matches", found));
                Ok(found)
            }
            Err(e) => {
                self.status.set_message("0 matches");
                Err(e)
            }
        }
    }

    /// Jump to the next match
    ///
    /// # Errors
    /// * `NoResults` without results, or after the matched lines were evicted
    pub fn search_next(&mut self) -> Result<Match> {
        self.sync();
        let found = self.search.next(&self.store, &mut self.view.cursor);
        self.after_navigation(found)
    }

    pub fn search_prev(&mut self) -> Result<Match> {
        self.sync();
        let found = self.search.prev(&self.store, &mut self.view.cursor);
        self.after_navigation(found)
    }

    fn after_navigation(&mut self, found: Result<Match>) -> Result<Match> {
        self.status.set_scroll_offset(self.view.cursor.offset());
        if let (Ok(_), Some(index)) = (&found, self.search.state().current_index()) {
            self.status.set_message(format!(
                "match {}/{}",
                index + 1,
                self.search.result_count()
            ));
        } else if found.is_err() {
            self.status.set_message("0 matches");
        }
        found
    }

    pub fn search_clear(&mut self) {
        self.search.clear();
        self.status.clear_message();
    }

    pub fn search_engine(&self) -> &SearchEngine {
        &self.search
    }

    /// Encode lines `start..=end`; see [`Exporter::export`]
    pub fn export(
        &self,
        format: ExportFormat,
        start: i64,
        end: i64,
        include_meta: bool,
    ) -> Result<Vec<u8>> {
        self.exporter
            .export(&self.store, format, start, end, include_meta)
    }

    /// Encode and atomically write to `path`; see [`Exporter::export_to_file`]
    pub fn export_to_file(
        &self,
        path: impl AsRef<Path>,
        format: ExportFormat,
        start: i64,
        end: i64,
        include_meta: bool,
    ) -> Result<()> {
        self.exporter
            .export_to_file(&self.store, path, format, start, end, include_meta)
    }

    pub fn theme(&self) -> &Theme {
        self.exporter.theme()
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.exporter.set_theme(theme);
    }

    pub fn status(&self) -> &StatusBar {
        &self.status
    }

    pub fn status_mut(&mut self) -> &mut StatusBar {
        &mut self.status
    }

    /// Close the store; later writes fail with `NotInitialized`
    pub fn shutdown(&mut self) {
        self.store.close();
        self.search.clear();
        self.sync();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TermscrollError;

    fn console(max_lines: usize) -> Console {
        Console::new(Config::default().with_max_lines(max_lines)).unwrap()
    }

    fn texts(lines: &[Line]) -> Vec<&str> {
        lines.iter().map(|l| l.text()).collect()
    }

    #[test]
    fn test_new_validates_config() {
        assert!(matches!(
            Console::new(Config::default().with_max_lines(0)),
            Err(TermscrollError::Config { .. })
        ));
        assert!(Console::new(Config::default().with_theme("nope")).is_err());

        let hidden = Console::new(Config::default().with_status_bar(false)).unwrap();
        assert!(!hidden.status().is_visible());
    }

    #[test]
    fn test_write_variants() {
        let console = console(10);
        console.write("plain").unwrap();
        console
            .write_meta("tagged", LineMeta::new(LineContext::Warning).with_tag("net"))
            .unwrap();
        console
            .write_formatted(LineContext::Info, format_args!("{} files", 3))
            .unwrap();

        assert_eq!(console.line_count(), 3);
        assert_eq!(console.line(2).unwrap().text(), "3 files");
        assert_eq!(console.line_meta(1).unwrap().tag.as_deref(), Some("net"));
        assert_eq!(console.line_meta(2).unwrap().context, LineContext::Info);
    }

    #[test]
    fn test_visible_lines_follow_bottom() {
        let mut console = console(10);
        for i in 0..6 {
            console.write(&format!("line {}", i)).unwrap();
        }
        let lines = console.visible_lines(3).unwrap();
        assert_eq!(texts(&lines), vec!["line 3", "line 4", "line 5"]);

        console.write("line 6").unwrap();
        assert_eq!(console.visible_range(3), 4..7);
    }

    #[test]
    fn test_scrolled_view_stays_pinned_during_appends() {
        let mut console = console(100);
        for i in 0..10 {
            console.write(&i.to_string()).unwrap();
        }
        console.scroll_by(4);
        assert_eq!(console.visible_range(2), 4..6);
        assert_eq!(console.status().scroll_indicator(), "[SCROLL: -4]");

        let producer = console.store();
        producer.append("10", None).unwrap();
        producer.append("11", None).unwrap();

        assert_eq!(console.visible_range(2), 4..6);
        assert_eq!(console.scroll_offset(), 6);
    }

    #[test]
    fn test_scrolled_view_stays_pinned_while_evicting() {
        let mut console = console(10);
        for i in 0..10 {
            console.write(&i.to_string()).unwrap();
        }
        console.scroll_by(2);
        let before = console.visible_lines(3).unwrap();
        assert_eq!(texts(&before), vec!["5", "6", "7"]);

        let producer = console.store();
        for i in 10..13 {
            producer.append(&i.to_string(), None).unwrap();
        }

        let after = console.visible_lines(3).unwrap();
        assert_eq!(texts(&after), vec!["5", "6", "7"]);
        assert_eq!(console.scroll_offset(), 5);
        assert_eq!(console.line_count(), 10);
        assert_eq!(console.status().scroll_indicator(), "[SCROLL: -5]");
    }

    #[test]
    fn test_clear_returns_to_bottom() {
        let mut console = console(10);
        for i in 0..5 {
            console.write(&i.to_string()).unwrap();
        }
        console.scroll_to_top();
        assert_eq!(console.current_position(), 0);

        console.clear();
        assert_eq!(console.scroll_offset(), 0);
        assert!(console.auto_follow());
        assert_eq!(console.visible_range(5), 0..0);
    }

    #[test]
    fn test_search_navigation_scrolls() {
        let mut console = console(50);
        for text in ["error one", "fine", "fine", "error two", "fine"] {
            console.write(text).unwrap();
        }
        assert_eq!(console.search("error", false).unwrap(), 2);
        assert_eq!(console.status().message(), Some("2 matches"));

        let hit = console.search_next().unwrap();
        assert_eq!(hit.line, 3);
        assert_eq!(console.scroll_offset(), 1);
        assert_eq!(console.status().message(), Some("match 2/2"));

        let hit = console.search_next().unwrap();
        assert_eq!(hit.line, 0);
        assert_eq!(console.visible_range(1), 0..1);
    }

    #[test]
    fn test_failed_search_reports_zero_matches() {
        let mut console = console(10);
        console.write("text").unwrap();
        assert!(console.search("(", true).is_err());
        assert_eq!(console.status().message(), Some("0 matches"));
        assert!(matches!(
            console.search_next(),
            Err(TermscrollError::NoResults)
        ));
    }

    #[test]
    fn test_export_through_console() {
        let console = console(10);
        console.write("a").unwrap();
        console.write("b").unwrap();
        let out = console.export(ExportFormat::Plain, -1, -1, false).unwrap();
        assert_eq!(out, b"a\nb\n");
    }

    #[test]
    fn test_set_theme() {
        let mut console = console(10);
        console.set_theme(Theme::monochrome());
        assert_eq!(console.theme().name(), "monochrome");
    }

    #[test]
    fn test_shutdown() {
        let mut console = console(10);
        let producer = console.store();
        console.write("a").unwrap();
        console.shutdown();
        assert!(matches!(
            producer.append("late", None),
            Err(TermscrollError::NotInitialized)
        ));
        assert_eq!(console.line_count(), 0);
        assert!(console.visible_lines(5).is_err());
    }
}
