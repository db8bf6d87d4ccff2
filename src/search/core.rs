//! Search engine over the line store.
//!
//! A search scans every line under a single store lock and keeps the ordered
//! hit list plus a circular "current match" cursor. Navigating to a match
//! moves the [`ScrollCursor`] so the matched line is visible.

use super::matcher::LineMatcher;
use crate::buffer::{Epoch, LineStore};
use crate::error::{Result, TermscrollError};
use crate::scroll::ScrollCursor;

/// Options controlling how a pattern is interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Treat the pattern as a regular expression instead of a literal
    pub regex_mode: bool,
    pub case_sensitive: bool,
    /// Only report matches on word boundaries
    pub whole_word: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            regex_mode: false,
            case_sensitive: true,
            whole_word: false,
        }
    }
}

/// One search hit; `column` and `length` are byte offsets into the line text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Match {
    pub line: usize,
    pub column: usize,
    pub length: usize,
}

impl Match {
    pub fn new(line: usize, column: usize, length: usize) -> Self {
        Self {
            line,
            column,
            length,
        }
    }
}

/// Results of the most recent search
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pattern: String,
    options: SearchOptions,
    results: Vec<Match>,
    current: Option<usize>,
    /// Store epoch the result indices were taken at
    epoch: Epoch,
}

impl SearchState {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Hits ordered by line, then column
    pub fn results(&self) -> &[Match] {
        &self.results
    }

    /// Position of the current match in `results`, `None` when there are no results
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn is_active(&self) -> bool {
        !self.pattern.is_empty()
    }
}

/// Plain/regex search with match navigation.
#[derive(Debug, Default)]
pub struct SearchEngine {
    state: SearchState,
}

impl SearchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Search every line for `pattern`, as a literal or as a regex
    pub fn search(&mut self, store: &LineStore, pattern: &str, use_regex: bool) -> Result<&[Match]> {
        let options = SearchOptions {
            regex_mode: use_regex,
            ..Default::default()
        };
        self.search_with(store, pattern, &options)
    }

    /// Search every line for `pattern` using explicit options
    ///
    /// The previous search state is discarded even if this search fails.
    ///
    /// # Errors
    /// * `InvalidArgument` for an empty pattern
    /// * `InvalidPattern` if a regex fails to compile
    /// * `NotInitialized` if the store was closed
    /// * `OutOfMemory` if the result list cannot grow
    pub fn search_with(
        &mut self,
        store: &LineStore,
        pattern: &str,
        options: &SearchOptions,
    ) -> Result<&[Match]> {
        self.clear();

        let matcher = LineMatcher::build(pattern, options)?;
        let (results, epoch) = store.scan(|snapshot| -> Result<(Vec<Match>, Epoch)> {
            let mut results = Vec::new();
            let mut reserve_failed = false;
            for (line_index, line) in snapshot.iter().enumerate() {
                matcher.for_each_match(line.text(), |column, length| {
                    if results.try_reserve(1).is_err() {
                        reserve_failed = true;
                        return;
                    }
                    results.push(Match::new(line_index, column, length));
                });
                if reserve_failed {
                    return Err(TermscrollError::OutOfMemory);
                }
            }
            Ok((results, snapshot.epoch()))
        })??;

        log::debug!(
            "search {:?} (regex: {}) found {} matches",
            pattern,
            options.regex_mode,
            results.len()
        );

        self.state = SearchState {
            pattern: pattern.to_string(),
            options: options.clone(),
            current: if results.is_empty() { None } else { Some(0) },
            results,
            epoch,
        };
        Ok(&self.state.results)
    }

    /// Advance to the next match (wrapping) and scroll it into view
    ///
    /// Results only cover lines present at search time; lines appended since
    /// are not searched until [`SearchEngine::search`] runs again.
    pub fn next(&mut self, store: &LineStore, cursor: &mut ScrollCursor) -> Result<Match> {
        self.navigate(store, cursor, |current, len| (current + 1) % len)
    }

    /// Step back to the previous match (wrapping) and scroll it into view
    ///
    /// Like [`SearchEngine::next`], lines appended after the search are not covered.
    pub fn prev(&mut self, store: &LineStore, cursor: &mut ScrollCursor) -> Result<Match> {
        self.navigate(store, cursor, |current, len| (current + len - 1) % len)
    }

    fn navigate(
        &mut self,
        store: &LineStore,
        cursor: &mut ScrollCursor,
        step: impl Fn(usize, usize) -> usize,
    ) -> Result<Match> {
        if self.state.results.is_empty() {
            return Err(TermscrollError::NoResults);
        }

        let (count, epoch) = store.scan(|snapshot| (snapshot.len(), snapshot.epoch()))?;
        if epoch.shifts_indices_since(&self.state.epoch) {
            log::warn!(
                "discarding {} results for {:?}: buffer lines were evicted or cleared",
                self.state.results.len(),
                self.state.pattern
            );
            self.clear();
            return Err(TermscrollError::NoResults);
        }

        let len = self.state.results.len();
        let index = match self.state.current {
            Some(current) => step(current, len),
            None => 0,
        };
        self.state.current = Some(index);

        let found = self.state.results[index];
        cursor.jump_to_line(found.line, count);
        Ok(found)
    }

    /// Forget the pattern and results; safe to call repeatedly
    pub fn clear(&mut self) {
        self.state = SearchState::default();
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn current_match(&self) -> Option<Match> {
        self.state.current.map(|i| self.state.results[i])
    }

    pub fn result_count(&self) -> usize {
        self.state.results.len()
    }

    /// Hits on one line, for highlighting while rendering
    pub fn matches_on_line(&self, line: usize) -> &[Match] {
        let results = &self.state.results;
        let start = results.partition_point(|m| m.line < line);
        let end = results.partition_point(|m| m.line <= line);
        &results[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(capacity: usize, texts: &[&str]) -> LineStore {
        let store = LineStore::new(capacity).unwrap();
        for text in texts {
            store.append(text, None).unwrap();
        }
        store
    }

    #[test]
    fn test_plain_search_orders_by_line_then_column() {
        let store = store_with(10, &["banana", "apple", "a"]);
        let mut engine = SearchEngine::new();

        let results = engine.search(&store, "a", false).unwrap().to_vec();
        assert_eq!(
            results,
            vec![
                Match::new(0, 1, 1),
                Match::new(0, 3, 1),
                Match::new(0, 5, 1),
                Match::new(1, 0, 1),
                Match::new(2, 0, 1),
            ]
        );
        assert_eq!(engine.state().current_index(), Some(0));
        assert_eq!(engine.state().pattern(), "a");
    }

    #[test]
    fn test_search_empty_store_yields_no_results() {
        let store = LineStore::new(4).unwrap();
        let mut engine = SearchEngine::new();
        assert!(engine.search(&store, "x", false).unwrap().is_empty());
        assert_eq!(engine.state().current_index(), None);
        assert!(matches!(
            engine.next(&store, &mut ScrollCursor::new()),
            Err(TermscrollError::NoResults)
        ));
    }

    #[test]
    fn test_regex_search() {
        let store = store_with(10, &["GET /a 200", "GET /b 404", "POST /c 500"]);
        let mut engine = SearchEngine::new();
        let results = engine.search(&store, r"[45]\d\d", true).unwrap().to_vec();
        assert_eq!(results, vec![Match::new(1, 7, 3), Match::new(2, 8, 3)]);
    }

    #[test]
    fn test_regex_zero_length_pattern_terminates() {
        let store = store_with(10, &["abc", "", "de"]);
        let mut engine = SearchEngine::new();
        let results = engine.search(&store, "q*", true).unwrap();
        // One empty hit per character boundary: 4 + 1 + 3
        assert_eq!(results.len(), 8);
        assert!(results.iter().all(|m| m.length == 0));
    }

    #[test]
    fn test_invalid_pattern_clears_previous_state() {
        let store = store_with(10, &["alpha"]);
        let mut engine = SearchEngine::new();
        engine.search(&store, "a", false).unwrap();
        assert_eq!(engine.result_count(), 2);

        let err = engine.search(&store, "([", true).unwrap_err();
        assert!(matches!(err, TermscrollError::InvalidPattern { .. }));
        assert_eq!(engine.result_count(), 0);
        assert!(!engine.state().is_active());

        let err = engine.search(&store, "", false).unwrap_err();
        assert!(matches!(err, TermscrollError::InvalidArgument { .. }));
    }

    #[test]
    fn test_next_wraps_around() {
        let store = store_with(10, &["x", "y x", "x"]);
        let mut engine = SearchEngine::new();
        let mut cursor = ScrollCursor::new();
        assert_eq!(engine.search(&store, "x", false).unwrap().len(), 3);

        assert_eq!(engine.next(&store, &mut cursor).unwrap().line, 1);
        assert_eq!(engine.next(&store, &mut cursor).unwrap().line, 2);
        assert_eq!(engine.next(&store, &mut cursor).unwrap().line, 0);
        assert_eq!(engine.state().current_index(), Some(0));
    }

    #[test]
    fn test_prev_wraps_around() {
        let store = store_with(10, &["x", "x", "x"]);
        let mut engine = SearchEngine::new();
        let mut cursor = ScrollCursor::new();
        engine.search(&store, "x", false).unwrap();

        assert_eq!(engine.prev(&store, &mut cursor).unwrap().line, 2);
        assert_eq!(engine.prev(&store, &mut cursor).unwrap().line, 1);
        assert_eq!(engine.prev(&store, &mut cursor).unwrap().line, 0);
    }

    #[test]
    fn test_navigation_scrolls_match_into_view() {
        let texts: Vec<String> = (0..20).map(|i| format!("line {i}")).collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let store = store_with(50, &refs);
        let mut engine = SearchEngine::new();
        let mut cursor = ScrollCursor::new();

        engine.search(&store, "line 5", false).unwrap();
        let found = engine.next(&store, &mut cursor).unwrap();
        assert_eq!(found.line, 5);
        assert_eq!(cursor.offset(), 14);
        assert!(!cursor.auto_follow());
        assert!(cursor.visible_range(20, 4).contains(&5));
    }

    #[test]
    fn test_eviction_invalidates_results() {
        let store = store_with(3, &["a", "b", "a"]);
        let mut engine = SearchEngine::new();
        let mut cursor = ScrollCursor::new();
        engine.search(&store, "a", false).unwrap();

        store.append("c", None).unwrap();
        assert!(matches!(
            engine.next(&store, &mut cursor),
            Err(TermscrollError::NoResults)
        ));
        assert_eq!(engine.result_count(), 0);
    }

    #[test]
    fn test_plain_append_keeps_results() {
        let store = store_with(10, &["a", "b"]);
        let mut engine = SearchEngine::new();
        let mut cursor = ScrollCursor::new();
        engine.search(&store, "a", false).unwrap();

        store.append("a again", None).unwrap();
        assert_eq!(engine.next(&store, &mut cursor).unwrap().line, 0);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = store_with(10, &["abc"]);
        let mut engine = SearchEngine::new();
        engine.search(&store, "b", false).unwrap();
        engine.clear();
        engine.clear();
        assert_eq!(engine.result_count(), 0);
        assert_eq!(engine.current_match(), None);
        assert_eq!(engine.state().pattern(), "");
    }

    #[test]
    fn test_matches_on_line() {
        let store = store_with(10, &["aa", "b", "a"]);
        let mut engine = SearchEngine::new();
        engine.search(&store, "a", false).unwrap();

        assert_eq!(engine.matches_on_line(0).len(), 2);
        assert!(engine.matches_on_line(1).is_empty());
        assert_eq!(engine.matches_on_line(2), &[Match::new(2, 0, 1)]);
    }

    #[test]
    fn test_closed_store_search_fails() {
        let store = store_with(4, &["a"]);
        store.close();
        let mut engine = SearchEngine::new();
        assert!(matches!(
            engine.search(&store, "a", false),
            Err(TermscrollError::NotInitialized)
        ));
    }
}
