//! Per-line match scanning.
//!
//! Plain case-sensitive searches use memchr's `memmem` finder; everything else
//! (regex, case-insensitive, whole-word) goes through ripgrep's regex matcher.

use super::core::SearchOptions;
use crate::error::{Result, TermscrollError};
use grep_matcher::Matcher;
use grep_regex::{RegexMatcher, RegexMatcherBuilder};
use memchr::memmem;

pub(crate) enum LineMatcher {
    Literal(memmem::Finder<'static>),
    Regex(RegexMatcher),
}

impl LineMatcher {
    /// Compile `pattern` for the given options
    ///
    /// # Errors
    /// * `InvalidArgument` for an empty pattern
    /// * `InvalidPattern` if the regex fails to compile
    pub(crate) fn build(pattern: &str, options: &SearchOptions) -> Result<Self> {
        if pattern.is_empty() {
            return Err(TermscrollError::invalid_argument("empty search pattern"));
        }

        if !options.regex_mode && options.case_sensitive && !options.whole_word {
            return Ok(Self::Literal(memmem::Finder::new(pattern).into_owned()));
        }

        let mut builder = RegexMatcherBuilder::new();
        builder
            .case_insensitive(!options.case_sensitive)
            .word(options.whole_word)
            .fixed_strings(!options.regex_mode);
        builder
            .build(pattern)
            .map(Self::Regex)
            .map_err(|e| TermscrollError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
    }

    /// Report every non-overlapping match in `line` as `(column, length)` byte spans
    pub(crate) fn for_each_match(&self, line: &str, mut on_match: impl FnMut(usize, usize)) {
        match self {
            Self::Literal(finder) => {
                let width = finder.needle().len();
                for column in finder.find_iter(line.as_bytes()) {
                    on_match(column, width);
                }
            }
            Self::Regex(matcher) => scan_regex(matcher, line, on_match),
        }
    }
}

fn scan_regex(matcher: &RegexMatcher, line: &str, mut on_match: impl FnMut(usize, usize)) {
    let haystack = line.as_bytes();
    let mut at = 0;
    let mut last_end = None;

    while at <= haystack.len() {
        let found = match matcher.find_at(haystack, at) {
            Ok(Some(found)) => found,
            _ => break,
        };

        if found.is_empty() {
            // An empty match directly after a previous match adds nothing
            if last_end != Some(found.end()) {
                on_match(found.start(), 0);
            }
            at = found.end() + char_width_at(line, found.end());
        } else {
            on_match(found.start(), found.len());
            at = found.end();
        }
        last_end = Some(found.end());
    }
}

/// Byte width of the character starting at `index`, or 1 past the end
fn char_width_at(line: &str, index: usize) -> usize {
    line.get(index..)
        .and_then(|rest| rest.chars().next())
        .map_or(1, char::len_utf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(pattern: &str, options: &SearchOptions, line: &str) -> Vec<(usize, usize)> {
        let matcher = LineMatcher::build(pattern, options).unwrap();
        let mut found = Vec::new();
        matcher.for_each_match(line, |col, len| found.push((col, len)));
        found
    }

    fn regex() -> SearchOptions {
        SearchOptions {
            regex_mode: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_literal_non_overlapping() {
        let options = SearchOptions::default();
        assert_eq!(spans("a", &options, "banana"), vec![(1, 1), (3, 1), (5, 1)]);
        assert_eq!(spans("aa", &options, "aaaa"), vec![(0, 2), (2, 2)]);
        assert_eq!(spans("ana", &options, "banana"), vec![(1, 3)]);
        assert!(spans("A", &options, "banana").is_empty());
    }

    #[test]
    fn test_literal_treats_metacharacters_literally() {
        let options = SearchOptions {
            case_sensitive: false,
            ..Default::default()
        };
        assert_eq!(spans("a.c", &options, "abc A.C"), vec![(4, 3)]);
    }

    #[test]
    fn test_regex_matches() {
        assert_eq!(spans(r"\d+", &regex(), "id 42 and 7"), vec![(3, 2), (10, 1)]);
        assert_eq!(spans("^err", &regex(), "err err"), vec![(0, 3)]);
    }

    #[test]
    fn test_regex_zero_length_matches_advance() {
        let found = spans("x*", &regex(), "abc");
        assert_eq!(found, vec![(0, 0), (1, 0), (2, 0), (3, 0)]);

        let found = spans("a*", &regex(), "aab");
        assert_eq!(found, vec![(0, 2), (3, 0)]);
    }

    #[test]
    fn test_regex_zero_length_multibyte() {
        let found = spans("z*", &regex(), "éa");
        assert_eq!(found, vec![(0, 0), (2, 0), (3, 0)]);
    }

    #[test]
    fn test_case_insensitive_and_whole_word() {
        let options = SearchOptions {
            case_sensitive: false,
            ..Default::default()
        };
        assert_eq!(spans("error", &options, "ERROR Error"), vec![(0, 5), (6, 5)]);

        let options = SearchOptions {
            whole_word: true,
            ..Default::default()
        };
        assert_eq!(spans("cat", &options, "cat concat cat."), vec![(0, 3), (11, 3)]);
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(matches!(
            LineMatcher::build("", &SearchOptions::default()),
            Err(TermscrollError::InvalidArgument { .. })
        ));
        assert!(matches!(
            LineMatcher::build("(unclosed", &regex()),
            Err(TermscrollError::InvalidPattern { .. })
        ));
    }
}
