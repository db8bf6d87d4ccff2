use proptest::prelude::*;

use termscroll::export::normalize_range;
use termscroll::{LineStore, ScrollCursor, SearchEngine};

proptest! {
    #[test]
    fn count_never_exceeds_capacity(capacity in 1usize..64, appends in 0usize..200) {
        let store = LineStore::new(capacity).unwrap();
        for i in 0..appends {
            store.append(&i.to_string(), None).unwrap();
            prop_assert!(store.count() <= capacity);
        }
        prop_assert_eq!(store.count(), appends.min(capacity));
    }

    #[test]
    fn store_keeps_the_newest_lines_in_order(capacity in 1usize..32, appends in 1usize..100) {
        let store = LineStore::new(capacity).unwrap();
        for i in 0..appends {
            store.append(&i.to_string(), None).unwrap();
        }
        let first = appends.saturating_sub(capacity);
        for (index, expected) in (first..appends).enumerate() {
            let line = store.get(index).unwrap();
            prop_assert_eq!(line.text(), expected.to_string());
        }
    }

    #[test]
    fn eviction_shifts_indices_by_one(capacity in 2usize..32) {
        let store = LineStore::new(capacity).unwrap();
        for i in 0..capacity {
            store.append(&i.to_string(), None).unwrap();
        }
        let before: Vec<String> = (1..capacity)
            .map(|i| store.get(i).unwrap().text().to_string())
            .collect();
        store.append("new", None).unwrap();
        for (i, text) in before.iter().enumerate() {
            let line = store.get(i).unwrap();
            prop_assert_eq!(line.text(), text.as_str());
        }
    }

    #[test]
    fn scroll_offset_stays_within_count(
        count in 0usize..500,
        deltas in proptest::collection::vec(-1000i64..1000, 0..20),
        height in 1usize..50,
    ) {
        let mut cursor = ScrollCursor::new();
        for delta in deltas {
            cursor.scroll_by(delta, count);
            prop_assert!(cursor.offset() <= count);
            let range = cursor.visible_range(count, height);
            prop_assert!(range.end <= count);
            prop_assert!(range.len() <= height);
        }
    }

    #[test]
    fn normalized_ranges_are_in_bounds(start in -10i64..20, end in -10i64..20, len in 0usize..15) {
        if let Ok(range) = normalize_range(start, end, len) {
            prop_assert!(range.start() <= range.end());
            prop_assert!(*range.end() < len);
        }
    }

    #[test]
    fn search_results_are_sorted_and_deterministic(
        lines in proptest::collection::vec("[ab ]{0,12}", 0..20),
    ) {
        let store = LineStore::new(64).unwrap();
        for line in &lines {
            store.append(line, None).unwrap();
        }
        let mut engine = SearchEngine::new();
        let first = engine.search(&store, "ab", false).unwrap().to_vec();
        let second = engine.search(&store, "ab", false).unwrap().to_vec();
        prop_assert_eq!(&first, &second);
        prop_assert!(first.windows(2).all(|pair| pair[0] < pair[1]));

        let expected: usize = lines.iter().map(|l| l.matches("ab").count()).sum();
        prop_assert_eq!(first.len(), expected);
    }
}
