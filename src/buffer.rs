//! Bounded, thread-safe line store.
//!
//! [`LineStore`] is the only state shared between producer threads and the
//! interactive loop. A single `parking_lot` mutex covers every operation for
//! its full read-then-copy, and scans ([`LineStore::scan`]) hold it for their
//! entire duration so search and export see one consistent snapshot.
//!
//! When an append would exceed capacity the oldest line is evicted first and
//! every surviving index shifts down by one. Consumers that hold indices
//! across calls compare [`Epoch`] values to notice such shifts.

pub mod line;
mod ring;

pub use line::{Line, LineContext, LineMeta};

use crate::error::{Result, TermscrollError};
use parking_lot::Mutex;
use ring::LineRing;
use std::ops::Range;

/// Monotonic mutation counters for a store.
///
/// These let single-threaded consumers (scroll cursor, search results) detect
/// what other threads did to the store since they last looked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Epoch {
    /// Lines appended over the store's lifetime
    pub appended: u64,
    /// Lines dropped by capacity eviction
    pub evicted: u64,
    /// Times the store was cleared or closed
    pub cleared: u64,
}

impl Epoch {
    /// Whether indices taken at `earlier` may now refer to different lines
    pub fn shifts_indices_since(&self, earlier: &Epoch) -> bool {
        self.evicted != earlier.evicted || self.cleared != earlier.cleared
    }
}

#[derive(Debug)]
struct StoreInner {
    ring: LineRing,
    epoch: Epoch,
    closed: bool,
}

/// Bounded FIFO store of lines, safe to share as `Arc<LineStore>`.
#[derive(Debug)]
pub struct LineStore {
    inner: Mutex<StoreInner>,
}

impl LineStore {
    /// Create a store holding at most `capacity` lines
    ///
    /// # Errors
    /// * `InvalidArgument` if `capacity` is zero
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(TermscrollError::invalid_argument(
                "line store capacity must be positive",
            ));
        }
        Ok(Self {
            inner: Mutex::new(StoreInner {
                ring: LineRing::new(capacity),
                epoch: Epoch::default(),
                closed: false,
            }),
        })
    }

    /// Append a line, evicting the oldest one when the store is full
    ///
    /// # Arguments
    /// * `text` - Line text, copied into the store
    /// * `meta` - Metadata; `None` means context Normal, current time, no tag
    ///
    /// # Returns
    /// * Index of the new line (always `count() - 1` at the time of the call)
    ///
    /// # Errors
    /// * `OutOfMemory` if copying the text fails; the store is left untouched
    /// * `NotInitialized` if the store was closed
    pub fn append(&self, text: &str, meta: Option<LineMeta>) -> Result<usize> {
        // Copy before locking so an allocation failure never touches the store
        let line = Line::copy_from(text, meta.unwrap_or_default())?;

        let mut inner = self.inner.lock();
        if inner.closed {
            return Err(TermscrollError::NotInitialized);
        }
        if inner.ring.push(line).is_some() {
            inner.epoch.evicted += 1;
        }
        inner.epoch.appended += 1;
        Ok(inner.ring.len() - 1)
    }

    /// Clone the line at `index` (0 = oldest)
    pub fn get(&self, index: usize) -> Option<Line> {
        let inner = self.inner.lock();
        inner.ring.get(index).cloned()
    }

    /// Clone only the metadata of the line at `index`
    pub fn get_meta(&self, index: usize) -> Option<LineMeta> {
        let inner = self.inner.lock();
        inner.ring.get(index).map(|line| line.meta().clone())
    }

    /// Discard every line; the backing allocation is kept for reuse
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.ring.clear();
        inner.epoch.cleared += 1;
    }

    /// Number of buffered lines
    pub fn count(&self) -> usize {
        self.inner.lock().ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().ring.capacity()
    }

    /// Current mutation counters
    pub fn epoch(&self) -> Epoch {
        self.inner.lock().epoch
    }

    /// Tear the store down: drop all lines and refuse further appends and scans
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        if inner.closed {
            return;
        }
        inner.ring.clear();
        inner.closed = true;
        inner.epoch.cleared += 1;
        log::debug!("line store closed after {} appends", inner.epoch.appended);
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Run `f` over a consistent view of the store with the lock held
    ///
    /// Keep `f` to in-memory work: every producer blocks until it returns.
    ///
    /// # Errors
    /// * `NotInitialized` if the store was closed
    pub fn scan<R>(&self, f: impl FnOnce(Snapshot<'_>) -> R) -> Result<R> {
        let inner = self.inner.lock();
        if inner.closed {
            return Err(TermscrollError::NotInitialized);
        }
        Ok(f(Snapshot {
            ring: &inner.ring,
            epoch: inner.epoch,
        }))
    }

    /// Clone the newest `n` lines, oldest first
    pub fn tail(&self, n: usize) -> Vec<Line> {
        let inner = self.inner.lock();
        let len = inner.ring.len();
        (len.saturating_sub(n)..len)
            .filter_map(|i| inner.ring.get(i).cloned())
            .collect()
    }

    /// Clone the lines in `range`, clamped to the current contents
    pub fn lines_in(&self, range: Range<usize>) -> Vec<Line> {
        let inner = self.inner.lock();
        let end = range.end.min(inner.ring.len());
        (range.start.min(end)..end)
            .filter_map(|i| inner.ring.get(i).cloned())
            .collect()
    }
}

/// Read-only view of the store, valid while its lock is held.
#[derive(Clone, Copy)]
pub struct Snapshot<'a> {
    ring: &'a LineRing,
    epoch: Epoch,
}

impl<'a> Snapshot<'a> {
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<&'a Line> {
        self.ring.get(index)
    }

    /// Mutation counters as of this snapshot
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// All lines, oldest first
    pub fn iter(&self) -> Iter<'a> {
        self.range(0..self.ring.len())
    }

    /// Lines in `range`, clamped to the snapshot length
    pub fn range(&self, range: Range<usize>) -> Iter<'a> {
        let end = range.end.min(self.ring.len());
        Iter {
            ring: self.ring,
            index: range.start.min(end),
            end,
        }
    }
}

/// Iterator over snapshot lines in logical order
#[derive(Clone)]
pub struct Iter<'a> {
    ring: &'a LineRing,
    index: usize,
    end: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Line;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.end {
            return None;
        }
        let line = self.ring.get(self.index)?;
        self.index += 1;
        Some(line)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.index;
        (remaining, Some(remaining))
    }
}

impl<'a> ExactSizeIterator for Iter<'a> {}
