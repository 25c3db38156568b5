use std::time::SystemTime;

use crate::filters::FilterParams;

/// Bounded linear undo history. Entries after the cursor are the redo branch;
/// pushing prunes it.
pub const MAX_HISTORY: usize = 20;

/// One snapshot of render state: the current surface encoded as PNG plus the
/// slider values at that moment. Restoring an entry replaces both wholesale.
#[derive(Clone)]
pub struct HistoryEntry {
    pub png: Vec<u8>,
    pub filters: FilterParams,
    pub taken_at: SystemTime,
}

impl HistoryEntry {
    pub fn new(png: Vec<u8>, filters: FilterParams) -> Self {
        Self {
            png,
            filters,
            taken_at: SystemTime::now(),
        }
    }
}

#[derive(Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.entries.is_empty() && self.cursor + 1 < self.entries.len()
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.cursor)
    }

    /// Append a snapshot. If the cursor sits before the tail, the redo branch
    /// is discarded first. Exceeding [`MAX_HISTORY`] evicts the oldest entry;
    /// in that case the cursor already names the tail after the shift and must
    /// not advance again.
    pub fn push(&mut self, entry: HistoryEntry) {
        if !self.entries.is_empty() && self.cursor + 1 < self.entries.len() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(entry);
        if self.entries.len() > MAX_HISTORY {
            self.entries.remove(0);
        } else if self.entries.len() > 1 {
            self.cursor += 1;
        }
        debug_assert_eq!(self.cursor, self.entries.len() - 1);
    }

    /// Step back one entry. Returns the entry to restore, or `None` when
    /// already at the oldest state.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward one entry. Returns the entry to restore, or `None` when
    /// already at the newest state.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(tag: u8) -> HistoryEntry {
        HistoryEntry::new(vec![tag], FilterParams::default())
    }

    #[test]
    fn cursor_tracks_latest_push() {
        let mut h = History::new();
        for i in 0..5 {
            h.push(entry(i));
            assert_eq!(h.cursor(), i as usize);
            assert_eq!(h.current().unwrap().png, vec![i]);
        }
    }

    #[test]
    fn log_stays_bounded_and_cursor_points_at_tail() {
        let mut h = History::new();
        for i in 0..(MAX_HISTORY as u8 + 15) {
            h.push(entry(i));
            assert!(h.len() <= MAX_HISTORY);
            assert_eq!(h.current().unwrap().png, vec![i]);
        }
        assert_eq!(h.len(), MAX_HISTORY);
        assert_eq!(h.cursor(), MAX_HISTORY - 1);
        // Oldest entries were evicted FIFO.
        assert_eq!(h.entries[0].png, vec![15]);
    }

    #[test]
    fn undo_then_redo_round_trips() {
        let mut h = History::new();
        for i in 0..3 {
            h.push(entry(i));
        }
        let before = h.current().unwrap().png.clone();
        h.undo().unwrap();
        assert_eq!(h.current().unwrap().png, vec![1]);
        let restored = h.redo().unwrap();
        assert_eq!(restored.png, before);
        assert_eq!(h.cursor(), 2);
    }

    #[test]
    fn push_after_undo_prunes_redo_branch() {
        let mut h = History::new();
        for i in [0u8, 1, 2] {
            h.push(entry(i));
        }
        h.undo().unwrap(); // cursor at B (index 1)
        h.push(entry(3)); // [A, B, D]
        assert_eq!(h.len(), 3);
        assert_eq!(h.cursor(), 2);
        assert_eq!(h.current().unwrap().png, vec![3]);
        assert!(!h.can_redo());
    }

    #[test]
    fn undo_at_oldest_and_redo_at_newest_are_noops() {
        let mut h = History::new();
        assert!(h.undo().is_none());
        assert!(h.redo().is_none());
        h.push(entry(0));
        assert!(h.undo().is_none());
        assert!(h.redo().is_none());
        assert_eq!(h.cursor(), 0);
    }
}
