//! One-shot progress checkpoints.
//!
//! Definitions are kept sorted ascending by threshold (ties keep insertion
//! order). A run never mutates them; the frame driver tracks which ones fired.

use std::fmt;

pub type CheckpointFn<'a> = Box<dyn FnMut() + 'a>;

#[derive(Default)]
pub struct Checkpoints<'a> {
    entries: Vec<(f64, CheckpointFn<'a>)>,
}

impl<'a> Checkpoints<'a> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Builder form of [`Checkpoints::insert`].
    pub fn at(mut self, threshold: f64, f: impl FnMut() + 'a) -> Self {
        self.insert(threshold, f);
        self
    }

    /// Register `f` to fire once per run when progress reaches `threshold`.
    /// Thresholds above 1 never fire; NaN never fires.
    pub fn insert(&mut self, threshold: f64, f: impl FnMut() + 'a) {
        let idx = self
            .entries
            .partition_point(|(t, _)| t.total_cmp(&threshold).is_le());
        self.entries.insert(idx, (threshold, Box::new(f)));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Thresholds in firing order.
    pub fn thresholds(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|(t, _)| *t)
    }

    /// Borrowing view over the same callbacks, for handing to a single run.
    pub fn reborrow(&mut self) -> Checkpoints<'_> {
        Checkpoints {
            entries: self
                .entries
                .iter_mut()
                .map(|(t, f)| (*t, Box::new(move || f()) as CheckpointFn<'_>))
                .collect(),
        }
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [(f64, CheckpointFn<'a>)] {
        &mut self.entries
    }
}

impl fmt::Debug for Checkpoints<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.thresholds()).finish()
    }
}
