//! The stack of pending runs.
//!
//! Runs on the stack are adjacent in the sequence, bottom to top, and their lengths shrink at least
//! as fast as the Fibonacci numbers towards the top:
//!
//! ```text
//! len[i] > len[i + 1] + len[i + 2]
//! len[i + 1] > len[i + 2]
//! ```
//!
//! This keeps every merge roughly balanced and bounds the depth logarithmically in the input
//! length. The invariant is re-established after every push by [`RunStack::rebalance`] looking at
//! the top three runs only. That is not always enough to restore it further down, so in rare
//! inputs the stack can grow deeper than the bound suggests. [`RunStack::push`] then reports the
//! overflow and the caller merges to make room.

use std::fmt;

/// Upper bound on pending runs for any input that fits in memory with a 64-bit `usize`, plus one
/// for the freshly pushed run that has not been rebalanced yet.
pub(crate) const MAX_RUNS: usize = 85;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Run {
    pub(crate) start: usize,
    pub(crate) len: usize,
}

impl Run {
    #[inline]
    pub(crate) fn end(self) -> usize {
        self.start + self.len
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct StackFull;

pub(crate) struct RunStack {
    runs: [Run; MAX_RUNS],
    len: usize,
}

impl Default for RunStack {
    fn default() -> Self {
        Self {
            runs: [Run::default(); MAX_RUNS],
            len: 0,
        }
    }
}

impl fmt::Debug for RunStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.runs()).finish()
    }
}

impl RunStack {
    pub(crate) fn clear(&mut self) {
        self.len = 0;
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn runs(&self) -> &[Run] {
        &self.runs[..self.len]
    }

    pub(crate) fn push(&mut self, run: Run) -> Result<(), StackFull> {
        if self.len == MAX_RUNS {
            return Err(StackFull);
        }

        debug_assert!(self.len == 0 || self.runs[self.len - 1].end() == run.start);
        self.runs[self.len] = run;
        self.len += 1;

        Ok(())
    }

    /// Merges the runs at `i` and `i + 1` through `merge` and records the combined run.
    ///
    /// The stack is left unchanged if `merge` fails.
    fn merge_at<E>(
        &mut self,
        i: usize,
        merge: &mut impl FnMut(Run, Run) -> Result<(), E>,
    ) -> Result<(), E> {
        let left = self.runs[i];
        let right = self.runs[i + 1];
        debug_assert_eq!(left.end(), right.start);

        merge(left, right)?;

        self.runs[i].len += right.len;
        self.runs.copy_within(i + 2..self.len, i + 1);
        self.len -= 1;

        Ok(())
    }

    /// Merges the top two runs. Used to make room when the stack is full.
    pub(crate) fn merge_top<E>(
        &mut self,
        mut merge: impl FnMut(Run, Run) -> Result<(), E>,
    ) -> Result<(), E> {
        debug_assert!(self.len >= 2);
        self.merge_at(self.len - 2, &mut merge)
    }

    /// Restores the length invariant for the top of the stack after a push.
    pub(crate) fn rebalance<E>(
        &mut self,
        mut merge: impl FnMut(Run, Run) -> Result<(), E>,
    ) -> Result<(), E> {
        while self.len > 1 {
            let n = self.len;
            let len = |i: usize| self.runs[i].len;

            if n >= 3 && len(n - 3) <= len(n - 2) + len(n - 1) {
                // Merge the smaller neighbour into the middle run.
                if len(n - 3) <= len(n - 1) {
                    self.merge_at(n - 3, &mut merge)?;
                } else {
                    self.merge_at(n - 2, &mut merge)?;
                }
            } else if len(n - 2) <= len(n - 1) {
                self.merge_at(n - 2, &mut merge)?;
            } else {
                break;
            }
        }

        Ok(())
    }

    /// Merges top down until a single run is left.
    pub(crate) fn collapse<E>(
        &mut self,
        mut merge: impl FnMut(Run, Run) -> Result<(), E>,
    ) -> Result<(), E> {
        while self.len > 1 {
            self.merge_at(self.len - 2, &mut merge)?;
        }

        Ok(())
    }
}
