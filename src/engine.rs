//! The reusable sort engine and one-shot helpers.

use std::fmt;

use log::debug;

use crate::compare::Comparator;
use crate::elem::Handles;
use crate::error::SortError;
use crate::layout::{Inline, Layout, MergeBuffers, Scratch};

/// What happened during the last [`MergeSort::sort`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SortStats {
    /// Number of elements sorted.
    pub elements: usize,
    /// Runs pushed onto the run stack, after extension to the minimum run length.
    pub runs: usize,
    /// Merges of two adjacent runs.
    pub merges: usize,
    /// Most elements held by the merge buffer at any one time.
    pub buffer_peak: usize,
}

/// A stable, adaptive merge sort over sequences of layout `L`, ordered by comparator `C`.
///
/// The engine owns a merge buffer that grows on demand, up to half the longest sequence sorted,
/// and is reused by later calls. It is freed when the engine is dropped or on
/// [`release_buffer`](Self::release_buffer).
///
/// ```ignore
/// let mut engine = MergeSort::handles(|a: &u32, b: &u32| a.cmp(b));
/// let mut v = vec![5, 3, 1, 4, 2];
/// engine.sort(&mut v)?;
/// assert_eq!(v, [1, 2, 3, 4, 5]);
/// ```
pub struct MergeSort<L: Layout, C> {
    layout: L,
    cmp: C,
    scratch: Scratch<L::Buffers>,
}

impl<T: Copy, C: Comparator<T>> MergeSort<Handles<T>, C> {
    /// Engine for slices of `T`.
    pub fn handles(cmp: C) -> Self {
        Self::new(Handles::new(), cmp)
    }
}

impl<C: Comparator<[u8]>> MergeSort<Inline, C> {
    /// Engine for byte slices holding records of `stride` bytes.
    pub fn inline(stride: u8, cmp: C) -> Self {
        Self::new(Inline::new(stride), cmp)
    }
}

impl<L: Layout, C> MergeSort<L, C> {
    pub fn new(layout: L, cmp: C) -> Self {
        Self {
            layout,
            cmp,
            scratch: Scratch::default(),
        }
    }

    pub fn layout(&self) -> L {
        self.layout
    }

    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    pub fn comparator_mut(&mut self) -> &mut C {
        &mut self.cmp
    }

    pub fn into_comparator(self) -> C {
        self.cmp
    }

    /// Swaps the comparator, keeping the merge buffer and its limit.
    pub fn with_comparator<C2>(self, cmp: C2) -> MergeSort<L, C2> {
        MergeSort {
            layout: self.layout,
            cmp,
            scratch: self.scratch,
        }
    }

    /// Refuses to grow the merge buffer beyond `bytes`. A sort that would need more fails with
    /// [`SortError::OutOfMemory`].
    pub fn with_buffer_limit(mut self, bytes: usize) -> Self {
        self.scratch.buffers.set_limit(Some(bytes));
        self
    }

    /// Grows the merge buffer to hold `elements` elements now, rather than during a sort.
    pub fn reserve_buffer(&mut self, elements: usize) -> Result<(), SortError> {
        self.layout.reserve(&mut self.scratch.buffers, elements)
    }

    /// Bytes currently allocated for the merge buffer.
    pub fn buffer_capacity(&self) -> usize {
        self.scratch.buffers.capacity_bytes()
    }

    pub fn release_buffer(&mut self) {
        self.scratch.buffers.release();
    }

    pub fn last_stats(&self) -> SortStats {
        self.scratch.stats
    }
}

impl<L: Layout, C: Comparator<L::Item>> MergeSort<L, C> {
    /// Sorts `v`, keeping equal elements in their original order.
    ///
    /// On error `v` holds a permutation of its original elements, partially sorted.
    pub fn sort(&mut self, v: &mut [L::Unit]) -> Result<(), SortError> {
        self.scratch.stats = SortStats {
            elements: self.layout.count(v),
            ..SortStats::default()
        };

        let res = self.layout.sort_with(v, &mut self.cmp, &mut self.scratch);

        let stats = &self.scratch.stats;
        match &res {
            Ok(()) => debug!(
                "sorted {} elements of {} bytes: {} runs, {} merges, buffer peak {} elements",
                stats.elements,
                self.layout.stride(),
                stats.runs,
                stats.merges,
                stats.buffer_peak
            ),
            Err(err) => debug!(
                "sort of {} elements failed after {} merges: {err}",
                stats.elements, stats.merges
            ),
        }

        res
    }
}

impl<L: Layout, C> fmt::Debug for MergeSort<L, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeSort")
            .field("layout", &self.layout)
            .field("scratch", &self.scratch)
            .finish_non_exhaustive()
    }
}

/// Sorts `v` stably by `cmp` with a temporary engine.
pub fn sort_handles_by<T, C>(v: &mut [T], cmp: C) -> Result<(), SortError>
where
    T: Copy,
    C: Comparator<T>,
{
    MergeSort::handles(cmp).sort(v)
}

/// Sorts the `stride` byte records in `v` stably by `cmp` with a temporary engine.
pub fn sort_inline_by<C>(v: &mut [u8], stride: u8, cmp: C) -> Result<(), SortError>
where
    C: Comparator<[u8]>,
{
    MergeSort::inline(stride, cmp).sort(v)
}
