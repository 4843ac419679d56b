//! The merge buffer.

use std::fmt;
use std::mem;

use log::{trace, warn};

use crate::error::SortError;

/// Scratch memory for merges, owned by one engine and reused across merges and sort calls.
///
/// The buffer only grows. It holds a copy of the shorter of two runs for the duration of one
/// merge and is logically empty otherwise.
pub struct TempBuffer<U> {
    buf: Vec<U>,
    limit: Option<usize>,
    peak: usize,
}

impl<U> Default for TempBuffer<U> {
    fn default() -> Self {
        Self {
            buf: Vec::new(),
            limit: None,
            peak: 0,
        }
    }
}

impl<U> fmt::Debug for TempBuffer<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TempBuffer")
            .field("capacity_bytes", &self.capacity_bytes())
            .field("limit", &self.limit)
            .field("peak", &self.peak)
            .finish()
    }
}

impl<U: Copy> TempBuffer<U> {
    /// Replaces the buffer contents with a copy of `src`, growing it if necessary.
    ///
    /// On failure the buffer is empty and nothing has been copied.
    pub(crate) fn load(&mut self, src: &[U]) -> Result<&[U], SortError> {
        self.buf.clear();
        self.ensure_capacity(src.len())?;
        self.buf.extend_from_slice(src);
        self.peak = self.peak.max(src.len());

        Ok(&self.buf)
    }

    /// Makes sure `len` units fit without reallocation.
    pub(crate) fn ensure_capacity(&mut self, len: usize) -> Result<(), SortError> {
        let old_capacity = self.buf.capacity();
        if len <= old_capacity {
            return Ok(());
        }

        let bytes = len.saturating_mul(mem::size_of::<U>());
        if self.limit.map_or(false, |limit| bytes > limit) {
            warn!("merge buffer growth to {bytes} bytes refused by limit {:?}", self.limit);
            return Err(SortError::OutOfMemory { bytes });
        }

        // The contents are dead between merges. Reserving from length zero gives exactly `len`
        // units of room.
        self.buf.clear();
        if let Err(err) = self.buf.try_reserve_exact(len) {
            warn!("merge buffer allocation of {bytes} bytes failed: {err}");
            return Err(SortError::OutOfMemory { bytes });
        }

        trace!(
            "merge buffer grew from {} to {} bytes",
            old_capacity * mem::size_of::<U>(),
            self.buf.capacity() * mem::size_of::<U>()
        );

        Ok(())
    }
}

impl<U> TempBuffer<U> {
    pub(crate) fn set_limit(&mut self, limit: Option<usize>) {
        self.limit = limit;
    }

    /// Largest number of units held since the last [`reset_peak`](Self::reset_peak).
    pub(crate) fn peak(&self) -> usize {
        self.peak
    }

    pub(crate) fn reset_peak(&mut self) {
        self.peak = 0;
    }

    pub(crate) fn capacity_bytes(&self) -> usize {
        self.buf.capacity() * mem::size_of::<U>()
    }

    /// Frees the allocation. The next merge allocates again.
    pub(crate) fn release(&mut self) {
        self.buf = Vec::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_copies_and_tracks_peak() {
        let mut temp = TempBuffer::<u32>::default();
        assert_eq!(temp.load(&[1, 2, 3]).unwrap(), &[1, 2, 3]);
        assert_eq!(temp.load(&[9]).unwrap(), &[9]);
        assert_eq!(temp.peak(), 3);

        temp.reset_peak();
        assert_eq!(temp.peak(), 0);
    }

    #[test]
    fn capacity_is_reused() {
        let mut temp = TempBuffer::<u64>::default();
        temp.load(&[0; 100]).unwrap();
        let capacity = temp.capacity_bytes();
        assert!(capacity >= 800);

        temp.load(&[1; 10]).unwrap();
        temp.load(&[2; 100]).unwrap();
        assert_eq!(temp.capacity_bytes(), capacity);

        temp.release();
        assert_eq!(temp.capacity_bytes(), 0);
    }

    #[test]
    fn limit_refuses_growth() {
        let mut temp = TempBuffer::<u16>::default();
        temp.set_limit(Some(8));

        assert!(temp.load(&[7; 4]).is_ok());
        assert_eq!(
            temp.load(&[7; 5]),
            Err(SortError::OutOfMemory { bytes: 10 })
        );

        temp.set_limit(None);
        assert!(temp.load(&[7; 5]).is_ok());
    }

    #[test]
    fn impossible_allocation_is_reported() {
        let mut temp = TempBuffer::<u64>::default();
        let err = temp.ensure_capacity(usize::MAX / 8).unwrap_err();
        assert!(matches!(err, SortError::OutOfMemory { .. }));
    }
}
