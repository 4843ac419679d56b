//! How a sequence stores its elements.
//!
//! A [`Layout`] fixes the slice type the engine sorts, the type the comparator sees and which
//! element-move strategy runs. Handle mode is `Handles<T>`: one element per `T`. Inline mode is
//! [`Inline`]: records of a fixed byte size in a `[u8]`. For inline records whose size is a
//! multiple of the word size, stored word aligned, each sort call switches to moving whole words.

use std::fmt;
use std::mem;

use crate::compare::Comparator;
use crate::driver;
use crate::elem::{Bytes, Handles, Words};
use crate::engine::SortStats;
use crate::error::SortError;
use crate::stack::RunStack;
use crate::temp::TempBuffer;

mod sealed {
    pub trait Sealed {}

    impl<T: Copy> Sealed for crate::elem::Handles<T> {}
    impl Sealed for super::Inline {}
}

/// Element layout of a sequence. Implemented by `Handles<T>` and [`Inline`] only.
pub trait Layout: Copy + fmt::Debug + sealed::Sealed {
    /// Slice element type of the sequence.
    type Unit: Copy;

    /// What the comparator receives for one element.
    type Item: ?Sized;

    #[doc(hidden)]
    type Buffers: MergeBuffers;

    /// Size of one element in bytes.
    fn stride(&self) -> usize;

    /// Number of elements stored in `v`.
    fn count(&self, v: &[Self::Unit]) -> usize;

    #[doc(hidden)]
    fn sort_with<C>(
        &self,
        v: &mut [Self::Unit],
        cmp: &mut C,
        scratch: &mut Scratch<Self::Buffers>,
    ) -> Result<(), SortError>
    where
        C: Comparator<Self::Item>;

    #[doc(hidden)]
    fn reserve(&self, buffers: &mut Self::Buffers, elements: usize) -> Result<(), SortError>;
}

/// Engine state that outlives a single sort call.
#[doc(hidden)]
#[derive(Debug, Default)]
pub struct Scratch<B> {
    pub(crate) buffers: B,
    pub(crate) runs: RunStack,
    pub(crate) stats: SortStats,
}

#[doc(hidden)]
pub trait MergeBuffers: Default + fmt::Debug {
    fn set_limit(&mut self, bytes: Option<usize>);

    fn capacity_bytes(&self) -> usize;

    fn release(&mut self);
}

impl<U> MergeBuffers for TempBuffer<U> {
    fn set_limit(&mut self, bytes: Option<usize>) {
        TempBuffer::set_limit(self, bytes);
    }

    fn capacity_bytes(&self) -> usize {
        TempBuffer::capacity_bytes(self)
    }

    fn release(&mut self) {
        TempBuffer::release(self);
    }
}

impl<T: Copy> Layout for Handles<T> {
    type Unit = T;
    type Item = T;
    type Buffers = TempBuffer<T>;

    fn stride(&self) -> usize {
        mem::size_of::<T>()
    }

    fn count(&self, v: &[T]) -> usize {
        v.len()
    }

    fn sort_with<C>(
        &self,
        v: &mut [T],
        cmp: &mut C,
        scratch: &mut Scratch<TempBuffer<T>>,
    ) -> Result<(), SortError>
    where
        C: Comparator<T>,
    {
        let Scratch {
            buffers,
            runs,
            stats,
        } = scratch;

        driver::sort(*self, v, cmp, buffers, runs, stats)
    }

    fn reserve(&self, buffers: &mut TempBuffer<T>, elements: usize) -> Result<(), SortError> {
        buffers.ensure_capacity(elements)
    }
}

/// Inline mode: the sequence is a `[u8]` holding records of `stride` bytes each.
///
/// Comparators receive `&[u8]` of exactly `stride` bytes. Records are not necessarily aligned, so
/// a comparator that wants to read a typed value has to use an unaligned read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Inline {
    stride: u8,
}

impl Inline {
    pub const fn new(stride: u8) -> Self {
        debug_assert!(stride != 0, "inline records must not be empty");
        Self { stride }
    }
}

/// Byte and word merge buffers of an inline engine. Each call uses one of them, depending on the
/// strategy it picks.
#[doc(hidden)]
#[derive(Debug, Default)]
pub struct InlineBuffers {
    bytes: TempBuffer<u8>,
    words: TempBuffer<usize>,
}

impl MergeBuffers for InlineBuffers {
    fn set_limit(&mut self, bytes: Option<usize>) {
        self.bytes.set_limit(bytes);
        self.words.set_limit(bytes);
    }

    fn capacity_bytes(&self) -> usize {
        self.bytes.capacity_bytes() + self.words.capacity_bytes()
    }

    fn release(&mut self) {
        self.bytes.release();
        self.words.release();
    }
}

impl Inline {
    fn words(self) -> Option<Words> {
        let stride = self.stride as usize;
        (stride % Words::WORD == 0).then(|| Words {
            words: stride / Words::WORD,
        })
    }
}

impl Layout for Inline {
    type Unit = u8;
    type Item = [u8];
    type Buffers = InlineBuffers;

    fn stride(&self) -> usize {
        self.stride as usize
    }

    fn count(&self, v: &[u8]) -> usize {
        v.len() / self.stride as usize
    }

    fn sort_with<C>(
        &self,
        v: &mut [u8],
        cmp: &mut C,
        scratch: &mut Scratch<InlineBuffers>,
    ) -> Result<(), SortError>
    where
        C: Comparator<[u8]>,
    {
        debug_assert!(v.len() % self.stride as usize == 0);

        let Scratch {
            buffers,
            runs,
            stats,
        } = scratch;

        if let Some(s) = self.words() {
            // SAFETY: every bit pattern is a valid `usize`, and the records are only ever read
            // back through their native byte representation.
            let (prefix, words, suffix) = unsafe { v.align_to_mut::<usize>() };
            if prefix.is_empty() && suffix.is_empty() {
                return driver::sort(s, words, cmp, &mut buffers.words, runs, stats);
            }
        }

        let s = Bytes {
            stride: self.stride as usize,
        };
        driver::sort(s, v, cmp, &mut buffers.bytes, runs, stats)
    }

    fn reserve(&self, buffers: &mut InlineBuffers, elements: usize) -> Result<(), SortError> {
        match self.words() {
            Some(s) => buffers.words.ensure_capacity(elements.saturating_mul(s.words)),
            None => buffers
                .bytes
                .ensure_capacity(elements.saturating_mul(self.stride as usize)),
        }
    }
}
