//! Element-move strategies.
//!
//! The sort algorithm never looks at element contents. It addresses elements by index into a
//! slice of `Unit`s, where one element occupies `width()` consecutive units. A strategy fixes the
//! unit type, the width and how an element is presented to the comparator. Everything above this
//! module is written once, generic over [`Strategy`], and monomorphized per strategy.

use std::marker::PhantomData;
use std::mem;
use std::slice;

pub(crate) trait Strategy: Copy {
    type Unit: Copy;
    type Item: ?Sized;

    /// Number of units forming one element.
    fn width(self) -> usize;

    /// View of the element stored at the start of `units`.
    fn item(self, units: &[Self::Unit]) -> &Self::Item;

    #[inline(always)]
    fn count(self, v: &[Self::Unit]) -> usize {
        v.len() / self.width()
    }

    #[inline(always)]
    fn at(self, v: &[Self::Unit], i: usize) -> &Self::Item {
        self.item(&v[i * self.width()..])
    }

    /// Copies `n` elements from `src[si..]` to `dst[di..]`.
    #[inline(always)]
    fn copy(self, src: &[Self::Unit], si: usize, dst: &mut [Self::Unit], di: usize, n: usize) {
        let w = self.width();
        dst[di * w..(di + n) * w].copy_from_slice(&src[si * w..(si + n) * w]);
    }

    /// Moves `n` elements inside `v` from `src` to `dst`. The ranges may overlap.
    #[inline(always)]
    fn shift(self, v: &mut [Self::Unit], src: usize, dst: usize, n: usize) {
        let w = self.width();
        v.copy_within(src * w..(src + n) * w, dst * w);
    }

    /// Reverses the order of the elements in `v`.
    fn reverse(self, v: &mut [Self::Unit]) {
        let w = self.width();
        let mut lo = 0;
        let mut hi = self.count(v);

        while lo + 1 < hi {
            hi -= 1;
            let (head, tail) = v.split_at_mut(hi * w);
            head[lo * w..(lo + 1) * w].swap_with_slice(&mut tail[..w]);
            lo += 1;
        }
    }

    /// Moves the last element of `v` to the front, shifting all others up by one.
    #[inline]
    fn rotate_last_to_front(self, v: &mut [Self::Unit]) {
        v.rotate_right(self.width());
    }
}

/// Handle mode: every element is one `T`, usually a machine word such as `usize`, a pointer or a
/// reference. Comparators see `&T`.
pub struct Handles<T>(PhantomData<fn() -> T>);

impl<T> Handles<T> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for Handles<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Handles<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handles<T> {}

impl<T> std::fmt::Debug for Handles<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Handles<{}>", std::any::type_name::<T>())
    }
}

impl<T: Copy> Strategy for Handles<T> {
    type Unit = T;
    type Item = T;

    #[inline(always)]
    fn width(self) -> usize {
        1
    }

    #[inline(always)]
    fn item(self, units: &[T]) -> &T {
        &units[0]
    }

    #[inline(always)]
    fn count(self, v: &[T]) -> usize {
        v.len()
    }

    #[inline]
    fn reverse(self, v: &mut [T]) {
        v.reverse();
    }
}

/// Inline records moved one byte at a time.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Bytes {
    pub(crate) stride: usize,
}

impl Strategy for Bytes {
    type Unit = u8;
    type Item = [u8];

    #[inline(always)]
    fn width(self) -> usize {
        self.stride
    }

    #[inline(always)]
    fn item(self, units: &[u8]) -> &[u8] {
        &units[..self.stride]
    }
}

/// Inline records whose size is a multiple of the word size, stored word aligned, moved one word
/// at a time.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Words {
    pub(crate) words: usize,
}

impl Words {
    pub(crate) const WORD: usize = mem::size_of::<usize>();
}

impl Strategy for Words {
    type Unit = usize;
    type Item = [u8];

    #[inline(always)]
    fn width(self) -> usize {
        self.words
    }

    #[inline(always)]
    fn item(self, units: &[usize]) -> &[u8] {
        let record = &units[..self.words];
        // SAFETY: `record` is a valid, initialized slice and `u8` has no alignment or validity
        // requirements, so its bytes can be viewed for the same lifetime.
        unsafe { slice::from_raw_parts(record.as_ptr().cast::<u8>(), mem::size_of_val(record)) }
    }
}
