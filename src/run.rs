//! Finding and extending the runs pushed onto the run stack.

use std::cmp::Ordering;

use crate::compare::Comparator;
use crate::elem::Strategy;

/// Runs shorter than this are never extended, whatever the input length.
pub(crate) const MIN_RUN: usize = 32;

/// Length below which a natural run is extended by insertion sort.
///
/// If `n < 64` this is `n`, the whole input is sorted by insertion. Otherwise the result `k` lies
/// in `32..=64` and is chosen so that `n / k` is close to, but not above, a power of two. It is
/// formed from the six most significant bits of `n`, plus one if any of the remaining bits is set.
pub(crate) fn min_run_len(mut n: usize) -> usize {
    let mut shifted_out = 0;
    while n >= 2 * MIN_RUN {
        shifted_out |= n & 1;
        n >>= 1;
    }

    n + shifted_out
}

/// Finds a streak of presorted elements starting at the beginning of `v`. Returns its length and
/// whether it is descending, in which case the caller has to reverse it.
///
/// Ascending streaks are non-strict, descending streaks strict. A descending streak with two equal
/// elements would change their relative order when reversed.
pub(crate) fn find_run<S, C>(s: S, v: &[S::Unit], cmp: &mut C) -> (usize, bool)
where
    S: Strategy,
    C: Comparator<S::Item>,
{
    let len = s.count(v);

    if len < 2 {
        return (len, false);
    }

    let mut end = 2;
    if cmp.compare(s.at(v, 1), s.at(v, 0)) == Ordering::Less {
        while end < len && cmp.compare(s.at(v, end), s.at(v, end - 1)) == Ordering::Less {
            end += 1;
        }
        (end, true)
    } else {
        while end < len && cmp.compare(s.at(v, end), s.at(v, end - 1)) != Ordering::Less {
            end += 1;
        }
        (end, false)
    }
}

/// Sorts `v` assuming `v[..offset]` is already sorted, by binary insertion.
///
/// Each new element is placed after all equal elements of the sorted prefix, which keeps the sort
/// stable. O(n log n) comparisons but O(n^2) moves, so only for short runs.
pub(crate) fn extend_run<S, C>(s: S, v: &mut [S::Unit], offset: usize, cmp: &mut C)
where
    S: Strategy,
    C: Comparator<S::Item>,
{
    let len = s.count(v);
    assert!(offset != 0 && offset <= len);

    let w = s.width();
    for i in offset..len {
        // Invariant: v[..i] is sorted. Find the first element greater than v[i].
        let mut lo = 0;
        let mut hi = i;
        while lo < hi {
            let mid = lo + ((hi - lo) >> 1);
            if cmp.compare(s.at(v, i), s.at(v, mid)) == Ordering::Less {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }

        if lo != i {
            s.rotate_last_to_front(&mut v[lo * w..(i + 1) * w]);
        }
    }
}
