//! Merging two adjacent sorted runs.
//!
//! The shorter run is copied into the merge buffer, so a merge of runs of length `L` and `R`
//! needs room for `min(L, R)` elements. If the left run is the shorter one the merge proceeds
//! from the low end upwards, otherwise it runs mirrored from the high end downwards.
//!
//! Both directions start in one-at-a-time mode and switch into galloping mode once one side has
//! won `min_gallop` comparisons in a row. In galloping mode each side in turn is searched for how
//! many of its elements precede the other side's head, and the whole block is moved at once. The
//! mode is left again once neither side produces a block of at least `MIN_GALLOP` elements.
//! `min_gallop` drops by one for every galloping round and rises by two on leaving, so that
//! galloping stays cheap on inputs where it does not pay off.

use std::cmp::Ordering;

use crate::compare::Comparator;
use crate::elem::Strategy;
use crate::error::SortError;
use crate::search::{rsearch_ge, rsearch_gt, search_ge, search_gt};
use crate::temp::TempBuffer;

/// Block length that keeps a merge in galloping mode, and the initial switch-over threshold.
pub(crate) const MIN_GALLOP: usize = 7;

/// Merges the non-decreasing runs `v[..mid]` and `v[mid..]` (element indices) in place.
///
/// Both runs must be non-empty. Equal elements of the left run end up before those of the right
/// run. If the buffer cannot grow the error is returned before any element was moved.
pub(crate) fn merge<S, C>(
    s: S,
    v: &mut [S::Unit],
    mid: usize,
    temp: &mut TempBuffer<S::Unit>,
    cmp: &mut C,
) -> Result<(), SortError>
where
    S: Strategy,
    C: Comparator<S::Item>,
{
    let len = s.count(v);
    assert!(mid > 0 && mid < len);

    if mid <= len - mid {
        merge_lo(s, v, mid, temp, cmp)
    } else {
        merge_hi(s, v, mid, temp, cmp)
    }
}

fn merge_lo<S, C>(
    s: S,
    v: &mut [S::Unit],
    mid: usize,
    temp: &mut TempBuffer<S::Unit>,
    cmp: &mut C,
) -> Result<(), SortError>
where
    S: Strategy,
    C: Comparator<S::Item>,
{
    let w = s.width();
    let len = s.count(v);

    // Left elements not greater than the first right element are already in place.
    let skip = search_gt(s, cmp, s.at(v, mid), &v[..mid * w]);
    if skip == mid {
        return Ok(());
    }

    let v = &mut v[skip * w..];
    let left_len = mid - skip;
    let buf = temp.load(&v[..left_len * w])?;

    let mut hole = LoHole {
        s,
        v,
        buf,
        left: 0,
        left_end: left_len,
        right: left_len,
        right_end: len - skip,
        dest: 0,
    };

    // v[left_len] is smaller than buf[0], otherwise it would have been skipped.
    hole.take_right(1);
    if hole.right == hole.right_end {
        return Ok(());
    }

    let mut min_gallop = MIN_GALLOP;

    'merge: loop {
        let mut left_wins = 0;
        let mut right_wins = 0;

        loop {
            if cmp.compare(s.at(hole.v, hole.right), s.at(hole.buf, hole.left)) == Ordering::Less {
                hole.take_right(1);
                if hole.right == hole.right_end {
                    break 'merge;
                }
                right_wins += 1;
                left_wins = 0;
                if right_wins >= min_gallop {
                    break;
                }
            } else {
                hole.take_left(1);
                if hole.left == hole.left_end {
                    break 'merge;
                }
                left_wins += 1;
                right_wins = 0;
                if left_wins >= min_gallop {
                    break;
                }
            }
        }

        loop {
            min_gallop -= (min_gallop > 1) as usize;

            left_wins = search_gt(
                s,
                cmp,
                s.at(hole.v, hole.right),
                &hole.buf[hole.left * w..hole.left_end * w],
            );
            if left_wins != 0 {
                hole.take_left(left_wins);
                if hole.left == hole.left_end {
                    break 'merge;
                }
            }
            hole.take_right(1);
            if hole.right == hole.right_end {
                break 'merge;
            }

            right_wins = search_ge(
                s,
                cmp,
                s.at(hole.buf, hole.left),
                &hole.v[hole.right * w..hole.right_end * w],
            );
            if right_wins != 0 {
                hole.take_right(right_wins);
                if hole.right == hole.right_end {
                    break 'merge;
                }
            }
            hole.take_left(1);
            if hole.left == hole.left_end {
                break 'merge;
            }

            if left_wins < MIN_GALLOP && right_wins < MIN_GALLOP {
                break;
            }
        }

        min_gallop += 2;
    }

    // Dropping `hole` moves what is left of the buffered run into place.
    Ok(())
}

fn merge_hi<S, C>(
    s: S,
    v: &mut [S::Unit],
    mid: usize,
    temp: &mut TempBuffer<S::Unit>,
    cmp: &mut C,
) -> Result<(), SortError>
where
    S: Strategy,
    C: Comparator<S::Item>,
{
    let w = s.width();
    let len = s.count(v);

    // Right elements not less than the last left element are already in place.
    let keep = rsearch_ge(s, cmp, s.at(v, mid - 1), &v[mid * w..]);
    let end = len - keep;
    if end == mid {
        return Ok(());
    }

    let v = &mut v[..end * w];
    let buf = temp.load(&v[mid * w..])?;

    let mut hole = HiHole {
        s,
        v,
        buf,
        left: mid,
        right: end - mid,
        dest: end,
    };

    // v[mid - 1] is greater than the last buffered element, otherwise that one would have been
    // kept in place.
    hole.take_left(1);
    if hole.left == 0 {
        return Ok(());
    }

    let mut min_gallop = MIN_GALLOP;

    'merge: loop {
        let mut left_wins = 0;
        let mut right_wins = 0;

        loop {
            if cmp.compare(s.at(hole.buf, hole.right - 1), s.at(hole.v, hole.left - 1))
                == Ordering::Less
            {
                hole.take_left(1);
                if hole.left == 0 {
                    break 'merge;
                }
                left_wins += 1;
                right_wins = 0;
                if left_wins >= min_gallop {
                    break;
                }
            } else {
                hole.take_right(1);
                if hole.right == 0 {
                    break 'merge;
                }
                right_wins += 1;
                left_wins = 0;
                if right_wins >= min_gallop {
                    break;
                }
            }
        }

        loop {
            min_gallop -= (min_gallop > 1) as usize;

            left_wins = rsearch_gt(
                s,
                cmp,
                s.at(hole.buf, hole.right - 1),
                &hole.v[..hole.left * w],
            );
            if left_wins != 0 {
                hole.take_left(left_wins);
                if hole.left == 0 {
                    break 'merge;
                }
            }
            hole.take_right(1);
            if hole.right == 0 {
                break 'merge;
            }

            right_wins = rsearch_ge(
                s,
                cmp,
                s.at(hole.v, hole.left - 1),
                &hole.buf[..hole.right * w],
            );
            if right_wins != 0 {
                hole.take_right(right_wins);
                if hole.right == 0 {
                    break 'merge;
                }
            }
            hole.take_left(1);
            if hole.left == 0 {
                break 'merge;
            }

            if left_wins < MIN_GALLOP && right_wins < MIN_GALLOP {
                break;
            }
        }

        min_gallop += 2;
    }

    // Dropping `hole` moves what is left of the buffered run into place.
    Ok(())
}

// The merge state of a low-to-high merge. Unconsumed buffered elements `buf[left..left_end]` always
// fit exactly into the hole `v[dest..right]`. When dropped, either because the merge finished or
// because the comparator panicked, the buffered rest is copied into the hole, so `v` holds every
// element it held before exactly once.
struct LoHole<'a, S: Strategy> {
    s: S,
    v: &'a mut [S::Unit],
    buf: &'a [S::Unit],
    left: usize,
    left_end: usize,
    right: usize,
    right_end: usize,
    dest: usize,
}

impl<'a, S: Strategy> LoHole<'a, S> {
    #[inline(always)]
    fn take_left(&mut self, n: usize) {
        self.s.copy(self.buf, self.left, self.v, self.dest, n);
        self.left += n;
        self.dest += n;
    }

    #[inline(always)]
    fn take_right(&mut self, n: usize) {
        self.s.shift(self.v, self.right, self.dest, n);
        self.right += n;
        self.dest += n;
    }
}

impl<'a, S: Strategy> Drop for LoHole<'a, S> {
    fn drop(&mut self) {
        debug_assert_eq!(self.dest + (self.left_end - self.left), self.right);
        self.s.copy(
            self.buf,
            self.left,
            self.v,
            self.dest,
            self.left_end - self.left,
        );
    }
}

// Mirror of `LoHole`. Left elements `v[..left]` and buffered right elements `buf[..right]` are
// unconsumed, the hole is `v[left..dest]` and has room for exactly `right` elements.
struct HiHole<'a, S: Strategy> {
    s: S,
    v: &'a mut [S::Unit],
    buf: &'a [S::Unit],
    left: usize,
    right: usize,
    dest: usize,
}

impl<'a, S: Strategy> HiHole<'a, S> {
    #[inline(always)]
    fn take_left(&mut self, n: usize) {
        self.left -= n;
        self.dest -= n;
        self.s.shift(self.v, self.left, self.dest, n);
    }

    #[inline(always)]
    fn take_right(&mut self, n: usize) {
        self.right -= n;
        self.dest -= n;
        self.s.copy(self.buf, self.right, self.v, self.dest, n);
    }
}

impl<'a, S: Strategy> Drop for HiHole<'a, S> {
    fn drop(&mut self) {
        debug_assert_eq!(self.left + self.right, self.dest);
        self.s.copy(self.buf, 0, self.v, self.left, self.right);
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{self, AssertUnwindSafe};

    use rand::prelude::*;

    use super::*;
    use crate::elem::{Bytes, Handles};

    fn merged<T: Copy + Ord + std::fmt::Debug>(left: &[T], right: &[T]) -> (Vec<T>, usize) {
        let mut v = left.to_vec();
        v.extend_from_slice(right);
        let mut temp = TempBuffer::default();
        merge(
            Handles::<T>::new(),
            &mut v,
            left.len(),
            &mut temp,
            &mut |a: &T, b: &T| a.cmp(b),
        )
        .unwrap();

        (v, temp.peak())
    }

    fn sorted_random(rng: &mut StdRng, len: usize, range: u32) -> Vec<u32> {
        let mut v: Vec<u32> = (0..len).map(|_| rng.gen_range(0..range)).collect();
        v.sort();
        v
    }

    #[test]
    fn disjoint_runs_need_logarithmic_comparisons() {
        let left: Vec<u32> = (0..1000).collect();
        let right: Vec<u32> = (1000..2000).collect();

        for (a, b) in [(&left, &right), (&right, &left)] {
            let mut v = a.clone();
            v.extend_from_slice(b);
            let mut temp = TempBuffer::default();
            let mut comps = 0;
            merge(Handles::<u32>::new(), &mut v, 1000, &mut temp, &mut |x: &u32, y: &u32| {
                comps += 1;
                x.cmp(y)
            })
            .unwrap();

            assert!(v.windows(2).all(|w| w[0] <= w[1]));
            // When the runs are already in order nothing gets buffered.
            if a[0] == 0 {
                assert!(comps <= 2 * 10 + 2, "{comps} comparisons");
                assert_eq!(temp.peak(), 0);
            }
        }
    }

    #[test]
    fn swapped_blocks_gallop() {
        // Every element of the right run precedes every element of the left run. After the first
        // few one-at-a-time steps the whole rest moves in galloping blocks.
        let left: Vec<u32> = (1000..2000).collect();
        let right: Vec<u32> = (0..1000).collect();
        let mut v = left.clone();
        v.extend_from_slice(&right);

        let mut temp = TempBuffer::default();
        let mut comps = 0;
        merge(Handles::<u32>::new(), &mut v, 1000, &mut temp, &mut |x: &u32, y: &u32| {
            comps += 1;
            x.cmp(y)
        })
        .unwrap();

        assert_eq!(v, (0..2000).collect::<Vec<_>>());
        assert!(comps < 100, "{comps} comparisons");
    }

    #[test]
    fn buffer_holds_shorter_run_only() {
        let mut rng = StdRng::seed_from_u64(7);

        for (left_len, right_len) in [(1000, 10), (10, 1000), (1, 500), (500, 1), (300, 300)] {
            let left = sorted_random(&mut rng, left_len, 10_000);
            let right = sorted_random(&mut rng, right_len, 10_000);

            let (v, peak) = merged(&left, &right);
            let mut expected = left.clone();
            expected.extend_from_slice(&right);
            expected.sort();

            assert_eq!(v, expected);
            assert!(peak <= left_len.min(right_len), "{left_len} {right_len} {peak}");
        }
    }

    #[test]
    fn random_splits_match_std() {
        let mut rng = StdRng::seed_from_u64(99);

        for _ in 0..500 {
            let len = rng.gen_range(2..300);
            let mid = rng.gen_range(1..len);
            let range = *[2, 10, 1000, u32::MAX].choose(&mut rng).unwrap();

            let left = sorted_random(&mut rng, mid, range);
            let right = sorted_random(&mut rng, len - mid, range);

            let (v, _) = merged(&left, &right);
            let mut expected = left.clone();
            expected.extend_from_slice(&right);
            expected.sort();
            assert_eq!(v, expected);
        }
    }

    #[test]
    fn equal_keys_stay_in_run_order() {
        let mut rng = StdRng::seed_from_u64(3);

        for (left_len, right_len) in [(40, 400), (400, 40), (200, 200), (3, 90), (90, 3)] {
            // Keys repeat a lot so that galloping meets equal elements on both sides.
            let left: Vec<(u32, u32)> = sorted_random(&mut rng, left_len, 20)
                .into_iter()
                .zip(0..)
                .collect();
            let right: Vec<(u32, u32)> = sorted_random(&mut rng, right_len, 20)
                .into_iter()
                .zip(10_000..)
                .collect();

            let mut v = left.clone();
            v.extend_from_slice(&right);
            let mut temp = TempBuffer::default();
            merge(
                Handles::<(u32, u32)>::new(),
                &mut v,
                left_len,
                &mut temp,
                &mut |a: &(u32, u32), b: &(u32, u32)| a.0.cmp(&b.0),
            )
            .unwrap();

            // The tag grows with the original position, so a stable merge is sorted by both.
            assert!(v.windows(2).all(|w| w[0] <= w[1]), "{left_len} {right_len}");
        }
    }

    #[test]
    fn byte_records_merge_both_directions() {
        let s = Bytes { stride: 3 };
        for (input, mid) in [(&b"a01c02b03d04e05"[..], 2), (&b"b01d02e03a04c05"[..], 3)] {
            let mut v = input.to_vec();
            let mut temp = TempBuffer::default();
            merge(s, &mut v, mid, &mut temp, &mut |a: &[u8], b: &[u8]| a[0].cmp(&b[0])).unwrap();

            let keys: Vec<u8> = v.chunks(3).map(|r| r[0]).collect();
            assert_eq!(keys, b"abcde");
            assert!(temp.peak() <= 3 * 2);
        }
    }

    #[test]
    fn refused_buffer_leaves_input_untouched() {
        let left = [5u64, 6, 7, 8];
        let right = [1u64, 2, 3, 9, 10];
        let mut v = left.to_vec();
        v.extend_from_slice(&right);
        let before = v.clone();

        let mut temp = TempBuffer::default();
        temp.set_limit(Some(16));
        let res = merge(
            Handles::<u64>::new(),
            &mut v,
            4,
            &mut temp,
            &mut |a: &u64, b: &u64| a.cmp(b),
        );

        assert_eq!(res, Err(SortError::OutOfMemory { bytes: 32 }));
        assert_eq!(v, before);
    }

    #[test]
    fn comparator_panic_keeps_every_element() {
        let mut rng = StdRng::seed_from_u64(11);

        for panic_at in 0..60 {
            for (left_len, right_len) in [(30, 50), (50, 30)] {
                let left = sorted_random(&mut rng, left_len, 100);
                let right = sorted_random(&mut rng, right_len, 100);
                let mut v = left.clone();
                v.extend_from_slice(&right);

                let mut expected = v.clone();
                expected.sort();

                let mut temp = TempBuffer::default();
                let mut comps = 0;
                let _ = panic::catch_unwind(AssertUnwindSafe(|| {
                    merge(
                        Handles::<u32>::new(),
                        &mut v,
                        left_len,
                        &mut temp,
                        &mut |a: &u32, b: &u32| {
                            if comps == panic_at {
                                panic!("comparison {panic_at}");
                            }
                            comps += 1;
                            a.cmp(b)
                        },
                    )
                }));

                v.sort();
                assert_eq!(v, expected);
            }
        }
    }
}
