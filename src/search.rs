//! Exponential ("galloping") searches over a sorted run.
//!
//! All four searches answer "how many elements at one end of `run` satisfy a predicate relative to
//! `key`". They first probe offsets 1, 2, 4, 8, ... until the predicate fails or the run ends, then
//! binary search the last bracket. The cost is O(log k) comparisons where k is the answer, not
//! O(log n) in the run length, which is what makes galloping cheap when the answer is small.
//!
//! `run` must hold at least one element and be sorted ascending under `cmp`.

use std::cmp::Ordering;

use crate::compare::Comparator;
use crate::elem::Strategy;

/// Largest `c` in `0..=n` with `holds(c)`, where `holds` is monotone: true up to some point,
/// false after. `holds(0)` is implicitly true and never evaluated.
#[inline(always)]
fn gallop(n: usize, mut holds: impl FnMut(usize) -> bool) -> usize {
    debug_assert!(n >= 1);

    if !holds(1) {
        return 0;
    }

    // holds(lo) is known true, holds(hi) is known false or hi == n + 1.
    let mut lo = 1;
    let mut hi = 2;
    loop {
        if hi > n {
            hi = n + 1;
            break;
        }
        if !holds(hi) {
            break;
        }
        lo = hi;
        hi <<= 1;
    }

    while hi - lo > 1 {
        let mid = lo + ((hi - lo) >> 1);
        if holds(mid) {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    lo
}

/// Index of the first element `>= key`, i.e. the number of leading elements `< key`.
#[inline]
pub(crate) fn search_ge<S, C>(s: S, cmp: &mut C, key: &S::Item, run: &[S::Unit]) -> usize
where
    S: Strategy,
    C: Comparator<S::Item>,
{
    gallop(s.count(run), |c| {
        cmp.compare(s.at(run, c - 1), key) == Ordering::Less
    })
}

/// Index of the first element `> key`, i.e. the number of leading elements `<= key`.
#[inline]
pub(crate) fn search_gt<S, C>(s: S, cmp: &mut C, key: &S::Item, run: &[S::Unit]) -> usize
where
    S: Strategy,
    C: Comparator<S::Item>,
{
    gallop(s.count(run), |c| {
        cmp.compare(s.at(run, c - 1), key) != Ordering::Greater
    })
}

/// Number of trailing elements `>= key`, probed from the end of the run.
#[inline]
pub(crate) fn rsearch_ge<S, C>(s: S, cmp: &mut C, key: &S::Item, run: &[S::Unit]) -> usize
where
    S: Strategy,
    C: Comparator<S::Item>,
{
    let n = s.count(run);
    gallop(n, |c| cmp.compare(s.at(run, n - c), key) != Ordering::Less)
}

/// Number of trailing elements `> key`, probed from the end of the run.
#[inline]
pub(crate) fn rsearch_gt<S, C>(s: S, cmp: &mut C, key: &S::Item, run: &[S::Unit]) -> usize
where
    S: Strategy,
    C: Comparator<S::Item>,
{
    let n = s.count(run);
    gallop(n, |c| cmp.compare(s.at(run, n - c), key) == Ordering::Greater)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elem::{Bytes, Handles};

    const H: Handles<i32> = Handles::new();

    fn by_value() -> impl FnMut(&i32, &i32) -> Ordering {
        |a: &i32, b: &i32| a.cmp(b)
    }

    #[test]
    fn matches_linear_scan() {
        let run = [1, 3, 3, 3, 5, 8, 8, 13, 21, 21, 21, 34];

        for key in 0..36 {
            let lt = run.iter().filter(|x| **x < key).count();
            let le = run.iter().filter(|x| **x <= key).count();

            assert_eq!(search_ge(H, &mut by_value(), &key, &run), lt, "key {key}");
            assert_eq!(search_gt(H, &mut by_value(), &key, &run), le, "key {key}");
            assert_eq!(rsearch_ge(H, &mut by_value(), &key, &run), run.len() - lt, "key {key}");
            assert_eq!(rsearch_gt(H, &mut by_value(), &key, &run), run.len() - le, "key {key}");
        }
    }

    #[test]
    fn single_element_run() {
        let run = [7];
        assert_eq!(search_ge(H, &mut by_value(), &7, &run), 0);
        assert_eq!(search_gt(H, &mut by_value(), &7, &run), 1);
        assert_eq!(rsearch_ge(H, &mut by_value(), &7, &run), 1);
        assert_eq!(rsearch_gt(H, &mut by_value(), &7, &run), 0);
    }

    #[test]
    fn cost_follows_answer_not_length() {
        let run: Vec<i32> = (0..1_000_000).collect();

        let mut comps = 0;
        let mut cmp = |a: &i32, b: &i32| {
            comps += 1;
            a.cmp(b)
        };
        assert_eq!(search_ge(H, &mut cmp, &3, &run), 3);
        assert!(comps <= 6, "{comps} comparisons for offset 3");

        comps = 0;
        let mut cmp = |a: &i32, b: &i32| {
            comps += 1;
            a.cmp(b)
        };
        assert_eq!(rsearch_gt(H, &mut cmp, &999_995, &run), 4);
        assert!(comps <= 6, "{comps} comparisons for offset 4");

        comps = 0;
        let mut cmp = |a: &i32, b: &i32| {
            comps += 1;
            a.cmp(b)
        };
        assert_eq!(search_gt(H, &mut cmp, &i32::MAX, &run), run.len());
        // 20 doubling probes plus 19 bisection steps at most.
        assert!(comps <= 2 * 20 + 1, "{comps} comparisons for the full run");
    }

    #[test]
    fn byte_records() {
        let s = Bytes { stride: 2 };
        let run = *b"a0b0b1c0";
        let mut cmp = |a: &[u8], b: &[u8]| a[0].cmp(&b[0]);

        assert_eq!(search_ge(s, &mut cmp, &b"b9"[..], &run), 1);
        assert_eq!(search_gt(s, &mut cmp, &b"b9"[..], &run), 3);
        assert_eq!(rsearch_ge(s, &mut cmp, &b"b9"[..], &run), 3);
        assert_eq!(rsearch_gt(s, &mut cmp, &b"b9"[..], &run), 1);
    }
}
