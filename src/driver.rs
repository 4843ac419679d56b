//! The sort loop: scan the sequence into runs, keep the run stack balanced, collapse at the end.

use log::warn;

use crate::compare::Comparator;
use crate::elem::Strategy;
use crate::engine::SortStats;
use crate::error::SortError;
use crate::merge::merge;
use crate::run::{extend_run, find_run, min_run_len};
use crate::stack::{Run, RunStack, MAX_RUNS};
use crate::temp::TempBuffer;

/// Sorts `v` with strategy `s`. `stats` must be reset by the caller, the driver only adds to it.
pub(crate) fn sort<S, C>(
    s: S,
    v: &mut [S::Unit],
    cmp: &mut C,
    temp: &mut TempBuffer<S::Unit>,
    runs: &mut RunStack,
    stats: &mut SortStats,
) -> Result<(), SortError>
where
    S: Strategy,
    C: Comparator<S::Item>,
{
    temp.reset_peak();
    runs.clear();

    let res = scan_and_merge(s, v, cmp, temp, runs, stats);

    stats.buffer_peak = temp.peak() / s.width();
    debug_assert!(res.is_err() || runs.len() <= 1);
    runs.clear();

    res
}

fn scan_and_merge<S, C>(
    s: S,
    v: &mut [S::Unit],
    cmp: &mut C,
    temp: &mut TempBuffer<S::Unit>,
    runs: &mut RunStack,
    stats: &mut SortStats,
) -> Result<(), SortError>
where
    S: Strategy,
    C: Comparator<S::Item>,
{
    let len = s.count(v);
    if len < 2 {
        return Ok(());
    }

    let w = s.width();
    let min_run = min_run_len(len);

    let mut start = 0;
    while start < len {
        let tail = &mut v[start * w..];
        let (mut run_len, descending) = find_run(s, tail, cmp);
        if descending {
            s.reverse(&mut tail[..run_len * w]);
        }

        let want = min_run.min(len - start);
        if run_len < want {
            extend_run(s, &mut tail[..want * w], run_len, cmp);
            run_len = want;
        }

        let run = Run {
            start,
            len: run_len,
        };
        stats.runs += 1;

        while runs.push(run).is_err() {
            warn!("run stack full with {MAX_RUNS} pending runs, merging the top two early");
            runs.merge_top(|a, b| merge_runs(s, v, a, b, cmp, temp, stats))?;
        }
        runs.rebalance(|a, b| merge_runs(s, v, a, b, cmp, temp, stats))?;

        start += run_len;
    }

    runs.collapse(|a, b| merge_runs(s, v, a, b, cmp, temp, stats))
}

fn merge_runs<S, C>(
    s: S,
    v: &mut [S::Unit],
    left: Run,
    right: Run,
    cmp: &mut C,
    temp: &mut TempBuffer<S::Unit>,
    stats: &mut SortStats,
) -> Result<(), SortError>
where
    S: Strategy,
    C: Comparator<S::Item>,
{
    let w = s.width();
    merge(s, &mut v[left.start * w..right.end() * w], left.len, temp, cmp)?;
    stats.merges += 1;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elem::{Bytes, Handles};

    fn sort_u32(v: &mut [u32]) -> (SortStats, usize) {
        let mut temp = TempBuffer::default();
        let mut runs = RunStack::default();
        let mut stats = SortStats::default();
        let mut comps = 0;

        sort(
            Handles::<u32>::new(),
            v,
            &mut |a: &u32, b: &u32| {
                comps += 1;
                a.cmp(b)
            },
            &mut temp,
            &mut runs,
            &mut stats,
        )
        .unwrap();

        (stats, comps)
    }

    #[test]
    fn presorted_input_is_one_run() {
        let mut v: Vec<u32> = (0..1000).collect();
        let (stats, comps) = sort_u32(&mut v);
        assert_eq!((stats.runs, stats.merges, stats.buffer_peak), (1, 0, 0));
        assert_eq!(comps, 999);

        let mut v: Vec<u32> = (0..1000).rev().collect();
        let (stats, comps) = sort_u32(&mut v);
        assert_eq!((stats.runs, stats.merges), (1, 0));
        assert_eq!(comps, 999);
        assert_eq!(v, (0..1000).collect::<Vec<_>>());
    }

    #[test]
    fn short_inputs_compare_nothing() {
        for len in 0..2 {
            let mut v = vec![7u32; len];
            let (stats, comps) = sort_u32(&mut v);
            assert_eq!((stats.runs, comps), (0, 0));
        }
    }

    #[test]
    fn concatenated_runs_merge() {
        // Four ascending blocks of 500, each far longer than the minimum run.
        let mut v: Vec<u32> = (0..2000).map(|i| (i % 500) * 4 + i / 500).collect();
        let (stats, _) = sort_u32(&mut v);

        assert_eq!(v, (0..2000).collect::<Vec<_>>());
        assert_eq!((stats.runs, stats.merges), (4, 3));
        assert!(stats.buffer_peak <= 1000);
    }

    #[test]
    fn run_stack_stays_empty_between_calls() {
        let mut temp = TempBuffer::default();
        let mut runs = RunStack::default();
        let mut stats = SortStats::default();

        let mut v = *b"d1c2b3a4";
        sort(
            Bytes { stride: 2 },
            &mut v,
            &mut |a: &[u8], b: &[u8]| a[0].cmp(&b[0]),
            &mut temp,
            &mut runs,
            &mut stats,
        )
        .unwrap();

        assert_eq!(&v, b"a4b3c2d1");
        assert_eq!(runs.len(), 0);
    }
}
