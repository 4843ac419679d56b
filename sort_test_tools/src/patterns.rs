use std::env;
use std::str::FromStr;
use std::sync::Mutex;

use once_cell::sync::Lazy;
use rand::prelude::*;

use zipf::ZipfDistribution;

/// Input patterns for testing and benchmarking merge sorts. Values are i32, derived types are
/// built from them by the callers.
///
/// Random patterns draw from a seed that is fixed per process, printed by the test harness and
/// overridable with the `OVERRIDE_SEED` environment variable.

// --- Public ---

pub fn random(len: usize) -> Vec<i32> {
    //     .
    // : . : :
    // :.:::.::

    random_vec(len)
}

pub fn random_uniform<R>(len: usize, range: R) -> Vec<i32>
where
    R: Into<rand::distributions::Uniform<i32>>,
{
    // :.:.:.::
    let mut rng = new_seed();
    let dist: rand::distributions::Uniform<i32> = range.into();

    (0..len).map(|_| dist.sample(&mut rng)).collect()
}

pub fn random_zipf(len: usize, exponent: f64) -> Vec<i32> {
    // https://en.wikipedia.org/wiki/Zipf's_law
    let mut rng = new_seed();
    let dist = ZipfDistribution::new(len.max(1), exponent).unwrap();

    (0..len).map(|_| dist.sample(&mut rng) as i32).collect()
}

pub fn random_sorted(len: usize, sorted_percent: f64) -> Vec<i32> {
    //     .:
    //   .:::. :
    // .::::::.::
    // [----][--]
    //  ^      ^
    //  |      |
    // sorted  |
    //     unsorted

    // A sorted prefix followed by new unsorted values from the same distribution.
    let mut v = random_vec(len);
    let sorted_len = ((len as f64) * (sorted_percent / 100.0)).round() as usize;

    v[0..sorted_len].sort_unstable();

    v
}

pub fn all_equal(len: usize) -> Vec<i32> {
    // ......
    // ::::::

    vec![66; len]
}

pub fn ascending(len: usize) -> Vec<i32> {
    //     .:
    //   .:::
    // .:::::

    (0..len as i32).collect()
}

pub fn descending(len: usize) -> Vec<i32> {
    // :.
    // :::.
    // :::::.

    (0..len as i32).rev().collect()
}

pub fn saw_ascending(len: usize, saw_count: usize) -> Vec<i32> {
    //   .:  .:
    // .:::.:::

    if len == 0 {
        return Vec::new();
    }

    let mut vals = random_vec(len);
    let chunks_size = len / saw_count.max(1);

    for chunk in vals.chunks_mut(chunks_size.max(1)) {
        chunk.sort_unstable();
    }

    vals
}

pub fn saw_descending(len: usize, saw_count: usize) -> Vec<i32> {
    // :.  :.
    // :::.:::.

    if len == 0 {
        return Vec::new();
    }

    let mut vals = random_vec(len);
    let chunks_size = len / saw_count.max(1);

    for chunk in vals.chunks_mut(chunks_size.max(1)) {
        chunk.sort_unstable_by_key(|&e| std::cmp::Reverse(e));
    }

    vals
}

pub fn saw_mixed(len: usize, saw_count: usize) -> Vec<i32> {
    // :.  :.    .::.    .:
    // :::.:::..::::::..:::

    if len == 0 {
        return Vec::new();
    }

    let mut vals = random_vec(len);
    let chunks_size = (len / saw_count.max(1)).max(1);
    let saw_directions = random_uniform((len / chunks_size) + 1, 0..=1);

    for (i, chunk) in vals.chunks_mut(chunks_size).enumerate() {
        if saw_directions[i] == 0 {
            chunk.sort_unstable();
        } else {
            chunk.sort_unstable_by_key(|&e| std::cmp::Reverse(e));
        }
    }

    vals
}

pub fn pipe_organ(len: usize) -> Vec<i32> {
    //   .:.
    // .:::::.

    let mut vals = random_vec(len);

    let first_half = &mut vals[0..(len / 2)];
    first_half.sort_unstable();

    let second_half = &mut vals[(len / 2)..len];
    second_half.sort_unstable_by_key(|&e| std::cmp::Reverse(e));

    vals
}

pub fn swapped_halves(len: usize) -> Vec<i32> {
    //     .:
    //   .:::   .:
    // .:::::.:::
    //
    // Two ascending runs where every element of the second precedes every element of the first.
    // Merging them is nearly all galloping.

    let mid = len / 2;
    (mid as i32..len as i32).chain(0..mid as i32).collect()
}

pub fn interleaved_runs(len: usize, run_count: usize) -> Vec<i32> {
    //   .   .   .
    //  .:  .:  .:
    // .::.:::.:::
    //
    // `run_count` ascending runs whose values interleave closely, so that merges rarely gallop.

    let run_count = run_count.max(1);
    let run_len = (len + run_count - 1) / run_count;

    (0..len)
        .map(|i| ((i % run_len.max(1)) * run_count + i / run_len.max(1)) as i32)
        .collect()
}

/// Overwrites the default behavior so that each call to a random derived pattern yields new random
/// values.
///
/// By default `patterns::random(4)` will yield the same values per process invocation.
/// Benchmarks should call this.
pub fn use_random_seed_each_time() {
    let mut seed = SEED_TYPE_AND_VALUE.lock().unwrap();
    if seed.0 == SeedType::ExternalOverride {
        panic!("Using use_random_seed_each_time conflicts with the external seed override.");
    }

    *seed = (SeedType::RandomEachTime, 0);
}

pub fn random_init_seed() -> u64 {
    let (seed_type, seed_val) = *SEED_TYPE_AND_VALUE.lock().unwrap();

    if seed_type == SeedType::RandomEachTime {
        thread_rng().gen()
    } else {
        seed_val
    }
}

// --- Private ---

#[derive(Copy, Clone, PartialEq, Eq)]
enum SeedType {
    RandomEachTime,
    RandomOncePerProcess,
    ExternalOverride,
}

static SEED_TYPE_AND_VALUE: Lazy<Mutex<(SeedType, u64)>> = Lazy::new(|| {
    let seed = match env::var("OVERRIDE_SEED") {
        Ok(seed) => (
            SeedType::ExternalOverride,
            u64::from_str(&seed).expect("OVERRIDE_SEED must be an unsigned integer"),
        ),
        Err(_) => (SeedType::RandomOncePerProcess, thread_rng().gen()),
    };

    Mutex::new(seed)
});

fn new_seed() -> StdRng {
    StdRng::seed_from_u64(random_init_seed())
}

fn random_vec(len: usize) -> Vec<i32> {
    let mut rng = new_seed();

    (0..len).map(|_| rng.gen::<i32>()).collect()
}
