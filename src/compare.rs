use std::cmp::Ordering;

/// Three-way ordering over elements of type `I`.
///
/// The engine only ever calls [`compare`](Comparator::compare), possibly with one argument living
/// in the merge buffer instead of the caller's sequence. The ordering must be consistent for the
/// elements it is called on, otherwise the result is some unspecified permutation of the input.
pub trait Comparator<I: ?Sized> {
    fn compare(&mut self, a: &I, b: &I) -> Ordering;
}

impl<I: ?Sized, F> Comparator<I> for F
where
    F: FnMut(&I, &I) -> Ordering,
{
    #[inline(always)]
    fn compare(&mut self, a: &I, b: &I) -> Ordering {
        self(a, b)
    }
}

/// Comparison function paired with explicit state that is handed to every call.
///
/// Useful when the ordering depends on data the elements only refer to, for example handles
/// indexing into a table, or when the caller wants to read the state back after sorting.
#[derive(Debug, Clone)]
pub struct Stateful<S, F> {
    state: S,
    compare_fn: F,
}

impl<S, F> Stateful<S, F> {
    pub fn new(state: S, compare_fn: F) -> Self {
        Self { state, compare_fn }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    pub fn into_state(self) -> S {
        self.state
    }
}

impl<I: ?Sized, S, F> Comparator<I> for Stateful<S, F>
where
    F: FnMut(&mut S, &I, &I) -> Ordering,
{
    #[inline(always)]
    fn compare(&mut self, a: &I, b: &I) -> Ordering {
        (self.compare_fn)(&mut self.state, a, b)
    }
}
