use std::cmp::Ordering;

/// A stable sort under test.
///
/// Element types are restricted to `Copy` types without padding bytes, so that implementations
/// sorting raw byte records can view any test input as bytes.
pub trait Sort {
    fn name() -> String;

    fn sort<T>(arr: &mut [T])
    where
        T: Ord + Copy;

    fn sort_by<T, F>(arr: &mut [T], compare: F)
    where
        T: Copy,
        F: FnMut(&T, &T) -> Ordering;
}

pub mod patterns;
