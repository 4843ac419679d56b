//! Stable, adaptive, in-place merge sort over fixed-stride sequences.
//!
//! The algorithm is a TimSort-style hybrid: natural runs are detected and extended to a minimum
//! length by binary insertion, kept on a stack whose lengths grow like the Fibonacci numbers, and
//! merged pairwise with galloping. A merge buffers only the shorter of its two runs, so the
//! auxiliary memory never exceeds half the sequence.
//!
//! Two element layouts share the same algorithm:
//!
//! - [`Handles<T>`]: a `[T]` of handles, typically machine words, references or indices.
//! - [`Inline`]: a `[u8]` of records, each `stride` bytes long.
//!
//! [`MergeSort`] is the reusable engine. It keeps its merge buffer across calls.

mod compare;
mod driver;
mod elem;
mod engine;
mod error;
mod layout;
mod merge;
mod run;
mod search;
mod stack;
mod temp;

pub use compare::{Comparator, Stateful};
pub use elem::Handles;
pub use engine::{sort_handles_by, sort_inline_by, MergeSort, SortStats};
pub use error::SortError;
pub use layout::{Inline, Layout};

#[doc(hidden)]
pub use layout::{InlineBuffers, MergeBuffers, Scratch};
#[doc(hidden)]
pub use temp::TempBuffer;
