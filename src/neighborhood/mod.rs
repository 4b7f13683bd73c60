//! Swap neighborhood evaluation.
//!
//! The neighborhood of a permutation is every pairwise swap of two agents'
//! slots. [`swap_delta`] prices one swap in O(n); a
//! [`NeighborhoodBackend`] prices all `n(n-1)/2` of them into a
//! [`SwapDeltas`] buffer, sequentially or on the rayon pool.

mod backend;
mod delta;

#[cfg(feature = "parallel")]
pub use backend::{BatchedBackend, ParallelBackend};
pub use backend::{
    resolve_backend, resolve_with, BackendChoice, Capabilities, NeighborhoodBackend,
    ResolvedBackend, SequentialBackend, BATCHED_MIN_SIZE, PARALLEL_MIN_SIZE,
};
pub use delta::{pair_at, pair_count, pair_index, swap_delta, SwapDeltas, SwapPair};
