//! Neighborhood evaluation backends and their resolution.
//!
//! Evaluating the full swap neighborhood only reads the problem and the
//! current permutation, so every pair can be computed independently. The
//! backends differ only in how that work is scheduled; all of them must agree
//! with [`SequentialBackend`] up to floating-point rounding.
//!
//! The backend is chosen once per solve. [`BackendChoice::Auto`] walks an
//! ordered list of capability probes and takes the first backend that
//! accepts the instance. An explicit choice that this build cannot provide
//! is reported as an error instead of being replaced.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::delta::{swap_delta, SwapDeltas};
#[cfg(feature = "parallel")]
use super::delta::{pair_at, pair_count};
use crate::error::SolverError;
use crate::problem::{AssignmentProblem, Permutation};

/// Computes every swap delta of a permutation.
pub trait NeighborhoodBackend: Send + Sync {
    /// Short identifier, reported in solutions and logs.
    fn name(&self) -> &'static str;

    /// Fills `out` with the delta of every swap pair of `perm`.
    ///
    /// `out` must have been created for `perm.len()`.
    fn evaluate(&self, problem: &AssignmentProblem, perm: &Permutation, out: &mut SwapDeltas);
}

/// Single-threaded reference backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialBackend;

impl NeighborhoodBackend for SequentialBackend {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn evaluate(&self, problem: &AssignmentProblem, perm: &Permutation, out: &mut SwapDeltas) {
        debug_assert_eq!(out.size(), perm.len());
        let n = perm.len();
        let p = perm.as_slice();
        let values = out.values_mut();
        let mut idx = 0;
        for i in 0..n {
            for j in (i + 1)..n {
                values[idx] = swap_delta(problem, p, i, j);
                idx += 1;
            }
        }
    }
}

/// Fans the rows of the pair triangle out over the rayon pool.
#[cfg(feature = "parallel")]
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelBackend;

#[cfg(feature = "parallel")]
impl NeighborhoodBackend for ParallelBackend {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn evaluate(&self, problem: &AssignmentProblem, perm: &Permutation, out: &mut SwapDeltas) {
        debug_assert_eq!(out.size(), perm.len());
        let n = perm.len();
        let p = perm.as_slice();

        let mut rows: Vec<(usize, &mut [f64])> = Vec::with_capacity(n);
        let mut rest = out.values_mut();
        for i in 0..n.saturating_sub(1) {
            let (row, tail) = std::mem::take(&mut rest).split_at_mut(n - i - 1);
            rows.push((i, row));
            rest = tail;
        }

        rows.into_par_iter().for_each(|(i, row)| {
            for (offset, slot) in row.iter_mut().enumerate() {
                *slot = swap_delta(problem, p, i, i + 1 + offset);
            }
        });
    }
}

/// Splits the flat pair index space into fixed-size batches, each one an
/// independent unit of work on the rayon pool.
///
/// This is the shape a device kernel would take: one launch per batch, each
/// work item decoding its own pair from a flat index.
#[cfg(feature = "parallel")]
#[derive(Debug, Clone, Copy)]
pub struct BatchedBackend {
    batch_size: usize,
}

#[cfg(feature = "parallel")]
impl BatchedBackend {
    /// Creates a backend processing `batch_size` pairs per batch (at least 1).
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    /// Batch size giving each worker a few batches for an instance of size `n`.
    pub fn for_size(n: usize, threads: usize) -> Self {
        let per_batch = pair_count(n) / (threads.max(1) * 4);
        Self::new(per_batch.clamp(64, 4096))
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

#[cfg(feature = "parallel")]
impl NeighborhoodBackend for BatchedBackend {
    fn name(&self) -> &'static str {
        "batched"
    }

    fn evaluate(&self, problem: &AssignmentProblem, perm: &Permutation, out: &mut SwapDeltas) {
        debug_assert_eq!(out.size(), perm.len());
        let n = perm.len();
        let p = perm.as_slice();
        let batch_size = self.batch_size;

        out.values_mut()
            .par_chunks_mut(batch_size)
            .enumerate()
            .for_each(|(batch, chunk)| {
                let start = pair_at(n, batch * batch_size);
                let (mut i, mut j) = (start.i, start.j);
                for slot in chunk.iter_mut() {
                    *slot = swap_delta(problem, p, i, j);
                    j += 1;
                    if j == n {
                        i += 1;
                        j = i + 1;
                    }
                }
            });
    }
}

/// Requested neighborhood backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum BackendChoice {
    /// First backend accepted by the capability probes.
    #[default]
    Auto,
    Sequential,
    Parallel,
    Batched,
}

/// The backend a solve actually runs with.
#[derive(Debug, Clone, Copy)]
pub enum ResolvedBackend {
    Sequential(SequentialBackend),
    #[cfg(feature = "parallel")]
    Parallel(ParallelBackend),
    #[cfg(feature = "parallel")]
    Batched(BatchedBackend),
}

impl NeighborhoodBackend for ResolvedBackend {
    fn name(&self) -> &'static str {
        match self {
            ResolvedBackend::Sequential(b) => b.name(),
            #[cfg(feature = "parallel")]
            ResolvedBackend::Parallel(b) => b.name(),
            #[cfg(feature = "parallel")]
            ResolvedBackend::Batched(b) => b.name(),
        }
    }

    fn evaluate(&self, problem: &AssignmentProblem, perm: &Permutation, out: &mut SwapDeltas) {
        match self {
            ResolvedBackend::Sequential(b) => b.evaluate(problem, perm, out),
            #[cfg(feature = "parallel")]
            ResolvedBackend::Parallel(b) => b.evaluate(problem, perm, out),
            #[cfg(feature = "parallel")]
            ResolvedBackend::Batched(b) => b.evaluate(problem, perm, out),
        }
    }
}

/// What the running process can offer to neighborhood evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Whether the thread-pool backends are compiled in.
    pub parallel_compiled: bool,
    /// Worker threads available to the pool.
    pub threads: usize,
}

impl Capabilities {
    /// Inspects the current build and thread pool.
    pub fn detect() -> Self {
        #[cfg(feature = "parallel")]
        {
            Self {
                parallel_compiled: true,
                threads: rayon::current_num_threads(),
            }
        }
        #[cfg(not(feature = "parallel"))]
        {
            Self {
                parallel_compiled: false,
                threads: 1,
            }
        }
    }
}

/// Smallest instance the row-parallel backend is probed for.
pub const PARALLEL_MIN_SIZE: usize = 16;
/// Smallest instance the batched backend is probed for.
pub const BATCHED_MIN_SIZE: usize = 64;

#[derive(Debug, Clone, Copy)]
enum Probe {
    Batched,
    Parallel,
    Sequential,
}

/// Probe order for [`BackendChoice::Auto`], most capable first.
const AUTO_PROBES: [Probe; 3] = [Probe::Batched, Probe::Parallel, Probe::Sequential];

impl Probe {
    /// Whether `Auto` should pick this backend for size `n`.
    fn accepts(self, n: usize, caps: Capabilities) -> bool {
        match self {
            Probe::Batched => caps.parallel_compiled && caps.threads > 1 && n >= BATCHED_MIN_SIZE,
            Probe::Parallel => caps.parallel_compiled && caps.threads > 1 && n >= PARALLEL_MIN_SIZE,
            Probe::Sequential => true,
        }
    }

    /// Builds the backend if it exists in this build.
    #[allow(unused_variables)]
    fn build(self, n: usize, caps: Capabilities) -> Option<ResolvedBackend> {
        match self {
            Probe::Sequential => Some(ResolvedBackend::Sequential(SequentialBackend)),
            #[cfg(feature = "parallel")]
            Probe::Parallel if caps.parallel_compiled => {
                Some(ResolvedBackend::Parallel(ParallelBackend))
            }
            #[cfg(feature = "parallel")]
            Probe::Batched if caps.parallel_compiled => Some(ResolvedBackend::Batched(
                BatchedBackend::for_size(n, caps.threads),
            )),
            _ => None,
        }
    }
}

/// Resolves `choice` for an instance of size `n` against the current process.
pub fn resolve_backend(choice: BackendChoice, n: usize) -> Result<ResolvedBackend, SolverError> {
    resolve_with(choice, n, Capabilities::detect())
}

/// Resolves `choice` against explicit capabilities.
pub fn resolve_with(
    choice: BackendChoice,
    n: usize,
    caps: Capabilities,
) -> Result<ResolvedBackend, SolverError> {
    let resolved = match choice {
        BackendChoice::Auto => AUTO_PROBES
            .iter()
            .filter(|probe| probe.accepts(n, caps))
            .find_map(|probe| probe.build(n, caps)),
        BackendChoice::Sequential => Probe::Sequential.build(n, caps),
        BackendChoice::Parallel => Probe::Parallel.build(n, caps),
        BackendChoice::Batched => Probe::Batched.build(n, caps),
    };
    let backend = resolved.ok_or(SolverError::BackendUnavailable(choice))?;
    tracing::debug!(
        ?choice,
        n,
        threads = caps.threads,
        backend = backend.name(),
        "resolved neighborhood backend"
    );
    Ok(backend)
}
