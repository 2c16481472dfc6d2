use thiserror::Error;

/// The two designed failure paths of the simulation kernel.
///
/// Everything else (NaN masses, negative lengths) is left to propagate
/// through the arithmetic untouched; the kernel does not sanitize inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// State and parameters describe a different number of links. This is a
    /// caller contract violation, never silently truncated or padded.
    #[error("state describes {state} links but parameters describe {params}")]
    DimensionMismatch { state: usize, params: usize },

    /// Elimination left a zero diagonal pivot, so the dynamics matrix cannot
    /// be solved. Only surfaced under [`SingularPolicy::Reject`].
    ///
    /// [`SingularPolicy::Reject`]: crate::solver::SingularPolicy::Reject
    #[error("dynamics matrix is singular at pivot column {column}")]
    SingularSystem { column: usize },
}
