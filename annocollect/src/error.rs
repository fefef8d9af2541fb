use thiserror::Error;

use crate::data_structs::typedef::{
    ChunkId,
    ContainerId,
    ObjectIndex,
    SeqIdStr,
};

/// Failures of a collection pass.
///
/// `BadLocationShape`, `ConversionFailure` and `EmptyMappingResult` concern a
/// single object: the collector logs them and drops the object. The other
/// variants abort the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectError {
    #[error("sequence id '{0}' could not be resolved")]
    UnresolvedId(SeqIdStr),
    #[error("indirection object {container}:{index} does not point to a single interval")]
    BadLocationShape {
        container: ContainerId,
        index:     ObjectIndex,
    },
    #[error("object {container}:{index} could not be mapped: {reason}")]
    ConversionFailure {
        container: ContainerId,
        index:     ObjectIndex,
        reason:    String,
    },
    #[error("invalid search limit: {0}")]
    LimitConfiguration(String),
    #[error("object {container}:{index} falls outside every conversion")]
    EmptyMappingResult {
        container: ContainerId,
        index:     ObjectIndex,
    },
    #[error("mapping of object {container}:{index} is still pending")]
    UnmappedAccess {
        container: ContainerId,
        index:     ObjectIndex,
    },
    #[error("failed to load chunk {chunk} of container {container}: {reason}")]
    ChunkLoad {
        container: ContainerId,
        chunk:     ChunkId,
        reason:    String,
    },
    #[error("annotation lock of container {0} is poisoned")]
    LockPoisoned(ContainerId),
}

impl CollectError {
    /// Per-object failures are dropped instead of aborting the pass.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CollectError::BadLocationShape { .. }
                | CollectError::ConversionFailure { .. }
                | CollectError::EmptyMappingResult { .. }
        )
    }
}

pub type CollectResult<T> = Result<T, CollectError>;
