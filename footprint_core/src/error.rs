// footprint_core/src/error.rs

use crate::types::{FrameId, Stamp};
use thiserror::Error;

/// Why a transform could not be resolved by a [`TransformStore`](crate::store::TransformStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("frame '{0}' does not exist in the transform tree")]
    UnknownFrame(FrameId),

    #[error("frames '{0}' and '{1}' are not part of the same tree")]
    NotConnected(FrameId, FrameId),

    #[error("frame '{0}' has no transform data")]
    Empty(FrameId),

    #[error(
        "lookup of '{frame}' at {stamp} requires extrapolation, data covers [{oldest}, {newest}]"
    )]
    Extrapolation {
        frame: FrameId,
        stamp: Stamp,
        oldest: Stamp,
        newest: Stamp,
    },
}

/// Rejected insertions into a [`TransformBuffer`](crate::store::TransformBuffer).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    #[error("frame '{0}' cannot be its own parent")]
    SelfParent(FrameId),

    #[error("attaching '{child}' to '{parent}' would create a cycle")]
    Cycle { parent: FrameId, child: FrameId },

    #[error("transform for '{0}' contains non-finite values")]
    NonFinite(FrameId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("queue size must be at least 1")]
    ZeroQueueSize,

    #[error("frame id for '{0}' is empty")]
    EmptyFrameId(&'static str),

    #[error("frames '{0}' and '{1}' must be distinct")]
    DuplicateFrame(FrameId, FrameId),
}

/// A footprint cycle that could not be completed for one trigger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FootprintError {
    /// The three inputs must be read at one instant, which "latest" does not pin down.
    #[error("trigger #{0} has no timestamp")]
    Unstamped(u64),

    #[error("could not look up '{parent}' -> '{child}': {source}")]
    Lookup {
        parent: FrameId,
        child: FrameId,
        #[source]
        source: LookupError,
    },
}
