// footprint_core/src/types.rs

use nalgebra::Isometry3;
use std::fmt;

// --- Core Type Aliases ---
/// A rigid-body pose: translation plus unit-quaternion rotation.
pub type Pose = Isometry3<f64>;

const NANOS_PER_SEC: f64 = 1e9;

// --- Core Identifiers ---

/// The name of a coordinate frame. Frames are owned and named externally;
/// the core only ever refers to them by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FrameId(String);

impl FrameId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FrameId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for FrameId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for FrameId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A point in time, in integer nanoseconds.
///
/// Integer nanoseconds make "the same timestamp" an exact comparison, which is
/// what the synchronizer and the buffer key their lookups on.
/// `Stamp::ZERO` asks the buffer for the latest time common to a lookup path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Stamp(u64);

impl Stamp {
    pub const ZERO: Stamp = Stamp(0);

    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Negative and non-finite inputs clamp to zero.
    pub fn from_secs_f64(secs: f64) -> Self {
        if secs.is_finite() && secs > 0.0 {
            Self((secs * NANOS_PER_SEC).round() as u64)
        } else {
            Self::ZERO
        }
    }

    pub const fn as_nanos(self) -> u64 {
        self.0
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / NANOS_PER_SEC
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn saturating_sub(self, nanos: u64) -> Self {
        Self(self.0.saturating_sub(nanos))
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.9}", self.as_secs_f64())
    }
}

// =========================================================================
// == Messages ==
// =========================================================================

/// A pose relating `child` to `parent`, valid at `stamp`.
#[derive(Debug, Clone, PartialEq)]
pub struct StampedTransform {
    pub parent: FrameId,
    pub child: FrameId,
    pub stamp: Stamp,
    pub transform: Pose,
}

impl StampedTransform {
    pub fn new(
        parent: impl Into<FrameId>,
        child: impl Into<FrameId>,
        stamp: Stamp,
        transform: Pose,
    ) -> Self {
        Self {
            parent: parent.into(),
            child: child.into(),
            stamp,
            transform,
        }
    }
}

/// A timestamp taken from an incoming sensor message. The payload of the
/// message is not used; it only provides the clock at which all inputs must be
/// jointly valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Trigger {
    /// Sequence number assigned on arrival.
    pub seq: u64,
    pub stamp: Stamp,
}

impl Trigger {
    pub fn new(seq: u64, stamp: Stamp) -> Self {
        Self { seq, stamp }
    }
}
