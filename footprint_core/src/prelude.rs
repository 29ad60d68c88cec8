// footprint_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::publisher::TransformPublisher;
pub use crate::store::TransformStore;

// --- Core Data Structures ---
pub use crate::types::{FrameId, Pose, Stamp, StampedTransform, Trigger};

// --- Configuration & Errors ---
pub use crate::config::{FootprintConfig, FootprintFrames};
pub use crate::error::{BufferError, ConfigError, FootprintError, LookupError};

// --- Pipeline ---
pub use crate::footprint::{compute_footprint, footprint_in_odom, FootprintInputs};
pub use crate::pipeline::{FootprintPipeline, TriggerOutcome, TriggerState};
pub use crate::sync::{Release, SyncStats, Synchronizer};

// --- Concrete Implementations ---
pub use crate::publisher::{BufferBroadcaster, RecordingPublisher};
pub use crate::store::TransformBuffer;
