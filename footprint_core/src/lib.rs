// footprint_core/src/lib.rs

//! Derives the `base_footprint` frame of a legged robot from the poses of its
//! feet and torso, at the timestamps of an incoming trigger stream.
//!
//! The crate is framework-agnostic: the transform store and the publisher are
//! traits, and the pipeline only ever talks to them through handles passed in
//! at construction.

pub mod config;
pub mod error;
pub mod footprint;
pub mod pipeline;
pub mod prelude;
pub mod publisher;
pub mod store;
pub mod sync;
pub mod types;
