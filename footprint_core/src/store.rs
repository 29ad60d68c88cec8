// footprint_core/src/store.rs

//! The transform store: "what is the pose of frame B relative to frame A at
//! time T". The pipeline only depends on the [`TransformStore`] trait;
//! [`TransformBuffer`] is the in-memory, time-indexed implementation used by
//! the node and the tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;

use nalgebra::{Isometry3, Translation3};
use parking_lot::RwLock;
use tracing::trace;

use crate::error::{BufferError, LookupError};
use crate::types::{FrameId, Pose, Stamp, StampedTransform};

/// Default length of the history kept per dynamic edge.
pub const DEFAULT_CACHE_TIME: Duration = Duration::from_secs(10);

// =========================================================================
// == Store Contract ==
// =========================================================================

/// Point queries into a time-indexed transform graph.
///
/// Lookups never wait: they either resolve now or fail now. Waiting for data to
/// arrive is the job of the [`Synchronizer`](crate::sync::Synchronizer).
pub trait TransformStore: Send + Sync {
    /// Returns the pose of `child` expressed in `parent` at `stamp`.
    ///
    /// `Stamp::ZERO` asks for the latest time at which the whole path between
    /// the two frames is covered.
    fn lookup(
        &self,
        parent: &FrameId,
        child: &FrameId,
        stamp: Stamp,
    ) -> Result<Pose, LookupError>;

    fn can_transform(&self, parent: &FrameId, child: &FrameId, stamp: Stamp) -> bool {
        self.lookup(parent, child, stamp).is_ok()
    }

    /// True iff every frame in `frames` can be expressed in `reference` at `stamp`.
    fn is_available(&self, reference: &FrameId, frames: &[FrameId], stamp: Stamp) -> bool {
        frames
            .iter()
            .all(|frame| self.can_transform(reference, frame, stamp))
    }
}

// =========================================================================
// == In-Memory Buffer ==
// =========================================================================

#[derive(Debug, Clone)]
enum History {
    Static(Pose),
    Dynamic(BTreeMap<Stamp, Pose>),
}

/// The edge from a child frame to its (single) parent.
#[derive(Debug, Clone)]
struct Edge {
    parent: FrameId,
    history: History,
}

impl Edge {
    /// The parent-to-child pose of this edge at `stamp`.
    fn pose_at(&self, child: &FrameId, stamp: Stamp) -> Result<Pose, LookupError> {
        let samples = match &self.history {
            History::Static(pose) => return Ok(*pose),
            History::Dynamic(samples) => samples,
        };

        let (Some((&oldest, _)), Some((&newest, _))) =
            (samples.first_key_value(), samples.last_key_value())
        else {
            return Err(LookupError::Empty(child.clone()));
        };

        if let Some(pose) = samples.get(&stamp) {
            return Ok(*pose);
        }

        let before = samples.range(..stamp).next_back();
        let after = samples.range(stamp..).next();
        match (before, after) {
            (Some((&t0, p0)), Some((&t1, p1))) => {
                let ratio = (stamp.as_nanos() - t0.as_nanos()) as f64
                    / (t1.as_nanos() - t0.as_nanos()) as f64;
                Ok(interpolate(p0, p1, ratio))
            }
            _ => Err(LookupError::Extrapolation {
                frame: child.clone(),
                stamp,
                oldest,
                newest,
            }),
        }
    }
}

/// Linear interpolation of the translation, spherical of the rotation.
fn interpolate(start: &Pose, end: &Pose, ratio: f64) -> Pose {
    let translation = start
        .translation
        .vector
        .lerp(&end.translation.vector, ratio);
    // slerp is undefined for opposite rotations; fall back to the nearer sample.
    let rotation = start
        .rotation
        .try_slerp(&end.rotation, ratio, 1.0e-9)
        .unwrap_or(if ratio < 0.5 {
            start.rotation
        } else {
            end.rotation
        });
    Isometry3::from_parts(Translation3::from(translation), rotation)
}

fn is_finite(pose: &Pose) -> bool {
    pose.translation.vector.iter().all(|v| v.is_finite())
        && pose.rotation.coords.iter().all(|v| v.is_finite())
}

#[derive(Debug, Default)]
struct Tree {
    /// Keyed by child frame.
    edges: HashMap<FrameId, Edge>,
    /// Every frame seen, including roots that only ever appear as parents.
    frames: HashSet<FrameId>,
}

impl Tree {
    /// `frame` followed by all of its ancestors, root last.
    fn chain(&self, frame: &FrameId) -> Vec<FrameId> {
        let mut chain = vec![frame.clone()];
        let mut current = frame;
        while let Some(edge) = self.edges.get(current) {
            chain.push(edge.parent.clone());
            current = &edge.parent;
        }
        chain
    }

    /// The pose of `frame` in `ancestor`, composing edges on the way up.
    fn pose_in_ancestor(
        &self,
        frame: &FrameId,
        ancestor: &FrameId,
        stamp: Stamp,
    ) -> Result<Pose, LookupError> {
        let mut pose = Pose::identity();
        let mut current = frame;
        while current != ancestor {
            let edge = self
                .edges
                .get(current)
                .ok_or_else(|| LookupError::NotConnected(frame.clone(), ancestor.clone()))?;
            pose = edge.pose_at(current, stamp)? * pose;
            current = &edge.parent;
        }
        Ok(pose)
    }

    /// The newest stamp covered by every dynamic edge between `frame` and
    /// `ancestor`, or `None` when the path is entirely static.
    fn latest_common_time(
        &self,
        frame: &FrameId,
        ancestor: &FrameId,
    ) -> Result<Option<Stamp>, LookupError> {
        let mut latest: Option<Stamp> = None;
        let mut current = frame;
        while current != ancestor {
            let edge = self
                .edges
                .get(current)
                .ok_or_else(|| LookupError::NotConnected(frame.clone(), ancestor.clone()))?;
            if let History::Dynamic(samples) = &edge.history {
                let (&newest, _) = samples
                    .last_key_value()
                    .ok_or_else(|| LookupError::Empty(current.clone()))?;
                latest = Some(latest.map_or(newest, |t| t.min(newest)));
            }
            current = &edge.parent;
        }
        Ok(latest)
    }

    fn would_cycle(&self, parent: &FrameId, child: &FrameId) -> bool {
        self.chain(parent).iter().any(|frame| frame == child)
    }
}

/// A thread-safe transform graph with a bounded per-edge history.
///
/// Each child frame has exactly one parent edge. Edges are either static
/// (valid at all times) or dynamic (a time-indexed series of samples,
/// interpolated between neighbours and never extrapolated).
#[derive(Debug)]
pub struct TransformBuffer {
    tree: RwLock<Tree>,
    cache_time: Duration,
}

impl Default for TransformBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TIME)
    }
}

impl TransformBuffer {
    pub fn new(cache_time: Duration) -> Self {
        Self {
            tree: RwLock::new(Tree::default()),
            cache_time,
        }
    }

    pub fn cache_time(&self) -> Duration {
        self.cache_time
    }

    /// Inserts a time-stamped sample for the `parent -> child` edge.
    ///
    /// If `child` was attached to another parent, or was static, its history is
    /// replaced. Samples older than `newest - cache_time` are discarded.
    pub fn set_transform(&self, transform: StampedTransform) -> Result<(), BufferError> {
        self.insert(transform, false)
    }

    /// Inserts a `parent -> child` edge that is valid at every time.
    pub fn set_static_transform(&self, transform: StampedTransform) -> Result<(), BufferError> {
        self.insert(transform, true)
    }

    fn insert(&self, transform: StampedTransform, is_static: bool) -> Result<(), BufferError> {
        let StampedTransform {
            parent,
            child,
            stamp,
            transform: pose,
        } = transform;

        if parent == child {
            return Err(BufferError::SelfParent(child));
        }
        if !is_finite(&pose) {
            return Err(BufferError::NonFinite(child));
        }

        let mut tree = self.tree.write();
        if tree.would_cycle(&parent, &child) {
            return Err(BufferError::Cycle { parent, child });
        }

        tree.frames.insert(parent.clone());
        tree.frames.insert(child.clone());

        let cache_nanos = u64::try_from(self.cache_time.as_nanos()).unwrap_or(u64::MAX);
        let edge = tree.edges.entry(child.clone()).or_insert_with(|| Edge {
            parent: parent.clone(),
            history: History::Dynamic(BTreeMap::new()),
        });

        if edge.parent != parent {
            trace!(%child, old = %edge.parent, new = %parent, "re-parenting frame");
            edge.parent = parent;
            edge.history = History::Dynamic(BTreeMap::new());
        }

        if is_static {
            edge.history = History::Static(pose);
            return Ok(());
        }

        if let History::Static(_) = edge.history {
            edge.history = History::Dynamic(BTreeMap::new());
        }
        if let History::Dynamic(samples) = &mut edge.history {
            samples.insert(stamp, pose);
            if let Some((&newest, _)) = samples.last_key_value() {
                let cutoff = newest.saturating_sub(cache_nanos);
                *samples = samples.split_off(&cutoff);
            }
        }
        Ok(())
    }

    pub fn has_frame(&self, frame: &FrameId) -> bool {
        self.tree.read().frames.contains(frame)
    }

    /// All known frame names, sorted.
    pub fn frames(&self) -> Vec<FrameId> {
        let mut frames: Vec<_> = self.tree.read().frames.iter().cloned().collect();
        frames.sort();
        frames
    }

    /// The parent of `frame`, if it is attached to one.
    pub fn parent_of(&self, frame: &FrameId) -> Option<FrameId> {
        self.tree.read().edges.get(frame).map(|e| e.parent.clone())
    }

    /// The time range covered by the dynamic edge above `frame`.
    pub fn time_range(&self, frame: &FrameId) -> Option<(Stamp, Stamp)> {
        let tree = self.tree.read();
        match &tree.edges.get(frame)?.history {
            History::Static(_) => None,
            History::Dynamic(samples) => Some((
                *samples.first_key_value()?.0,
                *samples.last_key_value()?.0,
            )),
        }
    }

    pub fn clear(&self) {
        let mut tree = self.tree.write();
        tree.edges.clear();
        tree.frames.clear();
    }
}

impl TransformStore for TransformBuffer {
    fn lookup(
        &self,
        parent: &FrameId,
        child: &FrameId,
        stamp: Stamp,
    ) -> Result<Pose, LookupError> {
        let tree = self.tree.read();
        for frame in [parent, child] {
            if !tree.frames.contains(frame) {
                return Err(LookupError::UnknownFrame(frame.clone()));
            }
        }
        if parent == child {
            return Ok(Pose::identity());
        }

        let child_chain = tree.chain(child);
        let ancestor = tree
            .chain(parent)
            .into_iter()
            .find(|frame| child_chain.contains(frame))
            .ok_or_else(|| LookupError::NotConnected(parent.clone(), child.clone()))?;

        let stamp = if stamp.is_zero() {
            let parent_side = tree.latest_common_time(parent, &ancestor)?;
            let child_side = tree.latest_common_time(child, &ancestor)?;
            parent_side
                .into_iter()
                .chain(child_side)
                .min()
                .unwrap_or(Stamp::ZERO)
        } else {
            stamp
        };

        let ancestor_to_parent = tree.pose_in_ancestor(parent, &ancestor, stamp)?;
        let ancestor_to_child = tree.pose_in_ancestor(child, &ancestor, stamp)?;
        Ok(ancestor_to_parent.inverse() * ancestor_to_child)
    }
}
