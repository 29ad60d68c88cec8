// footprint_core/src/sync.rs

//! The availability wait.
//!
//! Triggers are held in a bounded queue until every required frame can be
//! expressed in the reference frame at the trigger's stamp. Each call to
//! [`Synchronizer::poll`] re-checks the queue and releases triggers in arrival
//! order, exactly once each.
//!
//! Output never goes back in time: once a trigger is ready, every trigger that
//! arrived before it is released too, as [`Release::Superseded`] if it is not
//! ready itself or if its stamp is older than one already emitted.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::store::TransformStore;
use crate::types::{FrameId, Stamp, Trigger};

/// Running counters, in the spirit of a tf message filter's statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncStats {
    /// Triggers accepted by `push`.
    pub received: u64,
    /// Triggers released as ready by `poll`.
    pub ready: u64,
    /// Triggers evicted because the queue was full.
    pub dropped: u64,
    /// Triggers given up on because a later one became ready first.
    pub superseded: u64,
}

/// A trigger leaving the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// Every required frame resolves at the trigger's stamp.
    Ready(Trigger),
    /// Skipped so that output stays in timestamp order.
    Superseded(Trigger),
}

impl Release {
    pub fn trigger(&self) -> Trigger {
        match *self {
            Release::Ready(trigger) | Release::Superseded(trigger) => trigger,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Release::Ready(_))
    }
}

pub struct Synchronizer<S: TransformStore> {
    store: Arc<S>,
    reference: FrameId,
    required: Vec<FrameId>,
    queue: VecDeque<Trigger>,
    capacity: usize,
    last_emitted: Option<Stamp>,
    stats: SyncStats,
}

impl<S: TransformStore> Synchronizer<S> {
    /// Creates a synchronizer waiting for `required` to be resolvable in
    /// `reference`. A `capacity` of zero is rejected.
    pub fn new(
        store: Arc<S>,
        reference: FrameId,
        required: Vec<FrameId>,
        capacity: usize,
    ) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroQueueSize);
        }
        Ok(Self {
            store,
            reference,
            required,
            queue: VecDeque::with_capacity(capacity),
            capacity,
            last_emitted: None,
            stats: SyncStats::default(),
        })
    }

    /// Queues a trigger. When the queue is already full the oldest pending
    /// trigger is evicted and returned; it will never be emitted.
    pub fn push(&mut self, trigger: Trigger) -> Option<Trigger> {
        self.stats.received += 1;

        let evicted = if self.queue.len() >= self.capacity {
            let oldest = self.queue.pop_front();
            if let Some(old) = &oldest {
                self.stats.dropped += 1;
                debug!(
                    "Dropping trigger #{} at {}: queue full ({} pending)",
                    old.seq, old.stamp, self.capacity
                );
            }
            oldest
        } else {
            None
        };

        self.queue.push_back(trigger);
        evicted
    }

    /// Releases, in arrival order, every pending trigger up to and including
    /// the newest-arrived one that is ready. Later triggers stay pending.
    pub fn poll(&mut self) -> Vec<Release> {
        let available: Vec<bool> = self
            .queue
            .iter()
            .map(|t| {
                self.store
                    .is_available(&self.reference, &self.required, t.stamp)
            })
            .collect();
        let Some(last_ready) = available.iter().rposition(|&ready| ready) else {
            return Vec::new();
        };

        let mut released = Vec::with_capacity(last_ready + 1);
        for (trigger, ready) in self.queue.drain(..=last_ready).zip(available) {
            let in_order = self.last_emitted.map_or(true, |last| trigger.stamp >= last);
            if ready && in_order {
                self.last_emitted = Some(trigger.stamp);
                self.stats.ready += 1;
                released.push(Release::Ready(trigger));
            } else {
                self.stats.superseded += 1;
                debug!(
                    "Skipping trigger #{} at {}: a later trigger was released first",
                    trigger.seq, trigger.stamp
                );
                released.push(Release::Superseded(trigger));
            }
        }

        trace!(
            count = released.len(),
            pending = self.queue.len(),
            "triggers released"
        );
        released
    }

    /// Pending triggers, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &Trigger> {
        self.queue.iter()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    /// Forgets every pending trigger without emitting them.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
