// footprint_core/src/pipeline.rs

use std::sync::Arc;

use tracing::{debug, error, trace};

use crate::config::{FootprintConfig, FootprintFrames};
use crate::error::{ConfigError, FootprintError};
use crate::footprint::FootprintInputs;
use crate::publisher::TransformPublisher;
use crate::store::TransformStore;
use crate::sync::{Release, SyncStats, Synchronizer};
use crate::types::{FrameId, Pose, StampedTransform, Trigger};

/// Where a trigger is in its life.
///
/// `Pending -> Ready -> Computed -> Published` is the happy path. `Expired`
/// (evicted by backpressure) and `Failed` (a lookup failed at computation time)
/// are terminal as well; a trigger is never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerState {
    Pending,
    Ready,
    Computed,
    Published,
    Expired,
    Failed,
}

impl TriggerState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TriggerState::Published | TriggerState::Expired | TriggerState::Failed
        )
    }
}

/// The terminal result for one trigger.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerOutcome {
    Published {
        trigger: Trigger,
        transform: StampedTransform,
    },
    Expired {
        trigger: Trigger,
    },
    Failed {
        trigger: Trigger,
        error: FootprintError,
    },
}

impl TriggerOutcome {
    pub fn trigger(&self) -> &Trigger {
        match self {
            TriggerOutcome::Published { trigger, .. }
            | TriggerOutcome::Expired { trigger }
            | TriggerOutcome::Failed { trigger, .. } => trigger,
        }
    }

    pub fn state(&self) -> TriggerState {
        match self {
            TriggerOutcome::Published { .. } => TriggerState::Published,
            TriggerOutcome::Expired { .. } => TriggerState::Expired,
            TriggerOutcome::Failed { .. } => TriggerState::Failed,
        }
    }
}

/// Drives triggers through the synchronizer, the footprint computation and the
/// publisher. Both the store and the publisher are injected at construction.
pub struct FootprintPipeline<S: TransformStore, P: TransformPublisher> {
    store: Arc<S>,
    publisher: P,
    synchronizer: Synchronizer<S>,
    frames: FootprintFrames,
}

impl<S: TransformStore, P: TransformPublisher> FootprintPipeline<S, P> {
    pub fn new(
        store: Arc<S>,
        publisher: P,
        config: &FootprintConfig,
        frames: FootprintFrames,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        frames.validate()?;

        let synchronizer = Synchronizer::new(
            Arc::clone(&store),
            frames.odom.clone(),
            frames.required(config.wait_on_all_frames),
            config.queue_size,
        )?;

        Ok(Self {
            store,
            publisher,
            synchronizer,
            frames,
        })
    }

    /// Accepts a new trigger. If it pushes the oldest pending trigger out of
    /// the queue, that trigger's outcome is returned.
    pub fn on_trigger(&mut self, trigger: Trigger) -> Option<TriggerOutcome> {
        transition(&trigger, TriggerState::Pending);
        let outcome = self
            .synchronizer
            .push(trigger)
            .map(|trigger| TriggerOutcome::Expired { trigger });
        if let Some(expired) = &outcome {
            transition(expired.trigger(), expired.state());
        }
        outcome
    }

    /// Handles every trigger released by the synchronizer, oldest first, each
    /// one to completion before the next.
    pub fn spin_once(&mut self) -> Vec<TriggerOutcome> {
        self.synchronizer
            .poll()
            .into_iter()
            .map(|release| {
                let outcome = match release {
                    Release::Ready(trigger) => match self.process(trigger) {
                        Ok(transform) => TriggerOutcome::Published { trigger, transform },
                        Err(error) => TriggerOutcome::Failed { trigger, error },
                    },
                    Release::Superseded(trigger) => TriggerOutcome::Expired { trigger },
                };
                transition(outcome.trigger(), outcome.state());
                outcome
            })
            .collect()
    }

    /// Runs lookup -> compute -> publish for one ready trigger. A lookup
    /// failure is logged and nothing is published.
    pub fn process(&mut self, trigger: Trigger) -> Result<StampedTransform, FootprintError> {
        transition(&trigger, TriggerState::Ready);
        debug!(
            "Trigger #{} at {}: computing frame {}",
            trigger.seq, trigger.stamp, self.frames.footprint
        );

        let inputs = self.lookup_inputs(trigger).inspect_err(|e| {
            error!("Trigger #{} at {}: {}", trigger.seq, trigger.stamp, e);
        })?;

        let transform = StampedTransform {
            parent: self.frames.base.clone(),
            child: self.frames.footprint.clone(),
            stamp: trigger.stamp,
            transform: inputs.compute(),
        };
        transition(&trigger, TriggerState::Computed);
        self.publisher.publish(transform.clone());
        debug!(
            "Published transform {} --> {}",
            transform.parent, transform.child
        );
        Ok(transform)
    }

    fn lookup_inputs(&self, trigger: Trigger) -> Result<FootprintInputs, FootprintError> {
        if trigger.stamp.is_zero() {
            return Err(FootprintError::Unstamped(trigger.seq));
        }
        let odom = &self.frames.odom;
        Ok(FootprintInputs {
            left_foot: self.lookup(odom, &self.frames.left_foot, trigger)?,
            right_foot: self.lookup(odom, &self.frames.right_foot, trigger)?,
            base: self.lookup(odom, &self.frames.base, trigger)?,
        })
    }

    fn lookup(
        &self,
        parent: &FrameId,
        child: &FrameId,
        trigger: Trigger,
    ) -> Result<Pose, FootprintError> {
        self.store
            .lookup(parent, child, trigger.stamp)
            .map_err(|source| FootprintError::Lookup {
                parent: parent.clone(),
                child: child.clone(),
                source,
            })
    }

    pub fn frames(&self) -> &FootprintFrames {
        &self.frames
    }

    pub fn synchronizer(&self) -> &Synchronizer<S> {
        &self.synchronizer
    }

    pub fn stats(&self) -> SyncStats {
        self.synchronizer.stats()
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn publisher_mut(&mut self) -> &mut P {
        &mut self.publisher
    }
}

fn transition(trigger: &Trigger, state: TriggerState) {
    trace!(seq = trigger.seq, stamp = %trigger.stamp, ?state, "trigger state");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publisher::RecordingPublisher;
    use crate::store::TransformBuffer;
    use crate::types::Stamp;

    #[test]
    fn terminal_states() {
        assert!(!TriggerState::Pending.is_terminal());
        assert!(!TriggerState::Ready.is_terminal());
        assert!(!TriggerState::Computed.is_terminal());
        assert!(TriggerState::Expired.is_terminal());
        assert!(TriggerState::Published.is_terminal());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = FootprintConfig {
            queue_size: 0,
            ..Default::default()
        };
        let result = FootprintPipeline::new(
            Arc::new(TransformBuffer::default()),
            RecordingPublisher::new(),
            &config,
            FootprintFrames::default(),
        );
        assert!(matches!(result, Err(ConfigError::ZeroQueueSize)));
    }

    #[test]
    fn expired_outcome_carries_evicted_trigger() {
        let config = FootprintConfig {
            queue_size: 1,
            ..Default::default()
        };
        let mut pipeline = FootprintPipeline::new(
            Arc::new(TransformBuffer::default()),
            RecordingPublisher::new(),
            &config,
            FootprintFrames::default(),
        )
        .unwrap();

        let first = Trigger::new(0, Stamp::from_nanos(1));
        assert_eq!(pipeline.on_trigger(first), None);
        let outcome = pipeline.on_trigger(Trigger::new(1, Stamp::from_nanos(2)));
        assert_eq!(outcome, Some(TriggerOutcome::Expired { trigger: first }));
        assert_eq!(outcome.map(|o| o.state()), Some(TriggerState::Expired));
    }

    #[test]
    fn unstamped_trigger_fails_without_publishing() {
        let buffer = Arc::new(TransformBuffer::default());
        for child in ["l_sole", "r_sole", "base_link"] {
            buffer
                .set_transform(StampedTransform::new(
                    "odom",
                    child,
                    Stamp::from_nanos(5),
                    Pose::identity(),
                ))
                .unwrap();
        }
        let mut pipeline = FootprintPipeline::new(
            buffer,
            RecordingPublisher::new(),
            &FootprintConfig::default(),
            FootprintFrames::default(),
        )
        .unwrap();

        let unstamped = Trigger::new(7, Stamp::ZERO);
        assert_eq!(
            pipeline.process(unstamped),
            Err(FootprintError::Unstamped(7))
        );
        assert!(pipeline.publisher().is_empty());
    }
}
