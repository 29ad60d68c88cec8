// footprint_node/src/sim.rs

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use footprint_core::config::FootprintFrames;
use footprint_core::pipeline::{FootprintPipeline, TriggerOutcome};
use footprint_core::publisher::BufferBroadcaster;
use footprint_core::store::TransformBuffer;
use footprint_core::types::{Stamp, StampedTransform, Trigger};
use rand::rngs::OsRng;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::config::NodeConfig;
use crate::error::NodeError;
use crate::gait::GaitGenerator;

/// Stamps start here rather than at zero, which the buffer reads as "latest".
const START_TIME_SECS: f64 = 1.0;

/// Tallies of a finished run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub triggers: u64,
    pub published: u64,
    pub failed: u64,
    pub expired: u64,
    /// Triggers still waiting when the run ended.
    pub pending: usize,
    /// Batches of gait transforms lost to dropout.
    pub dropped_batches: u64,
    pub last_footprint: Option<StampedTransform>,
}

impl RunSummary {
    fn record(&mut self, outcome: &TriggerOutcome) {
        match outcome {
            TriggerOutcome::Published { transform, .. } => {
                self.published += 1;
                self.last_footprint = Some(transform.clone());
            }
            TriggerOutcome::Failed { .. } => self.failed += 1,
            TriggerOutcome::Expired { .. } => self.expired += 1,
        }
    }
}

/// A batch of transforms on its way to the buffer.
struct InFlight {
    due_tick: u64,
    transforms: [StampedTransform; 3],
}

/// Drives a footprint pipeline with a simulated walking robot.
///
/// Each tick a joint-state trigger is emitted for the current stamp, while the
/// gait transforms for that stamp reach the buffer `tf_latency_ticks` later,
/// so the synchronizer has to wait for them.
pub struct Simulation {
    config: NodeConfig,
    frames: FootprintFrames,
    gait: GaitGenerator,
    buffer: Arc<TransformBuffer>,
    pipeline: FootprintPipeline<TransformBuffer, BufferBroadcaster>,
    rng: ChaCha8Rng,
    in_flight: VecDeque<InFlight>,
}

impl Simulation {
    pub fn new(config: NodeConfig) -> Result<Self, NodeError> {
        config.validate()?;

        let frames = FootprintFrames::resolve(&config.footprint, &config.tf_prefix);
        let buffer = Arc::new(TransformBuffer::new(Duration::from_secs_f64(
            config.simulation.tf_cache_seconds,
        )));
        let pipeline = FootprintPipeline::new(
            Arc::clone(&buffer),
            BufferBroadcaster::new(Arc::clone(&buffer)),
            &config.footprint,
            frames.clone(),
        )?;

        let rng = match config.simulation.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(OsRng)
                .map_err(|e| NodeError::Invalid(format!("failed to seed rng: {e}")))?,
        };

        Ok(Self {
            gait: GaitGenerator::new(config.gait.clone()),
            config,
            frames,
            buffer,
            pipeline,
            rng,
            in_flight: VecDeque::new(),
        })
    }

    pub fn buffer(&self) -> &Arc<TransformBuffer> {
        &self.buffer
    }

    pub fn frames(&self) -> &FootprintFrames {
        &self.frames
    }

    fn stamp_of(&self, tick: u64) -> Stamp {
        let rate = self.config.simulation.joint_state_rate_hz;
        Stamp::from_secs_f64(START_TIME_SECS + tick as f64 / rate)
    }

    pub fn run(&mut self) -> RunSummary {
        let sim = &self.config.simulation;
        let ticks = (sim.duration_seconds * sim.joint_state_rate_hz).floor() as u64;
        info!(
            "Walking for {:.1}s: {} joint states at {} Hz, tf latency {} ticks",
            sim.duration_seconds, ticks, sim.joint_state_rate_hz, sim.tf_latency_ticks
        );

        let mut summary = RunSummary::default();
        for tick in 0..ticks {
            self.step(tick, &mut summary);
        }

        // Let the last transforms land before closing the books.
        self.deliver(u64::MAX);
        for outcome in self.pipeline.spin_once() {
            summary.record(&outcome);
        }
        summary.pending = self.pipeline.synchronizer().len();

        let stats = self.pipeline.stats();
        info!(
            "Run finished: {} triggers, {} published, {} failed, {} expired, {} pending",
            summary.triggers, summary.published, summary.failed, summary.expired, summary.pending,
        );
        debug!(
            "Synchronizer: {} ready, {} dropped by the queue, {} superseded",
            stats.ready, stats.dropped, stats.superseded
        );
        summary
    }

    /// One joint-state period.
    pub fn step(&mut self, tick: u64, summary: &mut RunSummary) {
        let stamp = self.stamp_of(tick);

        let lost = self.config.simulation.dropout_probability > 0.0
            && self
                .rng
                .gen_bool(self.config.simulation.dropout_probability);
        if lost {
            summary.dropped_batches += 1;
            debug!("Gait transforms at {} lost in transit", stamp);
        } else {
            self.in_flight.push_back(InFlight {
                due_tick: tick + self.config.simulation.tf_latency_ticks as u64,
                transforms: self.gait.sample(stamp).transforms(&self.frames),
            });
        }
        self.deliver(tick);

        summary.triggers += 1;
        if let Some(expired) = self.pipeline.on_trigger(Trigger::new(tick, stamp)) {
            summary.record(&expired);
        }
        for outcome in self.pipeline.spin_once() {
            summary.record(&outcome);
        }
    }

    /// Inserts every in-flight batch due at or before `tick`.
    fn deliver(&mut self, tick: u64) {
        while self.in_flight.front().is_some_and(|f| f.due_tick <= tick) {
            let Some(batch) = self.in_flight.pop_front() else {
                break;
            };
            for transform in batch.transforms {
                if let Err(e) = self.buffer.set_transform(transform) {
                    warn!("Rejected gait transform: {}", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config() -> NodeConfig {
        let mut config = NodeConfig::default();
        config.simulation.seed = Some(7);
        config.simulation.duration_seconds = 1.0;
        config.simulation.joint_state_rate_hz = 20.0;
        config
    }

    #[test]
    fn every_trigger_is_published_without_dropouts() {
        let mut sim = Simulation::new(quick_config()).unwrap();
        let summary = sim.run();

        assert_eq!(summary.triggers, 20);
        assert_eq!(summary.published, 20);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.pending, 0);
    }

    #[test]
    fn latency_delays_publication() {
        let mut sim = Simulation::new(quick_config()).unwrap();
        let mut summary = RunSummary::default();

        sim.step(0, &mut summary);
        sim.step(1, &mut summary);
        assert_eq!(summary.published, 0, "transforms lag two ticks behind");

        sim.step(2, &mut summary);
        assert_eq!(summary.published, 1);
        let stamp = summary.last_footprint.as_ref().map(|t| t.stamp);
        assert_eq!(stamp, Some(Stamp::from_secs_f64(START_TIME_SECS)));
    }
}
