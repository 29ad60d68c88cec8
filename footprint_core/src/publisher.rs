// footprint_core/src/publisher.rs

use std::sync::Arc;

use tracing::{error, trace};

use crate::store::TransformBuffer;
use crate::types::StampedTransform;

/// Announces a derived transform to the rest of the system.
pub trait TransformPublisher {
    fn publish(&mut self, transform: StampedTransform);
}

impl<P: TransformPublisher + ?Sized> TransformPublisher for &mut P {
    fn publish(&mut self, transform: StampedTransform) {
        (**self).publish(transform);
    }
}

/// Publishes by inserting the edge into a shared [`TransformBuffer`], so the
/// new frame becomes part of the same graph the pipeline reads from.
#[derive(Debug, Clone)]
pub struct BufferBroadcaster {
    buffer: Arc<TransformBuffer>,
}

impl BufferBroadcaster {
    pub fn new(buffer: Arc<TransformBuffer>) -> Self {
        Self { buffer }
    }
}

impl TransformPublisher for BufferBroadcaster {
    fn publish(&mut self, transform: StampedTransform) {
        let (parent, child, stamp) = (
            transform.parent.clone(),
            transform.child.clone(),
            transform.stamp,
        );
        match self.buffer.set_transform(transform) {
            Ok(()) => trace!(%parent, %child, %stamp, "broadcast transform"),
            Err(e) => error!("Failed to broadcast {} -> {}: {}", parent, child, e),
        }
    }
}

/// Keeps every published transform, in publication order.
#[derive(Debug, Clone, Default)]
pub struct RecordingPublisher {
    published: Vec<StampedTransform>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> &[StampedTransform] {
        &self.published
    }

    pub fn len(&self) -> usize {
        self.published.len()
    }

    pub fn is_empty(&self) -> bool {
        self.published.is_empty()
    }

    pub fn take(&mut self) -> Vec<StampedTransform> {
        std::mem::take(&mut self.published)
    }
}

impl TransformPublisher for RecordingPublisher {
    fn publish(&mut self, transform: StampedTransform) {
        self.published.push(transform);
    }
}
