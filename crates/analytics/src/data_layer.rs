use std::sync::{Arc, RwLock};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use storefront_core::UserId;
use storefront_events::{EventBus, EventEnvelope, InMemoryEventBus};

use crate::event::AnalyticsEvent;

pub type AnalyticsEnvelope = EventEnvelope<AnalyticsEvent>;

#[derive(Debug, Error)]
pub enum DataLayerError {
    #[error("data layer lock poisoned")]
    Poisoned,
}

/// Append-only analytics sink.
pub trait DataLayer: Send + Sync {
    /// Append an event, tagged with the signed-in user (if any).
    fn push(
        &self,
        event: AnalyticsEvent,
        user_id: Option<UserId>,
    ) -> Result<AnalyticsEnvelope, DataLayerError>;

    /// Everything recorded so far, in append order.
    fn events(&self) -> Result<Vec<AnalyticsEnvelope>, DataLayerError>;
}

impl<D> DataLayer for Arc<D>
where
    D: DataLayer + ?Sized,
{
    fn push(
        &self,
        event: AnalyticsEvent,
        user_id: Option<UserId>,
    ) -> Result<AnalyticsEnvelope, DataLayerError> {
        (**self).push(event, user_id)
    }

    fn events(&self) -> Result<Vec<AnalyticsEnvelope>, DataLayerError> {
        (**self).events()
    }
}

/// In-process data layer.
///
/// Recorded envelopes are optionally fanned out on an [`InMemoryEventBus`] after
/// they have been appended.
#[derive(Debug, Default)]
pub struct InMemoryDataLayer {
    log: RwLock<Vec<AnalyticsEnvelope>>,
    bus: Option<Arc<InMemoryEventBus<AnalyticsEnvelope>>>,
}

impl InMemoryDataLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bus(bus: Arc<InMemoryEventBus<AnalyticsEnvelope>>) -> Self {
        Self {
            log: RwLock::new(Vec::new()),
            bus: Some(bus),
        }
    }

    /// Names of the recorded events, in order.
    pub fn names(&self) -> Result<Vec<&'static str>, DataLayerError> {
        let log = self.log.read().map_err(|_| DataLayerError::Poisoned)?;
        Ok(log.iter().map(|e| e.payload().name()).collect())
    }

    /// Recorded events with the given name.
    pub fn named(&self, name: &str) -> Result<Vec<AnalyticsEnvelope>, DataLayerError> {
        let log = self.log.read().map_err(|_| DataLayerError::Poisoned)?;
        Ok(log
            .iter()
            .filter(|e| e.payload().name() == name)
            .cloned()
            .collect())
    }
}

impl DataLayer for InMemoryDataLayer {
    fn push(
        &self,
        event: AnalyticsEvent,
        user_id: Option<UserId>,
    ) -> Result<AnalyticsEnvelope, DataLayerError> {
        let envelope = {
            let mut log = self.log.write().map_err(|_| DataLayerError::Poisoned)?;
            let sequence_number = log.len() as u64 + 1;
            let envelope =
                EventEnvelope::new(Uuid::now_v7(), sequence_number, Utc::now(), user_id, event);
            log.push(envelope.clone());
            envelope
        };

        debug!(
            event = envelope.payload().name(),
            sequence = envelope.sequence_number(),
            "data layer push"
        );

        if let Some(bus) = &self.bus {
            if let Err(err) = bus.publish(envelope.clone()) {
                warn!(error = %err, event = envelope.payload().name(), "data layer fan-out failed");
            }
        }

        Ok(envelope)
    }

    fn events(&self) -> Result<Vec<AnalyticsEnvelope>, DataLayerError> {
        let log = self.log.read().map_err(|_| DataLayerError::Poisoned)?;
        Ok(log.clone())
    }
}
