//! Publishes domain events to NATS when a broker is configured.

use crate::domain::events::DomainEvent;

#[derive(Clone, Default)]
pub struct EventPublisher {
    nats: Option<async_nats::Client>,
}

impl EventPublisher {
    pub fn new(nats: Option<async_nats::Client>) -> Self { Self { nats } }
    pub fn disabled() -> Self { Self::default() }
    pub fn is_enabled(&self) -> bool { self.nats.is_some() }

    /// Best effort: failures are logged and never surface to the caller.
    pub async fn publish(&self, event: &DomainEvent) {
        let Some(client) = &self.nats else { return };
        let payload = match serde_json::to_vec(event) {
            Ok(payload) => payload,
            Err(e) => { tracing::warn!(error = %e, "failed to serialize event"); return; }
        };
        if let Err(e) = client.publish(event.subject(), payload.into()).await {
            tracing::warn!(error = %e, subject = %event.subject(), "failed to publish event");
        }
    }
}
