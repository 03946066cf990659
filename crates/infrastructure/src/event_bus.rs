// In-memory event bus over a tokio broadcast channel.

use async_trait::async_trait;
use portico_domain::{DomainEvent, EventBus, Result};
use tokio::sync::broadcast;
use tracing::debug;

/// Broadcast-backed event bus for in-process subscribers.
///
/// Publishing without subscribers is not an error; events are simply dropped,
/// matching fire-and-forget publication semantics.
#[derive(Clone)]
pub struct InMemoryEventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl InMemoryEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, event: &DomainEvent) -> Result<()> {
        debug!(job_id = %event.job_id(), "publishing domain event");
        let _ = self.sender.send(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use portico_domain::{ProvisioningJobId, ProvisioningJobType, TenantId};

    #[tokio::test]
    async fn test_subscribers_receive_published_events() {
        let bus = InMemoryEventBus::default();
        let mut receiver = bus.subscribe();

        let event = DomainEvent::ProvisioningJobQueued {
            job_id: ProvisioningJobId::new(),
            tenant_id: TenantId::from("tenant-1"),
            job_type: ProvisioningJobType::Create,
            occurred_at: Utc::now(),
        };
        bus.publish(&event).await.unwrap();

        assert_eq!(receiver.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let bus = InMemoryEventBus::default();
        let event = DomainEvent::ProvisioningJobCancelled {
            job_id: ProvisioningJobId::new(),
            tenant_id: TenantId::from("tenant-1"),
            occurred_at: Utc::now(),
        };
        assert!(bus.publish(&event).await.is_ok());
    }
}
