use crate::shared_kernel::{ProvisioningJobId, ProvisioningJobType, Result, TenantId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A domain event that has occurred in the system. Events are immutable facts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A provisioning job has been accepted and queued
    ProvisioningJobQueued {
        job_id: ProvisioningJobId,
        tenant_id: TenantId,
        job_type: ProvisioningJobType,
        occurred_at: DateTime<Utc>,
    },
    /// A provisioning job has been cancelled explicitly
    ProvisioningJobCancelled {
        job_id: ProvisioningJobId,
        tenant_id: TenantId,
        occurred_at: DateTime<Utc>,
    },
}

impl DomainEvent {
    pub fn job_id(&self) -> &ProvisioningJobId {
        match self {
            DomainEvent::ProvisioningJobQueued { job_id, .. } => job_id,
            DomainEvent::ProvisioningJobCancelled { job_id, .. } => job_id,
        }
    }
}

/// Publication port. Publish failures are logged by callers and never change
/// the outcome of the operation that raised the event.
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, event: &DomainEvent) -> Result<()>;
}
