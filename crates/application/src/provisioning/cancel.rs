// Provisioning Use Cases
// UC: Cancel Provisioning Job

use chrono::Utc;
use portico_domain::{
    DomainEvent, EventBus, JobRecordPatch, JobRecordStore, ProvisioningJobId,
    ProvisioningJobStatus, Result,
};
use std::sync::Arc;
use tracing::{error, info};

/// Record-based cooperative cancellation.
///
/// Only QUEUED/RUNNING jobs can be cancelled; a terminal or unknown job is a
/// no-op returning `false`. Marking the record is the whole mechanism: the
/// executor observes CANCELLED between steps and stops. In-flight step I/O is
/// never interrupted.
pub struct CancelProvisioningUseCase {
    store: Arc<dyn JobRecordStore>,
    event_bus: Arc<dyn EventBus>,
}

impl CancelProvisioningUseCase {
    pub fn new(store: Arc<dyn JobRecordStore>, event_bus: Arc<dyn EventBus>) -> Self {
        Self { store, event_bus }
    }

    pub async fn execute(&self, job_id: &ProvisioningJobId) -> Result<bool> {
        let Some(job) = self.store.find_by_id(job_id).await? else {
            return Ok(false);
        };
        if job.status.is_terminal() {
            return Ok(false);
        }

        let Some(updated) = self.store.apply(job_id, JobRecordPatch::cancelled()).await? else {
            return Ok(false);
        };
        if updated.status != ProvisioningJobStatus::Cancelled {
            // Lost the race against a terminal write; nothing was mutated.
            return Ok(false);
        }

        let event = DomainEvent::ProvisioningJobCancelled {
            job_id: job_id.clone(),
            tenant_id: updated.tenant_id.clone(),
            occurred_at: Utc::now(),
        };
        if let Err(e) = self.event_bus.publish(&event).await {
            error!("Failed to publish ProvisioningJobCancelled event: {}", e);
        }

        info!(job_id = %job_id, tenant_id = %updated.tenant_id, "provisioning job cancelled");
        Ok(true)
    }
}
