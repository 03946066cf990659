// Provisioning Use Cases
// UC: Launch Provisioning Job

use chrono::Utc;
use portico_domain::{
    DomainError, DomainEvent, EventBus, JobRecordPatch, JobRecordStore, ProvisioningConfig,
    ProvisioningJob, ProvisioningJobId, ProvisioningJobStatus, ProvisioningJobType, Result,
    TenantId,
};
use portico_saga::JobExecutor;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Accepts a publish/republish request and hands execution off.
///
/// The only synchronous guarantee is the returned job id: the record is
/// inserted QUEUED, the saga runs on its own task, and everything after that
/// is observable through the status reporter only. A failure escaping the
/// spawned task is written back as a FAILED terminal state, never dropped.
pub struct LaunchProvisioningUseCase {
    store: Arc<dyn JobRecordStore>,
    event_bus: Arc<dyn EventBus>,
    executor: Arc<JobExecutor>,
    config: ProvisioningConfig,
}

impl LaunchProvisioningUseCase {
    pub fn new(
        store: Arc<dyn JobRecordStore>,
        event_bus: Arc<dyn EventBus>,
        executor: Arc<JobExecutor>,
        config: ProvisioningConfig,
    ) -> Self {
        Self {
            store,
            event_bus,
            executor,
            config,
        }
    }

    pub async fn execute(
        &self,
        tenant_id: TenantId,
        job_type: ProvisioningJobType,
    ) -> Result<ProvisioningJobId> {
        if !self.config.allow_concurrent_tenant_jobs {
            if let Some(active) = self.store.find_active_for_tenant(&tenant_id).await? {
                info!(
                    tenant_id = %tenant_id,
                    active_job_id = %active.id,
                    "rejecting launch, tenant already has an active provisioning job"
                );
                return Err(DomainError::TenantProvisioningActive { tenant_id });
            }
        }

        let job = ProvisioningJob::new(
            tenant_id.clone(),
            job_type,
            self.executor.registry().len() as u32,
        );
        let job_id = job.id.clone();
        self.store.insert(&job).await?;

        let event = DomainEvent::ProvisioningJobQueued {
            job_id: job_id.clone(),
            tenant_id: tenant_id.clone(),
            job_type,
            occurred_at: Utc::now(),
        };
        if let Err(e) = self.event_bus.publish(&event).await {
            error!("Failed to publish ProvisioningJobQueued event: {}", e);
        }

        info!(job_id = %job_id, tenant_id = %tenant_id, %job_type, "provisioning job queued");

        let executor = self.executor.clone();
        let store = self.store.clone();
        let spawned_id = job_id.clone();
        tokio::spawn(async move {
            if let Err(e) = executor.run(spawned_id.clone()).await {
                error!(
                    job_id = %spawned_id,
                    error = %e,
                    "provisioning task failed outside step execution"
                );
                let patch = JobRecordPatch {
                    status: Some(ProvisioningJobStatus::Failed),
                    error_message: Some(e.to_string()),
                    completed_at: Some(Utc::now()),
                    ..Default::default()
                };
                match store.apply(&spawned_id, patch).await {
                    Ok(Some(_)) => {}
                    Ok(None) => warn!(
                        job_id = %spawned_id,
                        "job record already gone, failure not recorded"
                    ),
                    Err(store_error) => error!(
                        job_id = %spawned_id,
                        error = %store_error,
                        "failed to record provisioning failure"
                    ),
                }
            }
        });

        Ok(job_id)
    }
}
