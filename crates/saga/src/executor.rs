//!
//! # Job Executor
//!
//! Runs the registered steps for one provisioning job in order, persists
//! progress after each step, and on failure compensates completed steps in
//! reverse order before writing the terminal FAILED state.
//!

use crate::context::StepContext;
use crate::registry::StepRegistry;
use crate::step::ProvisioningStep;
use portico_domain::{
    DomainError, JobRecordPatch, JobRecordStore, ProvisioningJobId, ProvisioningJobStatus,
    TenantId,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Errors escaping the executor.
///
/// Step failures are not errors: they are handled in-line (compensation plus
/// a terminal FAILED write) and `run` still returns `Ok`. What does escape is
/// caught at the launcher boundary and converted into a FAILED write there.
#[derive(thiserror::Error, Debug)]
pub enum ExecutorError {
    #[error("Provisioning job not found: {job_id}")]
    JobNotFound { job_id: ProvisioningJobId },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Saga state machine for one provisioning job.
///
/// Stateless apart from its ports; one instance serves every job. Each job
/// runs on its own task, steps within a job are strictly sequential, and the
/// job record store is the only shared state.
pub struct JobExecutor {
    store: Arc<dyn JobRecordStore>,
    registry: Arc<StepRegistry>,
}

impl JobExecutor {
    pub fn new(store: Arc<dyn JobRecordStore>, registry: Arc<StepRegistry>) -> Self {
        Self { store, registry }
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    /// Runs the saga for `job_id` to a terminal state.
    ///
    /// Every record write tolerates the record having vanished out-of-band
    /// (cascading tenant deletion, test cleanup): the write becomes a logged
    /// no-op and the saga keeps going. The record reaching CANCELLED between
    /// steps stops the saga without compensation.
    pub async fn run(&self, job_id: ProvisioningJobId) -> Result<(), ExecutorError> {
        let job = self
            .store
            .find_by_id(&job_id)
            .await?
            .ok_or_else(|| ExecutorError::JobNotFound {
                job_id: job_id.clone(),
            })?;
        let tenant_id = job.tenant_id.clone();
        let steps_total = self.registry.len() as u32;

        self.patch(&job_id, JobRecordPatch::started()).await?;
        info!(job_id = %job_id, tenant_id = %tenant_id, "provisioning saga started");

        let mut refs: HashMap<String, serde_json::Value> = job.external_refs.clone();
        let mut steps_completed: u32 = 0;

        for (index, step) in self.registry.steps().iter().enumerate() {
            if self.cancel_requested(&job_id).await? {
                info!(job_id = %job_id, "cancellation observed, stopping saga");
                return Ok(());
            }

            let ctx = StepContext::new(job_id.clone(), tenant_id.clone(), refs.clone())
                .at_step(index, steps_total as usize);
            debug!(job_id = %job_id, step = step.name(), "executing provisioning step");

            match step.execute(&ctx).await {
                Ok(output) => {
                    steps_completed += 1;
                    refs.extend(output.external_refs.clone());
                    let patch =
                        JobRecordPatch::step_succeeded(step.name(), steps_completed, steps_total)
                            .with_external_refs(output.external_refs);
                    self.patch(&job_id, patch).await?;
                }
                Err(step_error) => {
                    warn!(
                        job_id = %job_id,
                        step = step.name(),
                        error = %step_error,
                        "provisioning step failed, compensating"
                    );
                    self.compensate_completed(&job_id, &tenant_id, &refs, steps_completed)
                        .await;
                    self.patch(
                        &job_id,
                        JobRecordPatch::failed(step.name(), step_error.to_string()),
                    )
                    .await?;
                    return Ok(());
                }
            }
        }

        // The final registered step owns the COMPLETED terminal write.
        info!(job_id = %job_id, tenant_id = %tenant_id, "provisioning saga finished");
        Ok(())
    }

    /// Invokes compensation for the first `completed` steps in reverse order.
    ///
    /// A compensation failing must neither stop the remaining compensations
    /// nor change the job outcome, so failures are logged and swallowed here.
    async fn compensate_completed(
        &self,
        job_id: &ProvisioningJobId,
        tenant_id: &TenantId,
        refs: &HashMap<String, serde_json::Value>,
        completed: u32,
    ) {
        let completed_steps: &[Arc<dyn ProvisioningStep>] =
            &self.registry.steps()[..completed as usize];
        for (index, step) in completed_steps.iter().enumerate().rev() {
            let ctx = StepContext::new(job_id.clone(), tenant_id.clone(), refs.clone())
                .at_step(index, self.registry.len());
            debug!(job_id = %job_id, step = step.name(), "compensating provisioning step");
            if let Err(e) = step.compensate(&ctx).await {
                warn!(
                    job_id = %job_id,
                    step = step.name(),
                    error = %e,
                    "compensation failed, continuing with remaining compensations"
                );
            }
        }
    }

    /// Applies a patch, downgrading a vanished record to a logged no-op.
    async fn patch(
        &self,
        job_id: &ProvisioningJobId,
        patch: JobRecordPatch,
    ) -> Result<(), ExecutorError> {
        if self.store.apply(job_id, patch).await?.is_none() {
            warn!(
                job_id = %job_id,
                "job record no longer exists, continuing without bookkeeping"
            );
        }
        Ok(())
    }

    async fn cancel_requested(&self, job_id: &ProvisioningJobId) -> Result<bool, ExecutorError> {
        Ok(self
            .store
            .find_by_id(job_id)
            .await?
            .map(|job| job.status == ProvisioningJobStatus::Cancelled)
            .unwrap_or(false))
    }
}
