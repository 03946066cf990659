// Provisioning Use Cases
// UC: Get Provisioning Status

use portico_domain::{
    JobRecordStore, ProvisioningJob, ProvisioningJobId, ProvisioningJobStatus, Result,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The terminal success payload callers may consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisioningResult {
    pub tenant_url: String,
    pub admin_url: String,
}

/// Caller-facing projection of one job record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatusView {
    pub job_id: String,
    pub tenant_id: String,
    pub job_type: String,
    pub status: String,
    pub progress: u8,
    pub current_step: Option<String>,
    pub steps_total: u32,
    pub steps_completed: u32,
    pub created_at: String,
    pub started_at: Option<String>,
    /// Present only once the job is terminal.
    pub completed_at: Option<String>,
    /// Present only when the job completed.
    pub result: Option<ProvisioningResult>,
    /// Present only when the job failed.
    pub error_message: Option<String>,
}

impl JobStatusView {
    fn from_record(job: &ProvisioningJob) -> Self {
        let terminal = job.status.is_terminal();
        let result = if job.status == ProvisioningJobStatus::Completed {
            job.external_refs
                .get("result")
                .and_then(|value| serde_json::from_value(value.clone()).ok())
        } else {
            None
        };
        let error_message = if job.status == ProvisioningJobStatus::Failed {
            job.error_message.clone()
        } else {
            None
        };

        Self {
            job_id: job.id.to_string(),
            tenant_id: job.tenant_id.to_string(),
            job_type: job.job_type.to_string(),
            status: job.status.to_string(),
            progress: job.progress,
            current_step: job.current_step.clone(),
            steps_total: job.steps_total,
            steps_completed: job.steps_completed,
            created_at: job.created_at.to_rfc3339(),
            started_at: job.started_at.map(|t| t.to_rfc3339()),
            completed_at: terminal
                .then(|| job.completed_at.map(|t| t.to_rfc3339()))
                .flatten(),
            result,
            error_message,
        }
    }
}

/// Read path: projects the stored record into a status payload.
///
/// Never mutates the record and is safe to call any number of times,
/// including after the job reached a terminal state. An unknown id is a
/// normal outcome (`Ok(None)`), not an error; the caller layer decides
/// whether that is a 404 or an ownership violation.
pub struct GetProvisioningStatusUseCase {
    store: Arc<dyn JobRecordStore>,
}

impl GetProvisioningStatusUseCase {
    pub fn new(store: Arc<dyn JobRecordStore>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, job_id: &ProvisioningJobId) -> Result<Option<JobStatusView>> {
        let job = self.store.find_by_id(job_id).await?;
        Ok(job.as_ref().map(JobStatusView::from_record))
    }
}
