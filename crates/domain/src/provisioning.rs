// Provisioning Bounded Context
// ProvisioningJob aggregate, narrow record patches and the record store port.

use crate::shared_kernel::*;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One durable record per provisioning attempt.
///
/// The record is the only caller-visible artifact of a running saga: callers
/// poll it, the executor patches it, and nothing else ever mutates it. It is
/// never deleted by this crate; external cleanup may remove it mid-run and
/// every writer has to tolerate that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisioningJob {
    pub id: ProvisioningJobId,
    pub tenant_id: TenantId,
    pub job_type: ProvisioningJobType,
    pub status: ProvisioningJobStatus,
    /// Percent complete, 0-100. Non-decreasing while the job is running.
    pub progress: u8,
    /// Name of the step currently executing or last attempted.
    pub current_step: Option<String>,
    pub steps_total: u32,
    pub steps_completed: u32,
    /// Opaque results emitted by successful steps. Additive only.
    pub external_refs: HashMap<String, serde_json::Value>,
    /// Rollback hints for compensating steps. Additive only.
    pub compensation_data: HashMap<String, serde_json::Value>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ProvisioningJob {
    pub fn new(tenant_id: TenantId, job_type: ProvisioningJobType, steps_total: u32) -> Self {
        Self {
            id: ProvisioningJobId::new(),
            tenant_id,
            job_type,
            status: ProvisioningJobStatus::Queued,
            progress: 0,
            current_step: None,
            steps_total,
            steps_completed: 0,
            external_refs: HashMap::new(),
            compensation_data: HashMap::new(),
            error_message: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    /// Percent progress for `completed` of `total` steps, 0.5 rounding up.
    pub fn progress_for(completed: u32, total: u32) -> u8 {
        if total == 0 {
            return 0;
        }
        ((completed as f64 / total as f64) * 100.0).round() as u8
    }

    /// Merges a narrow patch into the record.
    ///
    /// The merge enforces the record invariants regardless of who produced
    /// the patch: the status only moves along valid transitions (terminal
    /// states never regress), `steps_completed` and `progress` are
    /// monotonically non-decreasing, timestamps are set once, the error
    /// message lands only together with an accepted FAILED transition, and
    /// both ref maps are merged additively.
    pub fn apply(&mut self, patch: &JobRecordPatch) {
        let mut entered_failed = false;
        if let Some(status) = &patch.status {
            if self.status.can_transition_to(status) {
                self.status = status.clone();
                entered_failed = *status == ProvisioningJobStatus::Failed;
            }
        }

        if let Some(step) = &patch.current_step {
            self.current_step = Some(step.clone());
        }
        if let Some(n) = patch.steps_completed {
            if n > self.steps_completed {
                self.steps_completed = n;
            }
        }
        if let Some(p) = patch.progress {
            if p > self.progress {
                self.progress = p;
            }
        }
        if self.started_at.is_none() {
            if let Some(t) = patch.started_at {
                self.started_at = Some(t);
            }
        }
        if self.completed_at.is_none() {
            if let Some(t) = patch.completed_at {
                self.completed_at = Some(t);
            }
        }
        if entered_failed {
            if let Some(message) = &patch.error_message {
                self.error_message = Some(message.clone());
            }
        }
        for (key, value) in &patch.external_refs {
            self.external_refs.insert(key.clone(), value.clone());
        }
        for (key, value) in &patch.compensation_data {
            self.compensation_data.insert(key.clone(), value.clone());
        }
    }
}

/// Narrow field merge against a job record.
///
/// Patches carry only the fields one mutation touches; `ProvisioningJob::apply`
/// owns the merge semantics so every store backend inherits the same
/// invariants from a single read-modify-write.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobRecordPatch {
    pub status: Option<ProvisioningJobStatus>,
    pub current_step: Option<String>,
    pub steps_completed: Option<u32>,
    pub progress: Option<u8>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub external_refs: HashMap<String, serde_json::Value>,
    pub compensation_data: HashMap<String, serde_json::Value>,
}

impl JobRecordPatch {
    /// Transition into RUNNING at saga start.
    pub fn started() -> Self {
        Self {
            status: Some(ProvisioningJobStatus::Running),
            started_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    /// Bookkeeping after one successful step.
    pub fn step_succeeded(step_name: &str, completed: u32, total: u32) -> Self {
        Self {
            current_step: Some(step_name.to_string()),
            steps_completed: Some(completed),
            progress: Some(ProvisioningJob::progress_for(completed, total)),
            ..Default::default()
        }
    }

    /// Terminal FAILED write after compensation has run.
    pub fn failed(step_name: &str, message: impl Into<String>) -> Self {
        Self {
            status: Some(ProvisioningJobStatus::Failed),
            current_step: Some(step_name.to_string()),
            error_message: Some(message.into()),
            completed_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    /// Terminal COMPLETED write, owned by the finalizing step.
    pub fn completed() -> Self {
        Self {
            status: Some(ProvisioningJobStatus::Completed),
            progress: Some(100),
            completed_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    /// Terminal CANCELLED write from an explicit cancel request.
    pub fn cancelled() -> Self {
        Self {
            status: Some(ProvisioningJobStatus::Cancelled),
            completed_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    /// Adds an external ref to merge additively into the record.
    pub fn with_external_ref(
        mut self,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        self.external_refs.insert(key.into(), value);
        self
    }

    /// Adds a batch of external refs to merge additively into the record.
    pub fn with_external_refs(mut self, refs: HashMap<String, serde_json::Value>) -> Self {
        self.external_refs.extend(refs);
        self
    }
}

/// Durable storage port for provisioning job records.
///
/// Owns no orchestration logic: CRUD plus the atomic `apply` merge. `apply`
/// and `find_by_id` signal a missing record in-band (`Ok(None)`) because a
/// record legitimately vanishing mid-saga is not an error for callers.
#[async_trait]
pub trait JobRecordStore: Send + Sync {
    async fn insert(&self, job: &ProvisioningJob) -> Result<()>;

    async fn find_by_id(&self, job_id: &ProvisioningJobId) -> Result<Option<ProvisioningJob>>;

    /// Atomically merges `patch` into the record and returns the record after
    /// the merge, or `None` when the record no longer exists.
    async fn apply(
        &self,
        job_id: &ProvisioningJobId,
        patch: JobRecordPatch,
    ) -> Result<Option<ProvisioningJob>>;

    async fn delete(&self, job_id: &ProvisioningJobId) -> Result<()>;

    /// The QUEUED or RUNNING job for a tenant, if any.
    async fn find_active_for_tenant(
        &self,
        tenant_id: &TenantId,
    ) -> Result<Option<ProvisioningJob>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job() -> ProvisioningJob {
        ProvisioningJob::new(TenantId::from("tenant-1"), ProvisioningJobType::Create, 6)
    }

    #[test]
    fn test_new_job_is_queued_and_empty() {
        let job = job();
        assert_eq!(job.status, ProvisioningJobStatus::Queued);
        assert_eq!(job.progress, 0);
        assert_eq!(job.steps_completed, 0);
        assert_eq!(job.steps_total, 6);
        assert!(job.external_refs.is_empty());
        assert!(job.started_at.is_none());
        assert!(job.completed_at.is_none());
    }

    #[test]
    fn test_progress_rounding() {
        assert_eq!(ProvisioningJob::progress_for(0, 6), 0);
        assert_eq!(ProvisioningJob::progress_for(1, 6), 17);
        assert_eq!(ProvisioningJob::progress_for(2, 6), 33);
        assert_eq!(ProvisioningJob::progress_for(3, 6), 50);
        assert_eq!(ProvisioningJob::progress_for(4, 6), 67);
        assert_eq!(ProvisioningJob::progress_for(5, 6), 83);
        assert_eq!(ProvisioningJob::progress_for(6, 6), 100);
        // 12.5 rounds up
        assert_eq!(ProvisioningJob::progress_for(1, 8), 13);
        assert_eq!(ProvisioningJob::progress_for(1, 3), 33);
        assert_eq!(ProvisioningJob::progress_for(2, 3), 67);
        assert_eq!(ProvisioningJob::progress_for(0, 0), 0);
    }

    #[test]
    fn test_apply_step_bookkeeping() {
        let mut job = job();
        job.apply(&JobRecordPatch::started());
        assert_eq!(job.status, ProvisioningJobStatus::Running);
        assert!(job.started_at.is_some());

        job.apply(
            &JobRecordPatch::step_succeeded("generate_site", 2, 6)
                .with_external_ref("build_id", json!("b-1")),
        );
        assert_eq!(job.steps_completed, 2);
        assert_eq!(job.progress, 33);
        assert_eq!(job.current_step.as_deref(), Some("generate_site"));
        assert_eq!(job.external_refs["build_id"], json!("b-1"));
    }

    #[test]
    fn test_apply_never_regresses_counters() {
        let mut job = job();
        job.apply(&JobRecordPatch::started());
        job.apply(&JobRecordPatch::step_succeeded("deploy_site", 3, 6));

        job.apply(&JobRecordPatch::step_succeeded("validate_tenant", 1, 6));
        assert_eq!(job.steps_completed, 3);
        assert_eq!(job.progress, 50);
    }

    #[test]
    fn test_terminal_status_never_regresses() {
        let mut job = job();
        job.apply(&JobRecordPatch::started());
        job.apply(&JobRecordPatch::cancelled());
        assert_eq!(job.status, ProvisioningJobStatus::Cancelled);
        let cancelled_at = job.completed_at;

        // A late FAILED write from the executor loses the race and changes nothing.
        job.apply(&JobRecordPatch::failed("deploy_site", "cdn unreachable"));
        assert_eq!(job.status, ProvisioningJobStatus::Cancelled);
        assert_eq!(job.error_message, None);
        assert_eq!(job.completed_at, cancelled_at);
    }

    #[test]
    fn test_error_message_only_with_accepted_failure() {
        let mut job = job();
        job.apply(&JobRecordPatch::started());
        job.apply(&JobRecordPatch::failed("deploy_site", "cdn unreachable"));
        assert_eq!(job.status, ProvisioningJobStatus::Failed);
        assert_eq!(job.error_message.as_deref(), Some("cdn unreachable"));
        assert_eq!(job.current_step.as_deref(), Some("deploy_site"));
        assert!(job.completed_at.is_some());
    }

    #[test]
    fn test_refs_merge_is_additive() {
        let mut job = job();
        job.apply(&JobRecordPatch::default().with_external_ref("build_id", json!("b-1")));
        job.apply(&JobRecordPatch::default().with_external_ref("deployment_url", json!("u")));
        assert_eq!(job.external_refs.len(), 2);
        assert_eq!(job.external_refs["build_id"], json!("b-1"));
    }

    #[test]
    fn test_completed_patch_sets_full_progress() {
        let mut job = job();
        job.apply(&JobRecordPatch::started());
        job.apply(&JobRecordPatch::step_succeeded("configure_domain", 5, 6));
        job.apply(&JobRecordPatch::completed().with_external_ref(
            "result",
            json!({"tenant_url": "https://acme.portico.site"}),
        ));
        assert_eq!(job.status, ProvisioningJobStatus::Completed);
        assert_eq!(job.progress, 100);
        assert!(job.completed_at.is_some());
        assert!(job.external_refs.contains_key("result"));
    }
}
