// In-memory Repositories
// In-memory implementations of the storage ports. The write lock around the
// whole map is what makes `apply` an atomic read-modify-write.

use async_trait::async_trait;
use portico_domain::{
    JobRecordPatch, JobRecordStore, ProvisioningJob, ProvisioningJobId, Result, TenantDirectory,
    TenantId, TenantRecord,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory store for provisioning job records
#[derive(Clone, Default)]
pub struct InMemoryJobRecordStore {
    jobs: Arc<RwLock<HashMap<ProvisioningJobId, ProvisioningJob>>>,
}

impl InMemoryJobRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }
}

#[async_trait]
impl JobRecordStore for InMemoryJobRecordStore {
    async fn insert(&self, job: &ProvisioningJob) -> Result<()> {
        let mut jobs = self.jobs.write().await;
        jobs.insert(job.id.clone(), job.clone());
        Ok(())
    }

    async fn find_by_id(&self, job_id: &ProvisioningJobId) -> Result<Option<ProvisioningJob>> {
        let jobs = self.jobs.read().await;
        Ok(jobs.get(job_id).cloned())
    }

    async fn apply(
        &self,
        job_id: &ProvisioningJobId,
        patch: JobRecordPatch,
    ) -> Result<Option<ProvisioningJob>> {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(job_id) {
            None => Ok(None),
            Some(job) => {
                job.apply(&patch);
                Ok(Some(job.clone()))
            }
        }
    }

    async fn delete(&self, job_id: &ProvisioningJobId) -> Result<()> {
        let mut jobs = self.jobs.write().await;
        jobs.remove(job_id);
        Ok(())
    }

    async fn find_active_for_tenant(
        &self,
        tenant_id: &TenantId,
    ) -> Result<Option<ProvisioningJob>> {
        let jobs = self.jobs.read().await;
        Ok(jobs
            .values()
            .find(|job| &job.tenant_id == tenant_id && job.status.is_active())
            .cloned())
    }
}

/// In-memory tenant store with publication flags
#[derive(Clone, Default)]
pub struct InMemoryTenantDirectory {
    tenants: Arc<RwLock<HashMap<TenantId, TenantRecord>>>,
}

impl InMemoryTenantDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert(&self, record: TenantRecord) {
        let mut tenants = self.tenants.write().await;
        tenants.insert(record.id.clone(), record);
    }

    pub async fn remove(&self, tenant_id: &TenantId) {
        let mut tenants = self.tenants.write().await;
        tenants.remove(tenant_id);
    }
}

#[async_trait]
impl TenantDirectory for InMemoryTenantDirectory {
    async fn find(&self, tenant_id: &TenantId) -> Result<Option<TenantRecord>> {
        let tenants = self.tenants.read().await;
        Ok(tenants.get(tenant_id).cloned())
    }

    async fn mark_published(&self, tenant_id: &TenantId) -> Result<bool> {
        let mut tenants = self.tenants.write().await;
        match tenants.get_mut(tenant_id) {
            None => Ok(false),
            Some(tenant) => {
                tenant.published = true;
                Ok(true)
            }
        }
    }
}
