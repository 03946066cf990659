// Delivery collaborator ports.
// Each port wraps one external system the provisioning saga drives: static
// site generation, CDN deployment, search indexing and domain configuration.
// Implementations live in infrastructure; the saga only sees these traits.

use crate::shared_kernel::{Result, TenantId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Artifact produced by generating a tenant's static site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteArtifact {
    pub build_id: String,
    pub page_count: usize,
}

/// Result of pushing an artifact to the content-delivery target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    pub deployment_id: String,
    pub deployment_url: String,
}

/// Result of building the tenant's search index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSummary {
    pub index_name: String,
    pub indexed_documents: usize,
}

/// Result of binding the tenant's hostname to a deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainBinding {
    pub hostname: String,
}

#[async_trait]
pub trait SiteGenerator: Send + Sync {
    async fn generate(&self, tenant_id: &TenantId) -> Result<SiteArtifact>;
}

#[async_trait]
pub trait SiteDeployer: Send + Sync {
    async fn deploy(&self, tenant_id: &TenantId, build_id: &str) -> Result<Deployment>;
}

#[async_trait]
pub trait SearchIndexer: Send + Sync {
    async fn build_index(&self, tenant_id: &TenantId) -> Result<IndexSummary>;
}

#[async_trait]
pub trait DomainConfigurer: Send + Sync {
    /// Points the tenant's hostname (custom domain or platform subdomain) at
    /// an existing deployment.
    async fn configure(
        &self,
        tenant_id: &TenantId,
        custom_domain: Option<&str>,
        deployment_url: &str,
    ) -> Result<DomainBinding>;
}
