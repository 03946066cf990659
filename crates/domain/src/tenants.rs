// Tenant publication state collaborator.
// The provisioning core reads tenant data for validation and performs exactly
// one external mutation: flipping the tenant to published on finalize.

use crate::shared_kernel::{Result, TenantId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Snapshot of the tenant data the provisioning saga needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantRecord {
    pub id: TenantId,
    pub display_name: String,
    /// Custom domain requested by the tenant, if any.
    pub custom_domain: Option<String>,
    /// Number of directory listings the tenant has authored.
    pub listing_count: usize,
    pub published: bool,
}

impl TenantRecord {
    pub fn new(id: impl Into<TenantId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            custom_domain: None,
            listing_count: 0,
            published: false,
        }
    }

    pub fn with_custom_domain(mut self, domain: impl Into<String>) -> Self {
        self.custom_domain = Some(domain.into());
        self
    }

    pub fn with_listing_count(mut self, count: usize) -> Self {
        self.listing_count = count;
        self
    }
}

/// Port onto the tenant store owned by the surrounding application.
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    async fn find(&self, tenant_id: &TenantId) -> Result<Option<TenantRecord>>;

    /// Flips the tenant's externally-visible publication state.
    ///
    /// Returns `false` when the tenant no longer exists; the tenant vanishing
    /// mid-saga is tolerated, not an error.
    async fn mark_published(&self, tenant_id: &TenantId) -> Result<bool>;
}
