//! The standard provisioning sequence.
//!
//! Six steps, executed in this order:
//! validate_tenant → generate_site → deploy_site → build_search_index →
//! configure_domain → finalize.
//!
//! Later steps assume earlier postconditions: deployment reuses the build id,
//! domain configuration reuses the deployment URL, finalize reuses the bound
//! hostname. The finalizing step owns the terminal COMPLETED write, including
//! the `result` refs callers consume. None of these steps defines a
//! compensation: generated artifacts, deployments and indexes are overwritten
//! by the next successful run rather than torn down.

use async_trait::async_trait;
use portico_domain::{
    DomainConfigurer, JobRecordPatch, JobRecordStore, ProvisioningConfig, SearchIndexer,
    SiteDeployer, SiteGenerator, TenantDirectory,
};
use portico_saga::{ProvisioningStep, StepContext, StepError, StepOutput, StepRegistry};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

pub const STEP_VALIDATE_TENANT: &str = "validate_tenant";
pub const STEP_GENERATE_SITE: &str = "generate_site";
pub const STEP_DEPLOY_SITE: &str = "deploy_site";
pub const STEP_BUILD_SEARCH_INDEX: &str = "build_search_index";
pub const STEP_CONFIGURE_DOMAIN: &str = "configure_domain";
pub const STEP_FINALIZE: &str = "finalize";

/// Ports the standard steps are wired against.
#[derive(Clone)]
pub struct ProvisioningCollaborators {
    pub store: Arc<dyn JobRecordStore>,
    pub tenants: Arc<dyn TenantDirectory>,
    pub site_generator: Arc<dyn SiteGenerator>,
    pub site_deployer: Arc<dyn SiteDeployer>,
    pub search_indexer: Arc<dyn SearchIndexer>,
    pub domain_configurer: Arc<dyn DomainConfigurer>,
}

/// Builds the standard six-step registry.
pub fn standard_registry(
    collaborators: &ProvisioningCollaborators,
    config: &ProvisioningConfig,
) -> StepRegistry {
    StepRegistry::new(vec![
        Arc::new(ValidateTenantStep {
            tenants: collaborators.tenants.clone(),
        }),
        Arc::new(GenerateSiteStep {
            site_generator: collaborators.site_generator.clone(),
        }),
        Arc::new(DeploySiteStep {
            site_deployer: collaborators.site_deployer.clone(),
        }),
        Arc::new(BuildSearchIndexStep {
            search_indexer: collaborators.search_indexer.clone(),
        }),
        Arc::new(ConfigureDomainStep {
            tenants: collaborators.tenants.clone(),
            domain_configurer: collaborators.domain_configurer.clone(),
        }),
        Arc::new(FinalizeStep {
            store: collaborators.store.clone(),
            tenants: collaborators.tenants.clone(),
            admin_base_url: config.admin_base_url.clone(),
        }),
    ])
}

/// Tenant data exists and is publishable.
struct ValidateTenantStep {
    tenants: Arc<dyn TenantDirectory>,
}

#[async_trait]
impl ProvisioningStep for ValidateTenantStep {
    fn name(&self) -> &'static str {
        STEP_VALIDATE_TENANT
    }

    async fn execute(&self, ctx: &StepContext) -> Result<StepOutput, StepError> {
        let tenant = self
            .tenants
            .find(&ctx.tenant_id)
            .await
            .map_err(|e| StepError::external(e.to_string()))?
            .ok_or_else(|| {
                StepError::precondition(format!("tenant {} does not exist", ctx.tenant_id))
            })?;

        if tenant.display_name.trim().is_empty() {
            return Err(StepError::precondition(format!(
                "tenant {} has no display name",
                ctx.tenant_id
            )));
        }
        if tenant.listing_count == 0 {
            return Err(StepError::precondition(format!(
                "tenant {} has no listings to publish",
                ctx.tenant_id
            )));
        }
        Ok(StepOutput::empty())
    }
}

/// Generate the static site artifact.
struct GenerateSiteStep {
    site_generator: Arc<dyn SiteGenerator>,
}

#[async_trait]
impl ProvisioningStep for GenerateSiteStep {
    fn name(&self) -> &'static str {
        STEP_GENERATE_SITE
    }

    async fn execute(&self, ctx: &StepContext) -> Result<StepOutput, StepError> {
        let artifact = self
            .site_generator
            .generate(&ctx.tenant_id)
            .await
            .map_err(|e| StepError::external(e.to_string()))?;

        Ok(StepOutput::empty()
            .with_ref("build_id", json!(artifact.build_id))
            .with_ref("page_count", json!(artifact.page_count)))
    }
}

/// Push the artifact to the content-delivery target.
struct DeploySiteStep {
    site_deployer: Arc<dyn SiteDeployer>,
}

#[async_trait]
impl ProvisioningStep for DeploySiteStep {
    fn name(&self) -> &'static str {
        STEP_DEPLOY_SITE
    }

    async fn execute(&self, ctx: &StepContext) -> Result<StepOutput, StepError> {
        let build_id = ctx
            .get_str_ref("build_id")
            .ok_or_else(|| StepError::precondition("no build_id recorded by site generation"))?;

        let deployment = self
            .site_deployer
            .deploy(&ctx.tenant_id, build_id)
            .await
            .map_err(|e| StepError::external(e.to_string()))?;

        Ok(StepOutput::empty()
            .with_ref("deployment_id", json!(deployment.deployment_id))
            .with_ref("deployment_url", json!(deployment.deployment_url)))
    }
}

/// Build the tenant's search index.
struct BuildSearchIndexStep {
    search_indexer: Arc<dyn SearchIndexer>,
}

#[async_trait]
impl ProvisioningStep for BuildSearchIndexStep {
    fn name(&self) -> &'static str {
        STEP_BUILD_SEARCH_INDEX
    }

    async fn execute(&self, ctx: &StepContext) -> Result<StepOutput, StepError> {
        let summary = self
            .search_indexer
            .build_index(&ctx.tenant_id)
            .await
            .map_err(|e| StepError::external(e.to_string()))?;

        Ok(StepOutput::empty()
            .with_ref("search_index", json!(summary.index_name))
            .with_ref("indexed_documents", json!(summary.indexed_documents)))
    }
}

/// Bind the tenant's hostname to the deployment.
struct ConfigureDomainStep {
    tenants: Arc<dyn TenantDirectory>,
    domain_configurer: Arc<dyn DomainConfigurer>,
}

#[async_trait]
impl ProvisioningStep for ConfigureDomainStep {
    fn name(&self) -> &'static str {
        STEP_CONFIGURE_DOMAIN
    }

    async fn execute(&self, ctx: &StepContext) -> Result<StepOutput, StepError> {
        let deployment_url = ctx.get_str_ref("deployment_url").ok_or_else(|| {
            StepError::precondition("no deployment_url recorded by site deployment")
        })?;

        // The tenant vanishing here is tolerated: the platform subdomain is
        // derived from the deployment instead of a custom domain.
        let custom_domain = self
            .tenants
            .find(&ctx.tenant_id)
            .await
            .map_err(|e| StepError::external(e.to_string()))?
            .and_then(|tenant| tenant.custom_domain);

        let binding = self
            .domain_configurer
            .configure(&ctx.tenant_id, custom_domain.as_deref(), deployment_url)
            .await
            .map_err(|e| StepError::external(e.to_string()))?;

        Ok(StepOutput::empty().with_ref("hostname", json!(binding.hostname)))
    }
}

/// Flip the tenant to published and write the terminal COMPLETED state.
struct FinalizeStep {
    store: Arc<dyn JobRecordStore>,
    tenants: Arc<dyn TenantDirectory>,
    admin_base_url: String,
}

#[async_trait]
impl ProvisioningStep for FinalizeStep {
    fn name(&self) -> &'static str {
        STEP_FINALIZE
    }

    async fn execute(&self, ctx: &StepContext) -> Result<StepOutput, StepError> {
        let hostname = ctx
            .get_str_ref("hostname")
            .ok_or_else(|| StepError::precondition("no hostname recorded by domain configuration"))?;

        let published = self
            .tenants
            .mark_published(&ctx.tenant_id)
            .await
            .map_err(|e| StepError::external(e.to_string()))?;
        if !published {
            warn!(
                tenant_id = %ctx.tenant_id,
                "tenant disappeared before publication, completing job anyway"
            );
        }

        let result = json!({
            "tenant_url": format!("https://{}", hostname),
            "admin_url": format!(
                "{}/tenants/{}",
                self.admin_base_url.trim_end_matches('/'),
                ctx.tenant_id
            ),
        });
        // Carry the full bookkeeping so the terminal record is consistent in
        // one write; the executor's own bookkeeping then merges as a no-op.
        let mut patch = JobRecordPatch::completed().with_external_ref("result", result);
        patch.current_step = Some(STEP_FINALIZE.to_string());
        patch.steps_completed = Some(ctx.steps_total as u32);
        if self
            .store
            .apply(&ctx.job_id, patch)
            .await
            .map_err(|e| StepError::external(e.to_string()))?
            .is_none()
        {
            warn!(job_id = %ctx.job_id, "job record no longer exists, completion not recorded");
        }

        Ok(StepOutput::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portico_domain::{ProvisioningJobId, Result as DomainResult, TenantId, TenantRecord};

    struct SingleTenant(Option<TenantRecord>);

    #[async_trait]
    impl TenantDirectory for SingleTenant {
        async fn find(&self, _tenant_id: &TenantId) -> DomainResult<Option<TenantRecord>> {
            Ok(self.0.clone())
        }

        async fn mark_published(&self, _tenant_id: &TenantId) -> DomainResult<bool> {
            Ok(self.0.is_some())
        }
    }

    fn ctx() -> StepContext {
        StepContext::new(
            ProvisioningJobId::new(),
            TenantId::from("tenant-1"),
            Default::default(),
        )
    }

    #[tokio::test]
    async fn test_validate_rejects_missing_tenant() {
        let step = ValidateTenantStep {
            tenants: Arc::new(SingleTenant(None)),
        };
        let err = step.execute(&ctx()).await.unwrap_err();
        assert!(err.reason.contains("does not exist"));
    }

    #[tokio::test]
    async fn test_validate_rejects_tenant_without_listings() {
        let tenant = TenantRecord::new("tenant-1", "Acme Trades");
        let step = ValidateTenantStep {
            tenants: Arc::new(SingleTenant(Some(tenant))),
        };
        let err = step.execute(&ctx()).await.unwrap_err();
        assert!(err.reason.contains("no listings"));
    }

    #[tokio::test]
    async fn test_validate_accepts_publishable_tenant() {
        let tenant = TenantRecord::new("tenant-1", "Acme Trades").with_listing_count(8);
        let step = ValidateTenantStep {
            tenants: Arc::new(SingleTenant(Some(tenant))),
        };
        assert!(step.execute(&ctx()).await.is_ok());
    }

    #[tokio::test]
    async fn test_deploy_requires_build_id() {
        struct NeverDeployer;

        #[async_trait]
        impl SiteDeployer for NeverDeployer {
            async fn deploy(
                &self,
                _tenant_id: &TenantId,
                _build_id: &str,
            ) -> DomainResult<portico_domain::Deployment> {
                unreachable!("deploy must not be reached without a build_id")
            }
        }

        let step = DeploySiteStep {
            site_deployer: Arc::new(NeverDeployer),
        };
        let err = step.execute(&ctx()).await.unwrap_err();
        assert!(err.reason.contains("build_id"));
    }
}
