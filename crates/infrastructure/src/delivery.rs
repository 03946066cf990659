// Simulated delivery collaborators.
// Deterministic stand-ins for the real site-generation, CDN, search and DNS
// integrations. Real adapters implement the same domain ports.

use async_trait::async_trait;
use portico_domain::{
    Deployment, DomainBinding, DomainConfigurer, IndexSummary, Result, SearchIndexer,
    SiteArtifact, SiteDeployer, SiteGenerator, TenantId,
};
use std::sync::atomic::{AtomicU64, Ordering};

/// Generates a static site artifact with a monotonically numbered build id.
#[derive(Debug)]
pub struct InMemorySiteGenerator {
    builds: AtomicU64,
    page_count: usize,
}

impl InMemorySiteGenerator {
    pub fn new() -> Self {
        Self {
            builds: AtomicU64::new(0),
            page_count: 3,
        }
    }

    pub fn with_page_count(mut self, page_count: usize) -> Self {
        self.page_count = page_count;
        self
    }

    pub fn build_count(&self) -> u64 {
        self.builds.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SiteGenerator for InMemorySiteGenerator {
    async fn generate(&self, tenant_id: &TenantId) -> Result<SiteArtifact> {
        let n = self.builds.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(SiteArtifact {
            build_id: format!("build-{}-{:04}", tenant_id, n),
            page_count: self.page_count,
        })
    }
}

/// Deploys builds to numbered per-tenant hosts under a base domain.
#[derive(Debug)]
pub struct InMemorySiteDeployer {
    base_domain: String,
    deployments: AtomicU64,
}

impl InMemorySiteDeployer {
    pub fn new(base_domain: impl Into<String>) -> Self {
        Self {
            base_domain: base_domain.into(),
            deployments: AtomicU64::new(0),
        }
    }

    pub fn deployment_count(&self) -> u64 {
        self.deployments.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SiteDeployer for InMemorySiteDeployer {
    async fn deploy(&self, tenant_id: &TenantId, build_id: &str) -> Result<Deployment> {
        let n = self.deployments.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Deployment {
            deployment_id: format!("dep-{:04}-{}", n, build_id),
            deployment_url: format!("https://{}-{:04}.{}", tenant_id, n, self.base_domain),
        })
    }
}

/// Builds per-tenant listing indexes.
#[derive(Debug, Default)]
pub struct InMemorySearchIndexer {
    document_count: usize,
}

impl InMemorySearchIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document_count(mut self, document_count: usize) -> Self {
        self.document_count = document_count;
        self
    }
}

#[async_trait]
impl SearchIndexer for InMemorySearchIndexer {
    async fn build_index(&self, tenant_id: &TenantId) -> Result<IndexSummary> {
        Ok(IndexSummary {
            index_name: format!("listings-{}", tenant_id),
            indexed_documents: self.document_count,
        })
    }
}

/// Binds the custom domain when one is requested, otherwise the deployment host.
#[derive(Debug, Default)]
pub struct InMemoryDomainConfigurer;

impl InMemoryDomainConfigurer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DomainConfigurer for InMemoryDomainConfigurer {
    async fn configure(
        &self,
        _tenant_id: &TenantId,
        custom_domain: Option<&str>,
        deployment_url: &str,
    ) -> Result<DomainBinding> {
        let hostname = match custom_domain {
            Some(domain) => domain.to_string(),
            None => deployment_url
                .trim_start_matches("https://")
                .trim_start_matches("http://")
                .to_string(),
        };
        Ok(DomainBinding { hostname })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_generator_numbers_builds_per_instance() {
        let generator = InMemorySiteGenerator::new().with_page_count(5);
        let tenant = TenantId::from("acme");

        let first = generator.generate(&tenant).await.unwrap();
        let second = generator.generate(&tenant).await.unwrap();
        assert_eq!(first.build_id, "build-acme-0001");
        assert_eq!(second.build_id, "build-acme-0002");
        assert_eq!(first.page_count, 5);
        assert_eq!(generator.build_count(), 2);
    }

    #[tokio::test]
    async fn test_deployer_builds_urls_under_base_domain() {
        let deployer = InMemorySiteDeployer::new("portico.site");
        let deployment = deployer
            .deploy(&TenantId::from("acme"), "build-acme-0001")
            .await
            .unwrap();
        assert_eq!(deployment.deployment_url, "https://acme-0001.portico.site");
        assert_eq!(deployer.deployment_count(), 1);
    }

    #[tokio::test]
    async fn test_domain_configurer_prefers_custom_domain() {
        let configurer = InMemoryDomainConfigurer::new();
        let tenant = TenantId::from("acme");

        let custom = configurer
            .configure(&tenant, Some("directory.acme.com"), "https://acme-0001.portico.site")
            .await
            .unwrap();
        assert_eq!(custom.hostname, "directory.acme.com");

        let fallback = configurer
            .configure(&tenant, None, "https://acme-0001.portico.site")
            .await
            .unwrap();
        assert_eq!(fallback.hostname, "acme-0001.portico.site");
    }
}
