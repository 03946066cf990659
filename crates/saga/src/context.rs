use portico_domain::{ProvisioningJobId, TenantId};
use std::collections::HashMap;

/// Context passed to every step execution and compensation.
///
/// Carries the refs accumulated by earlier steps: later steps depend on
/// earlier postconditions (domain configuration reuses the deployment URL
/// the CDN step recorded), and compensations receive the refs that existed
/// when the saga stopped.
#[derive(Debug, Clone)]
pub struct StepContext {
    pub job_id: ProvisioningJobId,
    pub tenant_id: TenantId,
    /// Zero-based position of the step this context is for.
    pub step_index: usize,
    /// Number of steps in the registry the job runs against.
    pub steps_total: usize,
    refs: HashMap<String, serde_json::Value>,
}

impl StepContext {
    pub fn new(
        job_id: ProvisioningJobId,
        tenant_id: TenantId,
        refs: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            job_id,
            tenant_id,
            step_index: 0,
            steps_total: 0,
            refs,
        }
    }

    /// Positions the context at one step of the sequence.
    pub fn at_step(mut self, step_index: usize, steps_total: usize) -> Self {
        self.step_index = step_index;
        self.steps_total = steps_total;
        self
    }

    pub fn get_ref(&self, key: &str) -> Option<&serde_json::Value> {
        self.refs.get(key)
    }

    /// String-typed ref lookup, the common case for URLs and identifiers.
    pub fn get_str_ref(&self, key: &str) -> Option<&str> {
        self.refs.get(key).and_then(|v| v.as_str())
    }

    pub fn refs(&self) -> &HashMap<String, serde_json::Value> {
        &self.refs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ref_lookup() {
        let mut refs = HashMap::new();
        refs.insert("deployment_url".to_string(), json!("https://d-1.cdn.test"));
        refs.insert("page_count".to_string(), json!(12));

        let ctx = StepContext::new(
            ProvisioningJobId::new(),
            TenantId::from("tenant-1"),
            refs,
        );

        assert_eq!(ctx.get_str_ref("deployment_url"), Some("https://d-1.cdn.test"));
        // Non-string refs are visible raw but not as strings
        assert_eq!(ctx.get_str_ref("page_count"), None);
        assert_eq!(ctx.get_ref("page_count"), Some(&json!(12)));
        assert_eq!(ctx.get_ref("missing"), None);
    }
}
