use crate::step::ProvisioningStep;
use std::sync::Arc;

/// Ordered, immutable sequence of provisioning steps.
///
/// Built once at startup and shared by every executor task. Ordering is
/// significant: later steps assume earlier steps' postconditions hold, and
/// compensation walks completed steps in exactly the reverse order.
#[derive(Clone)]
pub struct StepRegistry {
    steps: Vec<Arc<dyn ProvisioningStep>>,
}

impl StepRegistry {
    pub fn new(steps: Vec<Arc<dyn ProvisioningStep>>) -> Self {
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[Arc<dyn ProvisioningStep>] {
        &self.steps
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }
}

impl std::fmt::Debug for StepRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepRegistry")
            .field("steps", &self.names())
            .finish()
    }
}
