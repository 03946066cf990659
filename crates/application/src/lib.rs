// Portico Directory Platform - Application Layer
// Use cases for the tenant provisioning saga:
// - LaunchProvisioningUseCase: accept a publish request, hand off execution
// - GetProvisioningStatusUseCase: project the job record for polling callers
// - CancelProvisioningUseCase: record-based cooperative cancellation
// - steps: the standard six-step provisioning sequence

pub mod provisioning;

pub use provisioning::*;
