pub mod cancel;
pub mod launch;
pub mod status;
pub mod steps;

pub use cancel::CancelProvisioningUseCase;
pub use launch::LaunchProvisioningUseCase;
pub use status::{GetProvisioningStatusUseCase, JobStatusView, ProvisioningResult};
pub use steps::{standard_registry, ProvisioningCollaborators};
