// Portico Directory Platform - Domain Layer
// Bounded Contexts:
// - shared_kernel: base types, IDs and shared errors
// - provisioning: ProvisioningJob aggregate, JobRecordPatch, JobRecordStore
// - tenants: TenantRecord, TenantDirectory (publication state collaborator)
// - delivery: site generation / CDN / search / domain collaborator ports
// - events: DomainEvent, EventBus
// - config: ProvisioningConfig, env loader

pub mod config;
pub mod delivery;
pub mod events;
pub mod provisioning;
pub mod shared_kernel;
pub mod tenants;

pub use config::*;
pub use delivery::*;
pub use events::*;
pub use provisioning::*;
pub use shared_kernel::*;
pub use tenants::*;
