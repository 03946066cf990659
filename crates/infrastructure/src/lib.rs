// Portico Directory Platform - Infrastructure Layer
// In-memory adapters for the domain ports:
// - repositories: InMemoryJobRecordStore, InMemoryTenantDirectory
// - delivery: simulated site generation / CDN / search / domain collaborators
// - event_bus: InMemoryEventBus over a broadcast channel

pub mod delivery;
pub mod event_bus;
pub mod repositories;

pub use delivery::*;
pub use event_bus::*;
pub use repositories::*;
