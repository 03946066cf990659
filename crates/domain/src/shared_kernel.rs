use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for provisioning jobs
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProvisioningJobId(pub Uuid);

impl ProvisioningJobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for ProvisioningJobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProvisioningJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the tenant a job provisions.
///
/// A job only references its tenant. The tenant row may be deleted out-of-band
/// while a job is mid-flight, so this is an opaque slug rather than a foreign
/// key the job's lifecycle depends on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(pub String);

impl TenantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TenantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TenantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Kind of provisioning requested. Informational: the step sequence is the
/// same for every kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProvisioningJobType {
    Create,
    Update,
    Delete,
    Republish,
}

impl fmt::Display for ProvisioningJobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisioningJobType::Create => write!(f, "CREATE"),
            ProvisioningJobType::Update => write!(f, "UPDATE"),
            ProvisioningJobType::Delete => write!(f, "DELETE"),
            ProvisioningJobType::Republish => write!(f, "REPUBLISH"),
        }
    }
}

impl FromStr for ProvisioningJobType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "CREATE" => Ok(ProvisioningJobType::Create),
            "UPDATE" => Ok(ProvisioningJobType::Update),
            "DELETE" => Ok(ProvisioningJobType::Delete),
            "REPUBLISH" => Ok(ProvisioningJobType::Republish),
            _ => Err(format!("Invalid ProvisioningJobType: {}", s)),
        }
    }
}

/// States of a provisioning job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProvisioningJobStatus {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl ProvisioningJobStatus {
    /// Validates a state transition against the job state machine.
    ///
    /// Valid transitions:
    /// - Queued → Running, Failed, Cancelled
    /// - Running → Completed, Failed, Cancelled
    /// - Completed, Failed, Cancelled → (terminal, no outgoing transitions)
    pub fn can_transition_to(&self, new_status: &ProvisioningJobStatus) -> bool {
        match (self, new_status) {
            (s, n) if s == n => false,

            (ProvisioningJobStatus::Queued, ProvisioningJobStatus::Running) => true,
            (ProvisioningJobStatus::Queued, ProvisioningJobStatus::Failed) => true,
            (ProvisioningJobStatus::Queued, ProvisioningJobStatus::Cancelled) => true,

            (ProvisioningJobStatus::Running, ProvisioningJobStatus::Completed) => true,
            (ProvisioningJobStatus::Running, ProvisioningJobStatus::Failed) => true,
            (ProvisioningJobStatus::Running, ProvisioningJobStatus::Cancelled) => true,

            _ => false,
        }
    }

    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProvisioningJobStatus::Completed
                | ProvisioningJobStatus::Failed
                | ProvisioningJobStatus::Cancelled
        )
    }

    /// Returns true while the job still occupies the tenant's provisioning slot
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            ProvisioningJobStatus::Queued | ProvisioningJobStatus::Running
        )
    }
}

impl fmt::Display for ProvisioningJobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisioningJobStatus::Queued => write!(f, "QUEUED"),
            ProvisioningJobStatus::Running => write!(f, "RUNNING"),
            ProvisioningJobStatus::Completed => write!(f, "COMPLETED"),
            ProvisioningJobStatus::Failed => write!(f, "FAILED"),
            ProvisioningJobStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl FromStr for ProvisioningJobStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "QUEUED" => Ok(ProvisioningJobStatus::Queued),
            "RUNNING" => Ok(ProvisioningJobStatus::Running),
            "COMPLETED" => Ok(ProvisioningJobStatus::Completed),
            "FAILED" => Ok(ProvisioningJobStatus::Failed),
            "CANCELLED" => Ok(ProvisioningJobStatus::Cancelled),
            _ => Err(format!("Invalid ProvisioningJobStatus: {}", s)),
        }
    }
}

/// Domain errors
#[derive(thiserror::Error, Debug)]
pub enum DomainError {
    #[error("Provisioning job not found: {job_id}")]
    JobNotFound { job_id: ProvisioningJobId },

    #[error("Tenant not found: {tenant_id}")]
    TenantNotFound { tenant_id: TenantId },

    #[error("Invalid job state transition from {from} to {to}")]
    InvalidStateTransition {
        from: ProvisioningJobStatus,
        to: ProvisioningJobStatus,
    },

    #[error("Tenant {tenant_id} already has an active provisioning job")]
    TenantProvisioningActive { tenant_id: TenantId },

    #[error("External service error: {service}: {message}")]
    ExternalServiceError { service: String, message: String },

    #[error("Infrastructure error: {message}")]
    InfrastructureError { message: String },
}

pub type Result<T> = std::result::Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_str() {
        assert_eq!(
            "QUEUED".parse::<ProvisioningJobStatus>().unwrap(),
            ProvisioningJobStatus::Queued
        );
        assert_eq!(
            "RUNNING".parse::<ProvisioningJobStatus>().unwrap(),
            ProvisioningJobStatus::Running
        );
        assert_eq!(
            "COMPLETED".parse::<ProvisioningJobStatus>().unwrap(),
            ProvisioningJobStatus::Completed
        );
        assert_eq!(
            "FAILED".parse::<ProvisioningJobStatus>().unwrap(),
            ProvisioningJobStatus::Failed
        );
        assert_eq!(
            "CANCELLED".parse::<ProvisioningJobStatus>().unwrap(),
            ProvisioningJobStatus::Cancelled
        );

        assert!("INVALID".parse::<ProvisioningJobStatus>().is_err());
    }

    #[test]
    fn test_valid_transitions() {
        use ProvisioningJobStatus::*;

        assert!(Queued.can_transition_to(&Running));
        assert!(Queued.can_transition_to(&Failed));
        assert!(Queued.can_transition_to(&Cancelled));
        assert!(Running.can_transition_to(&Completed));
        assert!(Running.can_transition_to(&Failed));
        assert!(Running.can_transition_to(&Cancelled));
    }

    #[test]
    fn test_invalid_transitions() {
        use ProvisioningJobStatus::*;

        // Same state is not a transition
        assert!(!Running.can_transition_to(&Running));
        // Queued never completes without running
        assert!(!Queued.can_transition_to(&Completed));
        // No way back
        assert!(!Running.can_transition_to(&Queued));
        // Terminal states have no outgoing transitions
        for terminal in [Completed, Failed, Cancelled] {
            for target in [Queued, Running, Completed, Failed, Cancelled] {
                if terminal != target {
                    assert!(!terminal.can_transition_to(&target));
                }
            }
        }
    }

    #[test]
    fn test_terminal_and_active() {
        use ProvisioningJobStatus::*;

        assert!(Completed.is_terminal());
        assert!(Failed.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(!Queued.is_terminal());
        assert!(!Running.is_terminal());

        assert!(Queued.is_active());
        assert!(Running.is_active());
        assert!(!Failed.is_active());
    }

    #[test]
    fn test_job_type_roundtrip() {
        for t in [
            ProvisioningJobType::Create,
            ProvisioningJobType::Update,
            ProvisioningJobType::Delete,
            ProvisioningJobType::Republish,
        ] {
            assert_eq!(t.to_string().parse::<ProvisioningJobType>().unwrap(), t);
        }
        assert!("PUBLISH".parse::<ProvisioningJobType>().is_err());
    }

    #[test]
    fn test_status_serde_casing() {
        let json = serde_json::to_string(&ProvisioningJobStatus::Queued).unwrap();
        assert_eq!(json, "\"QUEUED\"");
    }
}
