//!
//! # Step Contract
//!
//! One provisioning step: an execute action producing opaque external refs,
//! and an optional best-effort compensate action.
//!

use crate::context::StepContext;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Data a successful step hands back to the executor.
///
/// `external_refs` is merged additively into the job record and becomes
/// visible to later steps through their [`StepContext`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepOutput {
    pub external_refs: HashMap<String, serde_json::Value>,
}

impl StepOutput {
    /// A successful step with no refs to record.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_ref(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.external_refs.insert(key.into(), value);
        self
    }
}

/// Classification of a step failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StepErrorKind {
    /// A postcondition of an earlier step or external precondition is unmet.
    PreconditionFailed,
    /// The external system the step drives refused or was unreachable.
    ExternalService,
    /// Anything else.
    Internal,
}

/// Step execution failure. Stops the saga and triggers compensation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepError {
    pub reason: String,
    pub kind: StepErrorKind,
}

impl StepError {
    pub fn new(reason: impl Into<String>, kind: StepErrorKind) -> Self {
        Self {
            reason: reason.into(),
            kind,
        }
    }

    pub fn precondition(reason: impl Into<String>) -> Self {
        Self::new(reason, StepErrorKind::PreconditionFailed)
    }

    pub fn external(reason: impl Into<String>) -> Self {
        Self::new(reason, StepErrorKind::ExternalService)
    }

    pub fn internal(reason: impl Into<String>) -> Self {
        Self::new(reason, StepErrorKind::Internal)
    }
}

impl std::fmt::Display for StepError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason)
    }
}

impl std::error::Error for StepError {}

/// Compensation failure. Logged and swallowed by the executor.
#[derive(thiserror::Error, Debug, Clone, Serialize, Deserialize)]
#[error("Compensation for {step} failed: {reason}")]
pub struct CompensationError {
    pub step: String,
    pub reason: String,
}

impl CompensationError {
    pub fn new(step: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            reason: reason.into(),
        }
    }
}

/// One unit of provisioning work.
///
/// Steps are value objects constructed once at startup and shared through the
/// [`crate::registry::StepRegistry`]. `compensate` defaults to a no-op for
/// steps whose side effects need no undoing.
#[async_trait]
pub trait ProvisioningStep: Send + Sync {
    fn name(&self) -> &'static str;

    async fn execute(&self, ctx: &StepContext) -> Result<StepOutput, StepError>;

    async fn compensate(&self, _ctx: &StepContext) -> Result<(), CompensationError> {
        Ok(())
    }
}
