//! Reports returned by reconciliation calls.
//!
//! Per-container failures never abort a pass; they end up here instead.

use std::fmt;

use serde::Serialize;

use crate::model::Container;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Remove,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Remove => write!(f, "remove"),
        }
    }
}

/// One container operation that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerFailure {
    pub container: String,
    pub operation: Operation,
    pub reason: String,
}

impl ContainerFailure {
    pub(crate) fn new(container: &Container, operation: Operation, reason: impl Into<String>) -> Self {
        Self {
            container: container.display_name().to_string(),
            operation,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ContainerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.operation, self.container, self.reason)
    }
}

/// Outcome of `apply`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ApplyReport {
    pub removed: Vec<Container>,
    pub created: Vec<Container>,
    pub unchanged: usize,
    pub failures: Vec<ContainerFailure>,
    /// What now runs, as declared: unchanged plus successfully created.
    pub running: Vec<Container>,
}

impl ApplyReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Outcome of `add`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AddReport {
    pub created: Vec<Container>,
    /// Already running with identical configuration.
    pub ignored: Vec<Container>,
    pub failures: Vec<ContainerFailure>,
}

impl AddReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}
