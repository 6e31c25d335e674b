//! Reconcile: drives the runtime towards a declaration.
//!
//! Removals run one at a time and are each awaited, so names and host ports
//! are free before any creation starts. Creations then run concurrently and
//! the call returns once all of them have finished.

pub mod plan;
pub mod report;

use std::collections::HashSet;
use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, info, warn};

use crate::client::RuntimeOps;
use crate::docker::run::RunSpec;
use crate::error::EngineError;
use crate::inspect::running_containers;
use crate::model::{Container, Service};
use crate::state::declaration::flatten;
use crate::state::Declaration;

pub use plan::Plan;
pub use report::{AddReport, ApplyReport, ContainerFailure, Operation};

pub struct Reconciler {
    runtime: Arc<dyn RuntimeOps>,
}

impl Reconciler {
    pub fn new(runtime: Arc<dyn RuntimeOps>) -> Self {
        Self { runtime }
    }

    /// Make the runtime match `desired` exactly.
    ///
    /// Fails before touching the runtime if the declaration is invalid or the
    /// running set cannot be read. Everything after that is collected into
    /// the report.
    pub async fn apply(&self, desired: &Declaration) -> Result<ApplyReport, EngineError> {
        desired.validate()?;
        let running = running_containers(self.runtime.as_ref()).await?;
        let plan = Plan::diff(&desired.flatten(), &running);

        info!(
            remove = plan.remove.len(),
            create = plan.create.len(),
            unchanged = plan.unchanged.len(),
            "Reconciliation plan"
        );

        let mut report = ApplyReport {
            unchanged: plan.unchanged.len(),
            running: plan.unchanged,
            ..Default::default()
        };

        let mut failed_removals = HashSet::new();
        for container in plan.remove {
            match self.runtime.remove_container(&container.name).await {
                Ok(()) => {
                    info!(container = %container.name, image = %container.image, "Removed container");
                    report.removed.push(container);
                }
                Err(e) => {
                    warn!(container = %container.name, error = %e, "Failed to remove container");
                    failed_removals.insert(container.name.clone());
                    report
                        .failures
                        .push(ContainerFailure::new(&container, Operation::Remove, e.to_string()));
                }
            }
        }

        let (to_create, blocked): (Vec<_>, Vec<_>) = plan
            .create
            .into_iter()
            .partition(|c| c.name.is_empty() || !failed_removals.contains(&c.name));
        for container in blocked {
            warn!(container = %container.name, "Skipping creation: the existing container could not be removed");
            report.failures.push(ContainerFailure::new(
                &container,
                Operation::Create,
                "blocked by failed removal of the existing container",
            ));
        }

        let (created, failures) = self.create_all(to_create).await;
        report.running.extend(created.iter().cloned());
        report.created = created;
        report.failures.extend(failures);

        info!(
            removed = report.removed.len(),
            created = report.created.len(),
            failed = report.failures.len(),
            "Reconciliation finished"
        );
        Ok(report)
    }

    /// Start every container of `services` that is not already running.
    ///
    /// Never removes anything. A container listed twice is started once.
    pub async fn add(&self, services: &[Service]) -> Result<AddReport, EngineError> {
        for container in services.iter().flat_map(|s| &s.containers) {
            container.validate()?;
        }
        let mut known = running_containers(self.runtime.as_ref()).await?;

        let mut report = AddReport::default();
        let mut to_create = Vec::new();
        for container in flatten(services) {
            if known.contains(&container) {
                debug!(container = %container.display_name(), "Already running, ignoring");
                report.ignored.push(container);
            } else {
                known.push(container.clone());
                to_create.push(container);
            }
        }

        let (created, failures) = self.create_all(to_create).await;
        report.created = created;
        report.failures = failures;
        Ok(report)
    }

    /// Force-remove the running container called `name`.
    ///
    /// Returns the removed container as it was observed.
    pub async fn remove(&self, name: &str) -> Result<Container, EngineError> {
        let running = running_containers(self.runtime.as_ref()).await?;
        let target = running
            .into_iter()
            .find(|c| c.name == name)
            .ok_or_else(|| EngineError::NotFound(name.to_string()))?;

        self.runtime.remove_container(&target.name).await?;
        info!(container = %target.name, image = %target.image, "Removed container");
        Ok(target)
    }

    async fn create_all(&self, containers: Vec<Container>) -> (Vec<Container>, Vec<ContainerFailure>) {
        let runs = containers.into_iter().map(|container| async move {
            let spec = RunSpec::from(&container);
            let result = self.runtime.run_container(&spec).await;
            (container, result)
        });

        let mut created = Vec::new();
        let mut failures = Vec::new();
        for (container, result) in join_all(runs).await {
            match result {
                Ok(()) => {
                    info!(container = %container.display_name(), image = %container.image, "Created container");
                    created.push(container);
                }
                Err(e) => {
                    warn!(container = %container.display_name(), error = %e, "Failed to create container");
                    failures.push(ContainerFailure::new(&container, Operation::Create, e.to_string()));
                }
            }
        }
        (created, failures)
    }
}
