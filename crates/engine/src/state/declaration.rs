//! Declaration: the desired state, as an ordered list of services.
//!
//! This is the value the caller persists between runs. The engine never
//! stores it; it is passed in to `apply`/`add` and edited by the caller
//! through `merge` and `remove`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::model::{Container, Service};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Declaration {
    services: Vec<Service>,
}

impl Declaration {
    pub fn new(services: Vec<Service>) -> Self {
        Self { services }
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn into_services(self) -> Vec<Service> {
        self.services
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// All containers, service order first, then container order.
    pub fn flatten(&self) -> Vec<Container> {
        flatten(&self.services)
    }

    /// Validate every container and the declaration-wide name invariant.
    pub fn validate(&self) -> Result<(), EngineError> {
        validate_services(&self.services)
    }

    /// Append each service that has no structural equal yet.
    ///
    /// Returns how many services were inserted.
    pub fn merge(&mut self, services: impl IntoIterator<Item = Service>) -> usize {
        let mut inserted = 0;
        for service in services {
            if self.services.contains(&service) {
                continue;
            }
            self.services.push(service);
            inserted += 1;
        }
        inserted
    }

    /// Drop the containers called `name`, then any service they leave empty.
    ///
    /// Service names are not matched: a service sharing the name keeps its
    /// other containers. Returns `true` if the declaration changed.
    pub fn remove(&mut self, name: &str) -> bool {
        let mut changed = false;
        for service in &mut self.services {
            let before = service.containers.len();
            service.containers.retain(|c| c.name != name);
            if service.containers.len() != before {
                changed = true;
                if service.containers.is_empty() {
                    debug!(service = %service.name, "Service has no containers left");
                }
            }
        }
        if changed {
            self.services.retain(|s| !s.containers.is_empty());
        }
        changed
    }
}

impl From<Vec<Service>> for Declaration {
    fn from(services: Vec<Service>) -> Self {
        Self::new(services)
    }
}

pub(crate) fn flatten(services: &[Service]) -> Vec<Container> {
    services
        .iter()
        .flat_map(|s| s.containers.iter().cloned())
        .collect()
}

pub(crate) fn validate_services(services: &[Service]) -> Result<(), EngineError> {
    let mut names = HashSet::new();

    for service in services {
        for container in &service.containers {
            container.validate()?;

            if container.name.is_empty() {
                warn!(
                    service = %service.name,
                    image = %container.image,
                    "Unnamed container: the runtime picks a random name, so it will be recreated on every apply"
                );
                continue;
            }
            if !ports_follow_runtime_order(&container.ports) {
                warn!(
                    service = %service.name,
                    container = %container.name,
                    ports = ?container.ports,
                    "Ports are not in runtime key order: the container will be recreated on every apply"
                );
            }
            if !names.insert(container.name.as_str()) {
                return Err(EngineError::Configuration(format!(
                    "container name '{}' is declared more than once",
                    container.name
                )));
            }
        }
    }
    Ok(())
}

/// The key the runtime files a published port under: `"80/tcp"` for
/// `"8080:80"`, `"53/udp"` for `"5353:53/udp"`.
fn runtime_port_key(port: &str) -> String {
    let container_port = port.rsplit(':').next().unwrap_or(port);
    if container_port.contains('/') {
        container_port.to_string()
    } else {
        format!("{}/tcp", container_port)
    }
}

/// Inspection lists ports sorted by runtime key, so only declarations in
/// that order can compare equal.
fn ports_follow_runtime_order(ports: &[String]) -> bool {
    ports
        .windows(2)
        .all(|pair| runtime_port_key(&pair[0]) <= runtime_port_key(&pair[1]))
}
