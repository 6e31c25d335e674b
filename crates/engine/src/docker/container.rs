//! Container domain: list, inspect and forced removal through the Engine API.

use super::client::DockerClient;
use crate::error::EngineError;

use bollard::models::ContainerInspectResponse;
use bollard::query_parameters::{ListContainersOptions, RemoveContainerOptions};

impl DockerClient {
    /// IDs of every container on the host, stopped ones included.
    pub async fn list_container_ids(&self) -> Result<Vec<String>, EngineError> {
        let options = Some(ListContainersOptions {
            all: true,
            ..Default::default()
        });
        let containers = self
            .client
            .list_containers(options)
            .await
            .map_err(|e| EngineError::RuntimeUnavailable(e.to_string()))?;

        Ok(containers.into_iter().filter_map(|c| c.id).collect())
    }

    /// Returns the full `ContainerInspectResponse` from Docker for a container.
    pub async fn inspect_container(
        &self,
        id: &str,
    ) -> Result<ContainerInspectResponse, EngineError> {
        self.client
            .inspect_container(id, None)
            .await
            .map_err(|e| EngineError::from_bollard(id, e))
    }

    /// Remove a container, killing it first if it is running.
    ///
    /// Returns once the daemon has confirmed the removal.
    pub async fn remove_container(&self, name: &str) -> Result<(), EngineError> {
        let options = Some(RemoveContainerOptions {
            force: true,
            ..Default::default()
        });

        self.client
            .remove_container(name, options)
            .await
            .map_err(|e| EngineError::from_bollard(name, e))
    }
}
