//! Live: implements `RuntimeOps` for the real Bollard-backed `DockerClient`.

use std::pin::Pin;

use bollard::models::ContainerInspectResponse;

use crate::client::docker::RuntimeOps;
use crate::docker::client::DockerClient;
use crate::docker::run::RunSpec;
use crate::error::EngineError;

impl RuntimeOps for DockerClient {
    fn list_container_ids(
        &self,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Vec<String>, EngineError>> + Send + '_>> {
        Box::pin(self.list_container_ids())
    }

    fn inspect_container<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<ContainerInspectResponse, EngineError>> + Send + 'a>> {
        Box::pin(self.inspect_container(id))
    }

    fn run_container<'a>(
        &'a self,
        spec: &'a RunSpec,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), EngineError>> + Send + 'a>> {
        Box::pin(self.run_container(spec))
    }

    fn remove_container<'a>(
        &'a self,
        name: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), EngineError>> + Send + 'a>> {
        Box::pin(self.remove_container(name))
    }
}
