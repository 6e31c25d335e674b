//! Runtime trait: abstract interface for the four runtime operations.
//!
//! The inspector and reconciler only ever talk to the runtime through this
//! trait. `live.rs` provides the real Bollard-backed implementation.
//! `fake.rs` provides a test double.

use std::pin::Pin;

use bollard::models::ContainerInspectResponse;

use crate::docker::run::RunSpec;
use crate::error::EngineError;

/// Unified async interface over the container runtime.
///
/// Object-safe thanks to `Pin<Box<…>>` returns.
/// Implementations must be `Send + Sync` so they can live behind an `Arc`.
pub trait RuntimeOps: Send + Sync {
    /// IDs of every container, stopped ones included.
    fn list_container_ids(
        &self,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Vec<String>, EngineError>> + Send + '_>>;

    fn inspect_container<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<ContainerInspectResponse, EngineError>> + Send + 'a>>;

    /// Start a container detached; resolves when the runtime has accepted it.
    fn run_container<'a>(
        &'a self,
        spec: &'a RunSpec,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), EngineError>> + Send + 'a>>;

    /// Forced removal; resolves when the name and its ports are free again.
    fn remove_container<'a>(
        &'a self,
        name: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), EngineError>> + Send + 'a>>;
}
