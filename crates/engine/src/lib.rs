// Module structure for the Harbour engine.

// Core infrastructure
pub mod client;
pub mod conf;
pub mod docker;
pub mod error;

// Domain modules
pub mod inspect;
pub mod model;
pub mod reconcile;
pub mod state;

pub use client::RuntimeOps;
pub use docker::DockerClient;
pub use error::{EngineError, EngineResult};
pub use model::{Container, Service};
pub use reconcile::{AddReport, ApplyReport, ContainerFailure, Operation, Reconciler};
pub use state::Declaration;
