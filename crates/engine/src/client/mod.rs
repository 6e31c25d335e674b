//! Client: the runtime seam the inspector and reconciler are written against.

pub mod docker;
pub mod fake;
pub mod live;

pub use docker::RuntimeOps;
pub use fake::{FakeRuntime, RuntimeCommand};
