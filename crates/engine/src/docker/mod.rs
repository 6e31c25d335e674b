//! Docker: the bollard-backed runtime driver.

pub mod client;
pub mod container;
pub mod inventory;
pub mod run;

pub use client::DockerClient;
pub use run::RunSpec;
