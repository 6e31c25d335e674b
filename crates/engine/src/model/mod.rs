//! Model: entity types shared by the reconciler and the gateway.

pub mod container;
pub mod service;

pub use container::Container;
pub use service::Service;
