//! Conf module: runtime connection settings.

pub mod model;
pub mod load;

pub use model::RuntimeConfig;
