//! Gateway: routes inbound HTTP requests to declared containers by path prefix.

pub mod index;
pub mod proxy;
pub mod routes;
pub mod server;

pub use routes::RoutingTable;
