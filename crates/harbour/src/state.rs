use std::sync::Arc;

use axum::body::Body;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::gateway::routes::RoutingTable;

pub type UpstreamClient = Client<HttpConnector, Body>;

/// Shared gateway state, cloned into every request.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RoutingTable>,
    pub client: UpstreamClient,
    pub upstream_host: Arc<str>,
}

impl AppState {
    pub fn new(routes: RoutingTable, upstream_host: &str) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            routes: Arc::new(routes),
            client,
            upstream_host: Arc::from(upstream_host),
        }
    }
}
