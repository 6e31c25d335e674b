//! Docker client: core struct and constructor.
//!
//! Domain methods live in sibling modules (`container`, `run`) which add
//! `impl DockerClient` blocks.

use bollard::Docker;

use crate::conf::RuntimeConfig;
use crate::error::EngineError;

#[derive(Debug, Clone)]
pub struct DockerClient {
    /// The bollard Docker client.  `pub(super)` so that domain modules
    /// in sibling files can call bollard APIs directly.
    pub(super) client: Docker,
    /// The Docker socket path this client is connected to.
    pub(super) socket_path: String,
    /// Docker CLI binary used for `docker run`.
    pub(super) cli: String,
}

impl DockerClient {
    pub fn new(config: &RuntimeConfig) -> Result<Self, EngineError> {
        let socket_path = config.docker_socket.as_str();
        let connection = if socket_path.is_empty() {
            Docker::connect_with_defaults()
                .map_err(|e| EngineError::RuntimeUnavailable(e.to_string()))?
        } else {
            let clean_path = socket_path.trim_start_matches("unix://");
            Docker::connect_with_socket(
                clean_path,
                config.connect_timeout_secs,
                &bollard::API_DEFAULT_VERSION,
            )
            .map_err(|e| EngineError::RuntimeUnavailable(e.to_string()))?
        };

        Ok(DockerClient {
            client: connection,
            socket_path: socket_path.to_string(),
            cli: config.docker_cli.clone(),
        })
    }

    /// Build a `tokio::process::Command` for the Docker CLI that targets
    /// the same daemon this client is connected to.
    pub(super) fn docker_cli_command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.cli);
        if let Some(host) = docker_host(&self.socket_path) {
            cmd.env("DOCKER_HOST", host);
        }
        cmd
    }

    /// Check that the daemon answers before a reconciliation starts.
    pub async fn ping(&self) -> Result<(), EngineError> {
        self.client
            .ping()
            .await
            .map(|_| ())
            .map_err(|e| EngineError::RuntimeUnavailable(e.to_string()))
    }
}

/// `DOCKER_HOST` value for a configured socket; `None` keeps the CLI default.
fn docker_host(socket_path: &str) -> Option<String> {
    if socket_path.is_empty() {
        None
    } else if socket_path.starts_with("unix://") || socket_path.starts_with("tcp://") {
        Some(socket_path.to_string())
    } else {
        Some(format!("unix://{}", socket_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_docker_host_default_socket() {
        assert_eq!(docker_host(""), None);
    }

    #[test]
    fn test_docker_host_bare_path_gets_scheme() {
        assert_eq!(
            docker_host("/var/run/docker.sock").as_deref(),
            Some("unix:///var/run/docker.sock")
        );
    }

    #[test]
    fn test_docker_host_keeps_explicit_scheme() {
        assert_eq!(docker_host("tcp://10.0.0.5:2375").as_deref(), Some("tcp://10.0.0.5:2375"));
        assert_eq!(
            docker_host("unix:///run/docker.sock").as_deref(),
            Some("unix:///run/docker.sock")
        );
    }
}
