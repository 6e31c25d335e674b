//! Run: detached container creation through the Docker CLI.
//!
//! `docker run` is used instead of the create/start API pair so that port
//! and volume strings are parsed by Docker itself, exactly as a user typing
//! the same flags would get.

use std::process::Stdio;

use tracing::debug;

use super::client::DockerClient;
use crate::error::EngineError;
use crate::model::Container;

/// Everything needed to start one container in the background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSpec {
    pub name: Option<String>,
    pub restart: Option<String>,
    pub ports: Vec<String>,
    pub volumes: Vec<String>,
    pub env: Vec<String>,
    pub image: String,
}

impl RunSpec {
    /// Arguments for the Docker CLI, in a fixed order: detach, name,
    /// restart, ports, volumes, env, image.
    pub fn cli_args(&self) -> Vec<String> {
        let mut args = vec!["run".to_string(), "-d".to_string()];

        if let Some(name) = &self.name {
            args.push("--name".to_string());
            args.push(name.clone());
        }
        if let Some(restart) = &self.restart {
            args.push("--restart".to_string());
            args.push(restart.clone());
        }
        for port in &self.ports {
            args.push("-p".to_string());
            args.push(port.clone());
        }
        for volume in &self.volumes {
            args.push("-v".to_string());
            args.push(volume.clone());
        }
        for var in &self.env {
            args.push("-e".to_string());
            args.push(var.clone());
        }
        args.push(self.image.clone());
        args
    }

    /// Label for logs and errors.
    pub fn target(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.image)
    }
}

impl From<&Container> for RunSpec {
    fn from(c: &Container) -> Self {
        Self {
            name: Some(c.name.clone()).filter(|n| !n.is_empty()),
            restart: c.restart_policy().map(str::to_string),
            ports: c.ports.clone(),
            volumes: c.volumes.clone(),
            env: c.env.clone(),
            image: c.image.clone(),
        }
    }
}

impl DockerClient {
    /// Run a container detached and wait for the CLI to exit.
    ///
    /// A non-zero exit is a `CommandFailed` carrying the CLI's stderr.
    pub async fn run_container(&self, spec: &RunSpec) -> Result<(), EngineError> {
        let args = spec.cli_args();
        debug!(target_container = %spec.target(), args = ?args, "Running docker CLI");

        let output = self
            .docker_cli_command()
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                EngineError::RuntimeUnavailable(format!("failed to invoke '{}': {}", self.cli, e))
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let reason = match stderr.trim() {
            "" => format!("docker run exited with {}", output.status),
            msg => msg.to_string(),
        };
        Err(EngineError::CommandFailed {
            target: spec.target().to_string(),
            reason,
        })
    }
}
