//! Load: runtime config from environment variables, plus validation.

use super::model::RuntimeConfig;

impl RuntimeConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            docker_socket: std::env::var("DOCKER_SOCKET")
                .unwrap_or(defaults.docker_socket),
            docker_cli: std::env::var("HARBOUR_DOCKER_CLI")
                .unwrap_or(defaults.docker_cli),
            connect_timeout_secs: std::env::var("HARBOUR_DOCKER_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.connect_timeout_secs),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.docker_cli.trim().is_empty() {
            return Err("runtime.docker_cli must not be empty".to_string());
        }
        if self.connect_timeout_secs == 0 {
            return Err("runtime.connect_timeout_secs must be > 0".to_string());
        }
        Ok(())
    }
}
