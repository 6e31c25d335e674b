//! Model: RuntimeConfig.

use serde::{Deserialize, Serialize};

/// How the engine reaches the container runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Docker socket; empty means the platform default.
    pub docker_socket: String,
    /// Docker CLI used for detached `run`.
    pub docker_cli: String,
    pub connect_timeout_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            docker_socket: "".to_string(),
            docker_cli: "docker".to_string(),
            connect_timeout_secs: 120,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_config_defaults() {
        let cfg = RuntimeConfig::default();
        assert!(cfg.docker_socket.is_empty(), "Default docker_socket should be empty (use system default)");
        assert_eq!(cfg.docker_cli, "docker");
        assert_eq!(cfg.connect_timeout_secs, 120);
    }

    #[test]
    fn test_runtime_config_deserialize_partial_toml() {
        let toml_str = r#"docker_socket = "unix:///run/user/1000/docker.sock""#;
        let cfg: RuntimeConfig = toml::from_str(toml_str).expect("Should accept partial TOML");
        assert_eq!(cfg.docker_socket, "unix:///run/user/1000/docker.sock");
        assert_eq!(cfg.docker_cli, "docker");
        assert_eq!(cfg.connect_timeout_secs, 120);
    }
}
