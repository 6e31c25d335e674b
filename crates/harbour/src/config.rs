use anyhow::{Context, Result};
use engine::conf::RuntimeConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HarbourConfig {
    #[serde(default)]
    pub runtime: RuntimeConfig,
    pub gateway: GatewayConfig,
    pub state: StateConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    pub bind_address: String,
    /// Host every routed request is forwarded to.
    pub upstream_host: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StateConfig {
    /// Where the last applied declaration is kept.
    pub snapshot_path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub output: LogOutput,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stdout,
    File { path: String },
}

impl HarbourConfig {
    /// Load configuration from harbour.toml and environment variables
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        // Runtime defaults honour the plain DOCKER_SOCKET convention too
        let defaults = HarbourConfig {
            runtime: RuntimeConfig::from_env(),
            ..Default::default()
        };
        let defaults = config::Config::try_from(&defaults)
            .context("Failed to serialize default configuration")?;

        let mut builder = config::Config::builder().add_source(defaults);

        // 1. /etc/harbour/harbour.toml (production)
        // 2. config/harbour.toml (local development)
        for path in ["/etc/harbour/harbour", "config/harbour"] {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        // Nested keys use a double underscore: HARBOUR_GATEWAY__BIND_ADDRESS
        builder = builder.add_source(
            config::Environment::with_prefix("HARBOUR")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    pub fn validate(&self) -> Result<()> {
        self.gateway
            .bind_address
            .parse::<std::net::SocketAddr>()
            .context("Invalid gateway.bind_address")?;

        if self.gateway.upstream_host.trim().is_empty() {
            anyhow::bail!("gateway.upstream_host must not be empty");
        }
        if self.state.snapshot_path.trim().is_empty() {
            anyhow::bail!("state.snapshot_path must not be empty");
        }

        self.runtime.validate().map_err(anyhow::Error::msg)?;
        Ok(())
    }
}

impl Default for HarbourConfig {
    fn default() -> Self {
        Self {
            runtime: RuntimeConfig::default(),
            gateway: GatewayConfig {
                bind_address: "0.0.0.0:80".to_string(),
                upstream_host: "localhost".to_string(),
            },
            state: StateConfig {
                snapshot_path: "/var/lib/harbour/state.json".to_string(),
            },
            logging: LoggingConfig {
                level: "info,harbour=debug".to_string(),
                format: LogFormat::Pretty,
                output: LogOutput::Stdout,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = HarbourConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.gateway.bind_address, "0.0.0.0:80");
        assert_eq!(cfg.gateway.upstream_host, "localhost");
    }

    #[test]
    fn test_invalid_bind_address_rejected() {
        let mut cfg = HarbourConfig::default();
        cfg.gateway.bind_address = "not-an-address".to_string();
        let err = cfg.validate().unwrap_err();
        assert!(format!("{:#}", err).contains("bind_address"));
    }

    #[test]
    fn test_empty_upstream_host_rejected() {
        let mut cfg = HarbourConfig::default();
        cfg.gateway.upstream_host = "  ".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_runtime_section_is_validated() {
        let mut cfg = HarbourConfig::default();
        cfg.runtime.connect_timeout_secs = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("connect_timeout_secs"));
    }

    #[test]
    fn test_file_source_overrides_defaults() {
        let defaults = config::Config::try_from(&HarbourConfig::default()).unwrap();
        let toml = r#"
            [gateway]
            bind_address = "127.0.0.1:8088"

            [logging]
            format = "json"
        "#;
        let cfg: HarbourConfig = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(cfg.gateway.bind_address, "127.0.0.1:8088");
        assert_eq!(cfg.gateway.upstream_host, "localhost");
        assert_eq!(cfg.logging.format, LogFormat::Json);
        assert_eq!(cfg.runtime.docker_cli, "docker");
    }
}
