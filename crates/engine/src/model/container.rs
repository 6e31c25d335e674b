//! Container: the unit the engine diffs, creates and removes.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A declared or observed container.
///
/// Equality is structural and deliberately ignores `endpoint` and
/// `http_port`: those only feed the routing table, so changing them must
/// never cause the runtime container to be recreated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart: Option<String>,
    /// `hostPort:containerPort` mappings, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    /// `hostPath:containerPath[:mode]` bind mounts, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
    #[serde(default, alias = "environmentVars", skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<String>,
    /// URL path prefix routed to this container by the gateway.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Host port the gateway forwards `endpoint` traffic to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_port: Option<u16>,
}

impl Container {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            ..Default::default()
        }
    }

    /// Restart policy with `""` and `"no"` folded into "none", the way the
    /// runtime reports a container started without one.
    pub fn restart_policy(&self) -> Option<&str> {
        self.restart.as_deref().filter(|r| !r.is_empty() && *r != "no")
    }

    /// Routing pair, present only when both halves are declared.
    pub fn route(&self) -> Option<(&str, u16)> {
        match (self.endpoint.as_deref(), self.http_port) {
            (Some(endpoint), Some(port)) => Some((endpoint, port)),
            _ => None,
        }
    }

    /// Label used in logs and reports; unnamed containers show their image.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.image
        } else {
            &self.name
        }
    }

    /// Check the fields the runtime cannot cope with.
    pub fn validate(&self) -> Result<(), EngineError> {
        let label = self.display_name();

        if self.image.trim().is_empty() {
            return Err(EngineError::Configuration(format!(
                "container '{}' has no image",
                if self.name.is_empty() { "<unnamed>" } else { &self.name }
            )));
        }
        if let Some(port) = self.ports.iter().find(|p| !p.contains(':')) {
            return Err(EngineError::Configuration(format!(
                "container '{}': port mapping '{}' is not hostPort:containerPort",
                label, port
            )));
        }
        if let Some(volume) = self.volumes.iter().find(|v| !v.contains(':')) {
            return Err(EngineError::Configuration(format!(
                "container '{}': volume mapping '{}' is not hostPath:containerPath",
                label, volume
            )));
        }
        if let Some(var) = self.env.iter().find(|e| e.is_empty() || e.starts_with('=')) {
            return Err(EngineError::Configuration(format!(
                "container '{}': invalid environment entry '{}'",
                label, var
            )));
        }
        if let Some(endpoint) = self.endpoint.as_deref() {
            if !endpoint.starts_with('/') {
                return Err(EngineError::Configuration(format!(
                    "container '{}': endpoint '{}' must start with '/'",
                    label, endpoint
                )));
            }
        }
        Ok(())
    }
}

impl PartialEq for Container {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.image == other.image
            && self.restart_policy() == other.restart_policy()
            && self.ports == other.ports
            && self.volumes == other.volumes
            && self.env == other.env
    }
}

impl Eq for Container {}

#[cfg(test)]
mod tests {
    use super::*;

    fn web() -> Container {
        Container {
            name: "web".to_string(),
            image: "nginx:1.25".to_string(),
            restart: Some("always".to_string()),
            ports: vec!["8080:80".to_string(), "8443:443".to_string()],
            volumes: vec!["/srv/www:/usr/share/nginx/html:ro".to_string()],
            env: vec!["MODE=prod".to_string()],
            endpoint: Some("/web".to_string()),
            http_port: Some(8080),
        }
    }

    #[test]
    fn test_equality_ignores_routing_metadata() {
        let mut other = web();
        other.endpoint = Some("/elsewhere".to_string());
        other.http_port = None;
        assert_eq!(web(), other);
    }

    #[test]
    fn test_equality_is_order_sensitive_for_ports() {
        let mut other = web();
        other.ports.reverse();
        assert_ne!(web(), other);
    }

    #[test]
    fn test_equality_detects_env_change() {
        let mut other = web();
        other.env.push("DEBUG=1".to_string());
        assert_ne!(web(), other);
    }

    #[test]
    fn test_empty_restart_equals_absent_restart() {
        let mut a = Container::new("db", "postgres:16");
        let mut b = a.clone();
        a.restart = Some(String::new());
        b.restart = None;
        assert_eq!(a, b);
        assert_eq!(a.restart_policy(), None);
    }

    #[test]
    fn test_explicit_no_restart_equals_absent_restart() {
        let mut a = Container::new("db", "postgres:16");
        a.restart = Some("no".to_string());
        assert_eq!(a, Container::new("db", "postgres:16"));
    }

    #[test]
    fn test_route_requires_both_fields() {
        let mut c = web();
        assert_eq!(c.route(), Some(("/web", 8080)));
        c.http_port = None;
        assert_eq!(c.route(), None);
    }

    #[test]
    fn test_deserialize_camel_case_document() {
        let json = r#"{
            "name": "api",
            "image": "example/api:2",
            "ports": ["9000:9000"],
            "environmentVars": ["A=1"],
            "endpoint": "/api",
            "httpPort": 9000
        }"#;
        let c: Container = serde_json::from_str(json).unwrap();
        assert_eq!(c.name, "api");
        assert_eq!(c.env, vec!["A=1"]);
        assert_eq!(c.route(), Some(("/api", 9000)));
        assert!(c.restart.is_none());
    }

    #[test]
    fn test_missing_image_fails_to_parse() {
        let json = r#"{ "name": "broken" }"#;
        let err = serde_json::from_str::<Container>(json).unwrap_err();
        assert!(err.to_string().contains("image"), "unexpected error: {}", err);
    }

    #[test]
    fn test_validate_rejects_blank_image() {
        let c = Container::new("web", "  ");
        let err = c.validate().unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
        assert!(err.to_string().contains("web"));
    }

    #[test]
    fn test_validate_rejects_malformed_mappings() {
        let mut c = Container::new("web", "nginx");
        c.ports = vec!["8080".to_string()];
        assert!(c.validate().is_err());

        let mut c = Container::new("web", "nginx");
        c.volumes = vec!["/data".to_string()];
        assert!(c.validate().is_err());

        let mut c = Container::new("web", "nginx");
        c.env = vec!["=oops".to_string()];
        assert!(c.validate().is_err());

        let mut c = Container::new("web", "nginx");
        c.endpoint = Some("api".to_string());
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_full_container() {
        assert!(web().validate().is_ok());
    }
}
