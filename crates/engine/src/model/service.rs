//! Service: a named group of containers inside a declaration.

use serde::{Deserialize, Serialize};

use super::container::Container;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub containers: Vec<Container>,
}

impl Service {
    pub fn new(name: impl Into<String>, containers: Vec<Container>) -> Self {
        Self {
            name: name.into(),
            containers,
            ..Default::default()
        }
    }

    /// Containment check using structural container equality.
    pub fn contains(&self, container: &Container) -> bool {
        self.containers.iter().any(|c| c == container)
    }
}

/// Two services are equal when their identity fields match and every
/// container of each side has a structural equal on the other side.
impl PartialEq for Service {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.domain == other.domain
            && self.endpoint == other.endpoint
            && self.containers.iter().all(|c| other.contains(c))
            && other.containers.iter().all(|c| self.contains(c))
    }
}

impl Eq for Service {}

#[cfg(test)]
mod tests {
    use super::*;

    fn svc(containers: Vec<Container>) -> Service {
        Service {
            name: "shop".to_string(),
            domain: Some("shop.example.com".to_string()),
            endpoint: Some("/shop".to_string()),
            containers,
        }
    }

    #[test]
    fn test_equal_regardless_of_container_order() {
        let a = Container::new("web", "nginx");
        let b = Container::new("db", "postgres");
        assert_eq!(svc(vec![a.clone(), b.clone()]), svc(vec![b, a]));
    }

    #[test]
    fn test_container_routing_change_keeps_service_equal() {
        let a = Container::new("web", "nginx");
        let mut routed = a.clone();
        routed.endpoint = Some("/web".to_string());
        routed.http_port = Some(8080);
        assert_eq!(svc(vec![a]), svc(vec![routed]));
    }

    #[test]
    fn test_extra_container_breaks_equality() {
        let a = Container::new("web", "nginx");
        let b = Container::new("db", "postgres");
        assert_ne!(svc(vec![a.clone()]), svc(vec![a, b]));
    }

    #[test]
    fn test_identity_fields_matter() {
        let a = Container::new("web", "nginx");
        let mut other = svc(vec![a.clone()]);
        other.domain = None;
        assert_ne!(svc(vec![a.clone()]), other);

        let mut other = svc(vec![a.clone()]);
        other.endpoint = Some("/store".to_string());
        assert_ne!(svc(vec![a]), other);
    }

    #[test]
    fn test_containers_default_to_empty() {
        let s: Service = serde_json::from_str(r#"{ "name": "empty" }"#).unwrap();
        assert!(s.containers.is_empty());
        assert!(s.domain.is_none());
    }
}
