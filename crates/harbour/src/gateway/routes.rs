//! Routes: path prefix to backend port, in registration order.

use std::fmt;

use engine::Service;
use indexmap::IndexMap;
use tracing::{debug, warn};

/// A prefix registered twice; the later port replaced the earlier one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingConflict {
    pub prefix: String,
    pub previous: u16,
    pub replacement: u16,
}

impl fmt::Display for RoutingConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "endpoint {} declared more than once: port {} replaced by {}",
            self.prefix, self.previous, self.replacement
        )
    }
}

/// Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    routes: IndexMap<String, u16>,
    conflicts: Vec<RoutingConflict>,
}

impl RoutingTable {
    /// Register every container that has both an endpoint and an HTTP port.
    pub fn build(services: &[Service]) -> Self {
        let mut table = RoutingTable::default();

        for container in services.iter().flat_map(|s| &s.containers) {
            let Some((prefix, port)) = container.route() else {
                continue;
            };
            // IndexMap::insert keeps the first slot for an existing key
            if let Some(previous) = table.routes.insert(prefix.to_string(), port) {
                let conflict = RoutingConflict {
                    prefix: prefix.to_string(),
                    previous,
                    replacement: port,
                };
                warn!(%conflict, "Routing conflict");
                table.conflicts.push(conflict);
            } else {
                debug!(prefix, port, container = %container.display_name(), "Registered route");
            }
        }
        table
    }

    /// First registered prefix that matches `path` on a segment boundary.
    pub fn resolve(&self, path: &str) -> Option<(&str, u16)> {
        self.routes
            .iter()
            .find(|(prefix, _)| prefix_matches(prefix, path))
            .map(|(prefix, port)| (prefix.as_str(), *port))
    }

    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    pub fn conflicts(&self) -> &[RoutingConflict] {
        &self.conflicts
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// `/api` matches `/api` and `/api/x` but not `/apiary`; `/` matches all.
fn prefix_matches(prefix: &str, path: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::Container;

    fn routed(name: &str, endpoint: &str, port: u16) -> Container {
        let mut c = Container::new(name, "nginx");
        c.endpoint = Some(endpoint.to_string());
        c.http_port = Some(port);
        c
    }

    #[test]
    fn test_only_fully_routed_containers_register() {
        let mut no_port = Container::new("b", "nginx");
        no_port.endpoint = Some("/b".to_string());
        let table = RoutingTable::build(&[Service::new(
            "s",
            vec![routed("a", "/a", 8001), no_port, Container::new("c", "redis")],
        )]);

        assert_eq!(table.prefixes().collect::<Vec<_>>(), vec!["/a"]);
    }

    #[test]
    fn test_last_write_wins_but_first_position_kept() {
        let table = RoutingTable::build(&[
            Service::new("one", vec![routed("a", "/api", 8001), routed("b", "/web", 8002)]),
            Service::new("two", vec![routed("c", "/api", 9001)]),
        ]);

        assert_eq!(table.prefixes().collect::<Vec<_>>(), vec!["/api", "/web"]);
        assert_eq!(table.resolve("/api/x"), Some(("/api", 9001)));
        assert_eq!(
            table.conflicts(),
            &[RoutingConflict { prefix: "/api".to_string(), previous: 8001, replacement: 9001 }]
        );
    }

    #[test]
    fn test_segment_boundary_matching() {
        let table = RoutingTable::build(&[Service::new("s", vec![routed("a", "/api", 8080)])]);

        assert_eq!(table.resolve("/api"), Some(("/api", 8080)));
        assert_eq!(table.resolve("/api/widgets"), Some(("/api", 8080)));
        assert_eq!(table.resolve("/apiary"), None);
        assert_eq!(table.resolve("/other"), None);
    }

    #[test]
    fn test_first_registered_match_wins() {
        let table = RoutingTable::build(&[Service::new(
            "s",
            vec![routed("root", "/", 8000), routed("api", "/api", 8080)],
        )]);

        assert_eq!(table.resolve("/api/x"), Some(("/", 8000)));
    }

    #[test]
    fn test_trailing_slash_prefix() {
        let table = RoutingTable::build(&[Service::new("s", vec![routed("a", "/docs/", 8080)])]);
        assert_eq!(table.resolve("/docs/intro"), Some(("/docs/", 8080)));
        assert_eq!(table.resolve("/docsearch"), None);
    }

    #[test]
    fn test_empty_table() {
        let table = RoutingTable::build(&[]);
        assert!(table.is_empty());
        assert_eq!(table.resolve("/"), None);
    }
}
