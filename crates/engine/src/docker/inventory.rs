use bollard::models::{ContainerInspectResponse, PortBinding, RestartPolicy, RestartPolicyNameEnum};

use crate::error::EngineError;
use crate::model::Container;

/// Environment entries containing this marker are injected by images and
/// the runtime (`PATH`, `LD_LIBRARY_PATH`, ...), never by a declaration.
const FILTERED_ENV_MARKER: &str = "PATH";

/// Map a raw inspection payload into the entity the reconciler compares.
///
/// `id` is only used for error messages.
pub fn container_from_inspect(
    id: &str,
    details: ContainerInspectResponse,
) -> Result<Container, EngineError> {
    let malformed = |reason: &str| EngineError::MalformedInspection {
        id: id.to_string(),
        reason: reason.to_string(),
    };

    let name = details.name.ok_or_else(|| malformed("missing Name"))?;
    let name = name.strip_prefix('/').unwrap_or(&name).to_string();

    let config = details.config.ok_or_else(|| malformed("missing Config"))?;
    let image = config
        .image
        .filter(|i| !i.is_empty())
        .ok_or_else(|| malformed("missing Config.Image"))?;

    let env = config
        .env
        .unwrap_or_default()
        .into_iter()
        .filter(|var| !var.contains(FILTERED_ENV_MARKER))
        .collect();

    let host_config = details.host_config.unwrap_or_default();

    let restart = host_config.restart_policy.as_ref().and_then(restart_from_policy);

    // Port keys look like "80/tcp". Docker serializes this map with sorted
    // keys; bollard hands us a HashMap, so sort to get the same order.
    let mut port_keys: Vec<(String, Vec<PortBinding>)> = host_config
        .port_bindings
        .unwrap_or_default()
        .into_iter()
        .map(|(key, bindings)| (key, bindings.unwrap_or_default()))
        .collect();
    port_keys.sort_by(|a, b| a.0.cmp(&b.0));

    let ports = port_keys
        .iter()
        .flat_map(|(key, bindings)| {
            let container_port = key.split('/').next().unwrap_or(key);
            bindings.iter().map(move |b| port_string(b, container_port))
        })
        .collect();

    let volumes = host_config.binds.unwrap_or_default();

    Ok(Container {
        name,
        image,
        restart,
        ports,
        volumes,
        env,
        endpoint: None,
        http_port: None,
    })
}

/// `None` for the runtime's "no policy" values; `on-failure` keeps its
/// retry count in the same spelling `docker run --restart` accepts.
fn restart_from_policy(policy: &RestartPolicy) -> Option<String> {
    match policy.name.as_ref()? {
        RestartPolicyNameEnum::EMPTY | RestartPolicyNameEnum::NO => None,
        RestartPolicyNameEnum::ON_FAILURE => match policy.maximum_retry_count {
            Some(n) if n > 0 => Some(format!("on-failure:{}", n)),
            _ => Some("on-failure".to_string()),
        },
        other => Some(other.to_string()),
    }
}

fn port_string(binding: &PortBinding, container_port: &str) -> String {
    let host_port = binding.host_port.as_deref().unwrap_or_default();
    match binding.host_ip.as_deref() {
        Some(ip) if !ip.is_empty() => format!("{}:{}:{}", ip, host_port, container_port),
        _ => format!("{}:{}", host_port, container_port),
    }
}
