//! Fake: test double for runtime operations.
//!
//! Provides a deterministic [`FakeRuntime`] that implements [`RuntimeOps`]
//! using in-memory state and records every command it receives. Running a
//! container stores an inspection payload shaped like Docker's, so the
//! real inspector mapping runs against it.

use std::collections::{HashMap, HashSet};
use std::pin::Pin;

use bollard::models::{
    ContainerConfig, ContainerInspectResponse, HostConfig, PortBinding, RestartPolicy,
    RestartPolicyNameEnum,
};
use tokio::sync::Mutex;

use crate::client::docker::RuntimeOps;
use crate::docker::run::RunSpec;
use crate::error::EngineError;
use crate::model::Container;

/// The image-provided variable real containers always carry.
const IMAGE_PATH: &str = "PATH=/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin";

/// A mutating command the fake has been asked to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCommand {
    Run(RunSpec),
    Remove(String),
}

/// Mutable inner state protected by a mutex.
#[derive(Default)]
struct Inner {
    /// Insertion-ordered so listings are deterministic.
    containers: Vec<(String, ContainerInspectResponse)>,
    commands: Vec<RuntimeCommand>,
    failing_runs: HashSet<String>,
    failing_removals: HashSet<String>,
    malformed: HashSet<String>,
    /// Listed but gone by the time they are inspected.
    vanished: Vec<String>,
    unavailable: bool,
    next_id: u64,
}

impl Inner {
    fn position_by_name(&self, name: &str) -> Option<usize> {
        let wanted = format!("/{}", name);
        self.containers
            .iter()
            .position(|(_, c)| c.name.as_deref() == Some(wanted.as_str()))
    }

    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        format!("fake{:060}", self.next_id)
    }
}

/// A fake container runtime for deterministic testing.
pub struct FakeRuntime {
    inner: Mutex<Inner>,
}

impl FakeRuntime {
    /// Create an empty fake runtime.
    pub fn new() -> Self {
        Self { inner: Mutex::new(Inner::default()) }
    }

    /// Seed a running container without recording a command.
    pub async fn add_container(&self, container: &Container) -> String {
        let mut state = self.inner.lock().await;
        let id = state.allocate_id();
        let details = inspect_from_spec(&id, &RunSpec::from(container));
        state.containers.push((id.clone(), details));
        id
    }

    /// Seed a raw inspection payload.
    pub async fn add_raw(&self, id: &str, details: ContainerInspectResponse) {
        self.inner.lock().await.containers.push((id.to_string(), details));
    }

    /// List an ID whose inspection reports NotFound.
    pub async fn add_vanished(&self, id: &str) {
        self.inner.lock().await.vanished.push(id.to_string());
    }

    /// Make every `run` of a container with this name fail.
    pub async fn fail_run(&self, name: &str) {
        self.inner.lock().await.failing_runs.insert(name.to_string());
    }

    /// Make every removal of this name fail.
    pub async fn fail_remove(&self, name: &str) {
        self.inner.lock().await.failing_removals.insert(name.to_string());
    }

    /// Make inspection of this container ID return unparsable data.
    pub async fn corrupt(&self, id: &str) {
        self.inner.lock().await.malformed.insert(id.to_string());
    }

    /// Simulate an unreachable daemon.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.inner.lock().await.unavailable = unavailable;
    }

    /// Commands issued so far, in issue order.
    pub async fn commands(&self) -> Vec<RuntimeCommand> {
        self.inner.lock().await.commands.clone()
    }

    pub async fn clear_commands(&self) {
        self.inner.lock().await.commands.clear();
    }

    /// Names of the containers currently present.
    pub async fn names(&self) -> Vec<String> {
        self.inner
            .lock()
            .await
            .containers
            .iter()
            .filter_map(|(_, c)| c.name.as_deref())
            .map(|n| n.trim_start_matches('/').to_string())
            .collect()
    }
}

impl Default for FakeRuntime {
    fn default() -> Self {
        Self::new()
    }
}

// ── RuntimeOps implementation ───────────────────────────────────

impl RuntimeOps for FakeRuntime {
    fn list_container_ids(
        &self,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Vec<String>, EngineError>> + Send + '_>> {
        Box::pin(async {
            let state = self.inner.lock().await;
            if state.unavailable {
                return Err(EngineError::RuntimeUnavailable("fake daemon is down".to_string()));
            }
            Ok(state
                .containers
                .iter()
                .map(|(id, _)| id.clone())
                .chain(state.vanished.iter().cloned())
                .collect())
        })
    }

    fn inspect_container<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<ContainerInspectResponse, EngineError>> + Send + 'a>> {
        Box::pin(async move {
            let state = self.inner.lock().await;
            if state.unavailable {
                return Err(EngineError::RuntimeUnavailable("fake daemon is down".to_string()));
            }
            if state.malformed.contains(id) {
                return Ok(ContainerInspectResponse {
                    id: Some(id.to_string()),
                    ..Default::default()
                });
            }
            state
                .containers
                .iter()
                .find(|(cid, _)| cid == id)
                .map(|(_, c)| c.clone())
                .ok_or_else(|| EngineError::NotFound(id.to_string()))
        })
    }

    fn run_container<'a>(
        &'a self,
        spec: &'a RunSpec,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), EngineError>> + Send + 'a>> {
        Box::pin(async move {
            let mut state = self.inner.lock().await;
            state.commands.push(RuntimeCommand::Run(spec.clone()));

            if state.failing_runs.contains(spec.target()) {
                return Err(EngineError::CommandFailed {
                    target: spec.target().to_string(),
                    reason: "injected run failure".to_string(),
                });
            }
            if let Some(name) = &spec.name {
                if state.position_by_name(name).is_some() {
                    return Err(EngineError::CommandFailed {
                        target: name.clone(),
                        reason: format!("Conflict. The container name \"/{}\" is already in use", name),
                    });
                }
            }

            let id = state.allocate_id();
            let details = inspect_from_spec(&id, spec);
            state.containers.push((id, details));
            Ok(())
        })
    }

    fn remove_container<'a>(
        &'a self,
        name: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), EngineError>> + Send + 'a>> {
        Box::pin(async move {
            let mut state = self.inner.lock().await;
            state.commands.push(RuntimeCommand::Remove(name.to_string()));

            if state.failing_removals.contains(name) {
                return Err(EngineError::CommandFailed {
                    target: name.to_string(),
                    reason: "injected removal failure".to_string(),
                });
            }
            match state.position_by_name(name) {
                Some(idx) => {
                    state.containers.remove(idx);
                    Ok(())
                }
                None => Err(EngineError::NotFound(name.to_string())),
            }
        })
    }
}

// ── Payload construction ────────────────────────────────────────

/// Build the payload Docker would report for a container started from `spec`.
fn inspect_from_spec(id: &str, spec: &RunSpec) -> ContainerInspectResponse {
    let name = spec
        .name
        .clone()
        .unwrap_or_else(|| format!("fake_{}", id.trim_start_matches(['f', 'a', 'k', 'e', '0'])));

    let mut env = vec![IMAGE_PATH.to_string()];
    env.extend(spec.env.iter().cloned());

    let mut port_bindings: HashMap<String, Option<Vec<PortBinding>>> = HashMap::new();
    for port in &spec.ports {
        let (host, container_port) = port.rsplit_once(':').unwrap_or(("", port.as_str()));
        let (host_ip, host_port) = host.rsplit_once(':').unwrap_or(("", host));
        let key = if container_port.contains('/') {
            container_port.to_string()
        } else {
            format!("{}/tcp", container_port)
        };
        port_bindings
            .entry(key)
            .or_insert_with(|| Some(Vec::new()))
            .get_or_insert_with(Vec::new)
            .push(PortBinding {
                host_ip: Some(host_ip.to_string()),
                host_port: Some(host_port.to_string()),
            });
    }

    ContainerInspectResponse {
        id: Some(id.to_string()),
        name: Some(format!("/{}", name)),
        config: Some(ContainerConfig {
            image: Some(spec.image.clone()),
            env: Some(env),
            ..Default::default()
        }),
        host_config: Some(HostConfig {
            restart_policy: Some(restart_policy(spec.restart.as_deref())),
            port_bindings: Some(port_bindings),
            binds: Some(spec.volumes.clone()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn restart_policy(restart: Option<&str>) -> RestartPolicy {
    let (name, retries) = match restart {
        None | Some("") | Some("no") => (RestartPolicyNameEnum::NO, 0),
        Some("always") => (RestartPolicyNameEnum::ALWAYS, 0),
        Some("unless-stopped") => (RestartPolicyNameEnum::UNLESS_STOPPED, 0),
        Some(other) => {
            let retries = other
                .strip_prefix("on-failure:")
                .and_then(|n| n.parse().ok())
                .unwrap_or(0);
            (RestartPolicyNameEnum::ON_FAILURE, retries)
        }
    };
    RestartPolicy {
        name: Some(name),
        maximum_retry_count: Some(retries),
    }
}

// ── Tests ───────────────────────────────────────────────────────
