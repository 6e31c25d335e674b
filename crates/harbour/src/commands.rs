//! Commands: what each subcommand does with the engine and the store.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use engine::{AddReport, ApplyReport, Container, DockerClient, Reconciler};
use tracing::info;

use crate::cli::{Command, ServeAction, ServeArgs};
use crate::config::HarbourConfig;
use crate::daemon::{self, StdLauncher, SystemProcessTable};
use crate::error::{HarbourError, HarbourResult};
use crate::gateway::{server, RoutingTable};
use crate::store::DeclarationStore;

pub async fn dispatch(command: Command, config: &HarbourConfig) -> Result<()> {
    let store = DeclarationStore::new(&config.state.snapshot_path);

    match command {
        Command::Apply { path } => {
            let reconciler = connect(config).await?;
            let report = apply(&reconciler, &store, path.as_deref()).await?;
            print_apply(&report);
            ensure_success(report.failures.len())
        }
        Command::Add { path } => {
            let reconciler = connect(config).await?;
            let report = add(&reconciler, &store, &path).await?;
            print_add(&report);
            ensure_success(report.failures.len())
        }
        Command::Remove { name } => {
            let reconciler = connect(config).await?;
            let removed = remove(&reconciler, &store, &name).await?;
            println!("removed {} ({})", removed.name, removed.image);
            Ok(())
        }
        Command::Serve(args) => serve(args, config, &store).await,
    }
}

async fn connect(config: &HarbourConfig) -> Result<Reconciler> {
    let client = DockerClient::new(&config.runtime).context("Failed to create Docker client")?;
    client.ping().await.context("Docker daemon is not reachable")?;
    Ok(Reconciler::new(Arc::new(client)))
}

/// Reconcile against `path` (or the snapshot) and persist what was applied.
///
/// An explicit path becomes the new snapshot even when some operations
/// failed, so a later bare `apply` retries it.
pub async fn apply(
    reconciler: &Reconciler,
    store: &DeclarationStore,
    path: Option<&Path>,
) -> HarbourResult<ApplyReport> {
    let declaration = match path {
        Some(path) => DeclarationStore::load(&DeclarationStore::resolve(path)?)?,
        None => store.load_applied()?,
    };
    let report = reconciler.apply(&declaration).await?;
    if path.is_some() {
        store.save_snapshot(&declaration)?;
        info!(snapshot = %store.snapshot_path().display(), "Applied declaration is the new snapshot");
    }
    Ok(report)
}

/// Start what `path` declares and merge it into the snapshot.
///
/// Services none of whose containers ended up running are left out of the
/// snapshot.
pub async fn add(
    reconciler: &Reconciler,
    store: &DeclarationStore,
    path: &Path,
) -> HarbourResult<AddReport> {
    let incoming = DeclarationStore::load(&DeclarationStore::resolve(path)?)?;
    let report = reconciler.add(incoming.services()).await?;

    let running: Vec<_> = incoming
        .into_services()
        .into_iter()
        .filter(|service| {
            service.containers.is_empty()
                || service.containers.iter().any(|c| {
                    report.created.contains(c) || report.ignored.contains(c)
                })
        })
        .collect();

    let mut snapshot = store.load_snapshot()?;
    let inserted = snapshot.merge(running);
    if inserted > 0 {
        store.save_snapshot(&snapshot)?;
    }
    info!(inserted, "Merged services into the snapshot");
    Ok(report)
}

/// Remove a running container and drop it from the snapshot.
pub async fn remove(
    reconciler: &Reconciler,
    store: &DeclarationStore,
    name: &str,
) -> HarbourResult<Container> {
    let removed = reconciler.remove(name).await?;

    let mut snapshot = store.load_snapshot()?;
    if snapshot.remove(name) {
        store.save_snapshot(&snapshot)?;
    }
    Ok(removed)
}

async fn serve(args: ServeArgs, config: &HarbourConfig, store: &DeclarationStore) -> Result<()> {
    if args.action == Some(ServeAction::Stop) {
        let stopped = daemon::stop(&SystemProcessTable)?;
        println!("stopped {} instance(s)", stopped);
        return Ok(());
    }

    let path = args
        .path
        .as_deref()
        .map(DeclarationStore::resolve)
        .transpose()?;

    if args.detached && !args.foreground {
        let pid = daemon::start_background(&StdLauncher, path.as_deref())?;
        println!("gateway started in the background (pid {})", pid);
        return Ok(());
    }

    let declaration = store.load_or_snapshot(path.as_deref())?;
    let routes = RoutingTable::build(declaration.services());
    info!(routes = routes.len(), conflicts = routes.conflicts().len(), "Routing table built");
    server::run(&config.gateway, routes).await
}

fn ensure_success(failures: usize) -> Result<()> {
    if failures > 0 {
        return Err(HarbourError::PartialFailure(failures).into());
    }
    Ok(())
}

fn print_apply(report: &ApplyReport) {
    for container in &report.removed {
        println!("removed   {} ({})", container.name, container.image);
    }
    for container in &report.created {
        println!("created   {} ({})", container.display_name(), container.image);
    }
    println!("unchanged {}", report.unchanged);
    for failure in &report.failures {
        println!("FAILED    {}", failure);
    }
}

fn print_add(report: &AddReport) {
    for container in &report.created {
        println!("created   {} ({})", container.display_name(), container.image);
    }
    for container in &report.ignored {
        println!("ignored   {} (already running)", container.display_name());
    }
    for failure in &report.failures {
        println!("FAILED    {}", failure);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::client::{FakeRuntime, RuntimeCommand};
    use engine::{Declaration, EngineError, Service};
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        fake: Arc<FakeRuntime>,
        reconciler: Reconciler,
        store: DeclarationStore,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let fake = Arc::new(FakeRuntime::new());
        let reconciler = Reconciler::new(fake.clone());
        let store = DeclarationStore::new(dir.path().join("state/state.json"));
        Fixture { dir, fake, reconciler, store }
    }

    fn write_doc(dir: &TempDir, file: &str, services: &[Service]) -> std::path::PathBuf {
        let path = dir.path().join(file);
        fs::write(&path, serde_json::to_string(services).unwrap()).unwrap();
        path
    }

    fn web() -> Service {
        let mut c = Container::new("web", "nginx:1.25");
        c.endpoint = Some("/web".to_string());
        c.http_port = Some(8080);
        Service::new("front", vec![c])
    }

    fn db() -> Service {
        Service::new("data", vec![Container::new("db", "postgres:16")])
    }

    #[tokio::test]
    async fn test_apply_with_path_persists_snapshot() {
        let f = fixture();
        let path = write_doc(&f.dir, "stack.json", &[web(), db()]);

        let report = apply(&f.reconciler, &f.store, Some(path.as_path())).await.unwrap();
        assert_eq!(report.created.len(), 2);
        assert_eq!(f.store.load_snapshot().unwrap(), Declaration::new(vec![web(), db()]));
    }

    #[tokio::test]
    async fn test_bare_apply_uses_snapshot() {
        let f = fixture();
        f.store.save_snapshot(&Declaration::new(vec![db()])).unwrap();
        f.fake.add_container(&Container::new("stray", "busybox")).await;

        let report = apply(&f.reconciler, &f.store, None).await.unwrap();
        assert_eq!(report.removed.len(), 1);
        assert_eq!(report.created.len(), 1);
        assert_eq!(f.fake.names().await, vec!["db"]);
    }

    #[tokio::test]
    async fn test_apply_persists_even_on_partial_failure() {
        let f = fixture();
        f.fake.fail_run("db").await;
        let path = write_doc(&f.dir, "stack.json", &[web(), db()]);

        let report = apply(&f.reconciler, &f.store, Some(path.as_path())).await.unwrap();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(f.store.load_snapshot().unwrap().services().len(), 2);
        assert!(ensure_success(report.failures.len()).is_err());
    }

    #[tokio::test]
    async fn test_apply_missing_file_touches_nothing() {
        let f = fixture();
        let err = apply(&f.reconciler, &f.store, Some(f.dir.path().join("nope.json").as_path()))
            .await
            .unwrap_err();

        assert!(matches!(err, HarbourError::Engine(EngineError::Configuration(_))));
        assert!(f.fake.commands().await.is_empty());
        assert!(!f.store.snapshot_path().exists());
    }

    #[tokio::test]
    async fn test_bare_apply_without_snapshot_touches_nothing() {
        let f = fixture();
        f.fake.add_container(&Container::new("unmanaged-db", "postgres:16")).await;

        let err = apply(&f.reconciler, &f.store, None).await.unwrap_err();
        assert!(matches!(err, HarbourError::Engine(EngineError::Configuration(_))));
        assert!(f.fake.commands().await.is_empty());
        assert_eq!(f.fake.names().await, vec!["unmanaged-db"]);
    }

    #[tokio::test]
    async fn test_add_skips_services_that_failed_entirely() {
        let f = fixture();
        f.fake.fail_run("db").await;
        let path = write_doc(&f.dir, "more.json", &[web(), db()]);

        let report = add(&f.reconciler, &f.store, &path).await.unwrap();
        assert_eq!(report.created.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(f.store.load_snapshot().unwrap(), Declaration::new(vec![web()]));
    }

    #[tokio::test]
    async fn test_add_merges_into_snapshot_once() {
        let f = fixture();
        f.store.save_snapshot(&Declaration::new(vec![web()])).unwrap();
        let path = write_doc(&f.dir, "more.json", &[web(), db()]);

        let report = add(&f.reconciler, &f.store, &path).await.unwrap();
        assert_eq!(report.created.len(), 2);
        assert_eq!(f.store.load_snapshot().unwrap().services().len(), 2);

        f.fake.clear_commands().await;
        let again = add(&f.reconciler, &f.store, &path).await.unwrap();
        assert_eq!(again.ignored.len(), 2);
        assert!(f.fake.commands().await.is_empty());
        assert_eq!(f.store.load_snapshot().unwrap().services().len(), 2);
    }

    #[tokio::test]
    async fn test_remove_drops_container_from_snapshot() {
        let f = fixture();
        let path = write_doc(&f.dir, "stack.json", &[web(), db()]);
        apply(&f.reconciler, &f.store, Some(path.as_path())).await.unwrap();

        let removed = remove(&f.reconciler, &f.store, "db").await.unwrap();
        assert_eq!(removed.image, "postgres:16");
        assert_eq!(f.store.load_snapshot().unwrap(), Declaration::new(vec![web()]));
    }

    #[tokio::test]
    async fn test_remove_container_named_like_its_service_keeps_siblings() {
        let f = fixture();
        let service = Service::new(
            "web",
            vec![Container::new("web", "nginx:1.25"), Container::new("web-db", "postgres:16")],
        );
        let path = write_doc(&f.dir, "stack.json", &[service]);
        apply(&f.reconciler, &f.store, Some(path.as_path())).await.unwrap();

        remove(&f.reconciler, &f.store, "web").await.unwrap();
        assert_eq!(f.fake.names().await, vec!["web-db"]);

        let report = apply(&f.reconciler, &f.store, None).await.unwrap();
        assert!(report.removed.is_empty());
        assert!(report.created.is_empty());
        assert_eq!(f.fake.names().await, vec!["web-db"]);
    }

    #[tokio::test]
    async fn test_remove_ghost_keeps_snapshot() {
        let f = fixture();
        f.store.save_snapshot(&Declaration::new(vec![db()])).unwrap();

        let err = remove(&f.reconciler, &f.store, "ghost").await.unwrap_err();
        assert!(matches!(err, HarbourError::Engine(EngineError::NotFound(_))));
        assert!(f.fake.commands().await.iter().all(|c| !matches!(c, RuntimeCommand::Remove(_))));
        assert_eq!(f.store.load_snapshot().unwrap().services().len(), 1);
    }
}
