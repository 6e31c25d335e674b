//! Daemon: background start and stop-by-name for the gateway process.
//!
//! Spawning and process enumeration sit behind [`ProcessLauncher`] and
//! [`ProcessTable`] so the lifecycle logic can be tested with mocks.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::{debug, info, warn};

use crate::error::{HarbourError, HarbourResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
}

#[cfg_attr(test, mockall::automock)]
pub trait ProcessLauncher {
    fn current_exe(&self) -> io::Result<PathBuf>;

    /// Start `program` detached from this process and return its pid.
    fn spawn_detached(&self, program: &Path, args: &[String]) -> io::Result<u32>;
}

#[cfg_attr(test, mockall::automock)]
pub trait ProcessTable {
    /// The calling process.
    fn current(&self) -> Option<ProcessEntry>;

    fn list(&self) -> Vec<ProcessEntry>;

    /// Returns `true` if the signal was delivered.
    fn kill(&self, pid: u32) -> bool;
}

/// Re-run this executable as `serve --foreground [path]` in the background.
pub fn start_background(launcher: &dyn ProcessLauncher, path: Option<&Path>) -> HarbourResult<u32> {
    let exe = launcher.current_exe().map_err(HarbourError::Spawn)?;

    let mut args = vec!["serve".to_string(), "--foreground".to_string()];
    if let Some(path) = path {
        args.push(path.display().to_string());
    }

    let pid = launcher
        .spawn_detached(&exe, &args)
        .map_err(HarbourError::Spawn)?;
    info!(pid, exe = %exe.display(), "Started gateway in the background");
    Ok(pid)
}

/// Terminate every other process running this executable.
///
/// Returns how many were terminated.
pub fn stop(table: &dyn ProcessTable) -> HarbourResult<usize> {
    let me = table
        .current()
        .ok_or_else(|| HarbourError::ProcessLookup("cannot identify the current process".to_string()))?;

    let mut stopped = 0;
    for process in table.list() {
        if process.name != me.name || process.pid == me.pid {
            continue;
        }
        if table.kill(process.pid) {
            debug!(pid = process.pid, "Terminated");
            stopped += 1;
        } else {
            warn!(pid = process.pid, name = %process.name, "Failed to terminate process");
        }
    }

    info!(stopped, name = %me.name, "Stopped running instances");
    Ok(stopped)
}

// ── Live implementations ────────────────────────────────────────

pub struct StdLauncher;

impl ProcessLauncher for StdLauncher {
    fn current_exe(&self) -> io::Result<PathBuf> {
        std::env::current_exe()
    }

    fn spawn_detached(&self, program: &Path, args: &[String]) -> io::Result<u32> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // Own process group, so the terminal's signals do not reach it
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let child = cmd.spawn()?;
        Ok(child.id())
    }
}

pub struct SystemProcessTable;

impl SystemProcessTable {
    fn refreshed(pid: Option<Pid>) -> System {
        let mut system = System::new();
        match pid {
            Some(pid) => system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true),
            None => system.refresh_processes(ProcessesToUpdate::All, true),
        };
        system
    }
}

impl ProcessTable for SystemProcessTable {
    fn current(&self) -> Option<ProcessEntry> {
        let pid = sysinfo::get_current_pid().ok()?;
        let system = Self::refreshed(Some(pid));
        system.process(pid).map(|p| ProcessEntry {
            pid: pid.as_u32(),
            name: p.name().to_string_lossy().into_owned(),
        })
    }

    fn list(&self) -> Vec<ProcessEntry> {
        Self::refreshed(None)
            .processes()
            .iter()
            .map(|(pid, p)| ProcessEntry {
                pid: pid.as_u32(),
                name: p.name().to_string_lossy().into_owned(),
            })
            .collect()
    }

    fn kill(&self, pid: u32) -> bool {
        let pid = Pid::from_u32(pid);
        Self::refreshed(Some(pid))
            .process(pid)
            .map(|p| p.kill())
            .unwrap_or(false)
    }
}
