//! Process sandbox for candidate code
//!
//! Every run gets its own temporary workspace and a child process leading its
//! own process group. The child starts with a cleared environment, no stdin,
//! and rlimits on CPU time, file size and (optionally) address space. With
//! isolation on, the child is also confined to private namespaces (see
//! [`super::isolation`]) so it cannot touch the host filesystem, network or
//! other runs. A `SandboxLease` owns the workspace and the group: dropping it
//! kills the group and removes the directory, so teardown happens whether the
//! run completes, times out, or the caller drops the future.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use nix::errno::Errno;
use nix::sys::resource::{Resource, setrlimit};
use nix::sys::signal::{Signal, killpg};
use nix::unistd::Pid;
use tempfile::TempDir;
use tokio::fs;
use tokio::process::Command;

use crate::config::SandboxConfig;
use crate::constants::{SANDBOX_PATH, WORKSPACE_MOUNT, sandbox_files};

use super::error::SandboxError;
use super::isolation::Confinement;

/// A program to run inside a fresh workspace
#[derive(Debug, Clone)]
pub struct SandboxCommand<'a> {
    pub program: &'a str,
    /// Arguments; relative paths resolve inside the workspace
    pub args: Vec<String>,
    /// Files written into the workspace before start: (name, contents)
    pub files: Vec<(&'a str, &'a str)>,
    /// RLIMIT_AS, when the runtime tolerates one
    pub memory_limit_bytes: Option<u64>,
}

/// Everything left behind by a process that exited on its own
#[derive(Debug)]
pub struct SandboxOutput {
    pub status: ExitStatus,
    pub stderr: String,
    /// Contents of the result file, if the process wrote one
    pub result: Option<String>,
}

#[derive(Debug)]
pub enum SandboxRun {
    Completed(SandboxOutput),
    TimedOut,
}

/// Spawns isolated runs and tracks how many are alive
#[derive(Debug)]
pub struct ProcessSandbox {
    work_root: PathBuf,
    max_output_bytes: u64,
    isolation: bool,
    max_processes: u64,
    active: Arc<AtomicUsize>,
}

impl ProcessSandbox {
    pub fn new(config: &SandboxConfig) -> Self {
        Self {
            work_root: config.work_root.clone(),
            max_output_bytes: config.max_output_bytes,
            isolation: config.isolation,
            max_processes: config.max_processes,
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of workspaces currently held
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn is_isolated(&self) -> bool {
        self.isolation
    }

    /// Confirm that confined runs can start on this host
    pub async fn check_isolation(&self) -> Result<(), SandboxError> {
        let command = SandboxCommand {
            program: "/bin/sh",
            args: vec!["-c".to_string(), "exit 0".to_string()],
            files: Vec::new(),
            memory_limit_bytes: None,
        };
        match self.execute(command, Duration::from_secs(5)).await? {
            SandboxRun::Completed(output) if output.status.success() => Ok(()),
            SandboxRun::Completed(output) => Err(SandboxError::Isolation(format!(
                "confined shell exited with {}: {}",
                output.status, output.stderr
            ))),
            SandboxRun::TimedOut => Err(SandboxError::Isolation(
                "confined shell did not finish".to_string(),
            )),
        }
    }

    /// Run `command` to completion or until `timeout` elapses
    pub async fn execute(
        &self,
        command: SandboxCommand<'_>,
        timeout: Duration,
    ) -> Result<SandboxRun, SandboxError> {
        let mut lease = self.acquire().await?;
        let workdir = lease.path().to_path_buf();

        for (name, contents) in &command.files {
            fs::write(workdir.join(name), contents)
                .await
                .map_err(|source| workspace_error(&workdir, source))?;
        }

        let stdout = std::fs::File::create(workdir.join(sandbox_files::STDOUT))
            .map_err(|source| workspace_error(&workdir, source))?;
        let stderr = std::fs::File::create(workdir.join(sandbox_files::STDERR))
            .map_err(|source| workspace_error(&workdir, source))?;

        let limits = ResourceLimits {
            cpu_seconds: timeout.as_secs() + 1,
            file_size_bytes: self.max_output_bytes,
            address_space_bytes: command.memory_limit_bytes,
        };
        let confinement = if self.isolation {
            let root = fs::canonicalize(&self.work_root)
                .await
                .map_err(|source| workspace_error(&self.work_root, source))?;
            let confinement = Confinement::new(&root, self.max_processes)
                .map_err(|source| workspace_error(&self.work_root, source))?;
            Some(confinement)
        } else {
            None
        };
        let home = if confinement.is_some() {
            PathBuf::from(WORKSPACE_MOUNT)
        } else {
            workdir.clone()
        };

        let mut cmd = Command::new(command.program);
        cmd.args(&command.args)
            .current_dir(&workdir)
            .env_clear()
            .env("PATH", SANDBOX_PATH)
            .env("HOME", &home)
            .env("LANG", "C.UTF-8")
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .kill_on_drop(true)
            .process_group(0);

        // SAFETY: the hook only makes raw syscalls (setrlimit, unshare, mount,
        // fork, waitpid) on data prepared before the fork.
        unsafe {
            cmd.pre_exec(move || {
                if let Some(confinement) = &confinement {
                    confinement.enter()?;
                }
                limits.apply()
            });
        }

        let mut child = cmd.spawn().map_err(|source| SandboxError::Spawn {
            program: command.program.to_string(),
            source,
        })?;
        if let Some(pid) = child.id() {
            lease.track(pid);
        }

        let status = match tokio::time::timeout(timeout, child.wait()).await {
            Ok(status) => status.map_err(SandboxError::Wait)?,
            Err(_) => {
                tracing::debug!(
                    "Sandboxed {} exceeded {}ms, killing process group",
                    command.program,
                    timeout.as_millis()
                );
                lease.kill_group();
                let _ = child.start_kill();
                let _ = child.wait().await;
                return Ok(SandboxRun::TimedOut);
            }
        };

        if self.isolation {
            // The namespace died with its init before the leader could be reaped.
            lease.release_group();
        } else {
            // Leader is gone; take down anything it left running.
            lease.kill_group();
        }

        let stderr = fs::read(workdir.join(sandbox_files::STDERR))
            .await
            .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
            .unwrap_or_default();
        let result = fs::read(workdir.join(sandbox_files::RESULT))
            .await
            .ok()
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned());

        Ok(SandboxRun::Completed(SandboxOutput {
            status,
            stderr,
            result,
        }))
    }

    async fn acquire(&self) -> Result<SandboxLease, SandboxError> {
        fs::create_dir_all(&self.work_root)
            .await
            .map_err(|source| workspace_error(&self.work_root, source))?;

        let workspace = tempfile::Builder::new()
            .prefix("case-")
            .tempdir_in(&self.work_root)
            .map_err(|source| workspace_error(&self.work_root, source))?;

        self.active.fetch_add(1, Ordering::SeqCst);
        Ok(SandboxLease {
            workspace,
            group: None,
            active: Arc::clone(&self.active),
        })
    }
}

/// Owns one workspace and, once spawned, its process group
struct SandboxLease {
    workspace: TempDir,
    group: Option<Pid>,
    active: Arc<AtomicUsize>,
}

impl SandboxLease {
    fn path(&self) -> &Path {
        self.workspace.path()
    }

    fn track(&mut self, pid: u32) {
        self.group = Some(Pid::from_raw(pid as i32));
    }

    fn release_group(&mut self) {
        self.group = None;
    }

    fn kill_group(&mut self) {
        if let Some(group) = self.group.take() {
            match killpg(group, Signal::SIGKILL) {
                Ok(()) | Err(Errno::ESRCH) => {}
                Err(e) => tracing::warn!("Failed to kill process group {}: {}", group, e),
            }
        }
    }
}

impl Drop for SandboxLease {
    fn drop(&mut self) {
        self.kill_group();
        self.active.fetch_sub(1, Ordering::SeqCst);
        // workspace directory is removed when `self.workspace` drops
    }
}

#[derive(Debug, Clone, Copy)]
struct ResourceLimits {
    cpu_seconds: u64,
    file_size_bytes: u64,
    address_space_bytes: Option<u64>,
}

impl ResourceLimits {
    fn apply(&self) -> std::io::Result<()> {
        // Soft limit raises SIGXCPU, the hard limit a second later is SIGKILL.
        setrlimit(Resource::RLIMIT_CPU, self.cpu_seconds, self.cpu_seconds + 1)?;
        setrlimit(
            Resource::RLIMIT_FSIZE,
            self.file_size_bytes,
            self.file_size_bytes,
        )?;
        setrlimit(Resource::RLIMIT_CORE, 0, 0)?;
        if let Some(bytes) = self.address_space_bytes {
            setrlimit(Resource::RLIMIT_AS, bytes, bytes)?;
        }
        Ok(())
    }
}

fn workspace_error(path: &Path, source: std::io::Error) -> SandboxError {
    SandboxError::Workspace {
        path: path.to_path_buf(),
        source,
    }
}
