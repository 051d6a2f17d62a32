//! Detached background jobs identified by name.
//!
//! A job's pid is kept in `<name>.pid` under the jobs directory, written by
//! the job itself when it starts. Starting a job whose recorded pid is still
//! alive is a no-op, so repeated triggers coalesce into the one already
//! running.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

#[cfg(unix)]
use nix::errno::Errno;
#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;
use tracing::{debug, info, warn};

use crate::error::{CaskError, CaskResult};

pub const REFRESH_JOB: &str = "cask_refresh";

#[derive(Clone, Debug)]
pub struct BackgroundJobs {
    dir: PathBuf,
}

impl BackgroundJobs {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn pid_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.pid"))
    }

    /// Pid of the running job, clearing a stale pid file on the way.
    pub fn running_pid(&self, name: &str) -> Option<u32> {
        let path = self.pid_path(name);
        let pid = read_pid(&path)?;
        if process_alive(pid) {
            return Some(pid);
        }

        debug!(job = name, pid, "removing stale pid file");
        let _ = std::fs::remove_file(&path);
        None
    }

    #[cfg(test)]
    pub fn is_running(&self, name: &str) -> bool {
        self.running_pid(name).is_some()
    }

    /// Starts `program args` detached from this process. Returns `false`
    /// when a job with the same name is already running. The started
    /// program is expected to [`claim`](Self::claim) the job.
    pub fn spawn(&self, name: &str, program: &Path, args: &[String]) -> CaskResult<bool> {
        if let Some(pid) = self.running_pid(name) {
            debug!(job = name, pid, "job already running");
            return Ok(false);
        }

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // own process group so the host killing us doesn't take the job down
            command.process_group(0);
        }

        let child = command
            .spawn()
            .map_err(|e| CaskError::io(format!("starting job {name}"), e))?;
        info!(job = name, pid = child.id(), "background job started");
        Ok(true)
    }

    /// Records the current process as the running `name` job. Returns
    /// `false` when another live process already holds it.
    pub fn claim(&self, name: &str) -> CaskResult<bool> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| CaskError::io(format!("creating {}", self.dir.display()), e))?;

        let path = self.pid_path(name);
        let own = std::process::id();
        for _ in 0..2 {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    write!(file, "{own}").map_err(|e| {
                        CaskError::io(format!("recording pid for job {name}"), e)
                    })?;
                    debug!(job = name, pid = own, "job claimed");
                    return Ok(true);
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    match self.running_pid(name) {
                        Some(pid) if pid == own => return Ok(true),
                        Some(pid) => {
                            debug!(job = name, pid, "job held by another process");
                            return Ok(false);
                        }
                        // stale file was cleared, try again
                        None => continue,
                    }
                }
                Err(err) => {
                    return Err(CaskError::io(format!("recording pid for job {name}"), err));
                }
            }
        }
        Ok(false)
    }

    /// Called by the job itself when it finishes; only removes the pid file
    /// if it still names `pid`.
    pub fn finish(&self, name: &str, pid: u32) {
        let path = self.pid_path(name);
        if read_pid(&path) == Some(pid)
            && let Err(err) = std::fs::remove_file(&path)
        {
            warn!(job = name, "failed to remove pid file: {err}");
        }
    }

    /// Stops a running job. Returns `true` if one was signalled.
    pub fn cancel(&self, name: &str) -> CaskResult<bool> {
        let Some(pid) = self.running_pid(name) else {
            return Ok(false);
        };

        terminate(pid);
        let path = self.pid_path(name);
        if path.exists() {
            std::fs::remove_file(&path)
                .map_err(|e| CaskError::io(format!("removing {}", path.display()), e))?;
        }
        info!(job = name, pid, "background job cancelled");
        Ok(true)
    }
}

fn read_pid(path: &Path) -> Option<u32> {
    std::fs::read_to_string(path).ok()?.trim().parse().ok()
}

#[cfg(unix)]
fn nix_pid(pid: u32) -> Option<Pid> {
    i32::try_from(pid)
        .ok()
        .filter(|raw| *raw > 0)
        .map(Pid::from_raw)
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    let Some(pid) = nix_pid(pid) else {
        return false;
    };
    // null signal only checks existence; EPERM means alive but not ours
    match signal::kill(pid, None) {
        Ok(()) => true,
        Err(Errno::ESRCH) => false,
        Err(_) => true,
    }
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    false
}

#[cfg(unix)]
fn terminate(pid: u32) {
    let Some(pid) = nix_pid(pid) else {
        return;
    };
    match signal::kill(pid, Signal::SIGTERM) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(err) => warn!(%pid, "failed to signal job: {err}"),
    }
}

#[cfg(not(unix))]
fn terminate(_pid: u32) {}
