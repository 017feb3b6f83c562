//! Namespace confinement for sandboxed processes
//!
//! Runs between fork and exec. The spawned process unshares user, mount,
//! network, pid, ipc and uts namespaces and then forks twice:
//!
//! ```text
//! spawned (host side, relays status) -> init (pid 1) -> payload (execs)
//! ```
//!
//! Only the payload returns from [`Confinement::enter`]; the other two wait
//! and mirror its exit status. Killing the spawned process's group takes down
//! init, and the kernel then kills everything left in the pid namespace,
//! including processes that started their own session.
//!
//! Inside, the host root is read-only, the work root and `/tmp` are empty
//! tmpfs mounts, the run's workspace is bound read-write at
//! [`WORKSPACE_MOUNT`], `/proc` only shows the namespace, and there is no
//! network beyond a downed loopback.
//!
//! Everything below runs in a forked child of a multi-threaded process, so it
//! sticks to raw syscalls on memory prepared before the fork.

use std::ffi::{CStr, CString};
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use nix::libc;
use nix::mount::{MsFlags, mount};
use nix::sched::{CloneFlags, unshare};
use nix::sys::prctl;
use nix::sys::resource::{Resource, setrlimit};
use nix::sys::signal::{SigHandler, SigSet, Signal, kill, signal};
use nix::sys::stat::Mode;
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, chdir, fork, getgid, getpid, getuid, mkdir};

use crate::constants::{SANDBOX_UID, WORKSPACE_MOUNT};

const SYS_CLOSE_RANGE: libc::c_long = 436;
const SYS_MOUNT_SETATTR: libc::c_long = 442;
const AT_RECURSIVE: libc::c_uint = 0x8000;
const MOUNT_ATTR_RDONLY: u64 = 0x1;

/// Linux `struct mount_attr`
#[repr(C)]
struct MountAttr {
    attr_set: u64,
    attr_clr: u64,
    propagation: u64,
    userns_fd: u64,
}

/// Pre-built arguments for entering the sandbox namespaces
#[derive(Debug, Clone)]
pub(crate) struct Confinement {
    work_root: CString,
    workspace_mount: CString,
    uid_map: Vec<u8>,
    gid_map: Vec<u8>,
    max_processes: u64,
}

impl Confinement {
    /// `work_root` must exist; it is hidden from the confined process.
    pub(crate) fn new(work_root: &Path, max_processes: u64) -> io::Result<Self> {
        Ok(Self {
            work_root: c_path(work_root.as_os_str().as_bytes())?,
            workspace_mount: c_path(WORKSPACE_MOUNT.as_bytes())?,
            uid_map: format!("{} {} 1\n", SANDBOX_UID, getuid()).into_bytes(),
            gid_map: format!("{} {} 1\n", SANDBOX_UID, getgid()).into_bytes(),
            max_processes,
        })
    }

    /// Enter the namespaces. Called from `pre_exec` with the workspace as cwd.
    ///
    /// Returns only in the payload process. A failure before the first fork is
    /// reported to the spawner as a spawn error.
    pub(crate) fn enter(&self) -> io::Result<()> {
        // relayed signals must not dump the relay itself
        setrlimit(Resource::RLIMIT_CORE, 0, 0)?;
        unshare(
            CloneFlags::CLONE_NEWUSER
                | CloneFlags::CLONE_NEWNS
                | CloneFlags::CLONE_NEWNET
                | CloneFlags::CLONE_NEWPID
                | CloneFlags::CLONE_NEWIPC
                | CloneFlags::CLONE_NEWUTS,
        )?;
        write_file(c"/proc/self/setgroups", b"deny")?;
        write_file(c"/proc/self/uid_map", &self.uid_map)?;
        write_file(c"/proc/self/gid_map", &self.gid_map)?;
        self.build_filesystem()?;

        // SAFETY: the child only makes raw syscalls before exec.
        if let ForkResult::Parent { child } = unsafe { fork() }? {
            relay(child);
        }

        // pid 1 of the new namespace
        prctl::set_pdeathsig(Signal::SIGKILL)?;
        prctl::set_dumpable(false)?;
        mount(
            Some(c"proc"),
            c"/proc",
            Some(c"proc"),
            MsFlags::MS_NOSUID | MsFlags::MS_NODEV | MsFlags::MS_NOEXEC,
            None::<&CStr>,
        )?;

        // SAFETY: as above.
        if let ForkResult::Parent { child } = unsafe { fork() }? {
            reap_as_init(child);
        }

        prctl::set_no_new_privs()?;
        setrlimit(
            Resource::RLIMIT_NPROC,
            self.max_processes,
            self.max_processes,
        )?;
        Ok(())
    }

    fn build_filesystem(&self) -> io::Result<()> {
        mount(
            None::<&CStr>,
            c"/",
            None::<&CStr>,
            MsFlags::MS_REC | MsFlags::MS_PRIVATE,
            None::<&CStr>,
        )?;
        set_mount_attr(c"/", MOUNT_ATTR_RDONLY, 0, true)?;

        let scratch = MsFlags::MS_NOSUID | MsFlags::MS_NODEV;
        mount(
            Some(c"tmpfs"),
            self.work_root.as_c_str(),
            Some(c"tmpfs"),
            scratch,
            Some(c"size=64k,mode=0755"),
        )?;
        mount(
            Some(c"tmpfs"),
            c"/tmp",
            Some(c"tmpfs"),
            scratch,
            Some(c"size=16m,mode=1777"),
        )?;

        mkdir(self.workspace_mount.as_c_str(), Mode::S_IRWXU)?;
        // cwd still points at the workspace on the host mount
        mount(
            Some(c"."),
            self.workspace_mount.as_c_str(),
            None::<&CStr>,
            MsFlags::MS_BIND,
            None::<&CStr>,
        )?;
        set_mount_attr(self.workspace_mount.as_c_str(), 0, MOUNT_ATTR_RDONLY, false)?;
        chdir(self.workspace_mount.as_c_str())?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum Exit {
    Code(i32),
    Signal(Signal),
}

/// Host-side process: mirror init's exit so the spawner sees the payload's status.
fn relay(init: Pid) -> ! {
    close_inherited_fds();
    let exit = loop {
        match waitpid(init, None) {
            Ok(WaitStatus::Exited(_, code)) => {
                break match Signal::try_from(code - 128) {
                    Ok(sig) if code > 128 => Exit::Signal(sig),
                    _ => Exit::Code(code),
                };
            }
            Ok(WaitStatus::Signaled(_, sig, _)) => break Exit::Signal(sig),
            Ok(_) | Err(nix::errno::Errno::EINTR) => continue,
            Err(_) => break Exit::Code(libc::EXIT_FAILURE),
        }
    };

    match exit {
        Exit::Code(code) => exit_now(code),
        Exit::Signal(sig) => {
            // SAFETY: resetting to the default action installs no handler.
            let _ = unsafe { signal(sig, SigHandler::SigDfl) };
            let mut unblock = SigSet::empty();
            unblock.add(sig);
            let _ = unblock.thread_unblock();
            let _ = kill(getpid(), sig);
            exit_now(128 + sig as i32)
        }
    }
}

/// Namespace init: reap orphans until the payload exits, then exit with its status.
fn reap_as_init(payload: Pid) -> ! {
    close_inherited_fds();
    loop {
        match waitpid(Pid::from_raw(-1), None) {
            Ok(WaitStatus::Exited(pid, code)) if pid == payload => exit_now(code),
            Ok(WaitStatus::Signaled(pid, sig, _)) if pid == payload => {
                exit_now(128 + sig as i32)
            }
            Ok(_) | Err(nix::errno::Errno::EINTR) => continue,
            Err(_) => exit_now(libc::EXIT_FAILURE),
        }
    }
}

/// Drop descriptors inherited from the server, including the spawn status pipe.
fn close_inherited_fds() {
    // SAFETY: closing descriptors this process no longer uses.
    let rc = unsafe { libc::syscall(SYS_CLOSE_RANGE, 3 as libc::c_uint, libc::c_uint::MAX, 0) };
    if rc != 0 {
        for fd in 3..1024 {
            // SAFETY: as above.
            unsafe { libc::close(fd) };
        }
    }
}

fn exit_now(code: i32) -> ! {
    // SAFETY: `_exit` skips atexit handlers and buffered std state owned by the server.
    unsafe { libc::_exit(code) }
}

fn set_mount_attr(path: &CStr, set: u64, clear: u64, recursive: bool) -> io::Result<()> {
    let attr = MountAttr {
        attr_set: set,
        attr_clr: clear,
        propagation: 0,
        userns_fd: 0,
    };
    let flags = if recursive { AT_RECURSIVE } else { 0 };
    // SAFETY: `path` is NUL-terminated and `attr` outlives the call.
    let rc = unsafe {
        libc::syscall(
            SYS_MOUNT_SETATTR,
            libc::AT_FDCWD,
            path.as_ptr(),
            flags,
            &attr as *const MountAttr,
            std::mem::size_of::<MountAttr>(),
        )
    };
    if rc == -1 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

fn write_file(path: &CStr, contents: &[u8]) -> io::Result<()> {
    // SAFETY: `path` is NUL-terminated; the descriptor is closed below.
    let fd = unsafe { libc::open(path.as_ptr(), libc::O_WRONLY | libc::O_CLOEXEC) };
    if fd < 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: `contents` is a live slice of the given length.
    let written = unsafe { libc::write(fd, contents.as_ptr().cast(), contents.len()) };
    let result = if written < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    };
    // SAFETY: `fd` was opened above.
    unsafe { libc::close(fd) };
    result
}

fn c_path(bytes: &[u8]) -> io::Result<CString> {
    CString::new(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_single_host_identity_to_sandbox_uid() {
        let confinement = Confinement::new(Path::new("/srv/work"), 32).unwrap();
        assert_eq!(
            confinement.uid_map,
            format!("{} {} 1\n", SANDBOX_UID, getuid()).into_bytes()
        );
        assert_eq!(
            confinement.gid_map,
            format!("{} {} 1\n", SANDBOX_UID, getgid()).into_bytes()
        );
        assert_eq!(confinement.work_root.as_bytes(), b"/srv/work");
    }

    #[test]
    fn test_rejects_path_with_nul() {
        assert!(Confinement::new(Path::new("/srv/wo\0rk"), 32).is_err());
    }
}
