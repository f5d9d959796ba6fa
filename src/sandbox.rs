// SPDX-License-Identifier: MPL-2.0

//! Process capability restrictions.
//!
//! Restrictions are applied in two steps, each narrowing what the process may do:
//!
//! 1. [`lock_privileges`] runs first thing in `main` and stops the process (and
//!    anything it spawns) from ever gaining privileges through `execve`.
//! 2. [`confine_filesystem`] runs once logging and localisation are loaded. It
//!    installs a Landlock ruleset: the resource tree and the status resource
//!    become read-only, the layout helper is the only program that may be
//!    started, and the windowing toolkit keeps the locations it needs to draw
//!    and store settings. The shared library directories stay executable
//!    because the kernel opens a dynamic helper's ELF interpreter for
//!    execution.
//!
//! Everything outside the ruleset is refused by the kernel.

use std::path::PathBuf;

use crate::config::Paths;
use crate::error::StartupError;

/// Sets `PR_SET_NO_NEW_PRIVS` on the current process.
#[cfg(target_os = "linux")]
pub fn lock_privileges() -> Result<(), StartupError> {
    // SAFETY: prctl with PR_SET_NO_NEW_PRIVS takes only integer arguments.
    let ret = unsafe { libc::prctl(libc::PR_SET_NO_NEW_PRIVS, 1, 0, 0, 0) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(StartupError::Sandbox(format!("prctl(PR_SET_NO_NEW_PRIVS): {err}")));
    }
    Ok(())
}

#[cfg(not(target_os = "linux"))]
pub fn lock_privileges() -> Result<(), StartupError> {
    log::warn!("Privilege lock is not supported on this platform");
    Ok(())
}

/// Filesystem locations the process keeps after [`confine_filesystem`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Policy {
    /// Readable trees or files
    pub read: Vec<PathBuf>,
    /// The only programs that may be executed
    pub execute: Vec<PathBuf>,
    /// Dynamic loader and shared library trees, readable and mappable for execution
    pub loader: Vec<PathBuf>,
    /// Readable and writable trees needed by the toolkit
    pub read_write: Vec<PathBuf>,
}

impl Policy {
    /// Builds the policy for the panel's own resources plus the toolkit's.
    pub fn for_paths(paths: &Paths) -> Self {
        let mut read = vec![paths.resources.clone(), paths.status.clone()];
        if !paths.keymaps.starts_with(&paths.resources) {
            read.push(paths.keymaps.clone());
        }
        read.extend(
            ["/usr", "/etc", "/sys", "/proc/self"]
                .into_iter()
                .map(PathBuf::from),
        );
        read.extend(dirs::data_dir());

        let mut read_write = vec![PathBuf::from("/dev"), PathBuf::from("/tmp")];
        read_write.extend(dirs::config_dir());
        read_write.extend(dirs::cache_dir());
        read_write.extend(dirs::runtime_dir());

        let loader = ["/lib", "/lib32", "/lib64", "/usr/lib", "/usr/lib32", "/usr/lib64"]
            .into_iter()
            .map(PathBuf::from)
            .collect();

        Self {
            read,
            execute: vec![paths.helper.clone()],
            loader,
            read_write,
        }
    }

    /// Drops locations that do not exist; Landlock can only attach rules to open paths.
    fn existing(paths: &[PathBuf]) -> Vec<&PathBuf> {
        paths
            .iter()
            .filter(|path| {
                let exists = path.exists();
                if !exists {
                    log::debug!("Sandbox skips missing path {}", path.display());
                }
                exists
            })
            .collect()
    }
}

/// Installs the Landlock ruleset described by `policy` on the calling thread.
///
/// Returns whether the kernel enforces the ruleset, fully or in part.
#[cfg(target_os = "linux")]
pub fn confine_filesystem(policy: &Policy) -> Result<bool, StartupError> {
    use landlock::{
        path_beneath_rules, Access, AccessFs, Ruleset, RulesetAttr, RulesetCreatedAttr,
        RulesetError, RulesetStatus, ABI,
    };

    // Best-effort: rights a kernel does not know are dropped from the ruleset.
    let abi = ABI::V3;
    let read = AccessFs::ReadFile | AccessFs::ReadDir;
    let execute = AccessFs::Execute | AccessFs::ReadFile;
    let loader = AccessFs::Execute | AccessFs::ReadFile | AccessFs::ReadDir;

    let status = Ruleset::default()
        .handle_access(AccessFs::from_all(abi))
        .and_then(|ruleset| ruleset.create())
        .and_then(|ruleset| {
            ruleset.add_rules(path_beneath_rules(Policy::existing(&policy.read), read))
        })
        .and_then(|ruleset| {
            ruleset.add_rules(path_beneath_rules(Policy::existing(&policy.execute), execute))
        })
        .and_then(|ruleset| {
            ruleset.add_rules(path_beneath_rules(Policy::existing(&policy.loader), loader))
        })
        .and_then(|ruleset| {
            ruleset.add_rules(path_beneath_rules(
                Policy::existing(&policy.read_write),
                AccessFs::from_all(abi),
            ))
        })
        .and_then(|ruleset| ruleset.restrict_self())
        .map_err(|err: RulesetError| StartupError::Sandbox(format!("landlock: {err}")))?;

    Ok(match status.ruleset {
        RulesetStatus::FullyEnforced => {
            log::info!("Filesystem sandbox enforced");
            true
        }
        RulesetStatus::PartiallyEnforced => {
            log::warn!("Filesystem sandbox partially enforced");
            true
        }
        RulesetStatus::NotEnforced => {
            log::warn!("Kernel does not support Landlock, filesystem sandbox not enforced");
            false
        }
    })
}

#[cfg(not(target_os = "linux"))]
pub fn confine_filesystem(_policy: &Policy) -> Result<bool, StartupError> {
    log::warn!("Filesystem sandbox is not supported on this platform");
    Ok(false)
}
