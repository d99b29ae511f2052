//! Host prerequisite detection.
//!
//! Runs before any command is issued so a missing tool fails the action up
//! front instead of halfway through a sequence.

use crate::action::Action;
use crate::errors::{StackError, StackResult};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

const OS_RELEASE: &str = "/etc/os-release";
const SUPPORTED_DISTRO: &str = "fedora";

/// Locate `program` in the directories of a `PATH`-style list.
pub fn find_program(program: &str, path_var: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(path_var)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Fail with every program from `programs` missing on `path_var`.
pub fn check_programs(programs: &[&str], path_var: &OsStr) -> StackResult<()> {
    let missing: Vec<&str> = programs
        .iter()
        .copied()
        .filter(|p| find_program(p, path_var).is_none())
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    Err(StackError::Unsupported(format!(
        "required programs not found on PATH: {}\n\n\
         Suggestions:\n\
         - Run on a Fedora host with the base system tools installed\n\
         - LVM tools come from the lvm2 package: sudo yum install -y lvm2\n\
         - OpenStack tools are installed by `stackctl install`",
        missing.join(", ")
    )))
}

/// Check everything `action` needs on this host.
///
/// `sudo` is required as well when privileged commands will be wrapped.
pub fn check_action(action: Action, use_sudo: bool) -> StackResult<()> {
    let path_var = std::env::var_os("PATH").unwrap_or_default();
    let mut programs = action.required_programs().to_vec();
    if use_sudo {
        programs.push("sudo");
    }
    check_programs(&programs, &path_var)?;

    match distro_id(Path::new(OS_RELEASE)) {
        Some(id) if id == SUPPORTED_DISTRO => {}
        Some(id) => tracing::warn!(
            distro = %id,
            "stackctl targets Fedora; package and unit names may not exist here"
        ),
        None => tracing::warn!("could not determine the host distribution"),
    }
    Ok(())
}

/// `ID` field of an os-release file.
pub fn distro_id(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    parse_os_release_id(&content)
}

fn parse_os_release_id(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let value = line.trim().strip_prefix("ID=")?;
        Some(value.trim_matches('"').trim_matches('\'').to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn make_program(dir: &Path, name: &str, mode: u32) {
        let path = dir.join(name);
        std::fs::write(&path, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
    }

    #[test]
    fn finds_executable_in_later_path_entry() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        make_program(b.path(), "vgcreate", 0o755);

        let path_var = std::env::join_paths([a.path(), b.path()]).unwrap();
        assert_eq!(
            find_program("vgcreate", &path_var),
            Some(b.path().join("vgcreate"))
        );
    }

    #[test]
    fn skips_non_executable_files() {
        let dir = TempDir::new().unwrap();
        make_program(dir.path(), "yum", 0o644);
        assert!(find_program("yum", dir.path().as_os_str()).is_none());
    }

    #[test]
    fn reports_all_missing_programs() {
        let dir = TempDir::new().unwrap();
        make_program(dir.path(), "systemctl", 0o755);

        let err = check_programs(&["systemctl", "yum", "losetup"], dir.path().as_os_str())
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("yum, losetup"));
        assert!(!msg.contains("systemctl,"));
    }

    #[test]
    fn all_present_is_ok() {
        let dir = TempDir::new().unwrap();
        make_program(dir.path(), "systemctl", 0o755);
        check_programs(&["systemctl"], dir.path().as_os_str()).unwrap();
    }

    #[test]
    fn parses_os_release_id() {
        let content = "NAME=Fedora\nVERSION=\"17 (Beefy Miracle)\"\nID=fedora\nVERSION_ID=17\n";
        assert_eq!(parse_os_release_id(content).as_deref(), Some("fedora"));
        assert_eq!(
            parse_os_release_id("ID=\"rhel\"\n").as_deref(),
            Some("rhel")
        );
        assert_eq!(parse_os_release_id("VERSION_ID=17\n"), None);
    }

    #[test]
    fn distro_id_of_missing_file_is_none() {
        assert!(distro_id(Path::new("/nonexistent/os-release")).is_none());
    }
}
