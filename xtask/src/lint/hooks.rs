//! Git pre-commit hook management.

use std::fs;
use std::path::{Path, PathBuf};

use super::error::{LintError, Result};
use crate::prelude::*;

/// Marks hooks written by `cargo xtask lint --install-hooks`.
const HOOK_MARKER: &str = "# xtask-managed-hook";

const PRE_COMMIT_SCRIPT: &str = r#"#!/bin/sh
# xtask-managed-hook
# Installed by: cargo xtask lint --install-hooks
# Remove with:  cargo xtask lint --uninstall-hooks
#
# Formats and re-stages Rust files, runs clippy and tests, then scans the
# staged changes for secrets with gitleaks. Skip with: git commit --no-verify

exec cargo xtask lint --staged-only
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStatus {
    Missing,
    Managed,
    Foreign,
}

fn hook_path(git_dir: &Path) -> PathBuf {
    git_dir.join("hooks").join("pre-commit")
}

pub fn status(git_dir: &Path) -> Result<HookStatus> {
    let path = hook_path(git_dir);
    if !path.exists() {
        return Ok(HookStatus::Missing);
    }
    if fs::read_to_string(&path)?.contains(HOOK_MARKER) {
        Ok(HookStatus::Managed)
    } else {
        Ok(HookStatus::Foreign)
    }
}

/// Writes the pre-commit hook. Refuses to replace a hook xtask did not write.
pub fn install(git_dir: &Path) -> Result<PathBuf> {
    let path = hook_path(git_dir);
    if status(git_dir)? == HookStatus::Foreign {
        return Err(LintError::ForeignHook(path));
    }

    fs::create_dir_all(git_dir.join("hooks"))?;
    fs::write(&path, PRE_COMMIT_SCRIPT)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    }

    Ok(path)
}

/// Removes the pre-commit hook, only if xtask wrote it.
pub fn uninstall(git_dir: &Path) -> Result<PathBuf> {
    let path = hook_path(git_dir);
    match status(git_dir)? {
        HookStatus::Missing => Err(LintError::NoHook(path)),
        HookStatus::Foreign => Err(LintError::ForeignHook(path)),
        HookStatus::Managed => {
            fs::remove_file(&path)?;
            Ok(path)
        }
    }
}

async fn git_dir() -> Result<PathBuf> {
    let output = tokio::process::Command::new("git")
        .args(["rev-parse", "--git-dir"])
        .output()
        .await?;

    if !output.status.success() {
        return Err(LintError::NotAGitRepository);
    }

    Ok(PathBuf::from(
        String::from_utf8_lossy(&output.stdout).trim(),
    ))
}

pub async fn install_hooks(global: &crate::Global) -> Result<()> {
    let path = install(&git_dir().await?)?;

    if !global.is_silent() {
        aprintln!("{} Pre-commit hook installed at {}", p_g("✅"), path.display());
        aprintln!(
            "   Staged changes are linted and scanned for secrets before each commit."
        );
        aprintln!(
            "   To remove it later: {}",
            p_c("cargo xtask lint --uninstall-hooks")
        );
    }
    Ok(())
}

pub async fn uninstall_hooks(global: &crate::Global) -> Result<()> {
    let path = uninstall(&git_dir().await?)?;

    if !global.is_silent() {
        aprintln!("{} Removed {}", p_g("✅"), path.display());
    }
    Ok(())
}

pub async fn show_status() -> Result<()> {
    let git_dir = git_dir().await?;
    let path = hook_path(&git_dir);

    match status(&git_dir)? {
        HookStatus::Managed => aprintln!("{} pre-commit: installed ({})", p_g("✅"), path.display()),
        HookStatus::Missing => aprintln!(
            "{} pre-commit: not installed. Run {}",
            p_y("⚠️"),
            p_c("cargo xtask lint --install-hooks")
        ),
        HookStatus::Foreign => aprintln!(
            "{} pre-commit: a hook not managed by xtask exists at {}",
            p_y("⚠️"),
            path.display()
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_creates_executable_hook() {
        let git_dir = tempfile::tempdir().unwrap();
        let path = install(git_dir.path()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains(HOOK_MARKER));
        assert!(content.contains("cargo xtask lint --staged-only"));
        assert_eq!(status(git_dir.path()).unwrap(), HookStatus::Managed);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o111, 0o111);
        }
    }

    #[test]
    fn test_install_twice_is_allowed() {
        let git_dir = tempfile::tempdir().unwrap();
        install(git_dir.path()).unwrap();
        install(git_dir.path()).unwrap();
    }

    #[test]
    fn test_foreign_hook_is_left_alone() {
        let git_dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(git_dir.path().join("hooks")).unwrap();
        let path = hook_path(git_dir.path());
        fs::write(&path, "#!/bin/sh\necho custom\n").unwrap();

        assert_eq!(status(git_dir.path()).unwrap(), HookStatus::Foreign);
        assert!(matches!(install(git_dir.path()), Err(LintError::ForeignHook(_))));
        assert!(matches!(uninstall(git_dir.path()), Err(LintError::ForeignHook(_))));
        assert_eq!(fs::read_to_string(&path).unwrap(), "#!/bin/sh\necho custom\n");
    }

    #[test]
    fn test_uninstall() {
        let git_dir = tempfile::tempdir().unwrap();
        assert!(matches!(uninstall(git_dir.path()), Err(LintError::NoHook(_))));

        install(git_dir.path()).unwrap();
        uninstall(git_dir.path()).unwrap();
        assert_eq!(status(git_dir.path()).unwrap(), HookStatus::Missing);
    }
}
