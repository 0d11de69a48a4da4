use std::path::{Path, PathBuf};

/// Result type alias for the lint module.
pub type Result<T> = std::result::Result<T, LintError>;

#[derive(Debug, thiserror::Error)]
pub enum LintError {
    #[error("Some checks failed")]
    ChecksFailed,

    #[error("'{command}' not found on PATH. {hint}")]
    MissingCommand {
        command: &'static str,
        hint: &'static str,
    },

    #[error("Not a git repository")]
    NotAGitRepository,

    #[error(
        "A pre-commit hook already exists at {} and was not installed by xtask. Remove it first: rm {}",
        .0.display(),
        .0.display()
    )]
    ForeignHook(PathBuf),

    #[error("No xtask-managed pre-commit hook at {}", .0.display())]
    NoHook(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fails with an install hint when `command` is not on `PATH`.
pub fn require_command(command: &'static str, hint: &'static str) -> Result<()> {
    let path = std::env::var_os("PATH").unwrap_or_default();
    if find_in(std::env::split_paths(&path), command).is_some() {
        Ok(())
    } else {
        Err(LintError::MissingCommand { command, hint })
    }
}

fn find_in(dirs: impl IntoIterator<Item = PathBuf>, command: &str) -> Option<PathBuf> {
    dirs.into_iter()
        .map(|dir| dir.join(command))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_command_message_carries_hint() {
        let err = LintError::MissingCommand {
            command: "gitleaks",
            hint: "brew install gitleaks",
        };
        assert_eq!(
            err.to_string(),
            "'gitleaks' not found on PATH. brew install gitleaks"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_find_in_skips_non_executables() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("gitleaks");
        std::fs::write(&plain, "").unwrap();
        assert_eq!(find_in([dir.path().to_path_buf()], "gitleaks"), None);

        std::fs::set_permissions(&plain, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(find_in([dir.path().to_path_buf()], "gitleaks"), Some(plain));
    }
}
