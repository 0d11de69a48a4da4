use std::path::Path;

use crate::prelude::*;
use error::Result;

pub mod error;
mod hooks;

/// Gitleaks rules checked into the repository root, when present.
const GITLEAKS_CONFIG: &str = ".gitleaks.toml";

/// Code quality checks, secret scanning and git hooks management
#[derive(Debug, clap::Parser)]
#[command(
    long_about = "Run code quality checks and scan for committed secrets.

This command runs the following checks in order:

1. cargo fmt - Code formatting (auto-fix with --fix)
2. cargo clippy - Linting with all warnings treated as errors
3. cargo test - Run all workspace tests
4. gitleaks - Secret scanning (the same scanner the secret-scan workflow runs in CI)

When used with --install-hooks, this command also manages a git pre-commit hook
that runs these same checks automatically before each commit.

The pre-commit hook will:
- Scan only the staged changes for secrets
- Auto-fix formatting issues and re-stage files
- Block commits if checks fail"
)]
pub struct LintCommand {
    /// Auto-fix issues when possible (applies to fmt and clippy)
    #[arg(long)]
    pub fix: bool,

    /// Scan the whole history for secrets, even in hook mode
    #[arg(long)]
    pub force: bool,

    /// Only scan staged changes (used by git hooks)
    #[arg(long, hide = true)]
    pub staged_only: bool,

    /// Install git pre-commit hooks
    #[arg(long, conflicts_with_all = &["uninstall_hooks", "hooks_status"])]
    pub install_hooks: bool,

    /// Uninstall git pre-commit hooks
    #[arg(long, conflicts_with_all = &["install_hooks", "hooks_status"])]
    pub uninstall_hooks: bool,

    /// Show git hooks installation status
    #[arg(long, conflicts_with_all = &["install_hooks", "uninstall_hooks"])]
    pub hooks_status: bool,
}

impl LintCommand {
    fn scan_staged(&self) -> bool {
        self.staged_only && !self.force
    }
}

/// One external tool invocation and how to report it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Check {
    label: &'static str,
    program: &'static str,
    args: Vec<String>,
    passed: &'static str,
    failed: &'static str,
}

fn clippy_check(command: &LintCommand, verbose: bool) -> Check {
    let mut args = vec!["clippy".to_string(), "--all-targets".to_string()];
    if command.fix {
        args.extend(["--fix".to_string(), "--allow-dirty".to_string()]);
    }
    if !verbose {
        args.push("--quiet".to_string());
    }
    args.extend(["--", "-D", "warnings"].map(String::from));

    Check {
        label: "cargo clippy",
        program: "cargo",
        args,
        passed: "Clippy checks passed",
        failed: "Clippy checks failed. Please fix clippy warnings before proceeding",
    }
}

fn test_check(verbose: bool) -> Check {
    let mut args = vec!["test".to_string(), "--workspace".to_string()];
    if !verbose {
        args.push("--quiet".to_string());
    }

    Check {
        label: "cargo test",
        program: "cargo",
        args,
        passed: "All tests passed",
        failed: "Tests failed. Please fix failing tests before proceeding",
    }
}

fn gitleaks_check(staged: bool, verbose: bool, config: Option<&Path>) -> Check {
    let mut args = vec![
        "git".to_string(),
        "--redact".to_string(),
        "--no-banner".to_string(),
    ];
    if staged {
        args.extend(["--pre-commit".to_string(), "--staged".to_string()]);
    }
    if let Some(config) = config {
        args.extend(["--config".to_string(), config.display().to_string()]);
    }
    if verbose {
        args.push("--verbose".to_string());
    }

    Check {
        label: "gitleaks",
        program: "gitleaks",
        args,
        passed: "No secrets found",
        failed: "Potential secrets detected. Remove them (and rotate them) before committing",
    }
}

fn plan_checks(command: &LintCommand, verbose: bool) -> Vec<Check> {
    let config = Path::new(GITLEAKS_CONFIG);
    vec![
        clippy_check(command, verbose),
        test_check(verbose),
        gitleaks_check(
            command.scan_staged(),
            verbose,
            config.exists().then_some(config),
        ),
    ]
}

pub async fn run(command: LintCommand, global: crate::Global) -> Result<()> {
    if command.install_hooks {
        return hooks::install_hooks(&global).await;
    }

    if command.uninstall_hooks {
        return hooks::uninstall_hooks(&global).await;
    }

    if command.hooks_status {
        return hooks::show_status().await;
    }

    run_lint_checks(&command, &global).await
}

async fn run_lint_checks(command: &LintCommand, global: &crate::Global) -> Result<()> {
    use error::require_command;

    require_command("cargo", "Required for Rust development: https://rustup.rs/")?;
    require_command(
        "gitleaks",
        "Required for secret scanning: https://github.com/gitleaks/gitleaks#installing",
    )?;

    if !global.is_silent() {
        aprintln!("{}", p_b("Running code quality checks..."));
        aprintln!();
    }

    let mut all_passed = run_cargo_fmt(command, global).await?;

    for check in plan_checks(command, global.is_verbose()) {
        if !run_check(&check, global).await? {
            all_passed = false;
        }
    }

    aprintln!();
    if all_passed {
        aprintln!("{} {}", p_g("✅"), p_g("All checks passed!"));
        Ok(())
    } else {
        aprintln!("{} {}", p_r("❌"), p_r("Some checks failed"));
        aprintln!();
        if !global.is_silent() {
            aprintln!("{}", p_b("Quick fixes:"));
            aprintln!("  • {} - Format code and apply clippy fixes", p_c("cargo xtask lint --fix"));
            aprintln!("  • {} - Inspect findings", p_c("gitleaks git --verbose"));
        }
        Err(error::LintError::ChecksFailed)
    }
}

async fn run_check(check: &Check, global: &crate::Global) -> Result<bool> {
    if !global.is_silent() {
        aprintln!("{} {}", p_b("🔧"), p_b(&format!("Running {}...", check.label)));
    }

    let status = tokio::process::Command::new(check.program)
        .args(&check.args)
        .status()
        .await?;

    if status.success() {
        if !global.is_silent() {
            aprintln!("{} {}", p_g("✅"), check.passed);
        }
        Ok(true)
    } else {
        aprintln!("{} {}", p_r("❌"), p_r(check.failed));
        Ok(false)
    }
}

async fn run_cargo_fmt(command: &LintCommand, global: &crate::Global) -> Result<bool> {
    if !global.is_silent() {
        aprintln!("{} {}", p_b("🔧"), p_b("Running cargo fmt..."));
    }

    let check_output = tokio::process::Command::new("cargo")
        .args(["fmt", "--check"])
        .output()
        .await?;

    if check_output.status.success() {
        if !global.is_silent() {
            aprintln!("{} {}", p_g("✅"), "Code formatting is correct");
        }
        return Ok(true);
    }

    if !(command.fix || command.staged_only) {
        aprintln!(
            "{} {}",
            p_r("❌"),
            "Code formatting check failed. Run with --fix to auto-format"
        );
        return Ok(false);
    }

    if global.is_verbose() {
        aprintln!("{} {}", p_y("⚠️"), "Code formatting issues found. Auto-fixing...");
    }

    let fmt_status = tokio::process::Command::new("cargo")
        .arg("fmt")
        .status()
        .await?;

    if !fmt_status.success() {
        aprintln!("{} {}", p_r("❌"), "cargo fmt failed");
        return Ok(false);
    }

    if command.staged_only {
        restage_rust_files(global).await?;
        if !global.is_silent() {
            aprintln!("{} {}", p_g("✅"), "Code formatted and re-staged");
        }
    } else if !global.is_silent() {
        aprintln!("{} {}", p_g("✅"), "Code formatted");
    }
    Ok(true)
}

fn staged_rust_files(diff_output: &str) -> Vec<&str> {
    diff_output
        .lines()
        .map(str::trim)
        .filter(|line| line.ends_with(".rs"))
        .collect()
}

async fn restage_rust_files(global: &crate::Global) -> Result<()> {
    let output = tokio::process::Command::new("git")
        .args(["diff", "--cached", "--name-only", "--diff-filter=ACM"])
        .output()
        .await?;

    if !output.status.success() {
        return Ok(());
    }

    let files = String::from_utf8_lossy(&output.stdout);
    let rust_files = staged_rust_files(&files);

    if !rust_files.is_empty() {
        tokio::process::Command::new("git")
            .arg("add")
            .args(&rust_files)
            .status()
            .await?;

        if global.is_verbose() {
            aprintln!("{} Re-staged {} Rust files", p_b("Info:"), rust_files.len());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> LintCommand {
        LintCommand::try_parse_from(std::iter::once("lint").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_hook_mode_scans_staged_changes() {
        let check = gitleaks_check(parse(&["--staged-only"]).scan_staged(), false, None);
        assert_eq!(
            check.args,
            ["git", "--redact", "--no-banner", "--pre-commit", "--staged"]
        );
    }

    #[test]
    fn test_force_scans_full_history() {
        let command = parse(&["--staged-only", "--force"]);
        assert!(!command.scan_staged());
        let check = gitleaks_check(command.scan_staged(), true, Some(Path::new(".gitleaks.toml")));
        assert_eq!(
            check.args,
            ["git", "--redact", "--no-banner", "--config", ".gitleaks.toml", "--verbose"]
        );
    }

    #[test]
    fn test_clippy_denies_warnings() {
        let check = clippy_check(&parse(&[]), false);
        assert_eq!(
            check.args,
            ["clippy", "--all-targets", "--quiet", "--", "-D", "warnings"]
        );

        let fix = clippy_check(&parse(&["--fix"]), true);
        assert_eq!(
            fix.args,
            ["clippy", "--all-targets", "--fix", "--allow-dirty", "--", "-D", "warnings"]
        );
    }

    #[test]
    fn test_checks_run_in_order() {
        let labels: Vec<_> = plan_checks(&parse(&[]), false)
            .into_iter()
            .map(|c| c.label)
            .collect();
        assert_eq!(labels, ["cargo clippy", "cargo test", "gitleaks"]);
    }

    #[test]
    fn test_hook_flags_conflict() {
        assert!(
            LintCommand::try_parse_from(["lint", "--install-hooks", "--uninstall-hooks"]).is_err()
        );
    }

    #[test]
    fn test_staged_rust_files() {
        let diff = "crates/core/src/lib.rs\nconfig/dev.json\n crates/spadeploy/src/main.rs \n";
        assert_eq!(
            staged_rust_files(diff),
            ["crates/core/src/lib.rs", "crates/spadeploy/src/main.rs"]
        );
    }
}
