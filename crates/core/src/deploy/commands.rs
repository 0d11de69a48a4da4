//! External command lines the deploy drives (pure construction, no spawning).

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{EnvironmentConfig, FrontendConfig};
use crate::template::MANAGED_BY;

/// One program invocation: argv plus working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Splits a configured command line on whitespace. `None` when blank.
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let program = words.next()?;
        Some(Self::new(program).args(words))
    }

    /// `true` when this is `<program> <args[0]> <args[1]>...` for the given prefix.
    pub fn starts_with(&self, program: &str, args: &[&str]) -> bool {
        self.program == program
            && self.args.len() >= args.len()
            && self.args.iter().zip(args).all(|(a, b)| a.as_str() == *b)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Dependency install, run in the frontend directory.
pub fn install(frontend: &FrontendConfig) -> Option<CommandSpec> {
    CommandSpec::parse_line(&frontend.install_command).map(|c| c.current_dir(frontend.directory.clone()))
}

/// Production bundle build, run in the frontend directory.
pub fn build(frontend: &FrontendConfig) -> Option<CommandSpec> {
    CommandSpec::parse_line(&frontend.build_command).map(|c| c.current_dir(frontend.directory.clone()))
}

/// Invocations of the `aws` CLI, all pinned to one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsCli {
    region: String,
}

impl AwsCli {
    pub const PROGRAM: &'static str = "aws";

    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
        }
    }

    pub fn for_config(config: &EnvironmentConfig) -> Self {
        Self::new(&config.region)
    }

    fn command(&self, service: &str, operation: &str) -> CommandSpec {
        CommandSpec::new(Self::PROGRAM).args([
            service,
            operation,
            "--region",
            self.region.as_str(),
            "--output",
            "json",
        ])
    }

    pub fn caller_identity(&self) -> CommandSpec {
        self.command("sts", "get-caller-identity")
    }

    pub fn describe_stack(&self, stack_name: &str) -> CommandSpec {
        self.command("cloudformation", "describe-stacks")
            .args(["--stack-name", stack_name])
    }

    /// Create-or-update through a change set. An unchanged template is a no-op.
    pub fn deploy_stack(
        &self,
        stack_name: &str,
        template_path: &Path,
        staging_bucket: Option<&str>,
        config: &EnvironmentConfig,
    ) -> CommandSpec {
        let mut command = self
            .command("cloudformation", "deploy")
            .args(["--stack-name", stack_name])
            .arg("--template-file")
            .arg(template_path.display().to_string())
            .args(["--capabilities", "CAPABILITY_IAM"])
            .arg("--no-fail-on-empty-changeset");

        if let Some(bucket) = staging_bucket {
            command = command
                .args(["--s3-bucket", bucket])
                .args(["--s3-prefix", stack_name]);
        }

        command.arg("--tags").args([
            format!("Environment={}", config.environment),
            format!("Project={}", config.project),
            format!("ManagedBy={MANAGED_BY}"),
        ])
    }

    /// Uploads the built bundle. `prune` deletes remote objects missing locally.
    pub fn sync_assets(&self, build_dir: &Path, bucket: &str, prune: bool) -> CommandSpec {
        let command = CommandSpec::new(Self::PROGRAM)
            .args(["s3", "sync"])
            .arg(build_dir.display().to_string())
            .arg(format!("s3://{bucket}"))
            .args(["--region", self.region.as_str()]);
        if prune {
            command.arg("--delete")
        } else {
            command
        }
    }

    pub fn invalidate(&self, distribution_id: &str) -> CommandSpec {
        self.command("cloudfront", "create-invalidation")
            .args(["--distribution-id", distribution_id])
            .args(["--paths", "/*"])
    }

    /// First page of object versions and delete markers.
    pub fn list_object_versions(&self, bucket: &str) -> CommandSpec {
        self.command("s3api", "list-object-versions")
            .args(["--bucket", bucket])
            .args(["--max-items", "1000"])
    }

    /// `batch` is the JSON document built by [`super::delete_batch`].
    pub fn delete_objects(&self, bucket: &str, batch: &str) -> CommandSpec {
        self.command("s3api", "delete-objects")
            .args(["--bucket", bucket])
            .args(["--delete", batch])
    }

    pub fn delete_stack(&self, stack_name: &str) -> CommandSpec {
        self.command("cloudformation", "delete-stack")
            .args(["--stack-name", stack_name])
    }

    /// Blocks until the stack is gone or its deletion failed.
    pub fn wait_stack_deleted(&self, stack_name: &str) -> CommandSpec {
        CommandSpec::new(Self::PROGRAM)
            .args(["cloudformation", "wait", "stack-delete-complete"])
            .args(["--stack-name", stack_name])
            .args(["--region", self.region.as_str()])
    }
}
