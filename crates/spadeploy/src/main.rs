//! `deploy`: ship a single-page application to S3 and CloudFront.
//!
//! `deploy <environment> [region]` loads `config/<environment>.json`, composes
//! the hosting stack and walks it through install, build, bootstrap, apply,
//! publish and report. Exit code 0 on success, 1 on any failure.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use spadeploy_core::config::EnvironmentName;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod deploy;
mod loader;
mod outputs;
mod prelude;
mod runner;
mod synth;
mod teardown;
mod update_config;

use crate::prelude::*;

/// Deploy a single-page application to S3 and CloudFront
#[derive(Debug, Parser)]
#[command(name = "deploy")]
#[command(version, about, long_about = None)]
#[command(subcommand_negates_reqs = true)]
struct Cli {
    #[command(flatten)]
    global: Global,

    /// Environment to deploy
    #[arg(value_enum, required = true)]
    environment: Option<EnvironmentArg>,

    /// Region override for this run
    region: Option<String>,

    /// Skip the production confirmation prompt
    #[arg(long, short = 'y')]
    yes: bool,

    /// Reuse the installed frontend dependencies
    #[arg(long)]
    skip_install: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Directory holding `<environment>.json` records
    #[arg(long, global = true, env = "SPADEPLOY_CONFIG_DIR", default_value = "config")]
    pub config_dir: PathBuf,

    /// Directory synthesized templates are written to
    #[arg(long, global = true, env = "SPADEPLOY_OUT_DIR", default_value = "infra.out")]
    pub out_dir: PathBuf,

    /// Silence the command output
    #[clap(long, global = true)]
    pub silent: bool,

    /// Enable verbose output
    #[clap(long, global = true)]
    pub verbose: bool,
}

impl Global {
    pub fn is_silent(&self) -> bool {
        self.silent
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum EnvironmentArg {
    Dev,
    Prod,
}

impl From<EnvironmentArg> for EnvironmentName {
    fn from(arg: EnvironmentArg) -> Self {
        match arg {
            EnvironmentArg::Dev => EnvironmentName::Dev,
            EnvironmentArg::Prod => EnvironmentName::Prod,
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
struct TargetArgs {
    /// Environment to work on
    #[arg(value_enum)]
    environment: EnvironmentArg,

    /// Region override
    region: Option<String>,
}

impl TargetArgs {
    fn load(&self, global: &Global) -> anyhow::Result<spadeploy_core::config::EnvironmentConfig> {
        Ok(loader::load_validated(
            &global.config_dir,
            self.environment.into(),
            self.region.as_deref(),
        )?)
    }
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Write the stack templates without deploying anything
    Synth(TargetArgs),

    /// Print the outputs of an applied stack
    Outputs(TargetArgs),

    /// Fill account id, domain and certificate into the configuration records
    UpdateConfig(update_config::UpdateConfigCommand),

    /// Empty the buckets of a dev stack and delete the stack
    Teardown(TeardownArgs),
}

#[derive(Debug, Clone, clap::Args)]
struct TeardownArgs {
    #[command(flatten)]
    target: TargetArgs,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    yes: bool,
}

fn init_tracing(global: &Global) {
    let default_filter = if global.is_verbose() {
        "deploy=debug"
    } else if global.is_silent() {
        "deploy=error"
    } else {
        "deploy=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let global = cli.global;

    match cli.command {
        Some(Commands::Synth(target)) => {
            let config = target.load(&global)?;
            synth::run(&config, &global.out_dir, &global)?;
        }
        Some(Commands::Outputs(target)) => {
            let config = target.load(&global)?;
            outputs::run(&runner::ProcessRunner::new(true), &config, &global).await?;
        }
        Some(Commands::UpdateConfig(cmd)) => {
            update_config::run(cmd, &global.config_dir, &global).await?;
        }
        Some(Commands::Teardown(args)) => {
            let config = args.target.load(&global)?;
            let runner = runner::ProcessRunner::new(global.is_silent());
            teardown::run(&runner, &config, args.yes, &global).await?;
        }
        None => {
            let environment = cli
                .environment
                .ok_or_else(|| anyhow::anyhow!("an environment is required (dev or prod)"))?;
            let config = loader::load_validated(
                &global.config_dir,
                environment.into(),
                cli.region.as_deref(),
            )?;
            let options = deploy::DeployOptions {
                yes: cli.yes,
                skip_install: cli.skip_install,
            };
            deploy::run(&config, &global.out_dir, options, &global).await?;
        }
    }

    Ok(())
}

/// Parses arguments. Help and version exit 0 right away; any other usage
/// error is reported and maps to exit code 1.
fn parse<I, T>(args: I) -> Result<Cli, ExitCode>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args).map_err(|err| {
        if err.exit_code() == 0 {
            err.exit();
        }
        let _ = err.print();
        ExitCode::FAILURE
    })
}

/// Exit code 0 on success, 1 on any failure.
fn report(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(stage) = err
                .downcast_ref::<deploy::DeployError>()
                .and_then(deploy::DeployError::stage)
            {
                tracing::debug!(stage = %stage, "deploy aborted");
            }
            aeprintln!("{} {err}", p_r("Error:"));
            ExitCode::FAILURE
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match parse(std::env::args_os()) {
        Ok(cli) => cli,
        Err(code) => return code,
    };
    init_tracing(&cli.global);

    report(run(cli).await)
}
