//! `deploy <environment> [region]`: the full pipeline.

mod error;
mod orchestrator;

pub use error::{DeployError, Result};
pub use orchestrator::{DeployReport, Orchestrator};

use std::path::Path;

use dialoguer::Confirm;
use spadeploy_core::config::EnvironmentConfig;
use spadeploy_core::deploy::{format_deploy_plan, DeployPlan};

use crate::prelude::*;
use crate::runner::ProcessRunner;
use crate::synth::synthesize;

/// Options of a deploy run beyond the target itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeployOptions {
    /// Skip confirmation prompts.
    pub yes: bool,
    /// Reuse the installed frontend dependencies.
    pub skip_install: bool,
}

pub async fn run(
    config: &EnvironmentConfig,
    out_dir: &Path,
    options: DeployOptions,
    global: &crate::Global,
) -> Result<DeployReport> {
    // Composition first: configuration errors surface before any external command.
    let synthesized = synthesize(config)?;
    let plan = DeployPlan::new(config, out_dir, options.skip_install);

    if !global.is_silent() {
        aprintln!("{}", p_c("Deploy Plan:"));
        print_plan_lines(&format_deploy_plan(&plan));
        aprintln!();
    }

    if config.environment.is_production() && !options.yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Deploy {} to account {}?",
                plan.stack_name, plan.account
            ))
            .default(false)
            .interact()
            .map_err(|e| DeployError::Prompt(e.to_string()))?;

        if !confirmed {
            return Err(DeployError::UserCancelled);
        }
    }

    let runner = ProcessRunner::new(global.is_silent());
    let report = Orchestrator::new(&runner, config, &synthesized, &plan, out_dir)
        .silent(global.is_silent())
        .execute()
        .await?;
    tracing::info!(stage = %report.reached, "deploy finished");

    if !global.is_silent() {
        aprintln!();
        match report.outputs.website_url() {
            Some(url) => aprintln!("{} {}", p_g("Deployed:"), url),
            None => aprintln!("{}", p_g("Deployed.")),
        }
    }

    Ok(report)
}
