//! Stage-by-stage execution of a deploy (Imperative Shell).

use std::path::Path;

use spadeploy_core::config::EnvironmentConfig;
use spadeploy_core::deploy::{
    self as planning, calculate_bootstrap_plan, parse_caller_account, AwsCli, BootstrapPlan,
    CommandSpec, DeployPlan, ResponseError, Stage, StackOutputs,
};
use spadeploy_core::template::{ENTRY_DOCUMENT, STAGING_BUCKET_OUTPUT};
use tracing::Instrument;

use super::error::{DeployError, Result, StageError};
use crate::prelude::*;
use crate::runner::{CommandRunner, RunnerError};
use crate::synth::{write_template, Synthesized};

type StageResult<T> = std::result::Result<T, StageError>;

/// Where a finished deploy ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployReport {
    pub reached: Stage,
    pub outputs: StackOutputs,
}

/// Drives one environment from `start` to `outputs-reported`.
pub struct Orchestrator<'a, R: CommandRunner> {
    runner: &'a R,
    config: &'a EnvironmentConfig,
    synthesized: &'a Synthesized,
    plan: &'a DeployPlan,
    out_dir: &'a Path,
    aws: AwsCli,
    silent: bool,
    reached: Stage,
}

impl<'a, R: CommandRunner> Orchestrator<'a, R> {
    pub fn new(
        runner: &'a R,
        config: &'a EnvironmentConfig,
        synthesized: &'a Synthesized,
        plan: &'a DeployPlan,
        out_dir: &'a Path,
    ) -> Self {
        Self {
            runner,
            config,
            synthesized,
            plan,
            out_dir,
            aws: AwsCli::for_config(config),
            silent: false,
            reached: Stage::Start,
        }
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub async fn execute(mut self) -> Result<DeployReport> {
        let stage = self.announce(Stage::DependenciesInstalled);
        let result = self.install_dependencies().instrument(stage_span(stage)).await;
        self.complete(stage, result)?;

        let stage = self.announce(Stage::FrontendBuilt);
        let result = self.build_frontend().instrument(stage_span(stage)).await;
        self.complete(stage, result)?;

        let stage = self.announce(Stage::AccountBootstrapped);
        let result = self.bootstrap_account().instrument(stage_span(stage)).await;
        let staging_bucket = self.complete(stage, result)?;

        let stage = self.announce(Stage::StackApplied);
        let result = self
            .apply_stack(&staging_bucket)
            .instrument(stage_span(stage))
            .await;
        let outputs = self.complete(stage, result)?;

        let stage = self.announce(Stage::AssetsPublished);
        let result = self
            .publish_assets(&outputs)
            .instrument(stage_span(stage))
            .await;
        self.complete(stage, result)?;

        let stage = self.announce(Stage::OutputsReported);
        self.report_outputs(&outputs);
        self.complete(stage, Ok(()))?;

        Ok(DeployReport {
            reached: self.reached,
            outputs,
        })
    }

    fn announce(&self, stage: Stage) -> Stage {
        if !self.silent {
            aprintln!("{} {}", p_b("==>"), stage.activity());
        }
        stage
    }

    /// Records a finished stage, or turns its failure into a labelled error.
    fn complete<T>(&mut self, stage: Stage, result: StageResult<T>) -> Result<T> {
        debug_assert_eq!(self.reached.next(), Some(stage));
        match result {
            Ok(value) => {
                tracing::info!(stage = %stage, "stage reached");
                self.reached = stage;
                Ok(value)
            }
            Err(source) => {
                tracing::error!(stage = %stage, error = %source, "stage failed");
                Err(DeployError::StageFailed { stage, source })
            }
        }
    }

    async fn install_dependencies(&self) -> StageResult<()> {
        if self.plan.skip_install {
            tracing::info!("dependency install skipped");
            return Ok(());
        }
        let command =
            planning::install(&self.config.frontend).ok_or(StageError::NoCommand("install"))?;
        self.runner.run(&command).await?;
        Ok(())
    }

    async fn build_frontend(&self) -> StageResult<()> {
        let command =
            planning::build(&self.config.frontend).ok_or(StageError::NoCommand("build"))?;
        self.runner.run(&command).await?;

        let entry = self.plan.build_path.join(ENTRY_DOCUMENT);
        if !tokio::fs::try_exists(&entry).await.unwrap_or(false) {
            return Err(StageError::MissingEntryDocument { path: entry });
        }
        Ok(())
    }

    /// Returns the staging bucket templates are uploaded through.
    async fn bootstrap_account(&self) -> StageResult<String> {
        let identity = self.runner.capture(&self.aws.caller_identity()).await?;
        let account = parse_caller_account(&identity)?;
        if account != self.config.account {
            return Err(StageError::AccountMismatch {
                expected: self.config.account.clone(),
                found: account,
            });
        }

        let current = self.describe(&self.plan.toolkit_stack_name).await?;
        match calculate_bootstrap_plan(current.as_ref(), self.config) {
            BootstrapPlan::AlreadyBootstrapped { staging_bucket, .. } => {
                tracing::info!(bucket = %staging_bucket, "account already bootstrapped");
                Ok(staging_bucket)
            }
            BootstrapPlan::Deploy { stack_name } => {
                if !self.silent {
                    aprintln!("  {}", p_y(&format!("+ Deploying {stack_name}")));
                }
                let path = write_template(self.out_dir, &stack_name, &self.synthesized.toolkit)?;
                self.runner
                    .run(&self.aws.deploy_stack(&stack_name, &path, None, self.config))
                    .await?;

                let outputs = self
                    .describe(&stack_name)
                    .await?
                    .ok_or_else(|| ResponseError::StackMissing(stack_name.clone()))?;
                Ok(outputs.require(STAGING_BUCKET_OUTPUT)?.to_string())
            }
        }
    }

    async fn apply_stack(&self, staging_bucket: &str) -> StageResult<StackOutputs> {
        let stack_name = &self.synthesized.stack_name;
        let path = write_template(self.out_dir, stack_name, &self.synthesized.stack)?;
        self.runner
            .run(&self.aws.deploy_stack(stack_name, &path, Some(staging_bucket), self.config))
            .await?;

        let json = self.runner.capture(&self.aws.describe_stack(stack_name)).await?;
        Ok(StackOutputs::parse(stack_name, &json)?)
    }

    async fn publish_assets(&self, outputs: &StackOutputs) -> StageResult<()> {
        let bucket = outputs.bucket_name()?;
        let distribution = outputs.distribution_id()?;

        self.runner
            .run(&self.aws.sync_assets(&self.plan.build_path, bucket, self.plan.prune))
            .await?;
        self.runner.run(&self.aws.invalidate(distribution)).await?;
        Ok(())
    }

    fn report_outputs(&self, outputs: &StackOutputs) {
        if self.silent {
            return;
        }
        aprintln!();
        aprintln!("{}", p_c("Stack outputs:"));
        for line in outputs.format_lines() {
            aprintln!("  {}", line);
        }
    }

    /// `None` when the stack does not exist.
    async fn describe(&self, stack_name: &str) -> StageResult<Option<StackOutputs>> {
        let command: CommandSpec = self.aws.describe_stack(stack_name);
        match self.runner.capture(&command).await {
            Ok(json) => Ok(Some(StackOutputs::parse(stack_name, &json)?)),
            Err(RunnerError::NonZeroExit { ref stderr, .. }) if stderr.contains("does not exist") => {
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn stage_span(stage: Stage) -> tracing::Span {
    tracing::info_span!("stage", name = %stage)
}
