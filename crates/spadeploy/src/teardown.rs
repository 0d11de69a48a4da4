//! `deploy teardown`: empty the buckets of a dev stack and delete it.

use dialoguer::Confirm;
use spadeploy_core::config::EnvironmentConfig;
use spadeploy_core::deploy::{
    can_tear_down, delete_batch, format_teardown_plan, owned_buckets, parse_object_versions,
    AwsCli, ResponseError, MAX_DELETE_BATCH,
};
use spadeploy_core::template::naming;
use thiserror::Error;

use crate::prelude::*;
use crate::runner::{CommandRunner, RunnerError};

/// Result type alias for the teardown module.
pub type Result<T> = std::result::Result<T, TeardownError>;

#[derive(Debug, Error)]
pub enum TeardownError {
    #[error("{environment} buckets are retained on deletion; tear the stack down by hand")]
    Retained { environment: String },

    #[error("Bucket {bucket} still lists objects after a delete; giving up")]
    NoProgress { bucket: String },

    #[error(transparent)]
    Command(#[from] RunnerError),

    #[error(transparent)]
    Response(#[from] ResponseError),

    #[error("Teardown cancelled by user")]
    UserCancelled,

    #[error("Confirmation prompt failed: {0}")]
    Prompt(String),
}

/// Deletes every version and delete marker in `bucket`. A bucket that does
/// not exist counts as empty. Returns how many entries were removed.
pub async fn empty_bucket<R: CommandRunner>(runner: &R, aws: &AwsCli, bucket: &str) -> Result<usize> {
    let mut removed = 0;
    let mut previous: Option<usize> = None;

    loop {
        let listing = match runner.capture(&aws.list_object_versions(bucket)).await {
            Ok(json) => json,
            Err(RunnerError::NonZeroExit { ref stderr, .. }) if stderr.contains("NoSuchBucket") => {
                tracing::info!(bucket, "bucket already gone");
                return Ok(removed);
            }
            Err(err) => return Err(err.into()),
        };

        let objects = parse_object_versions(&listing)?;
        if objects.is_empty() {
            return Ok(removed);
        }
        if previous == Some(objects.len()) && objects.len() < MAX_DELETE_BATCH {
            return Err(TeardownError::NoProgress {
                bucket: bucket.to_string(),
            });
        }

        let batch = delete_batch(&objects)?;
        runner.capture(&aws.delete_objects(bucket, &batch)).await?;

        let deleted = objects.len().min(MAX_DELETE_BATCH);
        tracing::debug!(bucket, deleted, "deleted object versions");
        removed += deleted;
        previous = Some(objects.len());
    }
}

/// Empties the owned buckets, then deletes the stack and waits for it.
async fn tear_down<R: CommandRunner>(
    runner: &R,
    config: &EnvironmentConfig,
    global: &crate::Global,
) -> Result<()> {
    let aws = AwsCli::for_config(config);
    let stack_name = naming::stack_name(config);

    for bucket in owned_buckets(config) {
        let removed = empty_bucket(runner, &aws, &bucket).await?;
        if !global.is_silent() {
            aprintln!("  {} {} ({} entries)", p_r("- Emptied"), bucket, removed);
        }
    }

    runner.run(&aws.delete_stack(&stack_name)).await?;
    runner.run(&aws.wait_stack_deleted(&stack_name)).await?;
    tracing::info!(stack = %stack_name, "stack deleted");

    if !global.is_silent() {
        aprintln!("{} {}", p_g("Deleted"), stack_name);
    }
    Ok(())
}

/// Refuses prod, prints the plan, confirms unless `yes`, then tears down.
pub async fn run<R: CommandRunner>(
    runner: &R,
    config: &EnvironmentConfig,
    yes: bool,
    global: &crate::Global,
) -> Result<()> {
    if !can_tear_down(config.environment) {
        return Err(TeardownError::Retained {
            environment: config.environment.to_string(),
        });
    }

    let stack_name = naming::stack_name(config);
    if !global.is_silent() {
        aprintln!("{}", p_c("Teardown Plan:"));
        print_plan_lines(&format_teardown_plan(&stack_name, &owned_buckets(config)));
        aprintln!();
    }

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete {stack_name} and everything in its buckets?"))
            .default(false)
            .interact()
            .map_err(|e| TeardownError::Prompt(e.to_string()))?;
        if !confirmed {
            return Err(TeardownError::UserCancelled);
        }
    }

    tear_down(runner, config, global).await
}
