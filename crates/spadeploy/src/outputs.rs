//! `deploy outputs`: print the outputs of an applied stack.

use spadeploy_core::config::EnvironmentConfig;
use spadeploy_core::deploy::{AwsCli, StackOutputs};
use spadeploy_core::template::naming;

use crate::prelude::*;
use crate::runner::CommandRunner;

pub async fn fetch<R: CommandRunner>(
    runner: &R,
    config: &EnvironmentConfig,
) -> anyhow::Result<StackOutputs> {
    let stack_name = naming::stack_name(config);
    let json = runner
        .capture(&AwsCli::for_config(config).describe_stack(&stack_name))
        .await?;
    Ok(StackOutputs::parse(&stack_name, &json)?)
}

pub async fn run<R: CommandRunner>(
    runner: &R,
    config: &EnvironmentConfig,
    global: &crate::Global,
) -> anyhow::Result<()> {
    let outputs = fetch(runner, config).await?;

    if !global.is_silent() {
        aprintln!("{} {} ({})", p_c("Stack:"), outputs.stack_name, outputs.status);
    }
    // Outputs go to stdout even when silent so they can be piped.
    for line in outputs.format_lines() {
        aprintln!("{}", line);
    }
    Ok(())
}
