//! Deploy planning: stages, command lines and response parsing.
//!
//! The binary owns every side effect; this module only decides what to run
//! and how to read what comes back.

mod commands;
mod error;
mod outputs;
mod plan;
mod stage;
mod teardown;

pub use commands::{build, install, AwsCli, CommandSpec};
pub use error::{ResponseError, Result};
pub use outputs::{parse_caller_account, StackOutput, StackOutputs};
pub use plan::{
    calculate_bootstrap_plan, format_deploy_plan, template_path, BootstrapPlan, DeployPlan,
};
pub use stage::Stage;
pub use teardown::{
    can_tear_down, delete_batch, format_teardown_plan, owned_buckets, parse_object_versions,
    ObjectVersion, MAX_DELETE_BATCH,
};
