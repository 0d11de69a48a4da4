//! Pure functions for planning a deploy (Functional Core).

use std::path::{Path, PathBuf};

use super::outputs::StackOutputs;
use super::stage::Stage;
use crate::config::EnvironmentConfig;
use crate::template::{naming, STAGING_BUCKET_OUTPUT};

/// What the account-bootstrapped stage has to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapPlan {
    /// Toolkit stack is missing and will be deployed.
    Deploy { stack_name: String },
    /// Toolkit stack exists; its staging bucket is reused.
    AlreadyBootstrapped {
        stack_name: String,
        staging_bucket: String,
    },
}

/// Pure function: decide whether bootstrap is needed from the toolkit stack's
/// current outputs (`None` when the stack does not exist).
pub fn calculate_bootstrap_plan(
    current: Option<&StackOutputs>,
    config: &EnvironmentConfig,
) -> BootstrapPlan {
    let stack_name = naming::toolkit_stack_name(config);
    match current.and_then(|outputs| outputs.get(STAGING_BUCKET_OUTPUT)) {
        Some(bucket) => BootstrapPlan::AlreadyBootstrapped {
            stack_name,
            staging_bucket: bucket.to_string(),
        },
        None => BootstrapPlan::Deploy { stack_name },
    }
}

/// Everything a deploy run touches, derived from configuration alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployPlan {
    pub environment: String,
    pub account: String,
    pub region: String,
    pub stack_name: String,
    pub toolkit_stack_name: String,
    pub template_path: PathBuf,
    pub toolkit_template_path: PathBuf,
    pub build_path: PathBuf,
    pub skip_install: bool,
    pub prune: bool,
}

impl DeployPlan {
    pub fn new(config: &EnvironmentConfig, out_dir: &Path, skip_install: bool) -> Self {
        let stack_name = naming::stack_name(config);
        let toolkit_stack_name = naming::toolkit_stack_name(config);
        Self {
            environment: config.environment.to_string(),
            account: config.account.clone(),
            region: config.region.clone(),
            template_path: template_path(out_dir, &stack_name),
            toolkit_template_path: template_path(out_dir, &toolkit_stack_name),
            stack_name,
            toolkit_stack_name,
            build_path: config.frontend.build_path(),
            skip_install,
            prune: config.frontend.prune,
        }
    }

    /// Stages that run a command, in order.
    pub fn active_stages(&self) -> Vec<Stage> {
        Stage::ALL
            .into_iter()
            .filter(|stage| *stage != Stage::Start)
            .filter(|stage| !(self.skip_install && *stage == Stage::DependenciesInstalled))
            .collect()
    }
}

/// `<out-dir>/<stack>.template.json`
pub fn template_path(out_dir: &Path, stack_name: &str) -> PathBuf {
    out_dir.join(format!("{stack_name}.template.json"))
}

/// Pure function: format a deploy plan for display.
pub fn format_deploy_plan(plan: &DeployPlan) -> Vec<String> {
    let mut lines = vec![
        format!("= Environment: {}", plan.environment),
        format!("= Account: {} ({})", plan.account, plan.region),
        format!("~ Stack: {}", plan.stack_name),
        format!("  Template: {}", plan.template_path.display()),
    ];
    for stage in plan.active_stages() {
        lines.push(format!("+ {}", stage.activity()));
    }
    if plan.skip_install {
        lines.push(format!("= Skipping: {}", Stage::DependenciesInstalled.activity()));
    }
    if plan.prune {
        lines.push(format!(
            "- Remote objects missing from {} will be deleted",
            plan.build_path.display()
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_support::dev_config;

    fn toolkit_outputs(bucket: Option<&str>) -> StackOutputs {
        let outputs = match bucket {
            Some(bucket) => format!(
                r#"[{{ "OutputKey": "StagingBucketName", "OutputValue": "{bucket}" }}]"#
            ),
            None => "[]".to_string(),
        };
        let json = format!(
            r#"{{ "Stacks": [{{ "StackName": "MaterialDashboardToolkit", "Outputs": {outputs} }}] }}"#
        );
        StackOutputs::parse("MaterialDashboardToolkit", &json).unwrap()
    }

    #[test]
    fn test_bootstrap_needed_without_toolkit() {
        assert_eq!(
            calculate_bootstrap_plan(None, &dev_config()),
            BootstrapPlan::Deploy {
                stack_name: "MaterialDashboardToolkit".to_string(),
            }
        );
    }

    #[test]
    fn test_bootstrap_reuses_existing_staging_bucket() {
        let outputs = toolkit_outputs(Some("staging-bucket"));
        assert_eq!(
            calculate_bootstrap_plan(Some(&outputs), &dev_config()),
            BootstrapPlan::AlreadyBootstrapped {
                stack_name: "MaterialDashboardToolkit".to_string(),
                staging_bucket: "staging-bucket".to_string(),
            }
        );
    }

    #[test]
    fn test_toolkit_without_output_is_redeployed() {
        let outputs = toolkit_outputs(None);
        assert!(matches!(
            calculate_bootstrap_plan(Some(&outputs), &dev_config()),
            BootstrapPlan::Deploy { .. }
        ));
    }

    #[test]
    fn test_plan_paths() {
        let plan = DeployPlan::new(&dev_config(), Path::new("infra.out"), false);
        assert_eq!(
            plan.template_path,
            PathBuf::from("infra.out/MaterialDashboard-Dev.template.json")
        );
        assert_eq!(
            plan.toolkit_template_path,
            PathBuf::from("infra.out/MaterialDashboardToolkit.template.json")
        );
        assert_eq!(plan.build_path, PathBuf::from("./build"));
    }

    #[test]
    fn test_skip_install_drops_stage() {
        let full = DeployPlan::new(&dev_config(), Path::new("out"), false);
        assert_eq!(full.active_stages().len(), 6);
        assert_eq!(full.active_stages()[0], Stage::DependenciesInstalled);

        let skipped = DeployPlan::new(&dev_config(), Path::new("out"), true);
        assert_eq!(skipped.active_stages()[0], Stage::FrontendBuilt);
        assert!(format_deploy_plan(&skipped)
            .iter()
            .any(|line| line.starts_with("= Skipping")));
    }

    #[test]
    fn test_format_mentions_prune() {
        let mut config = dev_config();
        config.frontend.prune = true;
        let lines = format_deploy_plan(&DeployPlan::new(&config, Path::new("out"), false));
        assert!(lines.iter().any(|line| line.starts_with('-')));
        assert_eq!(lines[2], "~ Stack: MaterialDashboard-Dev");
    }
}
