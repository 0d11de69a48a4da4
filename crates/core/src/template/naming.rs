//! Names derived from a configuration. Every physical name in the stack comes from here.

use crate::config::EnvironmentConfig;

/// `material-dashboard` -> `MaterialDashboard`.
pub fn pascal_case(slug: &str) -> String {
    slug.split(|c: char| c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Stack name for the environment, e.g. `MaterialDashboard-Dev`.
pub fn stack_name(config: &EnvironmentConfig) -> String {
    format!(
        "{}-{}",
        pascal_case(&config.project),
        pascal_case(config.environment.as_str())
    )
}

/// Bootstrap stack shared by every environment in one account/region.
pub fn toolkit_stack_name(config: &EnvironmentConfig) -> String {
    format!("{}Toolkit", pascal_case(&config.project))
}

pub fn website_bucket_name(config: &EnvironmentConfig) -> String {
    format!(
        "{}-{}-{}",
        config.project, config.environment, config.account
    )
}

pub fn logs_bucket_name(config: &EnvironmentConfig) -> String {
    format!("{}-logs", website_bucket_name(config))
}

pub fn staging_bucket_name(config: &EnvironmentConfig) -> String {
    format!(
        "{}-toolkit-{}-{}",
        config.project, config.account, config.region
    )
}

/// Lowercase resource name prefix for named resources (functions, ACLs).
pub fn resource_prefix(config: &EnvironmentConfig) -> String {
    format!("{}-{}", config.project, config.environment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_support::{dev_config, prod_config};

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("material-dashboard"), "MaterialDashboard");
        assert_eq!(pascal_case("dev"), "Dev");
        assert_eq!(pascal_case("a--b"), "AB");
        assert_eq!(pascal_case(""), "");
    }

    #[test]
    fn test_stack_names() {
        assert_eq!(stack_name(&dev_config()), "MaterialDashboard-Dev");
        assert_eq!(stack_name(&prod_config()), "MaterialDashboard-Prod");
        assert_eq!(toolkit_stack_name(&dev_config()), "MaterialDashboardToolkit");
    }

    #[test]
    fn test_bucket_names() {
        let config = dev_config();
        assert_eq!(
            website_bucket_name(&config),
            "material-dashboard-dev-210987654321"
        );
        assert_eq!(
            logs_bucket_name(&config),
            "material-dashboard-dev-210987654321-logs"
        );
        assert_eq!(
            staging_bucket_name(&config),
            "material-dashboard-toolkit-210987654321-us-east-1"
        );
    }

    #[test]
    fn test_bucket_names_fit_s3_limit() {
        let mut config = prod_config();
        config.project = "a".repeat(crate::config::MAX_PROJECT_LEN);
        config.region = "ap-southeast-4".to_string();
        assert!(logs_bucket_name(&config).len() <= 63);
        assert!(staging_bucket_name(&config).len() <= 63);
    }
}
