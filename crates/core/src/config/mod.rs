//! Environment configuration: one validated record per deployment target.

mod error;
mod types;
mod update;
mod validation;

pub use error::{ConfigError, Result};
pub use types::{
    ApiConfig, BucketConfig, CloudFrontConfig, EnvironmentConfig, EnvironmentName,
    FrontendConfig, PriceClass, WafConfig, DEFAULT_PROJECT,
};
pub use update::{apply_update, render_document, ConfigUpdate};
pub use validation::{
    validate, validate_account, validate_hostname, validate_region, CertificateArn,
    LAMBDA_MEMORY_RANGE, LAMBDA_TIMEOUT_RANGE, MAX_PROJECT_LEN,
};

use std::path::Path;

/// Parses the contents of `<dir>/<expected>.json`.
///
/// Missing required fields, wrong types and unknown enum values are reported
/// as [`ConfigError::Malformed`]. The record must name the environment it was
/// loaded for. Field values are not validated here; see [`validate`].
pub fn parse(path: &Path, contents: &str, expected: EnvironmentName) -> Result<EnvironmentConfig> {
    let config: EnvironmentConfig =
        serde_json::from_str(contents).map_err(|e| ConfigError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    if config.environment != expected {
        return Err(ConfigError::EnvironmentMismatch {
            expected: expected.to_string(),
            found: config.environment.to_string(),
        });
    }

    Ok(config)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_parse_minimal_record_applies_defaults() {
        let config = dev_config();
        assert_eq!(config.environment, EnvironmentName::Dev);
        assert_eq!(config.account, "210987654321");
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.cloudfront.price_class, PriceClass::PriceClass100);
        assert!(!config.cloudfront.enable_logging);
        assert!(!config.api.enabled);
        assert!(!config.waf.enabled);
        assert_eq!(config.domain, None);
        assert_eq!(config.noncurrent_version_expiration_days(), 30);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let first = parse(Path::new("dev.json"), DEV_JSON, EnvironmentName::Dev).unwrap();
        let second = parse(Path::new("dev.json"), DEV_JSON, EnvironmentName::Dev).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_missing_account_is_malformed() {
        let json = r#"{
            "environment": "dev",
            "region": "us-east-1",
            "cloudfront": { "priceClass": "PriceClass_100" }
        }"#;
        let result = parse(Path::new("dev.json"), json, EnvironmentName::Dev);
        match result {
            Err(ConfigError::Malformed { reason, .. }) => assert!(reason.contains("account")),
            other => panic!("expected malformed error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_wrong_type_is_malformed() {
        let json = r#"{
            "environment": "dev",
            "account": 210987654321,
            "region": "us-east-1",
            "cloudfront": { "priceClass": "PriceClass_100" }
        }"#;
        let result = parse(Path::new("dev.json"), json, EnvironmentName::Dev);
        assert!(matches!(result, Err(ConfigError::Malformed { .. })));
    }

    #[test]
    fn test_parse_unknown_price_class_is_malformed() {
        let json = DEV_JSON.replace("PriceClass_100", "PriceClass_Cheap");
        let result = parse(Path::new("dev.json"), &json, EnvironmentName::Dev);
        assert!(matches!(result, Err(ConfigError::Malformed { .. })));
    }

    #[test]
    fn test_parse_rejects_other_environment() {
        let result = parse(Path::new("prod.json"), DEV_JSON, EnvironmentName::Prod);
        assert_eq!(
            result,
            Err(ConfigError::EnvironmentMismatch {
                expected: "prod".to_string(),
                found: "dev".to_string(),
            })
        );
    }

    #[test]
    fn test_prod_expiration_default() {
        assert_eq!(prod_config().noncurrent_version_expiration_days(), 90);
    }

    #[test]
    fn test_with_region_overrides() {
        let config = dev_config().with_region("eu-west-1");
        assert_eq!(config.region, "eu-west-1");
    }
}
