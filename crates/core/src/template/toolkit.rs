//! Bootstrap stack: the staging bucket the apply tool uploads templates to.

use serde_json::json;

use super::compose::{standard_tags, validated};
use super::error::Result;
use super::ids;
use super::model::{ref_to, DeletionPolicy, Resource, StackTemplate};
use super::naming;
use crate::config::EnvironmentConfig;

/// Output key holding the staging bucket name.
pub const STAGING_BUCKET_OUTPUT: &str = "StagingBucketName";

pub fn compose_toolkit(config: &EnvironmentConfig) -> Result<StackTemplate> {
    validated(config)?;

    let mut template = StackTemplate::new(format!(
        "Bootstrap resources for {} deployments",
        config.project
    ));

    template.add(
        ids::STAGING_BUCKET,
        Resource::new(
            "AWS::S3::Bucket",
            json!({
                "BucketName": naming::staging_bucket_name(config),
                "PublicAccessBlockConfiguration": {
                    "BlockPublicAcls": true,
                    "BlockPublicPolicy": true,
                    "IgnorePublicAcls": true,
                    "RestrictPublicBuckets": true
                },
                "BucketEncryption": {
                    "ServerSideEncryptionConfiguration": [
                        { "ServerSideEncryptionByDefault": { "SSEAlgorithm": "AES256" } }
                    ]
                },
                "LifecycleConfiguration": {
                    "Rules": [{
                        "Id": "ExpireStagedTemplates",
                        "Status": "Enabled",
                        "ExpirationInDays": 30
                    }]
                },
                "Tags": standard_tags(config)
            }),
        )
        .with_policy(DeletionPolicy::Retain),
    )?;

    template.output(
        STAGING_BUCKET_OUTPUT,
        "Bucket used to stage templates",
        ref_to(ids::STAGING_BUCKET),
    );

    Ok(template)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_support::dev_config;
    use crate::template::ComposeError;

    #[test]
    fn test_toolkit_declares_only_staging_bucket() {
        let template = compose_toolkit(&dev_config()).unwrap();
        assert_eq!(template.resources.len(), 1);
        let bucket = template.resource(ids::STAGING_BUCKET).unwrap();
        assert_eq!(
            bucket.property("/BucketName"),
            Some(&json!("material-dashboard-toolkit-210987654321-us-east-1"))
        );
        assert!(template.outputs.contains_key(STAGING_BUCKET_OUTPUT));
    }

    #[test]
    fn test_toolkit_validates_config() {
        let mut config = dev_config();
        config.region = String::new();
        assert!(matches!(
            compose_toolkit(&config),
            Err(ComposeError::Config(_))
        ));
    }
}
