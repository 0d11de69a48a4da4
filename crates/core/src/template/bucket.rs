//! Storage resources: the website bucket, its policy and the access-log bucket.

use serde_json::{json, Value};

use super::compose::standard_tags;
use super::ids;
use super::model::{get_att, sub, DeletionPolicy, Resource};
use super::naming;
use crate::config::{EnvironmentConfig, EnvironmentName};

/// Dev buckets are disposable; prod buckets survive stack deletion.
pub fn removal_policy(environment: EnvironmentName) -> DeletionPolicy {
    match environment {
        EnvironmentName::Dev => DeletionPolicy::Delete,
        EnvironmentName::Prod => DeletionPolicy::Retain,
    }
}

fn block_all_public_access() -> Value {
    json!({
        "BlockPublicAcls": true,
        "BlockPublicPolicy": true,
        "IgnorePublicAcls": true,
        "RestrictPublicBuckets": true
    })
}

fn s3_managed_encryption() -> Value {
    json!({
        "ServerSideEncryptionConfiguration": [
            { "ServerSideEncryptionByDefault": { "SSEAlgorithm": "AES256" } }
        ]
    })
}

/// The private bucket holding the built frontend.
pub fn website_bucket(config: &EnvironmentConfig) -> Resource {
    Resource::new(
        "AWS::S3::Bucket",
        json!({
            "BucketName": naming::website_bucket_name(config),
            "VersioningConfiguration": { "Status": "Enabled" },
            "PublicAccessBlockConfiguration": block_all_public_access(),
            "BucketEncryption": s3_managed_encryption(),
            "CorsConfiguration": {
                "CorsRules": [{
                    "AllowedMethods": ["GET", "HEAD"],
                    "AllowedOrigins": ["*"],
                    "AllowedHeaders": ["*"],
                    "MaxAge": 3000
                }]
            },
            "LifecycleConfiguration": {
                "Rules": [{
                    "Id": "DeleteOldVersions",
                    "Status": "Enabled",
                    "NoncurrentVersionExpiration": {
                        "NoncurrentDays": config.noncurrent_version_expiration_days()
                    }
                }]
            },
            "Tags": standard_tags(config)
        }),
    )
    .with_policy(removal_policy(config.environment))
}

/// Read access for the origin access identity only, and no plaintext transport.
pub fn website_bucket_policy() -> Resource {
    let bucket_arn = get_att(ids::WEBSITE_BUCKET, "Arn");
    let objects_arn = sub(&format!("${{{}.Arn}}/*", ids::WEBSITE_BUCKET));

    Resource::new(
        "AWS::S3::BucketPolicy",
        json!({
            "Bucket": { "Ref": ids::WEBSITE_BUCKET },
            "PolicyDocument": {
                "Version": "2012-10-17",
                "Statement": [
                    {
                        "Sid": "DenyInsecureTransport",
                        "Effect": "Deny",
                        "Principal": { "AWS": "*" },
                        "Action": "s3:*",
                        "Resource": [bucket_arn.clone(), objects_arn.clone()],
                        "Condition": { "Bool": { "aws:SecureTransport": "false" } }
                    },
                    {
                        "Sid": "AllowOriginAccessIdentityRead",
                        "Effect": "Allow",
                        "Principal": {
                            "CanonicalUser": get_att(ids::ORIGIN_ACCESS_IDENTITY, "S3CanonicalUserId")
                        },
                        "Action": ["s3:GetObject", "s3:ListBucket"],
                        "Resource": [bucket_arn, objects_arn]
                    }
                ]
            }
        }),
    )
}

/// Destination for CloudFront standard access logs.
pub fn logs_bucket(config: &EnvironmentConfig) -> Resource {
    Resource::new(
        "AWS::S3::Bucket",
        json!({
            "BucketName": naming::logs_bucket_name(config),
            "PublicAccessBlockConfiguration": block_all_public_access(),
            "BucketEncryption": s3_managed_encryption(),
            // CloudFront writes logs through ACLs.
            "OwnershipControls": {
                "Rules": [{ "ObjectOwnership": "BucketOwnerPreferred" }]
            },
            "LifecycleConfiguration": {
                "Rules": [{
                    "Id": "ExpireAccessLogs",
                    "Status": "Enabled",
                    "ExpirationInDays": 90
                }]
            },
            "Tags": standard_tags(config)
        }),
    )
    .with_policy(removal_policy(config.environment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_support::{dev_config, prod_config};

    #[test]
    fn test_website_bucket_blocks_public_access() {
        let bucket = website_bucket(&dev_config());
        let block = bucket.property("/PublicAccessBlockConfiguration").unwrap();
        for key in [
            "BlockPublicAcls",
            "BlockPublicPolicy",
            "IgnorePublicAcls",
            "RestrictPublicBuckets",
        ] {
            assert_eq!(block[key], true, "{key}");
        }
        assert!(bucket.property("/WebsiteConfiguration").is_none());
    }

    #[test]
    fn test_removal_policy_by_environment() {
        assert_eq!(
            website_bucket(&dev_config()).deletion_policy,
            Some(DeletionPolicy::Delete)
        );
        assert_eq!(
            website_bucket(&prod_config()).deletion_policy,
            Some(DeletionPolicy::Retain)
        );
    }

    #[test]
    fn test_noncurrent_expiration_follows_environment() {
        let days = |config: &EnvironmentConfig| {
            website_bucket(config)
                .property("/LifecycleConfiguration/Rules/0/NoncurrentVersionExpiration/NoncurrentDays")
                .cloned()
        };
        assert_eq!(days(&dev_config()), Some(json!(30)));
        assert_eq!(days(&prod_config()), Some(json!(90)));
    }

    #[test]
    fn test_policy_never_allows_anonymous_principal() {
        let policy = website_bucket_policy();
        let statements = policy
            .property("/PolicyDocument/Statement")
            .and_then(Value::as_array)
            .unwrap();

        for statement in statements {
            if statement["Effect"] == "Allow" {
                assert!(statement["Principal"].get("CanonicalUser").is_some());
                assert_ne!(statement["Principal"], json!("*"));
                assert_ne!(statement["Principal"], json!({ "AWS": "*" }));
            }
        }
    }

    #[test]
    fn test_logs_bucket_allows_acl_delivery() {
        let bucket = logs_bucket(&dev_config());
        assert_eq!(
            bucket.property("/OwnershipControls/Rules/0/ObjectOwnership"),
            Some(&json!("BucketOwnerPreferred"))
        );
    }
}
