//! Planning for removing a disposable environment.
//!
//! Versioned buckets cannot be deleted while any version or delete marker
//! remains, so teardown empties them before deleting the stack.

use serde::{Deserialize, Serialize};

use super::error::{ResponseError, Result};
use crate::config::{EnvironmentConfig, EnvironmentName};
use crate::template::naming;

/// Upper bound of keys in one `delete-objects` request.
pub const MAX_DELETE_BATCH: usize = 1000;

/// One object version or delete marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectVersion {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListObjectVersionsResponse {
    #[serde(default)]
    versions: Vec<ObjectVersion>,
    #[serde(default)]
    delete_markers: Vec<ObjectVersion>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct DeleteBatch<'a> {
    objects: &'a [ObjectVersion],
    quiet: bool,
}

/// Only dev stacks are torn down; prod buckets are retained on deletion.
pub fn can_tear_down(environment: EnvironmentName) -> bool {
    !environment.is_production()
}

/// Buckets the stack owns, in the order they are emptied.
pub fn owned_buckets(config: &EnvironmentConfig) -> Vec<String> {
    let mut buckets = vec![naming::website_bucket_name(config)];
    if config.cloudfront.enable_logging {
        buckets.push(naming::logs_bucket_name(config));
    }
    buckets
}

/// Reads `aws s3api list-object-versions --output json`. Versions come before
/// delete markers; blank output means the bucket is empty.
pub fn parse_object_versions(json: &str) -> Result<Vec<ObjectVersion>> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }

    let response: ListObjectVersionsResponse =
        serde_json::from_str(json).map_err(|e| ResponseError::Unreadable {
            what: "list-object-versions",
            reason: e.to_string(),
        })?;

    let mut objects = response.versions;
    objects.extend(response.delete_markers);
    Ok(objects)
}

/// The `--delete` document for one `delete-objects` call.
pub fn delete_batch(objects: &[ObjectVersion]) -> Result<String> {
    let batch = &objects[..objects.len().min(MAX_DELETE_BATCH)];
    serde_json::to_string(&DeleteBatch {
        objects: batch,
        quiet: true,
    })
    .map_err(|e| ResponseError::Unreadable {
        what: "delete-objects",
        reason: e.to_string(),
    })
}

/// Pure function: what a teardown removes, for display.
pub fn format_teardown_plan(stack_name: &str, buckets: &[String]) -> Vec<String> {
    let mut lines: Vec<String> = buckets
        .iter()
        .map(|bucket| format!("- Empty bucket {bucket} (every version)"))
        .collect();
    lines.push(format!("- Delete stack {stack_name}"));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_support::{dev_config, prod_config};

    #[test]
    fn test_only_dev_is_disposable() {
        assert!(can_tear_down(EnvironmentName::Dev));
        assert!(!can_tear_down(EnvironmentName::Prod));
    }

    #[test]
    fn test_owned_buckets_include_logs_when_enabled() {
        let mut config = dev_config();
        assert_eq!(
            owned_buckets(&config),
            vec!["material-dashboard-dev-210987654321"]
        );

        config.cloudfront.enable_logging = true;
        assert_eq!(owned_buckets(&config).len(), 2);
        assert!(owned_buckets(&prod_config())[0].contains("-prod-"));
    }

    #[test]
    fn test_parse_versions_and_delete_markers() {
        let json = r#"{
            "Versions": [
                { "Key": "index.html", "VersionId": "v2", "IsLatest": true, "Size": 512 },
                { "Key": "index.html", "VersionId": "v1", "IsLatest": false, "Size": 498 }
            ],
            "DeleteMarkers": [
                { "Key": "old.js", "VersionId": "m1", "IsLatest": true }
            ]
        }"#;
        let objects = parse_object_versions(json).unwrap();
        assert_eq!(objects.len(), 3);
        assert_eq!(objects[2].key, "old.js");
        assert_eq!(objects[0].version_id.as_deref(), Some("v2"));
    }

    #[test]
    fn test_empty_listing() {
        assert!(parse_object_versions("").unwrap().is_empty());
        assert!(parse_object_versions("{}").unwrap().is_empty());
        assert!(parse_object_versions("[").is_err());
    }

    #[test]
    fn test_delete_batch_document() {
        let objects = vec![
            ObjectVersion {
                key: "index.html".to_string(),
                version_id: Some("v1".to_string()),
            },
            ObjectVersion {
                key: "robots.txt".to_string(),
                version_id: None,
            },
        ];
        assert_eq!(
            delete_batch(&objects).unwrap(),
            r#"{"Objects":[{"Key":"index.html","VersionId":"v1"},{"Key":"robots.txt"}],"Quiet":true}"#
        );
    }

    #[test]
    fn test_delete_batch_is_capped() {
        let objects: Vec<ObjectVersion> = (0..MAX_DELETE_BATCH + 5)
            .map(|i| ObjectVersion {
                key: format!("asset-{i}.js"),
                version_id: None,
            })
            .collect();
        let batch: serde_json::Value =
            serde_json::from_str(&delete_batch(&objects).unwrap()).unwrap();
        assert_eq!(
            batch["Objects"].as_array().map(Vec::len),
            Some(MAX_DELETE_BATCH)
        );
    }

    #[test]
    fn test_plan_lines() {
        let lines = format_teardown_plan("MaterialDashboard-Dev", &["site".to_string()]);
        assert_eq!(
            lines,
            vec![
                "- Empty bucket site (every version)",
                "- Delete stack MaterialDashboard-Dev",
            ]
        );
    }
}
