//! Web ACL attached to the distribution.

use serde_json::{json, Value};

use super::compose::standard_tags;
use super::model::Resource;
use super::naming;
use crate::config::EnvironmentConfig;

fn visibility(metric_name: &str) -> Value {
    json!({
        "CloudWatchMetricsEnabled": true,
        "MetricName": metric_name,
        "SampledRequestsEnabled": true
    })
}

/// AWS common rule set plus a per-IP rate limit, allow by default.
pub fn web_acl(config: &EnvironmentConfig) -> Resource {
    Resource::new(
        "AWS::WAFv2::WebACL",
        json!({
            "Name": format!("{}-web-acl", naming::resource_prefix(config)),
            "Scope": "CLOUDFRONT",
            "DefaultAction": { "Allow": {} },
            "VisibilityConfig": visibility("WebACLMetric"),
            "Rules": [
                {
                    "Name": "AWSManagedRulesCommonRuleSet",
                    "Priority": 1,
                    "Statement": {
                        "ManagedRuleGroupStatement": {
                            "Name": "AWSManagedRulesCommonRuleSet",
                            "VendorName": "AWS"
                        }
                    },
                    "OverrideAction": { "None": {} },
                    "VisibilityConfig": visibility("AWSManagedRulesCommonRuleSetMetric")
                },
                {
                    "Name": "RateLimit",
                    "Priority": 2,
                    "Statement": {
                        "RateBasedStatement": {
                            "Limit": config.waf.rate_limit,
                            "AggregateKeyType": "IP"
                        }
                    },
                    "Action": { "Block": {} },
                    "VisibilityConfig": visibility("RateLimitMetric")
                }
            ],
            "Tags": standard_tags(config)
        }),
    )
}
