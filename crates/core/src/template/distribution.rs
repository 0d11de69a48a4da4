//! Content delivery: origin access identity, SPA routing function and the distribution.

use serde_json::{json, Map, Value};

use super::compose::standard_tags;
use super::ids;
use super::model::{get_att, sub, Resource};
use super::naming;
use crate::config::EnvironmentConfig;

/// The single-page entry document.
pub const ENTRY_DOCUMENT: &str = "index.html";

// Managed policy ids, see
// https://docs.aws.amazon.com/AmazonCloudFront/latest/DeveloperGuide/using-managed-cache-policies.html
pub const CACHING_OPTIMIZED: &str = "658327ea-f89d-4fab-a63d-7e88639e58f6";
pub const CACHING_DISABLED: &str = "4135ea2d-6df8-44a3-9df3-4b5a84be39ad";
pub const CORS_S3_ORIGIN: &str = "88a5eaf4-2fd4-4709-b370-b4c650ea3fcf";
pub const ALL_VIEWER_EXCEPT_HOST_HEADER: &str = "b689b0a8-53d0-40ab-baf2-68738e2966ac";
pub const SECURITY_HEADERS: &str = "67f7725c-6f97-4210-82d7-5512b31e9d03";

/// Viewer-request rewrite that maps client-side routes onto `index.html`.
pub const SPA_ROUTING_CODE: &str = r#"function handler(event) {
    var request = event.request;
    var uri = request.uri;

    if (uri.endsWith('/')) {
        request.uri += 'index.html';
    } else if (!uri.includes('.')) {
        request.uri += '/index.html';
    }

    return request;
}
"#;

const WEBSITE_ORIGIN_ID: &str = "WebsiteOrigin";
const API_ORIGIN_ID: &str = "ApiOrigin";

/// Which optional pieces the distribution is wired to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DistributionWiring {
    pub web_acl: bool,
    pub api: bool,
    pub access_logs: bool,
}

pub fn origin_access_identity(config: &EnvironmentConfig) -> Resource {
    Resource::new(
        "AWS::CloudFront::CloudFrontOriginAccessIdentity",
        json!({
            "CloudFrontOriginAccessIdentityConfig": {
                "Comment": format!("OAI for {} environment", config.environment)
            }
        }),
    )
}

pub fn spa_routing_function(config: &EnvironmentConfig) -> Resource {
    Resource::new(
        "AWS::CloudFront::Function",
        json!({
            "Name": format!("{}-spa-routing", naming::resource_prefix(config)),
            "AutoPublish": true,
            "FunctionConfig": {
                "Comment": "Rewrite client-side routes to the entry document",
                "Runtime": "cloudfront-js-2.0"
            },
            "FunctionCode": SPA_ROUTING_CODE
        }),
    )
}

fn not_found_to_entry_document(status: u16) -> Value {
    json!({
        "ErrorCode": status,
        "ResponseCode": 200,
        "ResponsePagePath": format!("/{ENTRY_DOCUMENT}")
    })
}

fn default_behavior() -> Value {
    json!({
        "TargetOriginId": WEBSITE_ORIGIN_ID,
        "ViewerProtocolPolicy": "redirect-to-https",
        "AllowedMethods": ["GET", "HEAD", "OPTIONS"],
        "CachedMethods": ["GET", "HEAD"],
        "Compress": true,
        "CachePolicyId": CACHING_OPTIMIZED,
        "OriginRequestPolicyId": CORS_S3_ORIGIN,
        "ResponseHeadersPolicyId": SECURITY_HEADERS,
        "FunctionAssociations": [{
            "EventType": "viewer-request",
            "FunctionARN": get_att(ids::SPA_ROUTING_FUNCTION, "FunctionARN")
        }]
    })
}

fn api_behavior() -> Value {
    json!({
        "PathPattern": "/api/*",
        "TargetOriginId": API_ORIGIN_ID,
        "ViewerProtocolPolicy": "https-only",
        "AllowedMethods": ["GET", "HEAD", "OPTIONS", "PUT", "PATCH", "POST", "DELETE"],
        "CachedMethods": ["GET", "HEAD"],
        "Compress": true,
        "CachePolicyId": CACHING_DISABLED,
        "OriginRequestPolicyId": ALL_VIEWER_EXCEPT_HOST_HEADER
    })
}

fn origins(wiring: DistributionWiring) -> Value {
    let mut origins = vec![json!({
        "Id": WEBSITE_ORIGIN_ID,
        "DomainName": get_att(ids::WEBSITE_BUCKET, "RegionalDomainName"),
        "S3OriginConfig": {
            "OriginAccessIdentity": sub(&format!(
                "origin-access-identity/cloudfront/${{{}}}",
                ids::ORIGIN_ACCESS_IDENTITY
            ))
        }
    })];

    if wiring.api {
        origins.push(json!({
            "Id": API_ORIGIN_ID,
            "DomainName": sub(&format!(
                "${{{}}}.execute-api.${{AWS::Region}}.amazonaws.com",
                ids::HTTP_API
            )),
            "CustomOriginConfig": {
                "OriginProtocolPolicy": "https-only",
                "OriginSSLProtocols": ["TLSv1.2"]
            }
        }));
    }

    Value::Array(origins)
}

/// The distribution in front of the website bucket.
///
/// Certificate placement has already been checked by composition; here a
/// domain simply implies aliases plus a viewer certificate.
pub fn distribution(config: &EnvironmentConfig, wiring: DistributionWiring) -> Resource {
    let mut fields = Map::new();
    fields.insert("Enabled".to_string(), json!(true));
    fields.insert(
        "Comment".to_string(),
        json!(format!("{} ({})", naming::stack_name(config), config.environment)),
    );
    fields.insert("DefaultRootObject".to_string(), json!(ENTRY_DOCUMENT));
    fields.insert("HttpVersion".to_string(), json!("http2and3"));
    fields.insert("IPV6Enabled".to_string(), json!(true));
    fields.insert(
        "PriceClass".to_string(),
        json!(config.cloudfront.price_class.as_str()),
    );
    fields.insert("Origins".to_string(), origins(wiring));
    fields.insert("DefaultCacheBehavior".to_string(), default_behavior());
    fields.insert(
        "CustomErrorResponses".to_string(),
        json!([
            not_found_to_entry_document(403),
            not_found_to_entry_document(404)
        ]),
    );

    if wiring.api {
        fields.insert("CacheBehaviors".to_string(), json!([api_behavior()]));
    }

    if let (Some(domain), Some(certificate_arn)) = (&config.domain, &config.certificate_arn) {
        fields.insert("Aliases".to_string(), json!([domain]));
        fields.insert(
            "ViewerCertificate".to_string(),
            json!({
                "AcmCertificateArn": certificate_arn,
                "SslSupportMethod": "sni-only",
                "MinimumProtocolVersion": "TLSv1.2_2021"
            }),
        );
    }

    if wiring.web_acl {
        fields.insert("WebACLId".to_string(), get_att(ids::WEB_ACL, "Arn"));
    }

    if wiring.access_logs {
        fields.insert(
            "Logging".to_string(),
            json!({
                "Bucket": get_att(ids::LOGS_BUCKET, "DomainName"),
                "IncludeCookies": false,
                "Prefix": "cloudfront/"
            }),
        );
    }

    Resource::new(
        "AWS::CloudFront::Distribution",
        json!({
            "DistributionConfig": Value::Object(fields),
            "Tags": standard_tags(config)
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_support::dev_config;
    use crate::config::PriceClass;

    #[test]
    fn test_not_found_responses_serve_entry_document() {
        let resource = distribution(&dev_config(), DistributionWiring::default());
        let errors = resource
            .property("/DistributionConfig/CustomErrorResponses")
            .and_then(Value::as_array)
            .unwrap();

        let codes: Vec<u64> = errors
            .iter()
            .map(|e| e["ErrorCode"].as_u64().unwrap())
            .collect();
        assert_eq!(codes, vec![403, 404]);
        for error in errors {
            assert_eq!(error["ResponseCode"], 200);
            assert_eq!(error["ResponsePagePath"], "/index.html");
        }
        assert_eq!(
            resource.property("/DistributionConfig/DefaultRootObject"),
            Some(&json!("index.html"))
        );
    }

    #[test]
    fn test_default_behavior_uses_routing_function() {
        let resource = distribution(&dev_config(), DistributionWiring::default());
        let association = resource
            .property("/DistributionConfig/DefaultCacheBehavior/FunctionAssociations/0")
            .unwrap();
        assert_eq!(association["EventType"], "viewer-request");
        assert_eq!(
            association["FunctionARN"],
            get_att(ids::SPA_ROUTING_FUNCTION, "FunctionARN")
        );
        assert_eq!(
            resource.property("/DistributionConfig/DefaultCacheBehavior/ViewerProtocolPolicy"),
            Some(&json!("redirect-to-https"))
        );
    }

    #[test]
    fn test_origin_reads_through_identity() {
        let resource = distribution(&dev_config(), DistributionWiring::default());
        let origin = resource.property("/DistributionConfig/Origins/0").unwrap();
        assert_eq!(
            origin["S3OriginConfig"]["OriginAccessIdentity"],
            sub("origin-access-identity/cloudfront/${OriginAccessIdentity}")
        );
        assert_eq!(
            resource
                .property("/DistributionConfig/Origins")
                .and_then(Value::as_array)
                .map(Vec::len),
            Some(1)
        );
    }

    #[test]
    fn test_price_class_from_config() {
        let mut config = dev_config();
        config.cloudfront.price_class = PriceClass::PriceClass200;
        let resource = distribution(&config, DistributionWiring::default());
        assert_eq!(
            resource.property("/DistributionConfig/PriceClass"),
            Some(&json!("PriceClass_200"))
        );
    }

    #[test]
    fn test_optional_wiring() {
        let resource = distribution(
            &dev_config(),
            DistributionWiring {
                web_acl: true,
                api: true,
                access_logs: true,
            },
        );
        assert_eq!(
            resource.property("/DistributionConfig/WebACLId"),
            Some(&get_att(ids::WEB_ACL, "Arn"))
        );
        assert_eq!(
            resource.property("/DistributionConfig/CacheBehaviors/0/PathPattern"),
            Some(&json!("/api/*"))
        );
        assert_eq!(
            resource.property("/DistributionConfig/Origins/1/Id"),
            Some(&json!("ApiOrigin"))
        );
        assert_eq!(
            resource.property("/DistributionConfig/Logging/Prefix"),
            Some(&json!("cloudfront/"))
        );
    }

    #[test]
    fn test_custom_domain_sets_aliases_and_certificate() {
        let mut config = dev_config();
        config.domain = Some("dev.example.com".to_string());
        config.certificate_arn =
            Some("arn:aws:acm:us-east-1:210987654321:certificate/abc".to_string());
        let resource = distribution(&config, DistributionWiring::default());
        assert_eq!(
            resource.property("/DistributionConfig/Aliases"),
            Some(&json!(["dev.example.com"]))
        );
        assert_eq!(
            resource.property("/DistributionConfig/ViewerCertificate/SslSupportMethod"),
            Some(&json!("sni-only"))
        );
    }

    #[test]
    fn test_routing_function_rewrites_extensionless_paths() {
        assert!(SPA_ROUTING_CODE.contains("request.uri += '/index.html'"));
        let function = spa_routing_function(&dev_config());
        assert_eq!(
            function.property("/Name"),
            Some(&json!("material-dashboard-dev-spa-routing"))
        );
        assert_eq!(function.property("/AutoPublish"), Some(&json!(true)));
    }
}
