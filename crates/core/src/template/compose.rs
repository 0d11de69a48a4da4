//! Environment configuration -> declared resource graph (Functional Core).

use serde_json::{json, Value};

use super::dns::{self, ALIAS_RECORD_TYPES};
use super::distribution::{self, DistributionWiring};
use super::error::{ComposeError, Result};
use super::ids;
use super::model::{get_att, ref_to, sub, StackTemplate};
use super::naming;
use super::{api, bucket, waf};
use crate::config::{self, CertificateArn, EnvironmentConfig};

/// Value of the `ManagedBy` tag on every resource.
pub const MANAGED_BY: &str = "spadeploy";

/// CloudFront reads certificates and CLOUDFRONT-scope web ACLs from this region only.
pub const CLOUDFRONT_REGION: &str = "us-east-1";

/// Output keys surfaced after a deploy.
pub mod outputs {
    pub const BUCKET_NAME: &str = "WebsiteBucketName";
    pub const DISTRIBUTION_ID: &str = "CloudFrontDistributionId";
    pub const DISTRIBUTION_DOMAIN: &str = "CloudFrontDomainName";
    pub const WEBSITE_URL: &str = "WebsiteUrl";
    pub const WEB_ACL_ID: &str = "WebACLId";
    pub const API_ENDPOINT: &str = "ApiEndpoint";
}

pub(crate) fn standard_tags(config: &EnvironmentConfig) -> Value {
    json!([
        { "Key": "Environment", "Value": config.environment.as_str() },
        { "Key": "Project", "Value": config.project },
        { "Key": "ManagedBy", "Value": MANAGED_BY }
    ])
}

/// Field validation plus the cross-field rules only composition knows about.
pub(crate) fn validated(config: &EnvironmentConfig) -> Result<()> {
    config::validate(config)?;

    if let Some(domain) = &config.domain {
        let Some(arn) = &config.certificate_arn else {
            return Err(ComposeError::CustomDomainWithoutCertificate {
                domain: domain.clone(),
            });
        };
        let certificate = CertificateArn::parse(arn)?;
        if certificate.account != config.account {
            return Err(ComposeError::CertificateAccountMismatch {
                expected: config.account.clone(),
                found: certificate.account.to_string(),
            });
        }
        if certificate.region != CLOUDFRONT_REGION {
            return Err(ComposeError::CertificateRegion {
                found: certificate.region.to_string(),
            });
        }
    }

    match (&config.hosted_zone_id, &config.hosted_zone_name) {
        (None, None) => {}
        (Some(_), Some(zone)) => {
            let Some(domain) = &config.domain else {
                return Err(ComposeError::HostedZoneWithoutDomain);
            };
            if !dns::domain_in_zone(domain, zone) {
                return Err(ComposeError::DomainOutsideHostedZone {
                    domain: domain.clone(),
                    zone: zone.clone(),
                });
            }
        }
        _ => return Err(ComposeError::IncompleteHostedZone),
    }

    if config.waf.enabled && config.region != CLOUDFRONT_REGION {
        return Err(ComposeError::WafRequiresUsEast1 {
            region: config.region.clone(),
        });
    }

    Ok(())
}

/// Declares the hosting stack for one environment.
///
/// Pure and deterministic: the same configuration always yields the same
/// template, so reapplying an unchanged configuration submits identical bytes.
pub fn compose_stack(config: &EnvironmentConfig) -> Result<StackTemplate> {
    validated(config)?;

    let wiring = DistributionWiring {
        web_acl: config.waf.enabled,
        api: config.api.enabled,
        access_logs: config.cloudfront.enable_logging,
    };

    let mut template = StackTemplate::new(format!(
        "Static site hosting for {} ({})",
        config.project, config.environment
    ));

    template.add(ids::WEBSITE_BUCKET, bucket::website_bucket(config))?;
    template.add(ids::WEBSITE_BUCKET_POLICY, bucket::website_bucket_policy())?;
    template.add(
        ids::ORIGIN_ACCESS_IDENTITY,
        distribution::origin_access_identity(config),
    )?;
    template.add(
        ids::SPA_ROUTING_FUNCTION,
        distribution::spa_routing_function(config),
    )?;
    template.add(
        ids::DISTRIBUTION,
        distribution::distribution(config, wiring),
    )?;

    if wiring.access_logs {
        template.add(ids::LOGS_BUCKET, bucket::logs_bucket(config))?;
    }

    if wiring.web_acl {
        template.add(ids::WEB_ACL, waf::web_acl(config))?;
    }

    if wiring.api {
        template.add(ids::API_FUNCTION_ROLE, api::function_role(config))?;
        template.add(ids::API_FUNCTION_LOG_GROUP, api::function_log_group(config))?;
        template.add(ids::API_FUNCTION, api::function(config))?;
        template.add(ids::HTTP_API, api::http_api(config))?;
        template.add(ids::API_INVOKE_PERMISSION, api::invoke_permission())?;
    }

    if let (Some(zone_id), Some(domain)) = (&config.hosted_zone_id, &config.domain) {
        for (logical_id, record_type) in ALIAS_RECORD_TYPES {
            template.add(logical_id, dns::alias_record(zone_id, domain, record_type))?;
        }
    }

    declare_outputs(&mut template, config);

    Ok(template)
}

fn declare_outputs(template: &mut StackTemplate, config: &EnvironmentConfig) {
    template.output(
        outputs::BUCKET_NAME,
        "S3 Bucket Name for Website Assets",
        ref_to(ids::WEBSITE_BUCKET),
    );
    template.output(
        outputs::DISTRIBUTION_ID,
        "CloudFront Distribution ID",
        ref_to(ids::DISTRIBUTION),
    );
    template.output(
        outputs::DISTRIBUTION_DOMAIN,
        "CloudFront Distribution Domain Name",
        get_att(ids::DISTRIBUTION, "DomainName"),
    );

    let website_url = match &config.domain {
        Some(domain) => json!(format!("https://{domain}")),
        None => sub(&format!("https://${{{}.DomainName}}", ids::DISTRIBUTION)),
    };
    template.output(outputs::WEBSITE_URL, "Website URL", website_url);

    if template.has_resource(ids::WEB_ACL) {
        template.output(
            outputs::WEB_ACL_ID,
            "WAF Web ACL ID",
            get_att(ids::WEB_ACL, "Id"),
        );
    }

    if template.has_resource(ids::HTTP_API) {
        template.output(
            outputs::API_ENDPOINT,
            "HTTP API endpoint",
            get_att(ids::HTTP_API, "ApiEndpoint"),
        );
    }
}

/// Stack name plus template, the unit the apply tool works on.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedStack {
    pub stack_name: String,
    pub template: StackTemplate,
}

/// Composes the hosting stack together with its name.
pub fn compose(config: &EnvironmentConfig) -> Result<ComposedStack> {
    Ok(ComposedStack {
        stack_name: naming::stack_name(config),
        template: compose_stack(config)?,
    })
}
