//! Field-level validation of an environment configuration (pure functions).

use super::error::{ConfigError, Result};
use super::types::EnvironmentConfig;

/// Account ids that ship in templates and documentation.
const PLACEHOLDER_ACCOUNTS: &[&str] = &["123456789012", "000000000000", "111111111111"];

/// Longest project slug that still keeps every derived bucket name under 63 characters.
pub const MAX_PROJECT_LEN: usize = 24;

/// Lambda memory bounds in MB.
pub const LAMBDA_MEMORY_RANGE: std::ops::RangeInclusive<u32> = 128..=10_240;

/// Lambda timeout bounds in seconds.
pub const LAMBDA_TIMEOUT_RANGE: std::ops::RangeInclusive<u32> = 1..=900;

/// Smallest rate limit a WAF rate-based rule accepts.
pub const MIN_WAF_RATE_LIMIT: u64 = 100;

/// Retention periods accepted by CloudWatch Logs.
pub const LOG_RETENTION_DAYS: &[u32] = &[
    1, 3, 5, 7, 14, 30, 60, 90, 120, 150, 180, 365, 400, 545, 731, 1096, 1827, 2192, 2557, 2922,
    3288, 3653,
];

/// Validates every field of the record in isolation.
///
/// Cross-field rules (domain and certificate, WAF and region) are checked by
/// stack composition.
pub fn validate(config: &EnvironmentConfig) -> Result<()> {
    validate_account(&config.account)?;
    validate_region(&config.region)?;
    validate_project(&config.project)?;

    if let Some(domain) = &config.domain {
        validate_hostname("domain", domain)?;
    }
    if let Some(zone) = &config.hosted_zone_name {
        validate_hostname("hostedZoneName", zone.trim_end_matches('.'))?;
    }
    if let Some(zone_id) = &config.hosted_zone_id {
        if zone_id.trim().is_empty() {
            return Err(ConfigError::invalid("hostedZoneId", "must not be empty"));
        }
    }
    if let Some(arn) = &config.certificate_arn {
        CertificateArn::parse(arn)?;
    }

    if config.noncurrent_version_expiration_days() == 0 {
        return Err(ConfigError::invalid(
            "bucket.noncurrentVersionExpirationDays",
            "must be positive",
        ));
    }

    validate_api(config)?;

    if config.waf.enabled && config.waf.rate_limit < MIN_WAF_RATE_LIMIT {
        return Err(ConfigError::invalid(
            "waf.rateLimit",
            format!("must be at least {MIN_WAF_RATE_LIMIT}"),
        ));
    }

    if config.frontend.install_command.split_whitespace().next().is_none() {
        return Err(ConfigError::invalid(
            "frontend.installCommand",
            "must not be empty",
        ));
    }
    if config.frontend.build_command.split_whitespace().next().is_none() {
        return Err(ConfigError::invalid(
            "frontend.buildCommand",
            "must not be empty",
        ));
    }

    Ok(())
}

/// Validates an AWS account id, rejecting placeholders.
pub fn validate_account(account: &str) -> Result<()> {
    if account.trim().is_empty() {
        return Err(ConfigError::invalid("account", "is required"));
    }
    if account.trim() != account {
        return Err(ConfigError::invalid(
            "account",
            "must not have leading or trailing whitespace",
        ));
    }

    let upper = account.to_ascii_uppercase();
    if upper.contains("YOUR") || upper.contains("ACCOUNT") || upper.contains('X') {
        return Err(ConfigError::Placeholder { field: "account" });
    }
    if PLACEHOLDER_ACCOUNTS.contains(&account) {
        return Err(ConfigError::Placeholder { field: "account" });
    }

    if account.len() != 12 || !account.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConfigError::invalid(
            "account",
            format!("'{account}' is not a 12-digit account id"),
        ));
    }

    Ok(())
}

/// Validates the shape of a region identifier such as `us-east-1` or `us-gov-west-1`.
pub fn validate_region(region: &str) -> Result<()> {
    if region.trim().is_empty() {
        return Err(ConfigError::invalid("region", "is required"));
    }

    let parts: Vec<&str> = region.split('-').collect();
    let well_formed = match parts.as_slice() {
        [area, direction, number] => {
            is_area(area) && is_lower_alpha(direction) && is_number(number)
        }
        [area, "gov", direction, number] => {
            is_area(area) && is_lower_alpha(direction) && is_number(number)
        }
        _ => false,
    };

    if !well_formed {
        return Err(ConfigError::invalid(
            "region",
            format!("'{region}' is not a valid region identifier"),
        ));
    }

    Ok(())
}

fn is_area(part: &str) -> bool {
    part.len() == 2 && is_lower_alpha(part)
}

fn is_lower_alpha(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_lowercase())
}

fn is_number(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
}

fn validate_project(project: &str) -> Result<()> {
    if project.is_empty() || project.len() > MAX_PROJECT_LEN {
        return Err(ConfigError::invalid(
            "project",
            format!("must be 1 to {MAX_PROJECT_LEN} characters"),
        ));
    }
    let slug = project
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
    if !slug || project.starts_with('-') || project.ends_with('-') {
        return Err(ConfigError::invalid(
            "project",
            "must be lowercase letters, digits and inner hyphens",
        ));
    }
    Ok(())
}

/// Validates a DNS hostname (at least two labels, each 1-63 characters).
pub fn validate_hostname(field: &'static str, name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 253 {
        return Err(ConfigError::invalid(field, "must be 1 to 253 characters"));
    }

    let labels: Vec<&str> = name.split('.').collect();
    if labels.len() < 2 {
        return Err(ConfigError::invalid(
            field,
            format!("'{name}' is not a fully qualified name"),
        ));
    }

    for label in labels {
        let ok = !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-');
        if !ok {
            return Err(ConfigError::invalid(
                field,
                format!("'{name}' contains an invalid label '{label}'"),
            ));
        }
    }

    Ok(())
}

fn validate_api(config: &EnvironmentConfig) -> Result<()> {
    let api = &config.api;
    if !api.enabled {
        return Ok(());
    }

    if !LAMBDA_MEMORY_RANGE.contains(&api.memory_size) {
        return Err(ConfigError::invalid(
            "api.memorySize",
            format!(
                "{} MB is outside {}..={} MB",
                api.memory_size,
                LAMBDA_MEMORY_RANGE.start(),
                LAMBDA_MEMORY_RANGE.end()
            ),
        ));
    }
    if !LAMBDA_TIMEOUT_RANGE.contains(&api.timeout) {
        return Err(ConfigError::invalid(
            "api.timeout",
            format!(
                "{}s is outside {}..={}s",
                api.timeout,
                LAMBDA_TIMEOUT_RANGE.start(),
                LAMBDA_TIMEOUT_RANGE.end()
            ),
        ));
    }
    if api.runtime.trim().is_empty() {
        return Err(ConfigError::invalid("api.runtime", "must not be empty"));
    }
    if api.handler.trim().is_empty() {
        return Err(ConfigError::invalid("api.handler", "must not be empty"));
    }
    if api.code_bucket.trim().is_empty() {
        return Err(ConfigError::invalid(
            "api.codeBucket",
            "is required when the API is enabled",
        ));
    }
    if api.code_key.trim().is_empty() {
        return Err(ConfigError::invalid(
            "api.codeKey",
            "is required when the API is enabled",
        ));
    }
    if !LOG_RETENTION_DAYS.contains(&api.log_retention_days) {
        return Err(ConfigError::invalid(
            "api.logRetentionDays",
            format!(
                "{} is not a CloudWatch Logs retention period",
                api.log_retention_days
            ),
        ));
    }

    Ok(())
}

/// The parts of an ACM certificate ARN that placement checks need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateArn<'a> {
    pub partition: &'a str,
    pub region: &'a str,
    pub account: &'a str,
    pub certificate_id: &'a str,
}

impl<'a> CertificateArn<'a> {
    /// Parses `arn:<partition>:acm:<region>:<account>:certificate/<id>`.
    pub fn parse(arn: &'a str) -> Result<Self> {
        let invalid = || {
            ConfigError::invalid(
                "certificateArn",
                format!("'{arn}' is not an ACM certificate ARN"),
            )
        };

        let mut parts = arn.splitn(6, ':');
        let (Some("arn"), Some(partition), Some("acm"), Some(region), Some(account), Some(resource)) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return Err(invalid());
        };

        let certificate_id = resource
            .strip_prefix("certificate/")
            .filter(|id| !id.is_empty())
            .ok_or_else(invalid)?;

        if partition.is_empty() || region.is_empty() || account.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            partition,
            region,
            account,
            certificate_id,
        })
    }
}
