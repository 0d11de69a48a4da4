//! Alias records pointing the custom domain at the distribution.

use serde_json::json;

use super::ids;
use super::model::{get_att, Resource};

/// Hosted zone id of every CloudFront distribution, fixed by AWS.
pub const CLOUDFRONT_HOSTED_ZONE_ID: &str = "Z2FDTNDATAQYW2";

/// Record types published for the custom domain.
pub const ALIAS_RECORD_TYPES: [(&str, &str); 2] = [
    (ids::ALIAS_RECORD_A, "A"),
    (ids::ALIAS_RECORD_AAAA, "AAAA"),
];

pub fn alias_record(hosted_zone_id: &str, domain: &str, record_type: &str) -> Resource {
    Resource::new(
        "AWS::Route53::RecordSet",
        json!({
            "HostedZoneId": hosted_zone_id,
            "Name": format!("{}.", domain.trim_end_matches('.')),
            "Type": record_type,
            "AliasTarget": {
                "DNSName": get_att(ids::DISTRIBUTION, "DomainName"),
                "HostedZoneId": CLOUDFRONT_HOSTED_ZONE_ID,
                "EvaluateTargetHealth": false
            }
        }),
    )
}

/// `true` when `domain` is the zone apex or a name below it.
pub fn domain_in_zone(domain: &str, zone: &str) -> bool {
    let domain = domain.trim_end_matches('.').to_ascii_lowercase();
    let zone = zone.trim_end_matches('.').to_ascii_lowercase();
    domain == zone || domain.ends_with(&format!(".{zone}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_record_targets_distribution() {
        let record = alias_record("Z123", "dev.example.com", "AAAA");
        assert_eq!(record.property("/Name"), Some(&json!("dev.example.com.")));
        assert_eq!(record.property("/Type"), Some(&json!("AAAA")));
        assert_eq!(
            record.property("/AliasTarget/HostedZoneId"),
            Some(&json!(CLOUDFRONT_HOSTED_ZONE_ID))
        );
    }

    #[test]
    fn test_domain_in_zone() {
        assert!(domain_in_zone("dev.example.com", "example.com"));
        assert!(domain_in_zone("example.com", "example.com."));
        assert!(domain_in_zone("Dev.Example.com", "example.com"));
        assert!(!domain_in_zone("badexample.com", "example.com"));
        assert!(!domain_in_zone("dev.example.org", "example.com"));
    }
}
