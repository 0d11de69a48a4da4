//! Errors raised while composing a stack (pure - no I/O variants).

use thiserror::Error;

use crate::config::ConfigError;

/// Result type alias for the template module.
pub type Result<T> = std::result::Result<T, ComposeError>;

/// Errors that stop composition before anything is sent to the cloud provider.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ComposeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Custom domain '{domain}' requires 'certificateArn'")]
    CustomDomainWithoutCertificate { domain: String },

    #[error("Certificate belongs to account {found}, but the stack deploys to {expected}")]
    CertificateAccountMismatch { expected: String, found: String },

    #[error("Certificate lives in {found}; CloudFront only reads certificates from us-east-1")]
    CertificateRegion { found: String },

    #[error("'hostedZoneId' and 'hostedZoneName' must be set together")]
    IncompleteHostedZone,

    #[error("A hosted zone is configured but no 'domain' is set")]
    HostedZoneWithoutDomain,

    #[error("Domain '{domain}' is not inside hosted zone '{zone}'")]
    DomainOutsideHostedZone { domain: String, zone: String },

    #[error("WAF web ACLs for CloudFront must be deployed to us-east-1, not {region}")]
    WafRequiresUsEast1 { region: String },

    #[error("Logical id '{0}' declared twice")]
    DuplicateLogicalId(String),

    #[error("Template serialization failed: {0}")]
    Serialization(String),
}
