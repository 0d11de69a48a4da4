//! Environment configuration types (pure data).

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Project slug used when a configuration does not name one.
pub const DEFAULT_PROJECT: &str = "static-site";

/// Deployment target. The set is fixed; each value selects one config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentName {
    Dev,
    Prod,
}

impl EnvironmentName {
    pub const ALL: [EnvironmentName; 2] = [EnvironmentName::Dev, EnvironmentName::Prod];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnvironmentName::Dev => "dev",
            EnvironmentName::Prod => "prod",
        }
    }

    /// File name of the configuration record for this environment.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.as_str())
    }

    pub fn is_production(&self) -> bool {
        matches!(self, EnvironmentName::Prod)
    }
}

impl fmt::Display for EnvironmentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnvironmentName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" => Ok(EnvironmentName::Dev),
            "prod" => Ok(EnvironmentName::Prod),
            other => Err(ConfigError::UnknownEnvironment(other.to_string())),
        }
    }
}

/// CloudFront price class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceClass {
    #[serde(rename = "PriceClass_100")]
    PriceClass100,
    #[serde(rename = "PriceClass_200")]
    PriceClass200,
    #[serde(rename = "PriceClass_All")]
    PriceClassAll,
}

impl PriceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceClass::PriceClass100 => "PriceClass_100",
            PriceClass::PriceClass200 => "PriceClass_200",
            PriceClass::PriceClassAll => "PriceClass_All",
        }
    }
}

/// Configuration record for one deployment target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentConfig {
    pub environment: EnvironmentName,
    pub account: String,
    pub region: String,
    #[serde(default = "default_project")]
    pub project: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosted_zone_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosted_zone_name: Option<String>,
    pub cloudfront: CloudFrontConfig,
    #[serde(default)]
    pub bucket: BucketConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub waf: WafConfig,
    #[serde(default)]
    pub frontend: FrontendConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudFrontConfig {
    pub price_class: PriceClass,
    #[serde(default)]
    pub enable_logging: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketConfig {
    /// Days before noncurrent object versions expire (dev: 30, prod: 90).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noncurrent_version_expiration_days: Option<u32>,
}

/// Optional HTTP API backed by a single Lambda function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub memory_size: u32,
    #[serde(default)]
    pub timeout: u32,
    #[serde(default = "default_runtime")]
    pub runtime: String,
    #[serde(default = "default_handler")]
    pub handler: String,
    #[serde(default)]
    pub code_bucket: String,
    #[serde(default)]
    pub code_key: String,
    #[serde(default = "default_log_retention")]
    pub log_retention_days: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            memory_size: 0,
            timeout: 0,
            runtime: default_runtime(),
            handler: default_handler(),
            code_bucket: String::new(),
            code_key: String::new(),
            log_retention_days: default_log_retention(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WafConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Requests per 5-minute window allowed from a single IP.
    #[serde(default = "default_rate_limit")]
    pub rate_limit: u64,
}

impl Default for WafConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            rate_limit: default_rate_limit(),
        }
    }
}

/// How the frontend bundle is installed, built and published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontendConfig {
    #[serde(default = "default_frontend_dir")]
    pub directory: PathBuf,
    #[serde(default = "default_build_dir")]
    pub build_directory: PathBuf,
    #[serde(default = "default_install_command")]
    pub install_command: String,
    #[serde(default = "default_build_command")]
    pub build_command: String,
    #[serde(default)]
    pub prune: bool,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            directory: default_frontend_dir(),
            build_directory: default_build_dir(),
            install_command: default_install_command(),
            build_command: default_build_command(),
            prune: false,
        }
    }
}

impl FrontendConfig {
    /// Build output directory, resolved against the frontend directory.
    pub fn build_path(&self) -> PathBuf {
        self.directory.join(&self.build_directory)
    }
}

impl EnvironmentConfig {
    /// Days before noncurrent versions expire, honouring the per-environment default.
    pub fn noncurrent_version_expiration_days(&self) -> u32 {
        self.bucket
            .noncurrent_version_expiration_days
            .unwrap_or(match self.environment {
                EnvironmentName::Dev => 30,
                EnvironmentName::Prod => 90,
            })
    }

    /// Returns a copy with the region replaced.
    pub fn with_region(mut self, region: &str) -> Self {
        self.region = region.to_string();
        self
    }
}

fn default_project() -> String {
    DEFAULT_PROJECT.to_string()
}

fn default_runtime() -> String {
    "provided.al2023".to_string()
}

fn default_handler() -> String {
    "bootstrap".to_string()
}

fn default_log_retention() -> u32 {
    14
}

fn default_rate_limit() -> u64 {
    2000
}

fn default_frontend_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_build_dir() -> PathBuf {
    PathBuf::from("build")
}

fn default_install_command() -> String {
    "npm ci".to_string()
}

fn default_build_command() -> String {
    "npm run build".to_string()
}
