//! `deploy update-config`: fill account details into the configuration records.

use std::path::Path;

use serde_json::Value;
use spadeploy_core::config::{self, ConfigError, ConfigUpdate, EnvironmentName};
use thiserror::Error;

use crate::loader::config_path;
use crate::prelude::*;

/// Result type alias for the update_config module.
pub type Result<T> = std::result::Result<T, UpdateError>;

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Could not determine the AWS account id ({0}); pass it with --account-id")]
    AccountDetection(String),

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Update the configuration files with AWS account details.
#[derive(Debug, clap::Args)]
pub struct UpdateConfigCommand {
    /// AWS account id (detected from the active credentials when omitted)
    #[arg(long, value_name = "ID")]
    pub account_id: Option<String>,

    /// Custom domain for the dev environment
    #[arg(long)]
    pub dev_domain: Option<String>,

    /// ACM certificate ARN for the dev domain
    #[arg(long)]
    pub dev_certificate: Option<String>,

    /// Custom domain for the prod environment
    #[arg(long)]
    pub prod_domain: Option<String>,

    /// ACM certificate ARN for the prod domain
    #[arg(long)]
    pub prod_certificate: Option<String>,
}

impl UpdateConfigCommand {
    fn update_for(&self, environment: EnvironmentName, account: &str) -> ConfigUpdate {
        let (domain, certificate_arn) = match environment {
            EnvironmentName::Dev => (&self.dev_domain, &self.dev_certificate),
            EnvironmentName::Prod => (&self.prod_domain, &self.prod_certificate),
        };
        ConfigUpdate {
            account: Some(account.to_string()),
            domain: domain.clone(),
            certificate_arn: certificate_arn.clone(),
        }
    }
}

/// Asks STS who the active credentials belong to.
pub async fn detect_account_id() -> Result<String> {
    let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .load()
        .await;
    let client = aws_sdk_sts::Client::new(&sdk_config);

    let response = client
        .get_caller_identity()
        .send()
        .await
        .map_err(|e| UpdateError::AccountDetection(e.to_string()))?;

    response
        .account()
        .map(str::to_string)
        .ok_or_else(|| UpdateError::AccountDetection("no account in response".to_string()))
}

/// Rewrites one record in place. `None` when the file does not exist.
pub fn update_file(path: &Path, update: &ConfigUpdate) -> Result<Option<Vec<&'static str>>> {
    let io_error = |source| UpdateError::Io {
        path: path.display().to_string(),
        source,
    };

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_error(e)),
    };

    let mut document: Value =
        serde_json::from_str(&contents).map_err(|e| ConfigError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let changed = config::apply_update(path, &mut document, update)?;
    if !changed.is_empty() {
        std::fs::write(path, config::render_document(&document)).map_err(io_error)?;
    }

    Ok(Some(changed))
}

pub async fn run(cmd: UpdateConfigCommand, config_dir: &Path, global: &crate::Global) -> Result<()> {
    let account = match &cmd.account_id {
        Some(account) => account.clone(),
        None => detect_account_id().await?,
    };
    config::validate_account(&account)?;

    if !global.is_silent() {
        aprintln!("{} {}", p_b("Using AWS account:"), account);
    }

    for environment in EnvironmentName::ALL {
        let path = config_path(config_dir, environment);
        let changed = update_file(&path, &cmd.update_for(environment, &account))?;

        if global.is_silent() {
            continue;
        }
        match changed {
            None => aprintln!("{} {} (not found)", p_y("Skipped"), path.display()),
            Some(keys) if keys.is_empty() => {
                aprintln!("{} {} is up to date", p_g("="), path.display())
            }
            Some(keys) => aprintln!(
                "{} {} ({})",
                p_g("Updated"),
                path.display(),
                keys.join(", ")
            ),
        }
    }

    if !global.is_silent() {
        aprintln!();
        aprintln!("{}", p_c("Next steps:"));
        aprintln!("  1. Review the configuration files in {}", config_dir.display());
        aprintln!("  2. Set domain names and certificate ARNs if needed");
        aprintln!("  3. Run: deploy dev");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEV: &str = r#"{
  "environment": "dev",
  "account": "YOUR_ACCOUNT_ID",
  "region": "us-east-1",
  "cloudfront": {
    "priceClass": "PriceClass_100"
  },
  "owner": "web-team"
}
"#;

    fn update(account: &str) -> ConfigUpdate {
        ConfigUpdate {
            account: Some(account.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_update_file_rewrites_account_and_keeps_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dev.json");
        std::fs::write(&path, DEV).unwrap();

        let changed = update_file(&path, &update("210987654321")).unwrap();
        assert_eq!(changed, Some(vec!["account"]));

        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["account"], "210987654321");
        assert_eq!(written["owner"], "web-team");
        assert_eq!(written["cloudfront"]["priceClass"], "PriceClass_100");
    }

    #[test]
    fn test_update_file_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dev.json");
        std::fs::write(&path, DEV).unwrap();

        update_file(&path, &update("210987654321")).unwrap();
        let first = std::fs::read_to_string(&path).unwrap();
        let changed = update_file(&path, &update("210987654321")).unwrap();
        let second = std::fs::read_to_string(&path).unwrap();

        assert_eq!(changed, Some(vec![]));
        assert_eq!(first, second);
        assert!(first.ends_with("}\n"));
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let result = update_file(&dir.path().join("prod.json"), &update("210987654321")).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn test_malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dev.json");
        std::fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(
            update_file(&path, &update("210987654321")),
            Err(UpdateError::Config(ConfigError::Malformed { .. }))
        ));
    }

    #[tokio::test]
    async fn test_run_with_explicit_account() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("dev.json"), DEV).unwrap();
        let cmd = UpdateConfigCommand {
            account_id: Some("210987654321".to_string()),
            dev_domain: Some("dev.example.com".to_string()),
            dev_certificate: None,
            prod_domain: None,
            prod_certificate: None,
        };
        let global = crate::Global {
            silent: true,
            verbose: false,
            config_dir: dir.path().to_path_buf(),
            out_dir: dir.path().to_path_buf(),
        };

        run(cmd, dir.path(), &global).await.unwrap();

        let written: Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("dev.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(written["domain"], "dev.example.com");
        assert!(written.get("certificateArn").is_none());
        assert!(!dir.path().join("prod.json").exists());
    }

    #[tokio::test]
    async fn test_run_rejects_placeholder_account() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = UpdateConfigCommand {
            account_id: Some("123456789012".to_string()),
            dev_domain: None,
            dev_certificate: None,
            prod_domain: None,
            prod_certificate: None,
        };
        let global = crate::Global {
            silent: true,
            verbose: false,
            config_dir: dir.path().to_path_buf(),
            out_dir: dir.path().to_path_buf(),
        };
        assert!(matches!(
            run(cmd, dir.path(), &global).await,
            Err(UpdateError::Config(ConfigError::Placeholder { .. }))
        ));
    }
}
