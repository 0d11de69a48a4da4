//! In-place edits of a configuration document (pure transformation).
//!
//! Works on the raw JSON so keys this crate does not model survive a rewrite.

use std::path::Path;

use serde_json::Value;

use super::error::{ConfigError, Result};

/// Values to write into one environment's configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigUpdate {
    pub account: Option<String>,
    pub domain: Option<String>,
    pub certificate_arn: Option<String>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        self.account.is_none() && self.domain.is_none() && self.certificate_arn.is_none()
    }
}

/// Applies `update` to a parsed document, returning the keys that changed.
pub fn apply_update(
    path: &Path,
    document: &mut Value,
    update: &ConfigUpdate,
) -> Result<Vec<&'static str>> {
    let object = document
        .as_object_mut()
        .ok_or_else(|| ConfigError::Malformed {
            path: path.to_path_buf(),
            reason: "top-level value is not a JSON object".to_string(),
        })?;

    let mut changed = Vec::new();
    let fields = [
        ("account", &update.account),
        ("domain", &update.domain),
        ("certificateArn", &update.certificate_arn),
    ];

    for (key, value) in fields {
        let Some(value) = value else { continue };
        let new_value = Value::String(value.clone());
        if object.get(key) != Some(&new_value) {
            object.insert(key.to_string(), new_value);
            changed.push(key);
        }
    }

    Ok(changed)
}

/// Serializes a document the way config files are kept in the repository.
pub fn render_document(document: &Value) -> String {
    let mut rendered = serde_json::to_string_pretty(document).unwrap_or_else(|_| "{}".into());
    rendered.push('\n');
    rendered
}
