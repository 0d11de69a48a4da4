//! Parsing of `aws` CLI JSON responses into stack outputs and identities.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::error::{ResponseError, Result};
use crate::template::outputs as keys;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeStacksResponse {
    #[serde(default)]
    stacks: Vec<StackDescription>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StackDescription {
    stack_name: String,
    #[serde(default)]
    stack_status: String,
    #[serde(default)]
    outputs: Vec<RawOutput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawOutput {
    output_key: String,
    output_value: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CallerIdentity {
    account: String,
}

/// One named output of an applied stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackOutput {
    pub value: String,
    pub description: Option<String>,
}

/// Outputs of an applied stack, ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackOutputs {
    pub stack_name: String,
    pub status: String,
    pub entries: BTreeMap<String, StackOutput>,
}

impl StackOutputs {
    /// Parses `aws cloudformation describe-stacks --output json`.
    pub fn parse(stack_name: &str, json: &str) -> Result<Self> {
        let response: DescribeStacksResponse =
            serde_json::from_str(json).map_err(|e| ResponseError::Unreadable {
                what: "describe-stacks",
                reason: e.to_string(),
            })?;

        let stack = response
            .stacks
            .into_iter()
            .find(|s| s.stack_name == stack_name)
            .ok_or_else(|| ResponseError::StackMissing(stack_name.to_string()))?;

        let entries = stack
            .outputs
            .into_iter()
            .map(|o| {
                (
                    o.output_key,
                    StackOutput {
                        value: o.output_value,
                        description: o.description,
                    },
                )
            })
            .collect();

        Ok(Self {
            stack_name: stack.stack_name,
            status: stack.stack_status,
            entries,
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|o| o.value.as_str())
    }

    /// Looks up an output the deploy cannot continue without.
    pub fn require(&self, key: &'static str) -> Result<&str> {
        self.get(key).ok_or(ResponseError::OutputMissing(key))
    }

    pub fn bucket_name(&self) -> Result<&str> {
        self.require(keys::BUCKET_NAME)
    }

    pub fn distribution_id(&self) -> Result<&str> {
        self.require(keys::DISTRIBUTION_ID)
    }

    pub fn website_url(&self) -> Option<&str> {
        self.get(keys::WEBSITE_URL)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `Key: Value` lines, one per output.
    pub fn format_lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(key, output)| format!("{key}: {}", output.value))
            .collect()
    }
}

/// Extracts the account id from `aws sts get-caller-identity --output json`.
pub fn parse_caller_account(json: &str) -> Result<String> {
    let identity: CallerIdentity =
        serde_json::from_str(json).map_err(|e| ResponseError::Unreadable {
            what: "get-caller-identity",
            reason: e.to_string(),
        })?;
    Ok(identity.account)
}
