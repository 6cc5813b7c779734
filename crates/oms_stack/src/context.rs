use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthError};

pub const MAX_STACK_ID_LEN: usize = 128;
pub const ACCOUNT_ID_LEN: usize = 12;

/// Optional stack-level properties carried into the template and manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StackProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// Target account/region plus the logical stack identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeploymentContext {
    pub account: String,
    #[serde(default)]
    pub region: Option<String>,
    pub stack_id: String,
    #[serde(default)]
    pub props: StackProps,
}

/// Environment string for an account and optional region; a missing region
/// renders as `unknown-region`.
pub fn aws_environment(account: &str, region: Option<&str>) -> String {
    format!("aws://{account}/{}", region.unwrap_or("unknown-region"))
}

impl DeploymentContext {
    pub fn new(account: impl Into<String>, stack_id: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            region: None,
            stack_id: stack_id.into(),
            props: StackProps::default(),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_props(mut self, props: StackProps) -> Self {
        self.props = props;
        self
    }

    /// `aws://<account>/<region>` as written to the cloud assembly manifest.
    pub fn environment(&self) -> String {
        aws_environment(&self.account, self.region.as_deref())
    }

    pub fn validate(&self) -> Result<()> {
        if self.account.len() != ACCOUNT_ID_LEN
            || !self.account.bytes().all(|byte| byte.is_ascii_digit())
        {
            return Err(SynthError::InvalidContext(format!(
                "account '{}' must be {ACCOUNT_ID_LEN} digits",
                self.account
            )));
        }

        let stack_id = self.stack_id.as_str();
        if stack_id.is_empty() {
            return Err(SynthError::InvalidContext(
                "stack id cannot be empty".to_string(),
            ));
        }
        if stack_id.len() > MAX_STACK_ID_LEN {
            return Err(SynthError::InvalidContext(format!(
                "stack id exceeds {MAX_STACK_ID_LEN} characters"
            )));
        }
        let mut chars = stack_id.chars();
        let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
        if !starts_with_letter || !chars.all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(SynthError::InvalidContext(format!(
                "stack id '{stack_id}' must start with a letter and contain only letters, digits and hyphens"
            )));
        }

        if let Some(region) = &self.region {
            if region.is_empty()
                || !region
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
            {
                return Err(SynthError::InvalidContext(format!(
                    "region '{region}' is not a valid region name"
                )));
            }
        }

        Ok(())
    }
}
