use std::time::Duration;

use oms_stack::stack::STREAM_NAME;

use crate::error::{GeneratorError, Result};

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_TABLE: &str = "Orders";
pub const DEFAULT_COUNT: usize = 200;
pub const DEFAULT_SLEEP_SECS: f64 = 0.01;
pub const PROGRESS_INTERVAL: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub region: String,
    pub bucket: String,
    pub table: String,
    pub stream: String,
    pub count: usize,
    pub sleep: Duration,
}

impl GeneratorConfig {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            bucket: bucket.into(),
            table: DEFAULT_TABLE.to_string(),
            stream: STREAM_NAME.to_string(),
            count: DEFAULT_COUNT,
            sleep: Duration::from_secs_f64(DEFAULT_SLEEP_SECS),
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("region", &self.region),
            ("bucket", &self.bucket),
            ("table", &self.table),
            ("stream", &self.stream),
        ] {
            if value.trim().is_empty() {
                return Err(GeneratorError::InvalidConfig(format!(
                    "{field} cannot be empty"
                )));
            }
        }
        if self.count == 0 {
            return Err(GeneratorError::InvalidConfig(
                "count must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}

/// Converts the CLI's fractional seconds into a pause between orders.
pub fn sleep_from_secs(seconds: f64) -> Result<Duration> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(GeneratorError::InvalidConfig(format!(
            "sleep must be a non-negative number of seconds, got {seconds}"
        )));
    }
    Ok(Duration::from_secs_f64(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_stack_stream() {
        let config = GeneratorConfig::new("data-bucket");
        assert_eq!(config.stream, "oms-events-stream");
        assert_eq!(config.table, "Orders");
        assert_eq!(config.count, 200);
        config.validate().expect("defaults should pass");
    }

    #[test]
    fn rejects_zero_count() {
        let config = GeneratorConfig {
            count: 0,
            ..GeneratorConfig::new("data-bucket")
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_blank_bucket() {
        let error = GeneratorConfig::new("  ")
            .validate()
            .expect_err("blank bucket should fail");
        assert_eq!(
            error.to_string(),
            "invalid generator configuration: bucket cannot be empty"
        );
    }

    #[test]
    fn sleep_rejects_negative_and_nan() {
        assert!(sleep_from_secs(-0.5).is_err());
        assert!(sleep_from_secs(f64::NAN).is_err());
        assert_eq!(
            sleep_from_secs(0.25).expect("sleep"),
            Duration::from_millis(250)
        );
    }
}
