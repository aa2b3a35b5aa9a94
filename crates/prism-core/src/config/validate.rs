//! Configuration validation with range and catalog checks.

use crate::catalog;
use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let generation = &self.generation;
        if catalog::find_model(&generation.default_model).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "generation.default_model '{}' is not a known model",
                generation.default_model
            )));
        }
        if catalog::find_size(&generation.default_size).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "generation.default_size '{}' is not a known size preset",
                generation.default_size
            )));
        }
        if generation.inference_steps == 0 {
            return Err(ConfigError::ValidationError(
                "generation.inference_steps must be > 0".into(),
            ));
        }
        if generation.parallel == 0 {
            return Err(ConfigError::ValidationError(
                "generation.parallel must be > 0".into(),
            ));
        }
        if generation.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "generation.timeout_ms must be > 0".into(),
            ));
        }
        if generation.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "generation.poll_interval_ms must be > 0".into(),
            ));
        }
        if self.service.endpoint.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "service.endpoint must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_model() {
        let mut config = Config::default();
        config.generation.default_model = "fal-ai/does-not-exist".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("default_model"));
    }

    #[test]
    fn test_validate_rejects_unknown_size() {
        let mut config = Config::default();
        config.generation.default_size = "poster".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("default_size"));
    }

    #[test]
    fn test_validate_rejects_zero_parallel() {
        let mut config = Config::default();
        config.generation.parallel = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("parallel"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.generation.timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_empty_endpoint() {
        let mut config = Config::default();
        config.service.endpoint = "  ".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("endpoint"));
    }
}
