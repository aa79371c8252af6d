//! Small validation helpers shared by the config and tool-argument layers

use crate::error::{ConfigError, ConfigResult};

/// Trait for validatable configuration fragments
pub trait Validatable {
    fn validate(&self) -> ConfigResult<()>;
    fn domain_name(&self) -> &'static str;

    fn invalid(&self, field: &str, message: impl Into<String>) -> ConfigError {
        ConfigError::Invalid {
            field: format!("{}.{}", self.domain_name(), field),
            message: message.into(),
        }
    }
}

pub fn validate_required_string(value: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    if value.is_empty() {
        return Err(ConfigError::Invalid {
            field: format!("{domain}.{field_name}"),
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}

pub fn validate_positive(value: u64, field_name: &str, domain: &str) -> ConfigResult<()> {
    if value == 0 {
        return Err(ConfigError::Invalid {
            field: format!("{domain}.{field_name}"),
            message: "must be greater than 0".to_string(),
        });
    }
    Ok(())
}

pub fn validate_url(value: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    url::Url::parse(value).map_err(|e| ConfigError::Invalid {
        field: format!("{domain}.{field_name}"),
        message: format!("not a valid URL: {e}"),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_string() {
        assert!(validate_required_string("", "base_url", "adt").is_err());
        assert!(validate_required_string("x", "base_url", "adt").is_ok());
    }

    #[test]
    fn rejects_zero_timeout() {
        assert!(validate_positive(0, "timeout", "adt").is_err());
        assert!(validate_positive(30, "timeout", "adt").is_ok());
    }
}
