//! Storefront configuration
//!
//! Shop settings live in an optional YAML file; runtime switches such as
//! logging come from the command line or environment.

use std::{fs, path::Path};

use clap::Args;
use serde::Deserialize;
use thiserror::Error;

use crate::cart::DEFAULT_SLOT;

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid YAML for [`Settings`].
    #[error("failed to parse settings: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// A phone number contains something other than digits.
    #[error("phone number must contain digits only: {0:?}")]
    InvalidPhone(String),
}

/// Shop settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Number receiving checkout orders, international format without `+`.
    pub checkout_phone: String,

    /// Number receiving single-product inquiries.
    pub inquiry_phone: String,

    /// Label printed before amounts.
    pub currency_label: String,

    /// Storage slot holding the cart.
    pub cart_slot: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            checkout_phone: "923452102501".to_string(),
            inquiry_phone: "923323327425".to_string(),
            currency_label: "Rs.".to_string(),
            cart_slot: DEFAULT_SLOT.to_string(),
        }
    }
}

impl Settings {
    /// Parses settings from YAML. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the YAML is invalid or a phone number is malformed.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let settings: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_norway::from_str(yaml)?
        };

        settings.validate()?;

        Ok(settings)
    }

    /// Reads settings from `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_yaml(&fs::read_to_string(path)?)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for phone in [&self.checkout_phone, &self.inquiry_phone] {
            if phone.is_empty() || !phone.chars().all(|c| c.is_ascii_digit()) {
                return Err(ConfigError::InvalidPhone(phone.clone()));
            }
        }

        Ok(())
    }
}

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn empty_yaml_uses_defaults() -> TestResult {
        let settings = Settings::from_yaml("")?;

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.cart_slot, "cart");

        Ok(())
    }

    #[test]
    fn partial_yaml_overrides_given_keys() -> TestResult {
        let settings = Settings::from_yaml("currency_label: PKR\ncheckout_phone: \"441234\"\n")?;

        assert_eq!(settings.currency_label, "PKR");
        assert_eq!(settings.checkout_phone, "441234");
        assert_eq!(settings.inquiry_phone, Settings::default().inquiry_phone);

        Ok(())
    }

    #[test]
    fn rejects_non_digit_phone() {
        let result = Settings::from_yaml("checkout_phone: \"+92 345\"\n");

        assert!(
            matches!(result, Err(ConfigError::InvalidPhone(ref phone)) if phone == "+92 345"),
            "expected InvalidPhone, got {result:?}"
        );
    }

    #[test]
    fn rejects_malformed_yaml() {
        let result = Settings::from_yaml("checkout_phone: [unterminated");

        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn from_path_reads_file() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("storefront.yaml");
        fs::write(&path, "cart_slot: basket\n")?;

        let settings = Settings::from_path(&path)?;

        assert_eq!(settings.cart_slot, "basket");

        Ok(())
    }
}
