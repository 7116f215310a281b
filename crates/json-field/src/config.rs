//! Editor configuration.

use std::fmt::Write;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::FieldError;

/// Settings for one editor instance. Every field has a default, so an empty
/// document is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// strftime pattern used to display `format: date` leaves in read mode.
    pub date_display_format: String,
    /// strftime pattern of dates as stored in the value (ISO by default).
    pub date_storage_format: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            date_display_format: "%m/%d/%Y".to_string(),
            date_storage_format: "%Y-%m-%d".to_string(),
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(input: &str) -> Result<Self, FieldError> {
        let config: Self =
            serde_json::from_str(input).map_err(|e| FieldError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(input: &str) -> Result<Self, FieldError> {
        let config: Self = toml::from_str(input).map_err(|e| FieldError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects date patterns chrono cannot apply to a plain date.
    ///
    /// Time and zone fields (`%H`, `%z`) parse as patterns but fail when a
    /// date is formatted, so each pattern is tried on a sample date. The
    /// storage pattern must also read its own output back.
    pub fn validate(&self) -> Result<(), FieldError> {
        let sample = NaiveDate::default();
        let invalid = |name: &str, pattern: &str| {
            FieldError::Config(format!("{name}: invalid date pattern '{pattern}'"))
        };

        if format_date(sample, &self.date_display_format).is_none() {
            return Err(invalid("date_display_format", &self.date_display_format));
        }
        let stored = format_date(sample, &self.date_storage_format)
            .ok_or_else(|| invalid("date_storage_format", &self.date_storage_format))?;
        if NaiveDate::parse_from_str(&stored, &self.date_storage_format).ok() != Some(sample) {
            return Err(invalid("date_storage_format", &self.date_storage_format));
        }
        Ok(())
    }
}

/// Formats `date` with a strftime pattern, or `None` when the pattern
/// cannot be applied to a date.
pub(crate) fn format_date(date: NaiveDate, pattern: &str) -> Option<String> {
    if pattern.is_empty() {
        return None;
    }
    let mut out = String::new();
    write!(out, "{}", date.format(pattern)).ok()?;
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_documents_use_defaults() {
        assert_eq!(EditorConfig::from_json_str("{}").unwrap(), EditorConfig::default());
        assert_eq!(EditorConfig::from_toml_str("").unwrap(), EditorConfig::default());
    }

    #[test]
    fn toml_overrides() {
        let config = EditorConfig::from_toml_str("date_display_format = \"%d.%m.%Y\"\n").unwrap();
        assert_eq!(config.date_display_format, "%d.%m.%Y");
        assert_eq!(config.date_storage_format, "%Y-%m-%d");
    }

    #[test]
    fn bad_input_is_a_config_error() {
        assert!(matches!(
            EditorConfig::from_json_str("{\"date_display_format\": 3}"),
            Err(FieldError::Config(_))
        ));
        assert!(matches!(
            EditorConfig::from_json_str("{\"date_display_format\": \"%Q\"}"),
            Err(FieldError::Config(_))
        ));
        assert!(matches!(
            EditorConfig::from_json_str("{\"allow_key_edits_with_schema\": true}"),
            Err(FieldError::Config(_))
        ));
    }

    #[test]
    fn time_fields_are_rejected() {
        for pattern in ["%Y %H:%M", "%d/%m/%Y %z", "%T"] {
            let toml = format!("date_display_format = \"{pattern}\"\n");
            assert!(
                matches!(EditorConfig::from_toml_str(&toml), Err(FieldError::Config(_))),
                "{pattern} should be rejected"
            );
        }
    }

    #[test]
    fn storage_pattern_must_read_back() {
        let config = EditorConfig {
            date_storage_format: "%Y".to_string(),
            ..EditorConfig::default()
        };
        assert!(matches!(config.validate(), Err(FieldError::Config(_))));
    }

    #[test]
    fn format_date_reports_failure_instead_of_panicking() {
        let date = NaiveDate::default();
        assert_eq!(format_date(date, "%Y-%m-%d").as_deref(), Some("1970-01-01"));
        assert_eq!(format_date(date, "%H:%M"), None);
        assert_eq!(format_date(date, ""), None);
    }
}
