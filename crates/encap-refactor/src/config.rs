//! Refactoring configuration
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! default_strategy = "convert-fields-to-record-members"
//! setter_parameter = "value"
//!
//! [state_record]
//! field_name = "this"
//! type_prefix = "T"
//!
//! [preview]
//! max_blank_lines = 3
//! ```

use crate::strategy::StrategyKind;
use encap_naming::{NameValidator, DEFAULT_DISAMBIGUATION_LIMIT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Marker comment appended to previews
pub const DEFAULT_PREVIEW_MARKER: &str = "'<===== All Changes above this line =====>";

/// Encapsulate-field configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncapsulateConfig {
    /// Strategy active when a model is initialized
    pub default_strategy: StrategyKind,
    /// Synthesized state record naming
    pub state_record: StateRecordConfig,
    /// Default setter parameter name
    pub setter_parameter: String,
    /// Preview rendering
    pub preview: PreviewConfig,
    /// Spaces per indentation level in generated code
    pub indent_width: usize,
    /// Maximum names tried when disambiguating
    pub disambiguation_limit: usize,
}

/// Synthesized state record naming
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateRecordConfig {
    /// Field identifier
    pub field_name: String,
    /// Prefix of the type identifier (`T` + module name)
    pub type_prefix: String,
}

/// Preview rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Cap on consecutive blank lines
    pub max_blank_lines: usize,
    /// Comment marking the end of generated content
    pub marker: String,
}

impl Default for EncapsulateConfig {
    fn default() -> Self {
        Self {
            default_strategy: StrategyKind::UseBackingFields,
            state_record: StateRecordConfig::default(),
            setter_parameter: "value".to_string(),
            preview: PreviewConfig::default(),
            indent_width: 4,
            disambiguation_limit: DEFAULT_DISAMBIGUATION_LIMIT,
        }
    }
}

impl Default for StateRecordConfig {
    fn default() -> Self {
        Self {
            field_name: "this".to_string(),
            type_prefix: "T".to_string(),
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            max_blank_lines: 3,
            marker: DEFAULT_PREVIEW_MARKER.to_string(),
        }
    }
}

impl EncapsulateConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With default strategy
    #[inline]
    #[must_use]
    pub fn with_default_strategy(mut self, strategy: StrategyKind) -> Self {
        self.default_strategy = strategy;
        self
    }

    /// With state record field name
    #[inline]
    #[must_use]
    pub fn with_state_field_name(mut self, name: impl Into<String>) -> Self {
        self.state_record.field_name = name.into();
        self
    }

    /// With setter parameter name
    #[inline]
    #[must_use]
    pub fn with_setter_parameter(mut self, name: impl Into<String>) -> Self {
        self.setter_parameter = name.into();
        self
    }

    /// With indentation width
    #[inline]
    #[must_use]
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    /// With disambiguation limit
    #[inline]
    #[must_use]
    pub fn with_disambiguation_limit(mut self, limit: usize) -> Self {
        self.disambiguation_limit = limit;
        self
    }

    /// Parse and validate TOML
    ///
    /// # Errors
    /// Returns error on malformed TOML or invalid values
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is invalid
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check values that serde cannot
    ///
    /// # Errors
    /// Returns the first invalid value
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, name) in [
            ("state_record.field_name", &self.state_record.field_name),
            ("setter_parameter", &self.setter_parameter),
        ] {
            NameValidator::Default
                .validate(name)
                .map_err(|violation| ConfigError::Invalid {
                    key,
                    reason: violation.to_string(),
                })?;
        }
        if self.state_record.type_prefix.is_empty()
            || !self.state_record.type_prefix.starts_with(|c: char| c.is_ascii_alphabetic())
        {
            return Err(ConfigError::Invalid {
                key: "state_record.type_prefix",
                reason: "must start with a letter".to_string(),
            });
        }
        if self.disambiguation_limit == 0 {
            return Err(ConfigError::Invalid {
                key: "disambiguation_limit",
                reason: "must be positive".to_string(),
            });
        }
        if !self.preview.marker.starts_with('\'') {
            return Err(ConfigError::Invalid {
                key: "preview.marker",
                reason: "must be a comment".to_string(),
            });
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read {path}: {source}")]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Malformed TOML
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Value out of range
    #[error("invalid value for {key}: {reason}")]
    Invalid {
        /// Offending key
        key: &'static str,
        /// Why it is invalid
        reason: String,
    },
}
