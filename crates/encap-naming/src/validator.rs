//! Identifier legality per naming position

use crate::keywords;
use serde::{Deserialize, Serialize};

/// Longest legal identifier
pub const MAX_IDENTIFIER_LENGTH: usize = 255;

/// Naming rules for one identifier position
///
/// Chosen by candidate kind and strategy, never by the candidate itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NameValidator {
    /// Plain identifier rules
    #[default]
    Default,
    /// Record type names: also may not shadow a built-in type
    RecordType,
    /// Record member names
    RecordMember,
    /// Record member arrays: also may not shadow a built-in function
    RecordMemberArray,
}

/// Why a name is illegal
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameViolation {
    /// Empty name
    #[error("identifier is empty")]
    Empty,

    /// Longer than [`MAX_IDENTIFIER_LENGTH`]
    #[error("identifier '{name}' exceeds {MAX_IDENTIFIER_LENGTH} characters")]
    TooLong {
        /// Offending name
        name: String,
    },

    /// Does not start with a letter
    #[error("identifier '{name}' must start with a letter")]
    InvalidFirstCharacter {
        /// Offending name
        name: String,
    },

    /// Contains a character other than letters, digits, underscore
    #[error("identifier '{name}' contains invalid character '{character}'")]
    InvalidCharacter {
        /// Offending name
        name: String,
        /// First invalid character
        character: char,
    },

    /// Reserved keyword
    #[error("'{0}' is a reserved word")]
    ReservedWord(String),

    /// Shadows a built-in type
    #[error("'{0}' is a built-in type name")]
    BuiltInType(String),

    /// Shadows a built-in function
    #[error("'{0}' is a built-in function name")]
    BuiltInFunction(String),
}

impl NameViolation {
    /// True when a numeric suffix can make the name legal
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ReservedWord(_) | Self::BuiltInType(_) | Self::BuiltInFunction(_)
        )
    }
}

impl NameValidator {
    /// Check `name` against this position's rules
    ///
    /// # Errors
    /// Returns the first violation found; syntax before vocabulary
    pub fn validate(&self, name: &str) -> Result<(), NameViolation> {
        validate_syntax(name)?;

        if keywords::is_reserved(name) {
            return Err(NameViolation::ReservedWord(name.to_string()));
        }
        match self {
            Self::RecordType if keywords::is_built_in_type(name) => {
                Err(NameViolation::BuiltInType(name.to_string()))
            }
            Self::RecordMemberArray if keywords::is_built_in_function(name) => {
                Err(NameViolation::BuiltInFunction(name.to_string()))
            }
            _ => Ok(()),
        }
    }

    /// True if `name` is legal here
    #[inline]
    #[must_use]
    pub fn is_valid_name(&self, name: &str) -> bool {
        self.validate(name).is_ok()
    }
}

fn validate_syntax(name: &str) -> Result<(), NameViolation> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(NameViolation::Empty);
    };
    if name.chars().count() > MAX_IDENTIFIER_LENGTH {
        return Err(NameViolation::TooLong {
            name: name.to_string(),
        });
    }
    if !first.is_ascii_alphabetic() {
        return Err(NameViolation::InvalidFirstCharacter {
            name: name.to_string(),
        });
    }
    if let Some(character) = chars.find(|c| !c.is_ascii_alphanumeric() && *c != '_') {
        return Err(NameViolation::InvalidCharacter {
            name: name.to_string(),
            character,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules() {
        let v = NameValidator::Default;
        assert!(v.is_valid_name("Count"));
        assert!(v.is_valid_name("count_1"));
        assert_eq!(v.validate(""), Err(NameViolation::Empty));
        assert!(matches!(
            v.validate("1count"),
            Err(NameViolation::InvalidFirstCharacter { .. })
        ));
        assert!(matches!(
            v.validate("co unt"),
            Err(NameViolation::InvalidCharacter { character: ' ', .. })
        ));
        assert!(matches!(v.validate("Property"), Err(NameViolation::ReservedWord(_))));
        assert!(matches!(
            v.validate(&"a".repeat(256)),
            Err(NameViolation::TooLong { .. })
        ));
        assert!(v.is_valid_name(&"a".repeat(255)));
    }

    #[test]
    fn record_type_rejects_built_in_types() {
        assert!(NameValidator::Default.is_valid_name("Collection"));
        assert!(matches!(
            NameValidator::RecordType.validate("Collection"),
            Err(NameViolation::BuiltInType(_))
        ));
    }

    #[test]
    fn record_member_array_rejects_built_in_functions() {
        assert!(NameValidator::RecordMember.is_valid_name("Left"));
        assert!(matches!(
            NameValidator::RecordMemberArray.validate("Left"),
            Err(NameViolation::BuiltInFunction(_))
        ));
        assert!(NameValidator::RecordMemberArray.is_valid_name("Left1"));
    }

    #[test]
    fn recoverability() {
        assert!(NameViolation::ReservedWord("End".into()).is_recoverable());
        assert!(!NameViolation::Empty.is_recoverable());
        assert!(!NameViolation::InvalidFirstCharacter { name: "_x".into() }.is_recoverable());
    }
}
