//! Encap naming
//!
//! Pure naming policy for the encapsulate-field refactoring.
//!
//! # Overview
//!
//! - **NameValidator**: is an identifier legal in a given position
//! - **disambiguate**: first legal, unclaimed element of `name, name1, ...`
//! - **IdentifierClaims**: owned, case-insensitive claim table per scope
//!
//! # Example
//!
//! ```rust
//! use encap_naming::{disambiguate, NameValidator};
//!
//! let name = disambiguate("Count", NameValidator::Default, 1000, |n| n == "Count").unwrap();
//! assert_eq!(name, "Count1");
//! ```

#![warn(missing_docs)]

pub mod claims;
pub mod keywords;
pub mod sequence;
pub mod validator;

pub use claims::{ClaimOwner, ClaimScope, IdentifierClaims};
pub use sequence::{disambiguate, increment_identifier, NameSequence, DEFAULT_DISAMBIGUATION_LIMIT};
pub use validator::{NameValidator, NameViolation, MAX_IDENTIFIER_LENGTH};

/// Naming failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NamingError {
    /// Name breaks a rule suffixing cannot fix
    #[error(transparent)]
    Invalid(#[from] NameViolation),

    /// No legal, unclaimed name within the limit
    #[error("no available identifier for '{name}' within {limit} attempts")]
    Exhausted {
        /// Desired name
        name: String,
        /// Attempts made
        limit: usize,
    },

    /// Name is held by another owner
    #[error("'{name}' in {scope} is already claimed by {holder}")]
    AlreadyClaimed {
        /// Claimed name as first written
        name: String,
        /// Scope of the claim
        scope: String,
        /// Current holder
        holder: String,
    },
}

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for naming
    pub use crate::{
        disambiguate, ClaimOwner, ClaimScope, IdentifierClaims, NameValidator, NameViolation,
        NamingError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
