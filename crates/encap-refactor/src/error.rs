//! Error types for the encapsulate-field refactoring
//!
//! - Invocation errors stop before a model exists
//! - Naming failures surface at commit as `InvalidEncapsulationAttributes`
//! - Commit failures carry the session for diagnostics

use crate::config::ConfigError;
use encap_naming::NamingError;
use encap_source::{
    Cancelled, DeclarationKind, QualifiedModuleName, RewriteError, SessionId, SourceError,
};

/// Main refactoring error type
#[derive(Debug, thiserror::Error)]
pub enum RefactorError {
    /// Selection resolved to nothing
    #[error("no target declaration selected")]
    NoTarget,

    /// Target is not a variable
    #[error("'{name}' is a {kind:?}, not a variable")]
    InvalidDeclarationType {
        /// Target name
        name: String,
        /// Actual kind
        kind: DeclarationKind,
    },

    /// Target is a routine parameter
    #[error("'{name}' is a parameter")]
    TargetIsParameter {
        /// Target name
        name: String,
    },

    /// Target is a local variable
    #[error("'{name}' is not declared at module level")]
    TargetNotModuleScoped {
        /// Target name
        name: String,
    },

    /// A selected candidate's names are illegal or colliding
    #[error("cannot encapsulate {target}: {reason}")]
    InvalidEncapsulationAttributes {
        /// Candidate target id
        target: String,
        /// Human-readable reason
        reason: String,
    },

    /// Staging an edit failed
    #[error("staging failed: {0}")]
    Staging(#[from] RewriteError),

    /// Commit rejected; nothing was applied
    #[error("rewrite session {session} failed for [{}]: {source}", join_modules(.modules))]
    RewriteFailed {
        /// Session that failed
        session: SessionId,
        /// Modules the session touched
        modules: Vec<QualifiedModuleName>,
        /// Underlying error
        source: RewriteError,
    },

    /// Cancelled at a checkpoint
    #[error("operation cancelled")]
    Cancelled,

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Declaration graph error
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// No legal state record name
    #[error("naming error: {0}")]
    Naming(#[from] NamingError),
}

/// Strategy name that matches neither strategy
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown strategy '{input}', expected use-backing-fields or convert-fields-to-record-members")]
pub struct ParseStrategyError {
    /// Rejected input
    pub input: String,
}

impl From<Cancelled> for RefactorError {
    fn from(_: Cancelled) -> Self {
        Self::Cancelled
    }
}

impl RefactorError {
    /// True for errors raised before any model was built
    #[inline]
    #[must_use]
    pub fn is_invocation_error(&self) -> bool {
        matches!(
            self,
            Self::NoTarget
                | Self::InvalidDeclarationType { .. }
                | Self::TargetIsParameter { .. }
                | Self::TargetNotModuleScoped { .. }
        )
    }
}

fn join_modules(modules: &[QualifiedModuleName]) -> String {
    modules
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
