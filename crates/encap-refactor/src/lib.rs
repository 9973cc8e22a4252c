//! Encap refactor
//!
//! The encapsulate-field refactoring: turn module fields into properties,
//! rewrite their declarations and every reference, and insert the generated
//! code, under one of two strategies.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────┐   ┌──────────────────┐   ┌─────────────────────┐
//! │  CandidateFactory  │──▶│ EncapsulationModel│──▶│ EncapsulationStrategy│
//! │  (fields, records) │   │ (flags, names)    │   │ (staged edits)       │
//! └────────────────────┘   └────────┬─────────┘   └──────────┬──────────┘
//!                                   │                        │
//!                           ConflictFinder            RewriteSession
//!                           (identifier claims)       (all-or-nothing)
//! ```
//!
//! # Strategies
//!
//! - **use-backing-fields**: `Public count As Long` becomes
//!   `Private count1 As Long` plus `Count` Get/Let properties
//! - **convert-fields-to-record-members**: every selected field becomes a
//!   member of one private state record (`this.Count`)
//!
//! # Example
//!
//! ```rust,ignore
//! let refactoring = EncapsulateFieldRefactoring::new(&graph, &manager, EncapsulateConfig::default());
//! let target = refactoring.target_named("Module1", "count")?;
//! let model = refactoring.initialize_with(&target, |model| {
//!     model.set_strategy(StrategyKind::ConvertFieldsToRecordMembers);
//! })?;
//! println!("{}", refactoring.preview(&model)?);
//! refactoring.refactor(&model)?;
//! ```

pub mod attributes;
pub mod candidate;
pub mod config;
pub mod conflict;
pub mod error;
pub mod factory;
pub mod model;
pub mod property;
pub mod refactoring;
pub mod state_record;
pub mod strategy;

pub use attributes::{EncapsulationAttributes, ReferenceReplacement};
pub use candidate::{
    Candidate, CandidateCore, ConvertToRecordMember, EncapsulateFieldCandidate, StateRecordBinding,
    TargetId,
};
pub use config::{ConfigError, EncapsulateConfig, DEFAULT_PREVIEW_MARKER};
pub use conflict::{ConflictContext, ConflictFinder};
pub use error::{ParseStrategyError, RefactorError};
pub use factory::CandidateFactory;
pub use model::EncapsulationModel;
pub use property::{PropertyAttributeSet, PropertyGenerator};
pub use refactoring::{EncapsulateFieldRefactoring, RefactorOutcome};
pub use state_record::{ObjectStateRecord, StateRecordOrigin, StateRecords};
pub use strategy::{strategy_for, EncapsulationStrategy, NewContent, NewContentKind, StrategyKind};

/// Result type for refactoring operations
pub type Result<T> = std::result::Result<T, RefactorError>;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for the refactoring
    pub use crate::{
        Candidate, EncapsulateConfig, EncapsulateFieldCandidate, EncapsulateFieldRefactoring,
        EncapsulationModel, RefactorError, StrategyKind, TargetId,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
