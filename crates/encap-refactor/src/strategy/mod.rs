//! Encapsulation strategies
//!
//! A strategy turns the model's selected candidates into staged edits:
//!
//! 1. Modify each encapsulated declaration (`modify_encapsulated_variable`)
//! 2. Rewrite every reference to the candidate's reference accessor
//! 3. Fold removals from declaration lists into one rewrite per statement
//! 4. Insert new content: record type, declarations, properties and, in
//!    preview, the end-of-changes marker
//!
//! Steps 2 to 4 are shared; strategies differ in step 1 and in the
//! declarations they contribute to step 4.

mod backing_fields;
mod content;
mod record_members;

pub use backing_fields::UseBackingFields;
pub use content::{NewContent, NewContentKind};
pub use record_members::ConvertFieldsToRecordMembers;

use crate::attributes::{EncapsulationAttributes, ReferenceReplacement};
use crate::candidate::{Candidate, EncapsulateFieldCandidate};
use crate::conflict::ConflictFinder;
use crate::error::{ParseStrategyError, RefactorError};
use crate::model::EncapsulationModel;
use crate::property::PropertyGenerator;
use encap_source::{BlockIndenter, ModuleRewriter, QualifiedModuleName, RewriteSession};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Which strategy is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Keep one private backing field per property
    #[default]
    UseBackingFields,
    /// Fold every encapsulated field into the state record
    ConvertFieldsToRecordMembers,
}

impl StrategyKind {
    /// Identifier policy for this strategy
    #[inline]
    #[must_use]
    pub fn conflict_finder(self) -> ConflictFinder {
        match self {
            Self::UseBackingFields => ConflictFinder::UseBackingFields,
            Self::ConvertFieldsToRecordMembers => ConflictFinder::ConvertToRecordMembers,
        }
    }

    /// True for the state record strategy
    #[inline]
    #[must_use]
    pub fn is_aggregate(self) -> bool {
        self == Self::ConvertFieldsToRecordMembers
    }
}

impl Display for StrategyKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::UseBackingFields => write!(f, "use-backing-fields"),
            Self::ConvertFieldsToRecordMembers => write!(f, "convert-fields-to-record-members"),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "use-backing-fields" | "backing-fields" => Ok(Self::UseBackingFields),
            "convert-fields-to-record-members" | "record-members" => {
                Ok(Self::ConvertFieldsToRecordMembers)
            }
            _ => Err(ParseStrategyError {
                input: s.to_string(),
            }),
        }
    }
}

/// Strategy behavior
pub trait EncapsulationStrategy {
    /// Which strategy this is
    fn kind(&self) -> StrategyKind;

    /// Rewrite one selected declaration
    ///
    /// # Errors
    /// Returns error if an edit cannot be staged
    fn modify_encapsulated_variable(
        &self,
        candidate: &Candidate,
        attributes: &EncapsulationAttributes,
        rewriter: &mut ModuleRewriter,
        model: &EncapsulationModel<'_>,
    ) -> Result<(), RefactorError>;

    /// Contribute record type and field declarations
    ///
    /// # Errors
    /// Returns error if an edit cannot be staged
    fn load_new_declarations(
        &self,
        model: &EncapsulationModel<'_>,
        rewriter: &mut ModuleRewriter,
        content: &mut NewContent,
    ) -> Result<(), RefactorError>;

    /// Steps 1 to 3: declarations, references, list folding
    ///
    /// # Errors
    /// Returns error if an edit cannot be staged
    fn refactor_rewrite(
        &self,
        model: &EncapsulationModel<'_>,
        session: &mut dyn RewriteSession,
    ) -> Result<(), RefactorError> {
        let selected = model.selected_candidates();
        let rewriter = session.check_out_module_rewriter(model.module())?;
        for candidate in &selected {
            let attributes = EncapsulationAttributes::of(*candidate);
            self.modify_encapsulated_variable(candidate, &attributes, rewriter, model)?;
        }

        for (module, replacements) in group_replacements(&selected) {
            let rewriter = session.check_out_module_rewriter(&module)?;
            for replacement in replacements {
                rewriter.replace(replacement.span, replacement.text)?;
            }
        }

        session
            .check_out_module_rewriter(model.module())?
            .remove_declarations_from_lists(model.finder());
        Ok(())
    }

    /// Step 4: generate and insert new content
    ///
    /// # Errors
    /// Returns error if the content cannot be staged
    fn insert_new_content(
        &self,
        anchor: Option<usize>,
        model: &EncapsulationModel<'_>,
        session: &mut dyn RewriteSession,
        preview: bool,
    ) -> Result<(), RefactorError> {
        let rewriter = session.check_out_module_rewriter(model.module())?;
        let mut content = NewContent::new();
        self.load_new_declarations(model, rewriter, &mut content)?;

        let generator = PropertyGenerator::new(BlockIndenter::new(model.config().indent_width));
        for candidate in model.selected_candidates() {
            for set in candidate.property_attribute_sets() {
                content.add(NewContentKind::MethodBlock, generator.generate(&set));
            }
        }
        if preview {
            content.add(NewContentKind::PostContentMessage, model.config().preview.marker.clone());
        }
        content.insert(anchor, rewriter)?;
        Ok(())
    }

    /// Run every step; no selected candidate leaves the session untouched
    ///
    /// # Errors
    /// Returns error if an edit cannot be staged
    fn apply(
        &self,
        model: &EncapsulationModel<'_>,
        session: &mut dyn RewriteSession,
        preview: bool,
    ) -> Result<(), RefactorError> {
        if model.selected_candidates().is_empty() {
            tracing::debug!(strategy = %self.kind(), "nothing selected");
            return Ok(());
        }
        self.refactor_rewrite(model, session)?;
        self.insert_new_content(model.insertion_anchor(), model, session, preview)
    }
}

/// Strategy implementation for `kind`
#[must_use]
pub fn strategy_for(kind: StrategyKind) -> Box<dyn EncapsulationStrategy> {
    match kind {
        StrategyKind::UseBackingFields => Box::new(UseBackingFields),
        StrategyKind::ConvertFieldsToRecordMembers => Box::new(ConvertFieldsToRecordMembers),
    }
}

/// Replacements per module, in position order, without duplicates or
/// replacements nested inside another
fn group_replacements(candidates: &[&Candidate]) -> IndexMap<QualifiedModuleName, Vec<ReferenceReplacement>> {
    let mut grouped: IndexMap<QualifiedModuleName, Vec<ReferenceReplacement>> = IndexMap::new();
    for candidate in candidates {
        for replacement in candidate.reference_replacements() {
            grouped.entry(replacement.module.clone()).or_default().push(replacement);
        }
    }
    for replacements in grouped.values_mut() {
        // widest span first so nested ones follow their container
        replacements.sort_by_key(|r| (r.span.start(), std::cmp::Reverse(r.span.end())));
        let mut kept: Vec<ReferenceReplacement> = Vec::with_capacity(replacements.len());
        for replacement in replacements.drain(..) {
            if kept.iter().any(|k| k.span.contains(&replacement.span)) {
                continue;
            }
            kept.push(replacement);
        }
        *replacements = kept;
    }
    grouped
}
