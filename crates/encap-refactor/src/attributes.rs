//! Values handed from candidates to strategies

use crate::candidate::EncapsulateFieldCandidate;
use encap_source::{MemberPath, QualifiedModuleName, SourceSpan};

/// What a strategy needs to rewrite one field's declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncapsulationAttributes {
    /// Generated property name
    pub property_name: String,
    /// Storage the property reads and writes
    pub backing: MemberPath,
    /// Declared type name
    pub as_type_name: String,
    /// Setter parameter name
    pub parameter_name: String,
    /// No Let/Set accessor
    pub read_only: bool,
}

impl EncapsulationAttributes {
    /// Snapshot a candidate's current naming
    #[must_use]
    pub fn of(candidate: &(impl EncapsulateFieldCandidate + ?Sized)) -> Self {
        Self {
            property_name: candidate.property_identifier().to_string(),
            backing: candidate.backing_path(),
            as_type_name: candidate.as_type_name().to_string(),
            parameter_name: candidate.parameter_name().to_string(),
            read_only: candidate.is_read_only(),
        }
    }

    /// Backing storage as written in code
    #[inline]
    #[must_use]
    pub fn backing_identifier(&self) -> String {
        self.backing.to_string()
    }
}

/// Replace the text at one reference site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceReplacement {
    /// Module containing the reference
    pub module: QualifiedModuleName,
    /// Span to overwrite
    pub span: SourceSpan,
    /// Replacement text
    pub text: String,
}
