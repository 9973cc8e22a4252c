use super::{Candidate, CandidateCore, EncapsulateFieldCandidate, TargetId};
use crate::property::PropertyAttributeSet;
use encap_source::{IdentifierReference, MemberPath};

/// State record a converted candidate is stored in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateRecordBinding {
    /// Field holding the record, e.g. `this`
    pub field_identifier: String,
    /// Record type, e.g. `TModule1`
    pub type_identifier: String,
}

impl StateRecordBinding {
    /// Create binding
    #[inline]
    #[must_use]
    pub fn new(field_identifier: impl Into<String>, type_identifier: impl Into<String>) -> Self {
        Self {
            field_identifier: field_identifier.into(),
            type_identifier: type_identifier.into(),
        }
    }
}

/// A candidate viewed as a member of the state record
///
/// Names, flags and validation state are the wrapped candidate's; only the
/// identity, backing path and same-module reference text differ.
#[derive(Debug, Clone)]
pub struct ConvertToRecordMember {
    wrapped: Box<Candidate>,
    binding: StateRecordBinding,
    target_id: TargetId,
}

impl ConvertToRecordMember {
    /// Decorate `wrapped`
    #[must_use]
    pub fn new(wrapped: Candidate, binding: StateRecordBinding) -> Self {
        let target_id = wrapped.target_id().rooted_at(&binding.field_identifier);
        Self {
            wrapped: Box::new(wrapped),
            binding,
            target_id,
        }
    }

    /// Decorated candidate
    #[inline]
    #[must_use]
    pub fn wrapped(&self) -> &Candidate {
        &self.wrapped
    }

    /// Decorated candidate, mutable
    #[inline]
    pub fn wrapped_mut(&mut self) -> &mut Candidate {
        &mut self.wrapped
    }

    /// Current state record
    #[inline]
    #[must_use]
    pub fn binding(&self) -> &StateRecordBinding {
        &self.binding
    }

    /// Move to another state record
    pub fn rebind(&mut self, binding: StateRecordBinding) {
        self.target_id = self.wrapped.target_id().rooted_at(&binding.field_identifier);
        self.binding = binding;
    }

    /// Drop the decorator
    #[must_use]
    pub fn into_inner(self) -> Candidate {
        *self.wrapped
    }

    fn state_root(&self) -> MemberPath {
        MemberPath::single(self.binding.field_identifier.clone())
    }
}

impl EncapsulateFieldCandidate for ConvertToRecordMember {
    fn core(&self) -> &CandidateCore {
        self.wrapped.core()
    }

    fn core_mut(&mut self) -> &mut CandidateCore {
        self.wrapped.core_mut()
    }

    fn target_id(&self) -> &TargetId {
        &self.target_id
    }

    fn backing_path(&self) -> MemberPath {
        match self.wrapped.as_ref() {
            Candidate::RecordMember(member) => self
                .state_root()
                .child(member.parent_property())
                .child(member.identifier_name()),
            other => self.state_root().child(other.property_identifier()),
        }
    }

    fn set_encapsulate_flag(&mut self, flag: bool) {
        self.wrapped.set_encapsulate_flag(flag);
    }

    fn can_be_read_write(&self) -> bool {
        self.wrapped.can_be_read_write()
    }

    fn references(&self) -> Vec<&IdentifierReference> {
        self.wrapped.references()
    }

    fn reference_accessor(&self, reference: &IdentifierReference) -> String {
        if &reference.module == self.qualified_module() {
            self.backing_identifier()
        } else {
            self.wrapped.reference_accessor(reference)
        }
    }

    fn children(&self) -> Vec<Candidate> {
        self.wrapped
            .children()
            .into_iter()
            .map(|child| Candidate::Converted(Self::new(child, self.binding.clone())))
            .collect()
    }

    fn property_attribute_sets(&self) -> Vec<PropertyAttributeSet> {
        self.wrapped.property_attribute_sets_from(&self.backing_path())
    }
}
