use super::{Candidate, CandidateCore, EncapsulateFieldCandidate};
use encap_source::{DeclarationId, IdentifierReference, MemberPath};

/// Field whose declared type is a user-defined record
///
/// When the record type is private to the declaring module the field is
/// *expandable*: each record member gets its own property and the field's
/// own property exposes the whole record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordCandidate {
    core: CandidateCore,
    record_type: DeclarationId,
    expandable: bool,
    members: Vec<RecordMemberCandidate>,
}

impl RecordCandidate {
    /// Create from a core and its member candidates
    #[must_use]
    pub fn new(
        core: CandidateCore,
        record_type: DeclarationId,
        expandable: bool,
        members: Vec<RecordMemberCandidate>,
    ) -> Self {
        let mut record = Self {
            core,
            record_type,
            expandable,
            members,
        };
        let root = record.backing_path();
        record.sync_members(&root);
        record
    }

    /// Record type declaration
    #[inline]
    #[must_use]
    pub fn record_type(&self) -> DeclarationId {
        self.record_type
    }

    /// Members get their own properties
    #[inline]
    #[must_use]
    pub fn is_expandable(&self) -> bool {
        self.expandable
    }

    /// Member candidates in declaration order
    #[inline]
    #[must_use]
    pub fn members(&self) -> &[RecordMemberCandidate] {
        &self.members
    }

    /// Member candidates, mutable
    #[inline]
    pub fn members_mut(&mut self) -> &mut [RecordMemberCandidate] {
        &mut self.members
    }

    /// Point members at the record's current backing and property
    pub fn sync_members(&mut self, root: &MemberPath) {
        let property = self.core.property_identifier.clone();
        let encapsulate = self.core.encapsulate;
        for member in &mut self.members {
            member.parent_backing = root.clone();
            member.parent_property.clone_from(&property);
            member.core.encapsulate = encapsulate;
        }
    }
}

impl EncapsulateFieldCandidate for RecordCandidate {
    fn core(&self) -> &CandidateCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CandidateCore {
        &mut self.core
    }

    fn set_encapsulate_flag(&mut self, flag: bool) {
        self.core.encapsulate = flag;
        for member in &mut self.members {
            member.core.encapsulate = flag;
        }
    }

    fn children(&self) -> Vec<Candidate> {
        if !self.expandable {
            return Vec::new();
        }
        self.members
            .iter()
            .cloned()
            .map(Candidate::RecordMember)
            .collect()
    }
}

/// One member of a record-typed field
///
/// Only references qualified by the parent field belong to this candidate;
/// the same record member reached through another variable is untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMemberCandidate {
    core: CandidateCore,
    parent_field: DeclarationId,
    parent_backing: MemberPath,
    parent_property: String,
}

impl RecordMemberCandidate {
    /// Create for the field `parent_field`
    #[must_use]
    pub fn new(core: CandidateCore, parent_field: DeclarationId) -> Self {
        Self {
            core,
            parent_field,
            parent_backing: MemberPath::default(),
            parent_property: String::new(),
        }
    }

    /// Field the member is accessed through
    #[inline]
    #[must_use]
    pub fn parent_field(&self) -> DeclarationId {
        self.parent_field
    }

    /// Parent record's backing path
    #[inline]
    #[must_use]
    pub fn parent_backing(&self) -> &MemberPath {
        &self.parent_backing
    }

    /// Parent record's property name
    #[inline]
    #[must_use]
    pub fn parent_property(&self) -> &str {
        &self.parent_property
    }
}

impl EncapsulateFieldCandidate for RecordMemberCandidate {
    fn core(&self) -> &CandidateCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CandidateCore {
        &mut self.core
    }

    fn backing_path(&self) -> MemberPath {
        self.parent_backing.child(self.core.declaration.name.clone())
    }

    fn can_be_read_write(&self) -> bool {
        !self.core.declaration.is_array()
    }

    fn references(&self) -> Vec<&IdentifierReference> {
        self.core
            .declaration
            .references
            .iter()
            .filter(|reference| reference.qualifier == Some(self.parent_field))
            .collect()
    }
}
