//! Encapsulation candidates
//!
//! A candidate is one field the refactoring may encapsulate. Shared behavior
//! lives in [`EncapsulateFieldCandidate`]; [`Candidate`] is the closed set of
//! variants the model works with:
//!
//! | Variant | Wraps |
//! |---------|-------|
//! | `Field` | scalar module field |
//! | `Array` | array module field (read-only property) |
//! | `Record` | record-typed field, owning one member candidate per record member |
//! | `RecordMember` | one member of a record-typed field |
//! | `Converted` | any of the above, viewed as a member of the state record |
//!
//! # Invariants
//! - A candidate's [`TargetId`] never changes, except a decorator's when it
//!   is rebound to another state record
//! - Equality is defined on the target id alone

mod convert;
mod field;
mod record;

pub use convert::{ConvertToRecordMember, StateRecordBinding};
pub use field::{ArrayCandidate, FieldCandidate};
pub use record::{RecordCandidate, RecordMemberCandidate};

use crate::attributes::ReferenceReplacement;
use crate::conflict::ConflictFinder;
use crate::property::PropertyAttributeSet;
use encap_naming::NameValidator;
use encap_source::{Declaration, DeclarationId, IdentifierReference, MemberPath, QualifiedModuleName};
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};

/// Stable candidate identity: `{project}.{module}.{container...}.{name}`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetId {
    module: QualifiedModuleName,
    path: MemberPath,
}

impl TargetId {
    /// Create id from module and container path
    #[inline]
    #[must_use]
    pub fn new(module: QualifiedModuleName, path: MemberPath) -> Self {
        Self { module, path }
    }

    /// Id of a module field
    #[inline]
    #[must_use]
    pub fn field(module: QualifiedModuleName, name: &str) -> Self {
        Self::new(module, MemberPath::single(name))
    }

    /// Module part
    #[inline]
    #[must_use]
    pub fn module(&self) -> &QualifiedModuleName {
        &self.module
    }

    /// Container path part
    #[inline]
    #[must_use]
    pub fn path(&self) -> &MemberPath {
        &self.path
    }

    /// Id of a member of this target
    #[inline]
    #[must_use]
    pub fn child(&self, name: &str) -> Self {
        Self::new(self.module.clone(), self.path.child(name))
    }

    /// Same target, nested under `container`
    #[inline]
    #[must_use]
    pub fn rooted_at(&self, container: &str) -> Self {
        Self::new(self.module.clone(), self.path.rooted_at(container))
    }
}

impl Display for TargetId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.path)
    }
}

/// Per-candidate mutable state shared by every variant
///
/// A decorator exposes the wrapped candidate's core, so writes through the
/// decorator land on the wrapped candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateCore {
    pub(crate) declaration: Declaration,
    pub(crate) target_id: TargetId,
    pub(crate) desired_property: String,
    pub(crate) property_identifier: String,
    pub(crate) backing_identifier: String,
    pub(crate) parameter_name: String,
    pub(crate) encapsulate: bool,
    pub(crate) read_only: bool,
    pub(crate) validator: NameValidator,
    pub(crate) conflict_finder: ConflictFinder,
    pub(crate) violation: Option<String>,
    pub(crate) reference_scopes: Vec<DeclarationId>,
}

impl CandidateCore {
    /// Core for `declaration` with default naming
    #[must_use]
    pub fn new(declaration: Declaration, target_id: TargetId, parameter_name: &str) -> Self {
        let desired = capitalize(&declaration.name);
        let mut reference_scopes: Vec<DeclarationId> = declaration
            .references
            .iter()
            .filter(|r| r.module == declaration.module)
            .filter_map(|r| r.scope)
            .collect();
        reference_scopes.sort();
        reference_scopes.dedup();
        Self {
            backing_identifier: declaration.name.clone(),
            property_identifier: desired.clone(),
            desired_property: desired,
            parameter_name: parameter_name.to_string(),
            encapsulate: false,
            read_only: false,
            validator: NameValidator::Default,
            conflict_finder: ConflictFinder::UseBackingFields,
            violation: None,
            reference_scopes,
            declaration,
            target_id,
        }
    }

    /// Routines in the declaring module that reference the field
    #[inline]
    #[must_use]
    pub fn reference_scopes(&self) -> &[DeclarationId] {
        &self.reference_scopes
    }

    /// Backing identifier as last assigned
    #[inline]
    #[must_use]
    pub fn backing_identifier(&self) -> &str {
        &self.backing_identifier
    }
}

/// First letter uppercased: `count` → `Count`
#[must_use]
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Capability interface shared by every candidate variant
pub trait EncapsulateFieldCandidate {
    /// Shared state
    fn core(&self) -> &CandidateCore;

    /// Shared state, mutable
    fn core_mut(&mut self) -> &mut CandidateCore;

    /// Stable identity
    fn target_id(&self) -> &TargetId {
        &self.core().target_id
    }

    /// Encapsulated declaration
    fn declaration(&self) -> &Declaration {
        &self.core().declaration
    }

    /// Field name as declared
    fn identifier_name(&self) -> &str {
        &self.declaration().name
    }

    /// Declaring module
    fn qualified_module(&self) -> &QualifiedModuleName {
        &self.declaration().module
    }

    /// Declared type name
    fn as_type_name(&self) -> &str {
        &self.declaration().as_type_name
    }

    /// Name the user asked for
    fn desired_property_identifier(&self) -> &str {
        &self.core().desired_property
    }

    /// Ask for a property name; the conflict finder decides the final one
    fn set_desired_property_identifier(&mut self, name: String) {
        self.core_mut().desired_property = name;
    }

    /// Resolved property name
    fn property_identifier(&self) -> &str {
        &self.core().property_identifier
    }

    /// Set the resolved property name
    fn set_property_identifier(&mut self, name: String) {
        self.core_mut().property_identifier = name;
    }

    /// Storage the generated property reads and writes
    fn backing_path(&self) -> MemberPath {
        MemberPath::single(self.core().backing_identifier.clone())
    }

    /// Backing storage as written in code
    fn backing_identifier(&self) -> String {
        self.backing_path().to_string()
    }

    /// Setter parameter name
    fn parameter_name(&self) -> &str {
        &self.core().parameter_name
    }

    /// Selected for encapsulation
    fn encapsulate_flag(&self) -> bool {
        self.core().encapsulate
    }

    /// Select or deselect
    fn set_encapsulate_flag(&mut self, flag: bool) {
        self.core_mut().encapsulate = flag;
    }

    /// False when only a `Get` can ever be generated
    fn can_be_read_write(&self) -> bool {
        true
    }

    /// Only a `Get` will be generated
    fn is_read_only(&self) -> bool {
        self.core().read_only || !self.can_be_read_write()
    }

    /// Request a read-only property; ignored where read/write is impossible
    fn set_read_only(&mut self, flag: bool) {
        self.core_mut().read_only = flag;
    }

    /// Generate `Property Let`
    fn implement_let(&self) -> bool {
        !self.is_read_only() && !self.declaration().is_object
    }

    /// Generate `Property Set`
    fn implement_set(&self) -> bool {
        let declaration = self.declaration();
        !self.is_read_only()
            && !declaration.is_record_typed()
            && (declaration.is_object || declaration.is_variant())
    }

    /// Naming rules for the property name
    fn validator(&self) -> NameValidator {
        self.core().validator
    }

    /// Assign naming rules
    fn set_validator(&mut self, validator: NameValidator) {
        self.core_mut().validator = validator;
    }

    /// Identifier assignment policy
    fn conflict_finder(&self) -> ConflictFinder {
        self.core().conflict_finder
    }

    /// Assign identifier policy
    fn set_conflict_finder(&mut self, finder: ConflictFinder) {
        self.core_mut().conflict_finder = finder;
    }

    /// Reason the last identifier assignment failed, if it did
    fn violation(&self) -> Option<&str> {
        self.core().violation.as_deref()
    }

    /// Check current naming with the assigned conflict finder
    ///
    /// # Errors
    /// Returns a human-readable reason on violation
    fn try_validate_encapsulation_attributes(&self) -> Result<(), String> {
        self.conflict_finder().try_validate(self.core())?;
        for child in self.children() {
            child.try_validate_encapsulation_attributes()?;
        }
        Ok(())
    }

    /// References this candidate rewrites
    fn references(&self) -> Vec<&IdentifierReference> {
        self.declaration().references.iter().collect()
    }

    /// Text a reference site is rewritten to
    fn reference_accessor(&self, _reference: &IdentifierReference) -> String {
        self.property_identifier().to_string()
    }

    /// Nested candidates (members of an expandable record)
    fn children(&self) -> Vec<Candidate> {
        Vec::new()
    }

    /// Replacement for every reference, children included
    fn reference_replacements(&self) -> Vec<ReferenceReplacement> {
        let mut replacements: Vec<ReferenceReplacement> = self
            .references()
            .into_iter()
            .map(|reference| ReferenceReplacement {
                module: reference.module.clone(),
                span: reference.replacement_span(),
                text: self.reference_accessor(reference),
            })
            .collect();
        for child in self.children() {
            replacements.extend(child.reference_replacements());
        }
        replacements
    }

    /// Property specification for this candidate alone, backed by `backing`
    fn attribute_set(&self, backing: &MemberPath) -> PropertyAttributeSet {
        let declaration = self.declaration();
        let is_array = declaration.is_array();
        PropertyAttributeSet {
            property_name: self.property_identifier().to_string(),
            backing_field: backing.clone(),
            as_type_name: if is_array {
                "Variant".to_string()
            } else {
                declaration.as_type_name.clone()
            },
            parameter_name: self.parameter_name().to_string(),
            generate_letter: self.implement_let(),
            generate_setter: self.implement_set(),
            uses_set_assignment: declaration.is_object && !is_array,
            is_record_property: declaration.is_record_typed() && !is_array,
            is_variant: declaration.is_variant() && !is_array,
        }
    }

    /// Property specifications with the candidate backed by `root` and each
    /// child by `root.child`
    fn property_attribute_sets_from(&self, root: &MemberPath) -> Vec<PropertyAttributeSet> {
        let mut sets = vec![self.attribute_set(root)];
        for child in self.children() {
            sets.extend(child.property_attribute_sets_from(&root.child(child.identifier_name())));
        }
        sets
    }

    /// Property specifications for generation
    fn property_attribute_sets(&self) -> Vec<PropertyAttributeSet> {
        self.property_attribute_sets_from(&self.backing_path())
    }
}

/// Every encapsulatable field shape
#[derive(Debug, Clone)]
pub enum Candidate {
    /// Scalar field
    Field(FieldCandidate),
    /// Array field
    Array(ArrayCandidate),
    /// Record-typed field
    Record(RecordCandidate),
    /// Member of a record-typed field
    RecordMember(RecordMemberCandidate),
    /// State record member view of another candidate
    Converted(ConvertToRecordMember),
}

macro_rules! dispatch {
    ($self:expr, $inner:ident => $body:expr) => {
        match $self {
            Candidate::Field($inner) => $body,
            Candidate::Array($inner) => $body,
            Candidate::Record($inner) => $body,
            Candidate::RecordMember($inner) => $body,
            Candidate::Converted($inner) => $body,
        }
    };
}

impl Candidate {
    /// True for the state record decorator
    #[inline]
    #[must_use]
    pub fn is_converted(&self) -> bool {
        matches!(self, Self::Converted(_))
    }

    /// The candidate under any decorator
    #[must_use]
    pub fn base(&self) -> &Candidate {
        match self {
            Self::Converted(decorator) => decorator.wrapped().base(),
            other => other,
        }
    }

    /// The candidate under any decorator, mutable
    pub fn base_mut(&mut self) -> &mut Candidate {
        match self {
            Self::Converted(decorator) => decorator.wrapped_mut().base_mut(),
            other => other,
        }
    }

    /// Record member candidates, looking through decorators
    #[must_use]
    pub fn record_members(&self) -> &[RecordMemberCandidate] {
        match self.base() {
            Self::Record(record) => record.members(),
            _ => &[],
        }
    }

    /// Record member candidates, mutable
    pub fn record_members_mut(&mut self) -> &mut [RecordMemberCandidate] {
        match self.base_mut() {
            Self::Record(record) => record.members_mut(),
            _ => &mut [],
        }
    }

    /// True if `id` names this candidate or the candidate it decorates
    #[must_use]
    pub fn matches_target(&self, id: &TargetId) -> bool {
        self.target_id() == id || self.base().target_id() == id
    }

    /// Wrap in a state record decorator
    #[must_use]
    pub fn into_converted(self, binding: StateRecordBinding) -> Self {
        match self {
            Self::Converted(mut decorator) => {
                decorator.rebind(binding);
                Self::Converted(decorator)
            }
            other => Self::Converted(ConvertToRecordMember::new(other, binding)),
        }
    }

    /// Strip a state record decorator
    #[must_use]
    pub fn into_base(self) -> Self {
        match self {
            Self::Converted(decorator) => decorator.into_inner().into_base(),
            other => other,
        }
    }
}

impl EncapsulateFieldCandidate for Candidate {
    fn core(&self) -> &CandidateCore {
        dispatch!(self, c => c.core())
    }

    fn core_mut(&mut self) -> &mut CandidateCore {
        dispatch!(self, c => c.core_mut())
    }

    fn target_id(&self) -> &TargetId {
        dispatch!(self, c => c.target_id())
    }

    fn backing_path(&self) -> MemberPath {
        dispatch!(self, c => c.backing_path())
    }

    fn set_encapsulate_flag(&mut self, flag: bool) {
        dispatch!(self, c => c.set_encapsulate_flag(flag));
    }

    fn can_be_read_write(&self) -> bool {
        dispatch!(self, c => c.can_be_read_write())
    }

    fn references(&self) -> Vec<&IdentifierReference> {
        dispatch!(self, c => c.references())
    }

    fn reference_accessor(&self, reference: &IdentifierReference) -> String {
        dispatch!(self, c => c.reference_accessor(reference))
    }

    fn children(&self) -> Vec<Candidate> {
        dispatch!(self, c => c.children())
    }

    fn property_attribute_sets(&self) -> Vec<PropertyAttributeSet> {
        dispatch!(self, c => c.property_attribute_sets())
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.target_id() == other.target_id()
    }
}

impl Eq for Candidate {}

impl Hash for Candidate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.target_id().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_first_letter_only() {
        assert_eq!(capitalize("count"), "Count");
        assert_eq!(capitalize("mValue"), "MValue");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn target_id_display() {
        let id = TargetId::field(QualifiedModuleName::new("VBAProject", "Module1"), "count");
        assert_eq!(id.to_string(), "VBAProject.Module1.count");
        assert_eq!(id.child("Name").to_string(), "VBAProject.Module1.count.Name");
        assert_eq!(id.rooted_at("this").to_string(), "VBAProject.Module1.this.count");
    }
}
