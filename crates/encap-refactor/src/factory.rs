//! Candidate construction from the declaration graph

use crate::candidate::{
    ArrayCandidate, Candidate, CandidateCore, FieldCandidate, RecordCandidate,
    RecordMemberCandidate, TargetId,
};
use crate::config::EncapsulateConfig;
use crate::state_record::StateRecords;
use encap_naming::NamingError;
use encap_source::{Declaration, DeclarationFinder, QualifiedModuleName};

/// Builds the candidate set of one module
pub struct CandidateFactory<'a> {
    finder: &'a dyn DeclarationFinder,
    config: &'a EncapsulateConfig,
}

impl<'a> CandidateFactory<'a> {
    /// Create factory
    #[inline]
    #[must_use]
    pub fn new(finder: &'a dyn DeclarationFinder, config: &'a EncapsulateConfig) -> Self {
        Self { finder, config }
    }

    /// One candidate per module field, in source order
    #[must_use]
    pub fn candidates(&self, module: &QualifiedModuleName) -> Vec<Candidate> {
        self.finder
            .module_fields(module)
            .into_iter()
            .map(|field| self.create(field))
            .collect()
    }

    /// Candidate for one module field
    #[must_use]
    pub fn create(&self, field: &Declaration) -> Candidate {
        let parameter = self.config.setter_parameter.as_str();
        let target = TargetId::field(field.module.clone(), &field.name);
        let core = CandidateCore::new(field.clone(), target.clone(), parameter);

        if field.is_array() {
            return Candidate::Array(ArrayCandidate::new(core));
        }
        let Some(record_type) = field.record_type else {
            return Candidate::Field(FieldCandidate::new(core));
        };

        let expandable = self
            .finder
            .declaration(record_type)
            .is_some_and(|ty| ty.module == field.module && ty.has_private_accessibility());
        let members = if expandable {
            self.finder
                .record_members(record_type)
                .into_iter()
                .map(|member| {
                    let core = CandidateCore::new(member.clone(), target.child(&member.name), parameter);
                    RecordMemberCandidate::new(core, field.id)
                })
                .collect()
        } else {
            Vec::new()
        };
        Candidate::Record(RecordCandidate::new(core, record_type, expandable, members))
    }

    /// State records available in `module`
    ///
    /// # Errors
    /// Returns error if no legal synthesized name is available
    pub fn state_records(&self, module: &QualifiedModuleName) -> Result<StateRecords, NamingError> {
        StateRecords::discover(
            self.finder,
            module,
            &self.config.state_record,
            self.config.disambiguation_limit,
        )
    }
}
