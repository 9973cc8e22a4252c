use super::{CandidateCore, EncapsulateFieldCandidate};

/// Scalar module field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCandidate {
    core: CandidateCore,
}

impl FieldCandidate {
    /// Wrap a core
    #[inline]
    #[must_use]
    pub fn new(core: CandidateCore) -> Self {
        Self { core }
    }
}

impl EncapsulateFieldCandidate for FieldCandidate {
    fn core(&self) -> &CandidateCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CandidateCore {
        &mut self.core
    }
}

/// Array module field
///
/// Arrays cannot be assigned as a whole, so the property is `Get`-only and
/// typed `Variant`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayCandidate {
    core: CandidateCore,
}

impl ArrayCandidate {
    /// Wrap a core
    #[inline]
    #[must_use]
    pub fn new(core: CandidateCore) -> Self {
        Self { core }
    }
}

impl EncapsulateFieldCandidate for ArrayCandidate {
    fn core(&self) -> &CandidateCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CandidateCore {
        &mut self.core
    }

    fn can_be_read_write(&self) -> bool {
        false
    }
}
