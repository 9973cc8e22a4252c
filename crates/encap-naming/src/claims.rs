//! Owned identifier claim table
//!
//! Names are claimed per scope by an owner. The table is built fresh for
//! every identifier-assignment pass and passed by reference to whoever needs
//! to ask "is this name free here?".

use crate::NamingError;
use encap_source::{DeclarationId, QualifiedModuleName};
use indexmap::IndexMap;
use std::fmt::{self, Display, Formatter};

/// Namespace a name is claimed in
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClaimScope {
    /// Module-level names
    Module(QualifiedModuleName),
    /// Members of a record type, keyed by the lowercased type identifier
    Record(QualifiedModuleName, String),
    /// Locals and parameters of a routine
    Procedure(DeclarationId),
}

impl ClaimScope {
    /// Record member scope; the type name is case-folded
    #[must_use]
    pub fn record(module: QualifiedModuleName, type_identifier: &str) -> Self {
        Self::Record(module, type_identifier.to_ascii_lowercase())
    }
}

impl Display for ClaimScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module(module) => write!(f, "module {module}"),
            Self::Record(module, record) => write!(f, "record {module}.{record}"),
            Self::Procedure(id) => write!(f, "procedure {id}"),
        }
    }
}

/// Who holds a name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClaimOwner {
    /// An existing declaration
    Declaration(DeclarationId),
    /// A refactoring candidate, by target id
    Candidate(String),
    /// The state record's field or type identifier
    StateRecord,
}

impl Display for ClaimOwner {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declaration(id) => write!(f, "declaration {id}"),
            Self::Candidate(target) => write!(f, "candidate {target}"),
            Self::StateRecord => write!(f, "state record"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ClaimKey {
    scope: ClaimScope,
    folded: String,
}

/// Case-insensitive claim table; the first claim on a name wins
#[derive(Debug, Clone, Default)]
pub struct IdentifierClaims {
    claims: IndexMap<ClaimKey, (String, ClaimOwner)>,
}

impl IdentifierClaims {
    /// Create empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `name` in `scope`
    ///
    /// Re-claiming by the same owner is a no-op.
    ///
    /// # Errors
    /// Returns [`NamingError::AlreadyClaimed`] if another owner holds the name
    pub fn claim(
        &mut self,
        scope: ClaimScope,
        name: &str,
        owner: ClaimOwner,
    ) -> Result<(), NamingError> {
        let key = ClaimKey {
            scope,
            folded: name.to_ascii_lowercase(),
        };
        match self.claims.get(&key) {
            Some((_, holder)) if *holder == owner => Ok(()),
            Some((held, holder)) => Err(NamingError::AlreadyClaimed {
                name: held.clone(),
                scope: key.scope.to_string(),
                holder: holder.to_string(),
            }),
            None => {
                self.claims.insert(key, (name.to_string(), owner));
                Ok(())
            }
        }
    }

    /// Claim without failing; returns false if another owner holds the name
    pub fn try_claim(&mut self, scope: ClaimScope, name: &str, owner: ClaimOwner) -> bool {
        self.claim(scope, name, owner).is_ok()
    }

    /// Holder of `name` in `scope`
    #[must_use]
    pub fn holder(&self, scope: &ClaimScope, name: &str) -> Option<&ClaimOwner> {
        let key = ClaimKey {
            scope: scope.clone(),
            folded: name.to_ascii_lowercase(),
        };
        self.claims.get(&key).map(|(_, owner)| owner)
    }

    /// True if someone other than `except` holds `name` in `scope`
    #[must_use]
    pub fn is_claimed(&self, scope: &ClaimScope, name: &str, except: Option<&ClaimOwner>) -> bool {
        self.holder(scope, name)
            .is_some_and(|holder| Some(holder) != except)
    }

    /// Drop every claim held by `owner`
    pub fn release(&mut self, owner: &ClaimOwner) {
        self.claims.retain(|_, (_, holder)| holder != owner);
    }

    /// Names claimed in `scope`, in claim order
    #[must_use]
    pub fn names_in(&self, scope: &ClaimScope) -> Vec<&str> {
        self.claims
            .iter()
            .filter(|(key, _)| &key.scope == scope)
            .map(|(_, (name, _))| name.as_str())
            .collect()
    }

    /// Number of claims
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    /// True if nothing is claimed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn module() -> ClaimScope {
        ClaimScope::Module(QualifiedModuleName::new("P", "M"))
    }

    #[test]
    fn claims_are_case_insensitive() {
        let mut claims = IdentifierClaims::new();
        claims
            .claim(module(), "Count", ClaimOwner::Candidate("P.M.count".into()))
            .unwrap();
        assert!(claims.is_claimed(&module(), "COUNT", None));
        let err = claims
            .claim(module(), "count", ClaimOwner::Declaration(DeclarationId(4)))
            .unwrap_err();
        assert!(matches!(err, NamingError::AlreadyClaimed { .. }));
    }

    #[test]
    fn owner_does_not_conflict_with_itself() {
        let mut claims = IdentifierClaims::new();
        let owner = ClaimOwner::Candidate("P.M.count".into());
        claims.claim(module(), "Count", owner.clone()).unwrap();
        claims.claim(module(), "Count", owner.clone()).unwrap();
        assert!(!claims.is_claimed(&module(), "Count", Some(&owner)));
        assert_eq!(claims.len(), 1);
    }

    #[test]
    fn scopes_are_separate() {
        let mut claims = IdentifierClaims::new();
        let record = ClaimScope::record(QualifiedModuleName::new("P", "M"), "TModule");
        claims.claim(module(), "Count", ClaimOwner::StateRecord).unwrap();
        assert!(!claims.is_claimed(&record, "Count", None));
        assert!(claims.try_claim(record.clone(), "Count", ClaimOwner::StateRecord));
        assert_eq!(claims.names_in(&record), vec!["Count"]);
    }

    #[test]
    fn release_drops_owner_claims() {
        let mut claims = IdentifierClaims::new();
        let owner = ClaimOwner::Candidate("P.M.a".into());
        claims.claim(module(), "A", owner.clone()).unwrap();
        claims.claim(module(), "B", ClaimOwner::StateRecord).unwrap();
        claims.release(&owner);
        assert!(claims.holder(&module(), "A").is_none());
        assert_eq!(claims.len(), 1);
    }
}
