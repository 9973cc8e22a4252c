//! Identifier assignment
//!
//! Every candidate gets a property name, a backing name and a setter
//! parameter name that collide with nothing the module already declares
//! and with nothing another selected candidate has claimed.
//!
//! # Algorithm
//!
//! 1. Seed a claim table with module-level names, routine locals and, under
//!    the record-members strategy, the state record's names and members
//! 2. Resolve selected candidates in model order, claiming their names
//! 3. Resolve unselected candidates against the same table without claiming
//!
//! Resolution of one candidate:
//!
//! - **property**: first element of `desired, desired1, ...` that is legal
//!   for the candidate's validator, not held by another owner in the module,
//!   not a local of a routine that references the field and, for record
//!   members, not a member of the state record
//! - **backing** (backing-fields only): first element of `field, field1, ...`
//!   that differs from the property and is free in the module
//! - **parameter**: first element of `value, value1, ...` that differs from
//!   the property and from the storage root it writes to
//!
//! A failure leaves the desired name in place and records a violation;
//! validation reports it at commit.

use crate::candidate::{Candidate, CandidateCore, EncapsulateFieldCandidate};
use crate::state_record::ObjectStateRecord;
use encap_naming::{disambiguate, ClaimOwner, ClaimScope, IdentifierClaims, NameValidator, NamingError};
use encap_source::{DeclarationFinder, DeclarationKind, MemberPath, QualifiedModuleName};
use serde::{Deserialize, Serialize};

/// Identifier assignment policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictFinder {
    /// Property plus renamed private backing field
    #[default]
    UseBackingFields,
    /// Property plus member of the state record
    ConvertToRecordMembers,
}

/// Inputs shared by every resolution in one pass
#[derive(Clone, Copy)]
pub struct ConflictContext<'a> {
    /// Module being refactored
    pub module: &'a QualifiedModuleName,
    /// Declaration graph
    pub finder: &'a dyn DeclarationFinder,
    /// Active state record, under the record-members strategy
    pub state_record: Option<&'a ObjectStateRecord>,
    /// Desired setter parameter name
    pub setter_parameter: &'a str,
    /// Disambiguation limit
    pub limit: usize,
}

impl ConflictContext<'_> {
    fn module_scope(&self) -> ClaimScope {
        ClaimScope::Module(self.module.clone())
    }

    fn record_scope(&self) -> Option<ClaimScope> {
        self.state_record
            .map(|state| ClaimScope::record(self.module.clone(), state.type_identifier()))
    }
}

impl ConflictFinder {
    /// Resolve names for every candidate, selected ones first
    pub fn assign_no_conflict_identifiers(self, candidates: &mut [Candidate], ctx: &ConflictContext<'_>) {
        let mut claims = self.seed(ctx);
        let mut order: Vec<usize> = (0..candidates.len()).collect();
        order.sort_by_key(|&index| !candidates[index].encapsulate_flag());

        for index in order {
            let candidate = &mut candidates[index];
            let selected = candidate.encapsulate_flag();
            let outcome = self.resolve(candidate.core_mut(), &mut claims, ctx, None, selected);
            record(candidate.core_mut(), outcome);

            let root = match (self, ctx.state_record) {
                (Self::ConvertToRecordMembers, Some(state)) => {
                    MemberPath::single(state.field_identifier()).child(candidate.property_identifier())
                }
                _ => MemberPath::single(candidate.core().backing_identifier()),
            };
            let storage_root = root.segments().first().cloned().unwrap_or_default();
            if let Candidate::Record(record_candidate) = candidate.base_mut() {
                record_candidate.sync_members(&root);
                for member in record_candidate.members_mut() {
                    let outcome = self.resolve(
                        member.core_mut(),
                        &mut claims,
                        ctx,
                        Some(&storage_root),
                        selected,
                    );
                    record(member.core_mut(), outcome);
                }
            }
        }
    }

    /// Check a candidate's current names
    ///
    /// # Errors
    /// Returns a human-readable reason for the first violation found
    pub fn try_validate(self, core: &CandidateCore) -> Result<(), String> {
        if let Some(violation) = &core.violation {
            return Err(violation.clone());
        }
        core.validator
            .validate(&core.property_identifier)
            .map_err(|violation| violation.to_string())?;
        if same_name(&core.parameter_name, &core.property_identifier) {
            return Err(format!(
                "setter parameter '{}' collides with property '{}'",
                core.parameter_name, core.property_identifier
            ));
        }
        if self == Self::UseBackingFields
            && core.declaration.kind != DeclarationKind::RecordMember
            && same_name(&core.backing_identifier, &core.property_identifier)
        {
            return Err(format!(
                "backing field '{}' collides with property '{}'",
                core.backing_identifier, core.property_identifier
            ));
        }
        Ok(())
    }

    fn seed(self, ctx: &ConflictContext<'_>) -> IdentifierClaims {
        let mut claims = IdentifierClaims::new();
        let module_scope = ctx.module_scope();
        for declaration in ctx.finder.module_declarations(ctx.module) {
            let in_routine = declaration
                .parent
                .and_then(|parent| ctx.finder.declaration(parent))
                .is_some_and(|parent| parent.kind.is_member());
            if in_routine {
                if let Some(parent) = declaration.parent {
                    claims.try_claim(
                        ClaimScope::Procedure(parent),
                        &declaration.name,
                        ClaimOwner::Declaration(declaration.id),
                    );
                }
            } else if declaration.kind.is_module_scoped_name() {
                claims.try_claim(
                    module_scope.clone(),
                    &declaration.name,
                    ClaimOwner::Declaration(declaration.id),
                );
            }
        }

        if self == Self::ConvertToRecordMembers {
            if let (Some(state), Some(record_scope)) = (ctx.state_record, ctx.record_scope()) {
                claims.try_claim(module_scope.clone(), state.field_identifier(), ClaimOwner::StateRecord);
                claims.try_claim(module_scope, state.type_identifier(), ClaimOwner::StateRecord);
                for member in state.member_names() {
                    claims.try_claim(record_scope.clone(), member, ClaimOwner::StateRecord);
                }
            }
        }
        claims
    }

    fn resolve(
        self,
        core: &mut CandidateCore,
        claims: &mut IdentifierClaims,
        ctx: &ConflictContext<'_>,
        member_of: Option<&str>,
        selected: bool,
    ) -> Result<(), NamingError> {
        let owner = ClaimOwner::Candidate(core.target_id.to_string());
        let own_declaration = ClaimOwner::Declaration(core.declaration.id);
        let module_scope = ctx.module_scope();
        let record_scope = match (self, member_of) {
            (Self::ConvertToRecordMembers, None) => ctx.record_scope(),
            _ => None,
        };
        let procedure_scopes: Vec<ClaimScope> = core
            .reference_scopes
            .iter()
            .map(|scope| ClaimScope::Procedure(*scope))
            .collect();

        let (property, backing) = {
            let module_taken = |name: &str| {
                claims
                    .holder(&module_scope, name)
                    .is_some_and(|holder| holder != &own_declaration && holder != &owner)
            };
            let taken = |name: &str| {
                module_taken(name)
                    || procedure_scopes
                        .iter()
                        .any(|scope| claims.is_claimed(scope, name, None))
                    || record_scope
                        .as_ref()
                        .is_some_and(|scope| claims.is_claimed(scope, name, Some(&owner)))
            };
            let property = disambiguate(&core.desired_property, core.validator, ctx.limit, taken)?;
            let backing = if self == Self::UseBackingFields && member_of.is_none() {
                disambiguate(
                    &core.declaration.name,
                    NameValidator::Default,
                    ctx.limit,
                    |name| same_name(name, &property) || module_taken(name),
                )?
            } else {
                core.declaration.name.clone()
            };
            (property, backing)
        };

        let storage_root = match (self, member_of, ctx.state_record) {
            (_, Some(root), _) => root.to_string(),
            (Self::ConvertToRecordMembers, None, Some(state)) => state.field_identifier().to_string(),
            _ => backing.clone(),
        };
        let parameter = disambiguate(ctx.setter_parameter, NameValidator::Default, ctx.limit, |name| {
            same_name(name, &property) || same_name(name, &storage_root)
        })?;

        if selected {
            // the field is renamed or removed, so its own name is free again
            claims.release(&own_declaration);
            claims.claim(module_scope.clone(), &property, owner.clone())?;
            if let Some(scope) = record_scope {
                claims.claim(scope, &property, owner.clone())?;
            }
            if self == Self::UseBackingFields && member_of.is_none() {
                claims.claim(module_scope, &backing, owner)?;
            }
        }

        core.property_identifier = property;
        core.backing_identifier = backing;
        core.parameter_name = parameter;
        Ok(())
    }
}

fn record(core: &mut CandidateCore, outcome: Result<(), NamingError>) {
    match outcome {
        Ok(()) => core.violation = None,
        Err(err) => {
            tracing::debug!(candidate = %core.target_id, error = %err, "identifier assignment failed");
            core.violation = Some(err.to_string());
            core.property_identifier.clone_from(&core.desired_property);
        }
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}
