//! Encapsulation model
//!
//! Owns the candidate set of one module, the active strategy and the state
//! record selection. Every interactive change re-runs identifier assignment
//! over the whole candidate list, so names freed by a deselection are picked
//! up again and no stale conflict survives.
//!
//! # Strategy transitions
//!
//! | From | To | Candidate list |
//! |------|----|----------------|
//! | backing fields | record members | every candidate wrapped in [`ConvertToRecordMember`] |
//! | record members | backing fields | decorators stripped; wrapped candidates restored |
//! | either | same | unchanged (no-op) |
//!
//! The wrapped list is built on entry to the record-members strategy and
//! dropped on exit; nothing else invalidates it.
//!
//! [`ConvertToRecordMember`]: crate::candidate::ConvertToRecordMember

use crate::candidate::{capitalize, Candidate, EncapsulateFieldCandidate, StateRecordBinding, TargetId};
use crate::config::EncapsulateConfig;
use crate::conflict::ConflictContext;
use crate::state_record::{ObjectStateRecord, StateRecords};
use crate::strategy::StrategyKind;
use encap_naming::NameValidator;
use encap_source::{Declaration, DeclarationFinder, DeclarationId, QualifiedModuleName};
use std::collections::HashMap;
use std::ops::Index;

/// Candidate set plus strategy and state record selection for one module
pub struct EncapsulationModel<'a> {
    finder: &'a dyn DeclarationFinder,
    module: QualifiedModuleName,
    strategy: StrategyKind,
    candidates: Vec<Candidate>,
    state_records: StateRecords,
    config: EncapsulateConfig,
    released_hosting: Option<DeclarationId>,
}

impl<'a> EncapsulationModel<'a> {
    /// Build the model with the configured default strategy
    #[must_use]
    pub fn new(
        finder: &'a dyn DeclarationFinder,
        module: QualifiedModuleName,
        candidates: Vec<Candidate>,
        state_records: StateRecords,
        config: EncapsulateConfig,
    ) -> Self {
        let default_strategy = config.default_strategy;
        let mut model = Self {
            finder,
            module,
            strategy: StrategyKind::UseBackingFields,
            candidates,
            state_records,
            config,
            released_hosting: None,
        };
        model.apply_policies();
        model.reassign_identifiers();
        model.set_strategy(default_strategy);
        model
    }

    /// Declaration graph
    #[inline]
    #[must_use]
    pub fn finder(&self) -> &'a dyn DeclarationFinder {
        self.finder
    }

    /// Module being refactored
    #[inline]
    #[must_use]
    pub fn module(&self) -> &QualifiedModuleName {
        &self.module
    }

    /// Active strategy
    #[inline]
    #[must_use]
    pub fn strategy(&self) -> StrategyKind {
        self.strategy
    }

    /// Configuration the model was built with
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EncapsulateConfig {
        &self.config
    }

    /// Candidates of the active strategy, in field order
    #[inline]
    #[must_use]
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Available state records
    #[inline]
    #[must_use]
    pub fn state_records(&self) -> &StateRecords {
        &self.state_records
    }

    /// Selected state record
    #[must_use]
    pub fn active_state_record(&self) -> Option<&ObjectStateRecord> {
        self.state_records.active()
    }

    /// Switch strategy; switching to the active strategy does nothing
    pub fn set_strategy(&mut self, kind: StrategyKind) {
        if self.strategy == kind {
            return;
        }
        self.strategy = kind;
        let candidates = std::mem::take(&mut self.candidates);
        self.candidates = if kind.is_aggregate() {
            let binding = self.binding();
            candidates
                .into_iter()
                .map(|candidate| candidate.into_converted(binding.clone()))
                .collect()
        } else {
            candidates.into_iter().map(Candidate::into_base).collect()
        };
        if !kind.is_aggregate() {
            self.restore_hosting_field();
        }
        tracing::debug!(module = %self.module, strategy = %kind, "strategy changed");
        self.apply_policies();
        self.reassign_identifiers();
    }

    /// Select the state record held by `field_identifier`, falling back to
    /// the synthesized record. Returns whether the name matched.
    pub fn select_state_record(&mut self, field_identifier: &str) -> bool {
        let matched = self.state_records.select(field_identifier);
        self.restore_hosting_field();
        let binding = self.binding();
        for candidate in &mut self.candidates {
            if let Candidate::Converted(decorator) = candidate {
                decorator.rebind(binding.clone());
            }
        }
        tracing::debug!(
            module = %self.module,
            state_record = %binding.field_identifier,
            matched,
            "state record selected"
        );
        if self.strategy.is_aggregate() {
            self.reassign_identifiers();
        }
        matched
    }

    /// Candidate with target id `id`; `None` unless exactly one matches
    #[must_use]
    pub fn get(&self, id: &TargetId) -> Option<&Candidate> {
        self.position(|candidate| candidate.matches_target(id))
            .map(|index| &self.candidates[index])
    }

    /// Candidate with target id `id`, mutable
    ///
    /// Changes made through this reference are not followed by identifier
    /// reassignment; call [`reassign_identifiers`](Self::reassign_identifiers).
    pub fn get_mut(&mut self, id: &TargetId) -> Option<&mut Candidate> {
        self.position(|candidate| candidate.matches_target(id))
            .map(|index| &mut self.candidates[index])
    }

    /// Candidate for declaration `id`; `None` unless exactly one matches
    #[must_use]
    pub fn get_by_declaration(&self, id: DeclarationId) -> Option<&Candidate> {
        self.position(|candidate| candidate.declaration().id == id)
            .map(|index| &self.candidates[index])
    }

    /// Select or deselect a candidate. Returns false if `id` is unknown.
    pub fn set_encapsulate_flag(&mut self, id: &TargetId, flag: bool) -> bool {
        if let Some(released) = self.released_hosting {
            if self.get(id).is_some_and(|candidate| candidate.declaration().id == released) {
                self.released_hosting = None;
            }
        }
        self.update(id, |candidate| candidate.set_encapsulate_flag(flag))
    }

    /// Request a property name. Returns false if `id` is unknown.
    pub fn set_property_identifier(&mut self, id: &TargetId, name: impl Into<String>) -> bool {
        let name = name.into();
        self.update(id, |candidate| candidate.set_desired_property_identifier(name))
    }

    /// Request a read-only property. Returns false if `id` is unknown.
    pub fn set_read_only(&mut self, id: &TargetId, flag: bool) -> bool {
        self.update(id, |candidate| candidate.set_read_only(flag))
    }

    /// Candidates selected for encapsulation
    #[must_use]
    pub fn selected_candidates(&self) -> Vec<&Candidate> {
        self.candidates
            .iter()
            .filter(|candidate| candidate.encapsulate_flag())
            .collect()
    }

    /// Start of the module's first member, if any
    #[must_use]
    pub fn insertion_anchor(&self) -> Option<usize> {
        self.finder
            .members(&self.module)
            .first()
            .map(|member| member.spans.statement.start())
    }

    /// Re-run conflict-free identifier assignment over every candidate
    pub fn reassign_identifiers(&mut self) {
        self.release_hosting_field();
        self.qualify_shared_record_members();
        let state_record = if self.strategy.is_aggregate() {
            self.state_records.active()
        } else {
            None
        };
        let ctx = ConflictContext {
            module: &self.module,
            finder: self.finder,
            state_record,
            setter_parameter: &self.config.setter_parameter,
            limit: self.config.disambiguation_limit,
        };
        self.strategy
            .conflict_finder()
            .assign_no_conflict_identifiers(&mut self.candidates, &ctx);
        tracing::debug!(
            module = %self.module,
            strategy = %self.strategy,
            selected = self.candidates.iter().filter(|c| c.encapsulate_flag()).count(),
            "identifiers reassigned"
        );
    }

    fn update(&mut self, id: &TargetId, change: impl FnOnce(&mut Candidate)) -> bool {
        let Some(candidate) = self.get_mut(id) else {
            return false;
        };
        change(candidate);
        self.reassign_identifiers();
        true
    }

    fn position(&self, predicate: impl Fn(&Candidate) -> bool) -> Option<usize> {
        let mut matches = self
            .candidates
            .iter()
            .enumerate()
            .filter(|(_, candidate)| predicate(candidate))
            .map(|(index, _)| index);
        let first = matches.next()?;
        matches.next().is_none().then_some(first)
    }

    fn binding(&self) -> StateRecordBinding {
        self.state_records.active().map_or_else(
            || {
                let state = &self.config.state_record;
                StateRecordBinding::new(
                    state.field_name.clone(),
                    format!("{}{}", state.type_prefix, self.module.component()),
                )
            },
            ObjectStateRecord::binding,
        )
    }

    fn apply_policies(&mut self) {
        let strategy = self.strategy;
        let finder = strategy.conflict_finder();
        for candidate in &mut self.candidates {
            let validator = validator_for(strategy, candidate.base());
            candidate.set_validator(validator);
            candidate.set_conflict_finder(finder);
            for member in candidate.record_members_mut() {
                let validator = member_validator(member.declaration());
                member.set_validator(validator);
                member.set_conflict_finder(finder);
            }
        }
    }

    /// An existing state record's own field is never converted into itself.
    /// The cleared selection is remembered and given back by
    /// [`restore_hosting_field`](Self::restore_hosting_field).
    fn release_hosting_field(&mut self) {
        if !self.strategy.is_aggregate() {
            return;
        }
        let Some(hosting) = self.state_records.active().and_then(ObjectStateRecord::hosting_field) else {
            return;
        };
        for candidate in &mut self.candidates {
            if candidate.declaration().id == hosting && candidate.encapsulate_flag() {
                candidate.set_encapsulate_flag(false);
                self.released_hosting = Some(hosting);
            }
        }
    }

    fn restore_hosting_field(&mut self) {
        let Some(released) = self.released_hosting.take() else {
            return;
        };
        for candidate in &mut self.candidates {
            if candidate.declaration().id == released {
                candidate.set_encapsulate_flag(true);
            }
        }
    }

    /// `{Field}_{Member}` for members of selected record fields sharing a type
    fn qualify_shared_record_members(&mut self) {
        let mut per_type: HashMap<DeclarationId, usize> = HashMap::new();
        for candidate in self.candidates.iter().filter(|c| c.encapsulate_flag()) {
            if let Candidate::Record(record) = candidate.base() {
                if record.is_expandable() {
                    *per_type.entry(record.record_type()).or_default() += 1;
                }
            }
        }
        for candidate in &mut self.candidates {
            let field = capitalize(candidate.identifier_name());
            let qualify = candidate.encapsulate_flag()
                && matches!(candidate.base(), Candidate::Record(record)
                    if per_type.get(&record.record_type()).is_some_and(|count| *count > 1));
            for member in candidate.record_members_mut() {
                let name = capitalize(member.identifier_name());
                member.set_desired_property_identifier(if qualify {
                    format!("{field}_{name}")
                } else {
                    name
                });
            }
        }
    }
}

fn validator_for(strategy: StrategyKind, candidate: &Candidate) -> NameValidator {
    if strategy.is_aggregate() {
        return member_validator(candidate.declaration());
    }
    match candidate {
        Candidate::Record(_) => NameValidator::RecordType,
        Candidate::RecordMember(member) => member_validator(member.declaration()),
        _ => NameValidator::Default,
    }
}

fn member_validator(declaration: &Declaration) -> NameValidator {
    if declaration.is_array() {
        NameValidator::RecordMemberArray
    } else {
        NameValidator::RecordMember
    }
}

impl Index<&TargetId> for EncapsulationModel<'_> {
    type Output = Candidate;

    /// # Panics
    /// Panics unless exactly one candidate has target id `id`
    fn index(&self, id: &TargetId) -> &Candidate {
        match self.get(id) {
            Some(candidate) => candidate,
            None => panic!("no unique encapsulation candidate for {id}"),
        }
    }
}

impl Index<DeclarationId> for EncapsulationModel<'_> {
    type Output = Candidate;

    /// # Panics
    /// Panics unless exactly one candidate encapsulates declaration `id`
    fn index(&self, id: DeclarationId) -> &Candidate {
        match self.get_by_declaration(id) {
            Some(candidate) => candidate,
            None => panic!("no unique encapsulation candidate for declaration {id}"),
        }
    }
}

impl std::fmt::Debug for EncapsulationModel<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncapsulationModel")
            .field("module", &self.module)
            .field("strategy", &self.strategy)
            .field("candidates", &self.candidates)
            .field("state_records", &self.state_records)
            .finish_non_exhaustive()
    }
}
