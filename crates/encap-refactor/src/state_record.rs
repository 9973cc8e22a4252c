//! Object state records
//!
//! Under the record-members strategy every encapsulated field becomes a
//! member of one private record field, the *object state record*. The
//! record is either synthesized (`Private this As TModule1`) or an existing
//! private field whose record type is private to the same module.

use crate::candidate::StateRecordBinding;
use crate::config::StateRecordConfig;
use encap_naming::{disambiguate, NameValidator, NamingError};
use encap_source::{Declaration, DeclarationFinder, DeclarationId, QualifiedModuleName};

/// Where a state record comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateRecordOrigin {
    /// Declared by the refactoring
    Synthesized,
    /// Already declared in the module
    Existing {
        /// Field holding the record
        field: DeclarationId,
        /// Record type
        record_type: DeclarationId,
        /// Offset of the `End Type` statement
        end_type_offset: usize,
        /// Members already declared
        member_names: Vec<String>,
    },
}

/// One record that can hold encapsulated fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectStateRecord {
    module: QualifiedModuleName,
    field_identifier: String,
    type_identifier: String,
    is_selected: bool,
    origin: StateRecordOrigin,
}

impl ObjectStateRecord {
    /// Record the refactoring will declare
    #[must_use]
    pub fn synthesized(
        module: QualifiedModuleName,
        field_identifier: impl Into<String>,
        type_identifier: impl Into<String>,
    ) -> Self {
        Self {
            module,
            field_identifier: field_identifier.into(),
            type_identifier: type_identifier.into(),
            is_selected: false,
            origin: StateRecordOrigin::Synthesized,
        }
    }

    /// Existing record field, if `field` qualifies
    ///
    /// A field qualifies when it is a private, non-array module variable of
    /// a record type declared privately in the same module.
    #[must_use]
    pub fn existing(finder: &dyn DeclarationFinder, field: &Declaration) -> Option<Self> {
        if !field.is_module_variable() || !field.has_private_accessibility() || field.is_array() {
            return None;
        }
        let record_type = finder.declaration(field.record_type?)?;
        if record_type.module != field.module || !record_type.has_private_accessibility() {
            return None;
        }
        let end_type_offset = record_type.spans.block_end?.start();
        let member_names = finder
            .record_members(record_type.id)
            .into_iter()
            .map(|member| member.name.clone())
            .collect();
        Some(Self {
            module: field.module.clone(),
            field_identifier: field.name.clone(),
            type_identifier: record_type.name.clone(),
            is_selected: false,
            origin: StateRecordOrigin::Existing {
                field: field.id,
                record_type: record_type.id,
                end_type_offset,
                member_names,
            },
        })
    }

    /// Declaring module
    #[inline]
    #[must_use]
    pub fn module(&self) -> &QualifiedModuleName {
        &self.module
    }

    /// Field identifier, e.g. `this`
    #[inline]
    #[must_use]
    pub fn field_identifier(&self) -> &str {
        &self.field_identifier
    }

    /// Type identifier, e.g. `TModule1`
    #[inline]
    #[must_use]
    pub fn type_identifier(&self) -> &str {
        &self.type_identifier
    }

    /// Currently chosen
    #[inline]
    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.is_selected
    }

    /// Origin
    #[inline]
    #[must_use]
    pub fn origin(&self) -> &StateRecordOrigin {
        &self.origin
    }

    /// True for a record already declared in the module
    #[inline]
    #[must_use]
    pub fn is_existing(&self) -> bool {
        matches!(self.origin, StateRecordOrigin::Existing { .. })
    }

    /// Field declaration of an existing record
    #[must_use]
    pub fn hosting_field(&self) -> Option<DeclarationId> {
        match &self.origin {
            StateRecordOrigin::Existing { field, .. } => Some(*field),
            StateRecordOrigin::Synthesized => None,
        }
    }

    /// Members an existing record already declares
    #[must_use]
    pub fn member_names(&self) -> &[String] {
        match &self.origin {
            StateRecordOrigin::Existing { member_names, .. } => member_names,
            StateRecordOrigin::Synthesized => &[],
        }
    }

    /// Binding for decorated candidates
    #[must_use]
    pub fn binding(&self) -> StateRecordBinding {
        StateRecordBinding::new(self.field_identifier.clone(), self.type_identifier.clone())
    }
}

/// State records available to one model
///
/// # Invariants
/// - The first record is the synthesized one
/// - At most one record is selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateRecords {
    records: Vec<ObjectStateRecord>,
}

impl StateRecords {
    /// Synthesized default plus every existing record of `module`
    ///
    /// The synthesized names avoid every module-level name; the synthesized
    /// record starts selected.
    ///
    /// # Errors
    /// Returns error if no legal synthesized name is available
    pub fn discover(
        finder: &dyn DeclarationFinder,
        module: &QualifiedModuleName,
        config: &StateRecordConfig,
        limit: usize,
    ) -> Result<Self, NamingError> {
        let declarations = finder.module_declarations(module);
        let taken = |name: &str| declarations.iter().any(|d| d.is_named(name));
        let field = disambiguate(&config.field_name, NameValidator::Default, limit, taken)?;
        let type_name = format!("{}{}", config.type_prefix, module.component());
        let type_identifier = disambiguate(&type_name, NameValidator::RecordType, limit, |name| {
            taken(name) || name.eq_ignore_ascii_case(&field)
        })?;

        let mut synthesized = ObjectStateRecord::synthesized(module.clone(), field, type_identifier);
        synthesized.is_selected = true;
        let mut records = vec![synthesized];
        records.extend(
            finder
                .module_fields(module)
                .into_iter()
                .filter_map(|field| ObjectStateRecord::existing(finder, field)),
        );
        Ok(Self { records })
    }

    /// Select the record held by `field_identifier`; unknown names select
    /// the synthesized record. Returns whether the name matched.
    pub fn select(&mut self, field_identifier: &str) -> bool {
        for record in &mut self.records {
            record.is_selected = false;
        }
        let index = self
            .records
            .iter()
            .position(|r| r.field_identifier.eq_ignore_ascii_case(field_identifier));
        let matched = index.is_some();
        if let Some(record) = self.records.get_mut(index.unwrap_or(0)) {
            record.is_selected = true;
        }
        matched
    }

    /// Selected record
    #[must_use]
    pub fn active(&self) -> Option<&ObjectStateRecord> {
        self.records.iter().find(|r| r.is_selected)
    }

    /// All records, synthesized first
    pub fn iter(&self) -> impl Iterator<Item = &ObjectStateRecord> {
        self.records.iter()
    }

    /// Number of records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false once discovered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encap_source::{
        Accessibility, DeclarationGraph, DeclarationKind, DeclarationSpans, SourceSpan,
    };

    fn module() -> QualifiedModuleName {
        QualifiedModuleName::new("VBAProject", "Module1")
    }

    fn declaration(id: u32, name: &str, kind: DeclarationKind, at: usize) -> Declaration {
        Declaration {
            id: DeclarationId(id),
            name: name.to_string(),
            module: module(),
            kind,
            accessibility: Accessibility::Private,
            parent: None,
            as_type_name: "Long".to_string(),
            is_type_specified: true,
            array_dimensions: None,
            is_object: false,
            record_type: None,
            declared_in_list: false,
            spans: DeclarationSpans {
                identifier: SourceSpan::new(at, at + name.len()),
                context: SourceSpan::new(at, at + name.len()),
                statement: SourceSpan::new(at, at + name.len()),
                visibility: None,
                block_end: None,
            },
            references: Vec::new(),
        }
    }

    fn graph() -> DeclarationGraph {
        let mut graph = DeclarationGraph::new();
        graph.add_module(module());
        let mut record_type = declaration(1, "TState", DeclarationKind::RecordType, 0);
        record_type.spans.block_end = Some(SourceSpan::new(40, 48));
        graph.add(record_type).unwrap();
        let mut member = declaration(2, "Name", DeclarationKind::RecordMember, 20);
        member.parent = Some(DeclarationId(1));
        graph.add(member).unwrap();
        let mut field = declaration(3, "state", DeclarationKind::Variable, 60);
        field.as_type_name = "TState".to_string();
        field.record_type = Some(DeclarationId(1));
        graph.add(field).unwrap();
        graph.add(declaration(4, "this", DeclarationKind::Variable, 90)).unwrap();
        graph
    }

    #[test]
    fn synthesized_names_avoid_module_names() {
        let graph = graph();
        let records =
            StateRecords::discover(&graph, &module(), &StateRecordConfig::default(), 1000).unwrap();
        let active = records.active().unwrap();
        assert_eq!(active.field_identifier(), "this1");
        assert_eq!(active.type_identifier(), "TModule1");
        assert!(!active.is_existing());
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn existing_record_is_discovered_with_members() {
        let graph = graph();
        let mut records =
            StateRecords::discover(&graph, &module(), &StateRecordConfig::default(), 1000).unwrap();
        assert!(records.select("STATE"));
        let active = records.active().unwrap();
        assert_eq!(active.type_identifier(), "TState");
        assert_eq!(active.member_names(), ["Name".to_string()]);
        assert_eq!(active.hosting_field(), Some(DeclarationId(3)));
        assert_eq!(records.iter().filter(|r| r.is_selected()).count(), 1);
    }

    #[test]
    fn unknown_selection_falls_back_to_synthesized() {
        let graph = graph();
        let mut records =
            StateRecords::discover(&graph, &module(), &StateRecordConfig::default(), 1000).unwrap();
        assert!(!records.select("missing"));
        assert!(!records.active().unwrap().is_existing());
    }

    #[test]
    fn public_fields_do_not_qualify() {
        let mut graph = graph();
        graph.get_mut(DeclarationId(3)).unwrap().accessibility = Accessibility::Public;
        assert!(ObjectStateRecord::existing(&graph, graph.declaration(DeclarationId(3)).unwrap()).is_none());
    }
}
