//! Encapsulation model behavior under interaction.
//!
//! Guarantees exercised here:
//! - Identifier assignment never hands out the same name twice, whatever
//!   set of fields is selected.
//! - Switching strategy is idempotent and reversible.
//! - The state record decorator forwards every candidate setting to the
//!   candidate it wraps.

use encap_refactor::prelude::*;
use encap_refactor::CandidateFactory;
use encap_test_utils::{single_module, TestProject, MODULE};
use proptest::prelude::*;
use std::collections::HashSet;

const KEYWORDS: &[&str] = &[
    "and", "as", "byref", "byval", "call", "const", "debug", "declare", "dim", "do", "each", "else",
    "empty", "end", "enum", "error", "exit", "false", "for", "friend", "function", "get", "global",
    "goto", "if", "is", "let", "like", "loop", "me", "mod", "new", "next", "not", "nothing", "null",
    "on", "option", "optional", "or", "print", "private", "property", "public", "resume", "set",
    "static", "step", "sub", "then", "this", "to", "true", "type", "with",
];

fn model_for<'a>(project: &'a TestProject, field: &str) -> EncapsulationModel<'a> {
    EncapsulateFieldRefactoring::new(&project.graph, &project.manager, EncapsulateConfig::default())
        .initialize_model(&TargetId::field(project.module(MODULE), field))
        .unwrap()
}

fn module_with_fields(names: &[String]) -> String {
    let mut text = String::from("Option Explicit\n\n");
    for name in names {
        text.push_str(&format!("Public {name} As Long\n"));
    }
    text.push_str("\nPublic Sub Touch()\n    Dim value As Long\n");
    for name in names {
        text.push_str(&format!("    value = {name}\n"));
    }
    text.push_str("End Sub\n");
    text
}

fn field_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set("[a-z]{2,6}", 1..6).prop_map(|names| {
        let mut names: Vec<String> = names
            .into_iter()
            .filter(|name| !KEYWORDS.contains(&name.as_str()))
            .collect();
        names.sort();
        names
    })
}

fn assert_unique_names(model: &EncapsulationModel<'_>) -> Result<(), TestCaseError> {
    let selected = model.selected_candidates();
    let mut properties = HashSet::new();
    for candidate in &selected {
        let property = candidate.property_identifier().to_ascii_lowercase();
        prop_assert!(candidate.violation().is_none(), "{:?}", candidate.violation());
        prop_assert!(properties.insert(property.clone()), "duplicate property {property}");
        prop_assert!(!property.eq_ignore_ascii_case(candidate.parameter_name()));
        prop_assert!(!property.eq_ignore_ascii_case("touch"));
    }
    if !model.strategy().is_aggregate() {
        let mut backings = HashSet::new();
        for candidate in &selected {
            let backing = candidate.backing_identifier().to_ascii_lowercase();
            prop_assert!(!properties.contains(&backing), "backing {backing} shadows a property");
            prop_assert!(backings.insert(backing.clone()), "duplicate backing {backing}");
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn selected_candidates_get_distinct_names(names in field_names()) {
        prop_assume!(!names.is_empty());
        let project = single_module(&module_with_fields(&names));
        let mut model = model_for(&project, &names[0]);
        for name in &names {
            prop_assert!(model.set_encapsulate_flag(&TargetId::field(project.module(MODULE), name), true));
        }
        assert_unique_names(&model)?;

        model.set_strategy(StrategyKind::ConvertFieldsToRecordMembers);
        assert_unique_names(&model)?;
        for candidate in model.selected_candidates() {
            prop_assert!(candidate.try_validate_encapsulation_attributes().is_ok());
        }
    }
}

/// A routine local with the desired property name pushes the property on.
#[test]
fn locals_of_referencing_routines_are_avoided() {
    let project = single_module(&module_with_fields(&["count".to_string()]));
    let mut model = model_for(&project, "count");
    let id = TargetId::field(project.module(MODULE), "count");
    assert!(model.set_property_identifier(&id, "Value"));

    let candidate = &model[&id];
    assert_eq!(candidate.property_identifier(), "Value1");
    assert_eq!(candidate.backing_identifier(), "count");
    assert_eq!(candidate.parameter_name(), "value");
}

/// Repeating a strategy switch changes nothing; switching back restores
/// the original candidates and names.
#[test]
fn strategy_switch_is_idempotent() {
    let project = single_module(&module_with_fields(&["count".to_string(), "total".to_string()]));
    let mut model = model_for(&project, "count");
    let before: Vec<(String, String)> = model
        .candidates()
        .iter()
        .map(|c| (c.property_identifier().to_string(), c.backing_identifier()))
        .collect();

    model.set_strategy(StrategyKind::ConvertFieldsToRecordMembers);
    let converted: Vec<String> = model.candidates().iter().map(|c| c.target_id().to_string()).collect();
    model.set_strategy(StrategyKind::ConvertFieldsToRecordMembers);
    let again: Vec<String> = model.candidates().iter().map(|c| c.target_id().to_string()).collect();
    assert_eq!(converted, again);
    assert!(model.candidates().iter().all(Candidate::is_converted));
    assert_eq!(model.candidates()[0].backing_identifier(), "this.Count");

    model.set_strategy(StrategyKind::UseBackingFields);
    let after: Vec<(String, String)> = model
        .candidates()
        .iter()
        .map(|c| (c.property_identifier().to_string(), c.backing_identifier()))
        .collect();
    assert!(!model.candidates().iter().any(Candidate::is_converted));
    assert_eq!(before, after);
}

/// Settings made through the decorator land on the wrapped candidate.
#[test]
fn decorator_forwards_settings() {
    let project = single_module(&module_with_fields(&["count".to_string()]));
    let mut model = model_for(&project, "count");
    let id = TargetId::field(project.module(MODULE), "count");

    model.set_strategy(StrategyKind::ConvertFieldsToRecordMembers);
    assert!(model.set_read_only(&id, true));
    assert!(model.set_property_identifier(&id, "Counter"));
    assert!(model.get(&id.rooted_at("this")).is_some());

    model.set_strategy(StrategyKind::UseBackingFields);
    let candidate = &model[&id];
    assert!(candidate.is_read_only());
    assert!(candidate.encapsulate_flag());
    assert_eq!(candidate.property_identifier(), "Counter");
    assert_eq!(model[candidate.declaration().id].target_id(), &id);
}

/// Choosing an existing state record sets its own field aside only while
/// the record-members strategy is active.
#[test]
fn hosting_field_selection_survives_strategy_round_trip() {
    let project = single_module(
        "Option Explicit

Private Type TState
    Total As Long
End Type

Private this As TState
Public count As Long

Public Sub Bump()
    count = count + 1
End Sub
",
    );
    let mut model = model_for(&project, "count");
    let this = TargetId::field(project.module(MODULE), "this");
    assert!(model.set_encapsulate_flag(&this, true));

    model.set_strategy(StrategyKind::ConvertFieldsToRecordMembers);
    assert!(model.select_state_record("this"));
    assert!(!model[&this].encapsulate_flag());

    model.set_strategy(StrategyKind::UseBackingFields);
    assert!(model[&this].encapsulate_flag());

    model.set_strategy(StrategyKind::ConvertFieldsToRecordMembers);
    assert!(!model[&this].encapsulate_flag());
    assert!(!model.select_state_record("missing"));
    assert!(model[&this].encapsulate_flag());
}

/// A deselection frees the name for the next candidate that wants it.
#[test]
fn deselection_releases_names() {
    let project = single_module(&module_with_fields(&["alpha".to_string(), "beta".to_string()]));
    let mut model = model_for(&project, "alpha");
    let alpha = TargetId::field(project.module(MODULE), "alpha");
    let beta = TargetId::field(project.module(MODULE), "beta");

    model.set_property_identifier(&alpha, "Shared");
    model.set_property_identifier(&beta, "Shared");
    model.set_encapsulate_flag(&beta, true);
    assert_eq!(model[&alpha].property_identifier(), "Shared");
    assert_eq!(model[&beta].property_identifier(), "Shared1");

    model.set_encapsulate_flag(&alpha, false);
    assert_eq!(model[&beta].property_identifier(), "Shared");
}

/// Factory output mirrors the module's fields and record shapes.
#[test]
fn factory_builds_candidate_shapes() {
    let project = single_module(
        "Private Type TPoint
    X As Long
End Type

Public pt As TPoint
Public items(3) As Long
Public plain
",
    );
    let config = EncapsulateConfig::default();
    let factory = CandidateFactory::new(&project.graph, &config);
    let candidates = factory.candidates(&project.module(MODULE));

    assert_eq!(candidates.len(), 3);
    assert!(matches!(&candidates[0], Candidate::Record(record) if record.is_expandable() && record.members().len() == 1));
    assert!(matches!(&candidates[1], Candidate::Array(_)));
    assert!(!candidates[1].can_be_read_write());
    assert!(matches!(&candidates[2], Candidate::Field(_)));
    assert!(candidates[2].implement_set());

    let records = factory.state_records(&project.module(MODULE)).unwrap();
    assert_eq!(records.active().map(|r| r.field_identifier()), Some("this"));
}
