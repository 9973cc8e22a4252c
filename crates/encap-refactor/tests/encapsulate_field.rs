//! End-to-end encapsulate-field scenarios.
//!
//! Guarantees exercised here:
//! - Both strategies produce the expected module text, with new content in
//!   record type, declaration, property order ahead of the first routine.
//! - References are rewritten per module: the declaring module reaches the
//!   storage directly under the record-members strategy, other modules go
//!   through the property.
//! - A session commits every module or none.
//! - Invalid invocations and invalid names fail before anything is written.

use encap_refactor::prelude::*;
use encap_refactor::{strategy_for, DEFAULT_PREVIEW_MARKER};
use encap_source::{CancellationToken, RewriteError, RewriteSession, SessionStatus};
use encap_test_utils::{single_module, ProjectBuilder, TestProject, MODULE, PROJECT};
use pretty_assertions::assert_eq;

fn refactoring(project: &TestProject) -> EncapsulateFieldRefactoring<'_> {
    EncapsulateFieldRefactoring::new(&project.graph, &project.manager, EncapsulateConfig::default())
}

fn target(project: &TestProject, component: &str, field: &str) -> TargetId {
    TargetId::field(project.module(component), field)
}

const COUNTER: &str = "Option Explicit

Public count As Long

Public Sub Bump()
    count = count + 1
End Sub
";

/// A public scalar becomes a private, renamed backing field behind a Get/Let
/// pair, and every reference goes through the property.
#[test]
fn backing_fields_end_to_end() {
    let project = single_module(COUNTER);
    let refactoring = refactoring(&project);
    let outcome = refactoring
        .encapsulate(&target(&project, MODULE, "count"), |_| {})
        .unwrap();

    assert_eq!(outcome.modules, vec![project.module(MODULE)]);
    assert_eq!(
        project.text(MODULE),
        "Option Explicit

Private count1 As Long

Public Property Get Count() As Long
    Count = count1
End Property

Public Property Let Count(ByVal value As Long)
    count1 = value
End Property

Public Sub Bump()
    Count = Count + 1
End Sub
"
    );
}

/// Selected fields fold into one synthesized state record named `state`; the
/// type comes first, then its field, then the properties, all before the
/// first routine.
#[test]
fn record_members_insertion_order() {
    let project = single_module(
        "Option Explicit

Public count As Integer
Public items(1 To 3) As String

Public Sub Fill()
    count = 3
    items(1) = \"a\"
End Sub
",
    );
    let config = EncapsulateConfig::default().with_state_field_name("state");
    let refactoring = EncapsulateFieldRefactoring::new(&project.graph, &project.manager, config);
    let items = target(&project, MODULE, "items");
    refactoring
        .encapsulate(&target(&project, MODULE, "count"), |model| {
            model.set_strategy(StrategyKind::ConvertFieldsToRecordMembers);
            assert!(model.set_encapsulate_flag(&items, true));
        })
        .unwrap();

    assert_eq!(
        project.text(MODULE),
        "Option Explicit


Private Type TModule1
    Count As Integer
    Items(1 To 3) As String
End Type

Private state As TModule1

Public Property Get Count() As Integer
    Count = state.Count
End Property

Public Property Let Count(ByVal value As Integer)
    state.Count = value
End Property

Public Property Get Items() As Variant
    Items = state.Items
End Property

Public Sub Fill()
    state.Count = 3
    state.Items(1) = \"a\"
End Sub
"
    );
}

/// Members are appended to an existing private record type when it is the
/// selected state record.
#[test]
fn existing_state_record_receives_members() {
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
    let refactoring = refactoring(&project);
    refactoring
        .encapsulate(&target(&project, MODULE, "count"), |model| {
            model.set_strategy(StrategyKind::ConvertFieldsToRecordMembers);
            assert!(model.select_state_record("this"));
        })
        .unwrap();

    assert_eq!(
        project.text(MODULE),
        "Option Explicit

Private Type TState
    Total As Long
    Count As Long
End Type

Private this As TState

Public Property Get Count() As Long
    Count = this.Count
End Property

Public Property Let Count(ByVal value As Long)
    this.Count = value
End Property

Public Sub Bump()
    this.Count = this.Count + 1
End Sub
"
    );
}

/// Same-module references use the storage, other modules the property.
#[test]
fn references_are_routed_per_module() {
    let project = ProjectBuilder::new(PROJECT)
        .module("Module1", "Public count As Long\n\nPublic Sub Bump()\n    count = count + 1\nEnd Sub\n")
        .module("Module2", "Sub Use()\n    Module1.count = 2\n    Debug.Print count\nEnd Sub\n")
        .build();
    let refactoring = refactoring(&project);
    let outcome = refactoring
        .encapsulate(&target(&project, "Module1", "count"), |model| {
            model.set_strategy(StrategyKind::ConvertFieldsToRecordMembers);
        })
        .unwrap();

    assert_eq!(outcome.modules.len(), 2);
    assert!(project.text("Module1").contains("    this.Count = this.Count + 1\n"));
    assert_eq!(
        project.text("Module2"),
        "Sub Use()\n    Module1.Count = 2\n    Debug.Print Count\nEnd Sub\n"
    );
}

/// Members of an expandable record field get their own properties, and a
/// member access through the field is rewritten as a whole.
#[test]
fn record_field_members_get_properties() {
    let project = single_module(
        "Private Type TPoint
    X As Long
    Y As Long
End Type

Public pt As TPoint

Public Sub Shift()
    pt.X = pt.X + 1
End Sub
",
    );
    let refactoring = refactoring(&project);
    refactoring
        .encapsulate(&target(&project, MODULE, "pt"), |_| {})
        .unwrap();

    let text = project.text(MODULE);
    assert!(text.contains("Private pt1 As TPoint\n"));
    assert!(text.contains("Public Property Let Pt(ByRef value As TPoint)\n    pt1 = value\nEnd Property"));
    assert!(text.contains("Public Property Get X() As Long\n    X = pt1.X\nEnd Property"));
    assert!(text.contains("Public Property Let Y(ByVal value As Long)\n    pt1.Y = value\nEnd Property"));
    assert!(text.contains("    X = X + 1\n"));
}

/// Public entries of a declaration list are removed from it and redeclared
/// privately; the remaining entries keep their statement.
#[test]
fn declaration_lists_are_folded() {
    let project = single_module(
        "Public a As Long, b As String, c As Long

Sub Touch()
    a = c
End Sub
",
    );
    let refactoring = refactoring(&project);
    let c = target(&project, MODULE, "c");
    refactoring
        .encapsulate(&target(&project, MODULE, "a"), |model| {
            assert!(model.set_encapsulate_flag(&c, true));
        })
        .unwrap();

    let text = project.text(MODULE);
    assert!(text.starts_with("Public b As String\n"));
    assert!(text.contains("Private a1 As Long\nPrivate c1 As Long\n\nPublic Property Get A() As Long"));
    assert!(text.contains("    A = C\n"));
}

/// A private field that already has a name of its own is kept as the
/// backing field: no rename, no visibility change, only an explicit type.
#[test]
fn private_backing_field_keeps_its_declaration() {
    let project = single_module(
        "Option Explicit

Private mCount
Private mTotal As Long

Public Sub Bump()
    mCount = mCount + mTotal
End Sub
",
    );
    let refactoring = refactoring(&project);
    let count = target(&project, MODULE, "mCount");
    let total = target(&project, MODULE, "mTotal");
    refactoring
        .encapsulate(&count, |model| {
            assert!(model.set_property_identifier(&count, "Count"));
            assert!(model.set_encapsulate_flag(&total, true));
            assert!(model.set_property_identifier(&total, "Total"));
        })
        .unwrap();

    let text = project.text(MODULE);
    assert!(text.starts_with("Option Explicit\n\nPrivate mCount As Variant\nPrivate mTotal As Long\n\n"));
    assert!(text.contains("Public Property Get Total() As Long\n    Total = mTotal\nEnd Property"));
    assert!(text.contains("Public Property Get Count() As Variant\n"));
    assert!(text.contains("    Count = Count + Total\n"));
    assert!(!text.contains("mCount1"));
    assert!(!text.contains("mTotal1"));
}

/// Read-only requests drop the Let; deselecting every candidate writes nothing.
#[test]
fn read_only_and_no_op() {
    let project = single_module(COUNTER);
    let refactoring = refactoring(&project);
    let count = target(&project, MODULE, "count");

    let outcome = refactoring
        .encapsulate(&count, |model| {
            assert!(model.set_encapsulate_flag(&count, false));
        })
        .unwrap();
    assert!(outcome.modules.is_empty());
    assert_eq!(project.text(MODULE), COUNTER);

    refactoring
        .encapsulate(&count, |model| {
            assert!(model.set_read_only(&count, true));
        })
        .unwrap();
    let text = project.text(MODULE);
    assert!(text.contains("Public Property Get Count() As Long"));
    assert!(!text.contains("Property Let"));
}

/// Preview renders the marker and leaves the store untouched.
#[test]
fn preview_does_not_commit() {
    let project = single_module(COUNTER);
    let refactoring = refactoring(&project);
    let model = refactoring
        .initialize_model(&target(&project, MODULE, "count"))
        .unwrap();

    let preview = refactoring.preview(&model).unwrap();
    assert!(preview.contains(&format!("End Property\n\n{DEFAULT_PREVIEW_MARKER}\n\nPublic Sub Bump()")));
    assert_eq!(project.text(MODULE), COUNTER);
}

/// A stale module fails the whole session; the other module is not written.
#[test]
fn commit_is_all_or_nothing() {
    let project = ProjectBuilder::new(PROJECT)
        .module("Module1", "Public count As Long\n")
        .module("Module2", "Sub Use()\n    count = 2\nEnd Sub\n")
        .build();
    let refactoring = refactoring(&project);
    let model = refactoring
        .initialize_model(&target(&project, "Module1", "count"))
        .unwrap();

    let mut session = project.manager.check_out_session();
    strategy_for(model.strategy())
        .apply(&model, &mut session, false)
        .unwrap();
    project
        .store()
        .insert(project.module("Module2"), "Sub Use()\nEnd Sub\n");

    assert!(matches!(session.try_rewrite(), Err(RewriteError::Stale { .. })));
    assert_eq!(session.status(), SessionStatus::Failed);
    assert_eq!(project.text("Module1"), "Public count As Long\n");
    assert!(matches!(session.try_rewrite(), Err(RewriteError::SessionCompleted)));
}

/// Selections that are not module variables are rejected up front.
#[test]
fn invocation_errors() {
    let project = single_module(
        "Option Explicit

Public count As Long

Public Sub Bump(ByVal step As Long)
    Dim total As Long
    total = step
End Sub
",
    );
    let refactoring = refactoring(&project);
    let select = |needle: &str| refactoring.select_target(&project.graph, &project.selection(MODULE, needle));

    assert!(matches!(select("Option"), Err(RefactorError::NoTarget)));
    assert!(matches!(select("step As"), Err(RefactorError::TargetIsParameter { .. })));
    assert!(matches!(select("total As"), Err(RefactorError::TargetNotModuleScoped { .. })));
    assert!(matches!(select("Bump"), Err(RefactorError::InvalidDeclarationType { .. })));
    assert_eq!(select("count").unwrap(), target(&project, MODULE, "count"));

    assert!(matches!(refactoring.target_named(MODULE, "missing"), Err(RefactorError::NoTarget)));
    assert!(matches!(refactoring.target_named("Nowhere", "count"), Err(RefactorError::NoTarget)));
    assert!(RefactorError::NoTarget.is_invocation_error());
}

/// An illegal property name blocks the commit before anything is staged.
#[test]
fn invalid_property_name_is_rejected_at_commit() {
    let project = single_module(COUNTER);
    let refactoring = refactoring(&project);
    let count = target(&project, MODULE, "count");
    let result = refactoring.encapsulate(&count, |model| {
        assert!(model.set_property_identifier(&count, "1abc"));
    });

    assert!(matches!(result, Err(RefactorError::InvalidEncapsulationAttributes { .. })));
    assert_eq!(project.text(MODULE), COUNTER);
}

/// A cancelled token stops at the next checkpoint without writing.
#[test]
fn cancellation_stops_before_commit() {
    let project = single_module(COUNTER);
    let token = CancellationToken::new();
    let refactoring = refactoring(&project).with_cancellation(token.clone());
    let model = refactoring
        .initialize_model(&target(&project, MODULE, "count"))
        .unwrap();

    token.cancel();
    assert!(matches!(refactoring.refactor(&model), Err(RefactorError::Cancelled)));
    assert!(matches!(
        refactoring.initialize_model(&target(&project, MODULE, "count")),
        Err(RefactorError::Cancelled)
    ));
    assert_eq!(project.text(MODULE), COUNTER);
}
