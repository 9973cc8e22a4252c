use super::{EncapsulationStrategy, NewContent, NewContentKind, StrategyKind};
use crate::attributes::EncapsulationAttributes;
use crate::candidate::{Candidate, EncapsulateFieldCandidate};
use crate::error::RefactorError;
use crate::model::EncapsulationModel;
use crate::state_record::StateRecordOrigin;
use encap_source::{BlockIndenter, Indenter, ModuleRewriter};

/// Move every encapsulated field into the state record
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertFieldsToRecordMembers;

/// `Name(dims) As Type` line of the state record
fn member_declaration(candidate: &Candidate) -> String {
    let declaration = candidate.declaration();
    let dimensions = declaration
        .array_dimensions
        .as_ref()
        .map(|dims| format!("({dims})"))
        .unwrap_or_default();
    format!(
        "{}{dimensions} As {}",
        candidate.property_identifier(),
        declaration.as_type_name
    )
}

impl EncapsulationStrategy for ConvertFieldsToRecordMembers {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ConvertFieldsToRecordMembers
    }

    fn modify_encapsulated_variable(
        &self,
        candidate: &Candidate,
        _attributes: &EncapsulationAttributes,
        rewriter: &mut ModuleRewriter,
        _model: &EncapsulationModel<'_>,
    ) -> Result<(), RefactorError> {
        rewriter.remove(candidate.declaration())?;
        Ok(())
    }

    fn load_new_declarations(
        &self,
        model: &EncapsulationModel<'_>,
        rewriter: &mut ModuleRewriter,
        content: &mut NewContent,
    ) -> Result<(), RefactorError> {
        let Some(state) = model.active_state_record() else {
            return Ok(());
        };
        let members: Vec<String> = model
            .selected_candidates()
            .into_iter()
            .map(member_declaration)
            .collect();
        if members.is_empty() {
            return Ok(());
        }
        let width = model.config().indent_width;

        match state.origin() {
            StateRecordOrigin::Existing { end_type_offset, .. } => {
                let offset = *end_type_offset;
                let line_start = rewriter
                    .original_text()
                    .get(..offset)
                    .map_or(offset, |head| head.rfind('\n').map_or(0, |newline| newline + 1));
                let indent = " ".repeat(width);
                let block: String = members
                    .iter()
                    .map(|member| format!("{indent}{member}\n"))
                    .collect();
                rewriter.insert_before(line_start, block)?;
            }
            StateRecordOrigin::Synthesized => {
                let block = format!(
                    "Private Type {}\n{}\nEnd Type",
                    state.type_identifier(),
                    members.join("\n")
                );
                content.add(
                    NewContentKind::TypeDeclarationBlock,
                    BlockIndenter::new(width).indent(&block).join("\n"),
                );
                content.add(
                    NewContentKind::DeclarationBlock,
                    format!(
                        "Private {} As {}",
                        state.field_identifier(),
                        state.type_identifier()
                    ),
                );
            }
        }
        Ok(())
    }
}
