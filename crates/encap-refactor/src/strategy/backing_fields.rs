use super::{EncapsulationStrategy, NewContent, NewContentKind, StrategyKind};
use crate::attributes::EncapsulationAttributes;
use crate::candidate::{Candidate, EncapsulateFieldCandidate};
use crate::error::RefactorError;
use crate::model::EncapsulationModel;
use encap_source::{Accessibility, Declaration, ModuleRewriter};

/// Keep each field as a private backing field behind its property
#[derive(Debug, Clone, Copy, Default)]
pub struct UseBackingFields;

/// Public entries of a declaration list cannot be made private alone
fn needs_redeclaration(declaration: &Declaration) -> bool {
    declaration.declared_in_list && !declaration.has_private_accessibility()
}

impl EncapsulationStrategy for UseBackingFields {
    fn kind(&self) -> StrategyKind {
        StrategyKind::UseBackingFields
    }

    fn modify_encapsulated_variable(
        &self,
        candidate: &Candidate,
        attributes: &EncapsulationAttributes,
        rewriter: &mut ModuleRewriter,
        _model: &EncapsulationModel<'_>,
    ) -> Result<(), RefactorError> {
        let declaration = candidate.declaration();
        if needs_redeclaration(declaration) {
            rewriter.remove(declaration)?;
            return Ok(());
        }

        let backing = attributes.backing_identifier();
        if backing != declaration.name {
            rewriter.rename(declaration, backing)?;
        }
        if !declaration.has_private_accessibility() {
            rewriter.set_visibility(declaration, Accessibility::Private)?;
        }
        rewriter.make_implicit_declaration_type_explicit(declaration)?;
        Ok(())
    }

    fn load_new_declarations(
        &self,
        model: &EncapsulationModel<'_>,
        _rewriter: &mut ModuleRewriter,
        content: &mut NewContent,
    ) -> Result<(), RefactorError> {
        for candidate in model.selected_candidates() {
            let declaration = candidate.declaration();
            if !needs_redeclaration(declaration) {
                continue;
            }
            let dimensions = declaration
                .array_dimensions
                .as_ref()
                .map(|dims| format!("({dims})"))
                .unwrap_or_default();
            content.add(
                NewContentKind::DeclarationBlock,
                format!(
                    "Private {}{dimensions} As {}",
                    candidate.backing_identifier(),
                    declaration.as_type_name
                ),
            );
        }
        Ok(())
    }
}
