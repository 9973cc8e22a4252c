//! Refactoring entry points
//!
//! ```text
//! selection ──select_target──▶ TargetId ──initialize_model──▶ EncapsulationModel
//!                                                                │  (user toggles)
//!                                             preview ◀──────────┤
//!                                             refactor ──────────┴──▶ committed session
//! ```

use crate::candidate::{EncapsulateFieldCandidate, TargetId};
use crate::config::EncapsulateConfig;
use crate::error::RefactorError;
use crate::factory::CandidateFactory;
use crate::model::EncapsulationModel;
use crate::strategy::strategy_for;
use encap_source::{
    CancellationToken, Declaration, DeclarationFinder, DeclarationKind, QualifiedModuleName,
    QualifiedSelection, RewriteSession, RewritingManager, SelectedDeclarationProvider, SessionId,
};

/// Result of a committed refactoring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefactorOutcome {
    /// Committed session
    pub session: SessionId,
    /// Modules the session wrote
    pub modules: Vec<QualifiedModuleName>,
}

/// Encapsulate-field refactoring over one declaration graph
pub struct EncapsulateFieldRefactoring<'a> {
    finder: &'a dyn DeclarationFinder,
    manager: &'a RewritingManager,
    config: EncapsulateConfig,
    cancel: CancellationToken,
}

impl<'a> EncapsulateFieldRefactoring<'a> {
    /// Create refactoring
    #[must_use]
    pub fn new(
        finder: &'a dyn DeclarationFinder,
        manager: &'a RewritingManager,
        config: EncapsulateConfig,
    ) -> Self {
        Self {
            finder,
            manager,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// With a caller-owned cancellation token
    #[inline]
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EncapsulateConfig {
        &self.config
    }

    /// Resolve a caller selection to a target
    ///
    /// # Errors
    /// - `NoTarget` if nothing is selected
    /// - `TargetIsParameter`, `InvalidDeclarationType` or
    ///   `TargetNotModuleScoped` if the selection is not a module variable
    pub fn select_target(
        &self,
        provider: &dyn SelectedDeclarationProvider,
        selection: &QualifiedSelection,
    ) -> Result<TargetId, RefactorError> {
        let Some(declaration) = provider.selected_declaration(selection) else {
            tracing::warn!(module = %selection.module, span = %selection.span, "no declaration selected");
            return Err(RefactorError::NoTarget);
        };
        check_target(declaration)?;
        Ok(TargetId::field(declaration.module.clone(), &declaration.name))
    }

    /// Resolve `field` in the module named `component`
    ///
    /// # Errors
    /// Same as [`select_target`](Self::select_target)
    pub fn target_named(&self, component: &str, field: &str) -> Result<TargetId, RefactorError> {
        let module = self
            .finder
            .module_named(component)
            .ok_or(RefactorError::NoTarget)?;
        let declarations = self.finder.module_declarations(module);
        let declaration = declarations
            .iter()
            .find(|d| d.is_named(field) && d.is_module_variable())
            .or_else(|| declarations.iter().find(|d| d.is_named(field)))
            .ok_or(RefactorError::NoTarget)?;
        check_target(declaration)?;
        Ok(TargetId::field(declaration.module.clone(), &declaration.name))
    }

    /// Build the model for `target` with the target selected
    ///
    /// # Errors
    /// Returns error if cancelled, if no legal state record name exists or
    /// if `target` is not a field of its module
    pub fn initialize_model(&self, target: &TargetId) -> Result<EncapsulationModel<'a>, RefactorError> {
        self.cancel.check()?;
        let factory = CandidateFactory::new(self.finder, &self.config);
        let module = target.module().clone();
        let candidates = factory.candidates(&module);
        let state_records = factory.state_records(&module)?;
        let count = candidates.len();

        let mut model =
            EncapsulationModel::new(self.finder, module, candidates, state_records, self.config.clone());
        if !model.set_encapsulate_flag(target, true) {
            tracing::warn!(target_id = %target, "target is not an encapsulation candidate");
            return Err(RefactorError::NoTarget);
        }
        tracing::info!(target_id = %target, candidates = count, strategy = %model.strategy(), "model initialized");
        Ok(model)
    }

    /// Initialize a model and run `interaction` against it without committing
    ///
    /// # Errors
    /// Same as [`initialize_model`](Self::initialize_model)
    pub fn initialize_with(
        &self,
        target: &TargetId,
        interaction: impl FnOnce(&mut EncapsulationModel<'a>),
    ) -> Result<EncapsulationModel<'a>, RefactorError> {
        let mut model = self.initialize_model(target)?;
        interaction(&mut model);
        Ok(model)
    }

    /// Target module text with every edit applied, followed by the
    /// end-of-changes marker; nothing is committed
    ///
    /// # Errors
    /// Returns error if an edit cannot be staged or rendered
    pub fn preview(&self, model: &EncapsulationModel<'_>) -> Result<String, RefactorError> {
        let mut session = self.manager.check_out_session();
        strategy_for(model.strategy()).apply(model, &mut session, true)?;
        let text = session.get_text(model.module(), model.config().preview.max_blank_lines)?;
        Ok(text)
    }

    /// Validate, stage and commit
    ///
    /// # Errors
    /// - `InvalidEncapsulationAttributes` before anything is staged
    /// - `Cancelled` at the staging and commit checkpoints
    /// - `RewriteFailed` if the commit is rejected; nothing is written
    pub fn refactor(&self, model: &EncapsulationModel<'_>) -> Result<RefactorOutcome, RefactorError> {
        for candidate in model.selected_candidates() {
            candidate
                .try_validate_encapsulation_attributes()
                .map_err(|reason| {
                    tracing::warn!(candidate = %candidate.target_id(), %reason, "invalid encapsulation attributes");
                    RefactorError::InvalidEncapsulationAttributes {
                        target: candidate.target_id().to_string(),
                        reason,
                    }
                })?;
        }

        self.cancel.check()?;
        let mut session = self.manager.check_out_session();
        strategy_for(model.strategy()).apply(model, &mut session, false)?;

        self.cancel.check()?;
        let id = session.id();
        let modules = session.checked_out_modules();
        if let Err(source) = session.try_rewrite() {
            tracing::warn!(session = %id, error = %source, "commit rejected");
            return Err(RefactorError::RewriteFailed {
                session: id,
                modules,
                source,
            });
        }
        tracing::info!(
            session = %id,
            modules = modules.len(),
            strategy = %model.strategy(),
            "encapsulate field committed"
        );
        Ok(RefactorOutcome { session: id, modules })
    }

    /// Initialize, interact and commit in one call
    ///
    /// # Errors
    /// Any error of [`initialize_model`](Self::initialize_model) or
    /// [`refactor`](Self::refactor)
    pub fn encapsulate(
        &self,
        target: &TargetId,
        interaction: impl FnOnce(&mut EncapsulationModel<'a>),
    ) -> Result<RefactorOutcome, RefactorError> {
        let model = self.initialize_with(target, interaction)?;
        self.refactor(&model)
    }
}

fn check_target(declaration: &Declaration) -> Result<(), RefactorError> {
    let name = declaration.name.clone();
    let result = match declaration.kind {
        DeclarationKind::Parameter => Err(RefactorError::TargetIsParameter { name }),
        DeclarationKind::Variable if declaration.parent.is_some() => {
            Err(RefactorError::TargetNotModuleScoped { name })
        }
        DeclarationKind::Variable => Ok(()),
        kind => Err(RefactorError::InvalidDeclarationType { name, kind }),
    };
    if let Err(err) = &result {
        tracing::warn!(declaration = %declaration.name, error = %err, "target rejected");
    }
    result
}
