//! Declaration graph queries
//!
//! The refactoring never discovers declarations itself. It consumes them
//! through [`DeclarationFinder`], and maps a caller selection to a target
//! through [`SelectedDeclarationProvider`]. [`DeclarationGraph`] is the
//! in-memory implementation of both, and [`ProjectSnapshot`] bundles a graph
//! with the module texts it was resolved from.

use crate::declaration::{Declaration, DeclarationId, DeclarationKind};
use crate::module::{QualifiedModuleName, QualifiedSelection};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Read access to resolved declarations
///
/// Only the three required methods touch storage; everything else is derived.
pub trait DeclarationFinder {
    /// Look up a declaration by id
    fn declaration(&self, id: DeclarationId) -> Option<&Declaration>;

    /// All declarations of a module, in source order
    fn module_declarations(&self, module: &QualifiedModuleName) -> Vec<&Declaration>;

    /// All known modules
    fn modules(&self) -> Vec<&QualifiedModuleName>;

    /// Module-level variables of a module
    fn module_fields(&self, module: &QualifiedModuleName) -> Vec<&Declaration> {
        self.module_declarations(module)
            .into_iter()
            .filter(|d| d.is_module_variable())
            .collect()
    }

    /// Routines of a module (`Sub`, `Function`, properties)
    fn members(&self, module: &QualifiedModuleName) -> Vec<&Declaration> {
        self.module_declarations(module)
            .into_iter()
            .filter(|d| d.kind.is_member())
            .collect()
    }

    /// Members of a record type, in declaration order
    fn record_members(&self, record_type: DeclarationId) -> Vec<&Declaration> {
        let Some(record) = self.declaration(record_type) else {
            return Vec::new();
        };
        self.module_declarations(&record.module)
            .into_iter()
            .filter(|d| d.kind == DeclarationKind::RecordMember && d.parent == Some(record_type))
            .collect()
    }

    /// Every entry of the declaration list `declaration` belongs to,
    /// including itself, ordered by position
    fn list_entries(&self, declaration: &Declaration) -> Vec<&Declaration> {
        if !declaration.declared_in_list {
            return self
                .declaration(declaration.id)
                .into_iter()
                .collect();
        }
        let mut entries: Vec<&Declaration> = self
            .module_declarations(&declaration.module)
            .into_iter()
            .filter(|d| d.declared_in_list && d.spans.statement == declaration.spans.statement)
            .collect();
        entries.sort_by_key(|d| d.spans.context.start());
        entries
    }

    /// Locals and parameters declared inside a routine
    fn scope_locals(&self, scope: DeclarationId) -> Vec<&Declaration> {
        let Some(routine) = self.declaration(scope) else {
            return Vec::new();
        };
        self.module_declarations(&routine.module)
            .into_iter()
            .filter(|d| d.parent == Some(scope))
            .collect()
    }

    /// Find a module by its component name (case-insensitive)
    fn module_named(&self, component: &str) -> Option<&QualifiedModuleName> {
        self.modules()
            .into_iter()
            .find(|m| m.component().eq_ignore_ascii_case(component))
    }
}

/// Maps a caller selection to the declaration under it
pub trait SelectedDeclarationProvider {
    /// Declaration whose identifier (or one of whose references) contains the
    /// selection start
    fn selected_declaration(&self, selection: &QualifiedSelection) -> Option<&Declaration>;
}

/// Errors building or loading a declaration graph
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Declaration id already present
    #[error("duplicate declaration id {0}")]
    DuplicateDeclaration(DeclarationId),

    /// Declaration references a module that was never registered
    #[error("unknown module: {0}")]
    UnknownModule(QualifiedModuleName),

    /// Snapshot (de)serialization failure
    #[error("snapshot format error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// In-memory declaration graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationGraph {
    modules: Vec<QualifiedModuleName>,
    declarations: IndexMap<DeclarationId, Declaration>,
}

impl DeclarationGraph {
    /// Create empty graph
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module; registering twice is harmless
    pub fn add_module(&mut self, module: QualifiedModuleName) {
        if !self.modules.contains(&module) {
            self.modules.push(module);
        }
    }

    /// Add a declaration
    ///
    /// # Errors
    /// Returns error if the id is taken or its module is not registered
    pub fn add(&mut self, declaration: Declaration) -> Result<(), SourceError> {
        if self.declarations.contains_key(&declaration.id) {
            return Err(SourceError::DuplicateDeclaration(declaration.id));
        }
        if !self.modules.contains(&declaration.module) {
            return Err(SourceError::UnknownModule(declaration.module.clone()));
        }
        self.declarations.insert(declaration.id, declaration);
        Ok(())
    }

    /// Mutable access, used by builders to attach references
    #[inline]
    pub fn get_mut(&mut self, id: DeclarationId) -> Option<&mut Declaration> {
        self.declarations.get_mut(&id)
    }

    /// Next unused id
    #[must_use]
    pub fn next_id(&self) -> DeclarationId {
        DeclarationId(self.declarations.keys().map(|id| id.0 + 1).max().unwrap_or(1))
    }

    /// Number of declarations
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// True if there are no declarations
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Iterate over all declarations in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.values()
    }
}

impl DeclarationFinder for DeclarationGraph {
    fn declaration(&self, id: DeclarationId) -> Option<&Declaration> {
        self.declarations.get(&id)
    }

    fn module_declarations(&self, module: &QualifiedModuleName) -> Vec<&Declaration> {
        let mut found: Vec<&Declaration> = self
            .declarations
            .values()
            .filter(|d| &d.module == module)
            .collect();
        found.sort_by_key(|d| d.spans.identifier.start());
        found
    }

    fn modules(&self) -> Vec<&QualifiedModuleName> {
        self.modules.iter().collect()
    }
}

impl SelectedDeclarationProvider for DeclarationGraph {
    fn selected_declaration(&self, selection: &QualifiedSelection) -> Option<&Declaration> {
        let offset = selection.span.start();
        let declared = self.declarations.values().find(|d| {
            d.module == selection.module && d.spans.identifier.contains_offset(offset)
        });
        declared.or_else(|| {
            self.declarations.values().find(|d| {
                d.references
                    .iter()
                    .any(|r| r.module == selection.module && r.span.contains_offset(offset))
            })
        })
    }
}

/// Source text of one module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSource {
    /// Module name
    pub module: QualifiedModuleName,
    /// Full module text
    pub text: String,
}

/// A resolved project: declaration graph plus the texts it was built from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    /// Resolved declarations
    pub declarations: DeclarationGraph,
    /// Module texts
    pub sources: Vec<ModuleSource>,
}

impl ProjectSnapshot {
    /// Parse snapshot JSON
    ///
    /// # Errors
    /// Returns error on malformed JSON or a declaration in an unregistered module
    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        let snapshot: Self = serde_json::from_str(json)?;
        let modules = snapshot.declarations.modules();
        if let Some(orphan) = snapshot
            .declarations
            .iter()
            .find(|d| !modules.contains(&&d.module))
        {
            return Err(SourceError::UnknownModule(orphan.module.clone()));
        }
        Ok(snapshot)
    }

    /// Serialize to pretty JSON
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json(&self) -> Result<String, SourceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
