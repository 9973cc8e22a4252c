//! Rewrite sessions
//!
//! A session hands out one [`ModuleRewriter`] per module and commits all of
//! them at once. [`RewritingManager`] owns the shared [`SourceStore`] and
//! opens [`MemorySession`]s over it.
//!
//! # Commit protocol
//! 1. Render every checked-out buffer (overlaps fail here)
//! 2. Take the store's write lock
//! 3. Compare each module's current fingerprint with the checkout fingerprint
//! 4. Write all modules, or none

use crate::hash::ContentHash;
use crate::module::QualifiedModuleName;
use crate::rewrite::{ModuleRewriter, RewriteError};
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;
use ulid::Ulid;

/// Unique session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Ulid);

impl SessionId {
    /// Generate a new id
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Accepting edits
    Pending,
    /// All buffers written
    Committed,
    /// Commit rejected; nothing written
    Failed,
}

/// Staged, transactional edits across modules
pub trait RewriteSession {
    /// Session identifier
    fn id(&self) -> SessionId;

    /// Current status
    fn status(&self) -> SessionStatus;

    /// Buffer for `module`; repeated calls return the same buffer
    ///
    /// # Errors
    /// Returns error if the module is unknown
    fn check_out_module_rewriter(
        &mut self,
        module: &QualifiedModuleName,
    ) -> Result<&mut ModuleRewriter, RewriteError>;

    /// Modules checked out so far, in checkout order
    fn checked_out_modules(&self) -> Vec<QualifiedModuleName>;

    /// Apply every staged edit of every buffer, or nothing
    ///
    /// # Errors
    /// Returns error if any buffer fails to render or is stale
    fn try_rewrite(&mut self) -> Result<(), RewriteError>;

    /// Module text with staged edits applied, with runs of blank lines
    /// capped at `max_blank_lines`
    ///
    /// # Errors
    /// Returns error if the module is unknown or its buffer fails to render
    fn get_text(
        &self,
        module: &QualifiedModuleName,
        max_blank_lines: usize,
    ) -> Result<String, RewriteError>;
}

/// Shared module texts
#[derive(Debug, Default)]
pub struct SourceStore {
    modules: RwLock<HashMap<QualifiedModuleName, String>>,
}

impl SourceStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create store from module texts
    #[must_use]
    pub fn from_sources(sources: impl IntoIterator<Item = (QualifiedModuleName, String)>) -> Self {
        Self {
            modules: RwLock::new(sources.into_iter().collect()),
        }
    }

    /// Set a module's text, returning the previous text
    pub fn insert(&self, module: QualifiedModuleName, text: impl Into<String>) -> Option<String> {
        self.modules.write().insert(module, text.into())
    }

    /// Current text of a module
    #[must_use]
    pub fn text(&self, module: &QualifiedModuleName) -> Option<String> {
        self.modules.read().get(module).cloned()
    }

    /// Current fingerprint of a module
    #[must_use]
    pub fn fingerprint(&self, module: &QualifiedModuleName) -> Option<ContentHash> {
        self.modules
            .read()
            .get(module)
            .map(|text| ContentHash::of_text(text))
    }

    /// Known modules, sorted
    #[must_use]
    pub fn modules(&self) -> Vec<QualifiedModuleName> {
        let mut modules: Vec<_> = self.modules.read().keys().cloned().collect();
        modules.sort();
        modules
    }
}

/// Opens sessions over a shared store
#[derive(Debug, Clone)]
pub struct RewritingManager {
    store: Arc<SourceStore>,
}

impl RewritingManager {
    /// Create manager over `store`
    #[inline]
    #[must_use]
    pub fn new(store: Arc<SourceStore>) -> Self {
        Self { store }
    }

    /// Underlying store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<SourceStore> {
        &self.store
    }

    /// Open a new session
    #[must_use]
    pub fn check_out_session(&self) -> MemorySession {
        MemorySession::new(Arc::clone(&self.store))
    }
}

/// In-memory [`RewriteSession`]
#[derive(Debug)]
pub struct MemorySession {
    id: SessionId,
    store: Arc<SourceStore>,
    rewriters: IndexMap<QualifiedModuleName, ModuleRewriter>,
    status: SessionStatus,
}

impl MemorySession {
    /// Create session over `store`
    #[must_use]
    pub fn new(store: Arc<SourceStore>) -> Self {
        Self {
            id: SessionId::new(),
            store,
            rewriters: IndexMap::new(),
            status: SessionStatus::Pending,
        }
    }

    fn fail(&mut self, error: RewriteError) -> Result<(), RewriteError> {
        tracing::warn!(session = %self.id, %error, "rewrite rejected");
        self.status = SessionStatus::Failed;
        Err(error)
    }
}

impl RewriteSession for MemorySession {
    fn id(&self) -> SessionId {
        self.id
    }

    fn status(&self) -> SessionStatus {
        self.status
    }

    fn check_out_module_rewriter(
        &mut self,
        module: &QualifiedModuleName,
    ) -> Result<&mut ModuleRewriter, RewriteError> {
        if !self.rewriters.contains_key(module) {
            let text = self
                .store
                .text(module)
                .ok_or_else(|| RewriteError::UnknownModule(module.clone()))?;
            tracing::debug!(session = %self.id, %module, "checked out module");
            self.rewriters
                .insert(module.clone(), ModuleRewriter::new(module.clone(), text));
        }
        self.rewriters
            .get_mut(module)
            .ok_or_else(|| RewriteError::UnknownModule(module.clone()))
    }

    fn checked_out_modules(&self) -> Vec<QualifiedModuleName> {
        self.rewriters.keys().cloned().collect()
    }

    fn try_rewrite(&mut self) -> Result<(), RewriteError> {
        if self.status != SessionStatus::Pending {
            return Err(RewriteError::SessionCompleted);
        }

        let rendered: Result<Vec<_>, RewriteError> = self
            .rewriters
            .values()
            .filter(|r| r.is_dirty())
            .map(|r| {
                r.render()
                    .map(|text| (r.module().clone(), r.fingerprint(), text))
            })
            .collect();
        let rendered = match rendered {
            Ok(rendered) => rendered,
            Err(error) => return self.fail(error),
        };

        let stale = {
            let mut modules = self.store.modules.write();
            let stale = rendered.iter().find_map(|(module, expected, _)| {
                let actual = modules.get(module).map(|t| ContentHash::of_text(t));
                (actual != Some(*expected)).then(|| RewriteError::Stale {
                    module: module.clone(),
                    expected: expected.short(),
                    actual: actual.map_or_else(|| "missing".to_string(), |h| h.short()),
                })
            });
            if stale.is_none() {
                for (module, _, text) in rendered {
                    modules.insert(module, text);
                }
            }
            stale
        };

        if let Some(error) = stale {
            return self.fail(error);
        }
        self.status = SessionStatus::Committed;
        tracing::debug!(session = %self.id, modules = self.rewriters.len(), "session committed");
        Ok(())
    }

    fn get_text(
        &self,
        module: &QualifiedModuleName,
        max_blank_lines: usize,
    ) -> Result<String, RewriteError> {
        let text = match self.rewriters.get(module) {
            Some(rewriter) => rewriter.render()?,
            None => self
                .store
                .text(module)
                .ok_or_else(|| RewriteError::UnknownModule(module.clone()))?,
        };
        Ok(cap_blank_lines(&text, max_blank_lines))
    }
}

/// Collapse runs of whitespace-only lines to at most `max` lines
#[must_use]
pub fn cap_blank_lines(text: &str, max: usize) -> String {
    let (body, trailing_newline) = match text.strip_suffix('\n') {
        Some(body) => (body, true),
        None => (text, false),
    };

    let mut out: Vec<&str> = Vec::new();
    let mut run = 0;
    for line in body.split('\n') {
        if line.trim().is_empty() {
            run += 1;
            if run > max {
                continue;
            }
        } else {
            run = 0;
        }
        out.push(line);
    }

    let mut joined = out.join("\n");
    if trailing_newline {
        joined.push('\n');
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::SourceSpan;
    use pretty_assertions::assert_eq;

    fn a() -> QualifiedModuleName {
        QualifiedModuleName::new("P", "A")
    }

    fn b() -> QualifiedModuleName {
        QualifiedModuleName::new("P", "B")
    }

    fn manager() -> RewritingManager {
        RewritingManager::new(Arc::new(SourceStore::from_sources([
            (a(), "x = count\n".to_string()),
            (b(), "y = count\n".to_string()),
        ])))
    }

    #[test]
    fn checkout_is_idempotent() {
        let mut session = manager().check_out_session();
        session
            .check_out_module_rewriter(&a())
            .unwrap()
            .replace(SourceSpan::new(4, 9), "Count")
            .unwrap();
        let again = session.check_out_module_rewriter(&a()).unwrap();
        assert_eq!(again.operations().len(), 1);
        assert_eq!(session.checked_out_modules(), vec![a()]);
    }

    #[test]
    fn unknown_module_cannot_be_checked_out() {
        let mut session = manager().check_out_session();
        let missing = QualifiedModuleName::new("P", "Missing");
        assert!(matches!(
            session.check_out_module_rewriter(&missing),
            Err(RewriteError::UnknownModule(_))
        ));
    }

    #[test]
    fn commit_writes_every_module() {
        let manager = manager();
        let mut session = manager.check_out_session();
        for module in [a(), b()] {
            session
                .check_out_module_rewriter(&module)
                .unwrap()
                .replace(SourceSpan::new(4, 9), "Count")
                .unwrap();
        }
        session.try_rewrite().unwrap();
        assert_eq!(session.status(), SessionStatus::Committed);
        assert_eq!(manager.store().text(&a()).unwrap(), "x = Count\n");
        assert_eq!(manager.store().text(&b()).unwrap(), "y = Count\n");
        assert!(matches!(
            session.try_rewrite(),
            Err(RewriteError::SessionCompleted)
        ));
    }

    #[test]
    fn stale_module_aborts_whole_commit() {
        let manager = manager();
        let mut session = manager.check_out_session();
        for module in [a(), b()] {
            session
                .check_out_module_rewriter(&module)
                .unwrap()
                .replace(SourceSpan::new(4, 9), "Count")
                .unwrap();
        }
        manager.store().insert(b(), "y = other\n");

        let err = session.try_rewrite().unwrap_err();
        assert!(matches!(err, RewriteError::Stale { .. }));
        assert_eq!(session.status(), SessionStatus::Failed);
        assert_eq!(manager.store().text(&a()).unwrap(), "x = count\n");
        assert_eq!(manager.store().text(&b()).unwrap(), "y = other\n");
    }

    #[test]
    fn preview_does_not_commit() {
        let manager = manager();
        let mut session = manager.check_out_session();
        session
            .check_out_module_rewriter(&a())
            .unwrap()
            .replace(SourceSpan::new(4, 9), "Count")
            .unwrap();
        assert_eq!(session.get_text(&a(), 3).unwrap(), "x = Count\n");
        assert_eq!(session.get_text(&b(), 3).unwrap(), "y = count\n");
        assert_eq!(manager.store().text(&a()).unwrap(), "x = count\n");
        assert_eq!(session.status(), SessionStatus::Pending);
    }

    #[test]
    fn blank_line_runs_are_capped() {
        let text = "a\n\n\n\n\n\nb\n";
        assert_eq!(cap_blank_lines(text, 3), "a\n\n\n\nb\n");
        assert_eq!(cap_blank_lines(text, 0), "a\nb\n");
        assert_eq!(cap_blank_lines("a\n \n\nb", 1), "a\n \nb");
    }
}
