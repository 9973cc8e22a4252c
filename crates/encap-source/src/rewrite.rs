//! Staged per-module edits
//!
//! A [`ModuleRewriter`] records [`EditOperation`]s against the text a module
//! had when it was checked out. Nothing is applied until [`ModuleRewriter::render`],
//! which lowers every operation to plain span replacements, folds list
//! rebuilds, rejects overlaps and applies the batch in one pass.
//!
//! # Invariants
//! - Every span refers to the original text; edits never see each other
//! - Identical duplicate edits collapse to one
//! - Two edits touching the same bytes are an error, never silently merged

use crate::declaration::{Accessibility, Declaration, DeclarationId};
use crate::graph::DeclarationFinder;
use crate::hash::ContentHash;
use crate::module::{QualifiedModuleName, SourceSpan};

/// The parts of a declaration an edit needs, captured at staging time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationTarget {
    /// Declaration id
    pub id: DeclarationId,
    /// Identifier span
    pub identifier: SourceSpan,
    /// Entry span (`name(dims) As Type`)
    pub context: SourceSpan,
    /// Whole statement span
    pub statement: SourceSpan,
    /// Visibility keyword span
    pub visibility: Option<SourceSpan>,
    /// Part of a multi-variable list
    pub in_list: bool,
}

impl From<&Declaration> for DeclarationTarget {
    fn from(declaration: &Declaration) -> Self {
        Self {
            id: declaration.id,
            identifier: declaration.spans.identifier,
            context: declaration.spans.context,
            statement: declaration.spans.statement,
            visibility: declaration.spans.visibility,
            in_list: declaration.declared_in_list,
        }
    }
}

/// One staged edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOperation {
    /// Overwrite a span
    Replace {
        /// Span to overwrite
        span: SourceSpan,
        /// Replacement text
        text: String,
    },

    /// Insert text before an offset
    InsertBefore {
        /// Insertion offset
        offset: usize,
        /// Inserted text
        text: String,
    },

    /// Append text at the end of the module
    InsertAtEndOfFile {
        /// Appended text
        text: String,
    },

    /// Rename a declaration's identifier
    Rename {
        /// Declaration being renamed
        target: DeclarationTarget,
        /// New identifier
        name: String,
    },

    /// Change a declaration's visibility keyword
    SetVisibility {
        /// Declaration being changed
        target: DeclarationTarget,
        /// New accessibility
        accessibility: Accessibility,
    },

    /// Append ` As Variant` to an implicitly typed declaration
    MakeTypeExplicit {
        /// Declaration being changed
        target: DeclarationTarget,
    },

    /// Remove a standalone declaration statement
    Remove {
        /// Declaration being removed
        target: DeclarationTarget,
    },

    /// Remove an entry of a multi-variable list; must be folded by
    /// [`ModuleRewriter::remove_declarations_from_lists`] before rendering
    RemoveFromList {
        /// Declaration being removed
        target: DeclarationTarget,
    },

    /// Rewrite a list statement keeping only the listed entries
    RebuildList {
        /// Statement span
        statement: SourceSpan,
        /// Entry spans in source order
        entries: Vec<SourceSpan>,
        /// Entry spans to keep
        kept: Vec<SourceSpan>,
    },
}

/// Errors staging or rendering edits
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RewriteError {
    /// Module is not known to the source store
    #[error("unknown module: {0}")]
    UnknownModule(QualifiedModuleName),

    /// Edit targets a declaration of another module
    #[error("declaration {declaration} does not belong to module {module}")]
    ModuleMismatch {
        /// Module of the rewriter
        module: QualifiedModuleName,
        /// Declaration that was passed in
        declaration: DeclarationId,
    },

    /// Span lies outside the module text
    #[error("span {span} is outside module {module} (length {len})")]
    OutOfBounds {
        /// Module of the rewriter
        module: QualifiedModuleName,
        /// Offending span
        span: SourceSpan,
        /// Module text length
        len: usize,
    },

    /// Two edits touch the same text
    #[error("overlapping edits in {module} at {first} and {second}")]
    Overlap {
        /// Module of the rewriter
        module: QualifiedModuleName,
        /// First span
        first: SourceSpan,
        /// Second span
        second: SourceSpan,
    },

    /// A list entry removal was never folded into a list rebuild
    #[error("removal of list entry {declaration} in {module} was not folded")]
    UnresolvedListRemoval {
        /// Module of the rewriter
        module: QualifiedModuleName,
        /// Entry that was removed
        declaration: DeclarationId,
    },

    /// Module changed since checkout
    #[error("module {module} changed since checkout (expected {expected}, found {actual})")]
    Stale {
        /// Stale module
        module: QualifiedModuleName,
        /// Fingerprint at checkout
        expected: String,
        /// Current fingerprint
        actual: String,
    },

    /// Session was already committed or failed
    #[error("session already completed")]
    SessionCompleted,
}

/// A plain replacement after lowering
#[derive(Debug, Clone, PartialEq, Eq)]
struct Splice {
    span: SourceSpan,
    text: String,
}

/// Staged edit buffer for one module
#[derive(Debug, Clone)]
pub struct ModuleRewriter {
    module: QualifiedModuleName,
    original: String,
    fingerprint: ContentHash,
    operations: Vec<EditOperation>,
}

impl ModuleRewriter {
    /// Create a rewriter over the module's current text
    #[must_use]
    pub fn new(module: QualifiedModuleName, text: impl Into<String>) -> Self {
        let original = text.into();
        let fingerprint = ContentHash::of_text(&original);
        Self {
            module,
            original,
            fingerprint,
            operations: Vec::new(),
        }
    }

    /// Module this buffer edits
    #[inline]
    #[must_use]
    pub fn module(&self) -> &QualifiedModuleName {
        &self.module
    }

    /// Text at checkout
    #[inline]
    #[must_use]
    pub fn original_text(&self) -> &str {
        &self.original
    }

    /// Fingerprint of the text at checkout
    #[inline]
    #[must_use]
    pub fn fingerprint(&self) -> ContentHash {
        self.fingerprint
    }

    /// Staged operations, in staging order
    #[inline]
    #[must_use]
    pub fn operations(&self) -> &[EditOperation] {
        &self.operations
    }

    /// True once anything has been staged
    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.operations.is_empty()
    }

    /// Overwrite `span` with `text`
    ///
    /// # Errors
    /// Returns error if the span is outside the module text
    pub fn replace(&mut self, span: SourceSpan, text: impl Into<String>) -> Result<(), RewriteError> {
        self.check_bounds(span)?;
        self.stage(EditOperation::Replace {
            span,
            text: text.into(),
        });
        Ok(())
    }

    /// Insert `text` before `offset`
    ///
    /// # Errors
    /// Returns error if the offset is past the end of the module text
    pub fn insert_before(&mut self, offset: usize, text: impl Into<String>) -> Result<(), RewriteError> {
        self.check_bounds(SourceSpan::at(offset))?;
        self.stage(EditOperation::InsertBefore {
            offset,
            text: text.into(),
        });
        Ok(())
    }

    /// Append `text` to the module
    pub fn insert_at_end_of_file(&mut self, text: impl Into<String>) {
        self.stage(EditOperation::InsertAtEndOfFile { text: text.into() });
    }

    /// Rename `declaration`'s identifier
    ///
    /// # Errors
    /// Returns error if the declaration belongs to another module
    pub fn rename(&mut self, declaration: &Declaration, name: impl Into<String>) -> Result<(), RewriteError> {
        let target = self.target(declaration)?;
        self.stage(EditOperation::Rename {
            target,
            name: name.into(),
        });
        Ok(())
    }

    /// Set the visibility keyword of `declaration`'s statement
    ///
    /// # Errors
    /// Returns error if the declaration belongs to another module
    pub fn set_visibility(
        &mut self,
        declaration: &Declaration,
        accessibility: Accessibility,
    ) -> Result<(), RewriteError> {
        let target = self.target(declaration)?;
        self.stage(EditOperation::SetVisibility {
            target,
            accessibility,
        });
        Ok(())
    }

    /// Make an implicit `Variant` explicit; no-op when the type is written
    ///
    /// # Errors
    /// Returns error if the declaration belongs to another module
    pub fn make_implicit_declaration_type_explicit(
        &mut self,
        declaration: &Declaration,
    ) -> Result<(), RewriteError> {
        let target = self.target(declaration)?;
        if !declaration.is_type_specified {
            self.stage(EditOperation::MakeTypeExplicit { target });
        }
        Ok(())
    }

    /// Remove `declaration`
    ///
    /// List entries are only marked; call
    /// [`remove_declarations_from_lists`](Self::remove_declarations_from_lists)
    /// before rendering.
    ///
    /// # Errors
    /// Returns error if the declaration belongs to another module
    pub fn remove(&mut self, declaration: &Declaration) -> Result<(), RewriteError> {
        let target = self.target(declaration)?;
        let op = if target.in_list {
            EditOperation::RemoveFromList { target }
        } else {
            EditOperation::Remove { target }
        };
        self.stage(op);
        Ok(())
    }

    /// Fold every pending list entry removal into a rebuild of its statement
    pub fn remove_declarations_from_lists(&mut self, finder: &dyn DeclarationFinder) {
        let mut removed: Vec<DeclarationTarget> = Vec::new();
        self.operations.retain(|op| match op {
            EditOperation::RemoveFromList { target } => {
                removed.push(target.clone());
                false
            }
            _ => true,
        });

        let mut statements: Vec<SourceSpan> = removed.iter().map(|t| t.statement).collect();
        statements.sort();
        statements.dedup();

        for statement in statements {
            let Some(sample) = removed
                .iter()
                .find(|t| t.statement == statement)
                .and_then(|t| finder.declaration(t.id))
            else {
                continue;
            };
            let entries: Vec<SourceSpan> = finder
                .list_entries(sample)
                .iter()
                .map(|d| d.spans.context)
                .collect();
            let kept: Vec<SourceSpan> = entries
                .iter()
                .copied()
                .filter(|ctx| !removed.iter().any(|t| t.statement == statement && t.context == *ctx))
                .collect();
            tracing::debug!(
                module = %self.module,
                statement = %statement,
                kept = kept.len(),
                "folding list removal"
            );
            self.stage(EditOperation::RebuildList {
                statement,
                entries,
                kept,
            });
        }
    }

    /// Render the edited text
    ///
    /// # Errors
    /// Returns error on overlapping edits or an unfolded list removal
    pub fn render(&self) -> Result<String, RewriteError> {
        let mut splices: Vec<Splice> = Vec::new();
        let mut rebuilds: Vec<(SourceSpan, &[SourceSpan], &[SourceSpan])> = Vec::new();

        for op in &self.operations {
            match op {
                EditOperation::Replace { span, text } => splices.push(Splice {
                    span: *span,
                    text: text.clone(),
                }),
                EditOperation::InsertBefore { offset, text } => splices.push(Splice {
                    span: SourceSpan::at(*offset),
                    text: text.clone(),
                }),
                EditOperation::InsertAtEndOfFile { text } => splices.push(Splice {
                    span: SourceSpan::at(self.original.len()),
                    text: text.clone(),
                }),
                EditOperation::Rename { target, name } => splices.push(Splice {
                    span: target.identifier,
                    text: name.clone(),
                }),
                EditOperation::SetVisibility {
                    target,
                    accessibility,
                } => splices.push(match target.visibility {
                    Some(span) => Splice {
                        span,
                        text: accessibility.keyword().to_string(),
                    },
                    None => Splice {
                        span: SourceSpan::at(target.statement.start()),
                        text: format!("{} ", accessibility.keyword()),
                    },
                }),
                EditOperation::MakeTypeExplicit { target } => splices.push(Splice {
                    span: SourceSpan::at(target.context.end()),
                    text: " As Variant".to_string(),
                }),
                EditOperation::Remove { target } => splices.push(Splice {
                    span: self.line_span(target.statement),
                    text: String::new(),
                }),
                EditOperation::RemoveFromList { target } => {
                    return Err(RewriteError::UnresolvedListRemoval {
                        module: self.module.clone(),
                        declaration: target.id,
                    })
                }
                EditOperation::RebuildList {
                    statement,
                    entries,
                    kept,
                } => rebuilds.push((*statement, entries.as_slice(), kept.as_slice())),
            }
        }

        dedup_in_order(&mut splices);

        for (statement, entries, kept) in rebuilds {
            let (inner, outer): (Vec<Splice>, Vec<Splice>) = splices
                .into_iter()
                .partition(|s| statement.contains(&s.span));
            splices = outer;
            let rebuilt = if kept.is_empty() {
                Splice {
                    span: self.line_span(statement),
                    text: String::new(),
                }
            } else {
                Splice {
                    span: statement,
                    text: self.rebuild_list(statement, entries, kept, &inner),
                }
            };
            splices.push(rebuilt);
        }

        self.apply(splices)
    }

    fn rebuild_list(
        &self,
        statement: SourceSpan,
        entries: &[SourceSpan],
        kept: &[SourceSpan],
        inner: &[Splice],
    ) -> String {
        let first = entries.first().map_or(statement.start(), SourceSpan::start);
        let last = entries.last().map_or(statement.end(), SourceSpan::end);

        let prefix = self.splice_range(SourceSpan::new(statement.start(), first), inner, true);
        let body: Vec<String> = kept
            .iter()
            .map(|entry| self.splice_range(*entry, inner, false))
            .collect();
        let suffix = self.splice_range(SourceSpan::new(last, statement.end()), inner, false);

        format!("{prefix}{}{suffix}", body.join(", "))
    }

    /// Original text of `range` with the splices inside it applied.
    /// Insertions at `range.start()` belong to the preceding range unless
    /// `leading` is set.
    fn splice_range(&self, range: SourceSpan, splices: &[Splice], leading: bool) -> String {
        let mut out = String::new();
        let mut cursor = range.start();
        let mut local: Vec<&Splice> = splices
            .iter()
            .filter(|s| range.contains(&s.span))
            .filter(|s| leading || !(s.span.is_empty() && s.span.start() == range.start()))
            .collect();
        local.sort_by_key(|s| (s.span.start(), !s.span.is_empty()));
        for splice in local {
            if splice.span.start() < cursor {
                continue;
            }
            out.push_str(&self.original[cursor..splice.span.start()]);
            out.push_str(&splice.text);
            cursor = splice.span.end();
        }
        out.push_str(&self.original[cursor..range.end()]);
        out
    }

    fn apply(&self, mut splices: Vec<Splice>) -> Result<String, RewriteError> {
        // stable: equal-start insertions keep staging order and precede replacements
        splices.sort_by_key(|s| (s.span.start(), !s.span.is_empty()));

        for pair in splices.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a.span.overlaps(&b.span) || (!a.span.is_empty() && b.span.start() < a.span.end()) {
                return Err(RewriteError::Overlap {
                    module: self.module.clone(),
                    first: a.span,
                    second: b.span,
                });
            }
        }

        let mut out = String::with_capacity(self.original.len());
        let mut cursor = 0;
        for splice in &splices {
            out.push_str(&self.original[cursor..splice.span.start()]);
            out.push_str(&splice.text);
            cursor = splice.span.end();
        }
        out.push_str(&self.original[cursor..]);
        Ok(out)
    }

    /// Extend a statement span to its whole line including the line break
    fn line_span(&self, statement: SourceSpan) -> SourceSpan {
        let start = self.original[..statement.start()]
            .rfind('\n')
            .map_or(0, |i| i + 1);
        let end = self.original[statement.end()..]
            .find('\n')
            .map_or(self.original.len(), |i| statement.end() + i + 1);
        SourceSpan::new(start, end)
    }

    fn target(&self, declaration: &Declaration) -> Result<DeclarationTarget, RewriteError> {
        if declaration.module != self.module {
            return Err(RewriteError::ModuleMismatch {
                module: self.module.clone(),
                declaration: declaration.id,
            });
        }
        let target = DeclarationTarget::from(declaration);
        self.check_bounds(target.statement)?;
        Ok(target)
    }

    fn check_bounds(&self, span: SourceSpan) -> Result<(), RewriteError> {
        if span.end() > self.original.len()
            || !self.original.is_char_boundary(span.start())
            || !self.original.is_char_boundary(span.end())
        {
            return Err(RewriteError::OutOfBounds {
                module: self.module.clone(),
                span,
                len: self.original.len(),
            });
        }
        Ok(())
    }

    fn stage(&mut self, op: EditOperation) {
        if !self.operations.contains(&op) {
            self.operations.push(op);
        }
    }
}

fn dedup_in_order(splices: &mut Vec<Splice>) {
    let mut seen: Vec<Splice> = Vec::with_capacity(splices.len());
    splices.retain(|s| {
        if seen.contains(s) {
            false
        } else {
            seen.push(s.clone());
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::{DeclarationKind, DeclarationSpans};
    use crate::graph::DeclarationGraph;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn module() -> QualifiedModuleName {
        QualifiedModuleName::new("P", "M")
    }

    /// Build a variable declaration by locating `entry` inside `statement`
    fn variable(
        id: u32,
        text: &str,
        statement: &str,
        entry: &str,
        in_list: bool,
        typed: bool,
    ) -> Declaration {
        let st = text.find(statement).unwrap();
        let ctx = st + statement.find(entry).unwrap();
        let name_len = entry
            .find(|c: char| !c.is_alphanumeric() && c != '_')
            .unwrap_or(entry.len());
        let keyword_len = statement.find(' ').unwrap();
        Declaration {
            id: DeclarationId(id),
            name: entry[..name_len].to_string(),
            module: module(),
            kind: DeclarationKind::Variable,
            accessibility: if statement.starts_with("Public") {
                Accessibility::Public
            } else {
                Accessibility::Private
            },
            parent: None,
            as_type_name: "Variant".to_string(),
            is_type_specified: typed,
            array_dimensions: None,
            is_object: false,
            record_type: None,
            declared_in_list: in_list,
            spans: DeclarationSpans {
                identifier: SourceSpan::new(ctx, ctx + name_len),
                context: SourceSpan::new(ctx, ctx + entry.len()),
                statement: SourceSpan::new(st, st + statement.len()),
                visibility: Some(SourceSpan::new(st, st + keyword_len)),
                block_end: None,
            },
            references: Vec::new(),
        }
    }

    #[test]
    fn rename_visibility_and_explicit_type_compose() {
        let text = "Public count\n\nSub Foo()\nEnd Sub\n";
        let decl = variable(1, text, "Public count", "count", false, false);
        let mut rw = ModuleRewriter::new(module(), text);
        rw.rename(&decl, "count1").unwrap();
        rw.set_visibility(&decl, Accessibility::Private).unwrap();
        rw.make_implicit_declaration_type_explicit(&decl).unwrap();
        assert_eq!(
            rw.render().unwrap(),
            "Private count1 As Variant\n\nSub Foo()\nEnd Sub\n"
        );
    }

    #[test]
    fn explicit_type_is_left_alone() {
        let text = "Private count As Long\n";
        let decl = variable(1, text, "Private count As Long", "count As Long", false, true);
        let mut rw = ModuleRewriter::new(module(), text);
        rw.make_implicit_declaration_type_explicit(&decl).unwrap();
        assert!(!rw.is_dirty());
        assert_eq!(rw.render().unwrap(), text);
    }

    #[test]
    fn standalone_remove_drops_the_line() {
        let text = "Option Explicit\nPublic count As Long\nPublic other As Long\n";
        let decl = variable(1, text, "Public count As Long", "count As Long", false, true);
        let mut rw = ModuleRewriter::new(module(), text);
        rw.remove(&decl).unwrap();
        assert_eq!(rw.render().unwrap(), "Option Explicit\nPublic other As Long\n");
    }

    #[test]
    fn list_removal_requires_folding() {
        let text = "Public a As Long, b As Long\n";
        let statement = "Public a As Long, b As Long";
        let a = variable(1, text, statement, "a As Long", true, true);
        let mut rw = ModuleRewriter::new(module(), text);
        rw.remove(&a).unwrap();
        assert!(matches!(
            rw.render(),
            Err(RewriteError::UnresolvedListRemoval { .. })
        ));
    }

    #[test]
    fn list_removal_folds_sibling_edits() {
        let text = "Private a As Long, b, c As String\n";
        let statement = "Private a As Long, b, c As String";
        let a = variable(1, text, statement, "a As Long", true, true);
        let b = variable(2, text, statement, "b", true, false);
        let c = variable(3, text, statement, "c As String", true, true);

        let mut graph = DeclarationGraph::new();
        graph.add_module(module());
        for d in [&a, &b, &c] {
            graph.add(d.clone()).unwrap();
        }

        let mut rw = ModuleRewriter::new(module(), text);
        rw.remove(&a).unwrap();
        rw.rename(&b, "b1").unwrap();
        rw.make_implicit_declaration_type_explicit(&b).unwrap();
        rw.remove_declarations_from_lists(&graph);
        assert_eq!(rw.render().unwrap(), "Private b1 As Variant, c As String\n");
    }

    #[test]
    fn removing_every_list_entry_drops_the_line() {
        let text = "Public x, y\nPublic z\n";
        let statement = "Public x, y";
        let a = variable(1, text, statement, "x", true, false);
        let b = variable(2, text, statement, "y", true, false);
        let mut graph = DeclarationGraph::new();
        graph.add_module(module());
        graph.add(a.clone()).unwrap();
        graph.add(b.clone()).unwrap();

        let mut rw = ModuleRewriter::new(module(), text);
        rw.remove(&a).unwrap();
        rw.remove(&b).unwrap();
        rw.remove_declarations_from_lists(&graph);
        assert_eq!(rw.render().unwrap(), "Public z\n");
    }

    #[test]
    fn duplicate_edits_collapse_and_overlaps_fail() {
        let text = "x = count + count\n";
        let mut rw = ModuleRewriter::new(module(), text);
        rw.replace(SourceSpan::new(4, 9), "Count").unwrap();
        rw.replace(SourceSpan::new(4, 9), "Count").unwrap();
        rw.replace(SourceSpan::new(12, 17), "Count").unwrap();
        assert_eq!(rw.operations().len(), 2);
        assert_eq!(rw.render().unwrap(), "x = Count + Count\n");

        rw.replace(SourceSpan::new(6, 11), "zz").unwrap();
        assert!(matches!(rw.render(), Err(RewriteError::Overlap { .. })));
    }

    #[test]
    fn insertions_keep_staging_order() {
        let text = "Sub Foo()\nEnd Sub\n";
        let mut rw = ModuleRewriter::new(module(), text);
        rw.insert_before(0, "A\n").unwrap();
        rw.insert_before(0, "B\n").unwrap();
        rw.insert_at_end_of_file("C\n");
        assert_eq!(rw.render().unwrap(), "A\nB\nSub Foo()\nEnd Sub\nC\n");
    }

    #[test]
    fn out_of_bounds_and_foreign_declarations_are_rejected() {
        let text = "Public a As Long\n";
        let mut rw = ModuleRewriter::new(module(), text);
        assert!(matches!(
            rw.replace(SourceSpan::new(10, 100), "x"),
            Err(RewriteError::OutOfBounds { .. })
        ));

        let mut foreign = variable(1, text, "Public a As Long", "a As Long", false, true);
        foreign.module = QualifiedModuleName::new("P", "Other");
        assert!(matches!(
            rw.rename(&foreign, "b"),
            Err(RewriteError::ModuleMismatch { .. })
        ));
    }

    proptest! {
        #[test]
        fn folded_list_keeps_remaining_entries_in_order(removed in prop::collection::vec(any::<bool>(), 1..6)) {
            let entries: Vec<String> = (0..removed.len()).map(|i| format!("v{i} As Long")).collect();
            let statement = format!("Public {}", entries.join(", "));
            let text = format!("{statement}\nPublic z\n");
            let declarations: Vec<Declaration> = entries
                .iter()
                .enumerate()
                .map(|(i, entry)| variable(u32::try_from(i).unwrap() + 1, &text, &statement, entry, true, true))
                .collect();
            let mut graph = DeclarationGraph::new();
            graph.add_module(module());
            for declaration in &declarations {
                graph.add(declaration.clone()).unwrap();
            }

            let mut rw = ModuleRewriter::new(module(), text.as_str());
            for (declaration, remove) in declarations.iter().zip(&removed) {
                if *remove {
                    rw.remove(declaration).unwrap();
                }
            }
            rw.remove_declarations_from_lists(&graph);

            let kept: Vec<&str> = entries
                .iter()
                .zip(&removed)
                .filter(|(_, remove)| !**remove)
                .map(|(entry, _)| entry.as_str())
                .collect();
            let expected = if kept.is_empty() {
                "Public z\n".to_string()
            } else if kept.len() == entries.len() {
                text.clone()
            } else {
                format!("Public {}\nPublic z\n", kept.join(", "))
            };
            prop_assert_eq!(rw.render().unwrap(), expected);
        }
    }
}
