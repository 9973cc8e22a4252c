//! Testing utilities for the encap workspace
//!
//! Builds a resolved project straight from module text, so fixtures read as
//! source code. The resolver understands the subset tests use: module
//! variables and constants (including `Dim a, b` lists), `Type`/`Enum`
//! blocks, routines with parameters and `Dim` locals, and one level of
//! member access (`rec.Name`, `Module1.count`).

#![allow(missing_docs)]

use encap_source::{
    Accessibility, Declaration, DeclarationFinder, DeclarationGraph, DeclarationId,
    DeclarationKind, DeclarationSpans, IdentifierReference, ModuleSource, ProjectSnapshot,
    QualifiedModuleName, QualifiedSelection, RewritingManager, SourceSpan, SourceStore,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;

pub const PROJECT: &str = "VBAProject";
pub const MODULE: &str = "Module1";

static ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^([A-Za-z_][A-Za-z0-9_]*)(?:\s*\(([^)]*)\))?(?:\s+As\s+(New\s+)?([A-Za-z_][A-Za-z0-9_.]*))?")
        .unwrap()
});
static ROUTINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:(Public|Private|Friend)\s+)?(?:Static\s+)?(Sub|Function|Property\s+Get|Property\s+Let|Property\s+Set)\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(([^)]*)\)(?:\s+As\s+([A-Za-z_][A-Za-z0-9_.]*))?")
        .unwrap()
});
static IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").unwrap());
static TRAILING_IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-z_][A-Za-z0-9_]*)\s*$").unwrap());

const VALUE_TYPES: &[&str] = &[
    "boolean", "byte", "currency", "date", "decimal", "double", "integer", "long", "longlong",
    "longptr", "single", "string", "variant",
];
const PARAMETER_MODIFIERS: &[&str] = &["optional", "byval", "byref", "paramarray"];

/// Builds a [`TestProject`] from module texts
#[derive(Debug, Clone)]
pub struct ProjectBuilder {
    project: String,
    modules: Vec<(String, String)>,
}

impl ProjectBuilder {
    pub fn new(project: &str) -> Self {
        Self {
            project: project.to_string(),
            modules: Vec::new(),
        }
    }

    pub fn module(mut self, component: &str, text: &str) -> Self {
        self.modules.push((component.to_string(), text.to_string()));
        self
    }

    pub fn build(self) -> TestProject {
        let mut resolver = Resolver::default();
        for (component, text) in &self.modules {
            resolver.declare_module(QualifiedModuleName::new(&self.project, component), text);
        }
        resolver.resolve_types();
        for index in 0..resolver.scans.len() {
            resolver.collect_references(index);
        }

        let mut graph = DeclarationGraph::new();
        for scan in &resolver.scans {
            graph.add_module(scan.module.clone());
        }
        for declaration in resolver.declarations {
            graph.add(declaration).unwrap();
        }
        let store = SourceStore::from_sources(
            resolver
                .scans
                .into_iter()
                .map(|scan| (scan.module, scan.text)),
        );
        TestProject {
            project: self.project,
            graph,
            manager: RewritingManager::new(Arc::new(store)),
        }
    }
}

/// One-module project `VBAProject.Module1`
pub fn single_module(text: &str) -> TestProject {
    ProjectBuilder::new(PROJECT).module(MODULE, text).build()
}

/// Resolved declarations plus a rewriting manager over the module texts
#[derive(Debug)]
pub struct TestProject {
    pub project: String,
    pub graph: DeclarationGraph,
    pub manager: RewritingManager,
}

impl TestProject {
    pub fn module(&self, component: &str) -> QualifiedModuleName {
        QualifiedModuleName::new(&self.project, component)
    }

    pub fn store(&self) -> &Arc<SourceStore> {
        self.manager.store()
    }

    /// Current (possibly committed) text of a module
    pub fn text(&self, component: &str) -> String {
        self.store()
            .text(&self.module(component))
            .unwrap_or_else(|| panic!("unknown module {component}"))
    }

    /// First declaration named `name` in the module
    pub fn declaration(&self, component: &str, name: &str) -> &Declaration {
        let module = self.module(component);
        self.graph
            .module_declarations(&module)
            .into_iter()
            .find(|d| d.is_named(name))
            .unwrap_or_else(|| panic!("no declaration {name} in {component}"))
    }

    /// Module variable named `name`
    pub fn field(&self, component: &str, name: &str) -> &Declaration {
        let module = self.module(component);
        self.graph
            .module_fields(&module)
            .into_iter()
            .find(|d| d.is_named(name))
            .unwrap_or_else(|| panic!("no field {name} in {component}"))
    }

    /// Selection covering the first occurrence of `needle`
    pub fn selection(&self, component: &str, needle: &str) -> QualifiedSelection {
        let text = self.text(component);
        let at = text
            .find(needle)
            .unwrap_or_else(|| panic!("{needle:?} not found in {component}"));
        QualifiedSelection::new(self.module(component), SourceSpan::new(at, at + needle.len()))
    }

    pub fn snapshot(&self) -> ProjectSnapshot {
        ProjectSnapshot {
            declarations: self.graph.clone(),
            sources: self
                .graph
                .modules()
                .into_iter()
                .map(|module| ModuleSource {
                    module: module.clone(),
                    text: self.store().text(module).unwrap_or_default(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Block {
    None,
    Type(DeclarationId),
    Enum(DeclarationId),
    Routine(DeclarationId),
}

#[derive(Debug)]
struct ScannedLine {
    offset: usize,
    code_len: usize,
    scope: Option<DeclarationId>,
}

#[derive(Debug)]
struct ModuleScan {
    module: QualifiedModuleName,
    text: String,
    lines: Vec<ScannedLine>,
}

#[derive(Debug, Clone, Copy)]
struct EntryShape {
    kind: DeclarationKind,
    parent: Option<DeclarationId>,
    accessibility: Accessibility,
    visibility: Option<SourceSpan>,
    statement: SourceSpan,
    parameters: bool,
}

#[derive(Debug, Default)]
struct Resolver {
    scans: Vec<ModuleScan>,
    declarations: Vec<Declaration>,
    declared: HashSet<(usize, usize)>,
}

impl Resolver {
    fn next_id(&self) -> DeclarationId {
        DeclarationId(u32::try_from(self.declarations.len() + 1).unwrap())
    }

    fn index(id: DeclarationId) -> usize {
        id.0 as usize - 1
    }

    fn push(&mut self, declaration: Declaration) -> DeclarationId {
        let id = declaration.id;
        self.declared
            .insert((self.scans.len(), declaration.spans.identifier.start()));
        self.declarations.push(declaration);
        id
    }

    #[allow(clippy::too_many_arguments)]
    fn declaration(
        &self,
        module: &QualifiedModuleName,
        name: &str,
        kind: DeclarationKind,
        accessibility: Accessibility,
        parent: Option<DeclarationId>,
        identifier: SourceSpan,
        context: SourceSpan,
        statement: SourceSpan,
        visibility: Option<SourceSpan>,
    ) -> Declaration {
        Declaration {
            id: self.next_id(),
            name: name.to_string(),
            module: module.clone(),
            kind,
            accessibility,
            parent,
            as_type_name: "Variant".to_string(),
            is_type_specified: false,
            array_dimensions: None,
            is_object: false,
            record_type: None,
            declared_in_list: false,
            spans: DeclarationSpans {
                identifier,
                context,
                statement,
                visibility,
                block_end: None,
            },
            references: Vec::new(),
        }
    }

    fn declare_module(&mut self, module: QualifiedModuleName, text: &str) {
        let mut block = Block::None;
        let mut lines = Vec::new();
        let mut offset = 0;

        for raw_line in text.split_inclusive('\n') {
            let line_offset = offset;
            offset += raw_line.len();
            let raw = raw_line.trim_end_matches(['\n', '\r']);
            let code = &raw[..code_end(raw)];
            let lead = code.len() - code.trim_start().len();
            let body = code[lead..].trim_end();
            let body_start = line_offset + lead;
            let statement = SourceSpan::new(body_start, body_start + body.len());
            let scope = match block {
                Block::Routine(id) => Some(id),
                _ => None,
            };
            lines.push(ScannedLine {
                offset: line_offset,
                code_len: code.len(),
                scope,
            });
            if body.is_empty() {
                continue;
            }
            let lower = body.to_ascii_lowercase();

            block = match block {
                Block::Type(id) if lower.starts_with("end type") => self.close(id, statement),
                Block::Enum(id) if lower.starts_with("end enum") => self.close(id, statement),
                Block::Routine(id)
                    if lower.starts_with("end sub")
                        || lower.starts_with("end function")
                        || lower.starts_with("end property") =>
                {
                    self.close(id, statement)
                }
                Block::Type(id) => {
                    let shape = EntryShape {
                        kind: DeclarationKind::RecordMember,
                        parent: Some(id),
                        accessibility: Accessibility::Public,
                        visibility: None,
                        statement,
                        parameters: false,
                    };
                    self.declare_entries(&module, body, body_start, shape);
                    block
                }
                Block::Enum(id) => {
                    let shape = EntryShape {
                        kind: DeclarationKind::EnumMember,
                        parent: Some(id),
                        accessibility: Accessibility::Public,
                        visibility: None,
                        statement,
                        parameters: false,
                    };
                    self.declare_entries(&module, body, body_start, shape);
                    block
                }
                Block::Routine(id) => {
                    let (word, rest) = split_word(body);
                    if word.eq_ignore_ascii_case("dim") || word.eq_ignore_ascii_case("static") {
                        let shape = EntryShape {
                            kind: DeclarationKind::Variable,
                            parent: Some(id),
                            accessibility: Accessibility::Implicit,
                            visibility: Some(SourceSpan::new(body_start, body_start + word.len())),
                            statement,
                            parameters: false,
                        };
                        self.declare_entries(&module, &body[rest..], body_start + rest, shape);
                    }
                    block
                }
                Block::None => self.declare_module_statement(&module, body, body_start, statement),
            };
        }

        self.scans.push(ModuleScan {
            module,
            text: text.to_string(),
            lines,
        });
    }

    fn close(&mut self, id: DeclarationId, end: SourceSpan) -> Block {
        self.declarations[Self::index(id)].spans.block_end = Some(end);
        Block::None
    }

    fn declare_module_statement(
        &mut self,
        module: &QualifiedModuleName,
        body: &str,
        body_start: usize,
        statement: SourceSpan,
    ) -> Block {
        if let Some(caps) = ROUTINE.captures(body) {
            return self.declare_routine(module, &caps, body_start, statement);
        }

        let (word, rest) = split_word(body);
        let keyword = word.to_ascii_lowercase();
        let (accessibility, visibility, rest) = match keyword.as_str() {
            "public" => (Accessibility::Public, true, rest),
            "private" => (Accessibility::Private, true, rest),
            "friend" => (Accessibility::Friend, true, rest),
            "global" => (Accessibility::Global, true, rest),
            "dim" => (Accessibility::Implicit, true, rest),
            _ => (Accessibility::Public, false, 0),
        };
        let visibility = visibility.then(|| SourceSpan::new(body_start, body_start + word.len()));
        let tail = &body[rest..];
        let (second, after_second) = split_word(tail);
        let second = second.to_ascii_lowercase();
        let tail_start = body_start + rest;

        let block_shape = |kind| EntryShape {
            kind,
            parent: None,
            accessibility,
            visibility,
            statement,
            parameters: false,
        };
        match second.as_str() {
            "type" | "enum" => {
                let kind = if second == "type" {
                    DeclarationKind::RecordType
                } else {
                    DeclarationKind::Enum
                };
                let ids = self.declare_entries(
                    module,
                    &tail[after_second..],
                    tail_start + after_second,
                    block_shape(kind),
                );
                match (kind, ids.first()) {
                    (DeclarationKind::RecordType, Some(id)) => Block::Type(*id),
                    (_, Some(id)) => Block::Enum(*id),
                    _ => Block::None,
                }
            }
            "const" => {
                let shape = EntryShape {
                    accessibility: if visibility.is_some() {
                        accessibility
                    } else {
                        Accessibility::Implicit
                    },
                    ..block_shape(DeclarationKind::Constant)
                };
                self.declare_entries(module, &tail[after_second..], tail_start + after_second, shape);
                Block::None
            }
            "declare" => Block::None,
            _ if visibility.is_some() => {
                self.declare_entries(module, tail, tail_start, block_shape(DeclarationKind::Variable));
                Block::None
            }
            _ => Block::None,
        }
    }

    fn declare_routine(
        &mut self,
        module: &QualifiedModuleName,
        caps: &regex::Captures<'_>,
        body_start: usize,
        statement: SourceSpan,
    ) -> Block {
        let kind_text = caps[2].split_whitespace().collect::<Vec<_>>().join(" ").to_ascii_lowercase();
        let kind = match kind_text.as_str() {
            "sub" => DeclarationKind::Procedure,
            "function" => DeclarationKind::Function,
            "property get" => DeclarationKind::PropertyGet,
            "property let" => DeclarationKind::PropertyLet,
            _ => DeclarationKind::PropertySet,
        };
        let accessibility = match caps.get(1).map(|m| m.as_str().to_ascii_lowercase()) {
            Some(v) if v == "private" => Accessibility::Private,
            Some(v) if v == "friend" => Accessibility::Friend,
            _ => Accessibility::Public,
        };
        let visibility = caps
            .get(1)
            .map(|m| SourceSpan::new(body_start + m.start(), body_start + m.end()));
        let name = &caps[3];
        let name_match = caps.get(3).map_or(0..0, |m| m.range());
        let identifier = SourceSpan::new(body_start + name_match.start, body_start + name_match.end);

        let mut routine = self.declaration(
            module, name, kind, accessibility, None, identifier, statement, statement, visibility,
        );
        if let Some(returns) = caps.get(5) {
            routine.as_type_name = returns.as_str().to_string();
            routine.is_type_specified = true;
        }
        let id = self.push(routine);

        if let Some(parameters) = caps.get(4) {
            let shape = EntryShape {
                kind: DeclarationKind::Parameter,
                parent: Some(id),
                accessibility: Accessibility::Implicit,
                visibility: None,
                statement,
                parameters: true,
            };
            self.declare_entries(module, parameters.as_str(), body_start + parameters.start(), shape);
        }
        Block::Routine(id)
    }

    fn declare_entries(
        &mut self,
        module: &QualifiedModuleName,
        list: &str,
        list_start: usize,
        shape: EntryShape,
    ) -> Vec<DeclarationId> {
        let pieces = split_top_level(list);
        let in_list = !shape.parameters && pieces.len() > 1;
        let mut ids = Vec::new();
        for (relative, piece) in pieces {
            let (skipped, piece) = if shape.parameters {
                strip_parameter_modifiers(piece)
            } else {
                (0, piece)
            };
            let Some(caps) = ENTRY.captures(piece) else {
                continue;
            };
            let start = list_start + relative + skipped;
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let mut declaration = self.declaration(
                module,
                name.as_str(),
                shape.kind,
                shape.accessibility,
                shape.parent,
                SourceSpan::new(start + name.start(), start + name.end()),
                SourceSpan::new(start, start + whole.end()),
                shape.statement,
                shape.visibility,
            );
            declaration.array_dimensions = caps.get(2).map(|m| m.as_str().trim().to_string());
            declaration.is_object = caps.get(3).is_some();
            if let Some(ty) = caps.get(4) {
                declaration.as_type_name = ty.as_str().to_string();
                declaration.is_type_specified = true;
            }
            if shape.kind == DeclarationKind::EnumMember {
                declaration.as_type_name = "Long".to_string();
                declaration.is_type_specified = true;
            }
            declaration.declared_in_list = in_list;
            ids.push(self.push(declaration));
        }
        ids
    }

    fn resolve_types(&mut self) {
        let records: Vec<(DeclarationId, QualifiedModuleName, String, bool)> = self
            .declarations
            .iter()
            .filter(|d| d.kind == DeclarationKind::RecordType)
            .map(|d| (d.id, d.module.clone(), d.name.clone(), d.has_private_accessibility()))
            .collect();
        let enums: Vec<String> = self
            .declarations
            .iter()
            .filter(|d| d.kind == DeclarationKind::Enum)
            .map(|d| d.name.to_ascii_lowercase())
            .collect();

        for declaration in &mut self.declarations {
            if !matches!(
                declaration.kind,
                DeclarationKind::Variable | DeclarationKind::RecordMember | DeclarationKind::Parameter
            ) || !declaration.is_type_specified
            {
                continue;
            }
            let ty = declaration.as_type_name.clone();
            let record = records
                .iter()
                .find(|(_, module, name, _)| *module == declaration.module && name.eq_ignore_ascii_case(&ty))
                .or_else(|| {
                    records
                        .iter()
                        .find(|(_, _, name, private)| !private && name.eq_ignore_ascii_case(&ty))
                });
            declaration.record_type = record.map(|(id, ..)| *id);
            let lower = ty.to_ascii_lowercase();
            declaration.is_object = declaration.is_object
                || (declaration.record_type.is_none()
                    && !VALUE_TYPES.contains(&lower.as_str())
                    && !enums.contains(&lower));
        }
    }

    fn collect_references(&mut self, module_index: usize) {
        let mut found: Vec<(usize, IdentifierReference)> = Vec::new();
        let scan = &self.scans[module_index];

        for line in &scan.lines {
            let masked = mask_strings(&scan.text[line.offset..line.offset + line.code_len]);
            for m in IDENT.find_iter(&masked) {
                let start = line.offset + m.start();
                let end = line.offset + m.end();
                if self.declared.contains(&(module_index, start)) {
                    continue;
                }
                if m.start() > 0 && masked.as_bytes()[m.start() - 1].is_ascii_digit() {
                    continue;
                }
                let before = masked[..m.start()].trim_end();
                let after = masked[m.end()..].trim_start();

                let Some(qualified) = before.strip_suffix('.') else {
                    if let Some(index) = self.resolve_name(module_index, line.scope, m.as_str()) {
                        found.push((
                            index,
                            IdentifierReference {
                                module: scan.module.clone(),
                                span: SourceSpan::new(start, end),
                                expression: None,
                                qualifier: None,
                                scope: line.scope,
                                is_assignment: is_assignment(before, after),
                            },
                        ));
                    }
                    continue;
                };

                let Some(qualifier) = TRAILING_IDENT.captures(qualified).and_then(|c| c.get(1)) else {
                    continue;
                };
                if let Some(variable) = self.resolve_name(module_index, line.scope, qualifier.as_str()) {
                    let variable = &self.declarations[variable];
                    let member = variable
                        .record_type
                        .and_then(|record| self.record_member(record, m.as_str()));
                    if let Some(member) = member {
                        found.push((
                            member,
                            IdentifierReference {
                                module: scan.module.clone(),
                                span: SourceSpan::new(start, end),
                                expression: Some(SourceSpan::new(line.offset + qualifier.start(), end)),
                                qualifier: Some(variable.id),
                                scope: line.scope,
                                is_assignment: is_assignment(masked[..qualifier.start()].trim_end(), after),
                            },
                        ));
                    }
                    continue;
                }
                let target_module = self
                    .scans
                    .iter()
                    .position(|s| s.module.component().eq_ignore_ascii_case(qualifier.as_str()));
                if let Some(index) = target_module.and_then(|t| self.module_level(t, m.as_str(), true)) {
                    found.push((
                        index,
                        IdentifierReference {
                            module: scan.module.clone(),
                            span: SourceSpan::new(start, end),
                            expression: None,
                            qualifier: None,
                            scope: line.scope,
                            is_assignment: is_assignment(masked[..qualifier.start()].trim_end(), after),
                        },
                    ));
                }
            }
        }

        for (index, reference) in found {
            self.declarations[index].references.push(reference);
        }
    }

    fn resolve_name(&self, module_index: usize, scope: Option<DeclarationId>, name: &str) -> Option<usize> {
        if let Some(scope) = scope {
            let local = self.declarations.iter().position(|d| {
                d.parent == Some(scope)
                    && d.is_named(name)
                    && matches!(
                        d.kind,
                        DeclarationKind::Variable | DeclarationKind::Parameter | DeclarationKind::Constant
                    )
            });
            if local.is_some() {
                return local;
            }
        }
        self.module_level(module_index, name, false).or_else(|| {
            (0..self.scans.len())
                .filter(|&other| other != module_index)
                .find_map(|other| self.module_level(other, name, true))
        })
    }

    fn module_level(&self, module_index: usize, name: &str, public_only: bool) -> Option<usize> {
        let module = &self.scans.get(module_index)?.module;
        self.declarations.iter().position(|d| {
            &d.module == module
                && d.is_named(name)
                && d.kind.is_module_scoped_name()
                && (d.parent.is_none() || d.kind == DeclarationKind::EnumMember)
                && !(public_only && d.has_private_accessibility())
        })
    }

    fn record_member(&self, record: DeclarationId, name: &str) -> Option<usize> {
        self.declarations.iter().position(|d| {
            d.kind == DeclarationKind::RecordMember && d.parent == Some(record) && d.is_named(name)
        })
    }
}

/// Length of the code before a comment
fn code_end(line: &str) -> usize {
    let mut in_string = false;
    for (index, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '\'' if !in_string => return index,
            _ => {}
        }
    }
    line.len()
}

/// String literal contents blanked, byte offsets preserved
fn mask_strings(code: &str) -> String {
    let mut in_string = false;
    code.chars()
        .flat_map(|c| {
            let masked = if c == '"' {
                in_string = !in_string;
                Some(c)
            } else if in_string {
                None
            } else {
                Some(c)
            };
            let width = c.len_utf8();
            masked.map_or_else(|| vec![' '; width], |c| vec![c])
        })
        .collect()
}

/// First word and the offset where the following word starts
fn split_word(text: &str) -> (&str, usize) {
    let end = text.find(char::is_whitespace).unwrap_or(text.len());
    let rest = text[end..].len() - text[end..].trim_start().len();
    (&text[..end], end + rest)
}

/// Comma-separated pieces outside parentheses, trimmed, with their offsets
fn split_top_level(list: &str) -> Vec<(usize, &str)> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (index, c) in list.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                pieces.push((start, &list[start..index]));
                start = index + 1;
            }
            _ => {}
        }
    }
    pieces.push((start, &list[start..]));
    pieces
        .into_iter()
        .map(|(offset, raw)| (offset + raw.len() - raw.trim_start().len(), raw.trim()))
        .filter(|(_, piece)| !piece.is_empty())
        .collect()
}

fn strip_parameter_modifiers(piece: &str) -> (usize, &str) {
    let mut skipped = 0;
    loop {
        let (word, rest) = split_word(&piece[skipped..]);
        if rest == 0 || !PARAMETER_MODIFIERS.contains(&word.to_ascii_lowercase().as_str()) {
            return (skipped, &piece[skipped..]);
        }
        skipped += rest;
    }
}

fn is_assignment(before: &str, after: &str) -> bool {
    let leading = before.is_empty()
        || before.eq_ignore_ascii_case("set")
        || before.eq_ignore_ascii_case("let");
    leading && after.starts_with('=')
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = "Option Explicit\n\
Private Type TPoint\n    X As Long\n    Y As Long\nEnd Type\n\
Public count As Long, items(1 To 10) As String\n\
Private pt As TPoint\n\
\n\
Public Sub Bump(ByVal step As Long)\n    Dim total As Long\n    count = count + step\n    pt.X = 1 ' count in comment\n    total = count\nEnd Sub\n";

    #[test]
    fn declarations_and_spans() {
        let project = single_module(FIXTURE);
        let count = project.field(MODULE, "count");
        assert!(count.declared_in_list);
        assert_eq!(count.accessibility, Accessibility::Public);
        let text = project.text(MODULE);
        assert_eq!(count.spans.identifier.slice(&text), Some("count"));
        assert_eq!(count.spans.statement.slice(&text), Some("Public count As Long, items(1 To 10) As String"));
        assert_eq!(count.as_type_name, "Long");
        assert!(count.is_type_specified);
        assert_eq!(count.spans.context.slice(&text), Some("count As Long"));

        let items = project.field(MODULE, "items");
        assert_eq!(items.array_dimensions.as_deref(), Some("1 To 10"));
        assert_eq!(items.spans.context.slice(&text), Some("items(1 To 10) As String"));

        let pt = project.field(MODULE, "pt");
        assert!(pt.is_record_typed());
        assert_eq!(pt.as_type_name, "TPoint");
        assert!(!pt.is_object);
        let record = project.declaration(MODULE, "TPoint");
        assert_eq!(record.spans.block_end.and_then(|s| s.slice(&text)), Some("End Type"));
        assert!(project.declaration(MODULE, "step").kind == DeclarationKind::Parameter);
    }

    #[test]
    fn references_skip_comments_and_resolve_members() {
        let project = single_module(FIXTURE);
        let count = project.field(MODULE, "count");
        assert_eq!(count.references.len(), 3);
        assert!(count.references[0].is_assignment);
        assert!(count.references.iter().all(|r| r.scope.is_some()));

        let x = project.declaration(MODULE, "X");
        assert_eq!(x.references.len(), 1);
        let text = project.text(MODULE);
        let reference = &x.references[0];
        assert_eq!(reference.expression.and_then(|s| s.slice(&text)), Some("pt.X"));
        assert_eq!(reference.qualifier, Some(project.field(MODULE, "pt").id));
    }

    #[test]
    fn cross_module_references() {
        let project = ProjectBuilder::new(PROJECT)
            .module("Module1", "Public count As Long\n")
            .module("Module2", "Sub Use()\n    Module1.count = 2\n    Debug.Print count\nEnd Sub\n")
            .build();
        let count = project.field("Module1", "count");
        assert_eq!(count.references.len(), 2);
        assert!(count.references.iter().all(|r| r.module == project.module("Module2")));
        assert!(count.references[0].is_assignment);
    }
}
