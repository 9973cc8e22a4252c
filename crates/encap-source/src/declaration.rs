//! Declarations and reference sites
//!
//! These are the read-only products of the (external) resolver: one
//! [`Declaration`] per named program entity and one [`IdentifierReference`]
//! per use site.

use crate::module::{QualifiedModuleName, SourceSpan};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Stable declaration identifier within one declaration graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeclarationId(pub u32);

impl Display for DeclarationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of declared entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    /// Variable (module field or local)
    Variable,
    /// Constant
    Constant,
    /// Routine parameter
    Parameter,
    /// User-defined record type (`Type ... End Type`)
    RecordType,
    /// Member of a record type
    RecordMember,
    /// `Sub`
    Procedure,
    /// `Function`
    Function,
    /// `Property Get`
    PropertyGet,
    /// `Property Let`
    PropertyLet,
    /// `Property Set`
    PropertySet,
    /// `Enum`
    Enum,
    /// Enum member
    EnumMember,
}

impl DeclarationKind {
    /// Routines: anything with a body that can contain statements
    #[inline]
    #[must_use]
    pub fn is_member(&self) -> bool {
        matches!(
            self,
            Self::Procedure
                | Self::Function
                | Self::PropertyGet
                | Self::PropertyLet
                | Self::PropertySet
        )
    }

    /// Kinds whose names live in the module namespace
    #[inline]
    #[must_use]
    pub fn is_module_scoped_name(&self) -> bool {
        !matches!(self, Self::RecordMember | Self::Parameter)
    }
}

/// Declared accessibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    /// No keyword or `Dim`
    #[default]
    Implicit,
    /// `Private`
    Private,
    /// `Public`
    Public,
    /// `Friend`
    Friend,
    /// `Global`
    Global,
}

impl Accessibility {
    /// Keyword as written in source
    #[inline]
    #[must_use]
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Implicit => "Dim",
            Self::Private => "Private",
            Self::Public => "Public",
            Self::Friend => "Friend",
            Self::Global => "Global",
        }
    }

    /// Module fields declared with `Dim` are private
    #[inline]
    #[must_use]
    pub fn is_private(&self) -> bool {
        matches!(self, Self::Private | Self::Implicit)
    }
}

/// Source positions of a declaration, all relative to the module text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationSpans {
    /// The identifier itself
    pub identifier: SourceSpan,
    /// The declaration entry: `count As Long`, `items(1 To 5) As Long`.
    /// For blocks (types, routines) the header line.
    pub context: SourceSpan,
    /// The whole statement including the visibility keyword and, for
    /// declaration lists, every entry of the list
    pub statement: SourceSpan,
    /// Visibility keyword (`Public`, `Dim`, ...), if written
    #[serde(default)]
    pub visibility: Option<SourceSpan>,
    /// Closing line of a block declaration (`End Type`, `End Sub`)
    #[serde(default)]
    pub block_end: Option<SourceSpan>,
}

/// One use site of a declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierReference {
    /// Module containing the use
    pub module: QualifiedModuleName,
    /// The identifier as written at the use site
    pub span: SourceSpan,
    /// For record member accesses: the whole `field.member` expression
    #[serde(default)]
    pub expression: Option<SourceSpan>,
    /// For record member accesses: the field the member is reached through
    #[serde(default)]
    pub qualifier: Option<DeclarationId>,
    /// Enclosing routine, if any
    #[serde(default)]
    pub scope: Option<DeclarationId>,
    /// True when the use is an assignment target
    #[serde(default)]
    pub is_assignment: bool,
}

impl IdentifierReference {
    /// Span that a replacement of this reference overwrites
    #[inline]
    #[must_use]
    pub fn replacement_span(&self) -> SourceSpan {
        self.expression.unwrap_or(self.span)
    }
}

/// A declared entity as seen by the refactoring
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    /// Identifier within the graph
    pub id: DeclarationId,
    /// Identifier name as declared
    pub name: String,
    /// Declaring module
    pub module: QualifiedModuleName,
    /// Entity kind
    pub kind: DeclarationKind,
    /// Declared accessibility
    #[serde(default)]
    pub accessibility: Accessibility,
    /// Enclosing routine or record type
    #[serde(default)]
    pub parent: Option<DeclarationId>,
    /// Declared type name (`Variant` when implicit)
    pub as_type_name: String,
    /// False when the type is implicit (`Dim x`)
    #[serde(default = "default_true")]
    pub is_type_specified: bool,
    /// Array bounds as written (`""` for a dynamic array); `None` if scalar
    #[serde(default)]
    pub array_dimensions: Option<String>,
    /// Object reference type (assigned with `Set`)
    #[serde(default)]
    pub is_object: bool,
    /// The record type declaration this entity is typed as
    #[serde(default)]
    pub record_type: Option<DeclarationId>,
    /// Declared in a `Dim a, b` style list
    #[serde(default)]
    pub declared_in_list: bool,
    /// Source positions
    pub spans: DeclarationSpans,
    /// Ordered use sites
    #[serde(default)]
    pub references: Vec<IdentifierReference>,
}

fn default_true() -> bool {
    true
}

impl Declaration {
    /// True for array declarations
    #[inline]
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.array_dimensions.is_some()
    }

    /// True when declared as a record type
    #[inline]
    #[must_use]
    pub fn is_record_typed(&self) -> bool {
        self.record_type.is_some()
    }

    /// True for `Variant` (implicit or explicit)
    #[inline]
    #[must_use]
    pub fn is_variant(&self) -> bool {
        self.as_type_name.eq_ignore_ascii_case("Variant")
    }

    /// Module-level variable
    #[inline]
    #[must_use]
    pub fn is_module_variable(&self) -> bool {
        self.kind == DeclarationKind::Variable && self.parent.is_none()
    }

    /// Declared `Private` (or with `Dim`)
    #[inline]
    #[must_use]
    pub fn has_private_accessibility(&self) -> bool {
        self.accessibility.is_private()
    }

    /// Identifier comparison is case-insensitive in the target language
    #[inline]
    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str) -> Declaration {
        Declaration {
            id: DeclarationId(1),
            name: name.to_string(),
            module: QualifiedModuleName::new("P", "M"),
            kind: DeclarationKind::Variable,
            accessibility: Accessibility::Public,
            parent: None,
            as_type_name: "Long".to_string(),
            is_type_specified: true,
            array_dimensions: None,
            is_object: false,
            record_type: None,
            declared_in_list: false,
            spans: DeclarationSpans {
                identifier: SourceSpan::new(7, 7 + name.len()),
                context: SourceSpan::new(7, 20),
                statement: SourceSpan::new(0, 20),
                visibility: Some(SourceSpan::new(0, 6)),
                block_end: None,
            },
            references: Vec::new(),
        }
    }

    #[test]
    fn names_compare_case_insensitively() {
        assert!(field("count").is_named("COUNT"));
        assert!(!field("count").is_named("counter"));
    }

    #[test]
    fn implicit_accessibility_is_private() {
        assert!(Accessibility::Implicit.is_private());
        assert!(!Accessibility::Public.is_private());
        assert_eq!(Accessibility::Implicit.keyword(), "Dim");
    }

    #[test]
    fn member_kinds() {
        assert!(DeclarationKind::Function.is_member());
        assert!(!DeclarationKind::Variable.is_member());
        assert!(!DeclarationKind::RecordMember.is_module_scoped_name());
    }

    #[test]
    fn reference_replacement_prefers_expression() {
        let reference = IdentifierReference {
            module: QualifiedModuleName::new("P", "M"),
            span: SourceSpan::new(12, 17),
            expression: Some(SourceSpan::new(5, 17)),
            qualifier: Some(DeclarationId(3)),
            scope: None,
            is_assignment: false,
        };
        assert_eq!(reference.replacement_span(), SourceSpan::new(5, 17));
    }

    #[test]
    fn module_variable_and_array() {
        let mut decl = field("items");
        assert!(decl.is_module_variable());
        assert!(!decl.is_array());
        decl.array_dimensions = Some(String::new());
        assert!(decl.is_array());
    }
}
