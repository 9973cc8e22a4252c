//! Module identity and source positions

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Fully qualified module name: project + component
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QualifiedModuleName {
    project: String,
    component: String,
}

impl QualifiedModuleName {
    /// Create a module name
    #[inline]
    #[must_use]
    pub fn new(project: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            component: component.into(),
        }
    }

    /// Project name
    #[inline]
    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Component (module) name
    #[inline]
    #[must_use]
    pub fn component(&self) -> &str {
        &self.component
    }
}

impl Display for QualifiedModuleName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.project, self.component)
    }
}

/// Half-open byte range `[start, end)` into a module's original text
///
/// Spans are captured before any edit is staged and never shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceSpan {
    start: usize,
    end: usize,
}

impl SourceSpan {
    /// Create span; `end` is clamped to be at least `start`
    #[inline]
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Empty span at an offset (insertion point)
    #[inline]
    #[must_use]
    pub fn at(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    /// Start offset
    #[inline]
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// End offset (exclusive)
    #[inline]
    #[must_use]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Length in bytes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True for insertion points
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True if `other` lies entirely within `self`
    #[inline]
    #[must_use]
    pub fn contains(&self, other: &SourceSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// True if `offset` lies within the span (end inclusive, so a caret
    /// right after an identifier still selects it)
    #[inline]
    #[must_use]
    pub fn contains_offset(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// True if the two spans share at least one byte
    #[inline]
    #[must_use]
    pub fn overlaps(&self, other: &SourceSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Span relative to `outer`'s start
    #[inline]
    #[must_use]
    pub fn relative_to(&self, outer: &SourceSpan) -> SourceSpan {
        SourceSpan::new(
            self.start.saturating_sub(outer.start),
            self.end.saturating_sub(outer.start),
        )
    }

    /// Slice the span out of `text`
    #[inline]
    #[must_use]
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.start..self.end)
    }
}

impl Display for SourceSpan {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Caret/selection inside a module, as supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedSelection {
    /// Module containing the selection
    pub module: QualifiedModuleName,
    /// Selected range
    pub span: SourceSpan,
}

impl QualifiedSelection {
    /// Create selection
    #[inline]
    #[must_use]
    pub fn new(module: QualifiedModuleName, span: SourceSpan) -> Self {
        Self { module, span }
    }
}
