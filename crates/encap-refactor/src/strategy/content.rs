use encap_source::{ModuleRewriter, RewriteError};
use std::collections::BTreeMap;

/// Kinds of generated content, in insertion order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NewContentKind {
    /// `Private Type ... End Type`
    TypeDeclarationBlock,
    /// Field declarations
    DeclarationBlock,
    /// Property blocks
    MethodBlock,
    /// Preview-only marker comment
    PostContentMessage,
}

impl NewContentKind {
    fn separator(self) -> &'static str {
        match self {
            Self::MethodBlock => "\n\n",
            _ => "\n",
        }
    }
}

/// Generated content collected by a strategy before insertion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewContent {
    blocks: BTreeMap<NewContentKind, Vec<String>>,
}

impl NewContent {
    /// Create empty content
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `text` to the `kind` block
    pub fn add(&mut self, kind: NewContentKind, text: impl Into<String>) {
        self.blocks.entry(kind).or_default().push(text.into());
    }

    /// Blocks in kind order, separated by a blank line
    #[must_use]
    pub fn render(&self) -> String {
        self.blocks
            .iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(kind, entries)| entries.join(kind.separator()))
            .collect::<Vec<_>>()
            .join("\n\n")
            .trim()
            .to_string()
    }

    /// Insert before `anchor` (followed by a blank line) or at end of file
    ///
    /// # Errors
    /// Returns error if the anchor is out of bounds
    pub fn insert(&self, anchor: Option<usize>, rewriter: &mut ModuleRewriter) -> Result<(), RewriteError> {
        let content = self.render();
        if content.is_empty() {
            return Ok(());
        }
        match anchor {
            Some(offset) => rewriter.insert_before(offset, format!("{content}\n\n")),
            None => {
                let text = if rewriter.original_text().ends_with('\n') {
                    format!("\n{content}\n")
                } else {
                    format!("\n\n{content}")
                };
                rewriter.insert_at_end_of_file(text);
                Ok(())
            }
        }
    }
}
