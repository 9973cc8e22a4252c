//! Encap source model
//!
//! Everything the encapsulate-field refactoring consumes from the outside
//! world: resolved declarations, module texts and staged rewrites.
//!
//! # Core Concepts
//!
//! - [`Declaration`] / [`IdentifierReference`]: resolved entities and use sites
//! - [`DeclarationFinder`]: query trait over a declaration graph
//! - [`RewriteSession`]: per-module staged edits with all-or-nothing commit
//! - [`ContentHash`]: Blake3 fingerprint used to detect stale buffers
//! - [`MemberPath`]: dotted backing path such as `this.Count`
//!
//! # Example
//!
//! ```rust,ignore
//! use encap_source::{RewritingManager, RewriteSession, SourceStore};
//!
//! let manager = RewritingManager::new(Arc::new(store));
//! let mut session = manager.check_out_session();
//! session.check_out_module_rewriter(&module)?.replace(span, "Count")?;
//! session.try_rewrite()?;
//! ```

#![warn(unreachable_pub)]

mod cancel;
mod declaration;
mod graph;
mod hash;
mod indenter;
mod module;
mod path;
mod rewrite;
mod session;

pub use cancel::{CancellationToken, Cancelled};
pub use declaration::{
    Accessibility, Declaration, DeclarationId, DeclarationKind, DeclarationSpans,
    IdentifierReference,
};
pub use graph::{
    DeclarationFinder, DeclarationGraph, ModuleSource, ProjectSnapshot,
    SelectedDeclarationProvider, SourceError,
};
pub use hash::ContentHash;
pub use indenter::{BlockIndenter, Indenter};
pub use module::{QualifiedModuleName, QualifiedSelection, SourceSpan};
pub use path::{MemberPath, PathError};
pub use rewrite::{DeclarationTarget, EditOperation, ModuleRewriter, RewriteError};
pub use session::{
    cap_blank_lines, MemorySession, RewriteSession, RewritingManager, SessionId, SessionStatus,
    SourceStore,
};

/// Commonly used items
pub mod prelude {
    pub use crate::{
        Declaration, DeclarationFinder, DeclarationId, DeclarationKind, QualifiedModuleName,
        RewriteSession, SourceSpan,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
