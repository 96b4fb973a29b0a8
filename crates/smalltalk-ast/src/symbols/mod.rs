//! Scope and symbol model.
//!
//! Scopes and symbols live in flat arenas inside [`SymbolTable`] and refer to
//! each other by index ([`ScopeId`], [`SymbolId`]), so enclosing-scope links
//! are plain copies rather than owning pointers.
//!
//! ```text
//! Global ── Class ── Block (method) ── Block ── Block ...
//!             │
//!             └─ superclass ─> Class
//! ```

mod define;
mod scope;
mod table;

pub use scope::{BlockKind, BlockScope, ClassScope, Scope, ScopeKind};
pub use define::{MAIN_CLASS, MAIN_SELECTOR};
pub use table::{Resolution, SymbolTable};

use std::fmt;

/// Index of a scope in its [`SymbolTable`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub(crate) u32);

impl ScopeId {
    /// The raw arena index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeId({})", self.0)
    }
}

/// Index of a symbol in its [`SymbolTable`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub(crate) u32);

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolId({})", self.0)
    }
}

/// What a name is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// Instance variable of a class
    Field,
    /// Method or block parameter
    Argument,
    /// Method or block temporary
    Local,
    /// A class name in the global scope
    Class,
}

/// A named binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// The bound name
    pub name: String,
    /// What the name denotes
    pub kind: SymbolKind,
    /// The scope that declares it
    pub scope: ScopeId,
    /// Insertion order among symbols of the same kind in `scope`
    pub index: u32,
}
