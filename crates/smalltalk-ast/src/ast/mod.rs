//! Annotated syntax tree.
//!
//! The tree is allocated in a [`bumpalo::Bump`] arena and borrows from it for
//! `'ast`. Scope-introducing nodes ([`ClassDef`], [`MethodDef`], [`MainDef`],
//! [`BlockExpr`]) carry a `scope` cell that the definition pass fills in; the
//! code generator reads it instead of re-analysing the tree.

mod builder;
mod decl;
mod expr;

pub use builder::AstBuilder;
pub use decl::*;
pub use expr::*;

use smalltalk_core::Span;

/// An identifier, keyword part, or operator as it appears in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident<'ast> {
    /// The text
    pub name: &'ast str,
    /// Source location
    pub span: Span,
}

impl<'ast> Ident<'ast> {
    /// Create a new identifier.
    pub fn new(name: &'ast str, span: Span) -> Self {
        Self { name, span }
    }
}
