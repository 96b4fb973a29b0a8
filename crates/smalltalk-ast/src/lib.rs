//! Annotated syntax tree and scope model for the Smalltalk compiler.
//!
//! This crate is the hand-off point between semantic analysis and code
//! generation:
//! - [`ast`]: arena-allocated syntax nodes, with scope annotations on classes,
//!   methods, main bodies and blocks
//! - [`symbols`]: the scope/symbol arena ([`SymbolTable`]) answering name
//!   resolution, scope deltas, field offsets and local slots
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use smalltalk_ast::{SymbolTable, ast::AstBuilder};
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//! let getter = b.unary_method("x", b.body(&[], &[b.ret(b.name("x"))]));
//! let file = b.file(vec![b.class("Point", None, &["x", "y"], vec![getter])], None);
//!
//! let table = SymbolTable::define(&file).unwrap();
//! let point = table.class_named("Point").unwrap();
//! assert_eq!(table.field_offset(point, "y"), Some(1));
//! ```

pub mod ast;
pub mod symbols;

pub use symbols::{
    BlockKind, BlockScope, ClassScope, Resolution, Scope, ScopeId, ScopeKind, Symbol, SymbolId,
    SymbolKind, SymbolTable,
};
pub use symbols::{MAIN_CLASS, MAIN_SELECTOR};
