//! Error types for symbol definition and code generation.
//!
//! Every variant carries enough context to produce a diagnostic that names
//! the offending scope and symbol. Scope names use the `Class>>selector`
//! form, with `[block n]` appended for nested blocks.
//!
//! ```text
//! CompilationError
//! ├── definition pass  - DuplicateDefinition, UnknownClass, CircularInheritance
//! └── code generation  - UnresolvedName, MalformedNesting, LiteralPoolOverflow,
//!                        OperandOverflow, InvalidLiteral, MissingScope
//! ```

use thiserror::Error;

use crate::Span;

/// Errors that abort compilation of a class.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompilationError {
    /// A name is defined twice in the same scope.
    #[error("at {span}: '{name}' is already defined in {scope}")]
    DuplicateDefinition {
        /// The duplicated name.
        name: String,
        /// Qualified name of the scope holding both definitions.
        scope: String,
        /// Where the second definition appears.
        span: Span,
    },

    /// A superclass name does not refer to a class.
    #[error("at {span}: unknown class '{name}'")]
    UnknownClass {
        /// The superclass name that wasn't found.
        name: String,
        /// Where the superclass was referenced.
        span: Span,
    },

    /// A class inherits from itself, directly or transitively.
    #[error("at {span}: circular inheritance involving '{name}'")]
    CircularInheritance {
        /// A class on the cycle.
        name: String,
        /// Where the class was declared.
        span: Span,
    },

    /// A name has no binding where one is required.
    #[error("at {span}: unresolved name '{name}' in {scope}")]
    UnresolvedName {
        /// The name that failed to resolve.
        name: String,
        /// Qualified name of the scope the reference appears in.
        scope: String,
        /// Where the name was referenced.
        span: Span,
    },

    /// The nested-block table of a method disagrees with the blocks visited.
    #[error("at {span}: malformed block nesting in {scope}: {message}")]
    MalformedNesting {
        /// Qualified name of the owning method.
        scope: String,
        /// What went wrong.
        message: String,
        /// Location of the offending block or method.
        span: Span,
    },

    /// The literal pool ran out of indices.
    #[error("at {span}: literal pool overflowed at {count} entries interning '{literal}' in {scope}")]
    LiteralPoolOverflow {
        /// The literal that did not fit.
        literal: String,
        /// Qualified name of the scope being compiled.
        scope: String,
        /// Number of entries when the overflow happened.
        count: usize,
        /// Where the literal is referenced.
        span: Span,
    },

    /// An instruction operand does not fit its encoding width.
    #[error("at {span}: {what} {value} does not fit its operand in {scope}")]
    OperandOverflow {
        /// Which operand overflowed (e.g. "field offset").
        what: &'static str,
        /// The value that was too large.
        value: usize,
        /// Qualified name of the scope being compiled.
        scope: String,
        /// Where the instruction originates.
        span: Span,
    },

    /// A literal could not be turned into an immediate.
    #[error("at {span}: invalid literal '{text}'")]
    InvalidLiteral {
        /// The literal source text.
        text: String,
        /// Where the literal appears.
        span: Span,
    },

    /// A scope-introducing node was never annotated by the definition pass.
    #[error("at {span}: {node} has no scope attached")]
    MissingScope {
        /// The kind of node (e.g. "block").
        node: &'static str,
        /// Where the node appears.
        span: Span,
    },
}

impl CompilationError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            CompilationError::DuplicateDefinition { span, .. } => *span,
            CompilationError::UnknownClass { span, .. } => *span,
            CompilationError::CircularInheritance { span, .. } => *span,
            CompilationError::UnresolvedName { span, .. } => *span,
            CompilationError::MalformedNesting { span, .. } => *span,
            CompilationError::LiteralPoolOverflow { span, .. } => *span,
            CompilationError::OperandOverflow { span, .. } => *span,
            CompilationError::InvalidLiteral { span, .. } => *span,
            CompilationError::MissingScope { span, .. } => *span,
        }
    }

    /// Whether this error points at a defect in an earlier phase rather than
    /// at the user's program.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            CompilationError::MalformedNesting { .. } | CompilationError::MissingScope { .. }
        )
    }
}

/// Result alias used across the compiler crates.
pub type Result<T> = std::result::Result<T, CompilationError>;
