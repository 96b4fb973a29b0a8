//! Expression and statement nodes.
//!
//! Every syntactic category the code generator handles is a variant of
//! [`Expr`] or [`Stmt`], so traversal is a single exhaustive `match`.
//! Nodes that own children are arena references; leaves are stored inline.

use std::cell::Cell;

use smalltalk_core::Span;

use crate::ast::Ident;
use crate::symbols::ScopeId;

/// A statement inside a method, block, or main body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stmt<'ast> {
    /// An expression evaluated for its value.
    Expr(Expr<'ast>),
    /// `^expr` - return from the enclosing method.
    Return(ReturnStmt<'ast>),
}

impl<'ast> Stmt<'ast> {
    /// Get the span of this statement.
    pub fn span(&self) -> Span {
        match self {
            Self::Expr(e) => e.span(),
            Self::Return(r) => r.span,
        }
    }
}

/// `^expr`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnStmt<'ast> {
    /// The returned expression.
    pub value: Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// An expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    /// Number, character, string, or pseudo-variable literal
    Literal(LiteralExpr<'ast>),
    /// Variable, field, or global reference
    Ident(Ident<'ast>),
    /// `super`, only meaningful as a message receiver
    Super(Span),
    /// `name := expr`
    Assign(&'ast AssignExpr<'ast>),
    /// `receiver selector`
    Unary(&'ast UnarySend<'ast>),
    /// `left op right op right ...`
    Binary(&'ast BinarySend<'ast>),
    /// `receiver key: arg key: arg`
    Keyword(&'ast KeywordSend<'ast>),
    /// `[:a | body]`
    Block(&'ast BlockExpr<'ast>),
    /// `{a. b. c}`
    Array(ArrayExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    /// Get the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(e) => e.span,
            Self::Ident(e) => e.span,
            Self::Super(span) => *span,
            Self::Assign(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Binary(e) => e.span,
            Self::Keyword(e) => e.span,
            Self::Block(e) => e.span,
            Self::Array(e) => e.span,
        }
    }

    /// Whether this expression is the `super` pseudo-variable.
    pub fn is_super(&self) -> bool {
        matches!(self, Self::Super(_))
    }
}

/// A literal value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiteralExpr<'ast> {
    /// The literal kind
    pub kind: LiteralKind<'ast>,
    /// Source location
    pub span: Span,
}

/// The kind of literal.
///
/// Number, character and string literals keep their source text; the code
/// generator decides on the encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind<'ast> {
    /// Numeric literal text, e.g. `42` or `3.14`
    Number(&'ast str),
    /// Character literal text including the sigil, e.g. `$a`
    Char(&'ast str),
    /// String literal text including quotes, e.g. `'hello'`
    String(&'ast str),
    /// `nil`
    Nil,
    /// `self`
    SelfRef,
    /// `true`
    True,
    /// `false`
    False,
}

/// `target := value`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignExpr<'ast> {
    /// The assigned variable
    pub target: Ident<'ast>,
    /// The value expression
    pub value: Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// `receiver selector`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnarySend<'ast> {
    /// The receiver expression
    pub receiver: Expr<'ast>,
    /// The message name
    pub selector: Ident<'ast>,
    /// Source location
    pub span: Span,
}

/// `left op1 right1 op2 right2 ...`, evaluated left to right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinarySend<'ast> {
    /// The first operand
    pub left: Expr<'ast>,
    /// Operator and right operand pairs, in source order
    pub operations: &'ast [BinaryOperation<'ast>],
    /// Source location
    pub span: Span,
}

/// One `op right` pair of a binary send chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryOperation<'ast> {
    /// The operator, used verbatim as the selector
    pub operator: Ident<'ast>,
    /// The right operand
    pub operand: Expr<'ast>,
}

/// `receiver key1: arg1 key2: arg2`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeywordSend<'ast> {
    /// The receiver expression
    pub receiver: Expr<'ast>,
    /// Keyword and argument pairs, in source order
    pub parts: &'ast [KeywordArg<'ast>],
    /// Source location
    pub span: Span,
}

impl<'ast> KeywordSend<'ast> {
    /// The compound selector, e.g. `at:put:`.
    pub fn selector(&self) -> String {
        self.parts.iter().map(|p| p.keyword.name).collect()
    }
}

/// One `key: arg` pair of a keyword send.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeywordArg<'ast> {
    /// The keyword including its trailing colon
    pub keyword: Ident<'ast>,
    /// The argument expression
    pub arg: Expr<'ast>,
}

/// A block literal `[:x :y | | t | stmts]`.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockExpr<'ast> {
    /// Block parameters, without the leading colon
    pub args: &'ast [Ident<'ast>],
    /// Temporaries declared between bars
    pub locals: &'ast [Ident<'ast>],
    /// Body statements
    pub stmts: &'ast [Stmt<'ast>],
    /// Source location, ending at the closing `]`
    pub span: Span,
    /// Block scope, attached by the definition pass
    pub scope: Cell<Option<ScopeId>>,
}

/// `{e1. e2. e3}`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrayExpr<'ast> {
    /// Element expressions, in source order
    pub elements: &'ast [Expr<'ast>],
    /// Source location
    pub span: Span,
}
