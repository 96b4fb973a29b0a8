//! Declaration nodes: classes, methods, bodies and the top-level file.

use std::cell::Cell;

use smalltalk_core::Span;

use crate::ast::{Ident, Stmt};
use crate::symbols::ScopeId;

/// A source file: class definitions followed by an optional main body.
#[derive(Debug, Clone, PartialEq)]
pub struct File<'ast> {
    /// Class definitions, in source order
    pub classes: &'ast [ClassDef<'ast>],
    /// Top-level statements outside any class
    pub main: Option<&'ast MainDef<'ast>>,
    /// Source location
    pub span: Span,
}

/// `class Name : Super { | fields | methods }`
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef<'ast> {
    /// Class name
    pub name: Ident<'ast>,
    /// Superclass name, if any
    pub superclass: Option<Ident<'ast>>,
    /// Instance variables declared by this class (not inherited ones)
    pub fields: &'ast [Ident<'ast>],
    /// Methods, in source order
    pub methods: &'ast [MethodDef<'ast>],
    /// Source location
    pub span: Span,
    /// Class scope, attached by the definition pass
    pub scope: Cell<Option<ScopeId>>,
}

/// A method definition.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDef<'ast> {
    /// Selector and parameter names
    pub pattern: MethodPattern<'ast>,
    /// Statements or primitive reference
    pub body: MethodBody<'ast>,
    /// `class >> selector` methods live on the metaclass side
    pub is_class_method: bool,
    /// Source location, ending at the end of the body
    pub span: Span,
    /// Method scope, attached by the definition pass
    pub scope: Cell<Option<ScopeId>>,
}

impl<'ast> MethodDef<'ast> {
    /// Mark this method as class-side.
    pub fn class_side(mut self) -> Self {
        self.is_class_method = true;
        self
    }

    /// The selector this method is installed under.
    pub fn selector(&self) -> String {
        self.pattern.selector()
    }
}

/// The message pattern heading a method.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MethodPattern<'ast> {
    /// `name`
    Unary(Ident<'ast>),
    /// `op arg`
    Binary {
        /// The operator selector
        operator: Ident<'ast>,
        /// The single argument
        arg: Ident<'ast>,
    },
    /// `key1: arg1 key2: arg2`
    Keyword(&'ast [KeywordParam<'ast>]),
}

impl<'ast> MethodPattern<'ast> {
    /// The selector this pattern declares.
    pub fn selector(&self) -> String {
        match self {
            Self::Unary(name) => name.name.to_string(),
            Self::Binary { operator, .. } => operator.name.to_string(),
            Self::Keyword(parts) => parts.iter().map(|p| p.keyword.name).collect(),
        }
    }

    /// Parameter names, in declaration order.
    pub fn args(&self) -> Vec<Ident<'ast>> {
        match self {
            Self::Unary(_) => Vec::new(),
            Self::Binary { arg, .. } => vec![*arg],
            Self::Keyword(parts) => parts.iter().map(|p| p.arg).collect(),
        }
    }
}

/// One `key: arg` pair of a keyword method pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeywordParam<'ast> {
    /// The keyword including its trailing colon
    pub keyword: Ident<'ast>,
    /// The parameter name
    pub arg: Ident<'ast>,
}

/// What a method does when invoked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MethodBody<'ast> {
    /// `<primitive: name>`, implemented natively by the VM
    Primitive(Ident<'ast>),
    /// Source statements
    Code(Body<'ast>),
}

/// Temporaries and statements of a method or main body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body<'ast> {
    /// Temporaries declared between bars
    pub locals: &'ast [Ident<'ast>],
    /// Statements, in source order
    pub stmts: &'ast [Stmt<'ast>],
    /// Source location
    pub span: Span,
}

impl<'ast> Body<'ast> {
    /// Whether the body has no statements.
    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }
}

/// Top-level statements, compiled as `MainClass>>main`.
#[derive(Debug, Clone, PartialEq)]
pub struct MainDef<'ast> {
    /// The statements
    pub body: Body<'ast>,
    /// Source location
    pub span: Span,
    /// Scope of the synthetic `main` method, attached by the definition pass
    pub scope: Cell<Option<ScopeId>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Ident<'_> {
        Ident::new(name, Span::default())
    }

    #[test]
    fn unary_pattern() {
        let pattern = MethodPattern::Unary(ident("size"));
        assert_eq!(pattern.selector(), "size");
        assert!(pattern.args().is_empty());
    }

    #[test]
    fn binary_pattern() {
        let pattern = MethodPattern::Binary {
            operator: ident("+"),
            arg: ident("other"),
        };
        assert_eq!(pattern.selector(), "+");
        assert_eq!(pattern.args(), vec![ident("other")]);
    }

    #[test]
    fn keyword_pattern() {
        let parts = [
            KeywordParam {
                keyword: ident("at:"),
                arg: ident("i"),
            },
            KeywordParam {
                keyword: ident("put:"),
                arg: ident("v"),
            },
        ];
        let pattern = MethodPattern::Keyword(&parts);
        assert_eq!(pattern.selector(), "at:put:");
        assert_eq!(pattern.args(), vec![ident("i"), ident("v")]);
    }
}
