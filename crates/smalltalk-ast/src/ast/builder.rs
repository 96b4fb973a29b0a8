//! Arena-backed construction helpers for syntax trees.
//!
//! The parser front end and tests both build trees through [`AstBuilder`].
//! Nodes pick up the builder's current position, set with [`AstBuilder::at`].
//!
//! ```
//! use bumpalo::Bump;
//! use smalltalk_ast::ast::AstBuilder;
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//! let send = b.keyword(b.name("dict"), &[("at:", b.number("1")), ("put:", b.string("x"))]);
//! assert_eq!(send.span().line, 1);
//! ```

use std::cell::Cell;

use bumpalo::Bump;
use smalltalk_core::Span;

use crate::ast::{
    ArrayExpr, AssignExpr, BinaryOperation, BinarySend, BlockExpr, Body, ClassDef, Expr, File,
    Ident, KeywordArg, KeywordParam, KeywordSend, LiteralExpr, LiteralKind, MainDef, MethodBody,
    MethodDef, MethodPattern, ReturnStmt, Stmt, UnarySend,
};

/// Builds syntax nodes into an arena.
pub struct AstBuilder<'ast> {
    arena: &'ast Bump,
    span: Cell<Span>,
}

impl<'ast> AstBuilder<'ast> {
    /// Create a builder allocating into `arena`, positioned at 1:0.
    pub fn new(arena: &'ast Bump) -> Self {
        Self {
            arena,
            span: Cell::new(Span::new(1, 0, 1)),
        }
    }

    /// Move the current position; subsequent nodes use it as their span.
    pub fn at(&self, line: u32, col: u32) -> &Self {
        self.span.set(Span::new(line, col, 1));
        self
    }

    /// The arena nodes are allocated in.
    pub fn arena(&self) -> &'ast Bump {
        self.arena
    }

    fn span(&self) -> Span {
        self.span.get()
    }

    // =========================================================================
    // Leaves
    // =========================================================================

    /// An identifier copied into the arena.
    pub fn ident(&self, name: &str) -> Ident<'ast> {
        Ident::new(self.arena.alloc_str(name), self.span())
    }

    fn idents(&self, names: &[&str]) -> &'ast [Ident<'ast>] {
        self.arena
            .alloc_slice_fill_iter(names.iter().map(|n| self.ident(n)))
    }

    fn literal(&self, kind: LiteralKind<'ast>) -> Expr<'ast> {
        Expr::Literal(LiteralExpr {
            kind,
            span: self.span(),
        })
    }

    /// A variable reference.
    pub fn name(&self, name: &str) -> Expr<'ast> {
        Expr::Ident(self.ident(name))
    }

    /// A numeric literal from its source text.
    pub fn number(&self, text: &str) -> Expr<'ast> {
        self.literal(LiteralKind::Number(self.arena.alloc_str(text)))
    }

    /// A string literal; `value` is wrapped in quotes.
    pub fn string(&self, value: &str) -> Expr<'ast> {
        let text = format!("'{value}'");
        self.literal(LiteralKind::String(self.arena.alloc_str(&text)))
    }

    /// A character literal `$c`.
    pub fn char(&self, c: char) -> Expr<'ast> {
        let text = format!("${c}");
        self.literal(LiteralKind::Char(self.arena.alloc_str(&text)))
    }

    /// `nil`
    pub fn nil(&self) -> Expr<'ast> {
        self.literal(LiteralKind::Nil)
    }

    /// `self`
    pub fn self_ref(&self) -> Expr<'ast> {
        self.literal(LiteralKind::SelfRef)
    }

    /// `true`
    pub fn true_lit(&self) -> Expr<'ast> {
        self.literal(LiteralKind::True)
    }

    /// `false`
    pub fn false_lit(&self) -> Expr<'ast> {
        self.literal(LiteralKind::False)
    }

    /// `super`
    pub fn super_ref(&self) -> Expr<'ast> {
        Expr::Super(self.span())
    }

    // =========================================================================
    // Compound expressions
    // =========================================================================

    /// `target := value`
    pub fn assign(&self, target: &str, value: Expr<'ast>) -> Expr<'ast> {
        Expr::Assign(self.arena.alloc(AssignExpr {
            target: self.ident(target),
            value,
            span: self.span(),
        }))
    }

    /// `receiver selector`
    pub fn unary(&self, receiver: Expr<'ast>, selector: &str) -> Expr<'ast> {
        Expr::Unary(self.arena.alloc(UnarySend {
            receiver,
            selector: self.ident(selector),
            span: self.span(),
        }))
    }

    /// `left op right ...`
    pub fn binary(&self, left: Expr<'ast>, operations: &[(&str, Expr<'ast>)]) -> Expr<'ast> {
        let operations = self
            .arena
            .alloc_slice_fill_iter(operations.iter().map(|(op, operand)| BinaryOperation {
                operator: self.ident(op),
                operand: *operand,
            }));
        Expr::Binary(self.arena.alloc(BinarySend {
            left,
            operations,
            span: self.span(),
        }))
    }

    /// `receiver key: arg ...`
    pub fn keyword(&self, receiver: Expr<'ast>, parts: &[(&str, Expr<'ast>)]) -> Expr<'ast> {
        let parts = self
            .arena
            .alloc_slice_fill_iter(parts.iter().map(|(keyword, arg)| KeywordArg {
                keyword: self.ident(keyword),
                arg: *arg,
            }));
        Expr::Keyword(self.arena.alloc(KeywordSend {
            receiver,
            parts,
            span: self.span(),
        }))
    }

    /// `[:args | | locals | stmts]`
    pub fn block(&self, args: &[&str], locals: &[&str], stmts: &[Stmt<'ast>]) -> Expr<'ast> {
        Expr::Block(self.arena.alloc(BlockExpr {
            args: self.idents(args),
            locals: self.idents(locals),
            stmts: self.arena.alloc_slice_copy(stmts),
            span: self.span(),
            scope: Cell::new(None),
        }))
    }

    /// `{elements}`
    pub fn array(&self, elements: &[Expr<'ast>]) -> Expr<'ast> {
        Expr::Array(ArrayExpr {
            elements: self.arena.alloc_slice_copy(elements),
            span: self.span(),
        })
    }

    // =========================================================================
    // Statements and bodies
    // =========================================================================

    /// An expression statement.
    pub fn stmt(&self, expr: Expr<'ast>) -> Stmt<'ast> {
        Stmt::Expr(expr)
    }

    /// `^value`
    pub fn ret(&self, value: Expr<'ast>) -> Stmt<'ast> {
        Stmt::Return(ReturnStmt {
            value,
            span: self.span(),
        })
    }

    /// A method or main body.
    pub fn body(&self, locals: &[&str], stmts: &[Stmt<'ast>]) -> Body<'ast> {
        Body {
            locals: self.idents(locals),
            stmts: self.arena.alloc_slice_copy(stmts),
            span: self.span(),
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    /// Pattern `selector`.
    pub fn unary_pattern(&self, selector: &str) -> MethodPattern<'ast> {
        MethodPattern::Unary(self.ident(selector))
    }

    /// Pattern `op arg`.
    pub fn binary_pattern(&self, operator: &str, arg: &str) -> MethodPattern<'ast> {
        MethodPattern::Binary {
            operator: self.ident(operator),
            arg: self.ident(arg),
        }
    }

    /// Pattern `key: arg ...`.
    pub fn keyword_pattern(&self, parts: &[(&str, &str)]) -> MethodPattern<'ast> {
        MethodPattern::Keyword(self.arena.alloc_slice_fill_iter(parts.iter().map(
            |(keyword, arg)| KeywordParam {
                keyword: self.ident(keyword),
                arg: self.ident(arg),
            },
        )))
    }

    /// A method with a source body.
    pub fn method(&self, pattern: MethodPattern<'ast>, body: Body<'ast>) -> MethodDef<'ast> {
        MethodDef {
            pattern,
            body: MethodBody::Code(body),
            is_class_method: false,
            span: self.span(),
            scope: Cell::new(None),
        }
    }

    /// A unary method with a source body.
    pub fn unary_method(&self, selector: &str, body: Body<'ast>) -> MethodDef<'ast> {
        self.method(self.unary_pattern(selector), body)
    }

    /// A method implemented by the VM primitive `primitive`.
    pub fn primitive_method(
        &self,
        pattern: MethodPattern<'ast>,
        primitive: &str,
    ) -> MethodDef<'ast> {
        MethodDef {
            pattern,
            body: MethodBody::Primitive(self.ident(primitive)),
            is_class_method: false,
            span: self.span(),
            scope: Cell::new(None),
        }
    }

    /// `class name : superclass { | fields | methods }`
    pub fn class(
        &self,
        name: &str,
        superclass: Option<&str>,
        fields: &[&str],
        methods: Vec<MethodDef<'ast>>,
    ) -> ClassDef<'ast> {
        ClassDef {
            name: self.ident(name),
            superclass: superclass.map(|s| self.ident(s)),
            fields: self.idents(fields),
            methods: self.arena.alloc_slice_fill_iter(methods),
            span: self.span(),
            scope: Cell::new(None),
        }
    }

    /// Top-level statements.
    pub fn main(&self, body: Body<'ast>) -> &'ast MainDef<'ast> {
        self.arena.alloc(MainDef {
            body,
            span: self.span(),
            scope: Cell::new(None),
        })
    }

    /// A whole file.
    pub fn file(
        &self,
        classes: Vec<ClassDef<'ast>>,
        main: Option<&'ast MainDef<'ast>>,
    ) -> File<'ast> {
        File {
            classes: self.arena.alloc_slice_fill_iter(classes),
            main,
            span: self.span(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nodes_take_current_position() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        b.at(3, 7);
        let e = b.name("x");
        assert_eq!(e.span(), Span::new(3, 7, 1));
    }

    #[test]
    fn string_literal_keeps_quotes() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        match b.string("hi") {
            Expr::Literal(LiteralExpr {
                kind: LiteralKind::String(text),
                ..
            }) => assert_eq!(text, "'hi'"),
            other => panic!("expected string literal, got {other:?}"),
        }
    }

    #[test]
    fn block_starts_unannotated() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let Expr::Block(block) = b.block(&["x"], &[], &[b.stmt(b.name("x"))]) else {
            panic!("expected block");
        };
        assert_eq!(block.args.len(), 1);
        assert_eq!(block.stmts.len(), 1);
        assert!(block.scope.get().is_none());
    }

    #[test]
    fn class_collects_methods() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let class = b.class(
            "Point",
            Some("Object"),
            &["x", "y"],
            vec![
                b.unary_method("x", b.body(&[], &[b.ret(b.name("x"))])),
                b.primitive_method(b.binary_pattern("+", "p"), "Point_Add"),
            ],
        );
        assert_eq!(class.methods.len(), 2);
        assert_eq!(class.methods[1].selector(), "+");
        assert_eq!(class.superclass.map(|s| s.name), Some("Object"));
    }
}
