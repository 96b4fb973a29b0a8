//! Symbol definition pass.
//!
//! Walks a [`File`] once, builds its [`SymbolTable`], and attaches the scope
//! of every class, method, main body and block literal to its node. Blocks are
//! numbered in the order the walk meets them, which is the order the code
//! generator visits them.

use smalltalk_core::{CompilationError, Result};

use super::{ScopeId, SymbolTable};
use crate::ast::{Body, ClassDef, Expr, File, MethodBody, MethodDef, Stmt};

/// Name of the synthetic class owning top-level statements.
pub const MAIN_CLASS: &str = "MainClass";

/// Selector of the synthetic method holding top-level statements.
pub const MAIN_SELECTOR: &str = "main";

impl SymbolTable {
    /// Build the symbol table for `file` and annotate its scope-introducing nodes.
    pub fn define(file: &File<'_>) -> Result<Self> {
        let mut table = SymbolTable::new();

        for class in file.classes {
            let id = table.define_class(class.name.name, class.name.span)?;
            class.scope.set(Some(id));
        }

        for class in file.classes {
            table.link_superclass(class)?;
        }

        for class in file.classes {
            table.define_members(class)?;
        }

        if let Some(main) = file.main {
            let class = match table.class_named(MAIN_CLASS) {
                Some(class) => class,
                None => table.define_class(MAIN_CLASS, main.span)?,
            };
            let scope = table.define_method(class, MAIN_SELECTOR, false, None, main.span)?;
            table.define_body(scope, &main.body)?;
            main.scope.set(Some(scope));
        }

        Ok(table)
    }

    fn link_superclass(&mut self, class: &ClassDef<'_>) -> Result<()> {
        let Some(superclass) = class.superclass else {
            return Ok(());
        };
        let id = class_scope(class)?;
        let target = self
            .class_named(superclass.name)
            .ok_or_else(|| CompilationError::UnknownClass {
                name: superclass.name.to_string(),
                span: superclass.span,
            })?;
        self.set_superclass(id, target, superclass.span)
    }

    fn define_members(&mut self, class: &ClassDef<'_>) -> Result<()> {
        let id = class_scope(class)?;
        for field in class.fields {
            self.define_field(id, field.name, field.span)?;
        }
        for method in class.methods {
            self.define_method_def(id, method)?;
        }
        Ok(())
    }

    fn define_method_def(&mut self, class: ScopeId, method: &MethodDef<'_>) -> Result<()> {
        let primitive = match &method.body {
            MethodBody::Primitive(name) => Some(name.name),
            MethodBody::Code(_) => None,
        };
        let scope = self.define_method(
            class,
            &method.selector(),
            method.is_class_method,
            primitive,
            method.span,
        )?;
        for arg in method.pattern.args() {
            self.define_arg(scope, arg.name, arg.span)?;
        }
        if let MethodBody::Code(body) = &method.body {
            self.define_body(scope, body)?;
        }
        method.scope.set(Some(scope));
        Ok(())
    }

    fn define_body(&mut self, scope: ScopeId, body: &Body<'_>) -> Result<()> {
        for local in body.locals {
            self.define_local(scope, local.name, local.span)?;
        }
        self.define_stmts(scope, body.stmts)
    }

    fn define_stmts(&mut self, scope: ScopeId, stmts: &[Stmt<'_>]) -> Result<()> {
        for stmt in stmts {
            match stmt {
                Stmt::Expr(expr) => self.define_expr(scope, expr)?,
                Stmt::Return(ret) => self.define_expr(scope, &ret.value)?,
            }
        }
        Ok(())
    }

    fn define_expr(&mut self, scope: ScopeId, expr: &Expr<'_>) -> Result<()> {
        match expr {
            Expr::Literal(_) | Expr::Ident(_) | Expr::Super(_) => Ok(()),
            Expr::Assign(assign) => self.define_expr(scope, &assign.value),
            Expr::Unary(send) => self.define_expr(scope, &send.receiver),
            Expr::Binary(send) => {
                self.define_expr(scope, &send.left)?;
                for op in send.operations {
                    self.define_expr(scope, &op.operand)?;
                }
                Ok(())
            }
            Expr::Keyword(send) => {
                self.define_expr(scope, &send.receiver)?;
                for part in send.parts {
                    self.define_expr(scope, &part.arg)?;
                }
                Ok(())
            }
            Expr::Block(block) => {
                let id = self.define_block(scope, block.span)?;
                for arg in block.args {
                    self.define_arg(id, arg.name, arg.span)?;
                }
                for local in block.locals {
                    self.define_local(id, local.name, local.span)?;
                }
                block.scope.set(Some(id));
                self.define_stmts(id, block.stmts)
            }
            Expr::Array(array) => {
                for element in array.elements {
                    self.define_expr(scope, element)?;
                }
                Ok(())
            }
        }
    }
}

fn class_scope(class: &ClassDef<'_>) -> Result<ScopeId> {
    class.scope.get().ok_or(CompilationError::MissingScope {
        node: "class",
        span: class.span,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AstBuilder;
    use crate::symbols::SymbolKind;
    use bumpalo::Bump;

    #[test]
    fn annotates_every_scope_node() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let block = b.block(&["each"], &[], &[b.stmt(b.name("each"))]);
        let method = b.method(
            b.keyword_pattern(&[("do:", "aBlock")]),
            b.body(&["t"], &[b.stmt(block)]),
        );
        let file = b.file(vec![b.class("List", None, &["items"], vec![method])], None);

        let table = SymbolTable::define(&file).unwrap();

        let class = file.classes[0].scope.get().unwrap();
        let method_scope = file.classes[0].methods[0].scope.get().unwrap();
        let Expr::Block(block) = block else {
            unreachable!()
        };
        let block_scope = block.scope.get().unwrap();

        assert_eq!(table.qualified_name(class), "List");
        assert_eq!(table.qualified_name(method_scope), "List>>do:");
        assert_eq!(table.scope(block_scope).enclosing, Some(method_scope));

        let data = table.scope(method_scope).as_block().unwrap();
        assert_eq!(data.num_args(), 1);
        assert_eq!(data.num_locals(), 1);
        assert_eq!(data.nested_blocks, 1);
    }

    #[test]
    fn links_superclasses_declared_later() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let file = b.file(
            vec![
                b.class("Derived", Some("Base"), &["c"], vec![]),
                b.class("Base", None, &["a", "b"], vec![]),
            ],
            None,
        );

        let table = SymbolTable::define(&file).unwrap();
        let derived = table.class_named("Derived").unwrap();
        assert_eq!(table.field_offset(derived, "c"), Some(2));
    }

    #[test]
    fn unknown_superclass_is_an_error() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let file = b.file(vec![b.class("A", Some("Missing"), &[], vec![])], None);

        let err = SymbolTable::define(&file).unwrap_err();
        assert!(matches!(err, CompilationError::UnknownClass { ref name, .. } if name == "Missing"));
    }

    #[test]
    fn main_gets_synthetic_class() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let main = b.main(b.body(&["x"], &[b.stmt(b.assign("x", b.number("1")))]));
        let file = b.file(vec![], Some(main));

        let table = SymbolTable::define(&file).unwrap();
        let scope = main.scope.get().unwrap();
        assert_eq!(table.qualified_name(scope), "MainClass>>main");

        let x = table.resolve("x", scope).unwrap();
        assert_eq!(table.symbol(x.symbol).kind, SymbolKind::Local);
    }

    #[test]
    fn primitive_methods_record_their_primitive() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let file = b.file(
            vec![b.class(
                "Object",
                None,
                &[],
                vec![b.primitive_method(b.binary_pattern("==", "other"), "Object_Equals")],
            )],
            None,
        );

        let table = SymbolTable::define(&file).unwrap();
        let method = file.classes[0].methods[0].scope.get().unwrap();
        let data = table.scope(method).as_block().unwrap();
        assert_eq!(data.num_args(), 1);
        assert!(matches!(
            &data.kind,
            crate::symbols::BlockKind::Method { primitive: Some(p), .. } if p == "Object_Equals"
        ));
    }
}
