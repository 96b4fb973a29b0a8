//! Block literals.
//!
//! A block compiles to its own [`CompiledBlock`], installed in the owning
//! method's nested-block table. The enclosing code only gets a
//! `block <index>` instruction that makes the closure at run time.
//!
//! ```text
//! block body:   s1 pop s2 ... sn  block_return
//! empty block:  nil block_return
//! ```

use smalltalk_ast::ScopeId;
use smalltalk_ast::ast::BlockExpr;
use smalltalk_core::{CompilationError, Result};

use super::method::MethodCompiler;
use crate::bytecode::{Code, Instruction};
use crate::unit::CompiledBlock;

impl MethodCompiler<'_, '_> {
    pub(super) fn block(&mut self, scope: ScopeId, block: &BlockExpr<'_>) -> Result<Code> {
        let table = self.class.table;
        let inner = block.scope.get().ok_or(CompilationError::MissingScope {
            node: "block",
            span: block.span,
        })?;
        let index = table
            .scope(inner)
            .as_block()
            .map(|b| b.index)
            .ok_or(CompilationError::MissingScope {
                node: "block",
                span: block.span,
            })?;

        if table.scope(inner).enclosing != Some(scope)
            || table.enclosing_method(inner) != Some(self.blocks.method())
        {
            return Err(CompilationError::MalformedNesting {
                scope: table.qualified_name(self.blocks.method()),
                message: format!(
                    "{} is not nested in {}",
                    table.qualified_name(inner),
                    table.qualified_name(scope)
                ),
                span: block.span,
            });
        }
        let operand = self.short("block index", index as usize, scope, block.span)?;

        let mut body = self.sequence(inner, block.stmts)?;
        if block.stmts.is_empty() {
            body = body.then(Instruction::PushNil);
        }
        let body = body
            .join(self.dbg(inner, block.span.end())?)
            .then(Instruction::BlockReturn);

        let mut unit = CompiledBlock::for_scope(table, inner, &self.class.name);
        unit.bytecode = body.bytes();
        log::trace!(
            "compiled {}: {} bytes",
            unit.qualified_name,
            unit.bytecode.len()
        );
        self.blocks.install(index, unit, block.span)?;

        Ok(Code::of(Instruction::Block { index: operand }))
    }
}
