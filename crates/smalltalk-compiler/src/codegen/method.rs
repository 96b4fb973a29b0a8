//! Method bodies, statement sequences and returns.
//!
//! ```text
//! method (n statements):  s1 pop s2 pop ... sn  pop self return
//! method (empty):         self return
//! ^ expr:                 expr return
//! ```
//!
//! The trailing `pop self return` is emitted even when the last statement
//! already returned; the VM never reaches it.

use smalltalk_ast::ScopeId;
use smalltalk_ast::ast::{Body, MainDef, MethodBody, MethodDef, Stmt};
use smalltalk_core::{CompilationError, Result, Span};

use super::context::{BlockTable, ClassContext};
use crate::bytecode::{Code, Instruction};
use crate::unit::CompiledBlock;

/// Compiles one method body and the blocks nested in it.
pub(crate) struct MethodCompiler<'c, 'g> {
    pub(super) class: &'c mut ClassContext<'g>,
    pub(super) blocks: BlockTable,
}

impl<'c, 'g> MethodCompiler<'c, 'g> {
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile_method(
        class: &'c mut ClassContext<'g>,
        def: &MethodDef<'_>,
    ) -> Result<CompiledBlock> {
        let scope = def.scope.get().ok_or(CompilationError::MissingScope {
            node: "method",
            span: def.span,
        })?;
        match &def.body {
            MethodBody::Primitive(name) => {
                log::debug!(
                    "{} is primitive {}",
                    class.table.qualified_name(scope),
                    name.name
                );
                Ok(CompiledBlock::for_scope(class.table, scope, &class.name))
            }
            MethodBody::Code(body) => Self::compile_body(class, scope, body, def.span.end()),
        }
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile_main(class: &'c mut ClassContext<'g>, main: &MainDef<'_>) -> Result<CompiledBlock> {
        let scope = main.scope.get().ok_or(CompilationError::MissingScope {
            node: "main",
            span: main.span,
        })?;
        Self::compile_body(class, scope, &main.body, main.span.end())
    }

    fn compile_body(
        class: &'c mut ClassContext<'g>,
        scope: ScopeId,
        body: &Body<'_>,
        end: Span,
    ) -> Result<CompiledBlock> {
        let blocks = BlockTable::new(class.table, scope, body.span)?;
        let mut compiler = MethodCompiler { class, blocks };

        let code = if body.is_empty() {
            compiler.dbg(scope, end)?
        } else {
            compiler
                .sequence(scope, body.stmts)?
                .join(compiler.dbg(scope, end)?)
                .then(Instruction::Pop)
        };
        let code = code.then(Instruction::PushSelf).then(Instruction::Return);

        let MethodCompiler { class, blocks } = compiler;
        let mut unit = CompiledBlock::for_scope(class.table, scope, &class.name);
        unit.bytecode = code.bytes();
        unit.blocks = blocks.finish(body.span)?;

        log::debug!(
            "compiled {}: {} bytes, {} nested blocks",
            unit.qualified_name,
            unit.bytecode.len(),
            unit.blocks.len()
        );
        log::trace!("\n{}", unit.disassemble(class.literals.literals()));
        Ok(unit)
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// Statements in order, discarding the value of every statement but the last.
    pub(super) fn sequence(&mut self, scope: ScopeId, stmts: &[Stmt<'_>]) -> Result<Code> {
        let mut code = Code::empty();
        for (i, stmt) in stmts.iter().enumerate() {
            if i > 0 {
                code = code.then(Instruction::Pop);
            }
            code = code.join(self.stmt(scope, stmt)?);
        }
        Ok(code)
    }

    fn stmt(&mut self, scope: ScopeId, stmt: &Stmt<'_>) -> Result<Code> {
        match stmt {
            Stmt::Expr(expr) => self.expr(scope, expr),
            Stmt::Return(ret) => Ok(self.expr(scope, &ret.value)?.then(Instruction::Return)),
        }
    }

    // =========================================================================
    // Operands
    // =========================================================================

    /// Source position marker, when debug info is on.
    pub(super) fn dbg(&mut self, scope: ScopeId, at: Span) -> Result<Code> {
        let options = self.class.options;
        if !options.debug_info {
            return Ok(Code::empty());
        }
        let file = self.class.literal(&options.file_name, scope, at)?;
        Ok(Code::of(Instruction::Dbg {
            file,
            line: at.line,
            col: at.col,
        }))
    }

    /// Narrow an operand to its 16-bit encoding.
    pub(super) fn short(
        &self,
        what: &'static str,
        value: usize,
        scope: ScopeId,
        span: Span,
    ) -> Result<u16> {
        u16::try_from(value).map_err(|_| CompilationError::OperandOverflow {
            what,
            value,
            scope: self.class.table.qualified_name(scope),
            span,
        })
    }
}
