//! Generation state shared across a class and across a method.

use smalltalk_ast::{ScopeId, SymbolTable};
use smalltalk_core::{CompilationError, Result, Span};

use super::CodegenOptions;
use crate::bytecode::LiteralPool;
use crate::unit::CompiledBlock;

/// State for compiling one class: its scope and its literal pool.
pub(crate) struct ClassContext<'g> {
    pub table: &'g SymbolTable,
    pub options: &'g CodegenOptions,
    pub class: ScopeId,
    pub name: String,
    pub literals: LiteralPool,
}

impl<'g> ClassContext<'g> {
    pub fn new(
        table: &'g SymbolTable,
        options: &'g CodegenOptions,
        class: ScopeId,
        span: Span,
    ) -> Result<Self> {
        let name = table
            .scope(class)
            .as_class()
            .map(|c| c.name.clone())
            .ok_or(CompilationError::MissingScope {
                node: "class",
                span,
            })?;
        Ok(Self {
            table,
            options,
            class,
            literals: LiteralPool::new(name.clone()),
            name,
        })
    }

    /// Intern `text` in the class literal pool.
    ///
    /// `scope` and `span` locate the reference if the pool is full.
    pub fn literal(&mut self, text: &str, scope: ScopeId, span: Span) -> Result<u16> {
        self.literals.intern(text).map_err(|err| match err {
            CompilationError::LiteralPoolOverflow { literal, count, .. } => {
                CompilationError::LiteralPoolOverflow {
                    literal,
                    scope: self.table.qualified_name(scope),
                    count,
                    span,
                }
            }
            other => other,
        })
    }
}

/// The nested-block table of the method being compiled.
///
/// Sized from the symbol table before the body is traversed; every slot
/// must be filled exactly once by the time the method is finished.
pub(crate) struct BlockTable {
    method: ScopeId,
    owner: String,
    slots: Vec<Option<CompiledBlock>>,
}

impl BlockTable {
    pub fn new(table: &SymbolTable, method: ScopeId, span: Span) -> Result<Self> {
        let count = table
            .scope(method)
            .as_block()
            .map(|b| b.nested_blocks as usize)
            .ok_or(CompilationError::MissingScope {
                node: "method",
                span,
            })?;
        Ok(Self {
            method,
            owner: table.qualified_name(method),
            slots: (0..count).map(|_| None).collect(),
        })
    }

    /// The method owning the table.
    pub fn method(&self) -> ScopeId {
        self.method
    }

    /// Place a compiled block at `index`.
    pub fn install(&mut self, index: u32, unit: CompiledBlock, span: Span) -> Result<()> {
        let len = self.slots.len();
        let Some(slot) = self.slots.get_mut(index as usize) else {
            return Err(self.malformed(
                format!("block index {index} out of range for {len} nested blocks"),
                span,
            ));
        };
        if slot.is_some() {
            return Err(self.malformed(format!("block slot {index} filled twice"), span));
        }
        *slot = Some(unit);
        Ok(())
    }

    /// Take the filled table, failing if a slot was never filled.
    pub fn finish(self, span: Span) -> Result<Vec<CompiledBlock>> {
        if let Some(missing) = self.slots.iter().position(Option::is_none) {
            return Err(self.malformed(format!("block slot {missing} never filled"), span));
        }
        Ok(self.slots.into_iter().flatten().collect())
    }

    fn malformed(&self, message: String, span: Span) -> CompilationError {
        CompilationError::MalformedNesting {
            scope: self.owner.clone(),
            message,
            span,
        }
    }
}
