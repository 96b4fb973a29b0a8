//! Code generation from the annotated syntax tree.
//!
//! The [`CodeGenerator`] walks classes, methods, the top-level `main` body and
//! every expression inside them, producing one [`CompiledClass`] per class.
//! The current scope is passed down explicitly: entering a method or block
//! means calling into it with that node's scope.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use smalltalk_ast::{SymbolTable, ast::AstBuilder};
//! use smalltalk_compiler::{CodeGenerator, CodegenOptions, bytecode::Instruction};
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//! let x = b.unary_method("x", b.body(&[], &[b.ret(b.name("x"))]));
//! let file = b.file(vec![b.class("Point", None, &["x", "y"], vec![x])], None);
//!
//! let table = SymbolTable::define(&file).unwrap();
//! let result = CodeGenerator::new(&table, CodegenOptions::default()).compile_file(&file);
//! assert!(result.is_success());
//!
//! let x = result.program.class("Point").unwrap().method("x").unwrap();
//! assert_eq!(x.instructions()[0], Instruction::PushField { offset: 0 });
//! ```

mod block;
mod context;
mod expr;
mod method;

use smalltalk_ast::ast::{ClassDef, File, MainDef, MethodDef};
use smalltalk_ast::{MAIN_CLASS, ScopeId, SymbolTable};
use smalltalk_core::{CompilationError, Result, Span};

use crate::CompilationResult;
use crate::bytecode::{Code, Instruction};
use crate::unit::{CompiledClass, CompiledProgram};
use context::ClassContext;
use method::MethodCompiler;

/// File name recorded by `dbg` when none is configured.
pub const UNKNOWN_FILE: &str = "<unknown>";

/// Code generation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Emit `dbg` instructions before method trailers and block returns
    pub debug_info: bool,
    /// Source file name interned for `dbg` instructions
    pub file_name: String,
}

impl CodegenOptions {
    /// Turn `dbg` emission on or off.
    pub fn with_debug_info(mut self, debug_info: bool) -> Self {
        self.debug_info = debug_info;
        self
    }

    /// Set the file name recorded by `dbg`.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            debug_info: false,
            file_name: UNKNOWN_FILE.to_string(),
        }
    }
}

/// Generates bytecode for definitions already entered in a [`SymbolTable`].
pub struct CodeGenerator<'g> {
    table: &'g SymbolTable,
    options: CodegenOptions,
}

impl<'g> CodeGenerator<'g> {
    /// Create a generator over a populated symbol table.
    pub fn new(table: &'g SymbolTable, options: CodegenOptions) -> Self {
        Self { table, options }
    }

    /// The symbol table being compiled against.
    pub fn table(&self) -> &'g SymbolTable {
        self.table
    }

    /// The active options.
    pub fn options(&self) -> &CodegenOptions {
        &self.options
    }

    /// Compile every class and the main body of `file`.
    ///
    /// An error aborts only the class it occurs in; the remaining classes
    /// are still compiled and the errors are collected.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile_file(&self, file: &File<'_>) -> CompilationResult {
        let mut program = CompiledProgram::default();
        let mut errors = Vec::new();

        let main_owner = file.classes.iter().position(|c| c.name.name == MAIN_CLASS);
        for (i, class) in file.classes.iter().enumerate() {
            let main = file.main.filter(|_| main_owner == Some(i));
            match self.compile_class_with_main(class, main) {
                Ok(compiled) => program.classes.push(compiled),
                Err(err) => {
                    if err.is_internal() {
                        log::warn!("class {} hit an internal error: {err}", class.name.name);
                    } else {
                        log::debug!("class {} failed: {err}", class.name.name);
                    }
                    errors.push(err);
                }
            }
        }

        if let (None, Some(main)) = (main_owner, file.main) {
            match self.compile_main(main) {
                Ok(compiled) => program.classes.push(compiled),
                Err(err) => {
                    log::debug!("main failed: {err}");
                    errors.push(err);
                }
            }
        }

        CompilationResult { program, errors }
    }

    /// Compile one class definition.
    pub fn compile_class(&self, class: &ClassDef<'_>) -> Result<CompiledClass> {
        self.compile_class_with_main(class, None)
    }

    /// Compile the top-level statements into their synthetic class.
    pub fn compile_main(&self, main: &MainDef<'_>) -> Result<CompiledClass> {
        let class = main
            .scope
            .get()
            .and_then(|scope| self.table.enclosing_class(scope))
            .ok_or(CompilationError::MissingScope {
                node: "main",
                span: main.span,
            })?;
        self.compile_members(class, &[], Some(main), main.span)
    }

    fn compile_class_with_main(
        &self,
        class: &ClassDef<'_>,
        main: Option<&MainDef<'_>>,
    ) -> Result<CompiledClass> {
        let scope = class.scope.get().ok_or(CompilationError::MissingScope {
            node: "class",
            span: class.span,
        })?;
        self.compile_members(scope, class.methods, main, class.span)
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    fn compile_members(
        &self,
        class: ScopeId,
        methods: &[MethodDef<'_>],
        main: Option<&MainDef<'_>>,
        span: Span,
    ) -> Result<CompiledClass> {
        let mut cx = ClassContext::new(self.table, &self.options, class, span)?;
        log::debug!(
            "compiling class {} ({} fields)",
            cx.name,
            self.table.num_fields(class)
        );

        let mut compiled = Vec::with_capacity(methods.len() + usize::from(main.is_some()));
        for def in methods {
            compiled.push(MethodCompiler::compile_method(&mut cx, def)?);
        }
        if let Some(main) = main {
            compiled.push(MethodCompiler::compile_main(&mut cx, main)?);
        }

        let body = Code::of(Instruction::Pop)
            .then(Instruction::PushSelf)
            .then(Instruction::Return);
        let superclass = self
            .table
            .scope(class)
            .as_class()
            .and_then(|c| c.superclass)
            .map(|s| self.table.qualified_name(s));

        Ok(CompiledClass {
            name: cx.name,
            superclass,
            fields: self.table.field_names(class),
            literals: cx.literals.into_literals(),
            methods: compiled,
            body: body.bytes(),
        })
    }
}
