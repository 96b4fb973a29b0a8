//! Smalltalk Compiler
//!
//! Bytecode generation for a class-based, message-passing stack VM.
//!
//! ## Architecture
//!
//! - **Definition**: [`SymbolTable::define`] enters classes, fields, methods,
//!   arguments, temporaries and blocks, and annotates the syntax tree with
//!   their scopes
//! - **Generation**: [`CodeGenerator`] walks the annotated tree and emits one
//!   [`CompiledClass`] per class
//!
//! ## Modules
//!
//! - [`bytecode`]: Instruction set, encoding, code sequences, literal pools
//! - [`codegen`]: Tree traversal producing compiled units
//! - [`unit`]: Compiled classes, methods and blocks

pub mod bytecode;
pub mod codegen;
pub mod unit;

pub use codegen::{CodeGenerator, CodegenOptions};
pub use unit::{CompiledBlock, CompiledClass, CompiledProgram};

pub use smalltalk_ast::SymbolTable;
pub use smalltalk_core::CompilationError;

use smalltalk_ast::ast::File;

/// Result of compilation.
#[derive(Debug)]
pub struct CompilationResult {
    /// Every class that compiled cleanly.
    pub program: CompiledProgram,
    /// Any errors that occurred.
    pub errors: Vec<CompilationError>,
}

impl CompilationResult {
    /// Check if compilation succeeded (no errors).
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// The main compiler entry point.
pub struct Compiler;

impl Compiler {
    /// Define and generate code for a parsed file.
    ///
    /// A definition error stops everything, since later classes may depend
    /// on the failed one. Generation errors only drop the affected class.
    pub fn compile(file: &File<'_>, options: CodegenOptions) -> CompilationResult {
        let table = match SymbolTable::define(file) {
            Ok(table) => table,
            Err(err) => {
                log::debug!("definition failed: {err}");
                return CompilationResult {
                    program: CompiledProgram::default(),
                    errors: vec![err],
                };
            }
        };
        log::debug!(
            "defined {} scopes across {} classes",
            table.scope_count(),
            table.classes().count()
        );
        CodeGenerator::new(&table, options).compile_file(file)
    }
}
