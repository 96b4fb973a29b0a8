//! Smalltalk bytecode compiler.
//!
//! Turns an annotated Smalltalk syntax tree into compiled classes for a
//! message-passing stack VM.
//!
//! ```
//! use smalltalk::prelude::*;
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//! let main = b.main(b.body(&[], &[b.stmt(b.keyword(
//!     b.name("Transcript"),
//!     &[("show:", b.string("hello"))],
//! ))]));
//! let file = b.file(vec![], Some(main));
//!
//! let result = Compiler::compile(&file, CodegenOptions::default());
//! assert!(result.is_success());
//! assert_eq!(result.program.main().unwrap().qualified_name, "MainClass>>main");
//! ```

pub use bumpalo::Bump;

pub use smalltalk_ast::{ast, symbols};
pub use smalltalk_compiler::{bytecode, codegen, unit};

pub use smalltalk_ast::{Resolution, ScopeId, SymbolKind, SymbolTable};
pub use smalltalk_compiler::{
    CodeGenerator, CodegenOptions, CompilationResult, CompiledBlock, CompiledClass,
    CompiledProgram, Compiler,
};
pub use smalltalk_core::{CompilationError, Result, Span};

/// Everything needed to build a tree and compile it.
pub mod prelude {
    pub use crate::Bump;
    pub use crate::ast::AstBuilder;
    pub use crate::bytecode::{Code, Instruction, OpCode, disassemble};
    pub use crate::{
        CodegenOptions, CompilationError, CompilationResult, CompiledBlock, CompiledClass,
        CompiledProgram, Compiler, SymbolTable,
    };
}
