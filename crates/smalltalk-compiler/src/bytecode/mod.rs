//! Bytecode types for the Smalltalk compiler.
//!
//! This module contains the core bytecode types:
//!
//! - [`OpCode`] - The instruction set for the VM
//! - [`Instruction`] - An opcode with typed operands, and its byte encoding
//! - [`Code`] - An immutable instruction sequence built by concatenation
//! - [`LiteralPool`] - Per-class interned literal storage
//! - [`disassemble`] - Human-readable listing of encoded bytecode

mod code;
mod disasm;
mod instruction;
mod literal;
mod opcode;

pub use code::Code;
pub use disasm::disassemble;
pub use instruction::Instruction;
pub use literal::{LiteralPool, MAX_LITERALS};
pub use opcode::{OpCode, OperandType};
