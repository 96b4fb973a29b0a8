//! Bytecode operation codes.
//!
//! This module defines the instruction set of the message-passing VM.
//! Each opcode is a single byte, with fixed-width big-endian operands
//! following inline.

/// The kind of an inline operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandType {
    /// Index into the class literal pool (u16)
    Literal,
    /// Unsigned 16-bit count, offset, or slot
    Short,
    /// Signed 32-bit integer (or packed line/column for `dbg`)
    Int,
    /// IEEE-754 single-precision float
    Float,
}

impl OperandType {
    /// Encoded width in bytes.
    pub const fn size(self) -> usize {
        match self {
            OperandType::Literal | OperandType::Short => 2,
            OperandType::Int | OperandType::Float => 4,
        }
    }
}

/// Bytecode operation codes.
///
/// The VM is a stack machine: every expression leaves exactly one value on
/// the operand stack, and sends pop the receiver plus arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    /// Do nothing.
    Nop = 0,

    // =========================================================================
    // Pushes
    // =========================================================================
    /// Push a character.
    /// Operand: literal index of the character text
    PushChar,
    /// Push an integer immediate.
    /// Operand: i32
    PushInt,
    /// Push a float immediate.
    /// Operand: f32
    PushFloat,
    /// Push a receiver field.
    /// Operand: u16 field offset (inherited fields first)
    PushField,
    /// Push an argument or temporary.
    /// Operands: u16 scope delta, u16 slot
    PushLocal,
    /// Push a string literal.
    /// Operand: literal index
    PushLiteral,
    /// Push a global (late-bound by name).
    /// Operand: literal index of the name
    PushGlobal,
    /// Pop N values and push an array of them.
    /// Operand: u16 element count
    PushArray,

    // =========================================================================
    // Stores (value stays on the stack)
    // =========================================================================
    /// Store top of stack into a receiver field.
    /// Operand: u16 field offset
    StoreField,
    /// Store top of stack into an argument or temporary.
    /// Operands: u16 scope delta, u16 slot
    StoreLocal,

    // =========================================================================
    // Stack and sends
    // =========================================================================
    /// Discard top of stack.
    Pop,
    /// Send a message to the receiver below the arguments.
    /// Operands: u16 argument count, literal index of the selector
    Send,
    /// Send starting method lookup in the superclass.
    /// Operands: u16 argument count, literal index of the selector
    SendSuper,

    // =========================================================================
    // Blocks and returns
    // =========================================================================
    /// Push a closure for a nested block.
    /// Operand: u16 index into the method's nested-block table
    Block,
    /// Return top of stack from a block to its caller.
    BlockReturn,
    /// Return top of stack from the enclosing method.
    Return,

    // =========================================================================
    // Pseudo-variables
    // =========================================================================
    /// Push the receiver.
    PushSelf,
    /// Push nil.
    PushNil,
    /// Push true.
    PushTrue,
    /// Push false.
    PushFalse,

    // =========================================================================
    // Debug info
    // =========================================================================
    /// Record a source position; no runtime effect.
    /// Operands: literal index of the file name, i32 `(line << 8) | col`
    Dbg,
}

impl OpCode {
    const ALL: [OpCode; 22] = [
        OpCode::Nop,
        OpCode::PushChar,
        OpCode::PushInt,
        OpCode::PushFloat,
        OpCode::PushField,
        OpCode::PushLocal,
        OpCode::PushLiteral,
        OpCode::PushGlobal,
        OpCode::PushArray,
        OpCode::StoreField,
        OpCode::StoreLocal,
        OpCode::Pop,
        OpCode::Send,
        OpCode::SendSuper,
        OpCode::Block,
        OpCode::BlockReturn,
        OpCode::Return,
        OpCode::PushSelf,
        OpCode::PushNil,
        OpCode::PushTrue,
        OpCode::PushFalse,
        OpCode::Dbg,
    ];

    /// Decode an opcode byte.
    pub fn from_u8(byte: u8) -> Option<OpCode> {
        Self::ALL.get(byte as usize).copied()
    }

    /// Mnemonic used by the disassembler.
    pub fn name(self) -> &'static str {
        match self {
            OpCode::Nop => "nop",
            OpCode::PushChar => "push_char",
            OpCode::PushInt => "push_int",
            OpCode::PushFloat => "push_float",
            OpCode::PushField => "push_field",
            OpCode::PushLocal => "push_local",
            OpCode::PushLiteral => "push_literal",
            OpCode::PushGlobal => "push_global",
            OpCode::PushArray => "push_array",
            OpCode::StoreField => "store_field",
            OpCode::StoreLocal => "store_local",
            OpCode::Pop => "pop",
            OpCode::Send => "send",
            OpCode::SendSuper => "send_super",
            OpCode::Block => "block",
            OpCode::BlockReturn => "block_return",
            OpCode::Return => "return",
            OpCode::PushSelf => "self",
            OpCode::PushNil => "nil",
            OpCode::PushTrue => "true",
            OpCode::PushFalse => "false",
            OpCode::Dbg => "dbg",
        }
    }

    /// Operand layout following the opcode byte.
    pub fn operands(self) -> &'static [OperandType] {
        use OperandType::*;
        match self {
            OpCode::PushChar | OpCode::PushLiteral | OpCode::PushGlobal => &[Literal],
            OpCode::PushInt => &[Int],
            OpCode::PushFloat => &[Float],
            OpCode::PushField | OpCode::StoreField | OpCode::PushArray | OpCode::Block => &[Short],
            OpCode::PushLocal | OpCode::StoreLocal => &[Short, Short],
            OpCode::Send | OpCode::SendSuper => &[Short, Literal],
            OpCode::Dbg => &[Literal, Int],
            OpCode::Nop
            | OpCode::Pop
            | OpCode::BlockReturn
            | OpCode::Return
            | OpCode::PushSelf
            | OpCode::PushNil
            | OpCode::PushTrue
            | OpCode::PushFalse => &[],
        }
    }

    /// Total operand width in bytes.
    pub fn operand_size(self) -> usize {
        self.operands().iter().map(|op| op.size()).sum()
    }
}
