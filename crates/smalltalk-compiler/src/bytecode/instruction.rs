//! Instructions with typed operands and their byte encoding.
//!
//! Every instruction encodes as one opcode byte followed by its operands in
//! big-endian order. Encoding is a pure function of the instruction.

use std::fmt;

use super::OpCode;

/// One VM instruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instruction {
    Nop,
    PushChar { literal: u16 },
    PushInt(i32),
    PushFloat(f32),
    PushField { offset: u16 },
    PushLocal { delta: u16, slot: u16 },
    PushLiteral { literal: u16 },
    PushGlobal { literal: u16 },
    PushArray { count: u16 },
    StoreField { offset: u16 },
    StoreLocal { delta: u16, slot: u16 },
    Pop,
    Send { argc: u16, selector: u16 },
    SendSuper { argc: u16, selector: u16 },
    Block { index: u16 },
    BlockReturn,
    Return,
    PushSelf,
    PushNil,
    PushTrue,
    PushFalse,
    /// Source position marker. Only the low 24 bits of `line` and the low 8
    /// bits of `col` survive encoding.
    Dbg { file: u16, line: u32, col: u32 },
}

impl Instruction {
    /// The opcode of this instruction.
    pub fn opcode(&self) -> OpCode {
        match self {
            Instruction::Nop => OpCode::Nop,
            Instruction::PushChar { .. } => OpCode::PushChar,
            Instruction::PushInt(_) => OpCode::PushInt,
            Instruction::PushFloat(_) => OpCode::PushFloat,
            Instruction::PushField { .. } => OpCode::PushField,
            Instruction::PushLocal { .. } => OpCode::PushLocal,
            Instruction::PushLiteral { .. } => OpCode::PushLiteral,
            Instruction::PushGlobal { .. } => OpCode::PushGlobal,
            Instruction::PushArray { .. } => OpCode::PushArray,
            Instruction::StoreField { .. } => OpCode::StoreField,
            Instruction::StoreLocal { .. } => OpCode::StoreLocal,
            Instruction::Pop => OpCode::Pop,
            Instruction::Send { .. } => OpCode::Send,
            Instruction::SendSuper { .. } => OpCode::SendSuper,
            Instruction::Block { .. } => OpCode::Block,
            Instruction::BlockReturn => OpCode::BlockReturn,
            Instruction::Return => OpCode::Return,
            Instruction::PushSelf => OpCode::PushSelf,
            Instruction::PushNil => OpCode::PushNil,
            Instruction::PushTrue => OpCode::PushTrue,
            Instruction::PushFalse => OpCode::PushFalse,
            Instruction::Dbg { .. } => OpCode::Dbg,
        }
    }

    /// Encoded size in bytes, opcode included.
    pub fn encoded_len(&self) -> usize {
        1 + self.opcode().operand_size()
    }

    /// The literal pool index this instruction refers to, if any.
    pub fn literal(&self) -> Option<u16> {
        match *self {
            Instruction::PushChar { literal }
            | Instruction::PushLiteral { literal }
            | Instruction::PushGlobal { literal } => Some(literal),
            Instruction::Send { selector, .. } | Instruction::SendSuper { selector, .. } => {
                Some(selector)
            }
            Instruction::Dbg { file, .. } => Some(file),
            _ => None,
        }
    }

    /// Append the byte encoding to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.push(self.opcode() as u8);
        match *self {
            Instruction::PushChar { literal }
            | Instruction::PushLiteral { literal }
            | Instruction::PushGlobal { literal } => put_u16(out, literal),
            Instruction::PushInt(value) => out.extend_from_slice(&value.to_be_bytes()),
            Instruction::PushFloat(value) => out.extend_from_slice(&value.to_bits().to_be_bytes()),
            Instruction::PushField { offset } | Instruction::StoreField { offset } => {
                put_u16(out, offset)
            }
            Instruction::PushArray { count } => put_u16(out, count),
            Instruction::Block { index } => put_u16(out, index),
            Instruction::PushLocal { delta, slot } | Instruction::StoreLocal { delta, slot } => {
                put_u16(out, delta);
                put_u16(out, slot);
            }
            Instruction::Send { argc, selector } | Instruction::SendSuper { argc, selector } => {
                put_u16(out, argc);
                put_u16(out, selector);
            }
            Instruction::Dbg { file, line, col } => {
                if col > 0xFF || line > 0x00FF_FFFF {
                    log::trace!("dbg position {line}:{col} truncated to its 24:8 bit operand");
                }
                put_u16(out, file);
                out.extend_from_slice(&((line << 8) | (col & 0xFF)).to_be_bytes());
            }
            Instruction::Nop
            | Instruction::Pop
            | Instruction::BlockReturn
            | Instruction::Return
            | Instruction::PushSelf
            | Instruction::PushNil
            | Instruction::PushTrue
            | Instruction::PushFalse => {}
        }
    }

    /// Encode into a fresh byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.encode(&mut out);
        out
    }

    /// Decode the instruction at the start of `bytes`.
    ///
    /// Returns the instruction and its encoded length, or `None` if the
    /// opcode is unknown or the operands are truncated.
    pub fn decode(bytes: &[u8]) -> Option<(Instruction, usize)> {
        let op = OpCode::from_u8(*bytes.first()?)?;
        let len = 1 + op.operand_size();
        let operands = bytes.get(1..len)?;
        let u16_at = |i: usize| u16::from_be_bytes([operands[i], operands[i + 1]]);
        let u32_at = |i: usize| {
            u32::from_be_bytes([operands[i], operands[i + 1], operands[i + 2], operands[i + 3]])
        };

        let instruction = match op {
            OpCode::Nop => Instruction::Nop,
            OpCode::PushChar => Instruction::PushChar { literal: u16_at(0) },
            OpCode::PushInt => Instruction::PushInt(u32_at(0) as i32),
            OpCode::PushFloat => Instruction::PushFloat(f32::from_bits(u32_at(0))),
            OpCode::PushField => Instruction::PushField { offset: u16_at(0) },
            OpCode::PushLocal => Instruction::PushLocal {
                delta: u16_at(0),
                slot: u16_at(2),
            },
            OpCode::PushLiteral => Instruction::PushLiteral { literal: u16_at(0) },
            OpCode::PushGlobal => Instruction::PushGlobal { literal: u16_at(0) },
            OpCode::PushArray => Instruction::PushArray { count: u16_at(0) },
            OpCode::StoreField => Instruction::StoreField { offset: u16_at(0) },
            OpCode::StoreLocal => Instruction::StoreLocal {
                delta: u16_at(0),
                slot: u16_at(2),
            },
            OpCode::Pop => Instruction::Pop,
            OpCode::Send => Instruction::Send {
                argc: u16_at(0),
                selector: u16_at(2),
            },
            OpCode::SendSuper => Instruction::SendSuper {
                argc: u16_at(0),
                selector: u16_at(2),
            },
            OpCode::Block => Instruction::Block { index: u16_at(0) },
            OpCode::BlockReturn => Instruction::BlockReturn,
            OpCode::Return => Instruction::Return,
            OpCode::PushSelf => Instruction::PushSelf,
            OpCode::PushNil => Instruction::PushNil,
            OpCode::PushTrue => Instruction::PushTrue,
            OpCode::PushFalse => Instruction::PushFalse,
            OpCode::Dbg => {
                let packed = u32_at(2);
                Instruction::Dbg {
                    file: u16_at(0),
                    line: packed >> 8,
                    col: packed & 0xFF,
                }
            }
        };
        Some((instruction, len))
    }

    /// Decode a whole instruction stream, stopping at the first byte that
    /// does not start a valid instruction.
    pub fn decode_all(bytes: &[u8]) -> Vec<Instruction> {
        let mut out = Vec::new();
        let mut offset = 0;
        while let Some((instruction, len)) = Instruction::decode(&bytes[offset..]) {
            out.push(instruction);
            offset += len;
        }
        out
    }
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.opcode().name();
        match *self {
            Instruction::PushChar { literal }
            | Instruction::PushLiteral { literal }
            | Instruction::PushGlobal { literal } => write!(f, "{name} #{literal}"),
            Instruction::PushInt(value) => write!(f, "{name} {value}"),
            Instruction::PushFloat(value) => write!(f, "{name} {value:?}"),
            Instruction::PushField { offset } | Instruction::StoreField { offset } => {
                write!(f, "{name} {offset}")
            }
            Instruction::PushArray { count } => write!(f, "{name} {count}"),
            Instruction::Block { index } => write!(f, "{name} {index}"),
            Instruction::PushLocal { delta, slot } | Instruction::StoreLocal { delta, slot } => {
                write!(f, "{name} {delta}, {slot}")
            }
            Instruction::Send { argc, selector } | Instruction::SendSuper { argc, selector } => {
                write!(f, "{name} {argc}, #{selector}")
            }
            Instruction::Dbg { file, line, col } => write!(f, "{name} #{file}, {line}:{col}"),
            _ => f.write_str(name),
        }
    }
}
