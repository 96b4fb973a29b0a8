//! Immutable instruction sequences.
//!
//! A [`Code`] value is what every code-generation step returns. Sequences
//! are combined by concatenation into new values; nothing patches bytes in
//! place, so a fragment can be built before its position in the final
//! stream is known.

use super::{Instruction, OpCode};

/// An ordered sequence of instructions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Code {
    instructions: Vec<Instruction>,
}

impl Code {
    /// The empty sequence.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A single instruction.
    pub fn of(instruction: Instruction) -> Self {
        Self {
            instructions: vec![instruction],
        }
    }

    /// This sequence followed by `other`.
    #[must_use]
    pub fn join(mut self, other: Code) -> Code {
        self.instructions.extend(other.instructions);
        self
    }

    /// This sequence followed by one more instruction.
    #[must_use]
    pub fn then(mut self, instruction: Instruction) -> Code {
        self.instructions.push(instruction);
        self
    }

    /// Check if the sequence holds no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// The instructions in order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Encoded size in bytes.
    pub fn byte_len(&self) -> usize {
        self.instructions.iter().map(Instruction::encoded_len).sum()
    }

    /// Encode the sequence.
    pub fn bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.byte_len());
        for instruction in &self.instructions {
            instruction.encode(&mut out);
        }
        out
    }

    /// Opcodes only, without operands.
    pub fn opcodes(&self) -> Vec<OpCode> {
        self.instructions.iter().map(Instruction::opcode).collect()
    }

    /// Check this sequence has exactly the given opcodes.
    ///
    /// Operand values are ignored. Panics with both sequences on mismatch.
    #[track_caller]
    pub fn assert_opcodes(&self, expected: &[OpCode]) {
        let actual = self.opcodes();
        assert_eq!(
            actual,
            expected,
            "Bytecode mismatch.\nExpected: {:?}\nActual:   {:?}",
            expected.iter().map(|op| op.name()).collect::<Vec<_>>(),
            actual.iter().map(|op| op.name()).collect::<Vec<_>>(),
        );
    }
}

impl From<Instruction> for Code {
    fn from(instruction: Instruction) -> Self {
        Code::of(instruction)
    }
}

impl FromIterator<Code> for Code {
    fn from_iter<I: IntoIterator<Item = Code>>(iter: I) -> Self {
        iter.into_iter().fold(Code::empty(), Code::join)
    }
}

impl FromIterator<Instruction> for Code {
    fn from_iter<I: IntoIterator<Item = Instruction>>(iter: I) -> Self {
        Code {
            instructions: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_identity_for_join() {
        let code = Code::of(Instruction::PushSelf);
        assert_eq!(Code::empty().join(code.clone()), code);
        assert_eq!(code.clone().join(Code::empty()), code);
        assert!(Code::empty().is_empty());
    }

    #[test]
    fn join_preserves_order() {
        let code = Code::of(Instruction::PushNil)
            .join(Code::of(Instruction::Pop))
            .then(Instruction::PushSelf)
            .then(Instruction::Return);

        code.assert_opcodes(&[OpCode::PushNil, OpCode::Pop, OpCode::PushSelf, OpCode::Return]);
        assert_eq!(code.bytes(), vec![18, 11, 17, 16]);
    }

    #[test]
    fn byte_len_counts_operands() {
        let code: Code = [
            Instruction::PushInt(1),
            Instruction::PushLocal { delta: 0, slot: 0 },
            Instruction::Pop,
        ]
        .into_iter()
        .collect();
        assert_eq!(code.byte_len(), 5 + 5 + 1);
        assert_eq!(code.bytes().len(), code.byte_len());
    }

    #[test]
    fn collects_fragments() {
        let code: Code = (0..3).map(|i| Code::of(Instruction::PushInt(i))).collect();
        assert_eq!(code.len(), 3);
        assert_eq!(code.instructions()[2], Instruction::PushInt(2));
    }

    #[test]
    #[should_panic(expected = "Bytecode mismatch")]
    fn assert_opcodes_reports_mismatch() {
        Code::of(Instruction::Pop).assert_opcodes(&[OpCode::Return]);
    }
}
