//! Bytecode listing.

use std::fmt::Write;

use super::Instruction;

/// Render encoded bytecode one instruction per line, with byte offsets.
///
/// Literal operands are followed by the literal text when `literals`
/// has it. Undecodable trailing bytes are shown as a single `???` line.
///
/// ```text
/// 0000:  push_field 0
/// 0003:  send 1, #2 'foo:'
/// 0008:  return
/// ```
pub fn disassemble(bytes: &[u8], literals: &[String]) -> String {
    let mut out = String::new();
    let mut offset = 0;
    while offset < bytes.len() {
        let Some((instruction, len)) = Instruction::decode(&bytes[offset..]) else {
            let _ = writeln!(out, "{offset:04}:  ??? ({} bytes)", bytes.len() - offset);
            break;
        };
        let _ = write!(out, "{offset:04}:  {instruction}");
        if let Some(text) = instruction
            .literal()
            .and_then(|idx| literals.get(idx as usize))
        {
            let _ = write!(out, " '{text}'");
        }
        out.push('\n');
        offset += len;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::Code;

    #[test]
    fn lists_offsets_and_literals() {
        let code = Code::of(Instruction::PushField { offset: 0 })
            .then(Instruction::Send { argc: 1, selector: 0 })
            .then(Instruction::Return);
        let text = disassemble(&code.bytes(), &["foo:".to_string()]);

        assert_eq!(
            text,
            "0000:  push_field 0\n0003:  send 1, #0 'foo:'\n0008:  return\n"
        );
    }

    #[test]
    fn marks_garbage() {
        let text = disassemble(&[16, 99, 1], &[]);
        assert_eq!(text, "0000:  return\n0001:  ??? (2 bytes)\n");
    }
}
