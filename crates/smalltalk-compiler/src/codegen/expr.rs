//! Expression code generation.
//!
//! Every expression compiles to code that leaves exactly one value on the
//! operand stack. Sends push the receiver, then the arguments left to
//! right, then `send`; a `super` receiver pushes `self` and uses
//! `send_super` instead.

use smalltalk_ast::ast::{
    AssignExpr, BinarySend, Expr, Ident, KeywordSend, LiteralExpr, LiteralKind, UnarySend,
};
use smalltalk_ast::{Resolution, ScopeId, SymbolKind};
use smalltalk_core::{CompilationError, Result, Span};

use super::method::MethodCompiler;
use crate::bytecode::{Code, Instruction};

impl MethodCompiler<'_, '_> {
    pub(super) fn expr(&mut self, scope: ScopeId, expr: &Expr<'_>) -> Result<Code> {
        match expr {
            Expr::Literal(lit) => self.literal(scope, lit),
            Expr::Ident(ident) => self.load(scope, ident),
            Expr::Super(_) => Ok(Code::of(Instruction::PushSelf)),
            Expr::Assign(assign) => self.assign(scope, assign),
            Expr::Unary(send) => self.unary(scope, send),
            Expr::Binary(send) => self.binary(scope, send),
            Expr::Keyword(send) => self.keyword(scope, send),
            Expr::Block(block) => self.block(scope, block),
            Expr::Array(array) => {
                let count = self.short("array size", array.elements.len(), scope, array.span)?;
                let mut code = Code::empty();
                for element in array.elements {
                    code = code.join(self.expr(scope, element)?);
                }
                Ok(code.then(Instruction::PushArray { count }))
            }
        }
    }

    // =========================================================================
    // Literals
    // =========================================================================

    fn literal(&mut self, scope: ScopeId, lit: &LiteralExpr<'_>) -> Result<Code> {
        let instruction = match lit.kind {
            LiteralKind::Number(text) => number(text, lit.span)?,
            LiteralKind::Char(text) => Instruction::PushChar {
                literal: self.class.literal(text, scope, lit.span)?,
            },
            LiteralKind::String(text) => Instruction::PushLiteral {
                literal: self.class.literal(&string_value(text), scope, lit.span)?,
            },
            LiteralKind::Nil => Instruction::PushNil,
            LiteralKind::SelfRef => Instruction::PushSelf,
            LiteralKind::True => Instruction::PushTrue,
            LiteralKind::False => Instruction::PushFalse,
        };
        Ok(Code::of(instruction))
    }

    // =========================================================================
    // Variables
    // =========================================================================

    /// Push the value bound to `ident`.
    ///
    /// Names with no binding are globals resolved by the VM at run time.
    fn load(&mut self, scope: ScopeId, ident: &Ident<'_>) -> Result<Code> {
        let table = self.class.table;
        let Some(found) = table.resolve(ident.name, scope) else {
            log::trace!(
                "'{}' in {} is a global",
                ident.name,
                table.qualified_name(scope)
            );
            return self.global(scope, ident);
        };
        match table.symbol(found.symbol).kind {
            SymbolKind::Field => Ok(Code::of(Instruction::PushField {
                offset: self.field_offset(scope, ident)?,
            })),
            SymbolKind::Argument | SymbolKind::Local => {
                let (delta, slot) = self.local(scope, found, ident)?;
                Ok(Code::of(Instruction::PushLocal { delta, slot }))
            }
            SymbolKind::Class => self.global(scope, ident),
        }
    }

    /// Store top of stack into `ident`, leaving the value in place.
    fn store(&mut self, scope: ScopeId, ident: &Ident<'_>) -> Result<Code> {
        let table = self.class.table;
        let found = table
            .resolve(ident.name, scope)
            .ok_or_else(|| self.unresolved(scope, ident))?;
        match table.symbol(found.symbol).kind {
            SymbolKind::Field => Ok(Code::of(Instruction::StoreField {
                offset: self.field_offset(scope, ident)?,
            })),
            SymbolKind::Argument | SymbolKind::Local => {
                let (delta, slot) = self.local(scope, found, ident)?;
                Ok(Code::of(Instruction::StoreLocal { delta, slot }))
            }
            SymbolKind::Class => Err(self.unresolved(scope, ident)),
        }
    }

    fn assign(&mut self, scope: ScopeId, assign: &AssignExpr<'_>) -> Result<Code> {
        let value = self.expr(scope, &assign.value)?;
        Ok(value.join(self.store(scope, &assign.target)?))
    }

    fn global(&mut self, scope: ScopeId, ident: &Ident<'_>) -> Result<Code> {
        Ok(Code::of(Instruction::PushGlobal {
            literal: self.class.literal(ident.name, scope, ident.span)?,
        }))
    }

    fn field_offset(&self, scope: ScopeId, ident: &Ident<'_>) -> Result<u16> {
        let offset = self
            .class
            .table
            .field_offset(self.class.class, ident.name)
            .ok_or_else(|| self.unresolved(scope, ident))?;
        self.short("field offset", offset as usize, scope, ident.span)
    }

    fn local(&self, scope: ScopeId, found: Resolution, ident: &Ident<'_>) -> Result<(u16, u16)> {
        let slot = self
            .class
            .table
            .local_index(found.symbol)
            .ok_or_else(|| self.unresolved(scope, ident))?;
        Ok((
            self.short("scope delta", found.delta as usize, scope, ident.span)?,
            self.short("local slot", slot as usize, scope, ident.span)?,
        ))
    }

    fn unresolved(&self, scope: ScopeId, ident: &Ident<'_>) -> CompilationError {
        CompilationError::UnresolvedName {
            name: ident.name.to_string(),
            scope: self.class.table.qualified_name(scope),
            span: ident.span,
        }
    }

    // =========================================================================
    // Sends
    // =========================================================================

    fn unary(&mut self, scope: ScopeId, send: &UnarySend<'_>) -> Result<Code> {
        let receiver = self.expr(scope, &send.receiver)?;
        let send_code = self.send(
            scope,
            send.receiver.is_super(),
            send.selector.name,
            0,
            send.span,
        )?;
        Ok(receiver.join(send_code))
    }

    /// `a + b * c` sends `+` to `a`, then `*` to the result.
    fn binary(&mut self, scope: ScopeId, send: &BinarySend<'_>) -> Result<Code> {
        let mut code = self.expr(scope, &send.left)?;
        for (i, op) in send.operations.iter().enumerate() {
            let to_super = i == 0 && send.left.is_super();
            code = code.join(self.expr(scope, &op.operand)?);
            code = code.join(self.send(scope, to_super, op.operator.name, 1, op.operator.span)?);
        }
        Ok(code)
    }

    fn keyword(&mut self, scope: ScopeId, send: &KeywordSend<'_>) -> Result<Code> {
        let mut code = self.expr(scope, &send.receiver)?;
        for part in send.parts {
            code = code.join(self.expr(scope, &part.arg)?);
        }
        let send_code = self.send(
            scope,
            send.receiver.is_super(),
            &send.selector(),
            send.parts.len(),
            send.span,
        )?;
        Ok(code.join(send_code))
    }

    fn send(
        &mut self,
        scope: ScopeId,
        to_super: bool,
        selector: &str,
        argc: usize,
        span: Span,
    ) -> Result<Code> {
        let argc = self.short("argument count", argc, scope, span)?;
        let selector = self.class.literal(selector, scope, span)?;
        Ok(Code::of(if to_super {
            Instruction::SendSuper { argc, selector }
        } else {
            Instruction::Send { argc, selector }
        }))
    }
}

/// Numbers with a decimal point are floats; everything else must be an i32.
fn number(text: &str, span: Span) -> Result<Instruction> {
    let invalid = || CompilationError::InvalidLiteral {
        text: text.to_string(),
        span,
    };
    if text.contains('.') {
        text.parse::<f32>()
            .map(Instruction::PushFloat)
            .map_err(|_| invalid())
    } else {
        text.parse::<i32>()
            .map(Instruction::PushInt)
            .map_err(|_| invalid())
    }
}

/// Contents of a quoted string literal: outer quotes removed, `''` collapsed to `'`.
fn string_value(text: &str) -> String {
    let inner = text
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .unwrap_or(text);
    inner.replace("''", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers() {
        assert_eq!(number("42", Span::default()), Ok(Instruction::PushInt(42)));
        assert_eq!(number("-7", Span::default()), Ok(Instruction::PushInt(-7)));
        assert_eq!(number("2.5", Span::default()), Ok(Instruction::PushFloat(2.5)));
        assert!(matches!(
            number("99999999999", Span::default()),
            Err(CompilationError::InvalidLiteral { .. })
        ));
        assert!(number("1.2.3", Span::default()).is_err());
    }

    #[test]
    fn string_values() {
        assert_eq!(string_value("'hello'"), "hello");
        assert_eq!(string_value("'it''s'"), "it's");
        assert_eq!(string_value("''"), "");
        assert_eq!(string_value("bare"), "bare");
    }
}
