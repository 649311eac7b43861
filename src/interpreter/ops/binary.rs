//! Binary operator evaluation
//!
//! Both operands are always evaluated left-to-right before the operator is
//! applied (there is no short-circuiting). Assignment forms mutate the left
//! operand's storage in place and yield it, so chained and compound
//! assignment write through whatever lvalue produced the cell — a variable
//! binding, a struct field, an arena cell, or a `$` view.

use crate::interpreter::errors::Fault;
use crate::interpreter::jumps::EvalResult;
use crate::memory::scope::ScopeRef;
use crate::memory::value::Value;
use crate::parser::ast::{Expr, ExprRef};
use crate::parser::lexer::TokenKind;

/// Apply a non-dot operator to two evaluated operands.
fn apply(op: TokenKind, left: &Value, right: &Value) -> Result<Value, Fault> {
    use TokenKind::*;
    match op {
        Plus | PlusEq => left.add(right),
        Minus | MinusEq => left.sub(right),
        Star | StarEq => left.mul(right),
        Slash | SlashEq => left.div(right),
        Percent | PercentEq => left.rem(right),
        Amp | AmpEq => Ok(left.bit_and(right)),
        Pipe | PipeEq => Ok(left.bit_or(right)),
        Caret | CaretEq => Ok(left.bit_xor(right)),
        AndAnd => Ok(left.logical_and(right)),
        OrOr => Ok(left.logical_or(right)),
        EqEq => Ok(left.equals(right)),
        NotEq => Ok(left.not_equals(right)),
        Lt => Ok(left.less(right)),
        Gt => Ok(left.greater(right)),
        Le => Ok(left.less_equal(right)),
        Ge => Ok(left.greater_equal(right)),
        other => Err(Fault::Type {
            message: format!("{} is not a binary operator", other),
        }),
    }
}

impl Expr {
    pub(crate) fn eval_binary(
        &self,
        op: TokenKind,
        left: &ExprRef,
        right: &ExprRef,
        scope: &ScopeRef,
    ) -> EvalResult {
        if op == TokenKind::Dot {
            return self.eval_dot(left, right, scope);
        }

        let lval = left.evaluate(scope)?;
        let rval = right.evaluate(scope)?;
        let (Some(lcell), Some(rcell)) = (lval, rval) else {
            return Err(Fault::Type {
                message: format!("operator {} applied to an expression with no value", op),
            }
            .into());
        };

        use TokenKind::*;
        match op {
            Eq => {
                let value = rcell.borrow().clone();
                *lcell.borrow_mut() = value;
                Ok(Some(lcell))
            }
            PlusEq | MinusEq | StarEq | SlashEq | PercentEq | AmpEq | PipeEq | CaretEq => {
                let updated = {
                    let lv = lcell.borrow();
                    let rv = rcell.borrow();
                    apply(op, &lv, &rv)?
                };
                *lcell.borrow_mut() = updated;
                Ok(Some(lcell))
            }
            _ => {
                let value = {
                    let lv = lcell.borrow();
                    let rv = rcell.borrow();
                    apply(op, &lv, &rv)?
                };
                Ok(Some(value.cell()))
            }
        }
    }
}
