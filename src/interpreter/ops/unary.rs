//! Unary operator evaluation
//!
//! `+ - !` behave as value operators. `++`/`--` mutate the operand's
//! storage; `operation_first` distinguishes prefix from postfix, with
//! postfix snapshotting the old value before mutating. `$` is the pointer
//! operator: applied to a `Size` it dereferences to the cell at that
//! address, applied to anything else it yields the address of the
//! operand's backing cell.

use crate::interpreter::errors::Fault;
use crate::interpreter::jumps::EvalResult;
use crate::memory::heap::MemoryRef;
use crate::memory::scope::ScopeRef;
use crate::memory::value::{Value, ValueRef};
use crate::parser::ast::{Expr, ExprRef};
use crate::parser::lexer::TokenKind;

impl Expr {
    pub(crate) fn eval_unary(
        &self,
        op: TokenKind,
        operand: &ExprRef,
        operation_first: bool,
        memory: &MemoryRef,
        scope: &ScopeRef,
    ) -> EvalResult {
        let value = operand.evaluate(scope)?;

        use TokenKind::*;
        match op {
            Plus => Ok(value),

            Minus => {
                let cell = require(value, op)?;
                let negated = cell.borrow().neg()?;
                Ok(Some(negated.cell()))
            }

            Bang => {
                let cell = require(value, op)?;
                let inverted = cell.borrow().not();
                Ok(Some(inverted.cell()))
            }

            PlusPlus | MinusMinus => {
                let cell = require(value, op)?;
                let one = Value::Int(1);
                let updated = {
                    let current = cell.borrow();
                    if op == PlusPlus {
                        current.add(&one)?
                    } else {
                        current.sub(&one)?
                    }
                };
                if operation_first {
                    *cell.borrow_mut() = updated;
                    Ok(Some(cell))
                } else {
                    let old = cell.borrow().clone();
                    *cell.borrow_mut() = updated;
                    Ok(Some(old.cell()))
                }
            }

            Dollar => {
                let cell = require(value, op)?;
                let current = cell.borrow().clone();
                if let Value::Size(address) = current {
                    let view = memory.borrow().cell(address)?;
                    Ok(Some(view))
                } else {
                    let address = memory.borrow_mut().pin(&cell);
                    Ok(Some(Value::Size(address).cell()))
                }
            }

            // Anything else that reached unary position passes the operand
            // through untouched.
            _ => Ok(value),
        }
    }
}

fn require(value: Option<ValueRef>, op: TokenKind) -> Result<ValueRef, Fault> {
    value.ok_or(Fault::Type {
        message: format!("operator {} applied to an expression with no value", op),
    })
}
