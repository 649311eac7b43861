//! Index operator evaluation
//!
//! `base[index]` requires a pointer-typed base. The element address is
//! `base + index * CELL_SIZE` — plain pointer arithmetic over the virtual
//! `Value` cells — and the result is a view aliasing the cell's storage, so
//! `p[i] = v` writes into the arena.

use crate::interpreter::errors::Fault;
use crate::interpreter::jumps::EvalResult;
use crate::memory::heap::{MemoryRef, CELL_SIZE};
use crate::memory::scope::ScopeRef;
use crate::memory::value::Value;
use crate::parser::ast::{Expr, ExprRef};

impl Expr {
    pub(crate) fn eval_index(
        &self,
        base: &ExprRef,
        index: &ExprRef,
        memory: &MemoryRef,
        scope: &ScopeRef,
    ) -> EvalResult {
        let base_value = base.evaluate(scope)?;
        let address = match base_value {
            Some(cell) => match &*cell.borrow() {
                Value::Size(address) => *address,
                other => {
                    return Err(Fault::Type {
                        message: format!(
                            "Index operator can only be used on pointers, not {:?}",
                            other
                        ),
                    }
                    .into())
                }
            },
            None => {
                return Err(Fault::Type {
                    message: "Index operator applied to an expression with no value".to_string(),
                }
                .into())
            }
        };

        let index_value = index.evaluate(scope)?;
        let offset = match index_value {
            Some(cell) => match &*cell.borrow() {
                Value::Int(i) => *i as i64,
                other => {
                    return Err(Fault::Type {
                        message: format!("Index must be an integer, not {:?}", other),
                    }
                    .into())
                }
            },
            None => {
                return Err(Fault::Type {
                    message: "Index expression has no value".to_string(),
                }
                .into())
            }
        };

        let element = (address as i64 + offset * CELL_SIZE as i64) as u64;
        let view = memory.borrow().cell(element)?;
        Ok(Some(view))
    }
}
