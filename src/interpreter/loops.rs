//! Loop evaluation
//!
//! `while` and `for` both catch `Break` and `Continue` signals and re-raise
//! everything else (`Return` and faults unwind through them). A `while`
//! body opens a fresh local scope each iteration; a `for` body is marked
//! `no_local_scope` and runs inside the init scope, so loop variables
//! persist across iterations.

use crate::interpreter::jumps::{EvalResult, Signal};
use crate::interpreter::statements::truthy;
use crate::memory::scope::{Scope, ScopeRef};
use crate::parser::ast::{Expr, ExprRef};

impl Expr {
    pub(crate) fn eval_while(
        &self,
        condition: &ExprRef,
        body: &ExprRef,
        scope: &ScopeRef,
    ) -> EvalResult {
        let mut result = None;
        loop {
            let cond = condition.evaluate(scope)?;
            if !truthy(&cond) {
                break;
            }
            match body.evaluate(scope) {
                Ok(value) => result = value,
                Err(Signal::Break) => break,
                Err(Signal::Continue) => {}
                Err(other) => return Err(other),
            }
        }
        Ok(result)
    }

    pub(crate) fn eval_for(
        &self,
        init: Option<&ExprRef>,
        condition: Option<&ExprRef>,
        step: Option<&ExprRef>,
        body: &ExprRef,
        scope: &ScopeRef,
    ) -> EvalResult {
        if init.is_none() && condition.is_none() {
            return Ok(None);
        }

        let local_scope = match init {
            Some(init_expr) => {
                let init_scope = Scope::child_of(scope);
                init_expr.evaluate(&init_scope)?;
                init_scope
            }
            None => scope.clone(),
        };

        let mut result = None;
        loop {
            if let Some(cond) = condition {
                let value = cond.evaluate(&local_scope)?;
                if !truthy(&value) {
                    break;
                }
            }

            match body.evaluate(&local_scope) {
                Ok(value) => result = value,
                Err(Signal::Break) => break,
                Err(Signal::Continue) => {}
                Err(other) => return Err(other),
            }

            // The step also runs after a `continue`.
            if let Some(step_expr) = step {
                step_expr.evaluate(&local_scope)?;
            }
        }
        Ok(result)
    }
}
