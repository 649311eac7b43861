//! Statement list and branch evaluation

use crate::interpreter::errors::Fault;
use crate::interpreter::jumps::EvalResult;
use crate::memory::scope::{Scope, ScopeRef};
use crate::memory::value::ValueRef;
use crate::parser::ast::{Expr, ExprRef, StatementList};

/// Truthiness of an evaluation result; a missing value is false.
pub(crate) fn truthy(result: &Option<ValueRef>) -> bool {
    result
        .as_ref()
        .is_some_and(|value| value.borrow().to_bool())
}

impl StatementList {
    /// Run the list. A native body evaluates its pending arguments and
    /// hands them to the builtin; a user body binds its parameters in the
    /// local scope and evaluates statements in order, yielding the last
    /// statement's value.
    pub fn evaluate(&self, scope: &ScopeRef) -> EvalResult {
        if let Some(native) = &self.native {
            let passed = self.passed_args.take();
            let mut evaluated = Vec::with_capacity(passed.len());
            for arg in &passed {
                match arg.evaluate(scope)? {
                    Some(value) => evaluated.push(value),
                    None => return Err(Fault::UndefinedEvaluation.into()),
                }
            }
            return native(&evaluated, scope);
        }

        let local_scope = if self.no_local_scope.get() {
            scope.clone()
        } else {
            Scope::child_of(scope)
        };

        let passed = self.passed_args.take();
        for (i, param) in self.params.iter().enumerate() {
            let Some(arg) = passed.get(i) else {
                return Err(Fault::Arity {
                    expected: self.params.len(),
                    got: passed.len(),
                }
                .into());
            };
            let Expr::VarDecl { name, .. } = &**param else {
                continue;
            };
            local_scope.borrow_mut().declare(name, arg.clone());
        }

        let mut result = None;
        for statement in &self.statements {
            result = statement.evaluate(&local_scope)?;
        }
        Ok(result)
    }
}

impl Expr {
    pub(crate) fn eval_if(
        &self,
        condition: &ExprRef,
        then_branch: &ExprRef,
        else_branch: Option<&ExprRef>,
        scope: &ScopeRef,
    ) -> EvalResult {
        let cond = condition.evaluate(scope)?;
        if truthy(&cond) {
            then_branch.evaluate(scope)
        } else if let Some(else_expr) = else_branch {
            else_expr.evaluate(scope)
        } else {
            Ok(None)
        }
    }
}
