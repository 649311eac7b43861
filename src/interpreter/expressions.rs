//! Expression evaluation
//!
//! The central `evaluate` dispatcher plus the node semantics that don't
//! warrant their own module: variable references and declarations, function
//! calls, and the clone capability used to materialise per-instance copies
//! of struct members.

use std::rc::Rc;

use crate::interpreter::errors::Fault;
use crate::interpreter::jumps::{EvalResult, Signal};
use crate::memory::scope::{Scope, ScopeRef};
use crate::parser::ast::{Expr, ExprRef};

impl Expr {
    /// Evaluate the node against `scope`.
    pub fn evaluate(&self, scope: &ScopeRef) -> EvalResult {
        match self {
            Expr::Undefined => Err(Fault::UndefinedEvaluation.into()),

            Expr::Literal(value) => Ok(Some(value.clone())),

            Expr::Variable(name) => self.eval_variable(name, scope),

            Expr::VarDecl { name, init } => self.eval_var_decl(name, init, scope),

            Expr::Statements(list) => list.evaluate(scope),

            // (Re-)install the body under the function's name; calls look it
            // up by name, so redefinition takes effect immediately.
            Expr::FunctionDecl { name, body } => {
                let binding = Rc::new(Expr::Statements(body.clone()));
                scope.borrow_mut().declare(name, binding);
                Ok(None)
            }

            Expr::StructDecl(decl) => {
                let binding = Rc::new(Expr::StructDecl(decl.clone()));
                scope.borrow_mut().declare(&decl.name, binding);
                Ok(None)
            }

            Expr::Constructor {
                name,
                args,
                globals,
            } => self.eval_constructor(name, args, globals, scope),

            Expr::Call { name, args } => self.eval_call(name, args, scope),

            Expr::If {
                condition,
                then_branch,
                else_branch,
            } => self.eval_if(condition, then_branch, else_branch.as_ref(), scope),

            Expr::While { condition, body } => self.eval_while(condition, body, scope),

            Expr::For {
                init,
                condition,
                step,
                body,
            } => self.eval_for(init.as_ref(), condition.as_ref(), step.as_ref(), body, scope),

            Expr::Return(value) => {
                let result = match value {
                    Some(expr) => expr.evaluate(scope)?,
                    None => None,
                };
                Err(Signal::Return(result))
            }
            Expr::Break => Err(Signal::Break),
            Expr::Continue => Err(Signal::Continue),

            Expr::Index {
                base,
                index,
                memory,
            } => self.eval_index(base, index, memory, scope),

            Expr::Unary {
                op,
                operand,
                operation_first,
                memory,
            } => self.eval_unary(*op, operand, *operation_first, memory, scope),

            Expr::Binary { op, left, right } => self.eval_binary(*op, left, right, scope),
        }
    }

    /// Materialise a per-instance copy of the node. Only the node kinds that
    /// appear as struct members (and their initialisers) support this.
    pub fn clone_in(&self, scope: &ScopeRef) -> Result<ExprRef, Signal> {
        match self {
            Expr::Literal(value) => {
                let copy = value.borrow().clone();
                Ok(Rc::new(Expr::Literal(copy.cell())))
            }

            // A cloned field declaration becomes a literal holding the
            // freshly evaluated initialiser: value fields are per-instance.
            Expr::VarDecl { init, .. } => {
                let evaluated = init.clone_in(scope)?.evaluate(scope)?;
                Ok(match evaluated {
                    Some(value) => Rc::new(Expr::Literal(value)),
                    None => Rc::new(Expr::Undefined),
                })
            }

            // Methods share their statements; only the invocation scratch
            // state is fresh.
            Expr::FunctionDecl { body, .. } => {
                Ok(Rc::new(Expr::Statements(Rc::new(body.instance_copy()))))
            }
            Expr::Statements(list) => {
                Ok(Rc::new(Expr::Statements(Rc::new(list.instance_copy()))))
            }

            _ => Err(Fault::NotCloneable.into()),
        }
    }

    /// Look the name up along the scope chain and evaluate the found
    /// binding against the original scope.
    fn eval_variable(&self, name: &str, scope: &ScopeRef) -> EvalResult {
        let binding = scope.borrow().get(name);
        match binding {
            Some(expr) => expr.evaluate(scope),
            None => Err(Fault::Name {
                name: name.to_string(),
            }
            .into()),
        }
    }

    /// Evaluate the initialiser through a clone (mutating the new binding
    /// must not affect the initialiser tree), wrap the result in a literal,
    /// and declare it — unless the name is already bound in this layer.
    /// The returned cell *is* the declared binding's storage, which is what
    /// makes `var x = 5` (a declaration followed by `=`) work.
    fn eval_var_decl(&self, name: &str, init: &ExprRef, scope: &ScopeRef) -> EvalResult {
        let evaluated = init.clone_in(scope)?.evaluate(scope)?;

        if !scope.borrow().contains_local(name) {
            let binding: ExprRef = match &evaluated {
                Some(value) => Rc::new(Expr::Literal(value.clone())),
                None => Rc::new(Expr::Undefined),
            };
            scope.borrow_mut().declare(name, binding);
        }

        Ok(evaluated)
    }

    /// Call the function bound to `name`. Arguments are pre-evaluated into
    /// fresh literals, freezing by-value semantics for every variant except
    /// `Opaque` (which aliases through its shared handle); the body then
    /// runs in a prepared child scope and a `Return` signal becomes the
    /// call's result.
    fn eval_call(&self, name: &str, args: &[ExprRef], scope: &ScopeRef) -> EvalResult {
        let local_scope = Scope::child_of(scope);

        let binding = local_scope.borrow().get(name);
        let Some(binding) = binding else {
            return Err(Fault::Name {
                name: name.to_string(),
            }
            .into());
        };
        let Expr::Statements(body) = &*binding else {
            return Err(Fault::Type {
                message: format!("'{}' is not a function", name),
            }
            .into());
        };

        let mut frozen: Vec<ExprRef> = Vec::with_capacity(args.len());
        for arg in args {
            frozen.push(match arg.evaluate(&local_scope)? {
                Some(value) => {
                    let copy = value.borrow().clone();
                    Rc::new(Expr::Literal(copy.cell()))
                }
                None => Rc::new(Expr::Undefined),
            });
        }

        body.passed_args.replace(frozen);
        body.no_local_scope.set(true);

        match body.evaluate(&local_scope) {
            Err(Signal::Return(value)) => Ok(value),
            other => other,
        }
    }
}
