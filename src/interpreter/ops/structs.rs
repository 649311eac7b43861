//! Struct construction, member access, and destruction
//!
//! A [`StructInstance`] is a record name plus a dedicated scope parented to
//! the *global* scope — not the constructing scope, which isolates instance
//! fields from accidental capture. The instance itself travels inside
//! `Value::Opaque`; the `.` operator unwraps it and evaluates its right
//! side in an overlay of the instance's members on the caller's scope.
//!
//! `this` is bound inside the instance scope as a weak handle: instance →
//! scope → `this` → instance would otherwise be a strong cycle that no
//! destructor could ever break.

use std::rc::Rc;

use tracing::warn;

use crate::interpreter::errors::Fault;
use crate::interpreter::jumps::{EvalResult, Signal};
use crate::memory::scope::{Scope, ScopeRef};
use crate::memory::value::{Opaque, Value};
use crate::parser::ast::{Expr, ExprRef};

/// A live struct instance: the declared name and the scope holding its
/// fields, methods, and `this`.
pub struct StructInstance {
    pub name: String,
    pub scope: ScopeRef,
}

impl Drop for StructInstance {
    /// When the last strong reference drops, a member named `_<StructName>`
    /// is invoked as a no-argument destructor. A fault cannot unwind out of
    /// drop, so it is logged and swallowed.
    fn drop(&mut self) {
        let destructor = format!("_{}", self.name);
        let binding = self.scope.borrow().get(&destructor);
        if let Some(body) = binding {
            if let Err(signal) = body.evaluate(&self.scope) {
                warn!(
                    instance = %self.name,
                    "destructor failed: {}",
                    signal.into_fault()
                );
            }
        }
    }
}

impl Expr {
    /// Construct an instance of the struct bound to `name`.
    ///
    /// Field initialisers are cloned into a fresh scope (methods stay
    /// shared, value fields become per-instance), then either a method
    /// named like the struct runs as the constructor, or the caller
    /// arguments are assigned positionally to the ordered value fields.
    pub(crate) fn eval_constructor(
        &self,
        name: &str,
        args: &[ExprRef],
        globals: &ScopeRef,
        scope: &ScopeRef,
    ) -> EvalResult {
        let binding = scope.borrow().get(name);
        let Some(binding) = binding else {
            return Err(Fault::Name {
                name: name.to_string(),
            }
            .into());
        };
        let Expr::StructDecl(decl) = &*binding else {
            return Err(Fault::Type {
                message: format!("Symbol '{}' is not a struct", name),
            }
            .into());
        };

        let instance_scope = Scope::child_of(globals);
        let members: Vec<(String, ExprRef)> = decl
            .content
            .borrow()
            .iter()
            .map(|(member, expr)| (member.clone(), expr.clone()))
            .collect();
        for (member, expr) in &members {
            let copy = expr.clone_in(&instance_scope)?;
            instance_scope.borrow_mut().declare(member, copy);
        }

        let instance = Rc::new(StructInstance {
            name: name.to_string(),
            scope: instance_scope.clone(),
        });
        let this = Value::Opaque(Opaque::InstanceRef(Rc::downgrade(&instance)));
        instance_scope
            .borrow_mut()
            .declare("this", Rc::new(Expr::Literal(this.cell())));

        // Caller arguments freeze to by-value literals in the caller scope,
        // exactly like a function call.
        let mut frozen: Vec<ExprRef> = Vec::with_capacity(args.len());
        for arg in args {
            frozen.push(match arg.evaluate(scope)? {
                Some(value) => {
                    let copy = value.borrow().clone();
                    Rc::new(Expr::Literal(copy.cell()))
                }
                None => Rc::new(Expr::Undefined),
            });
        }

        let constructor = decl.content.borrow().get(name).cloned();
        if let Some(constructor) = constructor {
            let Expr::FunctionDecl { body, .. } = &*constructor else {
                return Err(Fault::Type {
                    message: format!("Constructor of '{}' is not a function", name),
                }
                .into());
            };
            body.passed_args.replace(frozen);
            match body.evaluate(&instance_scope) {
                Ok(_) | Err(Signal::Return(_)) => {}
                Err(other) => return Err(other),
            }
        } else {
            let order = decl.order.borrow();
            for (field, value) in order.iter().zip(frozen) {
                instance_scope.borrow_mut().declare(field, value);
            }
        }

        Ok(Some(Value::Opaque(Opaque::Instance(instance)).cell()))
    }

    /// The `.` operator: evaluate the left side to a struct instance, then
    /// evaluate the right side in a transient scope whose locals are the
    /// instance's members and whose parent is the caller's scope.
    pub(crate) fn eval_dot(&self, left: &ExprRef, right: &ExprRef, scope: &ScopeRef) -> EvalResult {
        let target = left.evaluate(scope)?;
        let Some(cell) = target else {
            return Err(Fault::Type {
                message: "Dot operator applied to an expression with no value".to_string(),
            }
            .into());
        };

        let instance = match &*cell.borrow() {
            Value::Opaque(handle) => handle.instance(),
            _ => None,
        };
        let Some(instance) = instance else {
            return Err(Fault::Type {
                message: "Dot operator can only be used on structs".to_string(),
            }
            .into());
        };

        let members = instance.scope.borrow().clone_symbols();
        let combined = Scope::overlay(scope, members);
        right.evaluate(&combined)
    }
}
