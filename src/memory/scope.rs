//! Lexical scopes
//!
//! A [`Scope`] is one name→expression binding layer chained to a parent for
//! lookup. The chain is rooted at the interpreter's global scope, which holds
//! builtins and parse-time struct declarations; block scopes hang off it
//! during evaluation.
//!
//! Scopes are shared: a scope can be referenced by live closures, by struct
//! instances, and by the evaluation stack at the same time, so they live
//! behind `Rc<RefCell<_>>`. The parent link is a `Weak` reference — struct
//! instances parent their scope to the global scope and bind `this` weakly,
//! which would otherwise form a cycle.

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::parser::ast::ExprRef;

/// Shared handle to a scope.
pub type ScopeRef = Rc<RefCell<Scope>>;

/// A single binding layer with a non-owning parent link.
pub struct Scope {
    parent: Option<Weak<RefCell<Scope>>>,
    symbols: FxHashMap<String, ExprRef>,
}

impl Scope {
    /// Create a root scope with no parent.
    pub fn root() -> ScopeRef {
        Rc::new(RefCell::new(Scope {
            parent: None,
            symbols: FxHashMap::default(),
        }))
    }

    /// Create a child scope chained to `parent`.
    pub fn child_of(parent: &ScopeRef) -> ScopeRef {
        Rc::new(RefCell::new(Scope {
            parent: Some(Rc::downgrade(parent)),
            symbols: FxHashMap::default(),
        }))
    }

    /// Create a scope whose local bindings are `symbols` and whose parent is
    /// `parent`. Used by the dot operator to overlay a struct instance's
    /// members onto the caller's scope.
    pub fn overlay(parent: &ScopeRef, symbols: FxHashMap<String, ExprRef>) -> ScopeRef {
        Rc::new(RefCell::new(Scope {
            parent: Some(Rc::downgrade(parent)),
            symbols,
        }))
    }

    /// Bind `name` in this layer, replacing any existing local binding.
    pub fn declare(&mut self, name: &str, value: ExprRef) {
        self.symbols.insert(name.to_string(), value);
    }

    /// Look up `name`, walking to the nearest ancestor holding it.
    pub fn get(&self, name: &str) -> Option<ExprRef> {
        if let Some(expr) = self.symbols.get(name) {
            return Some(expr.clone());
        }
        self.parent.as_ref()?.upgrade()?.borrow().get(name)
    }

    /// Whether `name` resolves anywhere along the chain.
    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
            || self
                .parent
                .as_ref()
                .and_then(Weak::upgrade)
                .is_some_and(|parent| parent.borrow().contains(name))
    }

    /// Whether `name` is bound in this layer, ignoring ancestors.
    pub fn contains_local(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Shallow copy of the local bindings.
    pub fn clone_symbols(&self) -> FxHashMap<String, ExprRef> {
        self.symbols.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::value::Value;
    use crate::parser::ast::Expr;

    #[test]
    fn test_lookup_walks_to_parent() {
        let root = Scope::root();
        root.borrow_mut().declare("x", Expr::literal(Value::Int(1)));

        let child = Scope::child_of(&root);
        assert!(child.borrow().contains("x"));
        assert!(!child.borrow().contains_local("x"));
        assert!(child.borrow().get("x").is_some());
        assert!(child.borrow().get("y").is_none());
    }

    #[test]
    fn test_declare_shadows_parent() {
        let root = Scope::root();
        root.borrow_mut().declare("x", Expr::literal(Value::Int(1)));

        let child = Scope::child_of(&root);
        child.borrow_mut().declare("x", Expr::literal(Value::Int(2)));

        let binding = child.borrow().get("x").unwrap();
        let scope = Scope::root();
        let value = binding.evaluate(&scope).unwrap().unwrap();
        assert_eq!(*value.borrow(), Value::Int(2));
    }

    #[test]
    fn test_orphaned_chain_degrades() {
        // A dropped parent makes ancestor lookups miss instead of dangling.
        let child = {
            let root = Scope::root();
            root.borrow_mut().declare("x", Expr::literal(Value::Int(1)));
            Scope::child_of(&root)
        };
        assert!(!child.borrow().contains("x"));
        assert!(child.borrow().get("x").is_none());
    }
}
