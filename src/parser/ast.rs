//! AST node definitions
//!
//! Every node is an [`Expr`]; statements and expressions share one tree.
//! Nodes are immutable in structure after parse and shared through
//! [`ExprRef`] — a function body appears in every scope that binds its name,
//! and recursion re-enters the same nodes. The two pieces of per-invocation
//! scratch state ([`StatementList::passed_args`], the `no_local_scope` flag)
//! live behind interior mutability.
//!
//! Evaluation and cloning live in the `interpreter` module as `impl Expr`
//! blocks; this module only defines the shapes.

use rustc_hash::FxHashMap;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::interpreter::jumps::EvalResult;
use crate::memory::heap::MemoryRef;
use crate::memory::scope::ScopeRef;
use crate::memory::value::{Value, ValueRef};
use crate::parser::lexer::TokenKind;

/// A line/column position in some source file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> SourceLocation {
        SourceLocation { line, column }
    }
}

/// Shared handle to an expression node.
pub type ExprRef = Rc<Expr>;

/// A native (builtin) function body: receives the evaluated arguments and
/// the scope the call runs in.
pub type NativeFn = Rc<dyn Fn(&[ValueRef], &ScopeRef) -> EvalResult>;

/// Evaluable tree node.
pub enum Expr {
    /// Placeholder for builtin slots that are declared before they are
    /// defined; evaluating one is a fault.
    Undefined,
    /// A literal holding shared value storage. Bindings are literals too,
    /// which is what makes assignment-through-lookup work.
    Literal(ValueRef),
    /// Reference to a name resolved against the evaluation scope.
    Variable(String),
    /// `var NAME`, with the implicit initialiser `0`.
    VarDecl { name: String, init: ExprRef },
    /// A block, function body, or native builtin.
    Statements(Rc<StatementList>),
    /// `fun NAME(...) body`; installs the body under the name on evaluation.
    FunctionDecl { name: String, body: Rc<StatementList> },
    /// `struct NAME { ... }`; also registered at parse time.
    StructDecl(Rc<StructDecl>),
    /// `Name(args)` where `Name` is a struct in the global scope.
    Constructor {
        name: String,
        args: Vec<ExprRef>,
        globals: ScopeRef,
    },
    /// `name(args)` for anything that is not a struct.
    Call { name: String, args: Vec<ExprRef> },
    If {
        condition: ExprRef,
        then_branch: ExprRef,
        else_branch: Option<ExprRef>,
    },
    While {
        condition: ExprRef,
        body: ExprRef,
    },
    For {
        init: Option<ExprRef>,
        condition: Option<ExprRef>,
        step: Option<ExprRef>,
        body: ExprRef,
    },
    Return(Option<ExprRef>),
    Break,
    Continue,
    /// `base[index]`, pointer-only.
    Index {
        base: ExprRef,
        index: ExprRef,
        memory: MemoryRef,
    },
    /// Prefix or postfix unary operator. `operation_first` distinguishes
    /// `++x` from `x++`.
    Unary {
        op: TokenKind,
        operand: ExprRef,
        operation_first: bool,
        memory: MemoryRef,
    },
    Binary {
        op: TokenKind,
        left: ExprRef,
        right: ExprRef,
    },
}

impl Expr {
    /// Fresh literal node around a value.
    pub fn literal(value: Value) -> ExprRef {
        Rc::new(Expr::Literal(value.cell()))
    }
}

/// A block of statements, also used as function bodies (user and native).
///
/// `params` holds the declared arguments as `VarDecl` nodes; `passed_args`
/// is filled by the caller right before evaluation and consumed at body
/// entry. `no_local_scope` makes the list run in the caller's scope instead
/// of opening its own layer — set for the program root, `for` bodies, and
/// invoked function bodies (whose argument bindings must land in the scope
/// the call prepared).
pub struct StatementList {
    pub statements: Vec<ExprRef>,
    pub params: Vec<ExprRef>,
    pub passed_args: RefCell<Vec<ExprRef>>,
    pub no_local_scope: Cell<bool>,
    pub native: Option<NativeFn>,
}

impl StatementList {
    /// A plain block.
    pub fn new(statements: Vec<ExprRef>) -> StatementList {
        StatementList {
            statements,
            params: Vec::new(),
            passed_args: RefCell::new(Vec::new()),
            no_local_scope: Cell::new(false),
            native: None,
        }
    }

    /// A user function body with declared parameters.
    pub fn function(statements: Vec<ExprRef>, params: Vec<ExprRef>) -> StatementList {
        StatementList {
            statements,
            params,
            passed_args: RefCell::new(Vec::new()),
            no_local_scope: Cell::new(false),
            native: None,
        }
    }

    /// A builtin body.
    pub fn native(body: NativeFn) -> StatementList {
        StatementList {
            statements: Vec::new(),
            params: Vec::new(),
            passed_args: RefCell::new(Vec::new()),
            no_local_scope: Cell::new(false),
            native: Some(body),
        }
    }

    /// Per-instance copy used when struct members are cloned into a new
    /// instance scope: the statements stay shared, the scratch state is
    /// fresh.
    pub fn instance_copy(&self) -> StatementList {
        StatementList {
            statements: self.statements.clone(),
            params: self.params.clone(),
            passed_args: RefCell::new(Vec::new()),
            no_local_scope: Cell::new(false),
            native: self.native.clone(),
        }
    }
}

/// A struct declaration: ordered value fields plus a name→member map that
/// also holds methods. Registered into the global scope as soon as the
/// parser sees the name, then populated while the body is parsed.
pub struct StructDecl {
    pub name: String,
    pub content: RefCell<FxHashMap<String, ExprRef>>,
    pub order: RefCell<Vec<String>>,
}

impl StructDecl {
    pub fn new(name: &str) -> StructDecl {
        StructDecl {
            name: name.to_string(),
            content: RefCell::new(FxHashMap::default()),
            order: RefCell::new(Vec::new()),
        }
    }
}
