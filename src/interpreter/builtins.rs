//! Built-in bindings
//!
//! The global scope is populated in two steps, mirroring the parse/eval
//! split: [`declare_builtins`] installs placeholder slots *before* parsing
//! (so the parser can refuse user symbols that collide with them, and can
//! classify `array(...)` as a constructor call), then [`define_builtins`]
//! replaces the placeholders with their native bodies before evaluation.
//!
//! # Built-in functions
//!
//! | Name | Effect |
//! |---|---|
//! | `print(...)` | stringify each argument; `Size` prints as a NUL-terminated string |
//! | `println(...)` | as `print`, then a newline |
//! | `input()` | read a line from stdin, returns its address |
//! | `alloc(n)` | allocate `n` zeroed cells, returns the base address |
//! | `realloc(p, old, new)` | resize, zero-filling beyond `old` |
//! | `free(p)` | release the allocation |
//! | `assert(b)` | fault when `b` is false |
//!
//! The `array` record is also installed here: a struct whose `data` field
//! initialiser produces a fresh backing vector, so every instance gets its
//! own storage through the usual field-cloning path.

use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::rc::Rc;

use crate::interpreter::errors::Fault;
use crate::interpreter::jumps::{EvalResult, Signal};
use crate::memory::heap::{MemoryRef, CELL_SIZE};
use crate::memory::scope::ScopeRef;
use crate::memory::value::{Opaque, Value, ValueRef};
use crate::parser::ast::{Expr, NativeFn, StatementList, StructDecl};

/// Builtin output sink. Tests capture it; the CLI writes through to stdout.
pub enum Console {
    Stdout,
    Capture(String),
}

pub type ConsoleRef = Rc<RefCell<Console>>;

impl Console {
    pub fn stdout() -> ConsoleRef {
        Rc::new(RefCell::new(Console::Stdout))
    }

    pub fn capture() -> ConsoleRef {
        Rc::new(RefCell::new(Console::Capture(String::new())))
    }

    pub fn write(&mut self, text: &str) {
        match self {
            Console::Stdout => {
                print!("{}", text);
                let _ = std::io::stdout().flush();
            }
            Console::Capture(buffer) => buffer.push_str(text),
        }
    }

    /// Captured output so far; empty in stdout mode.
    pub fn contents(&self) -> String {
        match self {
            Console::Stdout => String::new(),
            Console::Capture(buffer) => buffer.clone(),
        }
    }
}

/// Names reserved for builtin functions.
const BUILTIN_FUNCTIONS: [&str; 7] = [
    "print", "println", "input", "alloc", "realloc", "free", "assert",
];

/// Install placeholder slots for every builtin. Runs before parsing.
pub fn declare_builtins(globals: &ScopeRef) {
    let mut scope = globals.borrow_mut();
    for name in BUILTIN_FUNCTIONS {
        scope.declare(name, Rc::new(Expr::Undefined));
    }
    scope.declare(
        "array",
        Rc::new(Expr::StructDecl(Rc::new(StructDecl::new("array")))),
    );
}

fn native(body: NativeFn) -> Rc<Expr> {
    Rc::new(Expr::Statements(Rc::new(StatementList::native(body))))
}

fn nth_arg(args: &[ValueRef], index: usize, required: usize) -> Result<ValueRef, Fault> {
    args.get(index).cloned().ok_or(Fault::Arity {
        expected: required,
        got: args.len(),
    })
}

fn int_arg(args: &[ValueRef], index: usize, required: usize, what: &str) -> Result<i32, Fault> {
    let cell = nth_arg(args, index, required)?;
    let value = cell.borrow().clone();
    match value {
        Value::Int(n) => Ok(n),
        other => Err(Fault::Type {
            message: format!("{} expects an integer, got {:?}", what, other),
        }),
    }
}

fn size_arg(args: &[ValueRef], index: usize, required: usize, what: &str) -> Result<u64, Fault> {
    let cell = nth_arg(args, index, required)?;
    let value = cell.borrow().clone();
    match value {
        Value::Size(address) => Ok(address),
        other => Err(Fault::Type {
            message: format!("{} expects a pointer, got {:?}", what, other),
        }),
    }
}

/// Stringify one argument the way `print`/`println` do: a `Size` walks the
/// cells at its address and prints `Char` cells until a NUL (or anything
/// that is not a char); `Opaque` is not printable.
fn format_value(out: &mut String, value: &Value, memory: &MemoryRef) -> Result<(), Fault> {
    match value {
        Value::Size(address) => {
            let mut position = *address;
            loop {
                let cell = memory.borrow().cell(position)?;
                let current = cell.borrow().clone();
                match current {
                    Value::Char(c) if c != '\0' => out.push(c),
                    _ => break,
                }
                position += CELL_SIZE;
            }
        }
        Value::Opaque(_) => out.push_str("Non printable"),
        other => out.push_str(&other.to_string()),
    }
    Ok(())
}

/// Resolve the `data` backing vector of the `array` instance the current
/// method call runs against, through the `this` binding.
fn array_data(scope: &ScopeRef) -> Result<Rc<RefCell<Vec<ValueRef>>>, Signal> {
    let this = scope.borrow().get("this").ok_or(Fault::Name {
        name: "this".to_string(),
    })?;
    let value = this.evaluate(scope)?;
    let instance = value
        .and_then(|cell| match &*cell.borrow() {
            Value::Opaque(handle) => handle.instance(),
            _ => None,
        })
        .ok_or(Fault::Type {
            message: "'this' is not a struct instance".to_string(),
        })?;

    let binding = instance.scope.borrow().get("data").ok_or(Fault::Name {
        name: "data".to_string(),
    })?;
    let data = binding.evaluate(&instance.scope)?;
    match data {
        Some(cell) => {
            let value = cell.borrow();
            match &*value {
                Value::Opaque(Opaque::Array(backing)) => Ok(backing.clone()),
                other => Err(Fault::Type {
                    message: format!("'data' is not an array backing, got {:?}", other),
                }
                .into()),
            }
        }
        None => Err(Fault::UndefinedEvaluation.into()),
    }
}

/// Replace the placeholder slots with the native implementations. Runs
/// after parsing, before the program is evaluated.
pub fn define_builtins(globals: &ScopeRef, memory: &MemoryRef, console: &ConsoleRef) {
    let print = {
        let memory = memory.clone();
        let console = console.clone();
        move |args: &[ValueRef], _: &ScopeRef| -> EvalResult {
            let mut out = String::new();
            for arg in args {
                format_value(&mut out, &arg.borrow(), &memory)?;
            }
            console.borrow_mut().write(&out);
            Ok(None)
        }
    };

    let println = {
        let memory = memory.clone();
        let console = console.clone();
        move |args: &[ValueRef], _: &ScopeRef| -> EvalResult {
            let mut out = String::new();
            for arg in args {
                format_value(&mut out, &arg.borrow(), &memory)?;
            }
            out.push('\n');
            console.borrow_mut().write(&out);
            Ok(None)
        }
    };

    let input = {
        let memory = memory.clone();
        move |_: &[ValueRef], _: &ScopeRef| -> EvalResult {
            let mut line = String::new();
            let _ = std::io::stdin().lock().read_line(&mut line);
            let trimmed = line.trim_end_matches(['\n', '\r']);
            let address = memory.borrow_mut().intern_string(trimmed);
            Ok(Some(Value::Size(address).cell()))
        }
    };

    let alloc = {
        let memory = memory.clone();
        move |args: &[ValueRef], _: &ScopeRef| -> EvalResult {
            let count = int_arg(args, 0, 1, "alloc")?;
            if count <= 0 {
                return Err(Fault::Alloc {
                    message: format!("invalid allocation size {}", count),
                }
                .into());
            }
            let address = memory.borrow_mut().alloc(count as usize)?;
            Ok(Some(Value::Size(address).cell()))
        }
    };

    let realloc = {
        let memory = memory.clone();
        move |args: &[ValueRef], _: &ScopeRef| -> EvalResult {
            let address = size_arg(args, 0, 3, "realloc")?;
            let old_count = int_arg(args, 1, 3, "realloc")?;
            let new_count = int_arg(args, 2, 3, "realloc")?;
            if new_count <= 0 {
                return Err(Fault::Alloc {
                    message: format!("invalid reallocation size {}", new_count),
                }
                .into());
            }
            let resized = memory.borrow_mut().realloc(
                address,
                old_count.max(0) as usize,
                new_count as usize,
            )?;
            Ok(Some(Value::Size(resized).cell()))
        }
    };

    let free = {
        let memory = memory.clone();
        move |args: &[ValueRef], _: &ScopeRef| -> EvalResult {
            let address = size_arg(args, 0, 1, "free")?;
            memory.borrow_mut().free(address)?;
            Ok(None)
        }
    };

    let assert = |args: &[ValueRef], _: &ScopeRef| -> EvalResult {
        let cell = nth_arg(args, 0, 1)?;
        let value = cell.borrow().clone();
        match value {
            Value::Bool(true) => Ok(None),
            Value::Bool(false) => Err(Fault::AssertionFailed.into()),
            other => Err(Fault::Type {
                message: format!("assert expects a bool, got {:?}", other),
            }
            .into()),
        }
    };

    let mut scope = globals.borrow_mut();
    scope.declare("print", native(Rc::new(print)));
    scope.declare("println", native(Rc::new(println)));
    scope.declare("input", native(Rc::new(input)));
    scope.declare("alloc", native(Rc::new(alloc)));
    scope.declare("realloc", native(Rc::new(realloc)));
    scope.declare("free", native(Rc::new(free)));
    scope.declare("assert", native(Rc::new(assert)));
    scope.declare("array", array_struct());
}

/// The builtin `array` record: a `data` field whose initialiser yields a
/// fresh backing vector, plus `at`/`add`/`size` methods.
fn array_struct() -> Rc<Expr> {
    let decl = StructDecl::new("array");

    let fresh_backing = |_: &[ValueRef], _: &ScopeRef| -> EvalResult {
        Ok(Some(
            Value::Opaque(Opaque::Array(Rc::new(RefCell::new(Vec::new())))).cell(),
        ))
    };
    let data = Rc::new(Expr::VarDecl {
        name: "data".to_string(),
        init: native(Rc::new(fresh_backing)),
    });

    let at = |args: &[ValueRef], scope: &ScopeRef| -> EvalResult {
        let backing = array_data(scope)?;
        let index = int_arg(args, 0, 1, "at")?;
        let cells = backing.borrow();
        let cell = usize::try_from(index)
            .ok()
            .and_then(|i| cells.get(i))
            .ok_or(Fault::Type {
                message: format!("array index {} out of bounds (size {})", index, cells.len()),
            })?;
        Ok(Some(cell.clone()))
    };

    let add = |args: &[ValueRef], scope: &ScopeRef| -> EvalResult {
        if args.is_empty() {
            return Err(Fault::Arity {
                expected: 1,
                got: 0,
            }
            .into());
        }
        let backing = array_data(scope)?;
        for arg in args {
            let copy = arg.borrow().clone();
            backing.borrow_mut().push(copy.cell());
        }
        Ok(None)
    };

    let size = |_: &[ValueRef], scope: &ScopeRef| -> EvalResult {
        let backing = array_data(scope)?;
        let count = backing.borrow().len() as i32;
        Ok(Some(Value::Int(count).cell()))
    };

    let method = |name: &str, body: NativeFn| -> (String, Rc<Expr>) {
        let body = Rc::new(StatementList::native(body));
        (
            name.to_string(),
            Rc::new(Expr::FunctionDecl {
                name: name.to_string(),
                body,
            }),
        )
    };

    {
        let mut content = decl.content.borrow_mut();
        content.insert("data".to_string(), data);
        for (name, member) in [
            method("at", Rc::new(at)),
            method("add", Rc::new(add)),
            method("size", Rc::new(size)),
        ] {
            content.insert(name, member);
        }
    }

    Rc::new(Expr::StructDecl(Rc::new(decl)))
}
