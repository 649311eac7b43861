//! Execution engine
//!
//! The [`Interpreter`] owns the process-wide pieces every run shares: the
//! global scope, the memory arena, and the console sink. A run drives the
//! whole pipeline — declare builtin slots, lex, parse (which registers
//! structs into the live global scope), define the builtin bodies, evaluate
//! the root statement list in a fresh program scope, then look up `main`
//! and evaluate it. A `Return` signal escaping `main` carries the program
//! result; one escaping the root list is a fault.

use std::path::Path;

use tracing::debug;

use crate::interpreter::builtins::{self, Console, ConsoleRef};
use crate::interpreter::errors::Fault;
use crate::interpreter::jumps::Signal;
use crate::memory::heap::{Memory, MemoryRef};
use crate::memory::scope::{Scope, ScopeRef};
use crate::memory::value::Value;
use crate::parser::lexer::Lexer;
use crate::parser::parser::Parser;

/// The interpreter façade: global scope, arena, and output sink.
pub struct Interpreter {
    globals: ScopeRef,
    memory: MemoryRef,
    console: ConsoleRef,
}

impl Interpreter {
    /// An interpreter whose builtins write to stdout.
    pub fn new() -> Interpreter {
        Interpreter {
            globals: Scope::root(),
            memory: Memory::shared(),
            console: Console::stdout(),
        }
    }

    /// An interpreter whose builtin output is captured for inspection;
    /// used by tests.
    pub fn with_captured_output() -> Interpreter {
        Interpreter {
            globals: Scope::root(),
            memory: Memory::shared(),
            console: Console::capture(),
        }
    }

    /// Everything `print`/`println` wrote so far (capture mode only).
    pub fn output(&self) -> String {
        self.console.borrow().contents()
    }

    /// Run the program in the file at `path`. Imports resolve relative to
    /// the file's directory.
    pub fn run_file(&self, path: impl AsRef<Path>) -> Result<Option<Value>, Fault> {
        let lexer = Lexer::from_file(path.as_ref())?;
        self.run(lexer)
    }

    /// Run an in-memory source string. Imports resolve relative to the
    /// current directory.
    pub fn run_source(&self, source: &str) -> Result<Option<Value>, Fault> {
        let lexer = Lexer::from_source(source)?;
        self.run(lexer)
    }

    fn run(&self, lexer: Lexer) -> Result<Option<Value>, Fault> {
        builtins::declare_builtins(&self.globals);

        let mut parser = Parser::new(lexer, self.globals.clone(), self.memory.clone())?;
        let root = parser.root();

        builtins::define_builtins(&self.globals, &self.memory, &self.console);

        let program_scope = Scope::child_of(&self.globals);
        let _ = root.evaluate(&program_scope).map_err(Signal::into_fault)?;

        let main = program_scope.borrow().get("main").ok_or(Fault::Name {
            name: "main".to_string(),
        })?;
        debug!("evaluating main");

        let result = match main.evaluate(&program_scope) {
            Ok(value) => value,
            Err(Signal::Return(value)) => value,
            Err(other) => return Err(other.into_fault()),
        };

        Ok(result.map(|cell| cell.borrow().clone()))
    }
}

impl Default for Interpreter {
    fn default() -> Interpreter {
        Interpreter::new()
    }
}
