//! Fatal error types
//!
//! This module defines [`Fault`], covering everything that aborts a run:
//! lexing and parsing failures, unresolved names, operator misuse, builtin
//! misuse, and invalid arena accesses. There is no `try`/`catch` at the
//! language level, so every fault unwinds the whole driver.
//!
//! Control-flow signals (`return`/`break`/`continue`) are *not* faults;
//! they live in [`crate::interpreter::jumps`] and only turn into
//! [`Fault::ControlFlow`] when they escape to the top level uncaught.

use std::fmt;
use std::path::PathBuf;

use crate::memory::heap::Address;
use crate::parser::ast::SourceLocation;

/// Fatal errors raised while lexing, parsing, or evaluating
#[derive(Debug, Clone)]
pub enum Fault {
    /// A source file or import could not be opened
    Io { path: PathBuf, dir: PathBuf },

    /// Unexpected token, malformed literal, or duplicate top-level symbol
    Parse {
        message: String,
        location: SourceLocation,
    },

    /// Unresolved identifier at evaluation
    Name { name: String },

    /// Operator applied to incompatible operand kinds
    Type { message: String },

    /// Function or builtin invoked with fewer arguments than required
    Arity { expected: usize, got: usize },

    /// `assert(false)`
    AssertionFailed,

    /// Invalid allocation request
    Alloc { message: String },

    /// Integral division or remainder by zero
    DivisionByZero,

    /// Access through a freed, unknown, or misaligned address
    InvalidPointer { address: Address, message: String },

    /// Evaluation of a placeholder node (a builtin slot not yet installed)
    UndefinedEvaluation,

    /// Per-instance copy requested of a node that does not support it
    NotCloneable,

    /// A return/break/continue signal escaped to the top level
    ControlFlow { signal: &'static str },
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::Io { path, dir } => {
                write!(
                    f,
                    "Failed to open file {}. Current path: {}",
                    path.display(),
                    dir.display()
                )
            }
            Fault::Parse { message, location } => {
                write!(
                    f,
                    "Parse error at line {}, column {}: {}",
                    location.line, location.column, message
                )
            }
            Fault::Name { name } => {
                write!(f, "Symbol '{}' not found", name)
            }
            Fault::Type { message } => {
                write!(f, "Type error: {}", message)
            }
            Fault::Arity { expected, got } => {
                write!(
                    f,
                    "Not enough arguments: expected {}, got {}",
                    expected, got
                )
            }
            Fault::AssertionFailed => {
                write!(f, "Assertion failed")
            }
            Fault::Alloc { message } => {
                write!(f, "Allocation failed: {}", message)
            }
            Fault::DivisionByZero => {
                write!(f, "Division by zero")
            }
            Fault::InvalidPointer { address, message } => {
                write!(f, "Invalid pointer 0x{:x}: {}", address, message)
            }
            Fault::UndefinedEvaluation => {
                write!(f, "Evaluation of an undefined expression")
            }
            Fault::NotCloneable => {
                write!(f, "Expression is not cloneable")
            }
            Fault::ControlFlow { signal } => {
                write!(f, "'{}' outside of any function or loop", signal)
            }
        }
    }
}

impl std::error::Error for Fault {}
