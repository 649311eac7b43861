//! # Introduction
//!
//! Brook is a tree-walking interpreter for a small imperative, dynamically
//! typed scripting language with first-class functions, user-defined
//! records, and pointer arithmetic into an interpreter-managed arena.
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Lexer (+ import splicing) → Parser → AST → Evaluator
//! ```
//!
//! 1. [`parser`] — tokenises the source (inlining `import`ed files) and
//!    builds the evaluable tree. Struct declarations register into the live
//!    global scope while parsing, which is how constructor calls are told
//!    apart from function calls.
//! 2. [`interpreter`] — walks the tree against a chain of scopes; control
//!    flow unwinds through typed signals, and the driver prints `main`'s
//!    result when it is printable.
//! 3. [`memory`] — the runtime model: tagged [`memory::value::Value`]
//!    variants, [`memory::scope::Scope`] chains, and the
//!    [`memory::heap::Memory`] arena behind `alloc`/`free` and the pointer
//!    operators.
//!
//! ## Language surface
//!
//! Reserved words: `var fun if else while for return break continue struct
//! import`. Comments open and close with `#`. Strings and chars use C-style
//! escapes; numbers are 32-bit integers, doubles, or `f`-suffixed floats.
//! Structs support methods, a constructor method named like the struct, and
//! a destructor method named `_<StructName>`.

pub mod interpreter;
pub mod memory;
pub mod parser;
