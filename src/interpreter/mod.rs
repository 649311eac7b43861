//! Brook evaluation engine
//!
//! This module provides the tree-walking evaluator:
//! - [`engine`]: the [`engine::Interpreter`] façade driving a whole run
//! - [`errors`]: fatal error types
//! - [`jumps`]: return/break/continue carried as typed unwinding signals
//! - [`expressions`], [`statements`], [`loops`], [`ops`]: `impl Expr`
//!   blocks with the per-node semantics
//! - [`builtins`]: native functions and the `array` record
//!
//! # Evaluation Model
//!
//! Every node exposes `evaluate(scope)`. Evaluation is a single-threaded
//! recursive descent with strict left-to-right ordering; there are no
//! suspension points and nothing is cancellable except by a signal or a
//! fault unwinding the whole driver.

pub mod builtins;
pub mod engine;
pub mod errors;
pub mod expressions;
pub mod jumps;
pub mod loops;
pub mod ops;
pub mod statements;
