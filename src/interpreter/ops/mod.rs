//! Operator evaluation
//!
//! `impl Expr` blocks for the operator nodes:
//! - [`binary`]: arithmetic, comparison, logical, bitwise, and assignment
//! - [`unary`]: `+ - !`, `++`/`--`, and the `$` pointer operator
//! - [`access`]: the `[]` index operator
//! - [`structs`]: constructor calls, the `.` operator, and destruction

pub mod access;
pub mod binary;
pub mod structs;
pub mod unary;
