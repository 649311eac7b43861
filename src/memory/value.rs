//! Runtime value representation
//!
//! This module defines the [`Value`] enum, the tagged variant that every
//! expression evaluates to, together with the operator semantics shared by
//! the whole evaluator.
//!
//! # Value Types
//!
//! - [`Value::Int`]: 32-bit signed integer
//! - [`Value::Size`]: pointer-width unsigned integer, used for raw addresses
//! - [`Value::Float32`] / [`Value::Float64`]: IEEE floats
//! - [`Value::Bool`]: boolean
//! - [`Value::Char`]: single character
//! - [`Value::Opaque`]: boxed host-side object (struct instances, arrays)
//!
//! # Arithmetic
//!
//! Binary `+ - * /` promote C-style: `Float64 > Float32 > Size > Int`, with
//! `Bool` and `Char` promoting to `Int`. `% & | ^ && ||` succeed only when
//! both operands are integral and otherwise yield the zero/false of the
//! result variant. `== !=` apply to every variant; the ordering comparisons
//! require arithmetic operands and yield `false` otherwise.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::interpreter::errors::Fault;
use crate::interpreter::ops::structs::StructInstance;

/// Shared, mutable storage for a single runtime value.
///
/// Bindings, heap cells, and operator results all hold values through this
/// handle; assignment operators write through it in place.
pub type ValueRef = Rc<RefCell<Value>>;

/// Runtime values in the interpreter
#[derive(Clone, Debug)]
pub enum Value {
    Int(i32),
    Size(u64),
    Float32(f32),
    Float64(f64),
    Bool(bool),
    Char(char),
    Opaque(Opaque),
}

/// Host-side boxed objects carried by [`Value::Opaque`].
#[derive(Clone)]
pub enum Opaque {
    /// An owning handle to a struct instance.
    Instance(Rc<StructInstance>),
    /// The non-owning handle bound as `this` inside an instance scope.
    InstanceRef(Weak<StructInstance>),
    /// The backing storage of the builtin `array` record.
    Array(Rc<RefCell<Vec<ValueRef>>>),
}

impl Opaque {
    /// Identity comparison: two handles are equal when they refer to the
    /// same host object.
    pub fn same_object(&self, other: &Opaque) -> bool {
        match (self.instance(), other.instance()) {
            (Some(a), Some(b)) => Rc::ptr_eq(&a, &b),
            _ => match (self, other) {
                (Opaque::Array(a), Opaque::Array(b)) => Rc::ptr_eq(a, b),
                _ => false,
            },
        }
    }

    /// Resolve either instance handle to a strong reference.
    pub fn instance(&self) -> Option<Rc<StructInstance>> {
        match self {
            Opaque::Instance(instance) => Some(instance.clone()),
            Opaque::InstanceRef(weak) => weak.upgrade(),
            Opaque::Array(_) => None,
        }
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opaque::Instance(instance) => write!(f, "Instance({})", instance.name),
            Opaque::InstanceRef(_) => write!(f, "InstanceRef"),
            Opaque::Array(cells) => write!(f, "Array(len {})", cells.borrow().len()),
        }
    }
}

/// Numeric view of a value after Bool/Char promotion.
#[derive(Clone, Copy)]
enum Num {
    Int(i32),
    Size(u64),
    F32(f32),
    F64(f64),
}

/// A pair of operands promoted to their common arithmetic variant.
enum Promoted {
    Int(i32, i32),
    Size(u64, u64),
    F32(f32, f32),
    F64(f64, f64),
}

impl Promoted {
    fn of(left: Num, right: Num) -> Promoted {
        use Num::*;
        match (left, right) {
            (F64(a), b) => Promoted::F64(a, b.as_f64()),
            (a, F64(b)) => Promoted::F64(a.as_f64(), b),
            (F32(a), b) => Promoted::F32(a, b.as_f32()),
            (a, F32(b)) => Promoted::F32(a.as_f32(), b),
            (Size(a), b) => Promoted::Size(a, b.as_u64()),
            (a, Size(b)) => Promoted::Size(a.as_u64(), b),
            (Int(a), Int(b)) => Promoted::Int(a, b),
        }
    }
}

impl Num {
    fn as_f64(self) -> f64 {
        match self {
            Num::Int(n) => n as f64,
            Num::Size(n) => n as f64,
            Num::F32(f) => f as f64,
            Num::F64(f) => f,
        }
    }

    fn as_f32(self) -> f32 {
        match self {
            Num::Int(n) => n as f32,
            Num::Size(n) => n as f32,
            Num::F32(f) => f,
            Num::F64(f) => f as f32,
        }
    }

    fn as_u64(self) -> u64 {
        match self {
            Num::Int(n) => n as i64 as u64,
            Num::Size(n) => n,
            Num::F32(f) => f as u64,
            Num::F64(f) => f as u64,
        }
    }
}

impl Value {
    /// Wrap the value in a fresh shared cell.
    pub fn cell(self) -> ValueRef {
        Rc::new(RefCell::new(self))
    }

    /// Numeric view, if the value is arithmetic. `Bool` and `Char` promote
    /// to `Int`; `Opaque` has none.
    fn numeric(&self) -> Option<Num> {
        match self {
            Value::Int(n) => Some(Num::Int(*n)),
            Value::Size(n) => Some(Num::Size(*n)),
            Value::Float32(f) => Some(Num::F32(*f)),
            Value::Float64(f) => Some(Num::F64(*f)),
            Value::Bool(b) => Some(Num::Int(*b as i32)),
            Value::Char(c) => Some(Num::Int(*c as i32)),
            Value::Opaque(_) => None,
        }
    }

    /// Whether the value is one of the integral variants.
    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            Value::Int(_) | Value::Size(_) | Value::Bool(_) | Value::Char(_)
        )
    }

    /// Whether the driver may print the value.
    pub fn printable(&self) -> bool {
        !matches!(self, Value::Opaque(_))
    }

    fn arith_pair(&self, rhs: &Value, op: &str) -> Result<(Num, Num), Fault> {
        match (self.numeric(), rhs.numeric()) {
            (Some(l), Some(r)) => Ok((l, r)),
            _ => Err(Fault::Type {
                message: format!(
                    "operator '{}' applied to non-arithmetic operands ({:?} and {:?})",
                    op, self, rhs
                ),
            }),
        }
    }

    pub fn add(&self, rhs: &Value) -> Result<Value, Fault> {
        let (l, r) = self.arith_pair(rhs, "+")?;
        Ok(match Promoted::of(l, r) {
            Promoted::Int(a, b) => Value::Int(a.wrapping_add(b)),
            Promoted::Size(a, b) => Value::Size(a.wrapping_add(b)),
            Promoted::F32(a, b) => Value::Float32(a + b),
            Promoted::F64(a, b) => Value::Float64(a + b),
        })
    }

    pub fn sub(&self, rhs: &Value) -> Result<Value, Fault> {
        let (l, r) = self.arith_pair(rhs, "-")?;
        Ok(match Promoted::of(l, r) {
            Promoted::Int(a, b) => Value::Int(a.wrapping_sub(b)),
            Promoted::Size(a, b) => Value::Size(a.wrapping_sub(b)),
            Promoted::F32(a, b) => Value::Float32(a - b),
            Promoted::F64(a, b) => Value::Float64(a - b),
        })
    }

    pub fn mul(&self, rhs: &Value) -> Result<Value, Fault> {
        let (l, r) = self.arith_pair(rhs, "*")?;
        Ok(match Promoted::of(l, r) {
            Promoted::Int(a, b) => Value::Int(a.wrapping_mul(b)),
            Promoted::Size(a, b) => Value::Size(a.wrapping_mul(b)),
            Promoted::F32(a, b) => Value::Float32(a * b),
            Promoted::F64(a, b) => Value::Float64(a * b),
        })
    }

    pub fn div(&self, rhs: &Value) -> Result<Value, Fault> {
        let (l, r) = self.arith_pair(rhs, "/")?;
        Ok(match Promoted::of(l, r) {
            Promoted::Int(a, b) => {
                if b == 0 {
                    return Err(Fault::DivisionByZero);
                }
                Value::Int(a.wrapping_div(b))
            }
            Promoted::Size(a, b) => {
                if b == 0 {
                    return Err(Fault::DivisionByZero);
                }
                Value::Size(a / b)
            }
            Promoted::F32(a, b) => Value::Float32(a / b),
            Promoted::F64(a, b) => Value::Float64(a / b),
        })
    }

    /// Remainder. Integral operands only; anything else yields `Int(0)`.
    pub fn rem(&self, rhs: &Value) -> Result<Value, Fault> {
        if !(self.is_integral() && rhs.is_integral()) {
            return Ok(Value::Int(0));
        }
        let (l, r) = self.arith_pair(rhs, "%")?;
        Ok(match Promoted::of(l, r) {
            Promoted::Int(a, b) => {
                if b == 0 {
                    return Err(Fault::DivisionByZero);
                }
                Value::Int(a.wrapping_rem(b))
            }
            Promoted::Size(a, b) => {
                if b == 0 {
                    return Err(Fault::DivisionByZero);
                }
                Value::Size(a % b)
            }
            _ => unreachable!("integral operands promote to Int or Size"),
        })
    }

    fn bitwise(&self, rhs: &Value, op: fn(u64, u64) -> u64) -> Value {
        if !(self.is_integral() && rhs.is_integral()) {
            return Value::Int(0);
        }
        let (l, r) = (self.numeric().unwrap(), rhs.numeric().unwrap());
        match Promoted::of(l, r) {
            Promoted::Int(a, b) => Value::Int(op(a as i64 as u64, b as i64 as u64) as i32),
            Promoted::Size(a, b) => Value::Size(op(a, b)),
            _ => unreachable!("integral operands promote to Int or Size"),
        }
    }

    pub fn bit_and(&self, rhs: &Value) -> Value {
        self.bitwise(rhs, |a, b| a & b)
    }

    pub fn bit_or(&self, rhs: &Value) -> Value {
        self.bitwise(rhs, |a, b| a | b)
    }

    pub fn bit_xor(&self, rhs: &Value) -> Value {
        self.bitwise(rhs, |a, b| a ^ b)
    }

    /// Logical conjunction. Both operands are always evaluated before this
    /// is applied; non-integral operands yield `false`.
    pub fn logical_and(&self, rhs: &Value) -> Value {
        if self.is_integral() && rhs.is_integral() {
            Value::Bool(self.to_bool() && rhs.to_bool())
        } else {
            Value::Bool(false)
        }
    }

    pub fn logical_or(&self, rhs: &Value) -> Value {
        if self.is_integral() && rhs.is_integral() {
            Value::Bool(self.to_bool() || rhs.to_bool())
        } else {
            Value::Bool(false)
        }
    }

    fn raw_eq(&self, rhs: &Value) -> bool {
        if let (Some(l), Some(r)) = (self.numeric(), rhs.numeric()) {
            return match Promoted::of(l, r) {
                Promoted::Int(a, b) => a == b,
                Promoted::Size(a, b) => a == b,
                Promoted::F32(a, b) => a == b,
                Promoted::F64(a, b) => a == b,
            };
        }
        match (self, rhs) {
            (Value::Opaque(a), Value::Opaque(b)) => a.same_object(b),
            _ => false,
        }
    }

    pub fn equals(&self, rhs: &Value) -> Value {
        Value::Bool(self.raw_eq(rhs))
    }

    pub fn not_equals(&self, rhs: &Value) -> Value {
        Value::Bool(!self.raw_eq(rhs))
    }

    fn ordering(&self, rhs: &Value, cmp: fn(f64, f64) -> bool) -> Value {
        match (self.numeric(), rhs.numeric()) {
            (Some(l), Some(r)) => match Promoted::of(l, r) {
                Promoted::Int(a, b) => Value::Bool(cmp(a as f64, b as f64)),
                Promoted::Size(a, b) => Value::Bool(cmp(a as f64, b as f64)),
                Promoted::F32(a, b) => Value::Bool(cmp(a as f64, b as f64)),
                Promoted::F64(a, b) => Value::Bool(cmp(a, b)),
            },
            _ => Value::Bool(false),
        }
    }

    pub fn less(&self, rhs: &Value) -> Value {
        self.ordering(rhs, |a, b| a < b)
    }

    pub fn greater(&self, rhs: &Value) -> Value {
        self.ordering(rhs, |a, b| a > b)
    }

    pub fn less_equal(&self, rhs: &Value) -> Value {
        self.ordering(rhs, |a, b| a <= b)
    }

    pub fn greater_equal(&self, rhs: &Value) -> Value {
        self.ordering(rhs, |a, b| a >= b)
    }

    /// Unary minus. Negates any arithmetic or pointer variant.
    pub fn neg(&self) -> Result<Value, Fault> {
        match self {
            Value::Int(n) => Ok(Value::Int(n.wrapping_neg())),
            Value::Size(n) => Ok(Value::Size(n.wrapping_neg())),
            Value::Float32(f) => Ok(Value::Float32(-f)),
            Value::Float64(f) => Ok(Value::Float64(-f)),
            Value::Bool(b) => Ok(Value::Int(-(*b as i32))),
            Value::Char(c) => Ok(Value::Int(-(*c as i32))),
            other => Err(Fault::Type {
                message: format!("operator '-' applied to {:?}", other),
            }),
        }
    }

    /// Logical not. Inverts booleans only; everything else yields `false`.
    pub fn not(&self) -> Value {
        match self {
            Value::Bool(b) => Value::Bool(!b),
            _ => Value::Bool(false),
        }
    }

    /// Truthiness: any non-zero integral variant is true.
    pub fn to_bool(&self) -> bool {
        match self {
            Value::Int(n) => *n != 0,
            Value::Size(n) => *n != 0,
            Value::Bool(b) => *b,
            Value::Char(c) => *c != '\0',
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        self.raw_eq(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Size(n) => write!(f, "{}", n),
            Value::Float32(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Char(c) => write!(f, "{}", c),
            Value::Opaque(_) => write!(f, "Non printable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_c_style_promotion() {
        assert_eq!(
            Value::Int(2).add(&Value::Float64(0.5)).unwrap(),
            Value::Float64(2.5)
        );
        assert_eq!(Value::Char('a').add(&Value::Int(1)).unwrap(), Value::Int(98));
        assert_eq!(Value::Bool(true).add(&Value::Int(1)).unwrap(), Value::Int(2));
        assert_eq!(Value::Size(16).add(&Value::Int(16)).unwrap(), Value::Size(32));
    }

    #[test]
    fn test_integral_only_operators() {
        // Non-integral operands yield the zero of the result variant.
        assert_eq!(Value::Float64(1.5).rem(&Value::Int(2)).unwrap(), Value::Int(0));
        assert_eq!(Value::Float32(1.0).bit_and(&Value::Int(3)), Value::Int(0));
        assert_eq!(
            Value::Float64(1.0).logical_and(&Value::Int(1)),
            Value::Bool(false)
        );
        assert_eq!(Value::Int(6).bit_and(&Value::Int(3)), Value::Int(2));
        assert_eq!(Value::Int(6).rem(&Value::Int(4)).unwrap(), Value::Int(2));
    }

    #[test]
    fn test_division_by_zero() {
        assert!(matches!(
            Value::Int(1).div(&Value::Int(0)),
            Err(Fault::DivisionByZero)
        ));
        assert!(matches!(
            Value::Int(1).rem(&Value::Int(0)),
            Err(Fault::DivisionByZero)
        ));
        // Float division by zero is not an error.
        assert!(Value::Float64(1.0).div(&Value::Float64(0.0)).is_ok());
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(Value::Int(2).less(&Value::Int(3)), Value::Bool(true));
        assert_eq!(Value::Char('a').equals(&Value::Int(97)), Value::Bool(true));
        let array = Value::Opaque(Opaque::Array(Rc::new(RefCell::new(Vec::new()))));
        assert_eq!(array.less(&Value::Int(1)), Value::Bool(false));
        assert_eq!(array.equals(&array.clone()), Value::Bool(true));
        assert_eq!(array.equals(&Value::Int(0)), Value::Bool(false));
    }

    #[test]
    fn test_to_bool() {
        assert!(Value::Int(5).to_bool());
        assert!(!Value::Int(0).to_bool());
        assert!(Value::Char('x').to_bool());
        assert!(Value::Size(1).to_bool());
        assert!(!Value::Float64(1.0).to_bool());
    }

    #[test]
    fn test_not_inverts_bools_only() {
        assert_eq!(Value::Bool(true).not(), Value::Bool(false));
        assert_eq!(Value::Int(0).not(), Value::Bool(false));
        assert_eq!(Value::Int(7).not(), Value::Bool(false));
    }
}
