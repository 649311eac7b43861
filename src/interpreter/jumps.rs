//! Control-flow signalling
//!
//! `return`, `break`, and `continue` are modelled as typed unwinding
//! signals carried through the `Err` channel of every `evaluate` call,
//! which keeps the evaluator's recursive shape clean. Loops catch `Break`
//! and `Continue`, function calls catch `Return`, and faults ride the same
//! channel all the way out.

use crate::interpreter::errors::Fault;
use crate::memory::value::ValueRef;

/// Out-of-band outcome of an evaluation.
#[derive(Debug)]
pub enum Signal {
    /// `return EXPR` — carries the evaluated value up to the enclosing call.
    Return(Option<ValueRef>),
    /// `break` — unwinds to the enclosing loop.
    Break,
    /// `continue` — unwinds to the enclosing loop's next iteration.
    Continue,
    /// A fatal error; never caught by user code.
    Fault(Fault),
}

/// Every node evaluates to an optional value (declarations and builtins
/// like `print` yield none) or unwinds with a [`Signal`].
pub type EvalResult = Result<Option<ValueRef>, Signal>;

impl From<Fault> for Signal {
    fn from(fault: Fault) -> Signal {
        Signal::Fault(fault)
    }
}

impl Signal {
    /// Collapse a signal that reached the top level into a fault.
    pub fn into_fault(self) -> Fault {
        match self {
            Signal::Fault(fault) => fault,
            Signal::Return(_) => Fault::ControlFlow { signal: "return" },
            Signal::Break => Fault::ControlFlow { signal: "break" },
            Signal::Continue => Fault::ControlFlow { signal: "continue" },
        }
    }
}
