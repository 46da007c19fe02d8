//! The factor operations of Sum-Product Variable Elimination (Koller & Friedman Algorithm 9.1)
//!
//! Variable elimination repeatedly picks a `Variable`, joins every `Factor` that mentions it and
//! sums it out of the result. Once every hidden `Variable` is gone, the remaining `Factor`s are
//! joined and normalized into the answer of the query.
//!
//! `join`, `eliminate` and `normalize` never modify their inputs: each builds a new `Factor`.
//! Every operation accepts an optional `CallTrace` that records which operation was called on
//! which `Variable`.

use variable::Variable;

mod eliminate;
mod join;
mod normalize;
mod variable_elimination;

pub use self::eliminate::eliminate;
pub use self::join::{join, join_by_variable};
pub use self::normalize::normalize;
pub use self::variable_elimination::variable_elimination;


/// The operations recorded by a `CallTrace`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Join,
    Eliminate
}


/// A single entry of a `CallTrace`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceRecord {
    pub operation: Operation,
    pub variable: Variable
}

impl TraceRecord {

    pub fn new(operation: Operation, variable: &Variable) -> Self {
        TraceRecord { operation, variable: variable.clone() }
    }

}


/// A sink for the calls made to the variable elimination operations. The operations only ever
/// append to a `CallTrace`; they never read it back.
pub trait CallTrace {

    /// Record that `operation` was invoked on `variable`
    fn record(&mut self, operation: Operation, variable: &Variable);

}

impl CallTrace for Vec<TraceRecord> {

    fn record(&mut self, operation: Operation, variable: &Variable) {
        self.push(TraceRecord::new(operation, variable));
    }

}


/// Append to the trace, if there is one
fn record(trace: Option<&mut dyn CallTrace>, operation: Operation, variable: &Variable) {
    if let Some(t) = trace {
        t.record(operation, variable);
    }
}
