//! varelim - the factor algebra of exact inference by variable elimination over discrete
//! Bayesian Networks.
//!
//! A `Factor` is a table of probabilities over a set of `Variable`s. The `inference` module
//! combines `Factor`s with `join`, sums `Variable`s out of them with `eliminate`, and turns the
//! last `Factor` of a query into a distribution with `normalize`.

extern crate indexmap;
#[cfg_attr(test, macro_use)]
extern crate itertools;
extern crate ndarray;
extern crate thiserror;
#[macro_use]
extern crate tracing;

pub mod variable;
pub mod factor;
pub mod inference;
pub mod util;

pub use util::{Result, VarelimError};
pub use variable::{all_assignments, AllAssignments, Assignment, Domain, DomainMap, DomainMapBuilder, Variable};
pub use factor::{Factor, Table};
pub use inference::{eliminate, join, join_by_variable, normalize, variable_elimination};
pub use inference::{CallTrace, Operation, TraceRecord};
