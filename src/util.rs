//! Defines the `Error` type for the varelim library

use variable::Variable;

use itertools::Itertools;
use thiserror::Error;

use std::result;

pub type Result<T> = result::Result<T, VarelimError>;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum VarelimError {

    /// An unconditioned variable was claimed by more than one of the `Factor`s in a join. The
    /// join is only well defined when each unconditioned variable is produced by a single
    /// `Factor`.
    #[error("unconditioned variables [{}] appear in more than one input factor\ninput factors:\n{}",
            list(.variables), .factors)]
    ScopeViolation { variables: Vec<Variable>, factors: String },

    /// The elimination variable is not an unconditioned variable of the target `Factor`
    #[error("elimination variable {} is not an unconditioned variable of the factor \
             (unconditioned variables: [{}])", .variable, list(.unconditioned))]
    NotUnconditioned { variable: Variable, unconditioned: Vec<Variable> },

    /// Eliminating the variable would leave a `Factor` without unconditioned variables
    #[error("{0} is the only unconditioned variable of the factor, so it cannot be eliminated")]
    LastUnconditionedVariable(Variable),

    /// Normalize was called on a `Factor` with a conditioned variable that is not evidence, i.e.
    /// that has more than one value in its domain
    #[error("conditioned variables [{}] have more than one value, so the factor cannot be \
             normalized\n{}", list(.variables), .factor)]
    ConditionedNotEvidence { variables: Vec<Variable>, factor: String },

    /// The probabilities of a `Factor` sum to a value that is not finite, so there is nothing to
    /// rescale them by
    #[error("probability mass {0} is not finite, so the factor cannot be normalized")]
    NonFiniteMass(f64),

    /// Join was called without any `Factor`s
    #[error("join requires at least one factor")]
    EmptyJoin,

    /// The `Factor`s in a join were built over different variable domain maps
    #[error("factors in a join must share one variable domain map")]
    DomainMismatch,

    /// A `Domain` was declared without values
    #[error("a domain must contain at least one value")]
    EmptyDomain,

    /// A value was listed twice in the same `Domain`
    #[error("value {0:?} appears more than once in a domain")]
    DuplicateValue(String),

    /// Represents a variable that was present multiple times in a situation where it should only
    /// have been present once
    #[error("variable {0} was declared more than once")]
    DuplicateVariable(Variable),

    /// The variable has no entry in the variable domain map
    #[error("variable {0} has no domain in the variable domain map")]
    UnknownVariable(Variable),

    /// The value is not part of the variable's `Domain`
    #[error("{value:?} is not in the domain of {variable}")]
    UnknownValue { variable: Variable, value: String },

    /// An `Assignment` indexes past the end of the variable's `Domain`
    #[error("value index {index} is out of range for the domain of {variable}")]
    ValueOutOfRange { variable: Variable, index: usize },

    /// A variable was given both the unconditioned and the conditioned role in one `Factor`
    #[error("variable {0} cannot be both unconditioned and conditioned")]
    OverlappingRoles(Variable),

    /// Represents an incomplete assignment where a complete assignment was required.
    /// The value is the first variable of the scope that was missing from the assignment.
    #[error("assignment is missing a value for {0}")]
    IncompleteAssignment(Variable),

    /// Encountered a negative, infinite or NaN probability
    #[error("probability {0} is negative or not finite")]
    InvalidProbability(f64),

    /// A table was provided with the wrong number of entries for the scope of the `Factor`
    #[error("expected {expected} table entries, found {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

}


fn list(variables: &[Variable]) -> String {
    variables.iter().join(", ")
}
