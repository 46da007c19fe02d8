//! Eliminate: the sum step of variable elimination

use factor::Factor;
use util::{Result, VarelimError};
use variable::Variable;
use super::{record, CallTrace, Operation};

use std::collections::BTreeSet;


/// Sum `variable` out of `factor`.
///
/// Defined in Koller & Friedman 9.3.1 (factor marginalization)
///
/// # Args
/// * `factor`: the `Factor` to marginalize
/// * `variable`: an unconditioned `Variable` of `factor`
/// * `trace`: records `(Eliminate, variable)`, if provided
///
/// # Returns
/// a new `Factor` over the remaining unconditioned `Variable`s and the same conditioned
/// `Variable`s, whose probability at each assignment is the sum of `factor`'s probabilities over
/// every value of `variable`
///
/// # Errors
/// * `VarelimError::NotUnconditioned` if `variable` is not an unconditioned `Variable` of
///   `factor`
/// * `VarelimError::LastUnconditionedVariable` if `variable` is the only unconditioned
///   `Variable` of `factor`
pub fn eliminate(factor: &Factor,
                 variable: &Variable,
                 trace: Option<&mut dyn CallTrace>) -> Result<Factor> {
    record(trace, Operation::Eliminate, variable);

    if ! factor.unconditioned_variables().contains(variable) {
        warn!(variable = %variable, "elimination variable is not unconditioned");
        return Err(VarelimError::NotUnconditioned {
            variable: variable.clone(),
            unconditioned: factor.unconditioned_variables().iter().cloned().collect()
        });
    }

    if factor.unconditioned_variables().len() < 2 {
        warn!(variable = %variable, "elimination variable is the last unconditioned variable");
        return Err(VarelimError::LastUnconditionedVariable(variable.clone()));
    }

    let unconditioned: BTreeSet<Variable> = factor.unconditioned_variables()
                                                  .iter()
                                                  .filter(|&v| v != variable)
                                                  .cloned()
                                                  .collect();
    let conditioned = factor.conditioned_variables().clone();

    let domains = factor.variable_domains().clone();
    let cardinality = domains.domain(variable)?.len();

    debug!(variable = %variable, cardinality, scope = factor.variables().len(), "eliminate");

    Factor::tabulate(unconditioned, conditioned, domains, |assignment| {
        let mut extended = assignment.clone();
        let mut sum = 0.;
        for idx in 0..cardinality {
            extended.set(variable, idx);
            sum += factor.get_probability(&extended)?;
        }
        Ok(sum)
    })
}
