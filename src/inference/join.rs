//! Join: the product step of variable elimination

use factor::Factor;
use util::{Result, VarelimError};
use variable::Variable;
use super::{record, CallTrace, Operation};

use itertools::Itertools;

use std::collections::{BTreeMap, BTreeSet};


/// Join every `Factor` that mentions `variable`.
///
/// # Args
/// * `factors`: the current bag of `Factor`s
/// * `variable`: the `Variable` to join on
/// * `trace`: records `(Join, variable)`, if provided
///
/// # Returns
/// the `Factor`s that do not mention `variable`, in their original order, and the join of those
/// that do
///
/// # Errors
/// * `VarelimError::ScopeViolation` if `variable` is unconditioned in more than one `Factor`
/// * `VarelimError::EmptyJoin` if no `Factor` mentions `variable`
/// * any error of `join`
pub fn join_by_variable(factors: Vec<Factor>,
                        variable: &Variable,
                        trace: Option<&mut dyn CallTrace>) -> Result<(Vec<Factor>, Factor)> {
    record(trace, Operation::Join, variable);

    let (to_join, remaining): (Vec<Factor>, Vec<Factor>) = factors.into_iter()
                                                                 .partition(|f| f.contains(variable));

    let owners = to_join.iter()
                        .filter(|f| f.unconditioned_variables().contains(variable))
                        .count();
    if owners > 1 {
        warn!(variable = %variable, owners, "join variable is unconditioned in several factors");
        return Err(VarelimError::ScopeViolation {
            variables: vec![variable.clone()],
            factors: render(&to_join)
        });
    }

    debug!(variable = %variable, joined = to_join.len(), remaining = remaining.len(), "join by variable");
    let joined = join(&to_join)?;

    Ok((remaining, joined))
}


/// Join a set of `Factor`s into a single `Factor`.
///
/// Defined in Koller & Friedman Section 4.2.1 (factor product), restricted to `Factor`s whose
/// unconditioned `Variable`s are disjoint.
///
/// # Args
/// * `factors`: the `Factor`s to join; all must share one `DomainMap`
///
/// # Returns
/// a new `Factor` whose unconditioned `Variable`s are the union of the inputs' unconditioned
/// `Variable`s, and whose conditioned `Variable`s are the union of the inputs' conditioned
/// `Variable`s minus the result's unconditioned ones. Each probability is the product of the
/// inputs' probabilities at the same assignment.
///
/// # Errors
/// * `VarelimError::EmptyJoin` if `factors` is empty
/// * `VarelimError::ScopeViolation` if a `Variable` is unconditioned in more than one `Factor`
/// * `VarelimError::DomainMismatch` if the `Factor`s do not share one `DomainMap`
pub fn join(factors: &[Factor]) -> Result<Factor> {
    let first = match factors.first() {
        Some(f) => f,
        None => return Err(VarelimError::EmptyJoin)
    };

    // count the factors claiming each unconditioned variable
    let mut claims: BTreeMap<&Variable, usize> = BTreeMap::new();
    for v in factors.iter().flat_map(|f| f.unconditioned_variables().iter()) {
        *claims.entry(v).or_insert(0) += 1;
    }

    let repeated: Vec<Variable> = claims.into_iter()
                                        .filter(|&(_, n)| n > 1)
                                        .map(|(v, _)| v.clone())
                                        .collect();
    if ! repeated.is_empty() {
        warn!(variables = %repeated.iter().join(", "), "unconditioned variables claimed by several factors");
        return Err(VarelimError::ScopeViolation { variables: repeated, factors: render(factors) });
    }

    if factors.iter().any(|f| ! f.shares_domains_with(first)) {
        return Err(VarelimError::DomainMismatch);
    }

    let unconditioned: BTreeSet<Variable> = factors.iter()
                                                   .flat_map(|f| f.unconditioned_variables().iter())
                                                   .cloned()
                                                   .collect();

    // an unconditioned role in any factor dominates a conditioned role elsewhere
    let conditioned: BTreeSet<Variable> = factors.iter()
                                                 .flat_map(|f| f.conditioned_variables().iter())
                                                 .filter(|v| ! unconditioned.contains(v))
                                                 .cloned()
                                                 .collect();

    debug!(factors = factors.len(),
           unconditioned = unconditioned.len(),
           conditioned = conditioned.len(),
           "join");

    Factor::tabulate(unconditioned, conditioned, first.variable_domains().clone(), |assignment| {
        factors.iter().map(|f| f.get_probability(assignment)).product()
    })
}


/// Render the `Factor`s for an error message
fn render(factors: &[Factor]) -> String {
    factors.iter().join("\n")
}
