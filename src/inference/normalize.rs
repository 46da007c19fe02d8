//! Normalize: rescale the final `Factor` of a query into a distribution

use factor::Factor;
use util::{Result, VarelimError};
use variable::Variable;

use std::collections::BTreeSet;


/// Normalize `factor` so its probabilities sum to 1.
///
/// Intended for the end of an inference query, when every conditioned `Variable` is evidence. An
/// unconditioned `Variable` with a single value in its `Domain` carries no uncertainty; it is
/// moved to the conditioned `Variable`s of the result.
///
/// # Returns
/// * `Some(f)`, a new `Factor` whose probabilities sum to 1
/// * `None`, if the probabilities of `factor` sum to 0. There is no distribution to normalize to;
///   the query that produced `factor` has no probability mass.
///
/// # Errors
/// * `VarelimError::ConditionedNotEvidence` if a conditioned `Variable` of `factor` has more than
///   one value in its `Domain`
/// * `VarelimError::NonFiniteMass` if the probabilities of `factor` sum past the range of `f64`
pub fn normalize(factor: &Factor) -> Result<Option<Factor>> {
    let domains = factor.variable_domains().clone();

    let mut free = Vec::new();
    for v in factor.conditioned_variables().iter() {
        if ! domains.domain(v)?.is_single_valued() {
            free.push(v.clone());
        }
    }

    if ! free.is_empty() {
        warn!(variables = free.len(), "normalize called with conditioned variables that are not evidence");
        return Err(VarelimError::ConditionedNotEvidence { variables: free, factor: factor.to_string() });
    }

    let total = factor.total();
    if ! total.is_finite() {
        warn!(total, "probability mass of the factor overflowed");
        return Err(VarelimError::NonFiniteMass(total));
    }

    if total == 0. {
        debug!(scope = factor.variables().len(), "factor has no probability mass to normalize");
        return Ok(None);
    }

    let mut unconditioned = BTreeSet::new();
    let mut conditioned: BTreeSet<Variable> = factor.conditioned_variables().clone();
    for v in factor.unconditioned_variables().iter() {
        if domains.domain(v)?.is_single_valued() {
            conditioned.insert(v.clone());
        } else {
            unconditioned.insert(v.clone());
        }
    }

    debug!(total, unconditioned = unconditioned.len(), conditioned = conditioned.len(), "normalize");

    let normalized = Factor::tabulate(unconditioned, conditioned, domains, |assignment| {
        Ok(factor.get_probability(assignment)? / total)
    })?;

    Ok(Some(normalized))
}
