//! Answers a conditional probability query by exact inference with variable elimination.
//!
//! Implementation of Koller & Friedman Algorithm 9.1 - Sum-Product-VE. The elimination order is
//! chosen by the caller.

use factor::Factor;
use util::Result;
use variable::Variable;
use super::{eliminate, join, join_by_variable, normalize, CallTrace};


/// Run variable elimination over a bag of `Factor`s.
///
/// # Args
/// * `factors`: the `Factor`s of the network, already reduced with the evidence (see
///   `DomainMap::with_evidence` and `Factor::reduce`)
/// * `order`: the `Variable`s to eliminate, in elimination order. Every `Variable` of `order`
///   with more than one value is summed out, query `Variable`s included. An evidence `Variable`
///   (a single value in its `Domain`) is joined on but kept, so its weight reaches the result.
/// * `trace`: records every join and eliminate, if provided
///
/// # Returns
/// * `Some(f)`: the normalized distribution over the `Variable`s that were not eliminated, with
///   the evidence as conditioned `Variable`s
/// * `None`: if the evidence has zero probability
///
/// # Errors
/// * `VarelimError::NotUnconditioned` if a `Variable` of `order` is only ever conditioned
/// * any error of `join_by_variable`, `eliminate`, `join` or `normalize`
pub fn variable_elimination(factors: Vec<Factor>,
                            order: &[Variable],
                            mut trace: Option<&mut dyn CallTrace>) -> Result<Option<Factor>> {
    let mut phis = factors;

    for var in order.iter() {
        if ! phis.iter().any(|f| f.contains(var)) {
            trace!(variable = %var, "no factor mentions the variable, skipping");
            continue;
        }

        // product step - join the factors with var
        let (remaining, psi) = join_by_variable(phis, var, reborrow(&mut trace))?;
        phis = remaining;

        // sum step - marginalize psi over var. Evidence is kept as is. A factor with var as its
        // only unconditioned variable is a conditional distribution of var, which sums to 1 for
        // every assignment to the conditioned variables, so it is dropped instead.
        let evidence = psi.variable_domains().domain(var)?.is_single_valued();
        let lone = psi.unconditioned_variables().len() == 1 && psi.unconditioned_variables().contains(var);
        if evidence {
            trace!(variable = %var, "keeping evidence variable");
            phis.push(psi);
        } else if lone {
            trace!(variable = %var, "dropping factor over a single unconditioned variable");
        } else {
            let tau = eliminate(&psi, var, reborrow(&mut trace))?;
            phis.push(tau);
        }
    }

    // multiply together remaining phis
    let phi_star = join(&phis)?;

    // now we have an unnormalized distribution, proportional to the joint of the query variables
    // and the evidence
    normalize(&phi_star)
}


fn reborrow<'a>(trace: &'a mut Option<&mut dyn CallTrace>) -> Option<&'a mut dyn CallTrace> {
    match *trace {
        Some(ref mut t) => Some(&mut **t),
        None => None
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use inference::{Operation, TraceRecord};
    use util::VarelimError;
    use variable::{Assignment, DomainMap, DomainMapBuilder};
    use std::sync::Arc;

    /// Rain -> Traffic -> Late
    struct Network {
        r: Variable,
        t: Variable,
        l: Variable,
        domains: DomainMap,
        cpts: Vec<Factor>
    }

    fn build_network() -> Network {
        let r = Variable::new("R");
        let t = Variable::new("T");
        let l = Variable::new("L");

        let domains = DomainMapBuilder::new().with_variable(&r, vec!["+r", "-r"])
                                             .with_variable(&t, vec!["+t", "-t"])
                                             .with_variable(&l, vec!["+l", "-l"])
                                             .build()
                                             .unwrap();
        let shared = Arc::new(domains.clone());

        let none: Vec<Variable> = Vec::new();
        let p_r = Factor::from_values(vec![r.clone()], none, shared.clone(), vec![0.1, 0.9]).unwrap();

        // scope (R, T)
        let p_t = Factor::from_values(vec![t.clone()], vec![r.clone()], shared.clone(), vec![0.8, 0.2, 0.1, 0.9])
                         .unwrap();

        // scope (L, T)
        let p_l = Factor::from_values(vec![l.clone()], vec![t.clone()], shared.clone(), vec![0.3, 0.1, 0.7, 0.9])
                         .unwrap();

        Network { r, t, l, domains, cpts: vec![p_r, p_t, p_l] }
    }

    fn condition(network: &Network, evidence: &Assignment) -> Vec<Factor> {
        let reduced = Arc::new(network.domains.with_evidence(evidence).unwrap());
        network.cpts.iter().map(|f| f.reduce(&reduced).unwrap()).collect()
    }

    #[test]
    /// P(R | L = +l)
    fn posterior() {
        let network = build_network();

        let mut evidence = Assignment::new();
        evidence.set_value(&network.l, "+l", &network.domains).unwrap();
        let factors = condition(&network, &evidence);

        let mut trace: Vec<TraceRecord> = Vec::new();
        let p = variable_elimination(factors, &[network.t.clone()], Some(&mut trace))
                    .expect("Unexpected error")
                    .expect("zero mass");

        let unconditioned: Vec<&Variable> = p.unconditioned_variables().iter().collect();
        let conditioned: Vec<&Variable> = p.conditioned_variables().iter().collect();
        assert_eq!(vec![&network.r], unconditioned);
        assert_eq!(vec![&network.l], conditioned);

        let mut assn = Assignment::new();
        assn.set(&network.l, 0);
        assn.set(&network.r, 0);
        assert!((0.026 / 0.134 - p.get_probability(&assn).unwrap()).abs() < 1e-9);
        assn.set(&network.r, 1);
        assert!((0.108 / 0.134 - p.get_probability(&assn).unwrap()).abs() < 1e-9);

        assert_eq!(
            vec![
                TraceRecord::new(Operation::Join, &network.t),
                TraceRecord::new(Operation::Eliminate, &network.t)
            ],
            trace
        );
    }

    #[test]
    /// P(L), eliminating R then T
    fn marginal() {
        let network = build_network();

        let order = vec![network.r.clone(), network.t.clone()];
        let p = variable_elimination(network.cpts.clone(), &order, None)
                    .expect("Unexpected error")
                    .expect("zero mass");

        assert_eq!(&[network.l.clone()], p.variables());

        // P(+t) = 0.1 * 0.8 + 0.9 * 0.1 = 0.17
        let mut assn = Assignment::new();
        assn.set(&network.l, 0);
        let expected = 0.17 * 0.3 + 0.83 * 0.1;
        assert!((expected - p.get_probability(&assn).unwrap()).abs() < 1e-9);
    }

    #[test]
    /// Eliminating a leaf drops its CPT, and unknown variables are skipped
    fn drop_and_skip() {
        let network = build_network();

        let mut trace: Vec<TraceRecord> = Vec::new();
        let order = vec![Variable::new("Unused"), network.l.clone()];
        let p = variable_elimination(network.cpts.clone(), &order, Some(&mut trace))
                    .expect("Unexpected error")
                    .expect("zero mass");

        // only the join on L was recorded: its CPT is a distribution over L alone
        assert_eq!(vec![TraceRecord::new(Operation::Join, &network.l)], trace);

        let unconditioned: Vec<&Variable> = p.unconditioned_variables().iter().collect();
        assert_eq!(vec![&network.r, &network.t], unconditioned);

        let mut assn = Assignment::new();
        assn.set(&network.r, 0);
        assn.set(&network.t, 0);
        assert!((0.08 - p.get_probability(&assn).unwrap()).abs() < 1e-9);
    }

    #[test]
    /// P(R | L = +l) with the evidence variable in the elimination order
    fn evidence_in_order() {
        let network = build_network();

        let mut evidence = Assignment::new();
        evidence.set_value(&network.l, "+l", &network.domains).unwrap();
        let factors = condition(&network, &evidence);

        let mut trace: Vec<TraceRecord> = Vec::new();
        let order = vec![network.t.clone(), network.l.clone()];
        let p = variable_elimination(factors, &order, Some(&mut trace))
                    .expect("Unexpected error")
                    .expect("zero mass");

        let unconditioned: Vec<&Variable> = p.unconditioned_variables().iter().collect();
        let conditioned: Vec<&Variable> = p.conditioned_variables().iter().collect();
        assert_eq!(vec![&network.r], unconditioned);
        assert_eq!(vec![&network.l], conditioned);

        let mut assn = Assignment::new();
        assn.set(&network.l, 0);
        assn.set(&network.r, 0);
        assert!((0.026 / 0.134 - p.get_probability(&assn).unwrap()).abs() < 1e-9);

        // the evidence is joined on, never summed out
        assert_eq!(
            vec![
                TraceRecord::new(Operation::Join, &network.t),
                TraceRecord::new(Operation::Eliminate, &network.t),
                TraceRecord::new(Operation::Join, &network.l)
            ],
            trace
        );
    }

    #[test]
    /// A variable that is only ever conditioned cannot be summed out
    fn conditioned_only() {
        let network = build_network();
        let cpts = vec![network.cpts[1].clone(), network.cpts[2].clone()];

        match variable_elimination(cpts, &[network.r.clone()], None) {
            Err(VarelimError::NotUnconditioned { variable, unconditioned }) => {
                assert_eq!(network.r, variable);
                assert_eq!(vec![network.t.clone()], unconditioned);
            },
            _ => panic!("summed out a variable no factor describes")
        };
    }

    #[test]
    fn impossible_evidence() {
        let network = build_network();
        let shared = Arc::new(network.domains.clone());

        // a deterministic CPT in which +r never happens
        let none: Vec<Variable> = Vec::new();
        let p_r = Factor::from_values(vec![network.r.clone()], none, shared, vec![0., 1.]).unwrap();
        let cpts = vec![p_r, network.cpts[1].clone(), network.cpts[2].clone()];

        let mut evidence = Assignment::new();
        evidence.set(&network.r, 0);
        let reduced = Arc::new(network.domains.with_evidence(&evidence).unwrap());
        let factors: Vec<Factor> = cpts.iter().map(|f| f.reduce(&reduced).unwrap()).collect();

        let order = vec![network.t.clone()];
        assert_eq!(None, variable_elimination(factors, &order, None).expect("Unexpected error"));
    }

}
