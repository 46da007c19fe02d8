//! Provides an example of how to use varelim to answer a query on a Bayesian Network.
//!
//! Koller & Friedman's student network:
//!
//! ```text
//! Difficulty   Intelligence
//!        \      /        \
//!         Grade          SAT
//!           |
//!         Letter
//! ```
//!
//! Run with `RUST_LOG=varelim=debug` to see each operation.

extern crate tracing_subscriber;
extern crate varelim;

use varelim as v;
use std::sync::Arc;

fn main() -> v::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let difficulty = v::Variable::new("Difficulty");
    let intelligence = v::Variable::new("Intelligence");
    let grade = v::Variable::new("Grade");
    let sat = v::Variable::new("SAT");
    let letter = v::Variable::new("Letter");

    /////////////////////////////////////////////////////
    // Step 1: Declare the domains
    let domains = v::DomainMapBuilder::new()
        .with_variable(&difficulty, vec!["easy", "hard"])
        .with_variable(&intelligence, vec!["low", "high"])
        .with_variable(&grade, vec!["A", "B", "C"])
        .with_variable(&sat, vec!["low", "high"])
        .with_variable(&letter, vec!["weak", "strong"])
        .build()?;
    let domains = Arc::new(domains);

    /////////////////////////////////////////////////////
    // Step 2: Build the CPTs
    let cpts = vec![
        cpt(&domains, &difficulty, &[], &[(&[], &[0.6, 0.4])])?,
        cpt(&domains, &intelligence, &[], &[(&[], &[0.7, 0.3])])?,
        cpt(&domains, &grade, &[&intelligence, &difficulty], &[
            (&["low", "easy"], &[0.3, 0.4, 0.3]),
            (&["low", "hard"], &[0.05, 0.25, 0.7]),
            (&["high", "easy"], &[0.9, 0.08, 0.02]),
            (&["high", "hard"], &[0.5, 0.3, 0.2]),
        ])?,
        cpt(&domains, &sat, &[&intelligence], &[
            (&["low"], &[0.95, 0.05]),
            (&["high"], &[0.2, 0.8]),
        ])?,
        cpt(&domains, &letter, &[&grade], &[
            (&["A"], &[0.1, 0.9]),
            (&["B"], &[0.4, 0.6]),
            (&["C"], &[0.99, 0.01]),
        ])?,
    ];

    /////////////////////////////////////////////////////
    // Step 3: Compile some evidence and reduce the CPTs
    let mut evidence = v::Assignment::new();
    evidence.set_value(&difficulty, "easy", &domains)?;
    evidence.set_value(&letter, "strong", &domains)?;
    evidence.set_value(&sat, "low", &domains)?;

    let reduced = Arc::new(domains.with_evidence(&evidence)?);
    let factors = cpts.iter().map(|f| f.reduce(&reduced)).collect::<v::Result<Vec<_>>>()?;

    /////////////////////////////////////////////////////
    // Step 4: Run a Conditional Query by eliminating the hidden variables
    let mut trace: Vec<v::TraceRecord> = Vec::new();
    match v::variable_elimination(factors, &[grade], Some(&mut trace))? {
        Some(p) => print!("{}", p),
        None => println!("the evidence has zero probability"),
    }

    for record in trace.iter() {
        println!("{:?}({})", record.operation, record.variable);
    }

    Ok(())
}

/// Build the CPT of `child` given `parents`. Each row lists the values of the parents and the
/// distribution of `child` under them.
fn cpt(domains: &Arc<v::DomainMap>,
       child: &v::Variable,
       parents: &[&v::Variable],
       rows: &[(&[&str], &[f64])]) -> v::Result<v::Factor> {
    let child_domain = domains.domain(child)?.clone();
    let mut factor = v::Factor::new(
        vec![child.clone()],
        parents.iter().map(|&p| p.clone()),
        domains.clone()
    )?;

    for &(parent_values, distribution) in rows.iter() {
        let mut assignment = v::Assignment::new();
        for (&parent, &value) in parents.iter().zip(parent_values.iter()) {
            assignment.set_value(parent, value, domains)?;
        }

        for (value, &p) in child_domain.values().iter().zip(distribution.iter()) {
            assignment.set_value(child, value, domains)?;
            factor.set_probability(&assignment, p)?;
        }
    }

    Ok(factor)
}
