//! Definition of the factor module
//!
//! A `Factor` is a table of probabilities over a fixed set of `Variable`s, partitioned into the
//! unconditioned `Variable`s whose distribution it describes and the conditioned `Variable`s it
//! is given.

use util::{Result, VarelimError};
use variable::{Assignment, AllAssignments, Domain, DomainMap, Variable};

use itertools::Itertools;
use ndarray::{ArrayD, IxDyn};

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Alias f64 ndarray::ArrayD as Table
pub type Table = ArrayD<f64>;


/// A dense table-CPD as described in Koller & Friedman, with the scope split into
/// unconditioned and conditioned `Variable`s: ```P(unconditioned | conditioned)```.
///
/// The table has one axis per `Variable` of the scope, in sorted `Variable` order, so a row-major
/// walk of the table visits the cells in the order of `all_assignments`.
#[derive(Clone, Debug, PartialEq)]
pub struct Factor {
    /// The `Variable`s whose distribution the `Factor` describes
    unconditioned: BTreeSet<Variable>,

    /// The `Variable`s the `Factor`'s distribution is conditioned on
    conditioned: BTreeSet<Variable>,

    /// The `Domain`s of every `Variable` of the computation this `Factor` belongs to
    domains: Arc<DomainMap>,

    /// ```unconditioned U conditioned```, sorted
    scope: Vec<Variable>,

    /// The values of the `Factor` table.
    table: Table
}


impl Factor {

    /// Create a new `Factor` with every probability set to 0.
    ///
    /// # Args
    /// * `unconditioned`: the `Variable`s whose distribution the `Factor` describes
    /// * `conditioned`: the `Variable`s the distribution is conditioned on
    /// * `domains`: the shared `DomainMap`, which must hold the `Domain` of every `Variable` of
    ///   the scope
    ///
    /// # Errors
    /// * `VarelimError::OverlappingRoles` if a `Variable` is both unconditioned and conditioned
    /// * `VarelimError::UnknownVariable` if a `Variable` has no `Domain` in `domains`
    pub fn new<U, C>(unconditioned: U, conditioned: C, domains: Arc<DomainMap>) -> Result<Self>
        where U: IntoIterator<Item = Variable>,
              C: IntoIterator<Item = Variable>
    {
        let unconditioned: BTreeSet<Variable> = unconditioned.into_iter().collect();
        let conditioned: BTreeSet<Variable> = conditioned.into_iter().collect();

        if let Some(v) = unconditioned.intersection(&conditioned).next() {
            return Err(VarelimError::OverlappingRoles(v.clone()));
        }

        let scope: Vec<Variable> = unconditioned.union(&conditioned).cloned().collect();
        let shape = scope.iter()
                         .map(|v| domains.domain(v).map(Domain::len))
                         .collect::<Result<Vec<usize>>>()?;

        let table = Table::zeros(IxDyn(&shape));

        Ok(Factor { unconditioned, conditioned, domains, scope, table })
    }


    /// Create a new `Factor` from the values of its table.
    ///
    /// # Args
    /// * `values`: one probability per complete assignment to the scope, listed in the order of
    ///   `all_assignments` (the last `Variable`, by name, varies fastest)
    ///
    /// # Errors
    /// * see `Factor::new`
    /// * `VarelimError::ShapeMismatch` if the number of values does not match the scope
    /// * `VarelimError::InvalidProbability` if a value is negative or not finite
    pub fn from_values<U, C>(unconditioned: U,
                             conditioned: C,
                             domains: Arc<DomainMap>,
                             values: Vec<f64>) -> Result<Self>
        where U: IntoIterator<Item = Variable>,
              C: IntoIterator<Item = Variable>
    {
        let mut factor = Factor::new(unconditioned, conditioned, domains)?;
        if values.len() != factor.table.len() {
            return Err(VarelimError::ShapeMismatch {
                expected: factor.table.len(),
                actual: values.len()
            });
        }

        for (cell, p) in factor.table.iter_mut().zip(values.into_iter()) {
            *cell = check_probability(p)?;
        }

        Ok(factor)
    }


    /// Create a new `Factor`, filling each cell of the table with `f` applied to the cell's
    /// assignment. Cells are visited in the order of `all_assignments`.
    pub(crate) fn tabulate<F>(unconditioned: BTreeSet<Variable>,
                              conditioned: BTreeSet<Variable>,
                              domains: Arc<DomainMap>,
                              mut f: F) -> Result<Self>
        where F: FnMut(&Assignment) -> Result<f64>
    {
        let mut factor = Factor::new(unconditioned, conditioned, domains)?;
        let assignments = factor.all_assignments();

        for (cell, assignment) in factor.table.iter_mut().zip(assignments) {
            *cell = check_probability(f(&assignment)?)?;
        }

        Ok(factor)
    }


    /// The unconditioned `Variable`s of the `Factor`
    pub fn unconditioned_variables(&self) -> &BTreeSet<Variable> {
        &self.unconditioned
    }


    /// The conditioned `Variable`s of the `Factor`
    pub fn conditioned_variables(&self) -> &BTreeSet<Variable> {
        &self.conditioned
    }


    /// Retrieve the scope of the `Factor`: its unconditioned and conditioned `Variable`s, sorted
    pub fn variables(&self) -> &[Variable] {
        &self.scope
    }


    /// Check if `var` is in the scope of the `Factor`
    pub fn contains(&self, var: &Variable) -> bool {
        self.scope.binary_search(var).is_ok()
    }


    /// The shared `DomainMap` of the `Factor`
    pub fn variable_domains(&self) -> &Arc<DomainMap> {
        &self.domains
    }


    /// Check if this `Factor` and `other` were built over the same `DomainMap`
    pub fn shares_domains_with(&self, other: &Factor) -> bool {
        Arc::ptr_eq(&self.domains, &other.domains) || self.domains == other.domains
    }


    /// Enumerate every complete `Assignment` to the scope of the `Factor`
    pub fn all_assignments(&self) -> AllAssignments {
        AllAssignments::over(self.scope.clone(), self.table.shape().to_vec())
    }


    /// The values of the `Factor` table, one axis per `Variable` of `variables()`
    pub fn table(&self) -> &Table {
        &self.table
    }


    /// The sum of every probability in the table
    pub fn total(&self) -> f64 {
        self.table.iter().sum()
    }


    /// Retrieve the probability of an assignment to the scope of this `Factor`
    ///
    /// # Args
    /// * `assignment`: a full assignment to the scope of the `Factor`. The assignment's scope may
    ///   be a superset of the `Factor`'s scope; extra `Variable`s are ignored.
    ///
    /// # Errors
    /// * `VarelimError::IncompleteAssignment` if a `Variable` of the scope is not assigned
    /// * `VarelimError::ValueOutOfRange` if an assigned value is outside its `Domain`
    pub fn get_probability(&self, assignment: &Assignment) -> Result<f64> {
        let idx = self.index(assignment)?;
        Ok(self.table[IxDyn(&idx)])
    }


    /// Set the probability of an assignment to the scope of this `Factor`
    ///
    /// # Args
    /// * `assignment`: a full assignment to the scope of the `Factor`. Only the `Variable`s of
    ///   the scope are used.
    /// * `p`: the new probability
    ///
    /// # Errors
    /// * see `Factor::get_probability`
    /// * `VarelimError::InvalidProbability` if `p` is negative or not finite
    pub fn set_probability(&mut self, assignment: &Assignment, p: f64) -> Result<()> {
        let p = check_probability(p)?;
        let idx = self.index(assignment)?;
        self.table[IxDyn(&idx)] = p;
        Ok(())
    }


    /// Reduce the `Factor` onto a `DomainMap` whose `Domain`s are subsets of this `Factor`'s,
    /// typically one built by `DomainMap::with_evidence`.
    ///
    /// Defined in Koller & Friedman 4.2.3. The reduced `Factor` keeps its scope and roles; an
    /// observed `Variable` simply has a single value left.
    ///
    /// # Errors
    /// * `VarelimError::UnknownVariable` if a `Variable` of the scope is not in `reduced`
    /// * `VarelimError::UnknownValue` if `reduced` holds a value this `Factor` does not know
    pub fn reduce(&self, reduced: &Arc<DomainMap>) -> Result<Self> {
        let original = &self.domains;

        Factor::tabulate(
            self.unconditioned.clone(),
            self.conditioned.clone(),
            reduced.clone(),
            |assignment| {
                let mut translated = Assignment::new();
                for var in self.scope.iter() {
                    let value = assignment.value(var, reduced)
                                          .ok_or_else(|| VarelimError::IncompleteAssignment(var.clone()))?;
                    translated.set_value(var, value, original)?;
                }
                self.get_probability(&translated)
            }
        )
    }


    /// Compute the table index of `assignment`
    fn index(&self, assignment: &Assignment) -> Result<Vec<usize>> {
        self.scope
            .iter()
            .zip(self.table.shape().iter())
            .map(|(var, &card)| {
                match assignment.get(var) {
                    None => Err(VarelimError::IncompleteAssignment(var.clone())),
                    Some(idx) if idx >= card => {
                        Err(VarelimError::ValueOutOfRange { variable: var.clone(), index: idx })
                    },
                    Some(idx) => Ok(idx)
                }
            })
            .collect()
    }

}


/// Probabilities must be non-negative and finite
fn check_probability(p: f64) -> Result<f64> {
    if p.is_finite() && p >= 0.0 {
        Ok(p)
    } else {
        Err(VarelimError::InvalidProbability(p))
    }
}


impl fmt::Display for Factor {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "P({}", self.unconditioned.iter().join(", "))?;
        if ! self.conditioned.is_empty() {
            write!(f, " | {}", self.conditioned.iter().join(", "))?;
        }
        writeln!(f, ")")?;

        for (assignment, p) in self.all_assignments().zip(self.table.iter()) {
            let row = self.scope
                          .iter()
                          .map(|v| format!("{}={}", v, assignment.value(v, &self.domains).unwrap_or("?")))
                          .join(", ");
            writeln!(f, "  {} : {:.6}", row, p)?;
        }

        Ok(())
    }

}
