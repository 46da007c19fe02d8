//! Definition of the variable module
//!
//! A `Variable` names a discrete random variable. The values it may take are held by a `Domain`,
//! and the `Domain`s of every `Variable` taking part in one computation are collected in a single
//! `DomainMap` that is shared, read-only, by all the `Factor`s of that computation.

use util::{Result, VarelimError};

use indexmap::IndexMap;
use itertools::Itertools;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;


/// A discrete random variable, identified by its name.
///
/// `Variable`s are ordered by name. That order fixes the axis order of every `Factor` table and
/// the order in which `all_assignments` enumerates a scope.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable(Arc<str>);

impl Variable {

    /// Construct a new `Variable` with the given name
    pub fn new(name: &str) -> Self {
        Variable(Arc::from(name))
    }

    /// Get the name of the `Variable`
    pub fn name(&self) -> &str {
        &self.0
    }

}

impl<'a> From<&'a str> for Variable {

    fn from(name: &'a str) -> Self {
        Variable::new(name)
    }

}

impl fmt::Debug for Variable {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self.name())
    }

}

impl fmt::Display for Variable {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }

}


/// The finite, ordered set of values a `Variable` can take on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Domain {
    values: Vec<String>
}

impl Domain {

    /// Create a new `Domain`
    ///
    /// # Errors
    /// * `VarelimError::EmptyDomain` if no values are given
    /// * `VarelimError::DuplicateValue` if a value is listed twice
    pub fn new<I, S>(values: I) -> Result<Self>
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Err(VarelimError::EmptyDomain);
        }

        if let Some(dup) = values.iter().duplicates().next() {
            return Err(VarelimError::DuplicateValue(dup.clone()));
        }

        Ok(Domain { values })
    }


    /// The two-valued domain `{"0", "1"}`
    pub fn binary() -> Self {
        Domain { values: vec![String::from("0"), String::from("1")] }
    }


    /// The number of values in the `Domain`. Never zero.
    pub fn len(&self) -> usize {
        self.values.len()
    }


    /// `true` if the `Domain` holds exactly one value. A variable with a single-valued domain
    /// carries no uncertainty and is treated as evidence.
    pub fn is_single_valued(&self) -> bool {
        self.values.len() == 1
    }


    /// The values of the `Domain`, in order
    pub fn values(&self) -> &[String] {
        &self.values
    }


    /// Lookup the value at position `idx`
    pub fn value(&self, idx: usize) -> Option<&str> {
        self.values.get(idx).map(String::as_str)
    }


    /// Lookup the position of `value` in the `Domain`
    pub fn position(&self, value: &str) -> Option<usize> {
        self.values.iter().position(|v| v == value)
    }

}


/// The shared mapping from each `Variable` to its `Domain`.
///
/// A `DomainMap` is immutable once built and is shared between `Factor`s through an `Arc`. Build
/// one with a `DomainMapBuilder`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DomainMap {
    domains: IndexMap<Variable, Domain>
}

impl DomainMap {

    /// Lookup the `Domain` of a `Variable`
    pub fn get(&self, var: &Variable) -> Option<&Domain> {
        self.domains.get(var)
    }


    /// Lookup the `Domain` of a `Variable`
    ///
    /// # Errors
    /// * `VarelimError::UnknownVariable` if the `Variable` is not in the map
    pub fn domain(&self, var: &Variable) -> Result<&Domain> {
        self.domains.get(var).ok_or_else(|| VarelimError::UnknownVariable(var.clone()))
    }


    /// Check if the `Variable` has a `Domain` in this map
    pub fn contains(&self, var: &Variable) -> bool {
        self.domains.contains_key(var)
    }


    /// Get all the `Variable`s in the map, in the order they were declared
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.domains.keys()
    }


    /// Get the number of `Variable`s in the map
    pub fn len(&self) -> usize {
        self.domains.len()
    }


    /// Check if the map is empty
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }


    /// Reduce the map with the given evidence.
    ///
    /// # Args
    /// * `evidence`: a partial `Assignment` to the `Variable`s of this map
    ///
    /// # Returns
    /// a new `DomainMap` in which the `Domain` of every observed `Variable` holds only the
    /// observed value. `Domain`s of unobserved `Variable`s are unchanged.
    ///
    /// # Errors
    /// * `VarelimError::UnknownVariable` if the evidence assigns a `Variable` not in the map
    /// * `VarelimError::ValueOutOfRange` if the evidence assigns a value outside a `Domain`
    pub fn with_evidence(&self, evidence: &Assignment) -> Result<DomainMap> {
        for (var, idx) in evidence.iter() {
            let domain = self.domain(var)?;
            if idx >= domain.len() {
                return Err(VarelimError::ValueOutOfRange { variable: var.clone(), index: idx });
            }
        }

        let domains = self.domains
                          .iter()
                          .map(|(var, domain)| {
                              let reduced = match evidence.get(var) {
                                  Some(idx) => Domain { values: vec![domain.values[idx].clone()] },
                                  None => domain.clone()
                              };
                              (var.clone(), reduced)
                          })
                          .collect();

        Ok(DomainMap { domains })
    }

}


/// An implementation of the [builder pattern] for creating a `DomainMap`.
///
/// [builder pattern]: https://en.wikipedia.org/wiki/Builder_pattern
pub struct DomainMapBuilder {

    /// The `Domain`s declared so far
    domains: IndexMap<Variable, Domain>,

    /// The error state of the builder, if any
    err: Option<VarelimError>

}

impl DomainMapBuilder {

    /// Construct a new `DomainMapBuilder`
    pub fn new() -> Self {
        DomainMapBuilder {
            domains: IndexMap::new(),
            err: None
        }
    }


    /// Declare a `Variable` and the values of its `Domain`.
    pub fn with_variable<I, S>(self, var: &Variable, values: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        match Domain::new(values) {
            Ok(domain) => self.with_domain(var, domain),
            Err(e) => self.fail(e)
        }
    }


    /// Declare a `Variable` with an existing `Domain`.
    pub fn with_domain(mut self, var: &Variable, domain: Domain) -> Self {
        if self.err.is_some() {
            return self;
        }

        if self.domains.contains_key(var) {
            return self.fail(VarelimError::DuplicateVariable(var.clone()));
        }

        self.domains.insert(var.clone(), domain);
        self
    }


    /// Build the `DomainMap`
    ///
    /// # Errors
    /// * The first error encountered while declaring `Variable`s, if any
    pub fn build(self) -> Result<DomainMap> {
        match self.err {
            Some(e) => Err(e),
            None => Ok(DomainMap { domains: self.domains })
        }
    }


    fn fail(mut self, err: VarelimError) -> Self {
        if self.err.is_none() {
            self.err = Some(err);
        }
        self
    }

}


/// An assignment of values to `Variable`s. Each value is stored as its position in the
/// `Variable`'s `Domain`.
///
/// An `Assignment` may assign more `Variable`s than a given `Factor` is defined over; the extra
/// entries are ignored by that `Factor`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Assignment {
    values: BTreeMap<Variable, usize>
}

impl Assignment {

    /// Construct a new, empty `Assignment`
    pub fn new() -> Self {
        Assignment { values: BTreeMap::new() }
    }


    /// Assign the value at position `idx` of its `Domain` to `var`.
    ///
    /// # Returns
    /// the previous value of `var`, if any
    pub fn set(&mut self, var: &Variable, idx: usize) -> Option<usize> {
        self.values.insert(var.clone(), idx)
    }


    /// Assign `value` to `var`, looking up its position in `var`'s `Domain`.
    ///
    /// # Errors
    /// * `VarelimError::UnknownVariable` if `var` is not in `domains`
    /// * `VarelimError::UnknownValue` if `value` is not in the `Domain` of `var`
    pub fn set_value(&mut self, var: &Variable, value: &str, domains: &DomainMap) -> Result<()> {
        let idx = domains.domain(var)?
                         .position(value)
                         .ok_or_else(|| VarelimError::UnknownValue {
                             variable: var.clone(),
                             value: String::from(value)
                         })?;

        self.set(var, idx);
        Ok(())
    }


    /// Get the position of the value assigned to `var`, if any
    pub fn get(&self, var: &Variable) -> Option<usize> {
        self.values.get(var).cloned()
    }


    /// Get the value assigned to `var`, if any, as it appears in `var`'s `Domain`
    pub fn value<'a>(&self, var: &Variable, domains: &'a DomainMap) -> Option<&'a str> {
        self.get(var).and_then(|idx| domains.get(var).and_then(|d| d.value(idx)))
    }


    /// Remove the value assigned to `var`
    pub fn remove(&mut self, var: &Variable) -> Option<usize> {
        self.values.remove(var)
    }


    /// Check if `var` is assigned
    pub fn contains(&self, var: &Variable) -> bool {
        self.values.contains_key(var)
    }


    /// Iterate over the assigned `Variable`s and values, ordered by `Variable`
    pub fn iter(&self) -> impl Iterator<Item = (&Variable, usize)> {
        self.values.iter().map(|(v, &idx)| (v, idx))
    }


    /// The number of assigned `Variable`s
    pub fn len(&self) -> usize {
        self.values.len()
    }


    /// Check if no `Variable` is assigned
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

}


/// Iterator over every complete `Assignment` to a scope of `Variable`s.
///
/// `Assignment`s are produced in lexicographic order over the sorted scope: the last `Variable`
/// varies fastest. This is the row-major order of a `Factor` table over the same scope.
#[derive(Clone, Debug)]
pub struct AllAssignments {
    scope: Vec<Variable>,
    cardinalities: Vec<usize>,
    next: Vec<usize>,
    remaining: usize
}

impl AllAssignments {

    /// Enumerate a scope that is already sorted, deduplicated and paired with the size of each
    /// `Variable`'s `Domain`.
    pub(crate) fn over(scope: Vec<Variable>, cardinalities: Vec<usize>) -> Self {
        let remaining = cardinalities.iter().product();
        let next = vec![0; scope.len()];

        AllAssignments { scope, cardinalities, next, remaining }
    }


    /// The `Variable`s being enumerated, in enumeration order
    pub fn scope(&self) -> &[Variable] {
        &self.scope
    }

}

impl Iterator for AllAssignments {

    type Item = Assignment;

    fn next(&mut self) -> Option<Assignment> {
        if self.remaining == 0 {
            return None;
        }

        let mut assignment = Assignment::new();
        for (var, &idx) in self.scope.iter().zip(self.next.iter()) {
            assignment.set(var, idx);
        }

        self.remaining -= 1;

        // advance the odometer, last variable first
        for (idx, &card) in self.next.iter_mut().zip(self.cardinalities.iter()).rev() {
            *idx += 1;
            if *idx < card {
                break;
            }
            *idx = 0;
        }

        Some(assignment)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }

}

impl ExactSizeIterator for AllAssignments {}


/// Enumerate every complete `Assignment` to a scope of `Variable`s.
///
/// # Args
/// * `scope`: the `Variable`s to assign. Order and repetitions do not matter; the scope is
///   enumerated in sorted order.
/// * `domains`: the `DomainMap` holding the `Domain` of each `Variable` in `scope`
///
/// # Returns
/// an iterator over the cross-product of the `Domain`s. Its length is the product of the `Domain`
/// sizes; the empty scope yields a single, empty `Assignment`.
///
/// # Errors
/// * `VarelimError::UnknownVariable` if a `Variable` of `scope` is not in `domains`
pub fn all_assignments<'a, I>(scope: I, domains: &DomainMap) -> Result<AllAssignments>
    where I: IntoIterator<Item = &'a Variable>
{
    let scope: Vec<Variable> = scope.into_iter().cloned().sorted().dedup().collect();
    let cardinalities = scope.iter()
                             .map(|v| domains.domain(v).map(Domain::len))
                             .collect::<Result<Vec<usize>>>()?;

    Ok(AllAssignments::over(scope, cardinalities))
}


// Unit Tests for the variable module
#[cfg(test)]
mod tests {

    use super::*;

    fn domains() -> (Variable, Variable, Variable, DomainMap) {
        let a = Variable::new("A");
        let b = Variable::new("B");
        let c = Variable::new("C");

        let domains = DomainMapBuilder::new().with_variable(&b, vec!["lo", "mid", "hi"])
                                             .with_domain(&a, Domain::binary())
                                             .with_variable(&c, vec!["x", "y"])
                                             .build()
                                             .unwrap();

        (a, b, c, domains)
    }

    #[test]
    fn variable() {
        let v = Variable::new("Foo");
        assert_eq!(v.name(), "Foo");
        assert_eq!(v, Variable::from("Foo"));
        assert!(Variable::new("A") < Variable::new("B"));
        assert_eq!("Foo", format!("{}", v));
    }

    #[test]
    fn domain_errs() {
        let empty: Vec<&str> = vec![];
        assert_eq!(Err(VarelimError::EmptyDomain), Domain::new(empty));
        assert_eq!(
            Err(VarelimError::DuplicateValue(String::from("a"))),
            Domain::new(vec!["a", "b", "a"])
        );
    }

    #[test]
    fn domain_lookup() {
        let d = Domain::new(vec!["sun", "rain"]).unwrap();
        assert_eq!(2, d.len());
        assert!(! d.is_single_valued());
        assert_eq!(Some("rain"), d.value(1));
        assert_eq!(None, d.value(2));
        assert_eq!(Some(0), d.position("sun"));
        assert_eq!(None, d.position("snow"));
    }

    #[test]
    fn builder_errs() {
        let a = Variable::new("A");

        let res = DomainMapBuilder::new().with_domain(&a, Domain::binary())
                                         .with_variable(&a, vec!["x"])
                                         .build();
        match res {
            Err(VarelimError::DuplicateVariable(v)) => assert_eq!(a, v),
            _ => panic!("wrong result for duplicate variable")
        };

        // the first error wins
        let empty: Vec<&str> = vec![];
        let res = DomainMapBuilder::new().with_variable(&a, empty)
                                         .with_domain(&a, Domain::binary())
                                         .with_domain(&a, Domain::binary())
                                         .build();
        assert_eq!(Err(VarelimError::EmptyDomain), res);
    }

    #[test]
    fn assignment() {
        let (a, b, _, domains) = domains();
        let mut assn = Assignment::new();
        assert!(assn.is_empty());

        assert_eq!(None, assn.set(&a, 1));
        assert_eq!(Some(1), assn.set(&a, 0));
        assn.set_value(&b, "hi", &domains).unwrap();

        assert_eq!(Some(0), assn.get(&a));
        assert_eq!(Some(2), assn.get(&b));
        assert_eq!(Some("hi"), assn.value(&b, &domains));
        assert_eq!(2, assn.len());

        match assn.set_value(&b, "max", &domains) {
            Err(VarelimError::UnknownValue { variable, value }) => {
                assert_eq!(b, variable);
                assert_eq!("max", value);
            },
            _ => panic!("wrong result for unknown value")
        };

        let d = Variable::new("D");
        assert_eq!(
            Err(VarelimError::UnknownVariable(d.clone())),
            assn.set_value(&d, "0", &domains)
        );

        assert_eq!(Some(0), assn.remove(&a));
        assert!(! assn.contains(&a));
    }

    #[test]
    fn enumerate() {
        let (a, b, c, domains) = domains();

        // scope order and repetition do not matter
        let scope = vec![c.clone(), a.clone(), b.clone(), a.clone()];
        let assignments: Vec<Assignment> = all_assignments(&scope, &domains).unwrap().collect();
        assert_eq!(12, assignments.len());

        let mut i = 0;
        for (x, y, z) in iproduct!(0..2, 0..3, 0..2) {
            let assn = &assignments[i];
            assert_eq!(3, assn.len());
            assert_eq!(Some(x), assn.get(&a));
            assert_eq!(Some(y), assn.get(&b));
            assert_eq!(Some(z), assn.get(&c));
            i += 1;
        }
    }

    #[test]
    fn enumerate_is_restartable() {
        let (a, b, _, domains) = domains();

        let scope = vec![a, b];
        let iter = all_assignments(&scope, &domains).unwrap();
        assert_eq!(6, iter.len());
        assert_eq!(&scope[..], iter.scope());

        let first: Vec<Assignment> = iter.clone().collect();
        let second: Vec<Assignment> = iter.collect();
        assert_eq!(first, second);

        let third: Vec<Assignment> = all_assignments(&scope, &domains).unwrap().collect();
        assert_eq!(first, third);
    }

    #[test]
    fn enumerate_empty_scope() {
        let (_, _, _, domains) = domains();

        let scope: Vec<Variable> = Vec::new();
        let assignments: Vec<Assignment> = all_assignments(&scope, &domains).unwrap().collect();
        assert_eq!(vec![Assignment::new()], assignments);
    }

    #[test]
    fn enumerate_unknown_variable() {
        let (a, _, _, domains) = domains();
        let d = Variable::new("D");

        match all_assignments(&[a, d.clone()], &domains) {
            Err(VarelimError::UnknownVariable(v)) => assert_eq!(d, v),
            _ => panic!("wrong result for unknown variable")
        };
    }

    #[test]
    fn evidence() {
        let (a, b, c, domains) = domains();

        let mut evidence = Assignment::new();
        evidence.set_value(&b, "mid", &domains).unwrap();

        let reduced = domains.with_evidence(&evidence).unwrap();
        assert_eq!(3, reduced.len());
        assert_eq!(vec!["mid"], reduced.domain(&b).unwrap().values());
        assert!(reduced.domain(&b).unwrap().is_single_valued());
        assert_eq!(domains.domain(&a), reduced.domain(&a));
        assert_eq!(domains.domain(&c), reduced.domain(&c));

        // declaration order is preserved
        let order: Vec<&Variable> = reduced.variables().collect();
        assert_eq!(vec![&b, &a, &c], order);

        let mut evidence = Assignment::new();
        evidence.set(&b, 3);
        match domains.with_evidence(&evidence) {
            Err(VarelimError::ValueOutOfRange { variable, index }) => {
                assert_eq!(b, variable);
                assert_eq!(3, index);
            },
            _ => panic!("wrong result for out of range evidence")
        };
    }

}
