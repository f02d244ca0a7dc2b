//! A small Mongo-style query predicate, shared by `filter`, `while`,
//! `until`, `every`, and `some`.
//!
//! The source this crate generalizes lets callers pass either a plain
//! closure or a query object of the shape `{ $lt: v, $in: [..], ... }`.
//! Rust has no duck-typed object literals, so the two forms become two
//! variants of one enum: `Predicate::Fn` wraps a closure, `Predicate::Query`
//! wraps this mini-DSL. Both implement the same `matches` entry point so
//! call sites never need to know which form they hold.

use std::cmp::Ordering;

/// A comparison-based predicate over `T`, modeled after Mongo's query
/// operators. `T` must support equality and ordering for the operators
/// that need them; operators that don't apply to a given `T` (e.g. `$lt`
/// on a type with no `PartialOrd`) are simply unreachable for that `T`.
pub enum Query<T> {
    Lt(T),
    Lte(T),
    Gt(T),
    Gte(T),
    Eq(T),
    Ne(T),
    In(Vec<T>),
    Nin(Vec<T>),
    /// All of the given queries must match (implicit `$and`).
    And(Vec<Query<T>>),
    /// Any of the given queries must match (`$or`).
    Or(Vec<Query<T>>),
}

impl<T: PartialOrd + PartialEq> Query<T> {
    #[must_use]
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Self::Lt(bound) => matches!(value.partial_cmp(bound), Some(Ordering::Less)),
            Self::Lte(bound) => !matches!(value.partial_cmp(bound), Some(Ordering::Greater) | None),
            Self::Gt(bound) => matches!(value.partial_cmp(bound), Some(Ordering::Greater)),
            Self::Gte(bound) => !matches!(value.partial_cmp(bound), Some(Ordering::Less) | None),
            Self::Eq(bound) => value == bound,
            Self::Ne(bound) => value != bound,
            Self::In(set) => set.iter().any(|b| b == value),
            Self::Nin(set) => !set.iter().any(|b| b == value),
            Self::And(qs) => qs.iter().all(|q| q.matches(value)),
            Self::Or(qs) => qs.iter().any(|q| q.matches(value)),
        }
    }
}

/// Either a closure or a [`Query`]; the shared argument type of `filter`,
/// `while`, `until`, `every`, and `some`.
pub enum Predicate<T> {
    Fn(Box<dyn FnMut(&T) -> bool + Send>),
    Query(Query<T>),
}

impl<T: PartialOrd + PartialEq> Predicate<T> {
    pub fn matches(&mut self, value: &T) -> bool {
        match self {
            Self::Fn(f) => f(value),
            Self::Query(q) => q.matches(value),
        }
    }
}

impl<T, F> From<F> for Predicate<T>
where
    F: FnMut(&T) -> bool + Send + 'static,
{
    fn from(f: F) -> Self {
        Self::Fn(Box::new(f))
    }
}

impl<T> From<Query<T>> for Predicate<T> {
    fn from(q: Query<T>) -> Self {
        Self::Query(q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_operators_match_expected_values() {
        assert!(Query::Lt(5).matches(&3));
        assert!(!Query::Lt(5).matches(&5));
        assert!(Query::Lte(5).matches(&5));
        assert!(Query::Gt(5).matches(&6));
        assert!(Query::Gte(5).matches(&5));
        assert!(Query::Eq(5).matches(&5));
        assert!(Query::Ne(5).matches(&6));
        assert!(Query::In(vec![1, 2, 3]).matches(&2));
        assert!(!Query::In(vec![1, 2, 3]).matches(&4));
        assert!(Query::Nin(vec![1, 2, 3]).matches(&4));
    }

    #[test]
    fn query_and_or_compose() {
        let and = Query::And(vec![Query::Gte(2), Query::Lte(8)]);
        assert!(and.matches(&5));
        assert!(!and.matches(&1));

        let or = Query::Or(vec![Query::Lt(2), Query::Gt(8)]);
        assert!(or.matches(&0));
        assert!(or.matches(&9));
        assert!(!or.matches(&5));
    }

    #[test]
    fn predicate_wraps_closure_or_query() {
        let mut closure_pred: Predicate<i32> = (|v: &i32| *v % 2 == 0).into();
        assert!(closure_pred.matches(&4));
        assert!(!closure_pred.matches(&3));

        let mut query_pred: Predicate<i32> = Query::Gt(10).into();
        assert!(query_pred.matches(&11));
        assert!(!query_pred.matches(&10));
    }
}
