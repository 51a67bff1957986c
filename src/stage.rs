//! Operation descriptors and their kernels.
//!
//! Each descriptor captures one transformation and its parameters. Applying
//! it to a container reads the container's logical values (see
//! [`crate::extract`]) and builds a new `Vec`. The source is never mutated.
//!
//! | Descriptor | Output |
//! |------------|--------|
//! | [`Map`] | `f(value)` for every value |
//! | [`Filter`] | values where `p(value)` holds |
//! | [`Take`] | the first `min(n, len)` values |
//! | [`Skip`] | the values after the first `n` |
//! | [`Reverse`] | values in reverse native order |
//! | [`Keys`] | logical keys |
//! | [`Values`] | logical values |
//!
//! Projection and predicate closures receive the value by reference; annotate
//! the parameter (`|x: &i32| ...`) so the closure is general over the borrow.

use crate::classify::{Container, ReversibleView};
use crate::extract::{KeyOf, ValueOf, keys, values, values_rev};

/// A transformation that can be applied to container `C`.
pub trait Operation<C: Container + ?Sized> {
    type Output;

    /// Consume the descriptor and build the result from `source`.
    fn apply(self, source: &C) -> Self::Output;

    /// The display name of this operation.
    fn name(&self) -> &'static str;
}

/// MAP - project every value through `f`.
#[derive(Debug, Clone, Copy)]
pub struct Map<F>(pub F);

impl<C, F, U> Operation<C> for Map<F>
where
    C: Container + ?Sized,
    F: FnMut(&ValueOf<C>) -> U,
{
    type Output = Vec<U>;

    fn apply(self, source: &C) -> Vec<U> {
        let mut out = Vec::with_capacity(source.entry_count());
        out.extend(values(source).map(self.0));
        out
    }

    fn name(&self) -> &'static str {
        "MAP"
    }
}

/// FILTER - keep values for which `p` holds.
#[derive(Debug, Clone, Copy)]
pub struct Filter<P>(pub P);

impl<C, P> Operation<C> for Filter<P>
where
    C: Container + ?Sized,
    P: FnMut(&ValueOf<C>) -> bool,
    ValueOf<C>: Clone,
{
    type Output = Vec<ValueOf<C>>;

    fn apply(self, source: &C) -> Self::Output {
        let mut predicate = self.0;
        values(source)
            .filter(|value| predicate(*value))
            .cloned()
            .collect()
    }

    fn name(&self) -> &'static str {
        "FILTER"
    }
}

/// TAKE n - keep the first `n` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Take(pub usize);

impl<C> Operation<C> for Take
where
    C: Container + ?Sized,
    ValueOf<C>: Clone,
{
    type Output = Vec<ValueOf<C>>;

    fn apply(self, source: &C) -> Self::Output {
        let mut out = Vec::with_capacity(self.0.min(source.entry_count()));
        out.extend(values(source).take(self.0).cloned());
        out
    }

    fn name(&self) -> &'static str {
        "TAKE"
    }
}

/// SKIP n - drop the first `n` values, keep the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Skip(pub usize);

impl<C> Operation<C> for Skip
where
    C: Container + ?Sized,
    ValueOf<C>: Clone,
{
    type Output = Vec<ValueOf<C>>;

    fn apply(self, source: &C) -> Self::Output {
        let mut out = Vec::with_capacity(source.entry_count().saturating_sub(self.0));
        out.extend(values(source).skip(self.0).cloned());
        out
    }

    fn name(&self) -> &'static str {
        "DROP"
    }
}

/// REVERSE - values in reverse native order.
///
/// Only reversible containers accept it:
///
/// ```compile_fail
/// use adapters_rs::{Pipe, Reverse};
/// use std::collections::HashSet;
///
/// let s: HashSet<i32> = [1, 2, 3].into_iter().collect();
/// let _ = s.pipe(Reverse);
/// ```
///
/// ```compile_fail
/// use adapters_rs::{Pipe, Reverse};
/// use std::collections::HashMap;
///
/// let m: HashMap<&str, i32> = [("a", 1), ("b", 2)].into_iter().collect();
/// let _ = m.pipe(Reverse);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reverse;

impl<C> Operation<C> for Reverse
where
    C: Container + ReversibleView + ?Sized,
    ValueOf<C>: Clone,
{
    type Output = Vec<ValueOf<C>>;

    fn apply(self, source: &C) -> Self::Output {
        let mut out = Vec::with_capacity(source.entry_count());
        out.extend(values_rev(source).cloned());
        out
    }

    fn name(&self) -> &'static str {
        "REVERSE"
    }
}

/// KEYS - logical keys in native order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Keys;

impl<C> Operation<C> for Keys
where
    C: Container + ?Sized,
    KeyOf<C>: Clone,
{
    type Output = Vec<KeyOf<C>>;

    fn apply(self, source: &C) -> Self::Output {
        let mut out = Vec::with_capacity(source.entry_count());
        out.extend(keys(source).cloned());
        out
    }

    fn name(&self) -> &'static str {
        "KEYS"
    }
}

/// VALUES - logical values in native order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Values;

impl<C> Operation<C> for Values
where
    C: Container + ?Sized,
    ValueOf<C>: Clone,
{
    type Output = Vec<ValueOf<C>>;

    fn apply(self, source: &C) -> Self::Output {
        let mut out = Vec::with_capacity(source.entry_count());
        out.extend(values(source).cloned());
        out
    }

    fn name(&self) -> &'static str {
        "VALUES"
    }
}
