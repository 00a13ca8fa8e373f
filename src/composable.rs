//! Associative combine operations used to fold per-bucket aggregates.
//!
//! A [`Composable`] supplies an identity value and a `compose` step. Query
//! traversal order differs between schemes (BFS discovery order for the grid,
//! increasing face dimension for the face scheme), so results agree across
//! schemes only when `compose` is commutative as well as associative. Every
//! stock implementation here is.

use crate::metric::PointId;
use std::collections::BTreeSet;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::ops::Add;

pub trait Composable {
    type Value: Clone;

    fn identity(&self) -> Self::Value;

    fn compose(&self, acc: Self::Value, value: &Self::Value) -> Self::Value;

    fn fold<'a, I>(&self, values: I) -> Self::Value
    where
        I: IntoIterator<Item = &'a Self::Value>,
        Self::Value: 'a,
    {
        values
            .into_iter()
            .fold(self.identity(), |acc, v| self.compose(acc, v))
    }
}

/// Sum over any additive type with a zero default.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sum<T>(PhantomData<T>);

impl<T> Sum<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Composable for Sum<T>
where
    T: Clone + Default + Add<Output = T>,
{
    type Value = T;

    fn identity(&self) -> T {
        T::default()
    }

    fn compose(&self, acc: T, value: &T) -> T {
        acc + value.clone()
    }
}

/// Number of points: per-bucket values are counts. Saturates at `u64::MAX`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Count;

impl Composable for Count {
    type Value = u64;

    fn identity(&self) -> u64 {
        0
    }

    fn compose(&self, acc: u64, value: &u64) -> u64 {
        acc.saturating_add(*value)
    }
}

/// Minimum; `None` is the identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct Min<T>(PhantomData<T>);

impl<T> Min<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: Clone + PartialOrd> Composable for Min<T> {
    type Value = Option<T>;

    fn identity(&self) -> Option<T> {
        None
    }

    fn compose(&self, acc: Option<T>, value: &Option<T>) -> Option<T> {
        match (acc, value) {
            (Some(a), Some(b)) if *b < a => Some(b.clone()),
            (Some(a), _) => Some(a),
            (None, v) => v.clone(),
        }
    }
}

/// Maximum; `None` is the identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct Max<T>(PhantomData<T>);

impl<T> Max<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: Clone + PartialOrd> Composable for Max<T> {
    type Value = Option<T>;

    fn identity(&self) -> Option<T> {
        None
    }

    fn compose(&self, acc: Option<T>, value: &Option<T>) -> Option<T> {
        match (acc, value) {
            (Some(a), Some(b)) if *b > a => Some(b.clone()),
            (Some(a), _) => Some(a),
            (None, v) => v.clone(),
        }
    }
}

/// Set union of point ids. Useful for recovering which points a query covered.
#[derive(Debug, Clone, Copy, Default)]
pub struct Union;

impl Composable for Union {
    type Value = BTreeSet<PointId>;

    fn identity(&self) -> BTreeSet<PointId> {
        BTreeSet::new()
    }

    fn compose(&self, mut acc: BTreeSet<PointId>, value: &BTreeSet<PointId>) -> BTreeSet<PointId> {
        acc.extend(value.iter().copied());
        acc
    }
}

/// Composable built from an identity value and a closure.
///
/// The caller is responsible for `compose` being associative (and commutative
/// if results must not depend on the scheme).
pub struct FnComposable<T, F> {
    identity: T,
    compose: F,
}

impl<T, F> FnComposable<T, F>
where
    T: Clone,
    F: Fn(T, &T) -> T,
{
    pub fn new(identity: T, compose: F) -> Self {
        Self { identity, compose }
    }
}

impl<T: Debug, F> Debug for FnComposable<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnComposable")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

impl<T, F> Composable for FnComposable<T, F>
where
    T: Clone,
    F: Fn(T, &T) -> T,
{
    type Value = T;

    fn identity(&self) -> T {
        self.identity.clone()
    }

    fn compose(&self, acc: T, value: &T) -> T {
        (self.compose)(acc, value)
    }
}
