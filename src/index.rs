//! Bucketed pre-aggregation and approximate range queries.
//!
//! A [`BucketIndex`] hashes every inserted point once and folds its value into
//! the value of its bucket. A query then evaluates the composable over the
//! buckets the scheme enumerates for the ball:
//!
//! ```text
//!     query(c, r) = ⊕ { value(b) : b ∈ A(c, r) }
//! ```
//!
//! which covers every point within r of c and nothing outside the scheme's
//! expanded ball.

use crate::composable::Composable;
use crate::error::Result;
use crate::hashing::{check_dimension, BucketId, HashingScheme};
use crate::metric::Point;
use std::collections::HashMap;

pub struct BucketIndex<S, C>
where
    S: HashingScheme,
    C: Composable,
{
    scheme: S,
    composable: C,
    bucket_values: HashMap<BucketId, C::Value>,
    num_points: usize,
}

impl<S, C> BucketIndex<S, C>
where
    S: HashingScheme,
    C: Composable,
{
    pub fn new(scheme: S, composable: C) -> Self {
        Self {
            scheme,
            composable,
            bucket_values: HashMap::new(),
            num_points: 0,
        }
    }

    /// Builds an index from `(point, value)` pairs.
    pub fn from_points<P, I>(scheme: S, composable: C, points: I) -> Result<Self>
    where
        P: Point,
        I: IntoIterator<Item = (P, C::Value)>,
    {
        let mut index = Self::new(scheme, composable);
        for (point, value) in points {
            index.insert(&point, value)?;
        }
        tracing::debug!(
            points = index.num_points,
            buckets = index.bucket_values.len(),
            "built bucket index"
        );
        Ok(index)
    }

    /// Folds `value` into the bucket of `point` and returns that bucket.
    pub fn insert<P: Point>(&mut self, point: &P, value: C::Value) -> Result<BucketId> {
        check_dimension(self.scheme.dimension(), point)?;
        let id = self.scheme.hash(point);
        let composable = &self.composable;
        let slot = self
            .bucket_values
            .entry(id)
            .or_insert_with(|| composable.identity());
        *slot = composable.compose(std::mem::replace(slot, composable.identity()), &value);
        self.num_points += 1;
        Ok(id)
    }

    /// Approximate aggregate over B(center, radius). Fails if the center has
    /// the wrong dimension or `radius` exceeds the scheme's construction radius.
    pub fn query<P: Point>(&self, center: &P, radius: f64) -> Result<C::Value> {
        self.scheme
            .checked_eval_ball(center, radius, &self.composable, &self.bucket_values)
    }

    pub fn scheme(&self) -> &S {
        &self.scheme
    }

    pub fn bucket_values(&self) -> &HashMap<BucketId, C::Value> {
        &self.bucket_values
    }

    pub fn bucket_value(&self, id: BucketId) -> Option<&C::Value> {
        self.bucket_values.get(&id)
    }

    pub fn num_buckets(&self) -> usize {
        self.bucket_values.len()
    }

    pub fn num_points(&self) -> usize {
        self.num_points
    }

    pub fn is_empty(&self) -> bool {
        self.num_points == 0
    }
}
