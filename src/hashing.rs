//! Consistent geometric hashing: the shared contract and arithmetic.
//!
//! A hashing scheme partitions the integer lattice ℤᵈ into buckets. For a
//! construction radius r and a scheme constant Γ(d), a ball query enumerates
//! a set of buckets A(c, r') for any r' ≤ r such that
//!
//! ```text
//!     B_P(c, r') ⊆ A_P(c, r') ⊆ B(c, 3Γr)
//! ```
//!
//! i.e. every bucket touching the exact ball is visited, and every visited
//! bucket lies inside the expanded ball.
//!
//! ## Normalization
//!
//! Signed coordinates are shifted into `u64` by subtracting `i64::MIN`
//! (flipping the sign bit), so the partition is translation-consistent across
//! zero. Scheme-specific offsets are then added with wrapping arithmetic.
//!
//! ## Bucket ids
//!
//! Per-axis cell indices are folded with Horner's rule modulo the Mersenne
//! prime 2³¹ − 1 using a random base. Products are widened to `u128` and each
//! index is reduced before addition, so no intermediate step overflows.
//! Distinct cells may share an id; that is accepted as a hashing artifact.

pub mod face;
pub mod grid;

use crate::composable::Composable;
use crate::error::{HashingError, Result};
use crate::metric::{Coord, Point};
use rand::Rng;
use std::collections::HashMap;

pub use face::FaceHashing;
pub use grid::GridHashing;

pub type BucketId = u64;

/// Modulus of the polynomial bucket hash, shared by every scheme.
pub const HASH_MOD: u64 = 2_147_483_647;

/// Factor converting a real-valued radius into integer coordinate units.
pub const DEFAULT_SCALE: f64 = 1.0;

/// Polynomial base used by the manual constructors.
pub const DEFAULT_HASH_POLY: u64 = 31;

pub trait HashingScheme {
    fn dimension(&self) -> usize;

    /// Largest query radius (coordinate units) for which the sandwich bound holds.
    fn max_radius(&self) -> f64;

    /// Distortion constant Γ(d) of this scheme.
    fn gamma(&self) -> f64;

    /// Bucket of `point`. Pure; O(d).
    fn hash<P: Point>(&self, point: &P) -> BucketId;

    /// Calls `visit` once for every distinct bucket that may intersect
    /// B(center, radius), in the scheme's traversal order.
    fn for_each_bucket_in_ball<P, F>(&self, center: &P, radius: f64, visit: F)
    where
        P: Point,
        F: FnMut(BucketId);

    fn buckets_in_ball<P: Point>(&self, center: &P, radius: f64) -> Vec<BucketId> {
        let mut buckets = Vec::new();
        self.for_each_bucket_in_ball(center, radius, |id| buckets.push(id));
        buckets
    }

    /// Evaluates the composable `f` on the approximate ball A(center, radius).
    ///
    /// Starts from `f.identity()` and folds the value of every visited bucket
    /// present in `bucket_values`. Missing buckets do not contribute.
    /// `radius` must not exceed [`HashingScheme::max_radius`]; this is not
    /// checked here, see [`HashingScheme::checked_eval_ball`].
    ///
    /// The face scheme only visits buckets strictly closer than `radius`, so
    /// with `radius == 0.0` it visits nothing and returns `f.identity()`; the
    /// grid still visits the center's bucket.
    fn eval_ball<P, C>(
        &self,
        center: &P,
        radius: f64,
        f: &C,
        bucket_values: &HashMap<BucketId, C::Value>,
    ) -> C::Value
    where
        P: Point,
        C: Composable,
    {
        let mut result = f.identity();
        let mut visited = 0usize;
        let mut folded = 0usize;

        self.for_each_bucket_in_ball(center, radius, |id| {
            visited += 1;
            if let Some(value) = bucket_values.get(&id) {
                folded += 1;
                result = f.compose(std::mem::replace(&mut result, f.identity()), value);
            }
        });

        tracing::trace!(radius, visited, folded, "evaluated approximate ball");
        result
    }

    /// Like [`HashingScheme::eval_ball`], but validates the center's
    /// dimension and the radius first.
    fn checked_eval_ball<P, C>(
        &self,
        center: &P,
        radius: f64,
        f: &C,
        bucket_values: &HashMap<BucketId, C::Value>,
    ) -> Result<C::Value>
    where
        P: Point,
        C: Composable,
    {
        check_dimension(self.dimension(), center)?;
        if radius.is_nan() || radius < 0.0 || radius > self.max_radius() {
            tracing::warn!(radius, max_radius = self.max_radius(), "rejected ball query");
            return Err(HashingError::RadiusExceeded {
                radius,
                max_radius: self.max_radius(),
            });
        }
        Ok(self.eval_ball(center, radius, f, bucket_values))
    }
}

/// Shifts a signed coordinate into the unsigned domain, preserving order.
#[inline]
pub(crate) fn normalize_coord(coord: Coord) -> u64 {
    (coord as u64).wrapping_sub(i64::MIN as u64)
}

/// Horner's rule modulo [`HASH_MOD`] with base `poly`.
pub(crate) fn poly_hash<I>(cells: I, poly: u64) -> BucketId
where
    I: IntoIterator<Item = u64>,
{
    let modulus = HASH_MOD as u128;
    cells.into_iter().fold(0u64, |hash, cell| {
        let shifted = (hash as u128 * poly as u128) % modulus;
        ((shifted + (cell % HASH_MOD) as u128) % modulus) as u64
    })
}

pub(crate) fn draw_hash_poly<R: Rng + ?Sized>(rng: &mut R) -> u64 {
    rng.gen_range(2..=i32::MAX as u64)
}

/// Validates construction parameters and returns the radius in coordinate units.
pub(crate) fn scaled_radius(dimension: usize, radius: f64, scale: f64) -> Result<f64> {
    if dimension == 0 {
        return Err(HashingError::invalid_argument("dimension must be positive"));
    }
    if !radius.is_finite() || radius <= 0.0 {
        return Err(HashingError::invalid_argument(format!(
            "radius must be positive and finite, got {radius}"
        )));
    }
    if !scale.is_finite() || scale <= 0.0 {
        return Err(HashingError::invalid_argument(format!(
            "scale must be positive and finite, got {scale}"
        )));
    }
    Ok(radius * scale)
}

/// Converts a cell extent to `u64`, rejecting extents the type cannot hold.
pub(crate) fn extent_to_u64(extent: f64, what: &str) -> Result<u64> {
    if extent.is_nan() || extent >= u64::MAX as f64 {
        return Err(HashingError::invalid_argument(format!(
            "{what} {extent} exceeds the coordinate range"
        )));
    }
    Ok(extent as u64)
}

pub(crate) fn check_dimension<P: Point>(expected: usize, point: &P) -> Result<()> {
    let found = point.dimension();
    if found != expected {
        return Err(HashingError::DimensionMismatch { expected, found });
    }
    Ok(())
}
