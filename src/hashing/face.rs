//! Face-peeling partition.
//!
//! Space is tiled by hypercubes of side `hypercube_side`. Around their
//! boundaries we peel progressively thinner neighborhoods: a point whose `k`
//! nearest faces are all within `k·ε` is snapped onto the face of co-dimension
//! `k` they span, so buckets are the regions near corners, edges, faces, ...
//! and finally the cell interiors. Any ball of radius ≤ r intersects at most
//! d + 1 buckets, which lets `eval_ball` construct them directly instead of
//! searching.
//!
//! ## Parameters
//! - ε = 2r (coordinate units)
//! - side = 2r · Γ(d) / √d with Γ(d) = 3·d·√d, i.e. side = 3·d·ε
//!
//! Thresholds use strict inequalities throughout; a coordinate exactly `k·ε`
//! from a face is not within `k·ε` of it.

use super::{
    draw_hash_poly, extent_to_u64, normalize_coord, poly_hash, scaled_radius, BucketId,
    HashingScheme, DEFAULT_HASH_POLY, HASH_MOD,
};
use crate::error::{HashingError, Result};
use crate::metric::{IntPoint, Point};
use rand::Rng;

/// Multiplier in Γ(d) = GAMMA_MUL · d · √d. Must be at least 3 for the
/// sandwich bound to hold.
pub const GAMMA_MUL: f64 = 3.0;

#[derive(Clone, Debug, PartialEq)]
pub struct FaceHashing {
    dimension: usize,
    hypercube_side: u64,
    epsilon: u64,
    hash_poly: u64,
    max_radius: f64,
}

/// Opposite face neighborhoods (up to d·ε deep) must not overlap.
fn check_extents(dimension: usize, hypercube_side: u64, epsilon: u64) -> Result<()> {
    let min_side = (2 * dimension as u128) * epsilon as u128;
    if (hypercube_side as u128) <= min_side {
        return Err(HashingError::invalid_argument(format!(
            "hypercube side {hypercube_side} must exceed {min_side}"
        )));
    }
    Ok(())
}

struct AxisOffset {
    axis: usize,
    offset: u64,
    face_distance: u64,
}

impl FaceHashing {
    pub fn new<R: Rng + ?Sized>(
        dimension: usize,
        radius: f64,
        scale: f64,
        rng: &mut R,
    ) -> Result<Self> {
        let max_radius = scaled_radius(dimension, radius, scale)?;
        // 2r·Γ(d)/√d, with the √d cancelled to keep the product exact
        let hypercube_side = extent_to_u64(
            2.0 * max_radius * GAMMA_MUL * dimension as f64,
            "hypercube side",
        )?;
        let epsilon = extent_to_u64(2.0 * max_radius, "face epsilon")?;
        if epsilon == 0 {
            return Err(HashingError::invalid_argument(format!(
                "radius {radius} at scale {scale} yields an empty face neighborhood"
            )));
        }
        check_extents(dimension, hypercube_side, epsilon)?;
        let hash_poly = draw_hash_poly(rng);

        tracing::debug!(
            dimension,
            hypercube_side,
            epsilon,
            max_radius,
            "constructed face hashing"
        );

        Ok(Self {
            dimension,
            hypercube_side,
            epsilon,
            hash_poly,
            max_radius,
        })
    }

    /// Deterministic construction with explicit side and ε. The side must
    /// exceed 2·d·ε so that opposite face neighborhoods never overlap.
    pub fn manual(dimension: usize, hypercube_side: u64, epsilon: u64) -> Result<Self> {
        if dimension == 0 {
            return Err(HashingError::invalid_argument("dimension must be positive"));
        }
        if epsilon == 0 {
            return Err(HashingError::invalid_argument("epsilon must be positive"));
        }
        check_extents(dimension, hypercube_side, epsilon)?;

        Ok(Self {
            dimension,
            hypercube_side,
            epsilon,
            hash_poly: DEFAULT_HASH_POLY,
            max_radius: epsilon as f64 / 2.0,
        })
    }

    pub fn with_hash_poly(mut self, hash_poly: u64) -> Self {
        self.hash_poly = hash_poly;
        self
    }

    pub fn gamma(dimension: usize) -> f64 {
        let d = dimension as f64;
        GAMMA_MUL * d * d.sqrt()
    }

    pub fn hypercube_side(&self) -> u64 {
        self.hypercube_side
    }

    pub fn epsilon(&self) -> u64 {
        self.epsilon
    }

    pub fn hash_poly(&self) -> u64 {
        self.hash_poly
    }

    pub fn hash_mod(&self) -> u64 {
        HASH_MOD
    }

    fn quantized_face_distance(&self, normalized: u64) -> usize {
        let offset = normalized % self.hypercube_side;
        let distance = offset.min(self.hypercube_side - offset);
        (distance / self.epsilon).min(self.dimension as u64) as usize
    }

    /// Co-dimension of the face region `point` falls in: the largest `k` such
    /// that at least `k` axes lie strictly within `k·ε` of a face. Zero means
    /// the cell interior.
    pub fn face_codimension<P: Point>(&self, point: &P) -> usize {
        let mut histogram = vec![0usize; self.dimension + 1];
        for &coord in point.coords().iter().take(self.dimension) {
            histogram[self.quantized_face_distance(normalize_coord(coord))] += 1;
        }

        let mut mul = 0;
        let mut within = 0;
        for threshold in 1..=self.dimension {
            within += histogram[threshold - 1];
            if within >= threshold {
                mul = threshold;
            }
        }
        mul
    }

    fn sorted_axis_offsets(&self, coords: &[i64]) -> Vec<AxisOffset> {
        let mut axes: Vec<AxisOffset> = coords
            .iter()
            .enumerate()
            .map(|(axis, &coord)| {
                let offset = normalize_coord(coord) % self.hypercube_side;
                AxisOffset {
                    axis,
                    offset,
                    face_distance: offset.min(self.hypercube_side - offset),
                }
            })
            .collect();
        axes.sort_by_key(|a| a.face_distance);
        axes
    }

    /// Representative of the bucket of co-dimension `D - face_dim` nearest to
    /// the center, given axes sorted by face distance.
    fn candidate(&self, center: &[i64], axes: &[AxisOffset], face_dim: usize) -> IntPoint {
        let side = self.hypercube_side as i128;
        let eps = self.epsilon as i128;
        let half = (self.hypercube_side / 2) as i128;
        let mul = self.dimension - face_dim;
        let mut closest = IntPoint::from(center);

        for (rank, a) in axes.iter().enumerate() {
            let offset = a.offset as i128;
            let distance = a.face_distance as i128;
            let shift = if rank < mul {
                // pull into the mul·ε neighborhood of the nearest face
                let reach = mul as i128 * eps;
                if distance < reach {
                    0
                } else if offset > half {
                    side - offset - reach + 1
                } else {
                    reach - offset - 1
                }
            } else {
                // push out of the (rank+1)·ε neighborhood
                let reach = (rank as i128 + 1) * eps;
                if distance >= reach {
                    0
                } else if offset > half {
                    side - offset - reach
                } else {
                    reach - offset
                }
            };
            closest[a.axis] = closest[a.axis].wrapping_add(shift as i64);
        }
        closest
    }
}

impl HashingScheme for FaceHashing {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn max_radius(&self) -> f64 {
        self.max_radius
    }

    fn gamma(&self) -> f64 {
        Self::gamma(self.dimension)
    }

    fn hash<P: Point>(&self, point: &P) -> BucketId {
        debug_assert_eq!(point.dimension(), self.dimension, "point dimension mismatch");
        let side = self.hypercube_side;
        let reach = (self.face_codimension(point) as u64).saturating_mul(self.epsilon);

        let half_cells = point.coords().iter().take(self.dimension).map(|&coord| {
            let normalized = normalize_coord(coord);
            let alpha = normalized % side;
            let snapped = if alpha < reach {
                normalized.wrapping_sub(alpha)
            } else if alpha > side - reach {
                normalized.wrapping_add(side - alpha)
            } else {
                normalized.wrapping_add((side + 1) / 2).wrapping_sub(alpha)
            };
            (2 * snapped as u128 / side as u128) as u64
        });
        poly_hash(half_cells, self.hash_poly)
    }

    /// Builds one candidate per face dimension 0..=d and visits the bucket of
    /// every candidate strictly closer than `radius`. O(d²). A zero radius
    /// visits no bucket, not even the center's.
    fn for_each_bucket_in_ball<P, F>(&self, center: &P, radius: f64, mut visit: F)
    where
        P: Point,
        F: FnMut(BucketId),
    {
        let coords = center.coords();
        let axes = self.sorted_axis_offsets(coords);
        let mut found: Vec<BucketId> = Vec::with_capacity(self.dimension + 1);

        for face_dim in 0..=self.dimension {
            let closest = self.candidate(coords, &axes, face_dim);
            if center.distance(&closest) < radius {
                let id = self.hash(&closest);
                if !found.contains(&id) {
                    found.push(id);
                    visit(id);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composable::Count;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    // 2^63 ≡ 8 (mod 90): with side 90, x = -8 is a cell corner.
    const ORIGIN: i64 = -8;

    fn cube() -> FaceHashing {
        FaceHashing::manual(3, 90, 10).unwrap()
    }

    fn at(offsets: [i64; 3]) -> IntPoint {
        IntPoint::new(offsets.iter().map(|o| ORIGIN + o).collect())
    }

    #[test]
    fn test_interior_has_codimension_zero() {
        assert_eq!(cube().face_codimension(&at([45, 45, 45])), 0);
    }

    #[test]
    fn test_single_face() {
        assert_eq!(cube().face_codimension(&at([3, 45, 45])), 1);
    }

    #[test]
    fn test_two_close_faces_select_edge() {
        let face = cube();
        // both within one ε unit, on opposite sides of their cells
        assert_eq!(face.face_codimension(&at([3, 85, 45])), 2);
        // second axis only within 2ε: cumulative count 2 ≥ 2 still holds
        assert_eq!(face.face_codimension(&at([3, 15, 45])), 2);
    }

    #[test]
    fn test_corner() {
        assert_eq!(cube().face_codimension(&at([3, 4, 88])), 3);
    }

    #[test]
    fn test_threshold_is_strict() {
        let face = cube();
        // exactly ε from the face is not within ε
        assert_eq!(face.face_codimension(&at([9, 45, 45])), 1);
        assert_eq!(face.face_codimension(&at([10, 45, 45])), 0);
        // one axis within 2ε is not enough for co-dimension 2
        assert_eq!(face.face_codimension(&at([19, 45, 45])), 0);
    }

    #[test]
    fn test_points_snap_to_same_edge() {
        let face = cube();
        let a = at([3, 85, 45]);
        let b = at([0, 90, 45]);
        let c = at([9, 81, 40]);
        assert_eq!(face.hash(&a), face.hash(&b));
        assert_eq!(face.hash(&a), face.hash(&c));
    }

    #[test]
    fn test_interior_points_share_bucket() {
        let face = cube();
        assert_eq!(face.hash(&at([45, 45, 45])), face.hash(&at([30, 50, 60])));
        assert_ne!(face.hash(&at([45, 45, 45])), face.hash(&at([45, 45, 135])));
    }

    #[test]
    fn test_interior_ball_visits_only_its_cell() {
        let face = cube();
        let center = at([45, 45, 45]);
        assert_eq!(face.buckets_in_ball(&center, 5.0), vec![face.hash(&center)]);
    }

    #[test]
    fn test_ball_near_face_reaches_face_bucket() {
        let face = cube();
        // 12 from the face: the ε-neighborhood is 2 away
        let center = at([12, 45, 45]);
        let buckets = face.buckets_in_ball(&center, 5.0);
        assert_eq!(buckets.len(), 2, "got {buckets:?}");
        assert!(buckets.contains(&face.hash(&center)));
        assert!(buckets.contains(&face.hash(&at([9, 45, 45]))));
    }

    #[test]
    fn test_eval_ball_counts_buckets_once() {
        let face = cube();
        let center = at([12, 45, 45]);
        let values: HashMap<_, _> = face
            .buckets_in_ball(&center, 5.0)
            .into_iter()
            .map(|id| (id, 1u64))
            .collect();
        assert_eq!(face.eval_ball(&center, 5.0, &Count, &values), 2);
        assert_eq!(face.eval_ball(&center, 5.0, &Count, &HashMap::new()), 0);
    }

    #[test]
    fn test_random_construction() {
        let mut rng = StdRng::seed_from_u64(5);
        let face = FaceHashing::new(3, 5.0, 1.0, &mut rng).unwrap();
        assert_eq!(face.epsilon(), 10);
        assert_eq!(face.hypercube_side(), 90);
        assert!((face.gamma() - 9.0 * 3f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_side_beyond_coordinate_range() {
        let mut rng = StdRng::seed_from_u64(5);
        let err = FaceHashing::new(10, 1e18, 1.0, &mut rng).unwrap_err();
        assert!(matches!(err, HashingError::InvalidArgument(_)), "got {err:?}");
    }

    #[test]
    fn test_largest_accepted_radius_hashes() {
        let mut rng = StdRng::seed_from_u64(5);
        let face = FaceHashing::new(10, 3e17, 1.0, &mut rng).unwrap();
        assert!(face.hypercube_side() > 20 * face.epsilon());
        let corner = IntPoint::new(vec![i64::MIN; 10]);
        assert!(face.hash(&corner) < HASH_MOD);
        assert!(face.hash(&IntPoint::new(vec![0; 10])) < HASH_MOD);
    }

    #[test]
    fn test_codimension_reads_only_scheme_axes() {
        let face = cube();
        let mut extended = at([45, 45, 45]).into_coords();
        extended.push(ORIGIN + 1);
        assert_eq!(face.face_codimension(&IntPoint::new(extended)), 0);
    }

    #[test]
    fn test_zero_radius_visits_nothing() {
        let face = cube();
        let center = at([45, 45, 45]);
        assert!(face.buckets_in_ball(&center, 0.0).is_empty());
        let values: HashMap<_, _> = [(face.hash(&center), 7u64)].into_iter().collect();
        assert_eq!(face.eval_ball(&center, 0.0, &Count, &values), 0);
    }

    #[test]
    fn test_rejects_bad_manual_parameters() {
        assert!(FaceHashing::manual(0, 90, 10).is_err());
        assert!(FaceHashing::manual(3, 90, 0).is_err());
        assert!(FaceHashing::manual(3, 60, 10).is_err());
    }
}
