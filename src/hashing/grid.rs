//! Uniform grid partition.
//!
//! Space is cut into axis-aligned hypercubes of side `cell_size`, shifted per
//! axis by a random offset. A ball query walks the cell adjacency graph
//! breadth-first from the center's cell, only expanding into cells whose box
//! intersects the query ball.
//!
//! ## Cell size vs distortion
//!
//! With side 2r the cell diameter is 2r·√d and Γ = √d holds exactly. This
//! implementation uses side 2·d·r instead: far fewer buckets and a cheaper BFS
//! in practice, at the price of a weaker provable bound. The query itself
//! still visits every cell touching the ball.
//!
//! ## Complexity
//! - `hash`: O(d)
//! - `eval_ball`: O(K · d²) for K cells touching the ball; K can reach 2^d.

use super::{
    draw_hash_poly, extent_to_u64, normalize_coord, poly_hash, scaled_radius, BucketId,
    HashingScheme, DEFAULT_HASH_POLY, HASH_MOD,
};
use crate::error::{HashingError, Result};
use crate::metric::{IntPoint, Point};
use rand::Rng;
use std::collections::{HashSet, VecDeque};

#[derive(Clone, Debug, PartialEq)]
pub struct GridHashing {
    dimension: usize,
    cell_size: u64,
    offsets: Vec<u64>,
    hash_poly: u64,
    max_radius: f64,
}

impl GridHashing {
    /// Builds a randomly aligned grid for queries of radius up to `radius`.
    pub fn new<R: Rng + ?Sized>(
        dimension: usize,
        radius: f64,
        scale: f64,
        rng: &mut R,
    ) -> Result<Self> {
        let max_radius = scaled_radius(dimension, radius, scale)?;
        let cell_size = extent_to_u64(dimension as f64 * 2.0 * max_radius, "grid cell size")?;
        if cell_size == 0 {
            return Err(HashingError::invalid_argument(format!(
                "radius {radius} at scale {scale} yields an empty grid cell"
            )));
        }

        let offsets = (0..dimension).map(|_| rng.gen::<u64>()).collect();
        let hash_poly = draw_hash_poly(rng);

        tracing::debug!(dimension, cell_size, max_radius, "constructed grid hashing");

        Ok(Self {
            dimension,
            cell_size,
            offsets,
            hash_poly,
            max_radius,
        })
    }

    /// Deterministic construction with an explicit cell size and optional
    /// offsets (zero when `None`). Uses [`DEFAULT_HASH_POLY`].
    pub fn manual(dimension: usize, cell_size: u64, offsets: Option<Vec<u64>>) -> Result<Self> {
        if dimension == 0 {
            return Err(HashingError::invalid_argument("dimension must be positive"));
        }
        if cell_size == 0 {
            return Err(HashingError::invalid_argument("cell size must be positive"));
        }
        let offsets = offsets.unwrap_or_else(|| vec![0; dimension]);
        if offsets.len() != dimension {
            return Err(HashingError::invalid_argument(format!(
                "expected {dimension} offsets, got {}",
                offsets.len()
            )));
        }

        Ok(Self {
            dimension,
            cell_size,
            offsets,
            hash_poly: DEFAULT_HASH_POLY,
            max_radius: cell_size as f64 / (2.0 * dimension as f64),
        })
    }

    pub fn with_hash_poly(mut self, hash_poly: u64) -> Self {
        self.hash_poly = hash_poly;
        self
    }

    pub fn gamma(dimension: usize) -> f64 {
        (dimension as f64).sqrt()
    }

    pub fn cell_size(&self) -> u64 {
        self.cell_size
    }

    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    pub fn hash_poly(&self) -> u64 {
        self.hash_poly
    }

    pub fn hash_mod(&self) -> u64 {
        HASH_MOD
    }

    fn normalized(&self, point: &[i64], axis: usize) -> u64 {
        normalize_coord(point[axis]).wrapping_add(self.offsets[axis])
    }

    /// Per-axis cell indices of `point`.
    pub fn cell_of<P: Point>(&self, point: &P) -> Vec<u64> {
        point
            .coords()
            .iter()
            .take(self.dimension)
            .zip(&self.offsets)
            .map(|(&coord, &offset)| {
                normalize_coord(coord).wrapping_add(offset) / self.cell_size
            })
            .collect()
    }

    /// Whether the cell containing `cell_point` intersects the closed ball
    /// B(center, radius).
    ///
    /// Moves `cell_point` per axis to the cell boundary nearest to `center`
    /// and compares squared distances. Along axes where `cell_point` equals
    /// the center coordinate the point is left in place, so the test is exact
    /// for points reached from the center by whole-cell steps.
    pub fn bucket_sphere_intersect<P: Point>(
        &self,
        center: &P,
        radius: f64,
        mut cell_point: IntPoint,
    ) -> bool {
        let center_coords = center.coords();
        for axis in 0..self.dimension {
            let offset = self.normalized(cell_point.coords(), axis) % self.cell_size;
            let coord = cell_point[axis];
            if coord > center_coords[axis] {
                cell_point[axis] = coord.wrapping_sub_unsigned(offset);
            } else if coord < center_coords[axis] {
                cell_point[axis] = coord.wrapping_add_unsigned(self.cell_size - offset - 1);
            }
        }
        center.dist_squared(&cell_point) <= radius * radius
    }
}

impl HashingScheme for GridHashing {
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
        poly_hash(self.cell_of(point), self.hash_poly)
    }

    /// Breadth-first search over axis-adjacent cells, starting at the
    /// center's cell. Cells are deduplicated by bucket id, which also bounds
    /// the search when distinct cells collide.
    fn for_each_bucket_in_ball<P, F>(&self, center: &P, radius: f64, mut visit: F)
    where
        P: Point,
        F: FnMut(BucketId),
    {
        let mut frontier = VecDeque::new();
        frontier.push_back(IntPoint::from(center.coords()));
        let mut found = HashSet::new();

        while let Some(cell_point) = frontier.pop_front() {
            let id = self.hash(&cell_point);
            if !found.insert(id) {
                continue;
            }
            visit(id);

            for axis in 0..self.dimension {
                for step_up in [false, true] {
                    let mut neighbor = cell_point.clone();
                    neighbor[axis] = if step_up {
                        neighbor[axis].wrapping_add_unsigned(self.cell_size)
                    } else {
                        neighbor[axis].wrapping_sub_unsigned(self.cell_size)
                    };
                    if self.bucket_sphere_intersect(center, radius, neighbor.clone()) {
                        frontier.push_back(neighbor);
                    }
                }
            }
        }
    }
}
