//! Integer point types and metric operations consumed by the hashing schemes.
//!
//! Coordinates are signed 64-bit integers. Distances are computed in `f64`
//! after widening each per-axis difference to `i128`, so points anywhere in
//! the coordinate range can be compared without overflow.

use std::fmt::Debug;
use std::ops::{Index, IndexMut};

pub type Coord = i64;
pub type PointId = usize;

/// Trait for points of a fixed-dimension integer lattice.
///
/// The hashing schemes need only the coordinate slice; the distance helpers
/// are provided on top of it.
pub trait Point: Clone + Debug + PartialEq {
    fn coords(&self) -> &[Coord];

    fn dimension(&self) -> usize {
        self.coords().len()
    }

    fn dist_squared<Q: Point>(&self, other: &Q) -> f64 {
        self.coords()
            .iter()
            .zip(other.coords().iter())
            .map(|(&a, &b)| {
                let delta = (a as i128 - b as i128) as f64;
                delta * delta
            })
            .sum()
    }

    fn distance<Q: Point>(&self, other: &Q) -> f64 {
        self.dist_squared(other).sqrt()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IntPoint {
    coords: Vec<Coord>,
}

impl IntPoint {
    pub fn new(coords: Vec<Coord>) -> Self {
        Self { coords }
    }

    pub fn origin(dimension: usize) -> Self {
        Self {
            coords: vec![0; dimension],
        }
    }

    /// Uniform random point in the cube `[-range, range]^dimension`.
    pub fn random<R: rand::Rng + ?Sized>(dimension: usize, range: Coord, rng: &mut R) -> Self {
        let coords = (0..dimension).map(|_| rng.gen_range(-range..=range)).collect();
        Self { coords }
    }

    pub fn coords_mut(&mut self) -> &mut [Coord] {
        &mut self.coords
    }

    pub fn into_coords(self) -> Vec<Coord> {
        self.coords
    }
}

impl From<Vec<Coord>> for IntPoint {
    fn from(coords: Vec<Coord>) -> Self {
        Self::new(coords)
    }
}

impl From<&[Coord]> for IntPoint {
    fn from(coords: &[Coord]) -> Self {
        Self::new(coords.to_vec())
    }
}

impl Index<usize> for IntPoint {
    type Output = Coord;

    fn index(&self, axis: usize) -> &Coord {
        &self.coords[axis]
    }
}

impl IndexMut<usize> for IntPoint {
    fn index_mut(&mut self, axis: usize) -> &mut Coord {
        &mut self.coords[axis]
    }
}

impl Point for IntPoint {
    fn coords(&self) -> &[Coord] {
        &self.coords
    }
}

/// A point carrying an opaque caller identifier. Hashes exactly like its point.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TaggedPoint {
    pub id: PointId,
    pub point: IntPoint,
}

impl TaggedPoint {
    pub fn new(id: PointId, point: IntPoint) -> Self {
        Self { id, point }
    }
}

impl Point for TaggedPoint {
    fn coords(&self) -> &[Coord] {
        self.point.coords()
    }
}

/// Closed Euclidean ball, used to compute exact references for approximate queries.
pub struct MetricBall<'a, P: Point> {
    center: &'a P,
    radius: f64,
}

impl<'a, P: Point> MetricBall<'a, P> {
    pub fn new(center: &'a P, radius: f64) -> Self {
        Self { center, radius }
    }

    pub fn contains<Q: Point>(&self, point: &Q) -> bool {
        self.center.dist_squared(point) <= self.radius * self.radius
    }

    pub fn filter<'b, Q, I>(&self, points: I) -> Vec<&'b Q>
    where
        Q: Point + 'b,
        I: IntoIterator<Item = &'b Q>,
    {
        points.into_iter().filter(|p| self.contains(*p)).collect()
    }
}
