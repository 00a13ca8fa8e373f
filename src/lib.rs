//! # consistent_geohash: Consistent Geometric Hashing
//!
//! Deterministic partitions of the integer lattice ℤᵈ into buckets that
//! support approximate ball aggregation: data is bucketed once, each bucket
//! holds a pre-aggregated value, and a ball query combines the values of the
//! buckets it enumerates.
//!
//! ## Guarantee
//!
//! For a scheme constructed with radius r and distortion constant Γ(d), and
//! any query radius r' ≤ r:
//!
//! ```text
//!     B_P(c, r') ⊆ A_P(c, r') ⊆ B(c, 3Γr)
//! ```
//!
//! - every bucket touching the exact ball is visited
//! - every visited bucket lies within the expanded ball
//!
//! ## Schemes
//!
//! ### GridHashing (Γ = √d)
//! - Randomly shifted hypercube grid, side 2·d·r
//! - Ball query: BFS over axis-adjacent cells, O(2^d · d²) worst case
//!
//! ### FaceHashing (Γ = 3·d·√d)
//! - Hypercubes with peeled neighborhoods of faces, edges, corners, ...
//! - A ball meets at most d + 1 buckets; the query builds them directly in O(d²)
//!
//! ## Usage
//!
//! ```
//! use consistent_geohash::*;
//!
//! let config = HashingConfig::new(HashingSchemeChoice::Face, 2, 4.0).with_seed(7);
//! let scheme = config.build().unwrap();
//!
//! let points = vec![
//!     (IntPoint::new(vec![0, 0]), 1u64),
//!     (IntPoint::new(vec![1, 2]), 1u64),
//!     (IntPoint::new(vec![500, 500]), 1u64),
//! ];
//! let index = BucketIndex::from_points(scheme, Count, points).unwrap();
//! let near_origin = index.query(&IntPoint::new(vec![0, 1]), 3.0).unwrap();
//! assert!(near_origin >= 2);
//! ```
//!
//! ## Combine operations
//!
//! Buckets are folded in a scheme-dependent order. Use a commutative
//! [`Composable`] when results must not depend on the scheme.

pub mod composable;
pub mod config;
pub mod error;
pub mod hashing;
pub mod index;
pub mod metric;
pub mod scheme;

pub use composable::{Composable, Count, FnComposable, Max, Min, Sum, Union};
pub use config::HashingConfig;
pub use error::{HashingError, Result};
pub use hashing::{
    BucketId, FaceHashing, GridHashing, HashingScheme, DEFAULT_SCALE, HASH_MOD,
};
pub use index::BucketIndex;
pub use metric::{Coord, IntPoint, MetricBall, Point, PointId, TaggedPoint};
pub use scheme::{
    choose_hashing_scheme, get_gamma, make_hashing_scheme, AnyHashingScheme, HashingSchemeChoice,
};
