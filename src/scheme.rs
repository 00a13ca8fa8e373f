//! Scheme selection: the enumerated choice, Γ lookup and the factory.

use crate::composable::Composable;
use crate::error::{HashingError, Result};
use crate::hashing::{BucketId, FaceHashing, GridHashing, HashingScheme};
use crate::metric::Point;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashingSchemeChoice {
    #[serde(rename = "grid_hashing", alias = "grid")]
    Grid,
    #[serde(rename = "face_hashing", alias = "face")]
    Face,
}

impl HashingSchemeChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashingSchemeChoice::Grid => "grid_hashing",
            HashingSchemeChoice::Face => "face_hashing",
        }
    }
}

impl fmt::Display for HashingSchemeChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashingSchemeChoice {
    type Err = HashingError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "grid_hashing" | "grid" => Ok(HashingSchemeChoice::Grid),
            "face_hashing" | "face" => Ok(HashingSchemeChoice::Face),
            other => Err(HashingError::invalid_argument(format!(
                "unsupported hashing scheme: {other:?}"
            ))),
        }
    }
}

/// Parses a scheme name: `grid_hashing`/`grid` or `face_hashing`/`face`.
pub fn choose_hashing_scheme(choice: &str) -> Result<HashingSchemeChoice> {
    choice.parse()
}

/// Distortion constant Γ(dimension) of a scheme. Construct with
/// `radius = query_radius / Γ` to cover queries of `query_radius`.
pub fn get_gamma(choice: HashingSchemeChoice, dimension: usize) -> f64 {
    match choice {
        HashingSchemeChoice::Grid => GridHashing::gamma(dimension),
        HashingSchemeChoice::Face => FaceHashing::gamma(dimension),
    }
}

/// Either scheme behind one static interface.
#[derive(Clone, Debug, PartialEq)]
pub enum AnyHashingScheme {
    Grid(GridHashing),
    Face(FaceHashing),
}

impl AnyHashingScheme {
    pub fn choice(&self) -> HashingSchemeChoice {
        match self {
            AnyHashingScheme::Grid(_) => HashingSchemeChoice::Grid,
            AnyHashingScheme::Face(_) => HashingSchemeChoice::Face,
        }
    }
}

impl From<GridHashing> for AnyHashingScheme {
    fn from(scheme: GridHashing) -> Self {
        AnyHashingScheme::Grid(scheme)
    }
}

impl From<FaceHashing> for AnyHashingScheme {
    fn from(scheme: FaceHashing) -> Self {
        AnyHashingScheme::Face(scheme)
    }
}

pub fn make_hashing_scheme<R: Rng + ?Sized>(
    choice: HashingSchemeChoice,
    dimension: usize,
    radius: f64,
    scale: f64,
    rng: &mut R,
) -> Result<AnyHashingScheme> {
    Ok(match choice {
        HashingSchemeChoice::Grid => GridHashing::new(dimension, radius, scale, rng)?.into(),
        HashingSchemeChoice::Face => FaceHashing::new(dimension, radius, scale, rng)?.into(),
    })
}

impl HashingScheme for AnyHashingScheme {
    fn dimension(&self) -> usize {
        match self {
            AnyHashingScheme::Grid(s) => s.dimension(),
            AnyHashingScheme::Face(s) => s.dimension(),
        }
    }

    fn max_radius(&self) -> f64 {
        match self {
            AnyHashingScheme::Grid(s) => s.max_radius(),
            AnyHashingScheme::Face(s) => s.max_radius(),
        }
    }

    fn gamma(&self) -> f64 {
        get_gamma(self.choice(), self.dimension())
    }

    fn hash<P: Point>(&self, point: &P) -> BucketId {
        match self {
            AnyHashingScheme::Grid(s) => s.hash(point),
            AnyHashingScheme::Face(s) => s.hash(point),
        }
    }

    fn for_each_bucket_in_ball<P, F>(&self, center: &P, radius: f64, visit: F)
    where
        P: Point,
        F: FnMut(BucketId),
    {
        match self {
            AnyHashingScheme::Grid(s) => s.for_each_bucket_in_ball(center, radius, visit),
            AnyHashingScheme::Face(s) => s.for_each_bucket_in_ball(center, radius, visit),
        }
    }

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
        match self {
            AnyHashingScheme::Grid(s) => s.eval_ball(center, radius, f, bucket_values),
            AnyHashingScheme::Face(s) => s.eval_ball(center, radius, f, bucket_values),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::DEFAULT_SCALE;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_choose_known_names() {
        assert_eq!(choose_hashing_scheme("grid"), Ok(HashingSchemeChoice::Grid));
        assert_eq!(choose_hashing_scheme("face"), Ok(HashingSchemeChoice::Face));
        assert_eq!(choose_hashing_scheme("grid_hashing"), Ok(HashingSchemeChoice::Grid));
        assert_eq!(choose_hashing_scheme("face_hashing"), Ok(HashingSchemeChoice::Face));
    }

    #[test]
    fn test_choose_unknown_name() {
        for name in ["", "Grid", "hex", "face hashing"] {
            assert!(
                matches!(choose_hashing_scheme(name), Err(HashingError::InvalidArgument(_))),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_display_round_trips() {
        for choice in [HashingSchemeChoice::Grid, HashingSchemeChoice::Face] {
            assert_eq!(choice.to_string().parse::<HashingSchemeChoice>(), Ok(choice));
        }
    }

    #[test]
    fn test_gamma_values() {
        assert!((get_gamma(HashingSchemeChoice::Grid, 4) - 2.0).abs() < 1e-12);
        assert!((get_gamma(HashingSchemeChoice::Face, 4) - 24.0).abs() < 1e-12);
    }

    #[test]
    fn test_factory_builds_requested_scheme() {
        let mut rng = StdRng::seed_from_u64(3);
        let grid = make_hashing_scheme(HashingSchemeChoice::Grid, 2, 4.0, DEFAULT_SCALE, &mut rng)
            .unwrap();
        let face = make_hashing_scheme(HashingSchemeChoice::Face, 2, 4.0, DEFAULT_SCALE, &mut rng)
            .unwrap();

        assert_eq!(grid.choice(), HashingSchemeChoice::Grid);
        assert_eq!(face.choice(), HashingSchemeChoice::Face);
        assert_eq!(grid.dimension(), 2);
        assert_eq!(face.max_radius(), 4.0);
        assert!((face.gamma() - FaceHashing::gamma(2)).abs() < 1e-12);
    }

    #[test]
    fn test_factory_propagates_invalid_parameters() {
        let mut rng = StdRng::seed_from_u64(3);
        let err = make_hashing_scheme(HashingSchemeChoice::Face, 0, 1.0, DEFAULT_SCALE, &mut rng);
        assert!(matches!(err, Err(HashingError::InvalidArgument(_))));
    }
}
