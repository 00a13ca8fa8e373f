//! Serializable scheme configuration.

use crate::error::Result;
use crate::hashing::{scaled_radius, DEFAULT_SCALE};
use crate::scheme::{get_gamma, make_hashing_scheme, AnyHashingScheme, HashingSchemeChoice};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

fn default_scale() -> f64 {
    DEFAULT_SCALE
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HashingConfig {
    pub scheme: HashingSchemeChoice,
    pub dimension: usize,
    /// Construction radius, in caller units.
    pub radius: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Seed for offsets and the hash multiplier; thread RNG when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl HashingConfig {
    pub fn new(scheme: HashingSchemeChoice, dimension: usize, radius: f64) -> Self {
        Self {
            scheme,
            dimension,
            radius,
            scale: DEFAULT_SCALE,
            seed: None,
        }
    }

    /// Configuration whose ball queries of radius `query_radius` satisfy the
    /// scheme's sandwich bound: the construction radius is `query_radius / Γ`.
    pub fn for_query_radius(
        scheme: HashingSchemeChoice,
        dimension: usize,
        query_radius: f64,
    ) -> Self {
        let gamma = get_gamma(scheme, dimension);
        Self::new(scheme, dimension, query_radius / gamma)
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn gamma(&self) -> f64 {
        get_gamma(self.scheme, self.dimension)
    }

    /// Same checks the scheme constructors apply to dimension, radius and
    /// scale.
    pub fn validate(&self) -> Result<()> {
        scaled_radius(self.dimension, self.radius, self.scale).map(|_| ())
    }

    pub fn build(&self) -> Result<AnyHashingScheme> {
        self.validate()?;
        match self.seed {
            Some(seed) => {
                let mut rng = StdRng::seed_from_u64(seed);
                make_hashing_scheme(self.scheme, self.dimension, self.radius, self.scale, &mut rng)
            }
            None => {
                let mut rng = rand::thread_rng();
                make_hashing_scheme(self.scheme, self.dimension, self.radius, self.scale, &mut rng)
            }
        }
    }
}
