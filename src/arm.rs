//! Reward sources.
//!
//! The collision engine only needs [`Arm::draw`]; the concrete arms here are seeded so
//! simulations are reproducible in tests (default construction uses seed 0).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::error::{check_positive, Error, Result};

/// A reward-generating option.
pub trait Arm {
    /// Draw a reward at time step `t`.
    fn draw(&mut self, t: u64) -> f64;
}

impl<A: Arm + ?Sized> Arm for Box<A> {
    fn draw(&mut self, t: u64) -> f64 {
        (**self).draw(t)
    }
}

impl<A: Arm + ?Sized> Arm for &mut A {
    fn draw(&mut self, t: u64) -> f64 {
        (**self).draw(t)
    }
}

/// Observation noise around a mean.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Noise {
    /// `1` with probability `mean` (clamped to `[0, 1]`), else `0`.
    #[default]
    Bernoulli,
    /// `mean + σ·Z` with `Z ~ N(0, 1)`.
    Gaussian { sigma: f64 },
}

impl Noise {
    pub(crate) fn validate(&self) -> Result<()> {
        match *self {
            Noise::Bernoulli => Ok(()),
            Noise::Gaussian { sigma } => check_positive("sigma", sigma).map(|_| ()),
        }
    }

    /// Sample one observation with the given mean.
    pub fn sample<R: Rng + ?Sized>(&self, mean: f64, rng: &mut R) -> f64 {
        match *self {
            Noise::Bernoulli => {
                if rng.gen_bool(mean.clamp(0.0, 1.0)) {
                    1.0
                } else {
                    0.0
                }
            }
            Noise::Gaussian { sigma } => {
                let z: f64 = rng.sample(StandardNormal);
                mean + sigma * z
            }
        }
    }
}

fn check_mean(mean: f64) -> Result<f64> {
    if mean.is_finite() {
        Ok(mean)
    } else {
        Err(Error::InvalidParameter {
            name: "mean",
            value: mean,
            reason: "must be finite",
        })
    }
}

fn check_probability(p: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(Error::InvalidParameter {
            name: "p",
            value: p,
            reason: "must lie in [0, 1]",
        })
    }
}

/// `Bernoulli(p)` rewards.
#[derive(Debug, Clone)]
pub struct BernoulliArm {
    p: f64,
    rng: StdRng,
}

impl BernoulliArm {
    pub fn new(p: f64) -> Result<Self> {
        Self::with_seed(p, 0)
    }

    pub fn with_seed(p: f64, seed: u64) -> Result<Self> {
        Ok(Self {
            p: check_probability(p)?,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn mean(&self) -> f64 {
        self.p
    }
}

impl Arm for BernoulliArm {
    fn draw(&mut self, _t: u64) -> f64 {
        Noise::Bernoulli.sample(self.p, &mut self.rng)
    }
}

/// `N(mean, σ²)` rewards.
#[derive(Debug, Clone)]
pub struct GaussianArm {
    mean: f64,
    sigma: f64,
    rng: StdRng,
}

impl GaussianArm {
    pub fn new(mean: f64, sigma: f64) -> Result<Self> {
        Self::with_seed(mean, sigma, 0)
    }

    pub fn with_seed(mean: f64, sigma: f64, seed: u64) -> Result<Self> {
        Ok(Self {
            mean: check_mean(mean)?,
            sigma: check_positive("sigma", sigma)?,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }
}

impl Arm for GaussianArm {
    fn draw(&mut self, _t: u64) -> f64 {
        Noise::Gaussian { sigma: self.sigma }.sample(self.mean, &mut self.rng)
    }
}

/// An arm whose mean is piecewise constant in time.
///
/// `means[j]` holds on `[change_points[j], change_points[j+1])`; `change_points` starts at 0 and
/// is strictly increasing.
#[derive(Debug, Clone)]
pub struct PiecewiseArm {
    means: Vec<f64>,
    change_points: Vec<u64>,
    noise: Noise,
    rng: StdRng,
}

impl PiecewiseArm {
    pub fn with_seed(
        means: Vec<f64>,
        change_points: Vec<u64>,
        noise: Noise,
        seed: u64,
    ) -> Result<Self> {
        if means.is_empty() || means.len() != change_points.len() {
            return Err(Error::InvalidProblem(format!(
                "{} means for {} change points",
                means.len(),
                change_points.len()
            )));
        }
        if change_points[0] != 0 || change_points.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::InvalidProblem(
                "change points must start at 0 and be strictly increasing".to_string(),
            ));
        }
        for &m in &means {
            check_mean(m)?;
        }
        noise.validate()?;
        Ok(Self {
            means,
            change_points,
            noise,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Mean in force at time `t`.
    pub fn mean_at(&self, t: u64) -> f64 {
        let j = self.change_points.partition_point(|&c| c <= t);
        // change_points[0] == 0, so j >= 1.
        self.means[j.saturating_sub(1)]
    }
}

impl Arm for PiecewiseArm {
    fn draw(&mut self, t: u64) -> f64 {
        let mean = self.mean_at(t);
        self.noise.sample(mean, &mut self.rng)
    }
}
