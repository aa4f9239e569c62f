//! Piecewise-stationary bandit problems and synthetic observation streams.
//!
//! A problem is a compact schedule: `list_of_means[j][arm]` is the mean of `arm` on the segment
//! starting at `change_points[j]`. The toy problem (one arm, one change point) is the one used to
//! benchmark change detectors.

use rand::Rng;

use crate::arm::{Noise, PiecewiseArm};
use crate::error::{Error, Result};

/// Default standard deviation of Gaussian toy data.
pub const DEFAULT_GAUSSIAN_SIGMA: f64 = 0.25;

/// A piecewise-stationary problem with `K` arms and `J` segments.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PiecewiseProblem {
    list_of_means: Vec<Vec<f64>>,
    change_points: Vec<usize>,
}

impl PiecewiseProblem {
    /// Validate and build a problem.
    ///
    /// Every segment must list the same (non-zero) number of finite means, and `change_points`
    /// must start at 0 and be strictly increasing, one per segment.
    pub fn new(list_of_means: Vec<Vec<f64>>, change_points: Vec<usize>) -> Result<Self> {
        let n_arms = list_of_means.first().map_or(0, Vec::len);
        if n_arms == 0 {
            return Err(Error::InvalidProblem(
                "at least one segment with one arm is required".to_string(),
            ));
        }
        if let Some(j) = list_of_means.iter().position(|m| m.len() != n_arms) {
            return Err(Error::InvalidProblem(format!(
                "segment {j} has {} means, expected {n_arms}",
                list_of_means[j].len()
            )));
        }
        if list_of_means.iter().flatten().any(|m| !m.is_finite()) {
            return Err(Error::InvalidProblem("means must be finite".to_string()));
        }
        if change_points.len() != list_of_means.len() {
            return Err(Error::InvalidProblem(format!(
                "{} change points for {} segments",
                change_points.len(),
                list_of_means.len()
            )));
        }
        if change_points[0] != 0 || change_points.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::InvalidProblem(
                "change points must start at 0 and be strictly increasing".to_string(),
            ));
        }
        Ok(Self {
            list_of_means,
            change_points,
        })
    }

    /// One arm whose mean jumps from `first_mean` to `second_mean` at `tau`.
    pub fn toy(first_mean: f64, second_mean: f64, tau: usize) -> Result<Self> {
        if tau == 0 {
            Self::new(vec![vec![second_mean]], vec![0])
        } else {
            Self::new(vec![vec![first_mean], vec![second_mean]], vec![0, tau])
        }
    }

    pub fn n_arms(&self) -> usize {
        self.list_of_means[0].len()
    }

    pub fn n_segments(&self) -> usize {
        self.list_of_means.len()
    }

    pub fn change_points(&self) -> &[usize] {
        &self.change_points
    }

    pub fn list_of_means(&self) -> &[Vec<f64>] {
        &self.list_of_means
    }

    /// Mean of `arm` at time `t`.
    pub fn mean_at(&self, arm: usize, t: usize) -> f64 {
        let j = self.change_points.partition_point(|&c| c <= t);
        self.list_of_means[j.saturating_sub(1)][arm]
    }

    /// Mean of every arm at every step: `result[arm][t]`, shape `arms × horizon`.
    pub fn full_history_of_means(&self, horizon: usize) -> Vec<Vec<f64>> {
        (0..self.n_arms())
            .map(|arm| (0..horizon).map(|t| self.mean_at(arm, t)).collect())
            .collect()
    }

    /// One seeded [`PiecewiseArm`] per arm (arm `i` uses seed `seed + i`).
    pub fn arms(&self, noise: Noise, seed: u64) -> Result<Vec<PiecewiseArm>> {
        let change_points: Vec<u64> = self.change_points.iter().map(|&c| c as u64).collect();
        (0..self.n_arms())
            .map(|arm| {
                let means = self.list_of_means.iter().map(|m| m[arm]).collect();
                PiecewiseArm::with_seed(
                    means,
                    change_points.clone(),
                    noise,
                    seed.wrapping_add(arm as u64),
                )
            })
            .collect()
    }
}

/// Draw one observation per arm and step: `result[arm][t]`, shape `arms × horizon`.
pub fn piecewise_samples<R: Rng + ?Sized>(
    problem: &PiecewiseProblem,
    horizon: usize,
    noise: Noise,
    rng: &mut R,
) -> Result<Vec<Vec<f64>>> {
    noise.validate()?;
    Ok(problem
        .full_history_of_means(horizon)
        .into_iter()
        .map(|means| means.into_iter().map(|m| noise.sample(m, &mut *rng)).collect())
        .collect())
}

/// Position of the change point of a toy stream.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Tau {
    /// Absolute index.
    Index(usize),
    /// Fraction of the horizon, rounded down.
    Fraction(f64),
}

impl Default for Tau {
    fn default() -> Self {
        Tau::Fraction(0.5)
    }
}

impl Tau {
    /// Absolute change point for a stream of length `horizon`.
    pub fn resolve(self, horizon: usize) -> Result<usize> {
        match self {
            Tau::Index(tau) if tau <= horizon => Ok(tau),
            Tau::Index(tau) => Err(Error::InvalidParameter {
                name: "tau",
                value: tau as f64,
                reason: "must not exceed the horizon",
            }),
            Tau::Fraction(f) if (0.0..=1.0).contains(&f) => Ok((f * horizon as f64) as usize),
            Tau::Fraction(f) => Err(Error::InvalidParameter {
                name: "tau",
                value: f,
                reason: "fraction must lie in [0, 1]",
            }),
        }
    }
}

/// Configuration of a single-change toy stream.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ToyConfig {
    pub first_mean: f64,
    pub second_mean: f64,
    pub tau: Tau,
    pub horizon: usize,
    pub noise: Noise,
}

impl Default for ToyConfig {
    fn default() -> Self {
        Self {
            first_mean: 0.1,
            second_mean: 0.9,
            tau: Tau::default(),
            horizon: 1000,
            noise: Noise::Bernoulli,
        }
    }
}

impl ToyConfig {
    /// Same configuration with Gaussian noise of standard deviation [`DEFAULT_GAUSSIAN_SIGMA`].
    pub fn gaussian(self) -> Self {
        Self {
            noise: Noise::Gaussian {
                sigma: DEFAULT_GAUSSIAN_SIGMA,
            },
            ..self
        }
    }

    /// The toy problem this configuration samples from.
    pub fn problem(&self) -> Result<PiecewiseProblem> {
        PiecewiseProblem::toy(
            self.first_mean,
            self.second_mean,
            self.tau.resolve(self.horizon)?,
        )
    }
}

/// Draw one toy stream of length `cfg.horizon`.
pub fn toy_data<R: Rng + ?Sized>(cfg: &ToyConfig, rng: &mut R) -> Result<Vec<f64>> {
    let problem = cfg.problem()?;
    let mut samples = piecewise_samples(&problem, cfg.horizon, cfg.noise, rng)?;
    Ok(samples.swap_remove(0))
}
