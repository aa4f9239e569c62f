//! `banditsim`: multi-player bandit rounds and online change-point detection.
//!
//! Two independent engines share one set of numeric kernels:
//!
//! - **Collision resolution** ([`CollisionEngine`]): several players pick arms simultaneously; a
//!   [`CollisionModel`] decides who draws each arm and gets paid, and every outcome is reported
//!   back through the [`Player`] callbacks. Results land in a [`RoundState`] and, optionally, a
//!   [`RoundSink`] such as [`MultiPlayerResult`].
//! - **Change detection** ([`detect`]): pure tests over the visible prefix of a scalar stream
//!   (Monitored, CUSUM, PHT, Gaussian and Bernoulli GLR, plus a purely random baseline).
//!
//! **Goals:**
//! - **Deterministic by default**: every random source is a seeded `StdRng` or a stable hash, so
//!   the same seed replays the same simulation.
//! - **No look-ahead**: a detector called at `t` reads `observations[..t]` and nothing else.
//! - **Fail fast on configuration, never on numerics**: constructors validate parameters and
//!   return [`Error`]; degenerate statistics map to "no detection" or a `+∞` threshold.
//!
//! **Non-goals:**
//! - Bandit policies themselves (UCB indices and the like); players are opaque.
//! - Plotting, reporting UIs, and parallel sweeps over experiment grids.
//!
//! # Example
//!
//! ```rust
//! use banditsim::{
//!     BernoulliArm, CollisionConfig, CollisionEngine, MultiPlayerResult, Player, RoundState,
//! };
//!
//! struct Greedy(f64);
//! impl Player for Greedy {
//!     fn get_reward(&mut self, _arm: usize, reward: f64) {
//!         self.0 += reward;
//!     }
//! }
//!
//! let mut arms = vec![
//!     BernoulliArm::with_seed(0.9, 1).unwrap(),
//!     BernoulliArm::with_seed(0.5, 2).unwrap(),
//! ];
//! let mut players = vec![Greedy(0.0), Greedy(0.0)];
//! let mut engine = CollisionEngine::new(CollisionConfig::default()).unwrap();
//! let mut round = RoundState::new(2, 2);
//! let mut result = MultiPlayerResult::new(2, 2, 10);
//!
//! for t in 0..10u64 {
//!     // Both players always want the best arm: every round is a collision.
//!     engine.step(t, &mut arms, &mut players, &[0, 0], &mut round, &mut result);
//! }
//! assert_eq!(result.total_collisions(), 10);
//! assert_eq!(result.total_rewards(), vec![0.0, 0.0]);
//! ```
//!
//! Detecting a change on a toy stream:
//!
//! ```rust
//! use banditsim::detect::{BernoulliGlr, ChangeDetector};
//! use banditsim::{toy_data, ToyConfig};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(0);
//! let data = toy_data(&ToyConfig::default(), &mut rng).unwrap(); // 0.1 -> 0.9 at t = 500
//! let glr = BernoulliGlr::default();
//! assert!(!glr.detect(&data, 400));
//! assert!(glr.detect(&data, 1000));
//! ```

#![forbid(unsafe_code)]

mod error;
pub use error::{Error, Result};

mod kl;
pub use kl::*;

mod threshold;
pub use threshold::*;

mod stable_hash;
pub use stable_hash::*;

mod arm;
pub use arm::*;

mod player;
pub use player::*;

mod collision;
pub use collision::*;

pub mod detect;

mod problem;
pub use problem::*;

mod experiment;
pub use experiment::*;

mod result;
pub use result::*;

pub use detect::{
    Alarm, AnyDetector, BernoulliGlr, BernoulliGlrConfig, ChangeDetector, Cusum, CusumConfig,
    GaussianGlr, GaussianGlrConfig, Monitored, MonitoredConfig, Pht, PhtConfig, PurelyRandom,
    PurelyRandomConfig,
};
