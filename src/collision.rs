//! Multi-player collision resolution.
//!
//! At every step each player picks one arm; the [`CollisionEngine`] then decides, arm by arm, who
//! draws it and gets paid. Outcomes are written into a [`RoundState`] and reported back to the
//! players through [`Player`].
//!
//! Collision counts are always "excess occupants": an arm chosen by `n > 1` players adds `n - 1`
//! to its counter, whatever the model, so the per-round total equals
//! \( \sum_a \max(\text{occupancy}(a) - 1, 0) \).

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::arm::Arm;
use crate::error::{Error, Result};
use crate::player::Player;

/// Who gets paid on a contended arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CollisionModel {
    /// Every player draws its arm and is paid; collisions are never counted.
    NoCollision,
    /// Sole occupants are paid; nobody is paid on a contended arm.
    #[default]
    OnlyUniqUserGetsReward,
    /// One occupant of each arm, picked uniformly at random, is paid.
    RewardIsSharedUniformly,
    /// The occupant with the smallest distance is paid; ties are broken uniformly at random.
    CloserUserGetsReward,
}

impl CollisionModel {
    /// Every model, default first.
    pub const ALL: [CollisionModel; 4] = [
        CollisionModel::OnlyUniqUserGetsReward,
        CollisionModel::NoCollision,
        CollisionModel::RewardIsSharedUniformly,
        CollisionModel::CloserUserGetsReward,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CollisionModel::NoCollision => "noCollision",
            CollisionModel::OnlyUniqUserGetsReward => "onlyUniqUserGetsReward",
            CollisionModel::RewardIsSharedUniformly => "rewardIsSharedUniformly",
            CollisionModel::CloserUserGetsReward => "closerUserGetsReward",
        }
    }
}

/// Where the per-player distances of [`CollisionModel::CloserUserGetsReward`] come from.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DistanceSource {
    /// One value in `[0, 1]` per player, given by the caller.
    Explicit(Vec<f64>),
    /// Player `i` of `n` sits at `(i + 1) / (n + 1)`.
    #[default]
    Uniform,
    /// Drawn uniformly in `[0, 1)` once per player count, then reused.
    Random,
}

/// How a player without collision handling learns that it lost an arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CollisionFeedback {
    /// Report a zero reward: `get_reward(arm, 0.0)`.
    #[default]
    ZeroReward,
    /// Report nothing.
    Silent,
}

/// Configuration for [`CollisionEngine`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollisionConfig {
    pub model: CollisionModel,
    pub distances: DistanceSource,
    pub feedback: CollisionFeedback,
}

/// Outcome of one round, written by the engine.
///
/// `pulls` is a row-major `players × arms` matrix. Call [`RoundState::reset`] between rounds
/// (or use [`CollisionEngine::step`], which does).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundState {
    n_players: usize,
    n_arms: usize,
    rewards: Vec<f64>,
    pulls: Vec<u64>,
    collisions: Vec<u64>,
}

impl RoundState {
    pub fn new(n_players: usize, n_arms: usize) -> Self {
        Self {
            n_players,
            n_arms,
            rewards: vec![0.0; n_players],
            pulls: vec![0; n_players * n_arms],
            collisions: vec![0; n_arms],
        }
    }

    /// Zero every counter.
    pub fn reset(&mut self) {
        self.rewards.fill(0.0);
        self.pulls.fill(0);
        self.collisions.fill(0);
    }

    pub fn n_players(&self) -> usize {
        self.n_players
    }

    pub fn n_arms(&self) -> usize {
        self.n_arms
    }

    /// Reward of each player (0 for players that were not paid).
    pub fn rewards(&self) -> &[f64] {
        &self.rewards
    }

    /// Flat `players × arms` pull matrix.
    pub fn pulls(&self) -> &[u64] {
        &self.pulls
    }

    /// Pull counts of one player, one entry per arm.
    pub fn player_pulls(&self, player: usize) -> &[u64] {
        &self.pulls[player * self.n_arms..(player + 1) * self.n_arms]
    }

    pub fn pull(&self, player: usize, arm: usize) -> u64 {
        self.pulls[player * self.n_arms + arm]
    }

    /// Excess occupants per arm.
    pub fn collisions(&self) -> &[u64] {
        &self.collisions
    }

    pub fn total_collisions(&self) -> u64 {
        self.collisions.iter().sum()
    }
}

/// Number of players on each arm.
///
/// # Panics
///
/// If a choice is `>= n_arms`.
pub fn occupancy(choices: &[usize], n_arms: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_arms];
    for &arm in choices {
        counts[arm] += 1;
    }
    counts
}

/// Receives every resolved round, e.g. to store it for later analysis.
pub trait RoundSink {
    fn record(&mut self, t: u64, choices: &[usize], round: &RoundState);
}

impl<S: RoundSink + ?Sized> RoundSink for &mut S {
    fn record(&mut self, t: u64, choices: &[usize], round: &RoundState) {
        (**self).record(t, choices, round);
    }
}

/// Resolves simultaneous arm choices into rewards, pulls and collisions.
///
/// The engine owns the random source used for tie-breaks and random distances, and the
/// distance cache (one vector per player count seen, never evicted: the key space is the small
/// set of team sizes one engine simulates).
#[derive(Debug, Clone)]
pub struct CollisionEngine {
    cfg: CollisionConfig,
    rng: StdRng,
    distance_cache: BTreeMap<usize, Arc<[f64]>>,
    occupants: Vec<Vec<usize>>,
}

impl CollisionEngine {
    /// Create an engine with a deterministic fixed seed (0).
    pub fn new(cfg: CollisionConfig) -> Result<Self> {
        Self::with_seed(cfg, 0)
    }

    /// Create an engine with a fixed seed (reproducible tie-breaks and random distances).
    pub fn with_seed(cfg: CollisionConfig, seed: u64) -> Result<Self> {
        if let DistanceSource::Explicit(d) = &cfg.distances {
            if let Some(&bad) = d.iter().find(|x| !(0.0..=1.0).contains(*x)) {
                return Err(Error::InvalidParameter {
                    name: "distances",
                    value: bad,
                    reason: "must lie in [0, 1]",
                });
            }
        }
        Ok(Self {
            cfg,
            rng: StdRng::seed_from_u64(seed),
            distance_cache: BTreeMap::new(),
            occupants: Vec::new(),
        })
    }

    pub fn config(&self) -> &CollisionConfig {
        &self.cfg
    }

    pub fn model(&self) -> CollisionModel {
        self.cfg.model
    }

    /// Distance vector used for `n_players` players.
    ///
    /// The vector is built on first use and cached; the returned `Arc` is a shared, read-only
    /// snapshot, so later calls observe exactly the same values.
    pub fn distances(&mut self, n_players: usize) -> Result<Arc<[f64]>> {
        if let Some(d) = self.distance_cache.get(&n_players) {
            return Ok(Arc::clone(d));
        }
        let d: Arc<[f64]> = match &self.cfg.distances {
            DistanceSource::Explicit(v) => {
                if v.len() != n_players {
                    return Err(Error::DistanceLengthMismatch {
                        expected: n_players,
                        actual: v.len(),
                    });
                }
                v.as_slice().into()
            }
            DistanceSource::Uniform => {
                let denom = (n_players + 1) as f64;
                (1..=n_players).map(|i| i as f64 / denom).collect()
            }
            DistanceSource::Random => {
                let d: Arc<[f64]> = (0..n_players).map(|_| self.rng.gen::<f64>()).collect();
                tracing::debug!(n_players, distances = ?d, "generated random distance vector");
                d
            }
        };
        self.distance_cache.insert(n_players, Arc::clone(&d));
        Ok(d)
    }

    /// Resolve one round.
    ///
    /// Adds to `round` (it is not cleared first) and calls back every player that chose an arm.
    /// Unoccupied arms are left untouched.
    ///
    /// # Panics
    ///
    /// On malformed input, before anything is mutated: `choices` and `players` differ in length,
    /// `round` was built for another shape, a choice is not a valid arm index, or an explicit
    /// distance vector does not have one entry per player.
    pub fn resolve<A: Arm, P: Player>(
        &mut self,
        t: u64,
        arms: &mut [A],
        players: &mut [P],
        choices: &[usize],
        round: &mut RoundState,
    ) {
        let n_arms = arms.len();
        let n_players = players.len();
        assert_eq!(
            choices.len(),
            n_players,
            "one choice per player: {} choices for {} players",
            choices.len(),
            n_players
        );
        assert!(
            round.n_players == n_players && round.n_arms == n_arms,
            "round state is {}x{}, expected {}x{}",
            round.n_players,
            round.n_arms,
            n_players,
            n_arms
        );
        if let Some((i, &arm)) = choices.iter().enumerate().find(|&(_, &a)| a >= n_arms) {
            panic!("player {i} chose arm {arm}, but there are only {n_arms} arms");
        }
        let distances = match self.cfg.model {
            CollisionModel::CloserUserGetsReward => match self.distances(n_players) {
                Ok(d) => Some(d),
                Err(e) => panic!("{e}"),
            },
            _ => None,
        };

        if self.cfg.model == CollisionModel::NoCollision {
            for (i, &arm) in choices.iter().enumerate() {
                pay(t, arms, players, round, i, arm);
            }
            return;
        }

        let mut occupants = std::mem::take(&mut self.occupants);
        occupants.iter_mut().for_each(Vec::clear);
        occupants.resize_with(n_arms, Vec::new);
        for (i, &arm) in choices.iter().enumerate() {
            occupants[arm].push(i);
        }

        for (arm, occ) in occupants.iter().enumerate() {
            match occ.len() {
                0 => {}
                1 => pay(t, arms, players, round, occ[0], arm),
                n => {
                    round.collisions[arm] += (n - 1) as u64;
                    let winner = match self.cfg.model {
                        CollisionModel::RewardIsSharedUniformly => {
                            Some(occ[self.rng.gen_range(0..n)])
                        }
                        CollisionModel::CloserUserGetsReward => {
                            let d = distances.as_deref().unwrap_or(&[]);
                            Some(closest(occ, d, &mut self.rng))
                        }
                        _ => None,
                    };
                    tracing::trace!(t, arm, occupancy = n, winner = ?winner, "collision");
                    if let Some(w) = winner {
                        pay(t, arms, players, round, w, arm);
                    }
                    for &j in occ.iter().filter(|&&j| Some(j) != winner) {
                        self.notify_collision(&mut players[j], arm);
                    }
                }
            }
        }
        self.occupants = occupants;
    }

    /// Reset `round`, resolve it, and hand it to `sink`.
    pub fn step<A: Arm, P: Player, S: RoundSink + ?Sized>(
        &mut self,
        t: u64,
        arms: &mut [A],
        players: &mut [P],
        choices: &[usize],
        round: &mut RoundState,
        sink: &mut S,
    ) {
        round.reset();
        self.resolve(t, arms, players, choices, round);
        sink.record(t, choices, round);
    }

    fn notify_collision<P: Player>(&self, player: &mut P, arm: usize) {
        if player.handles_collisions() {
            player.handle_collision(arm);
        } else if self.cfg.feedback == CollisionFeedback::ZeroReward {
            player.get_reward(arm, 0.0);
        }
    }
}

fn pay<A: Arm, P: Player>(
    t: u64,
    arms: &mut [A],
    players: &mut [P],
    round: &mut RoundState,
    player: usize,
    arm: usize,
) {
    let reward = arms[arm].draw(t);
    round.rewards[player] = reward;
    round.pulls[player * round.n_arms + arm] += 1;
    players[player].get_reward(arm, reward);
}

/// Occupant with the smallest distance; ties broken uniformly at random.
fn closest(occupants: &[usize], distances: &[f64], rng: &mut StdRng) -> usize {
    let min = occupants
        .iter()
        .map(|&i| distances[i])
        .fold(f64::INFINITY, f64::min);
    let tied: Vec<usize> = occupants
        .iter()
        .copied()
        .filter(|&i| distances[i] == min)
        .collect();
    match tied.len() {
        0 => occupants[0],
        1 => tied[0],
        n => {
            tracing::trace!(distance = min, tied = n, "breaking a distance tie at random");
            tied[rng.gen_range(0..n)]
        }
    }
}
