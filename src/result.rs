//! Time-indexed storage of a multi-player simulation.

use crate::collision::{RoundSink, RoundState};

/// Accumulates every round of a `players × arms` simulation over a fixed horizon.
///
/// Matrices are stored row-major:
/// - `choices`, `rewards`: `players × horizon`,
/// - `pulls`: `players × arms`, summed over time,
/// - `all_pulls`: `players × arms × horizon`,
/// - `collisions`: `arms × horizon`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultiPlayerResult {
    n_players: usize,
    n_arms: usize,
    horizon: usize,
    choices: Vec<usize>,
    rewards: Vec<f64>,
    pulls: Vec<u64>,
    all_pulls: Vec<u64>,
    collisions: Vec<u64>,
}

impl MultiPlayerResult {
    pub fn new(n_players: usize, n_arms: usize, horizon: usize) -> Self {
        Self {
            n_players,
            n_arms,
            horizon,
            choices: vec![0; n_players * horizon],
            rewards: vec![0.0; n_players * horizon],
            pulls: vec![0; n_players * n_arms],
            all_pulls: vec![0; n_players * n_arms * horizon],
            collisions: vec![0; n_arms * horizon],
        }
    }

    pub fn n_players(&self) -> usize {
        self.n_players
    }

    pub fn n_arms(&self) -> usize {
        self.n_arms
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Store one round.
    ///
    /// # Panics
    ///
    /// If `t >= horizon` or the round was built for another shape.
    pub fn store(&mut self, t: usize, choices: &[usize], round: &RoundState) {
        assert!(t < self.horizon, "t = {t} is outside the horizon {}", self.horizon);
        assert!(
            choices.len() == self.n_players
                && round.n_players() == self.n_players
                && round.n_arms() == self.n_arms,
            "round shape does not match a {}x{} result",
            self.n_players,
            self.n_arms
        );
        let h = self.horizon;
        for (i, (&c, &r)) in choices.iter().zip(round.rewards()).enumerate() {
            self.choices[i * h + t] = c;
            self.rewards[i * h + t] = r;
        }
        for (cell, &p) in round.pulls().iter().enumerate() {
            self.pulls[cell] += p;
            self.all_pulls[cell * h + t] = p;
        }
        for (arm, &c) in round.collisions().iter().enumerate() {
            self.collisions[arm * h + t] = c;
        }
    }

    pub fn choice(&self, player: usize, t: usize) -> usize {
        self.choices[player * self.horizon + t]
    }

    /// Rewards of one player, one entry per step.
    pub fn player_rewards(&self, player: usize) -> &[f64] {
        &self.rewards[player * self.horizon..(player + 1) * self.horizon]
    }

    /// Cumulative pulls of `arm` by `player`.
    pub fn pulls(&self, player: usize, arm: usize) -> u64 {
        self.pulls[player * self.n_arms + arm]
    }

    /// Pulls of `arm` by `player` at step `t` (0 or 1).
    pub fn pulls_at(&self, player: usize, arm: usize, t: usize) -> u64 {
        self.all_pulls[(player * self.n_arms + arm) * self.horizon + t]
    }

    /// Collisions on one arm, one entry per step.
    pub fn arm_collisions(&self, arm: usize) -> &[u64] {
        &self.collisions[arm * self.horizon..(arm + 1) * self.horizon]
    }

    /// Sum of rewards per player.
    pub fn total_rewards(&self) -> Vec<f64> {
        (0..self.n_players)
            .map(|i| self.player_rewards(i).iter().sum())
            .collect()
    }

    /// Collisions summed over arms, one entry per step.
    pub fn collisions_per_step(&self) -> Vec<u64> {
        (0..self.horizon)
            .map(|t| (0..self.n_arms).map(|a| self.collisions[a * self.horizon + t]).sum())
            .collect()
    }

    pub fn total_collisions(&self) -> u64 {
        self.collisions.iter().sum()
    }
}

impl RoundSink for MultiPlayerResult {
    fn record(&mut self, t: u64, choices: &[usize], round: &RoundState) {
        let t = usize::try_from(t).unwrap_or(usize::MAX);
        self.store(t, choices, round);
    }
}
