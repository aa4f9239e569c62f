//! Online change-point detection tests over a scalar observation stream.
//!
//! Every detector answers the same question: *given the visible prefix `observations[..t]`, has the
//! distribution of the stream changed?* Detectors are immutable values built from a validated
//! config; a call never looks past `t` and carries no state to the next call, so one detector can
//! be shared freely across threads and repetitions.
//!
//! Implemented tests:
//! - [`Monitored`]: two-half window comparison with a McDiarmid threshold (M-UCB).
//! - [`Cusum`]: two-sided CUSUM with a reference mean frozen on the first `M` samples (Page, 1954).
//! - [`Pht`]: Page–Hinkley test; CUSUM with an adaptive running-mean reference (Hinkley, 1971).
//! - [`GaussianGlr`] / [`BernoulliGlr`]: generalized likelihood-ratio scan over all split points.
//! - [`PurelyRandom`]: a sanity baseline that fires with a fixed probability at every `t`.
//!
//! Unless pinned in the config, the horizon used by the threshold formulas is
//! `observations.len()`: callers pass the full stream and move `t` forward.

use crate::error::{check_open_interval, check_positive, check_threshold, Error, Result};
use crate::kl::{kl_bernoulli, kl_gaussian, DEFAULT_SIGMA2};
use crate::stable_hash::stable_unit_f64;
use crate::threshold::{compute_c_glr, compute_h_cusum, monitored_threshold};

/// Default Monitored window size `w`.
pub const DEFAULT_WINDOW_SIZE: usize = 80;
/// Default CUSUM/PHT precision `ε`.
pub const DEFAULT_EPSILON: f64 = 0.5;
/// Default minimum number of observations between change points (`M`).
pub const DEFAULT_MIN_SAMPLES: usize = 100;
/// Default assumed number of change points (`Υ_T`).
pub const DEFAULT_MAX_NB_RANDOM_EVENTS: usize = 1;
/// Default per-step detection probability of [`PurelyRandom`].
pub const DEFAULT_DETECTION_PROBA: f64 = 0.05;

/// Where and how a detection test fired.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Alarm {
    /// Index of the last observation consumed when the test fired.
    pub index: usize,
    /// Test statistic at the alarm.
    pub statistic: f64,
    /// Threshold the statistic met or exceeded.
    pub threshold: f64,
    /// Split point `s` that triggered a GLR alarm (`None` for the other tests).
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub split: Option<usize>,
}

/// Common interface of the change-point tests.
///
/// `t` may exceed `observations.len()`; the visible prefix is then the whole slice.
pub trait ChangeDetector {
    /// Short, stable algorithm name (used in reports).
    fn name(&self) -> &'static str;

    /// Run the test on `observations[..t]`, returning the alarm if a change is detected.
    fn scan(&self, observations: &[f64], t: usize) -> Option<Alarm>;

    /// Whether a change is detected on `observations[..t]`.
    fn detect(&self, observations: &[f64], t: usize) -> bool {
        self.scan(observations, t).is_some()
    }
}

fn visible(observations: &[f64], t: usize) -> &[f64] {
    &observations[..t.min(observations.len())]
}

fn horizon_of(pinned: Option<usize>, observations: &[f64]) -> usize {
    pinned.unwrap_or(observations.len())
}

fn raise(name: &'static str, alarm: Alarm) -> Option<Alarm> {
    tracing::trace!(
        detector = name,
        index = alarm.index,
        statistic = alarm.statistic,
        threshold = alarm.threshold,
        "change detected"
    );
    Some(alarm)
}

fn check_optional_threshold(name: &'static str, value: Option<f64>) -> Result<Option<f64>> {
    value.map(|h| check_threshold(name, h)).transpose()
}

fn check_at_least_one(name: &'static str, value: usize) -> Result<usize> {
    if value == 0 {
        Err(Error::InvalidParameter {
            name,
            value: 0.0,
            reason: "must be >= 1",
        })
    } else {
        Ok(value)
    }
}

// ============================================================================
// Monitored
// ============================================================================

/// Configuration for [`Monitored`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonitoredConfig {
    /// Window size `w` (at least 2).
    pub window_size: usize,
    /// Threshold override; `None` uses [`monitored_threshold`].
    pub threshold_b: Option<f64>,
    /// Number of arms `K` of the surrounding experiment (enters the default threshold).
    pub nb_arms: usize,
    /// Horizon override; `None` uses `observations.len()`.
    pub horizon: Option<usize>,
}

impl Default for MonitoredConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            threshold_b: None,
            nb_arms: 1,
            horizon: None,
        }
    }
}

/// Window test: with `Y` the last `w` observations, detect if
///
/// \( \left|\sum_{i=1}^{w/2} Y_i - \sum_{i=w/2+1}^{w} Y_i\right| > b \).
///
/// Returns no detection while fewer than `w` observations are visible.
#[derive(Debug, Clone, Default)]
pub struct Monitored {
    cfg: MonitoredConfig,
}

impl Monitored {
    /// Validate `cfg` and build the detector.
    pub fn new(cfg: MonitoredConfig) -> Result<Self> {
        if cfg.window_size < 2 {
            return Err(Error::InvalidParameter {
                name: "window_size",
                value: cfg.window_size as f64,
                reason: "must be >= 2",
            });
        }
        if let Some(horizon) = cfg.horizon {
            if cfg.window_size >= horizon {
                return Err(Error::WindowExceedsHorizon {
                    window: cfg.window_size,
                    horizon,
                });
            }
        }
        check_at_least_one("nb_arms", cfg.nb_arms)?;
        check_optional_threshold("threshold_b", cfg.threshold_b)?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &MonitoredConfig {
        &self.cfg
    }

    /// Threshold `b` used for a stream of length `horizon`.
    pub fn threshold(&self, horizon: usize) -> f64 {
        self.cfg
            .threshold_b
            .unwrap_or_else(|| monitored_threshold(self.cfg.window_size, self.cfg.nb_arms, horizon))
    }
}

impl ChangeDetector for Monitored {
    fn name(&self) -> &'static str {
        "Monitored"
    }

    fn scan(&self, observations: &[f64], t: usize) -> Option<Alarm> {
        let data = visible(observations, t);
        let w = self.cfg.window_size;
        if data.len() < w {
            return None;
        }
        let b = self.threshold(horizon_of(self.cfg.horizon, observations));
        let last = &data[data.len() - w..];
        let (first_half, second_half) = last.split_at(w / 2);
        let statistic = (first_half.iter().sum::<f64>() - second_half.iter().sum::<f64>()).abs();
        if statistic > b {
            raise(
                self.name(),
                Alarm {
                    index: data.len() - 1,
                    statistic,
                    threshold: b,
                    split: None,
                },
            )
        } else {
            None
        }
    }
}

// ============================================================================
// CUSUM
// ============================================================================

/// Configuration for [`Cusum`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CusumConfig {
    /// Precision `ε` in `(0, 1)`: drifts smaller than `ε` are ignored.
    pub epsilon: f64,
    /// `M`: number of initial samples used to estimate the reference mean `û₀`.
    pub min_samples: usize,
    /// `Υ_T`: assumed number of change points over the horizon.
    pub max_nb_random_events: usize,
    /// `M` used inside the default threshold formula.
    ///
    /// The reference CUSUM-UCB experiments evaluate the threshold with `M = 1` whatever
    /// `min_samples` is; the default keeps that behaviour. Set it to `min_samples` for the
    /// threshold of the paper's Corollary 2 taken literally.
    pub threshold_m: usize,
    /// Threshold override; `None` uses [`compute_h_cusum`].
    pub threshold_h: Option<f64>,
    /// Horizon override; `None` uses `observations.len()`.
    pub horizon: Option<usize>,
}

impl Default for CusumConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            min_samples: DEFAULT_MIN_SAMPLES,
            max_nb_random_events: DEFAULT_MAX_NB_RANDOM_EVENTS,
            threshold_m: 1,
            threshold_h: None,
            horizon: None,
        }
    }
}

impl CusumConfig {
    fn validate(&self) -> Result<()> {
        check_open_interval("epsilon", self.epsilon, 0.0, 1.0)?;
        check_at_least_one("min_samples", self.min_samples)?;
        check_at_least_one("max_nb_random_events", self.max_nb_random_events)?;
        check_at_least_one("threshold_m", self.threshold_m)?;
        check_optional_threshold("threshold_h", self.threshold_h)?;
        Ok(())
    }

    fn threshold(&self, horizon: usize) -> f64 {
        self.threshold_h.unwrap_or_else(|| {
            compute_h_cusum(
                horizon,
                self.threshold_m,
                self.max_nb_random_events,
                self.epsilon,
            )
        })
    }
}

/// Two-sided CUSUM test.
///
/// With `û₀` the mean of the first `M` samples, for every sample `y_k` with `k > M`:
///
/// \( g^+_k = \max(0, g^+_{k-1} + û_0 - y_k - ε) \),
/// \( g^-_k = \max(0, g^-_{k-1} + y_k - û_0 - ε) \),
///
/// and a change is detected at the first `k` with `max(g⁺, g⁻) ≥ h`.
#[derive(Debug, Clone, Default)]
pub struct Cusum {
    cfg: CusumConfig,
}

impl Cusum {
    /// Validate `cfg` and build the detector.
    pub fn new(cfg: CusumConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &CusumConfig {
        &self.cfg
    }

    /// Threshold `h` used for a stream of length `horizon`.
    pub fn threshold(&self, horizon: usize) -> f64 {
        self.cfg.threshold(horizon)
    }
}

impl ChangeDetector for Cusum {
    fn name(&self) -> &'static str {
        "CUSUM"
    }

    fn scan(&self, observations: &[f64], t: usize) -> Option<Alarm> {
        let data = visible(observations, t);
        let m = self.cfg.min_samples;
        if data.len() <= m + 1 {
            return None;
        }
        let h = self.threshold(horizon_of(self.cfg.horizon, observations));
        if h.is_infinite() {
            return None;
        }
        let u0 = data[..m].iter().sum::<f64>() / m as f64;
        let eps = self.cfg.epsilon;
        let (mut gp, mut gm) = (0.0_f64, 0.0_f64);
        for (k, &y) in data.iter().enumerate().skip(m + 1) {
            // `f64::max` drops a NaN operand, so a NaN sample resets instead of poisoning.
            gp = (gp + (u0 - y - eps)).max(0.0);
            gm = (gm + (y - u0 - eps)).max(0.0);
            let g = gp.max(gm);
            if g >= h {
                return raise(
                    self.name(),
                    Alarm {
                        index: k,
                        statistic: g,
                        threshold: h,
                        split: None,
                    },
                );
            }
        }
        None
    }
}

// ============================================================================
// PHT
// ============================================================================

/// Configuration for [`Pht`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhtConfig {
    /// Precision `ε` in `(0, 1)`.
    pub epsilon: f64,
    /// `Υ_T`: assumed number of change points over the horizon.
    pub max_nb_random_events: usize,
    /// `M` used inside the default threshold formula (see [`CusumConfig::threshold_m`]).
    pub threshold_m: usize,
    /// Threshold override; `None` uses [`compute_h_cusum`].
    pub threshold_h: Option<f64>,
    /// Horizon override; `None` uses `observations.len()`.
    pub horizon: Option<usize>,
}

impl Default for PhtConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            max_nb_random_events: DEFAULT_MAX_NB_RANDOM_EVENTS,
            threshold_m: 1,
            threshold_h: None,
            horizon: None,
        }
    }
}

/// Two-sided Page–Hinkley test.
///
/// Same recursion as [`Cusum`], but the reference `ŷ_k` is the mean of every sample before `k`,
/// recomputed at each step. The first sample only seeds the mean.
#[derive(Debug, Clone, Default)]
pub struct Pht {
    cfg: PhtConfig,
}

impl Pht {
    /// Validate `cfg` and build the detector.
    pub fn new(cfg: PhtConfig) -> Result<Self> {
        check_open_interval("epsilon", cfg.epsilon, 0.0, 1.0)?;
        check_at_least_one("max_nb_random_events", cfg.max_nb_random_events)?;
        check_at_least_one("threshold_m", cfg.threshold_m)?;
        check_optional_threshold("threshold_h", cfg.threshold_h)?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &PhtConfig {
        &self.cfg
    }

    /// Threshold `h` used for a stream of length `horizon`.
    pub fn threshold(&self, horizon: usize) -> f64 {
        self.cfg.threshold_h.unwrap_or_else(|| {
            compute_h_cusum(
                horizon,
                self.cfg.threshold_m,
                self.cfg.max_nb_random_events,
                self.cfg.epsilon,
            )
        })
    }
}

impl ChangeDetector for Pht {
    fn name(&self) -> &'static str {
        "PHT"
    }

    fn scan(&self, observations: &[f64], t: usize) -> Option<Alarm> {
        let data = visible(observations, t);
        if data.len() < 2 {
            return None;
        }
        let h = self.threshold(horizon_of(self.cfg.horizon, observations));
        if h.is_infinite() {
            return None;
        }
        let eps = self.cfg.epsilon;
        let mut sum = data[0];
        let (mut gp, mut gm) = (0.0_f64, 0.0_f64);
        for (k, &y) in data.iter().enumerate().skip(1) {
            let y_hat = sum / k as f64;
            gp = (gp + (y_hat - y - eps)).max(0.0);
            gm = (gm + (y - y_hat - eps)).max(0.0);
            sum += y;
            let g = gp.max(gm);
            if g >= h {
                return raise(
                    self.name(),
                    Alarm {
                        index: k,
                        statistic: g,
                        threshold: h,
                        split: None,
                    },
                );
            }
        }
        None
    }
}

// ============================================================================
// GLR
// ============================================================================

/// Configuration for [`GaussianGlr`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaussianGlrConfig {
    /// Known variance `σ²` of the observations.
    pub sigma2: f64,
    /// Threshold override; `None` uses [`compute_c_glr`] at every `t`.
    pub threshold_h: Option<f64>,
    /// Horizon override; `None` uses `observations.len()`.
    pub horizon: Option<usize>,
}

impl Default for GaussianGlrConfig {
    fn default() -> Self {
        Self {
            sigma2: DEFAULT_SIGMA2,
            threshold_h: None,
            horizon: None,
        }
    }
}

/// Configuration for [`BernoulliGlr`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BernoulliGlrConfig {
    /// Threshold override; `None` uses [`compute_c_glr`] at every `t`.
    pub threshold_h: Option<f64>,
    /// Horizon override; `None` uses `observations.len()`.
    pub horizon: Option<usize>,
}

/// Mean of `data[a..b]` from a prefix-sum pair; callers guarantee `b > a`.
#[inline]
fn mean_between(sum_a_b: f64, a: usize, b: usize) -> f64 {
    sum_a_b / (b - a) as f64
}

/// GLR scan over every split `s ∈ [0, t-2]`:
///
/// \( G_s = \frac{(s+1)(t-s)}{t+1} \, kl(μ_{s+1..t}, μ_{0..s}) \),
///
/// firing at the first split with `G_s ≥ h`.
fn glr_scan(
    name: &'static str,
    data: &[f64],
    horizon: usize,
    threshold_h: Option<f64>,
    kl: impl Fn(f64, f64) -> f64,
) -> Option<Alarm> {
    let t = data.len();
    if t < 2 {
        return None;
    }
    let h = threshold_h.unwrap_or_else(|| compute_c_glr(0, t, horizon));
    if h.is_infinite() {
        return None;
    }
    let total: f64 = data.iter().sum();
    let mut left = 0.0_f64;
    let t_f = t as f64;
    for (s, &y) in data[..t - 1].iter().enumerate() {
        left += y;
        let mu_before = mean_between(left, 0, s + 1);
        let mu_after = mean_between(total - left, s + 1, t);
        let weight = (s as f64 + 1.0) * (t_f - s as f64) / (t_f + 1.0);
        let glr = weight * kl(mu_after, mu_before);
        if glr >= h {
            return raise(
                name,
                Alarm {
                    index: t - 1,
                    statistic: glr,
                    threshold: h,
                    split: Some(s),
                },
            );
        }
    }
    None
}

/// GLR test for Gaussian observations with known variance (`kl = (x-y)²/(2σ²)`).
#[derive(Debug, Clone, Default)]
pub struct GaussianGlr {
    cfg: GaussianGlrConfig,
}

impl GaussianGlr {
    /// Validate `cfg` and build the detector.
    pub fn new(cfg: GaussianGlrConfig) -> Result<Self> {
        check_positive("sigma2", cfg.sigma2)?;
        check_optional_threshold("threshold_h", cfg.threshold_h)?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &GaussianGlrConfig {
        &self.cfg
    }
}

impl ChangeDetector for GaussianGlr {
    fn name(&self) -> &'static str {
        "GaussianGLR"
    }

    fn scan(&self, observations: &[f64], t: usize) -> Option<Alarm> {
        let sigma2 = self.cfg.sigma2;
        glr_scan(
            self.name(),
            visible(observations, t),
            horizon_of(self.cfg.horizon, observations),
            self.cfg.threshold_h,
            |x, y| kl_gaussian(x, y, sigma2),
        )
    }
}

/// GLR test for Bernoulli observations (binary KL with means clamped away from 0 and 1).
#[derive(Debug, Clone, Default)]
pub struct BernoulliGlr {
    cfg: BernoulliGlrConfig,
}

impl BernoulliGlr {
    /// Validate `cfg` and build the detector.
    pub fn new(cfg: BernoulliGlrConfig) -> Result<Self> {
        check_optional_threshold("threshold_h", cfg.threshold_h)?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &BernoulliGlrConfig {
        &self.cfg
    }
}

impl ChangeDetector for BernoulliGlr {
    fn name(&self) -> &'static str {
        "BernoulliGLR"
    }

    fn scan(&self, observations: &[f64], t: usize) -> Option<Alarm> {
        glr_scan(
            self.name(),
            visible(observations, t),
            horizon_of(self.cfg.horizon, observations),
            self.cfg.threshold_h,
            kl_bernoulli,
        )
    }
}

// ============================================================================
// Purely random baseline
// ============================================================================

/// Configuration for [`PurelyRandom`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PurelyRandomConfig {
    /// Detection probability at each `t`, in `[0, 1]`.
    pub proba: f64,
    pub seed: u64,
}

impl Default for PurelyRandomConfig {
    fn default() -> Self {
        Self {
            proba: DEFAULT_DETECTION_PROBA,
            seed: 0,
        }
    }
}

/// Ignores the data and fires with probability `proba` at every `t`; mean delay is `⌈1/proba⌉`.
///
/// The coin for step `t` is a stable hash of `(seed, t)`, so the test stays a pure function.
#[derive(Debug, Clone, Default)]
pub struct PurelyRandom {
    cfg: PurelyRandomConfig,
}

impl PurelyRandom {
    pub fn new(cfg: PurelyRandomConfig) -> Result<Self> {
        if !(0.0..=1.0).contains(&cfg.proba) {
            return Err(Error::InvalidParameter {
                name: "proba",
                value: cfg.proba,
                reason: "must lie in [0, 1]",
            });
        }
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &PurelyRandomConfig {
        &self.cfg
    }
}

impl ChangeDetector for PurelyRandom {
    fn name(&self) -> &'static str {
        "PurelyRandom"
    }

    fn scan(&self, observations: &[f64], t: usize) -> Option<Alarm> {
        let u = stable_unit_f64(self.cfg.seed, t as u64);
        if u < self.cfg.proba {
            raise(
                self.name(),
                Alarm {
                    index: visible(observations, t).len().saturating_sub(1),
                    statistic: u,
                    threshold: self.cfg.proba,
                    split: None,
                },
            )
        } else {
            None
        }
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Any of the implemented tests, for code that picks the algorithm at run time.
#[derive(Debug, Clone)]
pub enum AnyDetector {
    PurelyRandom(PurelyRandom),
    Monitored(Monitored),
    Cusum(Cusum),
    Pht(Pht),
    GaussianGlr(GaussianGlr),
    BernoulliGlr(BernoulliGlr),
}

impl AnyDetector {
    /// Every algorithm with its default configuration, baseline first.
    pub fn all_defaults() -> Vec<AnyDetector> {
        vec![
            PurelyRandom::default().into(),
            Monitored::default().into(),
            Cusum::default().into(),
            Pht::default().into(),
            GaussianGlr::default().into(),
            BernoulliGlr::default().into(),
        ]
    }

    fn inner(&self) -> &dyn ChangeDetector {
        match self {
            AnyDetector::PurelyRandom(d) => d,
            AnyDetector::Monitored(d) => d,
            AnyDetector::Cusum(d) => d,
            AnyDetector::Pht(d) => d,
            AnyDetector::GaussianGlr(d) => d,
            AnyDetector::BernoulliGlr(d) => d,
        }
    }
}

impl ChangeDetector for AnyDetector {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn scan(&self, observations: &[f64], t: usize) -> Option<Alarm> {
        self.inner().scan(observations, t)
    }
}

macro_rules! impl_from_detector {
    ($($ty:ident),* $(,)?) => {
        $(
            impl From<$ty> for AnyDetector {
                fn from(d: $ty) -> Self {
                    AnyDetector::$ty(d)
                }
            }
        )*
    };
}

impl_from_detector!(PurelyRandom, Monitored, Cusum, Pht, GaussianGlr, BernoulliGlr);

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn step_stream(before: f64, after: f64, tau: usize, horizon: usize) -> Vec<f64> {
        (0..horizon)
            .map(|i| if i < tau { before } else { after })
            .collect()
    }

    /// Deterministic 0/1 stream with long-run frequency `p` (low-discrepancy, no RNG).
    fn bernoulli_like(p: f64, n: usize, phase: f64) -> Vec<f64> {
        let mut acc = phase;
        (0..n)
            .map(|_| {
                acc += p;
                if acc >= 1.0 {
                    acc -= 1.0;
                    1.0
                } else {
                    0.0
                }
            })
            .collect()
    }

    #[test]
    fn monitored_needs_a_full_window() {
        let d = Monitored::default();
        let data = step_stream(0.0, 1.0, 40, 79);
        assert!(!d.detect(&data, 79));
    }

    #[test]
    fn monitored_detects_a_jump_inside_the_window() {
        let d = Monitored::default();
        let data = step_stream(0.0, 1.0, 500, 1000);
        // Window [460, 540) has 40 zeros then 40 ones: statistic 40 > b ≈ 24.
        let alarm = d.scan(&data, 540).expect("alarm");
        assert_eq!(alarm.index, 539);
        assert!((alarm.statistic - 40.0).abs() < 1e-12);
        // Window entirely before the change: no detection.
        assert!(!d.detect(&data, 500));
    }

    #[test]
    fn monitored_rejects_window_at_least_horizon() {
        let err = Monitored::new(MonitoredConfig {
            window_size: 100,
            horizon: Some(100),
            ..MonitoredConfig::default()
        })
        .unwrap_err();
        assert_eq!(
            err,
            Error::WindowExceedsHorizon {
                window: 100,
                horizon: 100
            }
        );
    }

    #[test]
    fn monitored_threshold_override_is_used() {
        let d = Monitored::new(MonitoredConfig {
            window_size: 4,
            threshold_b: Some(1.5),
            ..MonitoredConfig::default()
        })
        .unwrap();
        assert!(d.detect(&[0.0, 0.0, 1.0, 1.0], 4));
        assert!(!d.detect(&[0.0, 1.0, 0.0, 1.0], 4));
    }

    #[test]
    fn cusum_constant_stream_never_detects() {
        let d = Cusum::default();
        let data = vec![0.5; 1000];
        for t in 0..=1000 {
            assert!(!d.detect(&data, t), "t={t}");
        }
    }

    #[test]
    fn cusum_detects_a_large_shift() {
        let d = Cusum::default();
        let data = step_stream(0.1, 0.9, 500, 1000);
        let alarm = d.scan(&data, 1000).expect("alarm");
        // Each post-change step adds 0.9 - 0.1 - 0.5 = 0.3 to g-.
        let h = d.threshold(1000);
        let steps = (h / 0.3).ceil() as usize;
        assert_eq!(alarm.index, 500 + steps - 1);
        assert!(alarm.statistic >= h);
    }

    #[test]
    fn cusum_ignores_samples_up_to_m() {
        let d = Cusum::new(CusumConfig {
            min_samples: 10,
            threshold_h: Some(0.0),
            ..CusumConfig::default()
        })
        .unwrap();
        // h = 0 fires on the first update, which happens at k = M + 1.
        let data = vec![0.0; 20];
        assert!(!d.detect(&data, 11));
        let alarm = d.scan(&data, 12).expect("alarm");
        assert_eq!(alarm.index, 11);
    }

    #[test]
    fn cusum_threshold_m_defaults_to_one() {
        let a = Cusum::new(CusumConfig {
            epsilon: 0.3,
            ..CusumConfig::default()
        })
        .unwrap();
        let b = Cusum::new(CusumConfig {
            epsilon: 0.3,
            threshold_m: 100,
            ..CusumConfig::default()
        })
        .unwrap();
        assert_eq!(a.threshold(1000), compute_h_cusum(1000, 1, 1, 0.3));
        assert_eq!(b.threshold(1000), compute_h_cusum(1000, 100, 1, 0.3));
    }

    #[test]
    fn cusum_rejects_bad_epsilon() {
        for eps in [0.0, 1.0, -0.1, f64::NAN] {
            let r = Cusum::new(CusumConfig {
                epsilon: eps,
                ..CusumConfig::default()
            });
            assert!(r.is_err(), "eps={eps}");
        }
    }

    #[test]
    fn cusum_nan_samples_do_not_alarm() {
        let d = Cusum::new(CusumConfig {
            min_samples: 5,
            ..CusumConfig::default()
        })
        .unwrap();
        let mut data = vec![0.5; 50];
        data[20] = f64::NAN;
        assert!(!d.detect(&data, 50));
    }

    #[test]
    fn pht_constant_stream_never_detects() {
        let d = Pht::default();
        let data = vec![0.5; 1000];
        for t in (0..=1000).step_by(7) {
            assert!(!d.detect(&data, t), "t={t}");
        }
    }

    #[test]
    fn pht_detects_a_large_shift() {
        let d = Pht::default();
        let data = step_stream(0.0, 1.0, 300, 1000);
        let alarm = d.scan(&data, 1000).expect("alarm");
        assert!(alarm.index >= 300);
        assert!(alarm.index < 400, "index={}", alarm.index);
    }

    #[test]
    fn gaussian_glr_constant_stream_never_detects() {
        let d = GaussianGlr::default();
        let data = vec![0.3; 300];
        for t in 0..=300 {
            assert!(!d.detect(&data, t));
        }
    }

    #[test]
    fn glr_alarm_reports_split_near_the_change() {
        let data = step_stream(0.1, 0.9, 500, 1000);
        for det in [
            AnyDetector::from(GaussianGlr::default()),
            AnyDetector::from(BernoulliGlr::default()),
        ] {
            let mut first = None;
            for t in 500..=1000 {
                if let Some(a) = det.scan(&data, t) {
                    first = Some((t, a));
                    break;
                }
            }
            let (t, alarm) = first.unwrap_or_else(|| panic!("{} never fired", det.name()));
            assert!(t - 500 < 100, "{}: delay={}", det.name(), t - 500);
            let split = alarm.split.expect("split");
            assert!(split < 500, "{}: split={split}", det.name());
            assert!(alarm.statistic >= alarm.threshold);
        }
    }

    #[test]
    fn bernoulli_glr_is_quiet_on_a_balanced_stream() {
        let d = BernoulliGlr::default();
        let data = bernoulli_like(0.5, 400, 0.25);
        for t in (0..=400).step_by(5) {
            assert!(!d.detect(&data, t), "t={t}");
        }
    }

    #[test]
    fn glr_with_fewer_than_two_samples_is_silent() {
        let d = BernoulliGlr::new(BernoulliGlrConfig {
            threshold_h: Some(0.0),
            ..BernoulliGlrConfig::default()
        })
        .unwrap();
        assert!(!d.detect(&[1.0], 1));
        assert!(d.detect(&[1.0, 0.0], 2));
    }

    #[test]
    fn infinite_threshold_never_alarms() {
        let data = step_stream(0.0, 1.0, 200, 400);
        let cusum = Cusum::new(CusumConfig {
            threshold_h: Some(f64::INFINITY),
            ..CusumConfig::default()
        })
        .unwrap();
        let glr = GaussianGlr::new(GaussianGlrConfig {
            threshold_h: Some(f64::INFINITY),
            ..GaussianGlrConfig::default()
        })
        .unwrap();
        assert!(!cusum.detect(&data, 400));
        assert!(!glr.detect(&data, 400));
    }

    #[test]
    fn t_past_the_end_sees_the_whole_stream() {
        let d = Monitored::new(MonitoredConfig {
            window_size: 4,
            threshold_b: Some(1.5),
            ..MonitoredConfig::default()
        })
        .unwrap();
        let data = [0.0, 0.0, 1.0, 1.0];
        assert_eq!(d.scan(&data, 4), d.scan(&data, 1_000));
    }

    #[test]
    fn purely_random_is_deterministic_and_near_its_rate() {
        let d = PurelyRandom::default();
        let data: Vec<f64> = Vec::new();
        let hits = (0..10_000).filter(|&t| d.detect(&data, t)).count();
        let rate = hits as f64 / 10_000.0;
        assert!((rate - 0.05).abs() < 0.01, "rate={rate}");
        for t in 0..100 {
            assert_eq!(d.detect(&data, t), d.detect(&data, t));
        }
    }

    #[test]
    fn purely_random_rejects_probability_out_of_range() {
        assert!(PurelyRandom::new(PurelyRandomConfig {
            proba: 1.5,
            seed: 0
        })
        .is_err());
    }

    #[test]
    fn all_defaults_lists_every_algorithm_once() {
        let names: Vec<&str> = AnyDetector::all_defaults()
            .iter()
            .map(|d| d.name())
            .collect();
        assert_eq!(
            names,
            vec!["PurelyRandom", "Monitored", "CUSUM", "PHT", "GaussianGLR", "BernoulliGLR"]
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
        #[test]
        fn detectors_never_look_ahead(
            prefix in prop::collection::vec(0.0f64..1.0, 0..150),
            suffix in prop::collection::vec(0.0f64..1.0, 0..50),
            other in prop::collection::vec(0.0f64..1.0, 0..50),
        ) {
            // Same prefix, different futures, pinned horizon: identical decisions at t = prefix.len().
            let t = prefix.len();
            let mut a = prefix.clone();
            a.extend_from_slice(&suffix);
            let mut b = prefix;
            b.extend_from_slice(&other);
            let horizon = Some(1_000);
            let dets: Vec<AnyDetector> = vec![
                Monitored::new(MonitoredConfig { window_size: 20, horizon, ..MonitoredConfig::default() }).unwrap().into(),
                Cusum::new(CusumConfig { min_samples: 10, horizon, ..CusumConfig::default() }).unwrap().into(),
                Pht::new(PhtConfig { horizon, ..PhtConfig::default() }).unwrap().into(),
                GaussianGlr::new(GaussianGlrConfig { horizon, ..GaussianGlrConfig::default() }).unwrap().into(),
                BernoulliGlr::new(BernoulliGlrConfig { horizon, ..BernoulliGlrConfig::default() }).unwrap().into(),
            ];
            for d in &dets {
                prop_assert_eq!(d.scan(&a, t), d.scan(&b, t), "{}", d.name());
            }
        }

        #[test]
        fn cusum_and_pht_are_silent_on_any_constant_stream(
            c in 0.0f64..1.0,
            len in 0usize..400,
        ) {
            let data = vec![c; len];
            let cusum = Cusum::new(CusumConfig { min_samples: 20, ..CusumConfig::default() }).unwrap();
            let pht = Pht::default();
            prop_assert!(!cusum.detect(&data, len));
            prop_assert!(!pht.detect(&data, len));
        }
    }
}
