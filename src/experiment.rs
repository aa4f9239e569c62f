//! Detection-quality measures over toy streams.
//!
//! Each measure replays a detector on every prefix of one stream, the way it runs online:
//! - detection delay: first `t ∈ [τ, T]` with a detection, minus `τ` (or `T - τ` if none),
//! - false alarm: some detection for `t ∈ [0, τ)`,
//! - missed detection: no detection for `t ∈ [τ, T]`,
//! - time: wall-clock seconds to evaluate every `t ∈ [0, T]`.
//!
//! [`check_one_measure`] averages a measure over independent toy streams.

use std::fmt;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::detect::ChangeDetector;
use crate::error::{Error, Result};
use crate::problem::{toy_data, ToyConfig};

/// A detection-quality measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Measure {
    DetectionDelay,
    FalseAlarm,
    MissedDetection,
    Time,
}

impl Measure {
    pub fn name(&self) -> &'static str {
        match self {
            Measure::DetectionDelay => "Mean detection delay",
            Measure::FalseAlarm => "Mean false alarm rate",
            Measure::MissedDetection => "Mean missed detection rate",
            Measure::Time => "Time",
        }
    }

    /// Evaluate on one stream with its change at `tau`.
    ///
    /// Booleans map to `0.0`/`1.0`, so averaging gives a rate.
    pub fn evaluate<D: ChangeDetector + ?Sized>(&self, detector: &D, data: &[f64], tau: usize) -> f64 {
        match self {
            Measure::DetectionDelay => detection_delay(detector, data, tau) as f64,
            Measure::FalseAlarm => f64::from(u8::from(false_alarm(detector, data, tau))),
            Measure::MissedDetection => f64::from(u8::from(missed_detection(detector, data, tau))),
            Measure::Time => time_efficiency(detector, data),
        }
    }
}

fn first_detection<D: ChangeDetector + ?Sized>(
    detector: &D,
    data: &[f64],
    mut ts: impl Iterator<Item = usize>,
) -> Option<usize> {
    ts.find(|&t| detector.detect(data, t))
}

/// Delay between `tau` and the first detection at or after it; `T - tau` if there is none.
pub fn detection_delay<D: ChangeDetector + ?Sized>(detector: &D, data: &[f64], tau: usize) -> usize {
    let horizon = data.len();
    first_detection(detector, data, tau..=horizon)
        .map_or(horizon.saturating_sub(tau), |t| t - tau)
}

/// Whether the detector fires on some prefix strictly before `tau`.
pub fn false_alarm<D: ChangeDetector + ?Sized>(detector: &D, data: &[f64], tau: usize) -> bool {
    first_detection(detector, data, 0..tau.min(data.len())).is_some()
}

/// Whether the detector never fires at or after `tau`.
pub fn missed_detection<D: ChangeDetector + ?Sized>(detector: &D, data: &[f64], tau: usize) -> bool {
    first_detection(detector, data, tau..=data.len()).is_none()
}

/// Seconds spent running the detector on every prefix of `data`.
pub fn time_efficiency<D: ChangeDetector + ?Sized>(detector: &D, data: &[f64]) -> f64 {
    let start = Instant::now();
    for t in 0..=data.len() {
        std::hint::black_box(detector.detect(data, t));
    }
    start.elapsed().as_secs_f64()
}

/// Per-detector results of [`check_one_measure`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeasureRow {
    pub detector: String,
    /// One value per repetition.
    pub values: Vec<f64>,
    pub mean: f64,
}

/// Outcome of [`check_one_measure`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeasureReport {
    pub measure: Measure,
    pub toy: ToyConfig,
    /// Resolved change point.
    pub tau: usize,
    pub repetitions: usize,
    pub rows: Vec<MeasureRow>,
}

impl MeasureReport {
    /// Mean of the first row named `detector`.
    pub fn mean_of(&self, detector: &str) -> Option<f64> {
        self.rows
            .iter()
            .find(|r| r.detector == detector)
            .map(|r| r.mean)
    }
}

impl fmt::Display for MeasureReport {
    /// Markdown table, one line per detector.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "| Algorithm | {} |", self.measure.name())?;
        writeln!(f, "|------|------|")?;
        for row in &self.rows {
            writeln!(f, "| {} | {:.3} |", row.detector, row.mean)?;
        }
        Ok(())
    }
}

/// Average `measure` for every detector over `repetitions` independent toy streams.
///
/// Every detector sees the same streams; stream `r` is drawn from a generator seeded with
/// `seed`, so reports are reproducible.
///
/// # Example
///
/// ```rust
/// use banditsim::{check_one_measure, AnyDetector, Measure, ToyConfig};
///
/// let toy = ToyConfig { horizon: 200, ..ToyConfig::default() };
/// let report = check_one_measure(Measure::FalseAlarm, &AnyDetector::all_defaults(), &toy, 3, 0)
///     .unwrap();
/// assert_eq!(report.rows.len(), 6);
/// assert!(report.rows.iter().all(|r| (0.0..=1.0).contains(&r.mean)));
/// ```
pub fn check_one_measure<D: ChangeDetector>(
    measure: Measure,
    detectors: &[D],
    toy: &ToyConfig,
    repetitions: usize,
    seed: u64,
) -> Result<MeasureReport> {
    if repetitions == 0 {
        return Err(Error::InvalidParameter {
            name: "repetitions",
            value: 0.0,
            reason: "must be >= 1",
        });
    }
    let tau = toy.tau.resolve(toy.horizon)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut values = vec![Vec::with_capacity(repetitions); detectors.len()];
    for _ in 0..repetitions {
        let data = toy_data(toy, &mut rng)?;
        for (d, out) in detectors.iter().zip(values.iter_mut()) {
            out.push(measure.evaluate(d, &data, tau));
        }
    }

    let rows: Vec<MeasureRow> = detectors
        .iter()
        .zip(values)
        .map(|(d, values)| {
            let mean = values.iter().sum::<f64>() / repetitions as f64;
            tracing::debug!(
                measure = measure.name(),
                detector = d.name(),
                mean,
                repetitions,
                "measure summary"
            );
            MeasureRow {
                detector: d.name().to_string(),
                values,
                mean,
            }
        })
        .collect();

    Ok(MeasureReport {
        measure,
        toy: *toy,
        tau,
        repetitions,
        rows,
    })
}
