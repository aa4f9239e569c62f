//! Kullback–Leibler divergences between one-parameter distributions.
//!
//! The GLR detectors compare the means of two sub-samples through one of these functions:
//! `kl(mean_after, mean_before)`.

/// Bernoulli means are truncated to `[BERNOULLI_EPS, 1 - BERNOULLI_EPS]` before taking logs.
pub const BERNOULLI_EPS: f64 = 1e-6;

/// Default known variance for the Gaussian KL (Bernoulli rewards are 1/4-sub-Gaussian).
pub const DEFAULT_SIGMA2: f64 = 0.25;

const SIMPLEX_TOL: f64 = 1e-9;

/// KL divergence between `N(x, σ²)` and `N(y, σ²)` with a shared, known variance:
///
/// \( KL = (x - y)^2 / (2 σ^2) \).
#[inline]
pub fn kl_gaussian(x: f64, y: f64, sigma2: f64) -> f64 {
    (x - y) * (x - y) / (2.0 * sigma2)
}

/// KL divergence between `Bernoulli(x)` and `Bernoulli(y)` (nats):
///
/// \( KL = x \ln(x/y) + (1-x) \ln((1-x)/(1-y)) \),
///
/// with both means clamped to `[BERNOULLI_EPS, 1 - BERNOULLI_EPS]`, so the result is always finite.
pub fn kl_bernoulli(x: f64, y: f64) -> f64 {
    if x.is_nan() || y.is_nan() {
        return 0.0;
    }
    let x = x.clamp(BERNOULLI_EPS, 1.0 - BERNOULLI_EPS);
    let y = y.clamp(BERNOULLI_EPS, 1.0 - BERNOULLI_EPS);
    // Two strictly positive categories always form a valid simplex.
    logp::kl_divergence(&[x, 1.0 - x], &[y, 1.0 - y], SIMPLEX_TOL)
        .unwrap_or(0.0)
        .max(0.0)
}
