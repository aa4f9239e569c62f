//! Closed-form detection thresholds.
//!
//! Every function here is a pure function of the horizon and the detector configuration, so callers
//! may compute a threshold once per configuration and reuse it. None of them ever returns NaN or a
//! negative number: degenerate inputs map to `+∞` ("never alarm").

/// Monitored (M-UCB) threshold from McDiarmid's inequality:
///
/// \( b = \sqrt{\frac{w}{2} \ln(2 K T^2)} \),
///
/// for window size `w`, `K` arms in the experiment and horizon `T`.
///
/// # Example
///
/// ```rust
/// use banditsim::monitored_threshold;
///
/// let b = monitored_threshold(80, 1, 1000);
/// assert!((b - (40.0_f64 * (2.0e6_f64).ln()).sqrt()).abs() < 1e-12);
/// ```
pub fn monitored_threshold(window_size: usize, nb_arms: usize, horizon: usize) -> f64 {
    let w = window_size as f64;
    let k = nb_arms.max(1) as f64;
    let t = horizon.max(1) as f64;
    let b = (w / 2.0 * (2.0 * k * t * t).ln()).sqrt();
    clamp_threshold(b)
}

/// CUSUM / PHT threshold from Theorem 2 and Corollary 2 of the CUSUM-UCB analysis:
///
/// \( C_1^- = \ln\left(\frac{4ε}{(1-ε)^2} \binom{M}{\lfloor 2εM \rfloor} (2ε)^M + 1\right) \),
/// \( C_1^+ = \ln\left(\frac{4ε}{(1+ε)^2} \binom{M}{\lceil 2εM \rceil} (2ε)^M + 1\right) \),
/// \( h = \ln(T / Υ_T) / \min(C_1^-, C_1^+) \).
///
/// The products are evaluated in log space, so large `m` neither overflows the binomial
/// coefficient nor underflows `(2ε)^M`. If `C1` evaluates to zero it is replaced by `1`.
///
/// # Example
///
/// ```rust
/// use banditsim::compute_h_cusum;
///
/// let h = compute_h_cusum(1000, 1, 1, 0.5);
/// let c1 = (2.0_f64 / 2.25 + 1.0).ln();
/// assert!((h - 1000f64.ln() / c1).abs() < 1e-9);
/// ```
pub fn compute_h_cusum(
    horizon: usize,
    m: usize,
    max_nb_random_events: usize,
    epsilon: f64,
) -> f64 {
    let t = horizon.max(1) as f64;
    let upsilon = max_nb_random_events.max(1) as f64;
    let m_f = m as f64;

    let k_minus = (2.0 * epsilon * m_f).floor();
    let k_plus = (2.0 * epsilon * m_f).ceil();
    let common = (4.0 * epsilon).ln() + m_f * (2.0 * epsilon).ln();
    let log_minus = common - 2.0 * (1.0 - epsilon).abs().ln() + ln_binomial(m, k_minus);
    let log_plus = common - 2.0 * (1.0 + epsilon).abs().ln() + ln_binomial(m, k_plus);

    let mut c1 = softplus(log_minus).min(softplus(log_plus));
    if c1 == 0.0 || c1.is_nan() {
        tracing::debug!(m, epsilon, "CUSUM constant C1 vanished; using C1 = 1");
        c1 = 1.0;
    }
    clamp_threshold((t / upsilon).ln() / c1)
}

/// GLR threshold from the Laplace concentration of scan statistics (Maillard, 2018):
///
/// \( h = \left(1 + \frac{1}{t - t_0 + 1}\right) 2 \ln\left(\frac{2 (t - t_0) \sqrt{t - t_0 + 2}}{δ}\right) \),
///
/// with confidence level `δ = 1 / horizon`.
///
/// For `t == t0` the logarithm diverges to `-∞`; the result is then `+∞`.
pub fn compute_c_glr(t0: usize, t: usize, horizon: usize) -> f64 {
    let delta = 1.0 / horizon.max(1) as f64;
    let d = t.abs_diff(t0) as f64;
    let c = (1.0 + 1.0 / (d + 1.0)) * 2.0 * ((2.0 * d * (d + 2.0).sqrt()) / delta).ln();
    clamp_threshold(c)
}

/// `ln C(n, k)`, or `-∞` when `k` is outside `[0, n]`.
fn ln_binomial(n: usize, k: f64) -> f64 {
    if !(k >= 0.0) || k > n as f64 {
        return f64::NEG_INFINITY;
    }
    let k = k as usize;
    let k = k.min(n - k);
    let n_f = n as f64;
    (1..=k)
        .map(|i| {
            let i = i as f64;
            ((n_f - k as f64 + i) / i).ln()
        })
        .sum()
}

/// Stable `ln(1 + e^x)`.
fn softplus(x: f64) -> f64 {
    if x > 30.0 {
        x
    } else {
        x.exp().ln_1p()
    }
}

fn clamp_threshold(h: f64) -> f64 {
    if h.is_finite() && h >= 0.0 {
        h
    } else {
        f64::INFINITY
    }
}
