use banditsim::detect::{
    AnyDetector, BernoulliGlr, ChangeDetector, Cusum, GaussianGlr, Monitored, Pht, PurelyRandom,
};
use banditsim::{
    check_one_measure, detection_delay, false_alarm, missed_detection, toy_data, Measure, Tau,
    ToyConfig,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

const TRIALS: u64 = 20;

fn shift_streams(cfg: &ToyConfig) -> Vec<Vec<f64>> {
    (0..TRIALS)
        .map(|seed| {
            let mut rng = StdRng::seed_from_u64(1_000 + seed);
            toy_data(cfg, &mut rng).unwrap()
        })
        .collect()
}

fn data_driven_detectors() -> Vec<AnyDetector> {
    vec![
        Monitored::default().into(),
        Cusum::default().into(),
        Pht::default().into(),
        GaussianGlr::default().into(),
        BernoulliGlr::default().into(),
    ]
}

#[test]
fn glr_detects_a_sharp_shift_quickly() {
    // 0.1 -> 0.9 at tau = 500 of T = 1000.
    let streams = shift_streams(&ToyConfig::default());
    for det in [
        AnyDetector::from(GaussianGlr::default()),
        AnyDetector::from(BernoulliGlr::default()),
    ] {
        let fast = streams
            .iter()
            .filter(|data| detection_delay(&det, data, 500) < 100)
            .count();
        assert!(fast as u64 >= TRIALS - 1, "{}: {fast}/{TRIALS} fast detections", det.name());
    }
}

#[test]
fn window_and_cumulative_tests_detect_the_shift() {
    let streams = shift_streams(&ToyConfig::default());
    for det in [
        AnyDetector::from(Monitored::default()),
        AnyDetector::from(Cusum::default()),
        AnyDetector::from(Pht::default()),
    ] {
        let missed = streams
            .iter()
            .filter(|data| missed_detection(&det, data, 500))
            .count();
        assert_eq!(missed, 0, "{}", det.name());
        let slow = streams
            .iter()
            .filter(|data| detection_delay(&det, data, 500) >= 150)
            .count();
        assert!(slow <= 1, "{}: {slow} slow detections", det.name());
    }
}

#[test]
fn constant_streams_never_raise_an_alarm() {
    for c in [0.0, 0.1, 0.5, 0.9, 1.0] {
        let data = vec![c; 1000];
        for det in data_driven_detectors() {
            assert!(!false_alarm(&det, &data, 1000), "{} on constant {c}", det.name());
        }
    }
}

#[test]
fn stationary_bernoulli_streams_rarely_raise_an_alarm() {
    let cfg = ToyConfig {
        first_mean: 0.1,
        second_mean: 0.1,
        ..ToyConfig::default()
    };
    let streams = shift_streams(&cfg);
    for det in data_driven_detectors() {
        let alarms = streams
            .iter()
            .filter(|data| false_alarm(&det, data, 1000))
            .count();
        assert!(alarms <= 2, "{}: {alarms}/{TRIALS} false alarms", det.name());
    }
}

#[test]
fn gaussian_glr_on_gaussian_data() {
    let cfg = ToyConfig {
        first_mean: 0.2,
        second_mean: 0.8,
        ..ToyConfig::default()
    }
    .gaussian();
    let streams = shift_streams(&cfg);
    let det = GaussianGlr::default();
    let fast = streams
        .iter()
        .filter(|data| !false_alarm(&det, data, 500) && detection_delay(&det, data, 500) < 100)
        .count();
    assert!(fast as u64 >= TRIALS - 2, "{fast}/{TRIALS}");
}

#[test]
fn nan_observations_never_turn_into_detections() {
    let data = vec![f64::NAN; 300];
    for det in data_driven_detectors() {
        for t in (0..=300).step_by(10) {
            assert!(!det.detect(&data, t), "{} at t={t}", det.name());
        }
    }
}

#[test]
fn measure_report_ranks_the_baseline_last_on_false_alarms() {
    let toy = ToyConfig {
        horizon: 400,
        tau: Tau::Fraction(0.5),
        ..ToyConfig::default()
    };
    let report =
        check_one_measure(Measure::FalseAlarm, &AnyDetector::all_defaults(), &toy, 10, 7).unwrap();
    assert_eq!(report.tau, 200);
    // Over 200 steps a 5% coin fires almost surely.
    assert_eq!(report.mean_of("PurelyRandom"), Some(1.0));
    for name in ["Monitored", "CUSUM", "PHT", "GaussianGLR"] {
        let m = report.mean_of(name).unwrap();
        assert!(m <= 0.2, "{name}: {m}");
    }
}

#[test]
fn purely_random_delay_is_about_one_over_proba() {
    let data = vec![0.0; 10_000];
    let mut total = 0usize;
    let n = 200;
    for seed in 0..n {
        let det = PurelyRandom::new(banditsim::PurelyRandomConfig { proba: 0.05, seed }).unwrap();
        total += detection_delay(&det, &data, 0);
    }
    let mean = total as f64 / n as f64;
    assert!((mean - 19.0).abs() < 6.0, "mean delay {mean}");
}
