// Prometheus metrics for the judge API

use arena_common::types::Language;
use arena_engine::SuiteRun;
use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec_with_registry, register_int_counter_vec_with_registry, Encoder,
    HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    pub static ref SUBMISSIONS_TOTAL: IntCounterVec = register_int_counter_vec_with_registry!(
        Opts::new("arena_submissions_total", "Submissions handled, by language and outcome"),
        &["language", "outcome"],
        REGISTRY
    )
    .expect("arena_submissions_total can be registered");

    pub static ref TEST_CASES_TOTAL: IntCounterVec = register_int_counter_vec_with_registry!(
        Opts::new("arena_test_cases_total", "Test cases judged, by verdict"),
        &["verdict"],
        REGISTRY
    )
    .expect("arena_test_cases_total can be registered");

    pub static ref JUDGE_DURATION_SECONDS: HistogramVec = register_histogram_vec_with_registry!(
        HistogramOpts::new("arena_judge_duration_seconds", "Wall-clock time to judge a submission")
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["language"],
        REGISTRY
    )
    .expect("arena_judge_duration_seconds can be registered");
}

/// Submission outcome label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every test case passed.
    Accepted,
    /// Judged, at least one case failed.
    Rejected,
    /// Failed validation.
    Invalid,
    Error,
    Cancelled,
}

impl Outcome {
    fn as_str(&self) -> &'static str {
        match self {
            Outcome::Accepted => "accepted",
            Outcome::Rejected => "rejected",
            Outcome::Invalid => "invalid",
            Outcome::Error => "error",
            Outcome::Cancelled => "cancelled",
        }
    }
}

/// Label for a resolved language; raw tags never become label values.
fn language_label(language: Option<Language>) -> &'static str {
    language.map(|l| l.as_str()).unwrap_or("other")
}

pub fn record_submission(language: Option<Language>, outcome: Outcome) {
    SUBMISSIONS_TOTAL
        .with_label_values(&[language_label(language), outcome.as_str()])
        .inc();
}

pub fn record_run(run: &SuiteRun, elapsed: Duration) {
    for case in &run.cases {
        TEST_CASES_TOTAL
            .with_label_values(&[case.verdict.as_str()])
            .inc();
    }
    JUDGE_DURATION_SECONDS
        .with_label_values(&[run.language.as_str()])
        .observe(elapsed.as_secs_f64());
}

/// Text exposition of every registered metric.
pub fn gather() -> Result<String, prometheus::Error> {
    lazy_static::initialize(&SUBMISSIONS_TOTAL);
    lazy_static::initialize(&TEST_CASES_TOTAL);
    lazy_static::initialize(&JUDGE_DURATION_SECONDS);

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
