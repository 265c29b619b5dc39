//! Attempt tracking for source fallback diagnostics.

use std::fmt;

use crate::models::DataSource;

/// Why a source was not asked during a lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Source is disabled in the settings.
    Disabled,

    /// Source was already asked as the preferred source.
    AlreadyTried,
}

/// What happened when a source was considered.
#[derive(Clone, Debug, PartialEq)]
pub enum AttemptOutcome {
    Skipped(SkipReason),
    NoData,
    Error(String),
    Success,
}

/// Record of a single source attempt during a lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceAttempt {
    pub source: DataSource,
    pub outcome: AttemptOutcome,
}

impl fmt::Display for SourceAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            AttemptOutcome::Skipped(reason) => write!(f, "{}: SKIPPED ({:?})", self.source, reason),
            AttemptOutcome::NoData => write!(f, "{}: NO DATA", self.source),
            AttemptOutcome::Error(err) => write!(f, "{}: ERROR ({})", self.source, err),
            AttemptOutcome::Success => write!(f, "{}: SUCCESS", self.source),
        }
    }
}

/// Ordered attempt log of one manager lookup.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FetchDiagnostics {
    pub attempts: Vec<SourceAttempt>,
}

impl FetchDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_skip(&mut self, source: DataSource, reason: SkipReason) {
        self.record(source, AttemptOutcome::Skipped(reason));
    }

    pub fn record_no_data(&mut self, source: DataSource) {
        self.record(source, AttemptOutcome::NoData);
    }

    pub fn record_error(&mut self, source: DataSource, error: String) {
        self.record(source, AttemptOutcome::Error(error));
    }

    pub fn record_success(&mut self, source: DataSource) {
        self.record(source, AttemptOutcome::Success);
    }

    fn record(&mut self, source: DataSource, outcome: AttemptOutcome) {
        self.attempts.push(SourceAttempt { source, outcome });
    }

    /// Summary for logging/debugging.
    pub fn summary(&self) -> String {
        self.attempts
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    /// Source that produced the result, if any.
    pub fn winner(&self) -> Option<DataSource> {
        self.attempts
            .iter()
            .find(|a| a.outcome == AttemptOutcome::Success)
            .map(|a| a.source)
    }

    /// Sources that were actually called, in call order.
    pub fn called(&self) -> Vec<DataSource> {
        self.attempts
            .iter()
            .filter(|a| !matches!(a.outcome, AttemptOutcome::Skipped(_)))
            .map(|a| a.source)
            .collect()
    }

    pub fn errors(&self) -> Vec<(DataSource, &str)> {
        self.attempts
            .iter()
            .filter_map(|a| match &a.outcome {
                AttemptOutcome::Error(e) => Some((a.source, e.as_str())),
                _ => None,
            })
            .collect()
    }
}
