use std::fmt::Display;

use itertools::Itertools;

use super::statistic_logging::log_statistic;

/// Writes statistics whose names share a path, e.g. `propagation_provenance_dual`.
#[derive(Debug, Default, Clone)]
pub struct StatisticLogger {
    path: String,
}

impl StatisticLogger {
    pub fn new(segments: impl IntoIterator<Item = impl Display>) -> StatisticLogger {
        StatisticLogger {
            path: segments.into_iter().join("_"),
        }
    }

    /// A logger one segment deeper than this one.
    pub fn child(&self, segment: impl Display) -> StatisticLogger {
        let path = if self.path.is_empty() {
            segment.to_string()
        } else {
            format!("{}_{segment}", self.path)
        };
        StatisticLogger { path }
    }

    pub fn log_statistic(&self, value: impl Display) {
        log_statistic(&self.path, value);
    }
}
