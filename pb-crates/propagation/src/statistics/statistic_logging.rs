//! Statistics are emitted through the [`log`] facade under [`STATISTICS_TARGET`], one line per
//! statistic, so the embedding application decides whether and where they are written.

use std::fmt::Display;
use std::sync::OnceLock;

use convert_case::Case;
use convert_case::Casing;
use log::info;
use log::log_enabled;
use log::Level;

/// The `log` target of every statistic line.
pub const STATISTICS_TARGET: &str = "pb_propagation::statistics";

/// How a statistic line looks: `{prefix} {name}={value}`, with the name optionally converted to
/// another casing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatisticFormat {
    pub prefix: String,
    pub casing: Option<Case>,
}

impl Default for StatisticFormat {
    fn default() -> Self {
        Self {
            prefix: "c".to_owned(),
            casing: None,
        }
    }
}

impl StatisticFormat {
    fn line(&self, name: impl Display, value: impl Display) -> String {
        let name = match self.casing {
            Some(casing) => name.to_string().to_case(casing),
            None => name.to_string(),
        };
        format!("{} {name}={value}", self.prefix)
    }
}

static STATISTIC_FORMAT: OnceLock<StatisticFormat> = OnceLock::new();

/// Sets the format of the statistic lines; only the first call has an effect.
///
/// Returns whether the provided format is the one in use.
pub fn configure_statistic_format(format: StatisticFormat) -> bool {
    let in_use = STATISTIC_FORMAT.get_or_init(|| format.clone());
    *in_use == format
}

/// Logs the statistic `name` with the provided value.
pub fn log_statistic(name: impl Display, value: impl Display) {
    if should_log_statistics() {
        let line = STATISTIC_FORMAT
            .get_or_init(StatisticFormat::default)
            .line(name, value);
        info!(target: STATISTICS_TARGET, "{line}");
    }
}

/// Whether the installed logger accepts statistic lines.
pub fn should_log_statistics() -> bool {
    log_enabled!(target: STATISTICS_TARGET, Level::Info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_converted_to_the_configured_casing() {
        let format = StatisticFormat {
            prefix: "%%%mzn-stat:".to_owned(),
            casing: Some(Case::Camel),
        };

        assert_eq!(
            format.line("propagation_num_conflicts", 3),
            "%%%mzn-stat: propagationNumConflicts=3"
        );
    }

    #[test]
    fn default_format_keeps_the_name() {
        assert_eq!(
            StatisticFormat::default().line("propagation_num_conflicts", 3),
            "c propagation_num_conflicts=3"
        );
    }
}
