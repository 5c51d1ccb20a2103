//! Counters of the propagation engine and the plumbing which writes them to the log.
mod statistic_logger;
mod statistic_logging;

use std::fmt::Display;

pub use statistic_logger::StatisticLogger;
pub use statistic_logging::configure_statistic_format;
pub use statistic_logging::log_statistic;
pub use statistic_logging::should_log_statistics;
pub use statistic_logging::StatisticFormat;
pub use statistic_logging::STATISTICS_TARGET;

/// A value, or a group of values, which can be written out through a [`StatisticLogger`].
///
/// Groups are usually declared with [`statistic_counters!`](crate::statistic_counters).
pub trait Statistic {
    fn log(&self, logger: &StatisticLogger);
}

impl<Value: Display> Statistic for Value {
    fn log(&self, logger: &StatisticLogger) {
        logger.log_statistic(self);
    }
}

/// Declares a plain struct of public counters which logs every field under its own name.
///
/// ```rust
/// # use pb_propagation::statistic_counters;
/// statistic_counters!(
///     /// Work done by a single search.
///     SearchCounters {
///         num_restarts: u64,
///         num_decisions: u64,
///     }
/// );
///
/// let mut counters = SearchCounters::default();
/// counters.num_decisions += 1;
/// assert_eq!(counters.num_restarts, 0);
/// ```
#[macro_export]
macro_rules! statistic_counters {
    (
        $(#[$outer:meta])*
        $name:ident {
            $($(#[$field_meta:meta])* $field:ident : $field_type:ty),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
        pub struct $name {
            $($(#[$field_meta])* pub $field: $field_type),+
        }

        impl $crate::statistics::Statistic for $name {
            fn log(&self, logger: &$crate::statistics::StatisticLogger) {
                $(
                    $crate::statistics::Statistic::log(
                        &self.$field,
                        &logger.child(stringify!($field)),
                    );
                )+
            }
        }
    };
}
