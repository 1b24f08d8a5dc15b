//! Internal logging helpers for structured contentrepo events.

/// Single logging target for contentrepo.
pub(crate) const LOG_TARGET: &str = "contentrepo";

macro_rules! repo_log {
    ($level:expr, $event:expr, $fmt:expr $(, $args:expr)* $(,)?) => {{
        if log::log_enabled!(target: $crate::logging::LOG_TARGET, $level) {
            log::log!(
                target: $crate::logging::LOG_TARGET,
                $level,
                "event={} {}",
                $event,
                format_args!($fmt $(, $args)*)
            );
        }
    }};
}

pub(crate) use repo_log;
