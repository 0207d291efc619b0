//! Service configuration.

use outreach_core::error::{OutreachError, OutreachResult};
use outreach_core::query::{DEFAULT_LIST_LIMIT, DEFAULT_RECENT_WINDOW_MONTHS};

/// Tunables shared by the services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Page size of the default listings (default: 10).
    pub list_limit: u64,
    /// Length of the recent-events window in months (default: 2).
    pub recent_window_months: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            list_limit: DEFAULT_LIST_LIMIT,
            recent_window_months: DEFAULT_RECENT_WINDOW_MONTHS,
        }
    }
}

impl ServiceConfig {
    /// Read `OUTREACH_LIST_LIMIT` and `OUTREACH_RECENT_WINDOW_MONTHS`
    /// through `lookup`; unset values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> OutreachResult<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup("OUTREACH_LIST_LIMIT") {
            config.list_limit = parse_positive("OUTREACH_LIST_LIMIT", &raw)?;
        }
        if let Some(raw) = lookup("OUTREACH_RECENT_WINDOW_MONTHS") {
            config.recent_window_months = parse_positive("OUTREACH_RECENT_WINDOW_MONTHS", &raw)?;
        }

        Ok(config)
    }

    pub fn from_env() -> OutreachResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

fn parse_positive<T>(key: &str, raw: &str) -> OutreachResult<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => Err(OutreachError::Configuration(format!(
            "{key} must be a positive integer, got {raw:?}"
        ))),
    }
}
