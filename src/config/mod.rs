use std::env;
use std::str::FromStr;

/// Default exclusive low-stock threshold.
///
/// Earlier dashboard revisions flagged products below 15 units (slots of 50) while the current
/// machine holds at most 10 per slot, so the threshold is configurable via `LOW_STOCK_THRESHOLD`.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 3;

/// Maximum units a single vending slot holds.
pub const DEFAULT_STOCK_CAPACITY_MAX: i64 = 10;

/// Longest daily series the dashboard renders.
pub const MAX_DAILY_WINDOW_DAYS: u32 = 366;

/// Largest page size the vending API accepts for `GET /orders`.
pub const MAX_ORDERS_PAGE_LIMIT: u32 = 100;

/// Configuration loading failure.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("{key}={value} is outside {min}..={max}")]
    OutOfRange {
        key: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("Invalid hour range: {start}..={end}")]
    InvalidHourRange { start: u32, end: u32 },
}

/// Inclusive range of hours covered by the hourly buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourRange {
    start: u32,
    end: u32,
}

impl HourRange {
    pub fn new(start: u32, end: u32) -> Result<Self, ConfigError> {
        if start > end || end > 23 {
            return Err(ConfigError::InvalidHourRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn contains(&self, hour: u32) -> bool {
        (self.start..=self.end).contains(&hour)
    }
}

impl Default for HourRange {
    fn default() -> Self {
        Self { start: 8, end: 19 }
    }
}

/// Policy constants driving the derived dashboard statistics.
#[derive(Debug, Clone)]
pub struct AnalyticsPolicy {
    pub low_stock_threshold: i64,
    pub stock_capacity_max: i64,
    pub hour_range: HourRange,
    pub daily_window_days: u32,
    pub top_products_limit: usize,
    pub orders_page_limit: u32,
    pub orders_fetch_max_pages: u32,
}

impl Default for AnalyticsPolicy {
    fn default() -> Self {
        Self {
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            stock_capacity_max: DEFAULT_STOCK_CAPACITY_MAX,
            hour_range: HourRange::default(),
            daily_window_days: 7,
            top_products_limit: 5,
            orders_page_limit: 20,
            orders_fetch_max_pages: 50,
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub api_timeout_secs: u64,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub policy: AnalyticsPolicy,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = AnalyticsPolicy::default();

        let hour_range = HourRange::new(
            parse_var("PEAK_HOUR_START", defaults.hour_range.start())?,
            parse_var("PEAK_HOUR_END", defaults.hour_range.end())?,
        )?;

        let policy = AnalyticsPolicy {
            low_stock_threshold: parse_var("LOW_STOCK_THRESHOLD", defaults.low_stock_threshold)?,
            stock_capacity_max: parse_var("STOCK_CAPACITY_MAX", defaults.stock_capacity_max)?,
            hour_range,
            daily_window_days: check_bounds(
                "DAILY_WINDOW_DAYS",
                parse_var("DAILY_WINDOW_DAYS", defaults.daily_window_days)?,
                1,
                MAX_DAILY_WINDOW_DAYS,
            )?,
            top_products_limit: parse_var("TOP_PRODUCTS_LIMIT", defaults.top_products_limit)?,
            orders_page_limit: check_bounds(
                "ORDERS_PAGE_LIMIT",
                parse_var("ORDERS_PAGE_LIMIT", defaults.orders_page_limit)?,
                1,
                MAX_ORDERS_PAGE_LIMIT,
            )?,
            orders_fetch_max_pages: check_bounds(
                "ORDERS_FETCH_MAX_PAGES",
                parse_var("ORDERS_FETCH_MAX_PAGES", defaults.orders_fetch_max_pages)?,
                1,
                u32::MAX,
            )?,
        };

        if policy.low_stock_threshold > policy.stock_capacity_max {
            tracing::warn!(
                threshold = policy.low_stock_threshold,
                capacity = policy.stock_capacity_max,
                "Low-stock threshold exceeds slot capacity; every product will be flagged"
            );
        }

        Ok(Self {
            api_base_url: env::var("VENDING_API_URL")
                .unwrap_or_else(|_| "http://localhost:5000/api".to_string()),
            api_timeout_secs: parse_var("VENDING_API_TIMEOUT_SECS", 30)?,
            host: env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("BACKEND_PORT", 3000)?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            policy,
        })
    }
}

/// Read an optional variable, falling back to `default` when unset.
fn parse_var<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}

fn check_bounds(key: &'static str, value: u32, min: u32, max: u32) -> Result<u32, ConfigError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::OutOfRange {
            key,
            value: u64::from(value),
            min: u64::from(min),
            max: u64::from(max),
        })
    }
}
