//! Workload size, read from `BENCH_*` environment variables

use std::env;

/// Bench workload settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchConfig {
    /// Streamers registered before the run
    pub users: usize,
    /// Concurrent writer tasks
    pub writers: usize,
    /// Events each writer submits
    pub events_per_writer: usize,
    /// Share of events that are comments, in percent
    pub comment_percent: u8,
    /// Largest tip a comment carries
    pub max_tip: i64,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            users: 10,
            writers: 32,
            events_per_writer: 100,
            comment_percent: 40,
            max_tip: 10_000,
        }
    }
}

impl BenchConfig {
    pub fn from_env() -> Result<Self, BenchConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, BenchConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parse = |key: &'static str, default: usize| -> Result<usize, BenchConfigError> {
            match lookup(key) {
                Some(raw) => match raw.trim().parse::<usize>() {
                    Ok(0) | Err(_) => Err(BenchConfigError::Invalid(key, raw)),
                    Ok(value) => Ok(value),
                },
                None => Ok(default),
            }
        };

        let comment_percent = match lookup("BENCH_COMMENT_PERCENT") {
            Some(raw) => match raw.trim().parse::<u8>() {
                Ok(value) if value <= 100 => value,
                _ => return Err(BenchConfigError::Invalid("BENCH_COMMENT_PERCENT", raw)),
            },
            None => defaults.comment_percent,
        };

        Ok(Self {
            users: parse("BENCH_USERS", defaults.users)?,
            writers: parse("BENCH_WRITERS", defaults.writers)?,
            events_per_writer: parse("BENCH_EVENTS_PER_WRITER", defaults.events_per_writer)?,
            comment_percent,
            max_tip: defaults.max_tip,
        })
    }

    /// Events submitted across all writers
    pub fn total_events(&self) -> usize {
        self.writers * self.events_per_writer
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BenchConfigError {
    #[error("Invalid value for {0}: {1} (expected a positive integer)")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BenchConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, BenchConfig::default());
        assert_eq!(config.total_events(), 3200);
    }

    #[test]
    fn test_overrides_and_rejects_zero() {
        let config = BenchConfig::from_lookup(|key| match key {
            "BENCH_USERS" => Some("3".to_string()),
            "BENCH_COMMENT_PERCENT" => Some("100".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.users, 3);
        assert_eq!(config.comment_percent, 100);

        let err = BenchConfig::from_lookup(|key| (key == "BENCH_WRITERS").then(|| "0".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("BENCH_WRITERS"));

        assert!(BenchConfig::from_lookup(|key| {
            (key == "BENCH_COMMENT_PERCENT").then(|| "150".to_string())
        })
        .is_err());
    }
}
