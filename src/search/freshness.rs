//! Staleness gate for the host index
//!
//! Persists the last-refresh instant as decimal Unix epoch seconds in a plain
//! text file and decides, once per run, whether the index is due for a
//! rebuild.

use chrono::{DateTime, Utc};
use std::path::PathBuf;

use super::errors::StateError;

/// TTL-based gate over a persisted last-refresh timestamp.
pub struct FreshnessGate {
    state_path: PathBuf,
    ttl_secs: u64,
}

impl FreshnessGate {
    /// Gate persisting to `state_path` with a TTL in seconds.
    pub fn new(state_path: impl Into<PathBuf>, ttl_secs: u64) -> Self {
        Self {
            state_path: state_path.into(),
            ttl_secs,
        }
    }

    /// Decide whether the index is due for a rebuild.
    ///
    /// A `true` verdict persists "now" immediately, before the caller performs
    /// the rebuild: the TTL window is consumed even if that rebuild later
    /// fails. Absent or unparsable state counts as stale, so the first run
    /// always refreshes. Comparison is against total elapsed seconds.
    pub fn should_refresh(&self) -> Result<bool, StateError> {
        let now = Utc::now();
        let last_refresh = self.read_state(now)?;
        let elapsed = now.signed_duration_since(last_refresh);
        let due = elapsed.num_seconds() > i64::try_from(self.ttl_secs).unwrap_or(i64::MAX);

        tracing::info!(
            elapsed_secs = elapsed.num_seconds(),
            ttl_secs = self.ttl_secs,
            due,
            "evaluated index freshness"
        );

        if due {
            self.write_state(now)?;
        }

        Ok(due)
    }

    /// Sentinel strictly older than the TTL window.
    fn stale_sentinel(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let ttl = i64::try_from(self.ttl_secs).unwrap_or(i64::MAX);
        let sentinel = now.timestamp().saturating_sub(ttl).saturating_sub(1);
        DateTime::from_timestamp(sentinel, 0).unwrap_or(DateTime::UNIX_EPOCH)
    }

    fn read_state(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, StateError> {
        let raw = match std::fs::read_to_string(&self.state_path) {
            Ok(raw) => raw,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.state_path.display(), "no refresh state yet");
                return Ok(self.stale_sentinel(now));
            }
            Err(source) => {
                return Err(StateError::Read {
                    path: self.state_path.clone(),
                    source,
                });
            }
        };

        match raw
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
        {
            Some(last_refresh) => Ok(last_refresh),
            None => {
                tracing::warn!(
                    path = %self.state_path.display(),
                    "refresh state is unreadable, treating index as stale"
                );
                Ok(self.stale_sentinel(now))
            }
        }
    }

    fn write_state(&self, now: DateTime<Utc>) -> Result<(), StateError> {
        std::fs::write(&self.state_path, format!("{}\n", now.timestamp())).map_err(|source| {
            StateError::Write {
                path: self.state_path.clone(),
                source,
            }
        })
    }
}
