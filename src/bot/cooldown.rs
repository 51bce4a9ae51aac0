use chrono::{DateTime, Duration, Utc};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::storage;

/// Time left before a user may use a gated command again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownRemaining {
    pub minutes: i64,
    pub seconds: i64,
}

impl CooldownRemaining {
    fn from_millis(remaining_ms: i64) -> Self {
        Self {
            minutes: remaining_ms / 60_000,
            // Ceiling, so 1ms left still reads as 1s
            seconds: (remaining_ms % 60_000 + 999) / 1000,
        }
    }
}

impl std::fmt::Display for CooldownRemaining {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}m {}s", self.minutes, self.seconds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownStatus {
    /// Allowed; the caller should `record` the use
    Ready,
    /// Privileged caller, ledger untouched
    Bypassed,
    Waiting(CooldownRemaining),
}

/// Per-user last-use ledger, persisted as `{ "username": epoch_ms }`
pub struct CooldownGate {
    last_used: HashMap<String, i64>,
    window: Duration,
    data_path: PathBuf,
}

impl CooldownGate {
    /// Load the ledger from disk. A missing or unreadable file starts an empty ledger.
    pub fn load<P: AsRef<Path>>(data_path: P, window: Duration) -> Self {
        let data_path = data_path.as_ref().to_path_buf();

        let last_used = match storage::read_json_optional::<HashMap<String, i64>>(&data_path) {
            Ok(Some(mut ledger)) => {
                let before = ledger.len();
                ledger.retain(|_, ms| DateTime::from_timestamp_millis(*ms).is_some());
                if ledger.len() < before {
                    warn!("Dropped {} out-of-range cooldown entries", before - ledger.len());
                }
                info!("Loaded {} cooldown entries from {}", ledger.len(), data_path.display());
                ledger
            }
            Ok(None) => {
                debug!("No cooldown ledger at {}, starting empty", data_path.display());
                HashMap::new()
            }
            Err(e) => {
                warn!("Failed to load cooldown ledger, starting empty: {:#}", e);
                HashMap::new()
            }
        };

        Self {
            last_used,
            window,
            data_path,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn last_use(&self, user: &str) -> Option<DateTime<Utc>> {
        self.last_used
            .get(&user.to_lowercase())
            .and_then(|ms| DateTime::from_timestamp_millis(*ms))
    }

    /// Decide whether `user` may use the command at `now`
    pub fn try_use(&self, user: &str, now: DateTime<Utc>, bypass: bool) -> CooldownStatus {
        if bypass {
            return CooldownStatus::Bypassed;
        }

        let last = match self.last_used.get(&user.to_lowercase()) {
            Some(ms) => *ms,
            None => return CooldownStatus::Ready,
        };

        let elapsed_ms = now.timestamp_millis().saturating_sub(last);
        let window_ms = self.window.num_milliseconds();
        if elapsed_ms < window_ms {
            CooldownStatus::Waiting(CooldownRemaining::from_millis(window_ms.saturating_sub(elapsed_ms)))
        } else {
            CooldownStatus::Ready
        }
    }

    /// Store `now` as the user's last use and rewrite the ledger file
    pub fn record(&mut self, user: &str, now: DateTime<Utc>) {
        let stamp = now.timestamp_millis();
        let entry = self.last_used.entry(user.to_lowercase()).or_insert(stamp);
        *entry = (*entry).max(stamp);
        self.save();
    }

    fn save(&self) {
        if let Err(e) = storage::write_json(&self.data_path, &self.last_used, false) {
            error!("Failed to save cooldown ledger: {:#}", e);
        }
    }
}
