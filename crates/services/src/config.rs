use std::env;
use std::time::Duration;

const DEFAULT_SUBMIT_TIMEOUT_SECS: u64 = 15;

/// Policy knobs for running quiz sessions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Upper bound on one grading call before the submit is treated as failed.
    pub submit_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            submit_timeout: Duration::from_secs(DEFAULT_SUBMIT_TIMEOUT_SECS),
        }
    }
}

impl SessionConfig {
    /// Reads `QUIZ_SUBMIT_TIMEOUT_SECS`, falling back to 15 seconds.
    #[must_use]
    pub fn from_env() -> Self {
        let submit_timeout = env::var("QUIZ_SUBMIT_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map_or(Self::default().submit_timeout, Duration::from_secs);
        Self { submit_timeout }
    }

    #[must_use]
    pub fn with_submit_timeout(mut self, submit_timeout: Duration) -> Self {
        self.submit_timeout = submit_timeout;
        self
    }
}
