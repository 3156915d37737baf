//! Run configuration.

use std::time::Duration;

/// Tunables for one orchestrator instance.
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// Bound on waiting for a child process to exit after EOF or a
    /// termination request; past it the child is force-killed.
    pub kill_timeout: Duration,
    /// Cadence of cancel/skip checks while a child process is silent.
    pub poll_interval: Duration,
    /// Identifier used in run banners and tracing spans. Generated when not
    /// provided.
    pub run_id: Option<String>,
}

impl RunConfig {
    pub const DEFAULT_KILL_TIMEOUT: Duration = Duration::from_secs(10);
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

    fn resolve_kill_timeout() -> Duration {
        dotenvy::dotenv().ok();
        std::env::var("MENDRUN_KILL_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Self::DEFAULT_KILL_TIMEOUT)
    }

    #[must_use]
    pub fn with_kill_timeout(mut self, kill_timeout: Duration) -> Self {
        self.kill_timeout = kill_timeout;
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    #[must_use]
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            kill_timeout: Self::resolve_kill_timeout(),
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            run_id: Some(format!("run-{}", uuid::Uuid::new_v4())),
        }
    }
}
