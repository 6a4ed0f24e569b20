//! Background purge of expired OTP challenges
//!
//! Reads never return expired challenges, so the sweeper only reclaims
//! storage. Stores with native expiry (Redis) report zero purged rows.

use pp_shared::SweeperConfig;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::errors::DomainError;
use crate::repositories::OtpChallengeRepository;

/// Periodically calls [`OtpChallengeRepository::purge_expired`]
pub struct ExpirySweeper<S: OtpChallengeRepository + 'static> {
    store: Arc<S>,
    config: SweeperConfig,
}

impl<S: OtpChallengeRepository> ExpirySweeper<S> {
    pub fn new(store: Arc<S>, config: SweeperConfig) -> Self {
        Self { store, config }
    }

    /// Run a single sweep
    pub async fn run_sweep(&self) -> Result<SweepResult, DomainError> {
        let started = Instant::now();
        let purged = self.store.purge_expired().await?;
        let result = SweepResult {
            purged,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        if purged > 0 {
            info!(
                purged = result.purged,
                duration_ms = result.duration_ms,
                event = "otp_sweep_completed",
                "Purged expired OTP challenges"
            );
        }

        Ok(result)
    }

    /// Start the sweeper as a background task
    ///
    /// Returns `None` when the sweeper is disabled.
    pub fn start_background_task(self: Arc<Self>) -> Option<JoinHandle<()>> {
        if !self.config.enabled {
            warn!("OTP expiry sweeper is disabled");
            return None;
        }

        let interval = self.config.interval();

        Some(tokio::spawn(async move {
            info!(
                interval_seconds = interval.as_secs(),
                "OTP expiry sweeper started"
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                if let Err(e) = self.run_sweep().await {
                    error!(error = %e, event = "otp_sweep_failed", "OTP expiry sweep failed");
                }
            }
        }))
    }
}

/// Result of a sweep
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepResult {
    /// Number of expired challenges removed
    pub purged: u64,
    pub duration_ms: u64,
}
