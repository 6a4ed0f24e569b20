//! Mock SMS sender
//!
//! Logs the masked recipient instead of sending anything and generates
//! mock message IDs. The code itself is never logged here.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use pp_core::domain::entities::OtpPurpose;
use pp_core::services::otp::SmsSender;
use pp_shared::phone::mask_phone_number;

/// Log-only SMS sender for development and testing
#[derive(Clone, Default)]
pub struct MockSmsSender {
    /// Counter for tracking number of messages sent
    message_count: Arc<AtomicU64>,
    /// Whether to simulate failures (for testing)
    simulate_failure: Arc<AtomicBool>,
}

impl MockSmsSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the total number of messages sent
    pub fn get_message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    /// Enable or disable failure simulation
    pub fn set_simulate_failure(&self, simulate: bool) {
        self.simulate_failure.store(simulate, Ordering::SeqCst);
    }
}

#[async_trait]
impl SmsSender for MockSmsSender {
    async fn send_otp(
        &self,
        mobile: &str,
        _code: &str,
        purpose: OtpPurpose,
    ) -> Result<String, String> {
        if self.simulate_failure.load(Ordering::SeqCst) {
            warn!(
                mobile = %mask_phone_number(mobile),
                purpose = %purpose,
                "Mock SMS sender simulating failure"
            );
            return Err("Mock SMS failure".to_string());
        }

        let message_id = format!("mock_{}", Uuid::new_v4());
        self.message_count.fetch_add(1, Ordering::SeqCst);

        info!(
            mobile = %mask_phone_number(mobile),
            purpose = %purpose,
            message_id = %message_id,
            "[MOCK SMS] OTP message accepted"
        );

        Ok(message_id)
    }
}
