//! SMS delivery for OTP codes
//!
//! - **Mock**: logs a masked recipient, used in development and tests
//! - **Twilio**: Programmable Messaging over its REST API
//!
//! [`SmsGateway`] is the concrete sender the API wires into the OTP service;
//! [`create_sms_sender`] picks the variant from configuration.

pub mod mock;
#[cfg(feature = "twilio-sms")]
pub mod twilio;


use async_trait::async_trait;
use pp_core::domain::entities::OtpPurpose;
use pp_core::services::otp::SmsSender;
use pp_shared::{OtpConfig, SmsConfig, SmsProvider};

use crate::InfrastructureError;

pub use mock::MockSmsSender;
#[cfg(feature = "twilio-sms")]
pub use twilio::{TwilioConfig, TwilioSmsSender};

/// Text delivered to the subscriber
pub fn otp_message(code: &str, purpose: OtpPurpose, ttl_minutes: u64) -> String {
    let action = match purpose {
        OtpPurpose::Registration => "registration",
        OtpPurpose::Login => "login",
        OtpPurpose::PasswordReset => "password reset",
        OtpPurpose::AccountVerification => "account verification",
    };
    format!(
        "Your PalmPay {} code is {}. It expires in {} minutes. Never share this code.",
        action,
        code,
        ttl_minutes.max(1)
    )
}

/// Configured SMS sender
pub enum SmsGateway {
    Mock(MockSmsSender),
    #[cfg(feature = "twilio-sms")]
    Twilio(TwilioSmsSender),
}

impl SmsGateway {
    pub fn provider_name(&self) -> &'static str {
        match self {
            SmsGateway::Mock(_) => "mock",
            #[cfg(feature = "twilio-sms")]
            SmsGateway::Twilio(_) => "twilio",
        }
    }
}

#[async_trait]
impl SmsSender for SmsGateway {
    async fn send_otp(
        &self,
        mobile: &str,
        code: &str,
        purpose: OtpPurpose,
    ) -> Result<String, String> {
        match self {
            SmsGateway::Mock(sender) => sender.send_otp(mobile, code, purpose).await,
            #[cfg(feature = "twilio-sms")]
            SmsGateway::Twilio(sender) => sender.send_otp(mobile, code, purpose).await,
        }
    }
}

/// Create the SMS sender selected by `sms.provider`
pub fn create_sms_sender(
    sms: &SmsConfig,
    otp: &OtpConfig,
) -> Result<SmsGateway, InfrastructureError> {
    match sms.provider {
        SmsProvider::Mock => Ok(SmsGateway::Mock(MockSmsSender::new())),
        #[cfg(feature = "twilio-sms")]
        SmsProvider::Twilio => {
            let config = TwilioConfig::from_settings(sms, otp)?;
            Ok(SmsGateway::Twilio(TwilioSmsSender::new(config)?))
        }
        #[cfg(not(feature = "twilio-sms"))]
        SmsProvider::Twilio => {
            let _ = otp;
            Err(InfrastructureError::Config(
                "Twilio provider requires the twilio-sms feature".to_string(),
            ))
        }
    }
}
