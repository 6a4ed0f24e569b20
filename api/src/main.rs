use actix_web::{web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

use pp_api::middleware::create_cors;
use pp_api::{build_stores, configure, AppState, ChallengeStore, UserStore};
use pp_core::services::otp::{OtpService, OtpServiceConfig};
use pp_core::services::sweeper::ExpirySweeper;
use pp_core::services::token::{JwtTokenIssuer, TokenServiceConfig};
use pp_infra::sms::{create_sms_sender, SmsGateway};
use pp_shared::{AppConfig, LoggingConfig};

type ServerState = AppState<ChallengeStore, UserStore, SmsGateway, JwtTokenIssuer>;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    tracing::info!(
        environment = %config.environment,
        store = %config.store,
        "Starting PalmPay API server"
    );

    let (challenges, users) = build_stores(&config)
        .await
        .context("Failed to initialize stores")?;
    let challenges = Arc::new(challenges);

    let sms_sender =
        create_sms_sender(&config.sms, &config.otp).context("Failed to create SMS sender")?;
    tracing::info!(provider = sms_sender.provider_name(), "SMS sender ready");

    let otp_service = OtpService::new(
        challenges.clone(),
        Arc::new(users),
        Arc::new(sms_sender),
        Arc::new(JwtTokenIssuer::new(TokenServiceConfig::from(&config.jwt))),
        OtpServiceConfig::from(&config.otp),
    );
    if config.otp.expose_code {
        tracing::warn!("OTP codes are returned in API responses; development only");
    }

    let _sweeper =
        Arc::new(ExpirySweeper::new(challenges, config.sweeper.clone())).start_background_task();

    let state: web::Data<ServerState> = web::Data::new(AppState::new(Arc::new(otp_service)));
    let bind_address = config.server.bind_address();
    let server_config = config.server.clone();
    let environment = config.environment;

    tracing::info!(address = %bind_address, "Server will bind");

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(create_cors(&server_config, environment))
            .wrap(TracingLogger::default())
            .app_data(state.clone())
            .configure(configure::<ChallengeStore, UserStore, SmsGateway, JwtTokenIssuer>)
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run()
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Install the global subscriber; `RUST_LOG` overrides the configured level
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    if logging.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
