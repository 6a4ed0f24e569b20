use actix_web::HttpResponse;
use pp_shared::types::HealthResponse;
use pp_shared::ApiResponse;

/// Handler for GET /health
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(
        "Service is healthy",
        HealthResponse::healthy(env!("CARGO_PKG_VERSION")),
    ))
}
