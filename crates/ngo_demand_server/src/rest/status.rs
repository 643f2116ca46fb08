use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde_json::json;

pub async fn api_root() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Food Donation App API is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Server is healthy",
        "timestamp": Utc::now(),
    }))
}

/// Connectivity check for mobile clients.
pub async fn api_test(req: HttpRequest) -> HttpResponse {
    let client_ip = req
        .connection_info()
        .realip_remote_addr()
        .map(str::to_string);
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Backend is reachable!",
        "timestamp": Utc::now(),
        "clientIP": client_ip,
    }))
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({
        "success": false,
        "message": "Route not found",
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(api_root))
        .route("/health", web::get().to(health))
        .route("/api/test", web::get().to(api_test))
        .route(
            "/version",
            web::get().to(|| async { HttpResponse::Ok().body(env!("CARGO_PKG_VERSION")) }),
        );
}
