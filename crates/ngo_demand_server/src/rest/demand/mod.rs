pub mod demand_new;
pub mod list_demands;
pub mod respond_demand;

use actix_web::web;

/// Demand routes. Every handler takes a `Principal`, so all of them require a bearer token.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/demands")
            .app_data(demand_new::demand_json_config())
            .route("", web::get().to(list_demands::list_demands))
            .route("/", web::get().to(list_demands::list_demands))
            .route("", web::post().to(demand_new::demand_new))
            .route("/", web::post().to(demand_new::demand_new))
            .route("/ngo/{ngo_id}", web::get().to(list_demands::list_ngo_demands))
            .route("/{id}/accept", web::post().to(respond_demand::accept_demand))
            .route("/{id}/ignore", web::post().to(respond_demand::ignore_demand)),
    );
}
