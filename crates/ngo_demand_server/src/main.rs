use actix_cors::Cors;
use actix_web::http::header::{AUTHORIZATION, CONTENT_TYPE};
use actix_web::middleware::{Condition, Logger};
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use ngo_demand_server::auth::StaticTokenVerifier;
use ngo_demand_server::config::CliOptions;
use ngo_demand_server::error::internal_error_details;
use ngo_demand_server::rest;
use ngo_demand_server::store::{DemandStore, MemoryDemandStore};
use ngo_demand_server::{AppState, DemandManager};
use std::env;
use std::sync::Arc;
use structopt::StructOpt;

fn cors(frontend_url: Option<&str>) -> Cors {
    match frontend_url {
        Some(origin) => Cors::default()
            .allowed_origin(origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![CONTENT_TYPE, AUTHORIZATION])
            .supports_credentials(),
        None => Cors::permissive(),
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env::set_var(
        "RUST_LOG",
        env::var("RUST_LOG").unwrap_or("info".to_string()),
    );
    env_logger::init();
    let args = CliOptions::from_args();

    let problems = args.settings_problems();
    if !problems.is_empty() {
        log::error!("Invalid or missing settings:");
        for problem in &problems {
            log::error!("   - {}", problem);
        }
        std::process::exit(1);
    }
    let frontend_url = args.cors_origin().map_err(anyhow::Error::msg)?;

    let tokens_file = args
        .tokens_file
        .as_deref()
        .context("tokens file not configured")?;
    let verifier = StaticTokenVerifier::from_file(tokens_file)?;

    let store: Arc<dyn DemandStore> = match &args.data_file {
        Some(path) => Arc::new(MemoryDemandStore::with_file(path).await?),
        None => {
            log::warn!("No data file configured, demands are kept in memory only");
            Arc::new(MemoryDemandStore::new())
        }
    };

    let app_state = AppState::new(DemandManager::new(store), Arc::new(verifier));
    let development = args.is_development();

    match &frontend_url {
        Some(url) => log::info!("CORS: allowing origin {}", url),
        None => log::info!("CORS: allowing all origins"),
    }
    log::info!(
        "Starting demand server in {} mode at {}:{}",
        args.mode_label(),
        &args.http_addr,
        &args.http_port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(Condition::new(development, internal_error_details()))
            .wrap(Logger::default())
            .wrap(cors(frontend_url.as_deref()))
            .configure(rest::status::configure)
            .configure(rest::demand::configure)
            .default_service(web::to(rest::status::not_found))
    })
    .bind(format!("{}:{}", args.http_addr, args.http_port))?
    .workers(args.workers)
    .run()
    .await?;

    Ok(())
}
