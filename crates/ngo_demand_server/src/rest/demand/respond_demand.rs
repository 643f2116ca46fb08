use crate::error::DemandError;
use crate::model::principal::Principal;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

fn parse_demand_id(raw: &str) -> Result<Uuid, DemandError> {
    Uuid::parse_str(raw).map_err(|e| {
        log::debug!("Rejecting demand id {}: {}", raw, e);
        DemandError::InvalidInput(format!("Invalid demand id {}", raw))
    })
}

pub async fn accept_demand(
    data: web::Data<AppState>,
    principal: Principal,
    demand_id: web::Path<String>,
) -> Result<HttpResponse, DemandError> {
    let demand_id = parse_demand_id(&demand_id)?;
    let demand = data.manager.accept_demand(&principal, demand_id).await?;
    Ok(HttpResponse::Ok().json(demand))
}

pub async fn ignore_demand(
    data: web::Data<AppState>,
    principal: Principal,
    demand_id: web::Path<String>,
) -> Result<HttpResponse, DemandError> {
    let demand_id = parse_demand_id(&demand_id)?;
    let demand = data.manager.ignore_demand(&principal, demand_id).await?;
    Ok(HttpResponse::Ok().json(demand))
}
