use crate::error::DemandError;
use crate::model::principal::Principal;
use crate::state::AppState;
use actix_web::{web, HttpResponse};

pub async fn list_demands(
    data: web::Data<AppState>,
    principal: Principal,
) -> Result<HttpResponse, DemandError> {
    let demands = data.manager.get_all_demands(&principal).await?;
    Ok(HttpResponse::Ok().json(demands))
}

pub async fn list_ngo_demands(
    data: web::Data<AppState>,
    principal: Principal,
    ngo_id: web::Path<String>,
) -> Result<HttpResponse, DemandError> {
    let demands = data
        .manager
        .get_demands_by_ngo(&principal, &ngo_id)
        .await?;
    Ok(HttpResponse::Ok().json(demands))
}
