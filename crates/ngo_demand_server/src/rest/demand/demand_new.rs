use crate::error::DemandError;
use crate::model::demand::base::NewDemand;
use crate::model::principal::Principal;
use crate::state::AppState;
use actix_web::error::JsonPayloadError;
use actix_web::{web, HttpRequest, HttpResponse};

pub const MAX_DEMAND_BODY_BYTES: usize = 16 * 1024;

/// Body decoding for demand payloads. Any content type is accepted and every decoding failure,
/// including an oversized body, is answered with the `InvalidInput` envelope.
pub fn demand_json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_DEMAND_BODY_BYTES)
        .content_type_required(false)
        .error_handler(decode_error)
}

fn decode_error(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    log::error!("Error decoding demand on {} {}: {}", req.method(), req.path(), err);
    let message = match err {
        JsonPayloadError::OverflowKnownLength { length, limit } => {
            format!("Demand body of {} bytes exceeds {} bytes", length, limit)
        }
        JsonPayloadError::Overflow { limit } => {
            format!("Demand body exceeds {} bytes", limit)
        }
        other => format!("Invalid demand format {}", other),
    };
    DemandError::InvalidInput(message).into()
}

pub async fn demand_new(
    data: web::Data<AppState>,
    principal: Principal,
    payload: web::Json<NewDemand>,
) -> Result<HttpResponse, DemandError> {
    let demand = data
        .manager
        .create_demand(&principal, payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(demand))
}
