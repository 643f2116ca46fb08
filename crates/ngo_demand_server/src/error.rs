//! Error taxonomy of the demand server and its HTTP mapping.

use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::middleware::{ErrorHandlerResponse, ErrorHandlers};
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::model::demand::base::DemandStatus;

pub type Result<T> = std::result::Result<T, DemandError>;

#[derive(Error, Debug)]
pub enum DemandError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Demand not found: {0}")]
    NotFound(Uuid),

    #[error("Demand {id} is already {status}")]
    Conflict { id: Uuid, status: DemandStatus },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl DemandError {
    pub fn kind(&self) -> &'static str {
        match self {
            DemandError::InvalidInput(_) => "INVALID_INPUT",
            DemandError::Unauthorized => "UNAUTHORIZED",
            DemandError::Forbidden(_) => "FORBIDDEN",
            DemandError::NotFound(_) => "NOT_FOUND",
            DemandError::Conflict { .. } => "CONFLICT",
            DemandError::Internal(_) => "INTERNAL",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    kind: &'static str,
    message: String,
}

impl ResponseError for DemandError {
    fn status_code(&self) -> StatusCode {
        match self {
            DemandError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            DemandError::Unauthorized => StatusCode::UNAUTHORIZED,
            DemandError::Forbidden(_) => StatusCode::FORBIDDEN,
            DemandError::NotFound(_) => StatusCode::NOT_FOUND,
            DemandError::Conflict { .. } => StatusCode::CONFLICT,
            DemandError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            DemandError::Internal(e) => {
                log::error!("Internal error: {:#}", e);
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(ErrorBody {
            success: false,
            kind: self.kind(),
            message,
        })
    }
}

/// Middleware that puts the cause chain of internal errors back into the response body.
/// Only installed in development mode.
pub fn internal_error_details<B: 'static>() -> ErrorHandlers<B> {
    ErrorHandlers::new().handler(StatusCode::INTERNAL_SERVER_ERROR, expose_internal_details)
}

fn expose_internal_details<B>(
    res: ServiceResponse<B>,
) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let detail = res
        .response()
        .error()
        .and_then(|e| e.as_error::<DemandError>())
        .and_then(|e| match e {
            DemandError::Internal(inner) => Some(format!("{:#}", inner)),
            _ => None,
        });
    let Some(detail) = detail else {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    };

    let (req, _) = res.into_parts();
    let response = HttpResponse::InternalServerError().json(ErrorBody {
        success: false,
        kind: "INTERNAL",
        message: detail,
    });
    Ok(ErrorHandlerResponse::Response(
        ServiceResponse::new(req, response).map_into_right_body(),
    ))
}
