// handlers/protected/domains/mod.rs - Domain management for the request's tenant

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::ApiError;

pub mod create; // POST   /api/domains
pub mod delete; // DELETE /api/domains/:id
pub mod health; // GET    /api/domains/:id/health
pub mod list; // GET    /api/domains
pub mod update; // PATCH  /api/domains/:id
pub mod verification; // POST /api/domains/:id/verification[/confirm]

pub use create::post as domain_create;
pub use delete::delete as domain_delete;
pub use health::get as domain_health;
pub use list::get as domain_list;
pub use update::patch as domain_update;
pub use verification::{confirm as domain_verification_confirm, start as domain_verification_start};

/// Unwrap a JSON body, answering malformed input with the API error envelope
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::bad_request(format!("Invalid request body: {}", rejection.body_text())))
}
