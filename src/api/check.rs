use actix_web::{route, web, HttpResponse};
use serde_json::json;

use crate::errors::AppResult;
use crate::state::AppState;

/// Run one poll cycle immediately.
#[route("", method = "GET", method = "POST")]
pub async fn run_check(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    tracing::info!("Manual feed check requested");
    let outcome = state.run_check().await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Check completed",
        "result": outcome
    })))
}

pub fn routes() -> actix_web::Scope {
    web::scope("/check").service(run_check)
}
