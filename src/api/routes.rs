use super::{check, health};
use actix_web::{get, web, HttpResponse, Responder};

#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(concat!(env!("CARGO_PKG_NAME"), " is running"))
}

/// Register every route on an app or test service.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(health::routes())
        .service(check::routes());
}
