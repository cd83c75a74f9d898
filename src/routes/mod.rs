// Route exports
pub mod briefings;

use actix_web::web;

pub use briefings::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(briefings::configure),
    );
}
