use axum::Json;
use axum_macros::debug_handler;
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct Health {
    pub version: &'static str,
}

#[debug_handler]
pub async fn get_health() -> Json<Health> {
    Json(Health {
        version: env!("CARGO_PKG_VERSION"),
    })
}
