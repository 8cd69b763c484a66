use axum::Router;
use std::sync::Arc;
use crate::handlers;
use crate::models::AppState;

// sets up all the routes for the web server
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", axum::routing::get(handlers::weather_svg))
        .route("/weather.svg", axum::routing::get(handlers::weather_svg))
        .with_state(state)
}
