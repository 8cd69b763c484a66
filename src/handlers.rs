use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;

use crate::models::AppState;
use crate::render::render_error;

fn svg_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("image/svg+xml"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers
}

// fetches the latest weather and serves it as a freshly rendered svg
pub async fn weather_svg(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.source.fetch_report(state.hours, state.days).await {
        Ok(report) => {
            let now = chrono::Utc::now().timestamp();
            let svg = state.renderer.render(&report, now);
            (StatusCode::OK, svg_headers(), svg).into_response()
        }
        Err(e) => {
            log::error!("Failed to fetch weather: {}", e);
            let svg = render_error(&format!("Error fetching weather: {}", e));
            (StatusCode::BAD_GATEWAY, svg_headers(), svg).into_response()
        }
    }
}
