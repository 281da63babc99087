use shuttle_axum::axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::ingest::types::Article;
use crate::ingest::NewsService;
use crate::rejections::RejectionRecord;

#[derive(Clone)]
pub struct AppState {
    pub news: NewsService,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/news", get(news))
        .route("/news/instant", get(news_instant))
        .route("/news/rejections", get(news_rejections))
        .route("/admin/clear-cache", post(admin_clear_cache))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn news(State(state): State<AppState>) -> Response {
    match state.news.aggregate().await {
        Ok(articles) => Json(articles).into_response(),
        Err(e) => {
            tracing::error!(error = ?e, "aggregate failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "aggregate failed").into_response()
        }
    }
}

async fn news_instant(State(state): State<AppState>) -> Json<Vec<Article>> {
    Json(state.news.curated())
}

async fn news_rejections(State(state): State<AppState>) -> Json<Vec<RejectionRecord>> {
    Json(state.news.rejections())
}

async fn admin_clear_cache(State(state): State<AppState>) -> StatusCode {
    state.news.clear_cache();
    StatusCode::NO_CONTENT
}
