use crate::state::AppState;
use crate::{assets, handlers};
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/avatars/:label/click", post(handlers::avatar_form))
        .route("/reset", post(handlers::reset_form))
        .route("/images/:file", get(assets::image))
        .route("/api/counts", get(handlers::get_counts))
        .route("/api/click", post(handlers::click))
        .route("/api/reset", post(handlers::reset))
        .with_state(state)
}
