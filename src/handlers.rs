use crate::errors::AppError;
use crate::interaction::InteractionHandler;
use crate::models::{ClickRequest, ClickResponse, CountEntry, CountsResponse};
use crate::state::AppState;
use crate::storage::KeyValueStore;
use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Json,
};
use tokio::task::block_in_place;
use tracing::warn;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let handler = state.handler.lock().await;
    Html(handler.page_html())
}

pub async fn get_counts(State(state): State<AppState>) -> Json<CountsResponse> {
    let handler = state.handler.lock().await;
    Json(counts_response(&*handler))
}

// Mutations write the store file synchronously, so they run through
// `block_in_place` and need the multi-thread runtime.

pub async fn click(
    State(state): State<AppState>,
    Json(payload): Json<ClickRequest>,
) -> Result<Json<ClickResponse>, AppError> {
    let mut handler = state.handler.lock().await;
    let count = block_in_place(|| handler.avatar_clicked(&payload.label))?;

    Ok(Json(ClickResponse {
        label: payload.label,
        count,
    }))
}

pub async fn reset(State(state): State<AppState>) -> Result<Json<CountsResponse>, AppError> {
    let mut handler = state.handler.lock().await;
    block_in_place(|| handler.reset_clicked())?;
    Ok(Json(counts_response(&*handler)))
}

/// Form post from an avatar tile. The page is shown again whatever happens.
pub async fn avatar_form(State(state): State<AppState>, Path(label): Path<String>) -> Redirect {
    let mut handler = state.handler.lock().await;
    if let Err(err) = block_in_place(|| handler.avatar_clicked(&label)) {
        warn!("avatar click ignored: {err}");
    }
    Redirect::to("/")
}

pub async fn reset_form(State(state): State<AppState>) -> Redirect {
    let mut handler = state.handler.lock().await;
    if let Err(err) = block_in_place(|| handler.reset_clicked()) {
        warn!("reset ignored: {err}");
    }
    Redirect::to("/")
}

fn counts_response<S: KeyValueStore>(handler: &InteractionHandler<S>) -> CountsResponse {
    let renderer = handler.renderer();
    CountsResponse {
        counts: renderer
            .rows()
            .iter()
            .map(|row| CountEntry {
                label: row.label.clone(),
                display_label: row.display_label.clone(),
                count: row.count,
                activated: renderer.is_activated(&row.label),
            })
            .collect(),
    }
}
