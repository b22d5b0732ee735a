use crate::pages;
use crate::state::AppState;
use axum::{extract::State, response::Html};
use std::sync::Arc;

/// Informational status page.
pub async fn status_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let file_count = state.registry.size().await;
    Html(pages::status_page(file_count, state.started_at.elapsed()))
}
