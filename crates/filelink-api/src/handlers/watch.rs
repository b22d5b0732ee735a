use crate::error::HttpAppError;
use crate::pages;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::Html,
};
use filelink_core::AppError;
use std::sync::Arc;

#[tracing::instrument(skip(state), fields(operation = "watch_page"))]
pub async fn watch_page(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Html<String>, HttpAppError> {
    let record = state
        .registry
        .lookup(&key)
        .await
        .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

    let direct_link = state.links.reconstructed_direct_link(&record.key)?;

    Ok(Html(pages::watch_page(&record, &direct_link)))
}
