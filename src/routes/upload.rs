use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::{error::AppError, models::ColumnDescriptor, services::excel, AppState};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/upload-excel",
        // Body limit above the 10MB file cap to leave room for the
        // multipart framing.
        post(upload_excel).layer(DefaultBodyLimit::max(16 * 1024 * 1024)),
    )
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    success: bool,
    columns: Vec<ColumnDescriptor>,
    #[serde(rename = "previewRows")]
    preview_rows: Vec<IndexMap<String, Value>>,
    #[serde(rename = "rawSeries")]
    raw_series: IndexMap<String, Vec<Value>>,
    #[serde(rename = "totalRows")]
    total_rows: usize,
    filename: String,
}

async fn upload_excel(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let start = std::time::Instant::now();

    let mut upload: Option<(String, Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Invalid multipart payload: {e}")))?
    {
        if field.name() == Some("file") && field.file_name().is_some() {
            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::InvalidInput(format!("Failed to read upload: {e}")))?;
            upload = Some((filename, data));
            break;
        }
    }

    let Some((filename, data)) = upload else {
        return Err(AppError::InvalidInput(
            "No se proporcionó ningún archivo".to_string(),
        ));
    };

    tracing::info!("Received upload: {} ({} bytes)", filename, data.len());

    let table = excel::ingest(data, &filename, state.config.max_file_size)?;

    tracing::info!(
        "Excel processed: {} rows, {} columns in {:?}",
        table.total_rows,
        table.columns.len(),
        start.elapsed()
    );

    Ok(Json(UploadResponse {
        success: true,
        columns: table.columns,
        preview_rows: table.preview_rows,
        raw_series: table.raw_series,
        total_rows: table.total_rows,
        filename,
    }))
}
