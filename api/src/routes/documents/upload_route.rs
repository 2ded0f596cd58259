use axum::extract::{Multipart, State};
use tracing::{debug, instrument};

use doc_ingest::{IngestReport, SourceFile, UploadMetadata, ingest_files, progress::NoopProgress};

use crate::core::{app_state::AppState, http::response_envelope::ApiResponse};
use crate::error_handler::{AppError, AppResult};

/// POST /documents
///
/// Multipart body: any number of file parts plus optional `source`,
/// `company` and `year` text fields. Files are ingested from memory; a file
/// that fails is listed in `failures` and does not stop the others.
#[instrument(skip_all)]
pub async fn upload_documents(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<IngestReport>> {
    let mut files = Vec::new();
    let mut meta = UploadMetadata::default();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let bytes = field.bytes().await?;
                debug!(file = %file_name, bytes = bytes.len(), "received file");
                files.push(SourceFile {
                    name: file_name,
                    bytes: bytes.to_vec(),
                });
            }
            None => {
                let value = field.text().await?;
                match field_name.as_str() {
                    "source" => meta.source = Some(value),
                    "company" => meta.company = Some(value),
                    "year" => meta.year = Some(value),
                    other => debug!(field = other, "ignoring form field"),
                }
            }
        }
    }

    if files.is_empty() {
        return Err(AppError::BadRequest("no files in upload".into()));
    }

    let report = ingest_files(
        state.store.as_ref(),
        files,
        &meta,
        &state.ingest,
        &NoopProgress,
    )
    .await;
    Ok(ApiResponse::success(report))
}
