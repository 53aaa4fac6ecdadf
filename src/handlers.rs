use std::io::ErrorKind;

use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, Query, State, multipart::MultipartRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use futures::TryStreamExt;
use serde::Serialize;
use tokio_util::io::{ReaderStream, StreamReader};
use tracing::{debug, info, warn};

use crate::AppState;
use crate::error::{GatewayError, MessageResponse};
use crate::listing::{self, ListingOptions, ListingQuery};
use crate::storage::StorageError;

/// Multipart field carrying the uploaded bytes.
const UPLOAD_FIELD: &str = "file";

/// Directory listing response
#[derive(Debug, Serialize)]
pub struct DirectoryListing {
    #[serde(rename = "isDirectory")]
    pub is_directory: bool,
    pub files: Vec<String>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub root: String,
}

#[derive(Debug, Serialize)]
pub struct EndpointDoc {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
    pub parameters: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct DocsResponse {
    pub endpoints: &'static [EndpointDoc],
}

const ENDPOINTS: &[EndpointDoc] = &[
    EndpointDoc {
        method: "GET",
        path: "/",
        description: "Welcome message",
        parameters: &[],
    },
    EndpointDoc {
        method: "GET",
        path: "/docs",
        description: "This endpoint catalogue",
        parameters: &[],
    },
    EndpointDoc {
        method: "GET",
        path: "/health",
        description: "Health check",
        parameters: &[],
    },
    EndpointDoc {
        method: "GET",
        path: "/file/{path}",
        description: "Read a file, or list a directory",
        parameters: &[
            "orderBy: lastModified | size | fileName",
            "orderByDirection: Ascending | Descending",
            "filterByName: case-insensitive substring",
        ],
    },
    EndpointDoc {
        method: "POST",
        path: "/file/{path}",
        description: "Upload a new file, creating missing directories",
        parameters: &["file: multipart field with the file contents"],
    },
    EndpointDoc {
        method: "PATCH",
        path: "/file/{path}",
        description: "Overwrite an existing file",
        parameters: &["file: multipart field with the file contents"],
    },
    EndpointDoc {
        method: "DELETE",
        path: "/file/{path}",
        description: "Delete a file",
        parameters: &[],
    },
];

#[derive(Debug, Clone, Copy)]
enum WriteMode {
    Create,
    Update,
}

// ============================================================================
// Helper functions
// ============================================================================

/// On reads a missing entry is reported as a missing path, not a missing file.
fn path_not_found(err: StorageError) -> GatewayError {
    match err {
        StorageError::NotFound(_) => GatewayError::PathNotFound,
        other => other.into(),
    }
}

async fn retrieve(
    state: &AppState,
    path: &str,
    query: &ListingQuery,
) -> Result<Response, GatewayError> {
    let metadata = state.storage.metadata(path).await.map_err(path_not_found)?;

    if metadata.is_dir {
        let options = ListingOptions::from(query);
        let entries = state.storage.list(path).await.map_err(path_not_found)?;

        debug!(
            "Listing {:?}: {} entries, order {:?} {:?}, filter {:?}",
            path,
            entries.len(),
            options.order_by,
            options.direction,
            options.filter
        );

        let files = listing::arrange(entries, &options);
        return Ok(Json(DirectoryListing {
            is_directory: true,
            files,
        })
        .into_response());
    }

    debug!("Streaming file: {:?} ({} bytes)", path, metadata.size);

    let reader = state.storage.open(path).await.map_err(path_not_found)?;
    let body = Body::from_stream(ReaderStream::new(reader));

    let mime = mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string();

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    // Sanitize filename for Content-Disposition header
    let safe_filename = file_name.replace('"', "'");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime),
            (header::CONTENT_LENGTH, metadata.size.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", safe_filename),
            ),
        ],
        body,
    )
        .into_response())
}

/// Find the `file` field and stream it into storage.
async fn write_upload(
    state: &AppState,
    path: &str,
    multipart: Result<Multipart, MultipartRejection>,
    mode: WriteMode,
) -> Result<u64, GatewayError> {
    let mut multipart = multipart.map_err(|e| {
        warn!("Rejected upload to {:?}: {}", path, e.body_text());
        GatewayError::InvalidUpload(format!("Invalid upload: {}", e.body_text()))
    })?;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!("Multipart error parsing field: {}", e);
        GatewayError::Multipart(e)
    })? {
        if field.name() != Some(UPLOAD_FIELD) {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }

        let stream = field.map_err(|e| std::io::Error::new(ErrorKind::InvalidData, e));
        let mut reader = StreamReader::new(Box::pin(stream));

        let written = match mode {
            WriteMode::Create => state.storage.create(path, &mut reader).await?,
            WriteMode::Update => state.storage.update(path, &mut reader).await?,
        };
        return Ok(written);
    }

    Err(GatewayError::InvalidUpload(format!(
        "Missing multipart field `{}`",
        UPLOAD_FIELD
    )))
}

async fn create(
    state: &AppState,
    path: String,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), GatewayError> {
    let written = write_upload(state, &path, multipart, WriteMode::Create).await?;
    info!("Uploaded file: {:?} ({} bytes)", path, written);

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(format!(
            "File has been uploaded to {}",
            path
        ))),
    ))
}

async fn update(
    state: &AppState,
    path: String,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<MessageResponse>, GatewayError> {
    let written = write_upload(state, &path, multipart, WriteMode::Update).await?;
    info!("Updated file: {:?} ({} bytes)", path, written);

    Ok(Json(MessageResponse::new(format!("{} has been updated", path))))
}

async fn delete(state: &AppState, path: String) -> Result<Json<MessageResponse>, GatewayError> {
    match state.storage.remove_file(&path).await {
        Ok(()) => {}
        Err(StorageError::NotAFile { source, .. }) => {
            warn!("Refusing to delete {:?}: {}", path, source);
            return Err(GatewayError::NotAFile);
        }
        Err(e) => return Err(e.into()),
    }

    info!("Deleted file: {:?}", path);
    Ok(Json(MessageResponse::new(format!("{} has been deleted", path))))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET / - Welcome message
pub async fn index() -> Json<MessageResponse> {
    Json(MessageResponse::new(
        "Welcome, please refer to `/docs` for endpoints.",
    ))
}

/// GET /docs - Endpoint catalogue
pub async fn docs() -> Json<DocsResponse> {
    Json(DocsResponse {
        endpoints: ENDPOINTS,
    })
}

/// GET /health - Health check endpoint
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        root: state.storage.root().display().to_string(),
    })
}

/// GET /file/{path} - Read a file or list a directory
pub async fn get_path(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, GatewayError> {
    retrieve(&state, &path, &params.into_iter().collect()).await
}

/// GET /file/ - List the base directory
pub async fn get_root(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, GatewayError> {
    retrieve(&state, "", &params.into_iter().collect()).await
}

/// POST /file/{path} - Upload a new file
pub async fn upload_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), GatewayError> {
    create(&state, path, multipart).await
}

/// POST /file/ - Always refused, the base directory exists
pub async fn upload_root(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), GatewayError> {
    create(&state, String::new(), multipart).await
}

/// PATCH /file/{path} - Overwrite an existing file
pub async fn update_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<MessageResponse>, GatewayError> {
    update(&state, path, multipart).await
}

/// PATCH /file/
pub async fn update_root(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<MessageResponse>, GatewayError> {
    update(&state, String::new(), multipart).await
}

/// DELETE /file/{path} - Delete a file
pub async fn delete_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Json<MessageResponse>, GatewayError> {
    delete(&state, path).await
}

/// DELETE /file/
pub async fn delete_root(State(state): State<AppState>) -> Result<Json<MessageResponse>, GatewayError> {
    delete(&state, String::new()).await
}
