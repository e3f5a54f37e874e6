use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tokio_util::io::ReaderStream;
use tracing::{instrument, warn};

use crate::error::{AppError, ErrorBody};
use crate::models::drawing::{DownloadQuery, SignedUrlQuery, SignedUrlResponse};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/signed-url",
    tag = "Files",
    operation_id = "issueSignedUrl",
    summary = "Issue a time-limited download link",
    description = "Returns a URL that grants read access to one object for `ttl` seconds \
        (default 3600, at most 604800). With the S3 backend this is a presigned URL; with the \
        filesystem backend it points at this server's download route.",
    params(SignedUrlQuery),
    responses(
        (status = 200, description = "Signed URL", body = SignedUrlResponse),
        (status = 400, description = "Invalid path or TTL (VALIDATION_ERROR)", body = ErrorBody),
        (status = 502, description = "Object store unreachable (STORE_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(path = %query.path))]
pub async fn issue_signed_url(
    State(state): State<AppState>,
    Query(query): Query<SignedUrlQuery>,
) -> Result<Json<SignedUrlResponse>, AppError> {
    let signed = state
        .drawings
        .issue_download_url(&query.path, query.ttl)
        .await?;

    Ok(Json(SignedUrlResponse {
        url: signed.url,
        expires_in: signed.ttl.as_secs(),
    }))
}

/// Serve an object through a link issued by the filesystem backend.
#[instrument(skip(state, query))]
pub async fn download_object(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, AppError> {
    let Some(store) = state.local_files.as_ref() else {
        return Err(AppError::NotFound(
            "Downloads are served by the object store".into(),
        ));
    };

    store
        .signer()
        .verify(&key, query.expires, &query.signature, Utc::now().timestamp())
        .inspect_err(|e| warn!(key = %key, reason = %e, "Rejected download link"))?;

    let (file, size) = store.open(&key).await?;
    let body = Body::from_stream(ReaderStream::new(file));

    let filename = key.rsplit('/').next().unwrap_or(&key);
    let content_type = mime_guess::from_path(filename)
        .first_or_octet_stream()
        .to_string();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, size.to_string())
        .header(header::CONTENT_DISPOSITION, inline_disposition(filename))
        .header(header::CACHE_CONTROL, "private, no-store")
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}

/// RFC 5987 `attr-char`: alphanumerics plus ``!#$&+-.^_`|~``.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// Inline disposition for a drawing. Characters that cannot appear in the
/// quoted `filename` become `_`; `filename*` carries the exact name.
fn inline_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() && !matches!(c, '"' | ';' | '\\') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "inline; filename=\"{fallback}\"; filename*=UTF-8''{}",
        utf8_percent_encode(filename, ATTR_CHAR)
    )
}
