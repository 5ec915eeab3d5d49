//! HTTP request handlers
//!
//! Every data-path request follows the same ordering: access guard
//! first, then the retention sweep, then the store operation. The sweep
//! must run before serving so an over-age file is deleted before it
//! could be returned.

use actix_multipart::Multipart;
use actix_web::http::header;
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use bytes::BytesMut;
use chrono::Utc;
use futures::StreamExt;
use log::info;
use serde_json::json;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::mirror::remote_path_for;

#[get("/")]
pub async fn home() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": "CSV Upload API Running" }))
}

#[get("/healthcheck")]
pub async fn healthcheck() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

#[post("/upload")]
pub async fn upload(
    req: HttpRequest,
    payload: Multipart,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    authorize(&req, &state)?;
    sweep(&state)?;

    let (file_name, bytes) = read_file_field(payload).await?;
    if !file_name.ends_with(".csv") {
        return Err(ApiError::InvalidExtension(file_name));
    }

    let stored_name = if state.config.store.timestamp_names {
        format!("{}_{}", Utc::now().format("%Y%m%d_%H%M%S"), file_name)
    } else {
        file_name
    };

    let stored = state.store.put(&stored_name, &bytes)?;

    // The local write is not rolled back when the mirror fails; the
    // caller sees the failure while the file stays retrievable locally.
    let status = match &state.mirror {
        Some(mirror) => {
            mirror.mirror(&bytes, &remote_path_for(&stored.name)).await?;
            "mirrored"
        }
        None => "saved",
    };

    info!("Upload complete: {} ({})", stored.name, status);
    Ok(HttpResponse::Ok().json(json!({ "filename": stored.name, "status": status })))
}

#[get("/download/{filename}")]
pub async fn download(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    authorize(&req, &state)?;
    sweep(&state)?;

    let bytes = state.store.get(&path)?;
    Ok(HttpResponse::Ok().content_type("text/csv").body(bytes))
}

#[get("/files")]
pub async fn list_files(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    authorize(&req, &state)?;
    sweep(&state)?;

    let files = state.store.list()?;
    Ok(HttpResponse::Ok().json(json!({ "files": files })))
}

fn authorize(req: &HttpRequest, state: &AppState) -> Result<(), ApiError> {
    if let Some(guard) = &state.guard {
        let presented = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        guard.verify(presented)?;
    }
    Ok(())
}

fn sweep(state: &AppState) -> Result<(), ApiError> {
    if let Some(sweeper) = &state.sweeper {
        let removed = sweeper.sweep(state.store.as_ref())?;
        if removed > 0 {
            info!("Retention sweep removed {} file(s)", removed);
        }
    }
    Ok(())
}

/// Pull the first multipart field that carries a filename and drain its
/// chunks. Fields without a filename (plain form values) are skipped.
async fn read_file_field(mut payload: Multipart) -> Result<(String, Vec<u8>), ApiError> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| ApiError::BadUpload(e.to_string()))?;

        let file_name = match field.content_disposition().get_filename() {
            Some(name) => name.to_owned(),
            None => continue,
        };

        let mut bytes = BytesMut::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| ApiError::BadUpload(e.to_string()))?;
            bytes.extend_from_slice(&chunk);
        }

        if bytes.is_empty() {
            return Err(ApiError::BadUpload("no data was uploaded".to_string()));
        }
        return Ok((file_name, bytes.to_vec()));
    }

    Err(ApiError::BadUpload("missing file field".to_string()))
}
