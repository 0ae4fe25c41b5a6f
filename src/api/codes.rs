// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Code submission endpoints.
//!
//! Create and update take multipart bodies so the source file rides along
//! with the metadata fields. Mutations go through the claimed-owner check:
//! a plain user must name themselves in `userID` and that name must match
//! the record, while admins may act on any submission.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::auth::Auth;
use crate::error::ApiError;
use crate::models::{DeleteCodeRequest, MessageResponse};
use crate::query::{project_records, RawPageParams};
use crate::state::AppState;
use crate::storage::{
    can_mutate, verify_claimed_owner, CleanupOutcome, CodeLifecycle, CodeRepository, CodeResponse,
    LifecycleError, ReceivedUpload, StorageError, UploadError,
};

// ========== Request / Response Types ==========

/// Response for a created submission.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateCodeResponse {
    pub message: String,
    /// The stored submission record.
    pub code: CodeResponse,
}

/// Multipart form for creating and updating submissions.
///
/// Documentation only; the handlers read the parts by hand so the parts
/// may arrive in any order.
#[derive(ToSchema)]
#[allow(non_snake_case, dead_code)]
struct CodeForm {
    /// Language the submission is written in.
    language: String,
    /// Owner account id the caller is acting for.
    userID: String,
    /// The source file (text/x-c or application/javascript).
    #[schema(value_type = String, format = Binary)]
    sourceCode: Vec<u8>,
}

/// Metadata fields and the optional file pulled out of a multipart body.
#[derive(Default)]
struct ParsedForm {
    language: Option<String>,
    claimed_owner: Option<String>,
    upload: Option<ReceivedUpload>,
}

// ========== Helpers ==========

async fn parse_code_form(mut multipart: Multipart) -> Result<ParsedForm, ApiError> {
    let mut form = ParsedForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "language" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Unreadable language field: {e}")))?;
                form.language = Some(value);
            }
            "userID" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Unreadable userID field: {e}")))?;
                form.claimed_owner = Some(value);
            }
            "sourceCode" => {
                let original_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Unreadable source file: {e}")))?;
                form.upload = Some(ReceivedUpload {
                    bytes: bytes.to_vec(),
                    original_name,
                    content_type,
                });
            }
            // Unknown parts are skipped rather than rejected.
            _ => {}
        }
    }

    Ok(form)
}

fn map_lifecycle_error(err: LifecycleError) -> ApiError {
    match err {
        LifecycleError::OwnerNotFound(id) => ApiError::not_found(format!("User {id} not found")),
        LifecycleError::Upload(UploadError::UnsupportedContentType(ct)) => {
            ApiError::unsupported_media_type(format!("Unsupported content type: {ct}"))
        }
        LifecycleError::Upload(other) => ApiError::internal(format!("Upload failed: {other}")),
        LifecycleError::Storage(StorageError::NotFound(what)) => {
            ApiError::not_found(format!("{what} not found"))
        }
        LifecycleError::Storage(other) => ApiError::internal(format!("Storage failed: {other}")),
    }
}

/// A failed file cleanup never fails the request, but it does leave an
/// orphan on disk worth flagging.
fn log_cleanup(outcome: &CleanupOutcome) {
    if let CleanupOutcome::Failed { stored_name, reason } = outcome {
        tracing::warn!(file = %stored_name, error = %reason, "orphaned upload left behind");
    }
}

// ========== Handlers ==========

/// List code submissions.
#[utoipa::path(
    get,
    path = "/codes",
    tag = "Codes",
    params(RawPageParams),
    responses(
        (status = 200, description = "Submissions matching the page window", body = Vec<CodeResponse>)
    )
)]
pub async fn list_codes(
    State(state): State<AppState>,
    Query(params): Query<RawPageParams>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let window = params.normalize();

    let repo = CodeRepository::new(&state.storage);
    let codes = repo
        .list(&window)
        .map_err(|e| ApiError::internal(format!("Failed to list codes: {e}")))?;

    let responses: Vec<CodeResponse> = codes.into_iter().map(CodeResponse::from).collect();
    let projected = project_records(&responses, &window.fields)
        .map_err(|e| ApiError::internal(format!("Failed to project codes: {e}")))?;

    Ok(Json(projected))
}

/// Fetch a single submission record by id.
#[utoipa::path(
    get,
    path = "/codes/{code_id}",
    tag = "Codes",
    params(
        ("code_id" = String, Path, description = "Submission id")
    ),
    responses(
        (status = 200, description = "Submission found", body = CodeResponse),
        (status = 404, description = "No such submission")
    )
)]
pub async fn get_code(
    State(state): State<AppState>,
    Path(code_id): Path<String>,
) -> Result<Json<CodeResponse>, ApiError> {
    let repo = CodeRepository::new(&state.storage);

    let code = repo.get(&code_id).map_err(|e| match e {
        StorageError::NotFound(_) => ApiError::not_found(format!("Code {code_id} not found")),
        other => ApiError::internal(format!("Failed to load code: {other}")),
    })?;

    Ok(Json(CodeResponse::from(code)))
}

/// Download the source file behind a submission.
#[utoipa::path(
    get,
    path = "/codes/uploads/{code_id}",
    tag = "Codes",
    params(
        ("code_id" = String, Path, description = "Submission id")
    ),
    responses(
        (status = 200, description = "The stored source file", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 404, description = "Submission or file not found")
    )
)]
pub async fn download_code(
    State(state): State<AppState>,
    Path(code_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CodeRepository::new(&state.storage);

    let code = repo.get(&code_id).map_err(|e| match e {
        StorageError::NotFound(_) => ApiError::not_found(format!("Code {code_id} not found")),
        other => ApiError::internal(format!("Failed to load code: {other}")),
    })?;

    let bytes = state.uploads.read(&code.source_file).map_err(|e| match e {
        UploadError::NotFound(name) => ApiError::not_found(format!("File {name} not found")),
        other => ApiError::internal(format!("Failed to read upload: {other}")),
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", code.source_file),
            ),
        ],
        bytes,
    ))
}

/// Submit a new code file.
///
/// The caller names the owner in `userID`; plain users may only name
/// themselves. The file lands before the record, and a failed record
/// write takes the file back out.
#[utoipa::path(
    post,
    path = "/codes",
    tag = "Codes",
    request_body(content = CodeForm, content_type = "multipart/form-data"),
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Submission created", body = CreateCodeResponse),
        (status = 400, description = "Missing or malformed form fields"),
        (status = 403, description = "Caller may not create for the named owner"),
        (status = 404, description = "Named owner does not exist"),
        (status = 415, description = "File content type not allowed")
    )
)]
pub async fn create_code(
    Auth(actor): Auth,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<CreateCodeResponse>), ApiError> {
    let form = parse_code_form(multipart).await?;

    let Some(owner) = form.claimed_owner else {
        return Err(ApiError::bad_request("userID is required"));
    };
    if !can_mutate(&actor, &owner) {
        return Err(ApiError::forbidden(
            "You do not have permission to create codes for this user",
        ));
    }
    let Some(language) = form.language else {
        return Err(ApiError::bad_request("language is required"));
    };
    let Some(upload) = form.upload else {
        return Err(ApiError::bad_request("sourceCode file is required"));
    };

    let lifecycle = CodeLifecycle::new(&state.storage, &state.uploads);
    let code = lifecycle
        .create(&owner, &language, &upload)
        .map_err(map_lifecycle_error)?;

    tracing::info!(code_id = %code.id, owner = %code.user_id, "code created");

    Ok((
        StatusCode::CREATED,
        Json(CreateCodeResponse {
            message: "Code created".to_string(),
            code: CodeResponse::from(code),
        }),
    ))
}

/// Update a submission's language, file, or both.
///
/// The claim in `userID` is checked twice: once on its face before the
/// store is touched, and again against the recorded owner once the
/// record is loaded. Replacing the file removes the previous one after
/// the record points at the new file.
#[utoipa::path(
    patch,
    path = "/codes/{code_id}",
    tag = "Codes",
    params(
        ("code_id" = String, Path, description = "Submission id")
    ),
    request_body(content = CodeForm, content_type = "multipart/form-data"),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Submission updated", body = MessageResponse),
        (status = 403, description = "Caller may not modify this submission"),
        (status = 404, description = "No such submission"),
        (status = 415, description = "File content type not allowed")
    )
)]
pub async fn update_code(
    Auth(actor): Auth,
    State(state): State<AppState>,
    Path(code_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<MessageResponse>, ApiError> {
    let form = parse_code_form(multipart).await?;
    let claimed = form.claimed_owner;

    verify_claimed_owner(&actor, claimed.as_deref(), None).map_err(|_| {
        ApiError::forbidden("You do not have permission to modify this code")
    })?;

    let repo = CodeRepository::new(&state.storage);
    let code = repo.get(&code_id).map_err(|e| match e {
        StorageError::NotFound(_) => ApiError::not_found(format!("Code {code_id} not found")),
        other => ApiError::internal(format!("Failed to load code: {other}")),
    })?;

    verify_claimed_owner(&actor, claimed.as_deref(), Some(&code.user_id)).map_err(|_| {
        ApiError::forbidden("You do not have permission to modify this code")
    })?;

    let lifecycle = CodeLifecycle::new(&state.storage, &state.uploads);
    let (updated, outcome) = lifecycle
        .replace(&code_id, form.language.as_deref(), form.upload.as_ref())
        .map_err(map_lifecycle_error)?;
    log_cleanup(&outcome);

    tracing::info!(code_id = %updated.id, actor = %actor.user_id, "code updated");

    Ok(Json(MessageResponse::new("Code updated")))
}

/// Delete a submission and its file.
///
/// The optional JSON body carries the caller's `userID` claim, checked
/// the same way as an update. The record goes first; a file that will
/// not delete is logged and left behind.
#[utoipa::path(
    delete,
    path = "/codes/{code_id}",
    tag = "Codes",
    params(
        ("code_id" = String, Path, description = "Submission id")
    ),
    request_body = DeleteCodeRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Submission deleted", body = MessageResponse),
        (status = 403, description = "Caller may not delete this submission"),
        (status = 404, description = "No such submission")
    )
)]
pub async fn delete_code(
    Auth(actor): Auth,
    State(state): State<AppState>,
    Path(code_id): Path<String>,
    body: Option<Json<DeleteCodeRequest>>,
) -> Result<Json<MessageResponse>, ApiError> {
    let claimed = body.and_then(|Json(request)| request.user_id);

    verify_claimed_owner(&actor, claimed.as_deref(), None).map_err(|_| {
        ApiError::forbidden("You do not have permission to delete this code")
    })?;

    let repo = CodeRepository::new(&state.storage);
    let code = repo.get(&code_id).map_err(|e| match e {
        StorageError::NotFound(_) => ApiError::not_found(format!("Code {code_id} not found")),
        other => ApiError::internal(format!("Failed to load code: {other}")),
    })?;

    verify_claimed_owner(&actor, claimed.as_deref(), Some(&code.user_id)).map_err(|_| {
        ApiError::forbidden("You do not have permission to delete this code")
    })?;

    let lifecycle = CodeLifecycle::new(&state.storage, &state.uploads);
    let (_removed, outcome) = lifecycle.delete(&code_id).map_err(map_lifecycle_error)?;
    log_cleanup(&outcome);

    tracing::info!(code_id = %code_id, actor = %actor.user_id, "code deleted");

    Ok(Json(MessageResponse::new("Code deleted")))
}
