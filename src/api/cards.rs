//! Admin card writes / 管理员卡片录入接口

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::JsonRejection,
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use snowthaw_backend::error::ValidationError;
use snowthaw_backend::models::{Card, CardCreate, UploadSummary, UploadedFile};

use super::auth::RequireAdmin;
use super::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Multipart field names accepted as uploaded files
const FILE_FIELDS: &[&str] = &["files", "file"];

/// POST /admin/cards - 创建单张卡片
pub async fn create_card(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    body: Result<Json<CardCreate>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Card>)> {
    let Json(req) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    req.validate()?;

    let service = state.ingestion().await?;
    let card = service.create_single(&req.name, &req.story).await?;
    tracing::debug!("Card {} created by {}", card.id, admin);

    Ok((StatusCode::CREATED, Json(card)))
}

/// POST /admin/cards/upload - 批量上传文本文件，每个文件一张卡片
pub async fn upload_cards(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadSummary>> {
    let mut multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        let is_file = field.file_name().is_some()
            || field.name().map_or(false, |n| FILE_FIELDS.contains(&n));
        if !is_file {
            continue;
        }

        let filename = field.file_name().map(|s| s.to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        files.push(UploadedFile {
            filename,
            data: data.to_vec(),
        });
    }

    tracing::debug!("{} uploaded {} files", admin, files.len());
    if files.is_empty() {
        return Err(ValidationError::NoFiles.into());
    }

    let service = state.ingestion().await?;
    let summary = service.create_batch(files).await?;
    Ok(Json(summary))
}
