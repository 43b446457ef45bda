//! Card ingestion - single submissions and batch uploads / 卡片录入
//!
//! Batch uploads turn each file into one card: the file stem becomes the
//! name, the decoded text becomes the story. All cards of a batch are written
//! in one store call.

use chrono::Utc;
use rayon::prelude::*;
use std::path::Path;
use std::sync::Arc;

use crate::error::{ServiceError, StoreError, ValidationError};
use crate::models::{Card, CardCreate, CardDraft, UploadSummary, UploadedFile};
use crate::store::CardStore;

/// Name used when a filename yields nothing / 默认名称
pub const UNTITLED: &str = "untitled";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Derive a card name from an uploaded filename: last path component with
/// its final extension removed / 从文件名推导卡片名称
pub fn card_name_from_filename(filename: Option<&str>) -> String {
    let filename = filename.filter(|f| !f.is_empty()).unwrap_or("untitled.txt");
    let is_separator = |c: char| c == '/' || c == '\\';
    // "dir/" names the directory itself, like a path stem
    let trimmed = filename.trim_end_matches(is_separator);
    let base = trimmed.rsplit(is_separator).next().unwrap_or(trimmed);
    match Path::new(base).file_stem().and_then(|s| s.to_str()) {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => UNTITLED.to_string(),
    }
}

/// Decode file bytes as UTF-8, dropping invalid sequences, then trim / 解码上传内容
pub fn decode_story(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text: String = bytes.utf8_chunks().map(|chunk| chunk.valid()).collect();
    text.trim().to_string()
}

/// Ingestion service / 录入服务
#[derive(Clone)]
pub struct IngestionService {
    store: Arc<dyn CardStore>,
}

impl IngestionService {
    pub fn new(store: Arc<dyn CardStore>) -> Self {
        Self { store }
    }

    /// Validate and persist one card / 创建单张卡片
    pub async fn create_single(&self, name: &str, story: &str) -> Result<Card, ServiceError> {
        let request = CardCreate {
            name: name.to_string(),
            story: story.to_string(),
        };
        request.validate()?;

        let draft = CardDraft::new(request.name, request.story, Utc::now());
        let id = self.store.insert_one(&draft).await?;
        tracing::info!("Created card {} ({})", id, draft.name);
        Ok(draft.into_card(id))
    }

    /// Persist one card per uploaded file / 批量上传
    pub async fn create_batch(&self, files: Vec<UploadedFile>) -> Result<UploadSummary, ServiceError> {
        if files.is_empty() {
            return Err(ValidationError::NoFiles.into());
        }

        let created_at = Utc::now();
        // Order of the output matches the input order
        let drafts: Vec<CardDraft> = files
            .par_iter()
            .map(|file| {
                CardDraft::new(
                    card_name_from_filename(file.filename.as_deref()),
                    decode_story(&file.data),
                    created_at,
                )
            })
            .collect();

        // Every file yields a draft, so this only guards future filtering
        if drafts.is_empty() {
            return Err(ValidationError::NoValidFiles.into());
        }

        let ids = self.store.insert_many(&drafts).await?;
        if ids.len() != drafts.len() {
            return Err(StoreError::IdCountMismatch {
                expected: drafts.len(),
                actual: ids.len(),
            }
            .into());
        }

        let names: Vec<String> = drafts.into_iter().map(|d| d.name).collect();
        tracing::info!("Batch upload inserted {} cards", ids.len());
        Ok(UploadSummary {
            inserted: ids.len(),
            names,
        })
    }
}
