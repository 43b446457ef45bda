use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Category assigned to every card created today / 默认卡片分类
pub const DEFAULT_CARD_TYPE: &str = "remembrance";

/// Maximum card name length in characters / 名称最大长度
pub const MAX_NAME_CHARS: usize = 200;

/// Stored memory card / 已保存的卡片
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    #[serde(rename = "type")]
    pub card_type: String,
    pub name: String,
    pub story: String,
    pub created_at: DateTime<Utc>,
}

/// Card waiting to be persisted, the store assigns its id / 待写入的卡片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDraft {
    pub card_type: String,
    pub name: String,
    pub story: String,
    pub created_at: DateTime<Utc>,
}

impl CardDraft {
    /// New draft with the default category / 使用默认分类创建
    pub fn new(name: impl Into<String>, story: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            card_type: DEFAULT_CARD_TYPE.to_string(),
            name: name.into(),
            story: story.into(),
            created_at,
        }
    }

    pub fn into_card(self, id: String) -> Card {
        Card {
            id,
            card_type: self.card_type,
            name: self.name,
            story: self.story,
            created_at: self.created_at,
        }
    }
}

/// POST /admin/cards request body
#[derive(Debug, Clone, Deserialize)]
pub struct CardCreate {
    pub name: String,
    pub story: String,
}

impl CardCreate {
    /// Field-level validation: name 1..=200 chars, story non-empty / 字段校验
    pub fn validate(&self) -> Result<(), ValidationError> {
        let name_len = self.name.chars().count();
        if name_len == 0 {
            return Err(ValidationError::InvalidField {
                field: "name",
                reason: "must not be empty".to_string(),
            });
        }
        if name_len > MAX_NAME_CHARS {
            return Err(ValidationError::InvalidField {
                field: "name",
                reason: format!("must be at most {} characters", MAX_NAME_CHARS),
            });
        }
        if self.story.is_empty() {
            return Err(ValidationError::InvalidField {
                field: "story",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// One uploaded file of a batch / 批量上传中的单个文件
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: Option<String>,
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: Some(filename.into()),
            data: data.into(),
        }
    }
}

/// Batch upload result / 批量上传结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSummary {
    pub inserted: usize,
    pub names: Vec<String>,
}

/// One reported match / 搜索命中
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "id")]
    pub card_id: String,
    #[serde(rename = "type")]
    pub card_type: String,
    pub name: String,
    pub snippet: String,
}

/// Search response / 搜索响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub total: usize,
    pub results: Vec<SearchHit>,
}

/// POST /auth/login form / 登录表单
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}
