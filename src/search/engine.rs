//! Search engine - card lookup plus snippet expansion / 搜索引擎
//!
//! Flow: query the store for cards whose name or story contains the query,
//! then emit one hit per occurrence in each story. Results keep store order,
//! then match position; there is no relevance ranking.

use std::sync::Arc;

use super::snippet::extract_snippets;
use crate::error::{ServiceError, ValidationError};
use crate::models::{SearchHit, SearchResponse};
use crate::store::{CardFilter, CardStore};

/// Characters kept on each side of a match / 匹配两侧保留的字符数
pub const SNIPPET_WINDOW: usize = 40;
/// Per-card snippet cap / 每张卡片的摘要上限
pub const MAX_SNIPPETS_PER_CARD: usize = 99;
/// Documents fetched from the store per search / 每次搜索读取的文档上限
pub const MAX_CARDS_PER_SEARCH: usize = 50;

/// Trim a raw query, rejecting blank input / 校验查询词
pub fn normalize_query(query: &str) -> Result<&str, ValidationError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ValidationError::EmptyQuery);
    }
    Ok(query)
}

/// Category filter parsed from the `types` query parameter / 分类过滤
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeFilter(Vec<String>);

impl TypeFilter {
    /// Parse a comma-separated list, dropping blank entries
    pub fn parse(raw: &str) -> Self {
        Self::from_iter(raw.split(','))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// `None` when the filter is empty, meaning "all types"
    pub fn into_types(self) -> Option<Vec<String>> {
        (!self.0.is_empty()).then_some(self.0)
    }
}

impl<S: AsRef<str>> FromIterator<S> for TypeFilter {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|s| s.as_ref().trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }
}

/// Search engine over a card store / 卡片搜索引擎
#[derive(Clone)]
pub struct SearchEngine {
    store: Arc<dyn CardStore>,
    window: usize,
    max_snippets: usize,
    max_cards: usize,
}

impl SearchEngine {
    pub fn new(store: Arc<dyn CardStore>) -> Self {
        Self {
            store,
            window: SNIPPET_WINDOW,
            max_snippets: MAX_SNIPPETS_PER_CARD,
            max_cards: MAX_CARDS_PER_SEARCH,
        }
    }

    /// Run a search / 执行搜索
    pub async fn search(
        &self,
        query: &str,
        type_filter: Option<TypeFilter>,
    ) -> Result<SearchResponse, ServiceError> {
        let query = normalize_query(query)?;

        let types = type_filter.and_then(TypeFilter::into_types);
        let filter = CardFilter::containing(query)
            .types(types)
            .limit(self.max_cards);
        let cards = self.store.find(&filter).await?;

        let mut results = Vec::new();
        for card in &cards {
            for snippet in extract_snippets(&card.story, query, self.window, self.max_snippets) {
                results.push(SearchHit {
                    card_id: card.id.clone(),
                    card_type: card.card_type.clone(),
                    name: card.name.clone(),
                    snippet: snippet.text,
                });
            }
        }

        tracing::debug!(
            "Search {:?}: {} cards, {} hits",
            query,
            cards.len(),
            results.len()
        );

        Ok(SearchResponse {
            query: query.to_string(),
            total: results.len(),
            results,
        })
    }
}
