//! Search module / 搜索模块
//!
//! - snippet: literal case-insensitive scanning and excerpt windows
//! - engine: store lookup plus per-occurrence hit expansion
//!
//! Queries are always literal text; no pattern syntax is exposed.

pub mod engine;
pub mod snippet;

pub use engine::{normalize_query, SearchEngine, TypeFilter, MAX_CARDS_PER_SEARCH, MAX_SNIPPETS_PER_CARD, SNIPPET_WINDOW};
pub use snippet::{extract_snippets, LiteralMatcher, Snippet};
