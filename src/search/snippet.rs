//! Literal matching and snippet extraction / 字面匹配与摘要提取
//!
//! All offsets are character offsets into the scanned text, never bytes.

/// Case-insensitive literal needle / 不区分大小写的字面关键词
#[derive(Debug, Clone)]
pub struct LiteralMatcher {
    needle: Vec<char>,
}

impl LiteralMatcher {
    pub fn new(query: &str) -> Self {
        Self {
            needle: query.chars().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.needle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    /// Non-overlapping occurrences, left to right, as `(start, end)` pairs
    pub fn find_iter<'a>(&'a self, haystack: &'a [char]) -> impl Iterator<Item = (usize, usize)> + 'a {
        let n = self.needle.len();
        let mut pos = 0;
        std::iter::from_fn(move || {
            if n == 0 {
                return None;
            }
            while pos + n <= haystack.len() {
                let start = pos;
                if self.matches_at(haystack, start) {
                    pos = start + n;
                    return Some((start, start + n));
                }
                pos += 1;
            }
            None
        })
    }

    fn matches_at(&self, haystack: &[char], start: usize) -> bool {
        haystack[start..start + self.needle.len()]
            .iter()
            .zip(&self.needle)
            .all(|(a, b)| chars_eq_ignore_case(*a, *b))
    }
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Excerpt around one occurrence / 单个匹配的摘要
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub text: String,
    /// Window start, before trimming
    pub start: usize,
    /// Window end (exclusive), before trimming
    pub end: usize,
    pub match_start: usize,
    pub match_end: usize,
}

/// Extract up to `max_snippets` excerpts of `window` characters on each side
/// of every occurrence of `query` in `text` / 提取搜索摘要
pub fn extract_snippets(text: &str, query: &str, window: usize, max_snippets: usize) -> Vec<Snippet> {
    let matcher = LiteralMatcher::new(query);
    let chars: Vec<char> = text.chars().collect();
    let mut snippets = Vec::new();

    if max_snippets == 0 {
        return snippets;
    }

    for (match_start, match_end) in matcher.find_iter(&chars) {
        let start = match_start.saturating_sub(window);
        let end = match_end.saturating_add(window).min(chars.len());

        let raw: String = chars[start..end]
            .iter()
            .map(|&c| if c == '\n' { ' ' } else { c })
            .collect();
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            snippets.push(Snippet {
                text: trimmed.to_string(),
                start,
                end,
                match_start,
                match_end,
            });
        }
        if snippets.len() >= max_snippets {
            break;
        }
    }

    snippets
}
