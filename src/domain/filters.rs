//! Feed filter selection.

use serde::{Deserialize, Serialize};

/// Filters applied to the personalised feed.
///
/// Every field is optional so a persisted value reads back exactly as
/// it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,
}

impl Default for FeedFilters {
    fn default() -> Self {
        Self {
            keywords: Some(Vec::new()),
            categories: Some(Vec::new()),
            sources: Some(Vec::new()),
            min_score: Some(0.0),
            max_score: Some(100.0),
        }
    }
}

impl FeedFilters {
    /// Query parameters for the feed endpoint; empty selections are omitted.
    ///
    /// Lists repeat a bracketed key per value (`keywords[]=AI&keywords[]=chips`)
    /// and score bounds keep their camelCase names, matching what the
    /// dashboard page sends.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let lists = [
            ("keywords[]", &self.keywords),
            ("categories[]", &self.categories),
            ("sources[]", &self.sources),
        ];
        for (name, values) in lists {
            for value in values.iter().flatten() {
                pairs.push((name, value.clone()));
            }
        }
        if let Some(min) = self.min_score {
            pairs.push(("minScore", min.to_string()));
        }
        if let Some(max) = self.max_score {
            pairs.push(("maxScore", max.to_string()));
        }
        pairs
    }

    /// Add a keyword unless already present (case-insensitive).
    pub fn add_keyword(&mut self, keyword: &str) -> bool {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return false;
        }
        let keywords = self.keywords.get_or_insert_with(Vec::new);
        if keywords.iter().any(|k| k.eq_ignore_ascii_case(keyword)) {
            return false;
        }
        keywords.push(keyword.to_string());
        true
    }

    pub fn remove_keyword(&mut self, keyword: &str) -> bool {
        match self.keywords.as_mut() {
            Some(keywords) => {
                let before = keywords.len();
                keywords.retain(|k| !k.eq_ignore_ascii_case(keyword));
                keywords.len() != before
            }
            None => false,
        }
    }
}
