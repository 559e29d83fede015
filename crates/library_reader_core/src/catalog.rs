//! crates/library_reader_core/src/catalog.rs
//!
//! Text search and category filtering over catalog listings.
//!
//! The filter is recomputed from scratch on every query change; listings are
//! small enough that no index is kept.

use crate::domain::{Document, Novel, ProgressRecord};

/// The value that selects every category.
pub const ALL_CATEGORIES: &str = "all";

/// Anything that can appear in a filtered catalog listing.
pub trait CatalogEntry {
    fn title(&self) -> &str;
    fn author(&self) -> &str;
    fn description(&self) -> &str;
    fn category(&self) -> &str;
}

impl CatalogEntry for Novel {
    fn title(&self) -> &str {
        &self.title
    }
    fn author(&self) -> &str {
        &self.author
    }
    fn description(&self) -> &str {
        &self.description
    }
    fn category(&self) -> &str {
        &self.genre
    }
}

impl CatalogEntry for Document {
    fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }
    fn author(&self) -> &str {
        self.author.as_deref().unwrap_or_default()
    }
    fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
    fn category(&self) -> &str {
        self.genre.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl CategoryFilter {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == ALL_CATEGORIES {
            CategoryFilter::All
        } else {
            CategoryFilter::Named(value.to_string())
        }
    }

    fn admits(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Named(name) => name == category,
        }
    }
}

/// A free-text query plus a category filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub text: String,
    pub category: CategoryFilter,
}

impl CatalogQuery {
    pub fn matches<T: CatalogEntry>(&self, entry: &T) -> bool {
        let needle = self.text.to_lowercase();
        let text_matches = needle.is_empty()
            || [entry.title(), entry.author(), entry.description()]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
        text_matches && self.category.admits(entry.category())
    }
}

/// Entries matching `query`, in source order.
pub fn filter_entries<'a, T: CatalogEntry>(entries: &'a [T], query: &CatalogQuery) -> Vec<&'a T> {
    entries.iter().filter(|entry| query.matches(*entry)).collect()
}

/// The category selector: `"all"` followed by each distinct, non-empty
/// category in first-seen order.
pub fn categories<T: CatalogEntry>(entries: &[T]) -> Vec<String> {
    let mut out = vec![ALL_CATEGORIES.to_string()];
    for entry in entries {
        let category = entry.category();
        if !category.is_empty() && !out.iter().any(|c| c == category) {
            out.push(category.to_string());
        }
    }
    out
}

/// How far a user is into a document, as shown on its catalog card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressBadge {
    NotStarted,
    /// One-based page over the document's translation count.
    Reading { page: usize, total: usize },
}

impl ProgressBadge {
    pub fn for_document(document: &Document, record: Option<&ProgressRecord>) -> Self {
        match record {
            Some(record) => ProgressBadge::Reading {
                page: record.current_page + 1,
                total: document.translation_count,
            },
            None => ProgressBadge::NotStarted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn novel(title: &str, author: &str, genre: &str) -> Novel {
        Novel {
            id: title.to_lowercase(),
            title: title.to_string(),
            author: author.to_string(),
            description: format!("A story called {title}"),
            genre: genre.to_string(),
            published_year: 2020,
            cover_image: String::new(),
            rating: 4,
        }
    }

    fn sample() -> Vec<Novel> {
        vec![novel("Alpha", "X", "Horror"), novel("Beta", "Y", "Mystery")]
    }

    fn titles(found: Vec<&Novel>) -> Vec<&str> {
        found.into_iter().map(|n| n.title.as_str()).collect()
    }

    #[test]
    fn text_query_is_case_insensitive_substring() {
        let novels = sample();
        let query = CatalogQuery {
            text: "alp".to_string(),
            category: CategoryFilter::All,
        };
        assert_eq!(titles(filter_entries(&novels, &query)), vec!["Alpha"]);
    }

    #[test]
    fn category_filter_alone() {
        let novels = sample();
        let query = CatalogQuery {
            text: String::new(),
            category: CategoryFilter::parse("Mystery"),
        };
        assert_eq!(titles(filter_entries(&novels, &query)), vec!["Beta"]);
    }

    #[test]
    fn empty_query_and_all_keeps_source_order() {
        let novels = sample();
        let query = CatalogQuery::default();
        assert_eq!(titles(filter_entries(&novels, &query)), vec!["Alpha", "Beta"]);
    }

    #[test]
    fn query_matches_author_and_description() {
        let novels = sample();
        let by_author = CatalogQuery {
            text: "y".to_string(),
            category: CategoryFilter::All,
        };
        // "y" is Beta's author and appears in "A story called ..." for both.
        assert_eq!(filter_entries(&novels, &by_author).len(), 2);

        let combined = CatalogQuery {
            text: "story".to_string(),
            category: CategoryFilter::parse("Horror"),
        };
        assert_eq!(titles(filter_entries(&novels, &combined)), vec!["Alpha"]);
    }

    #[test]
    fn categories_are_distinct_in_first_seen_order() {
        let mut novels = sample();
        novels.push(novel("Gamma", "Z", "Horror"));
        assert_eq!(categories(&novels), vec!["all", "Horror", "Mystery"]);
    }

    #[test]
    fn documents_without_metadata_still_filter() {
        let doc = Document {
            id: "d1".to_string(),
            filename: "scan.pdf".to_string(),
            title: None,
            author: None,
            description: None,
            genre: None,
            published_year: None,
            cover_image: None,
            rating: None,
            page_count: 3,
            pages_processed: 3,
            status: "completed".to_string(),
            translation_count: 7,
        };
        let docs = vec![doc];
        assert_eq!(filter_entries(&docs, &CatalogQuery::default()).len(), 1);
        let query = CatalogQuery {
            text: "scan".to_string(),
            category: CategoryFilter::All,
        };
        assert!(filter_entries(&docs, &query).is_empty());
        assert_eq!(categories(&docs), vec!["all"]);

        let record = ProgressRecord {
            current_page: 2,
            last_read: None,
        };
        assert_eq!(
            ProgressBadge::for_document(&docs[0], Some(&record)),
            ProgressBadge::Reading { page: 3, total: 7 }
        );
        assert_eq!(ProgressBadge::for_document(&docs[0], None), ProgressBadge::NotStarted);
    }
}
