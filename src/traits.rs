use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const NO_TITLE: &str = "No Title";
pub const NO_DESCRIPTION: &str = "No Description";
pub const NO_LESSONS: &str = "No Lessons";
pub const NO_PRICE: &str = "No Price";
pub const NO_IMAGE: &str = "No Image";

/// One course card scraped from a listing page.
///
/// Every field holds either the extracted value or its sentinel placeholder,
/// never an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub title: String,
    pub description: String,
    pub lessons: String,
    pub price: String,
    pub image_url: String,
}

impl CourseRecord {
    /// Builds a record from raw extracted values, substituting sentinels for blanks.
    pub fn from_raw(
        title: Option<String>,
        description: Option<String>,
        lessons: Option<String>,
        price: Option<String>,
        image_url: Option<String>,
    ) -> Self {
        CourseRecord {
            title: or_sentinel(title, NO_TITLE),
            description: or_sentinel(description, NO_DESCRIPTION),
            lessons: or_sentinel(lessons, NO_LESSONS),
            price: or_sentinel(price, NO_PRICE),
            image_url: or_sentinel(image_url, NO_IMAGE),
        }
    }

    /// Text fed to the embedder: title and description joined by a space.
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }
}

fn or_sentinel(value: Option<String>, sentinel: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => sentinel.to_string(),
    }
}

/// A record as stored in the similarity index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseDocument {
    pub content: String,
    pub metadata: HashMap<String, String>,
}

impl CourseDocument {
    /// Wraps the record at zero-based `position`; the source label is 1-based.
    pub fn from_record(position: usize, record: &CourseRecord) -> Self {
        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), format!("Course {}", position + 1));
        metadata.insert("title".to_string(), record.title.clone());
        metadata.insert("lessons".to_string(), record.lessons.clone());
        metadata.insert("price".to_string(), record.price.clone());
        metadata.insert("image_url".to_string(), record.image_url.clone());

        CourseDocument {
            content: record.combined_text(),
            metadata,
        }
    }

    pub fn field(&self, key: &str) -> &str {
        self.metadata.get(key).map(String::as_str).unwrap_or_default()
    }
}

/// Result from a similarity search.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub document: CourseDocument,
    pub score: f64,
}

/// Turns text into fixed-size vectors for similarity comparison.
pub trait TextEmbedder {
    fn embed_documents(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>>;
    fn embed_query(&self, text: &str) -> anyhow::Result<Vec<f32>>;
}

/// Trait for nearest-neighbour retrieval over indexed courses.
pub trait CourseSearch {
    fn similarity_search(&self, query: &str, k: usize) -> anyhow::Result<Vec<SearchHit>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_fields_get_sentinels() {
        let record = CourseRecord::from_raw(
            Some("".to_string()),
            None,
            Some("  ".to_string()),
            Some("Free".to_string()),
            None,
        );
        assert_eq!(record.title, NO_TITLE);
        assert_eq!(record.description, NO_DESCRIPTION);
        assert_eq!(record.lessons, NO_LESSONS);
        assert_eq!(record.price, "Free");
        assert_eq!(record.image_url, NO_IMAGE);
    }

    #[test]
    fn test_document_metadata_skips_description() {
        let record = CourseRecord::from_raw(
            Some("Intro to ML".to_string()),
            Some("machine learning basics".to_string()),
            Some("12 Lessons".to_string()),
            Some("Free".to_string()),
            Some("https://example.com/ml.png".to_string()),
        );
        let doc = CourseDocument::from_record(0, &record);

        assert_eq!(doc.content, "Intro to ML machine learning basics");
        assert_eq!(doc.field("source"), "Course 1");
        assert_eq!(doc.field("title"), "Intro to ML");
        assert!(!doc.metadata.contains_key("description"));
        assert_eq!(doc.metadata.len(), 5);
    }
}
