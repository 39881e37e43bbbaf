//! Query front-ends behind the search form.
//!
//! [`SemanticFrontEnd`] answers from an embedding index built at startup;
//! [`CatalogFrontEnd`] re-reads the JSON store on every query and matches
//! titles by substring.

use crate::config::DEFAULT_TOP_K;
use crate::engines::{JsonCourseStore, StoreError};
use crate::form::{FormLabels, OutputKind, QueryHandler};
use crate::traits::{CourseRecord, CourseSearch, SearchHit};
use html_escape::{encode_double_quoted_attribute, encode_text};
use log::{debug, error};

pub const NO_MATCHES: &str = "No matching courses found.";

/// Plain-text blocks separated by `---`, one per hit.
pub fn render_hits(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| {
            let doc = &hit.document;
            format!(
                "\nTitle: {}\nPrice: {}\nLessons: {}\nContent: {}\n",
                doc.field("title"),
                doc.field("price"),
                doc.field("lessons"),
                doc.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n---\n")
}

/// HTML blocks separated by `<hr>`, one per course.
pub fn render_courses(courses: &[CourseRecord]) -> String {
    courses
        .iter()
        .map(|course| {
            format!(
                "<div class=\"course\">\n\
                 <img src=\"{}\" alt=\"{}\" width=\"240\">\n\
                 <h3>{}</h3>\n\
                 <p><strong>Lessons:</strong> {}</p>\n\
                 <p><strong>Price:</strong> {}</p>\n\
                 <p>{}</p>\n\
                 </div>",
                encode_double_quoted_attribute(&course.image_url),
                encode_double_quoted_attribute(&course.title),
                encode_text(&course.title),
                encode_text(&course.lessons),
                encode_text(&course.price),
                encode_text(&course.description),
            )
        })
        .collect::<Vec<_>>()
        .join("\n<hr>\n")
}

/// Message shown in place of results when the store cannot be loaded.
pub fn describe_store_error(err: &StoreError) -> String {
    match err {
        StoreError::NotFound { path } => format!(
            "Error: course data file '{}' not found. Run the scrape step first.",
            path.display()
        ),
        other => format!(
            "Error: failed to load course data from '{}': {}",
            other.path().display(),
            other
        ),
    }
}

/// Semantic search over an index built once at startup.
pub struct SemanticFrontEnd<S: CourseSearch> {
    index: S,
    top_k: usize,
}

impl<S: CourseSearch> SemanticFrontEnd<S> {
    pub fn new(index: S) -> Self {
        SemanticFrontEnd {
            index,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn search(&self, query: &str) -> anyhow::Result<Vec<SearchHit>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        self.index.similarity_search(query, self.top_k)
    }
}

impl<S> QueryHandler for SemanticFrontEnd<S>
where
    S: CourseSearch + Send + Sync + 'static,
{
    fn labels(&self) -> FormLabels {
        FormLabels {
            title: "Course Search Engine".to_string(),
            description: "Search for courses based on your query. The system will return the most relevant matches.".to_string(),
            input_label: "Search Courses".to_string(),
            placeholder: "Enter your search query...".to_string(),
            output_label: "Results".to_string(),
        }
    }

    fn output_kind(&self) -> OutputKind {
        OutputKind::Text
    }

    fn answer(&self, query: &str) -> String {
        match self.search(query) {
            Ok(hits) => render_hits(&hits),
            Err(e) => {
                error!("Semantic search for '{}' failed: {}", query, e);
                format!("Error: {}", e)
            }
        }
    }
}

/// Title search over the JSON store, reloaded on every query.
pub struct CatalogFrontEnd {
    store: JsonCourseStore,
}

impl CatalogFrontEnd {
    pub fn new(store: JsonCourseStore) -> Self {
        CatalogFrontEnd { store }
    }

    pub fn store(&self) -> &JsonCourseStore {
        &self.store
    }
}

impl QueryHandler for CatalogFrontEnd {
    fn labels(&self) -> FormLabels {
        FormLabels {
            title: "Course Search Engine".to_string(),
            description: "Search the scraped course catalog by title.".to_string(),
            input_label: "Search Courses".to_string(),
            placeholder: "Enter part of a course title...".to_string(),
            output_label: "Matching courses".to_string(),
        }
    }

    fn output_kind(&self) -> OutputKind {
        OutputKind::Markup
    }

    fn answer(&self, query: &str) -> String {
        match self.store.search_titles(query) {
            Ok(matches) if matches.is_empty() => NO_MATCHES.to_string(),
            Ok(matches) => {
                debug!("Catalog query '{}' matched {} courses", query, matches.len());
                render_courses(&matches)
            }
            Err(e) => {
                error!("{}", e);
                describe_store_error(&e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::InMemoryCourseIndex;
    use crate::engines::memory::tests::{WordCountEmbedder, record};
    use tempfile::TempDir;

    fn catalog(records: &[CourseRecord]) -> (CatalogFrontEnd, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = JsonCourseStore::new(temp_dir.path().join("courses.json"));
        store.write(records).unwrap();
        (CatalogFrontEnd::new(store), temp_dir)
    }

    #[test]
    fn test_catalog_matches_any_case() {
        let (front_end, _temp_dir) = catalog(&[
            record("Python Basics", "python data"),
            record("Cooking 101", "recipes"),
        ]);

        for query in ["PYTHON", "python", "Basics"] {
            let output = front_end.answer(query);
            assert!(output.contains("<h3>Python Basics</h3>"), "query {}", query);
            assert!(!output.contains("Cooking"));
        }
    }

    #[test]
    fn test_catalog_no_match_message() {
        let (front_end, _temp_dir) = catalog(&[record("Python Basics", "python data")]);
        assert_eq!(front_end.answer("haskell"), "No matching courses found.");
    }

    #[test]
    fn test_catalog_empty_store_has_no_matches() {
        let (front_end, _temp_dir) = catalog(&[]);
        assert_eq!(front_end.answer("python"), NO_MATCHES);
    }

    #[test]
    fn test_catalog_missing_file_names_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.json");
        let front_end = CatalogFrontEnd::new(JsonCourseStore::new(&path));

        let output = front_end.answer("python");
        assert!(output.starts_with("Error:"));
        assert!(output.contains(&path.display().to_string()));
        assert!(output.contains("not found"));
    }

    #[test]
    fn test_catalog_malformed_file_is_reported() {
        let (front_end, _temp_dir) = catalog(&[]);
        std::fs::write(front_end.store().path(), "[{\"title\": 1}]").unwrap();

        let output = front_end.answer("python");
        assert!(output.starts_with("Error: failed to load course data"));
    }

    #[test]
    fn test_catalog_sees_fresh_writes() {
        let (front_end, _temp_dir) = catalog(&[record("Cooking 101", "recipes")]);
        assert_eq!(front_end.answer("rust"), NO_MATCHES);

        front_end
            .store()
            .write(&[record("Rust for Beginners", "systems")])
            .unwrap();
        assert!(front_end.answer("rust").contains("Rust for Beginners"));
    }

    #[test]
    fn test_render_courses_escapes_and_separates() {
        let courses = vec![
            record("C & C++ <Intro>", "pointers"),
            record("Python Basics", "python"),
        ];
        let html = render_courses(&courses);

        assert!(html.contains("<h3>C &amp; C++ &lt;Intro&gt;</h3>"));
        assert!(html.contains("<img src=\"https://example.com/"));
        assert!(html.contains("<strong>Lessons:</strong> 10 Lessons"));
        assert!(html.contains("<strong>Price:</strong> Free"));
        assert_eq!(html.matches("<hr>").count(), 1);
    }

    #[test]
    fn test_semantic_answer_format() {
        let records = vec![
            record("Intro to ML", "machine learning basics"),
            record("Cooking 101", "recipes"),
        ];
        let index = InMemoryCourseIndex::build(&records, WordCountEmbedder::new()).unwrap();
        let front_end = SemanticFrontEnd::new(index);

        let hits = front_end.search("machine learning").unwrap();
        let output = render_hits(&hits);
        assert!(output.starts_with(
            "\nTitle: Intro to ML\nPrice: Free\nLessons: 10 Lessons\nContent: Intro to ML machine learning basics\n"
        ));
        assert_eq!(output.matches("\n---\n").count(), 1);
    }

    #[test]
    fn test_semantic_never_exceeds_two_hits() {
        let records: Vec<CourseRecord> = (0..6)
            .map(|i| record(&format!("Intro to ML {}", i), "machine learning"))
            .collect();
        let index = InMemoryCourseIndex::build(&records, WordCountEmbedder::new()).unwrap();
        let front_end = SemanticFrontEnd::new(index);

        assert_eq!(front_end.search("machine learning").unwrap().len(), 2);
        assert!(front_end.search("   ").unwrap().is_empty());
    }
}
