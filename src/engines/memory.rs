use crate::traits::{CourseDocument, CourseRecord, CourseSearch, SearchHit, TextEmbedder};
use anyhow::anyhow;
use log::{debug, info};

/// Similarity index over course documents, held entirely in memory.
///
/// Built once from a scrape run and never mutated afterwards.
pub struct InMemoryCourseIndex<E: TextEmbedder> {
    embedder: E,
    documents: Vec<CourseDocument>,
    embeddings: Vec<Vec<f32>>,
}

impl<E: TextEmbedder> InMemoryCourseIndex<E> {
    /// Embeds every record's combined text in one batch and indexes the results.
    pub fn build(records: &[CourseRecord], embedder: E) -> anyhow::Result<Self> {
        let documents: Vec<CourseDocument> = records
            .iter()
            .enumerate()
            .map(|(i, record)| CourseDocument::from_record(i, record))
            .collect();

        let embeddings = if documents.is_empty() {
            Vec::new()
        } else {
            let texts: Vec<&str> = documents.iter().map(|d| d.content.as_str()).collect();
            embedder.embed_documents(&texts)?
        };

        if embeddings.len() != documents.len() {
            return Err(anyhow!(
                "Embedder returned {} vectors for {} documents",
                embeddings.len(),
                documents.len()
            ));
        }

        info!("Built course index with {} documents", documents.len());
        Ok(InMemoryCourseIndex {
            embedder,
            documents,
            embeddings,
        })
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[CourseDocument] {
        &self.documents
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
        if a.len() != b.len() {
            return 0.0;
        }

        // Both sides are L2-normalized, so the dot product is the cosine
        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        dot_product as f64
    }
}

impl<E: TextEmbedder> CourseSearch for InMemoryCourseIndex<E> {
    /// Returns at most `k` documents, most similar first.
    fn similarity_search(&self, query: &str, k: usize) -> anyhow::Result<Vec<SearchHit>> {
        if self.documents.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed_query(query)?;

        let mut hits: Vec<SearchHit> = self
            .documents
            .iter()
            .zip(self.embeddings.iter())
            .map(|(document, embedding)| SearchHit {
                document: document.clone(),
                score: Self::cosine_similarity(&query_embedding, embedding),
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(k);

        debug!("Similarity search for '{}' returned {} hits.", query, hits.len());
        Ok(hits)
    }
}
