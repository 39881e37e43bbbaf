use crate::config::CourseScoutDirs;
use crate::traits::TextEmbedder;
use anyhow::{Context, Result};
use fastembed::{
    InitOptions, InitOptionsUserDefined, TextEmbedding, TokenizerFiles, UserDefinedEmbeddingModel,
};
use log::{debug, info};
use std::{fs, path::Path, path::PathBuf};

/// Sentence embedder backed by a FastEmbed model.
///
/// Defaults to AllMiniLML6V2. A local ONNX model can be used instead; its
/// directory must also hold tokenizer.json, config.json,
/// special_tokens_map.json and tokenizer_config.json.
pub struct LocalEmbedder {
    model: TextEmbedding,
}

impl LocalEmbedder {
    /// Creates an embedder for `model_name` (AllMiniLML6V2 when `None`).
    /// Model files are cached in `cache_dir`, or the project cache dir.
    pub fn new(
        model_name: Option<fastembed::EmbeddingModel>,
        cache_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let model_name = model_name.unwrap_or(fastembed::EmbeddingModel::AllMiniLML6V2);

        let cache_dir = match cache_dir {
            Some(dir) => dir,
            None => CourseScoutDirs::new().ensure_cache_dir()?,
        };

        let init_options = InitOptions::new(model_name.clone()).with_cache_dir(cache_dir);
        let model = TextEmbedding::try_new(init_options)?;

        info!("Initialized embedding model: {:?}", model_name);

        Ok(LocalEmbedder { model })
    }

    pub fn new_with_default_model() -> Result<Self> {
        Self::new(None, None)
    }

    /// Loads `model.onnx` and its tokenizer files from `model_dir`.
    pub fn new_with_local_model(model_dir: &Path, max_length: Option<usize>) -> Result<Self> {
        let read = |name: &str| -> Result<Vec<u8>> {
            let path = model_dir.join(name);
            fs::read(&path).with_context(|| format!("Failed to read {:?}", path))
        };

        let onnx_file = read("model.onnx")?;
        let tokenizer_files = TokenizerFiles {
            tokenizer_file: read("tokenizer.json")?,
            config_file: read("config.json")?,
            special_tokens_map_file: read("special_tokens_map.json")?,
            tokenizer_config_file: read("tokenizer_config.json")?,
        };

        let user_defined_model = UserDefinedEmbeddingModel::new(onnx_file, tokenizer_files);

        let mut init_options = InitOptionsUserDefined::new();
        if let Some(max_len) = max_length {
            init_options = init_options.with_max_length(max_len);
        }

        let model = TextEmbedding::try_new_from_user_defined(user_defined_model, init_options)?;

        info!("Initialized local embedding model from {:?}", model_dir);

        Ok(LocalEmbedder { model })
    }

    /// Normalizes an embedding vector using L2 normalization.
    pub fn normalize_l2(embedding: &[f32]) -> Vec<f32> {
        let norm = (embedding.iter().map(|x| x * x).sum::<f32>()).sqrt();
        if norm < 1e-5 {
            debug!("Embedding norm {} is below 1e-5, leaving it unnormalized", norm);
            embedding.to_vec()
        } else {
            embedding.iter().map(|x| x / norm).collect()
        }
    }
}

impl TextEmbedder for LocalEmbedder {
    /// Embeds all texts in a single model call.
    fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let embeddings = self.model.embed(texts.to_vec(), None)?;
        debug!("Embedded {} documents", embeddings.len());
        Ok(embeddings.iter().map(|e| Self::normalize_l2(e)).collect())
    }

    fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.model.embed(vec![text], None)?;
        embeddings
            .into_iter()
            .next()
            .map(|x| Self::normalize_l2(&x))
            .ok_or_else(|| anyhow::anyhow!("Embedding model returned no vector for query"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_l2_unit_length() {
        let result = LocalEmbedder::normalize_l2(&[3.0, 4.0]);
        assert!((result[0] - 0.6).abs() < 1e-6);
        assert!((result[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_l2_near_zero_is_untouched() {
        let input = vec![0.0, 1e-7];
        assert_eq!(LocalEmbedder::normalize_l2(&input), input);
    }

    #[test]
    fn test_embed_query_returns_vector() {
        let embedder = LocalEmbedder::new_with_default_model().expect("Failed to create embedder");

        let embedding = embedder.embed_query("Hello world").unwrap();
        assert!(!embedding.is_empty());
    }

    #[test]
    fn test_embed_documents_same_length() {
        let embedder = LocalEmbedder::new(None, None).expect("Failed to create embedder");
        let texts = ["Python Basics", "Cooking 101", "Deep Learning"];

        let embeddings = embedder.embed_documents(&texts).unwrap();
        assert_eq!(embeddings.len(), texts.len());
    }

    #[test]
    fn test_new_with_local_model_missing_files() {
        let result = LocalEmbedder::new_with_local_model(Path::new("/invalid/path/model"), None);
        assert!(result.is_err());
    }
}
