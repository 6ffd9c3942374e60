use crate::retrieval::BackendError;

/// One chunk of source text and its embedding.
#[derive(Debug, Clone)]
pub struct IndexedChunk {
    pub text: String,
    pub embedding: Vec<f32>,
}

/// In-memory vector index with cosine-similarity lookup.
#[derive(Debug, Clone, Default)]
pub struct RetrievalIndex {
    chunks: Vec<IndexedChunk>,
}

impl RetrievalIndex {
    pub fn new(texts: Vec<String>, embeddings: Vec<Vec<f32>>) -> Result<Self, BackendError> {
        if texts.len() != embeddings.len() {
            return Err(BackendError::Unavailable(format!(
                "{} chunks but {} embeddings",
                texts.len(),
                embeddings.len()
            )));
        }

        let chunks = texts
            .into_iter()
            .zip(embeddings)
            .map(|(text, embedding)| IndexedChunk { text, embedding })
            .collect();

        Ok(Self { chunks })
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Texts of the `k` chunks most similar to `query`, best first.
    /// Ties keep insertion order.
    pub fn nearest(&self, query: &[f32], k: usize) -> Vec<&str> {
        let mut scored: Vec<(f32, &IndexedChunk)> = self
            .chunks
            .iter()
            .map(|c| (cosine_similarity(query, &c.embedding), c))
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        scored
            .into_iter()
            .take(k)
            .map(|(_, c)| c.text.as_str())
            .collect()
    }
}

/// Zero when either vector is empty, zero-length, or the dimensions differ.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_orders_by_similarity() {
        let index = RetrievalIndex::new(
            vec!["rust".into(), "python".into(), "go".into()],
            vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.7, 0.7]],
        )
        .unwrap();

        assert_eq!(index.nearest(&[1.0, 0.1], 2), vec!["rust", "go"]);
    }

    #[test]
    fn test_nearest_caps_at_index_size() {
        let index = RetrievalIndex::new(vec!["only".into()], vec![vec![1.0]]).unwrap();
        assert_eq!(index.nearest(&[1.0], 3).len(), 1);
    }

    #[test]
    fn test_mismatched_lengths_are_rejected() {
        assert!(RetrievalIndex::new(vec!["a".into(), "b".into()], vec![vec![1.0]]).is_err());
    }

    #[test]
    fn test_cosine_similarity_handles_degenerate_vectors() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[2.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < f32::EPSILON);
    }
}
