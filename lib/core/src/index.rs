use crate::error::{Error, Result};
use crate::vector::Vector;

/// Column name to embedding mapping for one dataset.
///
/// Columns and vectors are kept as two aligned sequences: the vector at
/// position `i` belongs to the column at position `i`. All vectors share one
/// dimension. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingIndex {
    dataset: String,
    columns: Vec<String>,
    vectors: Vec<Vector>,
    dim: usize,
}

impl EmbeddingIndex {
    /// Build an index, rejecting count or dimension mismatches.
    pub fn new(
        dataset: impl Into<String>,
        columns: Vec<String>,
        vectors: Vec<Vec<f32>>,
    ) -> Result<Self> {
        let dataset = dataset.into();
        if columns.len() != vectors.len() {
            return Err(Error::EmbeddingMismatch(format!(
                "dataset {}: {} columns but {} vectors",
                dataset,
                columns.len(),
                vectors.len()
            )));
        }

        let dim = vectors.first().map(Vec::len).unwrap_or(0);
        if let Some((pos, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != dim) {
            return Err(Error::EmbeddingMismatch(format!(
                "dataset {}: vector for column {} has dimension {}, expected {}",
                dataset,
                columns[pos],
                v.len(),
                dim
            )));
        }

        Ok(Self {
            dataset,
            columns,
            vectors: vectors.into_iter().map(Vector::new).collect(),
            dim,
        })
    }

    #[inline]
    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    #[inline]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Embedding dimension; 0 for an empty index.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Vector)> {
        self.columns.iter().map(String::as_str).zip(self.vectors.iter())
    }

    /// The embedding matrix in cache layout.
    pub fn matrix(&self) -> Vec<Vec<f32>> {
        self.vectors.iter().map(|v| v.as_slice().to_vec()).collect()
    }
}
