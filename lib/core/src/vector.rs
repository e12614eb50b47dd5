use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Scoring function used to compare a query vector with column vectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Similarity {
    /// Raw dot product. Equals cosine similarity when the provider returns
    /// unit-length embeddings.
    #[default]
    Dot,
    /// Dot product divided by the product of norms.
    Cosine,
}

impl Similarity {
    #[inline]
    pub fn score(self, a: &[f32], b: &[f32]) -> Result<f32> {
        match self {
            Similarity::Dot => score(a, b),
            Similarity::Cosine => cosine(a, b),
        }
    }
}

impl std::str::FromStr for Similarity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dot" => Ok(Similarity::Dot),
            "cosine" => Ok(Similarity::Cosine),
            other => Err(Error::InvalidConfig(format!("unknown similarity: {}", other))),
        }
    }
}

/// Dot product of two equal-length vectors.
#[inline]
pub fn score(a: &[f32], b: &[f32]) -> Result<f32> {
    check_dim(a.len(), b.len())?;
    Ok(dot_unchecked(a, b))
}

/// Cosine similarity of two equal-length vectors. Zero vectors score 0.
#[inline]
pub fn cosine(a: &[f32], b: &[f32]) -> Result<f32> {
    check_dim(a.len(), b.len())?;
    let norm_a = norm(a);
    let norm_b = norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok(dot_unchecked(a, b) / (norm_a * norm_b))
}

#[inline]
pub fn norm(v: &[f32]) -> f32 {
    dot_unchecked(v, v).sqrt()
}

#[inline]
fn check_dim(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::DimensionMismatch { expected, actual });
    }
    Ok(())
}

// Two accumulators over chunks of 8.
fn dot_unchecked(a: &[f32], b: &[f32]) -> f32 {
    let mut dot0 = 0.0f32;
    let mut dot1 = 0.0f32;

    let chunks = a.chunks_exact(8);
    let remainder = chunks.remainder().len();
    for (x, y) in chunks.zip(b.chunks_exact(8)) {
        dot0 += x[0] * y[0] + x[1] * y[1] + x[2] * y[2] + x[3] * y[3];
        dot1 += x[4] * y[4] + x[5] * y[5] + x[6] * y[6] + x[7] * y[7];
    }

    for i in (a.len() - remainder)..a.len() {
        dot0 += a[i] * b[i];
    }

    dot0 + dot1
}

/// An embedding vector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Vector {
    data: Vec<f32>,
}

impl Vector {
    #[inline]
    #[must_use]
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}
