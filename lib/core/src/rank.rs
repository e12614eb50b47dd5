//! Column ranking
//!
//! Scores every column of an [`EmbeddingIndex`] against a query vector and
//! keeps the best `k`.

use crate::error::{Error, Result};
use crate::index::EmbeddingIndex;
use crate::vector::Similarity;
use serde::{Deserialize, Serialize};

/// Default number of columns handed to the judge
pub const DEFAULT_TOP_K: usize = 50;

/// A column with its similarity to the query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedColumn {
    pub column: String,
    pub score: f32,
}

/// Rank columns by dot product with the query vector.
pub fn rank(query: &[f32], index: &EmbeddingIndex, k: usize) -> Result<Vec<RankedColumn>> {
    rank_with(query, index, k, Similarity::Dot)
}

/// Rank columns by `similarity`, descending, truncated to `k`.
///
/// Equal scores keep the index's column order. NaN scores sort last.
pub fn rank_with(
    query: &[f32],
    index: &EmbeddingIndex,
    k: usize,
    similarity: Similarity,
) -> Result<Vec<RankedColumn>> {
    if index.is_empty() {
        return Ok(Vec::new());
    }
    if query.len() != index.dim() {
        return Err(Error::DimensionMismatch {
            expected: index.dim(),
            actual: query.len(),
        });
    }

    let mut ranked = index
        .iter()
        .map(|(column, vector)| {
            Ok(RankedColumn {
                column: column.to_string(),
                score: similarity.score(query, vector.as_slice())?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    // sort_by is stable
    ranked.sort_by(|a, b| match (a.score.is_nan(), b.score.is_nan()) {
        (false, false) => b.score.total_cmp(&a.score),
        (a_nan, b_nan) => a_nan.cmp(&b_nan),
    });
    ranked.truncate(k);
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frontend() -> EmbeddingIndex {
        EmbeddingIndex::new(
            "frontend",
            vec!["latency_ms".into(), "status_code".into(), "user_id".into()],
            vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.5]],
        )
        .unwrap()
    }

    fn pairs(ranked: &[RankedColumn]) -> Vec<(&str, f32)> {
        ranked.iter().map(|r| (r.column.as_str(), r.score)).collect()
    }

    #[test]
    fn test_rank_top_two() {
        let ranked = rank(&[1.0, 0.0], &frontend(), 2).unwrap();
        assert_eq!(pairs(&ranked), vec![("latency_ms", 1.0), ("user_id", 0.5)]);
    }

    #[test]
    fn test_k_larger_than_index_returns_all_sorted() {
        let ranked = rank(&[1.0, 0.0], &frontend(), DEFAULT_TOP_K).unwrap();
        assert_eq!(ranked.len(), 3);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(ranked[2].column, "status_code");
    }

    #[test]
    fn test_truncated_entries_score_no_higher() {
        let columns: Vec<String> = (0..20).map(|i| format!("col_{}", i)).collect();
        let vectors: Vec<Vec<f32>> = (0..20)
            .map(|i| vec![((i * 7) % 20) as f32 / 20.0, 1.0])
            .collect();
        let index = EmbeddingIndex::new("ds", columns, vectors).unwrap();
        let query = [1.0, 0.25];

        let all = rank(&query, &index, 20).unwrap();
        let top = rank(&query, &index, 5).unwrap();
        assert_eq!(top.len(), 5);
        assert_eq!(&all[..5], &top[..]);
        assert!(all[5].score <= top[4].score);
    }

    #[test]
    fn test_ties_keep_column_order() {
        let index = EmbeddingIndex::new(
            "ds",
            vec!["b".into(), "a".into(), "c".into()],
            vec![vec![1.0], vec![1.0], vec![2.0]],
        )
        .unwrap();
        let ranked = rank(&[1.0], &index, 3).unwrap();
        assert_eq!(pairs(&ranked), vec![("c", 2.0), ("b", 1.0), ("a", 1.0)]);
    }

    #[test]
    fn test_nan_sorts_last() {
        let index = EmbeddingIndex::new(
            "ds",
            vec!["nan".into(), "low".into(), "high".into()],
            vec![vec![f32::NAN], vec![-1.0], vec![3.0]],
        )
        .unwrap();
        let ranked = rank(&[1.0], &index, 3).unwrap();
        assert_eq!(ranked[0].column, "high");
        assert_eq!(ranked[1].column, "low");
        assert_eq!(ranked[2].column, "nan");
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let err = rank(&[1.0, 0.0, 0.0], &frontend(), 2).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: 2, actual: 3 }));
    }

    #[test]
    fn test_cosine_ranking() {
        let ranked = rank_with(&[1.0, 0.0], &frontend(), 2, Similarity::Cosine).unwrap();
        assert_eq!(ranked[0].column, "latency_ms");
        assert!((ranked[1].score - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn test_empty_index() {
        let index = EmbeddingIndex::new("ds", vec![], vec![]).unwrap();
        assert!(rank(&[1.0], &index, 5).unwrap().is_empty());
    }
}
