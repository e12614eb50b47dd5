use crate::error::Result;
use ahash::AHashMap;
use parking_lot::RwLock;

/// Persistent per-dataset store for column lists and embedding matrices.
///
/// `Ok(None)` from a read means the entry does not exist.
pub trait CacheStore: Send + Sync {
    fn read_columns(&self, dataset: &str) -> Result<Option<Vec<String>>>;

    fn write_columns(&self, dataset: &str, columns: &[String]) -> Result<()>;

    fn read_embeddings(&self, dataset: &str) -> Result<Option<Vec<Vec<f32>>>>;

    fn write_embeddings(&self, dataset: &str, embeddings: &[Vec<f32>]) -> Result<()>;

    fn contains(&self, dataset: &str) -> Result<bool> {
        Ok(self.read_columns(dataset)?.is_some() && self.read_embeddings(dataset)?.is_some())
    }
}

/// In-process cache store, used when nothing should touch the disk.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    columns: RwLock<AHashMap<String, Vec<String>>>,
    embeddings: RwLock<AHashMap<String, Vec<Vec<f32>>>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of datasets with a cached embedding matrix.
    pub fn len(&self) -> usize {
        self.embeddings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for MemoryCacheStore {
    fn read_columns(&self, dataset: &str) -> Result<Option<Vec<String>>> {
        Ok(self.columns.read().get(dataset).cloned())
    }

    fn write_columns(&self, dataset: &str, columns: &[String]) -> Result<()> {
        self.columns.write().insert(dataset.to_string(), columns.to_vec());
        Ok(())
    }

    fn read_embeddings(&self, dataset: &str) -> Result<Option<Vec<Vec<f32>>>> {
        Ok(self.embeddings.read().get(dataset).cloned())
    }

    fn write_embeddings(&self, dataset: &str, embeddings: &[Vec<f32>]) -> Result<()> {
        self.embeddings.write().insert(dataset.to_string(), embeddings.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemoryCacheStore::new();
        assert!(!store.contains("frontend").unwrap());

        store.write_columns("frontend", &["a".to_string()]).unwrap();
        assert!(!store.contains("frontend").unwrap());

        store.write_embeddings("frontend", &[vec![1.0]]).unwrap();
        assert!(store.contains("frontend").unwrap());
        assert_eq!(store.read_columns("frontend").unwrap().unwrap(), vec!["a"]);
        assert_eq!(store.len(), 1);
    }
}
