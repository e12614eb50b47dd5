use crate::file_cache::{parse_columns, read_if_exists, validate_dataset_name};
use askschema_core::{DatasetCatalog, Error, Result, SchemaSource};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Schema source backed by pre-fetched `columns-<dataset>.csv` files
#[derive(Debug, Clone)]
pub struct CsvSchemaSource {
    dir: PathBuf,
}

impl CsvSchemaSource {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    /// Datasets that have a column file in the directory.
    pub fn list_datasets(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let name = entry?.file_name();
            let name = name.to_string_lossy();
            if let Some(dataset) = name
                .strip_prefix("columns-")
                .and_then(|rest| rest.strip_suffix(".csv"))
            {
                if !dataset.is_empty() {
                    names.push(dataset.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

#[async_trait]
impl SchemaSource for CsvSchemaSource {
    async fn columns(&self, dataset: &str) -> Result<Vec<String>> {
        validate_dataset_name(dataset).map_err(|e| Error::SchemaFetch(e.to_string()))?;
        let path = self.dir.join(format!("columns-{}.csv", dataset));
        let data = read_if_exists(&path)
            .map_err(|e| Error::SchemaFetch(format!("{}: {}", path.display(), e)))?
            .ok_or_else(|| Error::SchemaFetch(format!("no column file for dataset {}", dataset)))?;
        parse_columns(&data).map_err(|e| Error::SchemaFetch(format!("{}: {}", path.display(), e)))
    }
}

#[async_trait]
impl DatasetCatalog for CsvSchemaSource {
    async fn datasets(&self) -> Result<Vec<String>> {
        self.list_datasets()
    }
}
