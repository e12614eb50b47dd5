use askschema_core::{CacheStore, Error, Result};
use atomicwrites::{AllowOverwrite, AtomicFile};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File-backed cache store
///
/// Layout under `data_dir`:
/// - `columns-<dataset>.csv` - column names as CSV, quoted where needed
/// - `<dataset>-embedding.json` - JSON array of embedding vectors
///
/// Every write goes to a temporary file that is renamed into place, so a
/// concurrent reader sees either the old file or the complete new one.
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    data_dir: PathBuf,
}

impl FileCacheStore {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    #[inline]
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn columns_path(&self, dataset: &str) -> Result<PathBuf> {
        validate_dataset_name(dataset)?;
        Ok(self.data_dir.join(format!("columns-{}.csv", dataset)))
    }

    pub fn embeddings_path(&self, dataset: &str) -> Result<PathBuf> {
        validate_dataset_name(dataset)?;
        Ok(self.data_dir.join(format!("{}-embedding.json", dataset)))
    }
}

impl CacheStore for FileCacheStore {
    fn read_columns(&self, dataset: &str) -> Result<Option<Vec<String>>> {
        let path = self.columns_path(dataset)?;
        match read_if_exists(&path)? {
            Some(data) => {
                let columns = parse_columns(&data)
                    .map_err(|e| Error::Cache(format!("{}: {}", path.display(), e)))?;
                debug!(dataset, path = %path.display(), "column list read from cache");
                Ok(Some(columns))
            }
            None => Ok(None),
        }
    }

    fn write_columns(&self, dataset: &str, columns: &[String]) -> Result<()> {
        let path = self.columns_path(dataset)?;
        let data = format_columns(columns)
            .map_err(|e| Error::Cache(format!("cannot serialize column list: {}", e)))?;
        write_atomic(&path, &data)?;
        info!(dataset, columns = columns.len(), path = %path.display(), "column list cached");
        Ok(())
    }

    fn read_embeddings(&self, dataset: &str) -> Result<Option<Vec<Vec<f32>>>> {
        let path = self.embeddings_path(dataset)?;
        match read_if_exists(&path)? {
            Some(data) => {
                let matrix = serde_json::from_slice(&data)
                    .map_err(|e| Error::Cache(format!("{}: {}", path.display(), e)))?;
                debug!(dataset, path = %path.display(), "embedding matrix read from cache");
                Ok(Some(matrix))
            }
            None => Ok(None),
        }
    }

    fn write_embeddings(&self, dataset: &str, embeddings: &[Vec<f32>]) -> Result<()> {
        let path = self.embeddings_path(dataset)?;
        let data = serde_json::to_vec(embeddings)
            .map_err(|e| Error::Cache(format!("cannot serialize embeddings: {}", e)))?;
        write_atomic(&path, &data)?;
        info!(dataset, vectors = embeddings.len(), path = %path.display(), "embedding matrix cached");
        Ok(())
    }
}

/// Column names from a CSV column file. Every field of every record is a
/// column; fields containing commas, quotes or newlines are quoted.
pub fn parse_columns(data: &[u8]) -> std::result::Result<Vec<String>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let mut columns = Vec::new();
    for record in reader.records() {
        columns.extend(record?.iter().filter(|f| !f.is_empty()).map(str::to_string));
    }
    Ok(columns)
}

/// One CSV record holding every column name.
pub fn format_columns(columns: &[String]) -> std::result::Result<Vec<u8>, csv::Error> {
    let mut data = Vec::new();
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut data);
        writer.write_record(columns)?;
        writer.flush()?;
    }
    Ok(data)
}

/// Reject names that would escape the data directory.
pub fn validate_dataset_name(dataset: &str) -> Result<()> {
    let unsafe_name = dataset.is_empty()
        || dataset == "."
        || dataset == ".."
        || dataset.contains(['/', '\\', '\0']);
    if unsafe_name {
        return Err(Error::InvalidRequest(format!("invalid dataset name: {:?}", dataset)));
    }
    Ok(())
}

pub(crate) fn read_if_exists(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    AtomicFile::new(path, AllowOverwrite)
        .write(|f| f.write_all(data))
        .map_err(|e| match e {
            atomicwrites::Error::Internal(e) | atomicwrites::Error::User(e) => Error::Io(e),
        })
}
