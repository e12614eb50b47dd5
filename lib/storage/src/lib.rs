pub mod csv_source;
pub mod datasets;
pub mod file_cache;

pub use csv_source::CsvSchemaSource;
pub use datasets::{CachedCatalog, DatasetListCache};
pub use file_cache::FileCacheStore;
