//! Dataset loading.
//!
//! The loader fetches a CSV source over HTTP or from disk and parses it into a
//! [`Table`]. By default every call fetches and parses again; a positive cache
//! TTL keeps the last table per kind and refreshes it under a lock so that only
//! one fetch per kind is ever in flight.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::DataConfig;
use crate::error::{CovidPtError, Result};
use crate::logging::log_table_load_stats;
use crate::table::{KeyColumns, Table, TableKind};

/// Where a dataset comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Url(String),
    File(PathBuf),
}

impl DataSource {
    /// `http://` and `https://` locations are fetched remotely, anything else is a path
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            DataSource::Url(location.to_string())
        } else {
            DataSource::File(PathBuf::from(location))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Url(url) => write!(f, "{}", url),
            DataSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

struct CachedTable {
    table: Arc<Table>,
    fetched_at: Instant,
}

struct SourceSlot {
    kind: TableKind,
    source: DataSource,
    cache: Mutex<Option<CachedTable>>,
}

impl SourceSlot {
    fn new(kind: TableKind, location: &str) -> Self {
        Self {
            kind,
            source: DataSource::parse(location),
            cache: Mutex::new(None),
        }
    }
}

/// Fetches and parses the national and regional tables
pub struct TableLoader {
    client: reqwest::Client,
    national: SourceSlot,
    regional: SourceSlot,
    keys: KeyColumns,
    cache_ttl: Duration,
    retries: u32,
    retry_delay: Duration,
}

impl TableLoader {
    pub fn new(config: &DataConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout())
            .user_agent(concat!("covidpt/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CovidPtError::Config {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            national: SourceSlot::new(TableKind::National, &config.national_source),
            regional: SourceSlot::new(TableKind::Regional, &config.regional_source),
            keys: config.key_columns(),
            cache_ttl: config.cache_ttl(),
            retries: config.fetch_retries,
            retry_delay: config.retry_delay(),
        })
    }

    pub fn source(&self, kind: TableKind) -> &DataSource {
        &self.slot(kind).source
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// Produce a table for `kind`, fetching it unless a fresh cached copy exists
    pub async fn load(&self, kind: TableKind) -> Result<Arc<Table>> {
        let slot = self.slot(kind);

        if self.cache_ttl.is_zero() {
            return self.fetch_table(slot).await.map(Arc::new);
        }

        // held across the fetch: concurrent callers wait for the refresh
        let mut cached = slot.cache.lock().await;
        if let Some(entry) = cached.as_ref() {
            if entry.fetched_at.elapsed() < self.cache_ttl {
                debug!(kind = %kind, "Serving cached table");
                return Ok(Arc::clone(&entry.table));
            }
        }

        let table = Arc::new(self.fetch_table(slot).await?);
        *cached = Some(CachedTable {
            table: Arc::clone(&table),
            fetched_at: Instant::now(),
        });
        Ok(table)
    }

    fn slot(&self, kind: TableKind) -> &SourceSlot {
        match kind {
            TableKind::National => &self.national,
            TableKind::Regional => &self.regional,
        }
    }

    async fn fetch_table(&self, slot: &SourceSlot) -> Result<Table> {
        let start = Instant::now();
        let text = self.fetch_text(&slot.source).await?;
        let table = Table::from_csv(slot.kind, &text, &self.keys)?;
        log_table_load_stats(&slot.source.to_string(), &table, start.elapsed());
        Ok(table)
    }

    async fn fetch_text(&self, source: &DataSource) -> Result<String> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = match source {
                DataSource::Url(url) => self.fetch_url(url).await,
                DataSource::File(path) => tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| e.to_string()),
            };

            match result {
                Ok(text) => return Ok(text),
                Err(message) if attempt <= self.retries => {
                    warn!(
                        source = %source,
                        attempt = attempt,
                        error = %message,
                        "Fetch failed, retrying"
                    );
                    sleep(self.retry_delay).await;
                }
                Err(message) => {
                    return Err(CovidPtError::SourceUnavailable {
                        source_name: source.to_string(),
                        message,
                    })
                }
            }
        }
    }

    async fn fetch_url(&self, url: &str) -> std::result::Result<String, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("HTTP error: {}", response.status()));
        }

        response.text().await.map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config_for(national: &std::path::Path, regional: &std::path::Path) -> DataConfig {
        DataConfig {
            national_source: national.to_string_lossy().to_string(),
            regional_source: regional.to_string_lossy().to_string(),
            fetch_retries: 0,
            retry_delay_ms: 1,
            ..Default::default()
        }
    }

    fn write_csv(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_data_source_parse() {
        assert_eq!(
            DataSource::parse("https://example.org/data.csv"),
            DataSource::Url("https://example.org/data.csv".to_string())
        );
        assert_eq!(
            DataSource::parse("./data.csv"),
            DataSource::File(PathBuf::from("./data.csv"))
        );
        assert_eq!(DataSource::parse("./data.csv").to_string(), "./data.csv");
    }

    #[tokio::test]
    async fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let national = write_csv(&dir, "data.csv", "data,confirmados\n01-04-2020,1\n02-04-2020,2\n");
        let regional = write_csv(
            &dir,
            "concelhos.csv",
            "data,concelho,confirmados_14\n01-04-2020,Porto,3\n",
        );

        let loader = TableLoader::new(&config_for(&national, &regional)).unwrap();

        let table = loader.load(TableKind::National).await.unwrap();
        assert_eq!(table.kind(), TableKind::National);
        assert_eq!(table.len(), 2);

        let table = loader.load(TableKind::Regional).await.unwrap();
        assert_eq!(table.rows()[0].county(), Some("PORTO"));
    }

    #[tokio::test]
    async fn test_every_load_refetches_without_cache() {
        let dir = tempfile::tempdir().unwrap();
        let national = write_csv(&dir, "data.csv", "data,confirmados\n01-04-2020,1\n");
        let loader = TableLoader::new(&config_for(&national, &national)).unwrap();

        assert_eq!(loader.load(TableKind::National).await.unwrap().len(), 1);
        write_csv(&dir, "data.csv", "data,confirmados\n01-04-2020,1\n02-04-2020,2\n");
        assert_eq!(loader.load(TableKind::National).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_cache_serves_same_table_within_ttl() {
        let dir = tempfile::tempdir().unwrap();
        let national = write_csv(&dir, "data.csv", "data,confirmados\n01-04-2020,1\n");
        let mut config = config_for(&national, &national);
        config.cache_ttl_secs = 3600;
        let loader = TableLoader::new(&config).unwrap();

        let first = loader.load(TableKind::National).await.unwrap();
        write_csv(&dir, "data.csv", "data,confirmados\n01-04-2020,1\n02-04-2020,2\n");
        let second = loader.load(TableKind::National).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_file_is_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.csv");
        let mut config = config_for(&missing, &missing);
        config.fetch_retries = 1;
        let loader = TableLoader::new(&config).unwrap();

        let err = loader.load(TableKind::Regional).await.unwrap_err();
        assert!(matches!(err, CovidPtError::SourceUnavailable { .. }));
        assert!(err.to_string().contains("missing.csv"));
    }

    #[tokio::test]
    async fn test_header_only_source_loads_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let national = write_csv(&dir, "data.csv", "data,confirmados\n");
        let loader = TableLoader::new(&config_for(&national, &national)).unwrap();

        let table = loader.load(TableKind::National).await.unwrap();
        assert!(table.is_empty());
        assert_eq!(table.skipped(), 0);
        assert!(table.date_span().is_none());
        assert_eq!(table.columns().collect::<Vec<_>>(), vec!["data", "confirmados"]);
    }

    #[tokio::test]
    async fn test_missing_column_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let national = write_csv(&dir, "data.csv", "data,confirmados\n01-04-2020,1\n");
        let loader = TableLoader::new(&config_for(&national, &national)).unwrap();

        let err = loader.load(TableKind::Regional).await.unwrap_err();
        assert!(matches!(err, CovidPtError::MalformedSource { .. }));
    }
}
