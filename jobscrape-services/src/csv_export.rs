//! CSV file exporter.

use std::path::{Path, PathBuf};

use jobscrape_core::{CoreError, Exporter, Table};
use tracing::{debug, instrument};

use crate::error::ServiceError;

/// Writes each worksheet to `<dir>/<worksheet>.csv`.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    dir: PathBuf,
}

impl CsvExporter {
    /// Creates an exporter writing into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a worksheet is written to.
    pub fn path_for(&self, worksheet: &str) -> PathBuf {
        let name: String = worksheet
            .chars()
            .map(|c| if c.is_alphanumeric() || matches!(c, '-' | '_') { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.csv"))
    }

    /// Serializes a table, header first.
    ///
    /// # Errors
    ///
    /// Fails if a row cannot be written.
    pub fn render(table: &Table) -> Result<Vec<u8>, ServiceError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&table.columns)?;
        for row in &table.rows {
            writer.write_record(row)?;
        }
        writer
            .into_inner()
            .map_err(|e| ServiceError::Io(e.into_error()))
    }

    /// Replaces the worksheet file with `table`.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be written.
    #[instrument(skip(self, table), fields(rows = table.len()))]
    pub async fn write(&self, worksheet: &str, table: &Table) -> Result<PathBuf, ServiceError> {
        let bytes = Self::render(table)?;
        let path = self.path_for(worksheet);

        tokio::fs::create_dir_all(&self.dir).await?;
        let temp_path = path.with_extension("csv.tmp");
        tokio::fs::write(&temp_path, &bytes).await?;
        tokio::fs::rename(&temp_path, &path).await?;

        debug!(path = %path.display(), "CSV written");
        Ok(path)
    }
}

impl Exporter for CsvExporter {
    fn name(&self) -> &'static str {
        "csv"
    }

    async fn publish(&self, worksheet: &str, table: &Table) -> Result<(), CoreError> {
        self.write(worksheet, table).await?;
        Ok(())
    }
}
