//! Fan-out over the configured export destinations.

use jobscrape_core::{CoreError, Exporter, Table};
use tracing::{info, warn};

use crate::csv_export::CsvExporter;
use crate::sheets::SheetsExporter;

/// Every destination a run publishes to.
///
/// Each destination is attempted even when an earlier one fails; the first
/// failure is returned afterwards.
#[derive(Debug, Default)]
pub struct ExportTargets {
    sheets: Option<SheetsExporter>,
    csv: Option<CsvExporter>,
}

impl ExportTargets {
    /// No destinations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the Sheets destination.
    #[must_use]
    pub fn with_sheets(mut self, sheets: SheetsExporter) -> Self {
        self.sheets = Some(sheets);
        self
    }

    /// Adds the CSV destination.
    #[must_use]
    pub fn with_csv(mut self, csv: CsvExporter) -> Self {
        self.csv = Some(csv);
        self
    }

    /// Returns true if nothing is configured.
    pub fn is_empty(&self) -> bool {
        self.sheets.is_none() && self.csv.is_none()
    }

    /// Names of the configured destinations.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if let Some(sheets) = &self.sheets {
            names.push(sheets.name());
        }
        if let Some(csv) = &self.csv {
            names.push(csv.name());
        }
        names
    }
}

fn record(
    first: &mut Option<CoreError>,
    target: &'static str,
    worksheet: &str,
    result: Result<(), CoreError>,
) {
    match result {
        Ok(()) => info!(target_name = target, worksheet, "Published"),
        Err(e) => {
            warn!(target_name = target, worksheet, error = %e, "Publish failed");
            first.get_or_insert(e);
        }
    }
}

impl Exporter for ExportTargets {
    fn name(&self) -> &'static str {
        "targets"
    }

    async fn publish(&self, worksheet: &str, table: &Table) -> Result<(), CoreError> {
        let mut first_error = None;

        if let Some(sheets) = &self.sheets {
            let result = sheets.publish(worksheet, table).await;
            record(&mut first_error, sheets.name(), worksheet, result);
        }
        if let Some(csv) = &self.csv {
            let result = csv.publish(worksheet, table).await;
            record(&mut first_error, csv.name(), worksheet, result);
        }

        first_error.map_or(Ok(()), Err)
    }
}
