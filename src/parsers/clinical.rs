// ==============================================================================
// clinical.rs - Pre-Filtered Clinical Table Loader
// ==============================================================================
// Description: Loads and validates the per-sample clinical details table
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Format: Tab-delimited with header row; lines starting with '#' are skipped
// Example:
//   # clinical details export
//   Tumor_Sample_Barcode  Panel_Version  Exclude_Sample
//   CBIO_P10001_S1        1              False
//   CBIO_P10002_S1        2              True
// ==============================================================================

use std::path::Path;
use tracing::info;

use super::table::{LoadError, RawTable, ReadOptions};
use crate::config::{columns, PrepConfig, CLINICAL_COLUMNS, EXCLUDE_FALSE, EXCLUDE_TRUE};
use crate::models::ClinicalRecord;
use crate::validator;

const TABLE: &str = "clinical";

/// Loader for the clinical details table produced by the clinical prep step
#[derive(Debug, Clone)]
pub struct ClinicalLoader<'c> {
    config: &'c PrepConfig,
}

impl<'c> ClinicalLoader<'c> {
    pub fn new(config: &'c PrepConfig) -> Self {
        Self { config }
    }

    /// Load `Tumor_Sample_Barcode`, `Panel_Version` and `Exclude_Sample`.
    ///
    /// # Checks (in order, first failure aborts)
    /// 1. All three columns present
    /// 2. No missing values
    /// 3. Unique sample barcodes
    /// 4. Panel versions within the accepted set
    /// 5. Exclusion flags exactly "True" or "False"
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Vec<ClinicalRecord>, LoadError> {
        let path = path.as_ref();
        info!("Loading clinical table: {:?}", path);

        let table = RawTable::read(TABLE, path, ReadOptions { skip_comments: true })?;
        self.validate(&table)
    }

    pub fn validate(&self, table: &RawTable) -> Result<Vec<ClinicalRecord>, LoadError> {
        let projection = table.project(&CLINICAL_COLUMNS)?;

        validator::check_complete(TABLE, &CLINICAL_COLUMNS, projection.rows(), |v| {
            self.config.is_missing(v)
        })?;

        // Present after the completeness check
        let cells: Vec<[&str; 3]> = projection
            .rows()
            .map(|(_, c)| {
                let get = |i: usize| c.get(i).copied().flatten().unwrap_or_default();
                [get(0), get(1), get(2)]
            })
            .collect();

        validator::check_unique(TABLE, cells.iter().map(|c| c[0]), |barcode| {
            format!("{} '{}'", columns::TUMOR_SAMPLE_BARCODE, barcode)
        })?;

        validator::check_subset(
            TABLE,
            columns::PANEL_VERSION,
            cells.iter().map(|c| c[1]),
            &self.config.panel_versions,
        )?;

        validator::check_subset(
            TABLE,
            columns::EXCLUDE_SAMPLE,
            cells.iter().map(|c| c[2]),
            &[EXCLUDE_TRUE, EXCLUDE_FALSE],
        )?;

        let records: Vec<ClinicalRecord> = cells
            .iter()
            .map(|c| ClinicalRecord {
                tumor_sample_barcode: c[0].to_string(),
                panel_version: c[1].to_string(),
                exclude_sample: c[2] == EXCLUDE_TRUE,
            })
            .collect();

        let excluded = records.iter().filter(|r| r.exclude_sample).count();
        info!(
            "Loaded {} clinical samples ({} flagged for exclusion)",
            records.len(),
            excluded
        );
        Ok(records)
    }
}
