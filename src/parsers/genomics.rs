// ==============================================================================
// genomics.rs - Genomics Variant Table Loader
// ==============================================================================
// Description: Loads and validates the institutional variant export
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Format: Tab-delimited MAF-like table with a header row (no comment lines)
// Example:
//   Tumor_Sample_Barcode  Chromosome  Start_Position  End_Position  Strand ...
//   CBIO_P10001_S1        7           140453136       140453136     +      ...
// ==============================================================================

use std::path::Path;
use tracing::info;

use super::table::{LoadError, RawTable, ReadOptions};
use crate::config::{columns, PrepConfig, GENOMICS_COLUMNS};
use crate::models::VariantRecord;
use crate::validator;

const TABLE: &str = "genomics";

/// Loader for the genomics variant table
#[derive(Debug, Clone)]
pub struct GenomicsLoader<'c> {
    config: &'c PrepConfig,
}

impl<'c> GenomicsLoader<'c> {
    pub fn new(config: &'c PrepConfig) -> Self {
        Self { config }
    }

    /// Load the nine retained columns and validate them.
    ///
    /// # Checks (in order, first failure aborts)
    /// 1. All required columns present
    /// 2. No missing value in any retained cell
    /// 3. `Strand` is uniformly the accepted strand
    /// 4. `NCBI_Build` is uniformly the accepted build
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Vec<VariantRecord>, LoadError> {
        let path = path.as_ref();
        info!("Loading genomics table: {:?}", path);

        let table = RawTable::read(TABLE, path, ReadOptions::default())?;
        self.validate(&table)
    }

    /// Validate an already-read table and convert it into records
    pub fn validate(&self, table: &RawTable) -> Result<Vec<VariantRecord>, LoadError> {
        let projection = table.project(&GENOMICS_COLUMNS)?;

        validator::check_complete(TABLE, &GENOMICS_COLUMNS, projection.rows(), |v| {
            self.config.is_missing(v)
        })?;

        let records: Vec<VariantRecord> = projection
            .rows()
            .map(|(_, cells)| to_record(&cells))
            .collect();

        validator::check_single_value(
            TABLE,
            columns::STRAND,
            records.iter().map(|r| r.strand.as_str()),
            &self.config.strand,
        )?;

        validator::check_single_value(
            TABLE,
            columns::NCBI_BUILD,
            records.iter().map(|r| r.ncbi_build.as_str()),
            &self.config.ncbi_build,
        )?;

        info!("Loaded {} genomics variant rows", records.len());
        Ok(records)
    }
}

/// Cells arrive in `GENOMICS_COLUMNS` order and are known to be present
fn to_record(cells: &[Option<&str>]) -> VariantRecord {
    let cell = |i: usize| cells.get(i).copied().flatten().unwrap_or_default().to_string();
    VariantRecord {
        tumor_sample_barcode: cell(0),
        chromosome: cell(1),
        start_position: cell(2),
        end_position: cell(3),
        strand: cell(4),
        reference_allele: cell(5),
        tumor_seq_allele1: cell(6),
        tumor_seq_allele2: cell(7),
        ncbi_build: cell(8),
    }
}
