// ==============================================================================
// config.rs - MAF Preparation Configuration
// ==============================================================================
// Description: Fixed schema constants and accepted-value enumerations
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// MAF 2.4 output columns, in output order
pub const MAF_COLUMNS: [&str; 34] = [
    "Hugo_Symbol",
    "Entrez_Gene_Id",
    "Center",
    "NCBI_Build",
    "Chromosome",
    "Start_Position",
    "End_Position",
    "Strand",
    "Variant_Classification",
    "Variant_Type",
    "Reference_Allele",
    "Tumor_Seq_Allele1",
    "Tumor_Seq_Allele2",
    "dbSNP_RS",
    "dbSNP_Val_Status",
    "Tumor_Sample_Barcode",
    "Matched_Norm_Sample_Barcode",
    "Match_Norm_Seq_Allele1",
    "Match_Norm_Seq_Allele2",
    "Tumor_Validation_Allele1",
    "Tumor_Validation_Allele2",
    "Match_Norm_Validation_Allele1",
    "Match_Norm_Validation_Allele2",
    "Verification_Status",
    "Validation_Status",
    "Mutation_Status",
    "Sequencing_Phase",
    "Sequence_Source",
    "Validation_Method",
    "Score",
    "BAM_File",
    "Sequencer",
    "Tumor_Sample_UUID",
    "Matched_Norm_Sample_UUID",
];

/// Column names shared by the input tables and the MAF schema
pub mod columns {
    pub const TUMOR_SAMPLE_BARCODE: &str = "Tumor_Sample_Barcode";
    pub const CHROMOSOME: &str = "Chromosome";
    pub const START_POSITION: &str = "Start_Position";
    pub const END_POSITION: &str = "End_Position";
    pub const STRAND: &str = "Strand";
    pub const REFERENCE_ALLELE: &str = "Reference_Allele";
    pub const TUMOR_SEQ_ALLELE1: &str = "Tumor_Seq_Allele1";
    pub const TUMOR_SEQ_ALLELE2: &str = "Tumor_Seq_Allele2";
    pub const NCBI_BUILD: &str = "NCBI_Build";
    pub const CENTER: &str = "Center";

    pub const PANEL_VERSION: &str = "Panel_Version";
    pub const EXCLUDE_SAMPLE: &str = "Exclude_Sample";
}

/// Genomics columns retained by the loader, in this order
pub const GENOMICS_COLUMNS: [&str; 9] = [
    columns::TUMOR_SAMPLE_BARCODE,
    columns::CHROMOSOME,
    columns::START_POSITION,
    columns::END_POSITION,
    columns::STRAND,
    columns::REFERENCE_ALLELE,
    columns::TUMOR_SEQ_ALLELE1,
    columns::TUMOR_SEQ_ALLELE2,
    columns::NCBI_BUILD,
];

/// Clinical columns retained by the loader, in this order
pub const CLINICAL_COLUMNS: [&str; 3] = [
    columns::TUMOR_SAMPLE_BARCODE,
    columns::PANEL_VERSION,
    columns::EXCLUDE_SAMPLE,
];

/// Exact string values accepted in the `Exclude_Sample` column
pub const EXCLUDE_TRUE: &str = "True";
pub const EXCLUDE_FALSE: &str = "False";

/// Default cell tokens treated as missing data
const DEFAULT_MISSING_VALUES: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Run-wide configuration, loaded once at startup and never mutated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepConfig {
    /// Accepted `Panel_Version` values
    pub panel_versions: Vec<String>,

    /// The only accepted `NCBI_Build` value
    pub ncbi_build: String,

    /// The only accepted `Strand` value
    pub strand: String,

    /// Literal written to `Center` on every output row
    pub center: String,

    /// First line of every output MAF
    pub version_header: String,

    /// Reject rows where `Tumor_Seq_Allele1` differs from `Reference_Allele`
    pub require_allele1_matches_reference: bool,

    /// Cell values treated as missing
    pub missing_values: Vec<String>,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            panel_versions: vec!["1".to_string(), "2".to_string(), "3".to_string()],
            ncbi_build: "GRCh37".to_string(),
            strand: "+".to_string(),
            center: "DFCI".to_string(),
            version_header: "#version 2.4".to_string(),
            require_allele1_matches_reference: true,
            missing_values: DEFAULT_MISSING_VALUES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl PrepConfig {
    /// Load configuration overrides from a JSON file.
    ///
    /// Keys absent from the file keep their default values.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;

        let config: PrepConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;

        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn is_missing(&self, value: &str) -> bool {
        self.missing_values.iter().any(|m| m == value)
    }

    pub fn is_accepted_panel(&self, version: &str) -> bool {
        self.panel_versions.iter().any(|v| v == version)
    }
}
