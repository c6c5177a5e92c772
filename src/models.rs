// ==============================================================================
// models.rs - Genomics and Clinical Record Models
// ==============================================================================
// Description: Data structures for validated input rows and joined MAF rows
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use std::collections::HashMap;

use crate::config::{columns, MAF_COLUMNS};

/// One validated row of the genomics variant table.
///
/// Values are kept verbatim so coordinates and alleles round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRecord {
    /// Tumor sample identifier (e.g., "CBIO_P10001_S1")
    pub tumor_sample_barcode: String,

    /// Chromosome name as reported ("1"-"22", "X", "Y", "MT")
    pub chromosome: String,

    /// 1-based start position
    pub start_position: String,

    /// 1-based end position
    pub end_position: String,

    /// Always "+" after validation
    pub strand: String,

    pub reference_allele: String,
    pub tumor_seq_allele1: String,
    pub tumor_seq_allele2: String,

    /// Genome build (e.g., "GRCh37")
    pub ncbi_build: String,
}

/// Identity of a variant call within one sample
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariantKey<'a> {
    pub tumor_sample_barcode: &'a str,
    pub start_position: &'a str,
    pub end_position: &'a str,
    pub reference_allele: &'a str,
    pub tumor_seq_allele2: &'a str,
}

impl VariantRecord {
    pub fn key(&self) -> VariantKey<'_> {
        VariantKey {
            tumor_sample_barcode: &self.tumor_sample_barcode,
            start_position: &self.start_position,
            end_position: &self.end_position,
            reference_allele: &self.reference_allele,
            tumor_seq_allele2: &self.tumor_seq_allele2,
        }
    }
}

impl std::fmt::Display for VariantKey<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "variant call ({}, {}, {}, {}, {})",
            self.tumor_sample_barcode,
            self.start_position,
            self.end_position,
            self.reference_allele,
            self.tumor_seq_allele2
        )
    }
}

/// One validated row of the pre-filtered clinical table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClinicalRecord {
    /// Tumor sample identifier, unique across the table
    pub tumor_sample_barcode: String,

    /// Assay panel version (e.g., "1", "2", "3")
    pub panel_version: String,

    /// Parsed from the exact strings "True" / "False"
    pub exclude_sample: bool,
}

/// A variant paired with the clinical record of its sample
#[derive(Debug, Clone, Copy)]
pub struct JoinedRecord<'a> {
    pub variant: &'a VariantRecord,
    pub clinical: &'a ClinicalRecord,
}

impl JoinedRecord<'_> {
    /// All joined fields keyed by column name, plus `Center`
    pub fn to_fields<'s>(&'s self, center: &'s str) -> HashMap<&'static str, &'s str> {
        let v = self.variant;
        HashMap::from([
            (columns::TUMOR_SAMPLE_BARCODE, v.tumor_sample_barcode.as_str()),
            (columns::CHROMOSOME, v.chromosome.as_str()),
            (columns::START_POSITION, v.start_position.as_str()),
            (columns::END_POSITION, v.end_position.as_str()),
            (columns::STRAND, v.strand.as_str()),
            (columns::REFERENCE_ALLELE, v.reference_allele.as_str()),
            (columns::TUMOR_SEQ_ALLELE1, v.tumor_seq_allele1.as_str()),
            (columns::TUMOR_SEQ_ALLELE2, v.tumor_seq_allele2.as_str()),
            (columns::NCBI_BUILD, v.ncbi_build.as_str()),
            (columns::PANEL_VERSION, self.clinical.panel_version.as_str()),
            (
                columns::EXCLUDE_SAMPLE,
                if self.clinical.exclude_sample { "True" } else { "False" },
            ),
            (columns::CENTER, center),
        ])
    }
}

/// One output row, already projected onto the MAF column order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MafRow(pub Vec<String>);

impl MafRow {
    /// Project a name -> value mapping onto `MAF_COLUMNS`, filling absent names with ""
    pub fn from_fields(fields: &HashMap<&str, &str>) -> Self {
        MafRow(
            MAF_COLUMNS
                .iter()
                .map(|name| fields.get(name).copied().unwrap_or_default().to_string())
                .collect(),
        )
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        MAF_COLUMNS
            .iter()
            .position(|c| *c == column)
            .and_then(|i| self.0.get(i))
            .map(String::as_str)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn variant(barcode: &str, start: &str) -> VariantRecord {
        VariantRecord {
            tumor_sample_barcode: barcode.to_string(),
            chromosome: "7".to_string(),
            start_position: start.to_string(),
            end_position: start.to_string(),
            strand: "+".to_string(),
            reference_allele: "G".to_string(),
            tumor_seq_allele1: "G".to_string(),
            tumor_seq_allele2: "T".to_string(),
            ncbi_build: "GRCh37".to_string(),
        }
    }

    pub fn clinical(barcode: &str, panel: &str, exclude: bool) -> ClinicalRecord {
        ClinicalRecord {
            tumor_sample_barcode: barcode.to_string(),
            panel_version: panel.to_string(),
            exclude_sample: exclude,
        }
    }
}
