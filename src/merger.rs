// ==============================================================================
// merger.rs - Per-Panel Cohort Merge
// ==============================================================================
// Description: Joins validated genomics and clinical tables for one panel
//              version and reconciles the result to the MAF schema
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use crate::config::PrepConfig;
use crate::models::{ClinicalRecord, JoinedRecord, MafRow, VariantRecord};
use crate::validator::{self, ValidationError};

/// Counts reported for each written cohort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CohortCounts {
    /// Distinct samples in the panel after exclusion filtering
    pub clinical_samples: usize,
    /// Distinct samples with at least one output variant
    pub genomics_samples: usize,
    /// Output rows
    pub variant_calls: usize,
}

/// One panel's output rows, in genomics input order
#[derive(Debug, Clone)]
pub struct CohortTable {
    pub panel_version: String,
    pub rows: Vec<MafRow>,
    pub counts: CohortCounts,
}

/// Joins the two loaded tables once per requested panel version
#[derive(Debug)]
pub struct CohortMerger<'a> {
    config: &'a PrepConfig,
    genomics: &'a [VariantRecord],
    clinical: &'a [ClinicalRecord],
}

impl<'a> CohortMerger<'a> {
    /// Fails unless every genomics sample has a clinical record
    pub fn new(
        config: &'a PrepConfig,
        genomics: &'a [VariantRecord],
        clinical: &'a [ClinicalRecord],
    ) -> Result<Self, ValidationError> {
        validator::check_samples_covered(
            genomics.iter().map(|v| v.tumor_sample_barcode.as_str()),
            clinical.iter().map(|c| c.tumor_sample_barcode.as_str()),
        )?;
        debug!("All genomics samples have clinical records");

        Ok(Self {
            config,
            genomics,
            clinical,
        })
    }

    /// Build the MAF rows for one panel version
    pub fn merge(&self, panel_version: &str) -> Result<CohortTable, ValidationError> {
        info!("Merging cohort for panel version '{}'", panel_version);

        // 1. Panel members not flagged for exclusion
        let cohort: Vec<&ClinicalRecord> = self
            .clinical
            .iter()
            .filter(|c| c.panel_version == panel_version)
            .filter(|c| !c.exclude_sample)
            .collect();
        debug!("{} clinical samples retained for panel '{}'", cohort.len(), panel_version);

        // 2. Inner join on sample barcode
        let joined = inner_join(self.genomics, &cohort);

        // 3. Post-join checks
        check_join_consistency(panel_version, &joined)?;

        validator::check_unique(
            &format!("panel '{}' output", panel_version),
            joined.iter().map(|j| j.variant.key()),
            |key| key.to_string(),
        )?;

        if self.config.require_allele1_matches_reference {
            check_allele1_matches_reference(panel_version, &joined)?;
        }

        // 4. Reconcile to the MAF schema with Center filled in
        let rows: Vec<MafRow> = joined
            .iter()
            .map(|j| MafRow::from_fields(&j.to_fields(&self.config.center)))
            .collect();

        if rows.is_empty() {
            return Err(ValidationError::JoinConsistency {
                panel: panel_version.to_string(),
                details: "no variant calls remain for this panel".to_string(),
            });
        }

        let genomics_samples = joined
            .iter()
            .map(|j| j.variant.tumor_sample_barcode.as_str())
            .collect::<HashSet<_>>()
            .len();

        let counts = CohortCounts {
            clinical_samples: cohort.len(),
            genomics_samples,
            variant_calls: rows.len(),
        };

        info!(
            "Panel '{}': {} variant calls from {} samples",
            panel_version, counts.variant_calls, counts.genomics_samples
        );

        Ok(CohortTable {
            panel_version: panel_version.to_string(),
            rows,
            counts,
        })
    }
}

/// Equality join keeping only variants whose sample is in `cohort`, in genomics order
fn inner_join<'a>(
    genomics: &'a [VariantRecord],
    cohort: &[&'a ClinicalRecord],
) -> Vec<JoinedRecord<'a>> {
    let mut index: HashMap<&str, Vec<&'a ClinicalRecord>> = HashMap::new();
    for &record in cohort {
        index
            .entry(record.tumor_sample_barcode.as_str())
            .or_default()
            .push(record);
    }

    genomics
        .iter()
        .flat_map(|variant| {
            index
                .get(variant.tumor_sample_barcode.as_str())
                .into_iter()
                .flatten()
                .map(move |&clinical| JoinedRecord { variant, clinical })
        })
        .collect()
}

fn check_join_consistency(panel: &str, joined: &[JoinedRecord<'_>]) -> Result<(), ValidationError> {
    match joined
        .iter()
        .find(|j| j.variant.tumor_sample_barcode != j.clinical.tumor_sample_barcode)
    {
        None => Ok(()),
        Some(j) => Err(ValidationError::JoinConsistency {
            panel: panel.to_string(),
            details: format!(
                "variant of sample '{}' paired with clinical record '{}'",
                j.variant.tumor_sample_barcode, j.clinical.tumor_sample_barcode
            ),
        }),
    }
}

fn check_allele1_matches_reference(
    panel: &str,
    joined: &[JoinedRecord<'_>],
) -> Result<(), ValidationError> {
    match joined
        .iter()
        .find(|j| j.variant.tumor_seq_allele1 != j.variant.reference_allele)
    {
        None => Ok(()),
        Some(j) => Err(ValidationError::CrossField {
            panel: panel.to_string(),
            barcode: j.variant.tumor_sample_barcode.clone(),
            allele1: j.variant.tumor_seq_allele1.clone(),
            reference: j.variant.reference_allele.clone(),
        }),
    }
}
