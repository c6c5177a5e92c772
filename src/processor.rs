// ==============================================================================
// processor.rs - MAF Preparation Pipeline
// ==============================================================================
// Description: Loads genomics and clinical tables once, then writes one MAF
//              per requested panel version
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use chrono::Utc;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::config::PrepConfig;
use crate::manifest::RunManifest;
use crate::merger::{CohortCounts, CohortMerger};
use crate::output::MafWriter;
use crate::parsers::{ClinicalLoader, GenomicsLoader};

/// One requested panel version and where its MAF goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CohortRequest {
    pub panel_version: String,
    pub output: PathBuf,
}

impl CohortRequest {
    /// Pair panel versions with output paths by position
    pub fn pair(panel_versions: Vec<String>, outputs: Vec<PathBuf>) -> Result<Vec<Self>> {
        if panel_versions.is_empty() {
            anyhow::bail!("At least one panel version must be requested");
        }
        if panel_versions.len() != outputs.len() {
            anyhow::bail!(
                "Got {} panel versions but {} output paths",
                panel_versions.len(),
                outputs.len()
            );
        }

        Ok(panel_versions
            .into_iter()
            .zip(outputs)
            .map(|(panel_version, output)| CohortRequest {
                panel_version,
                output,
            })
            .collect())
    }
}

/// Outcome of one written cohort
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CohortSummary {
    pub panel_version: String,
    pub output: PathBuf,
    pub counts: CohortCounts,
}

impl fmt::Display for CohortSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(50);
        writeln!(f, "## {}", rule)?;
        writeln!(f, "## Outfile Summary (Panel: 'OncoPanel-v{}'):", self.panel_version)?;
        writeln!(f, "##   Total # Samples (Clinical): {}", self.counts.clinical_samples)?;
        writeln!(f, "##   Total # Samples (Genomics): {}", self.counts.genomics_samples)?;
        writeln!(f, "##   Total # Variant Calls: {}", self.counts.variant_calls)?;
        write!(f, "## {}", rule)
    }
}

pub struct MafPrepProcessor {
    config: PrepConfig,
    genomics_path: PathBuf,
    clinical_path: PathBuf,
    requests: Vec<CohortRequest>,
    manifest_path: Option<PathBuf>,
}

impl MafPrepProcessor {
    pub fn new(
        config: PrepConfig,
        genomics_path: PathBuf,
        clinical_path: PathBuf,
        requests: Vec<CohortRequest>,
    ) -> Self {
        Self {
            config,
            genomics_path,
            clinical_path,
            requests,
            manifest_path: None,
        }
    }

    pub fn with_manifest(mut self, path: PathBuf) -> Self {
        self.manifest_path = Some(path);
        self
    }

    /// Main processing pipeline.
    ///
    /// Any violation aborts the remaining cohorts. MAFs already written for
    /// earlier cohorts stay on disk.
    pub fn process(&self) -> Result<Vec<CohortSummary>> {
        let started_at = Utc::now();
        info!("Starting MAF preparation for {} panel(s)", self.requests.len());

        if self.requests.is_empty() {
            anyhow::bail!("No panel versions requested");
        }

        // 1. Load and validate inputs
        let genomics = GenomicsLoader::new(&self.config)
            .load(&self.genomics_path)
            .with_context(|| format!("Failed to load genomics table {:?}", self.genomics_path))?;

        let clinical = ClinicalLoader::new(&self.config)
            .load(&self.clinical_path)
            .with_context(|| format!("Failed to load clinical table {:?}", self.clinical_path))?;

        // 2. Every genomics sample must be known clinically
        let merger = CohortMerger::new(&self.config, &genomics, &clinical)
            .context("Genomics and clinical tables are inconsistent")?;

        let mut manifest = match &self.manifest_path {
            Some(_) => Some(RunManifest::start(
                &self.genomics_path,
                &self.clinical_path,
                &self.config,
                started_at,
            )?),
            None => None,
        };

        // 3. One MAF per requested panel, in request order
        let writer = MafWriter::new(&self.config);
        let mut summaries = Vec::with_capacity(self.requests.len());

        for request in &self.requests {
            if !self.config.is_accepted_panel(&request.panel_version) {
                warn!(
                    "Panel version '{}' is not one of {:?}",
                    request.panel_version, self.config.panel_versions
                );
            }
            debug!("Panel '{}' -> {:?}", request.panel_version, request.output);

            let table = merger
                .merge(&request.panel_version)
                .with_context(|| format!("Failed to build cohort for panel '{}'", request.panel_version))?;

            writer.write(&table, &request.output)?;

            if let Some(manifest) = manifest.as_mut() {
                manifest.record_cohort(&request.panel_version, &request.output, table.counts)?;
            }

            summaries.push(CohortSummary {
                panel_version: request.panel_version.clone(),
                output: request.output.clone(),
                counts: table.counts,
            });
        }

        // 4. Provenance only for complete runs
        if let (Some(manifest), Some(path)) = (manifest, self.manifest_path.as_deref()) {
            manifest.finish(path)?;
        }

        info!("Processing complete: {} MAF file(s) written", summaries.len());
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAF_COLUMNS;
    use crate::parsers::LoadError;
    use crate::validator::ValidationError;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const GENOMICS_HEADER: &str = "Tumor_Sample_Barcode\tChromosome\tStart_Position\tEnd_Position\tStrand\tReference_Allele\tTumor_Seq_Allele1\tTumor_Seq_Allele2\tNCBI_Build";
    const CLINICAL_HEADER: &str = "Tumor_Sample_Barcode\tPanel_Version\tExclude_Sample";

    struct Fixture {
        dir: TempDir,
        genomics: PathBuf,
        clinical: PathBuf,
    }

    impl Fixture {
        fn new(genomics_rows: &[&str], clinical_rows: &[&str]) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let genomics = dir.path().join("genomics.maf");
            let clinical = dir.path().join("clinical.tsv");

            let mut g = vec![GENOMICS_HEADER];
            g.extend_from_slice(genomics_rows);
            fs::write(&genomics, g.join("\n") + "\n").unwrap();

            let mut c = vec!["# prepped clinical details", CLINICAL_HEADER];
            c.extend_from_slice(clinical_rows);
            fs::write(&clinical, c.join("\n") + "\n").unwrap();

            Self {
                dir,
                genomics,
                clinical,
            }
        }

        fn out(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }

        fn processor(&self, panels: &[(&str, &str)]) -> MafPrepProcessor {
            let requests = panels
                .iter()
                .map(|(panel, name)| CohortRequest {
                    panel_version: panel.to_string(),
                    output: self.out(name),
                })
                .collect();
            MafPrepProcessor::new(
                PrepConfig::default(),
                self.genomics.clone(),
                self.clinical.clone(),
                requests,
            )
        }
    }

    fn scenario() -> Fixture {
        Fixture::new(
            &[
                "S1\t7\t100\t100\t+\tG\tG\tT\tGRCh37",
                "S2\t12\t200\t200\t+\tC\tC\tA\tGRCh37",
            ],
            &["S1\t1\tFalse", "S2\t2\tTrue"],
        )
    }

    fn data_rows(path: &Path) -> Vec<Vec<String>> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .skip(2)
            .map(|l| l.split('\t').map(str::to_string).collect())
            .collect()
    }

    fn root_cause(err: &anyhow::Error) -> Option<&ValidationError> {
        err.chain().find_map(|e| {
            e.downcast_ref::<ValidationError>().or_else(|| match e.downcast_ref::<LoadError>() {
                Some(LoadError::Validation(v)) => Some(v),
                _ => None,
            })
        })
    }

    #[test]
    fn test_scenario_panel_one() {
        let fx = scenario();
        let summaries = fx.processor(&[("1", "panel1.maf")]).process().unwrap();

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].counts.variant_calls, 1);

        let rows = data_rows(&fx.out("panel1.maf"));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][15], "S1");
        assert_eq!(rows[0][2], "DFCI");

        let text = fs::read_to_string(fx.out("panel1.maf")).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("#version 2.4"));
        assert_eq!(lines.next(), Some(MAF_COLUMNS.join("\t").as_str()));
    }

    #[test]
    fn test_scenario_panel_two_is_empty() {
        let fx = scenario();
        let err = fx.processor(&[("2", "panel2.maf")]).process().unwrap_err();

        assert!(matches!(
            root_cause(&err),
            Some(ValidationError::JoinConsistency { .. })
        ));
        assert!(!fx.out("panel2.maf").exists());
    }

    #[test]
    fn test_earlier_outputs_survive_later_failure() {
        let fx = scenario();
        let result = fx
            .processor(&[("1", "panel1.maf"), ("2", "panel2.maf"), ("3", "panel3.maf")])
            .process();

        assert!(result.is_err());
        assert!(fx.out("panel1.maf").exists());
        assert!(!fx.out("panel2.maf").exists());
        assert!(!fx.out("panel3.maf").exists());
    }

    #[test]
    fn test_unknown_genomics_sample_aborts_before_output() {
        let fx = Fixture::new(
            &[
                "S1\t7\t100\t100\t+\tG\tG\tT\tGRCh37",
                "S9\t7\t200\t200\t+\tG\tG\tT\tGRCh37",
            ],
            &["S1\t1\tFalse"],
        );
        let err = fx.processor(&[("1", "panel1.maf")]).process().unwrap_err();

        assert!(matches!(
            root_cause(&err),
            Some(ValidationError::Referential { .. })
        ));
        assert!(!fx.out("panel1.maf").exists());
    }

    #[test]
    fn test_duplicate_clinical_barcode_aborts() {
        let fx = Fixture::new(
            &["S1\t7\t100\t100\t+\tG\tG\tT\tGRCh37"],
            &["S1\t1\tFalse", "S1\t1\tTrue"],
        );
        let err = fx.processor(&[("1", "panel1.maf")]).process().unwrap_err();

        assert!(matches!(
            root_cause(&err),
            Some(ValidationError::Uniqueness { .. })
        ));
    }

    #[test]
    fn test_minus_strand_aborts() {
        let fx = Fixture::new(
            &[
                "S1\t7\t100\t100\t+\tG\tG\tT\tGRCh37",
                "S1\t7\t200\t200\t-\tG\tG\tT\tGRCh37",
            ],
            &["S1\t1\tFalse"],
        );
        let err = fx.processor(&[("1", "panel1.maf")]).process().unwrap_err();

        match root_cause(&err) {
            Some(ValidationError::Domain { column, .. }) => assert_eq!(column, "Strand"),
            other => panic!("Expected Domain error, got {:?}", other),
        }
        assert!(!fx.out("panel1.maf").exists());
    }

    #[test]
    fn test_output_properties() {
        let fx = Fixture::new(
            &[
                "S1\t7\t100\t100\t+\tG\tG\tT\tGRCh37",
                "S2\t7\t100\t100\t+\tG\tG\tT\tGRCh37",
                "S3\t7\t300\t301\t+\tGA\tGA\t-\tGRCh37",
                "S1\t9\t500\t500\t+\tC\tC\tA\tGRCh37",
            ],
            &["S1\t1\tFalse", "S2\t1\tTrue", "S3\t1\tFalse", "S4\t1\tFalse"],
        );
        let summaries = fx.processor(&[("1", "panel1.maf")]).process().unwrap();
        assert_eq!(
            summaries[0].counts,
            CohortCounts {
                clinical_samples: 3,
                genomics_samples: 2,
                variant_calls: 3,
            }
        );

        let rows = data_rows(&fx.out("panel1.maf"));
        let col = |name: &str| MAF_COLUMNS.iter().position(|c| *c == name).unwrap();

        let mut keys = std::collections::HashSet::new();
        for row in &rows {
            assert_eq!(row.len(), MAF_COLUMNS.len());
            assert!(["S1", "S3"].contains(&row[col("Tumor_Sample_Barcode")].as_str()));
            assert_eq!(row[col("Tumor_Seq_Allele1")], row[col("Reference_Allele")]);
            assert!(keys.insert((
                row[col("Tumor_Sample_Barcode")].clone(),
                row[col("Start_Position")].clone(),
                row[col("End_Position")].clone(),
                row[col("Reference_Allele")].clone(),
                row[col("Tumor_Seq_Allele2")].clone(),
            )));
        }
    }

    #[test]
    fn test_runs_are_byte_identical() {
        let fx = Fixture::new(
            &["S1\t7\t100\t100\t+\tG\tG\tT\tGRCh37"],
            &["S1\t1\tFalse"],
        );
        fx.processor(&[("1", "first.maf")]).process().unwrap();
        fx.processor(&[("1", "second.maf")]).process().unwrap();

        assert_eq!(
            fs::read(fx.out("first.maf")).unwrap(),
            fs::read(fx.out("second.maf")).unwrap()
        );
    }

    #[test]
    fn test_unknown_panel_fails_at_its_turn() {
        let fx = Fixture::new(
            &["S1\t7\t100\t100\t+\tG\tG\tT\tGRCh37"],
            &["S1\t1\tFalse"],
        );
        let err = fx
            .processor(&[("1", "p1.maf"), ("4", "p4.maf")])
            .process()
            .unwrap_err();

        match root_cause(&err) {
            Some(ValidationError::JoinConsistency { panel, .. }) => assert_eq!(panel, "4"),
            other => panic!("Expected JoinConsistency error, got {:?}", other),
        }
        assert!(fx.out("p1.maf").exists());
        assert!(!fx.out("p4.maf").exists());
    }

    #[test]
    fn test_later_panel_overwrites_shared_output() {
        let fx = Fixture::new(
            &[
                "S1\t7\t100\t100\t+\tG\tG\tT\tGRCh37",
                "S3\t7\t200\t200\t+\tG\tG\tT\tGRCh37",
            ],
            &["S1\t1\tFalse", "S3\t3\tFalse"],
        );
        fx.processor(&[("1", "same.maf"), ("3", "same.maf")])
            .process()
            .unwrap();

        let rows = data_rows(&fx.out("same.maf"));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][15], "S3");
    }

    #[test]
    fn test_manifest_written_on_success_only() {
        let fx = scenario();

        let ok_manifest = fx.out("ok.json");
        fx.processor(&[("1", "panel1.maf")])
            .with_manifest(ok_manifest.clone())
            .process()
            .unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&ok_manifest).unwrap()).unwrap();
        assert_eq!(value["cohorts"].as_array().unwrap().len(), 1);

        let failed_manifest = fx.out("failed.json");
        assert!(fx
            .processor(&[("1", "again.maf"), ("2", "panel2.maf")])
            .with_manifest(failed_manifest.clone())
            .process()
            .is_err());
        assert!(!failed_manifest.exists());
    }

    #[test]
    fn test_gzipped_genomics_input() {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let fx = scenario();
        let gz_path = fx.dir.path().join("genomics.maf.gz");
        let mut encoder = GzEncoder::new(fs::File::create(&gz_path).unwrap(), Compression::default());
        encoder.write_all(&fs::read(&fx.genomics).unwrap()).unwrap();
        encoder.finish().unwrap();

        let processor = MafPrepProcessor::new(
            PrepConfig::default(),
            gz_path,
            fx.clinical.clone(),
            vec![CohortRequest {
                panel_version: "1".to_string(),
                output: fx.out("from_gz.maf"),
            }],
        );
        processor.process().unwrap();
        fx.processor(&[("1", "plain.maf")]).process().unwrap();

        assert_eq!(
            fs::read(fx.out("from_gz.maf")).unwrap(),
            fs::read(fx.out("plain.maf")).unwrap()
        );
    }

    #[test]
    fn test_pair_requests() {
        let pairs = CohortRequest::pair(
            vec!["1".to_string(), "3".to_string()],
            vec![PathBuf::from("a.maf"), PathBuf::from("c.maf")],
        )
        .unwrap();
        assert_eq!(pairs[1].panel_version, "3");
        assert_eq!(pairs[1].output, PathBuf::from("c.maf"));

        assert!(CohortRequest::pair(vec!["1".to_string()], vec![]).is_err());
        assert!(CohortRequest::pair(vec![], vec![]).is_err());
    }

    #[test]
    fn test_summary_display() {
        let summary = CohortSummary {
            panel_version: "2".to_string(),
            output: PathBuf::from("p2.maf"),
            counts: CohortCounts {
                clinical_samples: 10,
                genomics_samples: 8,
                variant_calls: 42,
            },
        };
        let text = summary.to_string();
        assert!(text.contains("## Outfile Summary (Panel: 'OncoPanel-v2'):"));
        assert!(text.contains("##   Total # Samples (Clinical): 10"));
        assert!(text.contains("##   Total # Samples (Genomics): 8"));
        assert!(text.contains("##   Total # Variant Calls: 42"));
    }
}
