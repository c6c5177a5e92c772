// ==============================================================================
// manifest.rs - Run Provenance Manifest
// ==============================================================================
// Description: JSON record of inputs, configuration and outputs for one run
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

use crate::config::PrepConfig;
use crate::merger::CohortCounts;

#[derive(Debug, Clone, Serialize)]
pub struct FileDigest {
    pub path: PathBuf,
    pub sha256: String,
}

impl FileDigest {
    pub fn of(path: &Path) -> Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            sha256: compute_sha256(path)
                .with_context(|| format!("Failed to hash {:?}", path))?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CohortEntry {
    pub panel_version: String,
    pub output: FileDigest,
    #[serde(flatten)]
    pub counts: CohortCounts,
}

#[derive(Debug, Serialize)]
pub struct RunManifest {
    pub run_id: Uuid,
    pub tool_version: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub genomics: FileDigest,
    pub clinical: FileDigest,
    pub config: PrepConfig,
    pub cohorts: Vec<CohortEntry>,
}

impl RunManifest {
    pub fn start(
        genomics: &Path,
        clinical: &Path,
        config: &PrepConfig,
        started_at: DateTime<Utc>,
    ) -> Result<Self> {
        Ok(Self {
            run_id: Uuid::new_v4(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            started_at,
            finished_at: None,
            genomics: FileDigest::of(genomics)?,
            clinical: FileDigest::of(clinical)?,
            config: config.clone(),
            cohorts: Vec::new(),
        })
    }

    pub fn record_cohort(&mut self, panel_version: &str, output: &Path, counts: CohortCounts) -> Result<()> {
        self.cohorts.push(CohortEntry {
            panel_version: panel_version.to_string(),
            output: FileDigest::of(output)?,
            counts,
        });
        Ok(())
    }

    /// Stamp the finish time and write pretty JSON to `path`
    pub fn finish(mut self, path: &Path) -> Result<()> {
        self.finished_at = Some(Utc::now());

        let json = serde_json::to_string_pretty(&self)
            .context("Failed to serialize run manifest")?;
        std::fs::write(path, json + "\n")
            .with_context(|| format!("Failed to write run manifest {:?}", path))?;

        info!("Run manifest written: {:?} (run {})", path, self.run_id);
        Ok(())
    }
}

fn compute_sha256(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
