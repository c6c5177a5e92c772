// ==============================================================================
// output.rs - MAF Output Generation
// ==============================================================================
// Description: Serializes one cohort table as a MAF 2.4 file
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Layout:
//   #version 2.4
//   Hugo_Symbol  Entrez_Gene_Id  Center  ...  Matched_Norm_Sample_UUID
//   <one tab-separated row per variant call, empty cells as "">
// ==============================================================================

use anyhow::{Context, Result};
use csv::{QuoteStyle, WriterBuilder};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::config::{PrepConfig, MAF_COLUMNS};
use crate::merger::CohortTable;

/// Writes cohort tables in MAF layout
#[derive(Debug, Clone)]
pub struct MafWriter<'c> {
    config: &'c PrepConfig,
}

impl<'c> MafWriter<'c> {
    pub fn new(config: &'c PrepConfig) -> Self {
        Self { config }
    }

    /// Write `table` to `path`.
    ///
    /// The file is staged next to its destination and renamed into place, so
    /// `path` only ever holds a complete MAF.
    pub fn write(&self, table: &CohortTable, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {:?}", dir))?;

        let mut staged = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temporary file in {:?}", dir))?;
        debug!("Staging MAF at {:?}", staged.path());

        self.write_to(table, &mut staged)
            .with_context(|| format!("Failed to write MAF for panel '{}'", table.panel_version))?;

        staged
            .as_file()
            .sync_all()
            .context("Failed to sync MAF to disk")?;

        staged
            .persist(path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to move MAF into place at {:?}", path))?;

        info!(
            "✓ Wrote {} variant calls for panel '{}' to {:?}",
            table.rows.len(),
            table.panel_version,
            path
        );
        Ok(())
    }

    /// Serialize `table` into any writer
    pub fn write_to<W: Write>(&self, table: &CohortTable, mut out: W) -> Result<()> {
        writeln!(out, "{}", self.config.version_header)?;

        let mut writer = WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(QuoteStyle::Necessary)
            .from_writer(out);

        writer.write_record(MAF_COLUMNS)?;
        for row in &table.rows {
            writer.write_record(&row.0)?;
        }
        writer.flush()?;

        Ok(())
    }
}
