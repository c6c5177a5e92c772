// ==============================================================================
// main.rs - MAF Preparation Entry Point
// ==============================================================================
// Description: Command line entry point for per-panel MAF preparation
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use maf_prep::config::PrepConfig;
use maf_prep::processor::{CohortRequest, MafPrepProcessor};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to input genomics data (MAF-like variant table)
    #[arg(long = "in-genomics", alias = "in_genomics", value_name = "FILE")]
    in_genomics: PathBuf,

    /// Path to input (detailed, preprocessed) clinical data
    #[arg(long = "in-clinical", alias = "in_clinical", value_name = "FILE")]
    in_clinical: PathBuf,

    /// Panel versions to extract, one MAF each
    #[arg(long = "panel-versions", alias = "panel_versions", num_args = 1.., required = true)]
    panel_versions: Vec<String>,

    /// Output MAF paths, paired with --panel-versions by position
    #[arg(long = "out-mafs", alias = "out_mafs", num_args = 1.., required = true, value_name = "FILE")]
    out_mafs: Vec<PathBuf>,

    /// JSON file overriding the built-in configuration
    #[arg(long, env = "MAF_PREP_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write a JSON run manifest (input/output digests and counts)
    #[arg(long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Accept rows whose Tumor_Seq_Allele1 differs from Reference_Allele
    #[arg(long)]
    allow_allele1_mismatch: bool,
}

fn main() -> Result<()> {
    // Initialize tracing (stderr, stdout carries the summary)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "maf_prep=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let started = Instant::now();
    info!("MAF preparation starting...");

    let args = Args::parse();
    info!("in_genomics: {:?}", args.in_genomics);
    info!("in_clinical: {:?}", args.in_clinical);
    info!("panel_versions: {:?}", args.panel_versions);
    info!("out_mafs: {:?}", args.out_mafs);

    let mut config = match &args.config {
        Some(path) => PrepConfig::from_json_file(path)?,
        None => PrepConfig::default(),
    };
    if args.allow_allele1_mismatch {
        config.require_allele1_matches_reference = false;
    }

    let requests = CohortRequest::pair(args.panel_versions, args.out_mafs)?;

    let mut processor = MafPrepProcessor::new(config, args.in_genomics, args.in_clinical, requests);
    if let Some(path) = args.manifest {
        processor = processor.with_manifest(path);
    }

    match processor.process() {
        Ok(summaries) => {
            for summary in &summaries {
                println!("{}", summary);
            }
            info!(
                "Processing completed successfully (total_time = {:.3} secs)",
                started.elapsed().as_secs_f64()
            );
            Ok(())
        }
        Err(e) => {
            error!("Processing failed: {:#}", e);
            Err(e)
        }
    }
}
