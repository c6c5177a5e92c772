// ==============================================================================
// parsers/mod.rs - Input table loaders
// ==============================================================================
// Description: Readers and validating loaders for genomics and clinical tables
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

pub mod table;
pub mod genomics;
pub mod clinical;

pub use table::{LoadError, RawTable, ReadOptions};
pub use genomics::GenomicsLoader;
pub use clinical::ClinicalLoader;
