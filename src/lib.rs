// ==============================================================================
// lib.rs - MAF Preparation Library
// ==============================================================================
// Description: Library interface for panel MAF preparation modules
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

pub mod config;
pub mod validator;
pub mod models;
pub mod parsers;
pub mod merger;
pub mod output;
pub mod manifest;
pub mod processor;
