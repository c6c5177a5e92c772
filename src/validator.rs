// ==============================================================================
// validator.rs - Input Assumption Checks
// ==============================================================================
// Description: Predicate checks over loaded tables and joined cohorts
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Every check is a pure function returning Ok(()) or the first violation it
// finds. Loaders and the merger compose them in order with `?`, so the first
// failing check aborts the run with its diagnostic.
// ==============================================================================

use std::collections::{BTreeSet, HashSet};
use std::hash::Hash;
use thiserror::Error;
use tracing::debug;

/// Fatal violations of input or output assumptions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Schema violation in {table} table: required column '{column}' not found")]
    Schema { table: String, column: String },

    #[error("Completeness violation in {table} table: missing value in column '{column}' at line {line}")]
    Completeness {
        table: String,
        column: String,
        line: usize,
    },

    #[error("Domain violation in {table} table: column '{column}' has values {found:?}, accepted {accepted:?}")]
    Domain {
        table: String,
        column: String,
        found: Vec<String>,
        accepted: Vec<String>,
    },

    #[error("Uniqueness violation in {table}: duplicate {key}")]
    Uniqueness { table: String, key: String },

    #[error("Referential violation: {missing} genomics sample(s) have no clinical record (first: '{first}')")]
    Referential { missing: usize, first: String },

    #[error("Join consistency violation for panel '{panel}': {details}")]
    JoinConsistency { panel: String, details: String },

    #[error(
        "Cross-field violation for panel '{panel}': sample '{barcode}' has \
         Tumor_Seq_Allele1 '{allele1}' but Reference_Allele '{reference}'"
    )]
    CrossField {
        panel: String,
        barcode: String,
        allele1: String,
        reference: String,
    },
}

/// Resolve each required column to its position in `headers`.
///
/// Duplicate header names resolve to their first occurrence.
pub fn check_required_columns(
    table: &str,
    headers: &[String],
    required: &[&str],
) -> Result<Vec<usize>, ValidationError> {
    required
        .iter()
        .map(|name| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| ValidationError::Schema {
                    table: table.to_string(),
                    column: name.to_string(),
                })
        })
        .collect()
}

/// Fail on the first missing cell, scanning row by row then column by column.
///
/// `rows` yields `(line, cells)` where each cell is `None` when the row is
/// shorter than the header.
pub fn check_complete<'a, R, F>(
    table: &str,
    columns: &[&str],
    rows: R,
    is_missing: F,
) -> Result<(), ValidationError>
where
    R: IntoIterator<Item = (usize, Vec<Option<&'a str>>)>,
    F: Fn(&str) -> bool,
{
    for (line, cells) in rows {
        for (column, cell) in columns.iter().zip(cells) {
            let missing = match cell {
                Some(value) => is_missing(value),
                None => true,
            };
            if missing {
                return Err(ValidationError::Completeness {
                    table: table.to_string(),
                    column: column.to_string(),
                    line,
                });
            }
        }
    }
    Ok(())
}

/// The column must hold exactly one distinct value, equal to `expected`.
///
/// A column with no values at all fails.
pub fn check_single_value<'a, I>(
    table: &str,
    column: &str,
    values: I,
    expected: &str,
) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = &'a str>,
{
    let distinct: BTreeSet<&str> = values.into_iter().collect();

    if distinct.len() == 1 && distinct.contains(expected) {
        debug!("{} column '{}' is uniformly '{}'", table, column, expected);
        return Ok(());
    }

    Err(ValidationError::Domain {
        table: table.to_string(),
        column: column.to_string(),
        found: distinct.into_iter().map(str::to_string).collect(),
        accepted: vec![expected.to_string()],
    })
}

/// Every distinct value of the column must be one of `accepted`.
///
/// Only the offending values are reported, sorted.
pub fn check_subset<'a, I, S>(
    table: &str,
    column: &str,
    values: I,
    accepted: &[S],
) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = &'a str>,
    S: AsRef<str>,
{
    let unexpected: BTreeSet<&str> = values
        .into_iter()
        .filter(|v| !accepted.iter().any(|a| a.as_ref() == *v))
        .collect();

    if unexpected.is_empty() {
        return Ok(());
    }

    Err(ValidationError::Domain {
        table: table.to_string(),
        column: column.to_string(),
        found: unexpected.into_iter().map(str::to_string).collect(),
        accepted: accepted.iter().map(|a| a.as_ref().to_string()).collect(),
    })
}

/// Fail on the first key seen twice. `describe` renders the key for the diagnostic.
pub fn check_unique<K, I, F>(table: &str, keys: I, describe: F) -> Result<(), ValidationError>
where
    K: Eq + Hash,
    I: IntoIterator<Item = K>,
    F: Fn(&K) -> String,
{
    let mut seen = HashSet::new();
    for key in keys {
        if seen.contains(&key) {
            return Err(ValidationError::Uniqueness {
                table: table.to_string(),
                key: describe(&key),
            });
        }
        seen.insert(key);
    }
    Ok(())
}

/// Every genomics sample must have a clinical record. The converse is not required.
pub fn check_samples_covered<'a, G, C>(genomics: G, clinical: C) -> Result<(), ValidationError>
where
    G: IntoIterator<Item = &'a str>,
    C: IntoIterator<Item = &'a str>,
{
    let known: HashSet<&str> = clinical.into_iter().collect();
    let missing: BTreeSet<&str> = genomics.into_iter().filter(|b| !known.contains(b)).collect();

    match missing.iter().next() {
        None => Ok(()),
        Some(first) => Err(ValidationError::Referential {
            missing: missing.len(),
            first: first.to_string(),
        }),
    }
}
