// ==============================================================================
// table.rs - Tab-Delimited Table Reader
// ==============================================================================
// Description: Shared reader for header-first tab-delimited input tables
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Format: Tab-delimited text, first non-comment line is the header row.
// Files ending in .gz are decompressed on the fly.
// ==============================================================================

use csv::{ReaderBuilder, StringRecord};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::validator::{self, ValidationError};

/// Errors that can occur while loading an input table
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Delimited parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("{0} table has no header row")]
    EmptyFile(String),

    #[error("{table} table line {line}: expected at most {expected} fields, found {found}")]
    TooManyFields {
        table: String,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// One data row with its 1-based line number in the source file
#[derive(Debug, Clone)]
pub struct RawRow {
    pub line: usize,
    pub fields: StringRecord,
}

/// Header and rows of a tab-delimited file, all cells as verbatim strings
#[derive(Debug, Clone)]
pub struct RawTable {
    /// Label used in diagnostics (e.g., "genomics")
    pub label: String,
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// How to read a table
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    /// Skip lines that begin with '#'
    pub skip_comments: bool,
}

impl RawTable {
    /// Read a whole table into memory.
    ///
    /// Rows may be shorter than the header and surface as missing cells when
    /// projected. Rows longer than the header are rejected.
    pub fn read(
        label: &str,
        path: impl AsRef<Path>,
        options: ReadOptions,
    ) -> Result<Self, LoadError> {
        let path = path.as_ref();
        debug!("Reading {} table from {:?}", label, path);

        let file = File::open(path)?;
        let source: Box<dyn Read> = if is_gzipped(path) {
            Box::new(MultiGzDecoder::new(BufReader::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };

        Self::from_reader(label, source, options)
    }

    pub fn from_reader<R: Read>(
        label: &str,
        source: R,
        options: ReadOptions,
    ) -> Result<Self, LoadError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .comment(if options.skip_comments { Some(b'#') } else { None })
            .from_reader(source);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() {
            return Err(LoadError::EmptyFile(label.to_string()));
        }

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let fields = result?;
            let line = fields
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(idx + 2);
            if fields.len() > headers.len() {
                return Err(LoadError::TooManyFields {
                    table: label.to_string(),
                    line,
                    expected: headers.len(),
                    found: fields.len(),
                });
            }
            rows.push(RawRow { line, fields });
        }

        debug!("{} table: {} columns, {} rows", label, headers.len(), rows.len());

        Ok(Self {
            label: label.to_string(),
            headers,
            rows,
        })
    }

    /// Restrict the table to `required` columns, in that order.
    pub fn project(&self, required: &[&str]) -> Result<Projection<'_>, ValidationError> {
        let indices = validator::check_required_columns(&self.label, &self.headers, required)?;
        Ok(Projection {
            table: self,
            indices,
        })
    }
}

/// A column-restricted view over a `RawTable`
#[derive(Debug)]
pub struct Projection<'a> {
    table: &'a RawTable,
    indices: Vec<usize>,
}

impl<'a> Projection<'a> {
    /// Cells of each row in projected column order, `None` where the row is short
    pub fn rows(&self) -> impl Iterator<Item = (usize, Vec<Option<&'a str>>)> + '_ {
        let table: &'a RawTable = self.table;
        table.rows.iter().map(move |row| {
            let cells: Vec<Option<&'a str>> =
                self.indices.iter().map(|&i| row.fields.get(i)).collect();
            (row.line, cells)
        })
    }

    pub fn len(&self) -> usize {
        self.table.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.rows.is_empty()
    }
}

fn is_gzipped(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
}
