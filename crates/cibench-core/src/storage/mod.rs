//! Flat tabular conversation records.
//!
//! One CSV file per run, schema fixed by tier, header validated on load.
//! Rows are appended one record at a time and flushed immediately, so an
//! interrupted run leaves a valid prefix on disk. Single writer, no
//! locking: concurrent runs against the same file are not supported.

use crate::errors::{BenchError, BenchErrorKind};
use crate::model::{Tier, Variant, PREAMBLE_LEN};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

pub const COL_SCENARIO_ID: &str = "SCENARIO_ID";
pub const COL_INFORMATION_TYPE: &str = "INFORMATION_TYPE";
pub const COL_SCENARIO_TEXT: &str = "SCENARIO_TEXT";
pub const COL_RECIPIENT: &str = "RECIPIENT";
pub const COL_USE: &str = "USE";
pub const COL_RELATIONSHIP_AND_INCENTIVE: &str = "RELATIONSHIP_AND_INCENTIVE";
pub const COL_STATEMENT_ID: &str = "STATEMENT_ID";
pub const COL_STATEMENT: &str = "STATEMENT";
pub const COL_CHATBOT_RESPONSE: &str = "CHATBOT_RESPONSE";
pub const COL_EVALUATED_SCORE: &str = "EVALUATED_SCORE";
pub const COL_CIAS: &str = "CIAS";

/// Column schema of the conversation table for a tier.
pub fn conversation_columns(tier: Tier) -> &'static [&'static str] {
    match tier {
        Tier::One => &[
            COL_SCENARIO_ID,
            COL_INFORMATION_TYPE,
            COL_SCENARIO_TEXT,
            COL_CHATBOT_RESPONSE,
            COL_EVALUATED_SCORE,
            COL_CIAS,
        ],
        Tier::Two => &[
            COL_SCENARIO_ID,
            COL_INFORMATION_TYPE,
            COL_RECIPIENT,
            COL_USE,
            COL_STATEMENT_ID,
            COL_STATEMENT,
            COL_CHATBOT_RESPONSE,
            COL_EVALUATED_SCORE,
            COL_CIAS,
        ],
        Tier::Three => &[
            COL_SCENARIO_ID,
            COL_INFORMATION_TYPE,
            COL_RELATIONSHIP_AND_INCENTIVE,
            COL_STATEMENT_ID,
            COL_STATEMENT,
            COL_CHATBOT_RESPONSE,
            COL_EVALUATED_SCORE,
            COL_CIAS,
        ],
    }
}

/// `{bot}_{label}_tier_{t}_variant_{v}_conversation.csv`
pub fn conversation_file_name(bot: &str, label: &str, tier: Tier, variant: Variant) -> String {
    format!(
        "{}_{}_tier_{}_variant_{}_conversation.csv",
        bot,
        label,
        tier.number(),
        variant.number()
    )
}

/// An append-only conversation record file.
#[derive(Debug)]
pub struct ConversationTable {
    path: PathBuf,
    columns: &'static [&'static str],
    rows: Vec<Vec<String>>,
}

impl ConversationTable {
    /// Create a fresh table; refuses to clobber an existing file.
    pub fn create(path: &Path, tier: Tier) -> Result<Self, BenchError> {
        if path.exists() {
            return Err(BenchError::table_exists(path.display()));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| BenchError::table_io(path.display(), e.to_string()))?;
        }

        let columns = conversation_columns(tier);
        let mut writer = csv::Writer::from_path(path)
            .map_err(|e| BenchError::table_io(path.display(), e.to_string()))?;
        writer
            .write_record(columns)
            .and_then(|()| writer.flush().map_err(csv::Error::from))
            .map_err(|e| BenchError::table_io(path.display(), e.to_string()))?;

        tracing::info!(path = %path.display(), tier = tier.number(), "created conversation file");
        Ok(Self {
            path: path.to_path_buf(),
            columns,
            rows: Vec::new(),
        })
    }

    /// Load an existing table, validating the header against the tier schema.
    pub fn load(path: &Path, tier: Tier) -> Result<Self, BenchError> {
        if !path.exists() {
            return Err(BenchError::table_missing(path.display()));
        }

        let columns = conversation_columns(tier);
        // flexible: arity defects surface as RowShape below, not reader errors
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| BenchError::table_io(path.display(), e.to_string()))?;

        let found: Vec<String> = reader
            .headers()
            .map_err(|e| BenchError::table_io(path.display(), e.to_string()))?
            .iter()
            .map(String::from)
            .collect();
        if found.len() != columns.len()
            || found.iter().map(String::as_str).ne(columns.iter().copied())
        {
            return Err(BenchError::header_mismatch(path.display(), &found, columns));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record =
                record.map_err(|e| BenchError::table_io(path.display(), e.to_string()))?;
            if record.len() != columns.len() {
                return Err(BenchError::row_shape(
                    path.display(),
                    record.len(),
                    columns.len(),
                ));
            }
            rows.push(record.iter().map(String::from).collect());
        }

        tracing::info!(path = %path.display(), rows = rows.len(), "loaded conversation file");
        Ok(Self {
            path: path.to_path_buf(),
            columns,
            rows,
        })
    }

    /// Append one row and flush it to disk before returning.
    pub fn append_row(&mut self, row: Vec<String>) -> Result<(), BenchError> {
        if row.len() != self.columns.len() {
            return Err(BenchError::row_shape(
                self.path.display(),
                row.len(),
                self.columns.len(),
            ));
        }

        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| BenchError::table_io(self.path.display(), e.to_string()))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer
            .write_record(&row)
            .and_then(|()| writer.flush().map_err(csv::Error::from))
            .map_err(|e| BenchError::table_io(self.path.display(), e.to_string()))?;

        self.rows.push(row);
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn columns(&self) -> &'static [&'static str] {
        self.columns
    }

    pub fn cell(&self, row: usize, column: &str) -> Result<&str, BenchError> {
        let col = self
            .columns
            .iter()
            .position(|c| *c == column)
            .ok_or_else(|| {
                BenchError::new(
                    BenchErrorKind::HeaderMismatch,
                    format!(
                        "column {} not in schema of {}",
                        column,
                        self.path.display()
                    ),
                )
            })?;
        let row = self.rows.get(row).ok_or_else(|| {
            BenchError::new(
                BenchErrorKind::RowShape,
                format!(
                    "row index {} out of range for {} rows in {}",
                    row,
                    self.rows.len(),
                    self.path.display()
                ),
            )
        })?;
        Ok(&row[col])
    }

    /// One column's cells with the user-context preamble rows stripped —
    /// the proxy expander's view of a recorded baseline run.
    pub fn column_after_preamble(&self, column: &str) -> Result<Vec<String>, BenchError> {
        (PREAMBLE_LEN..self.rows.len())
            .map(|i| self.cell(i, column).map(String::from))
            .collect()
    }
}
