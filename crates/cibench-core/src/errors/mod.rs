//! Fatal error taxonomy.
//!
//! Parse and persistence failures are unrecoverable for the caller: a run
//! must never proceed on partial scenario data or a mismatched table. They
//! are returned as values (the caller decides to abort), never logged and
//! exited from deep inside the pipeline. The per-prompt and per-score paths
//! do not use this type at all; they degrade locally to sentinels.

use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BenchErrorKind {
    ScenarioParse,
    ScenarioCount,
    EvalTaskParse,
    UserContextParse,
    TableExists,
    TableMissing,
    TableIo,
    HeaderMismatch,
    RowShape,
    Alignment,
    PriorRunMismatch,
    Config,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct BenchError {
    pub kind: BenchErrorKind,
    pub message: String,
    pub path: Option<String>,
    pub detail: Option<String>,
}

impl BenchError {
    pub fn new(kind: BenchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            path: None,
            detail: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn scenario_parse(path: impl Display, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self::new(
            BenchErrorKind::ScenarioParse,
            format!("malformed scenario file {}: {}", path, detail),
        )
        .with_path(path.to_string())
        .with_detail(detail)
    }

    pub fn scenario_count(path: impl Display, found: usize, expected: usize) -> Self {
        Self::new(
            BenchErrorKind::ScenarioCount,
            format!(
                "scenario count mismatch in {}: found {}, expected {}",
                path, found, expected
            ),
        )
        .with_path(path.to_string())
    }

    pub fn eval_task_parse(path: impl Display, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self::new(
            BenchErrorKind::EvalTaskParse,
            format!("malformed evaluation-task file {}: {}", path, detail),
        )
        .with_path(path.to_string())
        .with_detail(detail)
    }

    pub fn user_context(path: impl Display, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self::new(
            BenchErrorKind::UserContextParse,
            format!("malformed user-context file {}: {}", path, detail),
        )
        .with_path(path.to_string())
        .with_detail(detail)
    }

    pub fn table_exists(path: impl Display) -> Self {
        Self::new(
            BenchErrorKind::TableExists,
            format!("conversation file {} already exists", path),
        )
        .with_path(path.to_string())
    }

    pub fn table_missing(path: impl Display) -> Self {
        Self::new(
            BenchErrorKind::TableMissing,
            format!("conversation file {} does not exist", path),
        )
        .with_path(path.to_string())
    }

    pub fn table_io(path: impl Display, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self::new(
            BenchErrorKind::TableIo,
            format!("conversation file {} I/O failure: {}", path, detail),
        )
        .with_path(path.to_string())
        .with_detail(detail)
    }

    pub fn header_mismatch(path: impl Display, found: &[String], expected: &[&str]) -> Self {
        Self::new(
            BenchErrorKind::HeaderMismatch,
            format!(
                "header of {} does not match the tier schema: found {:?}, expected {:?}",
                path, found, expected
            ),
        )
        .with_path(path.to_string())
    }

    pub fn row_shape(path: impl Display, found: usize, expected: usize) -> Self {
        Self::new(
            BenchErrorKind::RowShape,
            format!(
                "row length {} does not match the {} columns of {}",
                found, expected, path
            ),
        )
        .with_path(path.to_string())
    }

    pub fn alignment(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self::new(
            BenchErrorKind::Alignment,
            format!("response sequence misaligned: {}", detail),
        )
        .with_detail(detail)
    }

    pub fn prior_run_mismatch(found: usize, expected: usize) -> Self {
        Self::new(
            BenchErrorKind::PriorRunMismatch,
            format!(
                "recorded baseline run holds {} responses, expected {}",
                found, expected
            ),
        )
    }

    pub fn config(path: impl Display, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self::new(
            BenchErrorKind::Config,
            format!("config error in {}: {}", path, detail),
        )
        .with_path(path.to_string())
        .with_detail(detail)
    }
}
