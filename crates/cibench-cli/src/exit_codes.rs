//! Process exit codes: 0 = success, 2 = configuration/parse/persistence
//! failure, 3 = runtime failure.

use cibench_core::errors::{BenchError, BenchErrorKind};

pub const SUCCESS: i32 = 0;
pub const CONFIG_ERROR: i32 = 2;
pub const RUN_ERROR: i32 = 3;

pub fn for_error(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<BenchError>() {
        Some(bench) => match bench.kind {
            BenchErrorKind::Alignment => RUN_ERROR,
            _ => CONFIG_ERROR,
        },
        None => RUN_ERROR,
    }
}
