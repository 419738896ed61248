mod parser;

pub use parser::{RESISTANCE_LABEL, TARGET_ID_LABEL, extract_run_result};

use super::serialization::write_text_artifact;
use crate::domain::{MoleError, MoleResult, RunResult};
use std::path::Path;
use tracing::info;

pub fn render_summary(result: &RunResult) -> String {
    format!(
        "Minimum hydraulic resistance: {}\nTarget ID: {}\n",
        result.min_resistance, result.target_id
    )
}

pub fn write_summary(path: &Path, result: &RunResult) -> MoleResult<()> {
    write_text_artifact(path, &render_summary(result)).map_err(|source| {
        MoleError::io_system(
            "IO.SUMMARY_WRITE",
            format!("failed to write run summary '{}': {}", path.display(), source),
        )
    })
}

/// Parses the console text first so a failed parse never leaves a summary behind.
pub fn extract_and_summarize(output: &[u8], summary_path: &Path) -> MoleResult<RunResult> {
    let result = extract_run_result(output)?;
    write_summary(summary_path, &result)?;
    info!(
        min_resistance = result.min_resistance,
        target_id = result.target_id,
        summary = %summary_path.display(),
        "run summary written"
    );
    Ok(result)
}
