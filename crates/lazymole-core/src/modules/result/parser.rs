use crate::domain::{MoleError, ParserResult, RunResult};
use std::str::FromStr;

pub const RESISTANCE_LABEL: &str = "Minimum Hydraulic Resistance = ";
pub const TARGET_ID_LABEL: &str = "Target ID = ";

/// Pulls both labeled values out of the solver's console text.
///
/// The first occurrence of each label wins. A value ends at the next line
/// break (`\r\n` or `\n`) or at the end of the output.
pub fn extract_run_result(output: &[u8]) -> ParserResult<RunResult> {
    let text = String::from_utf8_lossy(output);
    let parsed = parse_labeled::<f64>(&text, RESISTANCE_LABEL, "PARSE.MIN_RESISTANCE")
        .and_then(|min_resistance| {
            parse_labeled::<i64>(&text, TARGET_ID_LABEL, "PARSE.TARGET_ID").map(|target_id| {
                RunResult {
                    min_resistance,
                    target_id,
                }
            })
        });
    parsed.map_err(|error| error.with_captured_output(text.into_owned()))
}

fn parse_labeled<T: FromStr>(text: &str, label: &str, code: &'static str) -> ParserResult<T> {
    let raw = labeled_value(text, label).ok_or_else(|| {
        MoleError::parse(
            code,
            format!("solver output does not contain label '{}'", label.trim_end()),
        )
    })?;
    raw.parse::<T>().map_err(|_| {
        MoleError::parse(
            code,
            format!(
                "value '{}' after label '{}' is not a valid {}",
                raw,
                label.trim_end(),
                std::any::type_name::<T>()
            ),
        )
    })
}

fn labeled_value<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    let start = text.find(label)? + label.len();
    let rest = &text[start..];
    let line = rest.split('\n').next().unwrap_or(rest);
    Some(line.trim())
}
