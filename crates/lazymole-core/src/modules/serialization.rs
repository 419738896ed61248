use std::fs;
use std::path::Path;

/// Renders `value` the way C's `%.{precision}e` does: `1.23450e+00`.
pub fn format_scientific_f64(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let rendered = format!("{value:.precision$e}", precision = precision);
    let Some((mantissa, exponent)) = rendered.split_once('e') else {
        return rendered;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return rendered;
    };
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
}

pub fn normalize_text_artifact(content: &str) -> String {
    let mut normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

pub fn write_text_artifact(path: &Path, content: &str) -> std::io::Result<()> {
    fs::write(path, normalize_text_artifact(content))
}

/// Writes one rendered item per line; an empty iterator produces an empty file.
pub fn write_line_artifact<I>(path: &Path, lines: I) -> std::io::Result<()>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut content = String::new();
    for line in lines {
        content.push_str(line.as_ref());
        content.push('\n');
    }
    fs::write(path, content)
}
