use crate::cli::OutputFormat;
use crate::error::{Result, TcctlError};
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;

pub fn print_output<T: Serialize>(data: T, format: OutputFormat) -> Result<()> {
    let value = serde_json::to_value(data)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&value)?),
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(&value).map_err(|e| TcctlError::OutputError {
                message: format!("YAML error: {e}"),
            })?;
            print!("{yaml}");
        }
        OutputFormat::Auto => print!("{}", render_human(&value)),
    }
    Ok(())
}

/// Key/value listing for objects, one entry per line for lists
fn render_human(value: &Value) -> String {
    match value {
        Value::Object(obj) => {
            let width = obj.keys().map(String::len).max().unwrap_or(0);
            obj.iter()
                .map(|(key, val)| format!("{:width$}  {}\n", key.bold(), format_value(val)))
                .collect()
        }
        Value::Array(items) if items.is_empty() => "(none)\n".to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| format!("{}\n", render_human(item).trim_end()))
            .collect::<Vec<_>>()
            .join("\n"),
        other => format!("{}\n", format_value(other)),
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(arr) if arr.iter().all(|v| !v.is_object()) => arr
            .iter()
            .map(format_value)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}
