use std::io;

use serde_json::Value;

use super::format::{count_field, key_value_rows, metric_text, text_field};

pub fn render_normalize(data: &Value) -> io::Result<String> {
    let summary = data
        .get("summary")
        .ok_or_else(|| io::Error::other("normalize output requires summary"))?;

    let mut lines = vec![
        format!(
            "Derived {} ({}) for {} countries.",
            text_field(data, "mode").replace('_', " "),
            text_field(data, "unit"),
            count_field(summary, "countries_total")
        ),
        String::new(),
    ];
    lines.extend(key_value_rows(
        &[
            ("Reference", text_field(data, "reference_source")),
            ("Input", text_field(data, "input_path")),
            ("Output", text_field(data, "output_path")),
            (
                "Complete",
                count_field(summary, "countries_fully_processed").to_string(),
            ),
            ("Partial", count_field(summary, "countries_partial").to_string()),
            (
                "No metrics",
                count_field(summary, "countries_without_metrics").to_string(),
            ),
            (
                "Cells",
                format!(
                    "{} resolved, {} absent",
                    count_field(summary, "cells_resolved"),
                    count_field(summary, "cells_absent")
                ),
            ),
        ],
        2,
    ));

    if let Some(highlights) = data.get("highlights").filter(|value| value.is_object()) {
        lines.push(String::new());
        lines.extend(render_highlights(highlights));
    }

    let unresolved = data
        .get("unresolved")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    if !unresolved.is_empty() {
        lines.push(String::new());
        lines.push(format!("Unresolved references ({}):", unresolved.len()));
        lines.extend(
            unresolved
                .iter()
                .map(|entry| format!("  {}", unresolved_line(entry))),
        );
    }

    if let Some(script) = data.get("script") {
        lines.push(String::new());
        lines.extend(render_script(script));
    }

    Ok(lines.join("\n"))
}

pub fn render_publish_script(data: &Value) -> io::Result<String> {
    let script = data
        .get("script")
        .ok_or_else(|| io::Error::other("publish output requires script"))?;

    let mut lines = vec![format!(
        "Published `{}` from {}.",
        text_field(script, "declaration"),
        text_field(data, "metrics_path")
    )];
    lines.push(String::new());
    lines.extend(render_script(script));

    let absent = string_list(data, "countries_with_absent_cells");
    if !absent.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "Countries published with null values: {}",
            absent.join(", ")
        ));
    }
    Ok(lines.join("\n"))
}

pub fn render_codes_check(data: &Value) -> io::Result<String> {
    let unmapped = string_list(data, "unmapped");
    let mut lines = vec![format!(
        "{} of {} countries in {} have a country code.",
        count_field(data, "countries_mapped"),
        count_field(data, "countries_total"),
        text_field(data, "input_path")
    )];

    if unmapped.is_empty() {
        return Ok(lines.join("\n"));
    }

    lines.push(String::new());
    lines.push("Missing codes (population lookups will skip these):".to_string());
    lines.extend(unmapped.iter().map(|name| format!("  {name}")));
    Ok(lines.join("\n"))
}

fn render_highlights(highlights: &Value) -> Vec<String> {
    let extreme = |key: &str| {
        highlights
            .get(key)
            .map(|entry| {
                format!(
                    "{} ({})",
                    text_field(entry, "country"),
                    metric_text(entry.get("value").unwrap_or(&Value::Null))
                )
            })
            .unwrap_or_default()
    };

    let mut lines = vec![format!(
        "{} highlights:",
        highlights.get("year").and_then(Value::as_i64).unwrap_or_default()
    )];
    lines.extend(key_value_rows(
        &[
            (
                "Average",
                metric_text(highlights.get("average").unwrap_or(&Value::Null)),
            ),
            ("Highest", extreme("highest")),
            ("Lowest", extreme("lowest")),
            (
                "With value",
                count_field(highlights, "countries_with_value").to_string(),
            ),
        ],
        2,
    ));
    lines
}

fn render_script(script: &Value) -> Vec<String> {
    let years = script
        .get("years")
        .and_then(Value::as_array)
        .map(|years| {
            years
                .iter()
                .filter_map(Value::as_i64)
                .map(|year| year.to_string())
                .collect::<Vec<String>>()
                .join(", ")
        })
        .unwrap_or_default();

    let mut entries = vec![
        ("Declaration", text_field(script, "declaration")),
        ("Years", years),
        ("Countries", count_field(script, "countries").to_string()),
    ];
    if let Some(splice) = script.get("splice") {
        let state = if splice.get("changed").and_then(Value::as_bool) == Some(true) {
            "updated"
        } else {
            "already up to date"
        };
        entries.push(("Host", format!("{} ({state})", text_field(splice, "path"))));
    }
    if let Some(snippet) = script.get("snippet_path").and_then(Value::as_str) {
        entries.push(("Snippet", snippet.to_string()));
    }

    let mut lines = vec!["Script block:".to_string()];
    lines.extend(key_value_rows(&entries, 2));
    lines
}

fn unresolved_line(entry: &Value) -> String {
    let country = text_field(entry, "country");
    let reason = text_field(entry, "reason").replace('_', " ");
    let scope = match entry.get("year").and_then(Value::as_i64) {
        Some(year) => format!("{country} {year}"),
        None => format!("{country} (all years)"),
    };
    match entry.get("detail").and_then(Value::as_str) {
        Some(detail) => format!("{scope}: {reason} ({detail})"),
        None => format!("{scope}: {reason}"),
    }
}

fn string_list(data: &Value, key: &str) -> Vec<String> {
    data.get(key)
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
