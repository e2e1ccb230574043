use crate::derive::OutputTable;
use crate::publish::{format_metric, write_artifact};
use crate::{ClientError, ClientResult};
use std::path::Path;

const ENTRY_INDENT: &str = "        ";

/// Renders the object-literal body for the host page, one country per line:
///
/// ```text
///         "Country": { "2021": 1.23, "2022": null },
/// ```
///
/// Countries keep table order; the last entry has no trailing comma.
pub fn render_script_block(table: &OutputTable, years: &[i32]) -> ClientResult<String> {
    let unknown = years
        .iter()
        .filter(|year| !table.years.contains(year))
        .map(|year| year.to_string())
        .collect::<Vec<String>>();
    if !unknown.is_empty() {
        return Err(ClientError::invalid_argument(&format!(
            "Year(s) {} are not present in the metric table.",
            unknown.join(", ")
        )));
    }

    let mut lines = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let key = serde_json::to_string(&row.country)
            .map_err(|error| ClientError::internal_serialization(&error.to_string()))?;
        let cells = years
            .iter()
            .map(|year| {
                let value = row.value_for(*year);
                let literal = if value.is_some() {
                    format_metric(value)
                } else {
                    "null".to_string()
                };
                format!("\"{year}\": {literal}")
            })
            .collect::<Vec<String>>()
            .join(", ");
        lines.push(format!("{ENTRY_INDENT}{key}: {{ {cells} }},"));
    }

    if let Some(last) = lines.last_mut() {
        last.pop();
    }
    Ok(lines.join("\n"))
}

pub fn write_snippet(path: &Path, block: &str) -> ClientResult<()> {
    write_artifact(path, block)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::render_script_block;
    use crate::derive::{MetricRow, OutputTable};

    fn table() -> OutputTable {
        let row = |country: &str, values: &[(i32, Option<f64>)]| MetricRow {
            country: country.to_string(),
            values: values.iter().copied().collect::<BTreeMap<i32, Option<f64>>>(),
            latitude: String::new(),
            longitude: String::new(),
        };
        OutputTable {
            years: vec![2024, 2025],
            rows: vec![
                row("X", &[(2024, Some(150.5)), (2025, Some(200.0))]),
                row("Côte \"Z\"", &[(2024, None), (2025, None)]),
            ],
        }
    }

    #[test]
    fn renders_entries_with_null_for_absent_and_no_trailing_comma() {
        let block = render_script_block(&table(), &[2024, 2025]);
        assert_eq!(
            block.ok().as_deref(),
            Some(
                "        \"X\": { \"2024\": 150.50, \"2025\": 200.00 },\n        \"Côte \\\"Z\\\"\": { \"2024\": null, \"2025\": null }"
            )
        );
    }

    #[test]
    fn honours_year_subset() {
        let block = render_script_block(&table(), &[2025]);
        assert_eq!(
            block.ok().as_deref(),
            Some("        \"X\": { \"2025\": 200.00 },\n        \"Côte \\\"Z\\\"\": { \"2025\": null }")
        );
    }

    #[test]
    fn rejects_years_outside_the_table() {
        assert!(render_script_block(&table(), &[2019]).is_err());
    }

    #[test]
    fn empty_table_renders_empty_block() {
        let block = render_script_block(&OutputTable::default(), &[]);
        assert_eq!(block.ok().as_deref(), Some(""));
    }
}
