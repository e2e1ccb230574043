use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::json;
use tracing::info;

use crate::derive::{MetricRow, OutputTable};
use crate::load::schema::{ColumnIndex, LATITUDE_COLUMN, LONGITUDE_COLUMN, supported_years};
use crate::load::{cell, read_headers};
use crate::publish::{format_metric, write_artifact};
use crate::{ClientError, ClientResult};

pub fn render_metric_csv(table: &OutputTable) -> ClientResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["Country".to_string()];
    header.extend(table.years.iter().map(|year| year.to_string()));
    header.push(LATITUDE_COLUMN.to_string());
    header.push(LONGITUDE_COLUMN.to_string());
    writer
        .write_record(&header)
        .map_err(|error| ClientError::internal_serialization(&error.to_string()))?;

    for row in &table.rows {
        let mut record = vec![row.country.clone()];
        record.extend(table.years.iter().map(|year| format_metric(row.value_for(*year))));
        record.push(row.latitude.clone());
        record.push(row.longitude.clone());
        writer
            .write_record(&record)
            .map_err(|error| ClientError::internal_serialization(&error.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| ClientError::internal_serialization(&error.to_string()))?;
    String::from_utf8(bytes).map_err(|error| ClientError::internal_serialization(&error.to_string()))
}

pub fn write_metric_table(path: &Path, table: &OutputTable) -> ClientResult<()> {
    let content = render_metric_csv(table)?;
    write_artifact(path, &content)?;
    info!(path = %path.display(), rows = table.rows.len(), "wrote tabular output");
    Ok(())
}

pub fn read_metric_table_file(path: &Path) -> ClientResult<OutputTable> {
    let content = fs::read_to_string(path)
        .map_err(|error| ClientError::input_unreadable(path, &error.to_string()))?;
    parse_metric_table(&content)
}

pub fn parse_metric_table(content: &str) -> ClientResult<OutputTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content.as_bytes());
    let headers = read_headers(&mut reader)?;
    let columns = ColumnIndex::from_headers(&headers)?;

    let mut rows = Vec::new();
    for (row_index, result_row) in reader.records().enumerate() {
        let row = row_index + 1;
        let record = result_row.map_err(|error| {
            ClientError::malformed_input(
                &format!("Row {row} is malformed: {error}"),
                json!({ "row": row }),
            )
        })?;

        let country = cell(&record, columns.country).trim().to_string();
        let mut values = BTreeMap::new();
        for (year, position) in &columns.years {
            let raw = cell(&record, *position).trim();
            let value = if raw.is_empty() {
                None
            } else {
                let parsed = raw.parse::<f64>().ok().filter(|value| value.is_finite());
                if parsed.is_none() {
                    return Err(ClientError::malformed_input(
                        &format!("Row {row} ({country}), column {year}: `{raw}` is not a number."),
                        json!({ "row": row, "country": country, "column": year.to_string() }),
                    ));
                }
                parsed
            };
            values.insert(*year, value);
        }

        rows.push(MetricRow {
            latitude: cell(&record, columns.latitude).to_string(),
            longitude: cell(&record, columns.longitude).to_string(),
            country,
            values,
        });
    }

    Ok(OutputTable {
        years: supported_years(),
        rows,
    })
}
