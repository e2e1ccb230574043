pub(crate) mod numeric;
pub mod schema;

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde_json::json;
use tracing::info;

use crate::load::numeric::parse_amount;
use crate::load::schema::ColumnIndex;
use crate::{ClientError, ClientResult};

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub country: String,
    pub values: BTreeMap<i32, f64>,
    pub latitude: String,
    pub longitude: String,
}

impl TransactionRecord {
    pub fn value_for(&self, year: i32) -> Option<f64> {
        self.values.get(&year).copied()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransactionTable {
    records: Vec<TransactionRecord>,
    index_by_country: HashMap<String, usize>,
}

impl TransactionTable {
    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn get(&self, country: &str) -> Option<&TransactionRecord> {
        self.index_by_country
            .get(country)
            .and_then(|index| self.records.get(*index))
    }

    pub fn countries(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|record| record.country.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn push(&mut self, record: TransactionRecord, row: usize) -> ClientResult<()> {
        if self.index_by_country.contains_key(&record.country) {
            return Err(ClientError::malformed_input(
                &format!(
                    "Country `{}` appears more than once (row {row}).",
                    record.country
                ),
                json!({ "row": row, "column": schema::COUNTRY_COLUMN }),
            ));
        }
        self.index_by_country
            .insert(record.country.clone(), self.records.len());
        self.records.push(record);
        Ok(())
    }
}

pub fn load_transactions_file(path: &Path) -> ClientResult<TransactionTable> {
    let content = fs::read_to_string(path)
        .map_err(|error| ClientError::input_unreadable(path, &error.to_string()))?;
    let table = parse_transactions(&content)?;
    info!(
        path = %path.display(),
        countries = table.len(),
        "loaded transaction table"
    );
    Ok(table)
}

pub fn parse_transactions(content: &str) -> ClientResult<TransactionTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes());

    let headers = read_headers(&mut reader)?;
    let columns = ColumnIndex::from_headers(&headers)?;

    let mut table = TransactionTable::default();
    for (row_index, result_row) in reader.records().enumerate() {
        let row = row_index + 1;
        let record = result_row.map_err(|error| {
            ClientError::malformed_input(
                &format!("Row {row} is malformed: {error}"),
                json!({ "row": row }),
            )
        })?;

        let country = cell(&record, columns.country).trim().to_string();
        if country.is_empty() {
            return Err(ClientError::malformed_input(
                &format!("Row {row} has an empty `Country` cell."),
                json!({ "row": row, "column": schema::COUNTRY_COLUMN }),
            ));
        }

        let mut values = BTreeMap::new();
        for (year, position) in &columns.years {
            let raw = cell(&record, *position);
            let value = parse_amount(raw).map_err(|detail| {
                ClientError::malformed_input(
                    &format!("Row {row} ({country}), column {year}: {detail}."),
                    json!({ "row": row, "country": country, "column": year.to_string() }),
                )
            })?;
            values.insert(*year, value);
        }

        table.push(
            TransactionRecord {
                latitude: cell(&record, columns.latitude).to_string(),
                longitude: cell(&record, columns.longitude).to_string(),
                country,
                values,
            },
            row,
        )?;
    }

    Ok(table)
}

pub(crate) fn read_headers(reader: &mut csv::Reader<&[u8]>) -> ClientResult<Vec<String>> {
    let headers = reader
        .headers()
        .map_err(|_| {
            ClientError::malformed_input(
                "CSV header row is missing or unreadable.",
                json!({ "row": 0 }),
            )
        })?
        .iter()
        .map(|value| value.trim_start_matches('\u{feff}').to_string())
        .collect::<Vec<String>>();
    Ok(headers)
}

pub(crate) fn cell(record: &csv::StringRecord, position: usize) -> &str {
    record.get(position).unwrap_or_default()
}
