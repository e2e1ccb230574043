use std::collections::{BTreeMap, HashMap};
use std::io::{Cursor, Read};

use tracing::{debug, info};

use crate::reference::remote::{
    FetchedSeries, POPULATION_INDICATOR, PopulationStrategy, RemoteStrategyKind, Transport,
};
use crate::{ClientError, ClientResult};

// No partial fallback: a failed download or an unreadable archive aborts the run.
pub struct BulkArchiveStrategy<T: Transport> {
    transport: T,
    url: String,
}

impl<T: Transport> BulkArchiveStrategy<T> {
    pub fn new(transport: T, url: &str) -> Self {
        Self {
            transport,
            url: url.to_string(),
        }
    }
}

impl<T: Transport> PopulationStrategy for BulkArchiveStrategy<T> {
    fn kind(&self) -> RemoteStrategyKind {
        RemoteStrategyKind::Bulk
    }

    fn fetch(&self, codes: &[&str], years: &[i32]) -> ClientResult<FetchedSeries> {
        let archive = self
            .transport
            .get_bytes(&self.url)
            .map_err(|error| ClientError::transport_error(&self.url, &error.to_string()))?;
        info!(bytes = archive.len(), "downloaded population archive");

        let content = extract_indicator_csv(&archive)
            .map_err(|detail| ClientError::transport_error(&self.url, &detail))?;
        let index = index_indicator_csv(&content)
            .map_err(|detail| ClientError::transport_error(&self.url, &detail))?;
        info!(codes = index.len(), "indexed population archive");

        let mut fetched = FetchedSeries::default();
        for code in codes {
            let Some(series) = index.get(*code) else {
                debug!(code, "code absent from archive");
                continue;
            };
            for year in years {
                if let Some(value) = series.get(year) {
                    fetched.insert(code, *year, *value);
                }
            }
        }
        Ok(fetched)
    }
}

pub(crate) fn extract_indicator_csv(archive: &[u8]) -> Result<String, String> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive))
        .map_err(|error| format!("archive is not a readable ZIP: {error}"))?;
    let prefix = format!("API_{POPULATION_INDICATOR}");

    for position in 0..zip.len() {
        let mut entry = zip
            .by_index(position)
            .map_err(|error| format!("archive entry {position} is unreadable: {error}"))?;
        let name = entry.name().to_string();
        if !(name.starts_with(&prefix) && name.ends_with(".csv")) {
            continue;
        }

        let mut content = String::new();
        entry
            .read_to_string(&mut content)
            .map_err(|error| format!("archive entry `{name}` is unreadable: {error}"))?;
        return Ok(content);
    }

    Err(format!("archive has no `{prefix}*.csv` entry"))
}

pub(crate) fn index_indicator_csv(
    content: &str,
) -> Result<HashMap<String, BTreeMap<i32, f64>>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut code_column = None;
    let mut year_columns = Vec::new();
    let mut index = HashMap::new();

    for result_row in reader.records() {
        let record = result_row.map_err(|error| format!("indicator CSV is malformed: {error}"))?;

        let Some(code_position) = code_column else {
            let first = record.get(0).unwrap_or_default().trim_start_matches('\u{feff}');
            if first.trim() == "Country Name" {
                code_column = record.iter().position(|field| field.trim() == "Country Code");
                year_columns = record
                    .iter()
                    .enumerate()
                    .filter_map(|(position, field)| {
                        field.trim().parse::<i32>().ok().map(|year| (position, year))
                    })
                    .collect::<Vec<(usize, i32)>>();
                if code_column.is_none() {
                    return Err("indicator CSV header has no `Country Code` column".to_string());
                }
            }
            continue;
        };

        let code = record.get(code_position).unwrap_or_default().trim();
        if code.is_empty() {
            continue;
        }

        let series = year_columns
            .iter()
            .filter_map(|(position, year)| {
                record
                    .get(*position)
                    .and_then(|raw| raw.trim().parse::<f64>().ok())
                    .filter(|value| value.is_finite() && *value >= 0.0)
                    .map(|value| (*year, value))
            })
            .collect::<BTreeMap<i32, f64>>();
        index.insert(code.to_string(), series);
    }

    if code_column.is_none() {
        return Err("indicator CSV has no `Country Name` header row".to_string());
    }
    Ok(index)
}
