use std::collections::HashMap;
use std::ops::RangeInclusive;

use crate::{ClientError, ClientResult};

pub const COUNTRY_COLUMN: &str = "Country";
pub const LATITUDE_COLUMN: &str = "Latitude";
pub const LONGITUDE_COLUMN: &str = "Longitude";

pub const SUPPORTED_YEARS: RangeInclusive<i32> = 2018..=2025;

pub const DEFAULT_SCRIPT_YEARS: RangeInclusive<i32> = 2021..=2025;

pub fn supported_years() -> Vec<i32> {
    SUPPORTED_YEARS.collect()
}

pub fn default_script_years() -> Vec<i32> {
    DEFAULT_SCRIPT_YEARS.collect()
}

pub fn header_row() -> Vec<String> {
    let mut headers = vec![COUNTRY_COLUMN.to_string()];
    headers.extend(SUPPORTED_YEARS.map(|year| year.to_string()));
    headers.push(LATITUDE_COLUMN.to_string());
    headers.push(LONGITUDE_COLUMN.to_string());
    headers
}

#[derive(Debug, Clone)]
pub(crate) struct ColumnIndex {
    pub(crate) country: usize,
    pub(crate) years: Vec<(i32, usize)>,
    pub(crate) latitude: usize,
    pub(crate) longitude: usize,
}

impl ColumnIndex {
    pub(crate) fn from_headers(headers: &[String]) -> ClientResult<Self> {
        let index_by_name = headers
            .iter()
            .enumerate()
            .map(|(index, name)| (name.as_str(), index))
            .collect::<HashMap<&str, usize>>();

        let missing = header_row()
            .into_iter()
            .filter(|name| !index_by_name.contains_key(name.as_str()))
            .collect::<Vec<String>>();
        if !missing.is_empty() {
            return Err(ClientError::missing_columns(missing, headers.to_vec()));
        }

        let position = |name: &str| index_by_name.get(name).copied().unwrap_or_default();
        Ok(Self {
            country: position(COUNTRY_COLUMN),
            years: SUPPORTED_YEARS
                .map(|year| (year, position(&year.to_string())))
                .collect(),
            latitude: position(LATITUDE_COLUMN),
            longitude: position(LONGITUDE_COLUMN),
        })
    }
}

pub fn normalize_year_selection(years: &[i32]) -> ClientResult<Vec<i32>> {
    if years.is_empty() {
        return Ok(default_script_years());
    }

    let mut selected = years.to_vec();
    selected.sort_unstable();
    selected.dedup();

    let unsupported = selected
        .iter()
        .filter(|year| !SUPPORTED_YEARS.contains(year))
        .map(|year| year.to_string())
        .collect::<Vec<String>>();
    if !unsupported.is_empty() {
        return Err(ClientError::invalid_argument_with_recovery(
            &format!(
                "Unsupported year(s): {}. Supported range is {}-{}.",
                unsupported.join(", "),
                SUPPORTED_YEARS.start(),
                SUPPORTED_YEARS.end()
            ),
            vec!["Pass `--years` as a comma-separated list inside the supported range.".to_string()],
        ));
    }

    Ok(selected)
}
