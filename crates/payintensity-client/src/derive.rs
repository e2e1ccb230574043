use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

use crate::load::TransactionTable;
use crate::reference::{Resolution, UnresolvedEntry, UnresolvedReason};

const BILLION: f64 = 1_000_000_000.0;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricMode {
    /// `transaction / gdp * 100`, both in billions.
    GdpPercentage,
    /// `transaction * 1e9 / population`, currency units per person.
    PerCapita,
}

impl MetricMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GdpPercentage => "gdp_percentage",
            Self::PerCapita => "per_capita",
        }
    }

    pub fn unit_label(&self) -> &'static str {
        match self {
            Self::GdpPercentage => "% of GDP",
            Self::PerCapita => "USD per person",
        }
    }
}

pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn derive_metric(mode: MetricMode, transaction: f64, reference: Option<f64>) -> Option<f64> {
    let reference = reference.filter(|value| *value > 0.0 && value.is_finite())?;
    let raw = match mode {
        MetricMode::GdpPercentage => transaction / reference * 100.0,
        MetricMode::PerCapita => transaction * BILLION / reference,
    };
    raw.is_finite().then(|| round_to_cents(raw))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    pub country: String,
    pub values: BTreeMap<i32, Option<f64>>,
    pub latitude: String,
    pub longitude: String,
}

impl MetricRow {
    pub fn value_for(&self, year: i32) -> Option<f64> {
        self.values.get(&year).copied().flatten()
    }

    pub fn is_complete(&self) -> bool {
        self.values.values().all(Option::is_some)
    }

    pub fn is_empty(&self) -> bool {
        self.values.values().all(Option::is_none)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputTable {
    pub years: Vec<i32>,
    pub rows: Vec<MetricRow>,
}

impl OutputTable {
    pub fn row(&self, country: &str) -> Option<&MetricRow> {
        self.rows.iter().find(|row| row.country == country)
    }
}

#[derive(Debug, Clone)]
pub struct Derivation {
    pub table: OutputTable,
    pub zero_reference: Vec<UnresolvedEntry>,
}

pub fn derive_table(
    transactions: &TransactionTable,
    resolution: &Resolution,
    years: &[i32],
    mode: MetricMode,
) -> Derivation {
    let mut zero_reference = Vec::new();
    let rows = transactions
        .records()
        .iter()
        .map(|record| {
            let values = years
                .iter()
                .map(|year| {
                    let reference = resolution.value_for(&record.country, *year);
                    if reference == Some(0.0) {
                        zero_reference.push(UnresolvedEntry::cell(
                            &record.country,
                            *year,
                            UnresolvedReason::ZeroReference,
                        ));
                    }
                    let metric = record
                        .value_for(*year)
                        .and_then(|transaction| derive_metric(mode, transaction, reference));
                    (*year, metric)
                })
                .collect::<BTreeMap<i32, Option<f64>>>();

            MetricRow {
                country: record.country.clone(),
                values,
                latitude: record.latitude.clone(),
                longitude: record.longitude.clone(),
            }
        })
        .collect::<Vec<MetricRow>>();

    info!(mode = mode.as_str(), rows = rows.len(), "derived metrics");
    Derivation {
        table: OutputTable {
            years: years.to_vec(),
            rows,
        },
        zero_reference,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearHighlights {
    pub year: i32,
    pub countries_with_value: usize,
    pub average: f64,
    pub highest: CountryValue,
    pub lowest: CountryValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryValue {
    pub country: String,
    pub value: f64,
}

pub fn year_highlights(table: &OutputTable, year: i32) -> Option<YearHighlights> {
    let present = table
        .rows
        .iter()
        .filter_map(|row| row.value_for(year).map(|value| (row.country.as_str(), value)))
        .collect::<Vec<(&str, f64)>>();
    let (first_country, first_value) = present.first().copied()?;

    let mut highest = (first_country, first_value);
    let mut lowest = (first_country, first_value);
    for (country, value) in present.iter().skip(1).copied() {
        if value > highest.1 {
            highest = (country, value);
        }
        if value < lowest.1 {
            lowest = (country, value);
        }
    }

    let total = present.iter().map(|(_, value)| value).sum::<f64>();
    Some(YearHighlights {
        year,
        countries_with_value: present.len(),
        average: round_to_cents(total / present.len() as f64),
        highest: CountryValue {
            country: highest.0.to_string(),
            value: highest.1,
        },
        lowest: CountryValue {
            country: lowest.0.to_string(),
            value: lowest.1,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::{MetricMode, derive_metric, round_to_cents};

    #[test]
    fn gdp_percentage_matches_formula() {
        assert_eq!(derive_metric(MetricMode::GdpPercentage, 100.0, Some(50.0)), Some(200.0));
        assert_eq!(derive_metric(MetricMode::GdpPercentage, 1.0, Some(3.0)), Some(33.33));
        assert_eq!(derive_metric(MetricMode::GdpPercentage, 2.0, Some(3.0)), Some(66.67));
    }

    #[test]
    fn per_capita_scales_billions() {
        assert_eq!(
            derive_metric(MetricMode::PerCapita, 10.0, Some(2_000_000.0)),
            Some(5000.0)
        );
    }

    #[test]
    fn zero_or_missing_reference_is_absent() {
        for mode in [MetricMode::GdpPercentage, MetricMode::PerCapita] {
            assert_eq!(derive_metric(mode, 10.0, Some(0.0)), None);
            assert_eq!(derive_metric(mode, 10.0, None), None);
            assert_eq!(derive_metric(mode, 0.0, Some(0.0)), None);
        }
    }

    #[test]
    fn zero_transaction_with_reference_is_a_real_zero() {
        assert_eq!(derive_metric(MetricMode::PerCapita, 0.0, Some(10.0)), Some(0.0));
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_to_cents(0.125), 0.13);
        assert_eq!(round_to_cents(2.5), 2.5);
        assert_eq!(round_to_cents(1.005_000_1), 1.01);
        assert_eq!(round_to_cents(7.0), 7.0);
    }
}
