pub mod codes;
pub mod gdp;
pub mod remote;

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::ClientResult;

#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceValues {
    Single(f64),
    ByYear(BTreeMap<i32, f64>),
}

impl ReferenceValues {
    pub fn value_for(&self, year: i32) -> Option<f64> {
        match self {
            Self::Single(value) => Some(*value),
            Self::ByYear(values) => values.get(&year).copied(),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    NoReferenceEntry,
    NoCountryCode,
    NoObservation,
    ZeroReference,
    TransportError,
}

impl UnresolvedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoReferenceEntry => "no_reference_entry",
            Self::NoCountryCode => "no_country_code",
            Self::NoObservation => "no_observation",
            Self::ZeroReference => "zero_reference",
            Self::TransportError => "transport_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnresolvedEntry {
    pub country: String,
    /// `None` when the whole country is unresolved.
    pub year: Option<i32>,
    pub reason: UnresolvedReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl UnresolvedEntry {
    pub fn country(country: &str, reason: UnresolvedReason) -> Self {
        Self {
            country: country.to_string(),
            year: None,
            reason,
            detail: None,
        }
    }

    pub fn cell(country: &str, year: i32, reason: UnresolvedReason) -> Self {
        Self {
            country: country.to_string(),
            year: Some(year),
            reason,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: &str) -> Self {
        self.detail = Some(detail.to_string());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub values: HashMap<String, ReferenceValues>,
    pub unresolved: Vec<UnresolvedEntry>,
}

impl Resolution {
    pub fn value_for(&self, country: &str, year: i32) -> Option<f64> {
        self.values
            .get(country)
            .and_then(|values| values.value_for(year))
    }
}

pub trait ReferenceResolver {
    fn label(&self) -> String;

    fn resolve(&self, countries: &[&str], years: &[i32]) -> ClientResult<Resolution>;
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{ReferenceValues, UnresolvedEntry, UnresolvedReason};

    #[test]
    fn single_values_apply_to_every_year() {
        let values = ReferenceValues::Single(50.0);
        assert_eq!(values.value_for(2018), Some(50.0));
        assert_eq!(values.value_for(2025), Some(50.0));
    }

    #[test]
    fn yearly_values_are_absent_outside_their_series() {
        let values = ReferenceValues::ByYear(BTreeMap::from([(2024, 10.0)]));
        assert_eq!(values.value_for(2024), Some(10.0));
        assert_eq!(values.value_for(2025), None);
    }

    #[test]
    fn unresolved_entries_serialize_reason_as_snake_case() {
        let entry = UnresolvedEntry::cell("X", 2020, UnresolvedReason::NoObservation);
        let value = serde_json::to_value(&entry);
        assert!(value.is_ok());
        if let Ok(value) = value {
            assert_eq!(value["reason"], "no_observation");
            assert_eq!(value["year"], 2020);
            assert!(value.get("detail").is_none());
        }
        assert_eq!(UnresolvedReason::ZeroReference.as_str(), "zero_reference");
    }
}
