pub mod batched;
pub mod bulk;
pub(crate) mod observations;
pub mod per_unit;
pub mod transport;

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use tracing::{info, warn};

use crate::reference::codes::CountryCodes;
use crate::reference::{
    ReferenceResolver, ReferenceValues, Resolution, UnresolvedEntry, UnresolvedReason,
};
use crate::{ClientError, ClientResult};

pub use batched::BatchedStrategy;
pub use bulk::BulkArchiveStrategy;
pub use per_unit::PerUnitStrategy;
pub use transport::{HttpTransport, Transport, TransportError};

pub const POPULATION_INDICATOR: &str = "SP.POP.TOTL";
pub const DEFAULT_API_BASE: &str = "https://api.worldbank.org/v2";
pub const DEFAULT_BULK_URL: &str =
    "https://api.worldbank.org/v2/en/indicator/SP.POP.TOTL?downloadformat=csv";
pub const DEFAULT_PACING: Duration = Duration::from_millis(200);

const PER_UNIT_TIMEOUT: Duration = Duration::from_secs(5);
const BULK_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RemoteStrategyKind {
    PerUnit,
    Batched,
    Bulk,
}

impl RemoteStrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PerUnit => "per_unit",
            Self::Batched => "batched",
            Self::Bulk => "bulk",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnitFailure {
    pub code: String,
    pub year: Option<i32>,
    pub detail: String,
}

#[derive(Debug, Clone, Default)]
pub struct FetchedSeries {
    pub values: HashMap<String, BTreeMap<i32, f64>>,
    pub failures: Vec<UnitFailure>,
}

impl FetchedSeries {
    pub(crate) fn insert(&mut self, code: &str, year: i32, value: f64) {
        self.values
            .entry(code.to_string())
            .or_default()
            .insert(year, value);
    }

    fn failure_for(&self, code: &str, year: i32) -> Option<&UnitFailure> {
        self.failures
            .iter()
            .find(|failure| failure.code == code && failure.year == Some(year))
            .or_else(|| {
                self.failures
                    .iter()
                    .find(|failure| failure.code == code && failure.year.is_none())
            })
    }
}

pub trait PopulationStrategy {
    fn kind(&self) -> RemoteStrategyKind;

    /// Fetches population for every (code, year) pair. Per-unit failures belong
    /// in [`FetchedSeries::failures`]; an `Err` aborts the whole run.
    fn fetch(&self, codes: &[&str], years: &[i32]) -> ClientResult<FetchedSeries>;
}

#[derive(Debug, Clone)]
pub struct RemoteOptions {
    pub kind: RemoteStrategyKind,
    pub api_base: String,
    pub bulk_url: String,
    pub pacing: Duration,
}

impl Default for RemoteOptions {
    fn default() -> Self {
        Self {
            kind: RemoteStrategyKind::Bulk,
            api_base: DEFAULT_API_BASE.to_string(),
            bulk_url: DEFAULT_BULK_URL.to_string(),
            pacing: DEFAULT_PACING,
        }
    }
}

pub struct RemoteReference {
    codes: CountryCodes,
    strategy: Box<dyn PopulationStrategy>,
}

impl RemoteReference {
    pub fn new(codes: CountryCodes, strategy: Box<dyn PopulationStrategy>) -> Self {
        Self { codes, strategy }
    }

    pub fn from_options(options: &RemoteOptions) -> ClientResult<Self> {
        let codes = CountryCodes::embedded()?;
        let timeout = match options.kind {
            RemoteStrategyKind::PerUnit => PER_UNIT_TIMEOUT,
            RemoteStrategyKind::Batched | RemoteStrategyKind::Bulk => BULK_TIMEOUT,
        };
        let transport = HttpTransport::new(timeout).map_err(|error| {
            ClientError::transport_error(&options.api_base, &error.to_string())
        })?;

        let strategy: Box<dyn PopulationStrategy> = match options.kind {
            RemoteStrategyKind::PerUnit => Box::new(PerUnitStrategy::new(
                transport,
                &options.api_base,
                options.pacing,
            )),
            RemoteStrategyKind::Batched => {
                Box::new(BatchedStrategy::new(transport, &options.api_base))
            }
            RemoteStrategyKind::Bulk => {
                Box::new(BulkArchiveStrategy::new(transport, &options.bulk_url))
            }
        };
        Ok(Self::new(codes, strategy))
    }
}

impl ReferenceResolver for RemoteReference {
    fn label(&self) -> String {
        format!("remote_population:{}", self.strategy.kind().as_str())
    }

    fn resolve(&self, countries: &[&str], years: &[i32]) -> ClientResult<Resolution> {
        let mut resolution = Resolution::default();

        let unmapped = self.codes.unmapped(countries);
        for country in &unmapped {
            resolution.unresolved.push(UnresolvedEntry::country(
                country,
                UnresolvedReason::NoCountryCode,
            ));
        }

        let mapped = countries
            .iter()
            .filter_map(|country| {
                self.codes
                    .code_for(country)
                    .map(|code| (*country, code))
            })
            .collect::<Vec<(&str, &str)>>();
        let codes = mapped.iter().map(|(_, code)| *code).collect::<Vec<&str>>();

        info!(
            strategy = self.strategy.kind().as_str(),
            countries = codes.len(),
            years = years.len(),
            "fetching population"
        );
        let fetched = self.strategy.fetch(&codes, years)?;

        for (country, code) in mapped {
            let series = fetched
                .values
                .get(code)
                .map(|values| {
                    values
                        .iter()
                        .filter(|(year, _)| years.contains(year))
                        .map(|(year, value)| (*year, *value))
                        .collect::<BTreeMap<i32, f64>>()
                })
                .unwrap_or_default();

            if series.is_empty() {
                let entry = match fetched.failures.iter().find(|failure| failure.code == code) {
                    Some(failure) if failure.year.is_none() => {
                        UnresolvedEntry::country(country, UnresolvedReason::TransportError)
                            .with_detail(&failure.detail)
                    }
                    Some(_) => {
                        push_cell_gaps(&mut resolution, &fetched, country, code, years);
                        continue;
                    }
                    None => UnresolvedEntry::country(country, UnresolvedReason::NoObservation),
                };
                warn!(country, reason = entry.reason.as_str(), "no population data");
                resolution.unresolved.push(entry);
                continue;
            }

            let missing_years = years
                .iter()
                .copied()
                .filter(|year| !series.contains_key(year))
                .collect::<Vec<i32>>();
            push_cell_gaps(&mut resolution, &fetched, country, code, &missing_years);
            resolution
                .values
                .insert(country.to_string(), ReferenceValues::ByYear(series));
        }

        Ok(resolution)
    }
}

fn push_cell_gaps(
    resolution: &mut Resolution,
    fetched: &FetchedSeries,
    country: &str,
    code: &str,
    years: &[i32],
) {
    for year in years {
        let entry = match fetched.failure_for(code, *year) {
            Some(failure) => UnresolvedEntry::cell(country, *year, UnresolvedReason::TransportError)
                .with_detail(&failure.detail),
            None => UnresolvedEntry::cell(country, *year, UnresolvedReason::NoObservation),
        };
        warn!(country, year, reason = entry.reason.as_str(), "no population value");
        resolution.unresolved.push(entry);
    }
}
