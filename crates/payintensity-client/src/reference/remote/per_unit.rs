use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::ClientResult;
use crate::reference::remote::observations::parse_page;
use crate::reference::remote::{
    FetchedSeries, POPULATION_INDICATOR, PopulationStrategy, RemoteStrategyKind, Transport,
    UnitFailure,
};

pub struct PerUnitStrategy<T: Transport> {
    transport: T,
    api_base: String,
    pacing: Duration,
}

impl<T: Transport> PerUnitStrategy<T> {
    pub fn new(transport: T, api_base: &str, pacing: Duration) -> Self {
        Self {
            transport,
            api_base: api_base.trim_end_matches('/').to_string(),
            pacing,
        }
    }

    fn url(&self, code: &str, year: i32) -> String {
        format!(
            "{}/country/{code}/indicator/{POPULATION_INDICATOR}?date={year}&format=json",
            self.api_base
        )
    }

    fn fetch_one(&self, code: &str, year: i32) -> Result<Option<f64>, String> {
        let body = self
            .transport
            .get_text(&self.url(code, year))
            .map_err(|error| error.to_string())?;
        let page = parse_page(&body)?;
        Ok(page
            .observations
            .into_iter()
            .find(|observation| observation.year == year)
            .and_then(|observation| observation.value))
    }
}

impl<T: Transport> PopulationStrategy for PerUnitStrategy<T> {
    fn kind(&self) -> RemoteStrategyKind {
        RemoteStrategyKind::PerUnit
    }

    fn fetch(&self, codes: &[&str], years: &[i32]) -> ClientResult<FetchedSeries> {
        let mut fetched = FetchedSeries::default();
        let mut first = true;

        for code in codes {
            for year in years {
                if !first && !self.pacing.is_zero() {
                    thread::sleep(self.pacing);
                }
                first = false;

                match self.fetch_one(code, *year) {
                    Ok(Some(value)) => fetched.insert(code, *year, value),
                    Ok(None) => debug!(code, year, "no observation"),
                    Err(detail) => {
                        warn!(code, year, %detail, "population request failed");
                        fetched.failures.push(UnitFailure {
                            code: code.to_string(),
                            year: Some(*year),
                            detail,
                        });
                    }
                }
            }
        }

        Ok(fetched)
    }
}
