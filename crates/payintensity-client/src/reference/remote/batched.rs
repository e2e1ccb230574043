use tracing::{debug, warn};

use crate::ClientResult;
use crate::reference::remote::observations::parse_page;
use crate::reference::remote::{
    FetchedSeries, POPULATION_INDICATOR, PopulationStrategy, RemoteStrategyKind, Transport,
    UnitFailure,
};

const PAGE_SIZE: u32 = 20_000;

pub struct BatchedStrategy<T: Transport> {
    transport: T,
    api_base: String,
}

impl<T: Transport> BatchedStrategy<T> {
    pub fn new(transport: T, api_base: &str) -> Self {
        Self {
            transport,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, codes: &[&str], first_year: i32, last_year: i32, page: u32) -> String {
        format!(
            "{}/country/{}/indicator/{POPULATION_INDICATOR}?format=json&per_page={PAGE_SIZE}&date={first_year}:{last_year}&page={page}",
            self.api_base,
            codes.join(";")
        )
    }
}

impl<T: Transport> PopulationStrategy for BatchedStrategy<T> {
    fn kind(&self) -> RemoteStrategyKind {
        RemoteStrategyKind::Batched
    }

    fn fetch(&self, codes: &[&str], years: &[i32]) -> ClientResult<FetchedSeries> {
        let mut fetched = FetchedSeries::default();
        let (Some(first_year), Some(last_year)) =
            (years.iter().min().copied(), years.iter().max().copied())
        else {
            return Ok(fetched);
        };
        if codes.is_empty() {
            return Ok(fetched);
        }

        let mut page = 1;
        let mut pages = 1;
        while page <= pages {
            let url = self.url(codes, first_year, last_year, page);
            let parsed = self
                .transport
                .get_text(&url)
                .map_err(|error| error.to_string())
                .and_then(|body| parse_page(&body));

            let current = match parsed {
                Ok(current) => current,
                Err(detail) => {
                    warn!(page, %detail, "batched population request failed");
                    fetched
                        .failures
                        .extend(codes.iter().map(|code| UnitFailure {
                            code: code.to_string(),
                            year: None,
                            detail: detail.clone(),
                        }));
                    return Ok(fetched);
                }
            };

            debug!(page, pages = current.pages, records = current.observations.len(), "batched page");
            for observation in current.observations {
                if !years.contains(&observation.year) || !codes.contains(&observation.code.as_str()) {
                    continue;
                }
                if let Some(value) = observation.value {
                    fetched.insert(&observation.code, observation.year, value);
                }
            }

            pages = current.pages;
            page += 1;
        }

        Ok(fetched)
    }
}
