use std::path::Path;

use crate::ClientResult;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::CodesCheckData;
use crate::load::load_transactions_file;
use crate::reference::codes::CountryCodes;

pub fn check(input: &Path) -> ClientResult<SuccessEnvelope> {
    let codes = CountryCodes::embedded()?;
    check_with_codes(input, &codes)
}

#[doc(hidden)]
pub fn check_with_codes(input: &Path, codes: &CountryCodes) -> ClientResult<SuccessEnvelope> {
    let transactions = load_transactions_file(input)?;
    let countries = transactions.countries();
    let unmapped = codes
        .unmapped(&countries)
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<String>>();

    success(
        "codes check",
        CodesCheckData {
            input_path: input.display().to_string(),
            countries_total: countries.len(),
            countries_mapped: countries.len() - unmapped.len(),
            unmapped,
        },
    )
}
