use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tracing::{info, warn};

use crate::commands::publish::{ScriptTarget, publish_script};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{NormalizeData, NormalizeSummary};
use crate::derive::{MetricMode, OutputTable, derive_table, year_highlights};
use crate::load::load_transactions_file;
use crate::load::schema::supported_years;
use crate::publish::tabular::write_metric_table;
use crate::reference::gdp::StaticReference;
use crate::reference::remote::{RemoteOptions, RemoteReference};
use crate::reference::{ReferenceResolver, UnresolvedEntry};
use crate::{ClientError, ClientResult};

#[derive(Debug, Clone)]
pub enum ReferenceSource {
    StaticGdp { table_path: Option<PathBuf> },
    RemotePopulation(RemoteOptions),
}

#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub mode: MetricMode,
    pub source: ReferenceSource,
    pub script: Option<ScriptTarget>,
}

pub fn run(options: NormalizeOptions) -> ClientResult<SuccessEnvelope> {
    let resolver = build_resolver(&options.source)?;
    run_with_resolver(&options, resolver.as_ref())
}

pub fn build_resolver(source: &ReferenceSource) -> ClientResult<Box<dyn ReferenceResolver>> {
    match source {
        ReferenceSource::StaticGdp { table_path: None } => {
            Ok(Box::new(StaticReference::embedded_gdp()?))
        }
        ReferenceSource::StaticGdp {
            table_path: Some(path),
        } => Ok(Box::new(StaticReference::gdp_from_toml_file(path)?)),
        ReferenceSource::RemotePopulation(remote) => {
            Ok(Box::new(RemoteReference::from_options(remote)?))
        }
    }
}

#[doc(hidden)]
pub fn run_with_resolver(
    options: &NormalizeOptions,
    resolver: &dyn ReferenceResolver,
) -> ClientResult<SuccessEnvelope> {
    if let Some(target) = &options.script {
        target.validate()?;
    }

    let transactions = load_transactions_file(&options.input)?;
    if transactions.is_empty() {
        return Err(ClientError::malformed_input(
            "Transaction table has a header but no rows.",
            json!({ "path": options.input.display().to_string() }),
        ));
    }

    let years = supported_years();
    let countries = transactions.countries();
    let resolution = resolver.resolve(&countries, &years)?;
    let derivation = derive_table(&transactions, &resolution, &years, options.mode);

    write_metric_table(&options.output, &derivation.table)?;

    let position_by_country = countries
        .iter()
        .enumerate()
        .map(|(position, country)| (*country, position))
        .collect::<HashMap<&str, usize>>();
    let mut unresolved = resolution.unresolved.clone();
    unresolved.extend(derivation.zero_reference.iter().cloned());
    unresolved.sort_by_key(|entry| {
        (
            position_by_country
                .get(entry.country.as_str())
                .copied()
                .unwrap_or(usize::MAX),
            entry.year.unwrap_or(i32::MIN),
        )
    });

    let script = match &options.script {
        Some(target) => Some(
            publish_script(&derivation.table, target)
                .map_err(|error| with_tabular_output_note(error, &options.output))?,
        ),
        None => None,
    };

    let summary = summarize(&derivation.table);
    info!(
        countries = summary.countries_total,
        fully_processed = summary.countries_fully_processed,
        unresolved = unresolved.len(),
        "normalize finished"
    );
    if !unresolved.is_empty() {
        warn!(entries = unresolved.len(), "some reference values could not be resolved");
    }

    let unresolved_countries = derivation
        .table
        .rows
        .iter()
        .filter(|row| !row.is_complete())
        .map(|row| row.country.clone())
        .collect();

    success(
        "normalize",
        NormalizeData {
            mode: options.mode,
            unit: options.mode.unit_label().to_string(),
            reference_source: resolver.label(),
            input_path: options.input.display().to_string(),
            output_path: options.output.display().to_string(),
            highlights: years
                .last()
                .and_then(|year| year_highlights(&derivation.table, *year)),
            years,
            summary,
            unresolved,
            unresolved_countries,
            script,
        },
    )
}

fn summarize(table: &OutputTable) -> NormalizeSummary {
    let countries_fully_processed = table.rows.iter().filter(|row| row.is_complete()).count();
    let countries_without_metrics = table.rows.iter().filter(|row| row.is_empty()).count();
    let cells_resolved = table
        .rows
        .iter()
        .map(|row| row.values.values().filter(|value| value.is_some()).count())
        .sum::<usize>();
    let cells_total = table.rows.iter().map(|row| row.values.len()).sum::<usize>();

    NormalizeSummary {
        countries_total: table.rows.len(),
        countries_fully_processed,
        countries_partial: table.rows.len() - countries_fully_processed - countries_without_metrics,
        countries_without_metrics,
        cells_resolved,
        cells_absent: cells_total - cells_resolved,
    }
}

fn with_tabular_output_note(mut error: ClientError, output: &Path) -> ClientError {
    let location = output.display().to_string();
    let mut data = error.data.take().unwrap_or_else(|| json!({}));
    if let Some(object) = data.as_object_mut() {
        object.insert("tabular_output".to_string(), Value::String(location.clone()));
    }
    error
        .recovery_steps
        .push(format!("The tabular output `{location}` was written and is unaffected."));
    error.with_data(data)
}
